//! Path-keyed cache of modules that finished loading.

use std::collections::HashMap ;

use crate::ModulePath ;



/// Maps the [`ModulePath`] a plugin was requested from to the module it produced.
///
/// An entry is never removed. It may be overwritten when two callers race to load
/// the same path; the last writer wins and both handles stay valid.
#[derive( Debug, Clone )]
pub struct LoadedModuleCache<Module> {
	modules: HashMap<ModulePath, Module>,
}

impl<Module> Default for LoadedModuleCache<Module> {
	fn default() -> Self { Self { modules: HashMap::new() } }
}

impl<Module: Clone> LoadedModuleCache<Module> {

	pub fn new() -> Self { Self::default() }

	pub fn get( &self, path: &ModulePath ) -> Option<Module> {
		self.modules.get( path ).cloned()
	}

	/// Stores `module` for `path`, returning the handle it replaced if there was one.
	pub fn insert( &mut self, path: ModulePath, module: Module ) -> Option<Module> {
		self.modules.insert( path, module )
	}

	pub fn contains( &self, path: &ModulePath ) -> bool { self.modules.contains_key( path ) }
	pub fn len( &self ) -> usize { self.modules.len() }
	pub fn is_empty( &self ) -> bool { self.modules.is_empty() }

}
