use std::collections::HashMap ;
use std::path::{ Path, PathBuf };
use std::sync::Arc ;

use crate::{ DependencyResolver, HostContext, LoadError, ModuleIdentity, ModuleRuntime, SimpleName };
use super::{ NativeLibrary, WasmModule, WasmRuntime, WasmRuntimeError };



/// The components the host itself was built from.
///
/// Shared contracts and unregistered names are answered from here. Lookup is by
/// simple name: the host's copy is returned whatever version was requested.
#[derive( Debug, Default, Clone )]
pub struct WasmHostContext {
	modules: HashMap<SimpleName, Arc<WasmModule>>,
}

impl WasmHostContext {

	pub fn new() -> Self { Self::default() }

	/// Adds an already loaded component.
	pub fn with_module( mut self, module: Arc<WasmModule> ) -> Self {
		self.modules.insert( module.identity().name().clone(), module );
		self
	}

	/// Loads a component into the host context.
	///
	/// Its managed dependencies must already be in the host context. Native
	/// libraries are looked for next to the component.
	///
	/// # Errors
	/// Fails if the component can't be loaded or one of its dependencies is missing.
	pub fn load_module(
		&mut self,
		runtime: &WasmRuntime,
		path: impl AsRef<Path>,
	) -> Result<Arc<WasmModule>, LoadError<WasmRuntimeError>> {
		let path = path.as_ref();
		let module = runtime.load_component( path, &HostResolver { host: self, runtime, path })?;
		self.modules.insert( module.identity().name().clone(), Arc::clone( &module ));
		Ok( module )
	}

	pub fn get( &self, name: &SimpleName ) -> Option<&Arc<WasmModule>> { self.modules.get( name ) }

}

impl HostContext<WasmRuntime> for WasmHostContext {
	fn load( &self, identity: &ModuleIdentity ) -> Result<Arc<WasmModule>, LoadError<WasmRuntimeError>> {
		self.modules.get( identity.name() )
			.cloned()
			.ok_or_else(|| LoadError::NotInHost( identity.clone() ))
	}
}

/// Resolves a host component's dependencies from the host context itself.
struct HostResolver<'a> {
	host: &'a WasmHostContext,
	runtime: &'a WasmRuntime,
	path: &'a Path,
}

impl DependencyResolver<WasmRuntime> for HostResolver<'_> {

	fn requester( &self ) -> &Path { self.path }

	fn resolve_module( &self, identity: &ModuleIdentity ) -> Result<Arc<WasmModule>, LoadError<WasmRuntimeError>> {
		self.host.load( identity )
	}

	fn resolve_native( &self, name: &str ) -> Result<Option<NativeLibrary>, LoadError<WasmRuntimeError>> {
		let candidate: PathBuf = self.path.with_file_name( format!( "{}.{}", name, std::env::consts::DLL_EXTENSION ));
		if !candidate.is_file() { return Ok( None ) }
		self.runtime.load_native( &candidate )
			.map( Some )
			.map_err(| source | LoadError::Runtime { path: candidate, source })
	}

}
