//! Interfaces to the pieces the loader drives but does not implement: the module
//! loading primitive, the identity reader and the host's own context.

use std::path::Path ;

use crate::{ LoadError, ModuleIdentity };



/// The module-loading primitive of a host runtime.
///
/// Implementors turn files into loaded modules. While loading a managed module
/// they must ask the supplied [`DependencyResolver`] for every dependency the
/// module declares, so each request goes through the requesting plugin's isolation
/// context.
pub trait ModuleRuntime: Send + Sync {
	/// Handle to a loaded managed module. Only identity matters to the loader.
	type Module: Clone + Send + Sync + 'static ;
	/// Handle to a loaded native library.
	type Library: Clone + Send + Sync + 'static ;
	type Error: std::error::Error + Send + Sync + 'static ;

	/// Reads a module's identity without fully loading it.
	///
	/// # Errors
	/// Fails if the file can't be read or carries no identity.
	fn read_identity( &self, path: &Path ) -> Result<ModuleIdentity, Self::Error> ;

	/// Loads the module at `path`, resolving its dependencies through `dependencies`.
	///
	/// # Errors
	/// Runtime failures should be wrapped in [`LoadError::Runtime`]; errors from
	/// `dependencies` are returned unchanged.
	fn load_from_path(
		&self,
		path: &Path,
		dependencies: &dyn DependencyResolver<Self>,
	) -> Result<Self::Module, LoadError<Self::Error>> ;

	/// Loads the native library at `path`.
	///
	/// # Errors
	/// Fails if the library can't be opened.
	fn load_native( &self, path: &Path ) -> Result<Self::Library, Self::Error> ;
}

/// Answers dependency requests made while a module is being loaded.
///
/// Handed to [`ModuleRuntime::load_from_path`] by the loader. Managed requests are
/// resolved by the requesting plugin's isolation context; native requests never
/// fall back to the host.
pub trait DependencyResolver<R: ModuleRuntime + ?Sized> {

	/// The plugin whose isolation context answers these requests.
	fn requester( &self ) -> &Path ;

	/// Resolves a managed dependency.
	///
	/// # Errors
	/// Fails if the dependency can't be found or loaded.
	fn resolve_module( &self, identity: &ModuleIdentity ) -> Result<R::Module, LoadError<R::Error>> ;

	/// Resolves a native library, returning `Ok( None )` if it isn't found.
	///
	/// # Errors
	/// Fails if a library was found but couldn't be loaded.
	fn resolve_native( &self, name: &str ) -> Result<Option<R::Library>, LoadError<R::Error>> ;

	/// Like [`resolve_native`]( Self::resolve_native ), treating "not found" as an error.
	///
	/// # Errors
	/// Returns [`LoadError::MissingNativeLibrary`] if the library isn't found.
	fn require_native( &self, name: &str ) -> Result<R::Library, LoadError<R::Error>> {
		self.resolve_native( name )?.ok_or_else(|| LoadError::MissingNativeLibrary {
			name: name.to_string(),
			plugin: self.requester().to_path_buf(),
		})
	}

}

/// The context the host and its own dependencies were loaded into.
///
/// Shared contracts and unregistered names are delegated here so host and plugin
/// observe one instance of them.
pub trait HostContext<R: ModuleRuntime + ?Sized>: Send + Sync {
	/// Returns the host's copy of the module identified by `identity`.
	///
	/// # Errors
	/// Returns [`LoadError::NotInHost`] if the host has no such module.
	fn load( &self, identity: &ModuleIdentity ) -> Result<R::Module, LoadError<R::Error>> ;
}

impl<R, H> HostContext<R> for std::sync::Arc<H>
where
	R: ModuleRuntime + ?Sized,
	H: HostContext<R> + ?Sized,
{
	fn load( &self, identity: &ModuleIdentity ) -> Result<R::Module, LoadError<R::Error>> {
		( **self ).load( identity )
	}
}
