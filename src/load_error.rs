use std::path::PathBuf ;
use thiserror::Error ;

use crate::ModuleIdentity ;



/// Errors that can occur while loading a plugin or resolving one of its dependencies.
///
/// `E` is the error type of the [`ModuleRuntime`]( crate::ModuleRuntime ) doing the
/// actual loading. Failures are per dependency: an unresolved dependency fails the
/// plugin that needed it and leaves every other plugin's cached state untouched.
///
/// Passing a relative path to the loader is not reported here; it panics.
#[derive( Error, Debug )]
pub enum LoadError<E: std::error::Error + 'static> {

	/// The runtime rejected the module at `path`.
	#[error( "Failed to load '{}': {source}", path.display() )]
	Runtime { path: PathBuf, #[source] source: E },

	/// The identity of the module at `path` could not be read.
	#[error( "Malformed module '{}': {source}", path.display() )]
	MalformedModule { path: PathBuf, #[source] source: E },

	/// No rule produced a module for a dependency of `plugin`.
	#[error( "Unresolved dependency {identity} of plugin '{}'", plugin.display() )]
	MissingDependency { identity: ModuleIdentity, plugin: PathBuf },

	/// A native library required by `plugin` was not found.
	#[error( "Unresolved native library '{name}' of plugin '{}'", plugin.display() )]
	MissingNativeLibrary { name: String, plugin: PathBuf },

	/// The host context does not provide the requested module.
	#[error( "Module {0} is not available in the host context" )]
	NotInHost( ModuleIdentity ),

	/// A module depends on itself, directly or transitively, within one plugin's context.
	#[error( "Dependency cycle detected resolving {0}" )]
	DependencyCycle( ModuleIdentity ),

	/// The path override failed to produce a path to load from.
	#[error( "Failed to prepare '{}' for loading: {source}", path.display() )]
	PathOverride { path: PathBuf, #[source] source: std::io::Error },

}
