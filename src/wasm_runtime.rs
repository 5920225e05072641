//! A [`ModuleRuntime`] for WebAssembly components.
//!
//! Components are compiled with wasmtime. A component describes itself through
//! custom sections (see [`custom_sections`]): its own identity, the managed
//! modules it depends on and the native libraries it needs. Native libraries are
//! opened with `libloading`.

use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use pipe_trait::Pipe ;
use thiserror::Error ;
use wasmtime::Engine ;
use wasmtime::component::Component ;

use crate::{ DependencyResolver, IdentityParseError, LoadError, ModuleIdentity, ModuleRuntime };

pub mod custom_sections ;
mod host_context ;

pub use custom_sections::ModuleSections ;
pub use host_context::WasmHostContext ;



/// Errors raised by [`WasmRuntime`] itself, as opposed to resolution failures.
#[derive( Error, Debug )]
pub enum WasmRuntimeError {
	#[error( "Io Error: {0}" )] Io( #[from] std::io::Error ),
	#[error( "Wasm Parser Error: {0}" )] Parse( #[from] wasmparser::BinaryReaderError ),
	#[error( "Custom section '{0}' is not valid UTF-8" )] InvalidUtf8( &'static str ),
	#[error( "Missing custom section '{0}'" )] MissingIdentity( &'static str ),
	#[error( "Identity Error: {0}" )] Identity( #[from] IdentityParseError ),
	/// Wasmtime failed to compile the component.
	#[error( "Failed to compile component: {0}" )] Compile( wasmtime::Error ),
	#[error( "Native Library Error: {0}" )] Native( #[from] libloading::Error ),
}

/// A compiled component together with everything it was linked against.
pub struct WasmModule {
	identity: ModuleIdentity,
	source: PathBuf,
	component: Component,
	dependencies: Vec<Arc<WasmModule>>,
	native_libraries: Vec<NativeLibrary>,
}

impl WasmModule {

	#[inline] pub fn identity( &self ) -> &ModuleIdentity { &self.identity }

	/// The file the component was compiled from (after any path override).
	#[inline] pub fn source( &self ) -> &Path { &self.source }

	#[inline] pub fn component( &self ) -> &Component { &self.component }

	/// Managed dependencies in declaration order.
	#[inline] pub fn dependencies( &self ) -> &[Arc<WasmModule>] { &self.dependencies }

	/// Native libraries in declaration order.
	#[inline] pub fn native_libraries( &self ) -> &[NativeLibrary] { &self.native_libraries }

}

impl std::fmt::Debug for WasmModule {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "WasmModule" )
			.field( "identity", &self.identity )
			.field( "source", &self.source )
			.field( "component", &"<Component>" )
			.field( "dependencies", &self.dependencies.iter().map(| module | module.identity() ).collect::<Vec<_>>() )
			.field( "native_libraries", &self.native_libraries )
			.finish()
	}
}

/// An opened native library.
#[derive( Clone )]
pub struct NativeLibrary {
	path: PathBuf,
	library: Arc<libloading::Library>,
}

impl NativeLibrary {
	#[inline] pub fn path( &self ) -> &Path { &self.path }
	#[inline] pub fn library( &self ) -> &libloading::Library { &self.library }
}

impl std::fmt::Debug for NativeLibrary {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "NativeLibrary" ).field( "path", &self.path ).finish_non_exhaustive()
	}
}

/// Loads components with a wasmtime [`Engine`].
#[derive( Clone, Default )]
pub struct WasmRuntime {
	engine: Engine,
}

impl WasmRuntime {

	pub fn new( engine: Engine ) -> Self { Self { engine }}

	#[inline] pub fn engine( &self ) -> &Engine { &self.engine }

	/// Reads and compiles a component, resolving what it declares through `dependencies`.
	pub(crate) fn load_component(
		&self,
		path: &Path,
		dependencies: &dyn DependencyResolver<Self>,
	) -> Result<Arc<WasmModule>, LoadError<WasmRuntimeError>> {

		let runtime_error = | source: WasmRuntimeError | LoadError::Runtime { path: path.to_path_buf(), source };

		let bytes = std::fs::read( path ).map_err(| err | runtime_error( err.into() ))?;
		let sections = ModuleSections::parse( &bytes ).map_err( runtime_error )?;
		let identity = sections.identity().map_err( runtime_error )?.clone();

		let resolved = sections.dependencies.iter()
			.map(| dependency | dependencies.resolve_module( dependency ))
			.collect::<Result<Vec<_>, _>>()?;
		let native_libraries = sections.native_libraries.iter()
			.map(| name | dependencies.require_native( name ))
			.collect::<Result<Vec<_>, _>>()?;

		let component = Component::from_binary( &self.engine, &bytes )
			.map_err(| err | runtime_error( WasmRuntimeError::Compile( err )))?;

		Ok( Arc::new( WasmModule {
			identity,
			source: path.to_path_buf(),
			component,
			dependencies: resolved,
			native_libraries,
		}))

	}

}

impl std::fmt::Debug for WasmRuntime {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "WasmRuntime" ).finish_non_exhaustive()
	}
}

impl ModuleRuntime for WasmRuntime {
	type Module = Arc<WasmModule> ;
	type Library = NativeLibrary ;
	type Error = WasmRuntimeError ;

	fn read_identity( &self, path: &Path ) -> Result<ModuleIdentity, WasmRuntimeError> {
		std::fs::read( path )?
			.pipe_as_ref( ModuleSections::parse )?
			.identity()
			.cloned()
	}

	fn load_from_path(
		&self,
		path: &Path,
		dependencies: &dyn DependencyResolver<Self>,
	) -> Result<Arc<WasmModule>, LoadError<WasmRuntimeError>> {
		self.load_component( path, dependencies )
	}

	fn load_native( &self, path: &Path ) -> Result<NativeLibrary, WasmRuntimeError> {
		// SAFETY: opening a library runs its initialisers. The host chose to trust
		// the plugin and every library it declares when it registered them.
		let library = unsafe { libloading::Library::new( path )? };
		Ok( NativeLibrary { path: path.to_path_buf(), library: Arc::new( library ) })
	}
}
