//! An isolating plugin loader.
//!
//! Third-party plugins are loaded into the host process each inside an isolation
//! context of its own, so a plugin's private dependencies never collide with the
//! host's or with another plugin's. A fixed set of **shared contract** modules is
//! the exception: those always resolve to the host's own copy, since host and plugin
//! have to agree on those types bit-for-bit for calls across the boundary to work.
//!
//! # Core Concepts
//!
//! - [`PluginLoader`]: Owns the registry of known module locations, the cache of
//! 	loaded plugins and one [`IsolationContext`] per plugin. Safe to share between
//! 	threads.
//!
//! - [`ModulePath`]: An absolute path to a module file, the key of every lookup.
//! 	Relative paths are rejected with a panic rather than normalised.
//!
//! - [`SimpleName`] and [`ModuleIdentity`]: A module's case-insensitive name and its
//! 	full `name@version[/signing-key]` identity.
//!
//! - [`ModuleRuntime`] and [`HostContext`]: What actually turns files into modules,
//! 	and the context the host itself lives in. [`WasmRuntime`] and [`WasmHostContext`]
//! 	implement them for WebAssembly components.
//!
//! - [`DependencyManifest`]: An optional per-plugin list of exact dependency locations.
//!
//! - [`PathOverride`]: Substitutes the file a resolved module is loaded from;
//! 	[`ShadowCopy`] loads private copies so the originals stay unlocked.
//!
//! # Resolution
//!
//! Every module a plugin asks for, itself included, is resolved by the plugin's
//! context in this order, first match wins:
//!
//! 1. A shared contract comes from the host context.
//! 2. A dependency listed in the plugin's manifest is loaded from there.
//! 3. A name that was never [`register`]( PluginLoader::register )ed comes from the
//! 	host context.
//! 4. If `<plugin dir>/<name>.wasm` is registered, it is loaded.
//! 5. Otherwise the registered path whose identity matches exactly is loaded, or,
//! 	failing that, the one with the highest version.
//!
//! Native libraries only go through the manifest and the co-located file, and are
//! never taken from the host. See [`isolation_context`] for the details.
//!
//! # Example
//!
//! ```no_run
//! use wasm_isolate::{ PluginLoader, WasmRuntime, WasmHostContext, Engine };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = WasmRuntime::new( Engine::default() );
//!
//! // The host's own copy of the contract every plugin is written against.
//! let mut host = WasmHostContext::new();
//! host.load_module( &runtime, "/opt/host/Analyzers.Contracts.wasm" )?;
//!
//! let loader = PluginLoader::new( runtime, host )
//! 	.with_shared_contracts([ "Analyzers.Contracts" ]);
//!
//! // Tell the loader about every module file it may come across.
//! loader.register( "/opt/plugins/acme/Acme.Rules.wasm" );
//! loader.register( "/opt/plugins/acme/Json.wasm" );
//! loader.register( "/opt/plugins/contoso/Contoso.Rules.wasm" );
//! loader.register( "/opt/plugins/contoso/Json.wasm" );
//!
//! // Each plugin gets the `Json` next to it, and both share the host's contracts.
//! let acme = loader.load( "/opt/plugins/acme/Acme.Rules.wasm" )?;
//! let contoso = loader.load( "/opt/plugins/contoso/Contoso.Rules.wasm" )?;
//! # let _ = ( acme, contoso );
//! # Ok(())
//! # }
//! ```

mod module_path ;
mod identity ;
mod known_paths ;
mod module_cache ;
mod shared_contracts ;
mod manifest ;
mod runtime ;
mod load_error ;
mod path_override ;
pub mod isolation_context ;
mod plugin_loader ;
pub mod wasm_runtime ;

#[doc( no_inline )]
pub use wasmtime::Engine ;

pub use module_path::{ ModulePath, ModulePathError, SimpleName };
pub use identity::{ ModuleIdentity, IdentityParseError };
pub use known_paths::KnownPathRegistry ;
pub use module_cache::LoadedModuleCache ;
pub use shared_contracts::SharedContractAllowList ;
pub use manifest::{ DependencyManifest, ManifestProvider, StaticManifest };
pub use runtime::{ ModuleRuntime, DependencyResolver, HostContext };
pub use load_error::LoadError ;
pub use path_override::{ PathOverride, ShadowCopy };
pub use isolation_context::IsolationContext ;
pub use plugin_loader::PluginLoader ;
pub use wasm_runtime::{ WasmRuntime, WasmHostContext, WasmModule, WasmRuntimeError, NativeLibrary };
