//! The loader that owns the registry, the cache and every isolation context.

use std::collections::{ BTreeSet, HashMap };
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use tracing::{ debug, trace };

use crate::{
	DependencyManifest, DependencyResolver, HostContext, IsolationContext, KnownPathRegistry,
	LoadError, LoadedModuleCache, ManifestProvider, ModuleIdentity, ModulePath, ModuleRuntime,
	PathOverride, SharedContractAllowList, SimpleName,
};
use crate::isolation_context::ContextResolver ;



/// Everything guarded by the loader's single lock.
struct LoaderState<R: ModuleRuntime> {
	known_paths: KnownPathRegistry,
	cache: LoadedModuleCache<R::Module>,
	contexts: HashMap<ModulePath, Arc<IsolationContext>>,
	resolved_modules: HashMap<( ModulePath, ModuleIdentity ), R::Module>,
	resolved_natives: HashMap<( ModulePath, SimpleName ), Option<R::Library>>,
}

impl<R: ModuleRuntime> Default for LoaderState<R> {
	fn default() -> Self {
		Self {
			known_paths: KnownPathRegistry::new(),
			cache: LoadedModuleCache::new(),
			contexts: HashMap::new(),
			resolved_modules: HashMap::new(),
			resolved_natives: HashMap::new(),
		}
	}
}

/// Loads plugins into isolation contexts of their own while sharing a fixed set of
/// contract modules with the host.
///
/// Built once per host session. Register every location modules may be found at
/// with [`register`]( Self::register ), then [`load`]( Self::load ) plugins. Both may
/// be called from any number of threads.
///
/// # Concurrency
///
/// One mutex guards all bookkeeping (registry, cache, contexts and resolution
/// records). The runtime load itself runs outside it, so two threads missing the
/// cache for the same path at the same time both load the module and the last one
/// to finish overwrites the cache entry. Both callers receive a module with the
/// same identity; only one handle stays cached.
///
/// A dependency resolved for a plugin stays resolved: registering more paths later
/// does not change what that plugin already got.
///
/// # Example
///
/// ```
/// # use std::path::Path ;
/// # use wasm_isolate::{ PluginLoader, ModuleRuntime, DependencyResolver, HostContext, ModuleIdentity, LoadError };
/// # #[derive( Debug, thiserror::Error )] #[error( "unused" )] struct Never ;
/// # struct Runtime ;
/// # impl ModuleRuntime for Runtime {
/// # 	type Module = ModuleIdentity ;
/// # 	type Library = () ;
/// # 	type Error = Never ;
/// # 	fn read_identity( &self, path: &Path ) -> Result<ModuleIdentity, Never> {
/// # 		Ok( format!( "{}@1.0.0", path.file_stem().unwrap().to_str().unwrap() ).parse().unwrap() )
/// # 	}
/// # 	fn load_from_path( &self, path: &Path, _: &dyn DependencyResolver<Self> ) -> Result<ModuleIdentity, LoadError<Never>> {
/// # 		Ok( self.read_identity( path ).unwrap() )
/// # 	}
/// # 	fn load_native( &self, _: &Path ) -> Result<(), Never> { Ok(()) }
/// # }
/// # struct Host ;
/// # impl HostContext<Runtime> for Host {
/// # 	fn load( &self, identity: &ModuleIdentity ) -> Result<ModuleIdentity, LoadError<Never>> { Ok( identity.clone() ) }
/// # }
/// let loader = PluginLoader::new( Runtime, Host )
/// 	.with_shared_contracts([ "Analyzers.Contracts" ]);
///
/// loader.register( "/plugins/acme/Acme.Rules.wasm" );
/// loader.register( "/plugins/acme/Json.wasm" );
///
/// let plugin = loader.load( "/plugins/acme/Acme.Rules.wasm" )?;
/// assert_eq!( plugin.name().as_str(), "Acme.Rules" );
/// # Ok::<(), LoadError<Never>>(())
/// ```
pub struct PluginLoader<R: ModuleRuntime> {
	runtime: R,
	host: Box<dyn HostContext<R>>,
	shared_contracts: SharedContractAllowList,
	manifests: Option<Box<ManifestProvider>>,
	path_override: Option<Box<dyn PathOverride>>,
	module_extension: String,
	native_extension: String,
	state: Mutex<LoaderState<R>>,
}

impl<R: ModuleRuntime> PluginLoader<R> {

	/// Extension of managed module files, used to build co-located candidates.
	pub const DEFAULT_MODULE_EXTENSION: &'static str = "wasm" ;

	/// Creates a loader around a runtime and the host's own context.
	///
	/// Starts with an empty allow-list, no plugin manifests and no path override.
	pub fn new( runtime: R, host: impl HostContext<R> + 'static ) -> Self {
		Self {
			runtime,
			host: Box::new( host ),
			shared_contracts: SharedContractAllowList::default(),
			manifests: None,
			path_override: None,
			module_extension: Self::DEFAULT_MODULE_EXTENSION.to_string(),
			native_extension: std::env::consts::DLL_EXTENSION.to_string(),
			state: Mutex::new( LoaderState::default() ),
		}
	}

	/// Sets the module names that always resolve to the host's copy.
	pub fn with_shared_contracts( mut self, names: impl IntoIterator<Item = impl Into<SimpleName>> ) -> Self {
		self.shared_contracts = SharedContractAllowList::new( names );
		self
	}

	/// Sets how a plugin's private dependency manifest is found.
	///
	/// `provider` is called when a plugin's isolation context is created, without the
	/// loader's lock held, so it may call back into the loader. Two threads creating
	/// the same context at once may both call it; the first result is kept.
	pub fn with_manifests<F>( mut self, provider: F ) -> Self
	where
		F: Fn( &ModulePath ) -> Option<Arc<dyn DependencyManifest>> + Send + Sync + 'static,
	{
		self.manifests = Some( Box::new( provider ));
		self
	}

	/// Substitutes the path modules are physically loaded from, for example with a
	/// [`ShadowCopy`]( crate::ShadowCopy ).
	///
	/// Resolution decisions, the cache and the registry all keep using the original path.
	pub fn with_path_override( mut self, path_override: impl PathOverride + 'static ) -> Self {
		self.path_override = Some( Box::new( path_override ));
		self
	}

	/// Sets the managed module extension (without the dot). Defaults to `wasm`.
	pub fn with_module_extension( mut self, extension: impl Into<String> ) -> Self {
		self.module_extension = extension.into();
		self
	}

	/// Sets the native library extension (without the dot). Defaults to the platform's.
	pub fn with_native_extension( mut self, extension: impl Into<String> ) -> Self {
		self.native_extension = extension.into();
		self
	}

	/// Records that a module is available at `path`.
	///
	/// Returns `false` if the path was already registered.
	///
	/// # Panics
	/// Panics if `path` is not an absolute path to a file.
	pub fn register( &self, path: impl AsRef<Path> ) -> bool {
		let path = ModulePath::new( path.as_ref() );
		trace!( %path, "registering module location" );
		self.state().known_paths.register( path )
	}

	/// Every path registered under `name`, or `None` if none was.
	pub fn lookup_paths( &self, name: &SimpleName ) -> Option<BTreeSet<ModulePath>> {
		self.state().known_paths.lookup( name ).cloned()
	}

	pub fn is_registered( &self, path: &ModulePath ) -> bool {
		self.state().known_paths.contains( path )
	}

	/// Loads the plugin at `path` into its isolation context, or returns the module
	/// already loaded from that path.
	///
	/// The plugin's own identity goes through the same resolution rules as any
	/// dependency. Register `path` first for the plugin to be loaded from its own
	/// file; an unregistered plugin name is answered by the host context.
	///
	/// # Errors
	/// Fails if the plugin's identity can't be read, or if the plugin or any of its
	/// dependencies can't be resolved or loaded.
	///
	/// # Panics
	/// Panics if `path` is not an absolute path to a file.
	pub fn load( &self, path: impl AsRef<Path> ) -> Result<R::Module, LoadError<R::Error>> {

		let path = ModulePath::new( path.as_ref() );

		if let Some( module ) = self.state().cache.get( &path ) {
			trace!( %path, "plugin already loaded" );
			return Ok( module );
		}
		let context = self.context( &path );

		let identity = self.runtime.read_identity( &path )
			.map_err(| source | LoadError::MalformedModule { path: path.to_path_buf(), source })?;
		debug!( %path, %identity, "loading plugin" );

		let module = ContextResolver::new( self, &context ).resolve_module( &identity )?;

		if self.state().cache.insert( path.clone(), module.clone() ).is_some() {
			debug!( %path, "replaced a module loaded concurrently from the same path" );
		}
		Ok( module )

	}

	/// Resolves `identity` as if `plugin` had requested it while loading.
	///
	/// # Errors
	/// Fails if the dependency can't be resolved or loaded.
	///
	/// # Panics
	/// Panics if `plugin` is not an absolute path to a file.
	pub fn resolve_dependency(
		&self,
		plugin: impl AsRef<Path>,
		identity: &ModuleIdentity,
	) -> Result<R::Module, LoadError<R::Error>> {
		let context = self.context( &ModulePath::new( plugin.as_ref() ));
		ContextResolver::new( self, &context ).resolve_module( identity )
	}

	/// Resolves the native library `name` as if `plugin` had requested it.
	/// Returns `Ok( None )` if it isn't found.
	///
	/// # Errors
	/// Fails if a library was found but couldn't be loaded.
	///
	/// # Panics
	/// Panics if `plugin` is not an absolute path to a file.
	pub fn resolve_native(
		&self,
		plugin: impl AsRef<Path>,
		name: &str,
	) -> Result<Option<R::Library>, LoadError<R::Error>> {
		let context = self.context( &ModulePath::new( plugin.as_ref() ));
		ContextResolver::new( self, &context ).resolve_native( name )
	}

	/// The module cached for `path`, if it finished loading.
	pub fn cached( &self, path: &ModulePath ) -> Option<R::Module> {
		self.state().cache.get( path )
	}

	/// Number of plugins in the cache.
	pub fn cached_count( &self ) -> usize { self.state().cache.len() }

	/// Number of isolation contexts created so far.
	pub fn context_count( &self ) -> usize { self.state().contexts.len() }

	#[inline] pub fn runtime( &self ) -> &R { &self.runtime }
	#[inline] pub fn shared_contracts( &self ) -> &SharedContractAllowList { &self.shared_contracts }
	#[inline] pub fn module_extension( &self ) -> &str { &self.module_extension }
	#[inline] pub fn native_extension( &self ) -> &str { &self.native_extension }
	#[inline] pub(crate) fn host( &self ) -> &dyn HostContext<R> { &*self.host }

	fn state( &self ) -> MutexGuard<'_, LoaderState<R>> {
		// Bookkeeping only ever grows, so a panic mid-update leaves nothing to repair.
		self.state.lock().unwrap_or_else( PoisonError::into_inner )
	}

	fn context( &self, plugin: &ModulePath ) -> Arc<IsolationContext> {

		if let Some( context ) = self.state().contexts.get( plugin ) { return Arc::clone( context ) }

		// Unlocked, the provider may call back into the loader.
		let manifest = self.manifests.as_ref().and_then(| provider | provider( plugin ));

		self.state().contexts.entry( plugin.clone() )
			.or_insert_with(|| {
				debug!( %plugin, manifest = manifest.is_some(), "creating isolation context" );
				Arc::new( IsolationContext::new( plugin.clone(), manifest ))
			})
			.clone()

	}

	fn path_to_load( &self, path: &ModulePath ) -> Result<PathBuf, LoadError<R::Error>> {
		match &self.path_override {
			Some( path_override ) => path_override.path_to_load( path )
				.map_err(| source | LoadError::PathOverride { path: path.to_path_buf(), source }),
			None => Ok( path.to_path_buf() ),
		}
	}

	pub(crate) fn load_direct(
		&self,
		path: &ModulePath,
		dependencies: &dyn DependencyResolver<R>,
	) -> Result<R::Module, LoadError<R::Error>> {
		let target = self.path_to_load( path )?;
		self.runtime.load_from_path( &target, dependencies )
	}

	pub(crate) fn load_native_direct( &self, path: &ModulePath ) -> Result<R::Library, LoadError<R::Error>> {
		let target = self.path_to_load( path )?;
		self.runtime.load_native( &target )
			.map_err(| source | LoadError::Runtime { path: target, source })
	}

	pub(crate) fn resolved_module( &self, plugin: &ModulePath, identity: &ModuleIdentity ) -> Option<R::Module> {
		self.state().resolved_modules.get( &( plugin.clone(), identity.clone() )).cloned()
	}

	/// Keeps the first module recorded for this plugin and identity and returns it.
	pub(crate) fn record_resolved_module( &self, plugin: &ModulePath, identity: &ModuleIdentity, module: R::Module ) -> R::Module {
		self.state().resolved_modules
			.entry(( plugin.clone(), identity.clone() ))
			.or_insert( module )
			.clone()
	}

	pub(crate) fn resolved_native( &self, plugin: &ModulePath, name: &SimpleName ) -> Option<Option<R::Library>> {
		self.state().resolved_natives.get( &( plugin.clone(), name.clone() )).cloned()
	}

	pub(crate) fn record_resolved_native( &self, plugin: &ModulePath, name: &SimpleName, library: Option<R::Library> ) -> Option<R::Library> {
		self.state().resolved_natives
			.entry(( plugin.clone(), name.clone() ))
			.or_insert( library )
			.clone()
	}

}

impl<R: ModuleRuntime + std::fmt::Debug> std::fmt::Debug for PluginLoader<R> {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "PluginLoader" )
			.field( "runtime", &self.runtime )
			.field( "shared_contracts", &self.shared_contracts )
			.field( "module_extension", &self.module_extension )
			.field( "native_extension", &self.native_extension )
			.field( "manifests", &self.manifests.as_ref().map(| _ | "<closure>" ))
			.field( "path_override", &self.path_override.as_ref().map(| _ | "<override>" ))
			.finish_non_exhaustive()
	}
}
