//! Per-plugin resolution namespaces.
//!
//! Every plugin loaded through a [`PluginLoader`] gets an [`IsolationContext`].
//! Each dependency request made while loading that plugin (including the request
//! for the plugin itself) is answered by the context's resolution rules:
//!
//! 1. Names on the shared contract allow-list come from the host context.
//! 2. A dependency listed in the plugin's own manifest is loaded from that path.
//! 3. Otherwise the registry is consulted for the name:
//! 	- never registered: the host context answers,
//! 	- registered at the co-located candidate `<plugin dir>/<name>.<ext>`: that file is loaded,
//! 	- registered elsewhere: an exact identity match is loaded if there is one,
//! 		otherwise the highest version (ties go to the lexicographically smallest path).
//! 4. Nothing matched: [`LoadError::MissingDependency`].
//!
//! Native libraries follow a shorter list (manifest, then a registered co-located
//! file) and are never delegated to the host.
//!
//! Simple names are compared case-insensitively, registered paths are not. The
//! co-located candidate is spelled from the requested name and must equal a
//! registered path exactly: with only `json.wasm` registered, a request for `Json`
//! skips the co-located rule and is answered by the identity scan.

use std::collections::BTreeSet ;
use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use itertools::Itertools ;
use tracing::{ debug, trace, warn };

use crate::{ DependencyManifest, DependencyResolver, LoadError, ModuleIdentity, ModulePath, ModuleRuntime, PluginLoader, SimpleName };



/// A plugin's private resolution namespace.
///
/// Created lazily the first time its plugin is loaded, keyed by the plugin's exact
/// path, and kept for as long as the owning [`PluginLoader`] lives.
pub struct IsolationContext {
	owner: ModulePath,
	manifest: Option<Arc<dyn DependencyManifest>>,
}

impl IsolationContext {

	pub(crate) fn new( owner: ModulePath, manifest: Option<Arc<dyn DependencyManifest>> ) -> Self {
		Self { owner, manifest }
	}

	/// The plugin this context belongs to.
	#[inline] pub fn owner( &self ) -> &ModulePath { &self.owner }

	/// The directory co-located candidates are looked for in.
	#[inline] pub fn directory( &self ) -> &Path { self.owner.directory() }

	#[inline] pub fn has_manifest( &self ) -> bool { self.manifest.is_some() }

	/// `<directory>/<name>.<extension>`, if that forms a valid module path.
	pub fn co_located_candidate( &self, name: &SimpleName, extension: &str ) -> Option<ModulePath> {
		let file_name = match extension.is_empty() {
			true => name.as_str().to_string(),
			false => format!( "{}.{}", name, extension ),
		};
		ModulePath::try_new( self.directory().join( file_name )).ok()
	}

	fn manifest_module( &self, name: &SimpleName ) -> Option<ModulePath> {
		let path = self.manifest.as_ref()?.resolve_module( name )?;
		self.manifest_path( name, path )
	}

	fn manifest_native( &self, name: &SimpleName ) -> Option<ModulePath> {
		let path = self.manifest.as_ref()?.resolve_native( name )?;
		self.manifest_path( name, path )
	}

	fn manifest_path( &self, name: &SimpleName, path: PathBuf ) -> Option<ModulePath> {
		match ModulePath::try_new( self.directory().join( path )) {
			Ok( path ) => Some( path ),
			Err( err ) => {
				warn!( plugin = %self.owner, %name, %err, "ignoring unusable manifest entry" );
				None
			}
		}
	}

}

impl std::fmt::Debug for IsolationContext {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "IsolationContext" )
			.field( "owner", &self.owner )
			.field( "manifest", &self.manifest.as_ref().map(| _ | "<manifest>" ))
			.finish()
	}
}

/// Outcome of the managed resolution rules, before anything is loaded.
#[derive( Debug, Clone, PartialEq, Eq )]
enum Decision {
	Host,
	Load( ModulePath ),
	Missing,
}

/// Answers dependency requests on behalf of one [`IsolationContext`].
///
/// A new resolver is chained onto the previous one for every module being loaded,
/// so the chain holds the identities currently in flight and cycles can be caught.
pub(crate) struct ContextResolver<'a, R: ModuleRuntime> {
	loader: &'a PluginLoader<R>,
	context: &'a IsolationContext,
	loading: Option<&'a ModuleIdentity>,
	parent: Option<&'a ContextResolver<'a, R>>,
}

impl<'a, R: ModuleRuntime> ContextResolver<'a, R> {

	pub(crate) fn new( loader: &'a PluginLoader<R>, context: &'a IsolationContext ) -> Self {
		Self { loader, context, loading: None, parent: None }
	}

	fn in_flight( &self, identity: &ModuleIdentity ) -> bool {
		std::iter::successors( Some( self ), | resolver | resolver.parent )
			.any(| resolver | resolver.loading == Some( identity ))
	}

	fn decide( &self, identity: &ModuleIdentity ) -> Decision {

		let name = identity.name();
		let plugin = self.context.owner();

		if self.loader.shared_contracts().contains( name ) {
			debug!( %plugin, %identity, "shared contract, delegating to host" );
			return Decision::Host ;
		}

		if let Some( path ) = self.context.manifest_module( name ) {
			debug!( %plugin, %identity, %path, "resolved through plugin manifest" );
			return Decision::Load( path );
		}

		let Some( known ) = self.loader.lookup_paths( name ) else {
			debug!( %plugin, %identity, "unregistered name, delegating to host" );
			return Decision::Host ;
		};

		if let Some( candidate ) = self.context.co_located_candidate( name, self.loader.module_extension() )
			.filter(| candidate | known.contains( candidate ))
		{
			trace!( %plugin, %identity, path = %candidate, "co-located candidate is registered" );
			return Decision::Load( candidate );
		}

		self.select_registered( identity, known )

	}

	/// Picks among registered paths that aren't co-located with the plugin.
	fn select_registered( &self, identity: &ModuleIdentity, known: BTreeSet<ModulePath> ) -> Decision {

		let plugin = self.context.owner();
		let candidates = known.into_iter()
			.filter_map(| path | match self.loader.runtime().read_identity( &path ) {
				Ok( found ) => Some(( path, found )),
				Err( err ) => {
					warn!( %plugin, %path, %err, "skipping registered path with unreadable identity" );
					None
				}
			})
			.collect::<Vec<_>>();

		if let Some(( path, _ )) = candidates.iter().find(|( _, found )| found == identity ) {
			debug!( %plugin, %identity, %path, "exact identity match" );
			return Decision::Load( path.clone() );
		}

		// Candidates are in path order, so the first of the maxima is the smallest path.
		match candidates.into_iter()
			.max_set_by(|( _, a ), ( _, b )| a.version().cmp( b.version() ))
			.into_iter()
			.next()
		{
			Some(( path, found )) => {
				warn!( %plugin, requested = %identity, selected = %found, %path, "no exact match, falling back to highest version" );
				Decision::Load( path )
			}
			None => Decision::Missing,
		}

	}

	fn resolve_uncached( &self, identity: &ModuleIdentity ) -> Result<R::Module, LoadError<R::Error>> {
		match self.decide( identity ) {
			Decision::Host => self.loader.host().load( identity ),
			Decision::Load( path ) => {
				let nested = ContextResolver {
					loader: self.loader,
					context: self.context,
					loading: Some( identity ),
					parent: Some( self ),
				};
				self.loader.load_direct( &path, &nested )
			}
			Decision::Missing => Err( LoadError::MissingDependency {
				identity: identity.clone(),
				plugin: self.context.owner().to_path_buf(),
			}),
		}
	}

	fn locate_native( &self, name: &SimpleName ) -> Option<ModulePath> {

		let plugin = self.context.owner();

		if let Some( path ) = self.context.manifest_native( name ) {
			debug!( %plugin, %name, %path, "native library resolved through plugin manifest" );
			return Some( path );
		}

		let candidate = self.context.co_located_candidate( name, self.loader.native_extension() )?;
		match self.loader.is_registered( &candidate ) {
			true => {
				trace!( %plugin, %name, path = %candidate, "co-located native library is registered" );
				Some( candidate )
			}
			false => {
				debug!( %plugin, %name, "native library not found" );
				None
			}
		}

	}

}

impl<R: ModuleRuntime> DependencyResolver<R> for ContextResolver<'_, R> {

	fn requester( &self ) -> &Path { self.context.owner() }

	fn resolve_module( &self, identity: &ModuleIdentity ) -> Result<R::Module, LoadError<R::Error>> {

		if self.in_flight( identity ) { return Err( LoadError::DependencyCycle( identity.clone() )) }

		let owner = self.context.owner();
		if let Some( module ) = self.loader.resolved_module( owner, identity ) {
			trace!( plugin = %owner, %identity, "dependency already resolved in this context" );
			return Ok( module );
		}

		let module = self.resolve_uncached( identity )?;
		Ok( self.loader.record_resolved_module( owner, identity, module ))

	}

	fn resolve_native( &self, name: &str ) -> Result<Option<R::Library>, LoadError<R::Error>> {

		let name = SimpleName::new( name );
		let owner = self.context.owner();
		if let Some( library ) = self.loader.resolved_native( owner, &name ) { return Ok( library ) }

		let library = self.locate_native( &name )
			.map(| path | self.loader.load_native_direct( &path ))
			.transpose()?;
		Ok( self.loader.record_resolved_native( owner, &name, library ))

	}

}
