//! Per-plugin dependency manifests.
//!
//! A plugin may ship a manifest naming the exact files its dependencies live in.
//! Reading that manifest's on-disk format is left to the host; the loader only
//! asks it questions through [`DependencyManifest`].

use std::collections::HashMap ;
use std::path::PathBuf ;
use std::sync::Arc ;

use crate::{ ModulePath, SimpleName };



/// A plugin's own declaration of where its dependencies live.
///
/// Paths returned here are trusted: the plugin named them as part of its
/// dependency closure. Relative paths are taken relative to the plugin's directory.
pub trait DependencyManifest: Send + Sync {
	/// Location of the managed module `name`, if the manifest lists one.
	fn resolve_module( &self, name: &SimpleName ) -> Option<PathBuf> ;
	/// Location of the native library `name`, if the manifest lists one.
	fn resolve_native( &self, name: &SimpleName ) -> Option<PathBuf> ;
}

/// Picks the manifest for a plugin, called once when its isolation context is created.
pub type ManifestProvider = dyn Fn( &ModulePath ) -> Option<Arc<dyn DependencyManifest>> + Send + Sync ;

/// A manifest held in memory, for hosts that already parsed theirs.
///
/// ```
/// use wasm_isolate::{ StaticManifest, DependencyManifest, SimpleName };
///
/// let manifest = StaticManifest::new()
/// 	.with_module( "Json", "/plugins/acme/deps/Json.wasm" )
/// 	.with_native( "zstd", "/plugins/acme/native/libzstd.so" );
///
/// assert!( manifest.resolve_module( &SimpleName::new( "json" )).is_some() );
/// assert!( manifest.resolve_native( &SimpleName::new( "lz4" )).is_none() );
/// ```
#[derive( Debug, Default, Clone )]
pub struct StaticManifest {
	modules: HashMap<SimpleName, PathBuf>,
	natives: HashMap<SimpleName, PathBuf>,
}

impl StaticManifest {

	pub fn new() -> Self { Self::default() }

	pub fn with_module( mut self, name: impl Into<SimpleName>, path: impl Into<PathBuf> ) -> Self {
		self.modules.insert( name.into(), path.into() );
		self
	}

	pub fn with_native( mut self, name: impl Into<SimpleName>, path: impl Into<PathBuf> ) -> Self {
		self.natives.insert( name.into(), path.into() );
		self
	}

}

impl DependencyManifest for StaticManifest {
	fn resolve_module( &self, name: &SimpleName ) -> Option<PathBuf> { self.modules.get( name ).cloned() }
	fn resolve_native( &self, name: &SimpleName ) -> Option<PathBuf> { self.natives.get( name ).cloned() }
}
