//! Substitution of the path a module is physically loaded from.
//!
//! Every resolution decision is made on the original path. Only the final call
//! into the runtime sees the substituted one.

use std::collections::HashMap ;
use std::path::{ Path, PathBuf };
use std::sync::Mutex ;
use tempfile::TempDir ;

use crate::ModulePath ;



/// Chooses the file a resolved module is actually loaded from.
///
/// Implemented for any `Fn( &ModulePath ) -> PathBuf` closure:
///
/// ```
/// use std::path::PathBuf ;
/// use wasm_isolate::{ ModulePath, PathOverride };
///
/// let staged = | path: &ModulePath | PathBuf::from( "/staging" ).join( path.file_name().unwrap() );
/// let target = staged.path_to_load( &ModulePath::new( "/plugins/Foo.wasm" )).unwrap();
/// assert_eq!( target, PathBuf::from( "/staging/Foo.wasm" ));
/// ```
pub trait PathOverride: Send + Sync {
	/// Returns the path to load `path` from.
	///
	/// # Errors
	/// Fails if the substitute could not be prepared.
	fn path_to_load( &self, path: &ModulePath ) -> std::io::Result<PathBuf> ;
}

impl<F> PathOverride for F
where
	F: Fn( &ModulePath ) -> PathBuf + Send + Sync,
{
	fn path_to_load( &self, path: &ModulePath ) -> std::io::Result<PathBuf> { Ok( self( path )) }
}

/// Loads private copies of modules instead of the originals, so the files a
/// host registered stay unlocked and can be replaced on disk while loaded.
///
/// Each source path is copied once into its own numbered sub-directory of a
/// temporary directory, keeping the file name intact and keeping same-named files
/// from different directories apart. The directory and every copy in it are
/// deleted when the `ShadowCopy` is dropped, so it must outlive anything loaded
/// from it.
#[derive( Debug )]
pub struct ShadowCopy {
	root: TempDir,
	copies: Mutex<HashMap<ModulePath, PathBuf>>,
}

impl ShadowCopy {

	const PREFIX: &str = "wasm-isolate-" ;

	/// Creates the shadow directory inside the system temporary directory.
	///
	/// # Errors
	/// Fails if the directory can't be created.
	pub fn new() -> std::io::Result<Self> {
		Ok( Self::with_root( tempfile::Builder::new().prefix( Self::PREFIX ).tempdir()? ))
	}

	/// Creates the shadow directory inside `parent`.
	///
	/// # Errors
	/// Fails if the directory can't be created.
	pub fn new_in( parent: impl AsRef<Path> ) -> std::io::Result<Self> {
		Ok( Self::with_root( tempfile::Builder::new().prefix( Self::PREFIX ).tempdir_in( parent )? ))
	}

	fn with_root( root: TempDir ) -> Self {
		Self { root, copies: Mutex::new( HashMap::new() ) }
	}

	/// The directory copies are written to.
	pub fn root( &self ) -> &Path { self.root.path() }

}

impl PathOverride for ShadowCopy {
	fn path_to_load( &self, path: &ModulePath ) -> std::io::Result<PathBuf> {

		let mut copies = self.copies.lock().unwrap_or_else( std::sync::PoisonError::into_inner );
		if let Some( copy ) = copies.get( path ) { return Ok( copy.clone() ) }

		let directory = self.root.path().join( copies.len().to_string() );
		std::fs::create_dir_all( &directory )?;
		// `ModulePath` always names a file
		let copy = directory.join( path.file_name().unwrap_or( path.as_os_str() ));
		std::fs::copy( path, &copy )?;
		tracing::debug!( source = %path, copy = %copy.display(), "shadow copied module" );

		copies.insert( path.clone(), copy.clone() );
		Ok( copy )

	}
}
