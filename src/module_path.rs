//! Path and name keys used throughout the loader.
//!
//! Every cache and registry lookup is keyed by a [`ModulePath`], an absolute path
//! naming a module file. Several paths may share one [`SimpleName`] when the same
//! module lives in more than one place (different versions or locations).

use std::path::{ Path, PathBuf };
use thiserror::Error ;



/// Reasons a path cannot be used as a [`ModulePath`].
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum ModulePathError {
	/// Only absolute paths are accepted; they are never normalised silently.
	#[error( "Module path must be absolute: '{}'", .0.display() )] Relative( PathBuf ),
	/// The path does not end in a file name.
	#[error( "Module path must name a file: '{}'", .0.display() )] NoFileName( PathBuf ),
}

/// An absolute filesystem path naming a module file.
///
/// The universal key for the loaded-module cache and the known-path registry.
/// Comparison is exact: two spellings of the same file are two keys.
#[derive( Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct ModulePath( PathBuf );

impl ModulePath {

	/// Wraps an absolute path.
	///
	/// # Panics
	/// Panics if `path` is relative or has no file name. Passing such a path is a
	/// caller contract violation; use [`ModulePath::try_new`] to check first.
	pub fn new( path: impl Into<PathBuf> ) -> Self {
		match Self::try_new( path ) {
			Ok( path ) => path,
			Err( err ) => panic!( "{}", err ),
		}
	}

	/// Wraps an absolute path, reporting why it was rejected instead of panicking.
	///
	/// # Errors
	/// Returns [`ModulePathError`] if `path` is relative or has no file name.
	pub fn try_new( path: impl Into<PathBuf> ) -> Result<Self, ModulePathError> {
		let path = path.into();
		if !path.is_absolute() { return Err( ModulePathError::Relative( path )) }
		if path.file_stem().is_none() { return Err( ModulePathError::NoFileName( path )) }
		Ok( Self( path ))
	}

	/// The file name without its extension.
	pub fn simple_name( &self ) -> SimpleName {
		// `try_new` guarantees a file stem
		SimpleName::new( self.0.file_stem().map(| stem | stem.to_string_lossy()).unwrap_or_default() )
	}

	/// The directory containing the module file.
	pub fn directory( &self ) -> &Path {
		self.0.parent().unwrap_or( &self.0 )
	}

	#[inline] pub fn as_path( &self ) -> &Path { &self.0 }
	#[inline] pub fn into_path_buf( self ) -> PathBuf { self.0 }

}

impl AsRef<Path> for ModulePath {
	fn as_ref( &self ) -> &Path { &self.0 }
}

impl std::ops::Deref for ModulePath {
	type Target = Path ;
	fn deref( &self ) -> &Path { &self.0 }
}

impl std::fmt::Display for ModulePath {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		write!( f, "{}", self.0.display() )
	}
}

/// A module's name without directory, version or extension.
///
/// Compared, hashed and ordered case-insensitively; [`Display`]( std::fmt::Display )
/// keeps the spelling it was created with.
#[derive( Debug, Clone )]
pub struct SimpleName {
	spelling: String,
	folded: String,
}

impl SimpleName {

	pub fn new( name: impl Into<String> ) -> Self {
		let spelling = name.into();
		let folded = spelling.to_lowercase();
		Self { spelling, folded }
	}

	/// The name as originally spelled.
	#[inline] pub fn as_str( &self ) -> &str { &self.spelling }

}

impl PartialEq for SimpleName {
	fn eq( &self, other: &Self ) -> bool { self.folded == other.folded }
}
impl Eq for SimpleName {}

impl std::hash::Hash for SimpleName {
	fn hash<H: std::hash::Hasher>( &self, state: &mut H ) { self.folded.hash( state ) }
}

impl PartialOrd for SimpleName {
	fn partial_cmp( &self, other: &Self ) -> Option<std::cmp::Ordering> { Some( self.cmp( other )) }
}
impl Ord for SimpleName {
	fn cmp( &self, other: &Self ) -> std::cmp::Ordering { self.folded.cmp( &other.folded ) }
}

impl std::fmt::Display for SimpleName {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.write_str( &self.spelling )
	}
}

impl From<&str> for SimpleName {
	fn from( name: &str ) -> Self { Self::new( name ) }
}

impl From<String> for SimpleName {
	fn from( name: String ) -> Self { Self::new( name ) }
}
