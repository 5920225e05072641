//! Full module identity: name, version and signing key.
//!
//! The simple name alone selects candidates; the full identity is only ever
//! compared for equality (exact match) or ordered by version (fallback).

use semver::Version ;
use thiserror::Error ;

use crate::SimpleName ;



/// Failure to parse a textual [`ModuleIdentity`].
#[derive( Error, Debug )]
pub enum IdentityParseError {
	#[error( "Missing '@' separating name and version in '{0}'" )] MissingVersion( String ),
	#[error( "Empty module name in '{0}'" )] EmptyName( String ),
	#[error( "Empty signing key in '{0}'" )] EmptySigningKey( String ),
	#[error( "Invalid version in '{0}': {1}" )] InvalidVersion( String, #[source] semver::Error ),
}

/// The identity a module declares for itself.
///
/// Two identities are equal when their names and signing keys match
/// case-insensitively and their versions are equal.
///
/// The text form is `name@version` or `name@version/signing-key`:
///
/// ```
/// use wasm_isolate::ModuleIdentity ;
///
/// let identity: ModuleIdentity = "Analyzers.Core@1.2.0/0A1B2C".parse().unwrap();
/// assert_eq!( identity.name().as_str(), "Analyzers.Core" );
/// assert_eq!( identity.version(), &semver::Version::new( 1, 2, 0 ));
/// assert_eq!( identity, "analyzers.core@1.2.0/0a1b2c".parse::<ModuleIdentity>().unwrap() );
/// ```
#[derive( Debug, Clone, PartialEq, Eq, Hash )]
pub struct ModuleIdentity {
	name: SimpleName,
	version: Version,
	/// Stored lowercased.
	signing_key: Option<String>,
}

impl ModuleIdentity {

	pub fn new( name: impl Into<SimpleName>, version: Version, signing_key: Option<&str> ) -> Self {
		Self {
			name: name.into(),
			version,
			signing_key: signing_key.map( str::to_lowercase ),
		}
	}

	#[inline] pub fn name( &self ) -> &SimpleName { &self.name }
	#[inline] pub fn version( &self ) -> &Version { &self.version }
	#[inline] pub fn signing_key( &self ) -> Option<&str> { self.signing_key.as_deref() }

}

impl std::str::FromStr for ModuleIdentity {
	type Err = IdentityParseError ;

	fn from_str( text: &str ) -> Result<Self, Self::Err> {

		let text = text.trim();
		let ( name, rest ) = text.split_once( '@' )
			.ok_or_else(|| IdentityParseError::MissingVersion( text.to_string() ))?;
		if name.trim().is_empty() { return Err( IdentityParseError::EmptyName( text.to_string() )) }

		let ( version, signing_key ) = match rest.split_once( '/' ) {
			Some(( _, key )) if key.trim().is_empty() => return Err( IdentityParseError::EmptySigningKey( text.to_string() )),
			Some(( version, key )) => ( version, Some( key.trim() )),
			None => ( rest, None ),
		};
		let version = Version::parse( version.trim() )
			.map_err(| err | IdentityParseError::InvalidVersion( text.to_string(), err ))?;

		Ok( Self::new( name.trim(), version, signing_key ))

	}
}

impl std::fmt::Display for ModuleIdentity {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		match &self.signing_key {
			Some( key ) => write!( f, "{}@{}/{}", self.name, self.version, key ),
			None => write!( f, "{}@{}", self.name, self.version ),
		}
	}
}
