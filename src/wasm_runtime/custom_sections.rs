//! The custom sections a component uses to describe itself to the loader.
//!
//! All three sections hold UTF-8 text and are only read at the top level of the
//! component; sections of nested modules and components are ignored.
//!
//! - `wasm-isolate:identity`: the component's own [`ModuleIdentity`] (`name@version[/key]`).
//! - `wasm-isolate:dependencies`: one identity per line, each a managed dependency.
//! - `wasm-isolate:native`: one native library name per line.

use wasmparser::{ Parser, Payload };

use crate::ModuleIdentity ;
use super::WasmRuntimeError ;



pub const IDENTITY_SECTION: &str = "wasm-isolate:identity" ;
pub const DEPENDENCIES_SECTION: &str = "wasm-isolate:dependencies" ;
pub const NATIVE_SECTION: &str = "wasm-isolate:native" ;

/// What a component declares about itself.
#[derive( Debug, Default, Clone )]
pub struct ModuleSections {
	pub identity: Option<ModuleIdentity>,
	pub dependencies: Vec<ModuleIdentity>,
	pub native_libraries: Vec<String>,
}

impl ModuleSections {

	/// Reads the loader's custom sections out of a component binary.
	///
	/// # Errors
	/// Fails on a malformed binary, non-UTF-8 section contents or an unparsable identity.
	pub fn parse( bytes: &[u8] ) -> Result<Self, WasmRuntimeError> {

		let mut sections = Self::default();
		let mut depth = 0_usize ;

		for payload in Parser::new( 0 ).parse_all( bytes ) {
			match payload? {
				Payload::ModuleSection { .. } | Payload::ComponentSection { .. } => depth += 1,
				Payload::End( _ ) => depth = depth.saturating_sub( 1 ),
				Payload::CustomSection( reader ) if depth == 0 => {
					match reader.name() {
						IDENTITY_SECTION => sections.identity = Some( section_text( IDENTITY_SECTION, reader.data() )?.parse::<ModuleIdentity>()? ),
						DEPENDENCIES_SECTION => sections.dependencies.extend( section_lines( DEPENDENCIES_SECTION, reader.data() )?
							.map( str::parse::<ModuleIdentity> )
							.collect::<Result<Vec<_>, _>>()? ),
						NATIVE_SECTION => sections.native_libraries.extend( section_lines( NATIVE_SECTION, reader.data() )?
							.map( String::from )),
						_ => {}
					}
				}
				_ => {}
			}
		}

		Ok( sections )

	}

	/// The declared identity.
	///
	/// # Errors
	/// Returns [`WasmRuntimeError::MissingIdentity`] if the component has no identity section.
	pub fn identity( &self ) -> Result<&ModuleIdentity, WasmRuntimeError> {
		self.identity.as_ref().ok_or( WasmRuntimeError::MissingIdentity( IDENTITY_SECTION ))
	}

}

fn section_text<'a>( section: &'static str, data: &'a [u8] ) -> Result<&'a str, WasmRuntimeError> {
	std::str::from_utf8( data ).map_err(| _ | WasmRuntimeError::InvalidUtf8( section ))
}

fn section_lines<'a>( section: &'static str, data: &'a [u8] ) -> Result<impl Iterator<Item = &'a str>, WasmRuntimeError> {
	Ok( section_text( section, data )?
		.lines()
		.map( str::trim )
		.filter(| line | !line.is_empty() ))
}
