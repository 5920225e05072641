#[allow( dead_code )]
mod component_builder {

	use std::path::Path ;
	use wasm_isolate::wasm_runtime::custom_sections::{ DEPENDENCIES_SECTION, IDENTITY_SECTION, NATIVE_SECTION };

	const COMPONENT_HEADER: [u8; 8] = [ 0x00, 0x61, 0x73, 0x6d, 0x0d, 0x00, 0x01, 0x00 ];
	const MODULE_HEADER: [u8; 8] = [ 0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00 ];
	const CUSTOM_SECTION_ID: u8 = 0 ;
	const CORE_MODULE_SECTION_ID: u8 = 1 ;

	/// Assembles an otherwise empty component carrying the given custom sections.
	#[derive( Debug, Default, Clone )]
	pub struct ComponentBuilder {
		sections: Vec<u8>,
	}

	impl ComponentBuilder {

		pub fn new() -> Self { Self::default() }

		pub fn identity( self, identity: &str ) -> Self {
			self.custom( IDENTITY_SECTION, identity )
		}

		pub fn dependencies( self, identities: &[&str] ) -> Self {
			self.custom( DEPENDENCIES_SECTION, identities.join( "\n" ))
		}

		pub fn natives( self, names: &[&str] ) -> Self {
			self.custom( NATIVE_SECTION, names.join( "\n" ))
		}

		pub fn custom( mut self, name: &str, data: impl AsRef<[u8]> ) -> Self {
			self.sections.extend( custom_section( name, data.as_ref() ));
			self
		}

		/// Embeds a core module holding one custom section.
		pub fn nested_module( mut self, name: &str, data: impl AsRef<[u8]> ) -> Self {
			let module = MODULE_HEADER.iter().copied()
				.chain( custom_section( name, data.as_ref() ))
				.collect::<Vec<_>>();
			self.sections.extend( section( CORE_MODULE_SECTION_ID, &module ));
			self
		}

		pub fn build( &self ) -> Vec<u8> {
			COMPONENT_HEADER.iter().copied().chain( self.sections.iter().copied() ).collect()
		}

		pub fn write( &self, path: &Path ) {
			if let Some( parent ) = path.parent() {
				std::fs::create_dir_all( parent ).expect( "Failed to create fixture directory" );
			}
			std::fs::write( path, self.build() ).expect( "Failed to write fixture" );
		}

	}

	fn custom_section( name: &str, data: &[u8] ) -> Vec<u8> {
		let mut contents = leb128( name.len() );
		contents.extend_from_slice( name.as_bytes() );
		contents.extend_from_slice( data );
		section( CUSTOM_SECTION_ID, &contents )
	}

	fn section( id: u8, contents: &[u8] ) -> Vec<u8> {
		let mut bytes = vec![ id ];
		bytes.extend( leb128( contents.len() ));
		bytes.extend_from_slice( contents );
		bytes
	}

	fn leb128( mut value: usize ) -> Vec<u8> {
		let mut bytes = Vec::new();
		loop {
			let byte = ( value & 0x7f ) as u8 ;
			value >>= 7 ;
			match value {
				0 => { bytes.push( byte ); return bytes }
				_ => bytes.push( byte | 0x80 ),
			}
		}
	}

}
