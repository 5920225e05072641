use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use wasm_isolate::LoadError ;

use crate::fake_runtime::{ identity, loader, FakeFile, FakeFs, FakeHost };

fn two_versions() -> FakeFs {
	FakeFs::new()
		.with_file( "/plugins/a/Foo.wasm", FakeFile::new( "Foo@1.0.0" ))
		.with_file( "/plugins/b/Foo.wasm", FakeFile::new( "Foo@2.0.0" ))
}

#[test]
fn exact_match_is_loaded_over_higher_version() {

	let fs = two_versions()
		.with_file( "/plugins/c/Plugin.wasm", FakeFile::new( "Plugin@1.0.0" ).depends_on( "Foo@1.0.0" ));

	let loader = loader( &fs, &Arc::new( FakeHost::new() ));
	loader.register( "/plugins/a/Foo.wasm" );
	loader.register( "/plugins/b/Foo.wasm" );
	loader.register( "/plugins/c/Plugin.wasm" );
	let plugin = loader.load( "/plugins/c/Plugin.wasm" ).expect( "Failed to load plugin" );

	let foo = &plugin.dependencies[0];
	assert_eq!( foo.identity, identity( "Foo@1.0.0" ));
	assert_eq!( foo.loaded_from(), Some( Path::new( "/plugins/a/Foo.wasm" )));
	assert_eq!( fs.loads( "/plugins/b/Foo.wasm" ), 0 );

}

#[test]
fn exact_match_compares_signing_key() {

	let fs = FakeFs::new()
		.with_file( "/plugins/a/Foo.wasm", FakeFile::new( "Foo@1.0.0/aaaa" ))
		.with_file( "/plugins/b/Foo.wasm", FakeFile::new( "Foo@1.0.0/bbbb" ));

	let loader = loader( &fs, &Arc::new( FakeHost::new() ));
	loader.register( "/plugins/a/Foo.wasm" );
	loader.register( "/plugins/b/Foo.wasm" );

	let foo = loader.resolve_dependency( "/plugins/c/Plugin.wasm", &identity( "Foo@1.0.0/BBBB" ))
		.expect( "Failed to resolve Foo" );
	assert_eq!( foo.loaded_from(), Some( Path::new( "/plugins/b/Foo.wasm" )));

}

#[test]
fn highest_version_is_loaded_without_exact_match() {

	let loader = loader( &two_versions(), &Arc::new( FakeHost::new() ));
	loader.register( "/plugins/a/Foo.wasm" );
	loader.register( "/plugins/b/Foo.wasm" );

	let foo = loader.resolve_dependency( "/plugins/c/Plugin.wasm", &identity( "Foo@3.0.0" ))
		.expect( "Failed to resolve Foo" );
	assert_eq!( foo.identity, identity( "Foo@2.0.0" ));

	let foo = loader.resolve_dependency( "/plugins/d/Plugin.wasm", &identity( "Foo@1.5.0" ))
		.expect( "Failed to resolve Foo" );
	assert_eq!( foo.identity, identity( "Foo@2.0.0" ));

}

#[test]
fn equal_versions_go_to_smallest_path() {

	let fs = FakeFs::new()
		.with_file( "/plugins/b/Foo.wasm", FakeFile::new( "Foo@2.0.0" ))
		.with_file( "/plugins/a/Foo.wasm", FakeFile::new( "Foo@2.0.0" ))
		.with_file( "/plugins/c/Foo.wasm", FakeFile::new( "Foo@1.0.0" ));

	let loader = loader( &fs, &Arc::new( FakeHost::new() ));
	loader.register( "/plugins/c/Foo.wasm" );
	loader.register( "/plugins/b/Foo.wasm" );
	loader.register( "/plugins/a/Foo.wasm" );

	let foo = loader.resolve_dependency( "/plugins/d/Plugin.wasm", &identity( "Foo@3.0.0" ))
		.expect( "Failed to resolve Foo" );
	assert_eq!( foo.loaded_from(), Some( Path::new( "/plugins/a/Foo.wasm" )));

}

#[test]
fn unreadable_candidates_are_skipped() {

	let fs = FakeFs::new()
		.with_file( "/plugins/a/Foo.wasm", FakeFile::malformed() )
		.with_file( "/plugins/b/Foo.wasm", FakeFile::new( "Foo@1.0.0" ));

	let loader = loader( &fs, &Arc::new( FakeHost::new() ));
	loader.register( "/plugins/a/Foo.wasm" );
	loader.register( "/plugins/b/Foo.wasm" );

	let foo = loader.resolve_dependency( "/plugins/c/Plugin.wasm", &identity( "Foo@2.0.0" ))
		.expect( "Failed to resolve Foo" );
	assert_eq!( foo.loaded_from(), Some( Path::new( "/plugins/b/Foo.wasm" )));

}

#[test]
fn no_readable_candidate_is_a_missing_dependency() {

	let fs = FakeFs::new()
		.with_file( "/plugins/a/Foo.wasm", FakeFile::malformed() );
	let host = Arc::new( FakeHost::new().with_module( "Foo@1.0.0" ));

	let loader = loader( &fs, &host );
	loader.register( "/plugins/a/Foo.wasm" );
	loader.register( "/plugins/b/Foo.wasm" );

	match loader.resolve_dependency( "/plugins/c/Plugin.wasm", &identity( "Foo@1.0.0" )) {
		Err( LoadError::MissingDependency { identity: missing, plugin }) => {
			assert_eq!( missing, identity( "Foo@1.0.0" ));
			assert_eq!( plugin, PathBuf::from( "/plugins/c/Plugin.wasm" ));
		}
		other => panic!( "Expected MissingDependency, found: {:?}", other ),
	}
	assert!( host.requests().is_empty() );

}

/// Two copies of Foo are registered in different directories and a third plugin
/// asks for the older one by its exact identity.
#[test]
fn plugin_in_third_directory_gets_exact_version() {

	let fs = two_versions()
		.with_file( "/plugins/c/Plugin.wasm", FakeFile::new( "Plugin@1.0.0" ).depends_on( "Foo@1.0.0" ))
		.with_file( "/plugins/d/Other.wasm", FakeFile::new( "Other@1.0.0" ).depends_on( "Foo@2.0.0" ));

	let loader = loader( &fs, &Arc::new( FakeHost::new() ));
	loader.register( "/plugins/a/Foo.wasm" );
	loader.register( "/plugins/b/Foo.wasm" );
	loader.register( "/plugins/c/Plugin.wasm" );
	loader.register( "/plugins/d/Other.wasm" );

	let plugin = loader.load( "/plugins/c/Plugin.wasm" ).expect( "Failed to load plugin" );
	let other = loader.load( "/plugins/d/Other.wasm" ).expect( "Failed to load other plugin" );

	assert_eq!( plugin.dependencies[0].loaded_from(), Some( Path::new( "/plugins/a/Foo.wasm" )));
	assert_eq!( other.dependencies[0].loaded_from(), Some( Path::new( "/plugins/b/Foo.wasm" )));
	assert_eq!( loader.cached_count(), 2 );

}
