use std::sync::Arc ;
use wasm_isolate::LoadError ;

use crate::fake_runtime::{ identity, loader, FakeFile, FakeFs, FakeHost };

#[test]
fn unregistered_name_comes_from_host() {

	let fs = FakeFs::new()
		.with_file( "/plugins/a/Plugin.wasm", FakeFile::new( "Plugin@1.0.0" ).depends_on( "Logging@3.1.0" ));
	let host = Arc::new( FakeHost::new().with_module( "Logging@3.0.0" ));

	let loader = loader( &fs, &host );
	loader.register( "/plugins/a/Plugin.wasm" );
	let plugin = loader.load( "/plugins/a/Plugin.wasm" ).expect( "Failed to load plugin" );

	assert!( Arc::ptr_eq( &plugin.dependencies[0], &host.module( "Logging" )));
	assert_eq!( host.requests(), vec![ identity( "Logging@3.1.0" )]);

}

#[test]
fn unregistered_name_missing_from_host_fails() {

	let fs = FakeFs::new()
		.with_file( "/plugins/a/Plugin.wasm", FakeFile::new( "Plugin@1.0.0" ).depends_on( "Logging@1.0.0" ));

	let loader = loader( &fs, &Arc::new( FakeHost::new() ));

	loader.register( "/plugins/a/Plugin.wasm" );
	match loader.load( "/plugins/a/Plugin.wasm" ) {
		Err( LoadError::NotInHost( missing )) => assert_eq!( missing, identity( "Logging@1.0.0" )),
		other => panic!( "Expected NotInHost, found: {:?}", other ),
	}
	assert_eq!( loader.cached_count(), 0 );

}

#[test]
fn registered_name_is_never_delegated() {

	let fs = FakeFs::new()
		.with_file( "/plugins/a/Plugin.wasm", FakeFile::new( "Plugin@1.0.0" ).depends_on( "Logging@1.0.0" ))
		.with_file( "/plugins/b/Logging.wasm", FakeFile::new( "Logging@1.0.0" ));
	let host = Arc::new( FakeHost::new().with_module( "Logging@1.0.0" ));

	let loader = loader( &fs, &host );
	loader.register( "/plugins/b/Logging.wasm" );
	loader.register( "/plugins/a/Plugin.wasm" );
	let plugin = loader.load( "/plugins/a/Plugin.wasm" ).expect( "Failed to load plugin" );

	assert!( !Arc::ptr_eq( &plugin.dependencies[0], &host.module( "Logging" )));
	assert_eq!( fs.loads( "/plugins/b/Logging.wasm" ), 1 );
	assert!( host.requests().is_empty() );

}

fn logging_fixture() -> ( FakeFs, Arc<FakeHost> ) {
	let fs = FakeFs::new()
		.with_file( "/plugins/y/Y.wasm", FakeFile::new( "Y@1.0.0" ).depends_on( "Logging@1.0.0" ))
		.with_file( "/plugins/x/Logging.wasm", FakeFile::new( "Logging@2.0.0" ));
	( fs, Arc::new( FakeHost::new().with_module( "Logging@1.0.0" )))
}

#[test]
fn resolution_does_not_depend_on_load_order() {

	let ( fs, host ) = logging_fixture();
	let first = loader( &fs, &host );
	first.register( "/plugins/y/Y.wasm" );
	let alone = first.load( "/plugins/y/Y.wasm" ).expect( "Failed to load Y" );

	let ( fs, host ) = logging_fixture();
	let second = loader( &fs, &host );
	second.register( "/plugins/y/Y.wasm" );
	let _ = second.load( "/plugins/x/Logging.wasm" );
	let after = second.load( "/plugins/y/Y.wasm" ).expect( "Failed to load Y" );

	assert_eq!( alone.dependencies[0].loaded_from(), None );
	assert_eq!( after.dependencies[0].loaded_from(), None );
	assert!( Arc::ptr_eq( &after.dependencies[0], &host.module( "Logging" )));
	assert!( second.lookup_paths( &"Logging".into() ).is_none() );
	assert_eq!( fs.loads( "/plugins/x/Logging.wasm" ), 0 );

}
