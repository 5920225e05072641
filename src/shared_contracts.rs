use std::collections::HashSet ;

use crate::SimpleName ;



/// Module names that must always resolve to the host's own copy.
///
/// Contract types exchanged between host and plugin have to come from one loaded
/// instance; a second copy loaded into a plugin's context would be a distinct type
/// even with identical code. Fixed once the loader is built.
#[derive( Debug, Default, Clone )]
pub struct SharedContractAllowList {
	names: HashSet<SimpleName>,
}

impl SharedContractAllowList {

	pub fn new( names: impl IntoIterator<Item = impl Into<SimpleName>> ) -> Self {
		Self { names: names.into_iter().map( Into::into ).collect() }
	}

	#[inline] pub fn contains( &self, name: &SimpleName ) -> bool { self.names.contains( name ) }
	#[inline] pub fn len( &self ) -> usize { self.names.len() }
	#[inline] pub fn is_empty( &self ) -> bool { self.names.is_empty() }

}

impl<N: Into<SimpleName>> FromIterator<N> for SharedContractAllowList {
	fn from_iter<T: IntoIterator<Item = N>>( names: T ) -> Self { Self::new( names ) }
}
