//! Registry of every location a module of a given name has been seen at.

use std::collections::{ BTreeSet, HashMap };

use crate::{ ModulePath, SimpleName };



/// Append-only map from a [`SimpleName`] to the set of [`ModulePath`]s where a
/// module of that name has been registered.
///
/// Paths are kept in a [`BTreeSet`], so iteration order is the lexicographic
/// path order. Version fallback relies on this for its tie-break.
#[derive( Debug, Default, Clone )]
pub struct KnownPathRegistry {
	paths_by_name: HashMap<SimpleName, BTreeSet<ModulePath>>,
}

impl KnownPathRegistry {

	pub fn new() -> Self { Self::default() }

	/// Adds `path` under its simple name. Returns `false` if it was already known.
	pub fn register( &mut self, path: ModulePath ) -> bool {
		self.paths_by_name
			.entry( path.simple_name() )
			.or_default()
			.insert( path )
	}

	/// Every path registered under `name`, or `None` if the name was never registered.
	pub fn lookup( &self, name: &SimpleName ) -> Option<&BTreeSet<ModulePath>> {
		self.paths_by_name.get( name )
	}

	pub fn contains( &self, path: &ModulePath ) -> bool {
		self.lookup( &path.simple_name() ).is_some_and(| paths | paths.contains( path ))
	}

	/// Number of distinct simple names registered.
	pub fn name_count( &self ) -> usize { self.paths_by_name.len() }

}
