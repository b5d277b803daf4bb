//! Joins dataset names to topology ids.

use std::collections::HashMap;

use log::warn;

use super::types::MigrationRecord;

/// Bidirectional join between dataset country names and topology ids.
///
/// The two sides come from independent sources and only partially overlap,
/// so every lookup may fail. Each name binds to at most one id and each id
/// to at most one name; the first binding wins.
#[derive(Clone, Debug, Default)]
pub struct NameIdIndex {
	by_name: HashMap<String, String>,
	by_id: HashMap<String, String>,
}

impl NameIdIndex {
	/// An empty index.
	pub fn new() -> Self {
		Self::default()
	}

	/// Index each record's own `name` to its `id`.
	pub fn from_records(records: &[MigrationRecord]) -> Self {
		records
			.iter()
			.map(|r| (r.name.clone(), r.id.clone()))
			.collect()
	}

	/// Returns `false` when either side is already bound.
	pub fn insert(&mut self, name: impl Into<String>, id: impl Into<String>) -> bool {
		let (name, id) = (name.into(), id.into());
		if let Some(existing) = self.by_name.get(&name) {
			if *existing != id {
				warn!("name {name:?} already bound to id {existing}, ignoring {id}");
			}
			return false;
		}
		if let Some(existing) = self.by_id.get(&id) {
			warn!("id {id} already bound to name {existing:?}, ignoring {name:?}");
			return false;
		}
		self.by_id.insert(id.clone(), name.clone());
		self.by_name.insert(name, id);
		true
	}

	/// Topology id of a dataset name.
	pub fn id_of(&self, name: &str) -> Option<&str> {
		self.by_name.get(name).map(String::as_str)
	}

	/// Dataset name of a topology id.
	pub fn name_of(&self, id: &str) -> Option<&str> {
		self.by_id.get(id).map(String::as_str)
	}

	/// Number of bound pairs.
	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	/// True when nothing is bound.
	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}
}

impl<N: Into<String>, I: Into<String>> FromIterator<(N, I)> for NameIdIndex {
	fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
		let mut index = Self::new();
		for (name, id) in iter {
			index.insert(name, id);
		}
		index
	}
}
