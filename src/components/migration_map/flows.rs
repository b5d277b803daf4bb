//! Selecting the flows drawn for a focus country.

use std::collections::HashMap;

use log::debug;

use super::index::NameIdIndex;
use super::types::{MigrationRecord, Point};

/// One resolvable, nonzero source of the focus country.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowSource {
	/// Name as written in the dataset.
	pub name: String,
	/// Resolved topology id.
	pub id: String,
	/// Migrant count; positive and finite.
	pub magnitude: f64,
}

/// Identifies one directed flow; also the animator's key for its particles.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
	/// Source country id.
	pub source: String,
	/// Destination (focus) country id.
	pub destination: String,
}

/// A source→destination flow anchored at both centroids.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowEdge {
	/// Source topology id.
	pub source_id: String,
	/// Source name from the dataset.
	pub source_name: String,
	/// Focus topology id.
	pub destination_id: String,
	/// Migrant count.
	pub magnitude: f64,
	/// Source centroid.
	pub start: Point,
	/// Destination centroid.
	pub end: Point,
}

impl FlowEdge {
	/// Key of this edge in the animator.
	pub fn key(&self) -> EdgeKey {
		EdgeKey {
			source: self.source_id.clone(),
			destination: self.destination_id.clone(),
		}
	}
}

/// Sources of `focus_id` that resolve through `index` and carry a positive
/// count, in the record's own order.
///
/// An unknown focus gives an empty list.
pub fn select_flows(records: &[MigrationRecord], focus_id: &str, index: &NameIdIndex) -> Vec<FlowSource> {
	let Some(record) = records.iter().find(|r| r.id == focus_id) else {
		debug!("no migration record for focus {focus_id:?}");
		return Vec::new();
	};

	record
		.sources
		.iter()
		// positive only: zero is "no flow", NaN is unparseable
		.filter(|&(_, magnitude)| magnitude > 0.0 && magnitude.is_finite())
		.filter_map(|(name, magnitude)| {
			let id = index.id_of(name)?;
			Some(FlowSource {
				name: name.to_owned(),
				id: id.to_owned(),
				magnitude,
			})
		})
		.collect()
}

/// Anchor sources at their centroids. Flows whose source or destination has
/// no centroid are dropped.
pub fn flow_edges(sources: &[FlowSource], focus_id: &str, centroids: &HashMap<String, Point>) -> Vec<FlowEdge> {
	let Some(&end) = centroids.get(focus_id) else {
		debug!("focus {focus_id:?} has no centroid, drawing no flows");
		return Vec::new();
	};

	sources
		.iter()
		.filter_map(|source| {
			let &start = centroids.get(&source.id)?;
			Some(FlowEdge {
				source_id: source.id.clone(),
				source_name: source.name.clone(),
				destination_id: focus_id.to_owned(),
				magnitude: source.magnitude,
				start,
				end,
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	fn record(id: &str, name: &str, sources: &[(&str, f64)]) -> MigrationRecord {
		MigrationRecord {
			id: id.into(),
			name: name.into(),
			sources: sources.iter().map(|&(n, c)| (n, c)).collect(),
		}
	}

	fn alpha_world() -> (Vec<MigrationRecord>, NameIdIndex, HashMap<String, Point>) {
		let records = vec![record(
			"1",
			"Alpha",
			&[("Beta", 100.0), ("Gamma", 0.0), ("Delta", 50.0)],
		)];
		let index: NameIdIndex = [("Alpha", "1"), ("Beta", "2"), ("Delta", "3")].into_iter().collect();
		let centroids = [
			("1", Point::new(0.0, 0.0)),
			("2", Point::new(10.0, 0.0)),
			("3", Point::new(0.0, 10.0)),
		]
		.into_iter()
		.map(|(id, p)| (id.to_string(), p))
		.collect();
		(records, index, centroids)
	}

	#[test]
	fn alpha_scenario_yields_exactly_two_edges() {
		let (records, index, centroids) = alpha_world();
		let sources = select_flows(&records, "1", &index);
		let edges = flow_edges(&sources, "1", &centroids);

		let summary: Vec<_> = edges
			.iter()
			.map(|e| (e.source_id.as_str(), e.destination_id.as_str(), e.magnitude))
			.collect();
		assert_eq!(summary, vec![("2", "1", 100.0), ("3", "1", 50.0)]);
		assert_eq!(edges[0].start, Point::new(10.0, 0.0));
		assert_eq!(edges[0].end, Point::new(0.0, 0.0));
	}

	#[test]
	fn unknown_focus_selects_nothing() {
		let (records, index, centroids) = alpha_world();
		assert!(select_flows(&records, "42", &index).is_empty());
		assert!(select_flows(&records, "", &index).is_empty());
		let sources = select_flows(&records, "1", &index);
		assert!(flow_edges(&sources, "42", &centroids).is_empty());
	}

	#[test]
	fn sources_without_centroid_are_dropped() {
		let (records, index, mut centroids) = alpha_world();
		centroids.remove("3");
		let edges = flow_edges(&select_flows(&records, "1", &index), "1", &centroids);
		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].key().source, "2");
	}

	#[test]
	fn order_follows_the_record_not_the_magnitude() {
		let records = vec![record("1", "A", &[("C", 1.0), ("B", 9.0), ("D", 5.0)])];
		let index: NameIdIndex = [("B", "2"), ("C", "3"), ("D", "4")].into_iter().collect();
		let names: Vec<_> = select_flows(&records, "1", &index)
			.into_iter()
			.map(|s| s.name)
			.collect();
		assert_eq!(names, vec!["C", "B", "D"]);
	}

	proptest! {
		#[test]
		fn never_selects_zero_or_unresolved(
			entries in prop::collection::vec((0u8..12, prop_oneof![Just(0.0), 0.0f64..1e6, Just(f64::NAN)]), 0..24),
			known in prop::collection::btree_set(0u8..12, 0..12),
		) {
			let sources: Vec<(String, f64)> = entries
				.iter()
				.map(|&(n, c)| (format!("country-{n}"), c))
				.collect();
			let records = vec![MigrationRecord {
				id: "focus".into(),
				name: "Focus".into(),
				sources: sources.into_iter().collect(),
			}];
			let index: NameIdIndex = known
				.iter()
				.map(|n| (format!("country-{n}"), format!("id-{n}")))
				.collect();

			for flow in select_flows(&records, "focus", &index) {
				prop_assert!(flow.magnitude > 0.0);
				prop_assert_eq!(index.id_of(&flow.name), Some(flow.id.as_str()));
			}
		}
	}
}
