//! Plain data shared by the engine modules.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// A 2D point. Screen space after projection, `(lon, lat)` degrees before.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal, or longitude.
	pub x: f64,
	/// Vertical, or latitude.
	pub y: f64,
}

impl Point {
	/// A point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}

	/// Linear interpolation; `t = 0` is `self`, `t = 1` is `other`.
	pub fn lerp(self, other: Point, t: f64) -> Point {
		Point::new(
			self.x + (other.x - self.x) * t,
			self.y + (other.y - self.y) * t,
		)
	}

	/// Halfway between the two points.
	pub fn midpoint(self, other: Point) -> Point {
		self.lerp(other, 0.5)
	}
}

/// One closed ring of a polygon boundary.
pub type Ring = Vec<Point>;

/// Exterior ring first, holes after it.
pub type Polygon = Vec<Ring>;

/// Source-country counts of one destination, kept in document order.
///
/// A name that is absent is unmeasured; a zero count means no flow.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceCounts(Vec<(String, f64)>);

impl SourceCounts {
	/// Entries in document order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.0.iter().map(|(name, count)| (name.as_str(), *count))
	}

	/// Count for one source name, if measured.
	pub fn get(&self, name: &str) -> Option<f64> {
		self.0.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
	}

	/// Number of measured sources.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// True when no source was measured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<S: Into<String>> FromIterator<(S, f64)> for SourceCounts {
	fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(n, c)| (n.into(), c)).collect())
	}
}

/// Counts arrive either as JSON numbers or as spreadsheet text such as `"12 345"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
	Number(f64),
	Text(String),
}

impl RawCount {
	fn value(self) -> f64 {
		match self {
			RawCount::Number(n) => n,
			RawCount::Text(text) => {
				let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
				if digits.is_empty() {
					0.0
				} else {
					digits.parse().unwrap_or(f64::NAN)
				}
			}
		}
	}
}

impl<'de> Deserialize<'de> for SourceCounts {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct CountsVisitor;

		impl<'de> Visitor<'de> for CountsVisitor {
			type Value = SourceCounts;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("a map of source country names to counts")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
				let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
				while let Some((name, raw)) = map.next_entry::<String, Option<RawCount>>()? {
					// null is an unmeasured entry, same as absence
					if let Some(raw) = raw {
						entries.push((name, raw.value()));
					}
				}
				Ok(SourceCounts(entries))
			}
		}

		deserializer.deserialize_map(CountsVisitor)
	}
}

/// Migrant stock of one destination country, by source country name.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MigrationRecord {
	/// Destination country id, matching the topology.
	#[serde(deserialize_with = "deserialize_id")]
	pub id: String,
	/// Destination display name; sources refer to countries by this name.
	pub name: String,
	/// Counts by source name.
	#[serde(default)]
	pub sources: SourceCounts,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Int(i64),
	Float(f64),
	Text(String),
}

impl From<RawId> for String {
	fn from(raw: RawId) -> Self {
		match raw {
			RawId::Int(n) => n.to_string(),
			RawId::Float(f) if f.fract() == 0.0 && f.is_finite() => (f as i64).to_string(),
			RawId::Float(f) => f.to_string(),
			RawId::Text(s) => s,
		}
	}
}

/// Country ids show up as numbers in some files and strings in others.
pub(crate) fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn deserialize_opt_id<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Option<String>, D::Error> {
	Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
