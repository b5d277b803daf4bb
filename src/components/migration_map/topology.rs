//! TopoJSON decoding into country polygons.
//!
//! Arcs may be quantized and delta-encoded (when a `transform` is present).
//! A negative arc reference `i` means arc `!i` walked backwards, and
//! consecutive arcs of a ring share their joining point.

use std::collections::HashMap;

use log::debug;
use serde::Deserialize;

use super::error::{MapError, Result};
use super::types::{Point, Polygon, Ring, deserialize_opt_id};

/// A parsed TopoJSON document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Topology {
	/// Present when arcs are quantized.
	#[serde(default)]
	pub transform: Option<TopoTransform>,
	/// Shared boundary polylines; positions are `[x, y]`.
	#[serde(default)]
	pub arcs: Vec<Vec<Vec<f64>>>,
	/// Named geometry collections.
	#[serde(default)]
	pub objects: HashMap<String, TopoObject>,
}

/// Dequantization: `position * scale + translate`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct TopoTransform {
	/// Per-axis multiplier.
	pub scale: [f64; 2],
	/// Per-axis offset.
	pub translate: [f64; 2],
}

/// A geometry collection, such as `countries`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TopoObject {
	/// TopoJSON `type`, usually `GeometryCollection`.
	#[serde(rename = "type", default)]
	pub kind: Option<String>,
	/// Member geometries.
	#[serde(default)]
	pub geometries: Vec<TopoGeometry>,
}

/// One country's shape as arc references.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TopoGeometry {
	/// `Polygon` or `MultiPolygon`; other kinds carry no area.
	#[serde(rename = "type", default)]
	pub kind: Option<String>,
	/// Country id, numeric or textual in the file.
	#[serde(default, deserialize_with = "deserialize_opt_id")]
	pub id: Option<String>,
	/// Ring arc references.
	#[serde(default)]
	pub arcs: Option<ArcRefs>,
	/// Free-form properties; only `name` is read.
	#[serde(default)]
	pub properties: Option<GeometryProperties>,
}

/// The properties the map reads.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GeometryProperties {
	/// Country display name.
	#[serde(default)]
	pub name: Option<String>,
}

/// Arc references of a polygonal geometry.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ArcRefs {
	/// Rings of one polygon.
	Polygon(Vec<Vec<i64>>),
	/// Rings of several polygons.
	MultiPolygon(Vec<Vec<Vec<i64>>>),
}

/// A country boundary in geographic `(lon, lat)` degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Country {
	/// Stable geographic id.
	pub id: String,
	/// Name from the topology properties, if any.
	pub name: Option<String>,
	/// Every polygon of the country, exterior ring first.
	pub polygons: Vec<Polygon>,
}

impl Country {
	/// False for countries that decoded to no points at all.
	pub fn has_geometry(&self) -> bool {
		self.polygons.iter().flatten().any(|ring| !ring.is_empty())
	}
}

impl Topology {
	/// Parse a TopoJSON document.
	pub fn from_json(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Decode every polygonal geometry of `object` into a country.
	///
	/// Geometries sharing an id are merged into one country. Geometries
	/// without an id are skipped.
	pub fn countries(&self, object: &str) -> Result<Vec<Country>> {
		let collection = self
			.objects
			.get(object)
			.ok_or_else(|| MapError::MissingObject(object.into()))?;
		if collection.geometries.is_empty() {
			return Err(MapError::NoCountries(object.into()));
		}

		let arcs = self.decode_arcs();
		let mut countries: Vec<Country> = Vec::new();
		let mut by_id: HashMap<String, usize> = HashMap::new();

		for geometry in &collection.geometries {
			let Some(id) = geometry.id.clone() else {
				debug!("skipping topology geometry without id");
				continue;
			};
			let polygons = match (geometry.kind.as_deref(), &geometry.arcs) {
				(Some("Polygon" | "MultiPolygon"), Some(refs)) => stitch_polygons(&arcs, refs, &id)?,
				_ => Vec::new(),
			};
			let name = geometry.properties.as_ref().and_then(|p| p.name.clone());

			match by_id.get(&id) {
				Some(&i) => {
					let country = &mut countries[i];
					country.polygons.extend(polygons);
					if country.name.is_none() {
						country.name = name;
					}
				}
				None => {
					by_id.insert(id.clone(), countries.len());
					countries.push(Country { id, name, polygons });
				}
			}
		}

		debug!(
			"decoded {} countries from {} arcs",
			countries.len(),
			arcs.len()
		);
		Ok(countries)
	}

	fn decode_arcs(&self) -> Vec<Vec<Point>> {
		self.arcs
			.iter()
			.map(|arc| {
				let positions = arc.iter().filter(|p| p.len() >= 2);
				match self.transform {
					Some(TopoTransform { scale, translate }) => {
						let (mut x, mut y) = (0.0, 0.0);
						positions
							.map(|p| {
								x += p[0];
								y += p[1];
								Point::new(x * scale[0] + translate[0], y * scale[1] + translate[1])
							})
							.collect()
					}
					None => positions.map(|p| Point::new(p[0], p[1])).collect(),
				}
			})
			.collect()
	}
}

fn stitch_polygons(arcs: &[Vec<Point>], refs: &ArcRefs, id: &str) -> Result<Vec<Polygon>> {
	let polygon = |rings: &Vec<Vec<i64>>| -> Result<Polygon> {
		rings.iter().map(|ring| stitch_ring(arcs, ring, id)).collect()
	};
	match refs {
		ArcRefs::Polygon(rings) => Ok(vec![polygon(rings)?]),
		ArcRefs::MultiPolygon(polygons) => polygons.iter().map(polygon).collect(),
	}
}

fn stitch_ring(arcs: &[Vec<Point>], refs: &[i64], id: &str) -> Result<Ring> {
	let mut ring = Ring::new();
	for &reference in refs {
		let index = if reference < 0 { !reference } else { reference };
		let arc = usize::try_from(index)
			.ok()
			.and_then(|i| arcs.get(i))
			.ok_or_else(|| MapError::ArcOutOfRange {
				id: id.into(),
				arc: reference,
				available: arcs.len(),
			})?;
		// the previous arc's last point is this arc's first
		ring.pop();
		if reference < 0 {
			ring.extend(arc.iter().rev().copied());
		} else {
			ring.extend_from_slice(arc);
		}
	}
	Ok(ring)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	// Two unit squares side by side sharing the arc x=1.
	const SHARED_EDGE: &str = r#"{
		"type": "Topology",
		"arcs": [
			[[1, 0], [1, 1]],
			[[1, 1], [0, 1], [0, 0], [1, 0]],
			[[1, 0], [2, 0], [2, 1], [1, 1]]
		],
		"objects": {
			"countries": {
				"type": "GeometryCollection",
				"geometries": [
					{"type": "Polygon", "id": 1, "arcs": [[0, 1]], "properties": {"name": "West"}},
					{"type": "Polygon", "id": "2", "arcs": [[2, -1]]},
					{"type": null, "id": 3},
					{"type": "Polygon", "arcs": [[0]]}
				]
			}
		}
	}"#;

	fn pts(raw: &[(f64, f64)]) -> Ring {
		raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
	}

	#[test]
	fn stitches_shared_arcs_without_duplicate_joints() {
		let topology = Topology::from_json(SHARED_EDGE).unwrap();
		let countries = topology.countries("countries").unwrap();

		assert_eq!(countries.len(), 3);
		assert_eq!(countries[0].id, "1");
		assert_eq!(countries[0].name.as_deref(), Some("West"));
		assert_eq!(
			countries[0].polygons,
			vec![vec![pts(&[(1., 0.), (1., 1.), (0., 1.), (0., 0.), (1., 0.)])]]
		);
		assert_eq!(
			countries[1].polygons,
			vec![vec![pts(&[(1., 0.), (2., 0.), (2., 1.), (1., 1.), (1., 0.)])]]
		);
		assert!(!countries[2].has_geometry());
	}

	#[test]
	fn decodes_quantized_delta_arcs() {
		let json = r#"{
			"transform": {"scale": [0.5, 2.0], "translate": [-10, 5]},
			"arcs": [[[0, 0], [4, 0], [0, 1], [-4, 0], [0, -1]]],
			"objects": {"countries": {"type": "GeometryCollection", "geometries": [
				{"type": "MultiPolygon", "id": 7, "arcs": [[[0]]]}
			]}}
		}"#;
		let countries = Topology::from_json(json).unwrap().countries("countries").unwrap();
		assert_eq!(
			countries[0].polygons,
			vec![vec![pts(&[(-10., 5.), (-8., 5.), (-8., 7.), (-10., 7.), (-10., 5.)])]]
		);
	}

	#[test]
	fn duplicate_ids_merge_into_one_country() {
		let json = r#"{
			"arcs": [[[0, 0], [1, 0], [1, 1], [0, 0]], [[5, 5], [6, 5], [6, 6], [5, 5]]],
			"objects": {"countries": {"type": "GeometryCollection", "geometries": [
				{"type": "Polygon", "id": -99, "arcs": [[0]]},
				{"type": "Polygon", "id": -99, "arcs": [[1]]}
			]}}
		}"#;
		let countries = Topology::from_json(json).unwrap().countries("countries").unwrap();
		assert_eq!(countries.len(), 1);
		assert_eq!(countries[0].id, "-99");
		assert_eq!(countries[0].polygons.len(), 2);
	}

	#[test]
	fn malformed_topologies_fail_fast() {
		let topology = Topology::from_json(SHARED_EDGE).unwrap();
		assert!(matches!(
			topology.countries("land"),
			Err(MapError::MissingObject(name)) if name == "land"
		));

		let empty = Topology::from_json(r#"{"arcs": [], "objects": {"countries": {"type": "GeometryCollection", "geometries": []}}}"#).unwrap();
		assert!(matches!(empty.countries("countries"), Err(MapError::NoCountries(_))));

		let dangling = Topology::from_json(r#"{"arcs": [], "objects": {"countries": {"type": "GeometryCollection", "geometries": [{"type": "Polygon", "id": 1, "arcs": [[-3]]}]}}}"#).unwrap();
		assert!(matches!(
			dangling.countries("countries"),
			Err(MapError::ArcOutOfRange { arc: -3, available: 0, .. })
		));

		assert!(matches!(Topology::from_json("{"), Err(MapError::Json(_))));
	}
}
