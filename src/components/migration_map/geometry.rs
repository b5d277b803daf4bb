//! Projection of country boundaries to screen space.

use std::collections::HashMap;

use geo::{Centroid, LineString, MultiPolygon};
use log::debug;

use super::topology::Country;
use super::types::{Point, Ring};

/// Maps geographic `(lon, lat)` degrees to screen space. Must be pure.
pub trait Projection {
	/// Screen position of a geographic coordinate.
	fn project(&self, lon: f64, lat: f64) -> Point;
}

impl<F: Fn(f64, f64) -> Point> Projection for F {
	fn project(&self, lon: f64, lat: f64) -> Point {
		self(lon, lat)
	}
}

/// Plate carrée: longitude and latitude scaled linearly, north up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Equirectangular {
	/// Pixels per radian.
	pub scale: f64,
	/// Screen position of (0°, 0°).
	pub translate: Point,
}

impl Equirectangular {
	/// A projection with an explicit origin.
	pub fn new(scale: f64, translate: Point) -> Self {
		Self { scale, translate }
	}

	/// Centered on (0°, 0°) in a viewport of the given size.
	pub fn centered(scale: f64, width: f64, height: f64) -> Self {
		Self::new(scale, Point::new(width / 2.0, height / 2.0))
	}
}

impl Projection for Equirectangular {
	fn project(&self, lon: f64, lat: f64) -> Point {
		Point::new(
			self.translate.x + lon.to_radians() * self.scale,
			self.translate.y - lat.to_radians() * self.scale,
		)
	}
}

/// Projected rings and centroids, keyed by country id.
#[derive(Clone, Debug, Default)]
pub struct ProjectedGeometry {
	/// Every ring of the country, exteriors and holes alike.
	pub polygons: HashMap<String, Vec<Ring>>,
	/// Missing for countries without drawable geometry.
	pub centroids: HashMap<String, Point>,
}

impl ProjectedGeometry {
	/// Centroid of one country, if it has one.
	pub fn centroid(&self, id: &str) -> Option<Point> {
		self.centroids.get(id).copied()
	}
}

/// Project every country and compute its centroid.
pub fn project_countries<P: Projection + ?Sized>(countries: &[Country], projection: &P) -> ProjectedGeometry {
	let mut out = ProjectedGeometry::default();
	for country in countries {
		let polygons: Vec<Vec<Ring>> = country
			.polygons
			.iter()
			.map(|polygon| {
				polygon
					.iter()
					.map(|ring| ring.iter().map(|p| projection.project(p.x, p.y)).collect())
					.collect()
			})
			.collect();

		match polygon_centroid(&polygons) {
			Some(c) => {
				out.centroids.insert(country.id.clone(), c);
			}
			None => debug!("country {} has no drawable geometry", country.id),
		}
		out.polygons
			.insert(country.id.clone(), polygons.into_iter().flatten().collect());
	}
	out
}

/// Area-weighted centroid over all polygons; the first ring of each polygon
/// is its exterior and later rings are holes.
///
/// Degenerate (zero-area) shapes fall back to the perimeter centroid, then to
/// the point centroid. `None` only when there are no vertices.
pub fn polygon_centroid(polygons: &[Vec<Ring>]) -> Option<Point> {
	to_multi_polygon(polygons)
		.centroid()
		.map(|c| Point::new(c.x(), c.y()))
}

fn to_multi_polygon(polygons: &[Vec<Ring>]) -> MultiPolygon<f64> {
	let line = |ring: &Ring| ring.iter().map(|p| (p.x, p.y)).collect::<LineString<f64>>();
	polygons
		.iter()
		.filter_map(|polygon| {
			let (exterior, holes) = polygon.split_first()?;
			(!exterior.is_empty()).then(|| geo::Polygon::new(line(exterior), holes.iter().map(line).collect()))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn square(x0: f64, y0: f64, size: f64) -> Ring {
		vec![
			Point::new(x0, y0),
			Point::new(x0 + size, y0),
			Point::new(x0 + size, y0 + size),
			Point::new(x0, y0 + size),
			Point::new(x0, y0),
		]
	}

	fn close(a: Point, b: Point) -> bool {
		a.distance(b) < 1e-9
	}

	/// Andrew's monotone chain; returns the hull counter-clockwise.
	fn convex_hull(points: &[Point]) -> Vec<Point> {
		let mut pts = points.to_vec();
		pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
		pts.dedup();
		if pts.len() < 3 {
			return pts;
		}
		let cross = |o: Point, a: Point, b: Point| (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x);
		let mut hull: Vec<Point> = Vec::new();
		for pass in [pts.clone(), pts.iter().rev().copied().collect()] {
			let start = hull.len();
			for p in pass {
				while hull.len() >= start + 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
					hull.pop();
				}
				hull.push(p);
			}
			hull.pop();
		}
		hull
	}

	fn inside_hull(hull: &[Point], p: Point) -> bool {
		(0..hull.len()).all(|i| {
			let (a, b) = (hull[i], hull[(i + 1) % hull.len()]);
			(b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x) >= -1e-9
		})
	}

	#[test]
	fn centroid_is_area_weighted_not_vertex_mean() {
		// an L shape: vertex mean and area centroid differ
		let ring = vec![
			Point::new(0.0, 0.0),
			Point::new(4.0, 0.0),
			Point::new(4.0, 1.0),
			Point::new(1.0, 1.0),
			Point::new(1.0, 4.0),
			Point::new(0.0, 4.0),
		];
		let c = polygon_centroid(&[vec![ring]]).unwrap();
		// two 4x1 / 1x3 rectangles: (4*(2,0.5) + 3*(0.5,2.5)) / 7
		assert!(close(c, Point::new(9.5 / 7.0, 9.5 / 7.0)));
	}

	#[test]
	fn multipolygon_uses_combined_area_and_holes_subtract() {
		let big = square(0.0, 0.0, 2.0);
		let small = square(10.0, 0.0, 1.0);
		let c = polygon_centroid(&[vec![big.clone()], vec![small]]).unwrap();
		// areas 4 and 1, centroids (1,1) and (10.5,0.5)
		assert!(close(c, Point::new((4.0 + 10.5) / 5.0, (4.0 + 0.5) / 5.0)));

		// hole wound the same way as the exterior still subtracts
		let holed = vec![square(0.0, 0.0, 4.0), square(0.0, 0.0, 2.0)];
		let c = polygon_centroid(&[holed]).unwrap();
		// 16*(2,2) - 4*(1,1) over 12
		assert!(close(c, Point::new(28.0 / 12.0, 28.0 / 12.0)));
	}

	#[test]
	fn degenerate_shapes_fall_back() {
		let line = vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(0.0, 0.0)];
		assert!(close(polygon_centroid(&[vec![line]]).unwrap(), Point::new(1.0, 0.0)));

		let dot = vec![Point::new(3.0, 3.0)];
		assert!(close(polygon_centroid(&[vec![dot]]).unwrap(), Point::new(3.0, 3.0)));

		assert_eq!(polygon_centroid(&[]), None);
		assert_eq!(polygon_centroid(&[vec![vec![]]]), None);
	}

	#[test]
	fn equirectangular_centers_origin_and_puts_north_up() {
		let projection = Equirectangular::centered(200.0, 1440.0, 1080.0);
		assert!(close(projection.project(0.0, 0.0), Point::new(720.0, 540.0)));
		let north = projection.project(0.0, 45.0);
		assert!(north.y < 540.0);
		assert!(close(
			projection.project(180.0, 0.0),
			Point::new(720.0 + std::f64::consts::PI * 200.0, 540.0)
		));
	}

	#[test]
	fn projected_centroids_lie_inside_convex_hull() {
		let country = Country {
			id: "250".into(),
			name: None,
			polygons: vec![
				vec![vec![
					Point::new(-5.0, 42.0),
					Point::new(8.0, 43.0),
					Point::new(7.0, 49.0),
					Point::new(2.0, 51.0),
					Point::new(-4.0, 48.0),
					Point::new(-5.0, 42.0),
				]],
				vec![square(8.5, 41.5, 1.0)],
			],
		};
		let missing = Country {
			id: "0".into(),
			name: None,
			polygons: vec![],
		};
		let projection = Equirectangular::centered(200.0, 960.0, 500.0);
		let geometry = project_countries(&[country, missing], &projection);

		let rings = &geometry.polygons["250"];
		let hull = convex_hull(&rings.iter().flatten().copied().collect::<Vec<_>>());
		assert!(inside_hull(&hull, geometry.centroid("250").unwrap()));
		assert_eq!(geometry.centroid("0"), None);
		assert!(geometry.polygons["0"].is_empty());
	}

	#[test]
	fn closures_are_projections() {
		let flip = |lon: f64, lat: f64| Point::new(lat, lon);
		let geometry = project_countries(
			&[Country {
				id: "1".into(),
				name: None,
				polygons: vec![vec![square(0.0, 0.0, 2.0)]],
			}],
			&flip,
		);
		assert!(close(geometry.centroid("1").unwrap(), Point::new(1.0, 1.0)));
	}
}
