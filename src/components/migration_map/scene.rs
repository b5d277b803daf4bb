//! Drawable description of the map for one frame.

use std::collections::HashMap;

use super::color::warm;
use super::config::MapStyle;
use super::curve::{FlowCurve, Segment};
use super::flows::{EdgeKey, FlowEdge};
use super::scale::ColorScale;
use super::topology::Country;
use super::types::{Point, Ring};
use super::viewport::ViewportTransform;

/// Draw order, bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
	/// Filled country shapes.
	Countries,
	/// Flow curves.
	Flows,
	/// Moving dots.
	Particles,
}

/// One country, styled for the current focus.
#[derive(Clone, Debug, PartialEq)]
pub struct CountryShape {
	/// Country id.
	pub id: String,
	/// Projected rings, filled together.
	pub rings: Vec<Ring>,
	/// CSS fill color.
	pub fill: String,
	/// Fill opacity.
	pub opacity: f64,
	/// Sends migrants to the focus.
	pub is_source: bool,
}

/// One flow curve, stroked.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveShape {
	/// The flow drawn.
	pub key: EdgeKey,
	/// Path start.
	pub start: Point,
	/// Path pieces after `start`.
	pub segments: Vec<Segment>,
	/// CSS stroke color.
	pub color: String,
	/// Stroke width in screen pixels.
	pub width: f64,
	/// Stroke opacity.
	pub opacity: f64,
}

/// One particle dot.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleShape {
	/// Flow it travels on.
	pub key: EdgeKey,
	/// Index among that flow's particles.
	pub index: usize,
	/// Center, in scene coordinates.
	pub position: Point,
	/// Radius.
	pub radius: f64,
	/// CSS fill color, same as its curve.
	pub color: String,
	/// Fill opacity.
	pub opacity: f64,
}

/// A particle already placed on its curve.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticlePosition {
	/// Flow it travels on.
	pub key: EdgeKey,
	/// Index among that flow's particles.
	pub index: usize,
	/// Point on the curve.
	pub position: Point,
}

/// Everything drawn in one frame, bottom layer first.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	/// Applied once to every layer.
	pub transform: ViewportTransform,
	/// Canvas clear color.
	pub background: String,
	/// Border color of every country.
	pub country_stroke: String,
	/// Border width in screen pixels.
	pub country_stroke_width: f64,
	/// Bottom layer.
	pub countries: Vec<CountryShape>,
	/// Middle layer.
	pub curves: Vec<CurveShape>,
	/// Top layer.
	pub particles: Vec<ParticleShape>,
}

impl Scene {
	/// Draw order.
	pub const LAYERS: [Layer; 3] = [Layer::Countries, Layer::Flows, Layer::Particles];

	/// Every drawn point of a layer in scene coordinates.
	pub fn points(&self, layer: Layer) -> Vec<Point> {
		match layer {
			Layer::Countries => self
				.countries
				.iter()
				.flat_map(|c| c.rings.iter().flatten().copied())
				.collect(),
			Layer::Flows => self
				.curves
				.iter()
				.flat_map(|c| {
					std::iter::once(c.start).chain(c.segments.iter().map(|s| match *s {
						Segment::Line { to } | Segment::Cubic { to, .. } => to,
					}))
				})
				.collect(),
			Layer::Particles => self.particles.iter().map(|p| p.position).collect(),
		}
	}
}

/// Everything the composer reads. `curves[i]` belongs to `flows[i]`.
pub struct SceneInput<'a> {
	/// Every country, drawn or not.
	pub countries: &'a [Country],
	/// Projected rings by country id.
	pub polygons: &'a HashMap<String, Vec<Ring>>,
	/// Flows of the current focus.
	pub flows: &'a [FlowEdge],
	/// One curve per flow.
	pub curves: &'a [FlowCurve],
	/// Maps magnitudes to the color ramp.
	pub color_scale: &'a ColorScale,
	/// Particles placed on their curves.
	pub particles: &'a [ParticlePosition],
	/// Current pan and zoom.
	pub transform: ViewportTransform,
	/// Colors and sizes.
	pub style: &'a MapStyle,
}

/// Style and collect one frame. Pure.
pub fn compose(input: SceneInput<'_>) -> Scene {
	let style = input.style;
	let color_of = |magnitude: f64| warm(input.color_scale.apply(magnitude)).to_string();
	let sources: HashMap<&str, f64> = input
		.flows
		.iter()
		.map(|f| (f.source_id.as_str(), f.magnitude))
		.collect();

	let countries = input
		.countries
		.iter()
		.map(|country| {
			let magnitude = sources.get(country.id.as_str()).copied();
			CountryShape {
				id: country.id.clone(),
				rings: input.polygons.get(&country.id).cloned().unwrap_or_default(),
				fill: magnitude.map_or_else(|| style.neutral_fill.clone(), color_of),
				opacity: if magnitude.is_some() {
					style.source_opacity
				} else {
					style.other_opacity
				},
				is_source: magnitude.is_some(),
			}
		})
		.collect();

	let flow_colors: HashMap<EdgeKey, String> = input
		.flows
		.iter()
		.map(|f| (f.key(), color_of(f.magnitude)))
		.collect();

	let curves = input
		.flows
		.iter()
		.zip(input.curves)
		.map(|(flow, curve)| CurveShape {
			key: flow.key(),
			start: curve.start(),
			segments: curve.segments().to_vec(),
			color: flow_colors[&flow.key()].clone(),
			width: style.curve_width,
			opacity: style.curve_opacity,
		})
		.collect();

	let particles = input
		.particles
		.iter()
		.filter_map(|p| {
			// particles of flows no longer in the scene are not drawn
			let color = flow_colors.get(&p.key)?;
			Some(ParticleShape {
				key: p.key.clone(),
				index: p.index,
				position: p.position,
				radius: style.particle_radius,
				color: color.clone(),
				opacity: style.particle_opacity,
			})
		})
		.collect();

	Scene {
		transform: input.transform,
		background: style.background.clone(),
		country_stroke: style.country_stroke.clone(),
		country_stroke_width: style.country_stroke_width,
		countries,
		curves,
		particles,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn country(id: &str) -> Country {
		Country {
			id: id.into(),
			name: None,
			polygons: vec![],
		}
	}

	fn edge(source: &str, magnitude: f64, start: Point) -> FlowEdge {
		FlowEdge {
			source_id: source.into(),
			source_name: source.into(),
			destination_id: "1".into(),
			magnitude,
			start,
			end: Point::new(0.0, 0.0),
		}
	}

	#[test]
	fn sources_are_colored_and_others_neutral() {
		let countries = [country("1"), country("2"), country("3")];
		let polygons = HashMap::from([("2".to_string(), vec![vec![Point::new(1.0, 1.0)]])]);
		let flows = [edge("2", 100.0, Point::new(10.0, 0.0))];
		let curves = [FlowCurve::new(flows[0].start, flows[0].end, 20.0)];
		let style = MapStyle::default();
		let scene = compose(SceneInput {
			countries: &countries,
			polygons: &polygons,
			flows: &flows,
			curves: &curves,
			color_scale: &ColorScale::new([100.0]),
			particles: &[],
			transform: ViewportTransform::IDENTITY,
			style: &style,
		});

		let by_id: HashMap<_, _> = scene.countries.iter().map(|c| (c.id.as_str(), c)).collect();
		assert!(by_id["2"].is_source);
		assert_eq!(by_id["2"].fill, warm(0.5).to_string());
		assert_eq!(by_id["2"].opacity, 1.0);
		assert_eq!(by_id["2"].rings.len(), 1);
		for id in ["1", "3"] {
			assert_eq!(by_id[id].fill, "grey");
			assert_eq!(by_id[id].opacity, 0.5);
			assert!(by_id[id].rings.is_empty());
		}
		assert_eq!(scene.curves.len(), 1);
		assert_eq!(scene.curves[0].color, by_id["2"].fill);
	}

	#[test]
	fn particles_take_their_flow_color_and_orphans_are_skipped() {
		let flows = [edge("2", 10.0, Point::new(5.0, 5.0)), edge("3", 1000.0, Point::new(9.0, 9.0))];
		let curves: Vec<_> = flows.iter().map(|f| FlowCurve::new(f.start, f.end, 1.0)).collect();
		let orphan = EdgeKey {
			source: "9".into(),
			destination: "8".into(),
		};
		let particles = [
			ParticlePosition {
				key: flows[1].key(),
				index: 0,
				position: Point::new(1.0, 2.0),
			},
			ParticlePosition {
				key: orphan,
				index: 0,
				position: Point::new(3.0, 4.0),
			},
		];
		let scene = compose(SceneInput {
			countries: &[],
			polygons: &HashMap::new(),
			flows: &flows,
			curves: &curves,
			color_scale: &ColorScale::new([10.0, 1000.0]),
			particles: &particles,
			transform: ViewportTransform::IDENTITY,
			style: &MapStyle::default(),
		});

		assert_eq!(scene.particles.len(), 1);
		assert_eq!(scene.particles[0].color, warm(1.0).to_string());
		assert_eq!(scene.curves[0].color, warm(0.0).to_string());
		assert_eq!(scene.points(Layer::Particles), vec![Point::new(1.0, 2.0)]);
	}
}
