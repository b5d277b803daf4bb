//! Tuning and styling knobs.

/// Engine tuning. Every value has a sensible default.
#[derive(Clone, Debug, PartialEq)]
pub struct MapConfig {
	/// Name of the topology object holding the countries.
	pub topology_object: String,
	/// Equirectangular scale, pixels per radian.
	pub projection_scale: f64,
	/// One particle traversal, in milliseconds.
	pub duration_ms: f64,
	/// How far the curve's middle control point is raised above the chord.
	pub arc_lift: f64,
	/// Zoom scale bounds.
	pub min_zoom: f64,
	/// Upper zoom bound.
	pub max_zoom: f64,
	/// Scale multiplier per wheel step towards the screen.
	pub zoom_in_factor: f64,
	/// Scale multiplier per wheel step away from it.
	pub zoom_out_factor: f64,
	/// How the scene looks.
	pub style: MapStyle,
}

impl Default for MapConfig {
	fn default() -> Self {
		Self {
			topology_object: "countries".into(),
			projection_scale: 200.0,
			duration_ms: 3000.0,
			arc_lift: 200.0,
			min_zoom: 0.5,
			max_zoom: 10.0,
			zoom_in_factor: 1.1,
			zoom_out_factor: 0.9,
			style: MapStyle::default(),
		}
	}
}

/// Colors and sizes for the drawn scene.
#[derive(Clone, Debug, PartialEq)]
pub struct MapStyle {
	/// Canvas clear color.
	pub background: String,
	/// Fill of countries that send nothing to the focus.
	pub neutral_fill: String,
	/// Border color.
	pub country_stroke: String,
	/// Border width in screen pixels, whatever the zoom.
	pub country_stroke_width: f64,
	/// Opacity of source countries.
	pub source_opacity: f64,
	/// Opacity of every other country.
	pub other_opacity: f64,
	/// Curve width in screen pixels.
	pub curve_width: f64,
	/// Curve opacity.
	pub curve_opacity: f64,
	/// Particle radius in scene units.
	pub particle_radius: f64,
	/// Particle opacity.
	pub particle_opacity: f64,
}

impl Default for MapStyle {
	fn default() -> Self {
		Self {
			background: "#ffffff".into(),
			neutral_fill: "grey".into(),
			country_stroke: "white".into(),
			country_stroke_width: 0.25,
			source_opacity: 1.0,
			other_opacity: 0.5,
			curve_width: 1.6,
			curve_opacity: 0.4,
			particle_radius: 3.0,
			particle_opacity: 0.6,
		}
	}
}
