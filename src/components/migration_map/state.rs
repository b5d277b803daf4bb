//! Map state owned by the host between frames.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::animator::{AnimationHandle, Animator, EdgePhase, PhaseJitter, StopMode};
use super::config::MapConfig;
use super::curve::FlowCurve;
use super::error::Result;
use super::flows::{EdgeKey, FlowEdge, flow_edges, select_flows};
use super::geometry::{Equirectangular, ProjectedGeometry, project_countries};
use super::index::NameIdIndex;
use super::scale::{ColorScale, CountScale};
use super::scene::{ParticlePosition, Scene, SceneInput, compose};
use super::topology::{Country, Topology};
use super::types::MigrationRecord;
use super::viewport::{Gesture, ViewportTransform, ZoomBehavior};

/// A drawn flow: its edge, its curve and the animation running on it.
#[derive(Clone, Debug)]
pub struct ActiveFlow {
	/// Source, destination and anchors.
	pub edge: FlowEdge,
	/// Path the particles follow.
	pub curve: FlowCurve,
	/// Particle count from the count scale.
	pub particles: usize,
	/// Controls the flow's animation.
	pub handle: AnimationHandle<EdgeKey>,
}

/// Everything the map view needs between frames.
///
/// The host owns this value and drives it: `set_focus`, `set_dataset` and
/// `resize` rebuild flows, `on_gesture` replaces the transform, `tick`
/// advances the animation clock and `scene` reads it all out.
pub struct MapState<J: PhaseJitter = StdRng> {
	/// Settings the state was built with.
	pub config: MapConfig,
	/// Viewport width in pixels.
	pub width: f64,
	/// Viewport height in pixels.
	pub height: f64,
	countries: Vec<Country>,
	geometry: ProjectedGeometry,
	records: Vec<MigrationRecord>,
	index: NameIdIndex,
	focus: Option<String>,
	flows: Vec<ActiveFlow>,
	color_scale: ColorScale,
	count_scale: CountScale,
	animator: Animator<EdgeKey>,
	zoom: ZoomBehavior,
	jitter: J,
	torn_down: bool,
}

impl MapState<StdRng> {
	/// Decode the topology and project it for a `width` by `height` viewport,
	/// with entropy-seeded particle delays. No focus is set.
	pub fn new(
		topology: &Topology,
		records: Vec<MigrationRecord>,
		width: f64,
		height: f64,
		config: MapConfig,
	) -> Result<Self> {
		Self::with_jitter(topology, records, width, height, config, StdRng::from_entropy())
	}
}

impl<J: PhaseJitter> MapState<J> {
	/// Like [`MapState::new`], with delays drawn from `jitter`.
	pub fn with_jitter(
		topology: &Topology,
		records: Vec<MigrationRecord>,
		width: f64,
		height: f64,
		config: MapConfig,
		jitter: J,
	) -> Result<Self> {
		let countries = topology.countries(&config.topology_object)?;
		let index = NameIdIndex::from_records(&records);
		let projection = Equirectangular::centered(config.projection_scale, width, height);
		let geometry = project_countries(&countries, &projection);
		info!(
			"map ready: {} countries, {} records, {} indexed names",
			countries.len(),
			records.len(),
			index.len()
		);

		Ok(Self {
			animator: Animator::new(config.duration_ms),
			zoom: ZoomBehavior::new(&config),
			config,
			width,
			height,
			countries,
			geometry,
			records,
			index,
			focus: None,
			flows: Vec::new(),
			color_scale: ColorScale::default(),
			count_scale: CountScale::default(),
			jitter,
			torn_down: false,
		})
	}

	/// Current focus id.
	pub fn focus(&self) -> Option<&str> {
		self.focus.as_deref()
	}

	/// Flows drawn for the focus, running or draining.
	pub fn flows(&self) -> &[ActiveFlow] {
		&self.flows
	}

	/// Decoded countries.
	pub fn countries(&self) -> &[Country] {
		&self.countries
	}

	/// Projection for the current viewport size.
	pub fn geometry(&self) -> &ProjectedGeometry {
		&self.geometry
	}

	/// Particle scheduler.
	pub fn animator(&self) -> &Animator<EdgeKey> {
		&self.animator
	}

	/// Current pan and zoom.
	pub fn transform(&self) -> ViewportTransform {
		self.zoom.transform()
	}

	/// Select the destination whose flows are drawn. Empty or `None` clears it.
	///
	/// Returns `false` when the focus did not change.
	pub fn set_focus(&mut self, focus: Option<&str>, now: f64) -> bool {
		let focus = focus.filter(|f| !f.is_empty()).map(str::to_owned);
		if focus == self.focus {
			return false;
		}
		info!("focus {:?} -> {:?}", self.focus, focus);
		self.focus = focus;
		self.rebuild_flows(now);
		true
	}

	/// Replace the records and rebuild the name index and flows.
	pub fn set_dataset(&mut self, records: Vec<MigrationRecord>, now: f64) {
		self.index = NameIdIndex::from_records(&records);
		self.records = records;
		self.rebuild_flows(now);
	}

	/// Reproject for a new viewport size; centroids and curves follow.
	pub fn resize(&mut self, width: f64, height: f64, now: f64) {
		if width == self.width && height == self.height {
			return;
		}
		self.width = width;
		self.height = height;
		let projection = Equirectangular::centered(self.config.projection_scale, width, height);
		self.geometry = project_countries(&self.countries, &projection);
		self.rebuild_flows(now);
	}

	/// Feed one gesture to the zoom behavior.
	pub fn on_gesture(&mut self, gesture: Gesture) -> ViewportTransform {
		self.zoom.on_gesture(gesture)
	}

	/// Advance the animation clock. Drained flows leave once their last
	/// particle arrives.
	pub fn tick(&mut self, now: f64) {
		self.animator.advance(now);
		let animator = &self.animator;
		self.flows
			.retain(|flow| animator.phase(&flow.handle) != EdgePhase::Stopped);
	}

	/// Retire one flow. With [`StopMode::Drain`] its curve and moving
	/// particles stay until the traversals in flight complete.
	pub fn remove_flow(&mut self, key: &EdgeKey, mode: StopMode) {
		let Some(flow) = self.flows.iter().find(|f| &f.handle.key == key) else {
			return;
		};
		self.animator.stop(&flow.handle, mode);
		let animator = &self.animator;
		self.flows
			.retain(|flow| animator.phase(&flow.handle) != EdgePhase::Stopped);
	}

	/// Interrupt every animation and drop the flows for good: later focus,
	/// dataset or size changes are recorded but start nothing.
	pub fn teardown(&mut self) {
		self.interrupt_flows();
		self.torn_down = true;
	}

	/// Whether [`teardown`](Self::teardown) has run.
	pub fn is_torn_down(&self) -> bool {
		self.torn_down
	}

	fn interrupt_flows(&mut self) {
		self.animator.stop_all();
		self.flows.clear();
	}

	fn rebuild_flows(&mut self, now: f64) {
		// the old focus must be gone before the new one starts
		self.interrupt_flows();
		if self.torn_down {
			return;
		}

		let Some(focus) = self.focus.as_deref() else {
			self.color_scale = ColorScale::default();
			self.count_scale = CountScale::default();
			return;
		};
		let sources = select_flows(&self.records, focus, &self.index);
		let edges = flow_edges(&sources, focus, &self.geometry.centroids);
		self.color_scale = ColorScale::new(edges.iter().map(|e| e.magnitude));
		self.count_scale = CountScale::new(edges.iter().map(|e| e.magnitude));
		debug!(
			"focus {focus}: {} sources selected, {} drawable",
			sources.len(),
			edges.len()
		);

		for edge in edges {
			let particles = self.count_scale.apply(edge.magnitude);
			let curve = FlowCurve::new(edge.start, edge.end, self.config.arc_lift);
			let handle = self
				.animator
				.start(edge.key(), particles, now, &mut self.jitter);
			self.flows.push(ActiveFlow {
				edge,
				curve,
				particles,
				handle,
			});
		}
	}

	/// Every particle placed on its curve at the current clock.
	pub fn particle_positions(&self) -> Vec<ParticlePosition> {
		self.flows
			.iter()
			.flat_map(|flow| {
				self.animator
					.particles_of(&flow.handle.key)
					.map(move |frame| ParticlePosition {
						key: flow.handle.key.clone(),
						index: frame.index,
						position: flow.curve.point_at(frame.progress),
					})
			})
			.collect()
	}

	/// The frame to draw.
	pub fn scene(&self) -> Scene {
		let edges: Vec<FlowEdge> = self.flows.iter().map(|f| f.edge.clone()).collect();
		let curves: Vec<FlowCurve> = self.flows.iter().map(|f| f.curve.clone()).collect();
		compose(SceneInput {
			countries: &self.countries,
			polygons: &self.geometry.polygons,
			flows: &edges,
			curves: &curves,
			color_scale: &self.color_scale,
			particles: &self.particle_positions(),
			transform: self.zoom.transform(),
			style: &self.config.style,
		})
	}
}
