//! Looping particle traversals along flow curves.
//!
//! Every particle is an independent timed task: it waits out a random delay
//! in `[0, duration)` at the start of its curve, then traverses the curve in
//! `duration` and immediately starts over. Tasks are grouped per edge and are
//! only ever cancelled through the edge.
//!
//! Stopping comes in two flavors:
//! - [`StopMode::Interrupt`] drops every task of the edge synchronously. Once
//!   the call returns, the edge reports no particles.
//! - [`StopMode::Drain`] drops particles still waiting out their delay and
//!   lets each moving particle finish its current traversal; the edge stops
//!   when the last one arrives, at most one `duration` later.
//!
//! Focus changes and teardown always interrupt.

use std::collections::BTreeMap;

use log::debug;
use rand::Rng;

/// One traversal when no valid duration is given.
pub const DEFAULT_DURATION_MS: f64 = 3000.0;

/// Source of per-particle start delays.
pub trait PhaseJitter {
	/// A delay in `[0, duration)`.
	fn delay(&mut self, duration: f64) -> f64;
}

impl<R: Rng> PhaseJitter for R {
	fn delay(&mut self, duration: f64) -> f64 {
		if duration > 0.0 {
			self.gen_range(0.0..duration)
		} else {
			0.0
		}
	}
}

/// Lifecycle of an edge's animation, as seen through its handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgePhase {
	/// Particles loop until stopped.
	Running,
	/// Traversals in flight finish, then the edge stops.
	Draining,
	/// Terminal; the edge holds no tasks.
	Stopped,
}

/// How [`Animator::stop`] ends an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopMode {
	/// Remove every particle now.
	Interrupt,
	/// Drop waiting particles and let moving ones arrive.
	Drain,
}

/// Ties a caller to the animation it started. A handle from an earlier
/// `start` of the same key no longer controls the edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationHandle<K> {
	/// The animated edge.
	pub key: K,
	generation: u64,
}

/// A particle's place on its curve for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleFrame {
	/// Position among the edge's particles.
	pub index: usize,
	/// Arc-length fraction in `[0, 1)`; `0.0` while waiting.
	pub progress: f64,
	/// Still inside its start delay.
	pub waiting: bool,
}

#[derive(Clone, Debug)]
struct ParticleTask {
	index: usize,
	/// Start of the first traversal.
	anchor: f64,
	/// Set while draining: the end of the traversal in flight.
	deadline: Option<f64>,
}

#[derive(Clone, Debug)]
struct EdgeAnimation {
	generation: u64,
	phase: EdgePhase,
	tasks: Vec<ParticleTask>,
}

/// Particle tasks of every animated edge, keyed by `K`.
#[derive(Clone, Debug)]
pub struct Animator<K> {
	duration: f64,
	now: f64,
	next_generation: u64,
	edges: BTreeMap<K, EdgeAnimation>,
}

impl<K: Ord + Clone + std::fmt::Debug> Animator<K> {
	/// A non-positive or non-finite duration falls back to the default.
	pub fn new(duration: f64) -> Self {
		let duration = if duration.is_finite() && duration > 0.0 {
			duration
		} else {
			DEFAULT_DURATION_MS
		};
		Self {
			duration,
			now: 0.0,
			next_generation: 0,
			edges: BTreeMap::new(),
		}
	}

	/// Milliseconds per traversal.
	pub fn duration(&self) -> f64 {
		self.duration
	}

	/// The clock as of the last `advance`.
	pub fn now(&self) -> f64 {
		self.now
	}

	/// Start `count` particles on `key` at time `now`.
	///
	/// A key that is already animating is interrupted first.
	pub fn start<J: PhaseJitter + ?Sized>(
		&mut self,
		key: K,
		count: usize,
		now: f64,
		jitter: &mut J,
	) -> AnimationHandle<K> {
		self.advance(now);
		if self.edges.contains_key(&key) {
			self.cancel(&key);
		}

		let duration = self.duration;
		let tasks = (0..count)
			.map(|index| {
				let delay = jitter.delay(duration);
				let delay = if delay.is_finite() {
					delay.clamp(0.0, duration)
				} else {
					0.0
				};
				ParticleTask {
					index,
					anchor: self.now + delay,
					deadline: None,
				}
			})
			.collect();

		let generation = self.next_generation;
		self.next_generation += 1;
		debug!("animating {count} particles on {key:?}");
		self.edges.insert(
			key.clone(),
			EdgeAnimation {
				generation,
				phase: EdgePhase::Running,
				tasks,
			},
		);
		AnimationHandle { key, generation }
	}

	/// Stop the edge `handle` started. Stale handles do nothing.
	pub fn stop(&mut self, handle: &AnimationHandle<K>, mode: StopMode) {
		let now = self.now;
		let duration = self.duration;
		let Some(edge) = self.edges.get_mut(&handle.key) else {
			return;
		};
		if edge.generation != handle.generation {
			return;
		}
		match mode {
			StopMode::Interrupt => self.cancel(&handle.key),
			StopMode::Drain => {
				if edge.phase == EdgePhase::Draining {
					return;
				}
				edge.phase = EdgePhase::Draining;
				edge.tasks.retain_mut(|task| {
					if now < task.anchor {
						return false;
					}
					let loops = ((now - task.anchor) / duration).floor() + 1.0;
					task.deadline = Some(task.anchor + loops * duration);
					true
				});
				if edge.tasks.is_empty() {
					self.cancel(&handle.key);
				}
			}
		}
	}

	/// Interrupt every edge.
	pub fn stop_all(&mut self) {
		if !self.edges.is_empty() {
			debug!("interrupting {} animated edges", self.edges.len());
		}
		self.edges.clear();
	}

	/// [`EdgePhase::Stopped`] for stale handles.
	pub fn phase(&self, handle: &AnimationHandle<K>) -> EdgePhase {
		match self.edges.get(&handle.key) {
			Some(edge) if edge.generation == handle.generation => edge.phase,
			_ => EdgePhase::Stopped,
		}
	}

	/// Move the clock forward; drained particles whose traversal ended are
	/// released, and edges left without particles stop.
	pub fn advance(&mut self, now: f64) {
		if now.is_finite() && now > self.now {
			self.now = now;
		}
		let now = self.now;
		let mut finished = Vec::new();
		for (key, edge) in &mut self.edges {
			if edge.phase != EdgePhase::Draining {
				continue;
			}
			edge.tasks
				.retain(|task| task.deadline.is_some_and(|deadline| now < deadline));
			if edge.tasks.is_empty() {
				finished.push(key.clone());
			}
		}
		for key in finished {
			self.cancel(&key);
		}
	}

	/// Particles of one edge at the current clock.
	pub fn particles_of<'a>(&'a self, key: &K) -> impl Iterator<Item = ParticleFrame> + 'a {
		let now = self.now;
		let duration = self.duration;
		self.edges
			.get(key)
			.into_iter()
			.flat_map(|edge| edge.tasks.iter())
			.map(move |task| task_frame(task, now, duration))
	}

	/// Every live particle, ordered by edge key then particle index.
	pub fn particles(&self) -> impl Iterator<Item = (&K, ParticleFrame)> {
		let now = self.now;
		let duration = self.duration;
		self.edges.iter().flat_map(move |(key, edge)| {
			edge.tasks
				.iter()
				.map(move |task| (key, task_frame(task, now, duration)))
		})
	}

	/// Advance to `now` and collect the frame.
	pub fn frame(&mut self, now: f64) -> Vec<(K, ParticleFrame)> {
		self.advance(now);
		self.particles()
			.map(|(key, frame)| (key.clone(), frame))
			.collect()
	}

	/// Particles across all edges, waiting or moving.
	pub fn particle_count(&self) -> usize {
		self.edges.values().map(|edge| edge.tasks.len()).sum()
	}

	/// No edge holds a particle.
	pub fn is_idle(&self) -> bool {
		self.edges.is_empty()
	}

	fn cancel(&mut self, key: &K) {
		if self.edges.remove(key).is_some() {
			debug!("stopped {key:?}");
		}
	}
}

fn task_frame(task: &ParticleTask, now: f64, duration: f64) -> ParticleFrame {
	if now < task.anchor {
		return ParticleFrame {
			index: task.index,
			progress: 0.0,
			waiting: true,
		};
	}
	let elapsed = now - task.anchor;
	ParticleFrame {
		index: task.index,
		progress: (elapsed % duration) / duration,
		waiting: false,
	}
}
