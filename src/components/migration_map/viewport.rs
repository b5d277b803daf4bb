//! Pan and zoom.
//!
//! The transform is absolute state: each gesture replaces it, pans are
//! measured from where the gesture began, and nothing accumulates deltas.

use super::config::MapConfig;
use super::types::Point;

/// `screen = scene * scale + translate`, shared by every layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
	/// Horizontal offset in screen pixels.
	pub translate_x: f64,
	/// Vertical offset in screen pixels.
	pub translate_y: f64,
	/// Zoom factor.
	pub scale: f64,
}

impl Default for ViewportTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewportTransform {
	/// No pan, no zoom.
	pub const IDENTITY: Self = Self {
		translate_x: 0.0,
		translate_y: 0.0,
		scale: 1.0,
	};

	/// A transform from its parts.
	pub fn new(translate_x: f64, translate_y: f64, scale: f64) -> Self {
		Self {
			translate_x,
			translate_y,
			scale,
		}
	}

	/// Scene to screen.
	pub fn apply(&self, p: Point) -> Point {
		Point::new(
			p.x * self.scale + self.translate_x,
			p.y * self.scale + self.translate_y,
		)
	}

	/// Screen to scene.
	pub fn invert(&self, p: Point) -> Point {
		Point::new(
			(p.x - self.translate_x) / self.scale,
			(p.y - self.translate_y) / self.scale,
		)
	}

	/// Rescale to `scale` keeping the scene point under `anchor` in place.
	pub fn zoom_at(self, anchor: Point, scale: f64) -> Self {
		let ratio = scale / self.scale;
		Self {
			translate_x: anchor.x - (anchor.x - self.translate_x) * ratio,
			translate_y: anchor.y - (anchor.y - self.translate_y) * ratio,
			scale,
		}
	}
}

/// Raw pointer input, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
	/// Button or finger down.
	PanStart(Point),
	/// Drag; ignored unless a pan is active.
	PanMove(Point),
	/// Button or finger up.
	PanEnd,
	/// Positive `delta_y` zooms out.
	Wheel {
		/// Zoom anchor.
		at: Point,
		/// Wheel delta; only its sign matters.
		delta_y: f64,
	},
	/// Two fingers down.
	PinchStart(Point, Point),
	/// Two fingers moved.
	PinchMove(Point, Point),
	/// Pointer left the canvas; ends any gesture in progress.
	Leave,
	/// Back to the identity transform.
	Reset,
	/// Jump to a given transform, clamped.
	Set(ViewportTransform),
}

#[derive(Clone, Copy, Debug, Default)]
struct PanState {
	active: bool,
	start: Point,
	transform_start: ViewportTransform,
}

#[derive(Clone, Copy, Debug, Default)]
struct PinchState {
	active: bool,
	start_mid: Point,
	start_distance: f64,
	transform_start: ViewportTransform,
}

/// Turns gestures into the next absolute transform.
#[derive(Clone, Debug)]
pub struct ZoomBehavior {
	transform: ViewportTransform,
	pan: PanState,
	pinch: PinchState,
	min_scale: f64,
	max_scale: f64,
	zoom_in: f64,
	zoom_out: f64,
}

impl Default for ZoomBehavior {
	fn default() -> Self {
		Self::new(&MapConfig::default())
	}
}

impl ZoomBehavior {
	/// Identity transform, bounds and factors from `config`.
	pub fn new(config: &MapConfig) -> Self {
		Self {
			transform: ViewportTransform::IDENTITY,
			pan: PanState::default(),
			pinch: PinchState::default(),
			min_scale: config.min_zoom,
			max_scale: config.max_zoom,
			zoom_in: config.zoom_in_factor,
			zoom_out: config.zoom_out_factor,
		}
	}

	/// The current transform.
	pub fn transform(&self) -> ViewportTransform {
		self.transform
	}

	fn clamp_scale(&self, scale: f64) -> f64 {
		if scale.is_finite() {
			scale.clamp(self.min_scale, self.max_scale)
		} else {
			self.transform.scale
		}
	}

	/// Apply one gesture and return the new transform.
	pub fn on_gesture(&mut self, gesture: Gesture) -> ViewportTransform {
		match gesture {
			Gesture::PanStart(at) => {
				self.pan = PanState {
					active: true,
					start: at,
					transform_start: self.transform,
				};
			}
			Gesture::PanMove(at) => {
				if self.pan.active {
					let from = self.pan.transform_start;
					self.transform = ViewportTransform {
						translate_x: from.translate_x + (at.x - self.pan.start.x),
						translate_y: from.translate_y + (at.y - self.pan.start.y),
						..from
					};
				}
			}
			Gesture::PanEnd | Gesture::Leave => {
				self.pan.active = false;
				self.pinch.active = false;
			}
			Gesture::Wheel { at, delta_y } => {
				let factor = if delta_y > 0.0 { self.zoom_out } else { self.zoom_in };
				let scale = self.clamp_scale(self.transform.scale * factor);
				self.transform = self.transform.zoom_at(at, scale);
			}
			Gesture::PinchStart(a, b) => {
				self.pan.active = false;
				self.pinch = PinchState {
					active: true,
					start_mid: a.midpoint(b),
					start_distance: a.distance(b),
					transform_start: self.transform,
				};
			}
			Gesture::PinchMove(a, b) => {
				let pinch = self.pinch;
				if pinch.active && pinch.start_distance > 0.0 {
					let from = pinch.transform_start;
					let scale = self.clamp_scale(from.scale * a.distance(b) / pinch.start_distance);
					// the scene point under the starting midpoint follows the fingers
					let anchor = from.invert(pinch.start_mid);
					let mid = a.midpoint(b);
					self.transform = ViewportTransform {
						translate_x: mid.x - anchor.x * scale,
						translate_y: mid.y - anchor.y * scale,
						scale,
					};
				}
			}
			Gesture::Reset => {
				self.pan.active = false;
				self.pinch.active = false;
				self.transform = ViewportTransform::IDENTITY;
			}
			Gesture::Set(transform) => {
				self.transform = ViewportTransform {
					scale: self.clamp_scale(transform.scale),
					..transform
				};
			}
		}
		self.transform
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn pan_is_measured_from_the_gesture_start() {
		let mut zoom = ZoomBehavior::default();
		zoom.on_gesture(Gesture::PanStart(Point::new(100.0, 100.0)));
		zoom.on_gesture(Gesture::PanMove(Point::new(150.0, 90.0)));
		let t = zoom.on_gesture(Gesture::PanMove(Point::new(130.0, 120.0)));
		assert_eq!(t, ViewportTransform::new(30.0, 20.0, 1.0));

		zoom.on_gesture(Gesture::PanEnd);
		let t = zoom.on_gesture(Gesture::PanMove(Point::new(500.0, 500.0)));
		assert_eq!(t, ViewportTransform::new(30.0, 20.0, 1.0));
	}

	#[test]
	fn wheel_zooms_around_the_pointer() {
		let mut zoom = ZoomBehavior::default();
		let at = Point::new(200.0, 100.0);
		let before = zoom.transform().invert(at);
		let t = zoom.on_gesture(Gesture::Wheel { at, delta_y: -1.0 });
		assert!((t.scale - 1.1).abs() < 1e-12);
		let after = t.apply(before);
		assert!(after.distance(at) < 1e-9);

		let t = zoom.on_gesture(Gesture::Wheel { at, delta_y: 3.0 });
		assert!((t.scale - 0.99).abs() < 1e-12);
	}

	#[test]
	fn scale_is_clamped() {
		let mut zoom = ZoomBehavior::default();
		for _ in 0..100 {
			zoom.on_gesture(Gesture::Wheel {
				at: Point::default(),
				delta_y: -1.0,
			});
		}
		assert_eq!(zoom.transform().scale, 10.0);
		for _ in 0..100 {
			zoom.on_gesture(Gesture::Wheel {
				at: Point::default(),
				delta_y: 1.0,
			});
		}
		assert_eq!(zoom.transform().scale, 0.5);
		let t = zoom.on_gesture(Gesture::Set(ViewportTransform::new(1.0, 2.0, 50.0)));
		assert_eq!(t, ViewportTransform::new(1.0, 2.0, 10.0));
	}

	#[test]
	fn setting_the_same_transform_twice_does_not_drift() {
		let mut zoom = ZoomBehavior::default();
		let target = ViewportTransform::new(10.0, 20.0, 3.0);
		let once = zoom.on_gesture(Gesture::Set(target));
		let twice = zoom.on_gesture(Gesture::Set(target));
		assert_eq!(once, twice);
		assert_eq!(twice, target);
	}

	#[test]
	fn pinch_scales_by_finger_distance() {
		let mut zoom = ZoomBehavior::default();
		zoom.on_gesture(Gesture::PinchStart(Point::new(90.0, 100.0), Point::new(110.0, 100.0)));
		let t = zoom.on_gesture(Gesture::PinchMove(Point::new(80.0, 100.0), Point::new(120.0, 100.0)));
		assert_eq!(t.scale, 2.0);
		assert!(t.apply(Point::new(100.0, 100.0)).distance(Point::new(100.0, 100.0)) < 1e-9);

		zoom.on_gesture(Gesture::Leave);
		let t2 = zoom.on_gesture(Gesture::PinchMove(Point::new(0.0, 0.0), Point::new(500.0, 0.0)));
		assert_eq!(t, t2);
	}

	#[test]
	fn reset_returns_to_identity() {
		let mut zoom = ZoomBehavior::default();
		zoom.on_gesture(Gesture::Set(ViewportTransform::new(5.0, 5.0, 2.0)));
		assert_eq!(zoom.on_gesture(Gesture::Reset), ViewportTransform::IDENTITY);
	}

	#[test]
	fn invert_undoes_apply() {
		let t = ViewportTransform::new(10.0, 20.0, 3.0);
		let p = Point::new(7.0, -4.0);
		assert_eq!(t.apply(p), Point::new(31.0, 8.0));
		assert_eq!(t.invert(t.apply(p)), p);
	}
}
