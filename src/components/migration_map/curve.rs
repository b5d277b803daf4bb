//! Arced flow paths.
//!
//! A flow is drawn as a uniform cubic B-spline through three control points
//! (start, raised midpoint, end) with clamped ends. The realized path is a
//! short line, two cubic Béziers and another short line; it is C1 and does
//! not pass through the middle control point.

use super::types::Point;

const SAMPLES_PER_CUBIC: usize = 32;

/// One piece of the realized path, continuing from the previous piece's end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
	/// Straight to `to`.
	Line {
		/// End point.
		to: Point,
	},
	/// Cubic Bézier to `to`.
	Cubic {
		/// First control point.
		c1: Point,
		/// Second control point.
		c2: Point,
		/// End point.
		to: Point,
	},
}

/// A basis spline from a source centroid, over a raised middle, into the
/// destination centroid.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowCurve {
	controls: [Point; 3],
	segments: Vec<Segment>,
	// flattened path and cumulative length at each sample
	samples: Vec<Point>,
	lengths: Vec<f64>,
}

fn weighted(terms: &[(f64, Point)]) -> Point {
	let total: f64 = terms.iter().map(|(w, _)| w).sum();
	let (x, y) = terms
		.iter()
		.fold((0.0, 0.0), |(x, y), (w, p)| (x + w * p.x, y + w * p.y));
	Point::new(x / total, y / total)
}

fn cubic_at(from: Point, c1: Point, c2: Point, to: Point, t: f64) -> Point {
	let u = 1.0 - t;
	let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
	Point::new(
		a * from.x + b * c1.x + c * c2.x + d * to.x,
		a * from.y + b * c1.y + c * c2.y + d * to.y,
	)
}

impl FlowCurve {
	/// Arc from `start` to `end`, its middle control point `lift` units above
	/// the chord midpoint (screen y grows downward).
	///
	/// A zero-length chord gets no lift: every control point is `start` and
	/// the curve is a single point.
	pub fn new(start: Point, end: Point, lift: f64) -> Self {
		let lift = if start.distance(end) > f64::EPSILON && lift.is_finite() {
			lift
		} else {
			0.0
		};
		let mid = start.midpoint(end);
		let controls = [start, Point::new(mid.x, mid.y - lift), end];
		let segments = basis_segments(controls);

		let mut samples = vec![start];
		let mut from = start;
		for segment in &segments {
			match *segment {
				Segment::Line { to } => {
					samples.push(to);
					from = to;
				}
				Segment::Cubic { c1, c2, to } => {
					samples.extend(
						(1..=SAMPLES_PER_CUBIC)
							.map(|i| cubic_at(from, c1, c2, to, i as f64 / SAMPLES_PER_CUBIC as f64)),
					);
					from = to;
				}
			}
		}
		let mut lengths = Vec::with_capacity(samples.len());
		let mut total = 0.0;
		lengths.push(0.0);
		for pair in samples.windows(2) {
			total += pair[0].distance(pair[1]);
			lengths.push(total);
		}

		Self {
			controls,
			segments,
			samples,
			lengths,
		}
	}

	/// Start, lifted middle, end.
	pub fn controls(&self) -> [Point; 3] {
		self.controls
	}

	/// Where particles begin.
	pub fn start(&self) -> Point {
		self.controls[0]
	}

	/// Where particles arrive.
	pub fn end(&self) -> Point {
		self.controls[2]
	}

	/// Path pieces after `start()`.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Approximate arc length of the realized path.
	pub fn length(&self) -> f64 {
		self.lengths.last().copied().unwrap_or(0.0)
	}

	/// The point at arc-length fraction `t`, clamped to [0, 1].
	pub fn point_at(&self, t: f64) -> Point {
		let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
		let total = self.length();
		if total <= 0.0 {
			return self.start();
		}
		let target = t * total;
		let i = self.lengths.partition_point(|&l| l < target);
		if i == 0 {
			return self.samples[0];
		}
		if i >= self.samples.len() {
			return self.end();
		}
		let (l0, l1) = (self.lengths[i - 1], self.lengths[i]);
		let f = if l1 > l0 { (target - l0) / (l1 - l0) } else { 0.0 };
		self.samples[i - 1].lerp(self.samples[i], f)
	}
}

/// Clamped uniform B-spline through three control points, as Bézier pieces.
fn basis_segments([p0, p1, p2]: [Point; 3]) -> Vec<Segment> {
	vec![
		Segment::Line {
			to: weighted(&[(5.0, p0), (1.0, p1)]),
		},
		Segment::Cubic {
			c1: weighted(&[(2.0, p0), (1.0, p1)]),
			c2: weighted(&[(1.0, p0), (2.0, p1)]),
			to: weighted(&[(1.0, p0), (4.0, p1), (1.0, p2)]),
		},
		Segment::Cubic {
			c1: weighted(&[(2.0, p1), (1.0, p2)]),
			c2: weighted(&[(1.0, p1), (2.0, p2)]),
			to: weighted(&[(1.0, p1), (5.0, p2)]),
		},
		Segment::Line { to: p2 },
	]
}
