//! Magnitude scales for one focus selection.
//!
//! Both scales are fixed to the `[min, max]` of the selected magnitudes. A
//! single-valued or empty domain maps everything to the range midpoint.

/// Fewest particles on a drawn flow.
pub const MIN_PARTICLES: usize = 1;
/// Most particles on a drawn flow.
pub const MAX_PARTICLES: usize = 10;

fn extent(values: impl IntoIterator<Item = f64>, keep: impl Fn(f64) -> bool) -> Option<(f64, f64)> {
	values
		.into_iter()
		.filter(|v| v.is_finite() && keep(*v))
		.fold(None, |acc, v| match acc {
			None => Some((v, v)),
			Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
		})
}

/// Logarithmic `[min, max] → [0, 1]`, clamped.
///
/// Magnitudes must be positive; zero flows are filtered before this scale.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorScale {
	domain: Option<(f64, f64)>,
}

impl ColorScale {
	/// Fit the domain to the given magnitudes.
	pub fn new(magnitudes: impl IntoIterator<Item = f64>) -> Self {
		Self {
			domain: extent(magnitudes, |v| v > 0.0),
		}
	}

	/// `None` when built from no magnitudes.
	pub fn domain(&self) -> Option<(f64, f64)> {
		self.domain
	}

	/// Position of `magnitude` in `[0, 1]`.
	pub fn apply(&self, magnitude: f64) -> f64 {
		match self.domain {
			Some((lo, hi)) if hi > lo => {
				let t = (magnitude.ln() - lo.ln()) / (hi.ln() - lo.ln());
				if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
			}
			_ => 0.5,
		}
	}
}

/// Linear `[min, max] → {1..=10}` particle count, clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CountScale {
	domain: Option<(f64, f64)>,
}

impl CountScale {
	/// Fit the domain to the given magnitudes.
	pub fn new(magnitudes: impl IntoIterator<Item = f64>) -> Self {
		Self {
			domain: extent(magnitudes, |_| true),
		}
	}

	/// `None` when built from no magnitudes.
	pub fn domain(&self) -> Option<(f64, f64)> {
		self.domain
	}

	/// Zero for a non-finite magnitude.
	pub fn apply(&self, magnitude: f64) -> usize {
		if !magnitude.is_finite() {
			return 0;
		}
		let (lo_n, hi_n) = (MIN_PARTICLES as f64, MAX_PARTICLES as f64);
		let t = match self.domain {
			Some((lo, hi)) if hi > lo => ((magnitude - lo) / (hi - lo)).clamp(0.0, 1.0),
			_ => 0.5,
		};
		(lo_n + (hi_n - lo_n) * t).round() as usize
	}
}
