//! Sequential color ramp for flow magnitudes.

use std::fmt;

/// An 8-bit sRGB color; formats as a CSS `rgb(..)` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
	}
}

/// Green's cubehelix: hue in degrees, saturation, lightness in [0, 1].
fn cubehelix(h: f64, s: f64, l: f64) -> Rgb {
	const A: f64 = -0.14861;
	const B: f64 = 1.78277;
	const C: f64 = -0.29227;
	const D: f64 = -0.90649;
	const E: f64 = 1.97294;

	let h = (h + 120.0).to_radians();
	let amp = s * l * (1.0 - l);
	let (sin_h, cos_h) = h.sin_cos();
	let channel = |v: f64| (255.0 * v).round().clamp(0.0, 255.0) as u8;
	Rgb {
		r: channel(l + amp * (A * cos_h + B * sin_h)),
		g: channel(l + amp * (C * cos_h + D * sin_h)),
		b: channel(l + amp * (E * cos_h)),
	}
}

/// The "warm" ramp: purple through red and orange to yellow-green.
///
/// Long-way hue interpolation from −100° to 80°; `t` is clamped to [0, 1].
pub fn warm(t: f64) -> Rgb {
	let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
	cubehelix(-100.0 + 180.0 * t, 0.75 + 0.75 * t, 0.35 + 0.45 * t)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn warm_endpoints() {
		// reference values of the d3 warm ramp
		assert_eq!(warm(0.0), Rgb { r: 110, g: 64, b: 170 });
		assert_eq!(warm(1.0), Rgb { r: 175, g: 240, b: 91 });
		assert_eq!(warm(-3.0), warm(0.0));
		assert_eq!(warm(f64::NAN), warm(0.0));
	}

	#[test]
	fn warm_midpoint_is_red_orange() {
		let mid = warm(0.5);
		assert!(mid.r > mid.g && mid.r > mid.b);
	}

	#[test]
	fn formats_as_css() {
		assert_eq!(Rgb { r: 1, g: 2, b: 3 }.to_string(), "rgb(1, 2, 3)");
	}
}
