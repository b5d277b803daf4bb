//! Errors for malformed map input.

use thiserror::Error;

/// Malformed input rejected at the engine boundary.
///
/// Data mismatches (unknown names, missing centroids, unknown focus) are not
/// errors; those elements are simply not drawn.
#[derive(Debug, Error)]
pub enum MapError {
	/// The topology has no object under the expected key.
	#[error("topology has no object named `{0}`")]
	MissingObject(String),

	/// The object exists but holds no geometries at all.
	#[error("topology object `{0}` contains no country geometries")]
	NoCountries(String),

	/// A geometry points past the end of the arc table.
	#[error("geometry `{id}` references arc {arc}, but the topology has {available} arcs")]
	ArcOutOfRange {
		/// Offending geometry.
		id: String,
		/// Arc reference as written, possibly negative.
		arc: i64,
		/// Length of the arc table.
		available: usize,
	},

	/// Input text could not be decoded.
	#[error("failed to decode input: {0}")]
	Json(#[from] serde_json::Error),
}

/// Result alias for map input decoding.
pub type Result<T> = std::result::Result<T, MapError>;
