//! Distance to similarity conversion.

use std::fmt;

use serde::{Serialize, Serializer};

/// Largest distance the index is expected to report.
pub const MAX_DISTANCE: f64 = 2.0;

/// Why a distance falls outside `[0, MAX_DISTANCE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceAnomaly {
    /// The distance is below zero.
    Negative,
    /// The distance exceeds [`MAX_DISTANCE`].
    AboveMax,
    /// The distance is NaN or infinite.
    NotFinite,
}

impl DistanceAnomaly {
    /// Classifies a raw distance; `None` when it is in range.
    pub fn classify(distance: f64) -> Option<Self> {
        if !distance.is_finite() {
            Some(DistanceAnomaly::NotFinite)
        } else if distance < 0.0 {
            Some(DistanceAnomaly::Negative)
        } else if distance > MAX_DISTANCE {
            Some(DistanceAnomaly::AboveMax)
        } else {
            None
        }
    }
}

impl fmt::Display for DistanceAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DistanceAnomaly::Negative => "negative distance",
            DistanceAnomaly::AboveMax => "distance above 2.0",
            DistanceAnomaly::NotFinite => "non-finite distance",
        };
        f.write_str(s)
    }
}

/// Normalized similarity `1 - distance / 2`.
///
/// The stored value is the unrounded fraction. Out-of-range distances are
/// kept as-is and reported through [`SimilarityScore::anomaly`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScore {
    value: f64,
    distance: f64,
    anomaly: Option<DistanceAnomaly>,
}

impl SimilarityScore {
    /// Computes the score for a raw distance.
    pub fn from_distance(distance: f64) -> Self {
        let anomaly = DistanceAnomaly::classify(distance);
        if let Some(a) = anomaly {
            tracing::warn!(distance, anomaly = %a, "iplens: distance outside [0, 2]");
        }
        Self {
            value: 1.0 - distance / MAX_DISTANCE,
            distance,
            anomaly,
        }
    }

    /// Returns the unrounded fraction.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the distance the score was derived from.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Returns the anomaly, if the distance was out of range.
    pub fn anomaly(&self) -> Option<DistanceAnomaly> {
        self.anomaly
    }

    /// Returns true if the distance was out of range.
    pub fn is_anomalous(&self) -> bool {
        self.anomaly.is_some()
    }

    /// Returns `value * 100` rounded to two decimals.
    pub fn percent(&self) -> f64 {
        (self.value * 10_000.0).round() / 100.0
    }
}

impl fmt::Display for SimilarityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.percent())
    }
}

impl Serialize for SimilarityScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("SimilarityScore", 4)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("percent", &self.percent())?;
        s.serialize_field("distance", &self.distance)?;
        s.serialize_field("anomaly", &self.anomaly)?;
        s.end()
    }
}
