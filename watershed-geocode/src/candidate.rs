//! Normalized geocoder output.

use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use watershed_core::Coordinate;

/// Categorical trust signal on a geocoding result.
///
/// Ordered `Low < Medium < High`. Providers without a signal report `None`
/// wherever an `Option<Confidence>` appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// One step less trusted, saturating at `Low`.
    pub fn step_down(self) -> Self {
        match self {
            Confidence::High => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    /// Sort rank with "absent" below every present value.
    pub fn rank(confidence: Option<Confidence>) -> u8 {
        match confidence {
            None => 0,
            Some(Confidence::Low) => 1,
            Some(Confidence::Medium) => 2,
            Some(Confidence::High) => 3,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            other => Err(format!(
                "unknown confidence '{other}' (expected low, medium or high)"
            )),
        }
    }
}

/// One geocoder result in the shared shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub provider_name: String,
    pub confidence: Option<Confidence>,
}

impl GeocodeCandidate {
    pub fn new(
        latitude: f64,
        longitude: f64,
        formatted_address: impl Into<String>,
        provider_name: impl Into<String>,
        confidence: Option<Confidence>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            formatted_address: formatted_address.into(),
            provider_name: provider_name.into(),
            confidence,
        }
    }

    /// Build a candidate from a provider-reported position. A non-finite or
    /// out-of-range coordinate makes the result malformed.
    pub fn checked(
        latitude: f64,
        longitude: f64,
        formatted_address: impl Into<String>,
        provider_name: impl Into<String>,
        confidence: Option<Confidence>,
    ) -> Result<Self, ProviderError> {
        Coordinate::try_new(latitude, longitude)
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(Self::new(
            latitude,
            longitude,
            formatted_address,
            provider_name,
            confidence,
        ))
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_and_rank() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Low);
        assert!(Confidence::rank(None) < Confidence::rank(Some(Confidence::Low)));
        assert_eq!(Confidence::High.step_down(), Confidence::Medium);
        assert_eq!(Confidence::Low.step_down(), Confidence::Low);
    }

    #[test]
    fn checked_rejects_impossible_coordinates() {
        assert!(GeocodeCandidate::checked(48.428, -123.3389, "a", "test", None).is_ok());
        for (lat, lon) in [(148.43, -123.3389), (48.4, 200.0), (f64::NAN, 0.0), (0.0, f64::INFINITY)] {
            assert!(matches!(
                GeocodeCandidate::checked(lat, lon, "a", "test", None),
                Err(ProviderError::Malformed(_))
            ));
        }
    }

    #[test]
    fn parse_confidence() {
        assert_eq!("MEDIUM".parse::<Confidence>().unwrap(), Confidence::Medium);
        assert!("certain".parse::<Confidence>().is_err());
    }
}
