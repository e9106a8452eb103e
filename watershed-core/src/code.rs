//! Native hydrologic code schemes.
//!
//! The US and Canadian systems are structurally unrelated and are never
//! translated into each other. A record carries exactly one [`HydroCode`];
//! consumers match on it explicitly rather than through a shared abstraction.
//!
//! | Scheme | Example | Nesting rule |
//! |---|---|---|
//! | US HUC | `171100190401` | left-truncation to 10/8/6/4/2 digits |
//! | BC FWA | `920-123456-000000` | 3-digit principal drainage, then hyphenated tributary segments |
//! | SDAC | `08GA` | 2-digit MDA, 3-char SDA, 4-char SSDA |

use crate::country::{Country, DataSource};
use crate::error::{CodeError, Result};
use std::fmt;

/// Digit widths of the US HUC levels, finest first.
pub const HUC_LEVEL_WIDTHS: [usize; 6] = [12, 10, 8, 6, 4, 2];

/// Character widths of the SDAC levels, finest first.
pub const SDAC_LEVEL_WIDTHS: [usize; 3] = [4, 3, 2];

/// Width of the principal-drainage prefix of a BC FWA watershed code.
pub const FWA_PREFIX_WIDTH: usize = 3;

/// US Hydrologic Unit Code: an even number of digits, 2 through 12.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HucCode(String);

impl HucCode {
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.trim();
        if code.is_empty() || code.len() > 12 || code.len() % 2 != 0 {
            return Err(CodeError::InvalidHuc {
                code: raw.to_string(),
                reason: "length must be an even number of digits from 2 to 12",
            });
        }
        if !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeError::InvalidHuc {
                code: raw.to_string(),
                reason: "must contain only digits",
            });
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digits (the HUC level, e.g. 12 for a HUC12).
    pub fn digits(&self) -> usize {
        self.0.len()
    }

    /// Left-truncate to `width` digits.
    ///
    /// Returns `None` when `width` is not a HUC level or is wider than this code.
    pub fn truncate(&self, width: usize) -> Option<&str> {
        if !HUC_LEVEL_WIDTHS.contains(&width) || width > self.0.len() {
            return None;
        }
        Some(&self.0[..width])
    }

    /// Two-digit HUC region.
    pub fn region(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for HucCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// BC Freshwater Atlas watershed code.
///
/// `PPP-SSSSSS-SSSSSS-...`: a fixed-width principal-drainage prefix followed
/// by tributary segments. Segments that are all zeros are padding and do not
/// mark a level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FwaCode(String);

impl FwaCode {
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.trim();
        let invalid = |reason| CodeError::InvalidFwa {
            code: raw.to_string(),
            reason,
        };

        let mut segments = code.split('-');
        let prefix = segments.next().unwrap_or_default();
        if prefix.len() != FWA_PREFIX_WIDTH || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("principal drainage prefix must be 3 digits"));
        }
        if is_zero_segment(prefix) {
            return Err(invalid("principal drainage prefix cannot be zero"));
        }
        for segment in segments {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("tributary segments must be non-empty digit runs"));
            }
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The principal-drainage prefix, e.g. `"920"`.
    pub fn principal_drainage(&self) -> &str {
        &self.0[..FWA_PREFIX_WIDTH]
    }

    /// All hyphen-separated segments, prefix included.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('-')
    }

    /// Indices (>= 1) of tributary segments that are not zero padding.
    pub fn tributary_positions(&self) -> Vec<usize> {
        self.segments()
            .enumerate()
            .skip(1)
            .filter(|(_, s)| !is_zero_segment(s))
            .map(|(i, _)| i)
            .collect()
    }

    /// The code truncated just after segment `index`.
    ///
    /// The result is always a string prefix of the full code.
    pub fn truncate_after(&self, index: usize) -> Option<&str> {
        let mut end = 0;
        for (i, segment) in self.segments().enumerate() {
            end += segment.len();
            if i == index {
                return Some(&self.0[..end]);
            }
            end += 1; // hyphen
        }
        None
    }
}

impl fmt::Display for FwaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_zero_segment(segment: &str) -> bool {
    segment.bytes().all(|b| b == b'0')
}

/// Standard Drainage Area Classification code, e.g. `08GA`.
///
/// Two digits (major drainage area), then up to two letters for the
/// sub-drainage and sub-sub-drainage areas.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SdacCode(String);

impl SdacCode {
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.trim().to_ascii_uppercase();
        let invalid = |reason| CodeError::InvalidSdac {
            code: raw.to_string(),
            reason,
        };
        if !(2..=4).contains(&code.len()) {
            return Err(invalid("length must be 2 to 4 characters"));
        }
        let (mda, rest) = code.split_at(2);
        if !mda.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("major drainage area must be 2 digits"));
        }
        if !rest.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(invalid("sub-drainage designators must be letters"));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Truncate to an SDAC level width (4, 3 or 2).
    pub fn truncate(&self, width: usize) -> Option<&str> {
        if !SDAC_LEVEL_WIDTHS.contains(&width) || width > self.0.len() {
            return None;
        }
        Some(&self.0[..width])
    }
}

impl fmt::Display for SdacCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canadian code bundle. Which one is populated depends on the data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaCode {
    Fwa(FwaCode),
    Sdac(SdacCode),
}

/// The single native code bundle carried by a watershed record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HydroCode {
    Us(HucCode),
    Ca(CaCode),
}

impl HydroCode {
    pub fn country(&self) -> Country {
        match self {
            HydroCode::Us(_) => Country::Us,
            HydroCode::Ca(_) => Country::Ca,
        }
    }

    pub fn data_source(&self) -> DataSource {
        match self {
            HydroCode::Us(_) => DataSource::Wbd,
            HydroCode::Ca(CaCode::Fwa(_)) => DataSource::BcFwa,
            HydroCode::Ca(CaCode::Sdac(_)) => DataSource::Sdac,
        }
    }

    /// Scheme name used in diagnostics.
    pub fn scheme(&self) -> &'static str {
        match self {
            HydroCode::Us(_) => "HUC",
            HydroCode::Ca(CaCode::Fwa(_)) => "FWA",
            HydroCode::Ca(CaCode::Sdac(_)) => "SDAC",
        }
    }

    /// The native code string.
    pub fn as_str(&self) -> &str {
        match self {
            HydroCode::Us(huc) => huc.as_str(),
            HydroCode::Ca(CaCode::Fwa(fwa)) => fwa.as_str(),
            HydroCode::Ca(CaCode::Sdac(sdac)) => sdac.as_str(),
        }
    }
}

impl fmt::Display for HydroCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huc_parse_and_truncate() {
        let huc = HucCode::parse("171100190401").unwrap();
        assert_eq!(huc.digits(), 12);
        assert_eq!(huc.truncate(8), Some("17110019"));
        assert_eq!(huc.region(), "17");
        assert_eq!(huc.truncate(7), None);

        let huc8 = HucCode::parse("17110019").unwrap();
        assert_eq!(huc8.truncate(10), None);
    }

    #[test]
    fn test_huc_rejects_malformed() {
        assert!(HucCode::parse("").is_err());
        assert!(HucCode::parse("1711001").is_err()); // odd
        assert!(HucCode::parse("17110019040100").is_err()); // too long
        assert!(HucCode::parse("1711A0190401").is_err());
    }

    #[test]
    fn test_fwa_prefix_and_positions() {
        let fwa = FwaCode::parse("920-000000-000000-000000-000000-000000-0001").unwrap();
        assert_eq!(fwa.principal_drainage(), "920");
        assert_eq!(fwa.tributary_positions(), vec![6]);

        let fwa = FwaCode::parse("100-190442-244975-000000").unwrap();
        assert_eq!(fwa.tributary_positions(), vec![1, 2]);
        assert_eq!(fwa.truncate_after(0), Some("100"));
        assert_eq!(fwa.truncate_after(1), Some("100-190442"));
        assert_eq!(fwa.truncate_after(2), Some("100-190442-244975"));
        assert_eq!(fwa.truncate_after(9), None);
    }

    #[test]
    fn test_fwa_rejects_malformed() {
        assert!(FwaCode::parse("92-000001").is_err());
        assert!(FwaCode::parse("000-123456").is_err());
        assert!(FwaCode::parse("920--123456").is_err());
        assert!(FwaCode::parse("920-12a456").is_err());
    }

    #[test]
    fn test_sdac_parse() {
        let sdac = SdacCode::parse("08ga").unwrap();
        assert_eq!(sdac.as_str(), "08GA");
        assert_eq!(sdac.truncate(3), Some("08G"));
        assert_eq!(sdac.truncate(2), Some("08"));
        assert!(SdacCode::parse("8GA").is_err());
        assert!(SdacCode::parse("08G1").is_err());
    }

    #[test]
    fn test_hydro_code_source() {
        let code = HydroCode::Ca(CaCode::Sdac(SdacCode::parse("08GA").unwrap()));
        assert_eq!(code.country(), Country::Ca);
        assert_eq!(code.data_source(), DataSource::Sdac);
        assert_eq!(code.scheme(), "SDAC");
    }
}
