//! Address validation and suggestion ranking.
//!
//! A candidate is accepted when the provider's confidence meets the
//! configured threshold. Without a confidence signal, the caller's text and
//! the formatted address must agree: same house number and enough matching
//! tokens. Rejections carry ranked, deduplicated suggestions; a chosen
//! suggestion is resubmitted as a fresh address.

use crate::address::{normalize, similarity, tokens, AddressInput};
use crate::candidate::{Confidence, GeocodeCandidate};
use crate::config::ValidatorConfig;
use crate::resolver::GeocodeResolver;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info, instrument};
use watershed_core::Coordinate;

/// Why a candidate was not accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    /// Provider confidence below threshold.
    LowConfidence {
        confidence: Confidence,
        threshold: Confidence,
    },
    /// No confidence signal and the input has no house number.
    MissingHouseNumber,
    /// No confidence signal and the formatted address has a different number.
    HouseNumberMismatch { house_number: String },
    /// No confidence signal and too few tokens match.
    Dissimilar { score: f64, threshold: f64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::LowConfidence {
                confidence,
                threshold,
            } => write!(f, "confidence {confidence} is below {threshold}"),
            RejectReason::MissingHouseNumber => f.write_str("address has no house number"),
            RejectReason::HouseNumberMismatch { house_number } => {
                write!(f, "house number {house_number} not found in geocoded address")
            }
            RejectReason::Dissimilar { score, threshold } => {
                write!(f, "geocoded address similarity {score:.2} is below {threshold:.2}")
            }
        }
    }
}

/// A ranked disambiguation option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub suggested_address: String,
    pub confidence: Option<Confidence>,
    pub coordinate: Option<Coordinate>,
    pub provider: String,
}

/// A rejected address with its suggestions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub input_address: String,
    pub reason: RejectReason,
    pub suggestions: Vec<Suggestion>,
}

impl ValidationFailure {
    /// Rejected with nothing to offer: the address was not understood.
    pub fn is_not_understood(&self) -> bool {
        self.suggestions.is_empty()
    }
}

/// A candidate that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedAddress {
    pub coordinate: Coordinate,
    pub formatted_address: String,
    pub provider: String,
    pub confidence: Option<Confidence>,
    /// Token similarity between input and formatted address.
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Accepted(AcceptedAddress),
    Rejected(ValidationFailure),
}

/// Scores geocoder output against the caller's text.
#[derive(Debug, Clone, Default)]
pub struct AddressValidator {
    config: ValidatorConfig,
}

impl AddressValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Accept/reject decision for one candidate. `Ok` carries the similarity.
    pub fn assess(
        &self,
        input: &AddressInput,
        candidate: &GeocodeCandidate,
    ) -> Result<f64, RejectReason> {
        let score = similarity(input.as_str(), &candidate.formatted_address);

        if let Some(confidence) = candidate.confidence {
            return if confidence >= self.config.confidence_threshold {
                Ok(score)
            } else {
                Err(RejectReason::LowConfidence {
                    confidence,
                    threshold: self.config.confidence_threshold,
                })
            };
        }

        let house_number = input
            .house_number()
            .ok_or(RejectReason::MissingHouseNumber)?;
        if !tokens(&candidate.formatted_address).contains(&house_number) {
            return Err(RejectReason::HouseNumberMismatch { house_number });
        }
        if score < self.config.similarity_threshold {
            return Err(RejectReason::Dissimilar {
                score,
                threshold: self.config.similarity_threshold,
            });
        }
        Ok(score)
    }

    /// Validate a resolved candidate, fetching suggestions on rejection.
    #[instrument(level = "debug", skip_all, fields(address = %input, provider = %candidate.provider_name))]
    pub async fn validate(
        &self,
        resolver: &GeocodeResolver,
        input: &AddressInput,
        candidate: GeocodeCandidate,
    ) -> ValidationOutcome {
        match self.assess(input, &candidate) {
            Ok(score) => {
                info!(
                    confidence = ?candidate.confidence,
                    similarity = score,
                    "address accepted"
                );
                ValidationOutcome::Accepted(AcceptedAddress {
                    coordinate: candidate.coordinate(),
                    formatted_address: candidate.formatted_address,
                    provider: candidate.provider_name,
                    confidence: candidate.confidence,
                    similarity: score,
                })
            }
            Err(reason) => {
                debug!(reason = %reason, "address rejected, requesting suggestions");
                let mut pool = resolver
                    .suggest(input.as_str(), self.config.max_suggestions)
                    .await;
                // The rejected candidate is only offered back when nothing else is.
                if pool.is_empty() {
                    pool.push(candidate);
                }
                ValidationOutcome::Rejected(ValidationFailure {
                    input_address: input.as_str().to_string(),
                    reason,
                    suggestions: self.rank_suggestions(input, pool),
                })
            }
        }
    }

    /// Rank by confidence (absent last) then similarity, dedupe by
    /// normalized address, truncate to `max_suggestions`.
    pub fn rank_suggestions(
        &self,
        input: &AddressInput,
        pool: Vec<GeocodeCandidate>,
    ) -> Vec<Suggestion> {
        let mut scored: Vec<(f64, GeocodeCandidate)> = pool
            .into_iter()
            .filter(|c| !c.formatted_address.trim().is_empty())
            .map(|c| (similarity(input.as_str(), &c.formatted_address), c))
            .collect();
        // Stable sort keeps provider order among equals.
        scored.sort_by(|(sa, a), (sb, b)| {
            Confidence::rank(b.confidence)
                .cmp(&Confidence::rank(a.confidence))
                .then(sb.partial_cmp(sa).unwrap_or(Ordering::Equal))
        });

        let mut seen = FxHashSet::default();
        scored
            .into_iter()
            .filter(|(_, c)| seen.insert(normalize(&c.formatted_address)))
            .take(self.config.max_suggestions)
            .map(|(_, c)| Suggestion {
                coordinate: Some(c.coordinate()),
                suggested_address: c.formatted_address,
                confidence: c.confidence,
                provider: c.provider_name,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &str) -> AddressInput {
        AddressInput::parse(text).unwrap()
    }

    fn cand(address: &str, confidence: Option<Confidence>) -> GeocodeCandidate {
        GeocodeCandidate::new(48.4, -123.3, address, "test", confidence)
    }

    #[test]
    fn high_confidence_always_accepted() {
        let v = AddressValidator::new(
            ValidatorConfig::default().with_confidence_threshold(Confidence::High),
        );
        let result = v.assess(
            &input("somewhere vague"),
            &cand("Completely Different Place", Some(Confidence::High)),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn low_confidence_rejected() {
        let v = AddressValidator::default();
        let err = v
            .assess(&input("1620 Belmont Ave"), &cand("1620 Belmont Ave", Some(Confidence::Low)))
            .unwrap_err();
        assert!(matches!(err, RejectReason::LowConfidence { .. }));
    }

    #[test]
    fn no_confidence_requires_house_number() {
        let v = AddressValidator::default();
        let err = v
            .assess(&input("Belmont Ave, Victoria"), &cand("Belmont Avenue, Victoria, BC", None))
            .unwrap_err();
        assert_eq!(err, RejectReason::MissingHouseNumber);
    }

    #[test]
    fn no_confidence_house_number_must_match() {
        let v = AddressValidator::default();
        let err = v
            .assess(
                &input("1620 Belmont Ave, Victoria"),
                &cand("1602, Belmont Avenue, Victoria, BC", None),
            )
            .unwrap_err();
        assert!(matches!(err, RejectReason::HouseNumberMismatch { .. }));
    }

    #[test]
    fn no_confidence_divergent_text_rejected() {
        let v = AddressValidator::default();
        let err = v
            .assess(
                &input("1620 Belmont Ave, Victoria, BC"),
                &cand("1620, Oak Bay Road, Saanich, Capital, British Columbia, Canada", None),
            )
            .unwrap_err();
        assert!(matches!(err, RejectReason::Dissimilar { .. }));
    }

    #[test]
    fn no_confidence_close_text_accepted() {
        let v = AddressValidator::default();
        let score = v
            .assess(
                &input("1620 Belmont Ave, Victoria, BC"),
                &cand("1620, Belmont Avenue, Fernwood, Victoria, British Columbia, V8R 3Z3, Canada", None),
            )
            .unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn suggestions_ranked_deduped_truncated() {
        let v = AddressValidator::new(ValidatorConfig::default().with_max_suggestions(3));
        let pool = vec![
            cand("Belmont Avenue, Victoria", None),
            cand("1620 Belmont Ave, Victoria", Some(Confidence::Medium)),
            cand("1620 Belmont Avenue, Victoria", Some(Confidence::High)),
            cand("1620 belmont ave., victoria", Some(Confidence::Low)),
            cand("Belmont Road, Nanaimo", None),
            cand("", Some(Confidence::High)),
        ];
        let suggestions = v.rank_suggestions(&input("1620 Belmont Ave, Victoria"), pool);
        let addresses: Vec<_> = suggestions.iter().map(|s| s.suggested_address.as_str()).collect();
        assert_eq!(
            addresses,
            vec![
                "1620 Belmont Avenue, Victoria",
                "Belmont Avenue, Victoria",
                "Belmont Road, Nanaimo"
            ]
        );
        assert!(suggestions.iter().all(|s| s.coordinate.is_some()));
    }
}
