//! Cache fingerprints.
//!
//! A fingerprint is the lowercase hex SHA-256 digest of
//!
//! ```text
//! {asset_id}-{initial_price}-{horizon_days}-{path_count}-{volatility}-{drift}
//! ```
//!
//! with reals in round-trip `Debug` form, so `100.0` renders as `100.0`
//! and `0.2` as `0.2`. Any change to any field changes the fingerprint.

use risk_core::SimulationRequest;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Stable identifier of a simulation request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of `request`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use risk_core::SimulationRequest;
    /// use risk_engine::Fingerprint;
    ///
    /// let a = SimulationRequest::new("AAPL", 100.0, 0.2, 0.05, 252, 10_000);
    /// let b = SimulationRequest::new("AAPL", 100.0, 0.2, 0.05, 252, 10_001);
    /// assert_eq!(Fingerprint::of(&a).as_str().len(), 64);
    /// assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    /// ```
    pub fn of(request: &SimulationRequest) -> Self {
        let key = format!(
            "{}-{:?}-{}-{}-{:?}-{:?}",
            request.asset_id,
            request.initial_price,
            request.horizon_days,
            request.path_count,
            request.volatility,
            request.drift
        );
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex digest.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for log lines.
    #[inline]
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SimulationRequest {
        SimulationRequest::new("AAPL", 100.0, 0.2, 0.05, 252, 10_000)
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            Fingerprint::of(&base()).as_str(),
            "61952fab1d652e859dfe072d126143715e5421c9271049a12dbe58d36fed3a60"
        );
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(Fingerprint::of(&base()), Fingerprint::of(&base()));
    }

    #[test]
    fn test_every_field_matters() {
        let reference = Fingerprint::of(&base());
        let variants = [
            SimulationRequest {
                asset_id: "MSFT".to_string(),
                ..base()
            },
            SimulationRequest {
                initial_price: 100.5,
                ..base()
            },
            SimulationRequest {
                horizon_days: 251,
                ..base()
            },
            SimulationRequest {
                path_count: 9_999,
                ..base()
            },
            SimulationRequest {
                volatility: 0.21,
                ..base()
            },
            SimulationRequest {
                drift: 0.04,
                ..base()
            },
        ];
        for variant in &variants {
            assert_ne!(Fingerprint::of(variant), reference);
        }
    }

    #[test]
    fn test_display_and_short() {
        let fp = Fingerprint::of(&base());
        assert_eq!(fp.to_string(), fp.as_str());
        assert_eq!(fp.short(), "61952fab1d65");
    }
}
