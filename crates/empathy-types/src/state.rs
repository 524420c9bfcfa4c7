//! The state vector: the unit of comparison in a robot's knowledge base.

use serde::{Deserialize, Serialize};

/// Number of features in a [`StateVector`].
pub const STATE_FEATURES: usize = 6;

/// Fixed-length feature tuple describing a robot's current situation.
///
/// Feature order is fixed and shared by every knowledge base:
///
/// | index | feature |
/// |---|---|
/// | 0 | battery level |
/// | 1 | proximity-to-wall danger signal |
/// | 2 | proximity-to-target signal |
/// | 3 | fraction of peers currently visible |
/// | 4 | proximity to the nearest visible peer seeking the target |
/// | 5 | proximity to the nearest visible peer following another |
///
/// Features 1--5 lie in `[0, 1]`. The battery feature is normalized as well
/// unless the simulation is configured to use the raw battery scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVector([f64; STATE_FEATURES]);

impl StateVector {
    /// Build a state vector from its named features.
    pub const fn new(
        battery: f64,
        wall: f64,
        target: f64,
        visible_peers: f64,
        seeking_peer: f64,
        following_peer: f64,
    ) -> Self {
        Self([battery, wall, target, visible_peers, seeking_peer, following_peer])
    }

    /// Wrap a raw feature array.
    pub const fn from_array(features: [f64; STATE_FEATURES]) -> Self {
        Self(features)
    }

    /// Build from a slice, returning `None` unless it has exactly
    /// [`STATE_FEATURES`] entries.
    pub fn from_slice(features: &[f64]) -> Option<Self> {
        <[f64; STATE_FEATURES]>::try_from(features).ok().map(Self)
    }

    /// The features in canonical order.
    pub const fn features(&self) -> &[f64; STATE_FEATURES] {
        &self.0
    }

    /// Battery feature.
    pub const fn battery(&self) -> f64 {
        self.0[0]
    }

    /// Wall danger feature.
    pub const fn wall(&self) -> f64 {
        self.0[1]
    }

    /// Target proximity feature.
    pub const fn target(&self) -> f64 {
        self.0[2]
    }

    /// Visible-peer fraction feature.
    pub const fn visible_peers(&self) -> f64 {
        self.0[3]
    }

    /// Seeking-peer proximity feature.
    pub const fn seeking_peer(&self) -> f64 {
        self.0[4]
    }

    /// Following-peer proximity feature.
    pub const fn following_peer(&self) -> f64 {
        self.0[5]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_requires_exact_length() {
        assert!(StateVector::from_slice(&[0.0; 5]).is_none());
        assert!(StateVector::from_slice(&[0.0; 7]).is_none());
        let v = StateVector::from_slice(&[0.9, 0.7, 0.5, 0.0, 0.0, 0.1]);
        assert!(v.is_some());
        let v = v.unwrap_or_default();
        assert!((v.battery() - 0.9).abs() < f64::EPSILON);
        assert!((v.following_peer() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_as_plain_array() {
        let v = StateVector::new(0.5, 0.0, 0.0, 0.0, 0.0, 0.0);
        let json = serde_json::to_string(&v).unwrap_or_default();
        assert_eq!(json, "[0.5,0.0,0.0,0.0,0.0,0.0]");
    }
}
