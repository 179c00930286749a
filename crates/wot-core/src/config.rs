use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;

/// Hard cap on second-degree profiles tracked at once.
pub const MAX_2ND_DEGREE_PROFILES: usize = 50;

/// Settings for the profile discovery engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Maximum number of second-degree documents tracked before FIFO eviction.
    #[serde(default = "default_max_second_degree")]
    pub max_second_degree: usize,
    /// Per-document load timeout in milliseconds.
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
}

/// Parameters of the force-directed trust graph layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    /// Number of simulation steps.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Repulsion constant (force = repulsion / distance²).
    #[serde(default = "default_repulsion")]
    pub repulsion: f64,
    /// Below this distance repulsion is tripled.
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,
    /// Edges shorter than this exert no attraction.
    #[serde(default = "default_ideal_edge_length")]
    pub ideal_edge_length: f64,
    #[serde(default = "default_attraction")]
    pub attraction: f64,
    #[serde(default = "default_center_gravity")]
    pub center_gravity: f64,
    /// Velocity multiplier applied each step (0..1).
    #[serde(default = "default_damping")]
    pub damping: f64,
}

fn default_max_second_degree() -> usize {
    MAX_2ND_DEGREE_PROFILES
}
fn default_load_timeout_ms() -> u64 {
    10_000
}
fn default_width() -> f64 {
    800.0
}
fn default_height() -> f64 {
    600.0
}
fn default_iterations() -> usize {
    200
}
fn default_repulsion() -> f64 {
    5000.0
}
fn default_min_distance() -> f64 {
    50.0
}
fn default_ideal_edge_length() -> f64 {
    150.0
}
fn default_attraction() -> f64 {
    0.01
}
fn default_center_gravity() -> f64 {
    0.005
}
fn default_damping() -> f64 {
    0.85
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_second_degree: default_max_second_degree(),
            load_timeout_ms: default_load_timeout_ms(),
        }
    }
}

impl DiscoveryConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.load_timeout_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "load_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            iterations: default_iterations(),
            repulsion: default_repulsion(),
            min_distance: default_min_distance(),
            ideal_edge_length: default_ideal_edge_length(),
            attraction: default_attraction(),
            center_gravity: default_center_gravity(),
            damping: default_damping(),
        }
    }
}

impl LayoutConfig {
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.width) || !positive(self.height) {
            return Err(CoreError::InvalidConfig(format!(
                "canvas size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        let forces = [
            ("repulsion", self.repulsion),
            ("ideal_edge_length", self.ideal_edge_length),
            ("attraction", self.attraction),
            ("center_gravity", self.center_gravity),
        ];
        if let Some((name, value)) = forces.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CoreError::InvalidConfig(format!("{} must be finite, got {}", name, value)));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(CoreError::InvalidConfig(format!(
                "damping must be within [0, 1], got {}",
                self.damping
            )));
        }
        if !positive(self.min_distance) {
            return Err(CoreError::InvalidConfig("min_distance must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.max_second_degree, 50);
        assert_eq!(config.load_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = DiscoveryConfig {
            load_timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_layout_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.iterations, 200);
        assert_eq!(config.center(), (400.0, 300.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layout_invalid_damping() {
        let config = LayoutConfig {
            damping: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_non_finite_rejected() {
        for (width, height) in [(f64::NAN, 600.0), (800.0, f64::NAN), (f64::INFINITY, 600.0), (0.0, 600.0)] {
            let config = LayoutConfig {
                width,
                height,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(CoreError::InvalidConfig(_))),
                "{width}x{height} accepted"
            );
        }
        let config = LayoutConfig {
            repulsion: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: LayoutConfig = toml::from_str("iterations = 50\nwidth = 1000.0").expect("parse");
        assert_eq!(config.iterations, 50);
        assert_eq!(config.width, 1000.0);
        assert_eq!(config.height, 600.0);
    }
}
