use serde::{Deserialize, Serialize};

use crate::api::error::ConfigError;
use crate::systems::particles::GATHER_THRESHOLD;

/// Tuning for the overview scene, provided by the host.
/// Every field has a default; a JSON override only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Fixed simulation step in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Number of particles in the pool (default: 150).
    pub pool_size: usize,
    /// Seed for particle placement.
    pub seed: u64,
    /// Viewports narrower than this (CSS px) use the mobile layout.
    pub mobile_breakpoint: f32,
    /// Seconds the central sphere spends fading in before `initial`.
    pub intro_duration: f32,
    /// Seconds between consecutive sphere reveals while splitting.
    pub reveal_stagger: f32,
    /// Delay before the first sphere reveal.
    pub reveal_base_offset: f32,
    /// Extra delay for the neutral sphere, which reveals last.
    pub neutral_extra_delay: f32,
    /// Seconds a single reveal takes to reach full progress.
    pub reveal_duration: f32,
    /// Delay before the central sphere fades back in while merging.
    pub main_fade_delay: f32,
    /// Camera focus move duration.
    pub focus_duration: f32,
    /// Camera dive duration after gathering.
    pub zoom_duration: f32,
    /// Seconds an absorbing particle takes to merge into its sphere.
    pub absorb_duration: f32,
    /// Fraction of the selected emotion's particles that must be absorbed
    /// before gathering completes.
    pub gather_threshold: f32,
    /// Maximum number of events packed into one frame buffer.
    pub max_events: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            pool_size: 150,
            seed: 42,
            mobile_breakpoint: 768.0,
            intro_duration: 1.2,
            reveal_stagger: 0.12,
            reveal_base_offset: 0.1,
            neutral_extra_delay: 0.2,
            reveal_duration: 0.6,
            main_fade_delay: 0.4,
            focus_duration: 0.8,
            zoom_duration: 1.0,
            absorb_duration: 0.8,
            gather_threshold: GATHER_THRESHOLD,
            max_events: 32,
        }
    }
}

impl SceneConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::out_of_range("pool_size", "at least 1", 0.0));
        }
        if self.max_events == 0 {
            return Err(ConfigError::out_of_range("max_events", "at least 1", 0.0));
        }

        let positive = [
            ("fixed_dt", self.fixed_dt),
            ("mobile_breakpoint", self.mobile_breakpoint),
            ("reveal_duration", self.reveal_duration),
            ("focus_duration", self.focus_duration),
            ("zoom_duration", self.zoom_duration),
            ("absorb_duration", self.absorb_duration),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::out_of_range(field, "finite and > 0", value as f64));
            }
        }

        let non_negative = [
            ("intro_duration", self.intro_duration),
            ("reveal_stagger", self.reveal_stagger),
            ("reveal_base_offset", self.reveal_base_offset),
            ("neutral_extra_delay", self.neutral_extra_delay),
            ("main_fade_delay", self.main_fade_delay),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::out_of_range(field, "finite and >= 0", value as f64));
            }
        }

        if !(self.gather_threshold > 0.0 && self.gather_threshold <= 1.0) {
            return Err(ConfigError::out_of_range(
                "gather_threshold",
                "in (0, 1]",
                self.gather_threshold as f64,
            ));
        }
        Ok(())
    }
}
