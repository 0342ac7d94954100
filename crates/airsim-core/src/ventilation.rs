//! Ventilation modes and the shared ventilation state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ventilation mode tag.
///
/// Parsing never fails: unrecognized tags become [`VentilationMode::Standard`],
/// which every system treats as its default branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VentilationMode {
    Natural,
    Forced,
    Mixed,
    Cooking,
    Emergency,
    Quiet,
    HumidityControl,
    Antibacterial,
    #[default]
    Standard,
}

impl VentilationMode {
    /// Parse a mode tag, mapping anything unknown to `Standard`.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "natural" => VentilationMode::Natural,
            "forced" => VentilationMode::Forced,
            "mixed" => VentilationMode::Mixed,
            "cooking" => VentilationMode::Cooking,
            "emergency" => VentilationMode::Emergency,
            "quiet" => VentilationMode::Quiet,
            "humidity_control" => VentilationMode::HumidityControl,
            "antibacterial" => VentilationMode::Antibacterial,
            _ => VentilationMode::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VentilationMode::Natural => "natural",
            VentilationMode::Forced => "forced",
            VentilationMode::Mixed => "mixed",
            VentilationMode::Cooking => "cooking",
            VentilationMode::Emergency => "emergency",
            VentilationMode::Quiet => "quiet",
            VentilationMode::HumidityControl => "humidity_control",
            VentilationMode::Antibacterial => "antibacterial",
            VentilationMode::Standard => "standard",
        }
    }
}

impl FromStr for VentilationMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for VentilationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of air changes per hour a system can run at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AchRange {
    pub min: f64,
    pub max: f64,
}

impl AchRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, rate: f64) -> bool {
        (self.min..=self.max).contains(&rate)
    }
}

impl fmt::Display for AchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} ACH", self.min, self.max)
    }
}

/// On/off state, mode and rate of a system's ventilation.
///
/// Transitions are checked here; the per-system side effects (fan speed,
/// night mode, timers) live with each system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VentilationState {
    active: bool,
    mode: VentilationMode,
    air_change_rate: f64,
    range: AchRange,
}

impl VentilationState {
    pub fn new(mode: VentilationMode, air_change_rate: f64, range: AchRange) -> Self {
        Self {
            active: false,
            mode,
            air_change_rate: air_change_rate.clamp(range.min, range.max),
            range,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> VentilationMode {
        self.mode
    }

    pub fn air_change_rate(&self) -> f64 {
        self.air_change_rate
    }

    pub fn range(&self) -> AchRange {
        self.range
    }

    /// Turn on in `mode` at `rate`. Returns false if already on.
    pub fn start(&mut self, mode: VentilationMode, rate: f64) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.mode = mode;
        self.air_change_rate = rate.clamp(self.range.min, self.range.max);
        true
    }

    /// Turn off. Returns false if already off.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }

    /// Force the state on in `mode`, whatever it was doing before.
    pub fn force(&mut self, mode: VentilationMode, rate: f64) {
        self.active = true;
        self.mode = mode;
        self.air_change_rate = rate.clamp(self.range.min, self.range.max);
    }

    /// Set the rate if it lies within the legal range.
    pub fn set_rate(&mut self, rate: f64) -> bool {
        if !self.range.contains(rate) {
            return false;
        }
        self.air_change_rate = rate;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_modes() {
        assert_eq!(VentilationMode::parse("EMERGENCY"), VentilationMode::Emergency);
        assert_eq!(
            VentilationMode::parse("humidity-control"),
            VentilationMode::HumidityControl
        );
        assert_eq!(VentilationMode::parse("turbo"), VentilationMode::Standard);
        assert_eq!(VentilationMode::Cooking.to_string(), "cooking");
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut state = VentilationState::new(VentilationMode::Natural, 3.0, AchRange::new(1.0, 5.0));
        assert!(state.start(VentilationMode::Forced, 4.0));
        let snapshot = state.clone();
        assert!(!state.start(VentilationMode::Natural, 2.0));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_stop_requires_active() {
        let mut state = VentilationState::new(VentilationMode::Natural, 3.0, AchRange::new(1.0, 5.0));
        assert!(!state.stop());
        state.start(VentilationMode::Natural, 3.0);
        assert!(state.stop());
        assert!(!state.is_active());
    }

    #[test]
    fn test_set_rate_rejects_out_of_range() {
        let mut state = VentilationState::new(VentilationMode::Natural, 3.0, AchRange::new(1.0, 5.0));
        assert!(!state.set_rate(5.5));
        assert!(!state.set_rate(f64::NAN));
        assert_eq!(state.air_change_rate(), 3.0);
        assert!(state.set_rate(5.0));
        assert_eq!(state.air_change_rate(), 5.0);
    }

    #[test]
    fn test_force_overrides_mode() {
        let mut state = VentilationState::new(VentilationMode::Cooking, 12.0, AchRange::new(6.0, 20.0));
        state.start(VentilationMode::Cooking, 12.0);
        state.force(VentilationMode::Emergency, 16.0);
        assert!(state.is_active());
        assert_eq!(state.mode(), VentilationMode::Emergency);
        assert_eq!(state.air_change_rate(), 16.0);
    }
}
