//! Declarative system configuration.
//!
//! A [`SystemConfig`] is plain data, typically read from a `[[systems]]`
//! table in a TOML file, and turned into a running system by
//! [`AirSystem::from_config`](crate::AirSystem::from_config).
//!
//! # Example
//!
//! ```
//! use airsim_core::{AirSystemKind, SystemConfig};
//!
//! let config = SystemConfig {
//!     kind: AirSystemKind::Bedroom,
//!     sleep_start: Some("23:00".into()),
//!     sleep_end: Some("06:30".into()),
//!     ..SystemConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::air_system::AirSystemKind;
use crate::error::{Error, Result};
use crate::system::{SleepSchedule, TARGET_HUMIDITY_RANGE};
use crate::ventilation::VentilationMode;

/// Settings for one air system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub kind: AirSystemKind,
    /// Whether routine automatic ventilation runs. Safety interlocks run
    /// regardless.
    pub auto_ventilation: bool,
    /// Start ventilating in this mode right away.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_mode: Option<VentilationMode>,
    /// Must lie in the kind's legal range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_change_rate: Option<f64>,
    /// Bathroom only, 40-70%.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_humidity: Option<f64>,
    /// Bedroom only, `HH:MM`. Set together with `sleep_end`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_end: Option<String>,
    /// Floor area served, in m².
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_area_m2: Option<f64>,
    /// Home only, rated filter efficiency in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_efficiency: Option<f64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            kind: AirSystemKind::Home,
            auto_ventilation: true,
            preferred_mode: None,
            air_change_rate: None,
            target_humidity: None,
            sleep_start: None,
            sleep_end: None,
            coverage_area_m2: None,
            filter_efficiency: None,
        }
    }
}

impl SystemConfig {
    pub fn new(kind: AirSystemKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Check every field against the kind it configures.
    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self.air_change_rate {
            let range = self.kind.ach_range();
            if !range.contains(rate) {
                return Err(Error::invalid_config(format!(
                    "air_change_rate {rate} is outside {range} for {} systems",
                    self.kind
                )));
            }
        }

        if let Some(target) = self.target_humidity {
            if self.kind != AirSystemKind::Bathroom {
                return Err(Error::invalid_config(
                    "target_humidity only applies to bathroom systems",
                ));
            }
            if !TARGET_HUMIDITY_RANGE.contains(&target) {
                return Err(Error::invalid_config(format!(
                    "target_humidity {target} must be between 40 and 70"
                )));
            }
        }

        if (self.sleep_start.is_some() || self.sleep_end.is_some())
            && self.kind != AirSystemKind::Bedroom
        {
            return Err(Error::invalid_config(
                "sleep_start/sleep_end only apply to bedroom systems",
            ));
        }
        self.sleep_schedule()?;

        if let Some(area) = self.coverage_area_m2
            && !(area > 0.0 && area.is_finite())
        {
            return Err(Error::invalid_config(format!(
                "coverage_area_m2 must be positive, got {area}"
            )));
        }

        if let Some(efficiency) = self.filter_efficiency {
            if self.kind != AirSystemKind::Home {
                return Err(Error::invalid_config(
                    "filter_efficiency only applies to home systems",
                ));
            }
            if !(0.0..=100.0).contains(&efficiency) {
                return Err(Error::invalid_config(format!(
                    "filter_efficiency {efficiency} must be between 0 and 100"
                )));
            }
        }

        Ok(())
    }

    /// The configured sleep window, if both ends are set.
    pub fn sleep_schedule(&self) -> Result<Option<SleepSchedule>> {
        match (&self.sleep_start, &self.sleep_end) {
            (Some(start), Some(end)) => SleepSchedule::parse(start, end).map(Some),
            (None, None) => Ok(None),
            _ => Err(Error::invalid_config(
                "sleep_start and sleep_end must be set together",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SystemConfig::default();
        assert_eq!(config.kind, AirSystemKind::Home);
        assert!(config.auto_ventilation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_coverage_area_rejected() {
        let config = SystemConfig {
            coverage_area_m2: Some(-5.0),
            ..SystemConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("coverage_area_m2"));
    }

    #[test]
    fn test_rate_checked_against_kind() {
        let mut config = SystemConfig::new(AirSystemKind::Bedroom);
        config.air_change_rate = Some(4.0);
        assert!(config.validate().is_ok());
        config.air_change_rate = Some(5.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_kind_specific_fields() {
        let mut config = SystemConfig::new(AirSystemKind::Kitchen);
        config.target_humidity = Some(50.0);
        assert!(config.validate().is_err());

        let mut config = SystemConfig::new(AirSystemKind::Bathroom);
        config.target_humidity = Some(75.0);
        assert!(config.validate().is_err());
        config.target_humidity = Some(70.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sleep_window_needs_both_ends() {
        let mut config = SystemConfig::new(AirSystemKind::Bedroom);
        config.sleep_start = Some("22:30".into());
        assert!(config.validate().is_err());
        config.sleep_end = Some("07:15".into());
        let schedule = config.sleep_schedule().unwrap().unwrap();
        assert_eq!(schedule.to_string(), "22:30-07:15");
        config.sleep_end = Some("7am".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"kind": "kitchen", "preferred_mode": "cooking"}"#;
        let config: SystemConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.kind, AirSystemKind::Kitchen);
        assert_eq!(config.preferred_mode, Some(VentilationMode::Cooking));
        assert!(config.auto_ventilation);
        assert_eq!(config.air_change_rate, None);
    }
}
