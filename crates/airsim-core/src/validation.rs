//! Breathing-safety assessment and comfort warnings for compositions.
//!
//! # Example
//!
//! ```
//! use airsim_core::validation::{BreathingSafety, CompositionValidator};
//! use airsim_types::AirComposition;
//!
//! let air = AirComposition::indoor_optimal();
//! assert_eq!(BreathingSafety::assess(&air), BreathingSafety::Safe);
//!
//! let result = CompositionValidator::default().validate(&air);
//! assert!(result.is_safe);
//! assert!(!result.has_warnings());
//! ```

use serde::{Deserialize, Serialize};

use airsim_types::AirComposition;

/// Coarse safety verdict for breathing a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathingSafety {
    Safe,
    /// High CO2 or oxygen-enriched air.
    Caution,
    /// Oxygen below 19%.
    Danger,
    /// Oxygen below 16%; evacuate.
    ExtremeDanger,
}

impl BreathingSafety {
    /// Assess a composition. Oxygen deficiency takes precedence over CO2,
    /// which takes precedence over oxygen enrichment.
    pub fn assess(composition: &AirComposition) -> Self {
        let o2 = composition.oxygen_pct();
        if o2 < 16.0 {
            BreathingSafety::ExtremeDanger
        } else if o2 < 19.0 {
            BreathingSafety::Danger
        } else if composition.co2_pct() > 0.1 || o2 > 23.0 {
            BreathingSafety::Caution
        } else {
            BreathingSafety::Safe
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BreathingSafety::Safe => "Safe: air is fit to breathe",
            BreathingSafety::Caution => "Caution: ventilate, CO2 or oxygen level is off",
            BreathingSafety::Danger => "Danger: oxygen deficient, avoid long exposure",
            BreathingSafety::ExtremeDanger => "Extreme danger: oxygen deficient, evacuate now",
        }
    }
}

impl std::fmt::Display for BreathingSafety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Warning types for composition issues.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new warning types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CompositionWarning {
    OxygenTooLow { value: f64, min: f64 },
    OxygenTooHigh { value: f64, max: f64 },
    Co2TooHigh { value: f64, max: f64 },
    HumidityTooLow { value: f64, min: f64 },
    HumidityTooHigh { value: f64, max: f64 },
    TemperatureTooLow { value: f64, min: f64 },
    TemperatureTooHigh { value: f64, max: f64 },
}

impl std::fmt::Display for CompositionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompositionWarning::OxygenTooLow { value, min } => {
                write!(f, "Oxygen {value:.2}% is below {min}%")
            }
            CompositionWarning::OxygenTooHigh { value, max } => {
                write!(f, "Oxygen {value:.2}% exceeds {max}%")
            }
            CompositionWarning::Co2TooHigh { value, max } => {
                write!(f, "CO2 {value:.3}% exceeds {max}%")
            }
            CompositionWarning::HumidityTooLow { value, min } => {
                write!(f, "Humidity {value:.1}% is below {min}%")
            }
            CompositionWarning::HumidityTooHigh { value, max } => {
                write!(f, "Humidity {value:.1}% exceeds {max}%")
            }
            CompositionWarning::TemperatureTooLow { value, min } => {
                write!(f, "Temperature {value:.1}°C is below {min}°C")
            }
            CompositionWarning::TemperatureTooHigh { value, max } => {
                write!(f, "Temperature {value:.1}°C exceeds {max}°C")
            }
        }
    }
}

/// Result of validating a composition.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// Whether the composition is safe to breathe.
    pub is_safe: bool,
    pub safety: BreathingSafety,
    pub warnings: Vec<CompositionWarning>,
}

impl ValidationResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Limits checked by [`CompositionValidator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub oxygen_min: f64,
    pub oxygen_max: f64,
    pub co2_max: f64,
    pub humidity_min: f64,
    pub humidity_max: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
}

impl Default for ValidatorConfig {
    /// The breathing-safety band of [`AirComposition::is_safe_for_breathing`],
    /// plus the oxygen-enrichment ceiling.
    fn default() -> Self {
        Self {
            oxygen_min: 19.0,
            oxygen_max: 23.0,
            co2_max: 0.1,
            humidity_min: 20.0,
            humidity_max: 80.0,
            temperature_min: 15.0,
            temperature_max: 35.0,
        }
    }
}

impl ValidatorConfig {
    /// The comfort band of [`AirComposition::is_comfortable`].
    pub fn comfort() -> Self {
        Self {
            oxygen_min: 20.5,
            oxygen_max: 23.0,
            co2_max: 0.08,
            humidity_min: 40.0,
            humidity_max: 60.0,
            temperature_min: 20.0,
            temperature_max: 25.0,
        }
    }
}

/// Checks compositions against configurable limits.
#[derive(Debug, Clone, Default)]
pub struct CompositionValidator {
    config: ValidatorConfig,
}

impl CompositionValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn comfort() -> Self {
        Self::new(ValidatorConfig::comfort())
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn validate(&self, composition: &AirComposition) -> ValidationResult {
        let c = &self.config;
        let mut warnings = Vec::new();

        let o2 = composition.oxygen_pct();
        if o2 < c.oxygen_min {
            warnings.push(CompositionWarning::OxygenTooLow {
                value: o2,
                min: c.oxygen_min,
            });
        } else if o2 > c.oxygen_max {
            warnings.push(CompositionWarning::OxygenTooHigh {
                value: o2,
                max: c.oxygen_max,
            });
        }

        let co2 = composition.co2_pct();
        if co2 > c.co2_max {
            warnings.push(CompositionWarning::Co2TooHigh {
                value: co2,
                max: c.co2_max,
            });
        }

        let humidity = composition.humidity_pct();
        if humidity < c.humidity_min {
            warnings.push(CompositionWarning::HumidityTooLow {
                value: humidity,
                min: c.humidity_min,
            });
        } else if humidity > c.humidity_max {
            warnings.push(CompositionWarning::HumidityTooHigh {
                value: humidity,
                max: c.humidity_max,
            });
        }

        let temperature = composition.temperature_c();
        if temperature < c.temperature_min {
            warnings.push(CompositionWarning::TemperatureTooLow {
                value: temperature,
                min: c.temperature_min,
            });
        } else if temperature > c.temperature_max {
            warnings.push(CompositionWarning::TemperatureTooHigh {
                value: temperature,
                max: c.temperature_max,
            });
        }

        ValidationResult {
            is_safe: composition.is_safe_for_breathing(),
            safety: BreathingSafety::assess(composition),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air(o2: f64, co2: f64, h: f64, t: f64) -> AirComposition {
        AirComposition::new(o2, co2, h, t).unwrap()
    }

    #[test]
    fn test_breathing_safety_precedence() {
        assert_eq!(
            BreathingSafety::assess(&air(15.9, 0.5, 50.0, 20.0)),
            BreathingSafety::ExtremeDanger
        );
        assert_eq!(
            BreathingSafety::assess(&air(18.5, 0.5, 50.0, 20.0)),
            BreathingSafety::Danger
        );
        assert_eq!(
            BreathingSafety::assess(&air(21.0, 0.11, 50.0, 20.0)),
            BreathingSafety::Caution
        );
        assert_eq!(
            BreathingSafety::assess(&air(23.5, 0.04, 50.0, 20.0)),
            BreathingSafety::Caution
        );
        assert_eq!(
            BreathingSafety::assess(&air(19.0, 0.1, 50.0, 20.0)),
            BreathingSafety::Safe
        );
    }

    #[test]
    fn test_validator_collects_warnings() {
        let result = CompositionValidator::default().validate(&AirComposition::dangerous());
        assert!(!result.is_safe);
        assert_eq!(result.safety, BreathingSafety::Danger);
        assert_eq!(result.warnings.len(), 2);
        assert!(matches!(
            result.warnings[0],
            CompositionWarning::OxygenTooLow { .. }
        ));
        assert!(matches!(
            result.warnings[1],
            CompositionWarning::Co2TooHigh { .. }
        ));
    }

    #[test]
    fn test_comfort_validator_is_stricter() {
        let dry = air(21.0, 0.04, 30.0, 22.0);
        assert!(!CompositionValidator::default().validate(&dry).has_warnings());
        let result = CompositionValidator::comfort().validate(&dry);
        assert_eq!(
            result.warnings,
            vec![CompositionWarning::HumidityTooLow {
                value: 30.0,
                min: 40.0
            }]
        );
    }

    #[test]
    fn test_warning_display() {
        let w = CompositionWarning::Co2TooHigh {
            value: 0.15,
            max: 0.1,
        };
        assert_eq!(w.to_string(), "CO2 0.150% exceeds 0.1%");
    }
}
