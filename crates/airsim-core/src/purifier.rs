//! Standalone air purifier appliance.
//!
//! Unlike the air systems, a purifier has a power switch: while it is off,
//! every control call is refused (returns `false`) or ignored.

use serde::Serialize;
use tracing::{debug, info, warn};

use airsim_types::QualityLevel;

use crate::capability::Filtration;
use crate::error::{Error, Result};
use crate::pollutant::Pollutant;

/// Rated filter life, one year of continuous running.
pub const MAX_FILTER_LIFE_HOURS: u32 = 8760;

const NEW_FILTER_EFFICIENCY: f64 = 95.0;
const REPLACEMENT_ALERT_RATIO: f64 = 0.8;
const FAN_SPEED_RANGE: std::ops::RangeInclusive<u8> = 1..=5;
const NIGHT_MAX_FAN: u8 = 2;

/// A room air purifier.
///
/// # Example
///
/// ```
/// use airsim_core::{AirPurifier, Filtration};
///
/// let mut purifier = AirPurifier::new("AP-300", "SN-0001", 30.0).unwrap();
/// assert!(!purifier.set_fan_speed(3)); // powered off
/// assert!(purifier.turn_on());
/// assert!(purifier.set_fan_speed(3));
/// assert!(purifier.filter_specific_pollutant("pollen"));
/// assert!(purifier.is_ion_generator_active());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AirPurifier {
    model_name: String,
    serial_number: String,
    coverage_area_m2: f64,
    powered: bool,
    fan_speed: u8,
    auto_mode: bool,
    night_mode: bool,
    filter_efficiency: f64,
    filter_usage_hours: u32,
    ion_generator: bool,
    uv_sterilizer: bool,
    replacement_alert: bool,
    detected_quality: QualityLevel,
}

impl AirPurifier {
    /// Create a powered-off purifier in auto mode with a fresh filter.
    pub fn new(
        model_name: impl Into<String>,
        serial_number: impl Into<String>,
        coverage_area_m2: f64,
    ) -> Result<Self> {
        let model_name = model_name.into().trim().to_string();
        let serial_number = serial_number.into().trim().to_string();
        if model_name.is_empty() {
            return Err(Error::invalid_config("model name must not be empty"));
        }
        if serial_number.is_empty() {
            return Err(Error::invalid_config("serial number must not be empty"));
        }
        if !(coverage_area_m2 > 0.0 && coverage_area_m2.is_finite()) {
            return Err(Error::invalid_config(format!(
                "coverage area must be positive, got {coverage_area_m2}"
            )));
        }
        Ok(Self {
            model_name,
            serial_number,
            coverage_area_m2,
            powered: false,
            fan_speed: 1,
            auto_mode: true,
            night_mode: false,
            filter_efficiency: NEW_FILTER_EFFICIENCY,
            filter_usage_hours: 0,
            ion_generator: false,
            uv_sterilizer: false,
            replacement_alert: false,
            detected_quality: QualityLevel::Good,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn coverage_area(&self) -> f64 {
        self.coverage_area_m2
    }

    pub fn is_on(&self) -> bool {
        self.powered
    }

    pub fn fan_speed(&self) -> u8 {
        self.fan_speed
    }

    pub fn is_auto_mode(&self) -> bool {
        self.auto_mode
    }

    pub fn is_night_mode(&self) -> bool {
        self.night_mode
    }

    pub fn is_ion_generator_active(&self) -> bool {
        self.ion_generator
    }

    pub fn is_uv_sterilizer_active(&self) -> bool {
        self.uv_sterilizer
    }

    pub fn filter_usage_hours(&self) -> u32 {
        self.filter_usage_hours
    }

    pub fn detected_quality(&self) -> QualityLevel {
        self.detected_quality
    }

    /// Fraction of rated filter life used, capped at 1.
    pub fn filter_usage_ratio(&self) -> f64 {
        (f64::from(self.filter_usage_hours) / f64::from(MAX_FILTER_LIFE_HOURS)).min(1.0)
    }

    pub fn remaining_filter_life(&self) -> u32 {
        MAX_FILTER_LIFE_HOURS.saturating_sub(self.filter_usage_hours)
    }

    /// Power draw in watts; zero while off.
    pub fn power_consumption(&self) -> f64 {
        if !self.powered {
            return 0.0;
        }
        let mut watts = 15.0 + f64::from(self.fan_speed) * 8.0;
        if self.ion_generator {
            watts += 5.0;
        }
        if self.uv_sterilizer {
            watts += 10.0;
        }
        watts
    }

    /// Noise in dB; zero while off.
    pub fn noise_level(&self) -> f64 {
        if !self.powered {
            return 0.0;
        }
        let noise = 25.0 + f64::from(self.fan_speed) * 5.0;
        if self.night_mode { noise * 0.8 } else { noise }
    }

    /// Air processed per hour, in m³/h.
    pub fn air_processing_rate(&self) -> f64 {
        self.coverage_area_m2 * f64::from(self.fan_speed) * (self.filter_efficiency / 100.0)
    }

    pub fn turn_on(&mut self) -> bool {
        if self.powered {
            return false;
        }
        self.powered = true;
        info!(model = %self.model_name, fan = self.fan_speed, "purifier on");
        true
    }

    pub fn turn_off(&mut self) -> bool {
        if !self.powered {
            return false;
        }
        self.powered = false;
        info!(model = %self.model_name, "purifier off");
        true
    }

    /// Set the fan manually (1-5). Leaves auto mode.
    pub fn set_fan_speed(&mut self, speed: u8) -> bool {
        if !FAN_SPEED_RANGE.contains(&speed) || !self.powered {
            debug!(speed, powered = self.powered, "fan speed rejected");
            return false;
        }
        self.fan_speed = speed;
        self.auto_mode = false;
        true
    }

    pub fn set_auto_mode(&mut self, enabled: bool) {
        if !self.powered {
            return;
        }
        self.auto_mode = enabled;
        if enabled {
            self.adjust_to_quality();
        }
    }

    /// Night mode caps the fan at 2 and softens the noise.
    pub fn set_night_mode(&mut self, enabled: bool) {
        if !self.powered {
            return;
        }
        self.night_mode = enabled;
        if enabled {
            self.fan_speed = self.fan_speed.min(NIGHT_MAX_FAN);
        }
    }

    pub fn set_ion_generator(&mut self, enabled: bool) {
        if self.powered {
            self.ion_generator = enabled;
        }
    }

    pub fn set_uv_sterilizer(&mut self, enabled: bool) {
        if self.powered {
            self.uv_sterilizer = enabled;
        }
    }

    /// Report the air quality the purifier's sensor sees.
    pub fn detect_air_quality(&mut self, level: QualityLevel) {
        let changed = self.detected_quality != level;
        self.detected_quality = level;
        if changed {
            self.adjust_to_quality();
        }
    }

    /// Run the filter for `hours`; efficiency falls linearly with usage.
    pub fn add_operating_hours(&mut self, hours: u32) {
        if hours == 0 {
            return;
        }
        self.filter_usage_hours = self.filter_usage_hours.saturating_add(hours);
        let usage = f64::from(self.filter_usage_hours) / f64::from(MAX_FILTER_LIFE_HOURS);
        self.filter_efficiency = (NEW_FILTER_EFFICIENCY * (1.0 - usage * 0.5)).max(50.0);
        if usage >= REPLACEMENT_ALERT_RATIO && !self.replacement_alert {
            self.replacement_alert = true;
            warn!(
                model = %self.model_name,
                hours = self.filter_usage_hours,
                "filter past 80% of rated life"
            );
        }
    }

    pub fn replace_filter(&mut self) {
        self.filter_usage_hours = 0;
        self.filter_efficiency = NEW_FILTER_EFFICIENCY;
        self.replacement_alert = false;
        info!(model = %self.model_name, "filter replaced");
    }

    fn adjust_to_quality(&mut self) {
        if !self.powered || !self.auto_mode {
            return;
        }
        let mut target = match self.detected_quality {
            QualityLevel::Excellent => 1,
            QualityLevel::Good => 2,
            QualityLevel::Moderate => 3,
            QualityLevel::Poor => 4,
            QualityLevel::Hazardous => 5,
        };
        if self.night_mode {
            target = target.min(NIGHT_MAX_FAN);
        }
        if target != self.fan_speed {
            debug!(quality = %self.detected_quality, fan = target, "auto fan adjust");
            self.fan_speed = target;
        }
    }

    fn bump_fan_if_manual(&mut self) {
        if !self.auto_mode {
            self.set_fan_speed((self.fan_speed + 1).min(5));
        }
    }
}

impl Filtration for AirPurifier {
    fn start_filtering(&mut self) -> bool {
        self.turn_on()
    }

    fn stop_filtering(&mut self) -> bool {
        self.turn_off()
    }

    fn is_filtering(&self) -> bool {
        self.powered
    }

    fn filter_efficiency(&self) -> f64 {
        self.filter_efficiency
    }

    fn needs_filter_replacement(&self) -> bool {
        self.replacement_alert || self.filter_usage_ratio() >= REPLACEMENT_ALERT_RATIO
    }

    fn filter_specific_pollutant(&mut self, tag: &str) -> bool {
        if !self.powered {
            return false;
        }
        let Ok(pollutant) = tag.parse::<Pollutant>() else {
            return false;
        };
        match pollutant {
            Pollutant::Dust | Pollutant::Pm25 | Pollutant::Pm10 => self.bump_fan_if_manual(),
            Pollutant::Pollen => self.set_ion_generator(true),
            Pollutant::Bacteria | Pollutant::Virus => self.set_uv_sterilizer(true),
            Pollutant::Voc | Pollutant::Odor => {
                self.set_ion_generator(true);
                self.bump_fan_if_manual();
            }
            _ => return false,
        }
        true
    }
}
