//! Capability traits shared by every air system.
//!
//! These are behavior contracts, not base classes: each system implements
//! them with its own ranges and side effects, and [`AirSystem`](crate::AirSystem)
//! forwards them to whichever system it holds.
//!
//! Operations that a caller may legitimately attempt at the wrong moment
//! (starting ventilation twice, a rate the system cannot run at, an unknown
//! pollutant tag) return `false` and leave state unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use airsim_types::AirComposition;

use crate::validation::BreathingSafety;
use crate::ventilation::VentilationMode;

/// Seven-step energy efficiency rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnergyGrade {
    #[serde(rename = "A+++")]
    APlusPlusPlus,
    #[serde(rename = "A++")]
    APlusPlus,
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl EnergyGrade {
    /// Grade a weighted efficiency score (90/80/70/60/50/40 steps).
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            EnergyGrade::APlusPlusPlus
        } else if score >= 80.0 {
            EnergyGrade::APlusPlus
        } else if score >= 70.0 {
            EnergyGrade::APlus
        } else if score >= 60.0 {
            EnergyGrade::A
        } else if score >= 50.0 {
            EnergyGrade::B
        } else if score >= 40.0 {
            EnergyGrade::C
        } else {
            EnergyGrade::D
        }
    }
}

impl fmt::Display for EnergyGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnergyGrade::APlusPlusPlus => "A+++",
            EnergyGrade::APlusPlus => "A++",
            EnergyGrade::APlus => "A+",
            EnergyGrade::A => "A",
            EnergyGrade::B => "B",
            EnergyGrade::C => "C",
            EnergyGrade::D => "D",
        };
        f.write_str(s)
    }
}

/// What [`Ventilation::smart_ventilation`] chose to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmartVentilationAction {
    /// Outdoor air is clean: natural ventilation.
    Natural,
    /// Outdoor air is fair: mixed ventilation.
    Mixed,
    /// Outdoor air is poor: forced ventilation at a reduced rate.
    Restricted,
    /// Outdoor air is hazardous: ventilation stopped.
    Stopped,
}

/// Health of a filter derived from its efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    Excellent,
    Good,
    Fair,
    ReplaceNow,
}

impl FilterCondition {
    pub fn from_efficiency(efficiency: f64) -> Self {
        if efficiency >= 90.0 {
            FilterCondition::Excellent
        } else if efficiency >= 70.0 {
            FilterCondition::Good
        } else if efficiency >= 50.0 {
            FilterCondition::Fair
        } else {
            FilterCondition::ReplaceNow
        }
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterCondition::Excellent => "excellent",
            FilterCondition::Good => "good",
            FilterCondition::Fair => "fair",
            FilterCondition::ReplaceNow => "replace now",
        };
        f.write_str(s)
    }
}

/// Outdoor AQI ceilings for [`Ventilation::smart_ventilation`].
const AQI_NATURAL_MAX: u16 = 50;
const AQI_MIXED_MAX: u16 = 100;
const AQI_RESTRICTED_MAX: u16 = 200;
/// Rate requested when outdoor air is poor.
const RESTRICTED_ACH: f64 = 2.0;

/// Ventilation control.
pub trait Ventilation {
    /// Start ventilating in `mode`. Fails if already ventilating.
    fn start_ventilation(&mut self, mode: &str) -> bool;

    /// Stop ventilating. Fails if not ventilating.
    fn stop_ventilation(&mut self) -> bool;

    /// Set the air change rate. Fails outside the system's legal range.
    fn set_air_change_rate(&mut self, rate: f64) -> bool;

    fn is_ventilating(&self) -> bool;

    fn ventilation_mode(&self) -> VentilationMode;

    fn air_change_rate(&self) -> f64;

    /// Efficiency in `[0, 100]`; zero when not ventilating.
    fn ventilation_efficiency(&self) -> f64;

    /// Rate efficiency, penalizing rates outside 3-6 ACH by 20%.
    fn energy_efficiency_grade(&self) -> EnergyGrade {
        let rate = self.air_change_rate();
        let weight = if (3.0..=6.0).contains(&rate) { 1.0 } else { 0.8 };
        EnergyGrade::from_score(self.ventilation_efficiency() * weight)
    }

    /// Choose a ventilation strategy from the outdoor air quality index.
    ///
    /// The individual start/stop/rate requests may still be refused by the
    /// system (for example when it is already ventilating).
    fn smart_ventilation(&mut self, outdoor_aqi: u16) -> SmartVentilationAction {
        if outdoor_aqi <= AQI_NATURAL_MAX {
            self.start_ventilation(VentilationMode::Natural.as_str());
            SmartVentilationAction::Natural
        } else if outdoor_aqi <= AQI_MIXED_MAX {
            self.start_ventilation(VentilationMode::Mixed.as_str());
            SmartVentilationAction::Mixed
        } else if outdoor_aqi <= AQI_RESTRICTED_MAX {
            self.start_ventilation(VentilationMode::Forced.as_str());
            self.set_air_change_rate(RESTRICTED_ACH);
            SmartVentilationAction::Restricted
        } else {
            self.stop_ventilation();
            SmartVentilationAction::Stopped
        }
    }
}

/// Filtration control.
pub trait Filtration {
    /// Engage the filter. Returns whether anything changed.
    fn start_filtering(&mut self) -> bool;

    /// Disengage the filter. Returns whether anything changed.
    fn stop_filtering(&mut self) -> bool;

    fn is_filtering(&self) -> bool;

    /// Current filter efficiency in percent.
    fn filter_efficiency(&self) -> f64;

    fn needs_filter_replacement(&self) -> bool;

    /// Apply targeted filtration for a pollutant tag.
    ///
    /// Returns false, mutating nothing, for tags the system does not handle.
    fn filter_specific_pollutant(&mut self, tag: &str) -> bool;

    fn filter_condition(&self) -> FilterCondition {
        FilterCondition::from_efficiency(self.filter_efficiency())
    }

    /// What `original` would look like after one pass through the filter.
    fn purified_composition(&self, original: &AirComposition) -> AirComposition {
        let e = self.filter_efficiency() / 100.0;
        let humidity = (original.humidity_pct() * (0.8 + 0.2 * e)).clamp(30.0, 70.0);
        let co2 = original.co2_pct() * (1.0 - e * 0.1);
        AirComposition::clamped(
            original.oxygen_pct(),
            co2,
            humidity,
            original.temperature_c(),
        )
    }
}

/// Breathability queries.
pub trait Breathable {
    fn composition(&self) -> AirComposition;

    fn is_breathable(&self) -> bool;

    fn has_adequate_oxygen(&self) -> bool;

    fn has_harmful_gases(&self) -> bool;

    /// Normalized score in `[0, 1]` minus system-specific hazard penalties.
    fn breathability_index(&self) -> f64;

    fn breathing_safety(&self) -> BreathingSafety {
        BreathingSafety::assess(&self.composition())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_grade_steps() {
        assert_eq!(EnergyGrade::from_score(90.0), EnergyGrade::APlusPlusPlus);
        assert_eq!(EnergyGrade::from_score(89.9), EnergyGrade::APlusPlus);
        assert_eq!(EnergyGrade::from_score(60.0), EnergyGrade::A);
        assert_eq!(EnergyGrade::from_score(39.9), EnergyGrade::D);
        assert_eq!(EnergyGrade::APlus.to_string(), "A+");
        assert_eq!(
            serde_json::to_string(&EnergyGrade::APlusPlus).unwrap(),
            "\"A++\""
        );
    }

    #[test]
    fn test_filter_condition_steps() {
        assert_eq!(FilterCondition::from_efficiency(95.0), FilterCondition::Excellent);
        assert_eq!(FilterCondition::from_efficiency(70.0), FilterCondition::Good);
        assert_eq!(FilterCondition::from_efficiency(50.0), FilterCondition::Fair);
        assert_eq!(FilterCondition::from_efficiency(49.0), FilterCondition::ReplaceNow);
    }

    struct FixedFilter(f64);

    impl Filtration for FixedFilter {
        fn start_filtering(&mut self) -> bool {
            false
        }
        fn stop_filtering(&mut self) -> bool {
            false
        }
        fn is_filtering(&self) -> bool {
            true
        }
        fn filter_efficiency(&self) -> f64 {
            self.0
        }
        fn needs_filter_replacement(&self) -> bool {
            false
        }
        fn filter_specific_pollutant(&mut self, _tag: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_purified_composition() {
        let filter = FixedFilter(100.0);
        let original = AirComposition::new(20.0, 0.1, 90.0, 25.0).unwrap();
        let purified = filter.purified_composition(&original);
        assert_eq!(purified.oxygen_pct(), 20.0);
        assert!((purified.co2_pct() - 0.09).abs() < 1e-12);
        // 90 * 1.0 clamps to 70
        assert_eq!(purified.humidity_pct(), 70.0);
        assert_eq!(purified.temperature_c(), 25.0);

        let dry = AirComposition::new(21.0, 0.04, 20.0, 22.0).unwrap();
        assert_eq!(FixedFilter(0.0).purified_composition(&dry).humidity_pct(), 30.0);
    }
}
