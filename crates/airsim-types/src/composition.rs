//! The four-field air composition value type.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CompositionError, CompositionField, CompositionResult};

/// Valid oxygen range in percent.
pub const OXYGEN_RANGE: (f64, f64) = (0.0, 100.0);
/// Valid CO2 range in percent.
pub const CO2_RANGE: (f64, f64) = (0.0, 10.0);
/// Valid relative humidity range in percent.
pub const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0);
/// Valid temperature range in degrees Celsius.
pub const TEMPERATURE_RANGE: (f64, f64) = (-50.0, 70.0);

/// Snapshot of the air in a space: oxygen, CO2, humidity and temperature.
///
/// Values are validated on construction and never change afterwards; the
/// `with_*` methods return new compositions.
///
/// # Examples
///
/// ```
/// use airsim_types::AirComposition;
///
/// let air = AirComposition::new(21.0, 0.04, 50.0, 20.0).unwrap();
/// assert!(air.is_safe_for_breathing());
/// assert!(AirComposition::new(21.0, 11.0, 50.0, 20.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawComposition"))]
pub struct AirComposition {
    oxygen_pct: f64,
    co2_pct: f64,
    humidity_pct: f64,
    temperature_c: f64,
}

/// Unvalidated wire form used for deserialization.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawComposition {
    oxygen_pct: f64,
    co2_pct: f64,
    humidity_pct: f64,
    temperature_c: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawComposition> for AirComposition {
    type Error = CompositionError;

    fn try_from(raw: RawComposition) -> CompositionResult<Self> {
        AirComposition::new(
            raw.oxygen_pct,
            raw.co2_pct,
            raw.humidity_pct,
            raw.temperature_c,
        )
    }
}

fn check(field: CompositionField, value: f64, (min, max): (f64, f64)) -> CompositionResult<f64> {
    // NaN fails both comparisons, so test containment rather than exclusion.
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(CompositionError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn clamp_field(value: f64, (min, max): (f64, f64)) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

fn sub_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

impl AirComposition {
    /// Create a composition, validating every field against its bound.
    pub fn new(
        oxygen_pct: f64,
        co2_pct: f64,
        humidity_pct: f64,
        temperature_c: f64,
    ) -> CompositionResult<Self> {
        Ok(Self {
            oxygen_pct: check(CompositionField::Oxygen, oxygen_pct, OXYGEN_RANGE)?,
            co2_pct: check(CompositionField::CarbonDioxide, co2_pct, CO2_RANGE)?,
            humidity_pct: check(CompositionField::Humidity, humidity_pct, HUMIDITY_RANGE)?,
            temperature_c: check(
                CompositionField::Temperature,
                temperature_c,
                TEMPERATURE_RANGE,
            )?,
        })
    }

    /// Create a composition, forcing each field into its bound.
    ///
    /// NaN inputs collapse to the lower bound so the result is always valid.
    #[must_use]
    pub fn clamped(oxygen_pct: f64, co2_pct: f64, humidity_pct: f64, temperature_c: f64) -> Self {
        Self {
            oxygen_pct: clamp_field(oxygen_pct, OXYGEN_RANGE),
            co2_pct: clamp_field(co2_pct, CO2_RANGE),
            humidity_pct: clamp_field(humidity_pct, HUMIDITY_RANGE),
            temperature_c: clamp_field(temperature_c, TEMPERATURE_RANGE),
        }
    }

    /// Outdoor air at sea level on a mild day.
    #[must_use]
    pub fn standard_atmosphere() -> Self {
        Self::clamped(21.0, 0.04, 50.0, 20.0)
    }

    /// Comfortable indoor air.
    #[must_use]
    pub fn indoor_optimal() -> Self {
        Self::clamped(21.0, 0.04, 45.0, 22.0)
    }

    /// Stale, oxygen-depleted air.
    #[must_use]
    pub fn dangerous() -> Self {
        Self::clamped(18.0, 0.15, 80.0, 30.0)
    }

    pub fn oxygen_pct(&self) -> f64 {
        self.oxygen_pct
    }

    pub fn co2_pct(&self) -> f64 {
        self.co2_pct
    }

    pub fn humidity_pct(&self) -> f64 {
        self.humidity_pct
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    /// Copy of this composition with a different temperature.
    pub fn with_temperature(&self, temperature_c: f64) -> CompositionResult<Self> {
        Self::new(
            self.oxygen_pct,
            self.co2_pct,
            self.humidity_pct,
            temperature_c,
        )
    }

    /// Copy of this composition with a different humidity.
    pub fn with_humidity(&self, humidity_pct: f64) -> CompositionResult<Self> {
        Self::new(
            self.oxygen_pct,
            self.co2_pct,
            humidity_pct,
            self.temperature_c,
        )
    }

    /// Whether the air can be breathed without risk.
    ///
    /// Requires O2 >= 19%, CO2 <= 0.1%, humidity 20-80% and 15-35 °C.
    pub fn is_safe_for_breathing(&self) -> bool {
        self.oxygen_pct >= 19.0
            && self.co2_pct <= 0.1
            && (20.0..=80.0).contains(&self.humidity_pct)
            && (15.0..=35.0).contains(&self.temperature_c)
    }

    /// Whether the air is within the comfort band.
    pub fn is_comfortable(&self) -> bool {
        self.oxygen_pct >= 20.5
            && self.co2_pct <= 0.08
            && (40.0..=60.0).contains(&self.humidity_pct)
            && (20.0..=25.0).contains(&self.temperature_c)
    }

    /// Overall quality score in `[0, 100]`.
    ///
    /// The unweighted mean of four sub-scores, each clamped to `[0, 100]`:
    ///
    /// | Component | Formula |
    /// |-----------|---------|
    /// | Oxygen | `(o2 - 18) / 3 * 100` |
    /// | CO2 | `(0.12 - co2) / 0.08 * 100` |
    /// | Humidity | `100 - abs(h - 50) * 2` |
    /// | Temperature | `100 - abs(t - 22.5) * 4` |
    pub fn quality_score(&self) -> f64 {
        let oxygen = sub_score((self.oxygen_pct - 18.0) / 3.0 * 100.0);
        let co2 = sub_score((0.12 - self.co2_pct) / 0.08 * 100.0);
        let humidity = sub_score(100.0 - (self.humidity_pct - 50.0).abs() * 2.0);
        let temperature = sub_score(100.0 - (self.temperature_c - 22.5).abs() * 4.0);
        (oxygen + co2 + humidity + temperature) / 4.0
    }
}

impl Default for AirComposition {
    fn default() -> Self {
        Self::standard_atmosphere()
    }
}

impl fmt::Display for AirComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "O2 {:.2}%, CO2 {:.3}%, RH {:.1}%, {:.1}°C",
            self.oxygen_pct, self.co2_pct, self.humidity_pct, self.temperature_c
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_return_constructor_values() {
        let air = AirComposition::new(21.0, 0.04, 50.0, 20.0).unwrap();
        assert_eq!(air.oxygen_pct(), 21.0);
        assert_eq!(air.co2_pct(), 0.04);
        assert_eq!(air.humidity_pct(), 50.0);
        assert_eq!(air.temperature_c(), 20.0);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(AirComposition::new(0.0, 0.0, 0.0, -50.0).is_ok());
        assert!(AirComposition::new(100.0, 10.0, 100.0, 70.0).is_ok());
    }

    #[test]
    fn test_out_of_range_reports_field() {
        let err = AirComposition::new(21.0, 0.04, 50.0, 71.0).unwrap_err();
        assert_eq!(
            err,
            CompositionError::OutOfRange {
                field: CompositionField::Temperature,
                value: 71.0,
                min: -50.0,
                max: 70.0,
            }
        );

        let err = AirComposition::new(-0.1, 0.04, 50.0, 20.0).unwrap_err();
        assert!(matches!(
            err,
            CompositionError::OutOfRange {
                field: CompositionField::Oxygen,
                ..
            }
        ));
        assert!(err.to_string().contains("oxygen"));
    }

    #[test]
    fn test_nan_is_rejected() {
        assert!(AirComposition::new(f64::NAN, 0.04, 50.0, 20.0).is_err());
        assert!(AirComposition::new(21.0, 0.04, f64::NAN, 20.0).is_err());
    }

    #[test]
    fn test_clamped_forces_bounds() {
        let air = AirComposition::clamped(150.0, -1.0, f64::NAN, 99.0);
        assert_eq!(air.oxygen_pct(), 100.0);
        assert_eq!(air.co2_pct(), 0.0);
        assert_eq!(air.humidity_pct(), 0.0);
        assert_eq!(air.temperature_c(), 70.0);
    }

    #[test]
    fn test_with_helpers_validate() {
        let air = AirComposition::standard_atmosphere();
        let warmer = air.with_temperature(25.0).unwrap();
        assert_eq!(warmer.temperature_c(), 25.0);
        assert_eq!(air.temperature_c(), 20.0);
        assert!(air.with_humidity(101.0).is_err());
        assert_eq!(air.with_humidity(60.0).unwrap().humidity_pct(), 60.0);
    }

    #[test]
    fn test_quality_score_of_presets() {
        // 100 + 100 + 100 + 90
        let standard = AirComposition::standard_atmosphere();
        assert!((standard.quality_score() - 97.5).abs() < 1e-9);

        // 100 + 100 + 90 + 98
        let optimal = AirComposition::indoor_optimal();
        assert!((optimal.quality_score() - 97.0).abs() < 1e-9);

        // 0 + 0 + 40 + 70
        let dangerous = AirComposition::dangerous();
        assert!((dangerous.quality_score() - 27.5).abs() < 1e-9);
    }

    #[test]
    fn test_safety_and_comfort() {
        assert!(AirComposition::indoor_optimal().is_comfortable());
        assert!(AirComposition::indoor_optimal().is_safe_for_breathing());
        assert!(!AirComposition::dangerous().is_safe_for_breathing());
        // safe but too dry for comfort
        let dry = AirComposition::new(21.0, 0.04, 30.0, 22.0).unwrap();
        assert!(dry.is_safe_for_breathing());
        assert!(!dry.is_comfortable());
        // boundary values are inclusive
        let edge = AirComposition::new(19.0, 0.1, 80.0, 35.0).unwrap();
        assert!(edge.is_safe_for_breathing());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let ok: AirComposition = serde_json::from_str(
            r#"{"oxygen_pct":21.0,"co2_pct":0.04,"humidity_pct":50.0,"temperature_c":20.0}"#,
        )
        .unwrap();
        assert_eq!(ok, AirComposition::standard_atmosphere());

        let bad = serde_json::from_str::<AirComposition>(
            r#"{"oxygen_pct":21.0,"co2_pct":12.0,"humidity_pct":50.0,"temperature_c":20.0}"#,
        );
        assert!(bad.is_err());
    }
}
