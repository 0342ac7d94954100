//! Value types for the airsim air-quality simulation engine.
//!
//! This crate holds the plain data shared by the engine (`airsim-core`) and
//! any front end that displays or stores its results.
//!
//! # Features
//!
//! - [`AirComposition`]: validated oxygen/CO2/humidity/temperature snapshot
//! - [`QualityLevel`]: five-step grade with score mapping and metadata
//! - [`CompositionError`]: construction failures
//!
//! # Example
//!
//! ```
//! use airsim_types::{AirComposition, QualityLevel};
//!
//! let air = AirComposition::indoor_optimal();
//! assert_eq!(QualityLevel::from_score(air.quality_score()), QualityLevel::Excellent);
//! ```

pub mod composition;
pub mod error;
pub mod quality;

pub use composition::{
    AirComposition, CO2_RANGE, HUMIDITY_RANGE, OXYGEN_RANGE, TEMPERATURE_RANGE,
};
pub use error::{CompositionError, CompositionField, CompositionResult};
pub use quality::{ActivityLevel, QualityLevel};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Lower scores never map to a less severe level.
        #[test]
        fn from_score_is_monotonic(a in -50.0f64..150.0, b in -50.0f64..150.0) {
            let (low, high) = if a < b { (a, b) } else { (b, a) };
            prop_assert!(
                QualityLevel::from_score(low).severity() >= QualityLevel::from_score(high).severity()
            );
        }

        /// Any composition inside the bounds has a score in [0, 100].
        #[test]
        fn score_stays_in_range(
            o2 in 0.0f64..=100.0,
            co2 in 0.0f64..=10.0,
            h in 0.0f64..=100.0,
            t in -50.0f64..=70.0,
        ) {
            let air = AirComposition::new(o2, co2, h, t).unwrap();
            let score = air.quality_score();
            prop_assert!((0.0..=100.0).contains(&score));
        }

        /// Clamped construction always yields a value the validating
        /// constructor accepts.
        #[test]
        fn clamped_is_always_valid(
            o2 in proptest::num::f64::ANY,
            co2 in proptest::num::f64::ANY,
            h in proptest::num::f64::ANY,
            t in proptest::num::f64::ANY,
        ) {
            let air = AirComposition::clamped(o2, co2, h, t);
            prop_assert!(AirComposition::new(
                air.oxygen_pct(),
                air.co2_pct(),
                air.humidity_pct(),
                air.temperature_c()
            ).is_ok());
        }
    }
}
