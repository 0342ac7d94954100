//! Error types for constructing airsim value types.

use core::fmt;

use thiserror::Error;

/// Field of an [`AirComposition`](crate::AirComposition) that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CompositionField {
    Oxygen,
    CarbonDioxide,
    Humidity,
    Temperature,
}

impl fmt::Display for CompositionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompositionField::Oxygen => "oxygen",
            CompositionField::CarbonDioxide => "CO2",
            CompositionField::Humidity => "humidity",
            CompositionField::Temperature => "temperature",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when building an air composition.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CompositionError {
    /// A field lies outside its physical bound.
    #[error("{field} value {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: CompositionField,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Result type alias using airsim-types' CompositionError type.
pub type CompositionResult<T> = std::result::Result<T, CompositionError>;
