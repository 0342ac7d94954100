//! Quality grades derived from an air composition.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Five-step air quality grade.
///
/// Variants are declared from best to worst, so the derived ordering is by
/// severity: `Excellent < Good < Moderate < Poor < Hazardous`.
///
/// # Examples
///
/// ```
/// use airsim_types::QualityLevel;
///
/// assert_eq!(QualityLevel::from_score(90.0), QualityLevel::Excellent);
/// assert_eq!(QualityLevel::from_score(89.99), QualityLevel::Good);
/// assert!(QualityLevel::Poor > QualityLevel::Moderate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QualityLevel {
    Excellent,
    #[default]
    Good,
    Moderate,
    Poor,
    Hazardous,
}

/// How much physical activity the air supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActivityLevel {
    High,
    Medium,
    Low,
    Prohibited,
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityLevel::High => "high",
            ActivityLevel::Medium => "medium",
            ActivityLevel::Low => "low",
            ActivityLevel::Prohibited => "prohibited",
        };
        f.write_str(s)
    }
}

impl QualityLevel {
    /// All levels from best to worst.
    pub const ALL: [QualityLevel; 5] = [
        QualityLevel::Excellent,
        QualityLevel::Good,
        QualityLevel::Moderate,
        QualityLevel::Poor,
        QualityLevel::Hazardous,
    ];

    /// Map a composition score to a level.
    ///
    /// Lower bounds are inclusive: 90, 75, 60 and 40. Anything below 40,
    /// including NaN, is hazardous.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            QualityLevel::Excellent
        } else if score >= 75.0 {
            QualityLevel::Good
        } else if score >= 60.0 {
            QualityLevel::Moderate
        } else if score >= 40.0 {
            QualityLevel::Poor
        } else {
            QualityLevel::Hazardous
        }
    }

    /// Severity rank from 0 (excellent) to 4 (hazardous).
    #[must_use]
    pub fn severity(&self) -> u8 {
        *self as u8
    }

    /// Short label written back to rooms.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            QualityLevel::Excellent => "Excellent",
            QualityLevel::Good => "Good",
            QualityLevel::Moderate => "Moderate",
            QualityLevel::Poor => "Poor",
            QualityLevel::Hazardous => "Hazardous",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QualityLevel::Excellent => "Very clean air",
            QualityLevel::Good => "Clean air",
            QualityLevel::Moderate => "Acceptable air",
            QualityLevel::Poor => "Polluted air",
            QualityLevel::Hazardous => "Dangerous air",
        }
    }

    /// Suggested occupant action for this level.
    pub fn recommendation(&self) -> &'static str {
        match self {
            QualityLevel::Excellent => "Ideal for every activity",
            QualityLevel::Good => "Normal activity is fine",
            QualityLevel::Moderate => "Sensitive people should limit exertion",
            QualityLevel::Poor => "Ventilate and limit outdoor air intake",
            QualityLevel::Hazardous => "Ventilate immediately and leave the area",
        }
    }

    pub fn activity_level(&self) -> ActivityLevel {
        match self {
            QualityLevel::Excellent | QualityLevel::Good => ActivityLevel::High,
            QualityLevel::Moderate => ActivityLevel::Medium,
            QualityLevel::Poor => ActivityLevel::Low,
            QualityLevel::Hazardous => ActivityLevel::Prohibited,
        }
    }

    /// Whether a better level exists.
    pub fn can_improve(&self) -> bool {
        *self != QualityLevel::Excellent
    }

    /// Whether the level calls for intervention (poor or hazardous).
    pub fn requires_action(&self) -> bool {
        *self >= QualityLevel::Poor
    }

    /// One step worse, saturating at hazardous.
    #[must_use]
    pub fn downgrade(&self) -> Self {
        match self {
            QualityLevel::Excellent => QualityLevel::Good,
            QualityLevel::Good => QualityLevel::Moderate,
            QualityLevel::Moderate => QualityLevel::Poor,
            QualityLevel::Poor | QualityLevel::Hazardous => QualityLevel::Hazardous,
        }
    }

    /// Downgrade one step, but only while strictly better than `cap`.
    ///
    /// ```
    /// use airsim_types::QualityLevel;
    ///
    /// let cap = QualityLevel::Moderate;
    /// assert_eq!(QualityLevel::Good.downgrade_within(cap), QualityLevel::Moderate);
    /// assert_eq!(QualityLevel::Moderate.downgrade_within(cap), QualityLevel::Moderate);
    /// ```
    #[must_use]
    pub fn downgrade_within(&self, cap: QualityLevel) -> Self {
        if *self < cap { self.downgrade() } else { *self }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QualityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Ok(QualityLevel::Excellent),
            "good" => Ok(QualityLevel::Good),
            "moderate" => Ok(QualityLevel::Moderate),
            "poor" => Ok(QualityLevel::Poor),
            "hazardous" => Ok(QualityLevel::Hazardous),
            other => Err(format!("unknown quality level: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_score_edges() {
        assert_eq!(QualityLevel::from_score(100.0), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(90.0), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(89.999), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(75.0), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(74.999), QualityLevel::Moderate);
        assert_eq!(QualityLevel::from_score(60.0), QualityLevel::Moderate);
        assert_eq!(QualityLevel::from_score(59.999), QualityLevel::Poor);
        assert_eq!(QualityLevel::from_score(40.0), QualityLevel::Poor);
        assert_eq!(QualityLevel::from_score(39.999), QualityLevel::Hazardous);
        assert_eq!(QualityLevel::from_score(0.0), QualityLevel::Hazardous);
        assert_eq!(QualityLevel::from_score(f64::NAN), QualityLevel::Hazardous);
    }

    #[test]
    fn test_severity_matches_order() {
        for (rank, level) in QualityLevel::ALL.iter().enumerate() {
            assert_eq!(level.severity() as usize, rank);
        }
    }

    #[test]
    fn test_downgrade_saturates() {
        assert_eq!(QualityLevel::Excellent.downgrade(), QualityLevel::Good);
        assert_eq!(QualityLevel::Poor.downgrade(), QualityLevel::Hazardous);
        assert_eq!(QualityLevel::Hazardous.downgrade(), QualityLevel::Hazardous);
    }

    #[test]
    fn test_downgrade_within_cap() {
        let cap = QualityLevel::Poor;
        assert_eq!(QualityLevel::Moderate.downgrade_within(cap), QualityLevel::Poor);
        assert_eq!(QualityLevel::Poor.downgrade_within(cap), QualityLevel::Poor);
        assert_eq!(
            QualityLevel::Hazardous.downgrade_within(cap),
            QualityLevel::Hazardous
        );
    }

    #[test]
    fn test_metadata() {
        assert!(!QualityLevel::Excellent.can_improve());
        assert!(QualityLevel::Good.can_improve());
        assert!(QualityLevel::Poor.requires_action());
        assert!(!QualityLevel::Moderate.requires_action());
        assert_eq!(
            QualityLevel::Hazardous.activity_level(),
            ActivityLevel::Prohibited
        );
        assert_eq!(QualityLevel::Good.activity_level(), ActivityLevel::High);
        assert_eq!(QualityLevel::Moderate.to_string(), "Moderate");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("POOR".parse::<QualityLevel>(), Ok(QualityLevel::Poor));
        assert_eq!(" good ".parse::<QualityLevel>(), Ok(QualityLevel::Good));
        assert!("fine".parse::<QualityLevel>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&QualityLevel::Hazardous).unwrap();
        assert_eq!(json, "\"hazardous\"");
    }
}
