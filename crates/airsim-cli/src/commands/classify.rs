//! Classify command implementation.

use std::path::PathBuf;

use airsim_types::{ActivityLevel, QualityLevel};
use anyhow::{Result, bail};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_quality};
use crate::util::write_output;

#[derive(Debug, Serialize)]
pub struct Classification {
    pub score: f64,
    pub level: QualityLevel,
    pub label: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
    pub activity_level: ActivityLevel,
    pub requires_action: bool,
}

impl Classification {
    pub fn for_score(score: f64) -> Result<Self> {
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            bail!("Score must be between 0 and 100, got {}", score);
        }
        let level = QualityLevel::from_score(score);
        Ok(Self {
            score,
            level,
            label: level.label(),
            description: level.description(),
            recommendation: level.recommendation(),
            activity_level: level.activity_level(),
            requires_action: level.requires_action(),
        })
    }
}

pub fn cmd_classify(
    score: f64,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let classification = Classification::for_score(score)?;

    let content = match format {
        OutputFormat::Json => opts.as_json(&classification)?,
        OutputFormat::Text => format!(
            "{:.1} {} {}\n  {}\n  Activity: {}\n",
            classification.score,
            format_quality(classification.level, opts.no_color),
            classification.description,
            classification.recommendation,
            classification.activity_level
        ),
    };

    write_output(output, &content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(
            Classification::for_score(90.0).unwrap().level,
            QualityLevel::Excellent
        );
        assert_eq!(
            Classification::for_score(74.99).unwrap().level,
            QualityLevel::Moderate
        );
        assert_eq!(
            Classification::for_score(0.0).unwrap().level,
            QualityLevel::Hazardous
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Classification::for_score(f64::NAN).is_err());
        assert!(Classification::for_score(-1.0).is_err());
        assert!(Classification::for_score(100.5).is_err());
    }

    #[test]
    fn test_json_shape() {
        let c = Classification::for_score(45.0).unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["level"], "poor");
        assert_eq!(json["label"], "Poor");
        assert_eq!(json["activity_level"], "low");
        assert_eq!(json["requires_action"], true);
    }
}
