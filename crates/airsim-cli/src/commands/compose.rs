//! Compose command implementation.

use std::path::PathBuf;

use airsim_core::{
    AirComposition, BreathingSafety, CompositionValidator, CompositionWarning, QualityLevel,
};
use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, format_composition, format_quality, format_safety, format_title,
};
use crate::util::write_output;

/// Assessment of one composition.
#[derive(Debug, Serialize)]
pub struct CompositionReport {
    pub composition: AirComposition,
    pub quality_score: f64,
    pub quality: QualityLevel,
    pub safe_for_breathing: bool,
    pub comfortable: bool,
    pub safety: BreathingSafety,
    /// Which limits the warnings were checked against.
    pub band: &'static str,
    pub warnings: Vec<CompositionWarning>,
}

impl CompositionReport {
    pub fn assess(composition: AirComposition, comfort: bool) -> Self {
        let validator = if comfort {
            CompositionValidator::comfort()
        } else {
            CompositionValidator::default()
        };
        let result = validator.validate(&composition);
        let score = composition.quality_score();
        Self {
            quality_score: score,
            quality: QualityLevel::from_score(score),
            safe_for_breathing: result.is_safe,
            comfortable: composition.is_comfortable(),
            safety: result.safety,
            band: if comfort { "comfort" } else { "safety" },
            warnings: result.warnings,
            composition,
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_compose(
    oxygen: f64,
    co2: f64,
    humidity: f64,
    temperature: f64,
    comfort: bool,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let composition = AirComposition::new(oxygen, co2, humidity, temperature)
        .context("Invalid air composition")?;
    let report = CompositionReport::assess(composition, comfort);

    let content = match format {
        OutputFormat::Json => opts.as_json(&report)?,
        OutputFormat::Text => format_report_text(&report, opts),
    };

    write_output(output, &content)?;
    Ok(())
}

fn format_report_text(report: &CompositionReport, opts: &FormatOptions) -> String {
    let mut out = format_title(&format_composition(&report.composition), opts.no_color);
    out.push('\n');
    out.push_str(&format!(
        "  Score        {:.1} {}\n",
        report.quality_score,
        format_quality(report.quality, opts.no_color)
    ));
    out.push_str(&format!(
        "  Safety       {}\n",
        format_safety(report.safety, opts.no_color)
    ));
    out.push_str(&format!(
        "  Comfortable  {}\n",
        if report.comfortable { "yes" } else { "no" }
    ));
    if report.warnings.is_empty() {
        out.push_str(&format!("  No {} warnings\n", report.band));
    } else {
        out.push_str(&format!("  {} warnings\n", report.band));
        for warning in &report.warnings {
            out.push_str(&format!("    - {}\n", warning));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_air_has_no_warnings() {
        let report = CompositionReport::assess(AirComposition::indoor_optimal(), true);
        assert!(report.safe_for_breathing);
        assert!(report.comfortable);
        assert!(report.warnings.is_empty());
        assert_eq!(report.quality, QualityLevel::Excellent);
    }

    #[test]
    fn test_stuffy_room_warns() {
        let air = AirComposition::new(20.9, 0.15, 50.0, 22.0).unwrap();
        let report = CompositionReport::assess(air, false);
        assert!(!report.safe_for_breathing);
        assert_eq!(report.safety, BreathingSafety::Caution);
        assert!(matches!(
            report.warnings.as_slice(),
            [CompositionWarning::Co2TooHigh { .. }]
        ));
    }

    #[test]
    fn test_comfort_band_is_stricter() {
        let air = AirComposition::new(20.9, 0.04, 65.0, 22.0).unwrap();
        assert!(CompositionReport::assess(air, false).warnings.is_empty());
        assert_eq!(CompositionReport::assess(air, true).warnings.len(), 1);
    }

    #[test]
    fn test_text_lists_warnings() {
        let air = AirComposition::new(18.0, 0.04, 50.0, 22.0).unwrap();
        let report = CompositionReport::assess(air, false);
        let text = format_report_text(&report, &FormatOptions::new(true));
        assert!(text.contains("safety warnings"));
        assert!(text.contains("Oxygen 18.00% is below 19%"));
    }
}
