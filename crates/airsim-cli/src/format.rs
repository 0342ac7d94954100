//! Output formatting utilities for text and JSON output.

use airsim_core::{AirComposition, AirEvent, BreathingSafety, QualityLevel, SystemStatus};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }

    /// Serialize value to a pretty JSON string.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)? + "\n")
    }
}

/// Format a quality level with color
#[must_use]
pub fn format_quality(level: QualityLevel, no_color: bool) -> String {
    let label = level.label().to_uppercase();
    if no_color {
        return format!("[{}]", label);
    }
    match level {
        QualityLevel::Excellent => format!("[{}]", label.bright_green()),
        QualityLevel::Good => format!("[{}]", label.green()),
        QualityLevel::Moderate => format!("[{}]", label.yellow()),
        // Orange
        QualityLevel::Poor => format!("[{}]", label.truecolor(255, 165, 0)),
        QualityLevel::Hazardous => format!("[{}]", label.red().bold()),
    }
}

#[must_use]
pub fn format_safety(safety: BreathingSafety, no_color: bool) -> String {
    let text = safety.message();
    if no_color {
        return text.to_string();
    }
    match safety {
        BreathingSafety::Safe => text.green().to_string(),
        BreathingSafety::Caution => text.yellow().to_string(),
        BreathingSafety::Danger | BreathingSafety::ExtremeDanger => text.red().to_string(),
    }
}

/// One-line composition summary
#[must_use]
pub fn format_composition(air: &AirComposition) -> String {
    format!(
        "O2 {:.2}%  CO2 {:.3}%  RH {:.1}%  {:.1}°C",
        air.oxygen_pct(),
        air.co2_pct(),
        air.humidity_pct(),
        air.temperature_c()
    )
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    let underline = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, underline)
    } else {
        format!("{}\n{}", title.bold(), underline.dimmed())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

/// Multi-line status block for one system
pub fn format_status_text(status: &SystemStatus, opts: &FormatOptions) -> String {
    let common = status.common();
    let mut out = String::new();

    let title = format!("{} system", common.kind);
    out.push_str(&format_title(&title, opts.no_color));
    out.push('\n');

    let row = |out: &mut String, label: &str, value: String| {
        out.push_str(&format!("  {:<13}{}\n", label, value));
    };

    row(&mut out, "Quality", format_quality(common.quality, opts.no_color));
    row(
        &mut out,
        "Rooms",
        format!(
            "{} ({} occupied)",
            if common.rooms.is_empty() {
                "none".to_string()
            } else {
                common.rooms.join(", ")
            },
            common.occupied_rooms
        ),
    );
    row(&mut out, "Air", format_composition(&common.composition));
    row(
        &mut out,
        "Score",
        format!("{:.1}", common.composition.quality_score()),
    );
    let ventilation = if common.ventilating {
        format!(
            "{} at {:.1} ACH, {:.0}% efficient, grade {}",
            common.ventilation_mode,
            common.air_change_rate,
            common.ventilation_efficiency,
            common.energy_grade
        )
    } else {
        format!("off ({:.1} ACH set)", common.air_change_rate)
    };
    row(&mut out, "Ventilation", ventilation);
    row(
        &mut out,
        "Filtration",
        format!(
            "{}, {:.0}% ({}){}",
            on_off(common.filtering),
            common.filter_efficiency,
            common.filter_condition,
            if common.needs_filter_replacement {
                ", replace filter"
            } else {
                ""
            }
        ),
    );
    row(
        &mut out,
        "Breathable",
        format!(
            "{} (index {:.2})",
            yes_no(common.breathable),
            common.breathability_index
        ),
    );
    row(
        &mut out,
        "Safety",
        format_safety(common.breathing_safety, opts.no_color),
    );
    row(
        &mut out,
        "Auto",
        format!(
            "{}, {} cycles",
            on_off(common.auto_ventilation),
            common.cycles
        ),
    );

    match status {
        SystemStatus::Kitchen(k) => {
            row(
                &mut out,
                "Cooking",
                format!(
                    "{} ({:?}), gas stove {}, leak detection {}",
                    on_off(k.cooking_mode),
                    k.cooking_source,
                    on_off(k.gas_stove_in_use),
                    on_off(k.gas_leak_detection)
                ),
            );
            row(
                &mut out,
                "Pollutants",
                format!(
                    "smoke {:.1}, grease {:.1}, VOC {:.0}, CO {:.1} ppm, odor {:.1}",
                    k.smoke_level, k.grease_level, k.voc_level, k.carbon_monoxide_ppm, k.odor_level
                ),
            );
            row(&mut out, "Hood fan", format!("speed {}", k.exhaust_fan_speed));
        }
        SystemStatus::Bathroom(b) => {
            row(
                &mut out,
                "Shower",
                format!(
                    "{} ({:?}), fan {}, timer {} min",
                    on_off(b.shower_mode),
                    b.shower_source,
                    on_off(b.exhaust_fan),
                    b.ventilation_timer_minutes
                ),
            );
            row(
                &mut out,
                "Pollutants",
                format!(
                    "mold risk {:.1}%, bacteria {:.0}, ammonia {:.2}, steam {:.1}",
                    b.mold_risk, b.bacteria_count, b.ammonia_level, b.steam_level
                ),
            );
            row(
                &mut out,
                "Humidity",
                format!(
                    "target {:.0}%, antibacterial {}",
                    b.target_humidity,
                    on_off(b.antibacterial)
                ),
            );
        }
        SystemStatus::Bedroom(b) => {
            row(
                &mut out,
                "Sleep",
                format!(
                    "{} ({:?}), window {}, night mode {}",
                    on_off(b.sleep_mode),
                    b.sleep_source,
                    b.sleep_window,
                    on_off(b.night_mode)
                ),
            );
            row(
                &mut out,
                "Comfort",
                format!(
                    "allergens {:.1}, bedding {:.0}%, noise {:.0} dB",
                    b.allergen_level,
                    b.bedding_cleanliness * 100.0,
                    b.noise_db
                ),
            );
        }
        SystemStatus::LivingRoom(l) => {
            row(
                &mut out,
                "Activity",
                format!(
                    "{} electronics, dust {:.1}",
                    l.active_electronics, l.dust_level
                ),
            );
        }
        SystemStatus::Home(h) => {
            row(&mut out, "Runtime", format!("{:.2} h", h.operating_hours));
        }
        _ => {}
    }

    out
}

/// Human-readable event line
#[must_use]
pub fn format_event(event: &AirEvent) -> String {
    match event {
        AirEvent::QualityChanged { from, to } => format!("quality {} -> {}", from, to),
        AirEvent::VentilationStarted {
            mode,
            air_change_rate,
        } => format!("ventilation started: {} at {:.1} ACH", mode, air_change_rate),
        AirEvent::VentilationStopped => "ventilation stopped".to_string(),
        AirEvent::EmergencyVentilation { reason } => format!("EMERGENCY: {}", reason),
        AirEvent::ModeChanged { mode, active } => {
            format!("{:?} mode {}", mode, on_off(*active)).to_lowercase()
        }
        AirEvent::RoomAdded { name } => format!("room added: {}", name),
        AirEvent::RoomRemoved { name } => format!("room removed: {}", name),
        other => format!("{:?}", other),
    }
}

pub fn format_events_text(events: &[AirEvent], opts: &FormatOptions) -> String {
    let mut out = String::from("  Events\n");
    if events.is_empty() {
        out.push_str("    (none)\n");
    }
    for event in events {
        let line = format_event(event);
        let line = match event {
            AirEvent::EmergencyVentilation { .. } if !opts.no_color => line.red().to_string(),
            _ => line,
        };
        out.push_str(&format!("    - {}\n", line));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use airsim_core::{
        ActivityMode, AirControl, KitchenAir, Room, RoomType, SharedRoom, SystemClock,
        VentilationMode,
    };

    use super::*;

    #[test]
    fn test_format_quality_no_color() {
        assert_eq!(format_quality(QualityLevel::Good, true), "[GOOD]");
        assert_eq!(format_quality(QualityLevel::Hazardous, true), "[HAZARDOUS]");
    }

    #[test]
    fn test_format_quality_colored_contains_label() {
        let s = format_quality(QualityLevel::Poor, false);
        assert!(s.contains("POOR"));
        assert!(s.contains('\x1b'));
    }

    #[test]
    fn test_format_composition() {
        let air = AirComposition::standard_atmosphere();
        let s = format_composition(&air);
        assert!(s.starts_with("O2 "));
        assert!(s.contains("CO2 "));
    }

    #[test]
    fn test_format_event() {
        assert_eq!(
            format_event(&AirEvent::ModeChanged {
                mode: ActivityMode::Cooking,
                active: true
            }),
            "cooking mode on"
        );
        assert_eq!(
            format_event(&AirEvent::VentilationStarted {
                mode: VentilationMode::Forced,
                air_change_rate: 4.0
            }),
            "ventilation started: forced at 4.0 ACH"
        );
    }

    #[test]
    fn test_status_text_lists_kitchen_details() {
        let mut kitchen = KitchenAir::new(Arc::new(SystemClock));
        let room = Room::shared("Galley", RoomType::Kitchen, 9.0).unwrap();
        kitchen.add_room(room as SharedRoom);
        let text = format_status_text(&kitchen.status(), &FormatOptions::new(true));
        assert!(text.starts_with("kitchen system"));
        assert!(text.contains("Galley (0 occupied)"));
        assert!(text.contains("Hood fan"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_events_text_empty() {
        let text = format_events_text(&[], &FormatOptions::new(true));
        assert!(text.contains("(none)"));
    }
}
