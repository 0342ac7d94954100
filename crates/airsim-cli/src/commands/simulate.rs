//! Simulate command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use airsim_core::{
    AirControl, AirEvent, AirSystem, AirSystemKind, Clock, ManualClock, Room, RoomType,
    SharedRoom, SystemClock, SystemConfig, SystemStatus, Ventilation, VentilationMode,
};
use anyhow::{Context, Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use time::Duration;
use tracing::{debug, info};

use crate::cli::{
    Activity, DEFAULT_ROOM_AREA, OutputFormat, RoomSpec, SimulateArgs, default_room_name,
};
use crate::config::Config;
use crate::format::{FormatOptions, format_events_text, format_status_text, format_title};
use crate::util::{format_timestamp, parse_timestamp, write_output};

const DEFAULT_CYCLES: u32 = 1;
const DEFAULT_STEP_MINUTES: i64 = 10;

/// Result of a simulation run.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub started_at: String,
    pub finished_at: String,
    pub cycles: u32,
    pub step_minutes: i64,
    pub systems: Vec<SystemRun>,
}

#[derive(Debug, Serialize)]
pub struct SystemRun {
    pub status: SystemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<AirEvent>>,
}

/// A system to build, with the rooms it serves.
#[derive(Debug, Clone)]
struct Plan {
    config: SystemConfig,
    rooms: Vec<RoomSpec>,
}

struct Running {
    system: AirSystem,
    rooms: Vec<Arc<Room>>,
}

pub fn cmd_simulate(
    args: &SimulateArgs,
    config: &Config,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let report = run_simulation(args, config)?;

    let content = match config.resolve_format(args.format) {
        OutputFormat::Json => opts.as_json(&report)?,
        OutputFormat::Text => format_report_text(&report, opts),
    };

    write_output(output, &content)?;
    Ok(())
}

/// Build every planned system, drive it and collect the final status.
pub fn run_simulation(args: &SimulateArgs, config: &Config) -> Result<SimulationReport> {
    let cycles = args.cycles.or(config.cycles).unwrap_or(DEFAULT_CYCLES);
    let step_minutes = args
        .step_minutes
        .or(config.step_minutes)
        .unwrap_or(DEFAULT_STEP_MINUTES);
    if step_minutes < 0 {
        bail!("--step-minutes must not be negative, got {}", step_minutes);
    }

    let started_at = match &args.start {
        Some(s) => parse_timestamp(s)?,
        None => SystemClock.now(),
    };
    let step = step_minutes
        .checked_mul(60)
        .map(Duration::seconds)
        .filter(|step| {
            step.checked_mul(i32::try_from(cycles).unwrap_or(i32::MAX))
                .and_then(|total| started_at.checked_add(total))
                .is_some()
        })
        .with_context(|| {
            format!(
                "--step-minutes {} over {} cycles runs past the supported date range",
                step_minutes, cycles
            )
        })?;
    let clock = Arc::new(ManualClock::new(started_at));

    let mut running = plan(args, config)?
        .into_iter()
        .map(|plan| build(plan, args, clock.clone()))
        .collect::<Result<Vec<_>>>()?;

    for activity in &args.activity {
        let mut accepted = false;
        for r in &mut running {
            accepted |= apply_activity(&mut r.system, *activity);
        }
        if !accepted {
            bail!(
                "Activity '{}' does not apply to any simulated system",
                activity.as_str()
            );
        }
    }

    let mut rng = args.occupancy.map(|_| match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    });

    for cycle in 0..cycles {
        if let (Some(p), Some(rng)) = (args.occupancy, rng.as_mut()) {
            for room in running.iter().flat_map(|r| r.rooms.iter()) {
                if rng.random_bool(p) {
                    room.enter();
                } else {
                    room.exit();
                }
            }
        }
        for r in &mut running {
            r.system.circulate_air();
        }
        debug!(cycle = cycle + 1, "cycle complete");
        if !clock.advance(step) {
            bail!("simulation clock left the supported date range at cycle {}", cycle + 1);
        }
    }

    if args.clean {
        for r in &mut running {
            clean(&mut r.system);
        }
    }

    let systems = running
        .into_iter()
        .map(|mut r| SystemRun {
            status: r.system.status(),
            events: args.events.then(|| r.system.drain_events()),
        })
        .collect();

    Ok(SimulationReport {
        started_at: format_timestamp(started_at),
        finished_at: format_timestamp(clock.now()),
        cycles,
        step_minutes,
        systems,
    })
}

/// Flags describe one system; without them the configured systems are used.
fn plan(args: &SimulateArgs, config: &Config) -> Result<Vec<Plan>> {
    let from_flags = args.system.is_some() || !args.room.is_empty() || config.systems.is_empty();

    let plans = if from_flags {
        let kind = args.system.unwrap_or_else(|| match args.room.as_slice() {
            [only] => AirSystemKind::for_room_type(only.room_type),
            _ => AirSystemKind::Home,
        });
        let rooms = if args.room.is_empty() {
            vec![default_room(kind)]
        } else {
            args.room.clone()
        };
        vec![Plan {
            config: SystemConfig::new(kind),
            rooms,
        }]
    } else {
        config
            .systems
            .iter()
            .map(|system| Plan {
                config: system.clone(),
                rooms: vec![default_room(system.kind)],
            })
            .collect()
    };

    plans
        .into_iter()
        .map(|mut plan| {
            if args.no_auto {
                plan.config.auto_ventilation = false;
            }
            if let Some(mode) = &args.mode {
                plan.config.preferred_mode = Some(VentilationMode::parse(mode));
            }
            if let Some(rate) = args.rate {
                plan.config.air_change_rate = Some(rate);
            }
            plan.config
                .validate()
                .with_context(|| format!("Invalid settings for {} system", plan.config.kind))?;
            Ok(plan)
        })
        .collect()
}

fn default_room(kind: AirSystemKind) -> RoomSpec {
    let room_type = match kind {
        AirSystemKind::Kitchen => RoomType::Kitchen,
        AirSystemKind::Bathroom => RoomType::Bathroom,
        AirSystemKind::Bedroom => RoomType::Bedroom,
        AirSystemKind::LivingRoom | AirSystemKind::Home => RoomType::LivingRoom,
    };
    RoomSpec {
        room_type,
        name: default_room_name(room_type).to_string(),
        area: DEFAULT_ROOM_AREA,
    }
}

fn build(plan: Plan, args: &SimulateArgs, clock: Arc<ManualClock>) -> Result<Running> {
    let mut system = AirSystem::from_config(&plan.config, clock)
        .with_context(|| format!("Failed to build {} system", plan.config.kind))?;

    let mut rooms = Vec::with_capacity(plan.rooms.len());
    for spec in plan.rooms {
        let room = Room::shared(spec.name.as_str(), spec.room_type, spec.area)
            .with_context(|| format!("Invalid room '{}'", spec.name))?;
        if args.occupied {
            room.enter();
        }
        system.add_room(room.clone() as SharedRoom);
        rooms.push(room);
    }

    if let Some(aqi) = args.outdoor_aqi {
        let action = system.smart_ventilation(aqi);
        info!(aqi, ?action, system = %system.kind(), "outdoor air strategy");
    }

    Ok(Running { system, rooms })
}

/// Switch an activity on. Returns false when the system has no such mode.
fn apply_activity(system: &mut AirSystem, activity: Activity) -> bool {
    let applied = match activity {
        Activity::Cooking => system
            .as_kitchen_mut()
            .map(|kitchen| kitchen.activate_cooking_mode()),
        Activity::GasStove => system
            .as_kitchen_mut()
            .map(|kitchen| kitchen.set_gas_stove_in_use(true)),
        Activity::Shower => system
            .as_bathroom_mut()
            .map(|bathroom| bathroom.activate_shower_mode()),
        Activity::Sleep => system
            .as_bedroom_mut()
            .map(|bedroom| bedroom.activate_sleep_mode()),
    };
    applied.is_some()
}

fn clean(system: &mut AirSystem) {
    match system {
        AirSystem::Kitchen(kitchen) => kitchen.perform_kitchen_cleaning(),
        AirSystem::Bathroom(bathroom) => bathroom.perform_bathroom_cleaning(),
        AirSystem::Bedroom(bedroom) => bedroom.clean_bedding(),
        AirSystem::LivingRoom(living) => living.perform_living_room_cleaning(),
        AirSystem::Home(_) => debug!("home system has nothing to clean"),
    }
}

fn format_report_text(report: &SimulationReport, opts: &FormatOptions) -> String {
    let mut out = format_title(
        &format!(
            "Simulated {} cycle{} ({} to {})",
            report.cycles,
            if report.cycles == 1 { "" } else { "s" },
            report.started_at,
            report.finished_at
        ),
        opts.no_color,
    );
    out.push_str("\n\n");
    for run in &report.systems {
        out.push_str(&format_status_text(&run.status, opts));
        if let Some(events) = &run.events {
            out.push_str(&format_events_text(events, opts));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Commands};

    fn args(extra: &[&str]) -> SimulateArgs {
        let argv = ["airsim", "simulate", "--start", "2024-06-01T18:00:00Z"]
            .into_iter()
            .chain(extra.iter().copied());
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Simulate(args) => args,
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_default_is_one_home_cycle() {
        let report = run_simulation(&args(&[]), &Config::default()).unwrap();
        assert_eq!(report.cycles, 1);
        assert_eq!(report.systems.len(), 1);
        assert_eq!(report.systems[0].status.kind(), AirSystemKind::Home);
        assert_eq!(report.started_at, "2024-06-01T18:00:00Z");
        assert_eq!(report.finished_at, "2024-06-01T18:10:00Z");
    }

    #[test]
    fn test_single_room_picks_its_system() {
        let report =
            run_simulation(&args(&["-r", "bathroom:Ensuite:6"]), &Config::default()).unwrap();
        let status = &report.systems[0].status;
        assert_eq!(status.kind(), AirSystemKind::Bathroom);
        assert_eq!(status.common().rooms, vec!["Ensuite".to_string()]);
    }

    #[test]
    fn test_gas_leak_scenario() {
        let report = run_simulation(
            &args(&[
                "-s", "kitchen", "--occupied", "-a", "gas-stove", "--no-auto", "-n", "80", "-e",
            ]),
            &Config::default(),
        )
        .unwrap();
        let run = &report.systems[0];
        // Auto ventilation is off, so only the interlock can have started this.
        assert_eq!(
            run.status.common().ventilation_mode,
            VentilationMode::Emergency
        );
        let events = run.events.as_ref().unwrap();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, AirEvent::EmergencyVentilation { .. }))
        );
    }

    #[test]
    fn test_activity_must_match_a_system() {
        let err = run_simulation(&args(&["-s", "bedroom", "-a", "shower"]), &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("shower"));
    }

    #[test]
    fn test_rate_outside_range_rejected() {
        let err = run_simulation(&args(&["-s", "bedroom", "--rate", "12"]), &Config::default())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("air_change_rate"));
    }

    #[test]
    fn test_configured_systems_used_without_flags() {
        let config = Config::starter();
        let report = run_simulation(&args(&["-n", "2"]), &config).unwrap();
        let kinds: Vec<_> = report.systems.iter().map(|r| r.status.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                AirSystemKind::Home,
                AirSystemKind::Kitchen,
                AirSystemKind::Bedroom
            ]
        );
        assert_eq!(
            report.systems[2].status.common().cycles,
            2,
            "every system runs every cycle"
        );
    }

    #[test]
    fn test_seeded_occupancy_is_reproducible() {
        let a = args(&["-s", "living_room", "--occupancy", "0.5", "--seed", "7", "-n", "6"]);
        let first = run_simulation(&a, &Config::default()).unwrap();
        let second = run_simulation(&a, &Config::default()).unwrap();
        assert_eq!(
            first.systems[0].status.common().composition,
            second.systems[0].status.common().composition
        );
    }

    #[test]
    fn test_negative_step_rejected() {
        assert!(run_simulation(&args(&["--step-minutes=-5"]), &Config::default()).is_err());
    }

    #[test]
    fn test_step_past_year_9999_rejected() {
        let err = run_simulation(
            &args(&["-s", "home", "-n", "3", "--step-minutes", "999999999999"]),
            &Config::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("date range"));

        // A step that fits once but not three times is caught up front too.
        let err = run_simulation(
            &args(&["-n", "3", "--step-minutes", "1500000000"]),
            &Config::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("date range"));
    }

    #[test]
    fn test_report_serializes() {
        let report = run_simulation(&args(&["-s", "bedroom"]), &Config::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["systems"][0]["status"]["system"], "bedroom");
        assert!(json["systems"][0].get("events").is_none());
    }
}
