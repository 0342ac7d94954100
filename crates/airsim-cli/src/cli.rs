//! CLI argument definitions using clap.

use std::path::PathBuf;

use airsim_core::{AirSystemKind, RoomType};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "airsim")]
#[command(author, version, about = "Indoor air-quality simulator", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "AIRSIM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build air systems, drive simulation cycles and print their status
    Simulate(SimulateArgs),

    /// Map a quality score (0-100) to a quality level
    Classify {
        /// Score between 0 and 100
        score: f64,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Validate an air composition and assess it
    #[command(allow_negative_numbers = true)]
    Compose {
        /// Oxygen, percent
        oxygen: f64,

        /// CO2, percent
        co2: f64,

        /// Relative humidity, percent
        humidity: f64,

        /// Temperature, °C
        temperature: f64,

        /// Check against the comfort band instead of the safety band
        #[arg(long)]
        comfort: bool,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Activities to switch on before the first cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Activity {
    /// Kitchen cooking mode (manual hold)
    Cooking,
    /// Light the kitchen gas stove
    GasStove,
    /// Bathroom shower mode (manual hold)
    Shower,
    /// Bedroom sleep mode (manual hold)
    Sleep,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Cooking => "cooking",
            Activity::GasStove => "gas-stove",
            Activity::Shower => "shower",
            Activity::Sleep => "sleep",
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// System kind; configured systems are used when omitted
    #[arg(short, long, value_parser = parse_kind)]
    pub system: Option<AirSystemKind>,

    /// Room to serve as TYPE[:NAME[:AREA]], may be repeated
    #[arg(short, long, value_parser = parse_room_spec)]
    pub room: Vec<RoomSpec>,

    /// Mark every room occupied
    #[arg(long)]
    pub occupied: bool,

    /// Re-roll each room's occupancy every cycle with this probability
    #[arg(long, conflicts_with = "occupied", value_parser = parse_probability)]
    pub occupancy: Option<f64>,

    /// Seed for --occupancy
    #[arg(long, requires = "occupancy")]
    pub seed: Option<u64>,

    /// Number of cycles to run
    #[arg(short = 'n', long)]
    pub cycles: Option<u32>,

    /// Simulated minutes between cycles
    #[arg(long)]
    pub step_minutes: Option<i64>,

    /// Simulated start time (RFC 3339), defaults to now
    #[arg(long)]
    pub start: Option<String>,

    /// Activity to switch on, may be repeated
    #[arg(short, long, value_enum)]
    pub activity: Vec<Activity>,

    /// Start ventilating in this mode
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Let the system pick a strategy from the outdoor air quality index
    #[arg(long, conflicts_with = "mode")]
    pub outdoor_aqi: Option<u16>,

    /// Air change rate to set after starting
    #[arg(long)]
    pub rate: Option<f64>,

    /// Disable routine automatic ventilation (interlocks still run)
    #[arg(long)]
    pub no_auto: bool,

    /// Clean the system's rooms after the last cycle
    #[arg(long)]
    pub clean: bool,

    /// Include recorded events in the output
    #[arg(short, long)]
    pub events: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Room described on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSpec {
    pub room_type: RoomType,
    pub name: String,
    pub area: f64,
}

/// Default floor area for rooms given without one, in m².
pub const DEFAULT_ROOM_AREA: f64 = 15.0;

fn parse_kind(s: &str) -> Result<AirSystemKind, String> {
    s.parse().map_err(|e: airsim_core::Error| e.to_string())
}

fn parse_room_spec(s: &str) -> Result<RoomSpec, String> {
    let mut parts = s.splitn(3, ':');
    let room_type: RoomType = parts
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e: airsim_core::Error| e.to_string())?;
    let name = match parts.next() {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => default_room_name(room_type).to_string(),
    };
    let area = match parts.next() {
        Some(area) => area
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("Invalid room area '{}'", area))?,
        None => DEFAULT_ROOM_AREA,
    };
    Ok(RoomSpec {
        room_type,
        name,
        area,
    })
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s
        .parse()
        .map_err(|_| format!("Invalid probability '{}'", s))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("Probability must be between 0 and 1, got {}", p))
    }
}

pub fn default_room_name(room_type: RoomType) -> &'static str {
    match room_type {
        RoomType::LivingRoom => "Living room",
        RoomType::Bedroom => "Bedroom",
        RoomType::Kitchen => "Kitchen",
        RoomType::Bathroom => "Bathroom",
    }
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a starter configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
