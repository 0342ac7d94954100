//! Command-line front end for the airsim indoor air-quality simulator.
//!
//! The `airsim` binary builds air systems from flags or a config file, drives
//! them through simulated time and prints their status.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `simulate` | Build systems, run cycles and report status and events |
//! | `classify` | Map a 0-100 quality score to a quality level |
//! | `compose` | Validate a composition and assess breathing safety |
//! | `config` | Show, locate or initialize the config file |
//!
//! # Output Formats
//!
//! - **Text** (default): Human-readable colored output
//! - **JSON**: Machine-readable JSON format
//!
//! Logs are written to stderr; `--verbose` shows per-cycle detail and
//! `RUST_LOG` is honored otherwise.
//!
//! # Configuration
//!
//! The CLI reads `~/.config/airsim/config.toml` (or platform equivalent), or
//! the file named by `--config` / `AIRSIM_CONFIG`:
//!
//! ```toml
//! format = "text"
//! cycles = 12
//! step_minutes = 10
//!
//! [[systems]]
//! kind = "kitchen"
//! preferred_mode = "cooking"
//!
//! [[systems]]
//! kind = "bedroom"
//! sleep_start = "22:30"
//! sleep_end = "06:45"
//! ```
//!
//! `[[systems]]` entries are used by `simulate` when neither `--system` nor
//! `--room` is given.
//!
//! # Environment Variables
//!
//! - `AIRSIM_CONFIG`: Config file path (overridden by `--config`)
//! - `NO_COLOR`: Disable colored output when set
//!
//! # Examples
//!
//! A gas stove left on in a kitchen with routine ventilation disabled:
//! ```bash
//! airsim simulate -s kitchen --occupied -a gas-stove --no-auto -n 80 --events
//! ```
//!
//! A bedroom overnight in ten-minute steps, as JSON:
//! ```bash
//! airsim simulate -r bedroom:Main:14 --start 2024-06-01T21:00:00Z -n 60 -f json
//! ```
//!
//! Check a composition against the comfort band:
//! ```bash
//! airsim compose 20.9 0.09 62 24 --comfort
//! ```

// The binary lives in main.rs; the library only re-exports the engine.
pub use airsim_core;
pub use airsim_types;
