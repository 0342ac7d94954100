//! Indoor air-quality simulation and ventilation control engine.
//!
//! This crate models the air inside a home: how composition drifts with
//! occupancy and activity, how that maps to a quality level, and how
//! specialized air systems respond by ventilating, filtering or raising
//! safety interlocks.
//!
//! # Features
//!
//! - **Room-specific systems**: kitchen, bathroom, bedroom, living room and a
//!   whole-home fallback, each with its own pollutants and responses
//! - **Capabilities as traits**: [`Ventilation`], [`Filtration`] and
//!   [`Breathable`] with shared provided methods
//! - **Safety interlocks**: gas-leak and emergency dehumidification run even
//!   with automatic ventilation switched off
//! - **Deterministic time**: systems read time through an injected [`Clock`]
//! - **Structured status**: every system reports a serializable
//!   [`SystemStatus`]
//!
//! # Systems
//!
//! | System | ACH range | Tracks |
//! |--------|-----------|--------|
//! | [`KitchenAir`] | 6-20 | smoke, grease, VOC, CO, odor |
//! | [`BathroomAir`] | 4-15 | mold risk, bacteria, ammonia, steam |
//! | [`BedroomAir`] | 1-4 | allergens, bedding, noise, sleep window |
//! | [`LivingRoomAir`] | 2-8 | dust, electronics |
//! | [`HomeAirSystem`] | 0.5-10 | operating hours |
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use airsim_core::{AirControl, AirSystem, Room, RoomType, SharedRoom, SystemClock};
//!
//! let kitchen = Room::shared("Kitchen", RoomType::Kitchen, 12.0).unwrap();
//! let mut system = AirSystem::for_room(kitchen.clone() as SharedRoom, Arc::new(SystemClock));
//!
//! kitchen.enter();
//! system.circulate_air();
//! println!("{}: {}", system.kind(), system.quality_level());
//! assert_eq!(kitchen.air_quality(), system.quality_level().label());
//! ```

pub mod air_system;
pub mod capability;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod mock;
pub mod pollutant;
pub mod purifier;
pub mod room;
pub mod status;
pub mod system;
pub mod validation;
pub mod ventilation;
pub mod ventilator;

pub use air_system::{AirSystem, AirSystemKind};
pub use capability::{
    Breathable, EnergyGrade, FilterCondition, Filtration, SmartVentilationAction, Ventilation,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SystemConfig;
pub use error::{Error, Result};
pub use events::{ActivityMode, AirEvent, EventLog};
pub use mock::{MockRoom, MockRoomBuilder};
pub use pollutant::{Pollutant, UnknownPollutant};
pub use purifier::AirPurifier;
pub use room::{Room, RoomProfile, RoomType, SharedRoom};
pub use status::{
    BathroomStatus, BedroomStatus, CommonStatus, HomeStatus, KitchenStatus, LivingRoomStatus,
    SystemStatus,
};
pub use system::{
    AirControl, BaseAirSystem, BathroomAir, BedroomAir, HomeAirSystem, KitchenAir, LivingRoomAir,
    ModeSource, SleepSchedule,
};
pub use validation::{
    BreathingSafety, CompositionValidator, CompositionWarning, ValidationResult, ValidatorConfig,
};
pub use ventilation::{AchRange, VentilationMode};
pub use ventilator::{AirflowMode, Ventilator};

// Re-export the data types so most callers need only this crate
pub use airsim_types;
pub use airsim_types::{AirComposition, QualityLevel};
