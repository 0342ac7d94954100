//! System kinds and the enum that dispatches over the five systems.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use airsim_types::AirComposition;

use crate::capability::{Breathable, EnergyGrade, Filtration, Ventilation};
use crate::clock::Clock;
use crate::config::SystemConfig;
use crate::error::{Error, Result};
use crate::room::{RoomType, SharedRoom};
use crate::status::SystemStatus;
use crate::system::{
    AirControl, BaseAirSystem, BathroomAir, BedroomAir, HomeAirSystem, KitchenAir, LivingRoomAir,
    SleepSchedule,
};
use crate::ventilation::{AchRange, VentilationMode};

/// The five kinds of air system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirSystemKind {
    LivingRoom,
    Bedroom,
    Kitchen,
    Bathroom,
    #[default]
    Home,
}

impl AirSystemKind {
    pub const ALL: [AirSystemKind; 5] = [
        AirSystemKind::LivingRoom,
        AirSystemKind::Bedroom,
        AirSystemKind::Kitchen,
        AirSystemKind::Bathroom,
        AirSystemKind::Home,
    ];

    /// The specialized system for a room type.
    pub fn for_room_type(room_type: RoomType) -> Self {
        match room_type {
            RoomType::LivingRoom => AirSystemKind::LivingRoom,
            RoomType::Bedroom => AirSystemKind::Bedroom,
            RoomType::Kitchen => AirSystemKind::Kitchen,
            RoomType::Bathroom => AirSystemKind::Bathroom,
        }
    }

    /// Legal air change rates for this kind.
    pub fn ach_range(&self) -> AchRange {
        match self {
            AirSystemKind::LivingRoom => crate::system::LIVING_ROOM_ACH_RANGE,
            AirSystemKind::Bedroom => crate::system::BEDROOM_ACH_RANGE,
            AirSystemKind::Kitchen => crate::system::KITCHEN_ACH_RANGE,
            AirSystemKind::Bathroom => crate::system::BATHROOM_ACH_RANGE,
            AirSystemKind::Home => crate::system::HOME_ACH_RANGE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AirSystemKind::LivingRoom => "living_room",
            AirSystemKind::Bedroom => "bedroom",
            AirSystemKind::Kitchen => "kitchen",
            AirSystemKind::Bathroom => "bathroom",
            AirSystemKind::Home => "home",
        }
    }
}

impl fmt::Display for AirSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AirSystemKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "living_room" | "livingroom" | "living" => Ok(AirSystemKind::LivingRoom),
            "bedroom" => Ok(AirSystemKind::Bedroom),
            "kitchen" => Ok(AirSystemKind::Kitchen),
            "bathroom" => Ok(AirSystemKind::Bathroom),
            "home" | "integrated" => Ok(AirSystemKind::Home),
            other => Err(Error::invalid_config(format!(
                "unknown system kind '{other}' (expected living_room, bedroom, kitchen, bathroom or home)"
            ))),
        }
    }
}

/// Any one of the five air systems.
///
/// All capability traits are forwarded to the wrapped system; use the
/// `as_*` accessors for operations specific to one kind.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use airsim_core::{AirControl, AirSystem, Room, RoomType, SharedRoom, SystemClock};
///
/// let room = Room::shared("Kitchen", RoomType::Kitchen, 12.0).unwrap();
/// let mut system = AirSystem::for_room(room as SharedRoom, Arc::new(SystemClock));
/// system.circulate_air();
/// assert!(system.as_kitchen().is_some());
/// ```
#[derive(Debug)]
pub enum AirSystem {
    LivingRoom(LivingRoomAir),
    Bedroom(BedroomAir),
    Kitchen(KitchenAir),
    Bathroom(BathroomAir),
    Home(HomeAirSystem),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            AirSystem::LivingRoom($s) => $body,
            AirSystem::Bedroom($s) => $body,
            AirSystem::Kitchen($s) => $body,
            AirSystem::Bathroom($s) => $body,
            AirSystem::Home($s) => $body,
        }
    };
}

impl AirSystem {
    /// Build a system with no rooms.
    pub fn new(kind: AirSystemKind, clock: Arc<dyn Clock>) -> Self {
        match kind {
            AirSystemKind::LivingRoom => AirSystem::LivingRoom(LivingRoomAir::new(clock)),
            AirSystemKind::Bedroom => AirSystem::Bedroom(BedroomAir::new(clock)),
            AirSystemKind::Kitchen => AirSystem::Kitchen(KitchenAir::new(clock)),
            AirSystemKind::Bathroom => AirSystem::Bathroom(BathroomAir::new(clock)),
            AirSystemKind::Home => AirSystem::Home(HomeAirSystem::new(clock)),
        }
    }

    /// Build the specialized system for `room` and register it.
    pub fn for_room(room: SharedRoom, clock: Arc<dyn Clock>) -> Self {
        let mut system = Self::new(AirSystemKind::for_room_type(room.room_type()), clock);
        system.add_room(room);
        system
    }

    /// Build one system serving several rooms.
    pub fn integrated(
        rooms: impl IntoIterator<Item = SharedRoom>,
        kind: AirSystemKind,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut system = Self::new(kind, clock);
        for room in rooms {
            system.add_room(room);
        }
        system
    }

    /// Build and configure a system from a validated [`SystemConfig`].
    pub fn from_config(config: &SystemConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let mut system = Self::new(config.kind, clock);
        system.set_auto_ventilation(config.auto_ventilation);

        match &mut system {
            AirSystem::Bathroom(bathroom) => {
                if let Some(target) = config.target_humidity {
                    bathroom.set_target_humidity(target);
                }
            }
            AirSystem::Bedroom(bedroom) => {
                if let Some(schedule) = config.sleep_schedule()? {
                    bedroom.set_sleep_schedule(schedule.start(), schedule.end());
                }
            }
            AirSystem::Home(home) => {
                if let Some(efficiency) = config.filter_efficiency {
                    home.set_filter_efficiency(efficiency);
                }
            }
            AirSystem::LivingRoom(_) | AirSystem::Kitchen(_) => {}
        }

        if let Some(mode) = config.preferred_mode {
            system.start_ventilation(mode.as_str());
        }
        if let Some(rate) = config.air_change_rate {
            system.set_air_change_rate(rate);
        }
        info!(kind = %config.kind, "air system configured");
        Ok(system)
    }

    pub fn as_living_room(&self) -> Option<&LivingRoomAir> {
        match self {
            AirSystem::LivingRoom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_living_room_mut(&mut self) -> Option<&mut LivingRoomAir> {
        match self {
            AirSystem::LivingRoom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bedroom(&self) -> Option<&BedroomAir> {
        match self {
            AirSystem::Bedroom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bedroom_mut(&mut self) -> Option<&mut BedroomAir> {
        match self {
            AirSystem::Bedroom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_kitchen(&self) -> Option<&KitchenAir> {
        match self {
            AirSystem::Kitchen(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_kitchen_mut(&mut self) -> Option<&mut KitchenAir> {
        match self {
            AirSystem::Kitchen(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bathroom(&self) -> Option<&BathroomAir> {
        match self {
            AirSystem::Bathroom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bathroom_mut(&mut self) -> Option<&mut BathroomAir> {
        match self {
            AirSystem::Bathroom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_home(&self) -> Option<&HomeAirSystem> {
        match self {
            AirSystem::Home(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_home_mut(&mut self) -> Option<&mut HomeAirSystem> {
        match self {
            AirSystem::Home(s) => Some(s),
            _ => None,
        }
    }

    /// The sleep window, for bedroom systems.
    pub fn sleep_schedule(&self) -> Option<SleepSchedule> {
        self.as_bedroom().map(BedroomAir::sleep_schedule)
    }
}

impl AirControl for AirSystem {
    fn kind(&self) -> AirSystemKind {
        dispatch!(self, s => s.kind())
    }

    fn base(&self) -> &BaseAirSystem {
        dispatch!(self, s => s.base())
    }

    fn base_mut(&mut self) -> &mut BaseAirSystem {
        dispatch!(self, s => s.base_mut())
    }

    fn update_air_composition(&mut self) {
        dispatch!(self, s => s.update_air_composition())
    }

    fn status(&self) -> SystemStatus {
        dispatch!(self, s => s.status())
    }

    fn circulate_air(&mut self) {
        dispatch!(self, s => s.circulate_air())
    }
}

impl Ventilation for AirSystem {
    fn start_ventilation(&mut self, mode: &str) -> bool {
        dispatch!(self, s => s.start_ventilation(mode))
    }

    fn stop_ventilation(&mut self) -> bool {
        dispatch!(self, s => s.stop_ventilation())
    }

    fn set_air_change_rate(&mut self, rate: f64) -> bool {
        dispatch!(self, s => s.set_air_change_rate(rate))
    }

    fn is_ventilating(&self) -> bool {
        dispatch!(self, s => s.is_ventilating())
    }

    fn ventilation_mode(&self) -> VentilationMode {
        dispatch!(self, s => s.ventilation_mode())
    }

    fn air_change_rate(&self) -> f64 {
        dispatch!(self, s => s.air_change_rate())
    }

    fn ventilation_efficiency(&self) -> f64 {
        dispatch!(self, s => s.ventilation_efficiency())
    }

    fn energy_efficiency_grade(&self) -> EnergyGrade {
        dispatch!(self, s => s.energy_efficiency_grade())
    }
}

impl Filtration for AirSystem {
    fn start_filtering(&mut self) -> bool {
        dispatch!(self, s => s.start_filtering())
    }

    fn stop_filtering(&mut self) -> bool {
        dispatch!(self, s => s.stop_filtering())
    }

    fn is_filtering(&self) -> bool {
        dispatch!(self, s => s.is_filtering())
    }

    fn filter_efficiency(&self) -> f64 {
        dispatch!(self, s => s.filter_efficiency())
    }

    fn needs_filter_replacement(&self) -> bool {
        dispatch!(self, s => s.needs_filter_replacement())
    }

    fn filter_specific_pollutant(&mut self, tag: &str) -> bool {
        dispatch!(self, s => s.filter_specific_pollutant(tag))
    }
}

impl Breathable for AirSystem {
    fn composition(&self) -> AirComposition {
        dispatch!(self, s => s.composition())
    }

    fn is_breathable(&self) -> bool {
        dispatch!(self, s => s.is_breathable())
    }

    fn has_adequate_oxygen(&self) -> bool {
        dispatch!(self, s => s.has_adequate_oxygen())
    }

    fn has_harmful_gases(&self) -> bool {
        dispatch!(self, s => s.has_harmful_gases())
    }

    fn breathability_index(&self) -> f64 {
        dispatch!(self, s => s.breathability_index())
    }
}
