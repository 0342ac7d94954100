//! Rooms as seen by air systems.
//!
//! Air systems never own rooms. They hold [`SharedRoom`] handles, read
//! occupancy, temperature and area through [`RoomProfile`], and write back
//! only the quality label.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Facts an air system needs from a physical room.
pub trait RoomProfile: Send + Sync {
    fn name(&self) -> &str;

    fn room_type(&self) -> RoomType;

    fn is_occupied(&self) -> bool;

    /// Ambient temperature in °C.
    fn temperature(&self) -> f64;

    /// Floor area in m².
    fn area(&self) -> f64;

    /// Receive the quality label computed by an air system.
    fn set_air_quality(&self, label: &str);
}

/// Shared, non-owning handle to a room.
pub type SharedRoom = Arc<dyn RoomProfile>;

/// Kind of room, used to pick a specialized air system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    LivingRoom,
    Bedroom,
    Kitchen,
    Bathroom,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomType::LivingRoom => "living_room",
            RoomType::Bedroom => "bedroom",
            RoomType::Kitchen => "kitchen",
            RoomType::Bathroom => "bathroom",
        };
        f.write_str(s)
    }
}

impl FromStr for RoomType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "living_room" | "livingroom" | "living" => Ok(RoomType::LivingRoom),
            "bedroom" => Ok(RoomType::Bedroom),
            "kitchen" => Ok(RoomType::Kitchen),
            "bathroom" => Ok(RoomType::Bathroom),
            other => Err(Error::InvalidRoom(format!("unknown room type: {other}"))),
        }
    }
}

/// Valid target range for [`Room::adjust_temperature`].
pub const ROOM_TEMPERATURE_RANGE: (f64, f64) = (10.0, 35.0);

#[derive(Debug)]
struct RoomState {
    temperature: f64,
    occupied: bool,
    air_quality: String,
}

/// A room with interior mutability, safe to share between air systems.
#[derive(Debug)]
pub struct Room {
    name: String,
    room_type: RoomType,
    area: f64,
    state: RwLock<RoomState>,
}

impl Room {
    /// Create an unoccupied room at 20 °C.
    pub fn new(name: impl Into<String>, room_type: RoomType, area: f64) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidRoom("room name must not be empty".into()));
        }
        if !(area > 0.0 && area.is_finite()) {
            return Err(Error::InvalidRoom(format!(
                "room area must be positive, got {area}"
            )));
        }
        Ok(Self {
            name,
            room_type,
            area,
            state: RwLock::new(RoomState {
                temperature: 20.0,
                occupied: false,
                air_quality: String::new(),
            }),
        })
    }

    /// Create a room already wrapped in a shared handle.
    pub fn shared(name: impl Into<String>, room_type: RoomType, area: f64) -> Result<Arc<Self>> {
        Self::new(name, room_type, area).map(Arc::new)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RoomState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RoomState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the room occupied. Returns false if it already was.
    pub fn enter(&self) -> bool {
        let mut state = self.write();
        !std::mem::replace(&mut state.occupied, true)
    }

    /// Mark the room empty. Returns false if it already was.
    pub fn exit(&self) -> bool {
        let mut state = self.write();
        std::mem::replace(&mut state.occupied, false)
    }

    /// Set the ambient temperature, accepting 10 to 35 °C.
    pub fn adjust_temperature(&self, target: f64) -> bool {
        let (min, max) = ROOM_TEMPERATURE_RANGE;
        if !(min..=max).contains(&target) {
            tracing::debug!(room = %self.name, target, "temperature outside adjustable range");
            return false;
        }
        self.write().temperature = target;
        true
    }

    /// Last label written by an air system (empty until the first update).
    pub fn air_quality(&self) -> String {
        self.read().air_quality.clone()
    }
}

impl RoomProfile for Room {
    fn name(&self) -> &str {
        &self.name
    }

    fn room_type(&self) -> RoomType {
        self.room_type
    }

    fn is_occupied(&self) -> bool {
        self.read().occupied
    }

    fn temperature(&self) -> f64 {
        self.read().temperature
    }

    fn area(&self) -> f64 {
        self.area
    }

    fn set_air_quality(&self, label: &str) {
        let mut state = self.write();
        if state.air_quality != label {
            state.air_quality = label.to_string();
        }
    }
}

/// Two rooms are the same room when name and type match.
impl PartialEq for Room {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.room_type == other.room_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_arguments() {
        assert!(Room::new("Kitchen", RoomType::Kitchen, 12.0).is_ok());
        assert!(matches!(
            Room::new("  ", RoomType::Kitchen, 12.0),
            Err(Error::InvalidRoom(_))
        ));
        assert!(Room::new("Kitchen", RoomType::Kitchen, 0.0).is_err());
        assert!(Room::new("Kitchen", RoomType::Kitchen, -3.0).is_err());
        assert!(Room::new("Kitchen", RoomType::Kitchen, f64::NAN).is_err());
    }

    #[test]
    fn test_enter_and_exit_report_changes() {
        let room = Room::new("Den", RoomType::LivingRoom, 20.0).unwrap();
        assert!(!room.is_occupied());
        assert!(room.enter());
        assert!(!room.enter());
        assert!(room.is_occupied());
        assert!(room.exit());
        assert!(!room.exit());
    }

    #[test]
    fn test_adjust_temperature_range() {
        let room = Room::new("Den", RoomType::LivingRoom, 20.0).unwrap();
        assert_eq!(room.temperature(), 20.0);
        assert!(room.adjust_temperature(35.0));
        assert_eq!(room.temperature(), 35.0);
        assert!(!room.adjust_temperature(35.5));
        assert!(!room.adjust_temperature(9.9));
        assert_eq!(room.temperature(), 35.0);
    }

    #[test]
    fn test_air_quality_label() {
        let room = Room::new("Den", RoomType::LivingRoom, 20.0).unwrap();
        assert_eq!(room.air_quality(), "");
        room.set_air_quality("Good");
        assert_eq!(room.air_quality(), "Good");
    }

    #[test]
    fn test_equality_by_name_and_type() {
        let a = Room::new("Den", RoomType::LivingRoom, 20.0).unwrap();
        let b = Room::new("Den", RoomType::LivingRoom, 35.0).unwrap();
        let c = Room::new("Den", RoomType::Bedroom, 20.0).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_room_type_parse() {
        assert_eq!("Living-Room".parse::<RoomType>().unwrap(), RoomType::LivingRoom);
        assert_eq!("bathroom".parse::<RoomType>().unwrap(), RoomType::Bathroom);
        assert!("garage".parse::<RoomType>().is_err());
    }
}
