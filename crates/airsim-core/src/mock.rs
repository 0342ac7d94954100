//! Mock room for testing.
//!
//! [`MockRoom`] implements [`RoomProfile`] with interior mutability, so tests
//! can flip occupancy or temperature while an air system holds a handle, and
//! then inspect every quality label the system pushed back.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use airsim_core::{AirControl, KitchenAir, MockRoomBuilder, RoomType, SharedRoom, SystemClock};
//!
//! let room = Arc::new(MockRoomBuilder::new().room_type(RoomType::Kitchen).build());
//! let mut kitchen = KitchenAir::new(Arc::new(SystemClock));
//! kitchen.add_room(room.clone() as SharedRoom);
//! kitchen.circulate_air();
//! // One label on registration, one per cycle
//! assert_eq!(room.label_count(), 2);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::room::{RoomProfile, RoomType};

/// A scriptable room that records quality labels.
#[derive(Debug)]
pub struct MockRoom {
    name: String,
    room_type: RoomType,
    area: f64,
    occupied: AtomicBool,
    /// `f64` bits.
    temperature: AtomicU64,
    labels: Mutex<Vec<String>>,
}

impl MockRoom {
    pub fn new(name: &str, room_type: RoomType) -> Self {
        MockRoomBuilder::new().name(name).room_type(room_type).build()
    }

    pub fn set_occupied(&self, occupied: bool) {
        self.occupied.store(occupied, Ordering::SeqCst);
    }

    pub fn set_temperature(&self, celsius: f64) {
        self.temperature.store(celsius.to_bits(), Ordering::SeqCst);
    }

    /// Every label received, oldest first.
    pub fn labels(&self) -> Vec<String> {
        self.labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_label(&self) -> Option<String> {
        self.labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn label_count(&self) -> usize {
        self.labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn clear_labels(&self) {
        self.labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl RoomProfile for MockRoom {
    fn name(&self) -> &str {
        &self.name
    }

    fn room_type(&self) -> RoomType {
        self.room_type
    }

    fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::SeqCst)
    }

    fn temperature(&self) -> f64 {
        f64::from_bits(self.temperature.load(Ordering::SeqCst))
    }

    fn area(&self) -> f64 {
        self.area
    }

    fn set_air_quality(&self, label: &str) {
        self.labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(label.to_string());
    }
}

/// Builder for [`MockRoom`].
#[derive(Debug, Clone)]
pub struct MockRoomBuilder {
    name: String,
    room_type: RoomType,
    area: f64,
    occupied: bool,
    temperature: f64,
}

impl Default for MockRoomBuilder {
    fn default() -> Self {
        Self {
            name: "Mock Room".to_string(),
            room_type: RoomType::LivingRoom,
            area: 15.0,
            occupied: false,
            temperature: 20.0,
        }
    }
}

impl MockRoomBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    #[must_use]
    pub fn room_type(mut self, room_type: RoomType) -> Self {
        self.room_type = room_type;
        self
    }

    /// Floor area in m². Not validated.
    #[must_use]
    pub fn area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }

    #[must_use]
    pub fn occupied(mut self, occupied: bool) -> Self {
        self.occupied = occupied;
        self
    }

    #[must_use]
    pub fn temperature(mut self, celsius: f64) -> Self {
        self.temperature = celsius;
        self
    }

    #[must_use]
    pub fn build(self) -> MockRoom {
        MockRoom {
            name: self.name,
            room_type: self.room_type,
            area: self.area,
            occupied: AtomicBool::new(self.occupied),
            temperature: AtomicU64::new(self.temperature.to_bits()),
            labels: Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::SystemClock;
    use crate::room::SharedRoom;
    use crate::system::{AirControl, LivingRoomAir};

    #[test]
    fn test_builder_defaults() {
        let room = MockRoomBuilder::new().build();
        assert_eq!(room.name(), "Mock Room");
        assert_eq!(room.room_type(), RoomType::LivingRoom);
        assert!(!room.is_occupied());
        assert_eq!(room.temperature(), 20.0);
        assert_eq!(room.label_count(), 0);
    }

    #[test]
    fn test_interior_mutation_visible_through_handle() {
        let room = Arc::new(MockRoom::new("Den", RoomType::LivingRoom));
        let shared: SharedRoom = room.clone();
        room.set_occupied(true);
        room.set_temperature(26.5);
        assert!(shared.is_occupied());
        assert_eq!(shared.temperature(), 26.5);
    }

    #[test]
    fn test_records_labels_from_system() {
        let room = Arc::new(MockRoom::new("Den", RoomType::LivingRoom));
        let mut system = LivingRoomAir::new(Arc::new(SystemClock));
        system.add_room(room.clone() as SharedRoom);
        system.circulate_air();
        system.circulate_air();
        assert_eq!(room.label_count(), 3);
        assert_eq!(
            room.last_label().as_deref(),
            Some(system.quality_level().label())
        );
        room.clear_labels();
        assert!(room.labels().is_empty());
    }
}
