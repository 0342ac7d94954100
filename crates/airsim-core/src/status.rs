//! Structured status snapshots.
//!
//! [`SystemStatus`] is what `status()` returns on every system. It is plain
//! data: callers render it as text or serialize it to JSON.

use serde::Serialize;

use airsim_types::{AirComposition, QualityLevel};

use crate::air_system::AirSystemKind;
use crate::capability::{EnergyGrade, FilterCondition};
use crate::system::{AirControl, ModeSource};
use crate::validation::BreathingSafety;
use crate::ventilation::VentilationMode;

/// Fields every system reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonStatus {
    pub kind: AirSystemKind,
    pub quality: QualityLevel,
    pub composition: AirComposition,
    pub rooms: Vec<String>,
    pub occupied_rooms: usize,
    pub ventilating: bool,
    pub ventilation_mode: VentilationMode,
    pub air_change_rate: f64,
    pub ventilation_efficiency: f64,
    pub energy_grade: EnergyGrade,
    pub filtering: bool,
    pub filter_efficiency: f64,
    pub filter_condition: FilterCondition,
    pub needs_filter_replacement: bool,
    pub breathable: bool,
    pub breathability_index: f64,
    pub breathing_safety: BreathingSafety,
    pub auto_ventilation: bool,
    pub cycles: u64,
}

impl CommonStatus {
    pub(crate) fn capture<S: AirControl + ?Sized>(system: &S) -> Self {
        let base = system.base();
        Self {
            kind: system.kind(),
            quality: base.quality(),
            composition: base.composition(),
            rooms: base.rooms().iter().map(|r| r.name().to_string()).collect(),
            occupied_rooms: base.occupied_count(),
            ventilating: system.is_ventilating(),
            ventilation_mode: system.ventilation_mode(),
            air_change_rate: system.air_change_rate(),
            ventilation_efficiency: system.ventilation_efficiency(),
            energy_grade: system.energy_efficiency_grade(),
            filtering: system.is_filtering(),
            filter_efficiency: system.filter_efficiency(),
            filter_condition: system.filter_condition(),
            needs_filter_replacement: system.needs_filter_replacement(),
            breathable: system.is_breathable(),
            breathability_index: system.breathability_index(),
            breathing_safety: system.breathing_safety(),
            auto_ventilation: base.auto_ventilation(),
            cycles: base.cycles(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KitchenStatus {
    #[serde(flatten)]
    pub common: CommonStatus,
    pub cooking_mode: bool,
    pub cooking_source: ModeSource,
    pub gas_stove_in_use: bool,
    pub gas_leak_detection: bool,
    pub exhaust_fan_speed: u8,
    pub smoke_level: f64,
    pub grease_level: f64,
    pub voc_level: f64,
    pub carbon_monoxide_ppm: f64,
    pub odor_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BathroomStatus {
    #[serde(flatten)]
    pub common: CommonStatus,
    pub shower_mode: bool,
    pub shower_source: ModeSource,
    pub exhaust_fan: bool,
    pub ventilation_timer_minutes: u32,
    pub antibacterial: bool,
    pub target_humidity: f64,
    pub mold_risk: f64,
    pub bacteria_count: f64,
    pub ammonia_level: f64,
    pub steam_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedroomStatus {
    #[serde(flatten)]
    pub common: CommonStatus,
    pub sleep_mode: bool,
    pub sleep_source: ModeSource,
    /// `HH:MM-HH:MM`.
    pub sleep_window: String,
    pub night_mode: bool,
    pub auto_purifier: bool,
    pub noise_db: f64,
    pub allergen_level: f64,
    pub bedding_cleanliness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LivingRoomStatus {
    #[serde(flatten)]
    pub common: CommonStatus,
    pub active_electronics: u8,
    pub dust_level: f64,
    pub natural_ventilation_preference: f64,
    pub noise_sensitivity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeStatus {
    #[serde(flatten)]
    pub common: CommonStatus,
    pub operating_hours: f64,
}

/// Status of any system, tagged by `"system"` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "system", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SystemStatus {
    LivingRoom(LivingRoomStatus),
    Bedroom(BedroomStatus),
    Kitchen(KitchenStatus),
    Bathroom(BathroomStatus),
    Home(HomeStatus),
}

impl SystemStatus {
    pub fn common(&self) -> &CommonStatus {
        match self {
            SystemStatus::LivingRoom(s) => &s.common,
            SystemStatus::Bedroom(s) => &s.common,
            SystemStatus::Kitchen(s) => &s.common,
            SystemStatus::Bathroom(s) => &s.common,
            SystemStatus::Home(s) => &s.common,
        }
    }

    pub fn kind(&self) -> AirSystemKind {
        self.common().kind
    }

    pub fn quality(&self) -> QualityLevel {
        self.common().quality
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::SystemClock;
    use crate::room::{Room, RoomType, SharedRoom};
    use crate::system::KitchenAir;

    #[test]
    fn test_kitchen_status_json() {
        let mut kitchen = KitchenAir::new(Arc::new(SystemClock));
        let room = Room::shared("Galley", RoomType::Kitchen, 9.0).unwrap();
        kitchen.add_room(room as SharedRoom);

        let status = kitchen.status();
        assert_eq!(status.kind(), AirSystemKind::Kitchen);
        assert_eq!(status.common().rooms, vec!["Galley".to_string()]);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["system"], "kitchen");
        assert_eq!(json["kind"], "kitchen");
        assert_eq!(json["exhaust_fan_speed"], 2);
        assert_eq!(json["cooking_source"], "off");
        assert_eq!(json["ventilation_mode"], "cooking");
        assert!(json["composition"]["oxygen_pct"].is_number());
    }
}
