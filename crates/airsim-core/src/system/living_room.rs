//! Living room air: dust and heat from people and electronics.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use airsim_types::{AirComposition, QualityLevel};

use crate::air_system::AirSystemKind;
use crate::capability::{Breathable, Filtration, Ventilation};
use crate::clock::Clock;
use crate::pollutant::Pollutant;
use crate::status::{CommonStatus, LivingRoomStatus, SystemStatus};
use crate::ventilation::{AchRange, VentilationMode, VentilationState};

use super::{AirControl, BaseAirSystem, clamp};

/// Legal air change rates.
pub const LIVING_ROOM_ACH_RANGE: AchRange = AchRange::new(2.0, 8.0);

/// Accepted values for [`LivingRoomAir::set_active_electronics`].
pub const MAX_ACTIVE_ELECTRONICS: u8 = 10;

const DUST_BOUNDS: (f64, f64) = (5.0, 100.0);

/// Living room air system.
#[derive(Debug)]
pub struct LivingRoomAir {
    base: BaseAirSystem,
    active_electronics: u8,
    dust: f64,
    natural_preference: f64,
    noise_sensitivity: f64,
}

impl LivingRoomAir {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            base: BaseAirSystem::new(
                AirComposition::clamped(21.0, 0.06, 45.0, 22.0),
                VentilationState::new(VentilationMode::Natural, 4.0, LIVING_ROOM_ACH_RANGE),
                clock,
            ),
            active_electronics: 3,
            dust: 30.0,
            natural_preference: 0.8,
            noise_sensitivity: 0.7,
        }
    }

    pub fn active_electronics(&self) -> u8 {
        self.active_electronics
    }

    pub fn dust_level(&self) -> f64 {
        self.dust
    }

    /// Preference for natural over forced ventilation, in `[0, 1]`.
    pub fn natural_ventilation_preference(&self) -> f64 {
        self.natural_preference
    }

    pub fn noise_sensitivity(&self) -> f64 {
        self.noise_sensitivity
    }

    /// Number of running devices (0-10). Recomputes the air on success.
    pub fn set_active_electronics(&mut self, count: u8) -> bool {
        if count > MAX_ACTIVE_ELECTRONICS {
            debug!(count, "electronics count rejected");
            return false;
        }
        self.active_electronics = count;
        self.update_air_composition();
        true
    }

    pub fn perform_living_room_cleaning(&mut self) {
        self.dust = clamp(self.dust * 0.3, DUST_BOUNDS.0, DUST_BOUNDS.1);
        info!(dust = self.dust, "living room cleaned");
        if !self.base.rooms().is_empty() {
            let quality = self.classify(&self.base.composition());
            self.base.set_quality(quality);
            self.base.propagate_quality();
        }
    }

    fn compute_composition(&self) -> AirComposition {
        let ventilating = self.base.is_ventilating();
        let rate = self.base.rate();
        let occupied = self.base.occupied_count() as f64;
        let electronics = f64::from(self.active_electronics);

        let mut oxygen = 21.0 - occupied * 0.4 - electronics * 0.1;
        if ventilating {
            oxygen += rate * 0.15;
        }

        let mut co2 = 0.04 + occupied * 0.03 + electronics * 0.005;
        if ventilating {
            let reduction = match self.base.mode() {
                VentilationMode::Natural => 0.15,
                VentilationMode::Forced => 0.20,
                VentilationMode::Mixed => 0.18,
                _ => 0.10,
            };
            co2 *= 1.0 - reduction;
        }

        let mut humidity = 45.0 + occupied * 3.0 - electronics;
        if ventilating && self.base.mode() == VentilationMode::Natural {
            humidity *= 0.95;
        }

        let mut temperature =
            self.base.average_temperature().unwrap_or(22.0) + electronics * 0.5 + occupied * 0.8;
        if ventilating {
            temperature -= rate * 0.3;
        }

        AirComposition::clamped(
            clamp(oxygen, 18.0, 22.0),
            clamp(co2, 0.03, 0.5),
            clamp(humidity, 30.0, 70.0),
            clamp(temperature, 18.0, 28.0),
        )
    }

    fn update_dust(&mut self) {
        let occupied = self.base.occupied_count() as f64;
        self.dust += occupied * 2.0 + f64::from(self.active_electronics) * 1.5;
        if self.is_filtering() {
            self.dust *= 1.0 - self.filter_efficiency() / 100.0;
        }
        if self.base.is_ventilating() {
            self.dust *= 0.9;
        }
        self.dust = clamp(self.dust, DUST_BOUNDS.0, DUST_BOUNDS.1);
    }

    /// No overrides: the living room is judged on the composition alone.
    fn classify(&self, composition: &AirComposition) -> QualityLevel {
        QualityLevel::from_score(composition.quality_score())
    }
}

impl AirControl for LivingRoomAir {
    fn kind(&self) -> AirSystemKind {
        AirSystemKind::LivingRoom
    }

    fn base(&self) -> &BaseAirSystem {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseAirSystem {
        &mut self.base
    }

    #[instrument(level = "debug", skip(self), fields(system = "living_room"))]
    fn update_air_composition(&mut self) {
        if self.base.rooms().is_empty() {
            self.base.set_quality(QualityLevel::Good);
            return;
        }
        let composition = self.compute_composition();
        self.update_dust();
        let quality = self.classify(&composition);
        self.base.set_composition(composition);
        self.base.set_quality(quality);

        if self.base.auto_ventilation() && quality.requires_action() && !self.base.is_ventilating()
        {
            let mode = if self.natural_preference > 0.6 {
                VentilationMode::Natural
            } else {
                VentilationMode::Forced
            };
            self.start_ventilation(mode.as_str());
        }
        self.base.propagate_quality();
        debug!(dust = self.dust, quality = %quality, "living room cycle complete");
    }

    fn status(&self) -> SystemStatus {
        SystemStatus::LivingRoom(LivingRoomStatus {
            common: CommonStatus::capture(self),
            active_electronics: self.active_electronics,
            dust_level: self.dust,
            natural_ventilation_preference: self.natural_preference,
            noise_sensitivity: self.noise_sensitivity,
        })
    }
}

impl Ventilation for LivingRoomAir {
    fn start_ventilation(&mut self, mode: &str) -> bool {
        let mode = VentilationMode::parse(mode);
        let rate = match mode {
            VentilationMode::Forced => 6.0,
            VentilationMode::Mixed => 5.5,
            _ => 5.0,
        };
        self.base.start_ventilation(mode, rate)
    }

    fn stop_ventilation(&mut self) -> bool {
        self.base.stop_ventilation()
    }

    fn set_air_change_rate(&mut self, rate: f64) -> bool {
        self.base.set_rate(rate)
    }

    fn is_ventilating(&self) -> bool {
        self.base.is_ventilating()
    }

    fn ventilation_mode(&self) -> VentilationMode {
        self.base.mode()
    }

    fn air_change_rate(&self) -> f64 {
        self.base.rate()
    }

    fn ventilation_efficiency(&self) -> f64 {
        if !self.base.is_ventilating() {
            return 0.0;
        }
        let mut efficiency: f64 = 85.0;
        if self.base.mode() == VentilationMode::Natural && self.natural_preference > 0.7 {
            efficiency += 10.0;
        }
        efficiency * (1.0 - self.noise_sensitivity * 0.2)
    }
}

impl Filtration for LivingRoomAir {
    fn start_filtering(&mut self) -> bool {
        self.base.set_filter_engaged(true)
    }

    fn stop_filtering(&mut self) -> bool {
        self.base.set_filter_engaged(false)
    }

    fn is_filtering(&self) -> bool {
        self.base.filter_engaged() && self.base.is_ventilating()
    }

    fn filter_efficiency(&self) -> f64 {
        (90.0 - self.dust * 0.3).max(50.0)
    }

    fn needs_filter_replacement(&self) -> bool {
        self.dust > 60.0
    }

    fn filter_specific_pollutant(&mut self, tag: &str) -> bool {
        let factor = match tag.parse::<Pollutant>() {
            Ok(Pollutant::Dust) => 0.5,
            Ok(Pollutant::Pm25) => 0.7,
            _ => return false,
        };
        self.dust = clamp(self.dust * factor, DUST_BOUNDS.0, DUST_BOUNDS.1);
        true
    }
}

impl Breathable for LivingRoomAir {
    fn composition(&self) -> AirComposition {
        self.base.composition()
    }

    fn is_breathable(&self) -> bool {
        self.base.composition().is_safe_for_breathing() && self.dust < 50.0
    }

    fn has_adequate_oxygen(&self) -> bool {
        self.base.composition().oxygen_pct() >= 19.5
    }

    fn has_harmful_gases(&self) -> bool {
        self.base.composition().co2_pct() > 0.08 || self.dust > 75.0
    }

    fn breathability_index(&self) -> f64 {
        let base = self.base.composition().quality_score() / 100.0;
        (base - (self.dust / 100.0).min(0.3)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::room::{Room, RoomType, SharedRoom};

    #[test]
    fn test_defaults() {
        let living = LivingRoomAir::new(Arc::new(SystemClock));
        assert_eq!(living.active_electronics(), 3);
        assert_eq!(living.dust_level(), 30.0);
        assert_eq!(living.ventilation_mode(), VentilationMode::Natural);
        assert_eq!(living.air_change_rate(), 4.0);
        assert!(!living.is_filtering());
    }

    #[test]
    fn test_dust_settles_at_floor() {
        let mut living = LivingRoomAir::new(Arc::new(SystemClock));
        living.add_room(Room::shared("Lounge", RoomType::LivingRoom, 20.0).unwrap() as SharedRoom);
        assert!(living.set_active_electronics(0));
        living.start_ventilation("forced");
        assert!(living.is_ventilating());
        for _ in 0..40 {
            living.circulate_air();
        }
        assert_eq!(living.dust_level(), 5.0);
    }

    #[test]
    fn test_crowded_room_saturates() {
        let mut living = LivingRoomAir::new(Arc::new(SystemClock));
        living.set_auto_ventilation(false);
        for i in 0..6 {
            let room = Room::shared(format!("Room {}", i), RoomType::LivingRoom, 20.0).unwrap();
            room.enter();
            living.add_room(room as SharedRoom);
        }
        assert!(living.set_active_electronics(10));
        for _ in 0..10 {
            living.circulate_air();
        }
        assert_eq!(living.dust_level(), 100.0);
        // 21 - 6 * 0.4 - 10 * 0.1 = 17.6
        assert_eq!(living.composition().oxygen_pct(), 18.0);
        assert!(!living.is_ventilating());
    }

    #[test]
    fn test_electronics_range() {
        let mut living = LivingRoomAir::new(Arc::new(SystemClock));
        assert!(!living.set_active_electronics(11));
        assert_eq!(living.active_electronics(), 3);
        assert!(living.set_active_electronics(10));
        assert!(living.set_active_electronics(0));
    }

    #[test]
    fn test_mode_rates() {
        let mut living = LivingRoomAir::new(Arc::new(SystemClock));
        assert!(living.start_ventilation("mixed"));
        assert_eq!(living.air_change_rate(), 5.5);
        assert!(!living.start_ventilation("forced"));
        assert!(living.stop_ventilation());
        assert!(living.start_ventilation("FORCED"));
        assert_eq!(living.air_change_rate(), 6.0);
    }

    #[test]
    fn test_air_change_rate_range() {
        let mut living = LivingRoomAir::new(Arc::new(SystemClock));
        assert!(!living.set_air_change_rate(1.9));
        assert!(!living.set_air_change_rate(8.1));
        assert!(living.set_air_change_rate(2.0));
        assert_eq!(living.air_change_rate(), 2.0);
    }

    #[test]
    fn test_efficiency_penalizes_noise() {
        let mut living = LivingRoomAir::new(Arc::new(SystemClock));
        living.start_ventilation("natural");
        // (85 + 10) * (1 - 0.7 * 0.2)
        assert!((living.ventilation_efficiency() - 81.7).abs() < 1e-9);
    }

    #[test]
    fn test_dust_tags() {
        let mut living = LivingRoomAir::new(Arc::new(SystemClock));
        assert!(living.filter_specific_pollutant("dust"));
        assert_eq!(living.dust_level(), 15.0);
        assert!(living.filter_specific_pollutant("pm2.5"));
        assert!((living.dust_level() - 10.5).abs() < 1e-12);
        let before = living.status();
        assert!(!living.filter_specific_pollutant("pm10"));
        assert!(!living.filter_specific_pollutant("unknown_tag"));
        assert_eq!(living.status(), before, "rejected tags leave state alone");
    }

    #[test]
    fn test_crowded_room_ventilates() {
        let mut living = LivingRoomAir::new(Arc::new(SystemClock));
        living.set_active_electronics(10);
        for i in 0..4 {
            let room = Room::shared(format!("Lounge {i}"), RoomType::LivingRoom, 20.0).unwrap();
            room.enter();
            living.add_room(room as SharedRoom);
        }
        // Four occupants and ten devices push CO2 past the 0.12% score floor
        assert!(living.quality_level().requires_action());
        assert!(living.is_ventilating());
        assert_eq!(living.ventilation_mode(), VentilationMode::Natural);
    }

    #[test]
    fn test_cleaning() {
        let mut living = LivingRoomAir::new(Arc::new(SystemClock));
        living.perform_living_room_cleaning();
        assert_eq!(living.dust_level(), 9.0);
    }
}
