//! Kitchen air: cooking smoke, grease, VOCs, odor and carbon monoxide.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use airsim_types::{AirComposition, QualityLevel};

use crate::air_system::AirSystemKind;
use crate::capability::{Breathable, EnergyGrade, Filtration, Ventilation};
use crate::clock::Clock;
use crate::events::ActivityMode;
use crate::pollutant::Pollutant;
use crate::status::{CommonStatus, KitchenStatus, SystemStatus};
use crate::ventilation::{AchRange, VentilationMode, VentilationState};

use super::{ActivityState, AirControl, BaseAirSystem, ModeSource, Transition, clamp};

/// Legal air change rates.
pub const KITCHEN_ACH_RANGE: AchRange = AchRange::new(6.0, 20.0);

const SMOKE_BOUNDS: (f64, f64) = (0.0, 100.0);
const GREASE_BOUNDS: (f64, f64) = (0.0, 200.0);
const VOC_BOUNDS: (f64, f64) = (10.0, 500.0);
const CO_BOUNDS: (f64, f64) = (0.0, 50.0);
const ODOR_BOUNDS: (f64, f64) = (0.0, 10.0);

/// CO (ppm) above which the air is hazardous and routine emergency
/// ventilation starts.
const CO_HAZARD_PPM: f64 = 10.0;
/// CO (ppm) above which the gas-leak interlock forces emergency ventilation.
const CO_GAS_LEAK_PPM: f64 = 15.0;
const SMOKE_EMERGENCY: f64 = 50.0;
const SMOKE_COOKING_TRIGGER: f64 = 15.0;
const COOKING_TEMPERATURE_TRIGGER: f64 = 26.0;

const FAN_SPEED_RANGE: std::ops::RangeInclusive<u8> = 1..=5;
const COOKING_MIN_FAN: u8 = 3;
const IDLE_FAN: u8 = 2;

/// Kitchen air system.
///
/// Cooking mode switches on when someone is in the kitchen and there is
/// smoke, heat, or a lit gas stove; while cooking, the hood starts in
/// `cooking` mode at fan speed 3 or more. A gas-leak interlock forces
/// `emergency` ventilation once carbon monoxide passes 15 ppm, even with
/// automatic ventilation disabled.
#[derive(Debug)]
pub struct KitchenAir {
    base: BaseAirSystem,
    smoke: f64,
    grease: f64,
    voc: f64,
    carbon_monoxide: f64,
    odor: f64,
    fan_speed: u8,
    gas_stove_in_use: bool,
    gas_leak_detection: bool,
    cooking: ActivityState,
}

impl KitchenAir {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            base: BaseAirSystem::new(
                AirComposition::clamped(20.8, 0.06, 55.0, 24.0),
                VentilationState::new(VentilationMode::Cooking, 8.0, KITCHEN_ACH_RANGE),
                clock,
            ),
            smoke: 5.0,
            grease: 10.0,
            voc: 50.0,
            carbon_monoxide: 0.5,
            odor: 2.0,
            fan_speed: IDLE_FAN,
            gas_stove_in_use: false,
            gas_leak_detection: true,
            cooking: ActivityState::default(),
        }
    }

    pub fn smoke_level(&self) -> f64 {
        self.smoke
    }

    pub fn grease_level(&self) -> f64 {
        self.grease
    }

    pub fn voc_level(&self) -> f64 {
        self.voc
    }

    /// Carbon monoxide in ppm.
    pub fn carbon_monoxide_level(&self) -> f64 {
        self.carbon_monoxide
    }

    pub fn odor_level(&self) -> f64 {
        self.odor
    }

    pub fn exhaust_fan_speed(&self) -> u8 {
        self.fan_speed
    }

    pub fn is_gas_stove_in_use(&self) -> bool {
        self.gas_stove_in_use
    }

    pub fn is_cooking_mode_active(&self) -> bool {
        self.cooking.is_active()
    }

    pub fn cooking_mode_source(&self) -> ModeSource {
        self.cooking.source()
    }

    pub fn is_gas_leak_detection_active(&self) -> bool {
        self.gas_leak_detection
    }

    /// Light or turn off the gas stove, then recompute.
    pub fn set_gas_stove_in_use(&mut self, in_use: bool) {
        if self.gas_stove_in_use != in_use {
            info!(in_use, "gas stove changed");
        }
        self.gas_stove_in_use = in_use;
        self.update_air_composition();
    }

    pub fn set_gas_leak_detection(&mut self, enabled: bool) {
        self.gas_leak_detection = enabled;
    }

    /// Hold cooking mode on until [`deactivate_cooking_mode`](Self::deactivate_cooking_mode).
    pub fn activate_cooking_mode(&mut self) {
        if self.cooking.hold() == Some(Transition::Activated) {
            self.on_cooking_started();
        }
        self.update_air_composition();
    }

    /// End cooking mode, including a manual hold.
    pub fn deactivate_cooking_mode(&mut self) {
        if self.cooking.release() == Some(Transition::Deactivated) {
            self.on_cooking_ended();
        }
        self.update_air_composition();
    }

    /// Set the hood fan speed (1-5); the air change rate follows as
    /// `6 + 2 * speed`.
    pub fn set_exhaust_fan_speed(&mut self, speed: u8) -> bool {
        if !FAN_SPEED_RANGE.contains(&speed) {
            debug!(speed, "exhaust fan speed rejected");
            return false;
        }
        self.fan_speed = speed;
        self.base.set_rate(6.0 + 2.0 * f64::from(speed))
    }

    /// Wipe down surfaces and air out: smoke, grease, VOCs and odor drop
    /// sharply. Quality is reclassified without running a full cycle.
    pub fn perform_kitchen_cleaning(&mut self) {
        self.smoke *= 0.2;
        self.grease *= 0.1;
        self.voc *= 0.3;
        self.odor *= 0.2;
        self.clamp_pollutants();
        info!(smoke = self.smoke, grease = self.grease, "kitchen cleaned");
        self.reclassify();
    }

    fn on_cooking_started(&mut self) {
        self.base.record_mode(ActivityMode::Cooking, true);
        if self.base.auto_ventilation() && !self.base.is_ventilating() {
            self.start_mode(VentilationMode::Cooking);
        }
        self.set_exhaust_fan_speed(self.fan_speed.max(COOKING_MIN_FAN));
    }

    fn on_cooking_ended(&mut self) {
        self.base.record_mode(ActivityMode::Cooking, false);
        self.gas_stove_in_use = false;
        self.set_exhaust_fan_speed(IDLE_FAN);
    }

    fn start_mode(&mut self, mode: VentilationMode) -> bool {
        let (rate, fan) = match mode {
            VentilationMode::Emergency => (16.0, 5),
            VentilationMode::Cooking => (12.0, self.fan_speed.max(COOKING_MIN_FAN)),
            VentilationMode::Forced => (10.0, 4),
            VentilationMode::Natural => (8.0, 2),
            _ => (10.0, 3),
        };
        if !self.base.start_ventilation(mode, rate) {
            return false;
        }
        self.fan_speed = fan;
        true
    }

    fn emergency_ventilation(&mut self, reason: &str) {
        self.base
            .force_ventilation(VentilationMode::Emergency, 16.0, reason);
        self.fan_speed = 5;
    }

    fn detect_cooking(&mut self) {
        let detected = self.base.occupied_count() > 0
            && (self.smoke > SMOKE_COOKING_TRIGGER
                || self.base.composition().temperature_c() > COOKING_TEMPERATURE_TRIGGER
                || self.gas_stove_in_use);
        match self.cooking.detect(detected) {
            Some(Transition::Activated) => self.on_cooking_started(),
            Some(Transition::Deactivated) => self.on_cooking_ended(),
            None => {}
        }
    }

    fn compute_composition(&self) -> AirComposition {
        let cooking = self.cooking.is_active();
        let gas = self.gas_stove_in_use;
        let ventilating = self.base.is_ventilating();
        let rate = self.base.rate();
        let occupied = self.base.occupied_count() as f64;

        let mut oxygen = 20.8;
        if gas {
            oxygen -= 0.5;
        }
        if cooking {
            oxygen -= 0.3;
        }
        oxygen -= self.smoke * 0.01;
        if ventilating {
            oxygen += rate * 0.1;
        }

        let mut co2 = 0.04;
        if gas {
            co2 += 0.03;
        }
        if cooking {
            co2 += 0.02;
        }
        co2 += occupied * 0.025;
        if ventilating {
            let reduction = match self.base.mode() {
                VentilationMode::Emergency => 0.40,
                VentilationMode::Cooking => 0.30,
                VentilationMode::Forced => 0.25,
                _ => 0.15,
            };
            co2 *= 1.0 - reduction;
        }

        let mut humidity = 50.0;
        if cooking {
            humidity += 15.0;
        }
        if gas {
            humidity += 10.0;
        }
        humidity += self.smoke * 0.3;
        if ventilating {
            humidity *= 1.0 - rate * 0.05;
        }

        let mut temperature = self.base.average_temperature().unwrap_or(24.0);
        if gas {
            temperature += 3.0;
        }
        if cooking {
            temperature += 2.0;
        }
        temperature += self.smoke * 0.1;
        if ventilating {
            temperature -= rate * 0.2;
        }

        AirComposition::clamped(
            clamp(oxygen, 18.0, 21.0),
            clamp(co2, 0.03, 0.8),
            clamp(humidity, 30.0, 80.0),
            clamp(temperature, 18.0, 35.0),
        )
    }

    fn update_pollutants(&mut self) {
        if self.cooking.is_active() {
            self.smoke += 2.0;
            self.grease += 1.5;
            self.voc += 5.0;
            self.odor += 0.5;
        }
        if self.gas_stove_in_use {
            self.smoke += 3.0;
            self.carbon_monoxide += 0.2;
            self.voc += 8.0;
        }
        if self.base.is_ventilating() {
            let r = f64::from(self.fan_speed) / 5.0 * 0.3;
            self.smoke *= 1.0 - r;
            self.grease *= 1.0 - r * 0.5;
            self.voc *= 1.0 - r;
            self.carbon_monoxide *= 1.0 - r * 1.5;
            self.odor *= 1.0 - r;
        }
        if self.is_filtering() {
            let e = self.filter_efficiency() / 100.0;
            self.smoke *= 1.0 - e * 0.8;
            self.grease *= 1.0 - e * 0.6;
            self.voc *= 1.0 - e * 0.7;
        }
        self.clamp_pollutants();
    }

    fn clamp_pollutants(&mut self) {
        self.smoke = clamp(self.smoke, SMOKE_BOUNDS.0, SMOKE_BOUNDS.1);
        self.grease = clamp(self.grease, GREASE_BOUNDS.0, GREASE_BOUNDS.1);
        self.voc = clamp(self.voc, VOC_BOUNDS.0, VOC_BOUNDS.1);
        self.carbon_monoxide = clamp(self.carbon_monoxide, CO_BOUNDS.0, CO_BOUNDS.1);
        self.odor = clamp(self.odor, ODOR_BOUNDS.0, ODOR_BOUNDS.1);
    }

    fn check_gas_leak(&mut self) {
        if self.carbon_monoxide > CO_GAS_LEAK_PPM {
            self.emergency_ventilation("gas leak: carbon monoxide above 15 ppm");
        }
    }

    fn classify(&self, composition: &AirComposition) -> QualityLevel {
        let level = QualityLevel::from_score(composition.quality_score());
        if self.carbon_monoxide > CO_HAZARD_PPM {
            QualityLevel::Hazardous
        } else if self.carbon_monoxide > 5.0 || self.smoke > 60.0 {
            level.max(QualityLevel::Poor)
        } else if self.smoke > 30.0 || self.voc > 200.0 || self.odor > 6.0 {
            level.downgrade_within(QualityLevel::Moderate)
        } else {
            level
        }
    }

    fn respond(&mut self) {
        if !self.base.auto_ventilation() {
            return;
        }
        if self.carbon_monoxide > CO_HAZARD_PPM || self.smoke > SMOKE_EMERGENCY {
            // Routine response: an idle hood goes to emergency, a running one
            // keeps its mode at full speed.
            if !self.base.is_ventilating() {
                self.start_mode(VentilationMode::Emergency);
            }
            self.set_exhaust_fan_speed(5);
        } else if self.cooking.is_active() && !self.base.is_ventilating() {
            self.start_mode(VentilationMode::Cooking);
        }
    }

    fn reclassify(&mut self) {
        if self.base.rooms().is_empty() {
            return;
        }
        let quality = self.classify(&self.base.composition());
        self.base.set_quality(quality);
        self.base.propagate_quality();
    }
}

impl AirControl for KitchenAir {
    fn kind(&self) -> AirSystemKind {
        AirSystemKind::Kitchen
    }

    fn base(&self) -> &BaseAirSystem {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseAirSystem {
        &mut self.base
    }

    #[instrument(level = "debug", skip(self), fields(system = "kitchen"))]
    fn update_air_composition(&mut self) {
        if self.base.rooms().is_empty() {
            self.base.set_quality(QualityLevel::Good);
            return;
        }
        self.detect_cooking();
        let composition = self.compute_composition();
        self.update_pollutants();
        if self.gas_leak_detection {
            self.check_gas_leak();
        }
        let quality = self.classify(&composition);
        self.base.set_composition(composition);
        self.base.set_quality(quality);
        self.respond();
        self.base.propagate_quality();
        debug!(
            smoke = self.smoke,
            co = self.carbon_monoxide,
            quality = %quality,
            "kitchen cycle complete"
        );
    }

    fn status(&self) -> SystemStatus {
        SystemStatus::Kitchen(KitchenStatus {
            common: CommonStatus::capture(self),
            cooking_mode: self.cooking.is_active(),
            cooking_source: self.cooking.source(),
            gas_stove_in_use: self.gas_stove_in_use,
            gas_leak_detection: self.gas_leak_detection,
            exhaust_fan_speed: self.fan_speed,
            smoke_level: self.smoke,
            grease_level: self.grease,
            voc_level: self.voc,
            carbon_monoxide_ppm: self.carbon_monoxide,
            odor_level: self.odor,
        })
    }
}

impl Ventilation for KitchenAir {
    fn start_ventilation(&mut self, mode: &str) -> bool {
        self.start_mode(VentilationMode::parse(mode))
    }

    fn stop_ventilation(&mut self) -> bool {
        if !self.base.stop_ventilation() {
            return false;
        }
        self.fan_speed = 1;
        true
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
        let mut efficiency = 92.0 + (f64::from(self.fan_speed) - 3.0) * 2.0;
        if self.smoke > 40.0 {
            efficiency *= 0.9;
        }
        efficiency.min(100.0)
    }

    /// Kitchens are graded on raw hood efficiency with a stricter scale.
    fn energy_efficiency_grade(&self) -> EnergyGrade {
        let efficiency = self.ventilation_efficiency();
        if efficiency >= 95.0 {
            EnergyGrade::APlusPlusPlus
        } else if efficiency >= 90.0 {
            EnergyGrade::APlusPlus
        } else if efficiency >= 85.0 {
            EnergyGrade::APlus
        } else if efficiency >= 80.0 {
            EnergyGrade::A
        } else if efficiency >= 75.0 {
            EnergyGrade::B
        } else {
            EnergyGrade::C
        }
    }
}

impl Filtration for KitchenAir {
    fn start_filtering(&mut self) -> bool {
        self.base.set_filter_engaged(true)
    }

    fn stop_filtering(&mut self) -> bool {
        self.base.set_filter_engaged(false)
    }

    /// The grease filter only works while the hood draws air.
    fn is_filtering(&self) -> bool {
        self.base.filter_engaged() && self.base.is_ventilating() && self.fan_speed >= 2
    }

    fn filter_efficiency(&self) -> f64 {
        (85.0 - self.grease * 0.2).max(40.0)
    }

    fn needs_filter_replacement(&self) -> bool {
        self.grease > 80.0 || self.smoke > 50.0
    }

    fn filter_specific_pollutant(&mut self, tag: &str) -> bool {
        let Ok(pollutant) = tag.parse::<Pollutant>() else {
            return false;
        };
        match pollutant {
            Pollutant::Smoke => self.smoke *= 0.3,
            Pollutant::Grease => self.grease *= 0.2,
            Pollutant::Voc => {
                self.voc *= 0.4;
                self.odor *= 0.3;
            }
            Pollutant::CarbonMonoxide => self.carbon_monoxide *= 0.1,
            _ => return false,
        }
        self.clamp_pollutants();
        debug!(%pollutant, "targeted filtration applied");
        true
    }
}

impl Breathable for KitchenAir {
    fn composition(&self) -> AirComposition {
        self.base.composition()
    }

    fn is_breathable(&self) -> bool {
        self.base.composition().is_safe_for_breathing()
            && self.carbon_monoxide < CO_HAZARD_PPM
            && self.smoke < 60.0
    }

    fn has_adequate_oxygen(&self) -> bool {
        self.base.composition().oxygen_pct() >= 19.0
    }

    fn has_harmful_gases(&self) -> bool {
        self.carbon_monoxide > 5.0 || self.base.composition().co2_pct() > 0.1 || self.smoke > 40.0
    }

    fn breathability_index(&self) -> f64 {
        let base = self.base.composition().quality_score() / 100.0;
        let co_penalty = (self.carbon_monoxide / 20.0).min(0.5);
        let smoke_penalty = (self.smoke / 100.0).min(0.3);
        (base - co_penalty - smoke_penalty).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::room::{Room, RoomType, SharedRoom};

    fn kitchen_with_room(occupied: bool) -> (KitchenAir, Arc<Room>) {
        let mut kitchen = KitchenAir::new(Arc::new(SystemClock));
        let room = Room::shared("Kitchen", RoomType::Kitchen, 12.0).unwrap();
        if occupied {
            room.enter();
        }
        kitchen.add_room(room.clone() as SharedRoom);
        (kitchen, room)
    }

    #[test]
    fn test_defaults() {
        let kitchen = KitchenAir::new(Arc::new(SystemClock));
        assert_eq!(kitchen.smoke_level(), 5.0);
        assert_eq!(kitchen.carbon_monoxide_level(), 0.5);
        assert_eq!(kitchen.exhaust_fan_speed(), 2);
        assert_eq!(kitchen.air_change_rate(), 8.0);
        assert!(!kitchen.is_ventilating());
        assert_eq!(kitchen.quality_level(), QualityLevel::Good);
        assert_eq!(kitchen.composition().oxygen_pct(), 20.8);
    }

    #[test]
    fn test_gas_stove_starts_cooking_ventilation() {
        let (mut kitchen, _room) = kitchen_with_room(true);
        assert!(!kitchen.is_cooking_mode_active());

        kitchen.set_gas_stove_in_use(true);
        assert!(kitchen.is_cooking_mode_active());
        assert_eq!(kitchen.cooking_mode_source(), ModeSource::Auto);
        assert!(kitchen.is_ventilating());
        assert_eq!(kitchen.ventilation_mode(), VentilationMode::Cooking);
        assert!(kitchen.exhaust_fan_speed() >= 3);
        assert_eq!(kitchen.air_change_rate(), 12.0);
    }

    #[test]
    fn test_cooking_needs_occupancy() {
        let (mut kitchen, _room) = kitchen_with_room(false);
        kitchen.set_gas_stove_in_use(true);
        assert!(!kitchen.is_cooking_mode_active());
        assert!(!kitchen.is_ventilating());
    }

    #[test]
    fn test_leaving_kitchen_ends_cooking() {
        let (mut kitchen, room) = kitchen_with_room(true);
        kitchen.set_gas_stove_in_use(true);
        room.exit();
        kitchen.circulate_air();
        assert!(!kitchen.is_cooking_mode_active());
        assert!(!kitchen.is_gas_stove_in_use());
        assert_eq!(kitchen.exhaust_fan_speed(), 2);
    }

    #[test]
    fn test_manual_cooking_mode_survives_detection() {
        let (mut kitchen, _room) = kitchen_with_room(false);
        kitchen.activate_cooking_mode();
        kitchen.circulate_air();
        assert!(kitchen.is_cooking_mode_active());
        assert_eq!(kitchen.cooking_mode_source(), ModeSource::Manual);
        kitchen.deactivate_cooking_mode();
        assert!(!kitchen.is_cooking_mode_active());
    }

    #[test]
    fn test_start_ventilation_modes() {
        let mut kitchen = KitchenAir::new(Arc::new(SystemClock));
        assert!(kitchen.start_ventilation("emergency"));
        assert_eq!(kitchen.air_change_rate(), 16.0);
        assert_eq!(kitchen.exhaust_fan_speed(), 5);
        assert!(!kitchen.start_ventilation("natural"));
        assert_eq!(kitchen.ventilation_mode(), VentilationMode::Emergency);

        assert!(kitchen.stop_ventilation());
        assert_eq!(kitchen.exhaust_fan_speed(), 1);
        assert!(!kitchen.stop_ventilation());

        assert!(kitchen.start_ventilation("whatever"));
        assert_eq!(kitchen.ventilation_mode(), VentilationMode::Standard);
        assert_eq!(kitchen.air_change_rate(), 10.0);
        assert_eq!(kitchen.exhaust_fan_speed(), 3);
    }

    #[test]
    fn test_smoke_while_cooking_maxes_fan_in_cooking_mode() {
        let (mut kitchen, _room) = kitchen_with_room(true);
        kitchen.set_gas_stove_in_use(true);
        assert_eq!(kitchen.ventilation_mode(), VentilationMode::Cooking);
        kitchen.drain_events();

        kitchen.smoke = 60.0;
        kitchen.respond();
        assert!(kitchen.is_ventilating());
        assert_eq!(kitchen.ventilation_mode(), VentilationMode::Cooking);
        assert_eq!(kitchen.exhaust_fan_speed(), 5);
        assert_eq!(kitchen.air_change_rate(), 16.0);
        assert!(kitchen.drain_events().is_empty());
    }

    #[test]
    fn test_smoke_while_idle_starts_emergency() {
        let (mut kitchen, _room) = kitchen_with_room(false);
        kitchen.smoke = 60.0;
        kitchen.respond();
        assert_eq!(kitchen.ventilation_mode(), VentilationMode::Emergency);
        assert_eq!(kitchen.exhaust_fan_speed(), 5);
        assert_eq!(kitchen.air_change_rate(), 16.0);
    }

    #[test]
    fn test_pollutants_saturate_at_their_bounds() {
        let (mut kitchen, _room) = kitchen_with_room(true);
        kitchen.set_auto_ventilation(false);
        kitchen.set_gas_leak_detection(false);
        kitchen.set_gas_stove_in_use(true);
        for _ in 0..300 {
            kitchen.circulate_air();
        }
        assert!(!kitchen.is_ventilating());
        assert_eq!(kitchen.carbon_monoxide_level(), 50.0);
        assert_eq!(kitchen.smoke_level(), 100.0);
        assert_eq!(kitchen.odor_level(), 10.0);
        assert_eq!(kitchen.grease_level(), 200.0);
        assert_eq!(kitchen.voc_level(), 500.0);

        let air = kitchen.composition();
        assert_eq!(air.humidity_pct(), 80.0);
        assert_eq!(air.temperature_c(), 35.0);
        // 20.8 - 0.5 (gas) - 0.3 (cooking) - 1.0 (smoke at its cap)
        assert!((air.oxygen_pct() - 19.0).abs() < 1e-9);
        assert!(air.oxygen_pct() >= 18.0);
        assert_eq!(kitchen.quality_level(), QualityLevel::Hazardous);
    }

    #[test]
    fn test_exhaust_fan_speed_range() {
        let mut kitchen = KitchenAir::new(Arc::new(SystemClock));
        assert!(!kitchen.set_exhaust_fan_speed(0));
        assert!(!kitchen.set_exhaust_fan_speed(6));
        assert_eq!(kitchen.exhaust_fan_speed(), 2);
        assert!(kitchen.set_exhaust_fan_speed(4));
        assert_eq!(kitchen.air_change_rate(), 14.0);
    }

    #[test]
    fn test_air_change_rate_range() {
        let mut kitchen = KitchenAir::new(Arc::new(SystemClock));
        assert!(!kitchen.set_air_change_rate(5.9));
        assert!(!kitchen.set_air_change_rate(20.1));
        assert_eq!(kitchen.air_change_rate(), 8.0);
        assert!(kitchen.set_air_change_rate(20.0));
    }

    #[test]
    fn test_ventilation_efficiency() {
        let mut kitchen = KitchenAir::new(Arc::new(SystemClock));
        assert_eq!(kitchen.ventilation_efficiency(), 0.0);
        kitchen.start_ventilation("emergency");
        // 92 + (5 - 3) * 2
        assert_eq!(kitchen.ventilation_efficiency(), 96.0);
        assert_eq!(kitchen.energy_efficiency_grade(), EnergyGrade::APlusPlusPlus);
    }

    #[test]
    fn test_filter_specific_pollutant() {
        let mut kitchen = KitchenAir::new(Arc::new(SystemClock));
        assert!(kitchen.filter_specific_pollutant("SMOKE"));
        assert!((kitchen.smoke_level() - 1.5).abs() < 1e-12);
        assert!(kitchen.filter_specific_pollutant("voc"));
        assert_eq!(kitchen.voc_level(), 20.0);
        assert!((kitchen.odor_level() - 0.6).abs() < 1e-12);
        assert!(kitchen.filter_specific_pollutant("co"));
        assert!((kitchen.carbon_monoxide_level() - 0.05).abs() < 1e-12);
        let before = kitchen.status();
        assert!(!kitchen.filter_specific_pollutant("mold"));
        assert!(!kitchen.filter_specific_pollutant("unknown_tag"));
        assert_eq!(kitchen.status(), before, "rejected tags leave state alone");
    }

    #[test]
    fn test_cleaning_reduces_pollutants() {
        let (mut kitchen, _room) = kitchen_with_room(true);
        kitchen.perform_kitchen_cleaning();
        assert!((kitchen.smoke_level() - 1.0).abs() < 1e-12);
        assert!((kitchen.grease_level() - 1.0).abs() < 1e-12);
        // 50 * 0.3 = 15, above the VOC floor
        assert!((kitchen.voc_level() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_filtering_requires_running_hood() {
        let mut kitchen = KitchenAir::new(Arc::new(SystemClock));
        assert!(!kitchen.is_filtering());
        kitchen.start_ventilation("natural");
        assert!(kitchen.is_filtering());
        assert!(kitchen.stop_filtering());
        assert!(!kitchen.stop_filtering());
        assert!(!kitchen.is_filtering());
        assert!(kitchen.start_filtering());
    }

    #[test]
    fn test_filter_efficiency_floor() {
        let kitchen = KitchenAir::new(Arc::new(SystemClock));
        assert_eq!(kitchen.filter_efficiency(), 83.0);
        assert!(!kitchen.needs_filter_replacement());
    }

    #[test]
    fn test_no_rooms_resets_quality() {
        let (mut kitchen, room) = kitchen_with_room(true);
        let composition = kitchen.composition();
        kitchen.remove_room(&(room as SharedRoom));
        assert_eq!(kitchen.quality_level(), QualityLevel::Good);
        assert_eq!(kitchen.composition(), composition);
    }
}
