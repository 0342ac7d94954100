//! Bathroom air: steam, mold, bacteria and ammonia.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use airsim_types::{AirComposition, QualityLevel};

use crate::air_system::AirSystemKind;
use crate::capability::{Breathable, Filtration, Ventilation};
use crate::clock::Clock;
use crate::events::ActivityMode;
use crate::pollutant::Pollutant;
use crate::status::{BathroomStatus, CommonStatus, SystemStatus};
use crate::ventilation::{AchRange, VentilationMode, VentilationState};

use super::{ActivityState, AirControl, BaseAirSystem, ModeSource, Transition, clamp};

/// Legal air change rates.
pub const BATHROOM_ACH_RANGE: AchRange = AchRange::new(4.0, 15.0);

/// Accepted values for [`BathroomAir::set_target_humidity`].
pub const TARGET_HUMIDITY_RANGE: std::ops::RangeInclusive<f64> = 40.0..=70.0;

const AMMONIA_BOUNDS: (f64, f64) = (0.0, 20.0);
const STEAM_BOUNDS: (f64, f64) = (0.0, 100.0);
const BACTERIA_BOUNDS: (f64, f64) = (50.0, 2000.0);

const SHOWER_TIMER_MINUTES: u32 = 30;
const AFTER_SHOWER_TIMER_MINUTES: u32 = 15;
const DEHUMIDIFY_MIN_ACH: f64 = 10.0;

/// Bathroom air system.
///
/// Shower mode is detected from steam, or from hot humid air with someone
/// present. Mold risk is recomputed every cycle from humidity, temperature
/// and bacteria. Emergency dehumidification kicks in above 80% humidity or
/// 60 mold risk whether or not automatic ventilation is enabled.
#[derive(Debug)]
pub struct BathroomAir {
    base: BaseAirSystem,
    mold_risk: f64,
    bacteria: f64,
    ammonia: f64,
    steam: f64,
    antibacterial: bool,
    target_humidity: f64,
    exhaust_fan: bool,
    timer_minutes: u32,
    shower: ActivityState,
}

impl BathroomAir {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            base: BaseAirSystem::new(
                AirComposition::clamped(20.5, 0.05, 60.0, 22.0),
                VentilationState::new(VentilationMode::HumidityControl, 6.0, BATHROOM_ACH_RANGE),
                clock,
            ),
            mold_risk: 15.0,
            bacteria: 100.0,
            ammonia: 0.5,
            steam: 5.0,
            antibacterial: true,
            target_humidity: 55.0,
            exhaust_fan: false,
            timer_minutes: 0,
            shower: ActivityState::default(),
        }
    }

    /// Mold risk on a 0-100 scale.
    pub fn mold_risk(&self) -> f64 {
        self.mold_risk
    }

    /// Bacteria count (CFU/m³).
    pub fn bacteria_count(&self) -> f64 {
        self.bacteria
    }

    /// Ammonia in ppm.
    pub fn ammonia_level(&self) -> f64 {
        self.ammonia
    }

    pub fn steam_level(&self) -> f64 {
        self.steam
    }

    pub fn target_humidity(&self) -> f64 {
        self.target_humidity
    }

    pub fn is_exhaust_fan_on(&self) -> bool {
        self.exhaust_fan
    }

    pub fn ventilation_timer(&self) -> u32 {
        self.timer_minutes
    }

    pub fn is_antibacterial_active(&self) -> bool {
        self.antibacterial
    }

    pub fn is_shower_mode_active(&self) -> bool {
        self.shower.is_active()
    }

    pub fn shower_mode_source(&self) -> ModeSource {
        self.shower.source()
    }

    /// Hold shower mode on until [`deactivate_shower_mode`](Self::deactivate_shower_mode).
    pub fn activate_shower_mode(&mut self) {
        if self.shower.hold() == Some(Transition::Activated) {
            self.on_shower_started();
        }
        self.update_air_composition();
    }

    pub fn deactivate_shower_mode(&mut self) {
        if self.shower.release() == Some(Transition::Deactivated) {
            self.on_shower_ended();
        }
        self.update_air_composition();
    }

    pub fn set_ventilation_timer(&mut self, minutes: u32) {
        self.timer_minutes = minutes;
        debug!(minutes, "ventilation timer set");
    }

    /// Flip the antibacterial treatment and return the new state.
    pub fn toggle_antibacterial_system(&mut self) -> bool {
        self.antibacterial = !self.antibacterial;
        info!(active = self.antibacterial, "antibacterial system toggled");
        self.antibacterial
    }

    /// Set the humidity the automatic control aims for. Accepts 40-70%.
    pub fn set_target_humidity(&mut self, humidity: f64) -> bool {
        if !TARGET_HUMIDITY_RANGE.contains(&humidity) {
            debug!(humidity, "target humidity rejected");
            return false;
        }
        self.target_humidity = humidity;
        true
    }

    /// Scrub the bathroom. Mold risk drops by exactly 80%; quality is
    /// reclassified without running a full cycle.
    pub fn perform_bathroom_cleaning(&mut self) {
        self.mold_risk *= 0.2;
        self.bacteria *= 0.3;
        self.ammonia *= 0.1;
        self.steam *= 0.5;
        self.clamp_pollutants();
        info!(mold_risk = self.mold_risk, "bathroom cleaned");
        self.reclassify();
    }

    fn on_shower_started(&mut self) {
        self.base.record_mode(ActivityMode::Shower, true);
        if self.base.auto_ventilation() && !self.base.is_ventilating() {
            self.start_mode(VentilationMode::HumidityControl);
        }
        self.exhaust_fan = true;
        self.timer_minutes = SHOWER_TIMER_MINUTES;
    }

    fn on_shower_ended(&mut self) {
        self.base.record_mode(ActivityMode::Shower, false);
        if self.base.is_ventilating()
            && self.base.composition().humidity_pct() > self.target_humidity
        {
            self.timer_minutes = AFTER_SHOWER_TIMER_MINUTES;
        } else {
            self.exhaust_fan = false;
        }
    }

    fn start_mode(&mut self, mode: VentilationMode) -> bool {
        let rate = match mode {
            VentilationMode::Emergency => 12.0,
            VentilationMode::HumidityControl => 8.0,
            VentilationMode::Antibacterial => 7.0,
            VentilationMode::Forced => 9.0,
            VentilationMode::Natural => 5.0,
            _ => 6.0,
        };
        if !self.base.start_ventilation(mode, rate) {
            return false;
        }
        if mode == VentilationMode::Antibacterial {
            self.antibacterial = true;
        }
        self.exhaust_fan = true;
        true
    }

    fn emergency_dehumidification(&mut self, reason: &str) {
        if self.base.is_ventilating() {
            let rate = self.base.rate().max(DEHUMIDIFY_MIN_ACH);
            self.base.set_rate(rate);
        } else {
            self.base
                .force_ventilation(VentilationMode::Emergency, 12.0, reason);
        }
        self.exhaust_fan = true;
    }

    fn detect_shower(&mut self) {
        let composition = self.base.composition();
        let detected = self.base.occupied_count() > 0
            && (self.steam > 20.0
                || (composition.humidity_pct() > 75.0 && composition.temperature_c() > 25.0));
        match self.shower.detect(detected) {
            Some(Transition::Activated) => self.on_shower_started(),
            Some(Transition::Deactivated) => self.on_shower_ended(),
            None => {}
        }
    }

    fn compute_composition(&self) -> AirComposition {
        let shower = self.shower.is_active();
        let ventilating = self.base.is_ventilating();
        let rate = self.base.rate();
        let occupied = self.base.occupied_count() as f64;
        let previous_humidity = self.base.composition().humidity_pct();

        let mut oxygen = 20.5 - occupied * 0.4;
        if previous_humidity > 80.0 {
            oxygen -= 0.3;
        }
        if ventilating {
            oxygen += rate * 0.12;
        }

        let mut co2 = 0.04 + occupied * 0.04;
        if shower {
            co2 += 0.02;
        }
        if ventilating {
            let reduction = match self.base.mode() {
                VentilationMode::Emergency => 0.35,
                VentilationMode::HumidityControl => 0.25,
                VentilationMode::Forced => 0.20,
                _ => 0.15,
            };
            co2 *= 1.0 - reduction;
        }

        let mut humidity = 55.0 + self.steam * 1.5 + occupied * 8.0;
        if shower {
            humidity += 30.0;
        }
        if ventilating {
            humidity *= 1.0 - rate * 0.08;
        }

        let mut temperature = self.base.average_temperature().unwrap_or(22.0) + self.steam * 0.2;
        if shower {
            temperature += 5.0;
        }
        if ventilating {
            temperature -= rate * 0.15;
        }

        AirComposition::clamped(
            clamp(oxygen, 18.5, 21.0),
            clamp(co2, 0.03, 0.5),
            clamp(humidity, 40.0, 95.0),
            clamp(temperature, 18.0, 32.0),
        )
    }

    fn update_pollutants(&mut self, humidity: f64) {
        let occupied = self.base.occupied_count() as f64;
        if occupied > 0.0 {
            self.ammonia += 0.3 * occupied;
            self.bacteria += 20.0 * occupied;
        }
        if self.shower.is_active() {
            self.steam += 5.0;
            self.bacteria += 10.0;
        }
        if humidity > 75.0 {
            self.bacteria *= 1.1;
        }
        if self.base.is_ventilating() {
            let r = self.base.rate() * 0.05;
            self.ammonia *= 1.0 - r;
            self.steam *= 1.0 - 2.0 * r;
            self.bacteria *= 1.0 - 0.5 * r;
        }
        if self.antibacterial {
            self.bacteria *= 0.95;
        }
        self.ammonia *= 0.98;
        self.steam *= 0.95;
        self.clamp_pollutants();
    }

    fn clamp_pollutants(&mut self) {
        self.ammonia = clamp(self.ammonia, AMMONIA_BOUNDS.0, AMMONIA_BOUNDS.1);
        self.steam = clamp(self.steam, STEAM_BOUNDS.0, STEAM_BOUNDS.1);
        self.bacteria = clamp(self.bacteria, BACTERIA_BOUNDS.0, BACTERIA_BOUNDS.1);
        self.mold_risk = clamp(self.mold_risk, 0.0, 100.0);
    }

    fn compute_mold_risk(&self, composition: &AirComposition) -> f64 {
        let humidity = composition.humidity_pct();
        let mut risk: f64 = 0.0;
        if humidity > 70.0 {
            risk += (humidity - 70.0) * 2.0;
        }
        if (20.0..=30.0).contains(&composition.temperature_c()) {
            risk += 10.0;
        }
        if !self.base.is_ventilating() {
            risk += 5.0;
        }
        risk += self.bacteria * 0.01;
        risk = risk.min(100.0);
        if self.base.is_ventilating() {
            risk *= 0.9;
        }
        if self.antibacterial {
            risk *= 0.85;
        }
        risk.max(0.0)
    }

    fn classify(&self, composition: &AirComposition) -> QualityLevel {
        let level = QualityLevel::from_score(composition.quality_score());
        let humidity = composition.humidity_pct();
        if humidity > 90.0 || self.mold_risk > 80.0 {
            QualityLevel::Hazardous
        } else if humidity > 80.0 || self.mold_risk > 60.0 || self.ammonia > 10.0 {
            level.max(QualityLevel::Poor)
        } else if humidity > 70.0 || self.mold_risk > 40.0 || self.bacteria > 500.0 {
            level.downgrade_within(QualityLevel::Moderate)
        } else {
            level
        }
    }

    fn respond(&mut self) {
        let humidity = self.base.composition().humidity_pct();
        if self.base.auto_ventilation()
            && humidity > self.target_humidity + 10.0
            && !self.base.is_ventilating()
        {
            self.start_mode(VentilationMode::HumidityControl);
        }
        if humidity > 80.0 || self.mold_risk > 60.0 {
            self.emergency_dehumidification("humidity or mold risk above limit");
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

impl AirControl for BathroomAir {
    fn kind(&self) -> AirSystemKind {
        AirSystemKind::Bathroom
    }

    fn base(&self) -> &BaseAirSystem {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseAirSystem {
        &mut self.base
    }

    #[instrument(level = "debug", skip(self), fields(system = "bathroom"))]
    fn update_air_composition(&mut self) {
        if self.base.rooms().is_empty() {
            self.base.set_quality(QualityLevel::Good);
            return;
        }
        self.detect_shower();
        let composition = self.compute_composition();
        self.update_pollutants(composition.humidity_pct());
        self.mold_risk = self.compute_mold_risk(&composition);
        let quality = self.classify(&composition);
        self.base.set_composition(composition);
        self.base.set_quality(quality);
        self.respond();
        self.base.propagate_quality();
        debug!(
            humidity = composition.humidity_pct(),
            mold_risk = self.mold_risk,
            quality = %quality,
            "bathroom cycle complete"
        );
    }

    fn status(&self) -> SystemStatus {
        SystemStatus::Bathroom(BathroomStatus {
            common: CommonStatus::capture(self),
            shower_mode: self.shower.is_active(),
            shower_source: self.shower.source(),
            exhaust_fan: self.exhaust_fan,
            ventilation_timer_minutes: self.timer_minutes,
            antibacterial: self.antibacterial,
            target_humidity: self.target_humidity,
            mold_risk: self.mold_risk,
            bacteria_count: self.bacteria,
            ammonia_level: self.ammonia,
            steam_level: self.steam,
        })
    }
}

impl Ventilation for BathroomAir {
    fn start_ventilation(&mut self, mode: &str) -> bool {
        self.start_mode(VentilationMode::parse(mode))
    }

    fn stop_ventilation(&mut self) -> bool {
        if !self.base.stop_ventilation() {
            return false;
        }
        self.exhaust_fan = false;
        self.timer_minutes = 0;
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
        let mut efficiency: f64 = 88.0;
        if self.base.composition().humidity_pct() > 80.0 {
            efficiency *= 0.85;
        }
        if self.antibacterial {
            efficiency += 5.0;
        }
        efficiency.min(100.0)
    }
}

impl Filtration for BathroomAir {
    fn start_filtering(&mut self) -> bool {
        !std::mem::replace(&mut self.antibacterial, true)
    }

    fn stop_filtering(&mut self) -> bool {
        std::mem::replace(&mut self.antibacterial, false)
    }

    fn is_filtering(&self) -> bool {
        self.antibacterial
    }

    fn filter_efficiency(&self) -> f64 {
        let mut efficiency: f64 = 82.0;
        if self.base.composition().humidity_pct() > 75.0 {
            efficiency *= 0.9;
        }
        (efficiency - self.mold_risk * 0.2).max(50.0)
    }

    fn needs_filter_replacement(&self) -> bool {
        self.mold_risk > 50.0 || self.bacteria > 800.0
    }

    fn filter_specific_pollutant(&mut self, tag: &str) -> bool {
        let Ok(pollutant) = tag.parse::<Pollutant>() else {
            return false;
        };
        match pollutant {
            Pollutant::Mold => self.mold_risk *= 0.3,
            Pollutant::Bacteria => self.bacteria *= 0.4,
            Pollutant::Ammonia => self.ammonia *= 0.2,
            Pollutant::Humidity => {
                self.steam *= 0.1;
                self.emergency_dehumidification("targeted dehumidification");
            }
            _ => return false,
        }
        self.clamp_pollutants();
        debug!(%pollutant, "targeted filtration applied");
        true
    }
}

impl Breathable for BathroomAir {
    fn composition(&self) -> AirComposition {
        self.base.composition()
    }

    fn is_breathable(&self) -> bool {
        let composition = self.base.composition();
        composition.is_safe_for_breathing()
            && self.ammonia < 10.0
            && composition.humidity_pct() < 90.0
    }

    fn has_adequate_oxygen(&self) -> bool {
        self.base.composition().oxygen_pct() >= 19.0
    }

    fn has_harmful_gases(&self) -> bool {
        self.ammonia > 5.0 || self.base.composition().co2_pct() > 0.1 || self.mold_risk > 60.0
    }

    fn breathability_index(&self) -> f64 {
        let base = self.base.composition().quality_score() / 100.0;
        let ammonia_penalty = (self.ammonia / 20.0).min(0.3);
        let mold_penalty = (self.mold_risk / 100.0).min(0.4);
        (base - ammonia_penalty - mold_penalty).max(0.0)
    }
}
