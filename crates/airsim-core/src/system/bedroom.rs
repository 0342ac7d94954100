//! Bedroom air: allergens, bedding hygiene and a clock-driven sleep window.

use std::fmt;
use std::sync::Arc;

use time::Time;
use time::macros::{format_description, time};
use tracing::{debug, info, instrument};

use airsim_types::{AirComposition, QualityLevel};

use crate::air_system::AirSystemKind;
use crate::capability::{Breathable, Filtration, Ventilation};
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::events::ActivityMode;
use crate::pollutant::Pollutant;
use crate::status::{BedroomStatus, CommonStatus, SystemStatus};
use crate::ventilation::{AchRange, VentilationMode, VentilationState};

use super::{ActivityState, AirControl, BaseAirSystem, ModeSource, Transition, clamp};

/// Legal air change rates.
pub const BEDROOM_ACH_RANGE: AchRange = AchRange::new(1.0, 4.0);

const ALLERGEN_BOUNDS: (f64, f64) = (5.0, 100.0);
const SLEEP_NOISE_CEILING_DB: f64 = 25.0;
const NIGHT_ACH: f64 = 2.0;

/// Daily sleep window on minute-of-day resolution.
///
/// The window is half-open, `[start, end)`. When `start` is later than
/// `end` it wraps past midnight; when they are equal it is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepSchedule {
    start: Time,
    end: Time,
}

impl Default for SleepSchedule {
    fn default() -> Self {
        Self {
            start: time!(22:00),
            end: time!(07:00),
        }
    }
}

impl SleepSchedule {
    pub fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    /// Parse a window from two `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_hhmm(start)?, parse_hhmm(end)?))
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn contains(&self, at: Time) -> bool {
        let t = minute_of_day(at);
        let start = minute_of_day(self.start);
        let end = minute_of_day(self.end);
        if start < end {
            t >= start && t < end
        } else if start > end {
            t >= start || t < end
        } else {
            false
        }
    }
}

impl fmt::Display for SleepSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        )
    }
}

fn minute_of_day(t: Time) -> u16 {
    u16::from(t.hour()) * 60 + u16::from(t.minute())
}

/// Parse an `HH:MM` time of day.
pub fn parse_hhmm(s: &str) -> Result<Time> {
    Time::parse(s.trim(), format_description!("[hour]:[minute]"))
        .map_err(|e| Error::invalid_config(format!("invalid time of day '{s}': {e}")))
}

/// Bedroom air system.
///
/// While the sleep window is open (or sleep mode is held on) the system
/// favors quiet ventilation and is stricter about CO2 and allergens.
#[derive(Debug)]
pub struct BedroomAir {
    base: BaseAirSystem,
    allergen: f64,
    bedding_cleanliness: f64,
    noise_db: f64,
    schedule: SleepSchedule,
    sleep_override: Option<bool>,
    night_mode: bool,
    auto_purifier: bool,
    sleep: ActivityState,
}

impl BedroomAir {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            base: BaseAirSystem::new(
                AirComposition::clamped(21.2, 0.04, 40.0, 18.0),
                VentilationState::new(VentilationMode::Quiet, 2.5, BEDROOM_ACH_RANGE),
                clock,
            ),
            allergen: 20.0,
            bedding_cleanliness: 0.8,
            noise_db: 25.0,
            schedule: SleepSchedule::default(),
            sleep_override: None,
            night_mode: false,
            auto_purifier: true,
            sleep: ActivityState::default(),
        }
    }

    pub fn allergen_level(&self) -> f64 {
        self.allergen
    }

    /// Bedding cleanliness in `[0, 1]`.
    pub fn bedding_cleanliness(&self) -> f64 {
        self.bedding_cleanliness
    }

    pub fn noise_level(&self) -> f64 {
        self.noise_db
    }

    pub fn sleep_schedule(&self) -> SleepSchedule {
        self.schedule
    }

    pub fn is_night_mode(&self) -> bool {
        self.night_mode
    }

    pub fn is_sleep_mode_active(&self) -> bool {
        self.sleep.is_active()
    }

    pub fn sleep_mode_source(&self) -> ModeSource {
        self.sleep.source()
    }

    pub fn sleep_override(&self) -> Option<bool> {
        self.sleep_override
    }

    pub fn set_sleep_schedule(&mut self, start: Time, end: Time) {
        self.schedule = SleepSchedule::new(start, end);
        info!(schedule = %self.schedule, "sleep schedule updated");
    }

    /// Pin sleep mode on or off, or hand it back to the schedule with `None`.
    pub fn set_sleep_override(&mut self, value: Option<bool>) {
        self.sleep_override = value;
        let transition = match value {
            Some(true) => self.sleep.hold(),
            Some(false) => self.sleep.release(),
            None => {
                self.sleep.resume_auto();
                None
            }
        };
        self.apply(transition);
        self.update_air_composition();
    }

    pub fn activate_sleep_mode(&mut self) {
        self.set_sleep_override(Some(true));
    }

    /// Switch sleep mode off and keep it off until
    /// [`resume_sleep_schedule`](Self::resume_sleep_schedule).
    pub fn deactivate_sleep_mode(&mut self) {
        self.set_sleep_override(Some(false));
    }

    pub fn resume_sleep_schedule(&mut self) {
        self.set_sleep_override(None);
    }

    /// Fresh bedding: cleanliness 0.95 and allergens cut by 60%.
    pub fn clean_bedding(&mut self) {
        self.bedding_cleanliness = 0.95;
        self.allergen = clamp(self.allergen * 0.4, ALLERGEN_BOUNDS.0, ALLERGEN_BOUNDS.1);
        info!(allergen = self.allergen, "bedding cleaned");
        self.reclassify();
    }

    fn apply(&mut self, transition: Option<Transition>) {
        match transition {
            Some(Transition::Activated) => {
                self.base.record_mode(ActivityMode::Sleep, true);
                self.night_mode = true;
                self.noise_db = self.noise_db.min(SLEEP_NOISE_CEILING_DB);
                if self.base.auto_ventilation() && !self.base.is_ventilating() {
                    self.start_mode(VentilationMode::Quiet);
                }
            }
            Some(Transition::Deactivated) => {
                self.base.record_mode(ActivityMode::Sleep, false);
                self.night_mode = false;
            }
            None => {}
        }
    }

    fn detect_sleep(&mut self) {
        if self.sleep_override.is_some() {
            return;
        }
        let now = self.base.clock().now().time();
        let transition = self.sleep.detect(self.schedule.contains(now));
        self.apply(transition);
    }

    fn start_mode(&mut self, mode: VentilationMode) -> bool {
        let rate = match mode {
            VentilationMode::Quiet => 2.0,
            VentilationMode::Forced => 3.0,
            _ => 2.5,
        };
        if !self.base.start_ventilation(mode, rate) {
            return false;
        }
        match mode {
            VentilationMode::Quiet => {
                self.night_mode = true;
                self.noise_db = 20.0;
            }
            VentilationMode::Forced if self.sleep.is_active() => self.noise_db = 30.0,
            _ => {}
        }
        true
    }

    fn compute_composition(&self) -> AirComposition {
        let asleep = self.sleep.is_active();
        let night = self.night_mode;
        let ventilating = self.base.is_ventilating();
        let rate = self.base.rate();
        let occupied = self.base.occupied_count() as f64;
        let bedding = self.bedding_cleanliness;

        let (o2_per_person, co2_per_person, humidity_per_person) = if asleep {
            (0.2, 0.04, 4.0)
        } else {
            (0.3, 0.02, 2.0)
        };

        let mut oxygen = 21.2 - occupied * o2_per_person;
        if ventilating {
            oxygen += rate * if night { 0.1 } else { 0.15 };
        }
        oxygen *= 0.8 + bedding * 0.2;

        let mut co2 = 0.04 + occupied * co2_per_person;
        if ventilating {
            co2 *= if night { 0.90 } else { 0.85 };
        }

        let mut humidity = 45.0 + occupied * humidity_per_person + (1.0 - bedding) * 10.0;
        if ventilating {
            humidity *= 0.92;
        }

        let mut temperature = self.base.average_temperature().unwrap_or(18.0);
        if asleep {
            temperature += occupied;
        }
        if ventilating && !night {
            temperature -= rate * 0.2;
        }

        AirComposition::clamped(
            clamp(oxygen, 19.0, 22.0),
            clamp(co2, 0.03, 0.3),
            clamp(humidity, 35.0, 60.0),
            clamp(temperature, 16.0, 24.0),
        )
    }

    fn update_allergen(&mut self, humidity: f64) {
        self.allergen += (1.0 - self.bedding_cleanliness) * 5.0;
        if humidity > 55.0 {
            self.allergen += 3.0;
        }
        if self.auto_purifier {
            self.allergen *= 1.0 - self.filter_efficiency() / 150.0;
        }
        if self.base.is_ventilating() {
            self.allergen *= 0.95;
        }
        self.allergen = clamp(self.allergen, ALLERGEN_BOUNDS.0, ALLERGEN_BOUNDS.1);
    }

    fn classify(&self, composition: &AirComposition) -> QualityLevel {
        let mut level = QualityLevel::from_score(composition.quality_score());
        if self.sleep.is_active() {
            if composition.co2_pct() > 0.08 {
                level = level.downgrade_within(QualityLevel::Poor);
            }
            if self.allergen > 40.0 {
                level = level.downgrade_within(QualityLevel::Moderate);
            }
        }
        level
    }

    fn respond(&mut self) {
        if !self.base.auto_ventilation() || !self.sleep.is_active() {
            return;
        }
        if self.base.quality().requires_action() || self.allergen > 50.0 {
            if !self.base.is_ventilating() {
                self.start_mode(VentilationMode::Quiet);
            }
            self.night_mode = true;
            self.set_air_change_rate(NIGHT_ACH);
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

impl AirControl for BedroomAir {
    fn kind(&self) -> AirSystemKind {
        AirSystemKind::Bedroom
    }

    fn base(&self) -> &BaseAirSystem {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseAirSystem {
        &mut self.base
    }

    #[instrument(level = "debug", skip(self), fields(system = "bedroom"))]
    fn update_air_composition(&mut self) {
        if self.base.rooms().is_empty() {
            self.base.set_quality(QualityLevel::Good);
            return;
        }
        self.detect_sleep();
        let composition = self.compute_composition();
        self.update_allergen(composition.humidity_pct());
        let quality = self.classify(&composition);
        self.base.set_composition(composition);
        self.base.set_quality(quality);
        self.respond();
        self.base.propagate_quality();
        debug!(
            asleep = self.sleep.is_active(),
            allergen = self.allergen,
            quality = %quality,
            "bedroom cycle complete"
        );
    }

    fn status(&self) -> SystemStatus {
        SystemStatus::Bedroom(BedroomStatus {
            common: CommonStatus::capture(self),
            sleep_mode: self.sleep.is_active(),
            sleep_source: self.sleep.source(),
            sleep_window: self.schedule.to_string(),
            night_mode: self.night_mode,
            auto_purifier: self.auto_purifier,
            noise_db: self.noise_db,
            allergen_level: self.allergen,
            bedding_cleanliness: self.bedding_cleanliness,
        })
    }
}

impl Ventilation for BedroomAir {
    fn start_ventilation(&mut self, mode: &str) -> bool {
        self.start_mode(VentilationMode::parse(mode))
    }

    fn stop_ventilation(&mut self) -> bool {
        if !self.base.stop_ventilation() {
            return false;
        }
        self.night_mode = false;
        true
    }

    /// Also sets the fan noise to `15 + 5 * rate` dB.
    fn set_air_change_rate(&mut self, rate: f64) -> bool {
        if !self.base.set_rate(rate) {
            return false;
        }
        self.noise_db = 15.0 + 5.0 * rate;
        true
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
        let mut efficiency: f64 = 80.0;
        if self.night_mode {
            efficiency *= 0.85;
        }
        if self.sleep.is_active() {
            efficiency *= 0.9;
        }
        efficiency
    }
}

impl Filtration for BedroomAir {
    fn start_filtering(&mut self) -> bool {
        !std::mem::replace(&mut self.auto_purifier, true)
    }

    fn stop_filtering(&mut self) -> bool {
        std::mem::replace(&mut self.auto_purifier, false)
    }

    fn is_filtering(&self) -> bool {
        self.auto_purifier
    }

    fn filter_efficiency(&self) -> f64 {
        let mut efficiency = 88.0 * (0.7 + self.bedding_cleanliness * 0.3);
        if self.night_mode {
            efficiency *= 0.9;
        }
        efficiency.max(60.0)
    }

    fn needs_filter_replacement(&self) -> bool {
        self.allergen > 50.0 || self.bedding_cleanliness < 0.6
    }

    fn filter_specific_pollutant(&mut self, tag: &str) -> bool {
        let Ok(pollutant) = tag.parse::<Pollutant>() else {
            return false;
        };
        let factor = match pollutant {
            Pollutant::Allergen => 0.4,
            Pollutant::DustMite => 0.3,
            Pollutant::Pollen => 0.5,
            _ => return false,
        };
        self.allergen = clamp(self.allergen * factor, ALLERGEN_BOUNDS.0, ALLERGEN_BOUNDS.1);
        debug!(%pollutant, allergen = self.allergen, "targeted filtration applied");
        true
    }
}

impl Breathable for BedroomAir {
    fn composition(&self) -> AirComposition {
        self.base.composition()
    }

    fn is_breathable(&self) -> bool {
        self.base.composition().is_safe_for_breathing() && self.allergen < 60.0
    }

    fn has_adequate_oxygen(&self) -> bool {
        let minimum = if self.sleep.is_active() { 20.0 } else { 19.0 };
        self.base.composition().oxygen_pct() >= minimum
    }

    fn has_harmful_gases(&self) -> bool {
        self.base.composition().co2_pct() > 0.08 || self.allergen > 70.0
    }

    fn breathability_index(&self) -> f64 {
        let base = self.base.composition().quality_score() / 100.0;
        let mut penalty = (self.allergen / 100.0).min(0.4);
        if self.sleep.is_active() {
            penalty *= 1.5;
        }
        (base - penalty).max(0.0)
    }
}
