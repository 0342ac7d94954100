//! Whole-home fallback system with no room-specific pollutants.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, instrument};

use airsim_types::{AirComposition, QualityLevel};

use crate::air_system::AirSystemKind;
use crate::capability::{Breathable, Filtration, Ventilation};
use crate::clock::Clock;
use crate::status::{CommonStatus, HomeStatus, SystemStatus};
use crate::ventilation::{AchRange, VentilationMode, VentilationState};

use super::{AirControl, BaseAirSystem, clamp};

/// Legal air change rates.
pub const HOME_ACH_RANGE: AchRange = AchRange::new(0.5, 10.0);

/// Default rated filter efficiency, in percent.
pub const DEFAULT_FILTER_EFFICIENCY: f64 = 95.0;

const FILTER_REPLACEMENT_HOURS: f64 = 2000.0;

/// Generic whole-home air system.
///
/// Every cycle through [`circulate_air`](AirControl::circulate_air) keeps
/// mixed ventilation running. Operating hours accumulate from the injected
/// clock while the fans run.
#[derive(Debug)]
pub struct HomeAirSystem {
    base: BaseAirSystem,
    filter_efficiency: f64,
    operating_hours: f64,
    last_accounted: Option<OffsetDateTime>,
}

impl HomeAirSystem {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            base: BaseAirSystem::new(
                AirComposition::default(),
                VentilationState::new(VentilationMode::Natural, 3.0, HOME_ACH_RANGE),
                clock,
            ),
            filter_efficiency: DEFAULT_FILTER_EFFICIENCY,
            operating_hours: 0.0,
            last_accounted: None,
        }
    }

    /// Hours spent ventilating so far.
    pub fn operating_hours(&self) -> f64 {
        self.operating_hours
    }

    /// Set the rated filter efficiency. Accepts `[0, 100]`.
    pub fn set_filter_efficiency(&mut self, efficiency: f64) -> bool {
        if !(0.0..=100.0).contains(&efficiency) {
            return false;
        }
        self.filter_efficiency = efficiency;
        true
    }

    /// Add the time since the last accounting point while ventilating.
    fn account_hours(&mut self) {
        let now = self.base.clock().now();
        if self.base.is_ventilating()
            && let Some(last) = self.last_accounted
        {
            let elapsed = (now - last).as_seconds_f64() / 3600.0;
            self.operating_hours += elapsed.max(0.0);
        }
        self.last_accounted = self.base.is_ventilating().then_some(now);
    }

    fn compute_composition(&self) -> AirComposition {
        let ventilating = self.base.is_ventilating();
        let rate = self.base.rate();
        let rooms = self.base.rooms().len() as f64;
        let occupied = self.base.occupied_count() as f64;

        let mut oxygen = 21.0 - occupied * 0.3;
        if ventilating {
            oxygen += rate * 0.1;
        } else {
            oxygen -= rooms * 0.2;
        }

        let mut co2 = 0.04 + occupied * 0.02;
        if ventilating {
            co2 *= 1.0 - rate * 0.1;
        }

        let mut humidity = 50.0 + rooms * 2.0 + occupied * 5.0;
        if ventilating {
            humidity *= 0.9;
        }

        let temperature = self
            .base
            .average_temperature()
            .unwrap_or_else(|| self.base.composition().temperature_c());

        AirComposition::clamped(
            clamp(oxygen, 16.0, 23.0),
            clamp(co2, 0.03, 0.5),
            clamp(humidity, 20.0, 80.0),
            temperature,
        )
    }
}

impl AirControl for HomeAirSystem {
    fn kind(&self) -> AirSystemKind {
        AirSystemKind::Home
    }

    fn base(&self) -> &BaseAirSystem {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseAirSystem {
        &mut self.base
    }

    #[instrument(level = "debug", skip(self), fields(system = "home"))]
    fn update_air_composition(&mut self) {
        if self.base.rooms().is_empty() {
            self.base.set_quality(QualityLevel::Good);
            return;
        }
        let composition = self.compute_composition();
        let quality = QualityLevel::from_score(composition.quality_score());
        self.base.set_composition(composition);
        self.base.set_quality(quality);
        self.base.propagate_quality();
        debug!(quality = %quality, "home cycle complete");
    }

    /// Keep mixed ventilation running, then run a cycle.
    fn circulate_air(&mut self) {
        if !self.base.is_ventilating() {
            self.start_ventilation(VentilationMode::Mixed.as_str());
        }
        self.account_hours();
        self.base.tick();
        self.update_air_composition();
    }

    fn status(&self) -> SystemStatus {
        SystemStatus::Home(HomeStatus {
            common: CommonStatus::capture(self),
            operating_hours: self.operating_hours,
        })
    }
}

impl Ventilation for HomeAirSystem {
    fn start_ventilation(&mut self, mode: &str) -> bool {
        let mode = VentilationMode::parse(mode);
        let rate = match mode {
            VentilationMode::Natural => 2.0,
            VentilationMode::Forced => 4.0,
            _ => 3.0,
        };
        if !self.base.start_ventilation(mode, rate) {
            return false;
        }
        self.account_hours();
        true
    }

    fn stop_ventilation(&mut self) -> bool {
        if !self.base.is_ventilating() {
            return false;
        }
        self.account_hours();
        self.base.stop_ventilation();
        self.last_accounted = None;
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
        let rate_score = (self.base.rate() * 20.0).min(100.0);
        let wear_score = (100.0 - self.operating_hours * 0.1).max(50.0);
        (self.filter_efficiency + rate_score + wear_score) / 3.0
    }
}

impl Filtration for HomeAirSystem {
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
        self.filter_efficiency
    }

    fn needs_filter_replacement(&self) -> bool {
        self.filter_efficiency < 70.0 || self.operating_hours > FILTER_REPLACEMENT_HOURS
    }

    /// The home system has no pollutant-specific stages.
    fn filter_specific_pollutant(&mut self, _tag: &str) -> bool {
        false
    }
}

impl Breathable for HomeAirSystem {
    fn composition(&self) -> AirComposition {
        self.base.composition()
    }

    fn is_breathable(&self) -> bool {
        self.base.composition().is_safe_for_breathing()
    }

    fn has_adequate_oxygen(&self) -> bool {
        self.base.composition().oxygen_pct() >= 19.0
    }

    fn has_harmful_gases(&self) -> bool {
        self.base.composition().co2_pct() > 0.1
    }

    fn breathability_index(&self) -> f64 {
        self.base.composition().quality_score() / 100.0
    }
}
