//! Standalone ventilation fan appliance.
//!
//! Like [`AirPurifier`](crate::AirPurifier), a ventilator has a power switch
//! and refuses control calls while off. Its air change rate is derived from
//! rotation speed, airflow mode and the volume it serves rather than set on
//! a shared ventilation state.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::capability::Ventilation;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::ventilation::VentilationMode;

const SPEED_RANGE: RangeInclusive<u8> = 1..=10;
const DEFAULT_SPEED: u8 = 3;
const NIGHT_MAX_SPEED: u8 = 5;
const MAX_TIMER_MINUTES: u32 = 480;
const DIRECTION_PERIOD_RANGE: RangeInclusive<u32> = 5..=120;
const MAX_ACH: f64 = 20.0;

const NEW_EFFICIENCY: f64 = 85.0;
const WORN_EFFICIENCY_FLOOR: f64 = 70.0;
const LOW_EFFICIENCY_ALERT: f64 = 60.0;
const WEAR_INTERVAL_HOURS: u64 = 100;
const CLEANING_INTERVAL_HOURS: u64 = 300;

/// Direction of airflow through the fan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AirflowMode {
    Exhaust,
    Intake,
    #[default]
    Circulation,
    HeatRecovery,
    Auto,
}

impl AirflowMode {
    /// Parse a mode tag; anything unknown circulates.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "exhaust" => AirflowMode::Exhaust,
            "intake" => AirflowMode::Intake,
            "heat_recovery" => AirflowMode::HeatRecovery,
            "auto" => AirflowMode::Auto,
            _ => AirflowMode::Circulation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AirflowMode::Exhaust => "exhaust",
            AirflowMode::Intake => "intake",
            AirflowMode::Circulation => "circulation",
            AirflowMode::HeatRecovery => "heat_recovery",
            AirflowMode::Auto => "auto",
        }
    }

    fn airflow_multiplier(&self) -> f64 {
        match self {
            AirflowMode::Exhaust => 1.1,
            AirflowMode::Intake | AirflowMode::Auto => 1.0,
            AirflowMode::Circulation => 0.9,
            AirflowMode::HeatRecovery => 1.2,
        }
    }
}

impl fmt::Display for AirflowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ventilation fan serving one room volume.
///
/// Auto mode picks speed and airflow from the time of day on the injected
/// [`Clock`]: quiet circulation overnight, a strong exhaust in the morning
/// and balanced circulation otherwise.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use airsim_core::{SystemClock, Ventilation, Ventilator};
///
/// let mut fan = Ventilator::new("VF-200", "SN-0042", 300.0, 30.0, Arc::new(SystemClock)).unwrap();
/// assert!(!fan.set_rotation_speed(4)); // powered off
/// assert!(fan.start_ventilation("exhaust"));
/// assert!(fan.set_air_change_rate(5.0));
/// assert_eq!(fan.rotation_speed(), 5);
/// assert!(fan.air_change_rate() > 0.0);
/// ```
#[derive(Clone, Serialize)]
pub struct Ventilator {
    model_name: String,
    serial_number: String,
    max_airflow_m3h: f64,
    room_volume_m3: f64,
    powered: bool,
    speed: u8,
    mode: AirflowMode,
    clockwise: bool,
    auto_direction_change: bool,
    direction_period_minutes: u32,
    timer_minutes: u32,
    efficiency: f64,
    auto_mode: bool,
    night_mode: bool,
    operating_minutes: u64,
    #[serde(skip)]
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Ventilator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ventilator")
            .field("model_name", &self.model_name)
            .field("powered", &self.powered)
            .field("speed", &self.speed)
            .field("mode", &self.mode)
            .field("timer_minutes", &self.timer_minutes)
            .field("efficiency", &self.efficiency)
            .field("auto_mode", &self.auto_mode)
            .field("night_mode", &self.night_mode)
            .finish_non_exhaustive()
    }
}

impl Ventilator {
    /// Create a powered-off ventilator circulating at speed 3.
    pub fn new(
        model_name: impl Into<String>,
        serial_number: impl Into<String>,
        max_airflow_m3h: f64,
        room_volume_m3: f64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let model_name = model_name.into().trim().to_string();
        let serial_number = serial_number.into().trim().to_string();
        if model_name.is_empty() {
            return Err(Error::invalid_config("model name must not be empty"));
        }
        if serial_number.is_empty() {
            return Err(Error::invalid_config("serial number must not be empty"));
        }
        if !(max_airflow_m3h > 0.0 && max_airflow_m3h.is_finite()) {
            return Err(Error::invalid_config(format!(
                "max airflow must be positive, got {max_airflow_m3h}"
            )));
        }
        if !(room_volume_m3 > 0.0 && room_volume_m3.is_finite()) {
            return Err(Error::invalid_config(format!(
                "room volume must be positive, got {room_volume_m3}"
            )));
        }
        Ok(Self {
            model_name,
            serial_number,
            max_airflow_m3h,
            room_volume_m3,
            powered: false,
            speed: DEFAULT_SPEED,
            mode: AirflowMode::Circulation,
            clockwise: true,
            auto_direction_change: false,
            direction_period_minutes: 30,
            timer_minutes: 0,
            efficiency: NEW_EFFICIENCY,
            auto_mode: false,
            night_mode: false,
            operating_minutes: 0,
            clock,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn max_airflow(&self) -> f64 {
        self.max_airflow_m3h
    }

    pub fn room_volume(&self) -> f64 {
        self.room_volume_m3
    }

    pub fn is_on(&self) -> bool {
        self.powered
    }

    pub fn rotation_speed(&self) -> u8 {
        self.speed
    }

    pub fn airflow_mode(&self) -> AirflowMode {
        self.mode
    }

    pub fn is_clockwise(&self) -> bool {
        self.clockwise
    }

    pub fn is_auto_direction_change(&self) -> bool {
        self.auto_direction_change
    }

    pub fn direction_change_period(&self) -> u32 {
        self.direction_period_minutes
    }

    /// Minutes until the timer switches the fan off; zero when unset.
    pub fn timer_minutes(&self) -> u32 {
        self.timer_minutes
    }

    pub fn is_auto_mode(&self) -> bool {
        self.auto_mode
    }

    pub fn is_night_mode(&self) -> bool {
        self.night_mode
    }

    /// Whole hours run so far.
    pub fn operating_hours(&self) -> u64 {
        self.operating_minutes / 60
    }

    /// Air moved in m³/h; zero while off.
    pub fn airflow(&self) -> f64 {
        if !self.powered {
            return 0.0;
        }
        self.max_airflow_m3h
            * (f64::from(self.speed) / 10.0)
            * (self.efficiency / 100.0)
            * self.mode.airflow_multiplier()
    }

    /// Power draw in watts; zero while off.
    pub fn power_consumption(&self) -> f64 {
        if !self.powered {
            return 0.0;
        }
        let speed = f64::from(self.speed);
        let mut watts = 30.0 + speed * speed * 2.0;
        if self.night_mode {
            watts *= 0.8;
        }
        if self.mode == AirflowMode::HeatRecovery {
            watts += 50.0;
        }
        watts
    }

    /// Noise in dB; zero while off.
    pub fn noise_level(&self) -> f64 {
        if !self.powered {
            return 0.0;
        }
        let noise = 25.0 + f64::from(self.speed) * 2.5;
        if self.night_mode { noise * 0.8 } else { noise }
    }

    /// Overall score from 1 to 5, weighing efficiency and airflow per watt.
    pub fn efficiency_score(&self) -> f64 {
        let mut score: f64 = 3.0;
        if self.efficiency >= 90.0 {
            score += 1.0;
        } else if self.efficiency >= 80.0 {
            score += 0.5;
        } else if self.efficiency < 70.0 {
            score -= 0.5;
        }

        let per_watt = self.airflow() / self.power_consumption().max(1.0);
        if per_watt > 5.0 {
            score += 0.5;
        } else if per_watt < 3.0 {
            score -= 0.5;
        }
        if self.night_mode {
            score += 0.2;
        }
        score.clamp(1.0, 5.0)
    }

    pub fn turn_on(&mut self) -> bool {
        if self.powered {
            return false;
        }
        self.powered = true;
        info!(model = %self.model_name, mode = %self.mode, speed = self.speed, "ventilator on");
        true
    }

    pub fn turn_off(&mut self) -> bool {
        if !self.powered {
            return false;
        }
        self.powered = false;
        info!(model = %self.model_name, "ventilator off");
        true
    }

    /// Set the speed manually (1-10). Leaves auto mode; night mode caps the
    /// speed at 5 but still accepts the request.
    pub fn set_rotation_speed(&mut self, speed: u8) -> bool {
        if !SPEED_RANGE.contains(&speed) || !self.powered {
            debug!(speed, powered = self.powered, "rotation speed rejected");
            return false;
        }
        let speed = if self.night_mode {
            speed.min(NIGHT_MAX_SPEED)
        } else {
            speed
        };
        self.speed = speed;
        self.auto_mode = false;
        true
    }

    /// Switch airflow mode. Any mode but `Auto` leaves auto mode.
    pub fn set_airflow_mode(&mut self, mode: AirflowMode) -> bool {
        if !self.powered {
            debug!(%mode, "airflow mode rejected while off");
            return false;
        }
        debug!(from = %self.mode, to = %mode, "airflow mode changed");
        self.mode = mode;
        if mode != AirflowMode::Auto {
            self.auto_mode = false;
        }
        true
    }

    pub fn set_rotation_direction(&mut self, clockwise: bool) {
        if self.powered {
            self.clockwise = clockwise;
        }
    }

    pub fn set_auto_direction_change(&mut self, enabled: bool) {
        if self.powered {
            self.auto_direction_change = enabled;
        }
    }

    /// Period between direction changes, 5 to 120 minutes.
    pub fn set_direction_change_period(&mut self, minutes: u32) -> bool {
        if !DIRECTION_PERIOD_RANGE.contains(&minutes) {
            return false;
        }
        self.direction_period_minutes = minutes;
        true
    }

    pub fn set_auto_mode(&mut self, enabled: bool) {
        if !self.powered {
            return;
        }
        self.auto_mode = enabled;
        if enabled {
            self.mode = AirflowMode::Auto;
            self.adjust_to_time_of_day();
        }
    }

    /// Night mode caps the speed at 5 and quiets the fan.
    pub fn set_night_mode(&mut self, enabled: bool) {
        if !self.powered {
            return;
        }
        self.night_mode = enabled;
        if enabled {
            self.speed = self.speed.min(NIGHT_MAX_SPEED);
        }
    }

    /// Switch off after `minutes` of running (at most 8 hours); 0 clears.
    pub fn set_timer(&mut self, minutes: u32) -> bool {
        if minutes > MAX_TIMER_MINUTES {
            debug!(minutes, "timer rejected");
            return false;
        }
        self.timer_minutes = minutes;
        true
    }

    /// Record a measured efficiency in percent.
    pub fn update_ventilation_efficiency(&mut self, efficiency: f64) -> bool {
        if !(0.0..=100.0).contains(&efficiency) {
            return false;
        }
        self.efficiency = efficiency;
        if efficiency < LOW_EFFICIENCY_ALERT {
            warn!(model = %self.model_name, efficiency, "ventilation efficiency low, clean the fan");
        }
        true
    }

    /// Run for `minutes`. Counts down the timer (switching off when it
    /// expires), wears efficiency by one point per 100 hours down to 70%,
    /// and re-reads the clock in auto mode.
    pub fn run(&mut self, minutes: u32) {
        if !self.powered || minutes == 0 {
            return;
        }
        let ran = if self.timer_minutes > 0 {
            minutes.min(self.timer_minutes)
        } else {
            minutes
        };

        let hours_before = self.operating_hours();
        self.operating_minutes = self.operating_minutes.saturating_add(u64::from(ran));
        let hours_after = self.operating_hours();

        let worn = hours_after / WEAR_INTERVAL_HOURS - hours_before / WEAR_INTERVAL_HOURS;
        if worn > 0 {
            self.efficiency = (self.efficiency - worn as f64).max(WORN_EFFICIENCY_FLOOR);
        }
        if hours_after / CLEANING_INTERVAL_HOURS > hours_before / CLEANING_INTERVAL_HOURS {
            warn!(model = %self.model_name, hours = hours_after, "ventilator due for cleaning");
        }

        if self.timer_minutes > 0 {
            self.timer_minutes -= ran;
            if self.timer_minutes == 0 {
                info!(model = %self.model_name, "timer expired");
                self.turn_off();
                return;
            }
        }
        self.adjust_to_time_of_day();
    }

    fn adjust_to_time_of_day(&mut self) {
        if !self.powered || !self.auto_mode {
            return;
        }
        let hour = self.clock.now().hour();
        match hour {
            22..=23 | 0..=6 => {
                self.night_mode = true;
                self.speed = self.speed.min(3);
                self.mode = AirflowMode::Circulation;
            }
            7..=9 => {
                self.night_mode = false;
                self.speed = 7;
                self.mode = AirflowMode::Exhaust;
            }
            _ => {
                self.night_mode = false;
                self.speed = 5;
                self.mode = AirflowMode::Circulation;
            }
        }
        debug!(hour, mode = %self.mode, speed = self.speed, "auto adjust");
    }
}

impl Ventilation for Ventilator {
    /// Power on in the given airflow mode; `"auto"` enables auto mode.
    fn start_ventilation(&mut self, mode: &str) -> bool {
        if !self.turn_on() {
            return false;
        }
        match AirflowMode::parse(mode) {
            AirflowMode::Auto => self.set_auto_mode(true),
            mode => {
                self.set_airflow_mode(mode);
            }
        }
        true
    }

    fn stop_ventilation(&mut self) -> bool {
        self.turn_off()
    }

    /// Picks the speed whose nominal airflow covers `rate` for the room
    /// volume. Legal rates are above 0 and up to 20.
    fn set_air_change_rate(&mut self, rate: f64) -> bool {
        if !(rate > 0.0 && rate <= MAX_ACH) || !self.powered {
            debug!(rate, powered = self.powered, "air change rate rejected");
            return false;
        }
        let required = (rate * self.room_volume_m3 / self.max_airflow_m3h * 10.0).ceil();
        let speed = required.clamp(1.0, 10.0) as u8;
        self.set_rotation_speed(speed)
    }

    fn is_ventilating(&self) -> bool {
        self.powered
    }

    /// Nearest system mode: quiet at night, forced for exhaust and intake,
    /// mixed for heat recovery, standard otherwise.
    fn ventilation_mode(&self) -> VentilationMode {
        if self.night_mode {
            return VentilationMode::Quiet;
        }
        match self.mode {
            AirflowMode::Exhaust | AirflowMode::Intake => VentilationMode::Forced,
            AirflowMode::HeatRecovery => VentilationMode::Mixed,
            AirflowMode::Circulation | AirflowMode::Auto => VentilationMode::Standard,
        }
    }

    fn air_change_rate(&self) -> f64 {
        self.airflow() / self.room_volume_m3
    }

    fn ventilation_efficiency(&self) -> f64 {
        if self.powered { self.efficiency } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    use super::*;
    use crate::clock::{ManualClock, SystemClock};

    fn ventilator() -> Ventilator {
        Ventilator::new("VF-200", "SN-0042", 300.0, 30.0, Arc::new(SystemClock)).unwrap()
    }

    fn at(now: OffsetDateTime) -> (Ventilator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let mut fan = Ventilator::new("VF-200", "SN-0042", 300.0, 30.0, clock.clone()).unwrap();
        fan.turn_on();
        (fan, clock)
    }

    #[test]
    fn test_construction_validates() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        assert!(Ventilator::new("", "SN", 300.0, 30.0, clock.clone()).is_err());
        assert!(Ventilator::new("VF", " ", 300.0, 30.0, clock.clone()).is_err());
        assert!(matches!(
            Ventilator::new("VF", "SN", 0.0, 30.0, clock.clone()),
            Err(Error::InvalidConfig(_))
        ));
        assert!(Ventilator::new("VF", "SN", 300.0, f64::NAN, clock.clone()).is_err());
        let fan = Ventilator::new(" VF-200 ", "SN", 300.0, 30.0, clock).unwrap();
        assert_eq!(fan.model_name(), "VF-200");
        assert!(!fan.is_on());
        assert_eq!(fan.rotation_speed(), 3);
        assert_eq!(fan.airflow_mode(), AirflowMode::Circulation);
    }

    #[test]
    fn test_powered_off_refuses_controls() {
        let mut fan = ventilator();
        assert!(!fan.set_rotation_speed(4));
        assert!(!fan.set_airflow_mode(AirflowMode::Exhaust));
        assert!(!fan.set_air_change_rate(5.0));
        fan.set_night_mode(true);
        fan.set_auto_mode(true);
        fan.set_rotation_direction(false);
        assert!(!fan.is_night_mode());
        assert!(!fan.is_auto_mode());
        assert!(fan.is_clockwise());
        assert_eq!(fan.air_change_rate(), 0.0);
        assert_eq!(fan.ventilation_efficiency(), 0.0);
        assert_eq!(fan.power_consumption(), 0.0);
        assert_eq!(fan.noise_level(), 0.0);
    }

    #[test]
    fn test_start_and_stop() {
        let mut fan = ventilator();
        assert!(!fan.stop_ventilation());
        assert!(fan.start_ventilation("Exhaust"));
        assert!(fan.is_ventilating());
        assert_eq!(fan.airflow_mode(), AirflowMode::Exhaust);
        assert_eq!(fan.ventilation_mode(), VentilationMode::Forced);
        assert!(!fan.start_ventilation("intake"), "already running");
        assert_eq!(fan.airflow_mode(), AirflowMode::Exhaust);
        assert!(fan.stop_ventilation());
        assert!(!fan.is_ventilating());

        assert!(fan.start_ventilation("whatever"));
        assert_eq!(fan.airflow_mode(), AirflowMode::Circulation);
        assert_eq!(fan.ventilation_mode(), VentilationMode::Standard);
    }

    #[test]
    fn test_operating_figures() {
        let mut fan = ventilator();
        fan.turn_on();
        // 300 * 0.3 * 0.85 * 0.9
        assert!((fan.airflow() - 68.85).abs() < 1e-9);
        assert!((fan.air_change_rate() - 2.295).abs() < 1e-9);
        assert_eq!(fan.power_consumption(), 48.0);
        assert_eq!(fan.noise_level(), 32.5);
        assert_eq!(fan.ventilation_efficiency(), 85.0);

        assert!(fan.set_airflow_mode(AirflowMode::HeatRecovery));
        assert_eq!(fan.power_consumption(), 98.0);
        assert_eq!(fan.ventilation_mode(), VentilationMode::Mixed);
    }

    #[test]
    fn test_air_change_rate_picks_speed() {
        let mut fan = ventilator();
        fan.turn_on();
        assert!(!fan.set_air_change_rate(0.0));
        assert!(!fan.set_air_change_rate(20.1));
        assert!(!fan.set_air_change_rate(f64::NAN));
        assert_eq!(fan.rotation_speed(), 3);

        // 5 ACH * 30 m³ = 150 m³/h, half of the rated 300
        assert!(fan.set_air_change_rate(5.0));
        assert_eq!(fan.rotation_speed(), 5);
        assert!(fan.set_air_change_rate(20.0));
        assert_eq!(fan.rotation_speed(), 10);
    }

    #[test]
    fn test_night_mode_caps_speed() {
        let mut fan = ventilator();
        fan.turn_on();
        assert!(!fan.set_rotation_speed(0));
        assert!(!fan.set_rotation_speed(11));
        assert!(fan.set_rotation_speed(8));
        fan.set_night_mode(true);
        assert_eq!(fan.rotation_speed(), 5);
        assert_eq!(fan.ventilation_mode(), VentilationMode::Quiet);
        assert!(fan.set_rotation_speed(9));
        assert_eq!(fan.rotation_speed(), 5);
        // (25 + 12.5) * 0.8
        assert!((fan.noise_level() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_auto_mode_follows_time_of_day() {
        let (mut fan, clock) = at(datetime!(2024-06-01 08:00 UTC));
        fan.set_auto_mode(true);
        assert!(fan.is_auto_mode());
        assert_eq!(fan.airflow_mode(), AirflowMode::Exhaust);
        assert_eq!(fan.rotation_speed(), 7);

        clock.advance(Duration::hours(15));
        fan.run(10);
        assert!(fan.is_night_mode());
        assert_eq!(fan.rotation_speed(), 3);
        assert_eq!(fan.airflow_mode(), AirflowMode::Circulation);

        clock.advance(Duration::hours(14));
        fan.run(10);
        assert!(!fan.is_night_mode());
        assert_eq!(fan.rotation_speed(), 5);

        assert!(fan.set_rotation_speed(2));
        assert!(!fan.is_auto_mode(), "manual speed leaves auto mode");
    }

    #[test]
    fn test_start_auto() {
        let (mut fan, _clock) = at(datetime!(2024-06-01 13:00 UTC));
        fan.turn_off();
        assert!(fan.start_ventilation("auto"));
        assert!(fan.is_auto_mode());
        assert_eq!(fan.rotation_speed(), 5);
    }

    #[test]
    fn test_timer_switches_off() {
        let mut fan = ventilator();
        assert!(!fan.set_timer(481));
        assert!(fan.set_timer(90));
        fan.turn_on();
        fan.run(60);
        assert!(fan.is_on());
        assert_eq!(fan.timer_minutes(), 30);
        fan.run(60);
        assert!(!fan.is_on());
        assert_eq!(fan.timer_minutes(), 0);
        assert_eq!(fan.operating_hours(), 1);

        fan.run(60);
        assert_eq!(fan.operating_hours(), 1, "no running while off");
    }

    #[test]
    fn test_efficiency_wears_to_floor() {
        let mut fan = ventilator();
        fan.turn_on();
        fan.run(100 * 60);
        assert_eq!(fan.ventilation_efficiency(), 84.0);
        fan.run(3000 * 60);
        assert_eq!(fan.ventilation_efficiency(), 70.0);

        assert!(!fan.update_ventilation_efficiency(100.1));
        assert!(fan.update_ventilation_efficiency(92.0));
        assert_eq!(fan.ventilation_efficiency(), 92.0);
    }

    #[test]
    fn test_efficiency_score() {
        let mut fan = ventilator();
        fan.turn_on();
        // +0.5 for 85% efficiency, -0.5 for 68.85 m³/h over 48 W
        assert!((fan.efficiency_score() - 3.0).abs() < 1e-9);
        fan.set_night_mode(true);
        assert!((fan.efficiency_score() - 3.2).abs() < 1e-9);
        assert!(fan.update_ventilation_efficiency(10.0));
        assert!((1.0..=5.0).contains(&fan.efficiency_score()));
    }

    #[test]
    fn test_direction_controls() {
        let mut fan = ventilator();
        fan.turn_on();
        fan.set_rotation_direction(false);
        fan.set_auto_direction_change(true);
        assert!(!fan.is_clockwise());
        assert!(fan.is_auto_direction_change());
        assert!(!fan.set_direction_change_period(4));
        assert!(!fan.set_direction_change_period(121));
        assert!(fan.set_direction_change_period(45));
        assert_eq!(fan.direction_change_period(), 45);
    }
}
