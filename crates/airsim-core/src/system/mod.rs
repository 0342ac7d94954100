//! Air systems: the shared base and the five concrete systems.
//!
//! Every system owns a [`BaseAirSystem`] with the state common to all of them
//! (rooms, composition, quality, ventilation, events) and adds its own
//! pollutant model on top. The shared contract lives in [`AirControl`].
//!
//! One update cycle runs, in order: activity detection, composition
//! recomputation, pollutant growth and decay, quality classification,
//! automatic responses, and label propagation to rooms. A cycle never
//! re-enters itself; mode activations only set state for the current pass.

mod bathroom;
mod bedroom;
mod home;
mod kitchen;
mod living_room;

pub use bathroom::{BATHROOM_ACH_RANGE, BathroomAir, TARGET_HUMIDITY_RANGE};
pub use bedroom::{BEDROOM_ACH_RANGE, BedroomAir, SleepSchedule, parse_hhmm};
pub use home::{DEFAULT_FILTER_EFFICIENCY, HOME_ACH_RANGE, HomeAirSystem};
pub use kitchen::{KITCHEN_ACH_RANGE, KitchenAir};
pub use living_room::{LIVING_ROOM_ACH_RANGE, LivingRoomAir, MAX_ACTIVE_ELECTRONICS};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use airsim_types::{AirComposition, QualityLevel};

use crate::air_system::AirSystemKind;
use crate::capability::{Breathable, Filtration, Ventilation};
use crate::clock::Clock;
use crate::events::{ActivityMode, AirEvent, EventLog};
use crate::room::SharedRoom;
use crate::status::SystemStatus;
use crate::ventilation::{VentilationMode, VentilationState};

/// State shared by every air system.
pub struct BaseAirSystem {
    rooms: Vec<SharedRoom>,
    composition: AirComposition,
    quality: QualityLevel,
    ventilation: VentilationState,
    filter_engaged: bool,
    auto_ventilation: bool,
    cycles: u64,
    events: EventLog,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for BaseAirSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rooms: Vec<&str> = self.rooms.iter().map(|r| r.name()).collect();
        f.debug_struct("BaseAirSystem")
            .field("rooms", &rooms)
            .field("composition", &self.composition)
            .field("quality", &self.quality)
            .field("ventilation", &self.ventilation)
            .field("filter_engaged", &self.filter_engaged)
            .field("auto_ventilation", &self.auto_ventilation)
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}

impl BaseAirSystem {
    pub(crate) fn new(
        composition: AirComposition,
        ventilation: VentilationState,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms: Vec::new(),
            composition,
            quality: QualityLevel::Good,
            ventilation,
            filter_engaged: true,
            auto_ventilation: true,
            cycles: 0,
            events: EventLog::default(),
            clock,
        }
    }

    pub fn rooms(&self) -> &[SharedRoom] {
        &self.rooms
    }

    pub fn composition(&self) -> AirComposition {
        self.composition
    }

    pub fn quality(&self) -> QualityLevel {
        self.quality
    }

    pub fn ventilation(&self) -> &VentilationState {
        &self.ventilation
    }

    /// Number of completed `circulate_air` calls.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn auto_ventilation(&self) -> bool {
        self.auto_ventilation
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<AirEvent> {
        self.events.drain()
    }

    pub fn occupied_count(&self) -> usize {
        self.rooms.iter().filter(|r| r.is_occupied()).count()
    }

    /// Mean room temperature, or `None` without rooms.
    pub fn average_temperature(&self) -> Option<f64> {
        if self.rooms.is_empty() {
            return None;
        }
        let total: f64 = self.rooms.iter().map(|r| r.temperature()).sum();
        Some(total / self.rooms.len() as f64)
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub(crate) fn is_ventilating(&self) -> bool {
        self.ventilation.is_active()
    }

    pub(crate) fn mode(&self) -> VentilationMode {
        self.ventilation.mode()
    }

    pub(crate) fn rate(&self) -> f64 {
        self.ventilation.air_change_rate()
    }

    pub(crate) fn filter_engaged(&self) -> bool {
        self.filter_engaged
    }

    /// Returns whether the engagement changed.
    pub(crate) fn set_filter_engaged(&mut self, engaged: bool) -> bool {
        std::mem::replace(&mut self.filter_engaged, engaged) != engaged
    }

    pub(crate) fn set_auto_ventilation(&mut self, enabled: bool) {
        self.auto_ventilation = enabled;
    }

    pub(crate) fn attach(&mut self, room: SharedRoom) -> bool {
        if self.rooms.iter().any(|r| Arc::ptr_eq(r, &room)) {
            return false;
        }
        debug!(room = room.name(), "room added");
        self.events.push(AirEvent::RoomAdded {
            name: room.name().to_string(),
        });
        self.rooms.push(room);
        true
    }

    pub(crate) fn detach(&mut self, room: &SharedRoom) -> bool {
        let Some(index) = self.rooms.iter().position(|r| Arc::ptr_eq(r, room)) else {
            return false;
        };
        let removed = self.rooms.remove(index);
        debug!(room = removed.name(), "room removed");
        self.events.push(AirEvent::RoomRemoved {
            name: removed.name().to_string(),
        });
        true
    }

    pub(crate) fn tick(&mut self) {
        self.cycles += 1;
    }

    pub(crate) fn start_ventilation(&mut self, mode: VentilationMode, rate: f64) -> bool {
        if !self.ventilation.start(mode, rate) {
            return false;
        }
        info!(%mode, rate = self.ventilation.air_change_rate(), "ventilation started");
        self.events.push(AirEvent::VentilationStarted {
            mode,
            air_change_rate: self.ventilation.air_change_rate(),
        });
        true
    }

    pub(crate) fn stop_ventilation(&mut self) -> bool {
        if !self.ventilation.stop() {
            return false;
        }
        info!("ventilation stopped");
        self.events.push(AirEvent::VentilationStopped);
        true
    }

    /// Switch to `mode` regardless of the current ventilation state.
    pub(crate) fn force_ventilation(&mut self, mode: VentilationMode, rate: f64, reason: &str) {
        let already = self.ventilation.is_active() && self.ventilation.mode() == mode;
        self.ventilation.force(mode, rate);
        if !already {
            warn!(%mode, reason, "forcing ventilation");
            self.events.push(AirEvent::EmergencyVentilation {
                reason: reason.to_string(),
            });
        }
    }

    pub(crate) fn set_rate(&mut self, rate: f64) -> bool {
        let accepted = self.ventilation.set_rate(rate);
        if !accepted {
            debug!(rate, range = %self.ventilation.range(), "air change rate rejected");
        }
        accepted
    }

    pub(crate) fn set_quality(&mut self, quality: QualityLevel) {
        if quality != self.quality {
            debug!(from = %self.quality, to = %quality, "quality changed");
            self.events.push(AirEvent::QualityChanged {
                from: self.quality,
                to: quality,
            });
            self.quality = quality;
        }
    }

    pub(crate) fn set_composition(&mut self, composition: AirComposition) {
        self.composition = composition;
    }

    pub(crate) fn record_mode(&mut self, mode: ActivityMode, active: bool) {
        info!(?mode, active, "activity mode changed");
        self.events.push(AirEvent::ModeChanged { mode, active });
    }

    /// Write the current label to every room.
    pub(crate) fn propagate_quality(&self) {
        let label = self.quality.label();
        for room in &self.rooms {
            room.set_air_quality(label);
        }
    }
}

/// Where an activity mode's current state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeSource {
    #[default]
    Off,
    /// Switched on by detection; detection also switches it off.
    Auto,
    /// Held on by an explicit activation until released.
    Manual,
}

/// Off/Auto/Manual state machine behind cooking, shower and sleep modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ActivityState {
    source: ModeSource,
}

/// Transition produced by [`ActivityState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Activated,
    Deactivated,
}

impl ActivityState {
    pub(crate) fn is_active(&self) -> bool {
        self.source != ModeSource::Off
    }

    pub(crate) fn source(&self) -> ModeSource {
        self.source
    }

    /// Feed a detection result. Manual holds ignore detection.
    pub(crate) fn detect(&mut self, detected: bool) -> Option<Transition> {
        match (self.source, detected) {
            (ModeSource::Off, true) => {
                self.source = ModeSource::Auto;
                Some(Transition::Activated)
            }
            (ModeSource::Auto, false) => {
                self.source = ModeSource::Off;
                Some(Transition::Deactivated)
            }
            _ => None,
        }
    }

    /// Hold the mode on. Returns `Activated` if it was off.
    pub(crate) fn hold(&mut self) -> Option<Transition> {
        let was_active = self.is_active();
        self.source = ModeSource::Manual;
        (!was_active).then_some(Transition::Activated)
    }

    /// Switch the mode off. Returns `Deactivated` if it was on.
    pub(crate) fn release(&mut self) -> Option<Transition> {
        let was_active = self.is_active();
        self.source = ModeSource::Off;
        was_active.then_some(Transition::Deactivated)
    }

    /// Drop a manual hold, keeping the mode on until detection decides.
    pub(crate) fn resume_auto(&mut self) {
        if self.source == ModeSource::Manual {
            self.source = ModeSource::Auto;
        }
    }
}

/// Clamp into `[min, max]`, mapping NaN to `min`.
pub(crate) fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}

/// The contract every air system implements.
///
/// Required methods give access to the shared base and the system-specific
/// update; everything else is provided.
pub trait AirControl: Ventilation + Filtration + Breathable {
    fn kind(&self) -> AirSystemKind;

    fn base(&self) -> &BaseAirSystem;

    fn base_mut(&mut self) -> &mut BaseAirSystem;

    /// Recompute composition, quality and pollutants from current state.
    ///
    /// With no rooms registered the quality resets to good and the
    /// composition is left as it is.
    fn update_air_composition(&mut self);

    /// Structured snapshot of the system.
    fn status(&self) -> SystemStatus;

    /// Register a room. Returns false if this handle is already registered.
    fn add_room(&mut self, room: SharedRoom) -> bool {
        if !self.base_mut().attach(room) {
            return false;
        }
        self.update_air_composition();
        true
    }

    /// Unregister a room. Returns false if it was not registered.
    fn remove_room(&mut self, room: &SharedRoom) -> bool {
        if !self.base_mut().detach(room) {
            return false;
        }
        self.update_air_composition();
        true
    }

    /// Run one full update cycle.
    fn circulate_air(&mut self) {
        self.base_mut().tick();
        self.update_air_composition();
    }

    fn quality_level(&self) -> QualityLevel {
        self.base().quality()
    }

    fn rooms(&self) -> &[SharedRoom] {
        self.base().rooms()
    }

    /// Enable or disable routine automatic ventilation.
    ///
    /// Safety interlocks (gas leak, emergency dehumidification) keep
    /// running either way.
    fn set_auto_ventilation(&mut self, enabled: bool) {
        self.base_mut().set_auto_ventilation(enabled);
    }

    fn auto_ventilation(&self) -> bool {
        self.base().auto_ventilation()
    }

    fn drain_events(&mut self) -> Vec<AirEvent> {
        self.base_mut().drain_events()
    }
}
