//! Volume and mute management.
//!
//! The device output level is the single source of truth: every read of the
//! published `volume` / `is_muted` pair is re-derived from
//! [`SystemVolume::output_level`], so the controller can never drift from
//! what is actually audible.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::events::ControlEventBus;
use crate::model::ControlEvent;
use crate::services::SystemVolume;

/// Number of rocker presses it takes to go from silent to max volume.
pub const MAX_VOLUME_BUTTON_PRESSES: f32 = 16.0;

/// Default increment applied by [`VolumeController::increase_step`].
pub const DEFAULT_VOLUME_STEP: UnitLevel = UnitLevel(1.0 / MAX_VOLUME_BUTTON_PRESSES);

/// A fraction in `[0, 1]`.
///
/// [`UnitLevel::new`] is the only way in and always clamps; `NaN` maps to `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize)]
pub struct UnitLevel(f32);

impl UnitLevel {
    pub const ZERO: UnitLevel = UnitLevel(0.0);
    pub const MAX: UnitLevel = UnitLevel(1.0);

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        UnitLevel(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl From<f32> for UnitLevel {
    fn from(value: f32) -> Self {
        UnitLevel::new(value)
    }
}

impl From<UnitLevel> for f32 {
    fn from(level: UnitLevel) -> Self {
        level.0
    }
}

impl fmt::Display for UnitLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// Owns the mute flag and the pre-mute level, publishes `volume` / `is_muted`.
pub struct VolumeController {
    device: Arc<dyn SystemVolume>,
    step: UnitLevel,
    volume: UnitLevel,
    is_muted: bool,
    /// Level captured when muting; only meaningful while muted.
    pre_mute_level: UnitLevel,
    published_mute: bool,
    events: ControlEventBus,
}

impl VolumeController {
    pub fn new(device: Arc<dyn SystemVolume>, events: ControlEventBus) -> Self {
        let mut controller = Self {
            device,
            step: DEFAULT_VOLUME_STEP,
            volume: UnitLevel::ZERO,
            is_muted: false,
            pre_mute_level: UnitLevel::ZERO,
            published_mute: false,
            events,
        };
        controller.volume = controller.read_device_level();
        controller
    }

    pub fn with_step(mut self, step: UnitLevel) -> Self {
        self.step = step;
        self
    }

    /// Published volume, `0` while muted.
    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn step(&self) -> UnitLevel {
        self.step
    }

    /// Sets the device level.
    ///
    /// `value` is clamped to `[0, 1]`. Any non-zero level unmutes; the level
    /// saved at mute time is discarded.
    pub fn set_volume(&mut self, value: f32) {
        let level = UnitLevel::new(value);
        if !level.is_zero() && self.is_muted {
            debug!(level = %level, "Setting a non-zero volume unmutes");
            self.is_muted = false;
        }
        self.apply_device_level(level);
        self.publish();
    }

    /// Adds `amount` (clamped to `[0, 1]`) to the current level.
    pub fn increase(&mut self, amount: f32) {
        let amount = UnitLevel::new(amount);
        let current = self.read_device_level();
        self.set_volume(current.get() + amount.get());
    }

    /// Subtracts `amount` (clamped to `[0, 1]`) from the current level.
    pub fn decrease(&mut self, amount: f32) {
        let amount = UnitLevel::new(amount);
        let current = self.read_device_level();
        self.set_volume(current.get() - amount.get());
    }

    /// One rocker press up.
    pub fn increase_step(&mut self) {
        self.increase(self.step.get());
    }

    /// One rocker press down.
    pub fn decrease_step(&mut self) {
        self.decrease(self.step.get());
    }

    /// Mutes (saving the current level) or unmutes (restoring it).
    ///
    /// Setting the flag to its current value does nothing.
    pub fn set_muted(&mut self, muted: bool) {
        if muted == self.is_muted {
            return;
        }

        if muted {
            self.pre_mute_level = self.read_device_level();
            self.is_muted = true;
            self.apply_device_level(UnitLevel::ZERO);
        } else {
            self.is_muted = false;
            self.apply_device_level(self.pre_mute_level);
        }
        self.publish();
    }

    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.is_muted);
    }

    /// Re-derives the published pair from the device.
    pub fn refresh(&mut self) {
        self.publish();
    }

    fn read_device_level(&self) -> UnitLevel {
        match self.device.output_level() {
            Some(level) => UnitLevel::new(level),
            None => {
                warn!("System volume control unavailable, reading level as 0");
                UnitLevel::ZERO
            }
        }
    }

    fn apply_device_level(&self, level: UnitLevel) {
        if let Err(e) = self.device.set_output_level(level.get()) {
            warn!("Failed to set system volume to {}: {}", level, e);
        }
    }

    fn publish(&mut self) {
        let level = self.read_device_level();

        // Un niveau non nul alors que l'on est muet : le volume a été remonté
        // hors du contrôleur (boutons physiques, autre app).
        if self.is_muted && !level.is_zero() {
            debug!(level = %level, "Device level raised while muted, clearing mute flag");
            self.is_muted = false;
        }

        let published = if self.is_muted { UnitLevel::ZERO } else { level };

        if published != self.volume {
            self.volume = published;
            self.events.broadcast(ControlEvent::VolumeChanged {
                volume: published.get(),
            });
        }
        if self.published_mute != self.is_muted {
            self.published_mute = self.is_muted;
            self.events.broadcast(ControlEvent::MuteChanged {
                muted: self.is_muted,
            });
        }
    }
}
