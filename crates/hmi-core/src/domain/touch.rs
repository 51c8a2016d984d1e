//! Active touch points for touchpad panels.
//!
//! Each finger (or the mouse pointer) is tracked by its identifier from the
//! moment it goes down until it lifts.  Moves and lifts for identifiers that
//! never went down are ignored.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Identifier used for pointer (mouse) input.
pub const MOUSE_TOUCH_ID: &str = "mouse";

/// Pressure reported when the surface gives none or pressure is disabled.
const DEFAULT_PRESSURE: f64 = 0.5;
/// Fixed pressure for pointer input.
const MOUSE_PRESSURE: f64 = 0.8;

/// Position and pressure of one contact, after sensitivity scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchContact {
    pub touch_id: String,
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
}

#[derive(Debug, Clone)]
struct ActivePoint {
    x: f64,
    y: f64,
    pressure: f64,
    started_at: Instant,
}

/// Tracks the contacts currently on the surface.
#[derive(Debug, Clone)]
pub struct TouchTracker {
    multi_touch: bool,
    pressure_sensitive: bool,
    sensitivity: f64,
    points: HashMap<String, ActivePoint>,
}

impl TouchTracker {
    pub fn new(multi_touch: bool, pressure_sensitive: bool, sensitivity: f64) -> Self {
        Self {
            multi_touch,
            pressure_sensitive,
            sensitivity,
            points: HashMap::new(),
        }
    }

    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.sensitivity = sensitivity;
    }

    pub fn set_multi_touch(&mut self, enabled: bool) {
        self.multi_touch = enabled;
    }

    pub fn set_pressure_sensitive(&mut self, enabled: bool) {
        self.pressure_sensitive = enabled;
    }

    /// Registers a new contact at raw surface position (`x`, `y`).
    ///
    /// Returns `None` when multi-touch is off and another contact is already
    /// down.
    pub fn start(
        &mut self,
        touch_id: &str,
        x: f64,
        y: f64,
        force: Option<f64>,
        now: Instant,
    ) -> Option<TouchContact> {
        if !self.multi_touch && self.points.keys().any(|id| id != touch_id) {
            return None;
        }
        let point = ActivePoint {
            x: x * self.sensitivity,
            y: y * self.sensitivity,
            pressure: self.pressure_for(touch_id, force),
            started_at: now,
        };
        let contact = contact(touch_id, &point);
        self.points.insert(touch_id.to_string(), point);
        Some(contact)
    }

    /// Moves a known contact.  Unknown identifiers yield `None`.
    pub fn update(
        &mut self,
        touch_id: &str,
        x: f64,
        y: f64,
        force: Option<f64>,
    ) -> Option<TouchContact> {
        let pressure = self.pressure_for(touch_id, force);
        let sensitivity = self.sensitivity;
        let point = self.points.get_mut(touch_id)?;
        point.x = x * sensitivity;
        point.y = y * sensitivity;
        point.pressure = pressure;
        Some(contact(touch_id, point))
    }

    /// Lifts a contact at its last known position.  Returns the contact and
    /// how long it was held.
    pub fn end(&mut self, touch_id: &str, now: Instant) -> Option<(TouchContact, Duration)> {
        let point = self.points.remove(touch_id)?;
        let held = now.saturating_duration_since(point.started_at);
        Some((contact(touch_id, &point), held))
    }

    pub fn is_active(&self, touch_id: &str) -> bool {
        self.points.contains_key(touch_id)
    }

    pub fn active_count(&self) -> usize {
        self.points.len()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    fn pressure_for(&self, touch_id: &str, force: Option<f64>) -> f64 {
        if touch_id == MOUSE_TOUCH_ID {
            return MOUSE_PRESSURE;
        }
        if !self.pressure_sensitive {
            return DEFAULT_PRESSURE;
        }
        match force {
            Some(f) if f > 0.0 => f.min(1.0),
            _ => DEFAULT_PRESSURE,
        }
    }
}

fn contact(touch_id: &str, point: &ActivePoint) -> TouchContact {
    TouchContact {
        touch_id: touch_id.to_string(),
        x: point.x,
        y: point.y,
        pressure: point.pressure,
    }
}
