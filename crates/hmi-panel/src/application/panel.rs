//! PanelController: input capture for one virtual panel.
//!
//! The controller receives raw input from a presentation binding (a key went
//! down, a finger moved) and turns it into relayed events:
//!
//! ```text
//! on_press(key_id) ─► identify ─► de-duplicate ─► classify
//!                         ─► modifier / lock transition
//!                         ─► resolve logical key (layout, NumLock)
//!                         ─► echo buffer ─► EventRelay ─► EventSink
//!                         ─► start key repeat
//! ```
//!
//! Key combos and simulated gestures are scripts: timed sequences that play
//! back through the same press/release and touch paths as operator input.
//!
//! # Time
//!
//! Methods that start or fire repeat timers or scripts take `now: Instant`
//! instead of reading the clock, so tests can drive the controller with a
//! fake clock.
//! Event timestamps and activity counters use the wall clock.
//!
//! # Errors
//!
//! Nothing here returns an error.  Unknown keys are ignored with a `debug!`
//! line, relay failures are logged by [`EventRelay`], and the panel stays
//! interactive.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use hmi_core::domain::TouchContact;
use hmi_core::keymap::numpad::is_numpad_printable;
use hmi_core::keymap::{resolve_numpad, LockKey, Modifier, NumpadOutput};
use hmi_core::{
    classify, current_timestamp_ms, decode_backend_message, ActivityCounters, BackendMessage,
    DiagnosticsLog, DiagnosticsSnapshot, InputEvent, KeyAction, KeyClass, KeyCode,
    KeyboardLayout, Keymap, ModifierLockState, ModifierSnapshot, PressedKeySet, RelayEvent,
    RepeatScheduler, TouchEvent, TouchPhase,
};
use hmi_core::script::{
    Gesture, KeyCombo, ScriptAction, ScriptPlayer, TouchStep, GESTURE_PRESSURE,
};
use hmi_core::domain::{EchoBuffer, TouchTracker, MOUSE_TOUCH_ID};
use tracing::{debug, info, warn};

use super::observer::{PanelObserver, PanelStats};
use super::relay::{EventRelay, EventSink, RelayOutcome};
use crate::domain::{ConnectionState, PanelConfig, PanelKind};

/// Owns all input state of one panel.
pub struct PanelController {
    kind: PanelKind,
    device_id: String,
    target: String,
    keymap: Keymap,
    layout: KeyboardLayout,
    state: ModifierLockState,
    pressed: PressedKeySet,
    repeats: RepeatScheduler,
    repeat_enabled: bool,
    repeat_interval: Duration,
    scripts: ScriptPlayer,
    surface_center: (f64, f64),
    echo: EchoBuffer,
    touches: TouchTracker,
    relay: EventRelay,
    log: DiagnosticsLog,
    counters: ActivityCounters,
    started_at: Instant,
    observer: Box<dyn PanelObserver>,
}

impl PanelController {
    /// Creates a controller with fresh state: no keys down, no modifiers,
    /// NumLock on, empty echo buffer.
    pub fn new(config: &PanelConfig, observer: Box<dyn PanelObserver>, now: Instant) -> Self {
        let kind = config.panel;
        let mut controller = Self {
            kind,
            device_id: config.device_id().to_string(),
            target: config.target.clone(),
            keymap: Keymap::new(kind.legend_block()),
            layout: config.layout,
            state: ModifierLockState::new(),
            pressed: PressedKeySet::new(),
            repeats: RepeatScheduler::new(),
            repeat_enabled: config.key_repeat_enabled,
            repeat_interval: config.repeat_interval(),
            scripts: ScriptPlayer::new(),
            surface_center: config.surface_center(),
            echo: EchoBuffer::new(),
            touches: TouchTracker::new(
                config.multi_touch,
                config.pressure_sensitive,
                config.sensitivity,
            ),
            relay: EventRelay::new(kind.schema()),
            log: DiagnosticsLog::new(config.log_capacity),
            counters: ActivityCounters::default(),
            started_at: now,
            observer,
        };
        controller
            .log
            .append(format!("HMI {kind} panel initialized ({})", controller.device_id));
        controller
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    /// Handles a key-down from any input surface.
    ///
    /// `key_id` is an on-screen legend or key name; `code` is the physical
    /// key identifier when the input came from a hardware keyboard, and wins
    /// when both are known.  Returns `false` when the press was ignored
    /// (unknown key, or the key is already down).
    pub fn on_press(
        &mut self,
        key_id: &str,
        code: Option<&str>,
        sink: &mut dyn EventSink,
        now: Instant,
    ) -> bool {
        if self.kind == PanelKind::Touchpad {
            debug!(key_id, "touchpad panel has no keys");
            return false;
        }
        let Some(key) = self.identify(key_id, code) else {
            return false;
        };
        if !self.pressed.insert(key) {
            debug!(%key, "ignoring key-down for a key that is already down");
            return false;
        }

        let class = classify(key);
        match class {
            KeyClass::Modifier(_) => {
                self.state.apply_modifier_transition(key, true);
                self.observer.modifiers_changed(self.state.snapshot());
            }
            KeyClass::Lock(lock) => {
                let on = self.state.apply_lock_toggle(lock);
                let verb = if on { "activated" } else { "deactivated" };
                self.log.append(format!("{} {verb}", lock_name(lock)));
                self.observer.modifiers_changed(self.state.snapshot());
            }
            _ => {}
        }

        let logical = self.logical_key(key, class);
        self.pressed.record_label(key, logical.as_str());
        self.apply_echo(key, class, &logical, sink);
        self.emit_key(key, logical, KeyAction::Press, sink);
        self.counters.record_key_press(Utc::now());

        // A press that was dropped must not keep producing dropped repeats.
        if self.repeat_enabled && class.is_repeatable(key) && sink.state().is_connected() {
            self.repeats.start(key, self.repeat_interval, now);
        }
        self.observer.key_highlight(key.as_str(), true);
        true
    }

    /// Handles a key-up.
    ///
    /// Any repeat timer for the key is cancelled before the release is
    /// relayed.  The release carries the same logical key as its press, even
    /// if NumLock or a modifier changed while the key was held.  Returns
    /// `false` when the key was not down.
    pub fn on_release(&mut self, key_id: &str, code: Option<&str>, sink: &mut dyn EventSink) -> bool {
        let Some(key) = self.identify(key_id, code) else {
            return false;
        };
        self.repeats.stop(key);
        let Some(label) = self.pressed.take(key) else {
            debug!(%key, "ignoring key-up for a key that is not down");
            return false;
        };

        let class = classify(key);
        if self.state.apply_modifier_transition(key, false).is_some() {
            self.observer.modifiers_changed(self.state.snapshot());
        }

        let logical = label.unwrap_or_else(|| self.logical_key(key, class));
        self.emit_key(key, logical, KeyAction::Release, sink);
        self.counters.touch(Utc::now());
        self.observer.key_highlight(key.as_str(), false);
        true
    }

    /// Fires every repeat timer that is due at `now`.  Returns how many
    /// repeat events were emitted.
    ///
    /// Repeats are resolved against the current modifier state and count as
    /// key presses, exactly like real presses.  Without a connection every
    /// repeat is cancelled instead.
    pub fn on_repeat_due(&mut self, sink: &mut dyn EventSink, now: Instant) -> usize {
        if !sink.state().is_connected() {
            let stopped = self.repeats.stop_all();
            if stopped > 0 {
                debug!(stopped, "cancelled key repeats without a connection");
            }
            return 0;
        }
        let due = self.repeats.due(now);
        for &key in &due {
            let class = classify(key);
            let logical = self.logical_key(key, class);
            self.apply_echo(key, class, &logical, sink);
            self.emit_key(key, logical, KeyAction::Repeat, sink);
            self.counters.record_key_press(Utc::now());
        }
        due.len()
    }

    /// When the next repeat tick is due, if any key repeats.
    pub fn next_repeat_deadline(&self) -> Option<Instant> {
        self.repeats.next_deadline()
    }

    /// Earliest repeat tick or script step, whichever comes first.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.scripts.next_deadline(), self.repeats.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Plays due script steps, then fires due repeats.  Returns how many
    /// steps and repeats ran.
    pub fn on_deadline(&mut self, sink: &mut dyn EventSink, now: Instant) -> usize {
        self.on_script_due(sink, now) + self.on_repeat_due(sink, now)
    }

    fn identify(&self, key_id: &str, code: Option<&str>) -> Option<KeyCode> {
        if let Some(key) = code.and_then(KeyCode::from_code) {
            return Some(key);
        }
        match self.keymap.identify(key_id) {
            Ok(key) => Some(key),
            Err(e) => {
                debug!(key_id, error = %e, "ignoring unclassified key");
                None
            }
        }
    }

    /// The `key` value relayed for `code` under the current state.
    fn logical_key(&self, code: KeyCode, class: KeyClass) -> String {
        let snapshot = self.state.snapshot();
        match class {
            KeyClass::Character => self
                .layout
                .resolve_char(code, &snapshot)
                .map(String::from)
                .unwrap_or_else(|| code.as_str().to_string()),
            KeyClass::Numpad => match resolve_numpad(code, snapshot.locks.num_lock) {
                Some(NumpadOutput::Char(ch)) => ch.to_string(),
                Some(NumpadOutput::Navigation(nav)) => nav.as_str().to_string(),
                _ => code.as_str().to_string(),
            },
            KeyClass::Modifier(modifier) => modifier_key_name(modifier).to_string(),
            KeyClass::Lock(_) | KeyClass::Special => match code {
                KeyCode::NumpadEnter => "Enter".to_string(),
                _ => code.as_str().to_string(),
            },
        }
    }

    fn emit_key(
        &mut self,
        code: KeyCode,
        logical: String,
        action: KeyAction,
        sink: &mut dyn EventSink,
    ) -> RelayOutcome {
        let event = InputEvent::key(
            self.device_id.as_str(),
            self.target.as_str(),
            logical,
            Some(code.as_str().to_string()),
            action,
            self.state.snapshot(),
            current_timestamp_ms(),
        );
        self.relay.emit(&RelayEvent::Key(event), sink, &mut self.log)
    }

    // ── Echo buffer ───────────────────────────────────────────────────────────

    fn apply_echo(
        &mut self,
        code: KeyCode,
        class: KeyClass,
        logical: &str,
        sink: &mut dyn EventSink,
    ) {
        let changed = match self.kind {
            PanelKind::Touchpad => false,
            PanelKind::Keyboard => self.keyboard_echo(code, class, logical),
            PanelKind::Numpad => match code {
                KeyCode::Enter | KeyCode::NumpadEnter => {
                    self.submit_text(sink);
                    false
                }
                KeyCode::Backspace => self.echo.backspace(),
                _ => match single_char(logical) {
                    Some(ch) if class == KeyClass::Numpad && is_numpad_printable(ch) => {
                        self.echo.insert(ch);
                        true
                    }
                    _ => false,
                },
            },
        };
        if changed {
            self.notify_echo();
        }
    }

    fn keyboard_echo(&mut self, code: KeyCode, class: KeyClass, logical: &str) -> bool {
        let held = self.state.snapshot().modifiers;
        match class {
            KeyClass::Character => {
                // Shortcuts such as Ctrl+C do not type.
                if held.ctrl || held.alt || held.meta {
                    return false;
                }
                match single_char(logical) {
                    Some(ch) => {
                        self.echo.insert(ch);
                        true
                    }
                    None => false,
                }
            }
            KeyClass::Numpad => match resolve_numpad(code, self.state.lock(LockKey::Num)) {
                Some(NumpadOutput::Char(ch)) => {
                    self.echo.insert(ch);
                    true
                }
                Some(NumpadOutput::Navigation(nav)) => {
                    nav.as_key_code().is_some_and(|nav| self.edit_echo(nav))
                }
                _ => false,
            },
            _ => self.edit_echo(code),
        }
    }

    fn edit_echo(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Enter | KeyCode::NumpadEnter => self.echo.insert('\n'),
            KeyCode::Tab => self.echo.insert('\t'),
            KeyCode::Backspace => return self.echo.backspace(),
            KeyCode::Delete => return self.echo.delete(),
            KeyCode::ArrowLeft => self.echo.move_left(),
            KeyCode::ArrowRight => self.echo.move_right(),
            KeyCode::Home => self.echo.home(),
            KeyCode::End => self.echo.end(),
            _ => return false,
        }
        true
    }

    fn notify_echo(&mut self) {
        let text = self.echo.text();
        self.observer.echo_changed(&text, self.echo.cursor());
    }

    /// Sends the echo buffer as one text-input event and clears it.
    ///
    /// Does nothing when the buffer is empty.  Returns `true` when the text
    /// was handed to the connection.
    pub fn submit_text(&mut self, sink: &mut dyn EventSink) -> bool {
        if self.echo.is_empty() {
            debug!("nothing to submit");
            return false;
        }
        let text = self.echo.take();
        self.notify_echo();
        self.send_text(&text, sink)
    }

    /// Sends arbitrary text as one text-input event.
    pub fn send_text(&mut self, text: &str, sink: &mut dyn EventSink) -> bool {
        if text.is_empty() {
            return false;
        }
        let event = InputEvent::text(
            self.device_id.as_str(),
            self.target.as_str(),
            text,
            self.state.snapshot(),
            current_timestamp_ms(),
        );
        if self.relay.emit(&RelayEvent::Key(event), sink, &mut self.log) != RelayOutcome::Sent {
            return false;
        }
        self.counters.record_command(Utc::now());
        self.log
            .append(format!("Input sent to {}: \"{text}\"", self.target));
        true
    }

    /// Empties the echo buffer without sending it.
    pub fn clear_input(&mut self) {
        self.echo.clear();
        self.log.append("Input buffer cleared");
        self.notify_echo();
    }

    // ── Touch ─────────────────────────────────────────────────────────────────

    /// A finger or the pointer went down at raw position (`x`, `y`).
    pub fn touch_start(
        &mut self,
        touch_id: &str,
        x: f64,
        y: f64,
        force: Option<f64>,
        sink: &mut dyn EventSink,
        now: Instant,
    ) -> bool {
        if !self.accepts_touch() {
            return false;
        }
        let Some(contact) = self.touches.start(touch_id, x, y, force, now) else {
            debug!(touch_id, "multi-touch disabled, ignoring additional contact");
            return false;
        };
        let line = if touch_id == MOUSE_TOUCH_ID {
            format!("Mouse Down: ({:.0}, {:.0})", contact.x, contact.y)
        } else {
            format!(
                "Touch Start: ({:.0}, {:.0}) P:{:.2}",
                contact.x, contact.y, contact.pressure
            )
        };
        self.log.append(line);
        self.emit_touch(&contact, TouchPhase::Start, sink);
        self.observer.touch_updated(&contact, true);
        true
    }

    /// A known contact moved.  Unknown identifiers are ignored.
    pub fn touch_move(
        &mut self,
        touch_id: &str,
        x: f64,
        y: f64,
        force: Option<f64>,
        sink: &mut dyn EventSink,
    ) -> bool {
        if !self.accepts_touch() {
            return false;
        }
        let Some(contact) = self.touches.update(touch_id, x, y, force) else {
            return false;
        };
        self.emit_touch(&contact, TouchPhase::Move, sink);
        self.observer.touch_updated(&contact, true);
        true
    }

    /// A known contact lifted.  The end event carries its last position.
    pub fn touch_end(&mut self, touch_id: &str, sink: &mut dyn EventSink, now: Instant) -> bool {
        if !self.accepts_touch() {
            return false;
        }
        let Some((contact, held)) = self.touches.end(touch_id, now) else {
            return false;
        };
        let line = if touch_id == MOUSE_TOUCH_ID {
            format!("Mouse Up: ({:.0}, {:.0})", contact.x, contact.y)
        } else {
            format!(
                "Touch End: ({:.0}, {:.0}) Duration:{}ms",
                contact.x,
                contact.y,
                held.as_millis()
            )
        };
        self.log.append(line);
        self.emit_touch(&contact, TouchPhase::End, sink);
        self.observer.touch_updated(&contact, false);
        true
    }

    fn accepts_touch(&self) -> bool {
        if self.kind != PanelKind::Touchpad {
            debug!(panel = %self.kind, "ignoring touch input on a key panel");
            return false;
        }
        true
    }

    fn emit_touch(&mut self, contact: &TouchContact, phase: TouchPhase, sink: &mut dyn EventSink) {
        let event = TouchEvent {
            device_id: self.device_id.clone(),
            touch_id: contact.touch_id.clone(),
            phase,
            x: contact.x,
            y: contact.y,
            pressure: contact.pressure,
            timestamp: current_timestamp_ms(),
        };
        self.relay.emit(&RelayEvent::Touch(event), sink, &mut self.log);
        self.counters.touch(Utc::now());
    }

    // ── Scripts ───────────────────────────────────────────────────────────────

    /// Plays a key combo on the keyboard panel.
    ///
    /// The first key goes down immediately; the rest of the sequence is
    /// played by [`Self::on_script_due`].  Returns `false` on other panels.
    pub fn send_combo(&mut self, combo: KeyCombo, sink: &mut dyn EventSink, now: Instant) -> bool {
        if self.kind != PanelKind::Keyboard {
            debug!(panel = %self.kind, %combo, "key combos are only available on the keyboard");
            return false;
        }
        self.scripts.start(combo.steps(), now);
        self.log
            .append(format!("Key combo sent: {}", combo.describe()));
        self.on_script_due(sink, now);
        true
    }

    /// Simulates a touch gesture around the centre of the surface.
    ///
    /// Returns `false` on key panels.
    pub fn simulate_gesture(
        &mut self,
        gesture: Gesture,
        sink: &mut dyn EventSink,
        now: Instant,
    ) -> bool {
        if !self.accepts_touch() {
            return false;
        }
        let (cx, cy) = self.surface_center;
        self.scripts.start(gesture.steps(cx, cy), now);
        self.log.append(gesture.describe(cx, cy));
        self.on_script_due(sink, now);
        true
    }

    /// Plays every script step due at `now`.  Returns how many ran.
    ///
    /// Key steps go through [`Self::on_press`] and [`Self::on_release`], so
    /// modifier state and the pressed-key set stay consistent.
    pub fn on_script_due(&mut self, sink: &mut dyn EventSink, now: Instant) -> usize {
        let due = self.scripts.due(now);
        for action in &due {
            match *action {
                ScriptAction::KeyDown(code) => {
                    self.on_press(code.as_str(), Some(code.as_str()), sink, now);
                }
                ScriptAction::KeyUp(code) => {
                    self.on_release(code.as_str(), Some(code.as_str()), sink);
                }
                ScriptAction::Touch(step) => self.emit_simulated_touch(step, sink),
            }
        }
        due.len()
    }

    /// Script steps still waiting to be played.
    pub fn pending_script_steps(&self) -> usize {
        self.scripts.pending()
    }

    fn emit_simulated_touch(&mut self, step: TouchStep, sink: &mut dyn EventSink) {
        let contact = TouchContact {
            touch_id: step.touch_id.to_string(),
            x: step.x,
            y: step.y,
            pressure: GESTURE_PRESSURE,
        };
        self.emit_touch(&contact, step.phase, sink);
        self.observer
            .touch_updated(&contact, step.phase != TouchPhase::End);
    }

    // ── Connection and backend ────────────────────────────────────────────────

    /// Reacts to a transport state change.  Leaving `Connected` cancels all
    /// key repeats.
    pub fn on_connection_state(&mut self, state: ConnectionState) {
        match state {
            ConnectionState::Connected => self.log.append("WebSocket connection established"),
            ConnectionState::Disconnected => self.log.append("WebSocket connection closed"),
            ConnectionState::Error => self.log.append("WebSocket connection error"),
            ConnectionState::Connecting => debug!("connecting"),
        }
        if !state.is_connected() {
            let stopped = self.repeats.stop_all();
            if stopped > 0 {
                debug!(stopped, "cancelled key repeats on disconnect");
            }
        }
        self.observer.connection_changed(state);
    }

    /// Decodes and logs one text frame from the backend.
    pub fn handle_backend_frame(&mut self, frame: &str) {
        let message = match decode_backend_message(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "could not decode backend message");
                self.log.append(format!("Error parsing message: {e}"));
                return;
            }
        };
        match &message {
            BackendMessage::StatusUpdate {
                mqtt_status,
                target_status,
            } => self.log.append(format!(
                "Status update: MQTT {}, target {}",
                mqtt_status.as_deref().unwrap_or("unknown"),
                target_status.as_deref().unwrap_or("unknown"),
            )),
            BackendMessage::KeyAcknowledged { target, key } => self
                .log
                .append(format!("Key acknowledged by {target}: {key}")),
            BackendMessage::TargetStatus { status } => self
                .log
                .append(format!("Target {} status: {status}", self.target)),
            BackendMessage::Unknown => {
                debug!(frame, "ignoring backend message of unknown type");
                return;
            }
        }
        self.observer.backend_message(&message);
    }

    // ── Runtime controls ──────────────────────────────────────────────────────

    /// Addresses subsequent events to `target`.  Empty names are ignored.
    pub fn set_target(&mut self, target: &str) {
        let target = target.trim();
        if target.is_empty() || target == self.target {
            return;
        }
        self.target = target.to_string();
        self.log.append(format!("Target device changed to: {target}"));
    }

    /// Turns key repeat on or off.  Turning it off stops running repeats.
    pub fn set_key_repeat(&mut self, enabled: bool) {
        self.repeat_enabled = enabled;
        if !enabled {
            self.repeats.stop_all();
        }
        let word = if enabled { "enabled" } else { "disabled" };
        self.log.append(format!("Key repeat {word}"));
    }

    /// Interval for repeats started from now on.
    pub fn set_repeat_interval(&mut self, interval: Duration) {
        self.repeat_interval = interval.max(Duration::from_millis(1));
        self.log.append(format!(
            "Repeat interval set to {} ms",
            self.repeat_interval.as_millis()
        ));
    }

    pub fn set_layout(&mut self, layout: KeyboardLayout) {
        self.layout = layout;
        self.log.append(format!(
            "Layout changed to: {}",
            layout.name().to_ascii_uppercase()
        ));
    }

    // ── Diagnostics ───────────────────────────────────────────────────────────

    pub fn stats(&self, now: Instant) -> PanelStats {
        PanelStats {
            uptime: now.saturating_duration_since(self.started_at),
            keys_pressed: self.counters.keys_pressed,
            commands_sent: self.counters.commands_sent,
            last_activity_age: self.counters.activity_age(Utc::now()),
        }
    }

    /// Pushes the current statistics to the observer.
    pub fn refresh_stats(&mut self, now: Instant) {
        let stats = self.stats(now);
        self.observer.stats_updated(&stats);
    }

    /// Copies the log and counters for export.  Does not modify anything.
    pub fn export_snapshot(&self) -> DiagnosticsSnapshot {
        self.log
            .snapshot(self.kind.name(), &self.counters, Utc::now())
    }

    /// Notes in the log that an export was written.
    pub fn record_export(&mut self, path: &Path) {
        self.log
            .append(format!("Event log exported to {}", path.display()));
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Appends a free-form line to the diagnostics log.
    pub fn log_event(&mut self, message: impl Into<String>) {
        self.log.append(message);
    }

    /// Stops every repeat and script and lifts every contact.
    pub fn shutdown(&mut self) {
        let stopped = self.repeats.stop_all();
        let dropped_steps = self.scripts.clear();
        self.touches.clear();
        info!(stopped, dropped_steps, "panel shutting down");
        self.log.append("Panel shutting down");
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn layout(&self) -> KeyboardLayout {
        self.layout
    }

    pub fn modifier_snapshot(&self) -> ModifierSnapshot {
        self.state.snapshot()
    }

    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(code)
    }

    pub fn is_repeating(&self, code: KeyCode) -> bool {
        self.repeats.is_repeating(code)
    }

    pub fn active_repeats(&self) -> usize {
        self.repeats.active_count()
    }

    pub fn repeat_enabled(&self) -> bool {
        self.repeat_enabled
    }

    pub fn echo_text(&self) -> String {
        self.echo.text()
    }

    pub fn echo_cursor(&self) -> usize {
        self.echo.cursor()
    }

    pub fn active_touches(&self) -> usize {
        self.touches.active_count()
    }

    pub fn log(&self) -> &DiagnosticsLog {
        &self.log
    }

    pub fn counters(&self) -> &ActivityCounters {
        &self.counters
    }

    pub fn relay(&self) -> &EventRelay {
        &self.relay
    }
}

fn lock_name(lock: LockKey) -> &'static str {
    match lock {
        LockKey::Caps => "CapsLock",
        LockKey::Num => "NumLock",
        LockKey::Scroll => "ScrollLock",
    }
}

fn modifier_key_name(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Shift => "Shift",
        Modifier::Ctrl => "Control",
        Modifier::Alt => "Alt",
        Modifier::Meta => "Meta",
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
