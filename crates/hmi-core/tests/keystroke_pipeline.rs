//! Integration tests for the hmi-core keystroke pipeline.
//!
//! These tests drive the public API the way the panel runtime does: a key
//! identifier is identified, classified, combined with the modifier/lock
//! state, turned into an [`InputEvent`] and encoded for the wire.  They
//! check that the pieces agree with each other, not just in isolation.

use std::time::{Duration, Instant};

use hmi_core::keymap::{classify, resolve_numpad, KeyClass, LockKey, NumpadOutput};
use hmi_core::{
    encode_event, DiagnosticsLog, DiagnosticsSnapshot, InputEvent, KeyAction, KeyCode,
    KeyboardLayout, Keymap, LegendBlock, ModifierLockState, PressedKeySet, RelayEvent,
    RepeatScheduler, WireSchema,
};
use serde_json::Value;

/// Resolves the logical key a keyboard panel would relay for `code`.
fn logical_key(code: KeyCode, state: &ModifierLockState, layout: KeyboardLayout) -> String {
    let snapshot = state.snapshot();
    match classify(code) {
        KeyClass::Character => layout
            .resolve_char(code, &snapshot)
            .map(String::from)
            .unwrap_or_else(|| code.as_str().to_string()),
        KeyClass::Numpad => match resolve_numpad(code, snapshot.locks.num_lock) {
            Some(NumpadOutput::Char(c)) => c.to_string(),
            Some(NumpadOutput::Navigation(nav)) => nav.as_str().to_string(),
            _ => code.as_str().to_string(),
        },
        _ => code.as_str().to_string(),
    }
}

fn encode(key: String, code: KeyCode, state: &ModifierLockState, schema: WireSchema) -> Value {
    let event = InputEvent::key(
        "hmi-numpad",
        "rpi3pc",
        key,
        Some(code.as_str().to_string()),
        KeyAction::Press,
        state.snapshot(),
        1,
    );
    let text = encode_event(&RelayEvent::Key(event), schema).expect("encode must succeed");
    serde_json::from_str(&text).expect("valid JSON")
}

// ── NumLock scenario ──────────────────────────────────────────────────────────

#[test]
fn test_numpad5_types_digit_then_navigation_after_numlock_off() {
    // Arrange
    let keymap = Keymap::new(LegendBlock::Numpad);
    let mut state = ModifierLockState::new();
    let code = keymap.identify("Numpad5").expect("known key");

    // Act: NumLock starts on.
    let with_numlock = encode(
        logical_key(code, &state, KeyboardLayout::Qwerty),
        code,
        &state,
        WireSchema::Numpad,
    );
    state.apply_lock_toggle(LockKey::Num);
    let without_numlock = encode(
        logical_key(code, &state, KeyboardLayout::Qwerty),
        code,
        &state,
        WireSchema::Numpad,
    );

    // Assert
    assert_eq!(with_numlock["key"], "5");
    assert_eq!(with_numlock["numlock"], true);
    assert_eq!(without_numlock["key"], "Clear");
    assert_eq!(without_numlock["numlock"], false);
}

// ── Character resolution ──────────────────────────────────────────────────────

#[test]
fn test_shift_xor_caps_on_every_letter() {
    let keymap = Keymap::default();
    for letter in 'a'..='z' {
        let code = keymap.identify(&letter.to_string()).expect("letter legend");
        for (shift, caps) in [(false, false), (true, false), (false, true), (true, true)] {
            // Arrange
            let mut state = ModifierLockState::new();
            state.apply_modifier_transition(KeyCode::ShiftLeft, shift);
            state.set_lock(LockKey::Caps, caps);

            // Act
            let key = logical_key(code, &state, KeyboardLayout::Qwerty);

            // Assert
            let expected = if shift != caps {
                letter.to_ascii_uppercase()
            } else {
                letter
            };
            assert_eq!(key, expected.to_string(), "shift={shift} caps={caps}");
        }
    }
}

#[test]
fn test_event_keeps_snapshot_taken_at_creation() {
    // Arrange
    let mut state = ModifierLockState::new();
    state.apply_modifier_transition(KeyCode::ShiftLeft, true);
    let event = InputEvent::key(
        "hmi-keyboard",
        "rpi3pc",
        "A",
        Some("KeyA".to_string()),
        KeyAction::Press,
        state.snapshot(),
        1,
    );

    // Act
    state.apply_modifier_transition(KeyCode::ShiftLeft, false);
    let json: Value = serde_json::from_str(
        &encode_event(&RelayEvent::Key(event), WireSchema::Keyboard).expect("encode"),
    )
    .expect("valid JSON");

    // Assert
    assert_eq!(json["modifiers"]["shift"], true);
}

// ── De-duplication and repeat ─────────────────────────────────────────────────

#[test]
fn test_held_key_presses_once_and_repeats_until_release() {
    // Arrange
    let keymap = Keymap::default();
    let code = keymap.identify("KeyJ").expect("known key");
    let mut pressed = PressedKeySet::new();
    let mut repeats = RepeatScheduler::new();
    let interval = Duration::from_millis(500);
    let t0 = Instant::now();

    // Act: OS auto-repeat delivers the key-down five times.
    let presses = (0..5).filter(|_| pressed.insert(code)).count();
    if classify(code).is_repeatable(code) {
        repeats.start(code, interval, t0);
    }
    let ticks_before_release = repeats.due(t0 + interval).len()
        + repeats.due(t0 + interval * 2).len();
    repeats.stop(code);
    pressed.remove(code);
    let ticks_after_release = repeats.due(t0 + interval * 10).len();

    // Assert
    assert_eq!(presses, 1);
    assert_eq!(ticks_before_release, 2);
    assert_eq!(ticks_after_release, 0);
    assert_eq!(repeats.active_count(), 0);
}

// ── Diagnostics export ────────────────────────────────────────────────────────

#[test]
fn test_export_contains_every_line_since_clear() {
    // Arrange
    let mut log = DiagnosticsLog::new(500);
    log.append("before clear");
    log.clear();
    for i in 0..10 {
        log.append(format!("line {i}"));
    }

    // Act
    let snapshot = log.snapshot("keyboard", &Default::default(), chrono::Utc::now());
    let parsed = DiagnosticsSnapshot::from_json(&snapshot.to_json().expect("encode"))
        .expect("decode");

    // Assert
    let messages: Vec<String> = parsed.entries.into_iter().map(|e| e.message).collect();
    let mut expected = vec!["Event log cleared".to_string()];
    expected.extend((0..10).map(|i| format!("line {i}")));
    assert_eq!(messages, expected);
}
