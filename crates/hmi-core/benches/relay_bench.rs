//! Criterion benchmarks for the per-keystroke hot path.
//!
//! Measures the cost of turning a key identifier into an encoded wire frame:
//! identify → classify → resolve character → build event → JSON encode.
//! Every physical key press and every repeat tick pays this cost once.
//!
//! Run with:
//! ```bash
//! cargo bench --package hmi-core --bench relay_bench
//! ```

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hmi_core::keymap::{classify, KeyboardLayout, Keymap, LegendBlock};
use hmi_core::{
    encode_event, InputEvent, KeyAction, KeyCode, ModifierLockState, RelayEvent, RepeatScheduler,
    WireSchema,
};

// ── Representative key identifiers ────────────────────────────────────────────

/// Mix of DOM codes and on-screen legends, as the panels receive them.
const BENCH_KEY_IDS: &[&str] = &[
    "KeyA", "KeyZ", "a", "Q", "Digit1", "!", "Enter", "Backspace", "ShiftLeft", "CapsLock",
    "ArrowLeft", "Space", "Slash", "Numpad5", "F12", "Unidentified",
];

// ── Benchmarks: key identification ────────────────────────────────────────────

fn bench_identify_and_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap");
    let keymap = Keymap::new(LegendBlock::MainBlock);

    group.bench_function("identify_single", |b| {
        b.iter(|| keymap.identify(black_box("KeyA")))
    });

    group.bench_function("identify_classify_batch_16", |b| {
        b.iter(|| {
            BENCH_KEY_IDS
                .iter()
                .filter_map(|id| keymap.identify(black_box(id)).ok())
                .map(classify)
                .collect::<Vec<_>>()
        })
    });

    let state = ModifierLockState::new().snapshot();
    group.bench_function("resolve_char_azerty", |b| {
        b.iter(|| KeyboardLayout::Azerty.resolve_char(black_box(KeyCode::KeyQ), &state))
    });

    group.finish();
}

// ── Benchmarks: wire encoding ─────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("protocol");
    let event = RelayEvent::Key(InputEvent::key(
        "hmi-keyboard",
        "rpi3pc",
        "A",
        Some("KeyA".to_string()),
        KeyAction::Press,
        ModifierLockState::new().snapshot(),
        1_714_555_800_000,
    ));

    group.bench_function("encode_keyboard", |b| {
        b.iter(|| encode_event(black_box(&event), WireSchema::Keyboard))
    });
    group.bench_function("encode_numpad", |b| {
        b.iter(|| encode_event(black_box(&event), WireSchema::Numpad))
    });

    group.finish();
}

// ── Benchmarks: repeat scheduling ─────────────────────────────────────────────

fn bench_repeat_due(c: &mut Criterion) {
    let mut group = c.benchmark_group("repeat");
    let keymap = Keymap::default();
    let t0 = Instant::now();

    // Ten keys held at once is well beyond what an operator does.
    let mut scheduler = RepeatScheduler::new();
    for id in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"] {
        if let Ok(code) = keymap.identify(id) {
            scheduler.start(code, Duration::from_millis(500), t0);
        }
    }

    let mut tick = 0u64;
    group.bench_function("due_10_keys", |b| {
        b.iter(|| {
            tick += 500;
            scheduler.due(black_box(t0 + Duration::from_millis(tick)))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_identify_and_classify, bench_encode, bench_repeat_due);
criterion_main!(benches);
