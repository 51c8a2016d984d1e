//! Scripted input: key combos and simulated touch gestures.
//!
//! # How a script runs (for beginners)
//!
//! A key combo such as Ctrl+C is not one event but a short, timed sequence:
//! Control goes down, 50 ms later C goes down, then both come up again in
//! reverse order.  A simulated swipe is a touch start, twenty moves and a
//! touch end spread over 600 ms.
//!
//! [`KeyCombo::steps`] and [`Gesture::steps`] describe such a sequence as a
//! list of [`TimedStep`]s, each with an offset from the moment the script
//! starts.  [`ScriptPlayer`] turns the offsets into deadlines and, like
//! [`crate::RepeatScheduler`], never owns a timer: the caller asks
//! [`ScriptPlayer::next_deadline`] when to wake up and collects the steps
//! that are due with [`ScriptPlayer::due`].
//!
//! Invariants:
//!
//! - Steps come out in deadline order.  Steps with the same deadline come
//!   out in the order they were scheduled.
//! - Every step is reported exactly once.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::domain::TouchPhase;
use crate::keymap::KeyCode;

/// Gap between consecutive key-downs (and key-ups) of a combo.
pub const COMBO_KEY_GAP: Duration = Duration::from_millis(50);
/// Extra hold time after the last key-down of a combo.
pub const COMBO_HOLD: Duration = Duration::from_millis(100);
/// Pressure reported by every simulated contact.
pub const GESTURE_PRESSURE: f64 = 0.8;

const TAP_HOLD: Duration = Duration::from_millis(100);
const DOUBLE_TAP_GAP: Duration = Duration::from_millis(200);
const LONG_PRESS_HOLD: Duration = Duration::from_millis(1000);
const SWIPE_DISTANCE: f64 = 100.0;
const SWIPE_STEPS: u32 = 20;
const SWIPE_STEP_INTERVAL: Duration = Duration::from_millis(30);
const TWO_FINGER_MOVE_AT: Duration = Duration::from_millis(100);
const TWO_FINGER_END_AT: Duration = Duration::from_millis(300);

/// Touch identifier of single-finger gestures.
const SIM_TOUCH: &str = "sim";
const SIM_FINGER_1: &str = "sim1";
const SIM_FINGER_2: &str = "sim2";

/// Returned when a combo or gesture name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{name}'")]
pub struct UnknownScript {
    pub kind: &'static str,
    pub name: String,
}

// ── Steps ─────────────────────────────────────────────────────────────────────

/// One simulated touch update.  Coordinates are surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchStep {
    pub touch_id: &'static str,
    pub phase: TouchPhase,
    pub x: f64,
    pub y: f64,
}

/// What a script does at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptAction {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    Touch(TouchStep),
}

/// An action and its offset from the start of the script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedStep {
    pub offset: Duration,
    pub action: ScriptAction,
}

impl TimedStep {
    fn touch(offset: Duration, touch_id: &'static str, phase: TouchPhase, x: f64, y: f64) -> Self {
        Self {
            offset,
            action: ScriptAction::Touch(TouchStep {
                touch_id,
                phase,
                x,
                y,
            }),
        }
    }
}

// ── Key combos ────────────────────────────────────────────────────────────────

/// Shortcut key combinations offered by the keyboard panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCombo {
    CtrlC,
    CtrlZ,
    AltTab,
}

impl KeyCombo {
    pub const ALL: [KeyCombo; 3] = [KeyCombo::CtrlC, KeyCombo::CtrlZ, KeyCombo::AltTab];

    /// Name used on the command line (`ctrl+c`).
    pub fn name(self) -> &'static str {
        match self {
            KeyCombo::CtrlC => "ctrl+c",
            KeyCombo::CtrlZ => "ctrl+z",
            KeyCombo::AltTab => "alt+tab",
        }
    }

    /// Keys in press order.
    pub fn keys(self) -> [KeyCode; 2] {
        match self {
            KeyCombo::CtrlC => [KeyCode::ControlLeft, KeyCode::KeyC],
            KeyCombo::CtrlZ => [KeyCode::ControlLeft, KeyCode::KeyZ],
            KeyCombo::AltTab => [KeyCode::AltLeft, KeyCode::Tab],
        }
    }

    /// Key codes joined with `+`, e.g. `ControlLeft+KeyC`.
    pub fn describe(self) -> String {
        self.keys()
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Key-downs [`COMBO_KEY_GAP`] apart, a [`COMBO_HOLD`] pause, then
    /// key-ups in reverse order, again [`COMBO_KEY_GAP`] apart.
    pub fn steps(self) -> Vec<TimedStep> {
        let keys = self.keys();
        let mut steps = Vec::with_capacity(keys.len() * 2);
        let mut offset = Duration::ZERO;
        for &key in &keys {
            steps.push(TimedStep {
                offset,
                action: ScriptAction::KeyDown(key),
            });
            offset += COMBO_KEY_GAP;
        }
        offset += COMBO_HOLD;
        for &key in keys.iter().rev() {
            steps.push(TimedStep {
                offset,
                action: ScriptAction::KeyUp(key),
            });
            offset += COMBO_KEY_GAP;
        }
        steps
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyCombo {
    type Err = UnknownScript;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|combo| combo.name() == wanted)
            .ok_or_else(|| UnknownScript {
                kind: "combo",
                name: s.to_string(),
            })
    }
}

// ── Gestures ──────────────────────────────────────────────────────────────────

/// Touch gestures the touchpad panel can simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Tap,
    DoubleTap,
    LongPress,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    Pinch,
    Zoom,
}

impl Gesture {
    pub const ALL: [Gesture; 9] = [
        Gesture::Tap,
        Gesture::DoubleTap,
        Gesture::LongPress,
        Gesture::SwipeLeft,
        Gesture::SwipeRight,
        Gesture::SwipeUp,
        Gesture::SwipeDown,
        Gesture::Pinch,
        Gesture::Zoom,
    ];

    /// Name used on the command line (`swipe-left`).
    pub fn name(self) -> &'static str {
        match self {
            Gesture::Tap => "tap",
            Gesture::DoubleTap => "double-tap",
            Gesture::LongPress => "long-press",
            Gesture::SwipeLeft => "swipe-left",
            Gesture::SwipeRight => "swipe-right",
            Gesture::SwipeUp => "swipe-up",
            Gesture::SwipeDown => "swipe-down",
            Gesture::Pinch => "pinch",
            Gesture::Zoom => "zoom",
        }
    }

    /// Operator log line for the gesture performed around (`cx`, `cy`).
    pub fn describe(self, cx: f64, cy: f64) -> String {
        match self {
            Gesture::Tap => format!("Simulated Tap: ({cx:.0}, {cy:.0})"),
            Gesture::DoubleTap => format!("Simulated Double Tap: ({cx:.0}, {cy:.0})"),
            Gesture::LongPress => format!("Simulated Long Press: ({cx:.0}, {cy:.0})"),
            Gesture::Pinch => "Simulated Pinch Gesture".to_string(),
            Gesture::Zoom => "Simulated Zoom Gesture".to_string(),
            swipe => {
                let ((x0, y0), (x1, y1)) = swipe.swipe_path(cx, cy);
                format!("Simulated Swipe: ({x0:.0}, {y0:.0}) -> ({x1:.0}, {y1:.0})")
            }
        }
    }

    /// Timed touch updates of the gesture performed around (`cx`, `cy`).
    pub fn steps(self, cx: f64, cy: f64) -> Vec<TimedStep> {
        match self {
            Gesture::Tap => press_and_lift(Duration::ZERO, TAP_HOLD, cx, cy),
            Gesture::DoubleTap => {
                let mut steps = press_and_lift(Duration::ZERO, TAP_HOLD, cx, cy);
                steps.extend(press_and_lift(DOUBLE_TAP_GAP, TAP_HOLD, cx, cy));
                steps
            }
            Gesture::LongPress => press_and_lift(Duration::ZERO, LONG_PRESS_HOLD, cx, cy),
            Gesture::Pinch => two_finger(cx, cy, 50.0, 20.0),
            Gesture::Zoom => two_finger(cx, cy, 20.0, 80.0),
            swipe => {
                let (from, to) = swipe.swipe_path(cx, cy);
                swipe_steps(from, to)
            }
        }
    }

    fn swipe_path(self, cx: f64, cy: f64) -> ((f64, f64), (f64, f64)) {
        let d = SWIPE_DISTANCE;
        match self {
            Gesture::SwipeLeft => ((cx + d, cy), (cx - d, cy)),
            Gesture::SwipeRight => ((cx - d, cy), (cx + d, cy)),
            Gesture::SwipeUp => ((cx, cy + d), (cx, cy - d)),
            Gesture::SwipeDown => ((cx, cy - d), (cx, cy + d)),
            _ => ((cx, cy), (cx, cy)),
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gesture {
    type Err = UnknownScript;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|gesture| gesture.name() == wanted)
            .ok_or_else(|| UnknownScript {
                kind: "gesture",
                name: s.to_string(),
            })
    }
}

fn press_and_lift(at: Duration, hold: Duration, x: f64, y: f64) -> Vec<TimedStep> {
    vec![
        TimedStep::touch(at, SIM_TOUCH, TouchPhase::Start, x, y),
        TimedStep::touch(at + hold, SIM_TOUCH, TouchPhase::End, x, y),
    ]
}

/// Start at `from`, one move per step along the line (the first one at the
/// start point), then lift at `to`.
fn swipe_steps(from: (f64, f64), to: (f64, f64)) -> Vec<TimedStep> {
    let dx = (to.0 - from.0) / f64::from(SWIPE_STEPS);
    let dy = (to.1 - from.1) / f64::from(SWIPE_STEPS);
    let mut steps = vec![TimedStep::touch(
        Duration::ZERO,
        SIM_TOUCH,
        TouchPhase::Start,
        from.0,
        from.1,
    )];
    for i in 0..SWIPE_STEPS {
        let t = f64::from(i);
        steps.push(TimedStep::touch(
            SWIPE_STEP_INTERVAL * i,
            SIM_TOUCH,
            TouchPhase::Move,
            from.0 + dx * t,
            from.1 + dy * t,
        ));
    }
    steps.push(TimedStep::touch(
        SWIPE_STEP_INTERVAL * SWIPE_STEPS,
        SIM_TOUCH,
        TouchPhase::End,
        to.0,
        to.1,
    ));
    steps
}

/// Two fingers on the horizontal axis, `from` pixels either side of the
/// centre, moving to `to` pixels either side.
fn two_finger(cx: f64, cy: f64, from: f64, to: f64) -> Vec<TimedStep> {
    let mut steps = Vec::with_capacity(6);
    for (at, phase, spread) in [
        (Duration::ZERO, TouchPhase::Start, from),
        (TWO_FINGER_MOVE_AT, TouchPhase::Move, to),
        (TWO_FINGER_END_AT, TouchPhase::End, to),
    ] {
        steps.push(TimedStep::touch(at, SIM_FINGER_1, phase, cx - spread, cy));
        steps.push(TimedStep::touch(at, SIM_FINGER_2, phase, cx + spread, cy));
    }
    steps
}

// ── Player ────────────────────────────────────────────────────────────────────

/// Deadline queue of scheduled script actions.
#[derive(Debug, Clone, Default)]
pub struct ScriptPlayer {
    queue: BTreeMap<(Instant, u64), ScriptAction>,
    next_seq: u64,
}

impl ScriptPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `steps` relative to `now`.  Runs alongside any script that
    /// is already playing.
    pub fn start(&mut self, steps: impl IntoIterator<Item = TimedStep>, now: Instant) {
        for step in steps {
            self.queue.insert((now + step.offset, self.next_seq), step.action);
            self.next_seq += 1;
        }
    }

    /// Removes and returns every action due at or before `now`, in order.
    pub fn due(&mut self, now: Instant) -> Vec<ScriptAction> {
        let later = self.queue.split_off(&(now, u64::MAX));
        let due = std::mem::replace(&mut self.queue, later);
        due.into_values().collect()
    }

    /// Earliest pending deadline, or `None` when nothing is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Drops every pending action.  Returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.queue.len();
        self.queue.clear();
        count
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
