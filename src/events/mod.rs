//! Raw key events and modifier chords.
//!
//! Events come either from a Linux input device (see [`device`]) or as text
//! lines `<CODE> <VALUE>`, e.g. `KEY_LEFTCTRL 1`, where VALUE is `0`
//! (released), `1` (pressed) or `2` (auto-repeat).

pub mod device;

use std::fmt::{Display, Formatter};
use std::io::BufRead;
use tracing::{trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    Up,
    Down,
    Hold,
}

impl KeyState {
    pub fn from_value(value: i32) -> Option<KeyState> {
        match value {
            0 => Some(KeyState::Up),
            1 => Some(KeyState::Down),
            2 => Some(KeyState::Hold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyState::Up => "up",
            KeyState::Down => "down",
            KeyState::Hold => "hold",
        }
    }
}

impl Display for KeyState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEvent {
    pub code: String,
    pub value: i32,
}

impl RawEvent {
    /// Parses one event line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<RawEvent>, String> {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parts = line.split_whitespace();

        match (parts.next(), parts.next(), parts.next()) {
            (Some(code), Some(value), None) => value.parse()
                .map(|value| Some(RawEvent { code: code.to_owned(), value }))
                .map_err(|_| format!("invalid key value `{}`", value)),
            _ => Err(format!("expected `<CODE> <VALUE>`, got `{}`", line)),
        }
    }

    /// `KEY_LEFTCTRL` becomes `leftctrl`.
    pub fn key_name(&self) -> String {
        match self.code.split_once('_') {
            Some((_, name)) => name.to_lowercase(),
            None => self.code.to_lowercase(),
        }
    }
}

/// Tracks held modifiers and turns raw events into chord names.
#[derive(Clone, Debug, Default)]
pub struct ChordTracker {
    alt: bool,
    ctrl: bool,
    shift: bool,
}

impl ChordTracker {
    pub fn new() -> Self {
        ChordTracker::default()
    }

    /// Modifier keys only update the tracker and produce nothing.
    /// Other keys come out as `alt-ctrl-shift-<key>` restricted to the
    /// modifiers currently held, or the bare key name.
    pub fn process(&mut self, event: &RawEvent) -> Option<(String, KeyState)> {
        let state = KeyState::from_value(event.value)?;
        let key = self.process_key(&event.key_name(), state)?;

        Some((key, state))
    }

    pub fn process_key(&mut self, key: &str, state: KeyState) -> Option<String> {
        let held = state != KeyState::Up;
        let mut modifier = false;

        for (name, flag) in [("alt", &mut self.alt), ("ctrl", &mut self.ctrl), ("shift", &mut self.shift)] {
            if key.contains(name) {
                *flag = held;
                modifier = true;
            }
        }

        if modifier {
            trace!("modifier {} is {}", key, state);
            return None;
        }

        let mut chord: Vec<&str> = [("alt", self.alt), ("ctrl", self.ctrl), ("shift", self.shift)]
            .into_iter()
            .filter(|(_, active)| *active)
            .map(|(name, _)| name)
            .collect();
        chord.push(key);

        Some(chord.join("-"))
    }
}

/// Reads raw events line by line, turning them into `(chord, state)` pairs.
pub struct EventReader<R> {
    reader: R,
    tracker: ChordTracker,
    line: String,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(reader: R) -> Self {
        EventReader { reader, tracker: ChordTracker::new(), line: String::new() }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = std::io::Result<(String, KeyState)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();

            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {},
                Err(err) => return Some(Err(err)),
            }

            let event = match RawEvent::parse(&self.line) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(message) => {
                    warn!("skipping event: {}", message);
                    continue;
                },
            };

            if let Some(result) = self.tracker.process(&event) {
                return Some(Ok(result));
            }
        }
    }
}
