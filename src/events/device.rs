//! Key events read straight from a Linux input device.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use evdev::{Device, EventType, InputEvent, Key};
use regex::Regex;
use tracing::{debug, info};
use crate::events::{ChordTracker, KeyState, RawEvent};

#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    #[error("cannot open input device {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot grab input device {path}: {source}")]
    Grab {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid device pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("no input device matches `{0}`")]
    NoMatch(String),
}

/// Opens the device at `path`.
pub fn open(path: &Path, exclusive: bool) -> Result<DeviceEvents, DeviceError> {
    let device = Device::open(path)
        .map_err(|source| DeviceError::Open { path: path.to_string_lossy().into_owned(), source })?;

    DeviceEvents::new(device, path, exclusive)
}

/// Opens the last device whose name contains a match for `pattern`.
pub fn find(pattern: &str, exclusive: bool) -> Result<DeviceEvents, DeviceError> {
    let regex = Regex::new(pattern)?;

    let (path, device) = evdev::enumerate()
        .filter(|(_, device)| {
            debug!("Matching {:?} on {:?}", pattern, device.name());
            matches_name(&regex, device.name())
        })
        .last()
        .ok_or_else(|| DeviceError::NoMatch(pattern.to_owned()))?;

    DeviceEvents::new(device, &path, exclusive)
}

/// All input devices as `(path, name)`, sorted by path.
pub fn list() -> Vec<(PathBuf, String)> {
    let mut devices: Vec<(PathBuf, String)> = evdev::enumerate()
        .map(|(path, device)| (path, device.name().unwrap_or_default().to_owned()))
        .collect();

    devices.sort();
    devices
}

fn matches_name(regex: &Regex, name: Option<&str>) -> bool {
    name.is_some_and(|name| regex.is_match(name))
}

/// Key events become `RawEvent`s named like the kernel constant (`KEY_A`);
/// everything else is dropped.
pub fn raw_event(event: &InputEvent) -> Option<RawEvent> {
    if event.event_type() != EventType::KEY {
        return None;
    }

    Some(RawEvent { code: format!("{:?}", Key::new(event.code())), value: event.value() })
}

/// Blocking iterator over the chords produced by one input device.
pub struct DeviceEvents {
    device: Device,
    tracker: ChordTracker,
    pending: VecDeque<(String, KeyState)>,
}

impl DeviceEvents {
    fn new(mut device: Device, path: &Path, exclusive: bool) -> Result<DeviceEvents, DeviceError> {
        if exclusive {
            device.grab()
                .map_err(|source| DeviceError::Grab { path: path.to_string_lossy().into_owned(), source })?;
        }

        info!("Reading key events from {} ({})", path.display(), device.name().unwrap_or("unnamed"));
        Ok(DeviceEvents { device, tracker: ChordTracker::new(), pending: VecDeque::new() })
    }
}

impl Iterator for DeviceEvents {
    type Item = std::io::Result<(String, KeyState)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chord) = self.pending.pop_front() {
                return Some(Ok(chord));
            }

            let events = match self.device.fetch_events() {
                Ok(events) => events,
                Err(err) => return Some(Err(err)),
            };

            for event in events {
                if let Some(chord) = raw_event(&event).and_then(|raw| self.tracker.process(&raw)) {
                    self.pending.push_back(chord);
                }
            }
        }
    }
}
