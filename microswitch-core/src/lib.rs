//! Key state and report engine for the MicroSwitch keyboard converter.
//!
//! This crate is `no_std` and allocation free so the AVR firmware and the
//! host tool can share it. The firmware owns one [`Keyboard`] and drives it
//! from its polling loop: [`Keyboard::scan`] once per iteration, then
//! [`Keyboard::input_report`] and the feature report calls from the USB
//! driver.

#![no_std]

pub mod feature;
pub mod keycode;
pub mod keys;
pub mod report;
pub mod scanner;
pub mod tracker;
pub mod usb;

use log::debug;

pub use feature::TranslationMode;
pub use keycode::Keycode;
pub use keys::{KeyInfo, Shift, ShiftMask};
pub use report::{KeyboardReport, Modifiers};
pub use scanner::{Edge, MatrixPort, Scanner};
pub use tracker::KeyTracker;

/// Columns selected through the address lines.
pub const COLUMNS: usize = 16;
/// Row inputs read per column.
pub const ROWS: usize = 8;

/// Everything the converter remembers between polls.
pub struct Keyboard {
    scanner: Scanner,
    tracker: KeyTracker,
    mode: TranslationMode,
    need_empty_report: bool,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyboard {
    pub const fn new() -> Self {
        Self {
            scanner: Scanner::new(),
            tracker: KeyTracker::new(),
            mode: TranslationMode(0),
            need_empty_report: false,
        }
    }

    /// Scan the matrix once and apply every edge it produces.
    pub fn scan<P: MatrixPort>(&mut self, port: &mut P) {
        let tracker = &mut self.tracker;
        self.scanner.scan(port, |edge| apply_edge(tracker, edge));
    }

    /// Apply a single edge, as the scanner would.
    pub fn handle_edge(&mut self, edge: Edge) {
        apply_edge(&mut self.tracker, edge);
    }

    /// Press `position` while dropping every other tracked key, for when the
    /// matrix cannot report the releases itself.
    ///
    /// `position` must be below [`keys::MATRIX_SIZE`].
    pub fn press_without_key_ups(&mut self, position: usize) {
        self.tracker.key_down(keys::lookup(position), true);
    }

    /// Make the next input report all zero.
    pub fn request_empty_report(&mut self) {
        self.need_empty_report = true;
    }

    /// True until the requested empty report has been produced.
    pub fn empty_report_pending(&self) -> bool {
        self.need_empty_report
    }

    /// Report for the host's next poll.
    pub fn input_report(&mut self) -> KeyboardReport {
        if self.need_empty_report {
            self.need_empty_report = false;
            return KeyboardReport::empty();
        }
        KeyboardReport::from_tracker(&self.tracker)
    }

    /// Report for the interrupt endpoint, or `None` when it would repeat
    /// `last_sent`. A pending empty report is always returned.
    pub fn changed_report(&mut self, last_sent: &KeyboardReport) -> Option<KeyboardReport> {
        let forced = self.empty_report_pending();
        let report = self.input_report();
        if forced || report != *last_sent {
            Some(report)
        } else {
            None
        }
    }

    /// Feature report read: mode count followed by the translation mode.
    pub fn feature_report(&self) -> [u8; feature::FEATURE_REPORT_LEN] {
        feature::encode(self.mode)
    }

    /// Feature report write from the host. Returns false when the write was
    /// too short to carry a mode and was ignored.
    pub fn set_feature_report(&mut self, bytes: &[u8]) -> bool {
        match feature::decode(bytes) {
            Some(mode) => {
                debug!("translation mode {} -> {}", self.mode.0, mode.0);
                self.mode = mode;
                true
            }
            None => false,
        }
    }

    pub fn translation_mode(&self) -> TranslationMode {
        self.mode
    }

    pub fn tracker(&self) -> &KeyTracker {
        &self.tracker
    }
}

fn apply_edge(tracker: &mut KeyTracker, edge: Edge) {
    match edge {
        Edge::Down(position) => tracker.key_down(keys::lookup(position), false),
        Edge::Up(position) => tracker.key_up(keys::lookup(position)),
    }
}
