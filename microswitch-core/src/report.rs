//! Boot keyboard input report.

use bitflags::bitflags;

use crate::keycode::Keycode;
use crate::keys::ShiftMask;
use crate::tracker::KeyTracker;

/// Usage slots in a boot keyboard report.
pub const REPORT_KEYS: usize = 6;

/// Bytes on the wire: modifiers, reserved, six usages.
pub const REPORT_LEN: usize = REPORT_KEYS + 2;

bitflags! {
    /// Modifier byte of the boot report (bit 0 = left ctrl ... bit 7 = right gui).
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const LEFT_CTRL = 0x01;
        const LEFT_SHIFT = 0x02;
        const LEFT_ALT = 0x04;
        const LEFT_GUI = 0x08;
        const RIGHT_CTRL = 0x10;
        const RIGHT_SHIFT = 0x20;
        const RIGHT_ALT = 0x40;
        const RIGHT_GUI = 0x80;
    }
}

/// Shift roles that reach the host, and the modifier bit each one sets.
///
/// Only five roles are sent. Right alt and right gui land on the LEFT alt and
/// gui bits; left alt, left gui and right control are never transmitted.
const SENT_SHIFTS: [(ShiftMask, Modifiers); 5] = [
    (ShiftMask::L_CONTROL, Modifiers::LEFT_CTRL),
    (ShiftMask::L_SHIFT, Modifiers::LEFT_SHIFT),
    (ShiftMask::R_META, Modifiers::LEFT_ALT),
    (ShiftMask::R_SUPER, Modifiers::LEFT_GUI),
    (ShiftMask::R_SHIFT, Modifiers::RIGHT_SHIFT),
];

/// Standard USB HID keyboard report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: Modifiers,
    pub keys: [u8; REPORT_KEYS],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: Modifiers::empty(),
            keys: [0; REPORT_KEYS],
        }
    }

    /// Assemble a report from the tracked key state.
    ///
    /// More keys than slots fills every slot with the rollover error usage
    /// rather than sending a partial set.
    pub fn from_tracker(tracker: &KeyTracker) -> Self {
        let shifts = tracker.shifts();
        let mut report = Self::empty();

        for (shift, bit) in SENT_SHIFTS {
            if shifts.contains(shift) {
                report.modifiers |= bit;
            }
        }

        let down = tracker.keys_down();
        if down.len() > REPORT_KEYS {
            report.keys = [Keycode::ErrorRollOver.usage(); REPORT_KEYS];
        } else {
            report.keys[..down.len()].copy_from_slice(down);
        }

        report
    }

    pub fn is_rollover(&self) -> bool {
        self.keys
            .iter()
            .all(|&k| k == Keycode::ErrorRollOver.usage())
    }

    /// Boot protocol wire layout.
    pub fn to_bytes(&self) -> [u8; REPORT_LEN] {
        let mut bytes = [0; REPORT_LEN];
        bytes[0] = self.modifiers.bits();
        bytes[2..].copy_from_slice(&self.keys);
        bytes
    }

    /// Decode a boot protocol report. Returns `None` when `bytes` is short.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < REPORT_LEN {
            return None;
        }
        let mut keys = [0; REPORT_KEYS];
        keys.copy_from_slice(&bytes[2..REPORT_LEN]);
        Some(Self {
            modifiers: Modifiers::from_bits_retain(bytes[0]),
            keys,
        })
    }

    /// Non-zero usages, in slot order.
    pub fn pressed(&self) -> impl Iterator<Item = u8> + '_ {
        self.keys.iter().copied().filter(|&k| k != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyInfo, Shift};

    fn key(usage: u8) -> KeyInfo {
        KeyInfo {
            usage,
            shift: Shift::None,
        }
    }

    fn modifier(kc: Keycode, shift: Shift) -> KeyInfo {
        KeyInfo {
            usage: kc.usage(),
            shift,
        }
    }

    #[test]
    fn test_empty_tracker_gives_empty_report() {
        let t = KeyTracker::new();
        assert_eq!(KeyboardReport::from_tracker(&t), KeyboardReport::empty());
    }

    #[test]
    fn test_keys_copied_in_order_then_zero() {
        let mut t = KeyTracker::new();
        t.key_down(&key(0x05), false);
        t.key_down(&key(0x04), false);
        let r = KeyboardReport::from_tracker(&t);
        assert_eq!(r.keys, [0x05, 0x04, 0, 0, 0, 0]);
        assert!(!r.is_rollover());
    }

    #[test]
    fn test_exactly_six_keys_fit() {
        let mut t = KeyTracker::new();
        for u in 0x04..0x0A {
            t.key_down(&key(u), false);
        }
        let r = KeyboardReport::from_tracker(&t);
        assert_eq!(r.keys, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
    }

    #[test]
    fn test_seven_keys_roll_over() {
        let mut t = KeyTracker::new();
        for u in 0x04..0x0B {
            t.key_down(&key(u), false);
        }
        let r = KeyboardReport::from_tracker(&t);
        assert_eq!(r.keys, [0x01; 6]);
        assert!(r.is_rollover());
        assert_eq!(r.modifiers, Modifiers::empty());
    }

    #[test]
    fn test_rollover_keeps_modifiers() {
        let mut t = KeyTracker::new();
        t.key_down(&modifier(Keycode::LCtrl, Shift::LControl), false);
        for u in 0x04..0x0C {
            t.key_down(&key(u), false);
        }
        let r = KeyboardReport::from_tracker(&t);
        assert_eq!(r.modifiers, Modifiers::LEFT_CTRL);
        assert!(r.is_rollover());
    }

    #[test]
    fn test_modifier_mapping_is_partial_and_asymmetric() {
        let cases = [
            (Keycode::LCtrl, Shift::LControl, Modifiers::LEFT_CTRL),
            (Keycode::LShift, Shift::LShift, Modifiers::LEFT_SHIFT),
            (Keycode::RShift, Shift::RShift, Modifiers::RIGHT_SHIFT),
            (Keycode::RAlt, Shift::RMeta, Modifiers::LEFT_ALT),
            (Keycode::RGui, Shift::RSuper, Modifiers::LEFT_GUI),
            (Keycode::LAlt, Shift::LMeta, Modifiers::empty()),
            (Keycode::LGui, Shift::LSuper, Modifiers::empty()),
            (Keycode::RCtrl, Shift::RControl, Modifiers::empty()),
            (Keycode::CapsLock, Shift::CapsLock, Modifiers::empty()),
        ];
        for (kc, shift, expected) in cases {
            let mut t = KeyTracker::new();
            t.key_down(&modifier(kc, shift), false);
            let r = KeyboardReport::from_tracker(&t);
            assert_eq!(r.modifiers, expected, "{:?}", shift);
        }
    }

    #[test]
    fn test_wire_layout() {
        let r = KeyboardReport {
            modifiers: Modifiers::LEFT_SHIFT | Modifiers::LEFT_GUI,
            keys: [0x04, 0x1D, 0, 0, 0, 0],
        };
        assert_eq!(r.to_bytes(), [0x0A, 0, 0x04, 0x1D, 0, 0, 0, 0]);
        assert_eq!(KeyboardReport::from_bytes(&r.to_bytes()), Some(r));
        assert_eq!(r.pressed().collect::<heapless::Vec<u8, 6>>(), [0x04, 0x1D]);
    }

    #[test]
    fn test_short_wire_report_rejected() {
        assert_eq!(KeyboardReport::from_bytes(&[0; 7]), None);
    }
}
