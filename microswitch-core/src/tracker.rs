//! Key-down / key-up state machine.
//!
//! Ordinary keys are kept in press order in a bounded list of usages. Shift
//! roles live in a [`ShiftMask`]; the USB-standard ones never take a usage
//! slot, the others (caps lock) are reported both ways.

use heapless::Vec;
use log::debug;

use crate::keycode::Keycode;
use crate::keys::{KeyInfo, Shift, ShiftMask};

/// Most ordinary keys tracked at once. Further presses are ignored.
pub const MAX_KEYS_DOWN: usize = 16;

#[derive(Default)]
pub struct KeyTracker {
    shifts: ShiftMask,
    keys_down: Vec<u8, MAX_KEYS_DOWN>,
}

impl KeyTracker {
    pub const fn new() -> Self {
        Self {
            shifts: ShiftMask::empty(),
            keys_down: Vec::new(),
        }
    }

    /// Process a key press.
    ///
    /// `no_key_ups` drops every tracked key first, as if all of them had been
    /// released without the matrix reporting it.
    pub fn key_down(&mut self, key: &KeyInfo, no_key_ups: bool) {
        if no_key_ups {
            debug!("clearing {} keys down", self.keys_down.len());
            self.keys_down.clear();
        }

        if key.shift != Shift::None {
            self.shifts |= key.shift.mask();
            if key.shift.is_usb_modifier() {
                return;
            }
        }

        if no_key_ups && self.shifts.contains(ShiftMask::CAPS_LOCK) {
            self.push(Keycode::LockingCapsLock.usage());
        }

        if key.is_mapped() {
            self.push(key.usage);
        }
    }

    /// Process a key release.
    ///
    /// The shift bit is cleared whichever key of that role set it. A usage
    /// that is not tracked is ignored.
    pub fn key_up(&mut self, key: &KeyInfo) {
        if key.shift != Shift::None {
            self.shifts.remove(key.shift.mask());
        }

        if let Some(i) = self.keys_down.iter().position(|&u| u == key.usage) {
            self.keys_down.remove(i);
        }
    }

    fn push(&mut self, usage: u8) {
        if self.keys_down.push(usage).is_err() {
            debug!("keys down full, dropped {:#04x}", usage);
        }
    }

    pub fn shifts(&self) -> ShiftMask {
        self.shifts
    }

    /// Ordinary keys currently down, oldest first.
    pub fn keys_down(&self) -> &[u8] {
        &self.keys_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn key(kc: Keycode) -> KeyInfo {
        KeyInfo {
            usage: kc as u8,
            shift: Shift::None,
        }
    }

    const fn shift(kc: Keycode, shift: Shift) -> KeyInfo {
        KeyInfo {
            usage: kc as u8,
            shift,
        }
    }

    const A: KeyInfo = key(Keycode::A);
    const B: KeyInfo = key(Keycode::B);
    const C: KeyInfo = key(Keycode::C);
    const LSHIFT: KeyInfo = shift(Keycode::LShift, Shift::LShift);
    const RSHIFT: KeyInfo = shift(Keycode::RShift, Shift::RShift);
    const CAPS: KeyInfo = shift(Keycode::CapsLock, Shift::CapsLock);
    const UNWIRED: KeyInfo = KeyInfo {
        usage: 0,
        shift: Shift::None,
    };

    #[test]
    fn test_keys_kept_in_press_order() {
        let mut t = KeyTracker::new();
        t.key_down(&C, false);
        t.key_down(&A, false);
        t.key_down(&B, false);
        assert_eq!(t.keys_down(), &[0x06, 0x04, 0x05]);

        t.key_up(&A);
        assert_eq!(t.keys_down(), &[0x06, 0x05]);
        t.key_down(&A, false);
        assert_eq!(t.keys_down(), &[0x06, 0x05, 0x04]);
    }

    #[test]
    fn test_usb_modifier_only_sets_mask() {
        let mut t = KeyTracker::new();
        t.key_down(&LSHIFT, false);
        assert_eq!(t.shifts(), ShiftMask::L_SHIFT);
        assert!(t.keys_down().is_empty());

        t.key_up(&LSHIFT);
        assert_eq!(t.shifts(), ShiftMask::empty());
        assert!(t.keys_down().is_empty());
    }

    #[test]
    fn test_caps_lock_sets_mask_and_usage() {
        let mut t = KeyTracker::new();
        t.key_down(&CAPS, false);
        assert_eq!(t.shifts(), ShiftMask::CAPS_LOCK);
        assert_eq!(t.keys_down(), &[Keycode::CapsLock.usage()]);

        t.key_up(&CAPS);
        assert_eq!(t.shifts(), ShiftMask::empty());
        assert!(t.keys_down().is_empty());
    }

    #[test]
    fn test_same_role_not_reference_counted() {
        let mut t = KeyTracker::new();
        let lshift2 = shift(Keycode::LShift, Shift::LShift);
        t.key_down(&LSHIFT, false);
        t.key_down(&lshift2, false);
        t.key_up(&LSHIFT);
        assert_eq!(t.shifts(), ShiftMask::empty());
    }

    #[test]
    fn test_left_and_right_shift_are_separate_roles() {
        let mut t = KeyTracker::new();
        t.key_down(&LSHIFT, false);
        t.key_down(&RSHIFT, false);
        t.key_up(&LSHIFT);
        assert_eq!(t.shifts(), ShiftMask::R_SHIFT);
    }

    #[test]
    fn test_release_of_untracked_usage_is_noop() {
        let mut t = KeyTracker::new();
        t.key_down(&A, false);
        t.key_up(&B);
        t.key_up(&LSHIFT);
        assert_eq!(t.keys_down(), &[0x04]);
    }

    #[test]
    fn test_unwired_position_never_stored() {
        let mut t = KeyTracker::new();
        t.key_down(&UNWIRED, false);
        assert!(t.keys_down().is_empty());
        t.key_up(&UNWIRED);
        assert!(t.keys_down().is_empty());
    }

    #[test]
    fn test_duplicate_usages_surface_twice() {
        let mut t = KeyTracker::new();
        t.key_down(&A, false);
        t.key_down(&A, false);
        assert_eq!(t.keys_down(), &[0x04, 0x04]);
        t.key_up(&A);
        assert_eq!(t.keys_down(), &[0x04]);
    }

    #[test]
    fn test_overflow_dropped_silently() {
        let mut t = KeyTracker::new();
        for usage in 0x04..0x04 + MAX_KEYS_DOWN as u8 + 3 {
            t.key_down(
                &KeyInfo {
                    usage,
                    shift: Shift::None,
                },
                false,
            );
        }
        assert_eq!(t.keys_down().len(), MAX_KEYS_DOWN);
        assert_eq!(*t.keys_down().last().unwrap(), 0x04 + MAX_KEYS_DOWN as u8 - 1);

        // The dropped key's release does not disturb the tracked ones.
        t.key_up(&KeyInfo {
            usage: 0x04 + MAX_KEYS_DOWN as u8,
            shift: Shift::None,
        });
        assert_eq!(t.keys_down().len(), MAX_KEYS_DOWN);
    }

    #[test]
    fn test_no_key_ups_clears_first() {
        let mut t = KeyTracker::new();
        t.key_down(&A, false);
        t.key_down(&B, false);
        t.key_down(&C, true);
        assert_eq!(t.keys_down(), &[0x06]);
    }

    #[test]
    fn test_no_key_ups_with_caps_held_adds_locking_caps() {
        let mut t = KeyTracker::new();
        t.key_down(&CAPS, false);
        t.key_down(&A, true);
        assert_eq!(t.keys_down(), &[Keycode::LockingCapsLock.usage(), 0x04]);

        let mut t = KeyTracker::new();
        t.key_down(&CAPS, true);
        assert_eq!(
            t.keys_down(),
            &[Keycode::LockingCapsLock.usage(), Keycode::CapsLock.usage()]
        );
    }

    #[test]
    fn test_no_key_ups_with_usb_modifier_clears_only() {
        let mut t = KeyTracker::new();
        t.key_down(&A, false);
        t.key_down(&LSHIFT, true);
        assert!(t.keys_down().is_empty());
        assert_eq!(t.shifts(), ShiftMask::L_SHIFT);
    }
}
