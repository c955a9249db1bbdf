//! The MicroSwitch matrix table.
//!
//! The converter board addresses 16 columns of 8 rows each. Every matrix
//! position maps to exactly one [`KeyInfo`]; the index `column * 8 + row` is
//! the only identity a physical key has.
//!
//! Several positions share a usage (`O` appears seven times) and the last
//! two positions are not wired.

use bitflags::bitflags;

use crate::keycode::Keycode;
use crate::{COLUMNS, ROWS};

/// Number of addressable matrix positions.
pub const MATRIX_SIZE: usize = COLUMNS * ROWS;

/// Shift role of a key. Ordinary keys are [`Shift::None`].
///
/// The discriminant is the bit number used in [`ShiftMask`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Shift {
    None = 0,
    LShift = 1,
    RShift = 2,
    LControl = 3,
    RControl = 4,
    /// Left alt
    LMeta = 5,
    /// Right alt
    RMeta = 6,
    /// Left gui
    LSuper = 7,
    /// Right gui
    RSuper = 8,
    CapsLock = 9,
}

impl Shift {
    /// Mask bit for this role; empty for [`Shift::None`].
    pub fn mask(self) -> ShiftMask {
        match self {
            Shift::None => ShiftMask::empty(),
            s => ShiftMask::from_bits_truncate(1 << s as u16),
        }
    }

    /// Roles the host understands as modifier bits. These never occupy a
    /// usage slot in the report.
    pub fn is_usb_modifier(self) -> bool {
        (Shift::LShift as u8..=Shift::RSuper as u8).contains(&(self as u8))
    }

    pub fn name(self) -> &'static str {
        match self {
            Shift::None => "",
            Shift::LShift => "L_SHIFT",
            Shift::RShift => "R_SHIFT",
            Shift::LControl => "L_CONTROL",
            Shift::RControl => "R_CONTROL",
            Shift::LMeta => "L_META",
            Shift::RMeta => "R_META",
            Shift::LSuper => "L_SUPER",
            Shift::RSuper => "R_SUPER",
            Shift::CapsLock => "CAPS_LOCK",
        }
    }
}

bitflags! {
    /// Currently held shift roles, one bit per [`Shift`] discriminant.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct ShiftMask: u16 {
        const L_SHIFT = 1 << 1;
        const R_SHIFT = 1 << 2;
        const L_CONTROL = 1 << 3;
        const R_CONTROL = 1 << 4;
        const L_META = 1 << 5;
        const R_META = 1 << 6;
        const L_SUPER = 1 << 7;
        const R_SUPER = 1 << 8;
        const CAPS_LOCK = 1 << 9;
    }
}

/// Information about one matrix position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyInfo {
    /// Keyboard page usage, 0 when the position is not wired.
    pub usage: u8,
    pub shift: Shift,
}

impl KeyInfo {
    pub fn is_mapped(&self) -> bool {
        self.usage != 0
    }

    pub fn keycode(&self) -> Option<Keycode> {
        Keycode::from_usage(self.usage)
    }
}

const fn pc_key(kc: Keycode) -> KeyInfo {
    KeyInfo {
        usage: kc as u8,
        shift: Shift::None,
    }
}

const fn shift_key(kc: Keycode, shift: Shift) -> KeyInfo {
    KeyInfo {
        usage: kc as u8,
        shift,
    }
}

const NO_KEY: KeyInfo = KeyInfo {
    usage: 0,
    shift: Shift::None,
};

/// Matrix table, indexed by `column * 8 + row`.
pub static KEYS: [KeyInfo; MATRIX_SIZE] = [
    // column 0
    pc_key(Keycode::Dot),
    pc_key(Keycode::Semicolon),
    pc_key(Keycode::P),
    pc_key(Keycode::N0),
    pc_key(Keycode::Comma),
    pc_key(Keycode::L),
    pc_key(Keycode::O),
    pc_key(Keycode::N9),
    // column 1
    pc_key(Keycode::Space),
    pc_key(Keycode::Z),
    pc_key(Keycode::Backslash),
    pc_key(Keycode::Kp9),
    pc_key(Keycode::Z),
    pc_key(Keycode::A),
    pc_key(Keycode::Q),
    pc_key(Keycode::N1),
    // column 2
    pc_key(Keycode::Tab),
    pc_key(Keycode::X),
    pc_key(Keycode::Y),
    pc_key(Keycode::Grave),
    pc_key(Keycode::V),
    pc_key(Keycode::G),
    pc_key(Keycode::T),
    pc_key(Keycode::N5),
    // column 3
    pc_key(Keycode::G),
    pc_key(Keycode::H),
    pc_key(Keycode::I),
    pc_key(Keycode::N3),
    pc_key(Keycode::N6),
    pc_key(Keycode::Home),
    pc_key(Keycode::Y),
    pc_key(Keycode::O),
    // column 4
    pc_key(Keycode::O),
    pc_key(Keycode::Backslash),
    pc_key(Keycode::RBracket),
    pc_key(Keycode::KpAsterisk),
    pc_key(Keycode::N),
    pc_key(Keycode::J),
    pc_key(Keycode::U),
    pc_key(Keycode::N7),
    // column 5
    pc_key(Keycode::B),
    pc_key(Keycode::C),
    pc_key(Keycode::D),
    pc_key(Keycode::O),
    pc_key(Keycode::E),
    pc_key(Keycode::F),
    pc_key(Keycode::G),
    pc_key(Keycode::H),
    // column 6
    pc_key(Keycode::I),
    pc_key(Keycode::Kp2),
    pc_key(Keycode::Kp5),
    pc_key(Keycode::Kp7),
    pc_key(Keycode::X),
    pc_key(Keycode::D),
    pc_key(Keycode::E),
    pc_key(Keycode::N3),
    // column 7
    pc_key(Keycode::K),
    pc_key(Keycode::O),
    pc_key(Keycode::F14),
    pc_key(Keycode::F13),
    pc_key(Keycode::F12),
    pc_key(Keycode::F11),
    pc_key(Keycode::F10),
    pc_key(Keycode::F9),
    // column 8
    pc_key(Keycode::Slash),
    pc_key(Keycode::H),
    pc_key(Keycode::LBracket),
    pc_key(Keycode::B),
    pc_key(Keycode::M),
    pc_key(Keycode::K),
    pc_key(Keycode::I),
    pc_key(Keycode::N8),
    // column 9
    shift_key(Keycode::RGui, Shift::RSuper),
    shift_key(Keycode::RAlt, Shift::RMeta),
    shift_key(Keycode::LCtrl, Shift::LControl),
    pc_key(Keycode::K),
    shift_key(Keycode::LShift, Shift::LShift),
    shift_key(Keycode::RShift, Shift::RShift),
    pc_key(Keycode::Tab),
    shift_key(Keycode::CapsLock, Shift::CapsLock),
    // column 10
    pc_key(Keycode::Kp0),
    pc_key(Keycode::Kp1),
    pc_key(Keycode::Kp4),
    pc_key(Keycode::M),
    pc_key(Keycode::C),
    pc_key(Keycode::F),
    pc_key(Keycode::R),
    pc_key(Keycode::N4),
    // column 11
    pc_key(Keycode::X),
    pc_key(Keycode::Y),
    pc_key(Keycode::Z),
    pc_key(Keycode::O),
    pc_key(Keycode::Kp2),
    pc_key(Keycode::N),
    pc_key(Keycode::Backspace),
    pc_key(Keycode::P),
    // column 12
    pc_key(Keycode::Left),
    pc_key(Keycode::Enter),
    pc_key(Keycode::Minus),
    pc_key(Keycode::Delete),
    pc_key(Keycode::Equal),
    pc_key(Keycode::Kp6),
    pc_key(Keycode::Kp8),
    pc_key(Keycode::Down),
    // column 13
    pc_key(Keycode::S),
    pc_key(Keycode::T),
    pc_key(Keycode::U),
    pc_key(Keycode::V),
    pc_key(Keycode::Right),
    pc_key(Keycode::H),
    pc_key(Keycode::Kp8),
    pc_key(Keycode::O),
    // column 14
    pc_key(Keycode::KpDot),
    pc_key(Keycode::Kp3),
    pc_key(Keycode::Q),
    pc_key(Keycode::Kp8),
    pc_key(Keycode::Z),
    pc_key(Keycode::S),
    pc_key(Keycode::W),
    pc_key(Keycode::N2),
    // column 15
    pc_key(Keycode::F16),
    pc_key(Keycode::F20),
    pc_key(Keycode::F18),
    pc_key(Keycode::Stop),
    pc_key(Keycode::F5),
    pc_key(Keycode::Escape),
    NO_KEY,
    NO_KEY,
];

/// Look up the entry for a matrix position.
///
/// `index` must be below [`MATRIX_SIZE`]; the scanner only produces indices
/// in that range.
pub fn lookup(index: usize) -> &'static KeyInfo {
    &KEYS[index]
}

/// Split a matrix index into `(column, row)`.
pub fn position(index: usize) -> (usize, usize) {
    (index / ROWS, index % ROWS)
}
