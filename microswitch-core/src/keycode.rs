//! USB HID keyboard usage codes.
//! See USB HID Usage Tables, Section 10 (Keyboard/Keypad Page 0x07).

/// Keyboard page usages used by the MicroSwitch table, plus the reserved
/// codes the report builder emits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Keycode {
    /// Reserved; no event
    NoEvent = 0x00,
    /// Sent in every slot when too many keys are held
    ErrorRollOver = 0x01,

    // Letters
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,

    // Numbers
    N1 = 0x1E,
    N2 = 0x1F,
    N3 = 0x20,
    N4 = 0x21,
    N5 = 0x22,
    N6 = 0x23,
    N7 = 0x24,
    N8 = 0x25,
    N9 = 0x26,
    N0 = 0x27,

    // Control keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    LBracket = 0x2F,
    RBracket = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Dot = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,

    // Function keys
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,

    // Keypad
    KpAsterisk = 0x55,
    Kp1 = 0x59,
    Kp2 = 0x5A,
    Kp3 = 0x5B,
    Kp4 = 0x5C,
    Kp5 = 0x5D,
    Kp6 = 0x5E,
    Kp7 = 0x5F,
    Kp8 = 0x60,
    Kp9 = 0x61,
    Kp0 = 0x62,
    KpDot = 0x63,

    // Extended function keys
    F13 = 0x68,
    F14 = 0x69,
    F16 = 0x6B,
    F18 = 0x6D,
    F20 = 0x6F,
    Stop = 0x78,

    // Locking keys (sent as ordinary usages, not modifier bits)
    LockingCapsLock = 0x82,
    LockingNumLock = 0x83,
    LockingScrollLock = 0x84,

    // Modifiers (used in the modifier byte, not in keycode array)
    LCtrl = 0xE0,
    LShift = 0xE1,
    LAlt = 0xE2,
    LGui = 0xE3,
    RCtrl = 0xE4,
    RShift = 0xE5,
    RAlt = 0xE6,
    RGui = 0xE7,
}

/// Every variant, in usage order. Backs [`Keycode::from_usage`].
const ALL: [Keycode; 105] = {
    use Keycode::*;
    [
        NoEvent, ErrorRollOver, A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U,
        V, W, X, Y, Z, N1, N2, N3, N4, N5, N6, N7, N8, N9, N0, Enter, Escape, Backspace, Tab,
        Space, Minus, Equal, LBracket, RBracket, Backslash, Semicolon, Quote, Grave, Comma,
        Dot, Slash, CapsLock, F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12, Home, PageUp,
        Delete, End, PageDown, Right, Left, Down, Up, KpAsterisk, Kp1, Kp2, Kp3, Kp4, Kp5, Kp6,
        Kp7, Kp8, Kp9, Kp0, KpDot, F13, F14, F16, F18, F20, Stop, LockingCapsLock,
        LockingNumLock, LockingScrollLock, LCtrl, LShift, LAlt, LGui, RCtrl, RShift, RAlt, RGui,
    ]
};

impl Keycode {
    /// Raw usage id as it appears on the wire.
    pub const fn usage(self) -> u8 {
        self as u8
    }

    /// Map a raw usage id back to a known keycode.
    pub fn from_usage(usage: u8) -> Option<Keycode> {
        ALL.iter().copied().find(|kc| kc.usage() == usage)
    }

    /// Check if this keycode is a modifier (LCtrl..RGui).
    pub fn is_modifier(self) -> bool {
        let v = self as u8;
        (0xE0..=0xE7).contains(&v)
    }

    /// Display name for host-side listings.
    pub fn display_name(self) -> &'static str {
        match self {
            Keycode::NoEvent => "",
            Keycode::ErrorRollOver => "ROLLOVER",
            Keycode::A => "A",
            Keycode::B => "B",
            Keycode::C => "C",
            Keycode::D => "D",
            Keycode::E => "E",
            Keycode::F => "F",
            Keycode::G => "G",
            Keycode::H => "H",
            Keycode::I => "I",
            Keycode::J => "J",
            Keycode::K => "K",
            Keycode::L => "L",
            Keycode::M => "M",
            Keycode::N => "N",
            Keycode::O => "O",
            Keycode::P => "P",
            Keycode::Q => "Q",
            Keycode::R => "R",
            Keycode::S => "S",
            Keycode::T => "T",
            Keycode::U => "U",
            Keycode::V => "V",
            Keycode::W => "W",
            Keycode::X => "X",
            Keycode::Y => "Y",
            Keycode::Z => "Z",
            Keycode::N1 => "1",
            Keycode::N2 => "2",
            Keycode::N3 => "3",
            Keycode::N4 => "4",
            Keycode::N5 => "5",
            Keycode::N6 => "6",
            Keycode::N7 => "7",
            Keycode::N8 => "8",
            Keycode::N9 => "9",
            Keycode::N0 => "0",
            Keycode::Enter => "Enter",
            Keycode::Escape => "Esc",
            Keycode::Backspace => "Bksp",
            Keycode::Tab => "Tab",
            Keycode::Space => "Space",
            Keycode::Minus => "-",
            Keycode::Equal => "=",
            Keycode::LBracket => "[",
            Keycode::RBracket => "]",
            Keycode::Backslash => "\\",
            Keycode::Semicolon => ";",
            Keycode::Quote => "'",
            Keycode::Grave => "`",
            Keycode::Comma => ",",
            Keycode::Dot => ".",
            Keycode::Slash => "/",
            Keycode::CapsLock => "Caps",
            Keycode::F1 => "F1",
            Keycode::F2 => "F2",
            Keycode::F3 => "F3",
            Keycode::F4 => "F4",
            Keycode::F5 => "F5",
            Keycode::F6 => "F6",
            Keycode::F7 => "F7",
            Keycode::F8 => "F8",
            Keycode::F9 => "F9",
            Keycode::F10 => "F10",
            Keycode::F11 => "F11",
            Keycode::F12 => "F12",
            Keycode::Home => "Home",
            Keycode::PageUp => "PgUp",
            Keycode::Delete => "Del",
            Keycode::End => "End",
            Keycode::PageDown => "PgDn",
            Keycode::Right => "Right",
            Keycode::Left => "Left",
            Keycode::Down => "Down",
            Keycode::Up => "Up",
            Keycode::KpAsterisk => "KP*",
            Keycode::Kp1 => "KP1",
            Keycode::Kp2 => "KP2",
            Keycode::Kp3 => "KP3",
            Keycode::Kp4 => "KP4",
            Keycode::Kp5 => "KP5",
            Keycode::Kp6 => "KP6",
            Keycode::Kp7 => "KP7",
            Keycode::Kp8 => "KP8",
            Keycode::Kp9 => "KP9",
            Keycode::Kp0 => "KP0",
            Keycode::KpDot => "KP.",
            Keycode::F13 => "F13",
            Keycode::F14 => "F14",
            Keycode::F16 => "F16",
            Keycode::F18 => "F18",
            Keycode::F20 => "F20",
            Keycode::Stop => "Stop",
            Keycode::LockingCapsLock => "LCaps",
            Keycode::LockingNumLock => "LNum",
            Keycode::LockingScrollLock => "LScrl",
            Keycode::LCtrl => "Ctrl",
            Keycode::LShift => "Shft",
            Keycode::LAlt => "Alt",
            Keycode::LGui => "Gui",
            Keycode::RCtrl => "RCtl",
            Keycode::RShift => "RSft",
            Keycode::RAlt => "RAlt",
            Keycode::RGui => "RGui",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_usage_finds_every_variant() {
        for kc in ALL {
            assert_eq!(Keycode::from_usage(kc.usage()), Some(kc));
        }
    }

    #[test]
    fn test_unknown_usage_is_none() {
        assert_eq!(Keycode::from_usage(0x02), None);
        assert_eq!(Keycode::from_usage(0xFF), None);
    }

    #[test]
    fn test_all_is_sorted_and_unique() {
        assert!(ALL.windows(2).all(|w| w[0].usage() < w[1].usage()));
    }

    #[test]
    fn test_modifier_range() {
        assert!(Keycode::LCtrl.is_modifier());
        assert!(Keycode::RGui.is_modifier());
        assert!(!Keycode::CapsLock.is_modifier());
    }
}
