//! Translation mode feature report.
//!
//! The host can read and replace a single mode byte through the HID feature
//! channel. The firmware stores it and echoes it back; nothing else looks at
//! it.

/// Bytes returned to a feature report read.
pub const FEATURE_REPORT_LEN: usize = 3;

/// Number of mode bytes carried by the feature report.
const MODE_COUNT: u8 = 1;

/// Host-selected key translation mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationMode(pub u8);

impl TranslationMode {
    /// Plain HID usage table translation.
    pub const HUT1: TranslationMode = TranslationMode(1);
}

/// Encode a feature report read: mode count, mode, padding.
pub fn encode(mode: TranslationMode) -> [u8; FEATURE_REPORT_LEN] {
    [MODE_COUNT, mode.0, 0]
}

/// Decode a feature report write. The first byte is reserved; writes too
/// short to carry a mode give `None`.
pub fn decode(bytes: &[u8]) -> Option<TranslationMode> {
    match bytes {
        [_, mode, ..] => Some(TranslationMode(*mode)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        assert_eq!(encode(TranslationMode::HUT1), [1, 1, 0]);
        assert_eq!(encode(TranslationMode(0x7F)), [1, 0x7F, 0]);
    }

    #[test]
    fn test_decode_takes_second_byte() {
        assert_eq!(decode(&[0, 2]), Some(TranslationMode(2)));
        assert_eq!(decode(&[9, 3, 0xAA]), Some(TranslationMode(3)));
    }

    #[test]
    fn test_decode_short_write() {
        assert_eq!(decode(&[]), None);
        assert_eq!(decode(&[2]), None);
    }
}
