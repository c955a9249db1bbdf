//! USB identity shared by the firmware and the host tool.

/// Atmel vendor id.
pub const VENDOR_ID: u16 = 0x03EB;
/// Keyboard product id under the Atmel vendor id.
pub const PRODUCT_ID: u16 = 0x2042;

/// The keyboard is the only interface.
pub const KEYBOARD_INTERFACE: u8 = 0;
/// Interrupt IN endpoint carrying input reports.
pub const KEYBOARD_EP_IN: u8 = 0x81;
/// Polling interval requested in the endpoint descriptor, in ms.
pub const POLL_INTERVAL_MS: u8 = 1;

// HID class requests
pub const HID_GET_REPORT: u8 = 0x01;
pub const HID_GET_IDLE: u8 = 0x02;
pub const HID_GET_PROTOCOL: u8 = 0x03;
pub const HID_SET_REPORT: u8 = 0x09;
pub const HID_SET_IDLE: u8 = 0x0A;
pub const HID_SET_PROTOCOL: u8 = 0x0B;

// HID report types (high byte of wValue in GET/SET_REPORT)
pub const REPORT_TYPE_INPUT: u8 = 1;
pub const REPORT_TYPE_OUTPUT: u8 = 2;
pub const REPORT_TYPE_FEATURE: u8 = 3;
