//! USB HID keyboard implementation for ATmega32U4.
//!
//! A boot-compatible keyboard interface on the built-in USB controller, with
//! one extra vendor feature item carrying the translation mode. Uses direct
//! register access via avr-device.

use avr_device::atmega32u4::Peripherals;

use microswitch_core::feature::FEATURE_REPORT_LEN;
use microswitch_core::report::REPORT_LEN;
use microswitch_core::usb::*;
use microswitch_core::{Keyboard, KeyboardReport};

// USB endpoint configuration for keyboard HID
const EP0_SIZE: u8 = 64; // Control endpoint size
const EP1_SIZE: u8 = 8; // Interrupt IN endpoint size (keyboard reports)

/// HID report descriptor: standard boot keyboard plus a 3-byte feature report.
const HID_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    // Modifier keys (8 bits)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0xE0, //   Usage Minimum (224) - LCtrl
    0x29, 0xE7, //   Usage Maximum (231) - RGui
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    // Reserved byte
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    // LEDs (5 bits)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x05, //   Usage Maximum (5)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    // LED padding (3 bits)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    // Keycodes (6 bytes)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x81, 0x00, //   Input (Data, Array)
    // Translation mode (3 bytes)
    0x06, 0x00, 0xFF, // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01, //   Usage (Vendor 1)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, FEATURE_REPORT_LEN as u8, // Report Count (3)
    0xB1, 0x02, //   Feature (Data, Variable, Absolute)
    0xC0, // End Collection
];

// USB descriptors
static DEVICE_DESCRIPTOR: [u8; 18] = [
    18,   // bLength
    1,    // bDescriptorType (Device)
    0x10, 0x01, // bcdUSB (1.1)
    0,    // bDeviceClass (defined at interface level)
    0,    // bDeviceSubClass
    0,    // bDeviceProtocol
    EP0_SIZE, // bMaxPacketSize0
    VENDOR_ID as u8, (VENDOR_ID >> 8) as u8, // idVendor
    PRODUCT_ID as u8, (PRODUCT_ID >> 8) as u8, // idProduct
    0x01, 0x00, // bcdDevice (1.0)
    1,    // iManufacturer
    2,    // iProduct
    0,    // iSerialNumber
    1,    // bNumConfigurations
];

static CONFIG_DESCRIPTOR: [u8; 34] = [
    // Configuration descriptor
    9,    // bLength
    2,    // bDescriptorType (Configuration)
    34, 0, // wTotalLength
    1,    // bNumInterfaces
    1,    // bConfigurationValue
    0,    // iConfiguration
    0x80, // bmAttributes (bus powered)
    50,   // bMaxPower (100mA)
    // Interface descriptor
    9,    // bLength
    4,    // bDescriptorType (Interface)
    KEYBOARD_INTERFACE, // bInterfaceNumber
    0,    // bAlternateSetting
    1,    // bNumEndpoints
    3,    // bInterfaceClass (HID)
    1,    // bInterfaceSubClass (Boot)
    1,    // bInterfaceProtocol (Keyboard)
    0,    // iInterface
    // HID descriptor
    9,    // bLength
    0x21, // bDescriptorType (HID)
    0x11, 0x01, // bcdHID (1.11)
    0,    // bCountryCode
    1,    // bNumDescriptors
    0x22, // bDescriptorType (Report)
    HID_REPORT_DESCRIPTOR.len() as u8, 0, // wDescriptorLength
    // Endpoint descriptor (EP1 IN, interrupt)
    7,    // bLength
    5,    // bDescriptorType (Endpoint)
    KEYBOARD_EP_IN, // bEndpointAddress (EP1 IN)
    0x03, // bmAttributes (Interrupt)
    EP1_SIZE, 0, // wMaxPacketSize
    POLL_INTERVAL_MS, // bInterval
];

/// String descriptor 0 (language ID)
static STRING_DESC_0: [u8; 4] = [4, 3, 0x09, 0x04]; // English (US)

/// String descriptor 1 (manufacturer): "Dark Arts"
static STRING_DESC_1: [u8; 20] = [
    20, 3, // bLength, bDescriptorType
    b'D', 0, b'a', 0, b'r', 0, b'k', 0, b' ', 0, b'A', 0, b'r', 0, b't', 0, b's', 0,
];

/// String descriptor 2 (product): "MicroSwitch"
static STRING_DESC_2: [u8; 24] = [
    24, 3, // bLength, bDescriptorType
    b'M', 0, b'i', 0, b'c', 0, b'r', 0, b'o', 0, b'S', 0, b'w', 0, b'i', 0, b't', 0, b'c', 0,
    b'h', 0,
];

/// USB device state.
pub struct UsbKeyboard {
    configured: bool,
    last_report: KeyboardReport,
    /// Boot (0) or report (1) protocol, as last set by the host.
    protocol: u8,
    /// Idle rate in 4ms units, as last set by the host.
    idle_rate: u8,
}

impl UsbKeyboard {
    pub const fn new() -> Self {
        Self {
            configured: false,
            last_report: KeyboardReport::empty(),
            protocol: 1,
            idle_rate: 0,
        }
    }

    /// Initialize the ATmega32U4 USB controller.
    pub fn init(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        // Enable USB pad regulator
        usb.uhwcon.write(|w| w.uvrege().set_bit());

        // Enable USB controller and VBUS pad
        usb.usbcon
            .write(|w| w.usbe().set_bit().otgpade().set_bit());

        // Configure PLL for 16MHz crystal -> 96MHz PLL -> 48MHz USB clock
        // PLLCSR: PINDIV=1 (16MHz), PLLE=1
        dp.PLL.pllcsr.write(|w| w.pindiv().set_bit().plle().set_bit());

        // Wait for PLL lock
        while dp.PLL.pllcsr.read().plock().bit_is_clear() {}

        // Enable USB clock
        usb.usbcon.modify(|_, w| w.frzclk().clear_bit());

        // Attach to bus (clear DETACH)
        usb.udcon.modify(|_, w| w.detach().clear_bit());

        // Enable End-Of-Reset interrupt
        usb.udien.write(|w| w.eorste().set_bit());

        self.configured = false;
    }

    /// Poll for USB events and handle them. Call this from the main loop.
    pub fn poll(&mut self, dp: &Peripherals, keyboard: &mut Keyboard) {
        let usb = &dp.USB_DEVICE;

        let udint = usb.udint.read();

        // End of reset: the host forgets every key, start from an empty report
        if udint.eorsti().bit_is_set() {
            usb.udint.modify(|_, w| w.eorsti().clear_bit());
            self.configure_ep0(dp);
            self.configured = false;
            self.last_report = KeyboardReport::empty();
            keyboard.request_empty_report();
        }

        // Check for SETUP packet on EP0
        self.select_endpoint(dp, 0);
        let ueintx = usb.ueintx.read();
        if ueintx.rxstpi().bit_is_set() {
            self.handle_setup(dp, keyboard);
        }
    }

    /// Build the next input report and send it if it has changed or an empty
    /// report is pending.
    pub fn send_report(&mut self, dp: &Peripherals, keyboard: &mut Keyboard) {
        if !self.configured {
            return;
        }

        let usb = &dp.USB_DEVICE;
        self.select_endpoint(dp, 1);

        // RWAL set means the bank can take a new report
        if usb.ueintx.read().rwal().bit_is_clear() {
            return;
        }

        let Some(report) = keyboard.changed_report(&self.last_report) else {
            return;
        };

        for byte in report.to_bytes() {
            usb.uedatx.write(|w| w.bits(byte));
        }

        // Clear FIFOCON and TXINI to send
        usb.ueintx
            .modify(|_, w| w.fifocon().clear_bit().txini().clear_bit());

        self.last_report = report;
    }

    fn configure_ep0(&self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        self.select_endpoint(dp, 0);
        // Enable EP0 as control endpoint, 64 bytes
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x.write(|w| w.eptype().bits(0b00));
        usb.uecfg1x.write(|w| w.epsize().bits(0b011).alloc().set_bit());
    }

    fn configure_ep1(&self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        self.select_endpoint(dp, 1);
        usb.ueconx.write(|w| w.epen().set_bit());
        // Interrupt IN endpoint
        usb.uecfg0x
            .write(|w| w.eptype().bits(0b11).epdir().set_bit());
        usb.uecfg1x.write(|w| w.epsize().bits(0b000).alloc().set_bit());
        self.select_endpoint(dp, 0);
    }

    fn select_endpoint(&self, dp: &Peripherals, ep: u8) {
        dp.USB_DEVICE
            .uenum
            .write(|w| w.bits(ep & 0x07));
    }

    fn handle_setup(&mut self, dp: &Peripherals, keyboard: &mut Keyboard) {
        let usb = &dp.USB_DEVICE;

        // Read 8-byte SETUP packet
        let bm_request_type = usb.uedatx.read().bits();
        let b_request = usb.uedatx.read().bits();
        let w_value_l = usb.uedatx.read().bits();
        let w_value_h = usb.uedatx.read().bits();
        let w_index_l = usb.uedatx.read().bits();
        let _w_index_h = usb.uedatx.read().bits();
        let w_length_l = usb.uedatx.read().bits();
        let w_length_h = usb.uedatx.read().bits();

        // Acknowledge SETUP
        usb.ueintx.modify(|_, w| w.rxstpi().clear_bit());

        let w_length = (w_length_h as u16) << 8 | w_length_l as u16;

        match (bm_request_type, b_request) {
            // GET_DESCRIPTOR
            (0x80, 0x06) => {
                let desc_type = w_value_h;
                let desc_index = w_value_l;
                match desc_type {
                    1 => self.send_control(dp, &DEVICE_DESCRIPTOR, w_length),
                    2 => self.send_control(dp, &CONFIG_DESCRIPTOR, w_length),
                    3 => {
                        // String descriptor
                        match desc_index {
                            0 => self.send_control(dp, &STRING_DESC_0, w_length),
                            1 => self.send_control(dp, &STRING_DESC_1, w_length),
                            2 => self.send_control(dp, &STRING_DESC_2, w_length),
                            _ => self.stall(dp),
                        }
                    }
                    _ => self.stall(dp),
                }
            }

            // SET_ADDRESS
            (0x00, 0x05) => {
                // Send ZLP first, then set address
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.udaddr
                    .write(|w| w.uadd().bits(w_value_l & 0x7F).adden().set_bit());
            }

            // SET_CONFIGURATION
            (0x00, 0x09) => {
                // Send ZLP
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
                self.configure_ep1(dp);
                self.configured = true;
            }

            // GET_CONFIGURATION
            (0x80, 0x08) => {
                self.send_control(dp, &[self.configured as u8], w_length);
            }

            // HID GET_DESCRIPTOR (interface-level)
            (0x81, 0x06) => {
                let desc_type = w_value_h;
                match desc_type {
                    0x22 => self.send_control(dp, HID_REPORT_DESCRIPTOR, w_length),
                    _ => self.stall(dp),
                }
            }

            _ if w_index_l != KEYBOARD_INTERFACE => self.stall(dp),

            // HID GET_REPORT
            (0xA1, HID_GET_REPORT) => match w_value_h {
                REPORT_TYPE_INPUT => {
                    let report = keyboard.input_report();
                    self.send_control(dp, &report.to_bytes(), w_length);
                }
                REPORT_TYPE_FEATURE => {
                    self.send_control(dp, &keyboard.feature_report(), w_length);
                }
                _ => self.stall(dp),
            },

            // HID SET_REPORT
            (0x21, HID_SET_REPORT) => {
                let mut buf = [0u8; REPORT_LEN];
                let received = match self.receive_control(dp, &mut buf, w_length) {
                    Ok(n) => n,
                    Err(()) => return self.stall(dp),
                };
                match w_value_h {
                    REPORT_TYPE_FEATURE => {
                        keyboard.set_feature_report(&buf[..received]);
                    }
                    // LED state: no indicators on this board
                    REPORT_TYPE_OUTPUT => {}
                    _ => {}
                }
            }

            // HID GET_IDLE
            (0xA1, HID_GET_IDLE) => {
                self.send_control(dp, &[self.idle_rate], w_length);
            }

            // HID GET_PROTOCOL
            (0xA1, HID_GET_PROTOCOL) => {
                self.send_control(dp, &[self.protocol], w_length);
            }

            // HID SET_IDLE
            (0x21, HID_SET_IDLE) => {
                self.idle_rate = w_value_h;
                // Send ZLP
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
            }

            // HID SET_PROTOCOL
            (0x21, HID_SET_PROTOCOL) => {
                self.protocol = w_value_l;
                // Send ZLP
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
            }

            _ => {
                self.stall(dp);
            }
        }
    }

    /// IN data stage followed by the host's status ZLP.
    fn send_control(&self, dp: &Peripherals, data: &[u8], max_length: u16) {
        let usb = &dp.USB_DEVICE;
        let len = core::cmp::min(data.len(), max_length as usize);
        let mut sent = 0;

        while sent < len {
            while usb.ueintx.read().txini().bit_is_clear() {}

            let chunk_end = core::cmp::min(sent + EP0_SIZE as usize, len);
            for &byte in &data[sent..chunk_end] {
                usb.uedatx.write(|w| w.bits(byte));
            }

            usb.ueintx.modify(|_, w| w.txini().clear_bit());
            sent = chunk_end;
        }

        // Wait for status stage (host sends ZLP)
        while usb.ueintx.read().rxouti().bit_is_clear() {}
        usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
    }

    /// OUT data stage followed by our status ZLP. Bytes past `buf` are
    /// drained and dropped. Returns the number of bytes kept.
    fn receive_control(&self, dp: &Peripherals, buf: &mut [u8], length: u16) -> Result<usize, ()> {
        let usb = &dp.USB_DEVICE;
        let mut remaining = length as usize;
        let mut kept = 0;

        while remaining > 0 {
            let mut timeout: u16 = 0xFFFF;
            while usb.ueintx.read().rxouti().bit_is_clear() {
                timeout = timeout.wrapping_sub(1);
                if timeout == 0 {
                    return Err(());
                }
            }

            let count = usb.uebclx.read().bits() as usize;
            for _ in 0..count {
                let byte = usb.uedatx.read().bits();
                if kept < buf.len() {
                    buf[kept] = byte;
                    kept += 1;
                }
            }
            usb.ueintx.modify(|_, w| w.rxouti().clear_bit());

            if count == 0 {
                break;
            }
            remaining = remaining.saturating_sub(count);
        }

        // Status stage
        while usb.ueintx.read().txini().bit_is_clear() {}
        usb.ueintx.modify(|_, w| w.txini().clear_bit());
        Ok(kept)
    }

    fn stall(&self, dp: &Peripherals) {
        dp.USB_DEVICE
            .ueconx
            .modify(|_, w| w.stallrq().set_bit());
    }
}
