//! Direct-wired matrix access for the MicroSwitch converter board.
//!
//! The keyboard's own column decoder is driven from the microcontroller:
//!   Column address (outputs):  PB4-PB7
//!   Read strobe (output):      PB0, idle high, active low
//!   Row inputs:                PD0-PD7, one byte per column, active low

use avr_device::atmega32u4::{PORTB, PORTD};

use microswitch_core::MatrixPort;

/// Address lines live in the upper nibble of PORTB.
const ADDR_SHIFT: u8 = 4;
const ADDR_MASK: u8 = 0x0F << ADDR_SHIFT;
/// Read strobe on PB0.
const STROBE: u8 = 1 << 0;

pub struct DirectMatrix<'a> {
    portb: &'a PORTB,
    portd: &'a PORTD,
}

impl<'a> DirectMatrix<'a> {
    /// Configure the address and strobe pins as outputs, strobe idle high.
    pub fn new(portb: &'a PORTB, portd: &'a PORTD) -> Self {
        portb
            .ddrb
            .modify(|r, w| unsafe { w.bits(r.bits() | ADDR_MASK | STROBE) });
        portb
            .portb
            .modify(|r, w| unsafe { w.bits(r.bits() | STROBE) });
        Self { portb, portd }
    }
}

impl MatrixPort for DirectMatrix<'_> {
    fn select_column(&mut self, column: u8) {
        self.portb.portb.modify(|r, w| unsafe {
            w.bits((r.bits() & !ADDR_MASK) | ((column << ADDR_SHIFT) & ADDR_MASK))
        });
    }

    fn assert_strobe(&mut self) {
        self.portb
            .portb
            .modify(|r, w| unsafe { w.bits(r.bits() & !STROBE) });
    }

    fn release_strobe(&mut self) {
        self.portb
            .portb
            .modify(|r, w| unsafe { w.bits(r.bits() | STROBE) });
    }

    fn read_row_byte(&mut self) -> u8 {
        self.portd.pind.read().bits()
    }

    /// ~5us at 16MHz.
    #[inline(always)]
    fn settle(&mut self) {
        for _ in 0..20u8 {
            unsafe { core::arch::asm!("nop") };
        }
    }
}
