//! MicroSwitch keyboard converter firmware for ATmega32U4.
//!
//! Reads the keyboard's own column decoder directly and presents it to the
//! host as a USB HID boot keyboard. All key handling lives in
//! `microswitch-core`; this crate only wires the pins and the USB controller
//! to it.

#![no_std]
#![no_main]
#![feature(asm_experimental_arch)]

mod hid;
mod matrix;

use avr_device::atmega32u4::Peripherals;

use hid::UsbKeyboard;
use matrix::DirectMatrix;
use microswitch_core::Keyboard;

/// Nothing to report a panic to; halt.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Watchdog may still be running after a bootloader jump. Clear WDRF
    // first, WDE cannot be cleared while it is set.
    dp.CPU.mcusr.modify(|_, w| w.wdrf().clear_bit());
    dp.WDT
        .wdtcsr
        .write(|w| w.wdce().set_bit().wde().set_bit());
    dp.WDT.wdtcsr.write(|w| unsafe { w.bits(0) });

    // Disable clock prescaler (CLKPR)
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) }); // Prescaler = 1

    let mut matrix = DirectMatrix::new(&dp.PORTB, &dp.PORTD);

    let mut usb = UsbKeyboard::new();
    usb.init(&dp);

    let mut keyboard = Keyboard::new();

    loop {
        // Scan key matrix, edges go straight into the key state
        keyboard.scan(&mut matrix);

        // Poll USB (handle enumeration, control requests)
        usb.poll(&dp, &mut keyboard);

        // Send report if changed
        usb.send_report(&dp, &mut keyboard);
    }
}
