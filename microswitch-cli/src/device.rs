use anyhow::{bail, Context, Result};
use log::{debug, info};
use rusb::{Device, DeviceHandle, GlobalContext};
use std::time::Duration;

use microswitch_core::feature::{self, FEATURE_REPORT_LEN};
use microswitch_core::report::REPORT_LEN;
use microswitch_core::usb::{
    HID_GET_REPORT, HID_SET_REPORT, KEYBOARD_EP_IN, KEYBOARD_INTERFACE, PRODUCT_ID,
    REPORT_TYPE_FEATURE, VENDOR_ID,
};
use microswitch_core::{KeyboardReport, TranslationMode};

/// USB control transfer timeout.
const USB_TIMEOUT: Duration = Duration::from_secs(2);

/// Class request, interface recipient, device to host.
const REQUEST_TYPE_IN: u8 = 0xA1;
/// Class request, interface recipient, host to device.
const REQUEST_TYPE_OUT: u8 = 0x21;

/// wValue for GET/SET_REPORT: report type in the high byte, report id 0.
const FEATURE_REPORT_VALUE: u16 = (REPORT_TYPE_FEATURE as u16) << 8;

fn find_device() -> Result<Option<Device<GlobalContext>>> {
    let devices = rusb::devices().context("failed to enumerate USB devices")?;
    for device in devices.iter() {
        let desc = device
            .device_descriptor()
            .context("failed to read device descriptor")?;
        if desc.vendor_id() == VENDOR_ID && desc.product_id() == PRODUCT_ID {
            return Ok(Some(device));
        }
    }
    Ok(None)
}

/// Detect whether the converter is connected. Returns its bus and address.
pub fn detect() -> Result<Option<(u8, u8)>> {
    Ok(find_device()?.map(|d| (d.bus_number(), d.address())))
}

/// An opened converter with its keyboard interface claimed.
pub struct Converter {
    handle: DeviceHandle<GlobalContext>,
}

impl Converter {
    pub fn open() -> Result<Self> {
        let Some(device) = find_device()? else {
            bail!(
                "MicroSwitch converter ({:04x}:{:04x}) not found.",
                VENDOR_ID,
                PRODUCT_ID
            );
        };
        let handle = device
            .open()
            .context("failed to open converter (may need root/sudo or udev rules)")?;

        // Not supported everywhere; the claim below reports the real failure.
        if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
            debug!("auto detach unavailable: {}", e);
        }
        handle
            .claim_interface(KEYBOARD_INTERFACE)
            .context("failed to claim keyboard interface")?;
        info!(
            "opened converter on bus {} address {}",
            device.bus_number(),
            device.address()
        );

        Ok(Self { handle })
    }

    /// HID GET_REPORT for the feature report.
    pub fn read_mode(&self) -> Result<TranslationMode> {
        let mut buf = [0u8; FEATURE_REPORT_LEN];
        let n = self
            .handle
            .read_control(
                REQUEST_TYPE_IN,
                HID_GET_REPORT,
                FEATURE_REPORT_VALUE,
                KEYBOARD_INTERFACE as u16,
                &mut buf,
                USB_TIMEOUT,
            )
            .context("GET_REPORT (feature) failed")?;
        debug!("feature report: {:02x?}", &buf[..n]);

        match feature::decode(&buf[..n]) {
            Some(mode) => Ok(mode),
            None => bail!("short feature report ({} bytes)", n),
        }
    }

    /// HID SET_REPORT for the feature report.
    pub fn write_mode(&self, mode: TranslationMode) -> Result<()> {
        let buf = feature::encode(mode);
        self.handle
            .write_control(
                REQUEST_TYPE_OUT,
                HID_SET_REPORT,
                FEATURE_REPORT_VALUE,
                KEYBOARD_INTERFACE as u16,
                &buf,
                USB_TIMEOUT,
            )
            .context("SET_REPORT (feature) failed")?;
        Ok(())
    }

    /// Wait for the next input report on the interrupt endpoint. Returns
    /// `None` if nothing arrived within `timeout`.
    pub fn read_report(&self, timeout: Duration) -> Result<Option<KeyboardReport>> {
        let mut buf = [0u8; REPORT_LEN];
        match self.handle.read_interrupt(KEYBOARD_EP_IN, &mut buf, timeout) {
            Ok(n) => match KeyboardReport::from_bytes(&buf[..n]) {
                Some(report) => Ok(Some(report)),
                None => bail!("short input report ({} bytes)", n),
            },
            Err(rusb::Error::Timeout) => Ok(None),
            Err(e) => Err(e).context("interrupt read failed"),
        }
    }
}

impl Drop for Converter {
    fn drop(&mut self) {
        let _ = self.handle.release_interface(KEYBOARD_INTERFACE);
    }
}
