//! Text listings of the matrix layout and of decoded input reports.

use microswitch_core::keys::{self, KeyInfo, MATRIX_SIZE};
use microswitch_core::{KeyboardReport, Keycode, Shift};

const HEADER: &str = "pos  col row  usage  key          shift";

fn key_name(key: &KeyInfo) -> String {
    match key.keycode() {
        Some(kc) if key.is_mapped() => kc.display_name().to_string(),
        Some(_) => "-".to_string(),
        None => format!("?{:02X}", key.usage),
    }
}

/// One line of the layout table.
pub fn format_row(index: usize) -> String {
    let key = keys::lookup(index);
    let (column, row) = keys::position(index);
    let shift = match key.shift {
        Shift::None => "",
        s => s.name(),
    };
    format!(
        "{:>3}  {:>3} {:>3}  0x{:02X}   {:<12} {}",
        index,
        column,
        row,
        key.usage,
        key_name(key),
        shift
    )
    .trim_end()
    .to_string()
}

/// The whole layout table, optionally leaving out unwired positions.
pub fn format_table(mapped_only: bool) -> Vec<String> {
    let mut lines = vec![HEADER.to_string()];
    lines.extend(
        (0..MATRIX_SIZE)
            .filter(|&i| !mapped_only || keys::lookup(i).is_mapped())
            .map(format_row),
    );
    lines
}

/// Modifiers and keys of an input report, e.g. `LEFT_SHIFT + A`.
pub fn describe_report(report: &KeyboardReport) -> String {
    let mut parts: Vec<String> = report
        .modifiers
        .iter_names()
        .map(|(name, _)| name.to_string())
        .collect();

    if report.is_rollover() {
        parts.push(Keycode::ErrorRollOver.display_name().to_string());
    } else {
        parts.extend(report.pressed().map(|usage| match Keycode::from_usage(usage) {
            Some(kc) => kc.display_name().to_string(),
            None => format!("0x{:02X}", usage),
        }));
    }

    if parts.is_empty() {
        "(none)".to_string()
    } else {
        parts.join(" + ")
    }
}
