use crate::types::{DisplayConfig, RateResult, UnitMode};

/// Shown when neither direction is enabled
pub const PLACEHOLDER: &str = "—";

/// KiB/s value from which [`UnitMode::Auto`] switches to MB/s
const AUTO_MB_THRESHOLD_KIB: f64 = 1000.0;

/// Render a byte rate as `"<n> KB/s"` or `"<n> MB/s"`.
///
/// KB/s is shown with one decimal, MB/s with two. Units are binary
/// (1 KB = 1024 bytes). Negative and NaN rates render as zero.
#[must_use]
pub fn format_speed(bytes_per_second: f64, unit_mode: UnitMode) -> String {
    let bytes_per_second = if bytes_per_second.is_nan() {
        0.0
    } else {
        bytes_per_second.max(0.0)
    };
    let kib = bytes_per_second / 1024.0;

    match unit_mode {
        UnitMode::Kb => format_kib(kib),
        UnitMode::Mb => format_mib(kib / 1024.0),
        UnitMode::Auto if kib >= AUTO_MB_THRESHOLD_KIB => format_mib(kib / 1024.0),
        UnitMode::Auto => format_kib(kib),
    }
}

// Ties round up (0.25 -> 0.3); `{:.1}` alone would round them to even.
fn format_kib(kib: f64) -> String {
    format!("{:.1} KB/s", (kib * 10.0).round() / 10.0)
}

fn format_mib(mib: f64) -> String {
    format!("{:.2} MB/s", (mib * 100.0).round() / 100.0)
}

/// Compose the panel text for a pair of rates
#[must_use]
pub fn compose_display(config: &DisplayConfig, rates: &RateResult) -> String {
    match (config.show_download, config.show_upload) {
        (true, true) => format!(
            "↓ {}  ↑ {}",
            format_speed(rates.rx_bytes_per_sec, config.unit_mode),
            format_speed(rates.tx_bytes_per_sec, config.unit_mode)
        ),
        (true, false) => format!(
            "↓ {}",
            format_speed(rates.rx_bytes_per_sec, config.unit_mode)
        ),
        (false, true) => format!(
            "↑ {}",
            format_speed(rates.tx_bytes_per_sec, config.unit_mode)
        ),
        (false, false) => PLACEHOLDER.to_string(),
    }
}
