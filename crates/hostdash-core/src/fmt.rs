//! Shared formatting helpers.
//!
//! Byte counts, uptime phrases, and the timestamp formats every collector
//! stamps onto its results.

use chrono::Local;

/// Placeholder shown when a value could not be obtained by any strategy.
pub const UNKNOWN: &str = "Desconhecido";

const BYTE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Format a byte count with two decimals in the largest unit that keeps the
/// scaled value below 1024 (`"1.00 KB"`, `"3.42 GB"`).
pub fn format_bytes(bytes: u64) -> String {
    format_bytes_with_precision(bytes as f64, 2)
}

/// Format a byte count with the given number of decimals.
///
/// Negative and non-finite values render as `"0 B"`. PB is the largest unit,
/// so values beyond it are shown as large PB figures.
pub fn format_bytes_with_precision(value: f64, precision: usize) -> String {
    if !value.is_finite() || value < 0.0 {
        return "0 B".to_string();
    }

    let mut scaled = value;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    format!("{:.*} {}", precision, scaled, BYTE_UNITS[unit])
}

/// Parse a textual byte count and format it; unparsable text renders as `"0 B"`.
pub fn format_bytes_str(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(v) => format_bytes_with_precision(v, 2),
        Err(_) => "0 B".to_string(),
    }
}

/// Format seconds since boot as `"up 2 dias, 3 horas, 1 minuto"`.
///
/// Days appear only when non-zero, hours when days or hours are non-zero,
/// minutes always.
pub fn format_uptime(uptime_secs: f64) -> String {
    let total = if uptime_secs.is_finite() && uptime_secs > 0.0 {
        uptime_secs as u64
    } else {
        0
    };
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    let plural = |n: u64, word: &str| {
        if n == 1 {
            format!("{n} {word}")
        } else {
            format!("{n} {word}s")
        }
    };

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(plural(days, "dia"));
    }
    if hours > 0 || days > 0 {
        parts.push(plural(hours, "hora"));
    }
    parts.push(plural(minutes, "minuto"));

    format!("up {}", parts.join(", "))
}

/// Current local time as ISO-8601 with microseconds and no offset
/// (`2024-01-01T12:00:00.000000`).
pub fn iso_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Current local wall-clock time as `2024-01-01 12:00:00`.
pub fn wall_clock() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(512), "512.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_format_bytes_negative_and_garbage() {
        assert_eq!(format_bytes_with_precision(-5.0, 2), "0 B");
        assert_eq!(format_bytes_with_precision(f64::NAN, 2), "0 B");
        assert_eq!(format_bytes_str("not a number"), "0 B");
        assert_eq!(format_bytes_str("2048"), "2.00 KB");
    }

    #[test]
    fn test_format_bytes_scaled_value_below_1024() {
        for v in [0u64, 1, 1023, 1024, 1_048_575, 1_048_576, 5_000_000_000, 1 << 50] {
            let s = format_bytes(v);
            let (num, unit) = s.split_once(' ').unwrap();
            let num: f64 = num.parse().unwrap();
            if unit != "PB" {
                assert!(num < 1024.0, "{s}");
            }
        }
    }

    #[test]
    fn test_format_bytes_top_unit_is_pb() {
        let huge = 1024f64.powi(6) * 3.0;
        assert_eq!(format_bytes_with_precision(huge, 1), "3072.0 PB");
    }

    #[test]
    fn test_format_bytes_precision() {
        assert_eq!(format_bytes_with_precision(1536.0, 0), "2 KB");
        assert_eq!(format_bytes_with_precision(1536.0, 3), "1.500 KB");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(59.0), "up 0 minutos");
        assert_eq!(format_uptime(60.0), "up 1 minuto");
        assert_eq!(format_uptime(3_600.0 + 120.0), "up 1 hora, 2 minutos");
        assert_eq!(format_uptime(86_400.0 + 60.0), "up 1 dia, 0 horas, 1 minuto");
        assert_eq!(
            format_uptime(2.0 * 86_400.0 + 5.0 * 3_600.0 + 7.0 * 60.0),
            "up 2 dias, 5 horas, 7 minutos"
        );
    }

    #[test]
    fn test_iso_timestamp_shape() {
        let ts = iso_timestamp();
        // 2024-01-01T12:00:00.000000
        assert_eq!(ts.len(), 26);
        assert_eq!(&ts[10..11], "T");
        assert_eq!(&ts[19..20], ".");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(12.34, 1), 12.3);
    }
}
