//! Display helpers for document metadata

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size, e.g. `1.5 KB`; unknown or zero sizes read "Unknown size"
pub fn format_file_size(bytes: Option<u64>) -> String {
    let bytes = match bytes {
        Some(bytes) if bytes > 0 => bytes,
        _ => return "Unknown size".to_string(),
    };

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Long date, e.g. `January 15, 2024`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(None), "Unknown size");
        assert_eq!(format_file_size(Some(0)), "Unknown size");
        assert_eq!(format_file_size(Some(500)), "500 Bytes");
        assert_eq!(format_file_size(Some(1024)), "1 KB");
        assert_eq!(format_file_size(Some(1536)), "1.5 KB");
        assert_eq!(format_file_size(Some(2_621_440)), "2.5 MB");
        assert_eq!(format_file_size(Some(5 * 1024 * 1024 * 1024 * 1024)), "5120 GB");
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap();
        assert_eq!(format_date(&date), "January 5, 2024");
    }
}
