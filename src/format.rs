//! Byte-size and date formatting for headers and listing pages.

use std::time::SystemTime;

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size with a 1024 base, rounded down to at most two decimals.
///
/// ```
/// # use webroot::format::format_size;
/// assert_eq!(format_size(5), "5 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// assert_eq!(format_size(1_048_575), "1023.99 KB");
/// ```
pub fn format_size(size: u64) -> String {
    let mut unit = 0;
    let mut divisor: u64 = 1;
    while unit < SIZE_UNITS.len() - 1 && size / divisor >= 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let hundredths = u128::from(size) * 100 / u128::from(divisor);
    let whole = hundredths / 100;
    let frac = hundredths % 100;
    let unit = SIZE_UNITS[unit];

    match frac {
        0 => format!("{whole} {unit}"),
        f if f % 10 == 0 => format!("{whole}.{} {unit}", f / 10),
        f => format!("{whole}.{f:02} {unit}"),
    }
}

/// Timestamp as shown in the listing's "Last Modified" column, e.g. `Tue, Mar 5, '24, 9:07`.
pub fn format_listing_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %b %-d, '%y, %-H:%M")
        .to_string()
}

/// IMF-fixdate, as used by the `Date` and `Last-Modified` headers.
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn sizes_pick_the_largest_whole_unit() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(3 * 1024 * 1024 + 256 * 1024), "3.25 MB");
        assert_eq!(format_size(5 * 1024u64.pow(4)), "5 TB");
        assert_eq!(format_size(2048 * 1024u64.pow(4)), "2048 TB");
    }

    #[test]
    fn dates_are_utc() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);

        assert_eq!(http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(format_listing_date(t), "Sun, Nov 6, '94, 8:49");
    }
}
