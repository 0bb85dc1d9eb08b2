//! Elapsed-time arithmetic and display formatting.

/// Seconds in a day, for midnight rollover.
const DAY_SECS: u32 = 86_400;

/// Elapsed seconds between two seconds-since-midnight readings.
///
/// When the end reading is earlier than the start, the run is assumed to
/// have crossed exactly one midnight, so the result is never negative and
/// never wraps into a huge value.
pub fn elapsed_between(first: u32, last: u32) -> u64 {
    if last >= first {
        (last - first) as u64
    } else {
        ((DAY_SECS - first) + last) as u64
    }
}

/// Format an elapsed-seconds value for display ("42s", "3m 05s", "1h 02m").
pub fn format_elapsed(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_same_day() {
        assert_eq!(elapsed_between(28_800, 28_805), 5);
        assert_eq!(elapsed_between(100, 100), 0);
    }

    #[test]
    fn test_elapsed_across_midnight() {
        // 23:59:50 -> 00:00:10
        assert_eq!(elapsed_between(86_390, 10), 20);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0s");
        assert_eq!(format_elapsed(42), "42s");
        assert_eq!(format_elapsed(185), "3m 05s");
        assert_eq!(format_elapsed(3_720), "1h 02m");
    }
}
