//! Formatting helpers shared across UIs.

/// Format a KPI value according to its unit string.
///
/// Percentages and durations keep one decimal; currency gets a symbol
/// and compact suffix; bare counts (users, transactions, ...) are
/// compacted to K/M above a thousand.
pub fn format_value(value: f64, unit: &str) -> String {
    match unit {
        "%" => format!("{:.1}%", value),
        "seconds" => format!("{:.1}s", value),
        "minutes" => format!("{:.1}m", value),
        "hours" => format!("{:.1}h", value),
        "currency" => format!("${}", compact_count(value)),
        "ratio" => format!("{:.2}", value),
        _ => compact_count(value),
    }
}

/// Compact a count for display (e.g., "14.2M", "3.5K", "842").
fn compact_count(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent_and_durations() {
        assert_eq!(format_value(85.0, "%"), "85.0%");
        assert_eq!(format_value(182.35, "seconds"), "182.4s");
        assert_eq!(format_value(1.5, "hours"), "1.5h");
    }

    #[test]
    fn test_format_counts() {
        assert_eq!(format_value(50_000.0, "users"), "50.0K");
        assert_eq!(format_value(14_200_000.0, "transactions"), "14.2M");
        assert_eq!(format_value(842.0, "transfers"), "842");
        assert_eq!(format_value(3.5, "sessions"), "3.50");
    }

    #[test]
    fn test_format_currency_and_ratio() {
        assert_eq!(format_value(10_000_000.0, "currency"), "$10.0M");
        assert_eq!(format_value(4.0, "ratio"), "4.00");
    }
}
