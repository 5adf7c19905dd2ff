//! Byte size formatting.
//!
//! Display-only conversion of raw byte counts to exact digit strings or
//! human-scaled values with a unit suffix. Values are floored, never rounded,
//! so the output cannot be parsed back into a byte count.

/// How a byte count should be rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizeFormat {
    /// Raw decimal digits, no suffix.
    #[default]
    Exact,
    /// Human-readable, scaled by powers of 1024.
    Binary,
    /// Human-readable, scaled by powers of 1000.
    Decimal,
}

/// Unit prefixes shared by binary and decimal scaling.
const SUFFIXES: [&str; 8] = ["K", "M", "G", "T", "P", "E", "Z", "Y"];

/// Formats a byte count for display.
///
/// In `Binary`/`Decimal` mode a count below the base renders exactly;
/// otherwise the count is repeatedly divided by the base until it drops
/// below the base (or the last suffix is reached) and the floored value is
/// concatenated with the unit letter.
pub fn format_size(bytes: u64, format: SizeFormat) -> String {
    let base = match format {
        SizeFormat::Exact => return bytes.to_string(),
        SizeFormat::Binary => 1024u64,
        SizeFormat::Decimal => 1000u64,
    };

    if bytes < base {
        return bytes.to_string();
    }

    let base = base as f64;
    let mut value = bytes as f64;
    let mut index = 0;

    loop {
        value /= base;

        if value < base || index + 1 == SUFFIXES.len() {
            break;
        }

        index += 1;
    }

    format!("{}{}", value.floor() as u64, SUFFIXES[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact() {
        assert_eq!(format_size(0, SizeFormat::Exact), "0");
        assert_eq!(format_size(512, SizeFormat::Exact), "512");
        assert_eq!(format_size(123_456_789, SizeFormat::Exact), "123456789");
    }

    #[test]
    fn test_below_base_renders_exact() {
        assert_eq!(format_size(0, SizeFormat::Binary), "0");
        assert_eq!(format_size(1023, SizeFormat::Binary), "1023");
        assert_eq!(format_size(999, SizeFormat::Decimal), "999");
    }

    #[test]
    fn test_binary_scaling() {
        assert_eq!(format_size(1024, SizeFormat::Binary), "1K");
        assert_eq!(format_size(1024 * 1024, SizeFormat::Binary), "1M");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024, SizeFormat::Binary), "3G");
    }

    #[test]
    fn test_decimal_scaling_floors() {
        // 1100 / 1000 = 1.1, floored to 1
        assert_eq!(format_size(1100, SizeFormat::Decimal), "1K");
        assert_eq!(format_size(1_999_999, SizeFormat::Decimal), "1M");
    }

    #[test]
    fn test_largest_suffix_is_not_exceeded() {
        assert_eq!(format_size(u64::MAX, SizeFormat::Binary), "16E");
    }
}
