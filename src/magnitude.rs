use serde::{Deserialize, Serialize};
use std::fmt;

/// A unit ladder: divide by `step` until the value drops below it.
///
/// When every rung is exhausted the value is printed in `overflow` if the
/// ladder has one (an unbounded final tier), otherwise in the last rung
/// without dividing again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ladder {
    pub step: f64,
    pub units: &'static [&'static str],
    pub overflow: Option<&'static str>,
}

/// Byte counts, base 1024, capped at terabytes.
pub const BYTES: Ladder = Ladder {
    step: 1024.0,
    units: &["bytes", "KB", "MB", "GB", "TB"],
    overflow: None,
};

/// Durations given in microseconds, base 1000, anything past milliseconds is seconds.
pub const TIME: Ladder = Ladder {
    step: 1000.0,
    units: &["microseconds", "milliseconds"],
    overflow: Some("seconds"),
};

impl Ladder {
    /// Format `value` as `"<value with one decimal> <unit>"`.
    ///
    /// Negative (and NaN) values produce an empty string, which chart axes use
    /// to suppress a tick label.
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() || value < 0.0 {
            return String::new();
        }

        let mut x = value;
        let last = self.units.len().saturating_sub(1);
        for (idx, unit) in self.units.iter().enumerate() {
            if x < self.step || (idx == last && self.overflow.is_none()) {
                return format!("{x:.1} {unit}");
            }
            x /= self.step;
        }

        // Only reachable with an overflow tier (or an empty ladder).
        format!("{x:.1} {}", self.overflow.unwrap_or_default())
    }
}

/// Which ladder a number is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnitFamily {
    Bytes,
    Time,
}

impl UnitFamily {
    pub fn ladder(self) -> &'static Ladder {
        match self {
            UnitFamily::Bytes => &BYTES,
            UnitFamily::Time => &TIME,
        }
    }

    pub fn format(self, value: f64) -> String {
        self.ladder().format(value)
    }

    pub fn name(self) -> &'static str {
        match self {
            UnitFamily::Bytes => "bytes",
            UnitFamily::Time => "time",
        }
    }
}

impl fmt::Display for UnitFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format a byte count.
pub fn format_bytes(bytes: f64) -> String {
    BYTES.format(bytes)
}

/// Format a duration in microseconds.
pub fn format_time(micros: f64) -> String {
    TIME.format(micros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn unit_of(formatted: &str) -> &str {
        formatted.split_once(' ').map(|(_, u)| u).unwrap_or_default()
    }

    #[rstest]
    #[case(0.0, "0.0 bytes")]
    #[case(512.0, "512.0 bytes")]
    #[case(1024.0, "1.0 KB")]
    #[case(1536.0, "1.5 KB")]
    #[case(1_048_576.0, "1.0 MB")]
    #[case(5_819_520.0, "5.5 MB")]
    #[case(1_073_741_824.0, "1.0 GB")]
    #[case(1_099_511_627_776.0, "1.0 TB")]
    #[case(1_125_899_906_842_624.0, "1024.0 TB")]
    fn bytes_ladder(#[case] input: f64, #[case] expected: &str) {
        assert_eq!(format_bytes(input), expected);
    }

    #[rstest]
    #[case(0.0, "0.0 microseconds")]
    #[case(500.0, "500.0 microseconds")]
    #[case(1500.0, "1.5 milliseconds")]
    #[case(999_999.0, "1000.0 milliseconds")]
    #[case(2_500_000.0, "2.5 seconds")]
    #[case(8_190_766_005.0, "8190.8 seconds")]
    fn time_ladder(#[case] input: f64, #[case] expected: &str) {
        assert_eq!(format_time(input), expected);
    }

    #[test]
    fn nan_is_suppressed() {
        assert_eq!(format_bytes(f64::NAN), "");
        assert_eq!(format_time(f64::NAN), "");
    }

    #[test]
    fn unit_family_dispatches_to_ladder() {
        assert_eq!(UnitFamily::Bytes.format(2048.0), "2.0 KB");
        assert_eq!(UnitFamily::Time.format(1500.0), "1.5 milliseconds");
    }

    #[test]
    fn custom_ladder_without_overflow_stops_at_last_rung() {
        let ladder = Ladder {
            step: 10.0,
            units: &["a", "b"],
            overflow: None,
        };
        assert_eq!(ladder.format(5.0), "5.0 a");
        assert_eq!(ladder.format(50.0), "5.0 b");
        assert_eq!(ladder.format(5000.0), "500.0 b");
    }

    proptest! {
        #[test]
        fn below_one_kib_is_bytes(x in 0.0f64..1024.0) {
            let formatted = format_bytes(x);
            prop_assert_eq!(unit_of(&formatted), "bytes");
        }

        #[test]
        fn below_one_mib_is_kb(x in 1024.0f64..1_048_576.0) {
            let formatted = format_bytes(x);
            prop_assert_eq!(unit_of(&formatted), "KB");
        }

        #[test]
        fn negative_values_have_no_label(x in -1e15f64..-1e-9) {
            prop_assert_eq!(format_bytes(x), "");
            prop_assert_eq!(format_time(x), "");
        }

        #[test]
        fn huge_durations_fall_through_to_seconds(x in 1_000_000.0f64..1e12) {
            let formatted = format_time(x);
            prop_assert_eq!(unit_of(&formatted), "seconds");
        }
    }
}
