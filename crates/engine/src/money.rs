//! Money in integer minor units, plus the shared percentage helper.
//!
//! Every monetary column and command field in the engine is an `i64` count
//! of minor units (cents). [`MoneyMinor`] wraps that count wherever the
//! engine does arithmetic that must not overflow (invoice line and header
//! totals) or renders an amount for humans (alert messages); [`percentage`]
//! is the single place derived ratios are computed.

use std::fmt;

/// A monetary amount in integer minor units (cents).
///
/// ```rust
/// use engine::MoneyMinor;
///
/// let amount = MoneyMinor::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyMinor(i64);

impl MoneyMinor {
    pub const ZERO: MoneyMinor = MoneyMinor(0);

    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Checked addition; `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: MoneyMinor) -> Option<MoneyMinor> {
        self.0.checked_add(rhs.0).map(MoneyMinor)
    }

    /// Checked multiplication by a unitless factor such as an item
    /// quantity; `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, factor: i64) -> Option<MoneyMinor> {
        self.0.checked_mul(factor).map(MoneyMinor)
    }
}

impl fmt::Display for MoneyMinor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let abs = self.0.unsigned_abs();
        write!(f, "{}.{:02}", abs / 100, abs % 100)
    }
}

/// Percentage of `part` over `whole`, in **hundredths of a percent**
/// (2 implied decimals; `1050` means `10.50%`).
///
/// Returns `0` when `whole <= 0` so callers never hit a divide-by-zero.
/// Rounds half away from zero, so `part` may be signed (forecast variance).
#[must_use]
pub fn percentage(part: i64, whole: i64) -> i64 {
    if whole <= 0 {
        return 0;
    }
    let scaled = i128::from(part) * 10_000;
    let whole = i128::from(whole);
    let quotient = (scaled.abs() + whole / 2) / whole;
    let signed = if scaled < 0 { -quotient } else { quotient };
    // Values derived from i64 inputs scaled by 10_000 always fit back.
    signed as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_decimal() {
        assert_eq!(MoneyMinor::new(0).to_string(), "0.00");
        assert_eq!(MoneyMinor::new(1).to_string(), "0.01");
        assert_eq!(MoneyMinor::new(10).to_string(), "0.10");
        assert_eq!(MoneyMinor::new(1050).to_string(), "10.50");
        assert_eq!(MoneyMinor::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn checked_ops_catch_overflow() {
        let max = MoneyMinor::new(i64::MAX);
        assert_eq!(max.checked_add(MoneyMinor::new(1)), None);
        assert_eq!(max.checked_mul(2), None);

        let a = MoneyMinor::new(10_00);
        assert_eq!(a.checked_add(MoneyMinor::new(5_00)), Some(MoneyMinor::new(15_00)));
        assert_eq!(a.checked_mul(3), Some(MoneyMinor::new(30_00)));
    }

    #[test]
    fn percentage_zero_whole_is_zero() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(12345, 0), 0);
        assert_eq!(percentage(-12345, 0), 0);
    }

    #[test]
    fn percentage_rounds_half_up_to_two_decimals() {
        // 100 / 1000 = 10.00%
        assert_eq!(percentage(100, 1000), 1000);
        // 1 / 3 = 33.3333..% -> 33.33%
        assert_eq!(percentage(1, 3), 3333);
        // 1 / 8 = 12.5% exactly
        assert_eq!(percentage(1, 8), 1250);
        // 5 / 800 = 0.625% -> 0.63% (half up)
        assert_eq!(percentage(5, 800), 63);
    }

    #[test]
    fn percentage_signed_part() {
        assert_eq!(percentage(100, 1000), -percentage(-100, 1000));
        assert_eq!(percentage(-100, 1000), -1000);
    }
}
