//! Conversions between floating point amounts and the decimal strings that
//! balances are persisted as.

use std::num::ParseFloatError;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("not a number: {0}")]
    Unreadable(#[from] ParseFloatError),

    #[error("{0} is too large to be kept in cents")]
    OutOfRange(f64),
}

/// Round an amount to whole minor units (cents).
///
/// Every balance goes through this before being persisted so that repeated
/// additions do not accumulate floating point noise such as `0.30000000000000004`.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whether an amount survives conversion to cents. Anything that does not
/// would be persisted as `inf`.
pub fn fits_in_cents(value: f64) -> bool {
    (value * 100.0).is_finite()
}

/// Format an amount the way balances are stored: rounded to cents, without
/// trailing zeroes or a trailing decimal point.
///
/// # Examples
///
/// ```
/// # use finance_bot::ledger::domain::amounts::to_decimal_string;
/// assert_eq!("100", to_decimal_string(100.0));
/// assert_eq!("50.5", to_decimal_string(50.5));
/// assert_eq!("0.3", to_decimal_string(0.1 + 0.2));
/// ```
pub fn to_decimal_string(value: f64) -> String {
    let rounded = round_to_cents(value);

    // Avoid rendering negative zero as "-0".
    if rounded == 0.0 {
        return "0".to_owned();
    }

    format!("{}", rounded)
}

/// Parse a persisted balance. Both `.` and `,` are accepted as the decimal
/// separator because balances may have been typed into the table by hand.
pub fn parse_decimal_string(raw: &str) -> Result<f64, AmountError> {
    let value = raw.trim().replace(',', ".").parse::<f64>()?;

    if fits_in_cents(value) {
        Ok(value)
    } else {
        Err(AmountError::OutOfRange(value))
    }
}

/// Render an amount for people: always two decimals with a comma separator,
/// eg `1234,50`.
pub fn display_amount(value: f64) -> String {
    format!("{:.2}", round_to_cents(value)).replace('.', ",")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decimal_string_drops_trailing_zeroes() {
        assert_eq!("100", to_decimal_string(100.0));
        assert_eq!("150.5", to_decimal_string(100.0 + 50.5));
        assert_eq!("-12.25", to_decimal_string(-12.25));
    }

    #[test]
    fn decimal_string_rounds_to_cents() {
        assert_eq!("0.3", to_decimal_string(0.1 + 0.2));
        assert_eq!("10.01", to_decimal_string(10.005_1));
        assert_eq!("0", to_decimal_string(-0.001));
    }

    #[test]
    fn parse_accepts_comma_separator() {
        assert_eq!(Ok(12.5), parse_decimal_string("12,5"));
        assert_eq!(Ok(7.0), parse_decimal_string(" 7 "));
        assert!(parse_decimal_string("seven").is_err());
    }

    #[test]
    fn parse_refuses_values_without_cents() {
        assert!(matches!(
            parse_decimal_string("inf"),
            Err(AmountError::OutOfRange(_))
        ));
        assert!(parse_decimal_string("NaN").is_err());
        assert!(parse_decimal_string("1e307").is_err());
        assert_eq!(Ok(1e300), parse_decimal_string("1e300"));
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!("1234,50", display_amount(1234.5));
        assert_eq!("0,00", display_amount(0.0));
    }
}
