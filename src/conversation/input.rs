//! Validation of the free text users type in answer to a prompt.
//!
//! Nothing in here advances a conversation. A failed validation means the
//! same question gets asked again.

use once_cell::sync::Lazy;
use regex::Regex;
use semval::prelude::*;

use crate::ledger::domain::amounts;

/// The longest name accepted for a category or an account.
pub const MAX_NAME_LENGTH: usize = 50;

/// The longest currency code accepted for an account.
pub const MAX_CURRENCY_LENGTH: usize = 3;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?[0-9]*\.?[0-9]+").expect("number pattern should compile"));

/// Find the first number in a piece of text.
///
/// Both `,` and `.` are accepted as a decimal separator, and anything around
/// the number is ignored, so `"  12,5 rub "` reads as `12.5`. Negative numbers
/// are rejected rather than read without their sign, and so are numbers too
/// large to be kept in cents.
pub fn extract_number(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    let found = NUMBER.find(&normalized)?;
    let value = found.as_str().parse::<f64>().ok()?;

    if amounts::fits_in_cents(value) && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Like [`extract_number`], but zero is rejected too. Every amount that moves
/// money has to be strictly positive.
pub fn extract_amount(text: &str) -> Option<f64> {
    extract_number(text).filter(|value| *value > 0.0)
}

#[derive(Debug, Eq, PartialEq)]
pub enum TextInvalidity {
    /// Nothing but whitespace was entered.
    Empty,

    /// More characters than allowed were entered.
    TooLong { max: usize },
}

fn validate_text(value: &str, max: Option<usize>) -> ValidationResult<TextInvalidity> {
    let mut context = ValidationContext::new().invalidate_if(value.is_empty(), TextInvalidity::Empty);

    if let Some(max) = max {
        context = context.invalidate_if(value.chars().count() > max, TextInvalidity::TooLong { max });
    }

    context.into()
}

/// The name of a category or an account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Name(String);

impl Name {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Validate for Name {
    type Invalidity = TextInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        validate_text(&self.0, Some(MAX_NAME_LENGTH))
    }
}

impl ValidatedFrom<&str> for Name {
    fn validated_from(from: &str) -> ValidatedResult<Self> {
        let into = Self(from.trim().to_owned());

        match into.validate() {
            Ok(()) => Ok(into),
            Err(context) => Err((into, context)),
        }
    }
}

/// The currency an account is kept in, eg `USD`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Validate for CurrencyCode {
    type Invalidity = TextInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        validate_text(&self.0, Some(MAX_CURRENCY_LENGTH))
    }
}

impl ValidatedFrom<&str> for CurrencyCode {
    fn validated_from(from: &str) -> ValidatedResult<Self> {
        let into = Self(from.trim().to_owned());

        match into.validate() {
            Ok(()) => Ok(into),
            Err(context) => Err((into, context)),
        }
    }
}

/// The emoji shown next to a category. Any non-empty text is accepted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Emoji(String);

impl Emoji {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Validate for Emoji {
    type Invalidity = TextInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        validate_text(&self.0, None)
    }
}

impl ValidatedFrom<&str> for Emoji {
    fn validated_from(from: &str) -> ValidatedResult<Self> {
        let into = Self(from.trim().to_owned());

        match into.validate() {
            Ok(()) => Ok(into),
            Err(context) => Err((into, context)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn amount_extraction() {
        assert_eq!(Some(100.0), extract_amount("100"));
        assert_eq!(Some(50.5), extract_amount("50,50"));
        assert_eq!(Some(12.5), extract_amount("  12.5 rub "));
        assert_eq!(Some(0.45), extract_amount(".45"));
        assert_eq!(None, extract_amount("abc"));
        assert_eq!(None, extract_amount("-5"));
        assert_eq!(None, extract_amount("0"));
        assert_eq!(None, extract_amount(""));
    }

    #[test]
    fn number_extraction_accepts_zero() {
        assert_eq!(Some(0.0), extract_number("0"));
        assert_eq!(Some(100.0), extract_number("100 USD"));
        assert_eq!(None, extract_number("-1"));
    }

    #[test]
    fn huge_numbers_are_rejected() {
        let huge = "9".repeat(308);

        assert_eq!(None, extract_amount(&huge));
        assert_eq!(None, extract_number(&huge));
        assert_eq!(Some(1e15), extract_amount("1000000000000000"));
    }

    #[test]
    fn only_ascii_digits_count() {
        assert_eq!(Some(12.0), extract_amount("٣ then 12"));
        assert_eq!(None, extract_amount("٣٤"));
        assert_eq!(None, extract_amount("１２"));
    }

    #[test]
    fn name_is_trimmed() {
        let name = Name::validated_from("  Groceries ").expect("name should be valid");

        assert_eq!("Groceries", name.into_inner());
    }

    #[test]
    fn name_rejects_blank() {
        let (_, context) = Name::validated_from("   ").expect_err("blank name");
        let errors = context.into_iter().collect::<Vec<_>>();

        assert_eq!(vec![TextInvalidity::Empty], errors);
    }

    #[test]
    fn name_length_counts_characters() {
        assert!(Name::validated_from(&"ж".repeat(MAX_NAME_LENGTH) as &str).is_ok());

        let (_, context) =
            Name::validated_from(&"a".repeat(MAX_NAME_LENGTH + 1) as &str).expect_err("too long");
        let errors = context.into_iter().collect::<Vec<_>>();

        assert_eq!(
            vec![TextInvalidity::TooLong {
                max: MAX_NAME_LENGTH
            }],
            errors
        );
    }

    #[test]
    fn currency_code_is_short() {
        assert!(CurrencyCode::validated_from("USD").is_ok());
        assert!(CurrencyCode::validated_from("USDT").is_err());
        assert!(CurrencyCode::validated_from(" ").is_err());
    }

    #[test]
    fn emoji_only_needs_content() {
        assert!(Emoji::validated_from("🍔").is_ok());
        assert!(Emoji::validated_from("anything at all, really").is_ok());
        assert!(Emoji::validated_from("").is_err());
    }
}
