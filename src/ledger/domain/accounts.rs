use serde::{Deserialize, Serialize};

use super::amounts::{self, AmountError};

/// A persisted account. Account names are unique.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub currency: String,
    /// The balance as a decimal string. It only changes as a side effect of a
    /// committed transaction or transfer.
    pub current_balance: String,
    #[serde(default)]
    pub comment: String,
}

impl Account {
    /// The balance as a number. Balances that are unreadable, or too large to
    /// be kept in cents, are errors.
    pub fn balance(&self) -> Result<f64, AmountError> {
        amounts::parse_decimal_string(&self.current_balance)
    }
}

/// An account that has not been persisted yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub currency: String,
    /// Opening balance as a decimal string.
    pub balance: String,
    pub comment: String,
}

#[cfg(test)]
mod test {
    use super::*;

    fn account(balance: &str) -> Account {
        Account {
            id: 1,
            name: "Cash".to_owned(),
            currency: "BYN".to_owned(),
            current_balance: balance.to_owned(),
            comment: String::new(),
        }
    }

    #[test]
    fn balance_is_read_from_decimal_string() {
        assert_eq!(Ok(1234.5), account("1234,5").balance());
    }

    #[test]
    fn infinite_balance_is_unusable() {
        assert!(account("inf").balance().is_err());
        assert!(account("-inf").balance().is_err());
        assert!(account("NaN").balance().is_err());
    }
}
