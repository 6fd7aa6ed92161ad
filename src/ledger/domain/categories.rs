use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The type of money movement a category describes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
    Transfer,
}

#[derive(Debug, Eq, PartialEq, Error)]
#[error("unknown category kind: {0:?}")]
pub struct UnknownCategoryKind(pub String);

impl CategoryKind {
    pub const ALL: [CategoryKind; 3] = [Self::Income, Self::Expense, Self::Transfer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = UnknownCategoryKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(UnknownCategoryKind(other.to_owned())),
        }
    }
}

/// A persisted category. The pair of `name` and `kind` is unique.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: CategoryKind,
    pub emoji: String,
    #[serde(default)]
    pub comment: String,
}

/// A category that has not been persisted yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub kind: CategoryKind,
    pub emoji: String,
    pub comment: String,
}
