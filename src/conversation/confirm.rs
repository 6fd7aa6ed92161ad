//! The decision gate every flow ends with.

use std::{fmt, str::FromStr};

use super::state::{Flow, Step};

/// The four answers accepted at a confirmation step.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
    Edit,
    Comment,
}

impl ConfirmAction {
    pub const ALL: [ConfirmAction; 4] = [Self::Confirm, Self::Cancel, Self::Edit, Self::Comment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Edit => "edit",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfirmAction {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == raw)
            .ok_or(())
    }
}

/// What to do with a flow's staged answers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Write the staged answers to storage, then reset.
    Commit,

    /// Throw the staged answers away and reset.
    Discard,

    /// Go back to an earlier step of the same flow, keeping what was staged.
    Rewind(Step),

    /// Ask for a comment, then come back to confirmation.
    AwaitComment(Step),
}

/// The shared table mapping a confirmation answer to a transition.
pub fn decide(flow: Flow, action: ConfirmAction) -> Decision {
    match action {
        ConfirmAction::Confirm => Decision::Commit,
        ConfirmAction::Cancel => Decision::Discard,
        ConfirmAction::Edit => Decision::Rewind(flow.edit_step()),
        ConfirmAction::Comment => Decision::AwaitComment(flow.comment_step()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn edit_rewinds_within_flow() {
        assert_eq!(
            Decision::Rewind(Step::AddTransactionAmount),
            decide(Flow::Transaction, ConfirmAction::Edit)
        );
        assert_eq!(
            Decision::Rewind(Step::AddCategoryName),
            decide(Flow::Category, ConfirmAction::Edit)
        );
        assert_eq!(
            Decision::Rewind(Step::AddAccountName),
            decide(Flow::Account, ConfirmAction::Edit)
        );
    }

    #[test]
    fn comment_awaits_flow_comment_step() {
        assert_eq!(
            Decision::AwaitComment(Step::AddTransferComment),
            decide(Flow::Transfer, ConfirmAction::Comment)
        );
    }

    #[test]
    fn actions_parse() {
        for action in ConfirmAction::ALL {
            assert_eq!(Ok(action), action.as_str().parse());
        }
        assert_eq!(Err(()), "maybe".parse::<ConfirmAction>());
    }
}
