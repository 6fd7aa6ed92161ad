use std::{sync::Arc, time::Duration};

use serde_json::json;

use super::*;
use crate::{
    ledger::domain::{accounts::NewAccount, categories::CategoryKind},
    repos::memory::{MemoryLedgerRepo, Write},
    sessions::MemorySessionStore,
    telegram::recording::{RecordingMessenger, Sent},
};

const ALICE: ChatId = ChatId(100);
const BOB: ChatId = ChatId(200);
const STRANGER: ChatId = ChatId(999);

struct Harness {
    bot: Bot,
    repo: Arc<MemoryLedgerRepo>,
    messenger: Arc<RecordingMessenger>,
}

impl Harness {
    fn new() -> Self {
        let repo = Arc::new(MemoryLedgerRepo::default());
        let messenger = Arc::new(RecordingMessenger::default());
        let states = StateManager::new(
            Arc::new(MemorySessionStore::new()),
            Duration::from_secs(300),
        );

        let bot = Bot::new(
            Access::new([ALICE, BOB], Some(ALICE)),
            "BYN".to_owned(),
            LedgerService::new(repo.clone()),
            messenger.clone(),
            states,
        );

        Self {
            bot,
            repo,
            messenger,
        }
    }

    async fn text(&self, chat: ChatId, text: &str) {
        let update = serde_json::from_str(&json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "date": 1700000000,
                "from": {"id": chat.0, "is_bot": false, "first_name": "Alice"},
                "chat": {"id": chat.0, "type": "private"},
                "text": text
            }
        }).to_string())
        .expect("update should parse");

        self.bot.handle_update(update).await;
    }

    async fn press(&self, chat: ChatId, data: &str) {
        let update = serde_json::from_str(&json!({
            "update_id": 2,
            "callback_query": {
                "id": format!("cb-{}", data),
                "from": {"id": chat.0, "is_bot": false, "first_name": "Alice"},
                "message": {
                    "message_id": 1,
                    "date": 1700000000,
                    "chat": {"id": chat.0, "type": "private"},
                    "text": "Choose an option"
                },
                "chat_instance": "x",
                "data": data
            }
        }).to_string())
        .expect("update should parse");

        self.bot.handle_update(update).await;
    }

    fn step(&self, chat: ChatId) -> Step {
        self.bot.states.current_step(chat)
    }

    fn last_text(&self, chat: ChatId) -> String {
        self.messenger.last_text_to(chat).unwrap_or_default()
    }

    fn last_keyboard(&self, chat: ChatId) -> Option<Keyboard> {
        self.messenger
            .sent()
            .into_iter()
            .rev()
            .find_map(|sent| match sent {
                Sent::Options {
                    chat: to, keyboard, ..
                } if to == chat => Some(keyboard),
                _ => None,
            })
    }

    async fn fill_account(&self, name: &str) {
        self.text(ALICE, "/addaccount").await;
        self.text(ALICE, name).await;
        self.text(ALICE, "USD").await;
        self.text(ALICE, "100").await;
    }
}

#[tokio::test]
async fn account_flow_writes_one_account() {
    let harness = Harness::new();

    harness.fill_account("Cash").await;
    assert_eq!(Step::AddAccountConfirm, harness.step(ALICE));
    assert!(harness.repo.writes().is_empty());

    harness.press(ALICE, "confirm_confirm").await;

    assert_eq!(
        vec![Write::Account(NewAccount {
            name: "Cash".to_owned(),
            currency: "USD".to_owned(),
            balance: "100".to_owned(),
            comment: String::new(),
        })],
        harness.repo.writes()
    );
    assert_eq!(Step::Default, harness.step(ALICE));

    let accounts = harness.bot.ledger.accounts().await.unwrap();
    assert!(accounts.iter().any(|account| account.name == "Cash"));
}

#[tokio::test]
async fn income_flow_records_and_moves_balance() {
    let harness = Harness::new();
    let cash = harness.repo.seed_account("Cash", "BYN", "100");
    let salary = harness
        .repo
        .seed_category("Salary", CategoryKind::Income, "💰");

    harness.text(ALICE, "/addincome").await;
    harness.press(ALICE, &format!("account_{}", cash.id)).await;
    harness.press(ALICE, &format!("category_{}", salary.id)).await;
    harness.text(ALICE, "got 50.5 today").await;

    assert_eq!(Step::AddTransactionConfirm, harness.step(ALICE));
    assert!(harness.last_text(ALICE).contains("Amount: 50,50"));

    harness.press(ALICE, "confirm_confirm").await;

    let transactions = harness.repo.transactions();
    assert_eq!(1, transactions.len());
    assert_eq!(TransactionKind::Income, transactions[0].kind);
    assert_eq!(50.5, transactions[0].amount);
    assert_eq!(cash.id, transactions[0].account_id);
    assert_eq!("Salary", transactions[0].category_name);
    assert_eq!("100", transactions[0].balance_before);
    assert_eq!("150.5", transactions[0].balance_after);
    assert_eq!(Some("150.5".to_owned()), harness.repo.balance_of(cash.id));
    assert_eq!(Step::Default, harness.step(ALICE));
}

#[tokio::test]
async fn transaction_type_keyboard_leads_to_accounts() {
    let harness = Harness::new();
    harness.repo.seed_account("Cash", "BYN", "10");
    harness
        .repo
        .seed_category("Food", CategoryKind::Expense, "🍔");

    harness.text(ALICE, "/addtransaction").await;
    assert_eq!(Step::AddTransactionType, harness.step(ALICE));

    harness.press(ALICE, "transaction_type_expense").await;

    assert_eq!(Step::AddTransactionAccount, harness.step(ALICE));
    assert_eq!(messages::CHOOSE_ACCOUNT, harness.last_text(ALICE));
}

#[tokio::test]
async fn add_transaction_button_asks_for_type() {
    let harness = Harness::new();

    harness.text(ALICE, "📝 Add transaction").await;

    assert_eq!(Step::AddTransactionType, harness.step(ALICE));
    assert_eq!(Some(keyboards::transaction_types()), harness.last_keyboard(ALICE));
}

#[tokio::test]
async fn income_without_categories_resets() {
    let harness = Harness::new();
    harness.repo.seed_account("Cash", "BYN", "10");

    harness.text(ALICE, "/addincome").await;

    assert_eq!(Step::Default, harness.step(ALICE));
    assert_eq!(
        messages::no_categories(TransactionKind::Income),
        harness.last_text(ALICE)
    );
}

#[tokio::test]
async fn cancel_discards_everything() {
    let harness = Harness::new();

    harness.fill_account("Cash").await;
    harness.messenger.clear();
    harness.press(ALICE, "confirm_cancel").await;

    assert!(harness.repo.writes().is_empty());
    assert_eq!(Step::Default, harness.step(ALICE));
    assert_eq!(
        vec![messages::CANCELLED.to_owned(), messages::START_OVER.to_owned()],
        harness.messenger.texts_to(ALICE)
    );
}

#[tokio::test]
async fn cancel_command_works_mid_flow() {
    let harness = Harness::new();

    harness.text(ALICE, "/addaccount").await;
    harness.text(ALICE, "Cash").await;
    harness.text(ALICE, "❌ Cancel").await;

    assert_eq!(Step::Default, harness.step(ALICE));
    assert_eq!(messages::START_OVER, harness.last_text(ALICE));
    assert!(harness.repo.writes().is_empty());
}

#[tokio::test]
async fn strangers_are_turned_away_without_state() {
    let harness = Harness::new();

    harness.text(STRANGER, "/addaccount").await;
    harness.press(STRANGER, "confirm_confirm").await;

    assert_eq!(messages::ACCESS_DENIED, harness.last_text(STRANGER));
    assert_eq!(None, harness.bot.states.get(STRANGER));
    assert!(harness.repo.writes().is_empty());
}

#[tokio::test]
async fn unexpected_text_resets() {
    let harness = Harness::new();

    harness.text(ALICE, "hello").await;

    assert_eq!(messages::UNKNOWN_COMMAND, harness.last_text(ALICE));
    assert_eq!(Step::Default, harness.step(ALICE));
}

#[tokio::test]
async fn stale_button_resets() {
    let harness = Harness::new();

    harness.text(ALICE, "/addaccount").await;
    harness.press(ALICE, "account_1").await;

    assert_eq!(messages::UNKNOWN_CALLBACK, harness.last_text(ALICE));
    assert_eq!(Step::Default, harness.step(ALICE));
}

#[tokio::test]
async fn bad_amount_reprompts_in_place() {
    let harness = Harness::new();
    let cash = harness.repo.seed_account("Cash", "BYN", "100");
    let food = harness
        .repo
        .seed_category("Food", CategoryKind::Expense, "🍔");

    harness.text(ALICE, "/addexpense").await;
    harness.press(ALICE, &format!("account_{}", cash.id)).await;
    harness.press(ALICE, &format!("category_{}", food.id)).await;

    let huge = "9".repeat(308);
    for attempt in ["abc", "0", "-5", huge.as_str()] {
        harness.text(ALICE, attempt).await;

        assert_eq!(messages::INVALID_AMOUNT, harness.last_text(ALICE));
        assert_eq!(Step::AddTransactionAmount, harness.step(ALICE));
    }
    assert!(harness.repo.writes().is_empty());
}

#[tokio::test]
async fn lost_state_starts_over() {
    let harness = Harness::new();

    harness.text(ALICE, "/addaccount").await;
    harness.bot.states.clear(ALICE);

    let staged = harness
        .bot
        .stage(ALICE, Draft::Empty, Step::AddAccountCurrency)
        .await;

    assert_eq!(None, staged);
    assert_eq!(Step::Default, harness.step(ALICE));
    assert_eq!(messages::START_OVER, harness.last_text(ALICE));
}

#[tokio::test]
async fn success_reaches_every_allowed_chat() {
    let harness = Harness::new();

    harness.fill_account("Cash").await;
    harness.press(ALICE, "confirm_confirm").await;

    let notice = "✅ Alice added the account Cash (USD) with a balance of 100".to_owned();
    assert!(harness.messenger.texts_to(ALICE).contains(&notice));
    assert!(harness.messenger.texts_to(BOB).contains(&notice));
}

#[tokio::test]
async fn unreachable_chat_is_reported_to_operator() {
    let harness = Harness::new();
    harness.messenger.make_unreachable(BOB);

    harness.fill_account("Cash").await;
    harness.press(ALICE, "confirm_confirm").await;

    assert_eq!(1, harness.repo.writes().len());
    assert!(harness
        .messenger
        .texts_to(ALICE)
        .iter()
        .any(|text| text.starts_with("⚠️ Failed to reach chat 200")));
}

#[tokio::test]
async fn comment_is_staged_and_committed() {
    let harness = Harness::new();

    harness.fill_account("Cash").await;
    harness.press(ALICE, "confirm_comment").await;

    assert_eq!(Step::AddAccountComment, harness.step(ALICE));
    assert_eq!(messages::ENTER_COMMENT, harness.last_text(ALICE));
    assert_eq!(Some(Keyboard::RemoveReply), harness.last_keyboard(ALICE));

    harness.text(ALICE, "  savings  ").await;

    assert_eq!(Step::AddAccountConfirm, harness.step(ALICE));
    assert!(harness.last_text(ALICE).contains("Comment: savings"));
    let staged = harness.bot.states.get(ALICE).expect("state should be kept");
    assert_eq!(Some("savings"), staged.draft.comment());

    harness.press(ALICE, "confirm_confirm").await;

    match harness.repo.writes().as_slice() {
        [Write::Account(account)] => assert_eq!("savings", account.comment),
        other => panic!("unexpected writes: {:?}", other),
    }
}

#[tokio::test]
async fn edit_starts_the_flow_again() {
    let harness = Harness::new();

    harness.fill_account("Cash").await;
    harness.press(ALICE, "confirm_edit").await;

    assert_eq!(Step::AddAccountName, harness.step(ALICE));
    assert_eq!(messages::ENTER_ACCOUNT_NAME, harness.last_text(ALICE));

    harness.text(ALICE, "Wallet").await;
    harness.text(ALICE, "EUR").await;
    harness.text(ALICE, "0").await;

    assert!(harness.last_text(ALICE).contains("Name: Wallet"));
    harness.press(ALICE, "confirm_confirm").await;

    assert_eq!(
        vec![Write::Account(NewAccount {
            name: "Wallet".to_owned(),
            currency: "EUR".to_owned(),
            balance: "0".to_owned(),
            comment: String::new(),
        })],
        harness.repo.writes()
    );
}

#[tokio::test]
async fn duplicate_account_name_is_refused_in_place() {
    let harness = Harness::new();
    harness.repo.seed_account("Cash", "BYN", "1");

    harness.text(ALICE, "/addaccount").await;
    harness.text(ALICE, "Cash").await;

    assert_eq!(Step::AddAccountName, harness.step(ALICE));
    assert_eq!(messages::duplicate_account("Cash"), harness.last_text(ALICE));
}

#[tokio::test]
async fn duplicate_category_asks_for_another_type() {
    let harness = Harness::new();
    harness
        .repo
        .seed_category("Food", CategoryKind::Expense, "🍔");

    harness.text(ALICE, "/addcategory").await;
    harness.text(ALICE, "Food").await;
    harness.press(ALICE, "category_type_expense").await;

    assert_eq!(Step::AddCategoryType, harness.step(ALICE));
    assert_eq!(
        messages::duplicate_category("Food", CategoryKind::Expense),
        harness.last_text(ALICE)
    );

    harness.press(ALICE, "category_type_income").await;
    harness.text(ALICE, "🥗").await;
    harness.press(ALICE, "confirm_confirm").await;

    match harness.repo.writes().as_slice() {
        [Write::Category(category)] => {
            assert_eq!("Food", category.name);
            assert_eq!(CategoryKind::Income, category.kind);
            assert_eq!("🥗", category.emoji);
        }
        other => panic!("unexpected writes: {:?}", other),
    }
}

#[tokio::test]
async fn callbacks_are_acknowledged_first() {
    let harness = Harness::new();

    harness.press(ALICE, "confirm_confirm").await;
    harness.press(STRANGER, "nonsense").await;

    let sent = harness.messenger.sent();
    assert_eq!(Sent::Acknowledgement("cb-confirm_confirm".to_owned()), sent[0]);
    assert!(sent.contains(&Sent::Acknowledgement("cb-nonsense".to_owned())));
}

#[tokio::test]
async fn transfer_offers_other_accounts_and_moves_money() {
    let harness = Harness::new();
    let cash = harness.repo.seed_account("Cash", "BYN", "100");
    let card = harness.repo.seed_account("Card", "BYN", "5");
    let bank = harness.repo.seed_account("Bank", "BYN", "20");

    harness.text(ALICE, "/addtransfer").await;
    harness.press(ALICE, &format!("transfer_from_{}", cash.id)).await;

    let offered: Vec<CallbackToken> = match harness.last_keyboard(ALICE) {
        Some(Keyboard::Inline(rows)) => rows.into_iter().flatten().map(|b| b.token).collect(),
        other => panic!("unexpected keyboard: {:?}", other),
    };
    assert_eq!(
        vec![
            CallbackToken::TransferTo(card.id),
            CallbackToken::TransferTo(bank.id)
        ],
        offered
    );

    harness.press(ALICE, &format!("transfer_to_{}", cash.id)).await;
    assert_eq!(Step::AddTransferToAccount, harness.step(ALICE));

    harness.press(ALICE, &format!("transfer_to_{}", bank.id)).await;
    harness.text(ALICE, "30").await;
    harness.press(ALICE, "confirm_confirm").await;

    assert_eq!(Some("70".to_owned()), harness.repo.balance_of(cash.id));
    assert_eq!(Some("50".to_owned()), harness.repo.balance_of(bank.id));
    assert_eq!(2, harness.repo.transactions().len());
}

#[tokio::test]
async fn transfer_needs_two_accounts() {
    let harness = Harness::new();
    harness.repo.seed_account("Cash", "BYN", "100");

    harness.text(ALICE, "/addtransfer").await;

    assert_eq!(messages::NEED_TWO_ACCOUNTS, harness.last_text(ALICE));
    assert_eq!(Step::Default, harness.step(ALICE));
}

#[tokio::test]
async fn balances_do_not_touch_state() {
    let harness = Harness::new();
    harness.repo.seed_account("Cash", "BYN", "1234.5");

    harness.text(ALICE, "/addaccount").await;
    harness.text(ALICE, "/balances").await;

    assert!(harness.last_text(ALICE).contains("Cash: 1234,50 BYN"));
    assert_eq!(Step::AddAccountName, harness.step(ALICE));
}

#[tokio::test]
async fn edit_in_transaction_flow_keeps_choices() {
    let harness = Harness::new();
    let cash = harness.repo.seed_account("Cash", "BYN", "100");
    let salary = harness
        .repo
        .seed_category("Salary", CategoryKind::Income, "💰");

    harness.text(ALICE, "/addincome").await;
    harness.press(ALICE, &format!("account_{}", cash.id)).await;
    harness.press(ALICE, &format!("category_{}", salary.id)).await;
    harness.text(ALICE, "50").await;
    harness.press(ALICE, "confirm_edit").await;

    assert_eq!(Step::AddTransactionAmount, harness.step(ALICE));
    assert_eq!(messages::ENTER_AMOUNT, harness.last_text(ALICE));
    match harness.bot.states.get(ALICE).map(|state| state.draft) {
        Some(Draft::Transaction(draft)) => {
            assert_eq!(Some(TransactionKind::Income), draft.kind);
            assert_eq!(Some(cash.id), draft.account_id);
            assert_eq!(Some("Salary".to_owned()), draft.category_name);
        }
        other => panic!("unexpected draft: {:?}", other),
    }

    harness.text(ALICE, "75").await;
    assert_eq!(Step::AddTransactionConfirm, harness.step(ALICE));
    harness.press(ALICE, "confirm_confirm").await;

    let transactions = harness.repo.transactions();
    assert_eq!(1, transactions.len());
    assert_eq!(75.0, transactions[0].amount);
    assert_eq!(Some("175".to_owned()), harness.repo.balance_of(cash.id));
}

#[tokio::test]
async fn edit_in_transfer_flow_offers_sources_again() {
    let harness = Harness::new();
    let cash = harness.repo.seed_account("Cash", "BYN", "100");
    let card = harness.repo.seed_account("Card", "BYN", "50");

    harness.text(ALICE, "/addtransfer").await;
    harness.press(ALICE, &format!("transfer_from_{}", cash.id)).await;
    harness.press(ALICE, &format!("transfer_to_{}", card.id)).await;
    harness.text(ALICE, "30").await;
    harness.press(ALICE, "confirm_edit").await;

    assert_eq!(Step::AddTransferFromAccount, harness.step(ALICE));
    assert_eq!(messages::CHOOSE_FROM_ACCOUNT, harness.last_text(ALICE));
    assert_eq!(
        Some(keyboards::accounts(
            &[cash.clone(), card.clone()],
            CallbackToken::TransferFrom
        )),
        harness.last_keyboard(ALICE)
    );

    harness.press(ALICE, &format!("transfer_from_{}", card.id)).await;
    harness.press(ALICE, &format!("transfer_to_{}", cash.id)).await;
    harness.text(ALICE, "10").await;
    harness.press(ALICE, "confirm_confirm").await;

    assert_eq!(Some("40".to_owned()), harness.repo.balance_of(card.id));
    assert_eq!(Some("110".to_owned()), harness.repo.balance_of(cash.id));
}

#[tokio::test]
async fn failed_transfer_credit_is_reported() {
    let harness = Harness::new();
    let cash = harness.repo.seed_account("Cash", "BYN", "100");
    let card = harness.repo.seed_account("Card", "BYN", "5");
    harness.repo.fail_transactions_for(card.id);

    harness.text(ALICE, "/addtransfer").await;
    harness.press(ALICE, &format!("transfer_from_{}", cash.id)).await;
    harness.press(ALICE, &format!("transfer_to_{}", card.id)).await;
    harness.text(ALICE, "30").await;
    harness.press(ALICE, "confirm_confirm").await;

    assert!(harness.last_text(ALICE).starts_with("❌ Transfer failed"));
    assert_eq!(Some(keyboards::main_menu()), harness.last_keyboard(ALICE));
    assert_eq!(Step::Default, harness.step(ALICE));
    assert_eq!(Some("70".to_owned()), harness.repo.balance_of(cash.id));
    assert_eq!(Some("5".to_owned()), harness.repo.balance_of(card.id));
    assert_eq!(1, harness.repo.transactions().len());
    assert!(harness.messenger.texts_to(BOB).is_empty());
}

#[tokio::test]
async fn failed_balance_write_is_reported() {
    let harness = Harness::new();
    let cash = harness.repo.seed_account("Cash", "BYN", "100");
    let food = harness
        .repo
        .seed_category("Food", CategoryKind::Expense, "🍔");
    harness.repo.fail_balance_updates_for(cash.id);

    harness.text(ALICE, "/addexpense").await;
    harness.press(ALICE, &format!("account_{}", cash.id)).await;
    harness.press(ALICE, &format!("category_{}", food.id)).await;
    harness.text(ALICE, "20").await;
    harness.press(ALICE, "confirm_confirm").await;

    assert!(harness
        .last_text(ALICE)
        .starts_with("❌ Adding the transaction failed"));
    assert_eq!(Step::Default, harness.step(ALICE));
    assert_eq!(1, harness.repo.transactions().len());
    assert_eq!(Some("100".to_owned()), harness.repo.balance_of(cash.id));
    assert!(harness.messenger.texts_to(BOB).is_empty());
}
