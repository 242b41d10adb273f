//! Behavioral tests for journal recording, posting and ledger projection.

use std::sync::Arc;

use chrono::NaiveDate;
use lekha_shared::ErrorKind;
use lekha_shared::types::{AccountId, ActorId, FiscalPeriodId, JournalEntryId, TenantId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::account::{Account, AccountType, CreateAccountInput, UpdateAccountInput};
use super::account_service::AccountService;
use super::error::LedgerError;
use super::journal::{CreateJournalEntryInput, EntryReference, JournalLineInput, JournalStatus};
use super::projection::LedgerProjector;
use super::service::JournalService;
use crate::fiscal::{FiscalError, FiscalPeriod, PeriodService};
use crate::memory::InMemoryStore;

struct Books {
    tenant: TenantId,
    actor: ActorId,
    period: FiscalPeriod,
    cash: Account,
    capital: Account,
    periods: Arc<PeriodService<InMemoryStore>>,
    accounts: AccountService<InMemoryStore>,
    journals: JournalService<InMemoryStore, InMemoryStore, InMemoryStore>,
    projector: LedgerProjector<InMemoryStore, InMemoryStore>,
}

impl Books {
    async fn open() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let periods = Arc::new(PeriodService::new(Arc::clone(&store)));
        let accounts = AccountService::new(Arc::clone(&store));
        let journals = JournalService::new(Arc::clone(&store), Arc::clone(&store), Arc::clone(&periods));
        let projector = LedgerProjector::new(Arc::clone(&store), Arc::clone(&store));

        let tenant = TenantId::new();
        let period = periods.create_from_name(tenant, "2082/83").await.unwrap();
        let cash = accounts
            .create(account_input(tenant, "1000", "Cash", AccountType::Asset))
            .await
            .unwrap();
        let capital = accounts
            .create(account_input(tenant, "3000", "Capital", AccountType::Equity))
            .await
            .unwrap();

        Self {
            tenant,
            actor: ActorId::new(),
            period,
            cash,
            capital,
            periods,
            accounts,
            journals,
            projector,
        }
    }

    fn entry(&self, date: NaiveDate, lines: Vec<JournalLineInput>) -> CreateJournalEntryInput {
        CreateJournalEntryInput {
            tenant_id: self.tenant,
            period_id: self.period.id,
            transaction_date: date,
            description: format!("entry on {date}"),
            reference: None,
            lines,
            created_by: self.actor,
        }
    }

    fn cash_in(&self, date: NaiveDate, amount: Decimal) -> CreateJournalEntryInput {
        self.entry(
            date,
            vec![
                JournalLineInput::debit(self.cash.id, amount),
                JournalLineInput::credit(self.capital.id, amount),
            ],
        )
    }

    fn cash_out(&self, date: NaiveDate, amount: Decimal) -> CreateJournalEntryInput {
        self.entry(
            date,
            vec![
                JournalLineInput::debit(self.capital.id, amount),
                JournalLineInput::credit(self.cash.id, amount),
            ],
        )
    }

    async fn posted(&self, input: CreateJournalEntryInput) -> JournalEntryId {
        let entry = self.journals.create(input).await.unwrap();
        self.journals.post(entry.id, self.actor).await.unwrap();
        entry.id
    }
}

fn account_input(tenant_id: TenantId, code: &str, name: &str, account_type: AccountType) -> CreateAccountInput {
    CreateAccountInput {
        tenant_id,
        code: code.to_string(),
        name: name.to_string(),
        account_type,
        parent_id: None,
        description: None,
    }
}

fn ad(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =========================================================================
// Recording and posting
// =========================================================================

#[tokio::test]
async fn test_balanced_entry_is_recorded_then_posted_once() {
    let books = Books::open().await;

    let entry = books
        .journals
        .create(books.cash_in(ad(2025, 8, 1), dec!(500)))
        .await
        .unwrap();
    assert_eq!(entry.status, JournalStatus::Draft);
    assert_eq!(entry.lines.len(), 2);
    assert!(entry.lines.iter().all(|line| line.entry_id == entry.id));
    assert_eq!(entry.total_debit(), dec!(500));
    assert_eq!(entry.total_credit(), dec!(500));
    assert!(entry.posted_at.is_none());

    let posted = books.journals.post(entry.id, books.actor).await.unwrap();
    assert_eq!(posted.status, JournalStatus::Posted);
    assert_eq!(posted.posted_by, Some(books.actor));
    assert!(posted.posted_at.is_some());

    let err = books.journals.post(entry.id, books.actor).await.unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyPosted(id) if id == entry.id));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_unbalanced_entry_is_rejected_and_not_stored() {
    let books = Books::open().await;

    let input = books.entry(
        ad(2025, 8, 1),
        vec![
            JournalLineInput::debit(books.cash.id, dec!(500)),
            JournalLineInput::credit(books.capital.id, dec!(400)),
        ],
    );
    let err = books.journals.create(input).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Unbalanced { debit, credit } if debit == dec!(500) && credit == dec!(400)
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let stored = books.journals.list(books.tenant, books.period.id).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_difference_within_tolerance_is_accepted() {
    let books = Books::open().await;
    let input = books.entry(
        ad(2025, 8, 1),
        vec![
            JournalLineInput::debit(books.cash.id, dec!(100.0001)),
            JournalLineInput::credit(books.capital.id, dec!(100)),
        ],
    );
    books.journals.create(input).await.unwrap();
}

#[tokio::test]
async fn test_extreme_amounts_are_rejected_without_panicking() {
    let books = Books::open().await;

    let overflowing = books.entry(
        ad(2025, 8, 1),
        vec![
            JournalLineInput::debit(books.cash.id, Decimal::MAX),
            JournalLineInput::debit(books.cash.id, Decimal::MAX),
            JournalLineInput::credit(books.capital.id, Decimal::MAX),
        ],
    );
    let err = books.journals.create(overflowing).await.unwrap_err();
    assert!(matches!(err, LedgerError::AmountOutOfRange { line: 0 }));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let too_precise = books.entry(
        ad(2025, 8, 1),
        vec![
            JournalLineInput::debit(books.cash.id, dec!(10.00005)),
            JournalLineInput::credit(books.capital.id, dec!(10.00005)),
        ],
    );
    assert!(matches!(
        books.journals.create(too_precise).await,
        Err(LedgerError::AmountOutOfRange { line: 0 })
    ));

    let too_large = books.entry(
        ad(2025, 8, 1),
        vec![
            JournalLineInput::debit(books.cash.id, dec!(1000000000000000)),
            JournalLineInput::credit(books.capital.id, dec!(1000000000000000)),
        ],
    );
    assert!(matches!(
        books.journals.create(too_large).await,
        Err(LedgerError::AmountOutOfRange { line: 0 })
    ));

    let stored = books.journals.list(books.tenant, books.period.id).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_line_shape_is_validated() {
    let books = Books::open().await;

    let single = books.entry(
        ad(2025, 8, 1),
        vec![JournalLineInput::debit(books.cash.id, dec!(10))],
    );
    assert!(matches!(
        books.journals.create(single).await,
        Err(LedgerError::InsufficientLines(1))
    ));

    let negative = books.entry(
        ad(2025, 8, 1),
        vec![
            JournalLineInput::debit(books.cash.id, dec!(-10)),
            JournalLineInput::credit(books.capital.id, dec!(-10)),
        ],
    );
    assert!(matches!(
        books.journals.create(negative).await,
        Err(LedgerError::NegativeAmount { line: 0 })
    ));
}

#[tokio::test]
async fn test_accounts_must_exist_for_tenant_and_be_active() {
    let books = Books::open().await;

    let missing = AccountId::new();
    let input = books.entry(
        ad(2025, 8, 1),
        vec![
            JournalLineInput::debit(books.cash.id, dec!(10)),
            JournalLineInput::credit(missing, dec!(10)),
        ],
    );
    let err = books.journals.create(input).await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(id) if id == missing));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let foreign = books
        .accounts
        .create(account_input(TenantId::new(), "1000", "Cash", AccountType::Asset))
        .await
        .unwrap();
    let input = books.entry(
        ad(2025, 8, 1),
        vec![
            JournalLineInput::debit(foreign.id, dec!(10)),
            JournalLineInput::credit(books.capital.id, dec!(10)),
        ],
    );
    assert!(matches!(
        books.journals.create(input).await,
        Err(LedgerError::AccountNotFound(_))
    ));

    books
        .accounts
        .update(
            books.tenant,
            books.capital.id,
            UpdateAccountInput {
                is_active: Some(false),
                ..UpdateAccountInput::default()
            },
        )
        .await
        .unwrap();
    let err = books
        .journals
        .create(books.cash_in(ad(2025, 8, 1), dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AccountInactive(id) if id == books.capital.id));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_period_checks_on_create() {
    let books = Books::open().await;

    let err = books
        .journals
        .create(books.cash_in(ad(2026, 7, 16), dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DateOutsidePeriod { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);

    // both boundaries are inside
    books
        .journals
        .create(books.cash_in(books.period.start_date, dec!(1)))
        .await
        .unwrap();
    books
        .journals
        .create(books.cash_in(books.period.end_date, dec!(1)))
        .await
        .unwrap();

    let mut input = books.cash_in(ad(2025, 8, 1), dec!(10));
    input.period_id = FiscalPeriodId::new();
    let err = books.journals.create(input).await.unwrap_err();
    assert!(matches!(err, LedgerError::Fiscal(FiscalError::PeriodNotFound(_))));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let mut input = books.cash_in(ad(2025, 8, 1), dec!(10));
    input.tenant_id = TenantId::new();
    assert!(matches!(
        books.journals.create(input).await,
        Err(LedgerError::Fiscal(FiscalError::PeriodNotFound(_)))
    ));

    books.periods.close(books.period.id, books.actor).await.unwrap();
    let err = books
        .journals
        .create(books.cash_in(ad(2025, 8, 1), dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::EntryInClosedPeriod(id) if id == books.period.id));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_posting_into_closed_period_is_a_state_error() {
    let books = Books::open().await;
    let entry = books
        .journals
        .create(books.cash_in(ad(2025, 8, 1), dec!(500)))
        .await
        .unwrap();

    books.periods.close(books.period.id, books.actor).await.unwrap();
    let err = books.journals.post(entry.id, books.actor).await.unwrap_err();
    assert!(matches!(err, LedgerError::Fiscal(FiscalError::PeriodClosed(_))));
    assert_eq!(err.kind(), ErrorKind::State);

    let stored = books.journals.get(books.tenant, entry.id).await.unwrap();
    assert_eq!(stored.status, JournalStatus::Draft);

    books.periods.reopen(books.period.id).await.unwrap();
    books.journals.post(entry.id, books.actor).await.unwrap();
}

#[tokio::test]
async fn test_period_with_entries_cannot_be_deleted() {
    let books = Books::open().await;
    books
        .journals
        .create(books.cash_in(ad(2025, 8, 1), dec!(25)))
        .await
        .unwrap();

    let err = books.periods.delete(books.period.id).await.unwrap_err();
    assert!(matches!(err, FiscalError::HasEntries(id) if id == books.period.id));
    assert_eq!(err.kind(), ErrorKind::State);

    let listed = books.journals.list(books.tenant, books.period.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    books.periods.get(books.period.id).await.unwrap();

    let empty = books
        .periods
        .create_from_name(books.tenant, "2083/84")
        .await
        .unwrap();
    books.periods.delete(empty.id).await.unwrap();
}

#[tokio::test]
async fn test_unknown_entry() {
    let books = Books::open().await;
    let missing = JournalEntryId::new();
    assert!(matches!(
        books.journals.post(missing, books.actor).await,
        Err(LedgerError::EntryNotFound(_))
    ));
    assert!(matches!(
        books.journals.get(books.tenant, missing).await,
        Err(LedgerError::EntryNotFound(_))
    ));
}

#[tokio::test]
async fn test_entries_are_tenant_scoped_and_keep_reference() {
    let books = Books::open().await;
    let reference = EntryReference {
        id: Uuid::now_v7(),
        kind: "invoice".to_string(),
    };
    let mut input = books.cash_in(ad(2025, 8, 1), dec!(75));
    input.reference = Some(reference.clone());
    let entry = books.journals.create(input).await.unwrap();

    let stored = books.journals.get(books.tenant, entry.id).await.unwrap();
    assert_eq!(stored.reference, Some(reference));
    assert!(matches!(
        books.journals.get(TenantId::new(), entry.id).await,
        Err(LedgerError::EntryNotFound(_))
    ));
    assert!(books
        .journals
        .list(TenantId::new(), books.period.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_posts_succeed_exactly_once() {
    let books = Arc::new(Books::open().await);
    let entry = books
        .journals
        .create(books.cash_in(ad(2025, 8, 1), dec!(500)))
        .await
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let books = Arc::clone(&books);
            tokio::spawn(async move { books.journals.post(entry.id, books.actor).await })
        })
        .collect();

    let mut posted = 0;
    for result in futures::future::join_all(handles).await {
        match result.unwrap() {
            Ok(_) => posted += 1,
            Err(err) => assert!(matches!(err, LedgerError::AlreadyPosted(_))),
        }
    }
    assert_eq!(posted, 1);
}

// =========================================================================
// Ledger projection
// =========================================================================

#[tokio::test]
async fn test_projection_orders_rows_and_runs_balance() {
    let books = Books::open().await;
    let late = books.posted(books.cash_in(ad(2025, 8, 3), dec!(100))).await;
    let first = books.posted(books.cash_in(ad(2025, 8, 1), dec!(500))).await;
    let second = books.posted(books.cash_out(ad(2025, 8, 1), dec!(200))).await;

    let ledger = books
        .projector
        .project(books.tenant, books.cash.id, ad(2025, 8, 1), ad(2025, 8, 31))
        .await
        .unwrap();

    let order: Vec<JournalEntryId> = ledger.entries().iter().map(|row| row.entry_id).collect();
    assert_eq!(order, [first, second, late]);

    let balances: Vec<Decimal> = ledger.entries().iter().map(|row| row.running_balance).collect();
    assert_eq!(balances, [dec!(500), dec!(300), dec!(400)]);
    assert_eq!(ledger.closing_balance(), dec!(400));
    assert_eq!(ledger.total_debit(), dec!(600));
    assert_eq!(ledger.total_credit(), dec!(200));
}

#[tokio::test]
async fn test_projection_uses_debit_minus_credit_for_every_account_type() {
    let books = Books::open().await;
    books.posted(books.cash_in(ad(2025, 8, 1), dec!(500))).await;

    let capital = books
        .projector
        .project(books.tenant, books.capital.id, ad(2025, 8, 1), ad(2025, 8, 31))
        .await
        .unwrap();
    assert_eq!(capital.closing_balance(), dec!(-500));
}

#[tokio::test]
async fn test_projection_excludes_drafts_and_dates_outside_window() {
    let books = Books::open().await;
    books.posted(books.cash_in(ad(2025, 7, 31), dec!(1))).await;
    books.posted(books.cash_in(ad(2025, 8, 10), dec!(10))).await;
    books
        .journals
        .create(books.cash_in(ad(2025, 8, 11), dec!(999)))
        .await
        .unwrap();
    books.posted(books.cash_in(ad(2025, 8, 21), dec!(100))).await;

    let ledger = books
        .projector
        .project(books.tenant, books.cash.id, ad(2025, 8, 1), ad(2025, 8, 20))
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.closing_balance(), dec!(10));

    let single_day = books
        .projector
        .project(books.tenant, books.cash.id, ad(2025, 8, 21), ad(2025, 8, 21))
        .await
        .unwrap();
    assert_eq!(single_day.len(), 1);

    let empty = books
        .projector
        .project(books.tenant, books.cash.id, ad(2025, 9, 1), ad(2025, 9, 30))
        .await
        .unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.closing_balance(), Decimal::ZERO);
}

#[tokio::test]
async fn test_projection_rejects_bad_window_and_foreign_account() {
    let books = Books::open().await;

    let err = books
        .projector
        .project(books.tenant, books.cash.id, ad(2025, 8, 31), ad(2025, 8, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidDateWindow { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(matches!(
        books
            .projector
            .project(TenantId::new(), books.cash.id, ad(2025, 8, 1), ad(2025, 8, 31))
            .await,
        Err(LedgerError::AccountNotFound(_))
    ));
    assert!(matches!(
        books
            .projector
            .project(books.tenant, AccountId::new(), ad(2025, 8, 1), ad(2025, 8, 31))
            .await,
        Err(LedgerError::AccountNotFound(_))
    ));
}

// =========================================================================
// Chart of accounts
// =========================================================================

#[tokio::test]
async fn test_account_codes_are_unique_per_tenant() {
    let books = Books::open().await;

    let err = books
        .accounts
        .create(account_input(books.tenant, "1000", "Petty cash", AccountType::Asset))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateAccountCode(ref code) if code == "1000"));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = books
        .accounts
        .update(
            books.tenant,
            books.capital.id,
            UpdateAccountInput {
                code: Some("1000".to_string()),
                ..UpdateAccountInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateAccountCode(_)));
}

#[tokio::test]
async fn test_account_create_validates_fields_and_parent() {
    let books = Books::open().await;

    assert!(matches!(
        books
            .accounts
            .create(account_input(books.tenant, "  ", "Bank", AccountType::Asset))
            .await,
        Err(LedgerError::EmptyAccountCode)
    ));
    assert!(matches!(
        books
            .accounts
            .create(account_input(books.tenant, "1100", "", AccountType::Asset))
            .await,
        Err(LedgerError::EmptyAccountName)
    ));

    let mut child = account_input(books.tenant, "1010", "Till", AccountType::Asset);
    child.parent_id = Some(books.cash.id);
    let child = books.accounts.create(child).await.unwrap();
    assert_eq!(child.parent_id, Some(books.cash.id));

    let mut orphan = account_input(TenantId::new(), "1010", "Till", AccountType::Asset);
    orphan.parent_id = Some(books.cash.id);
    assert!(matches!(
        books.accounts.create(orphan).await,
        Err(LedgerError::InvalidParent(_))
    ));

    let err = books
        .accounts
        .update(
            books.tenant,
            books.cash.id,
            UpdateAccountInput {
                parent_id: Some(Some(books.cash.id)),
                ..UpdateAccountInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidParent(_)));
}

#[tokio::test]
async fn test_account_parent_cannot_form_a_cycle() {
    let books = Books::open().await;
    let reparent = |parent| UpdateAccountInput {
        parent_id: Some(Some(parent)),
        ..UpdateAccountInput::default()
    };

    let mut till = account_input(books.tenant, "1010", "Till", AccountType::Asset);
    till.parent_id = Some(books.cash.id);
    let till = books.accounts.create(till).await.unwrap();
    let mut drawer = account_input(books.tenant, "1011", "Drawer", AccountType::Asset);
    drawer.parent_id = Some(till.id);
    let drawer = books.accounts.create(drawer).await.unwrap();

    // cash -> till -> drawer; cash may not hang under either descendant
    for descendant in [till.id, drawer.id] {
        let err = books
            .accounts
            .update(books.tenant, books.cash.id, reparent(descendant))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidParent(id) if id == descendant));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    let cash = books.accounts.get(books.tenant, books.cash.id).await.unwrap();
    assert_eq!(cash.parent_id, None);

    // moving a subtree sideways is fine
    let moved = books
        .accounts
        .update(books.tenant, drawer.id, reparent(books.capital.id))
        .await
        .unwrap();
    assert_eq!(moved.parent_id, Some(books.capital.id));
    books
        .accounts
        .update(books.tenant, books.cash.id, reparent(drawer.id))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_account_update_and_listing() {
    let books = Books::open().await;

    let updated = books
        .accounts
        .update(
            books.tenant,
            books.cash.id,
            UpdateAccountInput {
                name: Some("  Cash in hand ".to_string()),
                description: Some(Some("Front desk".to_string())),
                ..UpdateAccountInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Cash in hand");
    assert_eq!(updated.description.as_deref(), Some("Front desk"));
    assert_eq!(updated.code, "1000");

    let codes: Vec<String> = books
        .accounts
        .list(books.tenant)
        .await
        .unwrap()
        .into_iter()
        .map(|account| account.code)
        .collect();
    assert_eq!(codes, ["1000", "3000"]);

    assert!(matches!(
        books.accounts.get(TenantId::new(), books.cash.id).await,
        Err(LedgerError::AccountNotFound(_))
    ));
}
