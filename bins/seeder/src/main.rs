//! Demo ledger seeder for Lekha development.
//!
//! Seeds a demo tenant with a chart of accounts, the current Bikram Sambat
//! fiscal year, a posted opening entry and a first invoice number, then
//! logs the cash ledger. Running it again reuses what already exists.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use lekha_core::fiscal::{FiscalError, FiscalPeriod, PeriodService};
use lekha_core::ledger::{
    Account, AccountService, AccountType, CreateAccountInput, CreateJournalEntryInput,
    EntryReference, JournalLineInput, JournalService, LedgerError, LedgerProjector,
};
use lekha_db::{AccountRepository, FiscalPeriodRepository, JournalRepository};
use lekha_shared::AppConfig;
use lekha_shared::types::{ActorId, TenantId};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Demo tenant ID (consistent for all seeds)
const DEMO_TENANT_ID: Uuid = Uuid::from_u128(1);
/// Demo actor ID (consistent for all seeds)
const DEMO_ACTOR_ID: Uuid = Uuid::from_u128(2);
/// Fiscal year seeded as current.
const DEMO_FISCAL_YEAR: &str = "2082/83";

/// Chart of accounts: code, name, type.
const CHART: [(&str, &str, AccountType); 5] = [
    ("1000", "Cash in Hand", AccountType::Asset),
    ("2000", "Accounts Payable", AccountType::Liability),
    ("3000", "Owner's Capital", AccountType::Equity),
    ("4000", "Sales", AccountType::Revenue),
    ("5000", "Rent Expense", AccountType::Expense),
];

type Journals = JournalService<JournalRepository, AccountRepository, FiscalPeriodRepository>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = lekha_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    // wired once, shared by every caller
    let period_repo = Arc::new(FiscalPeriodRepository::new(db.clone()));
    let account_repo = Arc::new(AccountRepository::new(db.clone()));
    let journal_repo = Arc::new(JournalRepository::new(db));
    let periods = Arc::new(PeriodService::with_numbering(
        period_repo,
        &config.numbering,
    ));
    let accounts = AccountService::new(Arc::clone(&account_repo));
    let journals = JournalService::new(
        Arc::clone(&journal_repo),
        Arc::clone(&account_repo),
        Arc::clone(&periods),
    );
    let projector = LedgerProjector::new(journal_repo, account_repo);

    let tenant = TenantId::from_uuid(DEMO_TENANT_ID);
    let actor = ActorId::from_uuid(DEMO_ACTOR_ID);

    info!("Seeding fiscal period...");
    let period = seed_period(&periods, tenant).await?;

    info!("Seeding chart of accounts...");
    let chart = seed_accounts(&accounts, tenant).await?;
    let cash = &chart[0];
    let capital = &chart[2];

    info!("Seeding opening entry...");
    seed_opening_entry(&journals, &period, cash, capital, actor).await?;

    let invoice = periods.generate_invoice_number(period.id).await?;
    info!(%invoice, "Issued invoice number");

    let ledger = projector
        .project(tenant, cash.id, period.start_date, period.end_date)
        .await?;
    for row in &ledger {
        info!(
            date = %row.transaction_date,
            description = %row.description,
            debit = %row.debit,
            credit = %row.credit,
            balance = %row.running_balance,
            "{}",
            cash.name
        );
    }
    info!(closing_balance = %ledger.closing_balance(), "Seeding complete!");
    Ok(())
}

/// Creates the demo fiscal year, or reuses it, and marks it current.
async fn seed_period(
    periods: &PeriodService<FiscalPeriodRepository>,
    tenant: TenantId,
) -> anyhow::Result<FiscalPeriod> {
    let period = match periods.create_from_name(tenant, DEMO_FISCAL_YEAR).await {
        Ok(period) => period,
        Err(FiscalError::DuplicateName(_)) => {
            info!("  Fiscal period already exists, reusing...");
            periods
                .list(tenant)
                .await?
                .into_iter()
                .find(|p| p.name == DEMO_FISCAL_YEAR)
                .context("existing fiscal period disappeared")?
        }
        Err(err) => return Err(err.into()),
    };
    Ok(periods.set_as_current(tenant, period.id).await?)
}

/// Creates the chart of accounts, reusing accounts whose code exists.
async fn seed_accounts(
    accounts: &AccountService<AccountRepository>,
    tenant: TenantId,
) -> anyhow::Result<Vec<Account>> {
    let existing = accounts.list(tenant).await?;
    let mut chart = Vec::with_capacity(CHART.len());
    for (code, name, account_type) in CHART {
        if let Some(account) = existing.iter().find(|a| a.code == code) {
            chart.push(account.clone());
            continue;
        }
        let account = accounts
            .create(CreateAccountInput {
                tenant_id: tenant,
                code: code.to_string(),
                name: name.to_string(),
                account_type,
                parent_id: None,
                description: None,
            })
            .await?;
        info!(code, name, "  Created account");
        chart.push(account);
    }
    Ok(chart)
}

/// Records and posts the owner's opening capital once.
async fn seed_opening_entry(
    journals: &Journals,
    period: &FiscalPeriod,
    cash: &Account,
    capital: &Account,
    actor: ActorId,
) -> anyhow::Result<()> {
    let reference = EntryReference {
        id: Uuid::from_u128(3),
        kind: "OPENING".to_string(),
    };
    let existing = journals.list(period.tenant_id, period.id).await?;
    if existing.iter().any(|e| e.reference.as_ref() == Some(&reference)) {
        info!("  Opening entry already exists, skipping...");
        return Ok(());
    }

    let amount = Decimal::new(100_000, 0);
    let entry = journals
        .create(CreateJournalEntryInput {
            tenant_id: period.tenant_id,
            period_id: period.id,
            transaction_date: period.start_date,
            description: "Opening capital".to_string(),
            reference: Some(reference),
            lines: vec![
                JournalLineInput::debit(cash.id, amount),
                JournalLineInput::credit(capital.id, amount),
            ],
            created_by: actor,
        })
        .await?;

    match journals.post(entry.id, actor).await {
        Ok(_) => info!(entry_id = %entry.id, "  Posted opening entry"),
        Err(LedgerError::Fiscal(FiscalError::PeriodClosed(_))) => {
            info!("  Period is closed; opening entry left as draft");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
