//! Ledger schema migration.
//!
//! Creates the fiscal period, chart of accounts and journal tables together
//! with the triggers that keep posted entries balanced and immutable.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: FISCAL PERIODS
        // ============================================================
        db.execute_unprepared(FISCAL_PERIODS_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM (
    'ASSET',
    'LIABILITY',
    'EQUITY',
    'REVENUE',
    'EXPENSE'
);

CREATE TYPE journal_status AS ENUM ('DRAFT', 'POSTED');
";

const FISCAL_PERIODS_SQL: &str = r"
CREATE TABLE fiscal_periods (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    name VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    start_date_bs VARCHAR(10) NOT NULL,
    end_date_bs VARCHAR(10) NOT NULL,
    is_current BOOLEAN NOT NULL DEFAULT false,
    is_closed BOOLEAN NOT NULL DEFAULT false,
    closed_at TIMESTAMPTZ,
    closed_by UUID,
    invoice_prefix VARCHAR(20) NOT NULL,
    purchase_prefix VARCHAR(20) NOT NULL,
    voucher_prefix VARCHAR(20) NOT NULL,
    last_invoice_num BIGINT NOT NULL DEFAULT 0,
    last_purchase_num BIGINT NOT NULL DEFAULT 0,
    last_voucher_num BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_period_dates CHECK (end_date > start_date),
    CONSTRAINT chk_period_counters CHECK (
        last_invoice_num >= 0 AND last_purchase_num >= 0 AND last_voucher_num >= 0
    ),
    CONSTRAINT chk_period_closed_meta CHECK (is_closed OR (closed_at IS NULL AND closed_by IS NULL)),
    UNIQUE (tenant_id, name)
);

-- At most one current period per tenant
CREATE UNIQUE INDEX uq_fiscal_periods_current ON fiscal_periods(tenant_id) WHERE is_current;
CREATE INDEX idx_fiscal_periods_tenant_start ON fiscal_periods(tenant_id, start_date DESC);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    parent_id UUID REFERENCES accounts(id),
    is_active BOOLEAN NOT NULL DEFAULT true,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_account_not_own_parent CHECK (parent_id IS DISTINCT FROM id),
    UNIQUE (tenant_id, code)
);

CREATE INDEX idx_accounts_tenant ON accounts(tenant_id) WHERE is_active = true;
CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id) ON DELETE RESTRICT,
    transaction_date DATE NOT NULL,
    description TEXT NOT NULL,
    status journal_status NOT NULL DEFAULT 'DRAFT',
    reference_id UUID,
    reference_type VARCHAR(50),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    posted_at TIMESTAMPTZ,
    posted_by UUID,
    CONSTRAINT chk_entry_posted_meta CHECK (
        (status = 'POSTED') = (posted_at IS NOT NULL AND posted_by IS NOT NULL)
    )
);

CREATE INDEX idx_je_tenant_period ON journal_entries(tenant_id, fiscal_period_id, transaction_date, created_at);
CREATE INDEX idx_je_reference ON journal_entries(reference_id) WHERE reference_id IS NOT NULL;
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    transaction_date DATE NOT NULL,
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    description VARCHAR(500),
    CONSTRAINT chk_line_amounts CHECK (debit >= 0 AND credit >= 0),
    UNIQUE (entry_id, line_no)
);

-- Ledger projection: account, then date window
CREATE INDEX idx_jl_account_date ON journal_lines(account_id, transaction_date);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: touch_updated_at
-- ============================================================
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at := now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_fiscal_periods_updated_at
BEFORE UPDATE ON fiscal_periods
FOR EACH ROW
EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_accounts_updated_at
BEFORE UPDATE ON accounts
FOR EACH ROW
EXECUTE FUNCTION touch_updated_at();

-- ============================================================
-- FUNCTION: validate_entry_posting
-- A posted entry must balance and belong to an open period
-- ============================================================
CREATE OR REPLACE FUNCTION validate_entry_posting()
RETURNS TRIGGER AS $$
DECLARE
    total_debit NUMERIC(19, 4);
    total_credit NUMERIC(19, 4);
    period_closed BOOLEAN;
BEGIN
    SELECT fp.is_closed INTO period_closed
    FROM fiscal_periods fp
    WHERE fp.id = NEW.fiscal_period_id;

    IF period_closed THEN
        RAISE EXCEPTION 'Cannot post to closed fiscal period';
    END IF;

    SELECT
        COALESCE(SUM(debit), 0),
        COALESCE(SUM(credit), 0)
    INTO total_debit, total_credit
    FROM journal_lines
    WHERE entry_id = NEW.id;

    IF abs(total_debit - total_credit) > 0.0001 THEN
        RAISE EXCEPTION 'Journal entry is not balanced. Debit: %, Credit: %',
            total_debit, total_credit;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_validate_entry_posting
BEFORE UPDATE ON journal_entries
FOR EACH ROW
WHEN (NEW.status = 'POSTED' AND OLD.status <> 'POSTED')
EXECUTE FUNCTION validate_entry_posting();

-- ============================================================
-- FUNCTION: prevent_posted_entry_modification
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_entry_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'POSTED' THEN
        RAISE EXCEPTION 'Cannot modify posted journal entry. Record a reversing entry instead.';
    END IF;

    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_entry_mod
BEFORE UPDATE OR DELETE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_entry_modification();

-- ============================================================
-- FUNCTION: prevent_posted_line_modification
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_line_modification()
RETURNS TRIGGER AS $$
DECLARE
    target_entry UUID;
    entry_status journal_status;
BEGIN
    IF TG_OP = 'DELETE' THEN
        target_entry := OLD.entry_id;
    ELSE
        target_entry := NEW.entry_id;
    END IF;

    SELECT je.status INTO entry_status
    FROM journal_entries je
    WHERE je.id = target_entry;

    IF entry_status = 'POSTED' THEN
        RAISE EXCEPTION 'Cannot modify lines of a posted journal entry.';
    END IF;

    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_line_mod
BEFORE INSERT OR UPDATE OR DELETE ON journal_lines
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_line_modification();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop triggers
DROP TRIGGER IF EXISTS trg_prevent_posted_line_mod ON journal_lines;
DROP TRIGGER IF EXISTS trg_prevent_posted_entry_mod ON journal_entries;
DROP TRIGGER IF EXISTS trg_validate_entry_posting ON journal_entries;
DROP TRIGGER IF EXISTS trg_accounts_updated_at ON accounts;
DROP TRIGGER IF EXISTS trg_fiscal_periods_updated_at ON fiscal_periods;

-- Drop functions
DROP FUNCTION IF EXISTS prevent_posted_line_modification();
DROP FUNCTION IF EXISTS prevent_posted_entry_modification();
DROP FUNCTION IF EXISTS validate_entry_posting();
DROP FUNCTION IF EXISTS touch_updated_at();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS fiscal_periods CASCADE;

-- Drop enums
DROP TYPE IF EXISTS journal_status CASCADE;
DROP TYPE IF EXISTS account_type CASCADE;
";
