//! `SeaORM` Entity for fiscal_periods table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub start_date_bs: String,
    pub end_date_bs: String,
    pub is_current: bool,
    pub is_closed: bool,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub closed_by: Option<Uuid>,
    pub invoice_prefix: String,
    pub purchase_prefix: String,
    pub voucher_prefix: String,
    pub last_invoice_num: i64,
    pub last_purchase_num: i64,
    pub last_voucher_num: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_entries::Entity")]
    JournalEntries,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
