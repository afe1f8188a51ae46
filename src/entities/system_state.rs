//! System state entity - Key/value bookkeeping for the background engines.
//! Each trigger records the day of its last committed tick here
//! (e.g. `"last_recurring_run"`), written inside the tick's own unit of work.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key/value state row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// State key
    pub key: String,
    /// Value stored as text
    pub value: String,
    /// When the value last changed
    pub updated_at: DateTime,
}

/// `SystemState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
