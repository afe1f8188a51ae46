//! Entity module - SeaORM entity definitions for every table the engine touches.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod analytics_summary;
pub mod budget;
pub mod goal;
pub mod recurring_transaction;
pub mod reminder;
pub mod subscription;
pub mod system_state;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use analytics_summary::{
    Column as AnalyticsSummaryColumn, Entity as AnalyticsSummary, Model as AnalyticsSummaryModel,
};
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use goal::{Column as GoalColumn, Entity as Goal, GoalStatus, Model as GoalModel};
pub use recurring_transaction::{
    Column as RecurringTransactionColumn, Entity as RecurringTransaction,
    Model as RecurringTransactionModel,
};
pub use reminder::{
    Column as ReminderColumn, Entity as Reminder, Model as ReminderModel, ReminderKind,
};
pub use subscription::{
    Column as SubscriptionColumn, Entity as Subscription, Model as SubscriptionModel,
};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use transaction::{
    Column as TransactionColumn, Direction, Entity as Transaction, Model as TransactionModel,
};
