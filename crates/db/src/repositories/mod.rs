//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every query on
//! family-owned data is filtered by `family_id`.

pub mod budget_repo;
pub mod category_repo;
pub mod dashboard_repo;
pub mod expense_repo;
pub mod family_repo;
pub mod income_repo;
pub mod investment_repo;
pub mod notification_repo;
pub mod push_subscription_repo;
pub mod receivable_repo;
pub mod session_repo;
pub mod user_repo;

pub use budget_repo::BudgetRepo;
pub use category_repo::CategoryRepo;
pub use dashboard_repo::DashboardRepo;
pub use expense_repo::ExpenseRepo;
pub use family_repo::FamilyRepo;
pub use income_repo::IncomeRepo;
pub use investment_repo::InvestmentRepo;
pub use notification_repo::NotificationRepo;
pub use push_subscription_repo::PushSubscriptionRepo;
pub use receivable_repo::ReceivableRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
