//! Repository round trips for family-scoped entities.

use chrono::NaiveDate;
use hearth_core::period::Month;
use hearth_db::models::budget::{CreateBudget, UpdateBudget};
use hearth_db::models::category::CreateCategory;
use hearth_db::models::expense::{CreateExpense, ExpenseFilter};
use hearth_db::models::family::{CreateFamily, Family};
use hearth_db::models::income::{CreateIncome, IncomeFilter};
use hearth_db::models::investment::{CreateInvestment, UpdateInvestment};
use hearth_db::models::receivable::{CreateReceivable, ReceiptIncome};
use hearth_db::models::user::{UpdateUser, User};
use hearth_db::repositories::family_repo::NewAdmin;
use hearth_db::repositories::{
    BudgetRepo, CategoryRepo, DashboardRepo, ExpenseRepo, FamilyRepo, IncomeRepo,
    InvestmentRepo, ReceivableRepo, UserRepo,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

async fn new_family(pool: &PgPool, email: &str) -> (Family, User) {
    FamilyRepo::create_with_admin(
        pool,
        &CreateFamily {
            name: "Silva".to_string(),
            currency: "BRL".to_string(),
        },
        &NewAdmin {
            name: "Ana".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
}

async fn expense_category(pool: &PgPool, family_id: i64, name: &str) -> i64 {
    CategoryRepo::create(
        pool,
        family_id,
        &CreateCategory {
            name: name.to_string(),
            kind: "expense".to_string(),
            color: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn expense(category_id: Option<i64>, amount: &str, spent_on: NaiveDate) -> CreateExpense {
    CreateExpense {
        client_id: None,
        category_id,
        description: "Market".to_string(),
        amount: dec(amount),
        spent_on,
        payment_method: None,
        is_recurring: None,
        notes: None,
    }
}

// ---------------------------------------------------------------------------
// Families and users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_family_seeds_admin_and_categories(pool: PgPool) {
    let (family, admin) = new_family(&pool, "ana@example.com").await;
    assert_eq!(family.currency, "BRL");
    assert_eq!(admin.role, "admin");
    assert_eq!(admin.family_id, family.id);

    let categories = CategoryRepo::list(&pool, family.id, None).await.unwrap();
    assert_eq!(categories.len(), hearth_core::category::DEFAULT_CATEGORIES.len());

    let income_only = CategoryRepo::list(&pool, family.id, Some("income")).await.unwrap();
    assert!(income_only.iter().all(|c| c.kind == "income"));
    assert!(!income_only.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_rolls_back_family(pool: PgPool) {
    new_family(&pool, "dup@example.com").await;
    let result = FamilyRepo::create_with_admin(
        &pool,
        &CreateFamily {
            name: "Other".to_string(),
            currency: "USD".to_string(),
        },
        &NewAdmin {
            name: "Bob".to_string(),
            email: "dup@example.com".to_string(),
            password_hash: "hash".to_string(),
        },
    )
    .await;
    assert!(result.is_err());

    let (families,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM families")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(families, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_lookup_is_family_scoped(pool: PgPool) {
    let (family_a, admin_a) = new_family(&pool, "a@example.com").await;
    let (family_b, _) = new_family(&pool, "b@example.com").await;

    assert!(UserRepo::find_in_family(&pool, family_a.id, admin_a.id)
        .await
        .unwrap()
        .is_some());
    assert!(UserRepo::find_in_family(&pool, family_b.id, admin_a.id)
        .await
        .unwrap()
        .is_none());

    let updated = UserRepo::update(
        &pool,
        family_b.id,
        admin_a.id,
        &UpdateUser {
            name: Some("Hijacked".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(updated.is_none());
    assert_eq!(UserRepo::count_active_admins(&pool, family_a.id).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Transactions and budgets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expense_filters_and_totals(pool: PgPool) {
    let (family, admin) = new_family(&pool, "ana@example.com").await;
    let food = expense_category(&pool, family.id, "Food").await;

    ExpenseRepo::create(&pool, family.id, admin.id, &expense(Some(food), "10.50", date(2026, 3, 2)))
        .await
        .unwrap();
    ExpenseRepo::create(&pool, family.id, admin.id, &expense(Some(food), "4.50", date(2026, 3, 31)))
        .await
        .unwrap();
    ExpenseRepo::create(&pool, family.id, admin.id, &expense(None, "99.00", date(2026, 4, 1)))
        .await
        .unwrap();

    let march = Month::new(2026, 3).unwrap();
    let filter = ExpenseFilter {
        from: Some(march.first_day()),
        to: Some(march.last_day()),
        category_id: None,
    };
    let rows = ExpenseRepo::list(&pool, family.id, &filter, 50, 0).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].spent_on, date(2026, 3, 31), "newest first");
    assert_eq!(ExpenseRepo::total(&pool, family.id, &filter).await.unwrap(), dec("15.00"));

    let spent = ExpenseRepo::category_total(
        &pool,
        family.id,
        food,
        march.first_day(),
        march.last_day(),
    )
    .await
    .unwrap();
    assert_eq!(spent, dec("15.00"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_budget_spending_and_copy(pool: PgPool) {
    let (family, admin) = new_family(&pool, "ana@example.com").await;
    let food = expense_category(&pool, family.id, "Food").await;
    let march = Month::new(2026, 3).unwrap();

    let budget = BudgetRepo::create(
        &pool,
        family.id,
        &CreateBudget {
            category_id: food,
            month: march,
            amount_limit: dec("100.00"),
            alert_threshold_pct: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(budget.month, date(2026, 3, 1));
    assert_eq!(budget.alert_threshold_pct, 80);

    ExpenseRepo::create(
        &pool,
        family.id,
        admin.id,
        &expense(Some(food), "30.00", date(2026, 3, 15)),
    )
    .await
    .unwrap();
    ExpenseRepo::create(&pool, family.id, admin.id, &expense(Some(food), "70.00", date(2026, 4, 1)))
        .await
        .unwrap();

    let listed = BudgetRepo::list_with_spending(&pool, family.id, march.first_day())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].spent, dec("30.00"));
    assert_eq!(listed[0].category_name, "Food");

    let april = march.next();
    let copied = BudgetRepo::copy_month(&pool, family.id, march.first_day(), april.first_day())
        .await
        .unwrap();
    assert_eq!(copied, 1);
    let again = BudgetRepo::copy_month(&pool, family.id, march.first_day(), april.first_day())
        .await
        .unwrap();
    assert_eq!(again, 0, "existing budgets are kept");

    let updated = BudgetRepo::update(
        &pool,
        family.id,
        budget.id,
        &UpdateBudget {
            amount_limit: Some(dec("120.00")),
            alert_threshold_pct: Some(90),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.amount_limit, dec("120.00"));
    assert_eq!(updated.alert_threshold_pct, 90);
}

// ---------------------------------------------------------------------------
// Receivables
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_receive_records_income_once(pool: PgPool) {
    let (family, admin) = new_family(&pool, "ana@example.com").await;
    let receivable = ReceivableRepo::create(
        &pool,
        family.id,
        admin.id,
        &CreateReceivable {
            client_id: None,
            debtor: "  Carlos ".to_string(),
            description: Some("Loan".to_string()),
            amount: dec("250.00"),
            due_on: date(2026, 5, 10),
        },
    )
    .await
    .unwrap();
    assert_eq!(receivable.debtor, "Carlos");
    assert_eq!(receivable.status, "pending");

    let receipt = ReceiptIncome {
        user_id: admin.id,
        category_id: None,
        description: "Loan repaid".to_string(),
    };
    let received = ReceivableRepo::receive(
        &pool,
        family.id,
        receivable.id,
        date(2026, 5, 12),
        Some(&receipt),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(received.status, "received");
    let income_id = received.income_id.expect("income linked");

    let income = IncomeRepo::find_by_id(&pool, family.id, income_id).await.unwrap().unwrap();
    assert_eq!(income.amount, dec("250.00"));
    assert_eq!(income.received_on, date(2026, 5, 12));

    let second = ReceivableRepo::receive(
        &pool,
        family.id,
        receivable.id,
        date(2026, 5, 13),
        Some(&receipt),
    )
    .await
    .unwrap();
    assert!(second.is_none());
    let total = IncomeRepo::total(&pool, family.id, &IncomeFilter::default()).await.unwrap();
    assert_eq!(total, dec("250.00"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overdue_scan_and_summary(pool: PgPool) {
    let (family, admin) = new_family(&pool, "ana@example.com").await;
    for (debtor, due) in [("Late", date(2026, 1, 1)), ("Future", date(2026, 12, 1))] {
        ReceivableRepo::create(
            &pool,
            family.id,
            admin.id,
            &CreateReceivable {
                client_id: None,
                debtor: debtor.to_string(),
                description: None,
                amount: dec("10.00"),
                due_on: due,
            },
        )
        .await
        .unwrap();
    }

    let today = date(2026, 6, 1);
    let overdue = ReceivableRepo::overdue_unnotified(&pool, today).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].debtor, "Late");

    assert!(ReceivableRepo::mark_overdue_notified(&pool, overdue[0].id).await.unwrap());
    assert!(ReceivableRepo::overdue_unnotified(&pool, today).await.unwrap().is_empty());

    let summary = ReceivableRepo::summary(&pool, family.id, today).await.unwrap();
    assert_eq!(summary.pending_count, 2);
    assert_eq!(summary.pending_total, dec("20.00"));
    assert_eq!(summary.overdue_count, 1);
    assert_eq!(summary.overdue_total, dec("10.00"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancelled_receivable_is_immutable(pool: PgPool) {
    let (family, admin) = new_family(&pool, "ana@example.com").await;
    let receivable = ReceivableRepo::create(
        &pool,
        family.id,
        admin.id,
        &CreateReceivable {
            client_id: None,
            debtor: "Dora".to_string(),
            description: None,
            amount: dec("5.00"),
            due_on: date(2026, 2, 1),
        },
    )
    .await
    .unwrap();

    let cancelled = ReceivableRepo::cancel(&pool, family.id, receivable.id).await.unwrap().unwrap();
    assert_eq!(cancelled.status, "cancelled");
    assert!(ReceivableRepo::cancel(&pool, family.id, receivable.id).await.unwrap().is_none());
    assert!(ReceivableRepo::receive(&pool, family.id, receivable.id, date(2026, 2, 2), None)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Investments and dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_investment_defaults_current_value(pool: PgPool) {
    let (family, _) = new_family(&pool, "ana@example.com").await;
    let created = InvestmentRepo::create(
        &pool,
        family.id,
        &CreateInvestment {
            name: "Treasury".to_string(),
            kind: "bonds".to_string(),
            institution: None,
            amount_invested: dec("1000.00"),
            current_value: None,
            started_on: date(2025, 1, 1),
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(created.current_value, dec("1000.00"));

    let updated = InvestmentRepo::update(
        &pool,
        family.id,
        created.id,
        &UpdateInvestment {
            current_value: Some(dec("1100.00")),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.current_value, dec("1100.00"));
    assert_eq!(updated.amount_invested, dec("1000.00"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_aggregates(pool: PgPool) {
    let (family, admin) = new_family(&pool, "ana@example.com").await;
    let food = expense_category(&pool, family.id, "Food").await;

    IncomeRepo::create(
        &pool,
        family.id,
        admin.id,
        &CreateIncome {
            client_id: None,
            category_id: None,
            description: "Salary".to_string(),
            amount: dec("3000.00"),
            received_on: date(2026, 3, 5),
            is_recurring: Some(true),
            notes: None,
        },
    )
    .await
    .unwrap();
    ExpenseRepo::create(&pool, family.id, admin.id, &expense(Some(food), "40.00", date(2026, 3, 6)))
        .await
        .unwrap();
    ExpenseRepo::create(&pool, family.id, admin.id, &expense(None, "60.00", date(2026, 2, 6)))
        .await
        .unwrap();

    let from = date(2026, 2, 1);
    let to = date(2026, 3, 31);
    let monthly = DashboardRepo::monthly_expense(&pool, family.id, from, to).await.unwrap();
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[0].month, date(2026, 2, 1));

    let by_category = DashboardRepo::expense_by_category(&pool, family.id, date(2026, 3, 1), to)
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].category_name.as_deref(), Some("Food"));

    let recent = DashboardRepo::recent_transactions(&pool, family.id, 10).await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].kind, "expense");
    assert_eq!(recent[0].recorded_by.as_deref(), Some("Ana"));

    let incomes_only = DashboardRepo::transactions_between(
        &pool,
        family.id,
        from,
        to,
        Some("income"),
    )
    .await
    .unwrap();
    assert_eq!(incomes_only.len(), 1);
    let all = DashboardRepo::transactions_between(&pool, family.id, from, to, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].occurred_on, date(2026, 2, 6), "chronological order");
}
