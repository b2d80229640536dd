use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    BudgetNewCmd, BudgetUpdateCmd, Engine, EngineError, ExpenseAction, ExpenseNewCmd,
    ExpenseStatus, ExpenseUpdateCmd, ForecastNewCmd, InvoiceNewCmd, InvoiceStatus,
    InvoiceUpdateCmd, ItemInput,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob", "carol"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

async fn workspace(engine: &Engine) -> String {
    engine.new_workspace("Acme", "alice").await.unwrap()
}

async fn budget(engine: &Engine, workspace_id: &str, total_minor: i64) -> String {
    engine
        .new_budget(BudgetNewCmd::new(
            workspace_id,
            "alice",
            "Q3 Ops",
            total_minor,
            "operations",
            date(2026, 7, 1),
            date(2026, 9, 30),
        ))
        .await
        .unwrap()
}

async fn expense(engine: &Engine, workspace_id: &str, budget_id: &str, amount: i64) -> String {
    engine
        .new_expense(
            ExpenseNewCmd::new(
                workspace_id,
                "alice",
                "Team offsite",
                amount,
                "travel",
                date(2026, 7, 15),
            )
            .budget_id(budget_id),
        )
        .await
        .unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Budget aggregation and the expense state machine
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn spent_counts_only_approved_expenses() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let budget_id = budget(&engine, &ws, 1000_00).await;

    let approved = expense(&engine, &ws, &budget_id, 100_00).await;
    let _pending = expense(&engine, &ws, &budget_id, 50_00).await;
    let rejected = expense(&engine, &ws, &budget_id, 30_00).await;

    engine
        .decide_expense(&approved, ExpenseAction::Approve, "alice")
        .await
        .unwrap();
    engine
        .decide_expense(&rejected, ExpenseAction::Reject, "alice")
        .await
        .unwrap();

    let view = engine.budget_view(&budget_id, "alice").await.unwrap();
    assert_eq!(view.spent_minor, 100_00);
    assert_eq!(view.remaining_minor, 900_00);
    assert_eq!(view.spent_pct, 10_00);
    assert!(!view.is_over_budget);
    assert!(!view.is_near_limit);

    assert_eq!(
        engine.budget_spent_cache(&budget_id, "alice").await.unwrap(),
        100_00
    );
}

#[tokio::test]
async fn expense_decisions_are_terminal() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let budget_id = budget(&engine, &ws, 1000_00).await;
    let expense_id = expense(&engine, &ws, &budget_id, 100_00).await;

    let status = engine
        .decide_expense(&expense_id, ExpenseAction::Approve, "alice")
        .await
        .unwrap();
    assert_eq!(status, ExpenseStatus::Approved);

    // A second decision must fail and must not double-count the amount.
    let err = engine
        .decide_expense(&expense_id, ExpenseAction::Approve, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    let err = engine
        .decide_expense(&expense_id, ExpenseAction::Reject, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    assert_eq!(
        engine.budget_spent_cache(&budget_id, "alice").await.unwrap(),
        100_00
    );
}

#[tokio::test]
async fn relinking_an_approved_expense_moves_the_spent_amount() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let first = budget(&engine, &ws, 1000_00).await;
    let second = engine
        .new_budget(BudgetNewCmd::new(
            &ws,
            "alice",
            "Q3 Marketing",
            500_00,
            "marketing",
            date(2026, 7, 1),
            date(2026, 9, 30),
        ))
        .await
        .unwrap();

    let expense_id = expense(&engine, &ws, &first, 200_00).await;
    engine
        .decide_expense(&expense_id, ExpenseAction::Approve, "alice")
        .await
        .unwrap();
    assert_eq!(engine.budget_spent_cache(&first, "alice").await.unwrap(), 200_00);

    engine
        .update_expense(
            &expense_id,
            ExpenseUpdateCmd {
                budget_id: Some(Some(second.clone())),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(engine.budget_spent_cache(&first, "alice").await.unwrap(), 0);
    assert_eq!(engine.budget_spent_cache(&second, "alice").await.unwrap(), 200_00);

    // Detach: both caches return to zero.
    engine
        .update_expense(
            &expense_id,
            ExpenseUpdateCmd {
                budget_id: Some(None),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(engine.budget_spent_cache(&second, "alice").await.unwrap(), 0);
}

#[tokio::test]
async fn deleting_an_approved_expense_recomputes_the_cache() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let budget_id = budget(&engine, &ws, 1000_00).await;
    let expense_id = expense(&engine, &ws, &budget_id, 300_00).await;
    engine
        .decide_expense(&expense_id, ExpenseAction::Approve, "alice")
        .await
        .unwrap();

    engine.delete_expense(&expense_id, "alice").await.unwrap();
    assert_eq!(
        engine.budget_spent_cache(&budget_id, "alice").await.unwrap(),
        0
    );
}

#[tokio::test]
async fn budget_delete_refuses_linked_expenses_unless_forced() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let budget_id = budget(&engine, &ws, 1000_00).await;
    let expense_id = expense(&engine, &ws, &budget_id, 100_00).await;

    let err = engine
        .delete_budget(&budget_id, false, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    engine.delete_budget(&budget_id, true, "alice").await.unwrap();

    // The expense survives, detached.
    let survivor = engine.expense(&expense_id, "alice").await.unwrap();
    assert_eq!(survivor.budget_id, None);
}

#[tokio::test]
async fn budget_date_range_is_validated_on_update_too() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let budget_id = budget(&engine, &ws, 1000_00).await;

    let err = engine
        .update_budget(
            &budget_id,
            BudgetUpdateCmd {
                end_date: Some(date(2026, 6, 1)),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidDate(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Alert rules and dedup
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn approval_crossing_the_threshold_raises_one_alert() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let budget_id = budget(&engine, &ws, 100_00).await;
    let expense_id = expense(&engine, &ws, &budget_id, 85_00).await;

    engine
        .decide_expense(&expense_id, ExpenseAction::Approve, "alice")
        .await
        .unwrap();

    let alerts = engine.list_alerts(&ws, "alice", true).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, "budget_alert");
    assert_eq!(alerts[0].budget_id.as_deref(), Some(budget_id.as_str()));

    // A rule pass afterwards must not duplicate it.
    let created = engine.evaluate_alerts(&ws, "alice").await.unwrap();
    assert_eq!(created, 0);
    assert_eq!(engine.list_alerts(&ws, "alice", true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn exceeding_the_total_raises_a_critical_alert() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let budget_id = budget(&engine, &ws, 100_00).await;
    let expense_id = expense(&engine, &ws, &budget_id, 120_00).await;

    engine
        .decide_expense(&expense_id, ExpenseAction::Approve, "alice")
        .await
        .unwrap();

    let alerts = engine.list_alerts(&ws, "alice", true).await.unwrap();
    let exceeded: Vec<_> = alerts
        .iter()
        .filter(|a| a.alert_type == "budget_exceeded")
        .collect();
    assert_eq!(exceeded.len(), 1);
    assert_eq!(exceeded[0].severity, "critical");
}

#[tokio::test]
async fn resolving_an_alert_lets_the_rule_fire_again() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let budget_id = budget(&engine, &ws, 100_00).await;
    let expense_id = expense(&engine, &ws, &budget_id, 90_00).await;
    engine
        .decide_expense(&expense_id, ExpenseAction::Approve, "alice")
        .await
        .unwrap();

    let alerts = engine.list_alerts(&ws, "alice", true).await.unwrap();
    assert_eq!(alerts.len(), 1);
    engine.resolve_alert(&alerts[0].id, "alice").await.unwrap();
    assert!(engine.list_alerts(&ws, "alice", true).await.unwrap().is_empty());

    // Condition still holds, so the next pass raises a fresh alert.
    let created = engine.evaluate_alerts(&ws, "alice").await.unwrap();
    assert_eq!(created, 1);
}

#[tokio::test]
async fn overdue_invoices_alert_once_per_invoice() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let today = Utc::now().date_naive();
    let issue = today - Duration::days(30);
    let due = today - Duration::days(1);

    let items = vec![ItemInput {
        description: "Consulting".to_string(),
        quantity: 1,
        unit_price_minor: 500_00,
    }];
    let mut invoice_ids = Vec::new();
    for number in ["INV-001", "INV-002"] {
        let id = engine
            .new_invoice(InvoiceNewCmd::new(
                &ws,
                "alice",
                number,
                "Globex",
                items.clone(),
                issue,
                due,
            ))
            .await
            .unwrap();
        engine
            .update_invoice(
                &id,
                InvoiceUpdateCmd {
                    status: Some(InvoiceStatus::Sent),
                    ..Default::default()
                },
                "alice",
            )
            .await
            .unwrap();
        invoice_ids.push(id);
    }

    let created = engine.evaluate_alerts(&ws, "alice").await.unwrap();
    assert_eq!(created, 2);

    // Each invoice gets its own alert and re-running adds nothing.
    assert_eq!(engine.evaluate_alerts(&ws, "alice").await.unwrap(), 0);
    let alerts = engine.list_alerts(&ws, "alice", true).await.unwrap();
    let overdue: Vec<_> = alerts
        .iter()
        .filter(|a| a.alert_type == "invoice_overdue")
        .collect();
    assert_eq!(overdue.len(), 2);
    for id in &invoice_ids {
        assert!(overdue.iter().any(|a| a.invoice_id.as_deref() == Some(id)));
    }
}

#[tokio::test]
async fn draft_and_paid_invoices_are_never_overdue() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let today = Utc::now().date_naive();
    let items = vec![ItemInput {
        description: "Consulting".to_string(),
        quantity: 1,
        unit_price_minor: 500_00,
    }];

    // Draft with a past due date.
    engine
        .new_invoice(InvoiceNewCmd::new(
            &ws,
            "alice",
            "INV-D",
            "Globex",
            items.clone(),
            today - Duration::days(30),
            today - Duration::days(1),
        ))
        .await
        .unwrap();

    // Sent then paid, also past due.
    let paid = engine
        .new_invoice(InvoiceNewCmd::new(
            &ws,
            "alice",
            "INV-P",
            "Globex",
            items,
            today - Duration::days(30),
            today - Duration::days(1),
        ))
        .await
        .unwrap();
    for status in [InvoiceStatus::Sent, InvoiceStatus::Paid] {
        engine
            .update_invoice(
                &paid,
                InvoiceUpdateCmd {
                    status: Some(status),
                    ..Default::default()
                },
                "alice",
            )
            .await
            .unwrap();
    }

    assert_eq!(engine.evaluate_alerts(&ws, "alice").await.unwrap(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Invoices
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn invoice_totals_come_from_items_and_reject_mismatched_amounts() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let items = vec![
        ItemInput {
            description: "Design".to_string(),
            quantity: 2,
            unit_price_minor: 10_00,
        },
        ItemInput {
            description: "Hosting".to_string(),
            quantity: 1,
            unit_price_minor: 5_00,
        },
    ];

    let id = engine
        .new_invoice(
            InvoiceNewCmd::new(
                &ws,
                "alice",
                "INV-100",
                "Globex",
                items.clone(),
                date(2026, 8, 1),
                date(2026, 9, 1),
            )
            .tax_minor(2_50)
            .stated_amount_minor(25_00),
        )
        .await
        .unwrap();
    let invoice = engine.invoice(&id, "alice").await.unwrap();
    assert_eq!(invoice.invoice.amount_minor, 25_00);
    assert_eq!(invoice.invoice.total_minor, 27_50);
    assert_eq!(invoice.items.len(), 2);

    let err = engine
        .new_invoice(
            InvoiceNewCmd::new(
                &ws,
                "alice",
                "INV-101",
                "Globex",
                items,
                date(2026, 8, 1),
                date(2026, 9, 1),
            )
            .stated_amount_minor(99_00),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn invoice_numbers_are_unique_per_workspace_ignoring_case() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let items = vec![ItemInput {
        description: "Design".to_string(),
        quantity: 1,
        unit_price_minor: 10_00,
    }];

    engine
        .new_invoice(InvoiceNewCmd::new(
            &ws,
            "alice",
            "INV-7",
            "Globex",
            items.clone(),
            date(2026, 8, 1),
            date(2026, 9, 1),
        ))
        .await
        .unwrap();

    let err = engine
        .new_invoice(InvoiceNewCmd::new(
            &ws,
            "alice",
            "inv-7",
            "Globex",
            items.clone(),
            date(2026, 8, 1),
            date(2026, 9, 1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // Other workspaces are free to reuse the number.
    let other = engine.new_workspace("Beta", "alice").await.unwrap();
    engine
        .new_invoice(InvoiceNewCmd::new(
            &other,
            "alice",
            "INV-7",
            "Globex",
            items,
            date(2026, 8, 1),
            date(2026, 9, 1),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn invoice_items_lock_once_sent_and_paid_stamps_the_date() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let items = vec![ItemInput {
        description: "Design".to_string(),
        quantity: 1,
        unit_price_minor: 10_00,
    }];
    let id = engine
        .new_invoice(InvoiceNewCmd::new(
            &ws,
            "alice",
            "INV-8",
            "Globex",
            items.clone(),
            date(2026, 8, 1),
            date(2026, 9, 1),
        ))
        .await
        .unwrap();

    engine
        .update_invoice(
            &id,
            InvoiceUpdateCmd {
                status: Some(InvoiceStatus::Sent),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();

    let err = engine
        .update_invoice(
            &id,
            InvoiceUpdateCmd {
                items: Some(items),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // Skipping states is rejected too.
    let err = engine
        .update_invoice(
            &id,
            InvoiceUpdateCmd {
                status: Some(InvoiceStatus::Draft),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    engine
        .update_invoice(
            &id,
            InvoiceUpdateCmd {
                status: Some(InvoiceStatus::Paid),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    let invoice = engine.invoice(&id, "alice").await.unwrap();
    assert_eq!(invoice.invoice.status, "paid");
    assert!(invoice.invoice.paid_date.is_some());
}

// ─────────────────────────────────────────────────────────────────────────────
// Forecasts
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn forecast_metrics_report_variance_and_accuracy() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let id = engine
        .new_forecast(
            ForecastNewCmd::new(
                &ws,
                "alice",
                "Website revamp",
                1000_00,
                date(2026, 7, 1),
                date(2026, 12, 31),
            )
            .actual_minor(1100_00),
        )
        .await
        .unwrap();

    let (_, metrics) = engine.forecast_view(&id, "alice").await.unwrap();
    assert_eq!(metrics.variance_pct, 10_00);
    assert_eq!(metrics.accuracy_pct, 90_00);
    assert!(metrics.is_over_budget);
}

// ─────────────────────────────────────────────────────────────────────────────
// Access control and workspace lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn non_members_cannot_even_see_a_workspace() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;

    let err = engine.workspace(&ws, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn viewers_read_but_cannot_write() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    engine
        .upsert_member(&ws, "bob", "viewer", "alice")
        .await
        .unwrap();

    assert!(engine.list_budgets(&ws, "bob").await.is_ok());

    let err = engine
        .new_budget(BudgetNewCmd::new(
            &ws,
            "bob",
            "Sneaky",
            100_00,
            "misc",
            date(2026, 7, 1),
            date(2026, 8, 1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn only_the_owner_decides_expenses() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    engine
        .upsert_member(&ws, "bob", "editor", "alice")
        .await
        .unwrap();
    let budget_id = budget(&engine, &ws, 1000_00).await;
    let expense_id = expense(&engine, &ws, &budget_id, 100_00).await;

    let err = engine
        .decide_expense(&expense_id, ExpenseAction::Approve, "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn deleting_a_workspace_takes_everything_with_it() {
    let (engine, db) = engine_with_db().await;
    let ws = workspace(&engine).await;
    let budget_id = budget(&engine, &ws, 100_00).await;
    let expense_id = expense(&engine, &ws, &budget_id, 90_00).await;
    engine
        .decide_expense(&expense_id, ExpenseAction::Approve, "alice")
        .await
        .unwrap();
    engine
        .new_invoice(InvoiceNewCmd::new(
            &ws,
            "alice",
            "INV-1",
            "Globex",
            vec![ItemInput {
                description: "Design".to_string(),
                quantity: 1,
                unit_price_minor: 10_00,
            }],
            date(2026, 8, 1),
            date(2026, 9, 1),
        ))
        .await
        .unwrap();
    let board_id = engine.new_board(&ws, "Backlog", "alice").await.unwrap();
    engine
        .new_card(&board_id, "Kickoff", None, "alice")
        .await
        .unwrap();

    let err = engine.delete_workspace(&ws, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    engine.delete_workspace(&ws, "alice").await.unwrap();
    assert!(engine.list_workspaces("alice").await.unwrap().is_empty());

    let backend = db.get_database_backend();
    for table in [
        "budgets",
        "expenses",
        "invoices",
        "invoice_items",
        "financial_alerts",
        "boards",
        "cards",
        "workspace_memberships",
    ] {
        let rows = db
            .query_one(Statement::from_string(
                backend,
                format!("SELECT COUNT(*) AS n FROM {table};"),
            ))
            .await
            .unwrap()
            .unwrap();
        let n: i64 = rows.try_get("", "n").unwrap();
        assert_eq!(n, 0, "{table} not emptied");
    }
}

#[tokio::test]
async fn workspace_names_are_unique_per_owner_ignoring_case() {
    let (engine, _db) = engine_with_db().await;
    engine.new_workspace("Acme", "alice").await.unwrap();

    let err = engine.new_workspace("acme", "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // A different owner can reuse the name.
    engine.new_workspace("Acme", "bob").await.unwrap();
}

#[tokio::test]
async fn the_owner_membership_is_immutable() {
    let (engine, _db) = engine_with_db().await;
    let ws = workspace(&engine).await;

    let err = engine
        .upsert_member(&ws, "alice", "viewer", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = engine
        .upsert_member(&ws, "bob", "owner", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRole(_)));

    let err = engine.remove_member(&ws, "alice", "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}
