//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Tallyboard:
//!
//! - `users`: authentication
//! - `workspaces`: tenant boundary, owned by users
//! - `workspace_memberships`: multi-user workspace access
//! - `boards` / `cards`: kanban lists with dense zero-based positions
//! - `budgets`: spending caps with a cached approved-expense sum
//! - `expenses`: approval-gated spending records
//! - `invoices` / `invoice_items`: client billing with derived totals
//! - `cost_forecasts`: estimate-vs-actual tracking
//! - `financial_alerts`: deduplicated rule-engine output
//!
//! The partial unique indexes on `financial_alerts` are what make the
//! at-most-one-unresolved-alert-per-key rule hold under concurrent
//! evaluation; the engine inserts with on-conflict-do-nothing against them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Workspaces {
    Table,
    Id,
    Name,
    OwnerId,
    CreatedAt,
}

#[derive(Iden)]
enum WorkspaceMemberships {
    Table,
    WorkspaceId,
    UserId,
    Role,
}

#[derive(Iden)]
enum Boards {
    Table,
    Id,
    WorkspaceId,
    Name,
    Position,
}

#[derive(Iden)]
enum Cards {
    Table,
    Id,
    BoardId,
    Title,
    Description,
    Position,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    WorkspaceId,
    Name,
    Description,
    TotalMinor,
    Category,
    StartDate,
    EndDate,
    AlertThreshold,
    SpentMinor,
    CreatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    WorkspaceId,
    BudgetId,
    Title,
    Description,
    AmountMinor,
    Category,
    Date,
    Status,
    IsReimbursable,
    ReceiptUrl,
    CreatedBy,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    WorkspaceId,
    InvoiceNumber,
    ClientName,
    ClientEmail,
    AmountMinor,
    TaxMinor,
    TotalMinor,
    Currency,
    Status,
    IssueDate,
    DueDate,
    PaidDate,
}

#[derive(Iden)]
enum InvoiceItems {
    Table,
    Id,
    InvoiceId,
    Description,
    Quantity,
    UnitPriceMinor,
    TotalMinor,
}

#[derive(Iden)]
enum CostForecasts {
    Table,
    Id,
    WorkspaceId,
    ProjectName,
    EstimatedMinor,
    ActualMinor,
    ForecastedMinor,
    PeriodStart,
    PeriodEnd,
    Confidence,
}

#[derive(Iden)]
enum FinancialAlerts {
    Table,
    Id,
    WorkspaceId,
    BudgetId,
    InvoiceId,
    AlertType,
    Title,
    Message,
    Severity,
    IsRead,
    IsResolved,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Workspaces
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Workspaces::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Workspaces::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Workspaces::Name).string().not_null())
                    .col(ColumnDef::new(Workspaces::OwnerId).string().not_null())
                    .col(ColumnDef::new(Workspaces::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-workspaces-owner_id")
                            .from(Workspaces::Table, Workspaces::OwnerId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Workspace memberships
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(WorkspaceMemberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkspaceMemberships::WorkspaceId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkspaceMemberships::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkspaceMemberships::Role)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(WorkspaceMemberships::WorkspaceId)
                            .col(WorkspaceMemberships::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-workspace_memberships-workspace_id")
                            .from(
                                WorkspaceMemberships::Table,
                                WorkspaceMemberships::WorkspaceId,
                            )
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-workspace_memberships-user_id")
                            .from(WorkspaceMemberships::Table, WorkspaceMemberships::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-workspace_memberships-user_id")
                    .table(WorkspaceMemberships::Table)
                    .col(WorkspaceMemberships::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Boards and cards
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Boards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Boards::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Boards::WorkspaceId).string().not_null())
                    .col(ColumnDef::new(Boards::Name).string().not_null())
                    .col(ColumnDef::new(Boards::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-boards-workspace_id")
                            .from(Boards::Table, Boards::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-boards-workspace_id")
                    .table(Boards::Table)
                    .col(Boards::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cards::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Cards::BoardId).string().not_null())
                    .col(ColumnDef::new(Cards::Title).string().not_null())
                    .col(ColumnDef::new(Cards::Description).string())
                    .col(ColumnDef::new(Cards::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cards-board_id")
                            .from(Cards::Table, Cards::BoardId)
                            .to(Boards::Table, Boards::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cards-board_id")
                    .table(Cards::Table)
                    .col(Cards::BoardId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Budgets and expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Budgets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Budgets::WorkspaceId).string().not_null())
                    .col(ColumnDef::new(Budgets::Name).string().not_null())
                    .col(ColumnDef::new(Budgets::Description).string())
                    .col(ColumnDef::new(Budgets::TotalMinor).big_integer().not_null())
                    .col(ColumnDef::new(Budgets::Category).string().not_null())
                    .col(ColumnDef::new(Budgets::StartDate).date().not_null())
                    .col(ColumnDef::new(Budgets::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Budgets::AlertThreshold)
                            .integer()
                            .not_null()
                            .default(80),
                    )
                    .col(
                        ColumnDef::new(Budgets::SpentMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Budgets::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-workspace_id")
                            .from(Budgets::Table, Budgets::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-workspace_id")
                    .table(Budgets::Table)
                    .col(Budgets::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::WorkspaceId).string().not_null())
                    .col(ColumnDef::new(Expenses::BudgetId).string())
                    .col(ColumnDef::new(Expenses::Title).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).string())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(
                        ColumnDef::new(Expenses::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Expenses::IsReimbursable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::ReceiptUrl).string())
                    .col(ColumnDef::new(Expenses::CreatedBy).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-workspace_id")
                            .from(Expenses::Table, Expenses::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-budget_id")
                            .from(Expenses::Table, Expenses::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-workspace_id")
                    .table(Expenses::Table)
                    .col(Expenses::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-budget_id")
                    .table(Expenses::Table)
                    .col(Expenses::BudgetId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Invoices and items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::WorkspaceId).string().not_null())
                    .col(ColumnDef::new(Invoices::InvoiceNumber).string().not_null())
                    .col(ColumnDef::new(Invoices::ClientName).string().not_null())
                    .col(ColumnDef::new(Invoices::ClientEmail).string())
                    .col(
                        ColumnDef::new(Invoices::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invoices::TaxMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Invoices::TotalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invoices::Currency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(
                        ColumnDef::new(Invoices::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Invoices::IssueDate).date().not_null())
                    .col(ColumnDef::new(Invoices::DueDate).date().not_null())
                    .col(ColumnDef::new(Invoices::PaidDate).date())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-workspace_id")
                            .from(Invoices::Table, Invoices::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-workspace_id-number-unique")
                    .table(Invoices::Table)
                    .col(Invoices::WorkspaceId)
                    .col(Invoices::InvoiceNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InvoiceItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvoiceItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InvoiceItems::InvoiceId).string().not_null())
                    .col(
                        ColumnDef::new(InvoiceItems::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InvoiceItems::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(InvoiceItems::UnitPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InvoiceItems::TotalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoice_items-invoice_id")
                            .from(InvoiceItems::Table, InvoiceItems::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoice_items-invoice_id")
                    .table(InvoiceItems::Table)
                    .col(InvoiceItems::InvoiceId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Cost forecasts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CostForecasts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CostForecasts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CostForecasts::WorkspaceId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CostForecasts::ProjectName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CostForecasts::EstimatedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CostForecasts::ActualMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CostForecasts::ForecastedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CostForecasts::PeriodStart).date().not_null())
                    .col(ColumnDef::new(CostForecasts::PeriodEnd).date().not_null())
                    .col(
                        ColumnDef::new(CostForecasts::Confidence)
                            .integer()
                            .not_null()
                            .default(50),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cost_forecasts-workspace_id")
                            .from(CostForecasts::Table, CostForecasts::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Financial alerts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FinancialAlerts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialAlerts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FinancialAlerts::WorkspaceId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FinancialAlerts::BudgetId).string())
                    .col(ColumnDef::new(FinancialAlerts::InvoiceId).string())
                    .col(
                        ColumnDef::new(FinancialAlerts::AlertType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FinancialAlerts::Title).string().not_null())
                    .col(ColumnDef::new(FinancialAlerts::Message).string().not_null())
                    .col(
                        ColumnDef::new(FinancialAlerts::Severity)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialAlerts::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FinancialAlerts::IsResolved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FinancialAlerts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-financial_alerts-workspace_id")
                            .from(FinancialAlerts::Table, FinancialAlerts::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-financial_alerts-workspace_id")
                    .table(FinancialAlerts::Table)
                    .col(FinancialAlerts::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        // Partial unique indexes enforcing the alert dedup keys over
        // unresolved rows only. sea_query's index builder has no WHERE
        // clause, so these go through raw SQL (sqlite supports partial
        // indexes natively).
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS \"idx-financial_alerts-open-budget-key\" \
             ON financial_alerts (workspace_id, budget_id, alert_type) \
             WHERE is_resolved = FALSE AND budget_id IS NOT NULL;",
        )
        .await?;
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS \"idx-financial_alerts-open-invoice-key\" \
             ON financial_alerts (workspace_id, invoice_id, alert_type) \
             WHERE is_resolved = FALSE AND invoice_id IS NOT NULL;",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            FinancialAlerts::Table.into_iden(),
            CostForecasts::Table.into_iden(),
            InvoiceItems::Table.into_iden(),
            Invoices::Table.into_iden(),
            Expenses::Table.into_iden(),
            Budgets::Table.into_iden(),
            Cards::Table.into_iden(),
            Boards::Table.into_iden(),
            WorkspaceMemberships::Table.into_iden(),
            Workspaces::Table.into_iden(),
            Users::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
