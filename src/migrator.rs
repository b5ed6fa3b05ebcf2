use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_reference_tables::Migration),
            Box::new(m20240101_000002_create_stock_tables::Migration),
            Box::new(m20240101_000003_create_workflow_tables::Migration),
            Box::new(m20240101_000004_create_shift_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_reference_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Catalog boundary: item attributes fed from the product system
            manager
                .create_table(
                    Table::create()
                        .table(ItemMaster::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemMaster::ItemId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ItemMaster::Name).string().not_null())
                        .col(ColumnDef::new(ItemMaster::Unit).string().not_null())
                        .col(
                            ColumnDef::new(ItemMaster::UnitCost)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ItemMaster::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            // Identity boundary: operator roles fed from the identity system
            manager
                .create_table(
                    Table::create()
                        .table(Operators::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Operators::OperatorId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Operators::Name).string().not_null())
                        .col(ColumnDef::new(Operators::Role).string_len(16).not_null())
                        .col(ColumnDef::new(Operators::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            // Sales feed boundary: cash-sale rows consumed by shift totals
            manager
                .create_table(
                    Table::create()
                        .table(CashSales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashSales::SaleId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CashSales::CashierId).uuid().null())
                        .col(ColumnDef::new(CashSales::CashierName).string().not_null())
                        .col(
                            ColumnDef::new(CashSales::Amount)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashSales::PaymentMethod)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(CashSales::SoldAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cash_sales_cashier_sold_at")
                        .table(CashSales::Table)
                        .col(CashSales::CashierId)
                        .col(CashSales::SoldAt)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CashSales::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Operators::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ItemMaster::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ItemMaster {
        Table,
        ItemId,
        Name,
        Unit,
        UnitCost,
        CreatedAt,
    }

    #[derive(Iden)]
    enum Operators {
        Table,
        OperatorId,
        Name,
        Role,
        CreatedAt,
    }

    #[derive(Iden)]
    enum CashSales {
        Table,
        SaleId,
        CashierId,
        CashierName,
        Amount,
        PaymentMethod,
        SoldAt,
    }
}

mod m20240101_000002_create_stock_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_stock_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockRecords::RecordId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockRecords::ItemId).uuid().not_null())
                        .col(ColumnDef::new(StockRecords::LocationId).uuid().not_null())
                        .col(ColumnDef::new(StockRecords::ItemName).string().not_null())
                        .col(ColumnDef::new(StockRecords::Unit).string().not_null())
                        .col(
                            ColumnDef::new(StockRecords::QuantityOnHand)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockRecords::ReservedQuantity)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockRecords::DamagedQuantity)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockRecords::MinThreshold)
                                .decimal_len(19, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockRecords::MaxThreshold)
                                .decimal_len(19, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockRecords::UnitCost)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(StockRecords::ExpiryDate).timestamp().null())
                        .col(
                            ColumnDef::new(StockRecords::LastMovementAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockRecords::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(StockRecords::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockRecords::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One record per (item, location)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_stock_records_item_location")
                        .table(StockRecords::Table)
                        .col(StockRecords::ItemId)
                        .col(StockRecords::LocationId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::MovementId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::ItemId).uuid().not_null())
                        .col(ColumnDef::new(StockMovements::LocationId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockMovements::MovementType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::QuantityDelta)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::ResultingQuantity)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::ReferenceId).uuid().null())
                        .col(
                            ColumnDef::new(StockMovements::ReferenceType)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_item_location")
                        .table(StockMovements::Table)
                        .col(StockMovements::ItemId)
                        .col(StockMovements::LocationId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum StockRecords {
        Table,
        RecordId,
        ItemId,
        LocationId,
        ItemName,
        Unit,
        QuantityOnHand,
        ReservedQuantity,
        DamagedQuantity,
        MinThreshold,
        MaxThreshold,
        UnitCost,
        ExpiryDate,
        LastMovementAt,
        Version,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum StockMovements {
        Table,
        MovementId,
        ItemId,
        LocationId,
        MovementType,
        QuantityDelta,
        ResultingQuantity,
        ReferenceId,
        ReferenceType,
        CreatedAt,
    }
}

mod m20240101_000003_create_workflow_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_workflow_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockAdjustments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockAdjustments::AdjustmentId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockAdjustments::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockAdjustments::LocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustments::QuantityDelta)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustments::Reason)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockAdjustments::Notes).string().not_null())
                        .col(
                            ColumnDef::new(StockAdjustments::Status)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustments::RequestedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockAdjustments::ApprovedBy).uuid().null())
                        .col(
                            ColumnDef::new(StockAdjustments::ValuedAmount)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustments::SelfApproved)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(StockAdjustments::ReferenceMissing)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(StockAdjustments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustments::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_adjustments_status")
                        .table(StockAdjustments::Table)
                        .col(StockAdjustments::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TransferOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TransferOrders::TransferId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferOrders::SourceLocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferOrders::DestinationLocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferOrders::Status)
                                .string_len(24)
                                .not_null(),
                        )
                        .col(ColumnDef::new(TransferOrders::Manifest).json().not_null())
                        .col(
                            ColumnDef::new(TransferOrders::RequestedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TransferOrders::ApprovedBy).uuid().null())
                        .col(ColumnDef::new(TransferOrders::Notes).string().null())
                        .col(
                            ColumnDef::new(TransferOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransferOrders::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfer_orders_status")
                        .table(TransferOrders::Table)
                        .col(TransferOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::PurchaseId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::SupplierName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::LocationId).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::Status)
                                .string_len(24)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Manifest).json().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::ReceivedManifest)
                                .json()
                                .null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::ReceivedBy).uuid().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_status")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CountTasks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CountTasks::TaskId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CountTasks::Name).string().not_null())
                        .col(ColumnDef::new(CountTasks::LocationId).uuid().not_null())
                        .col(
                            ColumnDef::new(CountTasks::Frequency)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(CountTasks::StartDate).timestamp().not_null())
                        .col(
                            ColumnDef::new(CountTasks::NextRunDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CountTasks::Status).string_len(16).not_null())
                        .col(ColumnDef::new(CountTasks::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(CountTasks::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CountEntries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CountEntries::EntryId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CountEntries::CountTaskId).uuid().null())
                        .col(ColumnDef::new(CountEntries::ItemId).uuid().not_null())
                        .col(ColumnDef::new(CountEntries::LocationId).uuid().not_null())
                        .col(
                            ColumnDef::new(CountEntries::CountedQuantity)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CountEntries::SystemQuantity)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CountEntries::Variance)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CountEntries::VariancePercent)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CountEntries::VarianceValue)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CountEntries::Significant)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CountEntries::Status)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(CountEntries::CountedBy).uuid().not_null())
                        .col(ColumnDef::new(CountEntries::ApprovedBy).uuid().null())
                        .col(
                            ColumnDef::new(CountEntries::SelfApproved)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CountEntries::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CountEntries::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_count_entries_status")
                        .table(CountEntries::Table)
                        .col(CountEntries::Status)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CountEntries::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CountTasks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TransferOrders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockAdjustments::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum StockAdjustments {
        Table,
        AdjustmentId,
        ItemId,
        LocationId,
        QuantityDelta,
        Reason,
        Notes,
        Status,
        RequestedBy,
        ApprovedBy,
        ValuedAmount,
        SelfApproved,
        ReferenceMissing,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum TransferOrders {
        Table,
        TransferId,
        SourceLocationId,
        DestinationLocationId,
        Status,
        Manifest,
        RequestedBy,
        ApprovedBy,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum PurchaseOrders {
        Table,
        PurchaseId,
        SupplierName,
        LocationId,
        Status,
        Manifest,
        ReceivedManifest,
        CreatedBy,
        ReceivedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum CountTasks {
        Table,
        TaskId,
        Name,
        LocationId,
        Frequency,
        StartDate,
        NextRunDate,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum CountEntries {
        Table,
        EntryId,
        CountTaskId,
        ItemId,
        LocationId,
        CountedQuantity,
        SystemQuantity,
        Variance,
        VariancePercent,
        VarianceValue,
        Significant,
        Status,
        CountedBy,
        ApprovedBy,
        SelfApproved,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_shift_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_shift_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Shifts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Shifts::ShiftId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Shifts::CashierId).uuid().not_null())
                        .col(ColumnDef::new(Shifts::CashierName).string().not_null())
                        .col(ColumnDef::new(Shifts::StartTime).timestamp().not_null())
                        .col(ColumnDef::new(Shifts::EndTime).timestamp().null())
                        .col(
                            ColumnDef::new(Shifts::InitialCash)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Shifts::Status).string_len(16).not_null())
                        .col(
                            ColumnDef::new(Shifts::ExpectedCashAtClose)
                                .decimal_len(19, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Shifts::ActualCashAtClose)
                                .decimal_len(19, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Shifts::Discrepancy)
                                .decimal_len(19, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(Shifts::Notes).string().null())
                        .col(ColumnDef::new(Shifts::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Shifts::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shifts_cashier_status")
                        .table(Shifts::Table)
                        .col(Shifts::CashierId)
                        .col(Shifts::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CashMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashMovements::MovementId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CashMovements::ShiftId).uuid().not_null())
                        .col(
                            ColumnDef::new(CashMovements::MovementType)
                                .string_len(8)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashMovements::Amount)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(CashMovements::Reason).string().not_null())
                        .col(ColumnDef::new(CashMovements::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(CashMovements::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cash_movements_shift")
                        .table(CashMovements::Table)
                        .col(CashMovements::ShiftId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CashMovements::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Shifts::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Shifts {
        Table,
        ShiftId,
        CashierId,
        CashierName,
        StartTime,
        EndTime,
        InitialCash,
        Status,
        ExpectedCashAtClose,
        ActualCashAtClose,
        Discrepancy,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum CashMovements {
        Table,
        MovementId,
        ShiftId,
        MovementType,
        Amount,
        Reason,
        CreatedBy,
        CreatedAt,
    }
}
