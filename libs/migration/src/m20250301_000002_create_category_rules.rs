use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Which size units a category accepts
        manager
            .create_table(
                Table::create()
                    .table(SizeUnitRules::Table)
                    .if_not_exists()
                    .col(pk_uuid(SizeUnitRules::RuleId))
                    .col(uuid(SizeUnitRules::CategoryId))
                    .col(uuid(SizeUnitRules::SizeUnitId))
                    .col(boolean(SizeUnitRules::IsDefault).default(false))
                    .col(boolean(SizeUnitRules::IsActive).default(true))
                    .col(string(SizeUnitRules::CreatedBy))
                    .col(string_null(SizeUnitRules::UpdatedBy))
                    .col(
                        timestamp_with_time_zone(SizeUnitRules::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(SizeUnitRules::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_size_unit_rules_category_id")
                            .from(SizeUnitRules::Table, SizeUnitRules::CategoryId)
                            .to(ProductCategories::Table, ProductCategories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_size_unit_rules_size_unit_id")
                            .from(SizeUnitRules::Table, SizeUnitRules::SizeUnitId)
                            .to(SizeUnits::Table, SizeUnits::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_size_unit_rules_category_size_unit")
                    .table(SizeUnitRules::Table)
                    .col(SizeUnitRules::CategoryId)
                    .col(SizeUnitRules::SizeUnitId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Which packaging types a category accepts
        manager
            .create_table(
                Table::create()
                    .table(PackagingRules::Table)
                    .if_not_exists()
                    .col(pk_uuid(PackagingRules::RuleId))
                    .col(uuid(PackagingRules::CategoryId))
                    .col(uuid(PackagingRules::PackagingTypeId))
                    .col(boolean(PackagingRules::IsDefault).default(false))
                    .col(boolean(PackagingRules::IsActive).default(true))
                    .col(string(PackagingRules::CreatedBy))
                    .col(string_null(PackagingRules::UpdatedBy))
                    .col(
                        timestamp_with_time_zone(PackagingRules::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(PackagingRules::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packaging_rules_category_id")
                            .from(PackagingRules::Table, PackagingRules::CategoryId)
                            .to(ProductCategories::Table, ProductCategories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packaging_rules_packaging_type_id")
                            .from(PackagingRules::Table, PackagingRules::PackagingTypeId)
                            .to(PackagingTypes::Table, PackagingTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_packaging_rules_category_packaging_type")
                    .table(PackagingRules::Table)
                    .col(PackagingRules::CategoryId)
                    .col(PackagingRules::PackagingTypeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PackagingRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SizeUnitRules::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ProductCategories {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum SizeUnits {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum PackagingTypes {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum SizeUnitRules {
    #[sea_orm(iden = "product_categories_size_unit_rules")]
    Table,
    RuleId,
    CategoryId,
    SizeUnitId,
    IsDefault,
    IsActive,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PackagingRules {
    #[sea_orm(iden = "product_categories_packaging_rules")]
    Table,
    RuleId,
    CategoryId,
    PackagingTypeId,
    IsDefault,
    IsActive,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}
