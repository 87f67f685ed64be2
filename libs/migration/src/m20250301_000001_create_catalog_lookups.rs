use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductCategories::Table)
                    .if_not_exists()
                    .col(pk_uuid(ProductCategories::Id))
                    .col(string(ProductCategories::Name))
                    .col(string_uniq(ProductCategories::Code))
                    .col(boolean(ProductCategories::IsActive).default(true))
                    .col(string(ProductCategories::CreatedBy))
                    .col(string_null(ProductCategories::UpdatedBy))
                    .col(
                        timestamp_with_time_zone(ProductCategories::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ProductCategories::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SizeUnits::Table)
                    .if_not_exists()
                    .col(pk_uuid(SizeUnits::Id))
                    .col(string(SizeUnits::Name))
                    .col(string_uniq(SizeUnits::Code))
                    .col(string(SizeUnits::UnitType))
                    .col(boolean(SizeUnits::IsActive).default(true))
                    .col(string(SizeUnits::CreatedBy))
                    .col(string_null(SizeUnits::UpdatedBy))
                    .col(
                        timestamp_with_time_zone(SizeUnits::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(SizeUnits::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PackagingTypes::Table)
                    .if_not_exists()
                    .col(pk_uuid(PackagingTypes::Id))
                    .col(string(PackagingTypes::Name))
                    .col(string_uniq(PackagingTypes::Code))
                    .col(text_null(PackagingTypes::Description))
                    .col(boolean(PackagingTypes::IsActive).default(true))
                    .col(string(PackagingTypes::CreatedBy))
                    .col(string_null(PackagingTypes::UpdatedBy))
                    .col(
                        timestamp_with_time_zone(PackagingTypes::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(PackagingTypes::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        for table in ["product_categories", "size_units", "packaging_types"] {
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    "CREATE TRIGGER {table}_touch_updated_at \
                     BEFORE UPDATE ON {table} \
                     FOR EACH ROW EXECUTE FUNCTION util.touch_updated_at()"
                ))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PackagingTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SizeUnits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductCategories::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ProductCategories {
    Table,
    Id,
    Name,
    Code,
    IsActive,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SizeUnits {
    Table,
    Id,
    Name,
    Code,
    UnitType,
    IsActive,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PackagingTypes {
    Table,
    Id,
    Name,
    Code,
    Description,
    IsActive,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}
