use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_uuid(Products::Id))
                    .col(string_len(Products::BaseName, 100))
                    .col(uuid(Products::CategoryId))
                    .col(string_len(Products::ProductType, 16))
                    .col(string(Products::CreatedBy))
                    .col(string_null(Products::UpdatedBy))
                    .col(
                        timestamp_with_time_zone(Products::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Products::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(ProductCategories::Table, ProductCategories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE products ADD CONSTRAINT chk_products_product_type \
                 CHECK (product_type IN ('SINGLE', 'VARIANT', 'REPACK'))",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductVariants::Table)
                    .if_not_exists()
                    .col(pk_uuid(ProductVariants::Id))
                    .col(uuid(ProductVariants::ProductId))
                    .col(string_len(ProductVariants::ProductName, 100))
                    .col(string_len_null(ProductVariants::VariantName, 50))
                    .col(string_len(ProductVariants::FullName, 151))
                    .col(uuid(ProductVariants::PackagingTypeId))
                    .col(double(ProductVariants::SizeValue))
                    .col(uuid(ProductVariants::SizeUnitId))
                    .col(ColumnDef::new(ProductVariants::CostPrice).decimal_len(15, 2).null())
                    .col(
                        ColumnDef::new(ProductVariants::SellingPrice)
                            .decimal_len(15, 2)
                            .not_null(),
                    )
                    .col(boolean(ProductVariants::IsActive).default(true))
                    .col(string(ProductVariants::CreatedBy))
                    .col(string_null(ProductVariants::UpdatedBy))
                    .col(
                        timestamp_with_time_zone(ProductVariants::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ProductVariants::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(ProductVariants::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_variants_product_id")
                            .from(ProductVariants::Table, ProductVariants::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_variants_packaging_type_id")
                            .from(ProductVariants::Table, ProductVariants::PackagingTypeId)
                            .to(PackagingTypes::Table, PackagingTypes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_variants_size_unit_id")
                            .from(ProductVariants::Table, ProductVariants::SizeUnitId)
                            .to(SizeUnits::Table, SizeUnits::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_variants_product_id")
                    .table(ProductVariants::Table)
                    .col(ProductVariants::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RepackRecipes::Table)
                    .if_not_exists()
                    .col(pk_uuid(RepackRecipes::Id))
                    .col(uuid(RepackRecipes::ParentVariantId))
                    .col(uuid(RepackRecipes::ChildVariantId))
                    .col(double(RepackRecipes::QuantityRatio))
                    .col(
                        ColumnDef::new(RepackRecipes::RepackCostPerUnit)
                            .decimal_len(15, 2)
                            .not_null(),
                    )
                    .col(integer(RepackRecipes::RepackTimeMinutes))
                    .col(string(RepackRecipes::CreatedBy))
                    .col(string_null(RepackRecipes::UpdatedBy))
                    .col(
                        timestamp_with_time_zone(RepackRecipes::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(RepackRecipes::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_repack_recipes_parent_variant_id")
                            .from(RepackRecipes::Table, RepackRecipes::ParentVariantId)
                            .to(ProductVariants::Table, ProductVariants::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_repack_recipes_child_variant_id")
                            .from(RepackRecipes::Table, RepackRecipes::ChildVariantId)
                            .to(ProductVariants::Table, ProductVariants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for table in ["products", "product_variants", "product_repack_recipes"] {
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
            .drop_table(Table::drop().table(RepackRecipes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductVariants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
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
enum Products {
    Table,
    Id,
    BaseName,
    CategoryId,
    ProductType,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductVariants {
    Table,
    Id,
    ProductId,
    ProductName,
    VariantName,
    FullName,
    PackagingTypeId,
    SizeValue,
    SizeUnitId,
    CostPrice,
    SellingPrice,
    IsActive,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum RepackRecipes {
    #[sea_orm(iden = "product_repack_recipes")]
    Table,
    Id,
    ParentVariantId,
    ChildVariantId,
    QuantityRatio,
    RepackCostPerUnit,
    RepackTimeMinutes,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}
