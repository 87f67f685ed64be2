//! PostgreSQL catalog store.
//!
//! Create/update flows run inside one `READ COMMITTED` transaction per request.
//! Rule listings read straight from the pool.

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, FromQueryResult,
    IsolationLevel, SqlErr, Statement, TransactionTrait,
};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult, RULE_ALREADY_EXISTS};
use crate::models::{
    CategoryRuleUpdate, NewCategoryRule, NewProduct, NewRepackRecipe, NewVariant, PackagingRule,
    PackagingRuleMatch, PackagingTypeSummary, ProductType, ProductUpdate, RuleStatus, RuleTarget,
    SizeUnitRule, SizeUnitRuleMatch, SizeUnitSummary, VariantRecord, VariantUpdate,
};
use crate::repository::{ProductStore, ProductUnitOfWork};

#[derive(Clone)]
pub struct PgProductStore {
    db: DatabaseConnection,
}

impl PgProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct SizeUnitRuleMatchRow {
    category_id: Uuid,
    size_unit_id: Uuid,
    size_unit_code: String,
    category_code: String,
}

impl From<SizeUnitRuleMatchRow> for SizeUnitRuleMatch {
    fn from(row: SizeUnitRuleMatchRow) -> Self {
        Self {
            category_id: row.category_id,
            size_unit_id: row.size_unit_id,
            size_unit_code: row.size_unit_code,
            category_code: row.category_code,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct PackagingRuleMatchRow {
    category_id: Uuid,
    packaging_type_id: Uuid,
    packaging_type_code: String,
}

impl From<PackagingRuleMatchRow> for PackagingRuleMatch {
    fn from(row: PackagingRuleMatchRow) -> Self {
        Self {
            category_id: row.category_id,
            packaging_type_id: row.packaging_type_id,
            packaging_type_code: row.packaging_type_code,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct IdRow {
    id: Uuid,
}

/// Table and column names of one rule kind
struct RuleTable {
    table: &'static str,
    target_column: &'static str,
    target_table: &'static str,
}

fn rule_table(target: RuleTarget) -> RuleTable {
    match target {
        RuleTarget::SizeUnit => RuleTable {
            table: "product_categories_size_unit_rules",
            target_column: "size_unit_id",
            target_table: "size_units",
        },
        RuleTarget::PackagingType => RuleTable {
            table: "product_categories_packaging_rules",
            target_column: "packaging_type_id",
            target_table: "packaging_types",
        },
    }
}

/// Unique violations on `(category, target)` surface as a business error
fn rule_write_error(err: DbErr) -> ProductError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ProductError::BusinessRule(RULE_ALREADY_EXISTS.to_string())
        }
        _ => ProductError::database(err),
    }
}

#[derive(Debug, FromQueryResult)]
struct VariantRecordRow {
    id: Uuid,
    product_id: Uuid,
    product_type: String,
}

impl TryFrom<VariantRecordRow> for VariantRecord {
    type Error = ProductError;

    fn try_from(row: VariantRecordRow) -> Result<Self, Self::Error> {
        let product_type = ProductType::from_str(&row.product_type).map_err(|_| {
            ProductError::Internal(format!(
                "Unknown product type '{}' on product {}",
                row.product_type, row.product_id
            ))
        })?;

        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            product_type,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct SizeUnitRuleRow {
    rule_id: Uuid,
    category_id: Uuid,
    size_unit_id: Uuid,
    is_default: bool,
    is_active: bool,
    size_unit_code: String,
    size_unit_name: String,
    size_unit_type: String,
}

impl From<SizeUnitRuleRow> for SizeUnitRule {
    fn from(row: SizeUnitRuleRow) -> Self {
        Self {
            rule_id: row.rule_id,
            product_category_id: row.category_id,
            size_unit_id: row.size_unit_id,
            size_unit: SizeUnitSummary {
                size_unit_id: row.size_unit_id,
                size_unit_code: row.size_unit_code,
                size_unit_name: row.size_unit_name,
                size_unit_type: row.size_unit_type,
            },
            is_default: row.is_default,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct PackagingRuleRow {
    rule_id: Uuid,
    category_id: Uuid,
    packaging_type_id: Uuid,
    is_default: bool,
    is_active: bool,
    packaging_code: String,
    packaging_name: String,
}

impl From<PackagingRuleRow> for PackagingRule {
    fn from(row: PackagingRuleRow) -> Self {
        Self {
            rule_id: row.rule_id,
            product_category_id: row.category_id,
            packaging_type_id: row.packaging_type_id,
            packaging_type: PackagingTypeSummary {
                packaging_code: row.packaging_code,
                packaging_name: row.packaging_name,
            },
            is_default: row.is_default,
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn begin(&self) -> ProductResult<Box<dyn ProductUnitOfWork>> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), None)
            .await
            .map_err(ProductError::database)?;

        Ok(Box::new(PgUnitOfWork { txn: Some(txn) }))
    }

    async fn list_size_unit_rules(
        &self,
        category_id: Uuid,
        status: RuleStatus,
    ) -> ProductResult<Vec<SizeUnitRule>> {
        let sql = r#"
            SELECT a.rule_id, a.category_id, a.size_unit_id, a.is_default, a.is_active,
                   s.code AS size_unit_code, s.name AS size_unit_name,
                   s.unit_type AS size_unit_type
            FROM product_categories_size_unit_rules a
            JOIN size_units s ON s.id = a.size_unit_id
            WHERE a.category_id = $1 AND a.is_active = $2
            ORDER BY a.created_at, a.rule_id
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [category_id.into(), status.is_active().into()],
        );

        let rows = SizeUnitRuleRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(ProductError::database)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_packaging_rules(
        &self,
        category_id: Uuid,
        status: RuleStatus,
    ) -> ProductResult<Vec<PackagingRule>> {
        let sql = r#"
            SELECT a.rule_id, a.category_id, a.packaging_type_id, a.is_default, a.is_active,
                   p.code AS packaging_code, p.name AS packaging_name
            FROM product_categories_packaging_rules a
            JOIN packaging_types p ON p.id = a.packaging_type_id
            WHERE a.category_id = $1 AND a.is_active = $2
            ORDER BY a.created_at, a.rule_id
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [category_id.into(), status.is_active().into()],
        );

        let rows = PackagingRuleRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(ProductError::database)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Transaction-scoped half of [`PgProductStore`]. Rolls back on drop unless committed.
pub struct PgUnitOfWork {
    txn: Option<DatabaseTransaction>,
}

impl PgUnitOfWork {
    fn txn(&self) -> ProductResult<&DatabaseTransaction> {
        self.txn
            .as_ref()
            .ok_or_else(|| ProductError::Internal("Transaction already committed".to_string()))
    }

    async fn execute(&self, sql: &str, values: Vec<sea_orm::Value>) -> ProductResult<u64> {
        self.execute_mapped(sql, values, ProductError::database).await
    }

    async fn execute_mapped(
        &self,
        sql: &str,
        values: Vec<sea_orm::Value>,
        map_err: fn(DbErr) -> ProductError,
    ) -> ProductResult<u64> {
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);
        let result = self.txn()?.execute_raw(stmt).await.map_err(map_err)?;
        Ok(result.rows_affected())
    }

    async fn exists(&self, sql: &str, values: Vec<sea_orm::Value>) -> ProductResult<bool> {
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);
        let row = IdRow::find_by_statement(stmt)
            .one(self.txn()?)
            .await
            .map_err(ProductError::database)?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl ProductUnitOfWork for PgUnitOfWork {
    async fn find_size_unit_rules(
        &mut self,
        category_id: Uuid,
        size_unit_ids: &[Uuid],
    ) -> ProductResult<Vec<SizeUnitRuleMatch>> {
        let sql = r#"
            SELECT p.category_id, p.size_unit_id,
                   s.code AS size_unit_code, pc.code AS category_code
            FROM product_categories_size_unit_rules p
            JOIN size_units s ON s.id = p.size_unit_id
            JOIN product_categories pc ON pc.id = p.category_id
            WHERE p.category_id = $1
              AND p.size_unit_id = ANY($2::uuid[])
              AND p.is_active AND s.is_active AND pc.is_active
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [category_id.into(), size_unit_ids.to_vec().into()],
        );

        let rows = SizeUnitRuleMatchRow::find_by_statement(stmt)
            .all(self.txn()?)
            .await
            .map_err(ProductError::database)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_packaging_rules(
        &mut self,
        category_id: Uuid,
        packaging_type_ids: &[Uuid],
    ) -> ProductResult<Vec<PackagingRuleMatch>> {
        let sql = r#"
            SELECT p.category_id, p.packaging_type_id, pt.code AS packaging_type_code
            FROM product_categories_packaging_rules p
            JOIN packaging_types pt ON pt.id = p.packaging_type_id
            JOIN product_categories pc ON pc.id = p.category_id
            WHERE p.category_id = $1
              AND p.packaging_type_id = ANY($2::uuid[])
              AND p.is_active AND pt.is_active AND pc.is_active
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [category_id.into(), packaging_type_ids.to_vec().into()],
        );

        let rows = PackagingRuleMatchRow::find_by_statement(stmt)
            .all(self.txn()?)
            .await
            .map_err(ProductError::database)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_active_variants_by_ids(
        &mut self,
        variant_ids: &[Uuid],
    ) -> ProductResult<Vec<Uuid>> {
        let sql = r#"
            SELECT v.id
            FROM product_variants v
            WHERE v.id = ANY($1::uuid[]) AND v.is_active AND v.deleted_at IS NULL
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [variant_ids.to_vec().into()],
        );

        let rows = IdRow::find_by_statement(stmt)
            .all(self.txn()?)
            .await
            .map_err(ProductError::database)?;

        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn find_variants_by_product_id(
        &mut self,
        product_id: Uuid,
    ) -> ProductResult<Vec<VariantRecord>> {
        let sql = r#"
            SELECT v.id, v.product_id, p.product_type
            FROM product_variants v
            JOIN products p ON p.id = v.product_id
            WHERE v.product_id = $1 AND v.is_active AND v.deleted_at IS NULL
            ORDER BY v.created_at, v.id
        "#;

        let stmt =
            Statement::from_sql_and_values(DbBackend::Postgres, sql, [product_id.into()]);

        VariantRecordRow::find_by_statement(stmt)
            .all(self.txn()?)
            .await
            .map_err(ProductError::database)?
            .into_iter()
            .map(VariantRecord::try_from)
            .collect()
    }

    async fn insert_product(&mut self, product: NewProduct) -> ProductResult<()> {
        let sql = r#"
            INSERT INTO products (
                id, base_name, category_id, product_type,
                created_by, updated_by, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $5, NOW(), NOW())
        "#;

        self.execute(
            sql,
            vec![
                product.id.into(),
                product.base_name.into(),
                product.category_id.into(),
                product.product_type.to_string().into(),
                product.created_by.into(),
            ],
        )
        .await?;

        tracing::debug!(product_id = %product.id, "Inserted product");
        Ok(())
    }

    async fn insert_variant(&mut self, variant: NewVariant) -> ProductResult<()> {
        let sql = r#"
            INSERT INTO product_variants (
                id, product_id, product_name, variant_name, full_name,
                packaging_type_id, size_value, size_unit_id, cost_price, selling_price,
                is_active, created_by, updated_by, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12, NOW(), NOW())
        "#;

        self.execute(
            sql,
            vec![
                variant.id.into(),
                variant.product_id.into(),
                variant.product_name.into(),
                variant.variant_name.into(),
                variant.full_name.into(),
                variant.packaging_type_id.into(),
                variant.size_value.into(),
                variant.size_unit_id.into(),
                variant.cost_price.into(),
                variant.selling_price.into(),
                variant.is_active.into(),
                variant.created_by.into(),
            ],
        )
        .await?;

        tracing::debug!(variant_id = %variant.id, product_id = %variant.product_id, "Inserted variant");
        Ok(())
    }

    async fn insert_repack_recipe(&mut self, recipe: NewRepackRecipe) -> ProductResult<()> {
        let sql = r#"
            INSERT INTO product_repack_recipes (
                id, parent_variant_id, child_variant_id, quantity_ratio,
                repack_cost_per_unit, repack_time_minutes,
                created_by, updated_by, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7, NOW(), NOW())
        "#;

        self.execute(
            sql,
            vec![
                recipe.id.into(),
                recipe.parent_variant_id.into(),
                recipe.child_variant_id.into(),
                recipe.quantity_ratio.into(),
                recipe.repack_cost_per_unit.into(),
                recipe.repack_time_minutes.into(),
                recipe.created_by.into(),
            ],
        )
        .await?;

        Ok(())
    }

    async fn update_product(&mut self, update: ProductUpdate) -> ProductResult<()> {
        let sql = r#"
            UPDATE products
            SET base_name = $2, category_id = $3, updated_by = $4, updated_at = NOW()
            WHERE id = $1
        "#;

        let affected = self
            .execute(
                sql,
                vec![
                    update.id.into(),
                    update.base_name.into(),
                    update.category_id.into(),
                    update.updated_by.into(),
                ],
            )
            .await?;

        if affected == 0 {
            return Err(ProductError::database(format!(
                "product {} was not updated",
                update.id
            )));
        }
        Ok(())
    }

    async fn update_variant(&mut self, update: VariantUpdate) -> ProductResult<()> {
        let sql = r#"
            UPDATE product_variants
            SET product_name = $2, variant_name = $3, full_name = $4,
                packaging_type_id = $5, size_value = $6, size_unit_id = $7,
                cost_price = $8, selling_price = $9, updated_by = $10, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
        "#;

        let affected = self
            .execute(
                sql,
                vec![
                    update.id.into(),
                    update.product_name.into(),
                    update.variant_name.into(),
                    update.full_name.into(),
                    update.packaging_type_id.into(),
                    update.size_value.into(),
                    update.size_unit_id.into(),
                    update.cost_price.into(),
                    update.selling_price.into(),
                    update.updated_by.into(),
                ],
            )
            .await?;

        if affected == 0 {
            return Err(ProductError::database(format!(
                "variant {} was not updated",
                update.id
            )));
        }
        Ok(())
    }

    async fn category_is_active(&mut self, category_id: Uuid) -> ProductResult<bool> {
        self.exists(
            "SELECT id FROM product_categories WHERE id = $1 AND is_active",
            vec![category_id.into()],
        )
        .await
    }

    async fn rule_target_is_active(
        &mut self,
        target: RuleTarget,
        target_id: Uuid,
    ) -> ProductResult<bool> {
        let sql = format!(
            "SELECT id FROM {} WHERE id = $1 AND is_active",
            rule_table(target).target_table
        );
        self.exists(&sql, vec![target_id.into()]).await
    }

    async fn find_rule_id(
        &mut self,
        target: RuleTarget,
        category_id: Uuid,
        target_id: Uuid,
    ) -> ProductResult<Option<Uuid>> {
        let RuleTable {
            table,
            target_column,
            ..
        } = rule_table(target);
        let sql = format!(
            "SELECT rule_id AS id FROM {table} WHERE category_id = $1 AND {target_column} = $2"
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [category_id.into(), target_id.into()],
        );
        let row = IdRow::find_by_statement(stmt)
            .one(self.txn()?)
            .await
            .map_err(ProductError::database)?;

        Ok(row.map(|r| r.id))
    }

    async fn insert_rule(
        &mut self,
        target: RuleTarget,
        rule: NewCategoryRule,
    ) -> ProductResult<()> {
        let RuleTable {
            table,
            target_column,
            ..
        } = rule_table(target);
        let sql = format!(
            r#"
            INSERT INTO {table} (
                rule_id, category_id, {target_column}, is_default,
                created_by, updated_by, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $5, NOW(), NOW())
            "#
        );

        self.execute_mapped(
            &sql,
            vec![
                rule.rule_id.into(),
                rule.category_id.into(),
                rule.target_id.into(),
                rule.is_default.into(),
                rule.created_by.into(),
            ],
            rule_write_error,
        )
        .await?;

        tracing::debug!(rule_id = %rule.rule_id, %target, "Inserted category rule");
        Ok(())
    }

    async fn update_rule(
        &mut self,
        target: RuleTarget,
        update: CategoryRuleUpdate,
    ) -> ProductResult<bool> {
        let RuleTable {
            table,
            target_column,
            ..
        } = rule_table(target);
        let sql = format!(
            r#"
            UPDATE {table}
            SET {target_column} = $2, is_default = $3, updated_by = $4, updated_at = NOW()
            WHERE rule_id = $1 AND category_id = $5 AND is_active
            "#
        );

        let affected = self
            .execute_mapped(
                &sql,
                vec![
                    update.rule_id.into(),
                    update.target_id.into(),
                    update.is_default.into(),
                    update.updated_by.into(),
                    update.category_id.into(),
                ],
                rule_write_error,
            )
            .await?;

        Ok(affected > 0)
    }

    async fn update_rule_status(
        &mut self,
        target: RuleTarget,
        rule_id: Uuid,
        is_active: bool,
        updated_by: String,
    ) -> ProductResult<bool> {
        let sql = format!(
            "UPDATE {} SET is_active = $2, updated_by = $3, updated_at = NOW() WHERE rule_id = $1",
            rule_table(target).table
        );

        let affected = self
            .execute(
                &sql,
                vec![rule_id.into(), is_active.into(), updated_by.into()],
            )
            .await?;

        Ok(affected > 0)
    }

    async fn commit(&mut self) -> ProductResult<()> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| ProductError::Internal("Transaction already committed".to_string()))?;
        txn.commit().await.map_err(ProductError::database)
    }
}
