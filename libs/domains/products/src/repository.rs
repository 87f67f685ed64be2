use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CategoryRuleUpdate, NewCategoryRule, NewProduct, NewRepackRecipe, NewVariant, PackagingRule,
    PackagingRuleMatch, PackagingTypeSummary, ProductType, ProductUpdate, RuleStatus, RuleTarget,
    SizeUnitRule, SizeUnitRuleMatch, SizeUnitSummary, VariantRecord, VariantUpdate,
};

/// One read-committed transaction over the catalog tables.
///
/// Dropping a unit of work without calling [`ProductUnitOfWork::commit`]
/// discards every write made through it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductUnitOfWork: Send {
    /// Active size-unit rules of `category_id` restricted to `size_unit_ids`.
    /// The rule, the size unit and the category must all be active.
    async fn find_size_unit_rules(
        &mut self,
        category_id: Uuid,
        size_unit_ids: &[Uuid],
    ) -> ProductResult<Vec<SizeUnitRuleMatch>>;

    /// Active packaging rules of `category_id` restricted to `packaging_type_ids`.
    async fn find_packaging_rules(
        &mut self,
        category_id: Uuid,
        packaging_type_ids: &[Uuid],
    ) -> ProductResult<Vec<PackagingRuleMatch>>;

    /// Ids among `variant_ids` that belong to active, non-deleted variants
    async fn find_active_variants_by_ids(&mut self, variant_ids: &[Uuid])
    -> ProductResult<Vec<Uuid>>;

    /// Active variants of a product with the product's stored type
    async fn find_variants_by_product_id(
        &mut self,
        product_id: Uuid,
    ) -> ProductResult<Vec<VariantRecord>>;

    async fn insert_product(&mut self, product: NewProduct) -> ProductResult<()>;

    async fn insert_variant(&mut self, variant: NewVariant) -> ProductResult<()>;

    async fn insert_repack_recipe(&mut self, recipe: NewRepackRecipe) -> ProductResult<()>;

    async fn update_product(&mut self, update: ProductUpdate) -> ProductResult<()>;

    async fn update_variant(&mut self, update: VariantUpdate) -> ProductResult<()>;

    /// Whether the category exists and is active
    async fn category_is_active(&mut self, category_id: Uuid) -> ProductResult<bool>;

    /// Whether the size unit or packaging type exists and is active
    async fn rule_target_is_active(
        &mut self,
        target: RuleTarget,
        target_id: Uuid,
    ) -> ProductResult<bool>;

    /// Rule binding `target_id` to `category_id`, active or not
    async fn find_rule_id(
        &mut self,
        target: RuleTarget,
        category_id: Uuid,
        target_id: Uuid,
    ) -> ProductResult<Option<Uuid>>;

    async fn insert_rule(&mut self, target: RuleTarget, rule: NewCategoryRule)
    -> ProductResult<()>;

    /// Rewrites an active rule of `update.category_id`. `false` when no such rule exists.
    async fn update_rule(
        &mut self,
        target: RuleTarget,
        update: CategoryRuleUpdate,
    ) -> ProductResult<bool>;

    /// `false` when the rule does not exist
    async fn update_rule_status(
        &mut self,
        target: RuleTarget,
        rule_id: Uuid,
        is_active: bool,
        updated_by: String,
    ) -> ProductResult<bool>;

    /// Persist every write. Calling it twice is an error.
    async fn commit(&mut self) -> ProductResult<()>;
}

/// Entry point to catalog persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Open a unit of work for a create/update flow
    async fn begin(&self) -> ProductResult<Box<dyn ProductUnitOfWork>>;

    /// Size-unit rules bound to a category, filtered by the rule's `is_active`
    async fn list_size_unit_rules(
        &self,
        category_id: Uuid,
        status: RuleStatus,
    ) -> ProductResult<Vec<SizeUnitRule>>;

    /// Packaging rules bound to a category, filtered by the rule's `is_active`
    async fn list_packaging_rules(
        &self,
        category_id: Uuid,
        status: RuleStatus,
    ) -> ProductResult<Vec<PackagingRule>>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (development/testing)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CategoryRow {
    code: String,
    is_active: bool,
}

#[derive(Debug, Clone)]
struct SizeUnitRow {
    code: String,
    name: String,
    unit_type: String,
    is_active: bool,
}

#[derive(Debug, Clone)]
struct PackagingTypeRow {
    code: String,
    name: String,
    is_active: bool,
}

#[derive(Debug, Clone)]
struct RuleRow {
    rule_id: Uuid,
    category_id: Uuid,
    target_id: Uuid,
    is_default: bool,
    is_active: bool,
}

/// Product row as held by [`InMemoryProductStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProduct {
    pub id: Uuid,
    pub base_name: String,
    pub category_id: Uuid,
    pub product_type: ProductType,
    pub created_by: String,
    pub updated_by: Option<String>,
}

/// Variant row as held by [`InMemoryProductStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredVariant {
    pub variant: NewVariant,
    pub updated_by: Option<String>,
    pub deleted: bool,
}

#[derive(Debug, Default)]
struct CatalogState {
    categories: HashMap<Uuid, CategoryRow>,
    size_units: HashMap<Uuid, SizeUnitRow>,
    packaging_types: HashMap<Uuid, PackagingTypeRow>,
    size_unit_rules: Vec<RuleRow>,
    packaging_rules: Vec<RuleRow>,
    products: HashMap<Uuid, StoredProduct>,
    variants: Vec<StoredVariant>,
    recipes: Vec<NewRepackRecipe>,
    fail_variant_insert_at: Option<usize>,
    fail_variant_update_at: Option<usize>,
}

impl CatalogState {
    fn category_active(&self, id: Uuid) -> Option<&CategoryRow> {
        self.categories.get(&id).filter(|c| c.is_active)
    }

    fn active_variant(&self, id: Uuid) -> Option<&StoredVariant> {
        self.variants
            .iter()
            .find(|v| v.variant.id == id && v.variant.is_active && !v.deleted)
    }

    fn rules(&self, target: RuleTarget) -> &Vec<RuleRow> {
        match target {
            RuleTarget::SizeUnit => &self.size_unit_rules,
            RuleTarget::PackagingType => &self.packaging_rules,
        }
    }

    fn rules_mut(&mut self, target: RuleTarget) -> &mut Vec<RuleRow> {
        match target {
            RuleTarget::SizeUnit => &mut self.size_unit_rules,
            RuleTarget::PackagingType => &mut self.packaging_rules,
        }
    }

    fn target_active(&self, target: RuleTarget, id: Uuid) -> bool {
        match target {
            RuleTarget::SizeUnit => self.size_units.get(&id).is_some_and(|u| u.is_active),
            RuleTarget::PackagingType => {
                self.packaging_types.get(&id).is_some_and(|p| p.is_active)
            }
        }
    }
}

/// In-memory catalog with staged, commit-on-success writes
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductStore {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_category(&self, code: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.state.write().await.categories.insert(
            id,
            CategoryRow {
                code: code.to_string(),
                is_active: true,
            },
        );
        id
    }

    pub async fn add_size_unit(&self, code: &str, name: &str, unit_type: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.state.write().await.size_units.insert(
            id,
            SizeUnitRow {
                code: code.to_string(),
                name: name.to_string(),
                unit_type: unit_type.to_string(),
                is_active: true,
            },
        );
        id
    }

    pub async fn add_packaging_type(&self, code: &str, name: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.state.write().await.packaging_types.insert(
            id,
            PackagingTypeRow {
                code: code.to_string(),
                name: name.to_string(),
                is_active: true,
            },
        );
        id
    }

    /// Bind a size unit to a category, returning the rule id
    pub async fn bind_size_unit(&self, category_id: Uuid, size_unit_id: Uuid) -> Uuid {
        let rule_id = Uuid::now_v7();
        self.state.write().await.size_unit_rules.push(RuleRow {
            rule_id,
            category_id,
            target_id: size_unit_id,
            is_default: false,
            is_active: true,
        });
        rule_id
    }

    /// Bind a packaging type to a category, returning the rule id
    pub async fn bind_packaging_type(&self, category_id: Uuid, packaging_type_id: Uuid) -> Uuid {
        let rule_id = Uuid::now_v7();
        self.state.write().await.packaging_rules.push(RuleRow {
            rule_id,
            category_id,
            target_id: packaging_type_id,
            is_default: false,
            is_active: true,
        });
        rule_id
    }

    /// Flip `is_active` on a size-unit or packaging rule
    pub async fn set_rule_active(&self, rule_id: Uuid, is_active: bool) {
        let mut state = self.state.write().await;
        let CatalogState {
            size_unit_rules,
            packaging_rules,
            ..
        } = &mut *state;
        if let Some(rule) = size_unit_rules
            .iter_mut()
            .chain(packaging_rules.iter_mut())
            .find(|r| r.rule_id == rule_id)
        {
            rule.is_active = is_active;
        }
    }

    pub async fn set_category_active(&self, category_id: Uuid, is_active: bool) {
        if let Some(category) = self.state.write().await.categories.get_mut(&category_id) {
            category.is_active = is_active;
        }
    }

    /// Insert a committed product with `variant_count` active variants.
    /// Returns the product id and the variant ids in insertion order.
    pub async fn seed_product(
        &self,
        product_type: ProductType,
        base_name: &str,
        category_id: Uuid,
        packaging_type_id: Uuid,
        size_unit_id: Uuid,
        variant_count: usize,
    ) -> (Uuid, Vec<Uuid>) {
        let mut state = self.state.write().await;
        let product_id = Uuid::now_v7();
        state.products.insert(
            product_id,
            StoredProduct {
                id: product_id,
                base_name: base_name.to_string(),
                category_id,
                product_type,
                created_by: "seed".to_string(),
                updated_by: None,
            },
        );

        let variant_ids: Vec<Uuid> = (0..variant_count).map(|_| Uuid::now_v7()).collect();
        for id in &variant_ids {
            state.variants.push(StoredVariant {
                variant: NewVariant {
                    id: *id,
                    product_id,
                    product_name: base_name.to_string(),
                    variant_name: None,
                    full_name: base_name.to_string(),
                    packaging_type_id,
                    size_value: 1.0,
                    size_unit_id,
                    cost_price: None,
                    selling_price: rust_decimal::Decimal::ONE,
                    is_active: true,
                    created_by: "seed".to_string(),
                },
                updated_by: None,
                deleted: false,
            });
        }
        (product_id, variant_ids)
    }

    pub async fn deactivate_variant(&self, variant_id: Uuid) {
        let mut state = self.state.write().await;
        if let Some(row) = state.variants.iter_mut().find(|v| v.variant.id == variant_id) {
            row.variant.is_active = false;
        }
    }

    /// Make the `n`-th variant insert (1-based) of every later unit of work fail
    pub async fn fail_variant_insert_at(&self, n: usize) {
        self.state.write().await.fail_variant_insert_at = Some(n);
    }

    /// Make the `n`-th variant update (1-based) of every later unit of work fail
    pub async fn fail_variant_update_at(&self, n: usize) {
        self.state.write().await.fail_variant_update_at = Some(n);
    }

    pub async fn products(&self) -> Vec<StoredProduct> {
        self.state.read().await.products.values().cloned().collect()
    }

    pub async fn product(&self, id: Uuid) -> Option<StoredProduct> {
        self.state.read().await.products.get(&id).cloned()
    }

    pub async fn variants(&self) -> Vec<StoredVariant> {
        self.state.read().await.variants.clone()
    }

    pub async fn variants_of(&self, product_id: Uuid) -> Vec<StoredVariant> {
        self.state
            .read()
            .await
            .variants
            .iter()
            .filter(|v| v.variant.product_id == product_id)
            .cloned()
            .collect()
    }

    pub async fn repack_recipes(&self) -> Vec<NewRepackRecipe> {
        self.state.read().await.recipes.clone()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn begin(&self) -> ProductResult<Box<dyn ProductUnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            state: Arc::clone(&self.state),
            staged: Vec::new(),
            variant_inserts: 0,
            variant_updates: 0,
            committed: false,
        }))
    }

    async fn list_size_unit_rules(
        &self,
        category_id: Uuid,
        status: RuleStatus,
    ) -> ProductResult<Vec<SizeUnitRule>> {
        let state = self.state.read().await;
        let rules = state
            .size_unit_rules
            .iter()
            .filter(|r| r.category_id == category_id && r.is_active == status.is_active())
            .filter_map(|r| {
                let unit = state.size_units.get(&r.target_id)?;
                Some(SizeUnitRule {
                    rule_id: r.rule_id,
                    product_category_id: r.category_id,
                    size_unit_id: r.target_id,
                    size_unit: SizeUnitSummary {
                        size_unit_id: r.target_id,
                        size_unit_code: unit.code.clone(),
                        size_unit_name: unit.name.clone(),
                        size_unit_type: unit.unit_type.clone(),
                    },
                    is_default: r.is_default,
                    is_active: r.is_active,
                })
            })
            .collect();
        Ok(rules)
    }

    async fn list_packaging_rules(
        &self,
        category_id: Uuid,
        status: RuleStatus,
    ) -> ProductResult<Vec<PackagingRule>> {
        let state = self.state.read().await;
        let rules = state
            .packaging_rules
            .iter()
            .filter(|r| r.category_id == category_id && r.is_active == status.is_active())
            .filter_map(|r| {
                let packaging = state.packaging_types.get(&r.target_id)?;
                Some(PackagingRule {
                    rule_id: r.rule_id,
                    product_category_id: r.category_id,
                    packaging_type_id: r.target_id,
                    packaging_type: PackagingTypeSummary {
                        packaging_code: packaging.code.clone(),
                        packaging_name: packaging.name.clone(),
                    },
                    is_default: r.is_default,
                    is_active: r.is_active,
                })
            })
            .collect();
        Ok(rules)
    }
}

#[derive(Debug)]
enum StagedWrite {
    Product(NewProduct),
    Variant(NewVariant),
    Recipe(NewRepackRecipe),
    ProductUpdate(ProductUpdate),
    VariantUpdate(VariantUpdate),
    RuleInsert(RuleTarget, NewCategoryRule),
    RuleUpdate(RuleTarget, CategoryRuleUpdate),
    RuleActive(RuleTarget, Uuid, bool),
}

/// Unit of work over [`InMemoryProductStore`]. Reads see committed state,
/// writes are staged and applied on commit.
pub struct InMemoryUnitOfWork {
    state: Arc<RwLock<CatalogState>>,
    staged: Vec<StagedWrite>,
    variant_inserts: usize,
    variant_updates: usize,
    committed: bool,
}

impl InMemoryUnitOfWork {
    fn ensure_open(&self) -> ProductResult<()> {
        if self.committed {
            return Err(ProductError::Internal(
                "transaction already committed".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductUnitOfWork for InMemoryUnitOfWork {
    async fn find_size_unit_rules(
        &mut self,
        category_id: Uuid,
        size_unit_ids: &[Uuid],
    ) -> ProductResult<Vec<SizeUnitRuleMatch>> {
        self.ensure_open()?;
        let state = self.state.read().await;
        let Some(category) = state.category_active(category_id) else {
            return Ok(Vec::new());
        };
        let matches = state
            .size_unit_rules
            .iter()
            .filter(|r| {
                r.is_active && r.category_id == category_id && size_unit_ids.contains(&r.target_id)
            })
            .filter_map(|r| {
                let unit = state.size_units.get(&r.target_id).filter(|u| u.is_active)?;
                Some(SizeUnitRuleMatch {
                    category_id,
                    size_unit_id: r.target_id,
                    size_unit_code: unit.code.clone(),
                    category_code: category.code.clone(),
                })
            })
            .collect();
        Ok(matches)
    }

    async fn find_packaging_rules(
        &mut self,
        category_id: Uuid,
        packaging_type_ids: &[Uuid],
    ) -> ProductResult<Vec<PackagingRuleMatch>> {
        self.ensure_open()?;
        let state = self.state.read().await;
        if state.category_active(category_id).is_none() {
            return Ok(Vec::new());
        }
        let matches = state
            .packaging_rules
            .iter()
            .filter(|r| {
                r.is_active
                    && r.category_id == category_id
                    && packaging_type_ids.contains(&r.target_id)
            })
            .filter_map(|r| {
                let packaging = state
                    .packaging_types
                    .get(&r.target_id)
                    .filter(|p| p.is_active)?;
                Some(PackagingRuleMatch {
                    category_id,
                    packaging_type_id: r.target_id,
                    packaging_type_code: packaging.code.clone(),
                })
            })
            .collect();
        Ok(matches)
    }

    async fn find_active_variants_by_ids(
        &mut self,
        variant_ids: &[Uuid],
    ) -> ProductResult<Vec<Uuid>> {
        self.ensure_open()?;
        let state = self.state.read().await;
        Ok(variant_ids
            .iter()
            .filter(|id| state.active_variant(**id).is_some())
            .copied()
            .collect())
    }

    async fn find_variants_by_product_id(
        &mut self,
        product_id: Uuid,
    ) -> ProductResult<Vec<VariantRecord>> {
        self.ensure_open()?;
        let state = self.state.read().await;
        let Some(product) = state.products.get(&product_id) else {
            return Ok(Vec::new());
        };
        Ok(state
            .variants
            .iter()
            .filter(|v| v.variant.product_id == product_id && v.variant.is_active && !v.deleted)
            .map(|v| VariantRecord {
                id: v.variant.id,
                product_id,
                product_type: product.product_type,
            })
            .collect())
    }

    async fn insert_product(&mut self, product: NewProduct) -> ProductResult<()> {
        self.ensure_open()?;
        self.staged.push(StagedWrite::Product(product));
        Ok(())
    }

    async fn insert_variant(&mut self, variant: NewVariant) -> ProductResult<()> {
        self.ensure_open()?;
        self.variant_inserts += 1;
        let fail_at = self.state.read().await.fail_variant_insert_at;
        if fail_at == Some(self.variant_inserts) {
            return Err(ProductError::database("injected variant insert failure"));
        }
        self.staged.push(StagedWrite::Variant(variant));
        Ok(())
    }

    async fn insert_repack_recipe(&mut self, recipe: NewRepackRecipe) -> ProductResult<()> {
        self.ensure_open()?;
        self.staged.push(StagedWrite::Recipe(recipe));
        Ok(())
    }

    async fn update_product(&mut self, update: ProductUpdate) -> ProductResult<()> {
        self.ensure_open()?;
        if !self.state.read().await.products.contains_key(&update.id) {
            return Err(ProductError::database(format!(
                "product {} was not updated",
                update.id
            )));
        }
        self.staged.push(StagedWrite::ProductUpdate(update));
        Ok(())
    }

    async fn update_variant(&mut self, update: VariantUpdate) -> ProductResult<()> {
        self.ensure_open()?;
        self.variant_updates += 1;
        let state = self.state.read().await;
        if state.fail_variant_update_at == Some(self.variant_updates) {
            return Err(ProductError::database("injected variant update failure"));
        }
        if state.active_variant(update.id).is_none() {
            return Err(ProductError::database(format!(
                "variant {} was not updated",
                update.id
            )));
        }
        drop(state);
        self.staged.push(StagedWrite::VariantUpdate(update));
        Ok(())
    }

    async fn category_is_active(&mut self, category_id: Uuid) -> ProductResult<bool> {
        self.ensure_open()?;
        Ok(self.state.read().await.category_active(category_id).is_some())
    }

    async fn rule_target_is_active(
        &mut self,
        target: RuleTarget,
        target_id: Uuid,
    ) -> ProductResult<bool> {
        self.ensure_open()?;
        Ok(self.state.read().await.target_active(target, target_id))
    }

    async fn find_rule_id(
        &mut self,
        target: RuleTarget,
        category_id: Uuid,
        target_id: Uuid,
    ) -> ProductResult<Option<Uuid>> {
        self.ensure_open()?;
        Ok(self
            .state
            .read()
            .await
            .rules(target)
            .iter()
            .find(|r| r.category_id == category_id && r.target_id == target_id)
            .map(|r| r.rule_id))
    }

    async fn insert_rule(
        &mut self,
        target: RuleTarget,
        rule: NewCategoryRule,
    ) -> ProductResult<()> {
        self.ensure_open()?;
        self.staged.push(StagedWrite::RuleInsert(target, rule));
        Ok(())
    }

    async fn update_rule(
        &mut self,
        target: RuleTarget,
        update: CategoryRuleUpdate,
    ) -> ProductResult<bool> {
        self.ensure_open()?;
        let matched = self.state.read().await.rules(target).iter().any(|r| {
            r.rule_id == update.rule_id && r.category_id == update.category_id && r.is_active
        });
        if matched {
            self.staged.push(StagedWrite::RuleUpdate(target, update));
        }
        Ok(matched)
    }

    async fn update_rule_status(
        &mut self,
        target: RuleTarget,
        rule_id: Uuid,
        is_active: bool,
        _updated_by: String,
    ) -> ProductResult<bool> {
        self.ensure_open()?;
        let matched = self
            .state
            .read()
            .await
            .rules(target)
            .iter()
            .any(|r| r.rule_id == rule_id);
        if matched {
            self.staged
                .push(StagedWrite::RuleActive(target, rule_id, is_active));
        }
        Ok(matched)
    }

    async fn commit(&mut self) -> ProductResult<()> {
        self.ensure_open()?;
        self.committed = true;

        let mut state = self.state.write().await;
        for write in self.staged.drain(..) {
            match write {
                StagedWrite::Product(p) => {
                    state.products.insert(
                        p.id,
                        StoredProduct {
                            id: p.id,
                            base_name: p.base_name,
                            category_id: p.category_id,
                            product_type: p.product_type,
                            created_by: p.created_by,
                            updated_by: None,
                        },
                    );
                }
                StagedWrite::Variant(v) => state.variants.push(StoredVariant {
                    variant: v,
                    updated_by: None,
                    deleted: false,
                }),
                StagedWrite::Recipe(r) => state.recipes.push(r),
                StagedWrite::ProductUpdate(u) => {
                    if let Some(product) = state.products.get_mut(&u.id) {
                        product.base_name = u.base_name;
                        product.category_id = u.category_id;
                        product.updated_by = Some(u.updated_by);
                    }
                }
                StagedWrite::VariantUpdate(u) => {
                    if let Some(row) = state.variants.iter_mut().find(|v| v.variant.id == u.id) {
                        row.variant.product_name = u.product_name;
                        row.variant.variant_name = u.variant_name;
                        row.variant.full_name = u.full_name;
                        row.variant.packaging_type_id = u.packaging_type_id;
                        row.variant.size_value = u.size_value;
                        row.variant.size_unit_id = u.size_unit_id;
                        row.variant.cost_price = u.cost_price;
                        row.variant.selling_price = u.selling_price;
                        row.updated_by = Some(u.updated_by);
                    }
                }
                StagedWrite::RuleInsert(target, rule) => state.rules_mut(target).push(RuleRow {
                    rule_id: rule.rule_id,
                    category_id: rule.category_id,
                    target_id: rule.target_id,
                    is_default: rule.is_default,
                    is_active: true,
                }),
                StagedWrite::RuleUpdate(target, u) => {
                    if let Some(row) = state
                        .rules_mut(target)
                        .iter_mut()
                        .find(|r| r.rule_id == u.rule_id)
                    {
                        row.target_id = u.target_id;
                        row.is_default = u.is_default;
                    }
                }
                StagedWrite::RuleActive(target, rule_id, is_active) => {
                    if let Some(row) = state
                        .rules_mut(target)
                        .iter_mut()
                        .find(|r| r.rule_id == rule_id)
                    {
                        row.is_active = is_active;
                    }
                }
            }
        }

        tracing::debug!("Committed in-memory unit of work");
        Ok(())
    }
}
