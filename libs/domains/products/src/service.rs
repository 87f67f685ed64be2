use axum_helpers::ActingUser;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{
    INVALID_PRODUCT_TYPE_VARIANT, MISMATCHED_VARIANT_PRODUCT, ProductError, ProductResult,
    SINGLE_PRODUCT_TYPE_REQUIRED,
};
use crate::models::{
    CreateProductRequest, NewProduct, NewRepackRecipe, NewVariant, PackagingRule, ProductType,
    ProductUpdate, RuleStatus, SizeUnitRule, UpdateSingleProductTypeRequest,
    UpdateVariantProductTypeRequest, VariantInput, VariantUpdate,
};
use crate::repository::ProductStore;
use crate::rules::{
    validate_category_rules, validate_parent_variants, validate_single_variant_rules,
};
use crate::validation::{
    FIELD_CATEGORY_ID, FIELD_PRODUCT_ID, FIELD_REPACK_RECIPE, FieldErrors, FieldValidation,
    MSG_RECIPE_NOT_ALLOWED, RecipePolicy, ReferencedIds, Sanitize, full_name, validate_base_name,
    validate_product_type, validate_uuid, validate_variant, validate_variants_present,
};

/// Service layer for product creation and updates
#[derive(Clone)]
pub struct ProductService<S: ProductStore> {
    pub(crate) store: Arc<S>,
}

pub(crate) fn require_actor(actor: &ActingUser) -> ProductResult<String> {
    let id = actor.id().trim();
    if id.is_empty() {
        return Err(ProductError::MissingActor);
    }
    Ok(id.to_string())
}

impl<S: ProductStore> ProductService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Create a product with all of its variants and repack recipes in one transaction.
    /// Returns the new product id.
    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn create_product(
        &self,
        actor: &ActingUser,
        mut input: CreateProductRequest,
    ) -> ProductResult<Uuid> {
        let actor_id = require_actor(actor)?;
        input.sanitize();

        let mut errors = FieldErrors::default();
        let base_name = validate_base_name(&mut errors, &input.product.base_name);
        let category_id =
            validate_uuid(&mut errors, FIELD_CATEGORY_ID, &input.product.category_id);
        let product_type = validate_product_type(
            &mut errors,
            &input.product.product_type,
            &ProductType::CREATABLE,
        );
        validate_variants_present(&mut errors, input.variants.len());

        let policy = RecipePolicy::for_type(product_type);
        let mut referenced = ReferencedIds::default();
        let mut variants = Vec::with_capacity(input.variants.len());
        for variant in &input.variants {
            if let Some(valid) = validate_variant(&mut errors, variant, policy) {
                referenced.record(&valid);
                variants.push(valid);
            }
        }

        let (base_name, category_id, product_type) = errors.finish(
            base_name
                .zip(category_id)
                .zip(product_type)
                .map(|((name, category), kind)| (name, category, kind)),
        )?;

        let mut uow = self.store.begin().await?;

        let codes = validate_category_rules(
            uow.as_mut(),
            category_id,
            &referenced.size_unit_ids,
            &referenced.packaging_type_ids,
        )
        .await?;
        validate_parent_variants(uow.as_mut(), &referenced.parent_variant_ids).await?;
        tracing::debug!(category_code = %codes.category_code, "Category rules satisfied");

        let product_id = Uuid::now_v7();
        uow.insert_product(NewProduct {
            id: product_id,
            base_name: base_name.clone(),
            category_id,
            product_type,
            created_by: actor_id.clone(),
        })
        .await?;

        let variant_count = variants.len();
        for variant in variants {
            let variant_id = Uuid::now_v7();
            uow.insert_variant(NewVariant {
                id: variant_id,
                product_id,
                product_name: base_name.clone(),
                full_name: full_name(&base_name, variant.variant_name.as_deref()),
                variant_name: variant.variant_name,
                packaging_type_id: variant.packaging_type_id,
                size_value: variant.size_value,
                size_unit_id: variant.size_unit_id,
                cost_price: variant.cost_price,
                selling_price: variant.selling_price,
                is_active: true,
                created_by: actor_id.clone(),
            })
            .await?;

            if let Some(recipe) = variant.repack_recipe {
                uow.insert_repack_recipe(NewRepackRecipe {
                    id: Uuid::now_v7(),
                    parent_variant_id: recipe.parent_variant_id,
                    child_variant_id: variant_id,
                    quantity_ratio: recipe.quantity_ratio,
                    repack_cost_per_unit: recipe.repack_cost_per_unit,
                    repack_time_minutes: recipe.repack_time_minutes,
                    created_by: actor_id.clone(),
                })
                .await?;
            }
        }

        uow.commit().await?;

        tracing::info!(%product_id, %product_type, variant_count, "Created product");
        Ok(product_id)
    }

    /// Update a SINGLE product and its only variant
    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn update_single_product_type(
        &self,
        actor: &ActingUser,
        product_id: &str,
        mut input: UpdateSingleProductTypeRequest,
    ) -> ProductResult<()> {
        let actor_id = require_actor(actor)?;
        input.sanitize();

        let mut errors = FieldErrors::default();
        let product_id = validate_uuid(&mut errors, FIELD_PRODUCT_ID, product_id.trim());
        let base_name = validate_base_name(&mut errors, &input.base_name);
        let category_id = validate_uuid(&mut errors, FIELD_CATEGORY_ID, &input.category_id);

        // Single products carry neither a variant name nor a repack recipe.
        let as_variant = VariantInput {
            packaging_type_id: input.packaging_type_id,
            size_value: input.size_value,
            size_unit_id: input.size_unit_id,
            cost_price: input.cost_price,
            sell_price: input.sell_price,
            ..Default::default()
        };
        let variant = validate_variant(&mut errors, &as_variant, RecipePolicy::Forbidden);

        let (product_id, base_name, category_id, variant) = errors.finish(
            product_id
                .zip(base_name)
                .zip(category_id)
                .zip(variant)
                .map(|(((id, name), category), variant)| (id, name, category, variant)),
        )?;

        let mut uow = self.store.begin().await?;

        let existing = uow.find_variants_by_product_id(product_id).await?;
        let [current] = existing.as_slice() else {
            return Err(ProductError::single_variant_count(existing.len()));
        };
        if current.product_type != ProductType::Single {
            return Err(ProductError::BusinessRule(
                SINGLE_PRODUCT_TYPE_REQUIRED.to_string(),
            ));
        }
        let variant_id = current.id;

        let mut referenced = ReferencedIds::default();
        referenced.record(&variant);
        validate_single_variant_rules(
            uow.as_mut(),
            category_id,
            &referenced.size_unit_ids,
            &referenced.packaging_type_ids,
        )
        .await?;

        uow.update_product(ProductUpdate {
            id: product_id,
            base_name: base_name.clone(),
            category_id,
            updated_by: actor_id.clone(),
        })
        .await?;
        uow.update_variant(VariantUpdate {
            id: variant_id,
            product_name: base_name.clone(),
            variant_name: None,
            full_name: full_name(&base_name, None),
            packaging_type_id: variant.packaging_type_id,
            size_value: variant.size_value,
            size_unit_id: variant.size_unit_id,
            cost_price: variant.cost_price,
            selling_price: variant.selling_price,
            updated_by: actor_id,
        })
        .await?;

        uow.commit().await?;

        tracing::info!(%product_id, %variant_id, "Updated single product");
        Ok(())
    }

    /// Update a VARIANT or REPACK product and every one of its active variants
    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn update_variant_product_type(
        &self,
        actor: &ActingUser,
        product_id: &str,
        mut input: UpdateVariantProductTypeRequest,
    ) -> ProductResult<()> {
        let actor_id = require_actor(actor)?;
        input.sanitize();

        let mut errors = FieldErrors::default();
        let product_id = validate_uuid(&mut errors, FIELD_PRODUCT_ID, product_id.trim());
        let base_name = validate_base_name(&mut errors, &input.base_name);
        let category_id = validate_uuid(&mut errors, FIELD_CATEGORY_ID, &input.category_id);
        validate_variants_present(&mut errors, input.variants.len());

        // The stored type is only known once the unit of work is open, so recipes
        // get their shape checked here and the type gate runs below.
        let mut referenced = ReferencedIds::default();
        let mut variants = Vec::with_capacity(input.variants.len());
        for variant in &input.variants {
            if let Some(valid) = validate_variant(&mut errors, variant, RecipePolicy::Unknown) {
                referenced.record(&valid);
                variants.push(valid);
            }
        }

        let (product_id, base_name, category_id) = errors.finish(
            product_id
                .zip(base_name)
                .zip(category_id)
                .map(|((id, name), category)| (id, name, category)),
        )?;

        let mut uow = self.store.begin().await?;

        let existing = uow.find_variants_by_product_id(product_id).await?;
        if existing
            .iter()
            .any(|v| !matches!(v.product_type, ProductType::Variant | ProductType::Repack))
        {
            return Err(ProductError::BusinessRule(
                INVALID_PRODUCT_TYPE_VARIANT.to_string(),
            ));
        }
        if existing
            .first()
            .is_some_and(|v| v.product_type == ProductType::Variant)
        {
            let recipe_errors: Vec<FieldValidation> = variants
                .iter()
                .filter(|v| v.repack_recipe.is_some())
                .map(|_| FieldValidation::new(FIELD_REPACK_RECIPE, MSG_RECIPE_NOT_ALLOWED))
                .collect();
            if !recipe_errors.is_empty() {
                return Err(ProductError::FieldValidation(recipe_errors));
            }
        }
        if existing.len() != variants.len() {
            return Err(ProductError::BusinessRule(
                MISMATCHED_VARIANT_PRODUCT.to_string(),
            ));
        }

        let known: HashSet<Uuid> = existing.iter().map(|v| v.id).collect();
        let mut seen = HashSet::with_capacity(variants.len());
        let mut variant_ids = Vec::with_capacity(variants.len());
        for variant in &variants {
            let id = Uuid::parse_str(&variant.variant_id)
                .ok()
                .filter(|id| known.contains(id))
                .ok_or_else(|| ProductError::product_not_identified(&variant.variant_id))?;
            if !seen.insert(id) {
                return Err(ProductError::BusinessRule(
                    MISMATCHED_VARIANT_PRODUCT.to_string(),
                ));
            }
            variant_ids.push(id);
        }

        validate_category_rules(
            uow.as_mut(),
            category_id,
            &referenced.size_unit_ids,
            &referenced.packaging_type_ids,
        )
        .await?;

        uow.update_product(ProductUpdate {
            id: product_id,
            base_name: base_name.clone(),
            category_id,
            updated_by: actor_id.clone(),
        })
        .await?;

        for (variant, id) in variants.into_iter().zip(variant_ids) {
            uow.update_variant(VariantUpdate {
                id,
                product_name: base_name.clone(),
                full_name: full_name(&base_name, variant.variant_name.as_deref()),
                variant_name: variant.variant_name,
                packaging_type_id: variant.packaging_type_id,
                size_value: variant.size_value,
                size_unit_id: variant.size_unit_id,
                cost_price: variant.cost_price,
                selling_price: variant.selling_price,
                updated_by: actor_id.clone(),
            })
            .await?;
        }

        uow.commit().await?;

        tracing::info!(%product_id, variant_count = existing.len(), "Updated variant product");
        Ok(())
    }

    /// Size-unit rules bound to a category
    #[instrument(skip(self))]
    pub async fn list_size_unit_rules(
        &self,
        category_id: Uuid,
        status: RuleStatus,
    ) -> ProductResult<Vec<SizeUnitRule>> {
        self.store.list_size_unit_rules(category_id, status).await
    }

    /// Packaging rules bound to a category
    #[instrument(skip(self))]
    pub async fn list_packaging_rules(
        &self,
        category_id: Uuid,
        status: RuleStatus,
    ) -> ProductResult<Vec<PackagingRule>> {
        self.store.list_packaging_rules(category_id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{
        PACKAGING_TYPE_RULE_NOT_FOUND, PARENT_VARIANT_NOT_FOUND, SIZE_UNIT_RULE_NOT_FOUND,
    };
    use crate::models::{
        PackagingRuleMatch, ProductInput, RepackRecipeInput, SizeUnitRuleMatch,
    };
    use crate::repository::{
        InMemoryProductStore, MockProductStore, MockProductUnitOfWork, ProductUnitOfWork,
    };
    use rust_decimal::Decimal;

    struct Fixture {
        store: InMemoryProductStore,
        service: ProductService<InMemoryProductStore>,
        category: Uuid,
        unit: Uuid,
        packaging: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryProductStore::new();
        let category = store.add_category("PLASTIC").await;
        let unit = store.add_size_unit("CM", "Centimeter", "LENGTH").await;
        let packaging = store.add_packaging_type("PCS", "Pieces").await;
        store.bind_size_unit(category, unit).await;
        store.bind_packaging_type(category, packaging).await;

        Fixture {
            service: ProductService::new(store.clone()),
            store,
            category,
            unit,
            packaging,
        }
    }

    fn actor() -> ActingUser {
        ActingUser("user-1".to_string())
    }

    fn variant(f: &Fixture, size_value: f64, sell_price: i64) -> VariantInput {
        VariantInput {
            packaging_type_id: f.packaging.to_string(),
            size_unit_id: f.unit.to_string(),
            size_value,
            sell_price: Some(Decimal::new(sell_price, 0)),
            ..Default::default()
        }
    }

    fn create_request(
        f: &Fixture,
        product_type: &str,
        variants: Vec<VariantInput>,
    ) -> CreateProductRequest {
        CreateProductRequest {
            product: ProductInput {
                base_name: "kantong plastik".to_string(),
                category_id: f.category.to_string(),
                product_type: product_type.to_string(),
            },
            variants,
        }
    }

    fn business_message(err: ProductError) -> String {
        match err {
            ProductError::BusinessRule(message) => message,
            other => panic!("expected business rule error, got {:?}", other),
        }
    }

    fn error_fields(err: ProductError) -> Vec<String> {
        match err {
            ProductError::FieldValidation(fields) => {
                fields.into_iter().map(|f| f.field).collect()
            }
            other => panic!("expected field validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_variant_product() {
        let f = fixture().await;
        let mut besar = variant(&f, 20.0, 8000);
        besar.variant_name = Some("besar".to_string());
        let request = create_request(&f, "VARIANT", vec![variant(&f, 10.0, 5000), besar]);

        let product_id = f.service.create_product(&actor(), request).await.unwrap();

        let product = f.store.product(product_id).await.unwrap();
        assert_eq!(product.base_name, "KANTONG PLASTIK");
        assert_eq!(product.product_type, ProductType::Variant);
        assert_eq!(product.created_by, "user-1");

        let names: Vec<String> = f
            .store
            .variants_of(product_id)
            .await
            .into_iter()
            .map(|v| v.variant.full_name)
            .collect();
        assert_eq!(names, vec!["KANTONG PLASTIK", "KANTONG PLASTIK BESAR"]);
        assert!(f.store.repack_recipes().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_unbound_size_unit_without_writes() {
        let f = fixture().await;
        let foreign_unit = f.store.add_size_unit("KG", "Kilogram", "WEIGHT").await;
        let mut other = variant(&f, 1.0, 100);
        other.size_unit_id = foreign_unit.to_string();
        let request = create_request(&f, "VARIANT", vec![variant(&f, 10.0, 5000), other]);

        let err = f.service.create_product(&actor(), request).await.unwrap_err();

        assert_eq!(business_message(err), SIZE_UNIT_RULE_NOT_FOUND);
        assert!(f.store.products().await.is_empty());
        assert!(f.store.variants().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_inactive_packaging_rule() {
        let store = InMemoryProductStore::new();
        let category = store.add_category("PLASTIC").await;
        let unit = store.add_size_unit("CM", "Centimeter", "LENGTH").await;
        let packaging = store.add_packaging_type("PCS", "Pieces").await;
        store.bind_size_unit(category, unit).await;
        let rule = store.bind_packaging_type(category, packaging).await;
        store.set_rule_active(rule, false).await;
        let f = Fixture {
            service: ProductService::new(store.clone()),
            store,
            category,
            unit,
            packaging,
        };

        let request = create_request(&f, "VARIANT", vec![variant(&f, 10.0, 5000)]);
        let err = f.service.create_product(&actor(), request).await.unwrap_err();

        assert_eq!(business_message(err), PACKAGING_TYPE_RULE_NOT_FOUND);
        assert!(f.store.products().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_repack_product_links_recipe_to_new_variant() {
        let f = fixture().await;
        let (_, parents) = f
            .store
            .seed_product(ProductType::Variant, "SEDOTAN", f.category, f.packaging, f.unit, 1)
            .await;

        let mut child = variant(&f, 5.0, 1000);
        child.repack_recipe = Some(RepackRecipeInput {
            parent_variant_id: parents[0].to_string(),
            quantity_ratio: 0.25,
            repack_cost_per_unit: Some(Decimal::new(50, 0)),
            repack_time_minutes: 3,
        });
        let request = create_request(&f, "REPACK", vec![child]);

        let product_id = f.service.create_product(&actor(), request).await.unwrap();

        let created = f.store.variants_of(product_id).await;
        let recipes = f.store.repack_recipes().await;
        assert_eq!(created.len(), 1);
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].parent_variant_id, parents[0]);
        assert_eq!(recipes[0].child_variant_id, created[0].variant.id);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_parent_variant() {
        let f = fixture().await;
        let mut child = variant(&f, 5.0, 1000);
        child.repack_recipe = Some(RepackRecipeInput {
            parent_variant_id: Uuid::now_v7().to_string(),
            quantity_ratio: 1.0,
            repack_cost_per_unit: Some(Decimal::ONE),
            repack_time_minutes: 1,
        });

        let err = f
            .service
            .create_product(&actor(), create_request(&f, "REPACK", vec![child]))
            .await
            .unwrap_err();

        assert_eq!(business_message(err), PARENT_VARIANT_NOT_FOUND);
        assert!(f.store.products().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_is_atomic_when_a_variant_insert_fails() {
        let f = fixture().await;
        let (parent_product, parents) = f
            .store
            .seed_product(ProductType::Variant, "SEDOTAN", f.category, f.packaging, f.unit, 1)
            .await;
        f.store.fail_variant_insert_at(2).await;

        let with_recipe = |size: f64| {
            let mut v = variant(&f, size, 1000);
            v.repack_recipe = Some(RepackRecipeInput {
                parent_variant_id: parents[0].to_string(),
                quantity_ratio: 1.0,
                repack_cost_per_unit: Some(Decimal::ONE),
                repack_time_minutes: 1,
            });
            v
        };
        let request = create_request(
            &f,
            "REPACK",
            vec![with_recipe(1.0), with_recipe(2.0), with_recipe(3.0)],
        );

        let err = f.service.create_product(&actor(), request).await.unwrap_err();

        assert!(matches!(err, ProductError::Internal(_)));
        let products = f.store.products().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, parent_product);
        assert_eq!(f.store.variants().await.len(), 1);
        assert!(f.store.repack_recipes().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_accumulates_field_errors_before_opening_a_transaction() {
        let mut store = MockProductStore::new();
        store.expect_begin().never();
        let service = ProductService::new(store);

        let expensive = VariantInput {
            packaging_type_id: Uuid::now_v7().to_string(),
            size_unit_id: Uuid::now_v7().to_string(),
            size_value: 1.0,
            sell_price: Some(Decimal::new(100, 0)),
            cost_price: Some(Decimal::new(200, 0)),
            ..Default::default()
        };
        let request = CreateProductRequest {
            product: ProductInput {
                base_name: "  ".to_string(),
                category_id: "abc".to_string(),
                product_type: "SINGLE".to_string(),
            },
            variants: vec![
                expensive,
                VariantInput {
                    size_value: -1.0,
                    ..Default::default()
                },
            ],
        };

        let err = service.create_product(&actor(), request).await.unwrap_err();

        assert_eq!(
            error_fields(err),
            vec![
                "base_name",
                "category_id",
                "product_type",
                "cost_price",
                "sell_price",
                "packaging_type_id",
                "size_unit_id",
                "size_value",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_enforces_repack_policy() {
        let f = fixture().await;

        let err = f
            .service
            .create_product(&actor(), create_request(&f, "REPACK", vec![variant(&f, 1.0, 10)]))
            .await
            .unwrap_err();
        assert_eq!(error_fields(err), vec!["repack_recipe"]);

        let mut with_recipe = variant(&f, 1.0, 10);
        with_recipe.repack_recipe = Some(RepackRecipeInput::default());
        let err = f
            .service
            .create_product(&actor(), create_request(&f, "VARIANT", vec![with_recipe]))
            .await
            .unwrap_err();
        assert_eq!(error_fields(err), vec!["repack_recipe"]);
    }

    #[tokio::test]
    async fn test_create_requires_actor() {
        let f = fixture().await;
        let request = create_request(&f, "VARIANT", vec![variant(&f, 1.0, 10)]);

        let err = f
            .service
            .create_product(&ActingUser(String::new()), request)
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::MissingActor));
    }

    #[tokio::test]
    async fn test_create_looks_up_each_rule_id_once() {
        let category = Uuid::now_v7();
        let unit = Uuid::now_v7();
        let packaging = Uuid::now_v7();

        let mut uow = MockProductUnitOfWork::new();
        uow.expect_find_size_unit_rules()
            .withf(move |c, ids| *c == category && ids.to_vec() == vec![unit])
            .times(1)
            .return_once(move |_, _| {
                Ok(vec![SizeUnitRuleMatch {
                    category_id: category,
                    size_unit_id: unit,
                    size_unit_code: "CM".to_string(),
                    category_code: "PLASTIC".to_string(),
                }])
            });
        uow.expect_find_packaging_rules()
            .withf(move |c, ids| *c == category && ids.to_vec() == vec![packaging])
            .times(1)
            .return_once(move |_, _| {
                Ok(vec![PackagingRuleMatch {
                    category_id: category,
                    packaging_type_id: packaging,
                    packaging_type_code: "PCS".to_string(),
                }])
            });
        uow.expect_find_active_variants_by_ids().never();
        uow.expect_insert_product().times(1).returning(|_| Ok(()));
        uow.expect_insert_variant().times(3).returning(|_| Ok(()));
        uow.expect_insert_repack_recipe().never();
        uow.expect_commit().times(1).returning(|| Ok(()));

        let mut store = MockProductStore::new();
        store
            .expect_begin()
            .times(1)
            .return_once(move || Ok(Box::new(uow) as Box<dyn ProductUnitOfWork>));
        let service = ProductService::new(store);

        let same = VariantInput {
            packaging_type_id: packaging.to_string(),
            size_unit_id: unit.to_string(),
            size_value: 1.0,
            sell_price: Some(Decimal::TEN),
            ..Default::default()
        };
        let request = CreateProductRequest {
            product: ProductInput {
                base_name: "sedotan".to_string(),
                category_id: category.to_string(),
                product_type: "VARIANT".to_string(),
            },
            variants: vec![same.clone(), same.clone(), same],
        };

        service.create_product(&actor(), request).await.unwrap();
    }

    fn single_request(f: &Fixture) -> UpdateSingleProductTypeRequest {
        UpdateSingleProductTypeRequest {
            base_name: "gelas plastik".to_string(),
            category_id: f.category.to_string(),
            packaging_type_id: f.packaging.to_string(),
            size_value: 12.0,
            size_unit_id: f.unit.to_string(),
            cost_price: Some(Decimal::new(900, 0)),
            sell_price: Some(Decimal::new(1500, 0)),
        }
    }

    #[tokio::test]
    async fn test_update_single_requires_exactly_one_variant() {
        let f = fixture().await;

        for (count, expected) in [
            (0, "product_id must have exactly 1 variant : 0"),
            (2, "product_id must have exactly 1 variant : 2"),
        ] {
            let (product_id, _) = f
                .store
                .seed_product(ProductType::Single, "GELAS", f.category, f.packaging, f.unit, count)
                .await;
            let err = f
                .service
                .update_single_product_type(&actor(), &product_id.to_string(), single_request(&f))
                .await
                .unwrap_err();
            assert_eq!(business_message(err), expected);
            assert_eq!(f.store.product(product_id).await.unwrap().base_name, "GELAS");
        }
    }

    #[tokio::test]
    async fn test_update_single_product() {
        let f = fixture().await;
        let (product_id, variants) = f
            .store
            .seed_product(ProductType::Single, "GELAS", f.category, f.packaging, f.unit, 1)
            .await;

        f.service
            .update_single_product_type(&actor(), &product_id.to_string(), single_request(&f))
            .await
            .unwrap();

        let product = f.store.product(product_id).await.unwrap();
        assert_eq!(product.base_name, "GELAS PLASTIK");
        assert_eq!(product.updated_by.as_deref(), Some("user-1"));

        let stored = f.store.variants_of(product_id).await;
        assert_eq!(stored[0].variant.id, variants[0]);
        assert_eq!(stored[0].variant.full_name, "GELAS PLASTIK");
        assert_eq!(stored[0].variant.size_value, 12.0);
        assert_eq!(stored[0].variant.cost_price, Some(Decimal::new(900, 0)));
        assert_eq!(stored[0].variant.selling_price, Decimal::new(1500, 0));
    }

    #[tokio::test]
    async fn test_update_single_rejects_other_product_types() {
        let f = fixture().await;
        let (product_id, _) = f
            .store
            .seed_product(ProductType::Variant, "GELAS", f.category, f.packaging, f.unit, 1)
            .await;

        let err = f
            .service
            .update_single_product_type(&actor(), &product_id.to_string(), single_request(&f))
            .await
            .unwrap_err();

        assert_eq!(business_message(err), SINGLE_PRODUCT_TYPE_REQUIRED);
    }

    #[tokio::test]
    async fn test_update_single_validates_product_id_with_other_fields() {
        let f = fixture().await;
        let mut request = single_request(&f);
        request.size_value = 0.0;

        let err = f
            .service
            .update_single_product_type(&actor(), "not-a-uuid", request)
            .await
            .unwrap_err();

        assert_eq!(error_fields(err), vec!["product_id", "size_value"]);
    }

    fn variant_update(f: &Fixture, id: Uuid, name: Option<&str>) -> VariantInput {
        VariantInput {
            variant_id: id.to_string(),
            variant_name: name.map(str::to_string),
            ..variant(f, 3.0, 700)
        }
    }

    #[tokio::test]
    async fn test_update_variant_product() {
        let f = fixture().await;
        let (product_id, ids) = f
            .store
            .seed_product(ProductType::Variant, "SEDOTAN", f.category, f.packaging, f.unit, 2)
            .await;
        let request = UpdateVariantProductTypeRequest {
            base_name: "sedotan".to_string(),
            category_id: f.category.to_string(),
            variants: vec![
                variant_update(&f, ids[0], Some("besar")),
                variant_update(&f, ids[1], None),
            ],
        };

        f.service
            .update_variant_product_type(&actor(), &product_id.to_string(), request)
            .await
            .unwrap();

        let stored = f.store.variants_of(product_id).await;
        assert_eq!(stored[0].variant.full_name, "SEDOTAN BESAR");
        assert_eq!(stored[0].variant.variant_name.as_deref(), Some("BESAR"));
        assert_eq!(stored[1].variant.full_name, "SEDOTAN");
        assert_eq!(stored[1].variant.variant_name, None);
        assert!(stored.iter().all(|v| v.updated_by.as_deref() == Some("user-1")));
    }

    #[tokio::test]
    async fn test_update_variant_count_mismatch_writes_nothing() {
        let f = fixture().await;
        let (product_id, ids) = f
            .store
            .seed_product(ProductType::Variant, "SEDOTAN", f.category, f.packaging, f.unit, 2)
            .await;
        let request = UpdateVariantProductTypeRequest {
            base_name: "sedotan baru".to_string(),
            category_id: f.category.to_string(),
            variants: vec![variant_update(&f, ids[0], Some("besar"))],
        };

        let err = f
            .service
            .update_variant_product_type(&actor(), &product_id.to_string(), request)
            .await
            .unwrap_err();

        assert_eq!(business_message(err), MISMATCHED_VARIANT_PRODUCT);
        assert_eq!(f.store.product(product_id).await.unwrap().base_name, "SEDOTAN");
        assert!(
            f.store
                .variants_of(product_id)
                .await
                .iter()
                .all(|v| v.updated_by.is_none())
        );
    }

    #[tokio::test]
    async fn test_update_variant_rejects_unknown_variant() {
        let f = fixture().await;
        let (product_id, ids) = f
            .store
            .seed_product(ProductType::Repack, "SEDOTAN", f.category, f.packaging, f.unit, 2)
            .await;
        let stranger = Uuid::now_v7();
        let request = UpdateVariantProductTypeRequest {
            base_name: "sedotan".to_string(),
            category_id: f.category.to_string(),
            variants: vec![
                variant_update(&f, ids[0], None),
                variant_update(&f, stranger, None),
            ],
        };

        let err = f
            .service
            .update_variant_product_type(&actor(), &product_id.to_string(), request)
            .await
            .unwrap_err();

        assert_eq!(
            business_message(err),
            format!("product not identified : {}", stranger)
        );
    }

    #[tokio::test]
    async fn test_update_variant_rejects_single_products() {
        let f = fixture().await;
        let (product_id, ids) = f
            .store
            .seed_product(ProductType::Single, "SEDOTAN", f.category, f.packaging, f.unit, 1)
            .await;
        let request = UpdateVariantProductTypeRequest {
            base_name: "sedotan".to_string(),
            category_id: f.category.to_string(),
            variants: vec![variant_update(&f, ids[0], None)],
        };

        let err = f
            .service
            .update_variant_product_type(&actor(), &product_id.to_string(), request)
            .await
            .unwrap_err();

        assert_eq!(business_message(err), INVALID_PRODUCT_TYPE_VARIANT);
    }

    #[tokio::test]
    async fn test_update_single_reports_unbound_packaging_first_without_writes() {
        let f = fixture().await;
        let (product_id, _) = f
            .store
            .seed_product(ProductType::Single, "GELAS", f.category, f.packaging, f.unit, 1)
            .await;
        let foreign_packaging = f.store.add_packaging_type("BOX", "Box").await;
        let foreign_unit = f.store.add_size_unit("KG", "Kilogram", "WEIGHT").await;
        let mut request = single_request(&f);
        request.packaging_type_id = foreign_packaging.to_string();
        request.size_unit_id = foreign_unit.to_string();

        let err = f
            .service
            .update_single_product_type(&actor(), &product_id.to_string(), request)
            .await
            .unwrap_err();

        assert_eq!(business_message(err), PACKAGING_TYPE_RULE_NOT_FOUND);
        let product = f.store.product(product_id).await.unwrap();
        assert_eq!(product.base_name, "GELAS");
        assert!(product.updated_by.is_none());
        assert!(
            f.store
                .variants_of(product_id)
                .await
                .iter()
                .all(|v| v.updated_by.is_none())
        );
    }

    #[tokio::test]
    async fn test_update_variant_rejects_unbound_size_unit_without_writes() {
        let f = fixture().await;
        let (product_id, ids) = f
            .store
            .seed_product(ProductType::Variant, "SEDOTAN", f.category, f.packaging, f.unit, 2)
            .await;
        let foreign_unit = f.store.add_size_unit("KG", "Kilogram", "WEIGHT").await;
        let mut second = variant_update(&f, ids[1], Some("besar"));
        second.size_unit_id = foreign_unit.to_string();
        let request = UpdateVariantProductTypeRequest {
            base_name: "sedotan baru".to_string(),
            category_id: f.category.to_string(),
            variants: vec![variant_update(&f, ids[0], None), second],
        };

        let err = f
            .service
            .update_variant_product_type(&actor(), &product_id.to_string(), request)
            .await
            .unwrap_err();

        assert_eq!(business_message(err), SIZE_UNIT_RULE_NOT_FOUND);
        assert_eq!(f.store.product(product_id).await.unwrap().base_name, "SEDOTAN");
        assert!(
            f.store
                .variants_of(product_id)
                .await
                .iter()
                .all(|v| v.updated_by.is_none())
        );
    }

    #[tokio::test]
    async fn test_update_variant_is_atomic_when_a_variant_update_fails() {
        let f = fixture().await;
        let (product_id, ids) = f
            .store
            .seed_product(ProductType::Variant, "SEDOTAN", f.category, f.packaging, f.unit, 3)
            .await;
        f.store.fail_variant_update_at(2).await;
        let request = UpdateVariantProductTypeRequest {
            base_name: "sedotan baru".to_string(),
            category_id: f.category.to_string(),
            variants: ids.iter().map(|id| variant_update(&f, *id, None)).collect(),
        };

        let err = f
            .service
            .update_variant_product_type(&actor(), &product_id.to_string(), request)
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::Internal(_)));
        let product = f.store.product(product_id).await.unwrap();
        assert_eq!(product.base_name, "SEDOTAN");
        assert!(product.updated_by.is_none());
        assert!(
            f.store
                .variants_of(product_id)
                .await
                .iter()
                .all(|v| v.updated_by.is_none() && v.variant.full_name == "SEDOTAN")
        );
    }

    fn with_recipe(mut input: VariantInput, parent: Uuid) -> VariantInput {
        input.repack_recipe = Some(RepackRecipeInput {
            parent_variant_id: parent.to_string(),
            quantity_ratio: 1.0,
            repack_cost_per_unit: Some(Decimal::ONE),
            repack_time_minutes: 1,
        });
        input
    }

    #[tokio::test]
    async fn test_update_variant_rejects_recipe_on_variant_product() {
        let f = fixture().await;
        let (product_id, ids) = f
            .store
            .seed_product(ProductType::Variant, "SEDOTAN", f.category, f.packaging, f.unit, 1)
            .await;
        let request = UpdateVariantProductTypeRequest {
            base_name: "sedotan".to_string(),
            category_id: f.category.to_string(),
            variants: vec![with_recipe(variant_update(&f, ids[0], None), ids[0])],
        };

        let err = f
            .service
            .update_variant_product_type(&actor(), &product_id.to_string(), request)
            .await
            .unwrap_err();

        match err {
            ProductError::FieldValidation(fields) => assert_eq!(
                fields,
                vec![FieldValidation::new(
                    "repack_recipe",
                    "repack_recipe is not allowed for variant product"
                )]
            ),
            other => panic!("expected field validation error, got {:?}", other),
        }
        assert!(f.store.repack_recipes().await.is_empty());
        assert_eq!(f.store.product(product_id).await.unwrap().updated_by, None);
    }

    #[tokio::test]
    async fn test_update_variant_accepts_recipe_on_repack_product() {
        let f = fixture().await;
        let (_, parents) = f
            .store
            .seed_product(ProductType::Variant, "SEDOTAN", f.category, f.packaging, f.unit, 1)
            .await;
        let (product_id, ids) = f
            .store
            .seed_product(ProductType::Repack, "SEDOTAN ECER", f.category, f.packaging, f.unit, 1)
            .await;
        let request = UpdateVariantProductTypeRequest {
            base_name: "sedotan ecer".to_string(),
            category_id: f.category.to_string(),
            variants: vec![with_recipe(variant_update(&f, ids[0], None), parents[0])],
        };

        f.service
            .update_variant_product_type(&actor(), &product_id.to_string(), request)
            .await
            .unwrap();

        assert_eq!(
            f.store.product(product_id).await.unwrap().updated_by.as_deref(),
            Some("user-1")
        );
    }

    #[tokio::test]
    async fn test_list_rules_by_status() {
        let f = fixture().await;
        let inactive_unit = f.store.add_size_unit("MM", "Millimeter", "LENGTH").await;
        let rule = f.store.bind_size_unit(f.category, inactive_unit).await;
        f.store.set_rule_active(rule, false).await;

        let active = f
            .service
            .list_size_unit_rules(f.category, RuleStatus::Active)
            .await
            .unwrap();
        let inactive = f
            .service
            .list_size_unit_rules(f.category, RuleStatus::Inactive)
            .await
            .unwrap();
        let packaging = f
            .service
            .list_packaging_rules(f.category, RuleStatus::Active)
            .await
            .unwrap();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].size_unit_id, f.unit);
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].size_unit.size_unit_code, "MM");
        assert_eq!(packaging[0].packaging_type.packaging_code, "PCS");
    }
}
