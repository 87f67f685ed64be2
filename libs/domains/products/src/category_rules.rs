//! Category rule management: which size units and packaging types a category accepts.
//!
//! A rule binds one category to one size unit or packaging type. The pair is
//! unique whatever the rule's status, and only active rules can be rewritten.

use axum_helpers::ActingUser;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{
    CATEGORY_NOT_FOUND, ProductError, ProductResult, RULE_ALREADY_EXISTS, RULE_NOT_FOUND,
};
use crate::models::{
    CategoryRuleUpdate, CreatePackagingRuleRequest, CreateSizeUnitRuleRequest, NewCategoryRule,
    RuleTarget, UpdatePackagingRuleRequest, UpdateRuleStatusRequest, UpdateSizeUnitRuleRequest,
};
use crate::repository::{ProductStore, ProductUnitOfWork};
use crate::service::{ProductService, require_actor};
use crate::validation::{FIELD_PRODUCT_CATEGORY_ID, FIELD_RULE_ID, FieldErrors, validate_uuid};

/// Category and target must be active, and no other rule may bind the same pair
async fn ensure_rule_references(
    uow: &mut dyn ProductUnitOfWork,
    target: RuleTarget,
    category_id: Uuid,
    target_id: Uuid,
    rule_id: Option<Uuid>,
) -> ProductResult<()> {
    if !uow.category_is_active(category_id).await? {
        return Err(ProductError::NotFound(CATEGORY_NOT_FOUND.to_string()));
    }
    if !uow.rule_target_is_active(target, target_id).await? {
        return Err(ProductError::NotFound(target.not_found_message().to_string()));
    }

    let existing = uow.find_rule_id(target, category_id, target_id).await?;
    if existing.is_some() && existing != rule_id {
        return Err(ProductError::BusinessRule(RULE_ALREADY_EXISTS.to_string()));
    }
    Ok(())
}

impl<S: ProductStore> ProductService<S> {
    /// Bind a size unit to a category. Returns the new rule id.
    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn create_size_unit_rule(
        &self,
        actor: &ActingUser,
        category_id: &str,
        input: CreateSizeUnitRuleRequest,
    ) -> ProductResult<Uuid> {
        self.create_rule(
            actor,
            RuleTarget::SizeUnit,
            category_id,
            &input.size_unit_id,
            input.is_default.unwrap_or(false),
        )
        .await
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn update_size_unit_rule(
        &self,
        actor: &ActingUser,
        category_id: &str,
        rule_id: &str,
        input: UpdateSizeUnitRuleRequest,
    ) -> ProductResult<()> {
        self.update_rule(
            actor,
            RuleTarget::SizeUnit,
            category_id,
            rule_id,
            &input.size_unit_id,
            input.is_default,
        )
        .await
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn update_size_unit_rule_status(
        &self,
        actor: &ActingUser,
        rule_id: &str,
        input: UpdateRuleStatusRequest,
    ) -> ProductResult<()> {
        self.update_rule_status(actor, RuleTarget::SizeUnit, rule_id, input.status)
            .await
    }

    /// Bind a packaging type to a category. Returns the new rule id.
    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn create_packaging_rule(
        &self,
        actor: &ActingUser,
        category_id: &str,
        input: CreatePackagingRuleRequest,
    ) -> ProductResult<Uuid> {
        self.create_rule(
            actor,
            RuleTarget::PackagingType,
            category_id,
            &input.packaging_type_id,
            input.is_default.unwrap_or(false),
        )
        .await
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn update_packaging_rule(
        &self,
        actor: &ActingUser,
        category_id: &str,
        rule_id: &str,
        input: UpdatePackagingRuleRequest,
    ) -> ProductResult<()> {
        self.update_rule(
            actor,
            RuleTarget::PackagingType,
            category_id,
            rule_id,
            &input.packaging_type_id,
            input.is_default,
        )
        .await
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn update_packaging_rule_status(
        &self,
        actor: &ActingUser,
        rule_id: &str,
        input: UpdateRuleStatusRequest,
    ) -> ProductResult<()> {
        self.update_rule_status(actor, RuleTarget::PackagingType, rule_id, input.status)
            .await
    }

    async fn create_rule(
        &self,
        actor: &ActingUser,
        target: RuleTarget,
        category_id: &str,
        target_id: &str,
        is_default: bool,
    ) -> ProductResult<Uuid> {
        let actor_id = require_actor(actor)?;

        let mut errors = FieldErrors::default();
        let category_id =
            validate_uuid(&mut errors, FIELD_PRODUCT_CATEGORY_ID, category_id.trim());
        let target_id = validate_uuid(&mut errors, target.field(), target_id.trim());
        let (category_id, target_id) = errors.finish(category_id.zip(target_id))?;

        let mut uow = self.store.begin().await?;
        ensure_rule_references(uow.as_mut(), target, category_id, target_id, None).await?;

        let rule_id = Uuid::now_v7();
        uow.insert_rule(
            target,
            NewCategoryRule {
                rule_id,
                category_id,
                target_id,
                is_default,
                created_by: actor_id,
            },
        )
        .await?;
        uow.commit().await?;

        tracing::info!(%rule_id, %category_id, %target, "Created category rule");
        Ok(rule_id)
    }

    async fn update_rule(
        &self,
        actor: &ActingUser,
        target: RuleTarget,
        category_id: &str,
        rule_id: &str,
        target_id: &str,
        is_default: bool,
    ) -> ProductResult<()> {
        let actor_id = require_actor(actor)?;

        let mut errors = FieldErrors::default();
        let category_id =
            validate_uuid(&mut errors, FIELD_PRODUCT_CATEGORY_ID, category_id.trim());
        let rule_id = validate_uuid(&mut errors, FIELD_RULE_ID, rule_id.trim());
        let target_id = validate_uuid(&mut errors, target.field(), target_id.trim());
        let (category_id, rule_id, target_id) = errors.finish(
            category_id
                .zip(rule_id)
                .zip(target_id)
                .map(|((category, rule), target)| (category, rule, target)),
        )?;

        let mut uow = self.store.begin().await?;
        ensure_rule_references(uow.as_mut(), target, category_id, target_id, Some(rule_id))
            .await?;

        let updated = uow
            .update_rule(
                target,
                CategoryRuleUpdate {
                    rule_id,
                    category_id,
                    target_id,
                    is_default,
                    updated_by: actor_id,
                },
            )
            .await?;
        if !updated {
            return Err(ProductError::NotFound(RULE_NOT_FOUND.to_string()));
        }
        uow.commit().await?;

        tracing::info!(%rule_id, %category_id, %target, "Updated category rule");
        Ok(())
    }

    async fn update_rule_status(
        &self,
        actor: &ActingUser,
        target: RuleTarget,
        rule_id: &str,
        is_active: bool,
    ) -> ProductResult<()> {
        let actor_id = require_actor(actor)?;

        let mut errors = FieldErrors::default();
        let rule_id = validate_uuid(&mut errors, FIELD_RULE_ID, rule_id.trim());
        let rule_id = errors.finish(rule_id)?;

        let mut uow = self.store.begin().await?;
        if !uow
            .update_rule_status(target, rule_id, is_active, actor_id)
            .await?
        {
            return Err(ProductError::NotFound(RULE_NOT_FOUND.to_string()));
        }
        uow.commit().await?;

        tracing::info!(%rule_id, %target, is_active, "Changed category rule status");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleStatus;
    use crate::repository::{InMemoryProductStore, MockProductStore};

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

        Fixture {
            service: ProductService::new(store.clone()),
            store,
            category,
            unit,
            packaging,
        }
    }

    fn actor() -> ActingUser {
        ActingUser("admin".to_string())
    }

    fn size_rule(unit: Uuid, is_default: Option<bool>) -> CreateSizeUnitRuleRequest {
        CreateSizeUnitRuleRequest {
            size_unit_id: unit.to_string(),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_create_size_unit_rule() {
        let f = fixture().await;

        let rule_id = f
            .service
            .create_size_unit_rule(&actor(), &f.category.to_string(), size_rule(f.unit, None))
            .await
            .unwrap();

        let rules = f
            .store
            .list_size_unit_rules(f.category, RuleStatus::Active)
            .await
            .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_id, rule_id);
        assert_eq!(rules[0].size_unit_id, f.unit);
        assert!(!rules[0].is_default);
    }

    #[tokio::test]
    async fn test_create_rule_rejects_duplicate_pair_even_when_inactive() {
        let f = fixture().await;
        let existing = f.store.bind_size_unit(f.category, f.unit).await;
        f.store.set_rule_active(existing, false).await;

        let err = f
            .service
            .create_size_unit_rule(&actor(), &f.category.to_string(), size_rule(f.unit, Some(true)))
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::BusinessRule(ref m) if m == RULE_ALREADY_EXISTS));
    }

    #[tokio::test]
    async fn test_create_rule_requires_active_references() {
        let f = fixture().await;
        f.store.set_category_active(f.category, false).await;

        let err = f
            .service
            .create_packaging_rule(
                &actor(),
                &f.category.to_string(),
                CreatePackagingRuleRequest {
                    packaging_type_id: f.packaging.to_string(),
                    is_default: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::NotFound(ref m) if m == CATEGORY_NOT_FOUND));

        let other = f.store.add_category("GLASS").await;
        let err = f
            .service
            .create_packaging_rule(
                &actor(),
                &other.to_string(),
                CreatePackagingRuleRequest {
                    packaging_type_id: Uuid::now_v7().to_string(),
                    is_default: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::NotFound(ref m) if m == "packaging type not found"));
        assert!(
            f.store
                .list_packaging_rules(other, RuleStatus::Active)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_rule_field_errors_are_collected_before_opening_a_transaction() {
        let mut store = MockProductStore::new();
        store.expect_begin().never();
        let service = ProductService::new(store);

        let err = service
            .update_packaging_rule(
                &actor(),
                "abc",
                " ",
                UpdatePackagingRuleRequest {
                    packaging_type_id: "xyz".to_string(),
                    is_default: true,
                },
            )
            .await
            .unwrap_err();

        let fields: Vec<String> = match err {
            ProductError::FieldValidation(fields) => fields.into_iter().map(|f| f.field).collect(),
            other => panic!("expected field validation error, got {:?}", other),
        };
        assert_eq!(fields, vec!["product_category_id", "rule_id", "packaging_type_id"]);
    }

    #[tokio::test]
    async fn test_update_rule_rebinds_target() {
        let f = fixture().await;
        let rule_id = f.store.bind_size_unit(f.category, f.unit).await;
        let meter = f.store.add_size_unit("M", "Meter", "LENGTH").await;

        f.service
            .update_size_unit_rule(
                &actor(),
                &f.category.to_string(),
                &rule_id.to_string(),
                UpdateSizeUnitRuleRequest {
                    size_unit_id: meter.to_string(),
                    is_default: true,
                },
            )
            .await
            .unwrap();

        let rules = f
            .store
            .list_size_unit_rules(f.category, RuleStatus::Active)
            .await
            .unwrap();
        assert_eq!(rules[0].rule_id, rule_id);
        assert_eq!(rules[0].size_unit.size_unit_code, "M");
        assert!(rules[0].is_default);
    }

    #[tokio::test]
    async fn test_update_rule_keeping_its_own_target_is_allowed() {
        let f = fixture().await;
        let rule_id = f.store.bind_packaging_type(f.category, f.packaging).await;

        f.service
            .update_packaging_rule(
                &actor(),
                &f.category.to_string(),
                &rule_id.to_string(),
                UpdatePackagingRuleRequest {
                    packaging_type_id: f.packaging.to_string(),
                    is_default: true,
                },
            )
            .await
            .unwrap();

        let rules = f
            .store
            .list_packaging_rules(f.category, RuleStatus::Active)
            .await
            .unwrap();
        assert!(rules[0].is_default);
    }

    #[tokio::test]
    async fn test_update_rule_conflicts_with_another_rule() {
        let f = fixture().await;
        let meter = f.store.add_size_unit("M", "Meter", "LENGTH").await;
        let rule_id = f.store.bind_size_unit(f.category, f.unit).await;
        f.store.bind_size_unit(f.category, meter).await;

        let err = f
            .service
            .update_size_unit_rule(
                &actor(),
                &f.category.to_string(),
                &rule_id.to_string(),
                UpdateSizeUnitRuleRequest {
                    size_unit_id: meter.to_string(),
                    is_default: false,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::BusinessRule(ref m) if m == RULE_ALREADY_EXISTS));
    }

    #[tokio::test]
    async fn test_update_inactive_rule_is_not_found() {
        let f = fixture().await;
        let rule_id = f.store.bind_size_unit(f.category, f.unit).await;
        f.store.set_rule_active(rule_id, false).await;

        let err = f
            .service
            .update_size_unit_rule(
                &actor(),
                &f.category.to_string(),
                &rule_id.to_string(),
                UpdateSizeUnitRuleRequest {
                    size_unit_id: f.unit.to_string(),
                    is_default: true,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::NotFound(ref m) if m == RULE_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_update_rule_status() {
        let f = fixture().await;
        let rule_id = f.store.bind_packaging_type(f.category, f.packaging).await;

        f.service
            .update_packaging_rule_status(
                &actor(),
                &rule_id.to_string(),
                UpdateRuleStatusRequest { status: false },
            )
            .await
            .unwrap();

        let inactive = f
            .store
            .list_packaging_rules(f.category, RuleStatus::Inactive)
            .await
            .unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].rule_id, rule_id);

        let err = f
            .service
            .update_size_unit_rule_status(
                &actor(),
                &rule_id.to_string(),
                UpdateRuleStatusRequest { status: true },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::NotFound(ref m) if m == RULE_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_rule_writes_require_actor() {
        let f = fixture().await;

        let err = f
            .service
            .create_size_unit_rule(
                &ActingUser(" ".to_string()),
                &f.category.to_string(),
                size_rule(f.unit, None),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::MissingActor));
    }
}
