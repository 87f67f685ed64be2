//! Cross-entity checks that run inside the unit of work.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::{
    PACKAGING_TYPE_RULE_NOT_FOUND, PARENT_VARIANT_NOT_FOUND, ProductError, ProductResult,
    SIZE_UNIT_RULE_NOT_FOUND,
};
use crate::repository::ProductUnitOfWork;
use crate::validation::UniqueIds;

/// Codes of the rule-bound types, keyed by their ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRuleCodes {
    pub category_code: String,
    pub size_unit_codes: HashMap<Uuid, String>,
    pub packaging_type_codes: HashMap<Uuid, String>,
}

/// Every requested size unit and packaging type must be bound to the
/// category by an active rule. Any gap fails the whole request.
pub(crate) async fn validate_category_rules(
    uow: &mut dyn ProductUnitOfWork,
    category_id: Uuid,
    size_unit_ids: &UniqueIds,
    packaging_type_ids: &UniqueIds,
) -> ProductResult<CategoryRuleCodes> {
    let (category_code, size_unit_codes) =
        check_size_unit_rules(uow, category_id, size_unit_ids).await?;
    let packaging_type_codes = check_packaging_rules(uow, category_id, packaging_type_ids).await?;

    Ok(CategoryRuleCodes {
        category_code,
        size_unit_codes,
        packaging_type_codes,
    })
}

/// [`validate_category_rules`] for the single-product update, which reports a
/// missing packaging rule ahead of a missing size-unit rule.
pub(crate) async fn validate_single_variant_rules(
    uow: &mut dyn ProductUnitOfWork,
    category_id: Uuid,
    size_unit_ids: &UniqueIds,
    packaging_type_ids: &UniqueIds,
) -> ProductResult<CategoryRuleCodes> {
    let packaging_type_codes = check_packaging_rules(uow, category_id, packaging_type_ids).await?;
    let (category_code, size_unit_codes) =
        check_size_unit_rules(uow, category_id, size_unit_ids).await?;

    Ok(CategoryRuleCodes {
        category_code,
        size_unit_codes,
        packaging_type_codes,
    })
}

async fn check_size_unit_rules(
    uow: &mut dyn ProductUnitOfWork,
    category_id: Uuid,
    size_unit_ids: &UniqueIds,
) -> ProductResult<(String, HashMap<Uuid, String>)> {
    let size_rules = uow
        .find_size_unit_rules(category_id, size_unit_ids.as_slice())
        .await?;

    let matched: HashSet<Uuid> = size_rules
        .iter()
        .filter(|r| size_unit_ids.as_slice().contains(&r.size_unit_id))
        .map(|r| r.size_unit_id)
        .collect();
    if matched.len() != size_unit_ids.len() {
        return Err(ProductError::BusinessRule(SIZE_UNIT_RULE_NOT_FOUND.to_string()));
    }

    let category_code = size_rules
        .first()
        .map(|r| r.category_code.clone())
        .unwrap_or_default();
    if size_rules.iter().any(|r| r.category_code != category_code) {
        tracing::warn!(%category_id, "Size unit rules disagree on category code");
        return Err(ProductError::BusinessRule(SIZE_UNIT_RULE_NOT_FOUND.to_string()));
    }

    let codes = size_rules
        .into_iter()
        .map(|r| (r.size_unit_id, r.size_unit_code))
        .collect();
    Ok((category_code, codes))
}

async fn check_packaging_rules(
    uow: &mut dyn ProductUnitOfWork,
    category_id: Uuid,
    packaging_type_ids: &UniqueIds,
) -> ProductResult<HashMap<Uuid, String>> {
    let packaging_rules = uow
        .find_packaging_rules(category_id, packaging_type_ids.as_slice())
        .await?;

    let matched: HashSet<Uuid> = packaging_rules
        .iter()
        .filter(|r| packaging_type_ids.as_slice().contains(&r.packaging_type_id))
        .map(|r| r.packaging_type_id)
        .collect();
    if matched.len() != packaging_type_ids.len() {
        return Err(ProductError::BusinessRule(
            PACKAGING_TYPE_RULE_NOT_FOUND.to_string(),
        ));
    }

    Ok(packaging_rules
        .into_iter()
        .map(|r| (r.packaging_type_id, r.packaging_type_code))
        .collect())
}

/// Every referenced parent variant must exist and be active.
/// A request without repack recipes skips the lookup.
pub(crate) async fn validate_parent_variants(
    uow: &mut dyn ProductUnitOfWork,
    parent_variant_ids: &UniqueIds,
) -> ProductResult<()> {
    if parent_variant_ids.is_empty() {
        return Ok(());
    }

    let found: HashSet<Uuid> = uow
        .find_active_variants_by_ids(parent_variant_ids.as_slice())
        .await?
        .into_iter()
        .collect();

    if found.len() != parent_variant_ids.len() {
        return Err(ProductError::BusinessRule(PARENT_VARIANT_NOT_FOUND.to_string()));
    }
    Ok(())
}
