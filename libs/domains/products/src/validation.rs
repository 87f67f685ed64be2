//! Input sanitation and field-level validation.
//!
//! Every check runs and every failure is collected; callers turn the
//! accumulated list into a single [`ProductError::FieldValidation`].

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProductRequest, MAX_LENGTH_PRODUCT_BASE_NAME, MAX_LENGTH_PRODUCT_VARIANT_NAME,
    ProductType, RepackRecipeInput, UpdateSingleProductTypeRequest,
    UpdateVariantProductTypeRequest, VariantInput,
};

pub const FIELD_PRODUCT_ID: &str = "product_id";
pub const FIELD_BASE_NAME: &str = "base_name";
pub const FIELD_CATEGORY_ID: &str = "category_id";
pub const FIELD_PRODUCT_TYPE: &str = "product_type";
pub const FIELD_VARIANTS: &str = "variants";
pub const FIELD_VARIANT_NAME: &str = "variant_name";
pub const FIELD_PACKAGING_TYPE_ID: &str = "packaging_type_id";
pub const FIELD_SIZE_VALUE: &str = "size_value";
pub const FIELD_SIZE_UNIT_ID: &str = "size_unit_id";
pub const FIELD_COST_PRICE: &str = "cost_price";
pub const FIELD_SELL_PRICE: &str = "sell_price";
pub const FIELD_REPACK_RECIPE: &str = "repack_recipe";
pub const FIELD_PARENT_VARIANT_ID: &str = "parent_variant_id";
pub const FIELD_QUANTITY_RATIO: &str = "quantity_ratio";
pub const FIELD_REPACK_COST_PER_UNIT: &str = "repack_cost_per_unit";
pub const FIELD_REPACK_TIME_MINUTES: &str = "repack_time_minutes";
pub const FIELD_PRODUCT_CATEGORY_ID: &str = "product_category_id";
pub const FIELD_RULE_ID: &str = "rule_id";

const MSG_INVALID_UUID: &str = "invalid uuid format";
const MSG_ALLOWED_WORDS: &str = "string must contain only allowed words";
pub(crate) const MSG_RECIPE_NOT_ALLOWED: &str = "repack_recipe is not allowed for variant product";

/// A single failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldValidation {
    pub field: String,
    pub message: String,
}

impl FieldValidation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Ordered accumulator of field failures
#[derive(Debug, Default)]
pub(crate) struct FieldErrors(Vec<FieldValidation>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldValidation::new(field, message));
    }

    pub fn required(&mut self, field: &str) {
        self.push(field, format!("{} is required", field));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `value` when nothing failed, otherwise every collected failure.
    ///
    /// `value` is `None` only when some check failed, so the fallback error is
    /// never reached with an empty list.
    pub fn finish<T>(self, value: Option<T>) -> ProductResult<T> {
        match value {
            Some(value) if self.0.is_empty() => Ok(value),
            _ => Err(ProductError::FieldValidation(self.0)),
        }
    }
}

/// Trims (and where applicable normalises) every string of a request in place
pub trait Sanitize {
    fn sanitize(&mut self);
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn trim_optional(value: &mut Option<String>) {
    if let Some(inner) = value.as_mut() {
        trim_in_place(inner);
        if inner.is_empty() {
            *value = None;
        }
    }
}

impl Sanitize for RepackRecipeInput {
    fn sanitize(&mut self) {
        trim_in_place(&mut self.parent_variant_id);
    }
}

impl Sanitize for VariantInput {
    fn sanitize(&mut self) {
        trim_in_place(&mut self.variant_id);
        trim_optional(&mut self.variant_name);
        trim_in_place(&mut self.packaging_type_id);
        trim_in_place(&mut self.size_unit_id);
        if let Some(recipe) = self.repack_recipe.as_mut() {
            recipe.sanitize();
        }
    }
}

impl Sanitize for CreateProductRequest {
    fn sanitize(&mut self) {
        trim_in_place(&mut self.product.base_name);
        self.product.base_name = self.product.base_name.to_uppercase();
        trim_in_place(&mut self.product.category_id);
        trim_in_place(&mut self.product.product_type);
        self.variants.iter_mut().for_each(Sanitize::sanitize);
    }
}

impl Sanitize for UpdateSingleProductTypeRequest {
    fn sanitize(&mut self) {
        trim_in_place(&mut self.base_name);
        self.base_name = self.base_name.to_uppercase();
        trim_in_place(&mut self.category_id);
        trim_in_place(&mut self.packaging_type_id);
        trim_in_place(&mut self.size_unit_id);
    }
}

impl Sanitize for UpdateVariantProductTypeRequest {
    fn sanitize(&mut self) {
        trim_in_place(&mut self.base_name);
        self.base_name = self.base_name.to_uppercase();
        trim_in_place(&mut self.category_id);
        self.variants.iter_mut().for_each(Sanitize::sanitize);
    }
}

/// Unique ids in order of first occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueIds(Vec<Uuid>);

impl UniqueIds {
    pub fn insert(&mut self, id: Uuid) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    pub fn as_slice(&self) -> &[Uuid] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Cross-references collected while validating variants
#[derive(Debug, Clone, Default)]
pub struct ReferencedIds {
    pub size_unit_ids: UniqueIds,
    pub packaging_type_ids: UniqueIds,
    pub parent_variant_ids: UniqueIds,
}

impl ReferencedIds {
    pub(crate) fn record(&mut self, variant: &ValidVariant) {
        self.size_unit_ids.insert(variant.size_unit_id);
        self.packaging_type_ids.insert(variant.packaging_type_id);
        if let Some(recipe) = &variant.repack_recipe {
            self.parent_variant_ids.insert(recipe.parent_variant_id);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidRepackRecipe {
    pub parent_variant_id: Uuid,
    pub quantity_ratio: f64,
    pub repack_cost_per_unit: Decimal,
    pub repack_time_minutes: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidVariant {
    pub variant_id: String,
    pub variant_name: Option<String>,
    pub packaging_type_id: Uuid,
    pub size_value: f64,
    pub size_unit_id: Uuid,
    pub cost_price: Option<Decimal>,
    pub selling_price: Decimal,
    pub repack_recipe: Option<ValidRepackRecipe>,
}

/// Whether the owning product type demands or forbids repack recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecipePolicy {
    Required,
    Forbidden,
    /// The product type failed validation or has not been loaded yet
    Unknown,
}

impl RecipePolicy {
    pub fn for_type(product_type: Option<ProductType>) -> Self {
        match product_type {
            Some(kind) if kind.requires_repack_recipe() => RecipePolicy::Required,
            Some(_) => RecipePolicy::Forbidden,
            None => RecipePolicy::Unknown,
        }
    }
}

/// `value` is already trimmed. Reports a required or format failure on `field`.
pub(crate) fn validate_uuid(errors: &mut FieldErrors, field: &str, value: &str) -> Option<Uuid> {
    if value.is_empty() {
        errors.required(field);
        return None;
    }
    parse_uuid(errors, field, value)
}

fn parse_uuid(errors: &mut FieldErrors, field: &str, value: &str) -> Option<Uuid> {
    match Uuid::parse_str(value) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(field, MSG_INVALID_UUID);
            None
        }
    }
}

fn is_positive(value: f64) -> bool {
    value > 0.0
}

fn validate_max_length(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max: usize,
) -> bool {
    if value.chars().count() > max {
        errors.push(field, format!("string length must be less than {}", max));
        return false;
    }
    true
}

pub(crate) fn validate_base_name(errors: &mut FieldErrors, base_name: &str) -> Option<String> {
    if base_name.is_empty() {
        errors.required(FIELD_BASE_NAME);
        return None;
    }
    if !validate_max_length(errors, FIELD_BASE_NAME, base_name, MAX_LENGTH_PRODUCT_BASE_NAME) {
        return None;
    }
    Some(base_name.to_uppercase())
}

pub(crate) fn validate_product_type(
    errors: &mut FieldErrors,
    product_type: &str,
    allowed: &[ProductType],
) -> Option<ProductType> {
    if product_type.is_empty() {
        errors.required(FIELD_PRODUCT_TYPE);
        return None;
    }
    match product_type.parse::<ProductType>() {
        Ok(parsed) if allowed.contains(&parsed) => Some(parsed),
        _ => {
            errors.push(FIELD_PRODUCT_TYPE, MSG_ALLOWED_WORDS);
            None
        }
    }
}

pub(crate) fn validate_variants_present(errors: &mut FieldErrors, count: usize) {
    if count == 0 {
        errors.push(FIELD_VARIANTS, "variants must contain at least 1 item");
    }
}

/// Validates one variant. Every failing check is recorded before returning.
pub(crate) fn validate_variant(
    errors: &mut FieldErrors,
    variant: &VariantInput,
    policy: RecipePolicy,
) -> Option<ValidVariant> {
    let before = errors.0.len();

    if variant.cost_price.is_some_and(|cost| cost.is_sign_negative()) {
        errors.push(FIELD_COST_PRICE, "cost_price must be greater than or equal to 0");
    }
    if variant.sell_price.is_none() {
        errors.required(FIELD_SELL_PRICE);
    }
    if variant.packaging_type_id.is_empty() {
        errors.required(FIELD_PACKAGING_TYPE_ID);
    }
    if variant.size_unit_id.is_empty() {
        errors.required(FIELD_SIZE_UNIT_ID);
    }
    if !is_positive(variant.size_value) {
        errors.push(FIELD_SIZE_VALUE, "size_value must be greater than 0");
    }
    if let (Some(cost), Some(sell)) = (variant.cost_price, variant.sell_price) {
        if cost > sell {
            errors.push(FIELD_COST_PRICE, "cost_price must be less than sell_price");
        }
    }

    let packaging_type_id = if variant.packaging_type_id.is_empty() {
        None
    } else {
        parse_uuid(errors, FIELD_PACKAGING_TYPE_ID, &variant.packaging_type_id)
    };
    let size_unit_id = if variant.size_unit_id.is_empty() {
        None
    } else {
        parse_uuid(errors, FIELD_SIZE_UNIT_ID, &variant.size_unit_id)
    };

    if let Some(name) = &variant.variant_name {
        validate_max_length(errors, FIELD_VARIANT_NAME, name, MAX_LENGTH_PRODUCT_VARIANT_NAME);
    }

    let repack_recipe = match (policy, &variant.repack_recipe) {
        (RecipePolicy::Required, None) => {
            errors.push(FIELD_REPACK_RECIPE, "repack_recipe is required for repack product");
            None
        }
        (RecipePolicy::Forbidden, Some(_)) => {
            errors.push(FIELD_REPACK_RECIPE, MSG_RECIPE_NOT_ALLOWED);
            None
        }
        (RecipePolicy::Required | RecipePolicy::Unknown, Some(recipe)) => {
            validate_repack_recipe(errors, recipe)
        }
        (_, None) => None,
    };

    if errors.0.len() != before {
        return None;
    }

    Some(ValidVariant {
        variant_id: variant.variant_id.clone(),
        variant_name: variant.variant_name.as_ref().map(|name| name.to_uppercase()),
        packaging_type_id: packaging_type_id?,
        size_value: variant.size_value,
        size_unit_id: size_unit_id?,
        cost_price: variant.cost_price,
        selling_price: variant.sell_price?,
        repack_recipe,
    })
}

fn validate_repack_recipe(
    errors: &mut FieldErrors,
    recipe: &RepackRecipeInput,
) -> Option<ValidRepackRecipe> {
    let parent_variant_id = validate_uuid(errors, FIELD_PARENT_VARIANT_ID, &recipe.parent_variant_id);

    if !is_positive(recipe.quantity_ratio) {
        errors.push(FIELD_QUANTITY_RATIO, "quantity_ratio must be greater than 0");
    }
    if recipe.repack_cost_per_unit.is_none() {
        errors.required(FIELD_REPACK_COST_PER_UNIT);
    }
    if recipe.repack_time_minutes <= 0 {
        errors.push(
            FIELD_REPACK_TIME_MINUTES,
            "repack_time_minutes must be greater than 0",
        );
    }

    if !is_positive(recipe.quantity_ratio) || recipe.repack_time_minutes <= 0 {
        return None;
    }

    Some(ValidRepackRecipe {
        parent_variant_id: parent_variant_id?,
        quantity_ratio: recipe.quantity_ratio,
        repack_cost_per_unit: recipe.repack_cost_per_unit?,
        repack_time_minutes: recipe.repack_time_minutes,
    })
}

/// Full display name: base name, then the variant name when there is one.
pub fn full_name(base_name: &str, variant_name: Option<&str>) -> String {
    let base = base_name.trim().to_uppercase();
    match variant_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("{} {}", base, name.to_uppercase()),
        None => base,
    }
}
