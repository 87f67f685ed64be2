use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const MAX_LENGTH_PRODUCT_BASE_NAME: usize = 100;
pub const MAX_LENGTH_PRODUCT_VARIANT_NAME: usize = 50;

/// Product type stored on the `products` row
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ProductType {
    /// Exactly one variant, never a repack recipe
    Single,
    /// Several variants, no repack recipes
    Variant,
    /// Every variant is produced from a parent variant
    Repack,
}

impl ProductType {
    /// Types accepted by the create endpoint
    pub const CREATABLE: [ProductType; 2] = [ProductType::Repack, ProductType::Variant];

    /// Whether a variant of this product type must carry a repack recipe
    pub fn requires_repack_recipe(self) -> bool {
        matches!(self, ProductType::Repack)
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Product-level fields of a create request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProductInput {
    #[schema(example = "kantong plastik")]
    pub base_name: String,
    #[schema(example = "0199a3c4-5d6e-7f80-9123-456789abcdef")]
    pub category_id: String,
    /// One of `VARIANT` or `REPACK`
    #[schema(example = "VARIANT")]
    pub product_type: String,
}

/// Repack recipe attached to a variant
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RepackRecipeInput {
    pub parent_variant_id: String,
    pub quantity_ratio: f64,
    #[schema(value_type = Option<String>, example = "150.00")]
    pub repack_cost_per_unit: Option<Decimal>,
    pub repack_time_minutes: i32,
}

/// One variant of a create or variant-update request.
///
/// `variant_id` is only read by the variant-update path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct VariantInput {
    pub variant_id: String,
    #[schema(example = "besar")]
    pub variant_name: Option<String>,
    pub packaging_type_id: String,
    #[schema(example = 10.0)]
    pub size_value: f64,
    pub size_unit_id: String,
    #[schema(value_type = Option<String>, example = "4000")]
    pub cost_price: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "5000")]
    pub sell_price: Option<Decimal>,
    pub repack_recipe: Option<RepackRecipeInput>,
}

/// Body of `POST /products`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateProductRequest {
    pub product: ProductInput,
    pub variants: Vec<VariantInput>,
}

/// Body of `PUT /products/{product_id}/single`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateSingleProductTypeRequest {
    pub base_name: String,
    pub category_id: String,
    pub packaging_type_id: String,
    pub size_value: f64,
    pub size_unit_id: String,
    #[schema(value_type = Option<String>)]
    pub cost_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub sell_price: Option<Decimal>,
}

/// Body of `PUT /products/{product_id}/variants`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateVariantProductTypeRequest {
    pub base_name: String,
    pub category_id: String,
    pub variants: Vec<VariantInput>,
}

// ---------------------------------------------------------------------------
// Persistence payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub id: Uuid,
    pub base_name: String,
    pub category_id: Uuid,
    pub product_type: ProductType,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub full_name: String,
    pub packaging_type_id: Uuid,
    pub size_value: f64,
    pub size_unit_id: Uuid,
    pub cost_price: Option<Decimal>,
    pub selling_price: Decimal,
    pub is_active: bool,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRepackRecipe {
    pub id: Uuid,
    pub parent_variant_id: Uuid,
    pub child_variant_id: Uuid,
    pub quantity_ratio: f64,
    pub repack_cost_per_unit: Decimal,
    pub repack_time_minutes: i32,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub id: Uuid,
    pub base_name: String,
    pub category_id: Uuid,
    pub updated_by: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantUpdate {
    pub id: Uuid,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub full_name: String,
    pub packaging_type_id: Uuid,
    pub size_value: f64,
    pub size_unit_id: Uuid,
    pub cost_price: Option<Decimal>,
    pub selling_price: Decimal,
    pub updated_by: String,
}

// ---------------------------------------------------------------------------
// Lookup rows
// ---------------------------------------------------------------------------

/// Active size-unit binding for a category
#[derive(Debug, Clone, PartialEq)]
pub struct SizeUnitRuleMatch {
    pub category_id: Uuid,
    pub size_unit_id: Uuid,
    pub size_unit_code: String,
    pub category_code: String,
}

/// Active packaging-type binding for a category
#[derive(Debug, Clone, PartialEq)]
pub struct PackagingRuleMatch {
    pub category_id: Uuid,
    pub packaging_type_id: Uuid,
    pub packaging_type_code: String,
}

/// Active variant of a product, joined with the owning product's type
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_type: ProductType,
}

// ---------------------------------------------------------------------------
// Rule listings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SizeUnitSummary {
    pub size_unit_id: Uuid,
    pub size_unit_code: String,
    pub size_unit_name: String,
    pub size_unit_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SizeUnitRule {
    pub rule_id: Uuid,
    pub product_category_id: Uuid,
    pub size_unit_id: Uuid,
    pub size_unit: SizeUnitSummary,
    pub is_default: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PackagingTypeSummary {
    pub packaging_code: String,
    pub packaging_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PackagingRule {
    pub rule_id: Uuid,
    pub product_category_id: Uuid,
    pub packaging_type_id: Uuid,
    pub packaging_type: PackagingTypeSummary,
    pub is_default: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SizeUnitRuleList {
    pub data: Vec<SizeUnitRule>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PackagingRuleList {
    pub data: Vec<PackagingRule>,
}

/// Which side of the `is_active` flag a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RuleStatus {
    #[default]
    Active,
    Inactive,
}

impl RuleStatus {
    pub fn is_active(self) -> bool {
        matches!(self, RuleStatus::Active)
    }

    /// `TRUE` and a missing/blank status select active rules, `FALSE` inactive ones.
    pub fn from_query(status: Option<&str>) -> Option<Self> {
        match status.map(str::trim).unwrap_or_default() {
            "" | "TRUE" => Some(RuleStatus::Active),
            "FALSE" => Some(RuleStatus::Inactive),
            _ => None,
        }
    }
}

fn validate_rule_status(status: &str) -> Result<(), ValidationError> {
    if RuleStatus::from_query(Some(status)).is_none() {
        return Err(ValidationError::new("allowed_words")
            .with_message(Cow::from("string must contain only allowed words")));
    }
    Ok(())
}

/// Query string of the rule listing endpoints
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RuleListQuery {
    /// `TRUE` (default) for active rules, `FALSE` for inactive ones
    #[validate(custom(function = "validate_rule_status"))]
    #[param(example = "TRUE")]
    pub status: Option<String>,
}

impl RuleListQuery {
    pub fn rule_status(&self) -> RuleStatus {
        RuleStatus::from_query(self.status.as_deref()).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Rule management
// ---------------------------------------------------------------------------

/// Lookup type a category rule binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RuleTarget {
    SizeUnit,
    PackagingType,
}

impl RuleTarget {
    /// Request field carrying the bound id
    pub fn field(self) -> &'static str {
        match self {
            RuleTarget::SizeUnit => "size_unit_id",
            RuleTarget::PackagingType => "packaging_type_id",
        }
    }

    pub fn not_found_message(self) -> &'static str {
        match self {
            RuleTarget::SizeUnit => "size unit not found",
            RuleTarget::PackagingType => "packaging type not found",
        }
    }
}

/// Body of `POST /categories-rules/{category_id}/size-unit-rules`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateSizeUnitRuleRequest {
    pub size_unit_id: String,
    /// Defaults to `false`
    pub is_default: Option<bool>,
}

/// Body of `PUT /categories-rules/{category_id}/size-unit-rules/{rule_id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateSizeUnitRuleRequest {
    pub size_unit_id: String,
    pub is_default: bool,
}

/// Body of `POST /categories-rules/{category_id}/packaging-rules`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreatePackagingRuleRequest {
    pub packaging_type_id: String,
    /// Defaults to `false`
    pub is_default: Option<bool>,
}

/// Body of `PUT /categories-rules/{category_id}/packaging-rules/{rule_id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdatePackagingRuleRequest {
    pub packaging_type_id: String,
    pub is_default: bool,
}

/// Body of the `PATCH .../{rule_id}/status` endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateRuleStatusRequest {
    /// New value of the rule's `is_active` flag
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategoryRule {
    pub rule_id: Uuid,
    pub category_id: Uuid,
    pub target_id: Uuid,
    pub is_default: bool,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRuleUpdate {
    pub rule_id: Uuid,
    pub category_id: Uuid,
    pub target_id: Uuid,
    pub is_default: bool,
    pub updated_by: String,
}
