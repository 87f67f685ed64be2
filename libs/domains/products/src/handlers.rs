use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use axum_helpers::{
    ActingUser, AppError, AuditEvent, AuditOutcome, UuidPath, ValidatedQuery,
    errors::responses::{
        BadRequestRuleResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    extract_ip_from_headers, extract_user_agent,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    CreatePackagingRuleRequest, CreateProductRequest, CreateSizeUnitRuleRequest, PackagingRule,
    PackagingRuleList, PackagingTypeSummary, ProductInput, RepackRecipeInput, RuleListQuery,
    SizeUnitRule, SizeUnitRuleList, SizeUnitSummary, UpdatePackagingRuleRequest,
    UpdateRuleStatusRequest, UpdateSingleProductTypeRequest, UpdateSizeUnitRuleRequest,
    UpdateVariantProductTypeRequest, VariantInput,
};
use crate::repository::ProductStore;
use crate::service::ProductService;
use crate::validation::FieldValidation;

const PRODUCTS_TAG: &str = "products";
const CATEGORY_RULES_TAG: &str = "category-rules";

/// OpenAPI documentation for the catalog API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_product,
        update_single_product_type,
        update_variant_product_type,
        list_size_unit_rules,
        create_size_unit_rule,
        update_size_unit_rule,
        update_size_unit_rule_status,
        list_packaging_rules,
        create_packaging_rule,
        update_packaging_rule,
        update_packaging_rule_status,
    ),
    components(
        schemas(
            CreateProductRequest,
            ProductInput,
            VariantInput,
            RepackRecipeInput,
            UpdateSingleProductTypeRequest,
            UpdateVariantProductTypeRequest,
            FieldValidation,
            SizeUnitRule,
            SizeUnitSummary,
            SizeUnitRuleList,
            PackagingRule,
            PackagingTypeSummary,
            PackagingRuleList,
            CreateSizeUnitRuleRequest,
            UpdateSizeUnitRuleRequest,
            CreatePackagingRuleRequest,
            UpdatePackagingRuleRequest,
            UpdateRuleStatusRequest,
        ),
        responses(
            BadRequestValidationResponse,
            BadRequestRuleResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = PRODUCTS_TAG, description = "Product creation and updates"),
        (name = CATEGORY_RULES_TAG, description = "Size-unit and packaging rules per category")
    )
)]
pub struct ApiDoc;

/// Create the catalog router. Mount it under the API version prefix.
pub fn router<S: ProductStore + 'static>(service: ProductService<S>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/products", post(create_product))
        .route("/products/{product_id}/single", put(update_single_product_type))
        .route(
            "/products/{product_id}/variants",
            put(update_variant_product_type),
        )
        .route(
            "/categories-rules/{category_id}/size-unit-rules",
            get(list_size_unit_rules).post(create_size_unit_rule),
        )
        .route(
            "/categories-rules/{category_id}/size-unit-rules/{rule_id}",
            put(update_size_unit_rule),
        )
        .route(
            "/categories-rules/size-unit-rules/{rule_id}/status",
            patch(update_size_unit_rule_status),
        )
        .route(
            "/categories-rules/{category_id}/packaging-rules",
            get(list_packaging_rules).post(create_packaging_rule),
        )
        .route(
            "/categories-rules/{category_id}/packaging-rules/{rule_id}",
            put(update_packaging_rule),
        )
        .route(
            "/categories-rules/packaging-rules/{rule_id}/status",
            patch(update_packaging_rule_status),
        )
        .with_state(shared_service)
}

/// Create a product with its variants and repack recipes
#[utoipa::path(
    post,
    path = "/products",
    tag = PRODUCTS_TAG,
    request_body = CreateProductRequest,
    params(
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 201, description = "Product created"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    actor: ActingUser,
    headers: HeaderMap,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let variant_count = input.variants.len();

    let product_id = service.create_product(&actor, input).await?;

    AuditEvent::new(
        Some(actor.id().to_string()),
        "product.create",
        Some(format!("product:{}", product_id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "variants": variant_count }))
    .log();

    Ok((StatusCode::CREATED, Json(json!({}))))
}

/// Update a SINGLE product and its only variant
#[utoipa::path(
    put,
    path = "/products/{product_id}/single",
    tag = PRODUCTS_TAG,
    request_body = UpdateSingleProductTypeRequest,
    params(
        ("product_id" = String, Path, description = "Product ID"),
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_single_product_type<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    actor: ActingUser,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    payload: Result<Json<UpdateSingleProductTypeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;

    service
        .update_single_product_type(&actor, &product_id, input)
        .await?;

    AuditEvent::new(
        Some(actor.id().to_string()),
        "product.update_single",
        Some(format!("product:{}", product_id.trim())),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok((StatusCode::OK, Json(json!({}))))
}

/// Update a VARIANT or REPACK product and all of its variants
#[utoipa::path(
    put,
    path = "/products/{product_id}/variants",
    tag = PRODUCTS_TAG,
    request_body = UpdateVariantProductTypeRequest,
    params(
        ("product_id" = String, Path, description = "Product ID"),
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_variant_product_type<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    actor: ActingUser,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    payload: Result<Json<UpdateVariantProductTypeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let variant_count = input.variants.len();

    service
        .update_variant_product_type(&actor, &product_id, input)
        .await?;

    AuditEvent::new(
        Some(actor.id().to_string()),
        "product.update_variant",
        Some(format!("product:{}", product_id.trim())),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "variants": variant_count }))
    .log();

    Ok((StatusCode::OK, Json(json!({}))))
}

/// List size-unit rules bound to a category
#[utoipa::path(
    get,
    path = "/categories-rules/{category_id}/size-unit-rules",
    tag = CATEGORY_RULES_TAG,
    params(
        ("category_id" = Uuid, Path, description = "Product category ID"),
        RuleListQuery
    ),
    responses(
        (status = 200, description = "Size-unit rules", body = SizeUnitRuleList),
        (status = 400, response = BadRequestUuidResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_size_unit_rules<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    UuidPath(category_id): UuidPath,
    ValidatedQuery(query): ValidatedQuery<RuleListQuery>,
) -> Result<Json<SizeUnitRuleList>, AppError> {
    let data = service
        .list_size_unit_rules(category_id, query.rule_status())
        .await?;
    Ok(Json(SizeUnitRuleList { data }))
}

/// List packaging rules bound to a category
#[utoipa::path(
    get,
    path = "/categories-rules/{category_id}/packaging-rules",
    tag = CATEGORY_RULES_TAG,
    params(
        ("category_id" = Uuid, Path, description = "Product category ID"),
        RuleListQuery
    ),
    responses(
        (status = 200, description = "Packaging rules", body = PackagingRuleList),
        (status = 400, response = BadRequestUuidResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_packaging_rules<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    UuidPath(category_id): UuidPath,
    ValidatedQuery(query): ValidatedQuery<RuleListQuery>,
) -> Result<Json<PackagingRuleList>, AppError> {
    let data = service
        .list_packaging_rules(category_id, query.rule_status())
        .await?;
    Ok(Json(PackagingRuleList { data }))
}

fn audit_rule_write(actor: &ActingUser, headers: &HeaderMap, action: &str, rule_id: &str) {
    AuditEvent::new(
        Some(actor.id().to_string()),
        action,
        Some(format!("rule:{}", rule_id.trim())),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(headers))
    .with_user_agent(extract_user_agent(headers))
    .log();
}

/// Bind a size unit to a category
#[utoipa::path(
    post,
    path = "/categories-rules/{category_id}/size-unit-rules",
    tag = CATEGORY_RULES_TAG,
    request_body = CreateSizeUnitRuleRequest,
    params(
        ("category_id" = String, Path, description = "Product category ID"),
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 201, description = "Rule created"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_size_unit_rule<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    actor: ActingUser,
    headers: HeaderMap,
    Path(category_id): Path<String>,
    payload: Result<Json<CreateSizeUnitRuleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;

    let rule_id = service
        .create_size_unit_rule(&actor, &category_id, input)
        .await?;
    audit_rule_write(&actor, &headers, "size_unit_rule.create", &rule_id.to_string());

    Ok((StatusCode::CREATED, Json(json!({}))))
}

/// Rebind an active size-unit rule
#[utoipa::path(
    put,
    path = "/categories-rules/{category_id}/size-unit-rules/{rule_id}",
    tag = CATEGORY_RULES_TAG,
    request_body = UpdateSizeUnitRuleRequest,
    params(
        ("category_id" = String, Path, description = "Product category ID"),
        ("rule_id" = String, Path, description = "Rule ID"),
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Rule updated"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_size_unit_rule<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    actor: ActingUser,
    headers: HeaderMap,
    Path((category_id, rule_id)): Path<(String, String)>,
    payload: Result<Json<UpdateSizeUnitRuleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;

    service
        .update_size_unit_rule(&actor, &category_id, &rule_id, input)
        .await?;
    audit_rule_write(&actor, &headers, "size_unit_rule.update", &rule_id);

    Ok((StatusCode::OK, Json(json!({}))))
}

/// Activate or deactivate a size-unit rule
#[utoipa::path(
    patch,
    path = "/categories-rules/size-unit-rules/{rule_id}/status",
    tag = CATEGORY_RULES_TAG,
    request_body = UpdateRuleStatusRequest,
    params(
        ("rule_id" = String, Path, description = "Rule ID"),
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Rule status changed"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_size_unit_rule_status<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    actor: ActingUser,
    headers: HeaderMap,
    Path(rule_id): Path<String>,
    payload: Result<Json<UpdateRuleStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;

    service
        .update_size_unit_rule_status(&actor, &rule_id, input)
        .await?;
    audit_rule_write(&actor, &headers, "size_unit_rule.status", &rule_id);

    Ok((StatusCode::OK, Json(json!({}))))
}

/// Bind a packaging type to a category
#[utoipa::path(
    post,
    path = "/categories-rules/{category_id}/packaging-rules",
    tag = CATEGORY_RULES_TAG,
    request_body = CreatePackagingRuleRequest,
    params(
        ("category_id" = String, Path, description = "Product category ID"),
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 201, description = "Rule created"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_packaging_rule<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    actor: ActingUser,
    headers: HeaderMap,
    Path(category_id): Path<String>,
    payload: Result<Json<CreatePackagingRuleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;

    let rule_id = service
        .create_packaging_rule(&actor, &category_id, input)
        .await?;
    audit_rule_write(&actor, &headers, "packaging_rule.create", &rule_id.to_string());

    Ok((StatusCode::CREATED, Json(json!({}))))
}

/// Rebind an active packaging rule
#[utoipa::path(
    put,
    path = "/categories-rules/{category_id}/packaging-rules/{rule_id}",
    tag = CATEGORY_RULES_TAG,
    request_body = UpdatePackagingRuleRequest,
    params(
        ("category_id" = String, Path, description = "Product category ID"),
        ("rule_id" = String, Path, description = "Rule ID"),
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Rule updated"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_packaging_rule<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    actor: ActingUser,
    headers: HeaderMap,
    Path((category_id, rule_id)): Path<(String, String)>,
    payload: Result<Json<UpdatePackagingRuleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;

    service
        .update_packaging_rule(&actor, &category_id, &rule_id, input)
        .await?;
    audit_rule_write(&actor, &headers, "packaging_rule.update", &rule_id);

    Ok((StatusCode::OK, Json(json!({}))))
}

/// Activate or deactivate a packaging rule
#[utoipa::path(
    patch,
    path = "/categories-rules/packaging-rules/{rule_id}/status",
    tag = CATEGORY_RULES_TAG,
    request_body = UpdateRuleStatusRequest,
    params(
        ("rule_id" = String, Path, description = "Rule ID"),
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Rule status changed"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_packaging_rule_status<S: ProductStore>(
    State(service): State<Arc<ProductService<S>>>,
    actor: ActingUser,
    headers: HeaderMap,
    Path(rule_id): Path<String>,
    payload: Result<Json<UpdateRuleStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;

    service
        .update_packaging_rule_status(&actor, &rule_id, input)
        .await?;
    audit_rule_write(&actor, &headers, "packaging_rule.status", &rule_id);

    Ok((StatusCode::OK, Json(json!({}))))
}
