//! Coupon handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::AdminUser;
use crate::core::ServerState;
use crate::db::models::{Coupon, DiscountType};
use crate::pricing::{self, PricingError};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, now_millis, ok};

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
    pub subtotal: f64,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub code: String,
    pub discount: f64,
    pub free_shipping: bool,
}

/// Validate a coupon against a cart subtotal (storefront preview)
///
/// Pure preview: nothing is reserved and `used_count` is untouched.
/// Checkout re-validates against the live coupon.
pub async fn validate(
    State(state): State<ServerState>,
    Json(payload): Json<ValidateRequest>,
) -> AppResult<Json<AppResponse<ValidateResponse>>> {
    let code = pricing::normalize_code(&payload.code);
    let coupon = state
        .store
        .get_coupon(&code)
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or(PricingError::CouponNotFound(code))?;

    let result = pricing::evaluate_coupon(&coupon, payload.subtotal, now_millis())?;
    Ok(ok(ValidateResponse {
        code: coupon.code,
        discount: result.discount,
        free_shipping: result.free_shipping,
    }))
}

/// List all coupons (admin)
pub async fn admin_list(
    State(state): State<ServerState>,
    _admin: AdminUser,
) -> AppResult<Json<AppResponse<Vec<Coupon>>>> {
    let coupons = state
        .store
        .list_coupons()
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(ok(coupons))
}

#[derive(Debug, Deserialize)]
pub struct CouponPayload {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(default)]
    pub min_order_value: f64,
    pub max_discount_amount: Option<f64>,
    pub expires_at: Option<i64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub usage_limit: Option<u32>,
}

fn default_active() -> bool {
    true
}

fn validate_payload(payload: &CouponPayload) -> Result<(), AppError> {
    if payload.discount_value < 0.0 || !payload.discount_value.is_finite() {
        return Err(AppError::validation("discount_value must be non-negative"));
    }
    if payload.discount_type == DiscountType::Percentage && payload.discount_value > 100.0 {
        return Err(AppError::validation(
            "percentage discount cannot exceed 100",
        ));
    }
    if payload.min_order_value < 0.0 || !payload.min_order_value.is_finite() {
        return Err(AppError::validation("min_order_value must be non-negative"));
    }
    Ok(())
}

/// Create a coupon (admin); codes are stored uppercase
pub async fn admin_create(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Json(payload): Json<CouponPayload>,
) -> AppResult<Json<AppResponse<Coupon>>> {
    validate_payload(&payload)?;
    let code = pricing::normalize_code(&payload.code);
    validate_required_text(&code, "coupon code", MAX_NAME_LEN)?;

    if state
        .store
        .get_coupon(&code)
        .map_err(|e| AppError::database(e.to_string()))?
        .is_some()
    {
        return Err(AppError::conflict(format!("coupon already exists: {code}")));
    }

    let coupon = Coupon {
        code,
        discount_type: payload.discount_type,
        discount_value: payload.discount_value,
        min_order_value: payload.min_order_value,
        max_discount_amount: payload.max_discount_amount,
        expires_at: payload.expires_at,
        is_active: payload.is_active,
        usage_limit: payload.usage_limit,
        used_count: 0,
        created_at: now_millis(),
    };
    state
        .store
        .upsert_coupon(&coupon)
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(ok(coupon))
}

/// Update an existing coupon (admin); `used_count` and `created_at` are kept
pub async fn admin_update(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(code): Path<String>,
    Json(payload): Json<CouponPayload>,
) -> AppResult<Json<AppResponse<Coupon>>> {
    validate_payload(&payload)?;
    let code = pricing::normalize_code(&code);
    let existing = state
        .store
        .get_coupon(&code)
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("coupon not found: {code}")))?;

    let coupon = Coupon {
        code,
        discount_type: payload.discount_type,
        discount_value: payload.discount_value,
        min_order_value: payload.min_order_value,
        max_discount_amount: payload.max_discount_amount,
        expires_at: payload.expires_at,
        is_active: payload.is_active,
        usage_limit: payload.usage_limit,
        used_count: existing.used_count,
        created_at: existing.created_at,
    };
    state
        .store
        .upsert_coupon(&coupon)
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(ok(coupon))
}

/// Delete a coupon (admin)
pub async fn admin_delete(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(code): Path<String>,
) -> AppResult<Json<AppResponse<()>>> {
    let code = pricing::normalize_code(&code);
    let existed = state
        .store
        .delete_coupon(&code)
        .map_err(|e| AppError::database(e.to_string()))?;
    if !existed {
        return Err(AppError::not_found(format!("coupon not found: {code}")));
    }
    Ok(ok(()))
}
