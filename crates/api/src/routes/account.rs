//! Account route handlers: address, profile, password change, and the
//! saved / recently-viewed product sets. All endpoints require auth.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::json;

use mangrove_core::ProductId;

use crate::db::catalog::CatalogRepository;
use crate::db::users::{ProfileFields, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Address fields, all optional.
#[derive(Debug, Deserialize, Default)]
pub struct AddressRequest {
    pub state: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
}

impl AddressRequest {
    fn into_fields(self) -> ProfileFields {
        ProfileFields {
            state: self.state,
            country: self.country,
            city: self.city,
            address: self.address,
        }
    }
}

/// Profile update: names plus address fields.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub address: AddressRequest,
}

/// Password change payload; the new password is entered twice.
#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password_2: String,
}

/// Saved-items write payload.
#[derive(Debug, Deserialize)]
pub struct SavedItemRequest {
    pub product_id: i32,
    /// `"like"` adds, `"dislike"` removes.
    pub action: String,
}

/// `?product_id=` query used by the delete endpoints.
#[derive(Debug, Deserialize)]
pub struct ProductIdQuery {
    pub product_id: Option<i32>,
}

// =============================================================================
// Address
// =============================================================================

/// `GET /account/address` - list the user's address (0 or 1 entries).
pub async fn address_list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse> {
    let profile = UserRepository::new(state.pool()).get_profile(user.id).await?;

    let addresses: Vec<_> = profile
        .into_iter()
        .map(|p| {
            json!({
                "first_name": user.first_name,
                "last_name": user.last_name,
                "state": p.state,
                "country": p.country,
                "city": p.city,
                "address": p.address,
            })
        })
        .collect();

    Ok(ApiResponse::success("List Address View Successful", addresses))
}

/// `POST /account/address` - create the user's address.
pub async fn address_create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<AddressRequest>,
) -> Result<ApiResponse> {
    let users = UserRepository::new(state.pool());

    users
        .create_profile(user.id, &payload.into_fields())
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(_) => {
                AppError::Conflict("Address already exists".to_owned())
            }
            other => AppError::Database(other),
        })?;

    Ok(ApiResponse::success(
        "Address Successfully added",
        json!(user.email),
    ))
}

/// `PUT /account/address` - update the user's address.
pub async fn address_update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<AddressRequest>,
) -> Result<ApiResponse> {
    UserRepository::new(state.pool())
        .update_profile(user.id, &payload.into_fields())
        .await?;

    Ok(ApiResponse::success(
        "Address Successfully updated",
        json!(user.email),
    ))
}

/// `DELETE /account/address` - delete the user's address.
pub async fn address_delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse> {
    UserRepository::new(state.pool()).delete_profile(user.id).await?;

    Ok(ApiResponse::success("Address deleted successfully", json!([])))
}

// =============================================================================
// Profile & Password
// =============================================================================

/// `PUT /account/profile` - update names and address fields together.
pub async fn profile_update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<ApiResponse> {
    let users = UserRepository::new(state.pool());

    users
        .update_names(
            user.id,
            payload.first_name.as_deref(),
            payload.last_name.as_deref(),
        )
        .await?;

    users
        .update_profile(user.id, &payload.address.into_fields())
        .await?;

    Ok(ApiResponse::success(
        "Profile Successfully updated",
        json!(user.email),
    ))
}

/// `PUT /account/password-change` - change password with old-password check.
pub async fn password_change(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<PasswordChangeRequest>,
) -> Result<ApiResponse> {
    if payload.new_password != payload.new_password_2 {
        return Err(AppError::Validation("Passwords mismatch".to_owned()));
    }

    AuthService::new(state.pool())
        .change_password(user.id, &payload.old_password, &payload.new_password)
        .await
        .map_err(|e| match e {
            crate::services::auth::AuthError::InvalidCredentials => {
                AppError::Validation("Current Password Incorrect".to_owned())
            }
            other => AppError::Auth(other),
        })?;

    Ok(ApiResponse::success(
        "Password changed successfully",
        json!(user.email),
    ))
}

// =============================================================================
// Saved Items (favorites)
// =============================================================================

/// `POST /account/saved-items` - like/dislike a product.
pub async fn saved_items_update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<SavedItemRequest>,
) -> Result<ApiResponse> {
    let catalog = CatalogRepository::new(state.pool());
    let product_id = ProductId::new(payload.product_id);

    if catalog.get_product(product_id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    let phrase = match payload.action.as_str() {
        "like" => {
            catalog.add_saved(user.id, product_id).await?;
            "added to"
        }
        "dislike" => {
            catalog.remove_saved(user.id, product_id).await?;
            "removed from"
        }
        _ => return Err(AppError::Validation("Invalid action".to_owned())),
    };

    Ok(ApiResponse::success(
        format!("Product {phrase} saved items"),
        json!([]),
    ))
}

/// `GET /account/saved-items` - list the user's saved products.
pub async fn saved_items_list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse> {
    let items = CatalogRepository::new(state.pool()).list_saved(user.id).await?;

    Ok(ApiResponse::success("Saved items loaded successfully", items))
}

/// `DELETE /account/saved-items[?product_id=]` - remove one or clear all.
pub async fn saved_items_delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ProductIdQuery>,
) -> Result<ApiResponse> {
    let catalog = CatalogRepository::new(state.pool());

    let message = match query.product_id {
        Some(id) => {
            let product = catalog
                .get_product(ProductId::new(id))
                .await?
                .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;
            catalog.remove_saved(user.id, product.id).await?;
            format!("{} removed from wishlist", product.name)
        }
        None => {
            catalog.clear_saved(user.id).await?;
            "Saved items cleared".to_owned()
        }
    };

    Ok(ApiResponse::success(message, json!([])))
}

// =============================================================================
// Recently Viewed
// =============================================================================

/// `GET /account/recent-items` - list recently viewed products.
pub async fn recent_items_list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse> {
    let items = CatalogRepository::new(state.pool()).list_recent(user.id).await?;

    Ok(ApiResponse::success(
        "Recent items loaded successfully",
        items,
    ))
}

/// `DELETE /account/recent-items[?product_id=]` - remove one or clear all.
pub async fn recent_items_delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ProductIdQuery>,
) -> Result<ApiResponse> {
    let catalog = CatalogRepository::new(state.pool());

    let message = match query.product_id {
        Some(id) => {
            let product = catalog
                .get_product(ProductId::new(id))
                .await?
                .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;
            catalog.remove_recent(user.id, product.id).await?;
            format!("{} removed from recently viewed products", product.name)
        }
        None => {
            catalog.clear_recent(user.id).await?;
            "Recently Viewed Products Cleared".to_owned()
        }
    };

    Ok(ApiResponse::success(message, json!([])))
}
