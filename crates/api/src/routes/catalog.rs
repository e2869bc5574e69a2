//! Catalog route handlers: category and product listing/detail.
//!
//! Viewing a product detail also records the product into the viewer's
//! recently-viewed set (idempotently), which is why these reads require
//! an authenticated caller.

use axum::extract::{Path, State};
use serde_json::json;

use mangrove_core::{CategoryId, ProductId};

use crate::db::catalog::CatalogRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::state::AppState;

/// `GET /shop/products` - list all products.
pub async fn products_list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<ApiResponse> {
    let products = CatalogRepository::new(state.pool()).list_products().await?;

    Ok(ApiResponse::success("Products List View", products))
}

/// `GET /shop/products/{id}` - product detail with extra images.
///
/// Side effect: upserts the product into the viewer's recently-viewed set.
pub async fn product_detail(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<ApiResponse> {
    let catalog = CatalogRepository::new(state.pool());
    let product_id = ProductId::new(id);

    let product = catalog
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product Not Found".to_owned()))?;

    catalog.record_view(user.id, product_id).await?;

    let extra_images = catalog.extra_images(product_id).await?;

    Ok(ApiResponse::success(
        "Product Detail View",
        json!({
            "name": product.name,
            "slug": product.slug,
            "image": product.image,
            "description": product.description,
            "price": product.price,
            "category": product.category_id,
            "extra_images": extra_images,
        }),
    ))
}

/// `GET /shop/categories` - list all categories.
pub async fn categories_list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<ApiResponse> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;

    Ok(ApiResponse::success("Categories List View", categories))
}

/// `GET /shop/categories/{id}` - category detail.
pub async fn category_detail(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<ApiResponse> {
    let category = CatalogRepository::new(state.pool())
        .get_category(CategoryId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Category Not Found".to_owned()))?;

    Ok(ApiResponse::success("Category Detail View", category))
}
