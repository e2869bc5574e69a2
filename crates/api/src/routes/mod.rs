//! HTTP route handlers for the Mangrove API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (hits the database)
//!
//! # Auth
//! POST  /auth/register                       - Create an account
//! POST  /auth/login                          - Issue a token pair
//! POST  /auth/logout                         - Revoke a refresh token (auth)
//! GET   /auth/email/verify?token=            - Verify an email address
//! POST  /auth/request-verification-link      - Re-send the verification email
//! POST  /auth/token/refresh                  - Mint a new access token
//! POST  /auth/request-reset-email            - Send a password-reset link
//! GET   /auth/password-reset/{uidb64}/{token} - Check reset credentials
//! PATCH /auth/password-reset-complete        - Set the new password
//!
//! # Account (requires auth)
//! GET/POST/PUT/DELETE /account/address       - Address CRUD
//! PUT   /account/profile                     - Names + address update
//! PUT   /account/password-change             - Password change
//! POST/GET/DELETE /account/saved-items       - Favorites
//! GET/DELETE      /account/recent-items      - Recently viewed
//!
//! # Shop (requires auth)
//! GET  /shop/products                        - Product listing
//! GET  /shop/products/{id}                   - Product detail (records view)
//! GET  /shop/categories                      - Category listing
//! GET  /shop/categories/{id}                 - Category detail
//!
//! # Orders (requires auth)
//! GET/POST/DELETE /orders/cart               - Cart view / add / remove
//! GET  /orders                               - Placed orders
//! GET  /orders/{id}                          - Placed-order detail
//! POST /orders/pay                           - Checkout
//!
//! # Blog (public)
//! GET  /blog/posts?search=                   - Published posts, optional FTS
//! GET  /blog/posts/recent                    - Three latest posts
//! GET  /blog/posts/{slug}                    - Post detail
//! GET  /blog/posts/{slug}/similar            - Posts sharing tags
//! GET/POST /blog/posts/{slug}/comments       - Threaded comments
//! ```

pub mod account;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod catalog;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/email/verify", get(auth::verify_email))
        .route(
            "/request-verification-link",
            post(auth::request_verification_link),
        )
        .route("/token/refresh", post(auth::refresh_token))
        .route("/request-reset-email", post(auth::request_reset_email))
        .route(
            "/password-reset/{uidb64}/{token}",
            get(auth::check_reset_token),
        )
        .route(
            "/password-reset-complete",
            patch(auth::reset_password_complete),
        )
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/address",
            get(account::address_list)
                .post(account::address_create)
                .put(account::address_update)
                .delete(account::address_delete),
        )
        .route("/profile", put(account::profile_update))
        .route("/password-change", put(account::password_change))
        .route(
            "/saved-items",
            post(account::saved_items_update)
                .get(account::saved_items_list)
                .delete(account::saved_items_delete),
        )
        .route(
            "/recent-items",
            get(account::recent_items_list).delete(account::recent_items_delete),
        )
}

/// Create the shop (catalog) routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::products_list))
        .route("/products/{id}", get(catalog::product_detail))
        .route("/categories", get(catalog::categories_list))
        .route("/categories/{id}", get(catalog::category_detail))
}

/// Create the orders routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cart",
            get(cart::cart_view)
                .post(cart::cart_add)
                .delete(cart::cart_remove),
        )
        .route("/pay", post(cart::checkout))
        .route("/", get(cart::orders_list))
        .route("/{id}", get(cart::order_detail))
}

/// Create the blog routes router.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(blog::posts_list))
        .route("/posts/recent", get(blog::posts_recent))
        .route("/posts/{slug}", get(blog::post_detail))
        .route("/posts/{slug}/similar", get(blog::post_similar))
        .route(
            "/posts/{slug}/comments",
            get(blog::comments_list).post(blog::comment_create),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/shop", shop_routes())
        .nest("/orders", order_routes())
        .nest("/blog", blog_routes())
}
