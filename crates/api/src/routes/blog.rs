//! Blog route handlers: published posts, search, similar posts, comments.
//!
//! These endpoints are public; comment submission accepts both
//! authenticated and anonymous callers.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use mangrove_core::CommentId;

use crate::db::RepositoryError;
use crate::db::blog::BlogRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::Post;
use crate::response::ApiResponse;
use crate::state::AppState;

/// How many posts `GET /blog/posts/recent` returns.
const RECENT_POSTS: i64 = 3;

/// How many similar posts `GET /blog/posts/{slug}/similar` returns.
const SIMILAR_POSTS: i64 = 4;

// =============================================================================
// Request Types
// =============================================================================

/// `?search=` query for the post listing.
#[derive(Debug, Deserialize)]
pub struct PostSearchQuery {
    pub search: Option<String>,
}

/// Comment submission payload.
///
/// `name` and `email` are required for anonymous submissions and ignored
/// for authenticated ones, where the identity supplies them.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub body: String,
    pub parent: Option<i32>,
    pub name: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// Posts
// =============================================================================

/// `GET /blog/posts[?search=]` - published posts, optionally ranked by
/// weighted title/body full-text search.
pub async fn posts_list(
    State(state): State<AppState>,
    Query(query): Query<PostSearchQuery>,
) -> Result<ApiResponse> {
    let blog = BlogRepository::new(state.pool());

    let posts = match query.search.as_deref() {
        Some(search) if !search.is_empty() => blog.search_published(search).await?,
        _ => blog.list_published().await?,
    };

    let data = with_tags(&blog, posts).await?;

    Ok(ApiResponse::success("List Posts Successful", data))
}

/// `GET /blog/posts/recent` - the three latest published posts.
pub async fn posts_recent(State(state): State<AppState>) -> Result<ApiResponse> {
    let blog = BlogRepository::new(state.pool());
    let posts = blog.recent(RECENT_POSTS).await?;
    let data = with_tags(&blog, posts).await?;

    Ok(ApiResponse::success("List Recent Posts", data))
}

/// `GET /blog/posts/{slug}` - published-post detail.
pub async fn post_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse> {
    let blog = BlogRepository::new(state.pool());

    let post = blog
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_owned()))?;

    let tags = blog.tags_for_post(post.id).await?;

    Ok(ApiResponse::success("Post Detail View", post_json(&post, tags)))
}

/// `GET /blog/posts/{slug}/similar` - posts sharing tags, most overlap
/// first, ties broken by publish recency.
pub async fn post_similar(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse> {
    let blog = BlogRepository::new(state.pool());

    let post = blog
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_owned()))?;

    let similar = blog.similar(post.id, SIMILAR_POSTS).await?;

    Ok(ApiResponse::success("List Similar Posts", similar))
}

// =============================================================================
// Comments
// =============================================================================

/// `GET /blog/posts/{slug}/comments` - active comments of a post.
///
/// Commenter emails are kept private; only name, body and threading data
/// are exposed.
pub async fn comments_list(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse> {
    let blog = BlogRepository::new(state.pool());

    let post = blog
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_owned()))?;

    let comments: Vec<Value> = blog
        .comments(post.id)
        .await?
        .into_iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "body": c.body,
                "parent": c.parent_id,
            })
        })
        .collect();

    Ok(ApiResponse::success("List Comments Successful", comments))
}

/// `POST /blog/posts/{slug}/comments` - submit a comment, optionally as a
/// reply to an existing one.
///
/// The parent lookup and the insert run in one transaction: a vanished
/// parent means nothing is inserted.
pub async fn comment_create(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> Result<ApiResponse> {
    let blog = BlogRepository::new(state.pool());

    let post = blog
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_owned()))?;

    // Authenticated callers get attributed by their account; anonymous
    // callers supply (unverified) name and email themselves.
    let (name, email) = match &user {
        Some(user) => (user.full_name(), user.email.to_string()),
        None => {
            let name = payload
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .ok_or_else(|| AppError::Validation("Name is required".to_owned()))?;
            let email = payload
                .email
                .clone()
                .filter(|e| !e.is_empty())
                .ok_or_else(|| AppError::Validation("Email is required".to_owned()))?;
            (name, email)
        }
    };

    blog.create_comment(
        post.id,
        payload.parent.map(CommentId::new),
        &name,
        &email,
        &payload.body,
    )
    .await
    .map_err(|e| match e {
        RepositoryError::NotFound => AppError::Validation(
            "Comment you're trying to reply to does not or no longer exists".to_owned(),
        ),
        other => AppError::Database(other),
    })?;

    Ok(ApiResponse::created("Comment Posted Successfully", json!([])))
}

// =============================================================================
// Helpers
// =============================================================================

fn post_json(post: &Post, tags: Vec<String>) -> Value {
    json!({
        "id": post.id,
        "slug": post.slug,
        "title": post.title,
        "description": post.description,
        "body": post.body,
        "image": post.image,
        "publish": post.publish,
        "tags": tags,
    })
}

/// Attach tag lists to a batch of posts with a single query.
async fn with_tags(blog: &BlogRepository<'_>, posts: Vec<Post>) -> Result<Vec<Value>> {
    let ids: Vec<_> = posts.iter().map(|p| p.id).collect();
    let mut tags_by_post = std::collections::HashMap::<_, Vec<String>>::new();

    for (post_id, tag) in blog.tags_for_posts(&ids).await? {
        tags_by_post.entry(post_id).or_default().push(tag);
    }

    Ok(posts
        .iter()
        .map(|post| {
            let tags = tags_by_post.remove(&post.id).unwrap_or_default();
            post_json(post, tags)
        })
        .collect())
}
