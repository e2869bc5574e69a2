//! Blog domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use mangrove_core::{CommentId, PostId};

/// A published blog post row (tags are fetched separately and attached by
/// the route layer).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: PostId,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub image: Option<String>,
    pub publish: DateTime<Utc>,
}

/// A post related to another by shared tags.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SimilarPost {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    /// How many tags this post shares with the reference post.
    pub same_tags: i64,
}

/// A comment on a post; `parent_id` threads replies into a tree.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub name: String,
    pub email: String,
    pub body: String,
    /// Moderation flag; only active comments are listed.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
