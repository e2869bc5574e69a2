//! Blog repository: published posts, full-text search, similar posts,
//! threaded comments.

use sqlx::PgPool;

use mangrove_core::{CommentId, PostId};

use super::RepositoryError;
use crate::models::{Comment, Post, SimilarPost};

const POST_COLUMNS: &str = "id, slug, title, description, body, image, publish";

const COMMENT_COLUMNS: &str = "id, post_id, parent_id, name, email, body, active, created_at";

/// Rank threshold below which a search match is discarded.
const SEARCH_RANK_FLOOR: f32 = 0.2;

/// Repository for blog database operations.
pub struct BlogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlogRepository<'a> {
    /// Create a new blog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List published posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(&self) -> Result<Vec<Post>, RepositoryError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE status = 'published' \
             ORDER BY publish DESC"
        );

        Ok(sqlx::query_as::<_, Post>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// Search published posts with weighted title/body full-text ranking.
    ///
    /// Title matches weigh 'A', body matches 'B'; results below the rank
    /// floor are dropped and the rest come back best-first. Ranking itself
    /// is the database's (`ts_rank`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_published(&self, query: &str) -> Result<Vec<Post>, RepositoryError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM ( \
                 SELECT {POST_COLUMNS}, \
                        ts_rank( \
                            setweight(to_tsvector('english', title), 'A') || \
                            setweight(to_tsvector('english', body), 'B'), \
                            plainto_tsquery('english', $1) \
                        ) AS rank \
                 FROM posts \
                 WHERE status = 'published' \
             ) ranked \
             WHERE rank > $2 \
             ORDER BY rank DESC"
        );

        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(query)
            .bind(SEARCH_RANK_FLOOR)
            .fetch_all(self.pool)
            .await?)
    }

    /// The most recent published posts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Post>, RepositoryError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE status = 'published' \
             ORDER BY publish DESC \
             LIMIT $1"
        );

        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?)
    }

    /// Get a published post by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, RepositoryError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE slug = $1 AND status = 'published'"
        );

        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Posts sharing tags with the given post, ordered by shared-tag count
    /// and then publish recency.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn similar(
        &self,
        post_id: PostId,
        limit: i64,
    ) -> Result<Vec<SimilarPost>, RepositoryError> {
        Ok(sqlx::query_as::<_, SimilarPost>(
            "SELECT p.title, p.description, p.image, COUNT(pt.tag_id) AS same_tags \
             FROM posts p \
             JOIN post_tags pt ON pt.post_id = p.id \
             WHERE pt.tag_id IN (SELECT tag_id FROM post_tags WHERE post_id = $1) \
               AND p.id <> $1 \
               AND p.status = 'published' \
             GROUP BY p.id \
             ORDER BY same_tags DESC, p.publish DESC \
             LIMIT $2",
        )
        .bind(post_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?)
    }

    /// Tag names of a single post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tags_for_post(&self, post_id: PostId) -> Result<Vec<String>, RepositoryError> {
        Ok(sqlx::query_scalar::<_, String>(
            "SELECT t.name FROM tags t \
             JOIN post_tags pt ON pt.tag_id = t.id \
             WHERE pt.post_id = $1 \
             ORDER BY t.name",
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?)
    }

    /// Tag names of many posts at once, as `(post_id, tag_name)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tags_for_posts(
        &self,
        post_ids: &[PostId],
    ) -> Result<Vec<(PostId, String)>, RepositoryError> {
        let ids: Vec<i32> = post_ids.iter().map(|id| id.as_i32()).collect();

        let rows = sqlx::query_as::<_, (i32, String)>(
            "SELECT pt.post_id, t.name FROM tags t \
             JOIN post_tags pt ON pt.tag_id = t.id \
             WHERE pt.post_id = ANY($1) \
             ORDER BY t.name",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(post_id, name)| (PostId::new(post_id), name))
            .collect())
    }

    /// Active comments of a post, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn comments(&self, post_id: PostId) -> Result<Vec<Comment>, RepositoryError> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE post_id = $1 AND active = TRUE \
             ORDER BY created_at"
        );

        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Insert a comment, resolving the parent inside the same transaction.
    ///
    /// The parent lookup and the insert are atomic: when the parent id does
    /// not resolve (deleted, or belongs to a different post), nothing is
    /// inserted and `RepositoryError::NotFound` is returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if `parent_id` doesn't resolve,
    /// `RepositoryError::Database` for other failures.
    pub async fn create_comment(
        &self,
        post_id: PostId,
        parent_id: Option<CommentId>,
        name: &str,
        email: &str,
        body: &str,
    ) -> Result<Comment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if let Some(parent) = parent_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM comments WHERE id = $1 AND post_id = $2)",
            )
            .bind(parent)
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await?;

            if !exists {
                tx.rollback().await?;
                return Err(RepositoryError::NotFound);
            }
        }

        let sql = format!(
            "INSERT INTO comments (post_id, parent_id, name, email, body) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COMMENT_COLUMNS}"
        );

        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .bind(parent_id)
            .bind(name)
            .bind(email)
            .bind(body)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(comment)
    }
}
