// FeedService - posts, comments, likes, shares and reposts
//
// Every write runs in one transaction that also re-derives the affected
// counters, so a post's counters always match its rows once committed.

use tracing::{debug, info, instrument};

use crate::entities::{Comment, Interaction, InteractionKind, Post, PostQuery};
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::begin_write;
use crate::infrastructure::{DbConnection, DbPool};

pub const POST_NOT_FOUND: &str = "Post not found";
pub const ALREADY_SHARED: &str = "You have already shared this post";
pub const EMPTY_CONTENT: &str = "Content cannot be empty";

/// Outcome of a like toggle
#[derive(Debug, Clone)]
pub struct LikeToggle {
    pub post: Post,
    pub liked: bool,
}

/// Outcome of a repost toggle. `repost` is the new row when one was created.
#[derive(Debug, Clone)]
pub struct RepostToggle {
    pub post: Post,
    pub reposted: bool,
    pub repost: Option<Post>,
}

#[derive(Clone)]
pub struct FeedService {
    pool: DbPool,
}

impl FeedService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_posts(&self, query: &PostQuery) -> AppResult<Vec<Post>> {
        let mut conn = self.pool.acquire().await?;
        Post::list(&mut conn, query).await
    }

    pub async fn get_post(&self, id: i64) -> AppResult<Option<Post>> {
        let mut conn = self.pool.acquire().await?;
        Post::gen_nullable(&mut conn, id).await
    }

    pub async fn list_user_posts(&self, user_id: i64) -> AppResult<Vec<Post>> {
        let query = PostQuery {
            author_id: Some(user_id),
            ..PostQuery::default()
        };
        self.list_posts(&query).await
    }

    pub async fn list_comments(&self, post_id: i64) -> AppResult<Vec<Comment>> {
        let mut conn = self.pool.acquire().await?;
        Comment::list_for_post(&mut conn, post_id).await
    }

    pub async fn list_interactions(
        &self,
        post_id: Option<i64>,
        user_id: Option<i64>,
    ) -> AppResult<Vec<Interaction>> {
        let mut conn = self.pool.acquire().await?;
        Interaction::list(&mut conn, post_id, user_id).await
    }

    /// Create a post, optionally quoting another one
    #[instrument(skip(self, content))]
    pub async fn create_post(
        &self,
        author_id: i64,
        content: &str,
        quoted_post_id: Option<i64>,
    ) -> AppResult<Post> {
        require_content(content)?;
        let mut tx = begin_write(&self.pool).await?;

        if let Some(quoted_id) = quoted_post_id {
            require_post(&mut tx, quoted_id).await?;
        }

        let post = Post::create(&mut tx, author_id, content, quoted_post_id, false).await?;
        if let Some(quoted_id) = quoted_post_id {
            Post::refresh_counters(&mut tx, quoted_id).await?;
        }

        tx.commit().await?;
        info!("User {} created post {}", author_id, post.id);
        Ok(post)
    }

    #[instrument(skip(self, content))]
    pub async fn create_comment(&self, author_id: i64, post_id: i64, content: &str) -> AppResult<Comment> {
        require_content(content)?;
        let mut tx = begin_write(&self.pool).await?;

        require_post(&mut tx, post_id).await?;
        let comment = Comment::create(&mut tx, post_id, author_id, content).await?;
        Post::refresh_counters(&mut tx, post_id).await?;

        tx.commit().await?;
        info!("User {} commented on post {}", author_id, post_id);
        Ok(comment)
    }

    #[instrument(skip(self))]
    pub async fn toggle_like(&self, user_id: i64, post_id: i64) -> AppResult<LikeToggle> {
        let mut tx = begin_write(&self.pool).await?;

        require_post(&mut tx, post_id).await?;
        let liked = if Interaction::delete_like(&mut tx, user_id, post_id).await? {
            false
        } else {
            Interaction::create(&mut tx, user_id, post_id, InteractionKind::Like).await?;
            true
        };
        Post::refresh_counters(&mut tx, post_id).await?;
        let post = Post::gen_enforce(&mut tx, post_id).await?;

        tx.commit().await?;
        debug!("User {} liked={} post {}", user_id, liked, post_id);
        Ok(LikeToggle { post, liked })
    }

    /// Record a share. A user can share a given post once.
    #[instrument(skip(self))]
    pub async fn share_post(&self, user_id: i64, post_id: i64) -> AppResult<Post> {
        let mut tx = begin_write(&self.pool).await?;

        require_post(&mut tx, post_id).await?;
        Interaction::create(&mut tx, user_id, post_id, InteractionKind::Share)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AppError::Conflict(ALREADY_SHARED.to_string()),
                other => other,
            })?;
        Post::refresh_counters(&mut tx, post_id).await?;
        let post = Post::gen_enforce(&mut tx, post_id).await?;

        tx.commit().await?;
        info!("User {} shared post {}", user_id, post_id);
        Ok(post)
    }

    /// Repost `post_id`, or undo the caller's existing repost of it
    #[instrument(skip(self))]
    pub async fn repost(&self, user_id: i64, post_id: i64) -> AppResult<RepostToggle> {
        let mut tx = begin_write(&self.pool).await?;

        require_post(&mut tx, post_id).await?;
        let (reposted, repost) = if Post::delete_repost(&mut tx, user_id, post_id).await? {
            (false, None)
        } else {
            let repost = Post::create(&mut tx, user_id, "", Some(post_id), true).await?;
            (true, Some(repost))
        };
        Post::refresh_counters(&mut tx, post_id).await?;
        let post = Post::gen_enforce(&mut tx, post_id).await?;

        tx.commit().await?;
        info!("User {} reposted={} post {}", user_id, reposted, post_id);
        Ok(RepostToggle {
            post,
            reposted,
            repost,
        })
    }
}

fn require_content(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation(EMPTY_CONTENT.to_string()));
    }
    Ok(())
}

async fn require_post(conn: &mut DbConnection, post_id: i64) -> AppResult<()> {
    if Post::exists(conn, post_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(POST_NOT_FOUND.to_string()))
    }
}
