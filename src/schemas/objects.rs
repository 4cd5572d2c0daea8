// Field resolvers joining entities for nested selections

use async_graphql::{ComplexObject, Context, Result};

use super::scalars::Date;
use super::{viewer, GqlResultExt};
use crate::entities::{Comment, Interaction, Post, User, UserProfile};
use crate::error::AppError;
use crate::services::feed_service::POST_NOT_FOUND;
use crate::services::social_graph_service::USER_NOT_FOUND;
use crate::services::{FeedService, SocialGraphService};

async fn load_user(ctx: &Context<'_>, id: i64) -> Result<User> {
    ctx.data::<SocialGraphService>()?
        .get_user(id)
        .await
        .and_then(|user| user.ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string())))
        .gql()
}

async fn load_post(ctx: &Context<'_>, id: i64) -> Result<Post> {
    ctx.data::<FeedService>()?
        .get_post(id)
        .await
        .and_then(|post| post.ok_or_else(|| AppError::NotFound(POST_NOT_FOUND.to_string())))
        .gql()
}

#[ComplexObject]
impl User {
    async fn profile(&self, ctx: &Context<'_>) -> Result<Option<UserProfile>> {
        ctx.data::<SocialGraphService>()?.get_profile(self.id).await.gql()
    }

    /// Whether the current viewer follows this user
    async fn is_following(&self, ctx: &Context<'_>) -> Result<bool> {
        let Some(viewer_id) = viewer(ctx).user_id() else {
            return Ok(false);
        };
        ctx.data::<SocialGraphService>()?
            .is_following(viewer_id, self.id)
            .await
            .gql()
    }
}

#[ComplexObject]
impl UserProfile {
    async fn date_of_birth(&self) -> Option<Date> {
        self.date_of_birth.map(Date)
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        load_user(ctx, self.user_id).await
    }
}

#[ComplexObject]
impl Post {
    async fn author(&self, ctx: &Context<'_>) -> Result<User> {
        load_user(ctx, self.author_id).await
    }

    /// Oldest first
    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<Comment>> {
        ctx.data::<FeedService>()?.list_comments(self.id).await.gql()
    }

    /// Null once the quoted post has been deleted
    async fn quoted_post(&self, ctx: &Context<'_>) -> Result<Option<Post>> {
        match self.quoted_post_id {
            Some(id) => ctx.data::<FeedService>()?.get_post(id).await.gql(),
            None => Ok(None),
        }
    }
}

#[ComplexObject]
impl Comment {
    async fn author(&self, ctx: &Context<'_>) -> Result<User> {
        load_user(ctx, self.author_id).await
    }

    async fn post(&self, ctx: &Context<'_>) -> Result<Post> {
        load_post(ctx, self.post_id).await
    }
}

#[ComplexObject]
impl Interaction {
    async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        load_user(ctx, self.user_id).await
    }

    async fn post(&self, ctx: &Context<'_>) -> Result<Post> {
        load_post(ctx, self.post_id).await
    }
}
