// Root mutations. Account and token operations are open; the rest need a signed-in caller.

use async_graphql::{Context, MergedObject, Object, Result};
use std::sync::Arc;

use super::payloads::{
    into_payload, AuthPayload, CommentPayload, FollowPayload, MessagePayload, PostPayload,
    ProfilePayload, RepostPayload, RevokeTokenPayload, ToggleLikePayload, VerifyTokenPayload,
};
use super::require_viewer;
use super::scalars::Date;
use crate::entities::ProfileChanges;
use crate::services::{AccountService, FeedService, SocialGraphService};

#[derive(Default)]
pub struct AccountMutation;

#[Object]
impl AccountMutation {
    async fn register(
        &self,
        ctx: &Context<'_>,
        username: String,
        email: String,
        password: String,
    ) -> Result<AuthPayload> {
        let accounts = ctx.data::<Arc<AccountService>>()?;
        Ok(into_payload(accounts.register(&username, &email, &password).await))
    }

    /// Log in with username and password
    async fn token_auth(&self, ctx: &Context<'_>, username: String, password: String) -> Result<AuthPayload> {
        let accounts = ctx.data::<Arc<AccountService>>()?;
        Ok(into_payload(accounts.login(&username, &password).await))
    }

    async fn verify_token(&self, ctx: &Context<'_>, token: String) -> Result<VerifyTokenPayload> {
        let accounts = ctx.data::<Arc<AccountService>>()?;
        Ok(into_payload(accounts.verify_token(&token)))
    }

    async fn refresh_token(&self, ctx: &Context<'_>, refresh_token: String) -> Result<AuthPayload> {
        let accounts = ctx.data::<Arc<AccountService>>()?;
        Ok(into_payload(accounts.refresh_token(&refresh_token).await))
    }

    async fn revoke_token(&self, ctx: &Context<'_>, refresh_token: String) -> Result<RevokeTokenPayload> {
        let accounts = ctx.data::<Arc<AccountService>>()?;
        Ok(into_payload(accounts.revoke_token(&refresh_token).await))
    }

    async fn request_password_reset(&self, ctx: &Context<'_>, email: String) -> Result<MessagePayload> {
        let accounts = ctx.data::<Arc<AccountService>>()?;
        Ok(into_payload(accounts.request_password_reset(&email).await))
    }

    async fn reset_password(
        &self,
        ctx: &Context<'_>,
        token: String,
        new_password: String,
    ) -> Result<MessagePayload> {
        let accounts = ctx.data::<Arc<AccountService>>()?;
        Ok(into_payload(accounts.reset_password(&token, &new_password).await))
    }

    /// Sign in with a Google ID token
    async fn google_auth(&self, ctx: &Context<'_>, id_token: String) -> Result<AuthPayload> {
        let accounts = ctx.data::<Arc<AccountService>>()?;
        Ok(into_payload(accounts.google_sign_in(&id_token).await))
    }
}

#[derive(Default)]
pub struct FeedMutation;

#[Object]
impl FeedMutation {
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        content: String,
        quoted_post_id: Option<i64>,
    ) -> Result<PostPayload> {
        let caller = require_viewer(ctx)?;
        let feed = ctx.data::<FeedService>()?;
        Ok(into_payload(
            feed.create_post(caller.user_id, &content, quoted_post_id).await,
        ))
    }

    async fn create_comment(&self, ctx: &Context<'_>, post_id: i64, content: String) -> Result<CommentPayload> {
        let caller = require_viewer(ctx)?;
        let feed = ctx.data::<FeedService>()?;
        Ok(into_payload(
            feed.create_comment(caller.user_id, post_id, &content).await,
        ))
    }

    async fn toggle_like(&self, ctx: &Context<'_>, post_id: i64) -> Result<ToggleLikePayload> {
        let caller = require_viewer(ctx)?;
        let feed = ctx.data::<FeedService>()?;
        Ok(into_payload(feed.toggle_like(caller.user_id, post_id).await))
    }

    async fn share_post(&self, ctx: &Context<'_>, post_id: i64) -> Result<PostPayload> {
        let caller = require_viewer(ctx)?;
        let feed = ctx.data::<FeedService>()?;
        Ok(into_payload(feed.share_post(caller.user_id, post_id).await))
    }

    /// Repost, or undo an existing repost of the same post
    async fn repost(&self, ctx: &Context<'_>, post_id: i64) -> Result<RepostPayload> {
        let caller = require_viewer(ctx)?;
        let feed = ctx.data::<FeedService>()?;
        Ok(into_payload(feed.repost(caller.user_id, post_id).await))
    }
}

#[derive(Default)]
pub struct SocialMutation;

#[Object]
impl SocialMutation {
    /// Only the supplied fields are changed
    async fn update_profile(
        &self,
        ctx: &Context<'_>,
        bio: Option<String>,
        date_of_birth: Option<Date>,
        location: Option<String>,
        profile_picture: Option<String>,
    ) -> Result<ProfilePayload> {
        let caller = require_viewer(ctx)?;
        let social = ctx.data::<SocialGraphService>()?;
        let changes = ProfileChanges {
            bio,
            date_of_birth: date_of_birth.map(Into::into),
            location,
            profile_picture,
        };
        Ok(into_payload(social.update_profile(caller.user_id, &changes).await))
    }

    async fn follow_user(&self, ctx: &Context<'_>, user_id: i64) -> Result<FollowPayload> {
        let caller = require_viewer(ctx)?;
        let social = ctx.data::<SocialGraphService>()?;
        let result = social.follow(caller.user_id, user_id).await.map(|_| true);
        Ok(into_payload(result))
    }

    async fn unfollow_user(&self, ctx: &Context<'_>, user_id: i64) -> Result<FollowPayload> {
        let caller = require_viewer(ctx)?;
        let social = ctx.data::<SocialGraphService>()?;
        let result = social.unfollow(caller.user_id, user_id).await.map(|_| false);
        Ok(into_payload(result))
    }
}

#[derive(MergedObject, Default)]
pub struct MutationRoot(AccountMutation, FeedMutation, SocialMutation);
