// Root queries. Everything here is public except `me`.

use async_graphql::{Context, MergedObject, Object, Result, ID};

use super::{parse_id, viewer, GqlResultExt};
use crate::entities::{Interaction, Post, PostQuery, User, UserProfile};
use crate::services::{AccountService, FeedService, SocialGraphService};
use std::sync::Arc;

/// Treat zero and negative page arguments as absent
fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v > 0)
}

#[derive(Default)]
pub struct FeedQuery;

#[Object]
impl FeedQuery {
    /// Newest first. `skip` is applied before `first`.
    async fn posts(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        first: Option<i64>,
        skip: Option<i64>,
    ) -> Result<Vec<Post>> {
        let query = PostQuery {
            search,
            author_id: None,
            limit: positive(first),
            offset: positive(skip),
        };
        ctx.data::<FeedService>()?.list_posts(&query).await.gql()
    }

    /// Null when no post has this id
    async fn post(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Post>> {
        let id = parse_id(&id).gql()?;
        ctx.data::<FeedService>()?.get_post(id).await.gql()
    }

    async fn user_posts(&self, ctx: &Context<'_>, user_id: ID) -> Result<Vec<Post>> {
        let user_id = parse_id(&user_id).gql()?;
        ctx.data::<FeedService>()?.list_user_posts(user_id).await.gql()
    }

    async fn interactions(
        &self,
        ctx: &Context<'_>,
        post_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<Vec<Interaction>> {
        ctx.data::<FeedService>()?
            .list_interactions(post_id, user_id)
            .await
            .gql()
    }
}

#[derive(Default)]
pub struct AccountQuery;

#[Object]
impl AccountQuery {
    /// The signed-in caller
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let viewer = viewer(ctx);
        ctx.data::<Arc<AccountService>>()?
            .current_user(&viewer)
            .await
            .gql()
    }
}

#[derive(Default)]
pub struct SocialQuery;

#[Object]
impl SocialQuery {
    async fn user(&self, ctx: &Context<'_>, username: String) -> Result<Option<User>> {
        ctx.data::<SocialGraphService>()?
            .get_user_by_username(&username)
            .await
            .gql()
    }

    async fn profile(&self, ctx: &Context<'_>, user_id: i64) -> Result<Option<UserProfile>> {
        ctx.data::<SocialGraphService>()?.get_profile(user_id).await.gql()
    }

    async fn followers(&self, ctx: &Context<'_>, user_id: i64) -> Result<Vec<User>> {
        ctx.data::<SocialGraphService>()?.followers(user_id).await.gql()
    }

    async fn following(&self, ctx: &Context<'_>, user_id: i64) -> Result<Vec<User>> {
        ctx.data::<SocialGraphService>()?.following(user_id).await.gql()
    }
}

#[derive(MergedObject, Default)]
pub struct QueryRoot(FeedQuery, AccountQuery, SocialQuery);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_page_arguments_are_ignored() {
        assert_eq!(positive(Some(5)), Some(5));
        assert_eq!(positive(Some(0)), None);
        assert_eq!(positive(Some(-3)), None);
        assert_eq!(positive(None), None);
    }
}
