use async_graphql::{EmptySubscription, Schema};
use std::sync::Arc;

use super::mutation::MutationRoot;
use super::query::QueryRoot;
use crate::services::{AccountService, FeedService, SocialGraphService};

pub type FeedSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

const MAX_QUERY_DEPTH: usize = 12;

/// Build the schema with the services resolvers pull from context.
/// The per-request `Arc<ViewerContext>` is attached at execution time.
pub fn build_schema(
    accounts: Arc<AccountService>,
    feed: FeedService,
    social: SocialGraphService,
) -> FeedSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(accounts)
        .data(feed)
        .data(social)
        .limit_depth(MAX_QUERY_DEPTH)
        .finish()
}
