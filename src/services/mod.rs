// Services - business operations composed from entity calls

pub mod account_service;
pub mod feed_service;
pub mod social_graph_service;

pub use account_service::{AccountService, AuthTokens};
pub use feed_service::{FeedService, LikeToggle, RepostToggle};
pub use social_graph_service::SocialGraphService;
