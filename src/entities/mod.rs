// Entities - row types and their gen_* / create / delete methods
//
// Every method takes a `&mut DbConnection` so callers decide whether it runs
// on a pooled connection or inside a transaction.

pub mod ent_comment;
pub mod ent_follow;
pub mod ent_interaction;
pub mod ent_password_reset;
pub mod ent_post;
pub mod ent_profile;
pub mod ent_refresh_token;
pub mod ent_user;

pub use ent_comment::Comment;
pub use ent_follow::Follow;
pub use ent_interaction::{Interaction, InteractionKind};
pub use ent_password_reset::PasswordResetToken;
pub use ent_post::{Post, PostQuery};
pub use ent_profile::{ProfileChanges, UserProfile};
pub use ent_refresh_token::RefreshToken;
pub use ent_user::User;
