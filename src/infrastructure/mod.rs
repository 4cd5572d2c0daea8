
// Core infrastructure modules
pub mod database;       // Connection pool and migrations
pub mod google_oauth;   // Google ID token verification
pub mod mailer;         // Outbound email
pub mod middleware;     // Viewer context middleware and extractor
pub mod security;       // Password hashing and token issuance
pub mod viewer;         // Viewer context

pub use database::{DbConnection, DbPool, DbTransaction};
pub use google_oauth::{GoogleIdentity, GoogleTokenVerifier, IdTokenVerifier};
pub use mailer::{EmailMessage, LogMailer, Mailer};
pub use middleware::Vc;
pub use security::TokenService;
pub use viewer::{AuthenticatedUser, ViewerContext};
