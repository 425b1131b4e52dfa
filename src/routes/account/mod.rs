pub mod auth;
pub mod google_auth;

pub use auth::*;
pub use google_auth::*;
