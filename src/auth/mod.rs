// Authentication module
// Manages the token lifecycle: password grant, refresh, bearer dispatch

mod grant;
mod manager;
mod types;

pub use manager::{Bearer, TokenManager, DEFAULT_REFRESH_MARGIN_SECS};
pub use types::{Credentials, GrantType, LoginCredentials, Token, TokenResponse};
