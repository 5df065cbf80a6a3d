/// Authentication module
///
/// Password hashing, access-token issuance/verification, refresh-token
/// lifecycle, bearer extraction and the session flows built on them.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use bearer::extract_bearer;
pub use claims::Claims;
pub use jwt::issue_access_token;
pub use jwt::verify_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::issue_refresh_token;
pub use refresh_token::revoke_refresh_token;
pub use refresh_token::validate_refresh_token;
pub use session::{
    authenticate_request, current_user, login, refresh, register, revoke, update_credentials,
    SessionTokens,
};
