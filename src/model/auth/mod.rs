mod session;
mod token;

pub use session::Session;
pub use token::{logged_in_cookie, AuthToken, AUTH_TOKEN_COOKIE, LOGGED_IN_COOKIE};
