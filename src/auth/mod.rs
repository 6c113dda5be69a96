//! Session handling for requests authenticated by the identity provider.
//!
//! The provider signs users in and stores a [Token] in a private cookie. This
//! module only consumes that cookie: [auth_guard] turns it into a [UserID] for
//! the route handlers, or rejects the request.

mod cookie;
mod middleware;
mod token;
mod user;

pub use cookie::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, set_auth_cookie};
pub use middleware::auth_guard;
pub use user::{User, UserID, create_user, create_user_table};
pub(crate) use token::Token;

#[cfg(test)]
pub use user::get_user_by_id;
