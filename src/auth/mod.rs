//! Bearer-token access control.
//!
//! ## Components
//! - `token`: HS256 token issuing and validation
//! - `principal`: principal store and password verification
//! - `middleware`: the access gate wrapped around every protected route
//! - `handlers`: the login route
//! - `error`: authentication error types

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod principal;
pub mod token;

pub use error::{AuthError, TokenError, UnauthenticatedReason};
pub use middleware::{AuthenticatedPrincipal, access_gate, extract_bearer};
pub use principal::{PgPrincipalStore, Principal, PrincipalId, PrincipalStore, authenticate};
pub use token::{Claims, IssuedToken, TokenService};
