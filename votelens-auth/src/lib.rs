//! Credentials, session tokens and the page gate.
//!
//! - [`password`]: bcrypt hashing on the blocking pool
//! - [`token`]: HS256 session tokens carried in the `token` cookie
//! - [`gate`]: which paths need a session, and where to send visitors

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{gate, GateDecision};
pub use password::PasswordHasher;
pub use token::{Claims, TokenService};

/// Shortest password accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 6;
