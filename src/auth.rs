//! Credential material: redacted secrets and the token handed from acquirer to executor.

pub mod secret;
pub mod token;

pub use secret::*;
pub use token::*;
