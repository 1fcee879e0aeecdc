//! Value types shared across credentials: identifiers, scopes, and tokens.

pub mod id;
pub mod scope;
pub mod token;

pub use id::*;
pub use scope::*;
pub use token::*;
