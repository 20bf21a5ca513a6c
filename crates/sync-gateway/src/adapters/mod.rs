//! Port implementations shipped with the gateway.

pub mod token;

pub use token::TokenResolver;
