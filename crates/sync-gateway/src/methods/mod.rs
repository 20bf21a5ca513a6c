//! Built-in method definitions.

pub mod credits;

pub use credits::redeem_credit_code;
