//! Types shared by the fantasy relay crates

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
