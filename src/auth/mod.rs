//! Authentication module
//!
//! Fivetran authenticates every request with HTTP Basic credentials built
//! from an API key and an API secret.

mod credentials;

pub use credentials::Credentials;
