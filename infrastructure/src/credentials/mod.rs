//! Bearer token sources.

mod env_token;

pub use env_token::EnvTokenProvider;
