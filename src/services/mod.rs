//! Services shared by the HTTP handlers

pub mod auth;

pub use auth::{AuthConfig, AuthService, Capability, LoginError, TokenInfo, TokenModel};
