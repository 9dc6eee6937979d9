//! Authentication module - password and Google sign-in, JWT access tokens
//!
//! Provides:
//! - JWT token encoding/decoding (`jwt` submodule)
//! - Google OAuth2 authorization code flow (`google` submodule)
//! - Refresh token hashing and cookies (`refresh` submodule)
//! - Session issuing and access token re-issue (`session` submodule)
//! - The `require_auth` middleware and `AuthUser` extractor

pub mod extractor;
pub mod google;
pub mod jwt;
pub mod middleware;
pub mod refresh;
pub mod session;
