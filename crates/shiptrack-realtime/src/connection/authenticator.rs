//! Bearer credential verification for the push channel.

use std::sync::Arc;

use shiptrack_auth::jwt::{Claims, JwtDecoder};
use shiptrack_core::result::AppResult;

/// Verifies bearer credentials presented at the WebSocket handshake and in
/// join messages. There is no partial-auth state: verification either yields
/// full claims or the connection is rejected.
#[derive(Debug, Clone)]
pub struct ConnectionAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl ConnectionAuthenticator {
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Verifies a bearer token and returns the claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        self.decoder.decode_access_token(token)
    }
}
