use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("refresh tokens cannot be used to call the API")]
    NotAnAccessToken,
}

/// Verifies signature and expiry. Tokens are issued by the auth service,
/// never here.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?
    .claims;

    if claims.token_type != TokenType::Access {
        return Err(TokenError::NotAnAccessToken);
    }
    Ok(claims)
}
