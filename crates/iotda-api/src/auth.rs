use secrecy::SecretString;

/// Credentials for the IoTDA north-bound API.
///
/// The platform accepts either AK/SK-signed requests or a pre-issued IAM
/// token. This client supports the token form only; obtaining and renewing
/// the token is the caller's concern.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Project-scoped IAM token, sent as the `X-Auth-Token` header.
    Token(SecretString),
}

impl Credentials {
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(SecretString::from(token.into()))
    }
}
