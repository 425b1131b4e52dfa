use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GoogleSignInRequest {
    pub id_token: Option<String>,
}

// Payload returned by Google's tokeninfo endpoint for a valid ID token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleTokenInfo {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub aud: Option<String>,
    pub sub: Option<String>,
}
