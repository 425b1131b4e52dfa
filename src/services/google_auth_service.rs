use async_trait::async_trait;
use log::warn;

use crate::models::google_auth::GoogleTokenInfo;
use crate::services::{http_client, UpstreamError, UpstreamResult};

/// Verified identity behind a federated ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct FederatedIdentity {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    /// `None` when the token is invalid, expired or issued for another client.
    async fn verify(&self, id_token: &str) -> Option<FederatedIdentity>;
}

/// Validates Google ID tokens against the tokeninfo endpoint.
pub struct GoogleTokenInfoVerifier {
    http: reqwest::Client,
    tokeninfo_url: String,
    client_id: Option<String>,
}

impl GoogleTokenInfoVerifier {
    pub fn new(tokeninfo_url: String, client_id: Option<String>) -> Self {
        Self {
            http: http_client(10),
            tokeninfo_url,
            client_id,
        }
    }

    async fn fetch(&self, id_token: &str) -> UpstreamResult<GoogleTokenInfo> {
        let response = self
            .http
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IdTokenVerifier for GoogleTokenInfoVerifier {
    async fn verify(&self, id_token: &str) -> Option<FederatedIdentity> {
        let info = match self.fetch(id_token).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Google token verification failed: {}", e);
                return None;
            }
        };
        identity_from(info, self.client_id.as_deref())
    }
}

fn identity_from(info: GoogleTokenInfo, client_id: Option<&str>) -> Option<FederatedIdentity> {
    if let Some(expected) = client_id {
        if info.aud.as_deref() != Some(expected) {
            warn!("Google token issued for another client");
            return None;
        }
    }

    let email = info
        .email
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())?;

    Some(FederatedIdentity {
        email,
        name: info.name.filter(|name| !name.trim().is_empty()),
        picture: info.picture.filter(|picture| !picture.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str) -> GoogleTokenInfo {
        GoogleTokenInfo {
            email: Some(" Traveler@Example.com ".to_string()),
            name: Some("Traveler".to_string()),
            picture: Some(String::new()),
            aud: Some(aud.to_string()),
            sub: Some("123".to_string()),
        }
    }

    #[test]
    fn audience_is_checked_when_configured() {
        assert!(identity_from(info("other"), Some("mine")).is_none());

        let identity = identity_from(info("mine"), Some("mine")).unwrap();
        assert_eq!(identity.email, "traveler@example.com");
        assert_eq!(identity.picture, None);
    }

    #[test]
    fn tokens_without_email_are_rejected() {
        let mut info = info("any");
        info.email = None;
        assert!(identity_from(info, None).is_none());
    }
}
