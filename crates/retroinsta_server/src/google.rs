use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use retroinsta_common::errors::RetroInstaError;
use serde::Deserialize;

const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Claims extracted from a verified Google ID token
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    pub sub: String, // the unique Google user id
    pub email: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/**
 * Verifies Google ID tokens against Google's published signing keys.
 * The keys are fetched per login; there is no retry on transient failure.
 */
pub struct GoogleVerifier {
    client_id: String,
    http: reqwest::Client,
    certs_url: String,
}

impl GoogleVerifier {
    pub fn new(client_id: String) -> Self {
        Self {
            client_id,
            http: reqwest::Client::new(),
            certs_url: String::from(GOOGLE_CERTS_URL),
        }
    }

    /**
     * Verify an ID token and extract its identity claims.
     *
     * @param id_token - the signed assertion produced by Google Sign-In
     * @returns - the claims if the signature, audience and issuer all
     *            check out, InvalidToken otherwise. JWKS retrieval
     *            failures surface as KeySetError so the route can
     *            distinguish bad credentials from infrastructure faults.
     */
    pub async fn verify(&self, id_token: &str) -> Result<GoogleClaims, RetroInstaError> {
        let header =
            decode_header(id_token).map_err(|e| RetroInstaError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| RetroInstaError::InvalidToken(String::from("no key id in header")))?;

        let keys = self.fetch_keys().await?;
        let jwk = keys
            .keys
            .iter()
            .find(|key| key.kid == kid)
            .ok_or_else(|| RetroInstaError::InvalidToken(String::from("unknown signing key")))?;
        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| RetroInstaError::KeySetError(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.clone()]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let data = decode::<GoogleClaims>(id_token, &decoding_key, &validation)
            .map_err(|e| RetroInstaError::InvalidToken(e.to_string()))?;
        Ok(data.claims)
    }

    async fn fetch_keys(&self) -> Result<JwkSet, RetroInstaError> {
        let response = self
            .http
            .get(&self.certs_url)
            .send()
            .await
            .map_err(|e| RetroInstaError::KeySetError(e.to_string()))?;
        response
            .json::<JwkSet>()
            .await
            .map_err(|e| RetroInstaError::KeySetError(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn garbage_token_is_rejected_before_any_network_io() {
        let verifier = GoogleVerifier::new(String::from("test-client-id"));
        let result = verifier.verify("not-a-jwt").await;
        assert!(matches!(result, Err(RetroInstaError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn token_without_key_id_is_rejected() {
        // valid JWT structure (alg=none style header) but no kid claim
        let verifier = GoogleVerifier::new(String::from("test-client-id"));
        // header {"alg":"RS256","typ":"JWT"} / payload {} / empty signature
        let token = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.e30.";
        let result = verifier.verify(token).await;
        assert!(matches!(result, Err(RetroInstaError::InvalidToken(_))));
    }
}
