use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::{ContactStore, StorageError};
use crate::contact::{NewContact, StoredId};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Where the store gets the bearer token for each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// No authorization header (local emulator).
    None,
    /// A fixed OAuth access token.
    Static(String),
    /// Tokens minted from a service account key through the OAuth JWT-bearer grant.
    ServiceAccount(ServiceAccountKey),
    /// The metadata server available on GCE, Cloud Run and GKE.
    Metadata,
}

/// The signing half of a Google service account.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM encoded RSA private key.
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn new(client_email: impl Into<String>, private_key: impl Into<String>) -> Self {
        ServiceAccountKey {
            client_email: client_email.into(),
            private_key: private_key.into(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
        }
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub collection: String,
    /// Scheme and host of the REST endpoint, without a trailing slash.
    pub base_url: String,
    pub token: TokenSource,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        FirestoreConfig {
            project_id: project_id.into(),
            collection: "contacts".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token: TokenSource::Metadata,
        }
    }

    /// Point at an emulator listening on `host` (`localhost:8080`), without auth.
    pub fn emulator(mut self, host: &str) -> Self {
        self.base_url = format!("http://{}", host.trim_end_matches('/'));
        self.token = TokenSource::None;
        self
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.collection
        )
    }
}

/// Resolved [`TokenSource`], with the service account key already parsed.
enum Auth {
    None,
    Static(String),
    ServiceAccount {
        client_email: String,
        token_uri: String,
        key: EncodingKey,
    },
    Metadata,
}

impl Auth {
    fn new(source: TokenSource) -> Result<Self, StorageError> {
        Ok(match source {
            TokenSource::None => Auth::None,
            TokenSource::Static(token) => Auth::Static(token),
            TokenSource::Metadata => Auth::Metadata,
            TokenSource::ServiceAccount(account) => Auth::ServiceAccount {
                key: EncodingKey::from_rsa_pem(account.private_key.as_bytes())
                    .map_err(StorageError::Credentials)?,
                client_email: account.client_email,
                token_uri: account.token_uri,
            },
        })
    }
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct AccessToken {
    access_token: String,
    expires_in: u64,
}

#[derive(Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct CreatedDocument {
    name: String,
}

/// Inserts one Firestore document per contact through the REST API.
///
/// Firestore generates the document key, which is returned as the [`StoredId`].
/// Failed inserts are not retried.
pub struct FirestoreStore {
    http: reqwest::Client,
    documents_url: String,
    auth: Auth,
    cached: Mutex<Option<CachedToken>>,
}

impl FirestoreStore {
    /// Fails when the service account key is not a valid RSA PEM key.
    pub fn new(config: FirestoreConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(FirestoreStore {
            http,
            documents_url: config.documents_url(),
            auth: Auth::new(config.token)?,
            cached: Mutex::new(None),
        })
    }

    async fn bearer(&self) -> Result<Option<String>, StorageError> {
        match &self.auth {
            Auth::None => return Ok(None),
            Auth::Static(token) => return Ok(Some(token.clone())),
            Auth::ServiceAccount { .. } | Auth::Metadata => {}
        }

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.refresh_at > Instant::now()) {
            return Ok(Some(token.value.clone()));
        }

        let token = match &self.auth {
            Auth::ServiceAccount {
                client_email,
                token_uri,
                key,
            } => self.exchange_assertion(client_email, token_uri, key).await?,
            _ => self.metadata_token().await?,
        };
        tracing::debug!(expires_in = token.expires_in, "fetched document store access token");

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(Some(token.access_token))
    }

    async fn metadata_token(&self) -> Result<AccessToken, StorageError> {
        let response = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn exchange_assertion(
        &self,
        client_email: &str,
        token_uri: &str,
        key: &EncodingKey,
    ) -> Result<AccessToken, StorageError> {
        let iat = OffsetDateTime::now_utc().unix_timestamp();
        let claims = GrantClaims {
            iss: client_email,
            scope: DATASTORE_SCOPE,
            aud: token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, key)
            .map_err(StorageError::Credentials)?;

        let response = self
            .http
            .post(token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::TokenRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Encode a contact as Firestore typed fields.
fn document(contact: &NewContact) -> Result<Value, StorageError> {
    let received_at = contact
        .received_at
        .format(&Rfc3339)
        .map_err(|e| StorageError::Response(format!("unformattable timestamp: {e}")))?;

    Ok(json!({
        "fields": {
            "name": { "stringValue": contact.name },
            "email": { "stringValue": contact.email },
            "message": { "stringValue": contact.message },
            "receivedAt": { "timestampValue": received_at },
        }
    }))
}

#[async_trait]
impl ContactStore for FirestoreStore {
    async fn append(&self, contact: &NewContact) -> Result<StoredId, StorageError> {
        let mut request = self.http.post(&self.documents_url).json(&document(contact)?);
        if let Some(token) = self.bearer().await? {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedDocument = response.json().await?;
        match created.name.rsplit('/').next() {
            Some(key) if !key.is_empty() => Ok(StoredId::new(key)),
            _ => Err(StorageError::Response(format!(
                "document name without key: {}",
                created.name
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        "firestore"
    }
}
