//! Remote content store client (Supabase PostgREST)

use crate::content::models::{Category, DevotionalUnit, Language};
use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use tracing::{debug, error, instrument, trace, warn};

const LOG_TARGET: &str = "lectio_player::content::api";

/// Table holding one row per (category, number, language).
const DECADES_TABLE: &str = "decades";

/// Error types for content store operations
#[derive(Debug)]
pub enum ContentError {
    Network(ReqwestError),
    Authentication(String),
    InvalidResponse(String),
    Other(String),
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentError::Network(e) => write!(f, "Network error: {}", e),
            ContentError::Authentication(msg) => write!(f, "Authentication error: {}", msg),
            ContentError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ContentError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl Error for ContentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ContentError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReqwestError> for ContentError {
    fn from(err: ReqwestError) -> Self {
        ContentError::Network(err)
    }
}

/// Read access to published devotional units.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Published units of a category in one language, ordered by their stored number.
    async fn published_units(
        &self,
        category: Category,
        language: Language,
        access_token: Option<&str>,
    ) -> Result<Vec<DevotionalUnit>, ContentError>;
}

/// Client for the Supabase REST and storage endpoints
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a new client for the project at `base_url`
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        let client = match Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!(target: LOG_TARGET, "Error creating HTTP client with timeout: {:?}. Falling back to default.", e);
                Client::new()
            }
        };

        let normalized_url = base_url.trim_end_matches('/').to_string();
        debug!(target: LOG_TARGET, "Created Supabase client for {}", normalized_url);

        SupabaseClient {
            client,
            base_url: normalized_url,
            anon_key: anon_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Public URL of an object in a storage bucket.
    pub fn public_object_url(&self, bucket: &str, object_path: &str) -> String {
        public_object_url(&self.base_url, bucket, object_path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        access_token: Option<&str>,
    ) -> Result<T, ContentError> {
        let bearer = access_token.unwrap_or(&self.anon_key);
        debug!(target: LOG_TARGET, "Sending GET request to: {}", url);

        let response = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ContentError> {
        let status = response.status();
        trace!(target: LOG_TARGET, "Response status: {}", status);

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str::<T>(&body).map_err(|e| {
                error!(target: LOG_TARGET, "JSON parsing error: {}. Body length: {} bytes", e, body.len());
                ContentError::InvalidResponse(format!("Failed to parse JSON response: {}", e))
            })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(target: LOG_TARGET, "Request failed. Status: {}, Body: {}", status, error_text);
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ContentError::Authentication(
                    format!("Authentication failed ({}): {}", status, error_text),
                )),
                _ => Err(ContentError::InvalidResponse(format!(
                    "Request failed with status {}: {}",
                    status, error_text
                ))),
            }
        }
    }
}

#[async_trait]
impl ContentStore for SupabaseClient {
    #[instrument(skip(self, access_token), fields(category = %category, language = %language))]
    async fn published_units(
        &self,
        category: Category,
        language: Language,
        access_token: Option<&str>,
    ) -> Result<Vec<DevotionalUnit>, ContentError> {
        let url = self.rest_url(DECADES_TABLE);
        let query = published_units_query(category, language);
        let units: Vec<DevotionalUnit> = self.get_json(&url, &query, access_token).await?;
        debug!(target: LOG_TARGET, "Fetched {} published units", units.len());
        Ok(units)
    }
}

/// PostgREST filter for the published rows of one category and language.
pub fn published_units_query(category: Category, language: Language) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("category", format!("eq.{}", category.as_str())),
        ("language", format!("eq.{}", language.code())),
        ("published", "eq.true".to_string()),
        ("order", "number.asc".to_string()),
    ]
}

/// Public URL of a storage object; every path segment is percent-encoded.
pub fn public_object_url(base_url: &str, bucket: &str, object_path: &str) -> String {
    let encoded_path = object_path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(bucket),
        encoded_path
    )
}
