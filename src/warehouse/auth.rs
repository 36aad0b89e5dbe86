//! Bearer tokens for the BigQuery REST API.
//!
//! Resolution order: a static token from configuration, the key file named by
//! `GOOGLE_APPLICATION_CREDENTIALS`, gcloud's application default credentials
//! (`gcloud auth application-default login`), then the instance metadata
//! server (Cloud Run / GCE default service account). Token caching and
//! refresh are handled by the `yup-oauth2` authenticator.

use std::path::Path;

use serde::Deserialize;
use yup_oauth2::authenticator::{ApplicationDefaultCredentialsTypes, DefaultAuthenticator};
use yup_oauth2::{
    ApplicationDefaultCredentialsAuthenticator, ApplicationDefaultCredentialsFlowOpts,
    AuthorizedUserAuthenticator, ServiceAccountAuthenticator,
};

use super::WarehouseError;
use crate::config::WarehouseConfig;

pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

pub enum TokenSource {
    Static(String),
    ServiceAccount(DefaultAuthenticator),
    AuthorizedUser(DefaultAuthenticator),
    MetadataServer(DefaultAuthenticator),
}

/// Only the discriminator; the rest is parsed by `yup-oauth2`.
#[derive(Deserialize)]
struct CredentialFile {
    #[serde(rename = "type")]
    kind: String,
}

impl TokenSource {
    pub async fn from_config(config: &WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(token) = &config.access_token {
            return Ok(Self::Static(token.clone()));
        }
        if let Some(path) = &config.credentials_file {
            return Self::from_file(path).await;
        }
        if let Some(path) = &config.user_credentials_file {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Self::from_file(path).await;
            }
            tracing::debug!(path = %path.display(), "No gcloud credentials file");
        }
        Self::metadata_server().await
    }

    /// Service-account key or gcloud authorized-user file, chosen by its `type`.
    pub async fn from_file(path: &Path) -> Result<Self, WarehouseError> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| file_error(path, e))?;
        let file: CredentialFile = serde_json::from_slice(&raw).map_err(|e| file_error(path, e))?;

        match file.kind.as_str() {
            "service_account" => {
                let key = yup_oauth2::parse_service_account_key(&raw).map_err(|e| file_error(path, e))?;
                tracing::info!(
                    path = %path.display(),
                    client_email = %key.client_email,
                    "Using service account credentials"
                );
                let auth = ServiceAccountAuthenticator::builder(key)
                    .build()
                    .await
                    .map_err(|e| file_error(path, e))?;
                Ok(Self::ServiceAccount(auth))
            }
            "authorized_user" => {
                let secret = yup_oauth2::read_authorized_user_secret(path)
                    .await
                    .map_err(|e| file_error(path, e))?;
                tracing::info!(path = %path.display(), "Using gcloud user credentials");
                let auth = AuthorizedUserAuthenticator::builder(secret)
                    .build()
                    .await
                    .map_err(|e| file_error(path, e))?;
                Ok(Self::AuthorizedUser(auth))
            }
            other => Err(WarehouseError::Credentials(format!(
                "{}: unsupported credential type {other:?}",
                path.display()
            ))),
        }
    }

    async fn metadata_server() -> Result<Self, WarehouseError> {
        tracing::info!("Using metadata server credentials");
        let opts = ApplicationDefaultCredentialsFlowOpts::default();
        let auth = match ApplicationDefaultCredentialsAuthenticator::builder(opts).await {
            ApplicationDefaultCredentialsTypes::InstanceMetadata(builder) => builder.build().await,
            ApplicationDefaultCredentialsTypes::ServiceAccount(builder) => builder.build().await,
        }
        .map_err(|e| WarehouseError::Credentials(e.to_string()))?;
        Ok(Self::MetadataServer(auth))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Static(_) => "static",
            Self::ServiceAccount(_) => "service_account",
            Self::AuthorizedUser(_) => "authorized_user",
            Self::MetadataServer(_) => "metadata_server",
        }
    }

    pub async fn token(&self) -> Result<String, WarehouseError> {
        let auth = match self {
            Self::Static(token) => return Ok(token.clone()),
            Self::ServiceAccount(auth) | Self::AuthorizedUser(auth) | Self::MetadataServer(auth) => {
                auth
            }
        };
        let token = auth
            .token(&[BIGQUERY_SCOPE])
            .await
            .map_err(|e| WarehouseError::Credentials(e.to_string()))?;
        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| WarehouseError::Credentials("authenticator returned no access token".into()))
    }
}

fn file_error(path: &Path, err: impl std::fmt::Display) -> WarehouseError {
    WarehouseError::Credentials(format!("{}: {err}", path.display()))
}
