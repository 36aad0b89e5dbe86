//! Runtime configuration, read once from the process environment.

use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Escalation Dashboard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project that owns the default tables (and bills the queries unless overridden).
pub const DEFAULT_PROJECT: &str = "prod-tech-project1-bv479-zo027";

pub const DEFAULT_NURSING_POD_TABLE: &str =
    "prod-tech-project1-bv479-zo027.gsheet_data.nursing_pod_quality_data";
pub const DEFAULT_IMPACT_CASES_TABLE: &str =
    "prod-tech-project1-bv479-zo027.gsheet_data.impact_cases";
pub const DEFAULT_CAMERA_EVENTS_TABLE: &str =
    "prod-tech-project1-bv479-zo027.mongodb.camera_annotation_events";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com";
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 60;

/// Written by `gcloud auth application-default login`.
const ADC_FILE_NAME: &str = "application_default_credentials.json";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Fully-qualified names of the three record tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRefs {
    pub nursing_pod: String,
    pub impact_cases: String,
    pub camera_events: String,
}

impl Default for TableRefs {
    fn default() -> Self {
        Self {
            nursing_pod: DEFAULT_NURSING_POD_TABLE.to_string(),
            impact_cases: DEFAULT_IMPACT_CASES_TABLE.to_string(),
            camera_events: DEFAULT_CAMERA_EVENTS_TABLE.to_string(),
        }
    }
}

/// Connection settings for the BigQuery REST client.
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseConfig {
    pub project: String,
    pub location: Option<String>,
    pub endpoint: String,
    /// Static bearer token; takes precedence over every credential file.
    pub access_token: Option<String>,
    /// Key file named by `GOOGLE_APPLICATION_CREDENTIALS`.
    pub credentials_file: Option<PathBuf>,
    /// Where gcloud keeps application default credentials. Used when it
    /// exists and no key file is configured; otherwise the metadata server.
    pub user_credentials_file: Option<PathBuf>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub development: bool,
    pub warehouse: WarehouseConfig,
    pub tables: TableRefs,
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                var: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("BIGQUERY_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "BIGQUERY_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_QUERY_TIMEOUT_SECS,
        };

        let development = [get("ENVIRONMENT"), get("FLASK_ENV")]
            .iter()
            .flatten()
            .any(|v| v.eq_ignore_ascii_case("development"));

        let defaults = TableRefs::default();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            development,
            warehouse: WarehouseConfig {
                project: get("BIGQUERY_PROJECT").unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
                location: get("BIGQUERY_LOCATION"),
                endpoint: get("BIGQUERY_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                access_token: get("BIGQUERY_ACCESS_TOKEN"),
                credentials_file: get("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
                user_credentials_file: gcloud_config_dir(&get).map(|dir| dir.join(ADC_FILE_NAME)),
                timeout: Duration::from_secs(timeout_secs),
            },
            tables: TableRefs {
                nursing_pod: get("NURSING_POD_TABLE").unwrap_or(defaults.nursing_pod),
                impact_cases: get("IMPACT_CASES_TABLE").unwrap_or(defaults.impact_cases),
                camera_events: get("CAMERA_EVENTS_TABLE").unwrap_or(defaults.camera_events),
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// gcloud's configuration directory: `CLOUDSDK_CONFIG`, else the platform default.
fn gcloud_config_dir<G>(get: &G) -> Option<PathBuf>
where
    G: Fn(&str) -> Option<String>,
{
    if let Some(dir) = get("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(dir));
    }
    if cfg!(windows) {
        get("APPDATA").map(|dir| PathBuf::from(dir).join("gcloud"))
    } else {
        get("HOME").map(|home| PathBuf::from(home).join(".config").join("gcloud"))
    }
}

/// Tracing filter used when `RUST_LOG` is not set.
pub fn default_log_filter(development: bool) -> &'static str {
    if development {
        "escalation_dashboard=debug,tower_http=debug,info"
    } else {
        "escalation_dashboard=info,warn"
    }
}
