//! # Configuration Utilities
//!
//! Configuration structures shared by the enclave client and the validation run.
//!
//! Every field has a default, so a configuration file is optional. Values are
//! resolved in this order: defaults, TOML file, environment (`ENCLAVE_URL`,
//! `SAS_URL`), then command-line flags applied by the binaries.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Enclave API used when neither the file nor the environment names one.
pub const DEFAULT_ENCLAVE_URL: &str = "https://enclaveapi.escrow.beekeeperai.com/";

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: AppConfig = load_config("config/validation.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Top-level configuration file layout.
///
/// # Example TOML
///
/// ```toml
/// [enclave]
/// url = "https://localhost:5000/"
/// timeout_secs = 30
/// accept_invalid_certs = true
///
/// [validation]
/// model_path = "models/multi-class-pg.json"
/// schema_path = "schema.json"
/// validate_before_post = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the enclave API lives and how to reach it
    pub enclave: EnclaveConfig,
    /// Settings for the classification run
    pub validation: ValidationConfig,
}

/// Connection settings for the enclave API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnclaveConfig {
    /// Base URL of the enclave API
    pub url: String,
    /// Shared-access-signature URL for sandbox blob access, in plain text.
    /// The client base64-encodes it on the wire.
    pub sas_url: Option<String>,
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
    /// Accept self-signed certificates (local enclaves serve `https://localhost`)
    pub accept_invalid_certs: bool,
}

impl Default for EnclaveConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENCLAVE_URL.to_string(),
            sas_url: None,
            timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

/// Settings for the COVID-19 X-ray classification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Pretrained model file
    pub model_path: PathBuf,
    /// Data steward's report schema, attached to the report when present
    pub schema_path: PathBuf,
    /// Name the report is posted under
    pub report_name: String,
    /// Ask the enclave to validate the report before posting it
    pub validate_before_post: bool,
    /// Also write the report JSON to this file
    pub report_output: Option<PathBuf>,
    /// Leave files outside covid/nofinding/pneumonia out of the metrics
    /// instead of scoring them as `covid`
    pub skip_unlabeled: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/multi-class-pg.json"),
            schema_path: PathBuf::from("schema.json"),
            report_name: "COVID-19 X-Ray Classification Report".to_string(),
            validate_before_post: false,
            report_output: None,
            skip_unlabeled: false,
        }
    }
}

impl AppConfig {
    /// Load the configuration file if one is given, then apply the process
    /// environment on top.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => load_config(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `ENCLAVE_URL` and `SAS_URL` overrides through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ENCLAVE_URL").filter(|v| !v.is_empty()) {
            self.enclave.url = url;
        }
        if let Some(sas_url) = lookup("SAS_URL").filter(|v| !v.is_empty()) {
            self.enclave.sas_url = Some(sas_url);
        }
    }
}
