//! HTTP connector for the PulseGuard backend
//!
//! ## Overview
//!
//! Blocking REST client on top of `ureq`. Stations run their cycles on
//! plain threads, so a blocking client keeps the call path simple: the
//! request happens on the thread that finished the cycle, after the
//! display already shows the result.
//!
//! ## Implementation Choices
//!
//! - JSON bodies only, serialized with `serde_json`
//! - One attempt per call, no retry or backoff
//! - Base URL validated once at construction
//! - Success and failure counters kept in [`ConnectionStats`]

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use pulseguard_core::{EnvironmentRecord, HealthRecord, PersistenceApi};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ConnectionStats;

/// Default backend address, the API running on the station itself
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// HTTP-specific errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network or transport failure
    #[error("Request failed: {0}")]
    Request(String),

    /// Server answered with an error status
    #[error("Server error {status}: {message}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Body could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// HTTP configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Custom headers sent with every request
    pub headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl HttpConfig {
    /// Configuration for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
            headers: HashMap::new(),
            user_agent: format!("PulseGuard/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Override the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Health row as returned by `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredHealthRecord {
    /// Row id
    pub id: i64,
    /// Heart rate (BPM)
    pub heart_rate: f64,
    /// Oxygen saturation (%)
    pub oxygen_saturation: f64,
    /// Insert time as formatted by the backend
    #[serde(default)]
    pub date_created: Option<String>,
}

/// Environment row as returned by `GET /env`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEnvironmentRecord {
    /// Row id
    pub id: i64,
    /// Temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Insert time as formatted by the backend
    #[serde(default)]
    pub date_created: Option<String>,
}

/// Answer of `POST /sms_alert`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsStatus {
    /// Delivery status reported by the SMS provider
    pub status: String,
}

/// Backend client implementing [`PersistenceApi`]
pub struct HttpPersistence {
    config: HttpConfig,
    agent: ureq::Agent,
    stats: Mutex<ConnectionStats>,
}

impl HttpPersistence {
    /// Create a client, rejecting base URLs without an http(s) scheme
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(HttpError::Config(
                "Base URL must start with http:// or https://".into(),
            ));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            stats: Mutex::new(ConnectionStats::default()),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Snapshot of the request counters
    pub fn stats(&self) -> ConnectionStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check that the backend is up
    pub fn ping(&self) -> Result<(), HttpError> {
        let answer: serde_json::Value = self.get("/ping")?;
        if answer.get("ping").and_then(|v| v.as_str()) == Some("pong") {
            Ok(())
        } else {
            Err(HttpError::Serialization(format!(
                "unexpected ping answer: {}",
                answer
            )))
        }
    }

    /// All stored health measurements
    pub fn fetch_health(&self) -> Result<Vec<StoredHealthRecord>, HttpError> {
        self.get("/health")
    }

    /// All stored environment measurements
    pub fn fetch_environment(&self) -> Result<Vec<StoredEnvironmentRecord>, HttpError> {
        self.get("/env")
    }

    /// Store an ambient reading
    pub fn store_environment(&self, record: &EnvironmentRecord) -> Result<(), HttpError> {
        self.post("/env", record).map(|_| ())
    }

    /// Ask the backend to send an SMS alert, returning the provider status
    pub fn request_sms_alert(&self, record: &HealthRecord) -> Result<SmsStatus, HttpError> {
        let answer = self.post("/sms_alert", record)?;
        serde_json::from_value(answer).map_err(|e| HttpError::Serialization(e.to_string()))
    }

    /// Send GET request and decode the JSON answer
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        let request = self.build_request(self.agent.get(&self.url(path)));
        let text = self.execute(request, None)?;

        serde_json::from_str(&text).map_err(|e| HttpError::Serialization(e.to_string()))
    }

    /// Send POST request with a JSON body
    pub fn post<T: Serialize>(&self, path: &str, data: &T) -> Result<serde_json::Value, HttpError> {
        let json = serde_json::to_string(data).map_err(|e| HttpError::Serialization(e.to_string()))?;
        let request = self.build_request(self.agent.post(&self.url(path)));
        let text = self.execute(request, Some(&json))?;

        if text.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| HttpError::Serialization(e.to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Attach custom and standard headers
    fn build_request(&self, mut request: ureq::Request) -> ureq::Request {
        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }

        request
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
    }

    /// Execute once and return the response body
    fn execute(&self, request: ureq::Request, body: Option<&str>) -> Result<String, HttpError> {
        debug!("{} {}", request.method(), request.url());

        let response = match body {
            Some(json) => request.send_string(json),
            None => request.call(),
        };

        let result = match response {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| HttpError::Request(e.to_string())),
            Err(ureq::Error::Status(status, resp)) => Err(HttpError::ServerError {
                status,
                message: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(HttpError::Request(e.to_string())),
        };

        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        match &result {
            Ok(_) => {
                stats.requests_sent += 1;
                stats.bytes_sent += body.map_or(0, |json| json.len() as u64);
            }
            Err(e) => {
                warn!("Backend request failed: {}", e);
                stats.requests_failed += 1;
                stats.last_error = Some(e.to_string());
            }
        }

        result
    }
}

impl PersistenceApi for HttpPersistence {
    type Error = HttpError;

    fn store_health(&mut self, record: &HealthRecord) -> Result<(), Self::Error> {
        self.post("/health", record).map(|_| ())
    }

    fn send_sms_alert(&mut self, record: &HealthRecord) -> Result<(), Self::Error> {
        let status = self.request_sms_alert(record)?;
        debug!("SMS alert status: {}", status.status);
        Ok(())
    }
}
