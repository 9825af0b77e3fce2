//! Persistence connectors for PulseGuard stations
//!
//! ## Overview
//!
//! A station hands every completed measurement to a backend service which
//! stores it and, on alert, relays an SMS. The core only knows the
//! [`PersistenceApi`](pulseguard_core::PersistenceApi) trait; this crate
//! provides the adapters behind it.
//!
//! ### HTTP (feature `http`, default)
//!
//! JSON over plain REST, blocking, one request per call:
//!
//! | Method | Path | Body / Response |
//! |--------|------|-----------------|
//! | `POST` | `/health` | `{"heart_rate", "oxygen_saturation"}` |
//! | `GET` | `/health` | stored health rows |
//! | `POST` | `/sms_alert` | same body as `/health`, returns `{"status"}` |
//! | `POST` | `/env` | `{"temperature", "humidity"}` |
//! | `GET` | `/env` | stored environment rows |
//! | `GET` | `/ping` | `{"ping": "pong"}` |
//!
//! Requests are not retried. A failed call is reported to the caller,
//! which logs it and carries on; the next cycle simply tries again.
//!
//! ## Example Usage
//!
//! ```no_run
//! use pulseguard_connectors::http::{HttpConfig, HttpPersistence};
//! use pulseguard_core::{HealthRecord, PersistenceApi};
//!
//! let config = HttpConfig::new("http://192.168.1.20:8000").timeout_secs(5);
//! let mut api = HttpPersistence::new(config)?;
//!
//! api.ping()?;
//! api.store_health(&HealthRecord::new(72.0, 97.0))?;
//! # Ok::<(), pulseguard_connectors::http::HttpError>(())
//! ```

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpError, HttpPersistence};

/// Request counters common to all connectors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Requests answered with a success status
    pub requests_sent: u64,
    /// Requests that failed in transport or with an error status
    pub requests_failed: u64,
    /// Total request body bytes sent
    pub bytes_sent: u64,
    /// Last error message
    pub last_error: Option<String>,
}
