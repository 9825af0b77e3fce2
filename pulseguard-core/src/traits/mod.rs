//! Core Traits and Abstractions for PulseGuard
//!
//! The core never talks to hardware or the network directly. Every
//! collaborator sits behind a trait so the same measurement code drives a
//! MAX3010x on a Raspberry Pi and a scripted source in tests.
//!
//! ## Module Organization
//!
//! - [`sensor`] - optical sample source contract
//! - [`peripherals`] - display, persistence API and alert LED
//!
//! ## Design Philosophy
//!
//! - **Owned handles**: the embedding application builds each collaborator
//!   once and moves it into the station; nothing is global
//! - **Static dispatch**: monitors and the station are generic over their
//!   collaborators, no trait objects on the sampling path
//! - **Blocking**: collaborators may block (I2C transfers, display
//!   countdowns, HTTP requests); cycles run on plain threads

pub mod peripherals;
pub mod sensor;

pub use peripherals::{AlertIndicator, Display, PersistenceApi, Placement};
pub use sensor::SampleSource;
