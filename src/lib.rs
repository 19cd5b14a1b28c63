//! # Motorcycle Bus Telemetry Aggregator
//!
//! Live state aggregator for a J1850-class motorcycle data bus. Holds the
//! latest decoded raw value of every vehicle signal, exposes unit-converted
//! read accessors, and notifies registered observers exactly when a value
//! changes.
//!
//! ## Features
//!
//! - **Change-gated dispatch**: idempotent writes are no-ops for observers
//! - **Exact fixed-point conversions**: raw bus units to imperial and metric
//! - **Trip odometer**: baseline capture with always-notified reset
//! - **Diagnostics pass-through**: corrupted/unrecognized frames delivered
//!   verbatim, plus a bounded frame log
//! - **Thread-tolerant**: per-signal atomic compare-and-store, snapshot
//!   dispatch concurrent with registration changes
//!
//! ## Quick Start
//!
//! ```rust
//! use motobus::VehicleData;
//!
//! let data = VehicleData::new();
//!
//! // The bus decoder writes raw values...
//! data.set_rpm(400);
//! data.set_speed(7680);
//!
//! // ...and anything else reads converted ones.
//! assert_eq!(data.rpm(), 100);
//! assert_eq!(data.speed_metric(), 60);
//! println!("{data}");
//! ```
//!
//! ## Architecture
//!
//! - [`state`] - the `VehicleData` aggregate and its accessors
//! - [`units`] - raw-to-imperial/metric conversion arithmetic
//! - [`listener`] - the observer capability interface
//! - [`registry`] - listener registration and dispatch
//! - [`snapshot`] - serializable point-in-time view
//! - [`diagnostics`] - bounded log of bad/unknown frames

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod diagnostics;
pub mod listener;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod units;

// Re-export main public types for convenience
pub use listener::VehicleDataListener;
pub use registry::{ListenerHandle, ListenerRegistry};
pub use snapshot::VehicleSnapshot;
pub use state::VehicleData;
