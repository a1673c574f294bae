//! Run-time coordinator for a battery-powered Bluetooth beacon.
//!
//! This crate holds the hardware-independent core of the firmware, so it
//! can be tested on the host (no embedded hardware required):
//!
//! - [`dispatch`] - fans each radio-stack event out to its consumers in a
//!   fixed order,
//! - [`coordinator`] - the beacon mode state machine and its indicator lights,
//! - [`scheduler`] - the cooperative main loop: drain deferred work, flush
//!   diagnostics, sleep.
//!
//! Usage: `cargo test --lib` / `cargo test`
//!
//! Note: The embedded binary (`src/main.rs`, `embedded` feature) is
//! `#![no_std]` + `#![no_main]` and implements the [`traits`] on top of
//! Embassy and the SoftDevice.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod conn_params;
pub mod coordinator;
pub mod diag;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod mode;
pub mod queue;
pub mod scheduler;
pub mod traits;

#[cfg(test)]
mod mock;

pub use coordinator::Coordinator;
pub use error::{Error, StackError};
pub use events::{ButtonEvent, ConnHandle, ControlId, ProtocolNotification, StackEvent, WorkItem};
pub use mode::{BeaconMode, Indicator, IndicatorState};
pub use scheduler::MainLoop;
