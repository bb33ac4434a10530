//! # mrex-nodetool - Configuration frames for MREx Ultra train nodes
//!
//! Composes short ASCII command frames from operator input (traction PID gains,
//! brake profile, controller mode) and writes them to a node over a serial link.
//!
//! ## Features
//!
//! - **Frame Encoding**: Pure conversion of a [`frame::ConfigRequest`] into a wire frame.
//! - **PID Presets**: Traction gains persisted to JSON with atomic replace-on-save.
//! - **Serial Transmit**: One frame per call at 9600 baud, with every failure reported as a value.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mrex_nodetool::frame::{ConfigRequest, ControllerMode};
//! use mrex_nodetool::presets::PresetStore;
//! use mrex_nodetool::programmer::NodeProgrammer;
//! use mrex_nodetool::transport::Transmitter;
//!
//! fn main() -> anyhow::Result<()> {
//!     let programmer = NodeProgrammer::new(PresetStore::new("pid_presets.json"), Transmitter::system());
//!     let request = ConfigRequest::Control { mode: ControllerMode::Auto };
//!     let outcome = programmer.configure("/dev/ttyUSB0", &request)?;
//!     println!("{}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`frame`] - Request types and the frame encoder
//! - [`presets`] - PID preset persistence
//! - [`transport`] - Serial transmitter and port enumeration
//! - [`programmer`] - Persist, encode and send in one action
//! - [`validation`] - Caller-side checks for free-text fields
//! - [`config`] - Configuration management

pub mod config;
pub mod error;
pub mod frame;
pub mod presets;
pub mod programmer;
pub mod transport;
pub mod validation;
