//! Async driver for Nextion touch displays
//!
//! Works with any UART that implements the `embedded-io-async` traits. The
//! two halves are independent so they can live in separate tasks:
//!
//! - [`receive_events`] reads the receive half, reassembles frames in an
//!   [`EventReader`] and sends decoded [`Event`]s and [`Response`]s through
//!   two `embassy-sync` channels.
//! - [`Nextion`] formats instructions, writes them to the transmit half and
//!   waits on the response channel for result codes and `get` values.
//!
//! ```text
//! UART RX ──► EventReader ──┬──► Channel<Event> ─────► application
//!                           └──► Channel<Response> ──► Nextion
//! application ──► Nextion ──► UART TX
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This must go first so the macros are visible to the other modules
mod fmt;

pub mod config;
pub mod error;
pub mod receiver;
pub mod transmitter;

pub use config::{ConfigError, DriverConfig, DEFAULT_BAUDRATE, DEFAULT_RESPONSE_TIMEOUT_MS};
pub use error::DriverError;
pub use receiver::{receive_events, EventReader};
pub use transmitter::Nextion;

pub use nextion_protocol::{
    DeviceState, Event, Response, ResponseCode, ResponseText, ReturnLevel, Rgb565, TouchState,
};
