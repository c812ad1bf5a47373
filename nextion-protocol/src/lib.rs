//! Nextion Display Serial Protocol
//!
//! The host talks to a Nextion touch display over a UART. Commands go out as
//! ASCII instructions, and the display answers with binary notifications
//! (touches, touch coordinates, sleep/wake and other state changes) on the
//! same line.
//!
//! # Receive Framing
//!
//! Every notification the display emits has the same shape:
//! ```text
//! ┌──────┬─────────────┬────────────────┐
//! │ CODE │ PAYLOAD     │ TERMINATOR     │
//! │ 1B   │ 0, 3 or 5B  │ 0xFF 0xFF 0xFF │
//! └──────┴─────────────┴────────────────┘
//! ```
//!
//! Incoming bytes are appended to a [`RingBuffer`]. [`find_message_length`]
//! scans it for the first complete frame without consuming anything, and
//! [`assemble_event`] consumes that frame and turns it into an [`Event`].
//!
//! Replies to instructions (result codes and `get` values) share the line.
//! [`find_frame_length`] and [`assemble_message`] handle both kinds of frame
//! and separate replies from notifications.
//!
//! ```
//! use nextion_protocol::{assemble_event, find_message_length, Event, RingBuffer, TouchState};
//!
//! let mut rx = RingBuffer::<32>::new().unwrap();
//! rx.write(&[0x65, 0x01, 0x02, 0x01, 0xFF, 0xFF, 0xFF]);
//!
//! let len = find_message_length(&rx).unwrap();
//! let event = assemble_event(&mut rx, len).unwrap();
//! assert_eq!(
//!     event,
//!     Event::Touch { page_id: 1, component_id: 2, state: TouchState::Pressed }
//! );
//! assert!(rx.is_empty());
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod codes;
pub mod color;
pub mod command;
pub mod events;
pub mod frame;
pub mod response;
pub mod ring;

pub use codes::{TERMINATOR, TERMINATOR_BYTE, TERMINATOR_LEN};
pub use color::Rgb565;
pub use command::{Command, CommandError, ReturnLevel, MAX_COMMAND_LEN};
pub use events::{assemble_event, DecodeError, DeviceState, Event, EventKind, TouchState};
pub use frame::{find_frame_length, find_message_length, MAX_FRAME_LEN};
pub use response::{
    assemble_message, Message, Response, ResponseCode, ResponseText, MAX_TEXT_LEN,
};
pub use ring::{BufferError, RingBuffer};
