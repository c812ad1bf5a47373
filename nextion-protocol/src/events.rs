//! Asynchronous notifications from the display
//!
//! The first byte of a frame selects both the event variant and its payload
//! length through [`EventKind::from_code`]. Unknown codes are a decode
//! failure, but the frame is consumed anyway so the stream keeps moving.

use crate::codes::*;
use crate::ring::{BufferError, RingBuffer};

/// Display lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Powered on or reset
    Started,
    /// Entered sleep after the idle timeout
    AutoSleep,
    /// Woke up by itself (touch or serial data)
    AutoWake,
    /// Finished initialisation and accepts instructions
    Ready,
    /// Started a firmware upgrade from the microSD card
    Upgrading,
    /// Transparent data transfer completed
    TransparentDataFinished,
    /// Ready to receive transparent data
    TransparentDataReady,
}

/// Press state carried by touch notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchState {
    Released,
    Pressed,
}

impl TouchState {
    /// Parse a touch state from its wire byte
    ///
    /// The display only sends 0 or 1; anything else is treated as a press.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            TOUCH_RELEASED => TouchState::Released,
            _ => TouchState::Pressed,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            TouchState::Released => TOUCH_RELEASED,
            TouchState::Pressed => TOUCH_PRESSED,
        }
    }
}

/// A decoded display notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Lifecycle change, no payload
    Device(DeviceState),
    /// Press or release of a component
    Touch {
        page_id: u8,
        component_id: u8,
        state: TouchState,
    },
    /// Raw touch position in pixels
    TouchCoordinate {
        x: u16,
        y: u16,
        state: TouchState,
        /// The touch woke the display from sleep
        exited_sleep: bool,
    },
}

impl Event {
    /// Returns true if this is a press or release
    pub fn is_touch(&self) -> bool {
        matches!(self, Event::Touch { .. } | Event::TouchCoordinate { .. })
    }

    /// Returns true if this is a release of `component_id`
    pub fn is_release_of(&self, component_id: u8) -> bool {
        matches!(
            self,
            Event::Touch { component_id: id, state: TouchState::Released, .. }
                if *id == component_id
        )
    }
}

/// Payload shape selected by an event code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    Device(DeviceState),
    Touch,
    TouchCoordinate { exited_sleep: bool },
}

impl EventKind {
    /// Look up the shape of an event code
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            EVT_STARTED => Some(EventKind::Device(DeviceState::Started)),
            EVT_AUTO_SLEEP => Some(EventKind::Device(DeviceState::AutoSleep)),
            EVT_AUTO_WAKE => Some(EventKind::Device(DeviceState::AutoWake)),
            EVT_READY => Some(EventKind::Device(DeviceState::Ready)),
            EVT_UPGRADING => Some(EventKind::Device(DeviceState::Upgrading)),
            EVT_TRANSPARENT_DATA_FINISHED => {
                Some(EventKind::Device(DeviceState::TransparentDataFinished))
            }
            EVT_TRANSPARENT_DATA_READY => {
                Some(EventKind::Device(DeviceState::TransparentDataReady))
            }
            EVT_TOUCH => Some(EventKind::Touch),
            EVT_TOUCH_COORDINATE_AWAKE => Some(EventKind::TouchCoordinate {
                exited_sleep: false,
            }),
            EVT_TOUCH_COORDINATE_ASLEEP => Some(EventKind::TouchCoordinate {
                exited_sleep: true,
            }),
            _ => None,
        }
    }

    /// Convert back to the wire event code
    pub const fn code(self) -> u8 {
        match self {
            EventKind::Device(DeviceState::Started) => EVT_STARTED,
            EventKind::Device(DeviceState::AutoSleep) => EVT_AUTO_SLEEP,
            EventKind::Device(DeviceState::AutoWake) => EVT_AUTO_WAKE,
            EventKind::Device(DeviceState::Ready) => EVT_READY,
            EventKind::Device(DeviceState::Upgrading) => EVT_UPGRADING,
            EventKind::Device(DeviceState::TransparentDataFinished) => {
                EVT_TRANSPARENT_DATA_FINISHED
            }
            EventKind::Device(DeviceState::TransparentDataReady) => EVT_TRANSPARENT_DATA_READY,
            EventKind::Touch => EVT_TOUCH,
            EventKind::TouchCoordinate {
                exited_sleep: false,
            } => EVT_TOUCH_COORDINATE_AWAKE,
            EventKind::TouchCoordinate { exited_sleep: true } => EVT_TOUCH_COORDINATE_ASLEEP,
        }
    }

    /// Number of payload bytes between the code and the terminator
    pub const fn payload_len(self) -> usize {
        match self {
            EventKind::Device(_) => DEVICE_STATE_PAYLOAD_LEN,
            EventKind::Touch => TOUCH_PAYLOAD_LEN,
            EventKind::TouchCoordinate { .. } => TOUCH_COORDINATE_PAYLOAD_LEN,
        }
    }

    /// Full frame length: code, payload and terminator
    pub const fn frame_len(self) -> usize {
        1 + self.payload_len() + TERMINATOR_LEN
    }

    /// Build the event from its payload bytes
    ///
    /// `payload` must hold at least [`Self::payload_len`] bytes.
    fn decode(self, payload: &[u8]) -> Event {
        match self {
            EventKind::Device(state) => Event::Device(state),
            EventKind::Touch => Event::Touch {
                page_id: payload[0],
                component_id: payload[1],
                state: TouchState::from_byte(payload[2]),
            },
            EventKind::TouchCoordinate { exited_sleep } => Event::TouchCoordinate {
                x: u16::from_be_bytes([payload[0], payload[1]]),
                y: u16::from_be_bytes([payload[2], payload[3]]),
                state: TouchState::from_byte(payload[4]),
                exited_sleep,
            },
        }
    }
}

/// Errors that can occur while assembling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The event code is not one the display is known to send
    UnknownCode(u8),
    /// The frame is too short for the payload its code requires
    Truncated { code: u8, length: usize },
    /// A text reply does not fit in a [`ResponseText`](crate::response::ResponseText)
    TextTooLong { length: usize },
    /// The requested length is zero or exceeds the unread bytes
    Buffer(BufferError),
}

impl From<BufferError> for DecodeError {
    fn from(e: BufferError) -> Self {
        DecodeError::Buffer(e)
    }
}

/// Consume one frame of `message_length` bytes and decode it
///
/// `message_length` is normally the value returned by
/// [`find_message_length`](crate::frame::find_message_length). Exactly that
/// many bytes are consumed whether or not decoding succeeds. The only
/// exception is a length the buffer cannot satisfy, which is rejected with
/// [`DecodeError::Buffer`] before anything is consumed.
pub fn assemble_event<const N: usize>(
    buffer: &mut RingBuffer<N>,
    message_length: usize,
) -> Result<Event, DecodeError> {
    if message_length == 0 {
        return Err(DecodeError::Buffer(BufferError::OutOfRange));
    }
    if message_length > buffer.len() {
        return Err(DecodeError::Buffer(BufferError::Underflow));
    }

    let result = decode_frame(buffer, message_length);
    buffer.consume(message_length)?;
    result
}

fn decode_frame<const N: usize>(
    buffer: &RingBuffer<N>,
    message_length: usize,
) -> Result<Event, DecodeError> {
    let code = buffer.peek_at(0)?;
    let kind = EventKind::from_code(code).ok_or(DecodeError::UnknownCode(code))?;

    if message_length < kind.frame_len() {
        return Err(DecodeError::Truncated {
            code,
            length: message_length,
        });
    }

    let mut payload = [0u8; TOUCH_COORDINATE_PAYLOAD_LEN];
    for (i, slot) in payload.iter_mut().take(kind.payload_len()).enumerate() {
        *slot = buffer.peek_at(1 + i)?;
    }

    Ok(kind.decode(&payload))
}
