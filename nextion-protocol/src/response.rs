//! Replies to instructions
//!
//! Besides notifications, the display answers instructions on the same line:
//! a one-byte result code (which ones depends on the `bkcmd` return level)
//! and data replies to `get` and `sendme`. [`assemble_message`] tells replies
//! and notifications apart so each can go to whoever is waiting for it.
//!
//! Code 0x00 is shared. A bare `00 FF FF FF` is the invalid instruction
//! result, while the power-on notification carries padding
//! (`00 00 00 FF FF FF`).

use heapless::String;

use crate::codes::*;
use crate::events::{assemble_event, DecodeError, Event};
use crate::ring::{BufferError, RingBuffer};

/// Longest text reply that can be held, in bytes
pub const MAX_TEXT_LEN: usize = 64;

/// Text read back from a component attribute
pub type ResponseText = String<MAX_TEXT_LEN>;

/// Result of an instruction, as reported by the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseCode {
    InvalidInstruction,
    Success,
    InvalidComponent,
    InvalidPage,
    InvalidPicture,
    InvalidFont,
    InvalidFileOperation,
    InvalidCrc,
    InvalidBaudrate,
    InvalidWaveform,
    /// Unknown variable or attribute name
    InvalidVariable,
    /// Operation not allowed on this variable, e.g. assigning text to a number
    InvalidOperation,
    AssignmentFailed,
    EepromFailed,
    InvalidParameterCount,
    IoFailed,
    InvalidEscape,
    NameTooLong,
    /// The display's input buffer overflowed and the instruction was lost
    SerialBufferOverflow,
}

impl ResponseCode {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            RSP_INVALID_INSTRUCTION => Some(ResponseCode::InvalidInstruction),
            RSP_SUCCESS => Some(ResponseCode::Success),
            RSP_INVALID_COMPONENT => Some(ResponseCode::InvalidComponent),
            RSP_INVALID_PAGE => Some(ResponseCode::InvalidPage),
            RSP_INVALID_PICTURE => Some(ResponseCode::InvalidPicture),
            RSP_INVALID_FONT => Some(ResponseCode::InvalidFont),
            RSP_INVALID_FILE_OPERATION => Some(ResponseCode::InvalidFileOperation),
            RSP_INVALID_CRC => Some(ResponseCode::InvalidCrc),
            RSP_INVALID_BAUDRATE => Some(ResponseCode::InvalidBaudrate),
            RSP_INVALID_WAVEFORM => Some(ResponseCode::InvalidWaveform),
            RSP_INVALID_VARIABLE => Some(ResponseCode::InvalidVariable),
            RSP_INVALID_OPERATION => Some(ResponseCode::InvalidOperation),
            RSP_ASSIGNMENT_FAILED => Some(ResponseCode::AssignmentFailed),
            RSP_EEPROM_FAILED => Some(ResponseCode::EepromFailed),
            RSP_INVALID_PARAMETER_COUNT => Some(ResponseCode::InvalidParameterCount),
            RSP_IO_FAILED => Some(ResponseCode::IoFailed),
            RSP_INVALID_ESCAPE => Some(ResponseCode::InvalidEscape),
            RSP_NAME_TOO_LONG => Some(ResponseCode::NameTooLong),
            RSP_SERIAL_BUFFER_OVERFLOW => Some(ResponseCode::SerialBufferOverflow),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            ResponseCode::InvalidInstruction => RSP_INVALID_INSTRUCTION,
            ResponseCode::Success => RSP_SUCCESS,
            ResponseCode::InvalidComponent => RSP_INVALID_COMPONENT,
            ResponseCode::InvalidPage => RSP_INVALID_PAGE,
            ResponseCode::InvalidPicture => RSP_INVALID_PICTURE,
            ResponseCode::InvalidFont => RSP_INVALID_FONT,
            ResponseCode::InvalidFileOperation => RSP_INVALID_FILE_OPERATION,
            ResponseCode::InvalidCrc => RSP_INVALID_CRC,
            ResponseCode::InvalidBaudrate => RSP_INVALID_BAUDRATE,
            ResponseCode::InvalidWaveform => RSP_INVALID_WAVEFORM,
            ResponseCode::InvalidVariable => RSP_INVALID_VARIABLE,
            ResponseCode::InvalidOperation => RSP_INVALID_OPERATION,
            ResponseCode::AssignmentFailed => RSP_ASSIGNMENT_FAILED,
            ResponseCode::EepromFailed => RSP_EEPROM_FAILED,
            ResponseCode::InvalidParameterCount => RSP_INVALID_PARAMETER_COUNT,
            ResponseCode::IoFailed => RSP_IO_FAILED,
            ResponseCode::InvalidEscape => RSP_INVALID_ESCAPE,
            ResponseCode::NameTooLong => RSP_NAME_TOO_LONG,
            ResponseCode::SerialBufferOverflow => RSP_SERIAL_BUFFER_OVERFLOW,
        }
    }

    /// Returns true if the instruction was executed
    pub fn is_success(self) -> bool {
        matches!(self, ResponseCode::Success)
    }
}

/// A decoded reply to an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Instruction result code
    Result(ResponseCode),
    /// Current page id (`sendme`)
    Page(u8),
    /// Text attribute value (`get`)
    Text(ResponseText),
    /// Numeric attribute value (`get`)
    Number(i32),
}

/// Any frame the display sends
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message {
    /// Unsolicited notification
    Event(Event),
    /// Reply to an instruction
    Response(Response),
}

/// Returns true if a frame starting with `code` is a reply
fn is_response(code: u8, message_length: usize) -> bool {
    match code {
        RSP_INVALID_INSTRUCTION => message_length == RESULT_FRAME_LEN,
        RSP_PAGE | RSP_TEXT | RSP_NUMBER => true,
        _ => ResponseCode::from_code(code).is_some(),
    }
}

/// Consume one frame of `message_length` bytes and decode it as a reply or
/// a notification
///
/// Notifications are handed to [`assemble_event`]. Consumption follows the
/// same rules: the whole frame goes whether or not decoding succeeds, and a
/// length the buffer cannot satisfy consumes nothing.
pub fn assemble_message<const N: usize>(
    buffer: &mut RingBuffer<N>,
    message_length: usize,
) -> Result<Message, DecodeError> {
    if message_length == 0 {
        return Err(DecodeError::Buffer(BufferError::OutOfRange));
    }
    if message_length > buffer.len() {
        return Err(DecodeError::Buffer(BufferError::Underflow));
    }

    let code = buffer.peek_at(0)?;
    if !is_response(code, message_length) {
        return assemble_event(buffer, message_length).map(Message::Event);
    }

    let result = decode_response(buffer, code, message_length);
    buffer.consume(message_length)?;
    result.map(Message::Response)
}

fn decode_response<const N: usize>(
    buffer: &RingBuffer<N>,
    code: u8,
    message_length: usize,
) -> Result<Response, DecodeError> {
    let truncated = DecodeError::Truncated {
        code,
        length: message_length,
    };
    if message_length < RESULT_FRAME_LEN {
        return Err(truncated);
    }
    let payload_len = message_length - RESULT_FRAME_LEN;

    match code {
        RSP_PAGE => {
            if payload_len < PAGE_PAYLOAD_LEN {
                return Err(truncated);
            }
            Ok(Response::Page(buffer.peek_at(1)?))
        }
        RSP_NUMBER => {
            if payload_len < NUMBER_PAYLOAD_LEN {
                return Err(truncated);
            }
            let mut bytes = [0u8; NUMBER_PAYLOAD_LEN];
            for (i, byte) in bytes.iter_mut().enumerate() {
                *byte = buffer.peek_at(1 + i)?;
            }
            Ok(Response::Number(i32::from_le_bytes(bytes)))
        }
        RSP_TEXT => {
            let mut text = ResponseText::new();
            for offset in 1..=payload_len {
                // Latin-1: each byte is the code point of the same value
                let c = char::from(buffer.peek_at(offset)?);
                text.push(c).map_err(|_| DecodeError::TextTooLong {
                    length: message_length,
                })?;
            }
            Ok(Response::Text(text))
        }
        _ => ResponseCode::from_code(code)
            .map(Response::Result)
            .ok_or(DecodeError::UnknownCode(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DeviceState, TouchState};
    use crate::frame::find_frame_length;

    fn decode_one(bytes: &[u8]) -> Result<Message, DecodeError> {
        let mut buffer = RingBuffer::<96>::new().unwrap();
        buffer.write(bytes);
        let len = find_frame_length(&buffer).expect("complete frame");
        let result = assemble_message(&mut buffer, len);
        assert!(buffer.is_empty());
        result
    }

    fn response(bytes: &[u8]) -> Response {
        match decode_one(bytes) {
            Ok(Message::Response(response)) => response,
            other => panic!("expected a response, got {:?}", other),
        }
    }

    fn text(s: &str) -> Response {
        Response::Text(ResponseText::try_from(s).unwrap())
    }

    #[test]
    fn test_result_codes() {
        assert_eq!(
            response(&[0x01, 0xFF, 0xFF, 0xFF]),
            Response::Result(ResponseCode::Success)
        );
        assert_eq!(
            response(&[0x1A, 0xFF, 0xFF, 0xFF]),
            Response::Result(ResponseCode::InvalidVariable)
        );
        assert_eq!(
            response(&[0x24, 0xFF, 0xFF, 0xFF]),
            Response::Result(ResponseCode::SerialBufferOverflow)
        );
    }

    #[test]
    fn test_code_zero_depends_on_length() {
        assert_eq!(
            response(&[0x00, 0xFF, 0xFF, 0xFF]),
            Response::Result(ResponseCode::InvalidInstruction)
        );
        assert_eq!(
            decode_one(&[0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF]),
            Ok(Message::Event(Event::Device(DeviceState::Started)))
        );
    }

    #[test]
    fn test_page_reply() {
        assert_eq!(response(&[0x66, 0x07, 0xFF, 0xFF, 0xFF]), Response::Page(7));
    }

    #[test]
    fn test_number_reply_is_little_endian() {
        assert_eq!(
            response(&[0x71, 0x15, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF]),
            Response::Number(21)
        );
        assert_eq!(
            response(&[0x71, 0x01, 0x02, 0x00, 0x00, 0xFF, 0xFF, 0xFF]),
            Response::Number(0x0201)
        );
    }

    #[test]
    fn test_negative_number_reply() {
        // -1 is four 0xFF bytes, followed by the terminator
        assert_eq!(
            response(&[0x71, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]),
            Response::Number(-1)
        );
        assert_eq!(
            response(&[0x71, 0xEB, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]),
            Response::Number(-21)
        );
    }

    #[test]
    fn test_text_reply() {
        let mut bytes = vec![0x70];
        bytes.extend_from_slice(b"Lisbon");
        bytes.extend_from_slice(&TERMINATOR);

        assert_eq!(response(&bytes), text("Lisbon"));
        assert_eq!(
            response(&[0x70, 0xFF, 0xFF, 0xFF]),
            Response::Text(ResponseText::new())
        );
    }

    #[test]
    fn test_text_reply_latin1() {
        assert_eq!(
            response(&[0x70, b'S', 0xE3, b'o', 0xFF, 0xFF, 0xFF]),
            text("S\u{e3}o")
        );
    }

    #[test]
    fn test_text_reply_too_long_is_consumed() {
        let mut bytes = vec![0x70];
        bytes.extend(core::iter::repeat(b'x').take(MAX_TEXT_LEN + 1));
        bytes.extend_from_slice(&TERMINATOR);

        assert_eq!(
            decode_one(&bytes),
            Err(DecodeError::TextTooLong {
                length: bytes.len()
            })
        );
    }

    #[test]
    fn test_truncated_replies() {
        assert_eq!(
            decode_one(&[0x66, 0xFF, 0xFF, 0xFF]),
            Err(DecodeError::Truncated {
                code: 0x66,
                length: 4
            })
        );

        let mut buffer = RingBuffer::<16>::new().unwrap();
        buffer.write(&[0x71, 0x01, 0xFF, 0xFF, 0xFF]);
        assert_eq!(
            assemble_message(&mut buffer, 5),
            Err(DecodeError::Truncated {
                code: 0x71,
                length: 5
            })
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_notifications_pass_through() {
        assert_eq!(
            decode_one(&[0x65, 0x07, 0x04, 0x00, 0xFF, 0xFF, 0xFF]),
            Ok(Message::Event(Event::Touch {
                page_id: 7,
                component_id: 4,
                state: TouchState::Released,
            }))
        );
        assert_eq!(
            decode_one(&[0x42, 0xFF, 0xFF, 0xFF]),
            Err(DecodeError::UnknownCode(0x42))
        );
    }

    #[test]
    fn test_invalid_length_consumes_nothing() {
        let mut buffer = RingBuffer::<16>::new().unwrap();
        buffer.write(&[0x01, 0xFF, 0xFF, 0xFF]);

        assert_eq!(
            assemble_message(&mut buffer, 0),
            Err(DecodeError::Buffer(BufferError::OutOfRange))
        );
        assert_eq!(
            assemble_message(&mut buffer, 5),
            Err(DecodeError::Buffer(BufferError::Underflow))
        );
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_response_code_roundtrip() {
        for code in 0..=u8::MAX {
            if let Some(result) = ResponseCode::from_code(code) {
                assert_eq!(result.code(), code);
            }
        }
        assert!(ResponseCode::Success.is_success());
        assert!(!ResponseCode::InvalidInstruction.is_success());
    }
}
