//! Frame boundary detection
//!
//! Frame format:
//! - CODE (1 byte): event code, selects the payload shape
//! - PAYLOAD (0, 3 or 5 bytes): code-specific data
//! - TERMINATOR (3 bytes): 0xFF 0xFF 0xFF
//!
//! Boundaries are found from the terminator alone. A payload that happens to
//! contain three consecutive 0xFF bytes ends the frame early; the display
//! offers no escaping or length prefix to tell the two apart.

use crate::codes::{
    NUMBER_FRAME_LEN, RSP_NUMBER, TERMINATOR_BYTE, TERMINATOR_LEN, TOUCH_COORDINATE_PAYLOAD_LEN,
};
use crate::ring::RingBuffer;

/// Longest frame of any known event (CODE + touch coordinate PAYLOAD + TERMINATOR)
pub const MAX_FRAME_LEN: usize = 1 + TOUCH_COORDINATE_PAYLOAD_LEN + TERMINATOR_LEN;

/// Length of the first complete frame in `buffer`
///
/// Returns the number of bytes from the read position up to and including
/// the third consecutive terminator byte, or `None` if no terminator has been
/// received yet. Nothing is consumed, so repeated calls give the same answer
/// until the buffer changes.
pub fn find_message_length<const N: usize>(buffer: &RingBuffer<N>) -> Option<usize> {
    let mut run = 0;

    for (offset, byte) in buffer.iter().enumerate() {
        if byte == TERMINATOR_BYTE {
            run += 1;
            if run == TERMINATOR_LEN {
                return Some(offset + 1);
            }
        } else {
            run = 0;
        }
    }

    None
}

/// Length of the first complete frame, allowing for number replies
///
/// A number reply carries four raw bytes, so a value such as -1 puts 0xFF
/// bytes in front of the real terminator. A buffer starting with a number
/// reply code waits for the full fixed-size frame and takes it if it ends in
/// a terminator. Everything else is delimited by [`find_message_length`].
pub fn find_frame_length<const N: usize>(buffer: &RingBuffer<N>) -> Option<usize> {
    if buffer.peek_at(0) == Ok(RSP_NUMBER) {
        if buffer.len() < NUMBER_FRAME_LEN {
            return None;
        }
        let terminated = (NUMBER_FRAME_LEN - TERMINATOR_LEN..NUMBER_FRAME_LEN)
            .all(|offset| buffer.peek_at(offset) == Ok(TERMINATOR_BYTE));
        if terminated {
            return Some(NUMBER_FRAME_LEN);
        }
    }

    find_message_length(buffer)
}
