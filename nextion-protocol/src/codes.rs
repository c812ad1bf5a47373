//! Wire values used by the display
//!
//! Event codes are the first byte of every asynchronous notification.

/// Byte repeated to close every frame
pub const TERMINATOR_BYTE: u8 = 0xFF;

/// Number of terminator bytes closing a frame
pub const TERMINATOR_LEN: usize = 3;

/// Complete terminator sequence
pub const TERMINATOR: [u8; TERMINATOR_LEN] = [TERMINATOR_BYTE; TERMINATOR_LEN];

// Device state notifications (no payload)
pub const EVT_STARTED: u8 = 0x00;
pub const EVT_AUTO_SLEEP: u8 = 0x86;
pub const EVT_AUTO_WAKE: u8 = 0x87;
pub const EVT_READY: u8 = 0x88;
pub const EVT_UPGRADING: u8 = 0x89;
pub const EVT_TRANSPARENT_DATA_FINISHED: u8 = 0xFD;
pub const EVT_TRANSPARENT_DATA_READY: u8 = 0xFE;

// Touch notifications
/// `[page_id][component_id][state]`
pub const EVT_TOUCH: u8 = 0x65;
/// `[x_hi][x_lo][y_hi][y_lo][state]` while the display was awake
pub const EVT_TOUCH_COORDINATE_AWAKE: u8 = 0x67;
/// Same payload as [`EVT_TOUCH_COORDINATE_AWAKE`], but the touch woke the display
pub const EVT_TOUCH_COORDINATE_ASLEEP: u8 = 0x68;

/// Payload lengths per notification shape
pub const DEVICE_STATE_PAYLOAD_LEN: usize = 0;
pub const TOUCH_PAYLOAD_LEN: usize = 3;
pub const TOUCH_COORDINATE_PAYLOAD_LEN: usize = 5;

/// Touch state byte for a release; every other value reads as a press
pub const TOUCH_RELEASED: u8 = 0x00;
/// Touch state byte for a press
pub const TOUCH_PRESSED: u8 = 0x01;

/// Component id addressing every component on the current page
pub const ALL_COMPONENTS_ID: u8 = 255;

// Instruction results, sent according to the `bkcmd` return level
pub const RSP_INVALID_INSTRUCTION: u8 = 0x00;
pub const RSP_SUCCESS: u8 = 0x01;
pub const RSP_INVALID_COMPONENT: u8 = 0x02;
pub const RSP_INVALID_PAGE: u8 = 0x03;
pub const RSP_INVALID_PICTURE: u8 = 0x04;
pub const RSP_INVALID_FONT: u8 = 0x05;
pub const RSP_INVALID_FILE_OPERATION: u8 = 0x06;
pub const RSP_INVALID_CRC: u8 = 0x09;
pub const RSP_INVALID_BAUDRATE: u8 = 0x11;
pub const RSP_INVALID_WAVEFORM: u8 = 0x12;
pub const RSP_INVALID_VARIABLE: u8 = 0x1A;
pub const RSP_INVALID_OPERATION: u8 = 0x1B;
pub const RSP_ASSIGNMENT_FAILED: u8 = 0x1C;
pub const RSP_EEPROM_FAILED: u8 = 0x1D;
pub const RSP_INVALID_PARAMETER_COUNT: u8 = 0x1E;
pub const RSP_IO_FAILED: u8 = 0x1F;
pub const RSP_INVALID_ESCAPE: u8 = 0x20;
pub const RSP_NAME_TOO_LONG: u8 = 0x23;
pub const RSP_SERIAL_BUFFER_OVERFLOW: u8 = 0x24;

// Data replies
/// `[page_id]`, answer to `sendme`
pub const RSP_PAGE: u8 = 0x66;
/// `[text bytes...]`, answer to `get` on a text attribute
pub const RSP_TEXT: u8 = 0x70;
/// `[b0][b1][b2][b3]` little-endian i32, answer to `get` on a numeric attribute
pub const RSP_NUMBER: u8 = 0x71;

pub const PAGE_PAYLOAD_LEN: usize = 1;
pub const NUMBER_PAYLOAD_LEN: usize = 4;

/// Length of an instruction result frame: CODE + TERMINATOR
pub const RESULT_FRAME_LEN: usize = 1 + TERMINATOR_LEN;

/// Length of a number reply frame: CODE + 4 value bytes + TERMINATOR
pub const NUMBER_FRAME_LEN: usize = 1 + NUMBER_PAYLOAD_LEN + TERMINATOR_LEN;
