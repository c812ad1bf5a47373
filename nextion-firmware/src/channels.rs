//! Inter-task communication channels

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use nextion_protocol::{Event, Response};

/// Channel capacity for display events
const EVENT_CHANNEL_SIZE: usize = 8;

/// Channel capacity for instruction replies
pub const RESPONSE_CHANNEL_SIZE: usize = 2;

/// Decoded notifications from the display (touches, sleep/wake, ...)
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Event, EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Replies to instructions, consumed by the task that owns the `Nextion`
pub static RESPONSE_CHANNEL: Channel<CriticalSectionRawMutex, Response, RESPONSE_CHANNEL_SIZE> =
    Channel::new();
