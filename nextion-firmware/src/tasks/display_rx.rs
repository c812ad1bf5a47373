//! Display UART receive task
//!
//! Decodes frames from the display. Notifications go to the application,
//! replies go to whoever sent the instruction.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;

use nextion_driver::{receive_events, EventReader};

use crate::channels::{EVENT_CHANNEL, RESPONSE_CHANNEL};

/// Undecoded bytes held while waiting for a terminator, enough for the
/// longest text reply
const RX_BUF_SIZE: usize = 96;

/// Display RX task - receives and decodes frames from the display
#[embassy_executor::task]
pub async fn display_rx_task(mut rx: BufferedUartRx) {
    info!("Display RX task started");

    let mut reader = match EventReader::<RX_BUF_SIZE>::new() {
        Ok(reader) => reader,
        Err(e) => {
            error!("Failed to create RX buffer: {:?}", e);
            return;
        }
    };

    loop {
        // Partial frames survive in `reader` across restarts
        let result = receive_events(
            &mut rx,
            &mut reader,
            EVENT_CHANNEL.sender(),
            RESPONSE_CHANNEL.sender(),
        )
        .await;
        if let Err(e) = result {
            warn!("Display RX error: {:?}", e);
        }
    }
}
