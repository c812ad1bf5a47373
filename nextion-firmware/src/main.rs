//! Nextion display demo firmware
//!
//! Brings up a Nextion display on UART0 of an RP2040 board, switches to the
//! demo page and reacts to releases of its button. Display notifications
//! are decoded in their own task and delivered to the application task
//! through a channel; replies to instructions travel back on a second one.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use nextion_driver::{DriverConfig, Nextion};

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Nextion demo starting...");

    let p = embassy_rp::init(Default::default());

    let config = DriverConfig::default();
    if let Err(e) = config.validate() {
        error!("Invalid display config: {:?}", e);
        return;
    }

    // Setup UART for display communication
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.baudrate;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", config.baudrate);

    spawner.spawn(tasks::display_rx_task(rx)).unwrap();
    let display = Nextion::new(tx, Delay, channels::RESPONSE_CHANNEL.receiver());
    spawner.spawn(tasks::app_task(display, config)).unwrap();

    info!("All tasks spawned");
}
