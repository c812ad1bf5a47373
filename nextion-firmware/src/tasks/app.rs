//! Demo application task
//!
//! Switches to the demo page and waits for releases of its button. On each
//! release it reads the city and temperature the user entered, logs them and
//! updates a release counter on the display.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Delay, Timer};

use nextion_driver::{DeviceState, DriverConfig, DriverError, Event, Nextion, Rgb565};

use crate::channels::{EVENT_CHANNEL, RESPONSE_CHANNEL_SIZE};

/// The display as seen by this task
pub type Display =
    Nextion<'static, BufferedUartTx, Delay, CriticalSectionRawMutex, RESPONSE_CHANNEL_SIZE>;

type DisplayResult<T = ()> = Result<T, DriverError<embassy_rp::uart::Error>>;

/// Time the display needs after power-on before it accepts instructions
const STARTUP_DELAY_MS: u64 = 500;

/// Page holding the demo components
const DEMO_PAGE: u8 = 7;

/// Component id of the button we listen to
const BUTTON_ID: u8 = 4;

/// Application task - drives the display and reacts to its events
#[embassy_executor::task]
pub async fn app_task(mut display: Display, config: DriverConfig) {
    info!("App task started");

    Timer::after_millis(STARTUP_DELAY_MS).await;
    setup_display(&mut display, &config).await;

    let mut releases: i32 = 0;

    loop {
        let event = EVENT_CHANNEL.receive().await;

        match event {
            Event::Device(DeviceState::Ready) => {
                // Only sent after power-on or reset; settings and page are gone
                info!("Display ready");
                setup_display(&mut display, &config).await;
            }
            Event::Device(state) => {
                debug!("Display state: {:?}", state);
            }
            event if event.is_release_of(BUTTON_ID) => {
                releases = releases.wrapping_add(1);
                info!("Button released ({} times)", releases);

                if let Err(e) = read_inputs(&mut display).await {
                    warn!("Failed to read inputs: {:?}", e);
                }
                if let Err(e) = show_releases(&mut display, releases).await {
                    warn!("Failed to update display: {:?}", e);
                }
            }
            Event::TouchCoordinate {
                x, y, exited_sleep, ..
            } => {
                trace!("Touch at ({}, {}), woke display: {}", x, y, exited_sleep);
            }
            event => {
                trace!("Ignoring {:?}", event);
            }
        }
    }
}

async fn setup_display(display: &mut Display, config: &DriverConfig) {
    if let Err(e) = display.init(config).await {
        warn!("Display init failed: {:?}", e);
    }
    if let Err(e) = display.set_page(DEMO_PAGE).await {
        warn!("Failed to change page: {:?}", e);
    }
}

async fn read_inputs(display: &mut Display) -> DisplayResult {
    let city = display.get_text("t0").await?;
    let temperature = display.get_value("n0").await?;

    info!("City: {=str}", city.as_str());
    info!("Temperature: {}", temperature);
    Ok(())
}

async fn show_releases(display: &mut Display, releases: i32) -> DisplayResult {
    display.set_value("n1", releases).await?;
    display.set_text("t1", "Released").await?;
    display.set_property_color("t1", "pco", Rgb565::GREEN).await
}
