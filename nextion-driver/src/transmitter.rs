//! Transmit side: instructions out, replies awaited
//!
//! Every instruction is written as ASCII followed by the three-byte
//! terminator. Replies come back through the receive side; [`Nextion`] takes
//! them from the response channel that [`EventReader`](crate::EventReader)
//! feeds.
//!
//! Which result codes the display sends depends on the `bkcmd` return level,
//! so the meaning of silence does too:
//!
//! | Level       | Reply on success | Reply on failure | No reply in time |
//! |-------------|------------------|------------------|------------------|
//! | `Off`       | none             | none             | not awaited      |
//! | `OnSuccess` | `0x01`           | none             | `Timeout`        |
//! | `OnFailure` | none             | error code       | success          |
//! | `Always`    | `0x01`           | error code       | `Timeout`        |

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::Write;
use nextion_protocol::command::{self, Command};
use nextion_protocol::{Response, ResponseText, ReturnLevel, Rgb565, TERMINATOR};

use crate::config::{DriverConfig, DEFAULT_RESPONSE_TIMEOUT_MS};
use crate::error::DriverError;

/// Command interface to one display
///
/// `Q` is the capacity of the response channel shared with the receive side.
pub struct Nextion<'a, W, D, M: RawMutex, const Q: usize> {
    tx: W,
    delay: D,
    responses: Receiver<'a, M, Response, Q>,
    return_level: ReturnLevel,
    response_timeout_ms: u32,
}

type TxResult<W, T = ()> = Result<T, DriverError<<W as embedded_io::ErrorType>::Error>>;

impl<'a, W, D, M, const Q: usize> Nextion<'a, W, D, M, Q>
where
    W: Write,
    D: DelayNs,
    M: RawMutex,
{
    /// Wrap the transmit half of a UART
    ///
    /// Until [`init`](Self::init) runs, the display is assumed to be at its
    /// factory return level, which only reports failures.
    pub fn new(tx: W, delay: D, responses: Receiver<'a, M, Response, Q>) -> Self {
        Self {
            tx,
            delay,
            responses,
            return_level: ReturnLevel::default(),
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }

    /// Apply the configured settings to the display
    pub async fn init(&mut self, config: &DriverConfig) -> TxResult<W> {
        info!("Display init: bkcmd={}", config.return_level.to_byte());
        self.response_timeout_ms = config.response_timeout_ms;
        self.send_command(&command::set_return_level(config.return_level)?)
            .await?;
        self.return_level = config.return_level;
        Ok(())
    }

    /// Return level the display has been set to
    pub fn return_level(&self) -> ReturnLevel {
        self.return_level
    }

    /// Send a raw instruction and check its result
    ///
    /// A failure code from the display is returned as
    /// [`DriverError::Rejected`].
    pub async fn send(&mut self, instruction: &str) -> TxResult<W> {
        self.write_instruction(instruction).await?;
        self.check_result().await
    }

    async fn send_command(&mut self, command: &Command) -> TxResult<W> {
        self.send(command.as_str()).await
    }

    async fn write_instruction(&mut self, instruction: &str) -> TxResult<W> {
        // Anything still queued answers an earlier instruction
        while let Ok(stale) = self.responses.try_receive() {
            debug!("Discarding stale response: {:?}", stale);
        }

        trace!("TX: {=str}", instruction);
        self.tx
            .write_all(instruction.as_bytes())
            .await
            .map_err(DriverError::Io)?;
        self.tx
            .write_all(&TERMINATOR)
            .await
            .map_err(DriverError::Io)?;
        self.tx.flush().await.map_err(DriverError::Io)
    }

    async fn next_response(&mut self) -> Option<Response> {
        let timeout = self.delay.delay_ms(self.response_timeout_ms);
        match select(self.responses.receive(), timeout).await {
            Either::First(response) => Some(response),
            Either::Second(()) => None,
        }
    }

    async fn check_result(&mut self) -> TxResult<W> {
        if self.return_level == ReturnLevel::Off {
            return Ok(());
        }

        match self.next_response().await {
            Some(Response::Result(code)) if code.is_success() => Ok(()),
            Some(Response::Result(code)) => {
                warn!("Instruction rejected: {:?}", code);
                Err(DriverError::Rejected(code))
            }
            Some(response) => {
                warn!("Unexpected response: {:?}", response);
                Err(DriverError::UnexpectedResponse)
            }
            None if self.return_level == ReturnLevel::OnFailure => Ok(()),
            None => Err(DriverError::Timeout),
        }
    }

    async fn query(&mut self, command: &Command) -> TxResult<W, Response> {
        self.write_instruction(command.as_str()).await?;

        match self.next_response().await {
            Some(Response::Result(code)) if code.is_success() => {
                Err(DriverError::UnexpectedResponse)
            }
            Some(Response::Result(code)) => {
                warn!("Query rejected: {:?}", code);
                Err(DriverError::Rejected(code))
            }
            Some(response) => Ok(response),
            None => Err(DriverError::Timeout),
        }
    }

    /// Bring a component to the front and redraw it
    pub async fn refresh(&mut self, component: &str) -> TxResult<W> {
        self.send_command(&command::refresh(component)?).await
    }

    /// Show or hide a component
    pub async fn set_visibility(&mut self, component: &str, visible: bool) -> TxResult<W> {
        self.send_command(&command::set_visibility(component, visible)?)
            .await
    }

    /// Show or hide every component on the current page
    pub async fn set_visibility_all(&mut self, visible: bool) -> TxResult<W> {
        self.send_command(&command::set_visibility_all(visible)?)
            .await
    }

    /// Enable or disable touch events for a component
    pub async fn set_touchable(&mut self, component: &str, touchable: bool) -> TxResult<W> {
        self.send_command(&command::set_touchable(component, touchable)?)
            .await
    }

    /// Enable or disable touch events for every component on the current page
    pub async fn set_touchable_all(&mut self, touchable: bool) -> TxResult<W> {
        self.send_command(&command::set_touchable_all(touchable)?)
            .await
    }

    pub async fn set_text(&mut self, component: &str, text: &str) -> TxResult<W> {
        self.send_command(&command::set_text(component, text)?)
            .await
    }

    pub async fn set_value(&mut self, component: &str, number: i32) -> TxResult<W> {
        self.send_command(&command::set_value(component, number)?)
            .await
    }

    pub async fn set_boolean(&mut self, component: &str, value: bool) -> TxResult<W> {
        self.send_command(&command::set_boolean(component, value)?)
            .await
    }

    /// Assign a quoted text to any component attribute
    pub async fn set_property_text(
        &mut self,
        component: &str,
        property: &str,
        text: &str,
    ) -> TxResult<W> {
        self.send_command(&command::set_property_text(component, property, text)?)
            .await
    }

    /// Assign a number to any component attribute
    pub async fn set_property_number(
        &mut self,
        component: &str,
        property: &str,
        number: i32,
    ) -> TxResult<W> {
        self.send_command(&command::set_property_number(component, property, number)?)
            .await
    }

    /// Assign a color to a component attribute such as `bco`
    pub async fn set_property_color(
        &mut self,
        component: &str,
        property: &str,
        color: Rgb565,
    ) -> TxResult<W> {
        self.send_command(&command::set_property_color(component, property, color)?)
            .await
    }

    /// Read a text attribute
    pub async fn get_property_text(
        &mut self,
        component: &str,
        property: &str,
    ) -> TxResult<W, ResponseText> {
        match self.query(&command::get_property(component, property)?).await? {
            Response::Text(text) => Ok(text),
            _ => Err(DriverError::UnexpectedResponse),
        }
    }

    /// Read a numeric attribute
    pub async fn get_property_number(
        &mut self,
        component: &str,
        property: &str,
    ) -> TxResult<W, i32> {
        match self.query(&command::get_property(component, property)?).await? {
            Response::Number(number) => Ok(number),
            _ => Err(DriverError::UnexpectedResponse),
        }
    }

    pub async fn get_text(&mut self, component: &str) -> TxResult<W, ResponseText> {
        self.get_property_text(component, "txt").await
    }

    pub async fn get_value(&mut self, component: &str) -> TxResult<W, i32> {
        self.get_property_number(component, "val").await
    }

    /// Read the `val` attribute; any non-zero value is true
    pub async fn get_boolean(&mut self, component: &str) -> TxResult<W, bool> {
        Ok(self.get_value(component).await? != 0)
    }

    /// Id of the active page
    pub async fn get_page(&mut self) -> TxResult<W, u8> {
        match self.query(&command::get_page()?).await? {
            Response::Page(page_id) => Ok(page_id),
            _ => Err(DriverError::UnexpectedResponse),
        }
    }

    /// Change the active page
    pub async fn set_page(&mut self, page_id: u8) -> TxResult<W> {
        self.send_command(&command::set_page(page_id)?).await
    }

    /// Redraw the current page
    pub async fn refresh_page(&mut self) -> TxResult<W> {
        self.send_command(&command::refresh_page()?).await
    }

    pub async fn set_sleep(&mut self, asleep: bool) -> TxResult<W> {
        self.send_command(&command::set_sleep(asleep)?).await
    }

    /// Backlight brightness in percent
    pub async fn set_brightness(&mut self, percent: u8) -> TxResult<W> {
        self.send_command(&command::set_brightness(percent)?).await
    }

    /// Give back the UART
    pub fn release(self) -> W {
        self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receiver::EventReader;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::channel::{Channel, Sender};
    use embedded_io::ErrorType;
    use nextion_protocol::{CommandError, DeviceState, Event, ResponseCode};
    use std::collections::VecDeque;
    use std::vec::Vec;

    type Events = Channel<NoopRawMutex, Event, 4>;
    type Responses = Channel<NoopRawMutex, Response, 4>;

    const SUCCESS: &[u8] = &[0x01, 0xFF, 0xFF, 0xFF];
    const INVALID_VARIABLE: &[u8] = &[0x1A, 0xFF, 0xFF, 0xFF];
    const INVALID_INSTRUCTION: &[u8] = &[0x00, 0xFF, 0xFF, 0xFF];
    const SILENCE: &[u8] = &[];

    /// Timer that expires as soon as it is polled
    struct NoDelay;

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Records everything written and answers each flushed instruction with
    /// the next scripted reply, decoded the same way the receive task does
    struct ScriptedDisplay<'a> {
        written: Vec<u8>,
        replies: VecDeque<&'static [u8]>,
        reader: EventReader<96>,
        events: Sender<'a, NoopRawMutex, Event, 4>,
        responses: Sender<'a, NoopRawMutex, Response, 4>,
    }

    impl<'a> ScriptedDisplay<'a> {
        fn new(
            replies: &[&'static [u8]],
            events: &'a Events,
            responses: &'a Responses,
        ) -> Self {
            Self {
                written: Vec::new(),
                replies: replies.iter().copied().collect(),
                reader: EventReader::new().unwrap(),
                events: events.sender(),
                responses: responses.sender(),
            }
        }
    }

    impl ErrorType for ScriptedDisplay<'_> {
        type Error = Infallible;
    }

    impl Write for ScriptedDisplay<'_> {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        async fn flush(&mut self) -> Result<(), Infallible> {
            if let Some(reply) = self.replies.pop_front() {
                self.reader.push(reply);
                self.reader.forward(&self.events, &self.responses);
            }
            Ok(())
        }
    }

    type TestDisplay<'a> = Nextion<'a, ScriptedDisplay<'a>, NoDelay, NoopRawMutex, 4>;

    fn scripted_display<'a>(
        replies: &[&'static [u8]],
        events: &'a Events,
        responses: &'a Responses,
    ) -> TestDisplay<'a> {
        let tx = ScriptedDisplay::new(replies, events, responses);
        Nextion::new(tx, NoDelay, responses.receiver())
    }

    fn with_level(level: ReturnLevel) -> DriverConfig {
        DriverConfig {
            return_level: level,
            ..DriverConfig::default()
        }
    }

    fn sent(display: TestDisplay<'_>) -> Vec<u8> {
        display.release().written
    }

    #[test]
    fn test_send_appends_terminator() {
        let (events, responses) = (Events::new(), Responses::new());
        let mut display = scripted_display(&[], &events, &responses);
        block_on(display.send("page 7")).unwrap();

        assert_eq!(sent(display), b"page 7\xFF\xFF\xFF");
    }

    #[test]
    fn test_init_sets_return_level() {
        let (events, responses) = (Events::new(), Responses::new());
        let mut display = scripted_display(&[], &events, &responses);
        assert_eq!(display.return_level(), ReturnLevel::OnFailure);

        block_on(display.init(&with_level(ReturnLevel::Always))).unwrap();

        assert_eq!(display.return_level(), ReturnLevel::Always);
        assert_eq!(sent(display), b"bkcmd=3\xFF\xFF\xFF");
    }

    #[test]
    fn test_commands_in_sequence() {
        let (events, responses) = (Events::new(), Responses::new());
        let mut display = scripted_display(&[], &events, &responses);
        block_on(async {
            display.set_page(2).await?;
            display.set_text("t0", "Porto").await?;
            display.set_value("n0", 21).await?;
            display.set_visibility("b1", false).await?;
            display.set_property_color("t0", "bco", Rgb565::BLACK).await
        })
        .unwrap();

        assert_eq!(
            sent(display),
            b"page 2\xFF\xFF\xFFt0.txt=\"Porto\"\xFF\xFF\xFFn0.val=21\xFF\xFF\xFFvis b1,0\xFF\xFF\xFFt0.bco=0\xFF\xFF\xFF"
        );
    }

    #[test]
    fn test_invalid_command_sends_nothing() {
        let (events, responses) = (Events::new(), Responses::new());
        let mut display = scripted_display(&[], &events, &responses);
        let result = block_on(display.refresh("b 1"));

        assert_eq!(result, Err(DriverError::Command(CommandError::InvalidName)));
        assert!(sent(display).is_empty());
    }

    #[test]
    fn test_rejected_instruction_is_an_error() {
        let (events, responses) = (Events::new(), Responses::new());
        let mut display = scripted_display(&[INVALID_VARIABLE, SILENCE], &events, &responses);

        assert_eq!(
            block_on(display.set_value("n9", 1)),
            Err(DriverError::Rejected(ResponseCode::InvalidVariable))
        );
        // The next instruction is judged on its own reply
        assert_eq!(block_on(display.set_value("n0", 1)), Ok(()));
    }

    #[test]
    fn test_invalid_instruction_is_not_a_restart() {
        let (events, responses) = (Events::new(), Responses::new());
        let mut display = scripted_display(&[INVALID_INSTRUCTION], &events, &responses);

        assert_eq!(
            block_on(display.send("bogus")),
            Err(DriverError::Rejected(ResponseCode::InvalidInstruction))
        );
        assert!(events.try_receive().is_err());
    }

    #[test]
    fn test_always_level_requires_success() {
        let (events, responses) = (Events::new(), Responses::new());
        // bkcmd=3 is acknowledged under the new level
        let replies = [SUCCESS, SUCCESS, SILENCE];
        let mut display = scripted_display(&replies, &events, &responses);

        block_on(display.init(&with_level(ReturnLevel::Always))).unwrap();
        assert_eq!(block_on(display.set_page(1)), Ok(()));
        assert_eq!(block_on(display.set_page(2)), Err(DriverError::Timeout));
    }

    #[test]
    fn test_on_success_level_treats_silence_as_failure() {
        let (events, responses) = (Events::new(), Responses::new());
        let mut display = scripted_display(&[SILENCE, SUCCESS, SILENCE], &events, &responses);

        block_on(display.init(&with_level(ReturnLevel::OnSuccess))).unwrap();
        assert_eq!(block_on(display.set_brightness(50)), Ok(()));
        assert_eq!(block_on(display.set_page(99)), Err(DriverError::Timeout));
    }

    #[test]
    fn test_off_level_does_not_wait() {
        let (events, responses) = (Events::new(), Responses::new());
        let mut display = scripted_display(&[SILENCE, INVALID_VARIABLE], &events, &responses);

        block_on(display.init(&with_level(ReturnLevel::Off))).unwrap();
        assert_eq!(block_on(display.set_value("n9", 1)), Ok(()));
    }

    #[test]
    fn test_get_value() {
        let (events, responses) = (Events::new(), Responses::new());
        let reply: &[u8] = &[0x71, 0x15, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF];
        let mut display = scripted_display(&[reply], &events, &responses);

        assert_eq!(block_on(display.get_value("n0")), Ok(21));
        assert_eq!(sent(display), b"get n0.val\xFF\xFF\xFF");
    }

    #[test]
    fn test_get_negative_value() {
        let (events, responses) = (Events::new(), Responses::new());
        let reply: &[u8] = &[0x71, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut display = scripted_display(&[reply], &events, &responses);

        assert_eq!(block_on(display.get_value("n0")), Ok(-1));
    }

    #[test]
    fn test_get_text() {
        let (events, responses) = (Events::new(), Responses::new());
        let reply: &[u8] = b"\x70Porto\xFF\xFF\xFF";
        let mut display = scripted_display(&[reply], &events, &responses);

        let text = block_on(display.get_text("t0")).unwrap();
        assert_eq!(text.as_str(), "Porto");
        assert_eq!(sent(display), b"get t0.txt\xFF\xFF\xFF");
    }

    #[test]
    fn test_get_boolean_and_page() {
        let (events, responses) = (Events::new(), Responses::new());
        let replies: [&[u8]; 2] = [
            &[0x71, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF],
            &[0x66, 0x07, 0xFF, 0xFF, 0xFF],
        ];
        let mut display = scripted_display(&replies, &events, &responses);

        assert_eq!(block_on(display.get_boolean("c0")), Ok(true));
        assert_eq!(block_on(display.get_page()), Ok(7));
        assert_eq!(sent(display), b"get c0.val\xFF\xFF\xFFsendme\xFF\xFF\xFF");
    }

    #[test]
    fn test_get_failures() {
        let (events, responses) = (Events::new(), Responses::new());
        let replies: [&[u8]; 3] = [
            &[0x02, 0xFF, 0xFF, 0xFF],
            SILENCE,
            &[0x71, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF],
        ];
        let mut display = scripted_display(&replies, &events, &responses);

        assert_eq!(
            block_on(display.get_value("x9")),
            Err(DriverError::Rejected(ResponseCode::InvalidComponent))
        );
        assert_eq!(block_on(display.get_value("n0")), Err(DriverError::Timeout));
        assert_eq!(
            block_on(display.get_text("n0")),
            Err(DriverError::UnexpectedResponse)
        );
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let (events, responses) = (Events::new(), Responses::new());
        let reply: &[u8] = &[0x71, 0x07, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF];
        let mut display = scripted_display(&[reply], &events, &responses);

        // Late answer to an earlier query that timed out
        responses.try_send(Response::Number(5)).unwrap();

        assert_eq!(block_on(display.get_value("n0")), Ok(7));
    }

    #[test]
    fn test_events_during_query_reach_event_channel() {
        let (events, responses) = (Events::new(), Responses::new());
        let reply: &[u8] = &[
            0x88, 0xFF, 0xFF, 0xFF, // ready notification
            0x71, 0x03, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
        ];
        let mut display = scripted_display(&[reply], &events, &responses);

        assert_eq!(block_on(display.get_value("n0")), Ok(3));
        assert_eq!(
            events.try_receive().ok(),
            Some(Event::Device(DeviceState::Ready))
        );
    }
}
