//! Receive side: bytes in, events and replies out
//!
//! [`EventReader`] owns the receive buffer. The UART side pushes whatever
//! bytes arrived; the decode side pulls complete frames out one at a time.
//! [`receive_events`] ties both to an async UART and hands decoded frames to
//! two channels: notifications go to the application, replies to
//! instructions go to the [`Nextion`](crate::Nextion) waiting for them.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embedded_io_async::Read;
use nextion_protocol::{
    assemble_message, find_frame_length, BufferError, DecodeError, Event, Message, Response,
    RingBuffer,
};

use crate::error::DriverError;

/// Bytes requested from the UART per read
pub const RX_CHUNK_SIZE: usize = 32;

/// Receive buffer plus frame detection and decoding
pub struct EventReader<const N: usize> {
    buffer: RingBuffer<N>,
}

impl<const N: usize> EventReader<N> {
    /// Create a reader buffering up to `N` undecoded bytes
    ///
    /// Text replies are as long as the text they carry, so `N` bounds the
    /// longest `get` answer that can be received.
    pub fn new() -> Result<Self, BufferError> {
        Ok(Self {
            buffer: RingBuffer::new()?,
        })
    }

    /// Append received bytes
    ///
    /// Returns how many were kept. If the buffer overflows, the oldest
    /// undecoded bytes are dropped.
    pub fn push(&mut self, bytes: &[u8]) -> usize {
        let dropped_before = self.buffer.dropped();
        let accepted = self.buffer.write(bytes);

        let dropped = self.buffer.dropped().wrapping_sub(dropped_before);
        if dropped > 0 {
            warn!("RX buffer overflow, dropped {} bytes", dropped);
        }

        accepted
    }

    /// Decode the next complete frame, if one has arrived
    ///
    /// `None` means the buffered bytes do not yet hold a full frame. A frame
    /// that fails to decode is still removed from the buffer.
    pub fn next_message(&mut self) -> Option<Result<Message, DecodeError>> {
        let len = find_frame_length(&self.buffer)?;
        trace!("Frame: {} bytes", len);
        Some(assemble_message(&mut self.buffer, len))
    }

    /// Decode every complete frame, sending notifications to `events` and
    /// replies to `responses`
    ///
    /// Frames that do not fit in their channel and frames that fail to decode
    /// are logged and dropped. Returns the number of frames delivered.
    pub fn forward<M: RawMutex, const Q: usize, const R: usize>(
        &mut self,
        events: &Sender<'_, M, Event, Q>,
        responses: &Sender<'_, M, Response, R>,
    ) -> usize {
        let mut sent = 0;

        while let Some(result) = self.next_message() {
            match result {
                Ok(Message::Event(event)) => {
                    debug!("Event: {:?}", event);
                    if events.try_send(event).is_err() {
                        warn!("Event channel full, dropping event");
                    } else {
                        sent += 1;
                    }
                }
                Ok(Message::Response(response)) => {
                    debug!("Response: {:?}", response);
                    if responses.try_send(response).is_err() {
                        warn!("Response channel full, dropping response");
                    } else {
                        sent += 1;
                    }
                }
                Err(e) => {
                    warn!("Failed to decode frame: {:?}", e);
                }
            }
        }

        sent
    }

    /// Number of bytes waiting for a terminator
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes lost to buffer overflow
    pub fn dropped(&self) -> usize {
        self.buffer.dropped()
    }

    /// Discard all buffered bytes
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Read from `rx` until it reports end of stream, forwarding frames
///
/// Frames split across reads are reassembled in `reader`, so a caller that
/// restarts this loop after an error keeps any partial frame. A UART
/// error is returned to the caller; an embedded UART never reports end of
/// stream, so in firmware this only returns on error.
pub async fn receive_events<R, M, const N: usize, const Q: usize, const S: usize>(
    rx: &mut R,
    reader: &mut EventReader<N>,
    events: Sender<'_, M, Event, Q>,
    responses: Sender<'_, M, Response, S>,
) -> Result<(), DriverError<R::Error>>
where
    R: Read,
    M: RawMutex,
{
    let mut buf = [0u8; RX_CHUNK_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(0) => {
                debug!("RX stream closed");
                return Ok(());
            }
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error");
                return Err(DriverError::Io(e));
            }
        };

        trace!("RX: {} bytes", n);
        reader.push(&buf[..n]);
        reader.forward(&events, &responses);
    }
}
