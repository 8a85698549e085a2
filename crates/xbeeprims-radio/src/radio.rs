use std::time::Duration;

use bytes::Bytes;
use xbeeprims_frame::{write_packet, ApiId, Frame, FrameReader, Packet, ReaderStats};
use xbeeprims_transport::ByteTransport;

use crate::config::{IoMode, RadioConfig, CHANNEL_RANGE, IO_PINS};
use crate::error::{RadioError, Result};

const ENTER_COMMAND_MODE: &[u8] = b"+++";

/// An owned connection to one radio module.
///
/// Holds the transport, the incremental frame reader and the frame-id
/// counter. Everything runs on the caller's thread; nothing here blocks
/// except writes and the sleeps in [`Radio::enter_api_mode`] and
/// [`Radio::wait_for_frame`].
#[derive(Debug)]
pub struct Radio<T> {
    transport: T,
    reader: FrameReader,
    config: RadioConfig,
    active: bool,
    frame_id: u8,
}

impl<T: ByteTransport> Radio<T> {
    /// Wrap a transport with the default configuration. The radio starts
    /// active.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, RadioConfig::default())
    }

    pub fn with_config(transport: T, config: RadioConfig) -> Self {
        Self {
            transport,
            reader: FrameReader::new(),
            config,
            active: true,
            frame_id: 0,
        }
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// Enable or disable the radio. Disabling drops any partial frame.
    pub fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        if !active {
            self.reader.reset();
        }
        tracing::info!(active, "radio state changed");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Switch the module from transparent mode into API mode.
    ///
    /// Sends `+++`, waits out the guard time, then `ATAP <mode>,CN` which
    /// sets the mode and leaves command mode in one line.
    pub fn enter_api_mode(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.transport.write_all(ENTER_COMMAND_MODE)?;
        self.transport.flush()?;
        self.transport.sleep_ms(duration_ms(self.config.guard_time));

        let command = format!("ATAP {:x},CN\r", self.config.api_mode);
        self.transport.write_all(command.as_bytes())?;
        self.transport.flush()?;
        tracing::info!(api_mode = self.config.api_mode, "switched module to API mode");
        Ok(())
    }

    /// Consume whatever bytes are ready; return a frame if one completed.
    pub fn poll(&mut self) -> Result<Option<Frame>> {
        self.ensure_active()?;
        Ok(self.reader.poll(&mut self.transport)?)
    }

    /// Encode and write one packet. Returns the bytes written.
    pub fn send(&mut self, packet: &Packet) -> Result<usize> {
        self.ensure_active()?;
        let written = write_packet(&mut self.transport, packet)?;
        tracing::debug!(api_id = %packet.api_id(), frame_id = ?packet.frame_id(), "packet sent");
        Ok(written)
    }

    /// Poll until a frame arrives, sleeping `poll_interval` between polls.
    pub fn wait_for_frame(&mut self, timeout: Duration) -> Result<Frame> {
        self.wait_for(timeout, |_| true)
    }

    /// Poll until a frame accepted by `accept` arrives. Other frames are
    /// dropped.
    pub fn wait_for(
        &mut self,
        timeout: Duration,
        mut accept: impl FnMut(&Frame) -> bool,
    ) -> Result<Frame> {
        let step = self.config.poll_interval.max(Duration::from_millis(1));
        let mut waited = Duration::ZERO;

        loop {
            while let Some(frame) = self.poll()? {
                if accept(&frame) {
                    return Ok(frame);
                }
                tracing::debug!(api_id = frame.api_id_byte(), "skipping unrelated frame");
            }
            if waited >= timeout {
                return Err(RadioError::Timeout(timeout));
            }
            self.transport.sleep_ms(duration_ms(step));
            waited += step;
        }
    }

    /// Next frame id, cycling through 1..=255. Zero asks the module not to
    /// reply, so it is never handed out.
    pub fn next_frame_id(&mut self) -> u8 {
        self.frame_id = match self.frame_id {
            u8::MAX => 1,
            id => id + 1,
        };
        self.frame_id
    }

    /// Send an AT command applied immediately. Returns its frame id.
    pub fn send_at_command(&mut self, command: &str, parameters: impl Into<Bytes>) -> Result<u8> {
        let frame_id = self.next_frame_id();
        let packet = Packet::at_command(frame_id, command, parameters)?;
        self.send(&packet)?;
        Ok(frame_id)
    }

    /// Send an AT command and wait for the matching response frame.
    pub fn at_request(
        &mut self,
        command: &str,
        parameters: impl Into<Bytes>,
        timeout: Duration,
    ) -> Result<Frame> {
        let frame_id = self.send_at_command(command, parameters)?;
        self.wait_for(timeout, |frame| {
            frame.api_id() == Some(ApiId::AtCommandResponse)
                && frame.payload().get(1) == Some(&frame_id)
        })
    }

    /// Set the function of pins `D0`..`D8`. Every mode is checked before
    /// anything is sent. Returns the frame id used for each pin.
    pub fn configure_ios(&mut self, modes: &[IoMode; IO_PINS]) -> Result<[u8; IO_PINS]> {
        if let Some((pin, &mode)) = modes
            .iter()
            .enumerate()
            .find(|(pin, mode)| !mode.supported_on(*pin))
        {
            return Err(RadioError::InvalidIoMode { pin, mode });
        }

        let mut frame_ids = [0u8; IO_PINS];
        for (pin, mode) in modes.iter().enumerate() {
            let command = format!("D{pin}");
            frame_ids[pin] = self.send_at_command(&command, vec![mode.value()])?;
        }
        tracing::debug!(?modes, ?frame_ids, "configured I/O pins");
        Ok(frame_ids)
    }

    /// Sample rate in milliseconds (`IR`). Zero disables periodic sampling.
    pub fn set_sample_rate(&mut self, rate_ms: u16) -> Result<u8> {
        self.send_at_command("IR", rate_ms.to_be_bytes().to_vec())
    }

    /// PAN id (`ID`).
    pub fn set_pan_id(&mut self, pan_id: u16) -> Result<u8> {
        self.send_at_command("ID", pan_id.to_be_bytes().to_vec())
    }

    /// RF channel (`CH`), 0x0B through 0x1A.
    pub fn set_channel(&mut self, channel: u8) -> Result<u8> {
        if !CHANNEL_RANGE.contains(&channel) {
            return Err(RadioError::InvalidChannel(channel));
        }
        self.send_at_command("CH", vec![channel])
    }

    /// 16-bit source address (`MY`).
    pub fn set_address(&mut self, address: u16) -> Result<u8> {
        self.send_at_command("MY", address.to_be_bytes().to_vec())
    }

    /// Persist the current configuration (`WR`).
    pub fn write_state_to_memory(&mut self) -> Result<u8> {
        self.send_at_command("WR", Bytes::new())
    }

    pub fn reader_stats(&self) -> ReaderStats {
        self.reader.stats()
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the radio and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn ensure_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(RadioError::Inactive)
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
