//! Serial line access with readline-with-timeout semantics.

use crate::config::SerialConfig;
use crate::error::{NavError, Result};
use serialport::{DataBits, Parity, SerialPort, StopBits};
use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

/// Bytes pulled from the port per `read` call.
const READ_CHUNK: usize = 64;

/// Frames longer than this are line noise; hand them to the parser as-is.
const MAX_FRAME_LEN: usize = 256;

/// A source of raw serial frames.
///
/// Allows swapping the real port for a scripted source in tests.
pub trait FrameSource: Send {
    /// Read one frame.
    ///
    /// Returns the bytes up to and including `\n`, or whatever arrived before
    /// the read timeout (possibly nothing).
    fn read_frame(&mut self) -> Result<Vec<u8>>;
}

/// Splits a byte stream into newline-terminated frames.
pub struct LineReader<R: Read + Send> {
    inner: R,
    timeout: Duration,
    pending: Vec<u8>,
}

impl<R: Read + Send> LineReader<R> {
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            pending: Vec::new(),
        }
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let rest = self.pending.split_off(pos + 1);
        Some(std::mem::replace(&mut self.pending, rest))
    }
}

impl<R: Read + Send> FrameSource for LineReader<R> {
    fn read_frame(&mut self) -> Result<Vec<u8>> {
        let started = Instant::now();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if let Some(line) = self.take_line() {
                return Ok(line);
            }
            if self.pending.len() >= MAX_FRAME_LEN || started.elapsed() >= self.timeout {
                return Ok(std::mem::take(&mut self.pending));
            }

            match self.inner.read(&mut chunk) {
                Ok(0) => return Ok(std::mem::take(&mut self.pending)),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => {
                    return Ok(std::mem::take(&mut self.pending));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(NavError::SerialRead {
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Open the GPS serial line (8 data bits, no parity, 1 stop bit).
///
/// # Errors
/// Returns `NavError::SerialOpen` if the device cannot be opened. This is the
/// only acquisition failure that aborts a run.
pub fn open_serial(config: &SerialConfig) -> Result<LineReader<Box<dyn SerialPort>>> {
    let port = serialport::new(&config.port, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .timeout(config.read_timeout())
        .open()
        .map_err(|e| NavError::SerialOpen {
            port: config.port.clone(),
            message: e.to_string(),
        })?;

    tracing::info!(
        port = %config.port,
        baud = config.baud_rate,
        "serial port opened"
    );
    Ok(LineReader::new(port, config.read_timeout()))
}

/// List serial ports visible to the system.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(|e| NavError::SerialOpen {
        port: "*".to_string(),
        message: format!("Failed to enumerate serial ports: {e}"),
    })?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
