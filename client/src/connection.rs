//! Request/response channel to the server.
//!
//! A [`Connection`] dials lazily and keeps one TCP stream open. Any failure
//! during a call drops the stream, so the next call starts from a fresh
//! connection instead of reading half a frame left over from the last one.

use crate::error::ClientError;
use log::debug;
use shared::{read_frame, write_frame, Request, Response};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Connection {
    addr: String,
    stream: Option<TcpStream>,
    call_timeout: Duration,
}

impl Connection {
    pub fn new(addr: impl Into<String>) -> Self {
        Self::with_timeout(addr, DEFAULT_CALL_TIMEOUT)
    }

    pub fn with_timeout(addr: impl Into<String>, call_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            stream: None,
            call_timeout,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Sends one request and waits for its response.
    pub async fn call(&mut self, request: &Request) -> Result<Response, ClientError> {
        let result = match timeout(self.call_timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(self.call_timeout)),
        };

        if result.is_err() {
            self.stream = None;
        }
        result
    }

    async fn exchange(&mut self, request: &Request) -> Result<Response, ClientError> {
        if self.stream.is_none() {
            debug!("Connecting to {}", self.addr);
            let stream = TcpStream::connect(&self.addr).await?;
            stream.set_nodelay(true)?;
            self.stream = Some(stream);
        }
        let stream = self.stream.as_mut().ok_or(ClientError::Disconnected)?;

        write_frame(stream, request).await?;
        read_frame(stream).await?.ok_or(ClientError::Disconnected)
    }
}
