// SPDX-License-Identifier: MIT

//! Thin IPC client: connects to the daemon's control socket, sends one
//! [`Request`], waits for one [`Response`] (spec.md §6, `cadence-wire`'s
//! framing protocol).

use crate::exit_error::ExitError;
use cadence_wire::{decode, encode, read_message, write_message, Request, Response};
use tokio::net::UnixStream;

pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    pub async fn connect(socket_path: &std::path::Path) -> Result<Self, ExitError> {
        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|_| ExitError::runtime(format!("cadenced is not running (no socket at {})", socket_path.display())))?;
        Ok(Self { stream })
    }

    pub async fn send(mut self, request: &Request) -> Result<Response, ExitError> {
        let payload = encode(request)?;
        write_message(&mut self.stream, &payload).await?;
        let reply = read_message(&mut self.stream).await?;
        Ok(decode(&reply)?)
    }
}
