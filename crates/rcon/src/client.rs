//! RCON client: connect, authenticate, execute commands.

use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::error::RconError;
use crate::wire::{
    KIND_AUTH, KIND_AUTH_RESPONSE, KIND_EXEC_COMMAND, KIND_RESPONSE_VALUE, Packet, read_packet,
    write_packet,
};
use crate::{CONNECT_TIMEOUT, ROUND_TRIP_TIMEOUT};

/// Where and how to reach the server console.
#[derive(Debug, Clone)]
pub struct RconConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
}

/// An authenticated RCON session.
pub struct RconClient {
    stream: TcpStream,
    next_id: i32,
}

impl RconClient {
    /// Connects and runs the auth handshake. Both steps are bounded by
    /// timeouts; a wrong password yields [`RconError::AuthFailed`].
    pub async fn connect(config: &RconConfig) -> Result<Self, RconError> {
        let addr = format!("{}:{}", config.host, config.port);
        let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr))
            .await
            .map_err(|_| RconError::Timeout)??;
        debug!(%addr, "RCON connected");

        let mut client = Self { stream, next_id: 0 };
        client.authenticate(&config.password).await?;
        Ok(client)
    }

    /// Executes a console command and returns the server's response body.
    pub async fn send(&mut self, command: &str) -> Result<String, RconError> {
        let id = self.bump_id();
        write_packet(&mut self.stream, &Packet::new(id, KIND_EXEC_COMMAND, command)).await?;

        let response = tokio::time::timeout(
            ROUND_TRIP_TIMEOUT,
            read_expected(&mut self.stream, KIND_RESPONSE_VALUE),
        )
        .await
        .map_err(|_| RconError::Timeout)??;

        if response.id != id {
            return Err(RconError::Protocol(format!(
                "response id {} does not match request id {id}",
                response.id
            )));
        }
        Ok(response.body)
    }

    /// Broadcasts a chat message via the server's `say` command.
    pub async fn say(&mut self, text: &str) -> Result<(), RconError> {
        self.send(&format!("say {text}")).await?;
        Ok(())
    }

    async fn authenticate(&mut self, password: &str) -> Result<(), RconError> {
        let id = self.bump_id();
        write_packet(&mut self.stream, &Packet::new(id, KIND_AUTH, password)).await?;

        let response = tokio::time::timeout(
            ROUND_TRIP_TIMEOUT,
            read_expected(&mut self.stream, KIND_AUTH_RESPONSE),
        )
        .await
        .map_err(|_| RconError::Timeout)??;

        if response.id == -1 {
            return Err(RconError::AuthFailed);
        }
        if response.id != id {
            return Err(RconError::Protocol(format!(
                "auth response id {} does not match request id {id}",
                response.id
            )));
        }
        debug!("RCON authenticated");
        Ok(())
    }

    fn bump_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Reads packets until one of the expected kind arrives.
///
/// Some servers prepend an empty RESPONSE_VALUE before the auth response;
/// skipping unexpected kinds absorbs that.
async fn read_expected(stream: &mut TcpStream, kind: i32) -> Result<Packet, RconError> {
    loop {
        let packet = read_packet(stream).await?;
        if packet.kind == kind {
            return Ok(packet);
        }
        debug!(kind = packet.kind, "skipping interleaved RCON packet");
    }
}

/// One-shot broadcast: connect, authenticate, `say`, disconnect.
///
/// Every message uses its own short-lived session; nothing is shared between
/// calls.
pub async fn broadcast(config: &RconConfig, text: &str) -> Result<(), RconError> {
    let mut client = RconClient::connect(config).await?;
    client.say(text).await?;
    info!(chars = text.len(), "broadcast sent to game chat");
    Ok(())
}
