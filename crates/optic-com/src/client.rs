use futures_util::SinkExt;
use std::net::SocketAddr;
use tokio_websockets::{ClientBuilder, MaybeTlsStream, Message, WebSocketStream};

use crate::{ComError, MAX_FRAME_SIZE};

/// Outbound frame connection: one persistent WebSocket per session.
///
/// Each compressed frame goes out as a single binary message; the WebSocket
/// message boundary is the only framing on the wire.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl WsClient {
    /// Connect to an ingest endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ComError::Io` for an unparseable address and
    /// `ComError::WebSocket` if the handshake fails.
    pub async fn connect(addr: SocketAddr) -> Result<Self, ComError> {
        let uri: http::Uri = format!("ws://{}", addr).parse().map_err(|e| {
            ComError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid WebSocket URI: {e}"),
            ))
        })?;
        let (stream, _response) = ClientBuilder::from_uri(uri).connect().await?;

        Ok(Self { stream })
    }

    /// Send one frame payload as a binary message.
    ///
    /// # Errors
    ///
    /// `ComError::MessageTooLarge` if the payload exceeds `MAX_FRAME_SIZE`;
    /// `ComError::WebSocket` if the connection has failed.
    pub async fn send_frame(&mut self, payload: Vec<u8>) -> Result<(), ComError> {
        if payload.len() > MAX_FRAME_SIZE {
            return Err(ComError::MessageTooLarge(payload.len()));
        }
        self.stream.send(Message::binary(payload)).await?;
        Ok(())
    }

    /// Send a text message. The ingest side ignores these; out-of-band
    /// chatter never becomes a stored frame.
    pub async fn send_text(&mut self, text: &str) -> Result<(), ComError> {
        self.stream.send(Message::text(text.to_string())).await?;
        Ok(())
    }

    /// Close the connection cleanly.
    pub async fn close(&mut self) -> Result<(), ComError> {
        SinkExt::close(&mut self.stream).await?;
        Ok(())
    }
}
