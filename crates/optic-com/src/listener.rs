use futures_util::StreamExt;
use std::net::SocketAddr;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio_websockets::{ServerBuilder, WebSocketStream};

use crate::{ComError, MAX_FRAME_SIZE};

/// Accepts inbound frame connections for the ingest side.
pub struct WsListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl WsListener {
    /// Bind a TCP listener for WebSocket connections.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, ComError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept one connection and perform the WebSocket handshake.
    ///
    /// # Errors
    ///
    /// `ComError::Io` on accept failure, `ComError::WebSocket` if the
    /// handshake fails. Callers that serve many connections log the error
    /// and keep accepting.
    pub async fn accept(&self) -> Result<(WsConnection, SocketAddr), ComError> {
        let (tcp_stream, addr) = self.listener.accept().await?;
        let (_request, ws_stream) = ServerBuilder::new().accept(tcp_stream).await?;
        Ok((
            WsConnection {
                stream: ws_stream,
                peer: addr,
            },
            addr,
        ))
    }

    /// Return the local address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// One accepted inbound connection.
pub struct WsConnection {
    stream: WebSocketStream<tokio::net::TcpStream>,
    peer: SocketAddr,
}

impl WsConnection {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Receive the next binary frame payload.
    ///
    /// Text messages and control frames are ignored; oversized binary
    /// messages are logged and skipped. Returns `Ok(None)` when the peer
    /// closes the connection cleanly.
    ///
    /// # Errors
    ///
    /// `ComError::WebSocket` if the connection fails mid-stream.
    pub async fn recv_frame(&mut self) -> Result<Option<Vec<u8>>, ComError> {
        loop {
            match self.stream.next().await {
                Some(Ok(msg)) => {
                    if msg.is_binary() {
                        let payload = msg.into_payload();
                        if payload.len() > MAX_FRAME_SIZE {
                            log::warn!(
                                "frame from {} too large: {} bytes, skipping",
                                self.peer,
                                payload.len()
                            );
                            continue;
                        }
                        return Ok(Some(payload.to_vec()));
                    }
                    // Ignore text messages and control frames
                }
                Some(Err(e)) => return Err(ComError::from(e)),
                None => return Ok(None),
            }
        }
    }
}
