#![allow(dead_code)]
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// Address every mock reply carries in its single A record.
pub const MOCK_ANSWER: [u8; 4] = [93, 184, 216, 34];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Answer,
    /// Receives queries and never replies.
    Silent,
    /// Replies with a transaction ID that does not match the query.
    WrongId,
}

pub struct MockDnsServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn udp(behavior: MockBehavior) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            if let Some(response) = build_mock_response(&buf[..len], behavior) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub async fn tcp(behavior: MockBehavior) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = listener.accept() => {
                        if let Ok((stream, _)) = result {
                            tokio::spawn(serve_framed(stream, behavior));
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Answers one length-prefixed query on a stream (TCP, or TLS on top of it).
pub async fn serve_framed<S>(mut stream: S, behavior: MockBehavior)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut len_buf = [0u8; 2];
    if stream.read_exact(&mut len_buf).await.is_err() {
        return;
    }
    let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
    if stream.read_exact(&mut query).await.is_err() {
        return;
    }

    match build_mock_response(&query, behavior) {
        Some(response) => {
            let mut framed = (response.len() as u16).to_be_bytes().to_vec();
            framed.extend_from_slice(&response);
            let _ = stream.write_all(&framed).await;
            let _ = stream.flush().await;
        }
        // Keep the connection open so the client waits instead of seeing EOF
        None => tokio::time::sleep(Duration::from_secs(30)).await,
    }
}

/// Length of the question section starting at offset 12.
fn question_len(query: &[u8]) -> Option<usize> {
    let mut pos = 12;
    loop {
        let label_len = *query.get(pos)? as usize;
        pos += 1;
        if label_len == 0 {
            break;
        }
        pos += label_len;
    }
    let end = pos + 4;
    (end <= query.len()).then_some(end - 12)
}

/// Echoes the question and answers it with one A record pointing at
/// [`MOCK_ANSWER`]. The additional section of the query is not echoed.
pub fn build_mock_response(query: &[u8], behavior: MockBehavior) -> Option<Vec<u8>> {
    if behavior == MockBehavior::Silent {
        return None;
    }
    let question_len = question_len(query)?;

    let mut response = Vec::with_capacity(512);
    let id = u16::from_be_bytes([query[0], query[1]]);
    let id = match behavior {
        MockBehavior::WrongId => id.wrapping_add(1),
        _ => id,
    };
    response.extend_from_slice(&id.to_be_bytes());
    response.extend_from_slice(&[0x81, 0x80]);
    response.extend_from_slice(&[0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
    response.extend_from_slice(&query[12..12 + question_len]);
    response.extend_from_slice(&[0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x3c, 0x00, 0x04]);
    response.extend_from_slice(&MOCK_ANSWER);

    Some(response)
}
