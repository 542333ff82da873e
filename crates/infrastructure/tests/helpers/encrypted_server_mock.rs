#![allow(dead_code)]
use super::dns_server_mock::{build_mock_response, serve_framed, MockBehavior};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use rustls::crypto::aws_lc_rs;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;

pub const DNS_MESSAGE: &str = "application/dns-message";

/// Shared log of what a mock server received.
pub type Seen<T> = Arc<Mutex<Vec<T>>>;

/// One HTTP request as the mock saw it. For GET requests `body` holds the
/// decoded `dns` parameter.
#[derive(Debug, Clone, Default)]
pub struct SeenRequest {
    pub method: String,
    pub path_and_query: String,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum H3Behavior {
    Answer,
    Status(u16),
    /// Accepts the request and never responds.
    Hang,
}

/// Self-signed certificate for `localhost`, TLS 1.3 only.
fn server_tls_config(alpn: &[&[u8]]) -> Arc<rustls::ServerConfig> {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert = certified.cert.der().clone();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
        certified.key_pair.serialize_der(),
    ));

    let mut config =
        rustls::ServerConfig::builder_with_provider(Arc::new(aws_lc_rs::default_provider()))
            .with_protocol_versions(&[&rustls::version::TLS13])
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![cert], key)
            .unwrap();
    config.alpn_protocols = alpn.iter().map(|p| p.to_vec()).collect();
    Arc::new(config)
}

fn quic_endpoint(alpn: &[u8]) -> std::io::Result<quinn::Endpoint> {
    let crypto =
        quinn::crypto::rustls::QuicServerConfig::try_from(server_tls_config(&[alpn])).unwrap();
    let config = quinn::ServerConfig::with_crypto(Arc::new(crypto));
    quinn::Endpoint::server(config, SocketAddr::from(([127, 0, 0, 1], 0)))
}

fn seen<T>() -> Seen<T> {
    Arc::new(Mutex::new(Vec::new()))
}

pub struct MockEncryptedServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockEncryptedServer {
    /// DNS-over-TLS: length-prefixed messages inside a TLS session.
    pub async fn tls(behavior: MockBehavior) -> std::io::Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let acceptor = TlsAcceptor::from(server_tls_config(&[]));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = listener.accept() => {
                        if let Ok((stream, _)) = result {
                            let acceptor = acceptor.clone();
                            tokio::spawn(async move {
                                if let Ok(tls) = acceptor.accept(stream).await {
                                    serve_framed(tls, behavior).await;
                                }
                            });
                        }
                    }
                }
            }
        });

        Ok(Self::running(addr, shutdown_tx))
    }

    /// DNS-over-HTTPS over HTTP/1.1. Replies with `status`; only 2xx
    /// responses carry a DNS message.
    pub async fn https(status: u16) -> std::io::Result<(Self, Seen<SeenRequest>)> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let acceptor = TlsAcceptor::from(server_tls_config(&[b"http/1.1".as_slice()]));
        let requests = seen();
        let log = requests.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = listener.accept() => {
                        if let Ok((stream, _)) = result {
                            let acceptor = acceptor.clone();
                            let log = log.clone();
                            tokio::spawn(async move {
                                if let Ok(tls) = acceptor.accept(stream).await {
                                    serve_http1(tls, status, log).await;
                                }
                            });
                        }
                    }
                }
            }
        });

        Ok((Self::running(addr, shutdown_tx), requests))
    }

    /// DNS-over-QUIC. Records the message ID of every query received.
    pub async fn quic() -> std::io::Result<(Self, Seen<u16>)> {
        let endpoint = quic_endpoint(b"doq")?;
        let addr = endpoint.local_addr()?;
        let ids = seen();
        let log = ids.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    incoming = endpoint.accept() => match incoming {
                        Some(incoming) => {
                            tokio::spawn(serve_doq(incoming, log.clone()));
                        }
                        None => break,
                    }
                }
            }
        });

        Ok((Self::running(addr, shutdown_tx), ids))
    }

    /// DNS-over-HTTP/3.
    pub async fn h3(behavior: H3Behavior) -> std::io::Result<(Self, Seen<SeenRequest>)> {
        let endpoint = quic_endpoint(b"h3")?;
        let addr = endpoint.local_addr()?;
        let requests = seen();
        let log = requests.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    incoming = endpoint.accept() => match incoming {
                        Some(incoming) => {
                            tokio::spawn(serve_h3(incoming, behavior, log.clone()));
                        }
                        None => break,
                    }
                }
            }
        });

        Ok((Self::running(addr, shutdown_tx), requests))
    }

    fn running(addr: SocketAddr, shutdown_tx: oneshot::Sender<()>) -> Self {
        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

impl Drop for MockEncryptedServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4)
}

async fn serve_http1<S>(mut stream: S, status: u16, log: Seen<SeenRequest>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let header = |name: &str| {
        head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    };
    let mut request_line = head.lines().next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let path_and_query = request_line.next().unwrap_or_default().to_string();
    let content_length: usize = header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => body.extend_from_slice(&chunk[..n]),
        }
    }
    body.truncate(content_length);

    let reply = if (200..300).contains(&status) {
        build_mock_response(&body, MockBehavior::Answer).unwrap_or_default()
    } else {
        Vec::new()
    };

    log.lock().unwrap().push(SeenRequest {
        method,
        path_and_query,
        accept: header("accept"),
        content_type: header("content-type"),
        body,
    });

    let response_head = format!(
        "HTTP/1.1 {} Mock\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        DNS_MESSAGE,
        reply.len()
    );
    let _ = stream.write_all(response_head.as_bytes()).await;
    let _ = stream.write_all(&reply).await;
    let _ = stream.flush().await;
    let _ = stream.shutdown().await;
}

async fn serve_doq(incoming: quinn::Incoming, log: Seen<u16>) {
    let Ok(connecting) = incoming.accept() else {
        return;
    };
    let Ok(connection) = connecting.await else {
        return;
    };

    // Serve streams until the client closes the connection
    while let Ok((mut send, mut recv)) = connection.accept_bi().await {
        let mut len_buf = [0u8; 2];
        if recv.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        if recv.read_exact(&mut query).await.is_err() {
            return;
        }
        log.lock()
            .unwrap()
            .push(u16::from_be_bytes([query[0], query[1]]));

        if let Some(response) = build_mock_response(&query, MockBehavior::Answer) {
            let mut framed = (response.len() as u16).to_be_bytes().to_vec();
            framed.extend_from_slice(&response);
            let _ = send.write_all(&framed).await;
            let _ = send.finish();
        }
    }
}

fn dns_parameter(uri: &http::Uri) -> Vec<u8> {
    uri.query()
        .and_then(|query| query.split('&').find_map(|pair| pair.strip_prefix("dns=")))
        .and_then(|value| URL_SAFE_NO_PAD.decode(value).ok())
        .unwrap_or_default()
}

async fn serve_h3(incoming: quinn::Incoming, behavior: H3Behavior, log: Seen<SeenRequest>) {
    let Ok(connecting) = incoming.accept() else {
        return;
    };
    let Ok(connection) = connecting.await else {
        return;
    };
    let Ok(mut h3_conn) =
        h3::server::Connection::<_, Bytes>::new(h3_quinn::Connection::new(connection)).await
    else {
        return;
    };

    while let Ok(Some(resolver)) = h3_conn.accept().await {
        let Ok((request, mut stream)) = resolver.resolve_request().await else {
            continue;
        };

        let query = dns_parameter(request.uri());
        log.lock().unwrap().push(SeenRequest {
            method: request.method().to_string(),
            path_and_query: request
                .uri()
                .path_and_query()
                .map(|p| p.to_string())
                .unwrap_or_default(),
            accept: request
                .headers()
                .get(http::header::ACCEPT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            content_type: None,
            body: query.clone(),
        });

        match behavior {
            H3Behavior::Hang => tokio::time::sleep(Duration::from_secs(30)).await,
            H3Behavior::Status(code) => {
                let response = http::Response::builder().status(code).body(()).unwrap();
                let _ = stream.send_response(response).await;
                let _ = stream.finish().await;
            }
            H3Behavior::Answer => {
                let body = build_mock_response(&query, MockBehavior::Answer).unwrap_or_default();
                let response = http::Response::builder()
                    .status(200)
                    .header(http::header::CONTENT_TYPE, DNS_MESSAGE)
                    .body(())
                    .unwrap();
                let _ = stream.send_response(response).await;
                let _ = stream.send_data(Bytes::from(body)).await;
                let _ = stream.finish().await;
            }
        }
    }
}
