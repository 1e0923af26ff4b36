//! HTTP/1.1 fetcher: plain TCP for `http`, rustls for `https`

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HOST, HeaderValue};
use http_body_util::{BodyExt, Empty};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use url::{Position, Url};

use super::{AbortSignal, Fetcher};
use crate::error::constructors::BoxError;
use crate::error::{self, Result};
use crate::http::{HttpResponse, InterceptedRequest, ResponseKind};

/// Fetcher opening one connection per request
///
/// Honours the abort signal by dropping the in-flight exchange together
/// with its connection.
#[derive(Clone)]
pub struct HttpFetcher {
    tls: TlsConnector,
}

impl HttpFetcher {
    /// Fetcher trusting the bundled webpki root set
    ///
    /// # Errors
    ///
    /// Returns `Kind::Config` if the TLS client configuration is rejected.
    pub fn new() -> Result<Self> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Self::with_root_certificates(roots)
    }

    /// Fetcher trusting exactly `roots`
    ///
    /// # Errors
    ///
    /// Returns `Kind::Config` if the TLS client configuration is rejected.
    pub fn with_root_certificates(roots: RootCertStore) -> Result<Self> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let mut config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(error::configuration)?
            .with_root_certificates(roots)
            .with_no_client_auth();
        config.alpn_protocols = vec![b"http/1.1".to_vec()];

        Ok(Self {
            tls: TlsConnector::from(Arc::new(config)),
        })
    }

    async fn send(&self, request: &InterceptedRequest) -> Result<HttpResponse> {
        let url = request.url();
        let tls = match url.scheme() {
            "http" => false,
            "https" => true,
            other => {
                return Err(error::invalid_request(format!("unsupported scheme {other}"))
                    .with_url(url.clone()));
            }
        };
        let host = url
            .host_str()
            .ok_or_else(|| error::invalid_request("request URL has no host").with_url(url.clone()))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let port = url
            .port_or_known_default()
            .ok_or_else(|| error::invalid_request("request URL has no port").with_url(url.clone()))?;

        let tcp = TcpStream::connect((host, port))
            .await
            .map_err(|e| network(e, url))?;

        if !tls {
            return exchange(tcp, request).await;
        }

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| error::invalid_request(e).with_url(url.clone()))?;
        let stream = self
            .tls
            .connect(server_name, tcp)
            .await
            .map_err(|e| network(e, url))?;
        exchange(stream, request).await
    }
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher").finish_non_exhaustive()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &InterceptedRequest, signal: AbortSignal) -> Result<HttpResponse> {
        tokio::select! {
            biased;
            () = signal.aborted() => {
                tracing::debug!(target: "cachegate::fetch", url = %request.url(), "Fetch aborted");
                Err(error::aborted(request.url().clone()))
            }
            result = self.send(request) => result,
        }
    }
}

fn network<E: Into<BoxError>>(e: E, url: &Url) -> error::Error {
    error::network(e).with_url(url.clone())
}

/// Run one request over `io`, driving the connection alongside it
async fn exchange<T>(io: T, request: &InterceptedRequest) -> Result<HttpResponse>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let url = request.url();
    let outbound = outbound(request)?;

    let (mut sender, connection) = http1::handshake::<_, Empty<Bytes>>(TokioIo::new(io))
        .await
        .map_err(|e| network(e, url))?;

    let response = async move {
        let response = sender
            .send_request(outbound)
            .await
            .map_err(|e| network(e, url))?;
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| network(e, url))?
            .to_bytes();

        Ok(HttpResponse {
            status: parts.status,
            headers: parts.headers,
            body,
            kind: ResponseKind::Basic,
        })
    };
    tokio::pin!(response, connection);

    tokio::select! {
        result = &mut response => result,
        closed = &mut connection => match closed {
            // Server closed after a complete response; the body is buffered
            Ok(()) => response.await,
            Err(e) => Err(network(e, url)),
        },
    }
}

/// Origin-form request with the `Host` header the wire needs
fn outbound(request: &InterceptedRequest) -> Result<http::Request<Empty<Bytes>>> {
    let url = request.url();
    let target = &url[Position::BeforePath..Position::AfterQuery];
    let authority = &url[Position::BeforeHost..Position::AfterPort];

    let mut builder = http::Request::builder()
        .method(request.method().clone())
        .uri(target);
    for (name, value) in request.headers() {
        builder = builder.header(name, value);
    }
    if !request.headers().contains_key(HOST) {
        let host = HeaderValue::from_str(authority)
            .map_err(|e| error::invalid_request(e).with_url(url.clone()))?;
        builder = builder.header(HOST, host);
    }
    builder
        .body(Empty::<Bytes>::new())
        .map_err(|e| error::invalid_request(e).with_url(url.clone()))
}
