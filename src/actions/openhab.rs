use std::pin::pin;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1::SendRequest;
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tracing::{debug, trace};

/// Characters escaped in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'#').add(b'%').add(b'/').add(b'<').add(b'>')
    .add(b'?').add(b'`').add(b'{').add(b'}');

#[derive(thiserror::Error, Debug)]
pub enum ActionError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: hyper::http::uri::InvalidUri,
    },
    #[error("unsupported URL {0}, expected http://host[:port]")]
    UnsupportedUrl(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),
    #[error("invalid request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("({status}) {body}")]
    Status { status: StatusCode, body: String },
}

/// Client for the openHAB REST API. Requests are sent synchronously on a
/// private single-threaded runtime, so a slow bus stalls the caller.
pub struct OpenHab {
    base_url: String,
    runtime: Runtime,
}

impl OpenHab {
    pub fn new(base_url: impl Into<String>) -> std::io::Result<OpenHab> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()?;

        Ok(OpenHab { base_url: base_url.into(), runtime })
    }

    pub fn item_url(&self, item: &str) -> String {
        format!("{}/rest/items/{}", self.base_url, utf8_percent_encode(item, PATH_SEGMENT))
    }

    /// Sends `state` as the new state of `item`. Any status above 299 is an error.
    pub fn post_state(&self, item: &str, state: &str) -> Result<(), ActionError> {
        self.runtime.block_on(self.send(item, state))
    }

    async fn send(&self, item: &str, state: &str) -> Result<(), ActionError> {
        let url = self.item_url(item);
        let uri: Uri = url.parse().map_err(|source| ActionError::InvalidUrl { url: url.clone(), source })?;

        let (host, authority) = match (uri.scheme_str(), uri.host(), uri.authority()) {
            (Some("http"), Some(host), Some(authority)) => (host, authority.as_str()),
            _ => return Err(ActionError::UnsupportedUrl(url)),
        };
        let port = uri.port_u16().unwrap_or(80);
        let path = uri.path_and_query().map(|path| path.as_str()).unwrap_or("/");

        debug!("POST {} <- {:?}", url, state);

        let stream = TcpStream::connect((host, port)).await?;
        let (sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(HOST, authority)
            .header(CONTENT_TYPE, "text/plain")
            .body(Full::new(Bytes::from(state.to_owned())))?;

        // The connection is driven here until the exchange finishes, then dropped
        let mut response = pin!(exchange(sender, request));
        let mut connection = pin!(connection);

        tokio::select! {
            biased;
            result = &mut response => return result,
            result = &mut connection => {
                result?;
                trace!("openHAB connection closed before the response was read");
            },
        }

        response.await
    }
}

async fn exchange(mut sender: SendRequest<Full<Bytes>>, request: Request<Full<Bytes>>) -> Result<(), ActionError> {
    let response = sender.send_request(request).await?;
    let status = response.status();

    if status.as_u16() > 299 {
        let body = response.into_body().collect().await?.to_bytes();
        return Err(ActionError::Status { status, body: String::from_utf8_lossy(&body).into_owned() });
    }

    Ok(())
}
