#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use http::{header::HeaderName, HeaderMap, HeaderValue};
use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use hyper::{body::Bytes, Request, Response as HyperResponse, StatusCode, Uri, Version};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};
use std::{error::Error as StdError, fmt, time::Duration};
use tower::{
    timeout::Timeout, util::BoxCloneSyncService, BoxError, Service, ServiceBuilder, ServiceExt,
};
use tower_http::map_response_body::MapResponseBodyLayer;

mod body;
mod tls;

type BoxBody<E = BoxError> = http_body_util::combinators::BoxBody<Bytes, E>;
type Result<T, E = Error> = std::result::Result<T, E>;

pub use self::body::Body;

/// Response body type
pub type ResponseBody = BoxBody;

/// Client error type
pub struct Error {
    inner: BoxError,
}

impl Error {
    #[inline]
    fn new<E>(inner: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            inner: inner.into(),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl StdError for Error {}

/// Builder for the HTTP client
pub struct ClientBuilder {
    accept_invalid_certs: bool,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Skip certificate chain and hostname validation entirely
    ///
    /// This is the trust-all posture used for posting against test endpoints
    /// with self-signed certificates. Never enable it against anything you
    /// actually want to trust.
    #[must_use]
    pub fn danger_accept_invalid_certs(self, accept_invalid_certs: bool) -> Self {
        Self {
            accept_invalid_certs,
            ..self
        }
    }

    /// Set a default header
    ///
    /// These headers are added to every HTTP request that is sent via this client
    ///
    /// # Errors
    ///
    /// - The header name failed to convert
    /// - The header value failed to convert
    pub fn default_header<K, V>(mut self, key: K, value: V) -> Result<Self>
    where
        K: TryInto<HeaderName>,
        K::Error: Into<BoxError>,
        V: TryInto<HeaderValue>,
        V::Error: Into<BoxError>,
    {
        self.default_headers.insert(
            key.try_into().map_err(Error::new)?,
            value.try_into().map_err(Error::new)?,
        );

        Ok(self)
    }

    /// Set a request timeout
    ///
    /// By default there is no timeout; a hung remote endpoint blocks the
    /// dispatch until it answers or the connection dies.
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Build a TLS-capable client
    ///
    /// The connector accepts both `http:` and `https:` URIs. Server
    /// certificates are validated against the native root store unless
    /// [`Self::danger_accept_invalid_certs`] was set.
    ///
    /// # Errors
    ///
    /// - The native root certificates couldn't be loaded
    pub fn build(self) -> Result<Client> {
        let builder = HttpsConnectorBuilder::new();
        let connector = if self.accept_invalid_certs {
            builder
                .with_tls_config(tls::trust_all_config())
                .https_or_http()
                .enable_http1()
                .build()
        } else {
            builder
                .with_native_roots()
                .map_err(Error::new)?
                .https_or_http()
                .enable_http1()
                .build()
        };

        let client = HyperClient::builder(TokioExecutor::new()).build(connector);

        Ok(self.service(client))
    }

    /// Build a plain HTTP client
    ///
    /// No TLS machinery is constructed at all, so this client can never
    /// attempt a TLS handshake. Requests to `https:` URIs fail at the
    /// connector.
    #[must_use]
    pub fn build_plain(self) -> Client {
        let client = HyperClient::builder(TokioExecutor::new()).build(HttpConnector::new());

        self.service(client)
    }

    /// Build the HTTP client by wrapping another HTTP client service
    ///
    /// This is also the seam the tests use to inject `tower::service_fn`
    /// mock transports.
    #[must_use]
    pub fn service<S, B>(self, client: S) -> Client
    where
        S: Service<Request<Body>, Response = HyperResponse<B>> + Clone + Send + Sync + 'static,
        S::Error: StdError + Send + Sync + 'static,
        S::Future: Send + 'static,
        B: HttpBody<Data = Bytes> + Send + Sync + 'static,
        B::Error: StdError + Send + Sync + 'static,
    {
        let svc = ServiceBuilder::new()
            .layer(MapResponseBodyLayer::new(|body: B| {
                BoxBody::new(body.map_err(BoxError::from))
            }))
            .service(client)
            .map_err(BoxError::from);

        let inner = match self.timeout {
            Some(duration) => BoxCloneSyncService::new(Timeout::new(svc, duration)),
            None => BoxCloneSyncService::new(svc),
        };

        Client {
            default_headers: self.default_headers,
            inner,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            default_headers: HeaderMap::default(),
            timeout: None,
        }
    }
}

/// An opinionated HTTP client
#[derive(Clone)]
pub struct Client {
    default_headers: HeaderMap,
    inner: BoxCloneSyncService<Request<Body>, HyperResponse<BoxBody>, BoxError>,
}

impl Client {
    /// Build a new client
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    fn prepare_request(&self, mut req: Request<Body>) -> Request<Body> {
        req.headers_mut().extend(self.default_headers.clone());
        req
    }

    /// Execute an HTTP request
    ///
    /// # Errors
    ///
    /// - The inner client service isn't ready
    /// - The request failed
    pub async fn execute(&self, req: Request<Body>) -> Result<Response> {
        let req = self.prepare_request(req);

        let ready_svc = self.inner.clone();
        let response = ready_svc.oneshot(req).await.map_err(Error::new)?;

        Ok(Response { inner: response })
    }

    /// Shorthand for creating a POST request
    ///
    /// # Errors
    ///
    /// - Creating the request with the provided URL failed
    /// - Request execution failed
    pub async fn post<U, B>(&self, uri: U, body: B) -> Result<Response>
    where
        Uri: TryFrom<U>,
        <Uri as TryFrom<U>>::Error: Into<http::Error>,
        B: Into<Body>,
    {
        let req = Request::post(uri).body(body.into()).map_err(Error::new)?;

        self.execute(req).await
    }
}

/// HTTP response
#[derive(Debug)]
pub struct Response {
    inner: HyperResponse<BoxBody>,
}

impl Response {
    /// Convert the response into its inner `hyper` representation
    #[must_use]
    pub fn into_inner(self) -> HyperResponse<BoxBody> {
        self.inner
    }

    /// Read the body into a `Bytes`
    ///
    /// This drains the body to completion, which is also what hands the
    /// connection back to the pool. Skipping the read after a dispatch
    /// eventually starves the pool and stalls later requests.
    ///
    /// # Errors
    ///
    /// Reading the body from the remote failed
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.inner.collect().await.map_err(Error::new)?.to_bytes())
    }

    /// Get a reference to the headers
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Read the body and attempt to interpret it as a UTF-8 encoded string
    ///
    /// # Errors
    ///
    /// - Reading the body from the remote failed
    /// - The body isn't a UTF-8 encoded string
    pub async fn text(self) -> Result<String> {
        let body = self.bytes().await?;
        simdutf8::basic::from_utf8(&body)
            .map(ToOwned::to_owned)
            .map_err(Error::new)
    }

    /// Get the status of the request
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Get the HTTP version the client used
    #[must_use]
    pub fn version(&self) -> Version {
        self.inner.version()
    }
}
