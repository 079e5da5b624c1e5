use crate::{
    record::{FieldType, FieldValue, Record, Schema},
    Punctuation,
};
use http::{
    header::{CONNECTION, CONTENT_TYPE},
    Request,
};
use mime::Mime;
use wirepost_config::post::Configuration as PostConfiguration;
use wirepost_error::{bail, Error, ErrorType, Result};
use wirepost_http_client::{Body, Client};

/// Standard output schema: the three result fields every outbound record
/// carries. Extend it with [`Schema::with_field`] to declare passthrough
/// fields.
#[must_use]
pub fn result_schema() -> Schema {
    Schema::new()
        .with_field("statusCode", FieldType::Int)
        .with_field("statusMessage", FieldType::Str)
        .with_field("responseMessage", FieldType::Str)
}

/// Posts each inbound record's first string field to a configured endpoint
/// and produces a record carrying the response.
///
/// Holds one HTTP client for its whole lifetime. For `https:` targets the
/// client runs in the trust-all test posture, so self-signed endpoints
/// work out of the box.
pub struct PostDispatcher {
    config: PostConfiguration,
    output_schema: Schema,
    client: Option<Client>,
    post_count: u64,
}

impl PostDispatcher {
    /// Build the dispatcher and its HTTP client
    ///
    /// Never fails: a TLS client that can't be constructed degrades to a
    /// plain one, and a missing client only means inbound records get
    /// dropped.
    pub fn initialize(config: PostConfiguration, output_schema: Schema) -> Self {
        let client = build_client(&config.url);
        Self::with_client(config, output_schema, client)
    }

    /// Build the dispatcher around an existing client (or none)
    ///
    /// `None` puts the dispatcher into its degraded mode where every
    /// inbound record is silently dropped. Tests use this constructor to
    /// inject mock transports via [`wirepost_http_client::ClientBuilder::service`].
    pub fn with_client(
        config: PostConfiguration,
        output_schema: Schema,
        client: Option<Client>,
    ) -> Self {
        if client.is_none() {
            warn!("no usable http client, incoming records will be ignored");
        }

        Self {
            config,
            output_schema,
            client,
            post_count: 0,
        }
    }

    /// Hosting-runtime notification that all ports are wired up
    pub fn all_ports_ready(&self) {
        trace!(url = %self.config.url, "all ports ready");
    }

    /// Whether a client handle exists
    #[must_use]
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Number of POSTs dispatched so far. Informational only.
    #[must_use]
    pub fn post_count(&self) -> u64 {
        self.post_count
    }

    /// Dispatch one record
    ///
    /// Returns `Ok(Some(record))` with the response record, `Ok(None)` for
    /// the documented skip cases (no client, unusable content type, no
    /// string payload), and `Err` only when the POST itself failed in
    /// transit. No retry is attempted; the caller picks the policy for
    /// transport failures.
    ///
    /// # Errors
    ///
    /// - The POST failed on the wire, or reading the response body failed
    pub async fn on_record(&mut self, record: &Record) -> Result<Option<Record>> {
        let mut outbound = Record::new();
        outbound.assign_matching(record, &self.output_schema);

        let Some(client) = &self.client else {
            // Degraded mode, deliberately silent beyond the startup warning
            return Ok(None);
        };

        let request = match self.build_request(record) {
            Ok(request) => request,
            Err(error) => {
                error!(error = ?error, "dropping record, unable to build the post request");
                return Ok(None);
            }
        };

        self.post_count += 1;

        if self.config.log_http_post_actions {
            info!(
                post = self.post_count,
                uri = %request.uri(),
                "executing http post"
            );
        }

        let response = client
            .execute(request)
            .await
            .map_err(|err| Error::new(ErrorType::Transport, err))?;

        let status = response.status();
        let response_message = response
            .text()
            .await
            .map_err(|err| Error::new(ErrorType::Transport, err))?;

        if self.config.log_http_post_actions {
            info!(
                post = self.post_count,
                status = %status,
                body = %response_message,
                "received http response"
            );
        }

        outbound.set("statusCode", FieldValue::Int(i32::from(status.as_u16())));
        outbound.set(
            "statusMessage",
            FieldValue::Str(status.canonical_reason().unwrap_or("").to_owned()),
        );
        outbound.set("responseMessage", FieldValue::Str(response_message));

        Ok(Some(outbound))
    }

    /// Punctuation marks pass through unchanged
    #[must_use]
    pub fn on_punctuation(&self, mark: Punctuation) -> Punctuation {
        mark
    }

    /// Release the client. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(client) = self.client.take() {
            drop(client);
            debug!("released the http client");
        }
    }

    fn build_request(&self, record: &Record) -> Result<Request<Body>> {
        let content_type = &self.config.content_type;
        if content_type.parse::<Mime>().is_err() {
            bail!(
                type = ErrorType::InvalidContentType,
                format!("unable to parse {content_type:?} into a mime type")
            );
        }

        let Some(first) = record.first() else {
            bail!(
                type = ErrorType::MissingPayload,
                "inbound record has no fields"
            );
        };
        let Some(payload) = first.value.as_str() else {
            bail!(
                type = ErrorType::MissingPayload,
                format!("first field {:?} isn't string-typed", first.name)
            );
        };

        let body = if content_type.eq_ignore_ascii_case(mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
        {
            // Form mode posts the first field as a single name=value pair
            Body::from(serde_urlencoded::to_string([(first.name.as_str(), payload)])?)
        } else {
            Body::from(payload.to_owned())
        };

        let request = Request::post(self.config.url.as_str())
            .header(CONTENT_TYPE, content_type.as_str())
            .header(CONNECTION, "keep-alive")
            .body(body)?;

        Ok(request)
    }
}

fn build_client(url: &str) -> Option<Client> {
    if url.starts_with("https:") {
        match Client::builder().danger_accept_invalid_certs(true).build() {
            Ok(client) => Some(client),
            Err(error) => {
                error!(
                    error = ?error,
                    "tls client construction failed, falling back to a plain http client"
                );
                Some(Client::builder().build_plain())
            }
        }
    } else {
        Some(Client::builder().build_plain())
    }
}
