//! Table reader: one GET against the REST backend per read.
//!
//! Each step returns `Result<_, ReadError>`; [`TableReader::read`] is the
//! only place errors are turned into an [`Envelope`].

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_RANGE, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use serde_json::Value;

use pgrest_core::{Envelope, QueryRequest, ReadError, ReadTableArgs, RestConfig, Result, TablePage};

use crate::compiler::{compile, CompiledRead};
use crate::range::parse_total;

const APIKEY: &str = "apikey";
const PREFER: &str = "prefer";
const JSON: &str = "application/json";
const COUNT_EXACT: &str = "count=exact";

/// Reads tables from a PostgREST-compatible backend.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TableReader {
    client: Client,
    config: RestConfig,
}

impl TableReader {
    /// Build a reader whose HTTP client applies `config.timeout` to every
    /// request and never follows redirects.
    ///
    /// # Errors
    ///
    /// Returns the client builder's error if TLS initialisation fails.
    pub fn new(config: RestConfig) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Read a table and fold the outcome into an envelope. Never fails.
    pub async fn read(&self, request: &QueryRequest) -> Envelope {
        envelope_of(&request.table, self.fetch(request).await)
    }

    /// Like [`read`](Self::read), starting from raw tool arguments.
    pub async fn read_args(&self, args: ReadTableArgs) -> Envelope {
        let table = args.table.clone();
        let result = match QueryRequest::try_from(args) {
            Ok(request) => self.fetch(&request).await,
            Err(e) => Err(e),
        };
        envelope_of(&table, result)
    }

    /// Read a table, keeping errors typed.
    ///
    /// # Errors
    ///
    /// Any [`ReadError`] raised while compiling, sending, or decoding.
    pub async fn fetch(&self, request: &QueryRequest) -> Result<TablePage> {
        let compiled = compile(request, self.config.reserved_policy)?;
        let response = self.send(&compiled).await?;
        let response = check_status(response).await?;
        decode_page(response).await
    }

    async fn send(&self, compiled: &CompiledRead) -> Result<Response> {
        let url = format!("{}/{}", self.config.rest_base(), compiled.path_segment);
        tracing::debug!(url = %url, params = ?compiled.params, "reading table");

        self.client
            .get(&url)
            .headers(self.default_headers()?)
            .bearer_auth(self.config.service_key())
            .query(&compiled.params)
            .send()
            .await
            .map_err(|e| ReadError::Request(e.to_string()))
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(self.config.service_key())
            .map_err(|_| ReadError::Request("service key is not a valid header value".into()))?;
        headers.insert(APIKEY, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        headers.insert(PREFER, HeaderValue::from_static(COUNT_EXACT));
        Ok(headers)
    }
}

fn envelope_of(table: &str, result: Result<TablePage>) -> Envelope {
    match &result {
        Ok(page) => {
            tracing::debug!(table, rows = page.rows.len(), count = ?page.count, "table read");
        }
        Err(e) if e.is_request_error() => tracing::warn!(table, error = %e, "table read failed"),
        Err(e) => tracing::info!(table, error = %e, "table read rejected"),
    }
    result.into()
}

/// Anything but 2xx is an error, redirects included.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ReadError::Status {
            status: status.to_string(),
            body: body.trim().to_string(),
        });
    }
    Ok(response)
}

async fn decode_page(response: Response) -> Result<TablePage> {
    let count = response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_total);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ReadError::Request(e.to_string()))?;
    tracing::trace!(bytes = bytes.len(), "response body received");

    let rows = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Array(rows)) => rows,
        Ok(other) => {
            return Err(ReadError::Decode(format!(
                "expected a JSON array, got {}",
                pgrest_core::request::json_kind(&other)
            )));
        }
        Err(e) => return Err(ReadError::Decode(e.to_string())),
    };

    Ok(TablePage { rows, count })
}
