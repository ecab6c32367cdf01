use crate::{
    game_snapshot::{GameSnapshot, parse_snapshot},
    parse::{ParseError, Parsed},
    schedule::{ScheduledGame, parse_schedule},
};
use core::time::Duration;
use log::{debug, warn};
use reqwest::{
    Client, ClientBuilder, StatusCode,
    header::{CONTENT_TYPE, HeaderValue},
};
use std::{collections::BTreeMap, future::Future, io};
use thiserror::Error;

pub mod query;
pub use query::Query;

/// Form fields posted to the watchlive endpoint
pub type FormFields = BTreeMap<&'static str, String>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to fetch data: {status} - {reason}")]
    Status { status: u16, reason: String },
    #[error("Request timed out")]
    Timeout,
    #[error(transparent)]
    Request(reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e)
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Failed to render the response: {0}")]
    Render(#[from] serde_json::Error),
    #[error("Failed to write outputs: {0}")]
    Io(#[from] io::Error),
}

/// Something that can post a form to the scoreboard service and hand back the
/// response body.
pub trait Transport: Clone + Send + Sync + 'static {
    fn post(
        &self,
        form: FormFields,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ScoreboardClient {
    base_url: String,
    client: Client,
}

impl ScoreboardClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self, TransportError> {
        if accept_invalid_certs {
            warn!("TLS certificate verification is disabled for {base_url}");
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for ScoreboardClient {
    fn post(
        &self,
        form: FormFields,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        let request = self.client.post(&self.base_url).form(&form);
        let client_ = self.client.clone();

        async move {
            let mut request = request.build()?;
            // `form` sets a content type without the charset the service expects
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            debug!("Posting to scoreboard: {request:?}");

            let response = client_.execute(request).await?;

            let status = response.status();
            if status == StatusCode::OK {
                Ok(response.text().await?)
            } else {
                warn!("Scoreboard request failed, response: {response:?}");
                Err(TransportError::Status {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                })
            }
        }
    }
}

pub async fn fetch_snapshot<T: Transport>(
    transport: &T,
    query: &Query,
) -> Result<Parsed<GameSnapshot>, QueryError> {
    let body = transport.post(query.form_fields()).await?;
    Ok(parse_snapshot(&body)?)
}

pub async fn fetch_schedule<T: Transport>(
    transport: &T,
    query: &Query,
) -> Result<Parsed<Vec<ScheduledGame>>, QueryError> {
    let body = transport.post(query.form_fields()).await?;
    Ok(parse_schedule(&body)?)
}
