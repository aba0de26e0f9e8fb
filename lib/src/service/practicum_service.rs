
use anyhow::{Context, Result};
use reqwest::{header::{HeaderMap, HeaderValue, AUTHORIZATION}, Client, StatusCode};
use serde_json::Value;
use tracing::{error, info};

use crate::{config::Config, error::RelayError};

const FROM_DATE_PARAM: &str = "from_date";


/// Client for the homework statuses API.
#[derive(Debug, Clone)]
pub struct PracticumService {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
}

impl PracticumService {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let oauth = format!("OAuth {}", config.practicum_token);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&oauth).context("PRACTICUM_TOKEN is not a valid header value")?);

        Ok(Self {
            client: Client::new(),
            headers,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Fetches every homework whose status changed since `from_date` (unix seconds).
    ///
    /// Only HTTP 200 counts as success; the body is returned undecoded beyond JSON.
    pub async fn get_api_answer(&self, from_date: i64) -> Result<Value, RelayError> {
        let response = self.client
            .get(&self.endpoint)
            .headers(self.headers.clone())
            .query(&[(FROM_DATE_PARAM, from_date)])
            .send()
            .await
            .map_err(|source| {
                error!(endpoint = %self.endpoint, error = %source, "Request to homework API failed");
                RelayError::Request { endpoint: self.endpoint.clone(), source }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RelayError::BadResponseStatus(status.as_u16()));
        }

        let body = response.json::<Value>().await.map_err(RelayError::Decode)?;
        info!(from_date, "Homework API answered");
        Ok(body)
    }
}
