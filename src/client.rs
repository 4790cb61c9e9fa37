use std::fs;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::PageError;
use crate::registry::SourceLocation;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DatasetPayload {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, alias = "rows")]
    pub data: Vec<Vec<Value>>,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "published_config_description")]
    pub published_data_description: String,
    #[serde(default)]
    pub links: String,
    #[serde(default, deserialize_with = "ids_as_strings")]
    pub pubmed_ids: Vec<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

fn ids_as_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .iter()
        .filter_map(|value| match value {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
        .collect())
}

impl DatasetPayload {
    pub fn from_json(content: &str) -> Result<Self, PageError> {
        serde_json::from_str(content).map_err(|err| PageError::DatasetParse(err.to_string()))
    }
}

pub trait DatasetClient: Send + Sync {
    fn fetch_dataset(&self, location: &SourceLocation) -> Result<DatasetPayload, PageError>;
}

pub trait ReferencesClient: Send + Sync {
    fn lookup(&self, pubmed_ids: &[String]) -> Result<String, PageError>;
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    references_url: Option<Url>,
}

impl HttpClient {
    pub fn new(references_url: &str, base_url: Option<&str>) -> Result<Self, PageError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("datapages/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| PageError::DatasetHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| PageError::DatasetHttp(err.to_string()))?;

        let references_url = match Url::parse(references_url) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => base_url
                .and_then(|base| Url::parse(base).ok())
                .and_then(|base| base.join(references_url).ok()),
            Err(_) => None,
        };
        if references_url.is_none() {
            tracing::debug!("no absolute references url; publications will use fallback links");
        }

        Ok(Self {
            client,
            references_url,
        })
    }

    fn send_with_retries<F>(
        &self,
        mut make_req: F,
    ) -> Result<reqwest::blocking::Response, reqwest::Error>
    where
        F: FnMut() -> reqwest::blocking::RequestBuilder,
    {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            match make_req().send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }
}

impl DatasetClient for HttpClient {
    fn fetch_dataset(&self, location: &SourceLocation) -> Result<DatasetPayload, PageError> {
        match location {
            SourceLocation::File(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|err| PageError::Filesystem(format!("{path}: {err}")))?;
                DatasetPayload::from_json(&content)
            }
            SourceLocation::Http(url) => {
                let response = self
                    .send_with_retries(|| self.client.get(url.clone()))
                    .map_err(|err| PageError::DatasetHttp(err.to_string()))?;
                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let message = response
                        .text()
                        .unwrap_or_else(|_| "dataset request failed".to_string());
                    return Err(PageError::DatasetStatus { status, message });
                }
                let content = response
                    .text()
                    .map_err(|err| PageError::DatasetHttp(err.to_string()))?;
                DatasetPayload::from_json(&content)
            }
        }
    }
}

impl ReferencesClient for HttpClient {
    fn lookup(&self, pubmed_ids: &[String]) -> Result<String, PageError> {
        let mut url = self
            .references_url
            .clone()
            .ok_or_else(|| PageError::ReferencesHttp("references service not configured".to_string()))?;
        url.query_pairs_mut().append_pair("pars", &pubmed_ids.join(" "));

        let response = self
            .send_with_retries(|| self.client.get(url.clone()))
            .map_err(|err| PageError::ReferencesHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "references request failed".to_string());
            return Err(PageError::ReferencesStatus { status, message });
        }
        response
            .text()
            .map_err(|err| PageError::ReferencesHttp(err.to_string()))
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_accepts_alternate_keys() {
        let payload = DatasetPayload::from_json(
            r#"{
                "columns": ["Species", "Study Name"],
                "rows": [["Human", "Proj1"]],
                "species": "Human",
                "published_config_description": "<p>pub</p>",
                "pubmed_ids": ["111", 222],
                "updated": "2017-05-02T10:11:12.123456",
                "count": 1
            }"#,
        )
        .unwrap();
        assert_eq!(payload.data.len(), 1);
        assert_eq!(payload.published_data_description, "<p>pub</p>");
        assert_eq!(payload.pubmed_ids, vec!["111", "222"]);
    }

    #[test]
    fn missing_pubmed_ids_is_empty() {
        let payload = DatasetPayload::from_json(r#"{"columns": [], "data": []}"#).unwrap();
        assert!(payload.pubmed_ids.is_empty());
        assert!(payload.updated.is_none());
    }
}
