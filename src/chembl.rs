use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::config::ChemblSettings;
use crate::domain::{StandardType, TargetChemblId};
use crate::error::ExplorerError;
use crate::records::{ActivityRecord, TargetRecord};

/// The two ChEMBL capabilities the dashboard needs.
pub trait ChemblClient: Send + Sync {
    fn search_targets(&self, query: &str) -> Result<Vec<TargetRecord>, ExplorerError>;
    fn filter_activities(
        &self,
        target: &TargetChemblId,
        standard_type: StandardType,
    ) -> Result<Vec<ActivityRecord>, ExplorerError>;
}

/// One page of a ChEMBL list endpoint.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<Value>,
    pub next: Option<String>,
    pub total_count: Option<u64>,
}

#[derive(Clone)]
pub struct ChemblHttpClient {
    client: Client,
    base_url: Url,
    settings: ChemblSettings,
}

impl ChemblHttpClient {
    pub fn new(settings: ChemblSettings) -> Result<Self, ExplorerError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("chembl-explorer/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ExplorerError::ChemblHttp(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|err| ExplorerError::ChemblHttp(err.to_string()))?;
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ExplorerError::InvalidConfig(format!("base_url: {err}")))?;
        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    pub fn target_search_url(&self, query: &str) -> Result<Url, ExplorerError> {
        let limit = self.settings.page_size.to_string();
        Url::parse_with_params(
            &format!("{}/target/search.json", self.settings.base_url),
            &[("q", query), ("limit", limit.as_str())],
        )
        .map_err(|err| ExplorerError::InvalidConfig(format!("base_url: {err}")))
    }

    pub fn activity_url(
        &self,
        target: &TargetChemblId,
        standard_type: StandardType,
    ) -> Result<Url, ExplorerError> {
        let limit = self.settings.page_size.to_string();
        Url::parse_with_params(
            &format!("{}/activity.json", self.settings.base_url),
            &[
                ("target_chembl_id", target.as_str()),
                ("standard_type", standard_type.as_str()),
                ("limit", limit.as_str()),
            ],
        )
        .map_err(|err| ExplorerError::InvalidConfig(format!("base_url: {err}")))
    }

    fn get_json(&self, url: Url) -> Result<Value, ExplorerError> {
        tracing::debug!(%url, "chembl request");
        let start = std::time::Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ExplorerError::ChemblHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let body = response
            .text()
            .map_err(|err| ExplorerError::ChemblHttp(err.to_string()))?;
        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            bytes = body.len(),
            "chembl response"
        );
        serde_json::from_str(&body).map_err(|err| ExplorerError::ChemblDecode(err.to_string()))
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ExplorerError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "ChEMBL request failed".to_string());
        Err(ExplorerError::ChemblStatus { status, message })
    }

    /// Follows `page_meta.next` until the listing is exhausted or
    /// `max_records` is reached.
    fn collect_pages(&self, first: Url, key: &str) -> Result<Vec<Value>, ExplorerError> {
        let mut items = Vec::new();
        let mut url = first;
        loop {
            let page = parse_page(self.get_json(url)?, key)?;
            items.extend(page.items);

            if let Some(max) = self.settings.max_records {
                if items.len() >= max {
                    items.truncate(max);
                    tracing::debug!(max, "record cap reached, not paging further");
                    break;
                }
            }

            match page.next {
                Some(next) => {
                    tracing::debug!(
                        collected = items.len(),
                        total = ?page.total_count,
                        "fetching next page"
                    );
                    url = self.base_url.join(&next).map_err(|err| {
                        ExplorerError::ChemblDecode(format!("invalid next page `{next}`: {err}"))
                    })?;
                }
                None => break,
            }
        }
        Ok(items)
    }
}

impl ChemblClient for ChemblHttpClient {
    fn search_targets(&self, query: &str) -> Result<Vec<TargetRecord>, ExplorerError> {
        let url = self.target_search_url(query)?;
        self.collect_pages(url, "targets")?
            .into_iter()
            .map(TargetRecord::from_value)
            .collect()
    }

    fn filter_activities(
        &self,
        target: &TargetChemblId,
        standard_type: StandardType,
    ) -> Result<Vec<ActivityRecord>, ExplorerError> {
        let url = self.activity_url(target, standard_type)?;
        self.collect_pages(url, "activities")?
            .into_iter()
            .map(ActivityRecord::from_value)
            .collect()
    }
}

/// Splits a list response into its records and the link to the next page.
pub fn parse_page(mut raw: Value, key: &str) -> Result<Page, ExplorerError> {
    let items = match raw.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ExplorerError::ChemblDecode(format!(
                "`{key}` is not a list: {other}"
            )));
        }
        None => {
            return Err(ExplorerError::ChemblDecode(format!(
                "response has no `{key}` list"
            )));
        }
    };
    let page_meta = raw.get("page_meta");
    let next = page_meta
        .and_then(|meta| meta.get("next"))
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string());
    let total_count = page_meta
        .and_then(|meta| meta.get("total_count"))
        .and_then(|v| v.as_u64());

    Ok(Page {
        items,
        next,
        total_count,
    })
}
