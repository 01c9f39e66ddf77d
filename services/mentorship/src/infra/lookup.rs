use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use crate::domain::lookup::University;
use crate::domain::repository::LookupProvider;
use crate::error::PortalServiceError;

const COUNTRY: &str = "India";
const STATES_URL: &str = "https://countriesnow.space/api/v0.1/countries/states";
const CITIES_URL: &str = "https://countriesnow.space/api/v0.1/countries/state/cities";
const UNIVERSITIES_URL: &str = "https://universities.hipolabs.com/search";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
struct CountryStates {
    states: Vec<NamedState>,
}

#[derive(Debug, Deserialize)]
struct NamedState {
    name: String,
}

#[derive(Debug, Deserialize)]
struct UniversityRow {
    name: String,
    #[serde(rename = "state-province")]
    state_province: Option<String>,
}

/// Public geographic and university directories over HTTPS.
#[derive(Clone)]
pub struct HttpLookupProvider {
    client: reqwest::Client,
}

impl HttpLookupProvider {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build lookup client")?;
        Ok(Self { client })
    }

    async fn post_envelope<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, PortalServiceError> {
        let envelope: Envelope<T> = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| format!("POST {url} status"))?
            .json()
            .await
            .with_context(|| format!("decode {url}"))?;
        if envelope.error {
            return Err(anyhow::anyhow!("{url} reported an error").into());
        }
        Ok(envelope.data)
    }
}

fn sorted_names(mut names: Vec<String>) -> Vec<String> {
    names.retain(|n| !n.trim().is_empty());
    names.sort();
    names.dedup();
    names
}

impl LookupProvider for HttpLookupProvider {
    async fn states(&self) -> Result<Vec<String>, PortalServiceError> {
        let data: CountryStates = self
            .post_envelope(STATES_URL, serde_json::json!({ "country": COUNTRY }))
            .await?;
        Ok(sorted_names(
            data.states.into_iter().map(|s| s.name).collect(),
        ))
    }

    async fn cities(&self, state: &str) -> Result<Vec<String>, PortalServiceError> {
        let data: Vec<String> = self
            .post_envelope(
                CITIES_URL,
                serde_json::json!({ "country": COUNTRY, "state": state }),
            )
            .await?;
        Ok(sorted_names(data))
    }

    async fn universities(&self) -> Result<Vec<University>, PortalServiceError> {
        let rows: Vec<UniversityRow> = self
            .client
            .get(format!("{UNIVERSITIES_URL}?country={COUNTRY}"))
            .send()
            .await
            .context("GET universities")?
            .error_for_status()
            .context("GET universities status")?
            .json()
            .await
            .context("decode universities")?;
        Ok(rows
            .into_iter()
            .map(|r| University {
                name: r.name,
                state_province: r.state_province,
            })
            .collect())
    }
}
