use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::{
    config::QWeatherConfig,
    error::{Endpoint, Error, Result, truncate_body},
    model::{
        AirQuality, AirResponse, Alert, CurrentConditions, HourlyEntry, HourlyResponse,
        NowResponse, WarningResponse,
    },
};

use super::WeatherSource;

pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

const LANG: &str = "zh";
/// Provider code for metric units.
const UNIT: &str = "m";

const NOW_PATH: &str = "/v7/weather/now";
const HOURLY_PATH: &str = "/v7/weather/24h";
const WARNING_PATH: &str = "/v7/warning/now";
const AIR_PATH: &str = "/v7/air/now";

/// Client for the QWeather v7 REST API.
#[derive(Debug, Clone)]
pub struct QWeatherClient {
    config: QWeatherConfig,
    http: Client,
}

impl QWeatherClient {
    pub fn new(config: QWeatherConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// GET `path` and decode the JSON body. `localized` adds `lang` and `unit`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
        localized: bool,
    ) -> Result<T> {
        let url = format!("{}{}", self.config.host, path);

        let mut query = vec![
            ("location", self.config.location.as_str()),
            ("key", self.config.api_key.as_str()),
        ];
        if localized {
            query.push(("lang", LANG));
            query.push(("unit", UNIT));
        }

        debug!(%endpoint, %url, "requesting weather data");

        let res = self
            .http
            .get(&url)
            .query(&query)
            .timeout(READ_TIMEOUT)
            .send()
            .await
            .map_err(|source| Error::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| Error::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(Error::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| Error::Decode { endpoint, source })
    }
}

#[async_trait]
impl WeatherSource for QWeatherClient {
    async fn now(&self) -> Result<CurrentConditions> {
        let parsed: NowResponse = self.fetch(Endpoint::Now, NOW_PATH, true).await?;
        Ok(parsed.now)
    }

    async fn hourly(&self) -> Result<Vec<HourlyEntry>> {
        let parsed: HourlyResponse = self.fetch(Endpoint::Hourly, HOURLY_PATH, true).await?;
        debug!(entries = parsed.hourly.len(), "hourly forecast received");
        Ok(parsed.hourly)
    }

    async fn warnings(&self) -> Result<Vec<Alert>> {
        let parsed: WarningResponse = self.fetch(Endpoint::Warning, WARNING_PATH, false).await?;
        Ok(parsed.warning)
    }

    async fn air_quality(&self) -> Result<AirQuality> {
        let parsed: AirResponse = self.fetch(Endpoint::Air, AIR_PATH, false).await?;
        Ok(parsed.now)
    }
}
