use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    model::{AirQuality, Alert, CurrentConditions, HourlyEntry, WeatherSnapshot},
};

pub mod qweather;

pub use qweather::QWeatherClient;

/// Read side of a run: the four lookups for one configured location.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn now(&self) -> Result<CurrentConditions>;

    async fn hourly(&self) -> Result<Vec<HourlyEntry>>;

    async fn warnings(&self) -> Result<Vec<Alert>>;

    async fn air_quality(&self) -> Result<AirQuality>;

    /// Run all four lookups in order, stopping at the first failure.
    async fn snapshot(&self) -> Result<WeatherSnapshot> {
        let now = self.now().await?;
        let hourly = self.hourly().await?;
        let alerts = self.warnings().await?;
        let air = self.air_quality().await?;

        Ok(WeatherSnapshot {
            now,
            hourly,
            alerts,
            air,
        })
    }
}
