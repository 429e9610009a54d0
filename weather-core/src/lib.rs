//! Core library for the `weather-notify` binary.
//!
//! This crate defines:
//! - Configuration loading (file, `.env`, environment)
//! - The weather provider client and its payload models
//! - Forecast windowing and report formatting
//! - Signed delivery to a group-chat webhook
//!
//! It is used by `weather-notify`, but the pipeline can also be driven by a
//! scheduler or tests with their own [`WeatherSource`] and [`Notifier`].

pub mod config;
pub mod error;
pub mod forecast;
pub mod format;
pub mod model;
pub mod notifier;
pub mod pipeline;
pub mod provider;
pub mod sign;

pub use config::{Config, ConfigFile, QWeatherConfig, ReportConfig, WebhookConfig};
pub use error::{Endpoint, Error};
pub use model::{AirQuality, Alert, CurrentConditions, HourlyEntry, WeatherSnapshot};
pub use notifier::{DingTalkNotifier, Notifier};
pub use pipeline::RunOutcome;
pub use provider::{QWeatherClient, WeatherSource};
pub use sign::{SignedRequest, sign};
