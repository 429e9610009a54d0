//! fetch → filter → format → send, once per invocation.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    config::ReportConfig, error::Result, forecast::within_window, format::build_message,
    notifier::Notifier, provider::WeatherSource,
};

/// How a run that did not fail ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The report was delivered; `response` is the webhook's reply.
    Sent {
        message: String,
        response: serde_json::Value,
    },
    /// Dry run: the report was rendered but not delivered.
    Previewed { message: String },
    /// No forecast entries fall in the window; nothing was sent.
    NoForecast,
}

/// Fetch and render the report, or `None` if the forecast window is empty.
///
/// `clock` is read once, after all lookups have finished, to anchor the window.
pub async fn compose<S, C>(source: &S, report: &ReportConfig, clock: C) -> Result<Option<String>>
where
    S: WeatherSource + ?Sized,
    C: Fn() -> DateTime<Utc>,
{
    let snapshot = source.snapshot().await?;
    let hours = within_window(&snapshot.hourly, clock());

    if hours.is_empty() {
        info!(
            received = snapshot.hourly.len(),
            "no forecast entries in the next hours"
        );
        return Ok(None);
    }

    Ok(Some(build_message(&snapshot, &hours, report)))
}

/// Render the report without delivering it.
pub async fn preview<S, C>(source: &S, report: &ReportConfig, clock: C) -> Result<RunOutcome>
where
    S: WeatherSource + ?Sized,
    C: Fn() -> DateTime<Utc>,
{
    Ok(match compose(source, report, clock).await? {
        Some(message) => RunOutcome::Previewed { message },
        None => RunOutcome::NoForecast,
    })
}

/// Full run. Any failed call aborts before the notifier is contacted.
pub async fn run<S, N, C>(
    source: &S,
    notifier: &N,
    report: &ReportConfig,
    clock: C,
) -> Result<RunOutcome>
where
    S: WeatherSource + ?Sized,
    N: Notifier + ?Sized,
    C: Fn() -> DateTime<Utc>,
{
    let Some(message) = compose(source, report, clock).await? else {
        return Ok(RunOutcome::NoForecast);
    };

    let response = notifier.notify(&report.title(), &message).await?;
    info!(%response, "report delivered");

    Ok(RunOutcome::Sent { message, response })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Endpoint, Error},
        model::{AirQuality, Alert, CurrentConditions, HourlyEntry},
    };
    use async_trait::async_trait;
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};

    type SharedClock = Arc<Mutex<DateTime<Utc>>>;

    #[derive(Debug, Default)]
    struct FakeSource {
        hourly: Vec<HourlyEntry>,
        fail_now: bool,
        calls: Mutex<Vec<&'static str>>,
        /// Clock moved forward by the given seconds while the reads run.
        slow_reads: Option<(SharedClock, i64)>,
    }

    impl FakeSource {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn now(&self) -> Result<CurrentConditions> {
            self.record("now");
            if self.fail_now {
                return Err(Error::Status {
                    endpoint: Endpoint::Now,
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: String::new(),
                });
            }
            Ok(CurrentConditions {
                icon: Some("101".into()),
                text: Some("多云".into()),
                ..Default::default()
            })
        }

        async fn hourly(&self) -> Result<Vec<HourlyEntry>> {
            self.record("hourly");
            Ok(self.hourly.clone())
        }

        async fn warnings(&self) -> Result<Vec<Alert>> {
            self.record("warnings");
            Ok(Vec::new())
        }

        async fn air_quality(&self) -> Result<AirQuality> {
            self.record("air");
            if let Some((clock, secs)) = &self.slow_reads {
                let mut t = clock.lock().unwrap();
                *t += chrono::Duration::seconds(*secs);
            }
            Ok(AirQuality::default())
        }
    }

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, title: &str, text: &str) -> Result<serde_json::Value> {
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), text.to_string()));
            Ok(serde_json::json!({"errcode": 0}))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 6, 10, 0).unwrap()
    }

    fn hour(fx_time: &str) -> HourlyEntry {
        HourlyEntry {
            fx_time: Some(fx_time.into()),
            text: Some("晴".into()),
            temp: Some("27".into()),
            humidity: Some("50".into()),
        }
    }

    fn report() -> ReportConfig {
        ReportConfig {
            place_name: Some("如皋".into()),
        }
    }

    #[tokio::test]
    async fn sends_rendered_report_with_title() {
        let source = FakeSource {
            hourly: vec![hour("2024-06-01T15:00+08:00")],
            ..Default::default()
        };
        let notifier = RecordingNotifier::default();

        let outcome = run(&source, &notifier, &report(), now).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "如皋天气播报");
        assert!(sent[0].1.contains("- 15:00：晴 | 27°C，湿度 50%"));
        assert!(matches!(outcome, RunOutcome::Sent { ref message, .. } if *message == sent[0].1));
        assert_eq!(*source.calls.lock().unwrap(), ["now", "hourly", "warnings", "air"]);
    }

    #[tokio::test]
    async fn empty_window_stops_before_notifier() {
        let source = FakeSource {
            hourly: vec![hour("2024-06-01T13:00+08:00"), hour("2024-06-02T13:00+08:00")],
            ..Default::default()
        };
        let notifier = RecordingNotifier::default();

        let outcome = run(&source, &notifier, &report(), now).await.unwrap();

        assert_eq!(outcome, RunOutcome::NoForecast);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_read_aborts_run() {
        let source = FakeSource {
            hourly: vec![hour("2024-06-01T15:00+08:00")],
            fail_now: true,
            ..Default::default()
        };
        let notifier = RecordingNotifier::default();

        let err = run(&source, &notifier, &report(), now).await.unwrap_err();

        assert_eq!(err.endpoint(), Endpoint::Now);
        assert_eq!(*source.calls.lock().unwrap(), ["now"]);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn window_uses_clock_after_reads_finish() {
        let clock: SharedClock = Arc::new(Mutex::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 5, 59, 50).unwrap(),
        ));
        let source = FakeSource {
            // 06:00Z: still ahead when the run starts, already past once the reads end.
            hourly: vec![hour("2024-06-01T14:00+08:00")],
            slow_reads: Some((clock.clone(), 15)),
            ..Default::default()
        };
        let notifier = RecordingNotifier::default();

        let outcome = run(&source, &notifier, &report(), || *clock.lock().unwrap())
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::NoForecast);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn preview_never_notifies() {
        let source = FakeSource {
            hourly: vec![hour("2024-06-01T16:00+08:00")],
            ..Default::default()
        };

        let outcome = preview(&source, &report(), now).await.unwrap();

        match outcome {
            RunOutcome::Previewed { message } => assert!(message.starts_with("**如皋实时天气**")),
            other => panic!("expected preview, got {other:?}"),
        }
    }
}
