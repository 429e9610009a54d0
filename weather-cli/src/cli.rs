use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::info;
use weather_notify_core::{
    Config, ConfigFile, DingTalkNotifier, QWeatherClient, RunOutcome, config::DEFAULT_QWEATHER_HOST,
    pipeline,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-notify",
    version,
    about = "Post the next hours' weather to a group-chat webhook"
)]
pub struct Cli {
    /// Defaults to `send` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the weather, build the report and post it.
    Send {
        /// Print the report instead of posting it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Interactively write the config file.
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Send { dry_run: false }) {
            Command::Send { dry_run } => send(dry_run).await,
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", ConfigFile::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn send(dry_run: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let source = QWeatherClient::new(config.qweather);

    let outcome = if dry_run {
        pipeline::preview(&source, &config.report, Utc::now).await
    } else {
        let notifier = DingTalkNotifier::new(config.webhook);
        pipeline::run(&source, &notifier, &config.report, Utc::now).await
    };
    let outcome = outcome.context("Weather report run failed")?;

    match outcome {
        RunOutcome::NoForecast => println!("未获取到未来 4 小时的预报。"),
        RunOutcome::Previewed { message } => {
            println!("📤 模拟发送内容如下：\n");
            println!("{message}");
        }
        RunOutcome::Sent { message, response } => {
            info!(chars = message.chars().count(), "report sent");
            println!("{message}");
            println!("\n✅ 已发送，返回：{response}");
        }
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut file = ConfigFile::load()?;

    file.qweather.host = optional(ask(
        "QWeather API host:",
        file.qweather
            .host
            .as_deref()
            .or(Some(DEFAULT_QWEATHER_HOST)),
    )?);
    file.qweather.api_key = optional(ask("QWeather API key:", file.qweather.api_key.as_deref())?);
    file.qweather.location = optional(ask(
        "Location (longitude,latitude or location id):",
        file.qweather.location.as_deref(),
    )?);
    file.webhook.url = optional(ask(
        "Webhook URL (including access_token):",
        file.webhook.url.as_deref(),
    )?);

    let message = if file.webhook.secret.is_some() {
        "Webhook signing secret (empty keeps current, `-` disables signing):"
    } else {
        "Webhook signing secret (empty disables signing):"
    };
    let answer = Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    file.webhook.secret = secret_answer(answer, file.webhook.secret.take());

    file.report.place_name = optional(ask(
        "Place name shown in the report (optional):",
        file.report.place_name.as_deref(),
    )?);

    // Catch missing required values now rather than on the next run.
    file.resolve()?;

    let path = file.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

fn ask(message: &str, current: Option<&str>) -> anyhow::Result<String> {
    let prompt = Text::new(message);
    let answer = match current {
        Some(value) => prompt.with_default(value).prompt()?,
        None => prompt.prompt()?,
    };
    Ok(answer)
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Blank keeps the stored secret; `-` clears it.
fn secret_answer(answer: String, current: Option<String>) -> Option<String> {
    match answer.trim() {
        "" => current,
        "-" => None,
        _ => optional(answer),
    }
}
