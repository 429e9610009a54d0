//! Rendering of the markdown report posted to the webhook.

use chrono::FixedOffset;

use crate::{
    config::ReportConfig,
    forecast::parse_fx_time,
    model::{HourlyEntry, WeatherSnapshot},
};

/// Glyph for icon codes missing from [`ICON_GLYPHS`].
pub const FALLBACK_GLYPH: &str = "🌈";

const SEPARATOR: &str = "------";

/// Provider icon code to display glyph.
pub const ICON_GLYPHS: &[(&str, &str)] = &[
    ("100", "☀️"),
    ("101", "🌤"),
    ("102", "⛅"),
    ("103", "🌥"),
    ("104", "☁️"),
    ("150", "🌫"),
    ("151", "🌁"),
    ("153", "🌁"),
    ("300", "🌧"),
    ("301", "🌦"),
    ("302", "⛈"),
    ("303", "⛈"),
    ("304", "🌩"),
    ("305", "🌦"),
    ("306", "🌧"),
    ("307", "🌧"),
    ("308", "🌧"),
    ("309", "🌦"),
    ("310", "🌧"),
    ("311", "🌧"),
    ("312", "🌧"),
    ("313", "🌧"),
    ("400", "🌨"),
    ("401", "❄️"),
    ("402", "❄️"),
    ("403", "❄️"),
    ("404", "🌨"),
    ("405", "🌨"),
    ("406", "🌨"),
    ("407", "🌨"),
    ("500", "🌫"),
    ("501", "🌫"),
    ("502", "🌁"),
    ("503", "🌁"),
    ("504", "🌫"),
    ("507", "🌫"),
    ("508", "🌫"),
    ("900", "❓"),
    ("999", "❓"),
];

pub fn icon_glyph(code: &str) -> &'static str {
    ICON_GLYPHS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(FALLBACK_GLYPH)
}

/// UTC+8, no daylight saving.
pub fn beijing() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).expect("UTC+8 is a valid offset")
}

/// `HH:MM` in Beijing time, or `None` if the timestamp does not parse.
pub fn beijing_hhmm(fx_time: &str) -> Option<String> {
    parse_fx_time(fx_time).map(|t| t.with_timezone(&beijing()).format("%H:%M").to_string())
}

fn hourly_line(entry: &HourlyEntry) -> String {
    let time = entry
        .fx_time
        .as_deref()
        .and_then(beijing_hhmm)
        .unwrap_or_else(|| "--:--".to_string());

    format!(
        "- {time}：{} | {}°C，湿度 {}%",
        entry.text(),
        entry.temp(),
        entry.humidity()
    )
}

/// Build the report from a snapshot and the hours already narrowed to the window.
pub fn build_message(
    snapshot: &WeatherSnapshot,
    hours: &[HourlyEntry],
    report: &ReportConfig,
) -> String {
    let now = &snapshot.now;
    let air = &snapshot.air;

    let mut lines = vec![
        format!("**{}实时天气**\n", report.place()),
        format!(
            "-{} {} {}°C，相对湿度 {}%",
            now.text(),
            icon_glyph(now.icon()),
            now.temp(),
            now.humidity()
        ),
        format!(
            "-露点 {}°C，空气质量：{}（AQI {}）",
            now.dew(),
            air.category(),
            air.aqi()
        ),
        SEPARATOR.to_string(),
        "🕖 未来4小时预报".to_string(),
    ];

    lines.extend(hours.iter().map(hourly_line));
    lines.push(SEPARATOR.to_string());

    if snapshot.alerts.is_empty() {
        lines.push("🌞 无天气预警".to_string());
    } else {
        lines.push("🚨 天气预警".to_string());
        lines.extend(
            snapshot
                .alerts
                .iter()
                .map(|alert| format!("- {}", alert.single_line())),
        );
    }

    lines.join("\n")
}
