use colored::Colorize;
use env_logger::{Builder, Env, Target};
use log::Level;
use std::io::Write;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

fn level_color(level: Level) -> colored::Color {
    match level {
        Level::Trace => colored::Color::BrightBlack,
        Level::Debug => colored::Color::Cyan,
        Level::Info => colored::Color::Green,
        Level::Warn => colored::Color::Yellow,
        Level::Error => colored::Color::Red,
    }
}

/// Renders one record as `<timestamp> - <LEVEL> - <message>`.
pub fn format_line(timestamp: &str, level: Level, message: &str) -> String {
    format!(
        "{} - {} - {}",
        timestamp.dimmed(),
        level.as_str().color(level_color(level)),
        message
    )
}

/// Diagnostics go to stderr so stdout carries only the JSON result.
/// `RUST_LOG` overrides `default_filter`.
pub fn init(default_filter: &str) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.target(Target::Stderr).format(|buf, record| {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        writeln!(
            buf,
            "{}",
            format_line(&timestamp, record.level(), &record.args().to_string())
        )
    });

    // a second init (tests) keeps the first logger
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_has_three_dash_separated_parts() {
        colored::control::set_override(false);
        let line = format_line("2024-01-01 10:00:00,000", Level::Warn, "Rate limited");
        assert_eq!(line, "2024-01-01 10:00:00,000 - WARN - Rate limited");
    }

    #[test]
    fn init_twice_is_harmless() {
        init("info");
        init("debug");
        log::info!("logger initialized");
    }
}
