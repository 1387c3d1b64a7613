//! Hand-parsed `key = value` settings file, one entry per line.

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Window, in milliseconds, within which two empty-area clicks count
    /// as a double click.
    pub double_click_ms: u64,
    /// Show the day counter in the status bar while simulating.
    pub show_day: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            double_click_ms: 400,
            show_day: true,
        }
    }
}

pub fn parse(input: &str) -> Result<Config> {
    let mut config = Config::default();

    for (idx, raw) in input.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!("expected 'key = value' at line {line_num}");
        };
        let (key, value) = (key.trim(), value.trim());
        match key {
            "double_click_ms" => {
                config.double_click_ms = value
                    .parse()
                    .with_context(|| format!("bad double_click_ms at line {line_num}"))?;
            }
            "show_day" => {
                config.show_day = parse_bool(value)
                    .with_context(|| format!("bad show_day at line {line_num}"))?;
            }
            other => bail!("unknown setting '{other}' at line {line_num}"),
        }
    }

    Ok(config)
}

pub fn serialize(config: &Config) -> String {
    format!(
        "double_click_ms = {}\nshow_day = {}\n",
        config.double_click_ms, config.show_day
    )
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => bail!("expected 'true' or 'false', got '{other}'"),
    }
}
