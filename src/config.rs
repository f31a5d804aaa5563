use std::{fs, io::ErrorKind, path::Path};

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "trip.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the points service
    pub end_point: String,
    /// Value sent in the `Authorization` header
    pub authorization: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            end_point: "http://127.0.0.1:8080/big-trip".into(),
            authorization: "Basic trip-points".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    end_point: Option<String>,
    authorization: Option<String>,
}

/// Defaults, then the TOML file, then environment variables
///
/// An explicit `path` must exist. Without one, `trip.toml` in the working directory is read
/// when present.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let raw = match path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => match fs::read_to_string(DEFAULT_CONFIG_FILE) {
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                return Err(err).context(format!("failed to read {DEFAULT_CONFIG_FILE}"));
            }
        },
    };
    if let Some(raw) = raw {
        apply_file(&mut settings, &raw)?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());

    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw).context("invalid config file")?;
    if let Some(v) = file_cfg.end_point {
        settings.end_point = v;
    }
    if let Some(v) = file_cfg.authorization {
        settings.authorization = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("TRIP_END_POINT") {
        settings.end_point = v;
    }
    if let Some(v) = var("APP__END_POINT") {
        settings.end_point = v;
    }

    if let Some(v) = var("TRIP_AUTHORIZATION") {
        settings.authorization = v;
    }
    if let Some(v) = var("APP__AUTHORIZATION") {
        settings.authorization = v;
    }
}
