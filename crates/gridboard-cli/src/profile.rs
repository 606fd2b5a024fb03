use std::collections::BTreeMap;
use std::path::Path;

use gridboard_core::geometry::CellSize;
use gridboard_layout::EngineConfig;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub name: String,
    pub values: BTreeMap<String, String>,
}

impl Profile {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).map(|raw| {
            let value = raw.trim().to_ascii_lowercase();
            matches!(value.as_str(), "1" | "true" | "yes" | "on")
        })
    }

    #[must_use]
    pub fn get_u16(&self, key: &str) -> Option<u16> {
        self.get(key).and_then(|raw| raw.trim().parse::<u16>().ok())
    }

    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value >= 0.0)
    }

    #[must_use]
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|raw| raw.trim().parse::<usize>().ok())
    }

    /// Engine configuration described by this profile. Missing keys keep
    /// their defaults.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::default();
        if let Some(raw) = self.get("cell_size") {
            let cell = raw
                .trim()
                .parse::<u16>()
                .ok()
                .and_then(CellSize::new)
                .ok_or_else(|| {
                    CliError::invalid(format!(
                        "profile {}: cell_size must be a positive integer, got {raw:?}",
                        self.name
                    ))
                })?;
            config = config.cell_size(cell);
        }
        let width = self.get_f64("viewport_width").unwrap_or(config.viewport.width);
        let height = self.get_f64("viewport_height").unwrap_or(config.viewport.height);
        config = config.viewport(width, height);
        if let Some(capacity) = self.get_usize("history_capacity") {
            config = config.history_capacity(capacity);
        }
        if let Some(span) = self.get_u16("minimized_row_span") {
            config = config.minimized_row_span(span);
        }
        if let Some(buffer) = self.get_u16("placement_buffer") {
            config = config.placement_buffer(buffer);
        }
        if let Some(mobile) = self.get_bool("mobile_layout") {
            config = config.mobile_layout(mobile);
        }
        Ok(config)
    }
}

const DESKTOP: &str = include_str!("../profiles/desktop.env");
const COMPACT: &str = include_str!("../profiles/compact.env");
const MOBILE: &str = include_str!("../profiles/mobile.env");

const BUILTIN_PROFILES: [(&str, &str); 3] =
    [("desktop", DESKTOP), ("compact", COMPACT), ("mobile", MOBILE)];

pub const DEFAULT_PROFILE: &str = "desktop";

#[must_use]
pub fn list_profile_names() -> Vec<String> {
    BUILTIN_PROFILES
        .iter()
        .map(|(name, _)| (*name).to_string())
        .collect()
}

pub fn load_profile(name: &str) -> Result<Profile> {
    let (_, content) = BUILTIN_PROFILES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .ok_or_else(|| CliError::ProfileNotFound {
            name: name.to_string(),
        })?;

    Ok(Profile {
        name: name.to_string(),
        values: parse_profile_content(content),
    })
}

/// Load a user profile from an `.env`-style file.
pub fn load_profile_file(path: &Path) -> Result<Profile> {
    if !path.exists() {
        return Err(CliError::MissingPath {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "custom".to_string());
    Ok(Profile {
        name,
        values: parse_profile_content(&content),
    })
}

#[must_use]
pub fn parse_profile_content(content: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value_raw)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim().to_string();
        let mut value = value_raw.trim().to_string();

        if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
            value = value[1..value.len() - 1].to_string();
        }

        values.insert(key, value);
    }

    values
}
