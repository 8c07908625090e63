//! Color themes
//!
//! Palettes are embedded from `resources/themes.json`; every color is a hex
//! string and is exposed as [`Rgb`].

use std::collections::BTreeMap;
use serde::Deserialize;

use crate::error::{Result, VaultError};
use crate::toolbox::color::Rgb;

const THEMES_JSON: &str = include_str!("resources/themes.json");

#[derive(Debug, Deserialize)]
struct RawTheme {
    background: String,
    foreground: String,
    accent: String,
    highlight: String,
}

/// A named color palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub background: Rgb,
    pub foreground: Rgb,
    pub accent: Rgb,
    pub highlight: Rgb,
}

fn raw_themes() -> Result<BTreeMap<String, RawTheme>> {
    serde_json::from_str(THEMES_JSON)
        .map_err(|e| VaultError::SettingsError(format!("Failed to parse themes: {}", e)))
}

fn parse_color(theme: &str, value: &str) -> Result<Rgb> {
    Rgb::from_hex(value)
        .map_err(|e| VaultError::SettingsError(format!("Theme '{}': {}", theme, e)))
}

impl Theme {
    /// Load a theme by name
    pub fn load(name: &str) -> Result<Self> {
        let themes = raw_themes()?;
        let raw = themes.get(name)
            .ok_or_else(|| VaultError::SettingsError(format!("Theme '{}' is not available", name)))?;

        Ok(Self {
            name: name.to_string(),
            background: parse_color(name, &raw.background)?,
            foreground: parse_color(name, &raw.foreground)?,
            accent: parse_color(name, &raw.accent)?,
            highlight: parse_color(name, &raw.highlight)?,
        })
    }

    /// Names of all embedded themes, sorted
    pub fn available() -> Vec<String> {
        raw_themes()
            .map(|themes| themes.into_keys().collect())
            .unwrap_or_default()
    }

    /// Check if a theme name exists
    pub fn is_available(name: &str) -> bool {
        raw_themes().map(|themes| themes.contains_key(name)).unwrap_or(false)
    }

    /// Text on background contrast ratio
    pub fn text_contrast(&self) -> f64 {
        self.foreground.contrast_ratio(&self.background)
    }
}
