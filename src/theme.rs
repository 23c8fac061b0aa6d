// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Light/dark theme preference, persisted across sessions

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::Result;

/// Key of the preference inside the store file
pub const THEME_KEY: &str = "darkMode";

/// Global marker applied to the page when dark mode is on
pub const DARK_CLASS: &str = "dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        Self::from_dark(!self.is_dark())
    }

    /// Class for the document root: "dark" or nothing
    pub fn css_class(self) -> &'static str {
        if self.is_dark() { DARK_CLASS } else { "" }
    }

    /// Label of the toggle button
    pub fn toggle_label(self) -> &'static str {
        if self.is_dark() { "Switch to light mode" } else { "Switch to dark mode" }
    }
}

/// JSON file holding the preference under [`THEME_KEY`]
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored preference; `None` when absent or unreadable
    pub fn load(&self) -> Result<Option<bool>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(value) => Ok(value.get(THEME_KEY).and_then(|v| v.as_bool())),
            Err(e) => {
                warn!("Ignoring malformed preferences at {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    /// Write the preference, keeping any other keys in the file
    pub fn save(&self, dark: bool) -> Result<()> {
        let mut prefs = std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|c| serde_json::from_str::<serde_json::Value>(&c).ok())
            .filter(|v| v.is_object())
            .unwrap_or_else(|| serde_json::json!({}));

        prefs[THEME_KEY] = serde_json::Value::Bool(dark);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&prefs)?)?;
        Ok(())
    }
}

/// The applied theme plus where it is persisted
#[derive(Debug, Clone)]
pub struct ThemeState {
    theme: Theme,
    store: ThemeStore,
}

impl ThemeState {
    /// Persisted preference if any, otherwise the platform's
    pub fn init(store: ThemeStore) -> Self {
        Self::init_with(store, detect_platform_dark)
    }

    pub fn init_with(store: ThemeStore, platform_dark: impl FnOnce() -> bool) -> Self {
        let saved = store.load().unwrap_or_else(|e| {
            warn!("Failed to read theme preference: {}", e);
            None
        });

        let theme = match saved {
            Some(dark) => Theme::from_dark(dark),
            None => Theme::from_dark(platform_dark()),
        };
        debug!("Theme initialized: {:?} (saved: {:?})", theme, saved);

        Self { theme, store }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn css_class(&self) -> &'static str {
        self.theme.css_class()
    }

    /// Flip the theme and persist it
    pub fn toggle(&mut self) -> Result<Theme> {
        self.set(self.theme.toggled())?;
        Ok(self.theme)
    }

    pub fn set(&mut self, theme: Theme) -> Result<()> {
        self.store.save(theme.is_dark())?;
        self.theme = theme;
        Ok(())
    }
}

/// Best guess at the desktop's dark-mode preference
pub fn detect_platform_dark() -> bool {
    platform_dark_from(|key| std::env::var(key).ok())
}

fn platform_dark_from(lookup: impl Fn(&str) -> Option<String>) -> bool {
    if let Some(explicit) = lookup("RESUMATCH_THEME") {
        match explicit.trim().to_lowercase().as_str() {
            "dark" => return true,
            "light" => return false,
            _ => {}
        }
    }

    if let Some(gtk) = lookup("GTK_THEME") {
        if gtk.to_lowercase().ends_with(":dark") {
            return true;
        }
    }

    // "fg;bg" as set by many terminals
    if let Some(colors) = lookup("COLORFGBG") {
        if let Some(bg) = colors.rsplit(';').next().and_then(|b| b.trim().parse::<u8>().ok()) {
            return bg < 7 || bg == 8;
        }
    }

    false
}
