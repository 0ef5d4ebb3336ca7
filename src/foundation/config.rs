use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::foundation::error::{QuoteError, QuoteResult};

/// Bot configuration, loaded from JSON. Every field has a default so `{}` is a valid file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Message prefix that triggers a quote sticker.
    pub command: String,
    pub fonts: FontConfig,
    pub output: OutputTarget,
    /// Also persist the intermediate PNG next to the sticker.
    pub keep_raster: bool,
    pub avatar: AvatarConfig,
    pub transport: TransportConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command: "!quote".to_string(),
            fonts: FontConfig::default(),
            output: OutputTarget::default(),
            keep_raster: false,
            avatar: AvatarConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl BotConfig {
    pub fn load(path: &Path) -> QuoteResult<Self> {
        let f = File::open(path).map_err(|e| {
            QuoteError::config(format!("open config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            QuoteError::config(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> QuoteResult<()> {
        if self.command.trim().is_empty() {
            return Err(QuoteError::config("command must be non-empty"));
        }
        if self.avatar.timeout_ms == 0 {
            return Err(QuoteError::config("avatar.timeout_ms must be > 0"));
        }
        if self.avatar.max_bytes == 0 {
            return Err(QuoteError::config("avatar.max_bytes must be > 0"));
        }
        if let OutputTarget::Fixed { path } = &self.output {
            if path.file_name().is_none() {
                return Err(QuoteError::config(format!(
                    "output.path '{}' has no file name",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Font files for card text. Unset paths fall back to system fonts matching `family_fallback`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    /// CSS-style family list used after any configured font.
    pub family_fallback: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            regular: None,
            bold: None,
            family_fallback: "Arial, sans-serif".to_string(),
        }
    }
}

/// Where encoded stickers are persisted.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputTarget {
    /// Keep the sticker in memory only.
    Memory,
    /// One file per request under `dir`.
    Unique { dir: PathBuf },
    /// Every request writes the same file; concurrent requests are last-writer-wins.
    Fixed { path: PathBuf },
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self::Unique {
            dir: std::env::temp_dir().join("quotestick"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvatarConfig {
    pub timeout_ms: u64,
    pub max_bytes: usize,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Settings handed to the messaging transport. The quote pipeline does not read these.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    pub session_dir: PathBuf,
    /// Browser used by the web client. `None` lets the transport locate one.
    pub browser_executable: Option<PathBuf>,
    pub headless: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            session_dir: PathBuf::from("./session_data"),
            browser_executable: None,
            headless: true,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
