use std::{fs::File, io::BufReader, path::Path};

use crate::{
    foundation::error::{LedAnimError, LedAnimResult},
    preview::clock::PreviewOpts,
    upload::protocol::UploadOpts,
};

/// Application settings, loadable from JSON. Missing fields take their defaults.
///
/// ```json
/// { "upload": { "link": { "baud_rate": 9600 }, "settle_ms": 3000, "echo_timeout_ms": 10000 },
///   "preview": { "tick_period_ms": 10 } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Upload protocol settings.
    pub upload: UploadOpts,
    /// Preview clock settings.
    pub preview: PreviewOpts,
}

impl AppConfig {
    /// Parse settings from a JSON reader and validate them.
    pub fn from_reader<R: std::io::Read>(r: R) -> LedAnimResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| LedAnimError::serde(format!("parse config JSON: {e}")))?;
        cfg.upload.link.validate()?;
        Ok(cfg)
    }

    /// Parse settings from a JSON string.
    pub fn from_json_str(s: &str) -> LedAnimResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Read settings from a JSON file.
    pub fn from_path(path: &Path) -> LedAnimResult<Self> {
        let f = File::open(path).map_err(|e| LedAnimError::io_at("open config", path, e))?;
        Self::from_reader(BufReader::new(f))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
