//! The build manifest.
//!
//! The build phase writes `manifest.json` next to the asset roots. The
//! gateway consumes exactly two facts from it: where the immutable hashed
//! assets live, and which paths were prerendered.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Facts about a build, produced by the (out-of-process) build phase.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildManifest {
    /// Directory under the client root holding hashed immutable assets.
    pub app_dir: String,

    /// Paths prerendered at build time, as absolute URL paths.
    pub prerendered: HashSet<String>,
}

impl Default for BuildManifest {
    fn default() -> Self {
        Self {
            app_dir: "_app".to_string(),
            prerendered: HashSet::new(),
        }
    }
}

impl BuildManifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load a manifest, falling back to defaults when the build did not
    /// emit one. A missing manifest only costs prerendered-page serving.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(manifest) => manifest,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "no usable manifest, using defaults");
                Self::default()
            }
        }
    }

    /// URL prefix whose assets are content-hashed and safe to cache
    /// forever.
    pub fn immutable_prefix(&self) -> String {
        format!("/{}/immutable/", self.app_dir)
    }
}
