//! Build artifacts consumed by the renderer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SsrError, SsrResult};

/// File name of the serialized server bundle.
pub const SERVER_BUNDLE_FILE: &str = "vue-ssr-server-bundle.json";
/// File name of the client asset manifest.
pub const CLIENT_MANIFEST_FILE: &str = "vue-ssr-client-manifest.json";
/// File name of the HTML template.
pub const TEMPLATE_FILE: &str = "index.html";

/// The three independently arriving build artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Template,
    Bundle,
    ClientManifest,
}

impl ArtifactKind {
    /// File name inside the build output directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Template => TEMPLATE_FILE,
            Self::Bundle => SERVER_BUNDLE_FILE,
            Self::ClientManifest => CLIENT_MANIFEST_FILE,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => write!(f, "template"),
            Self::Bundle => write!(f, "bundle"),
            Self::ClientManifest => write!(f, "clientManifest"),
        }
    }
}

/// A single artifact update delivered to the lifecycle controller.
#[derive(Debug, Clone)]
pub enum ArtifactUpdate {
    /// HTML template text.
    Template(String),
    /// Server bundle, as delivered by the server build.
    Bundle(Value),
    /// Raw client manifest JSON.
    ClientManifest(String),
}

impl ArtifactUpdate {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Template(_) => ArtifactKind::Template,
            Self::Bundle(_) => ArtifactKind::Bundle,
            Self::ClientManifest(_) => ArtifactKind::ClientManifest,
        }
    }
}

/// Serialized server bundle descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerBundle {
    /// Name of the entry file inside `files`.
    pub entry: String,
    /// Compiled files by name.
    pub files: BTreeMap<String, String>,
    /// Source maps by file name.
    #[serde(default)]
    pub maps: BTreeMap<String, Value>,
}

impl ServerBundle {
    /// Parse a bundle value and check that its entry exists.
    pub fn from_value(value: Value) -> SsrResult<Self> {
        let bundle: ServerBundle = serde_json::from_value(value)
            .map_err(|e| SsrError::InvalidBundle(e.to_string()))?;

        if !bundle.files.contains_key(&bundle.entry) {
            return Err(SsrError::InvalidBundle(format!(
                "entry file '{}' is not part of the bundle",
                bundle.entry
            )));
        }

        Ok(bundle)
    }

    /// Source of the entry file.
    pub fn entry_source(&self) -> Option<&str> {
        self.files.get(&self.entry).map(|s| s.as_str())
    }

    /// Source of a named file.
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(|s| s.as_str())
    }
}

/// Client asset manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientManifest {
    #[serde(rename = "publicPath", default)]
    pub public_path: String,
    #[serde(default)]
    pub all: Vec<String>,
    #[serde(default)]
    pub initial: Vec<String>,
    #[serde(rename = "async", default)]
    pub async_files: Vec<String>,
    #[serde(default)]
    pub modules: BTreeMap<String, Vec<usize>>,
}

impl ClientManifest {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Initial JavaScript files.
    pub fn initial_scripts(&self) -> impl Iterator<Item = &str> {
        self.initial
            .iter()
            .map(|s| s.as_str())
            .filter(|f| is_script(f))
    }

    /// Initial stylesheets.
    pub fn initial_styles(&self) -> impl Iterator<Item = &str> {
        self.initial
            .iter()
            .map(|s| s.as_str())
            .filter(|f| f.ends_with(".css"))
    }

    /// Public URL of an asset.
    pub fn asset_url(&self, file: &str) -> String {
        if self.public_path.is_empty() || self.public_path.ends_with('/') {
            format!("{}{}", self.public_path, file)
        } else {
            format!("{}/{}", self.public_path, file)
        }
    }
}

fn is_script(file: &str) -> bool {
    // Strip any query string webpack appends.
    let path = file.split('?').next().unwrap_or(file);
    path.ends_with(".js") || path.ends_with(".mjs")
}
