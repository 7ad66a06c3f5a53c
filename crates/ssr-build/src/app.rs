//! App definitions and the derived server build.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Offset between an app's id and its server build's id.
pub const SERVER_APP_ID_OFFSET: u32 = 1000;

/// Chunk size large enough that the server build never splits.
pub const SERVER_MIN_CHUNK_SIZE: u64 = 999_999_999;

/// Suffix appended to the server build's app name.
pub const SERVER_APP_NAME_SUFFIX: &str = " - Server Generator";

/// Role of a worker spawned for an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SsrWorker {
    /// Builds the server bundle.
    Server,
}

/// Whether a build runs once or keeps watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Build,
    Watch,
}

impl BuildMode {
    /// `Build` for production, `Watch` otherwise.
    pub fn for_prod(is_prod: bool) -> Self {
        if is_prod {
            Self::Build
        } else {
            Self::Watch
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "build"),
            Self::Watch => write!(f, "watch"),
        }
    }
}

/// An app as handed to the asset builder.
///
/// Fields the bridge does not interpret are kept in `extra` and passed
/// through to the spawned build unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinition {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_chunk_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyfills: Option<bool>,
    #[serde(default)]
    pub keep_output_directory: bool,
    #[serde(default)]
    pub disable_git_add: bool,
    #[serde(default)]
    pub verbose_result: bool,
    #[serde(default)]
    pub use_ssr: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssr_worker: Option<SsrWorker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_template: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppDefinition {
    pub fn new(id: u32, app_name: impl Into<String>) -> Self {
        Self {
            id,
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    pub fn with_ssr(mut self, use_ssr: bool) -> Self {
        self.use_ssr = use_ssr;
        self
    }

    /// Whether SSR applies to this app, given the process-wide SSR flag.
    pub fn is_ssr_active(&self, process_flag: bool) -> bool {
        self.use_ssr || process_flag
    }

    /// Whether this app is itself a spawned worker.
    pub fn is_worker(&self) -> bool {
        self.ssr_worker.is_some()
    }
}

/// Definition of the server build for `app`.
///
/// Same app, renamed and re-numbered, with splitting and polyfills off and
/// the primary build's output directory left in place.
pub fn derive_server_app(app: &AppDefinition) -> AppDefinition {
    let mut server = app.clone();
    server.app_name.push_str(SERVER_APP_NAME_SUFFIX);
    server.id += SERVER_APP_ID_OFFSET;
    server.min_chunk_size = Some(SERVER_MIN_CHUNK_SIZE);
    server.polyfills = Some(false);
    server.keep_output_directory = true;
    server.disable_git_add = true;
    server.verbose_result = true;
    server.use_ssr = true;
    server.ssr_worker = Some(SsrWorker::Server);
    server
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derive_server_app() {
        let app = AppDefinition::new(2, "Frontend").with_ssr(true);

        let server = derive_server_app(&app);

        assert_eq!(server.app_name, "Frontend - Server Generator");
        assert_eq!(server.id, 1002);
        assert_eq!(server.min_chunk_size, Some(999_999_999));
        assert_eq!(server.polyfills, Some(false));
        assert!(server.keep_output_directory);
        assert!(server.disable_git_add);
        assert!(server.verbose_result);
        assert!(server.use_ssr);
        assert_eq!(server.ssr_worker, Some(SsrWorker::Server));
        assert!(server.is_worker());
    }

    #[test]
    fn test_derive_leaves_parent_untouched() {
        let app = AppDefinition::new(0, "Frontend");
        let before = app.clone();

        let _ = derive_server_app(&app);

        assert_eq!(app, before);
        assert!(!app.is_worker());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let app: AppDefinition = serde_json::from_value(json!({
            "id": 1,
            "appName": "Shop",
            "useSsr": true,
            "entry": "./src/index.ts",
            "output": "./dist/bundle.js"
        }))
        .unwrap();

        let server = serde_json::to_value(derive_server_app(&app)).unwrap();

        assert_eq!(server["entry"], "./src/index.ts");
        assert_eq!(server["output"], "./dist/bundle.js");
        assert_eq!(server["ssrWorker"], "server");
        assert_eq!(server["minChunkSize"], 999_999_999);
    }

    #[test]
    fn test_build_mode() {
        assert_eq!(BuildMode::for_prod(true), BuildMode::Build);
        assert_eq!(BuildMode::for_prod(false).to_string(), "watch");
    }

    #[test]
    fn test_ssr_active_via_flag() {
        let app = AppDefinition::new(0, "Frontend");

        assert!(!app.is_ssr_active(false));
        assert!(app.is_ssr_active(true));
    }
}
