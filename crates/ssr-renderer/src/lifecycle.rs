//! Renderer lifecycle.
//!
//! The controller is the only writer of the live renderer. Requests read
//! it through [`RendererController::renderer`], which hands out the current
//! instance; a rebuild replaces the instance without touching renders that
//! already hold the previous one.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use ssr_core::{
    ArtifactKind, ArtifactUpdate, BundleRenderer, ClientManifest, SsrError, SsrResult,
};
use tracing::{debug, info, warn};

use crate::factory::RendererFactory;
use crate::output::{artifact_path, read_artifact, read_json_artifact, OutputFs};

/// Where the controller stands in building its first renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No template or bundle seen.
    Empty,
    /// One of template and bundle seen.
    Partial,
    /// A renderer is live.
    Ready,
}

/// Latest artifacts received, last write wins per field.
#[derive(Debug, Clone, Default)]
pub struct BuildArtifactSet {
    pub template: Option<String>,
    pub bundle: Option<Value>,
    pub client_manifest: Option<ClientManifest>,
}

impl BuildArtifactSet {
    /// Whether a renderer can be built.
    pub fn is_complete(&self) -> bool {
        self.template.is_some() && self.bundle.is_some()
    }
}

/// Owns the live renderer and the artifacts it is built from.
pub struct RendererController {
    factory: RendererFactory,
    artifacts: Mutex<BuildArtifactSet>,
    renderer: RwLock<Option<Arc<dyn BundleRenderer>>>,
    builds: AtomicU64,
}

impl RendererController {
    /// Controller that waits for artifacts from a watching build.
    pub fn new(factory: RendererFactory) -> Self {
        Self {
            factory,
            artifacts: Mutex::new(BuildArtifactSet::default()),
            renderer: RwLock::new(None),
            builds: AtomicU64::new(0),
        }
    }

    /// Controller built once from persisted build output.
    ///
    /// All three artifacts are required; any read, parse or factory failure
    /// is returned and the controller is never handed out half-built.
    pub fn production(factory: RendererFactory, fs: &dyn OutputFs, dir: &Path) -> SsrResult<Self> {
        let bundle = read_json_artifact(fs, dir, ArtifactKind::Bundle)?;
        let manifest_value = read_json_artifact(fs, dir, ArtifactKind::ClientManifest)?;
        let template = read_artifact(fs, dir, ArtifactKind::Template)?;

        let client_manifest: ClientManifest =
            serde_json::from_value(manifest_value).map_err(|source| SsrError::ArtifactParse {
                path: artifact_path(dir, ArtifactKind::ClientManifest),
                source,
            })?;

        let renderer = factory.create(bundle.clone(), &template, Some(client_manifest.clone()))?;
        info!(dir = %dir.display(), "Renderer initialized from build output");

        Ok(Self {
            factory,
            artifacts: Mutex::new(BuildArtifactSet {
                template: Some(template),
                bundle: Some(bundle),
                client_manifest: Some(client_manifest),
            }),
            renderer: RwLock::new(Some(renderer)),
            builds: AtomicU64::new(1),
        })
    }

    /// Apply one artifact update. Returns whether a new renderer went live.
    ///
    /// A manifest update is stored for the next rebuild and never rebuilds
    /// by itself. A factory failure is logged and leaves the previous
    /// renderer (or none) in place.
    pub fn update(&self, update: ArtifactUpdate) -> bool {
        let kind = update.kind();
        let mut artifacts = self.artifacts.lock();

        match update {
            ArtifactUpdate::Template(template) => artifacts.template = Some(template),
            ArtifactUpdate::Bundle(bundle) => artifacts.bundle = Some(bundle),
            ArtifactUpdate::ClientManifest(raw) => {
                match ClientManifest::from_json(&raw) {
                    Ok(manifest) => artifacts.client_manifest = Some(manifest),
                    Err(e) => warn!(error = %e, "Ignoring unparsable client manifest"),
                }
                debug!(%kind, "Client manifest stored for next rebuild");
                return false;
            }
        }

        let (Some(template), Some(bundle)) = (&artifacts.template, &artifacts.bundle) else {
            debug!(%kind, "Waiting for the remaining build artifact");
            return false;
        };

        // The artifacts lock is held across the build so rebuilds go live
        // in the order their updates arrived.
        match self
            .factory
            .create(bundle.clone(), template, artifacts.client_manifest.clone())
        {
            Ok(renderer) => {
                *self.renderer.write() = Some(renderer);
                let builds = self.builds.fetch_add(1, Ordering::Relaxed) + 1;
                info!(%kind, builds, "Renderer rebuilt");
                true
            }
            Err(e) => {
                warn!(%kind, error = %e, "Renderer rebuild failed");
                false
            }
        }
    }

    /// Read the client manifest and the template after a client build.
    ///
    /// Missing files are skipped; unreadable ones are logged.
    pub fn on_build_finished(&self, fs: &dyn OutputFs, dir: &Path) {
        for kind in [ArtifactKind::ClientManifest, ArtifactKind::Template] {
            if !fs.exists(&artifact_path(dir, kind)) {
                continue;
            }
            match read_artifact(fs, dir, kind) {
                Ok(text) => {
                    let update = match kind {
                        ArtifactKind::ClientManifest => ArtifactUpdate::ClientManifest(text),
                        _ => ArtifactUpdate::Template(text),
                    };
                    self.update(update);
                }
                Err(e) => warn!(%kind, error = %e, "Could not read build output"),
            }
        }
    }

    /// The live renderer.
    pub fn renderer(&self) -> SsrResult<Arc<dyn BundleRenderer>> {
        self.renderer.read().clone().ok_or(SsrError::NotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.renderer.read().is_some()
    }

    pub fn state(&self) -> ControllerState {
        if self.is_ready() {
            return ControllerState::Ready;
        }
        let artifacts = self.artifacts.lock();
        if artifacts.template.is_some() || artifacts.bundle.is_some() {
            ControllerState::Partial
        } else {
            ControllerState::Empty
        }
    }

    /// Number of renderers built so far.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    /// Snapshot of the stored artifacts.
    pub fn artifacts(&self) -> BuildArtifactSet {
        self.artifacts.lock().clone()
    }

    pub fn factory(&self) -> &RendererFactory {
        &self.factory
    }
}

impl std::fmt::Debug for RendererController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererController")
            .field("state", &self.state())
            .field("builds", &self.builds())
            .finish()
    }
}
