//! Validate the persisted production artifacts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;
use ssr_build::ExternalAllowList;
use ssr_core::RenderMode;
use ssr_renderer::{DiskOutput, OutputFs, RendererController, RendererFactory, SnapshotEngine};

use super::CheckArgs;
use crate::context::Context;
use crate::logging;

#[derive(Debug, Serialize)]
struct CheckReport {
    output_dir: PathBuf,
    ready: bool,
    client_manifest: bool,
}

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    logging::init(RenderMode::Production, ctx.output.is_verbose());

    let output_dir = match &args.output_dir {
        Some(dir) => ctx.resolve_path(Path::new(dir)),
        None => ctx.output_dir(),
    };

    ExternalAllowList::from_options(&ctx.config.ssr)?;
    let report = check(&DiskOutput, &output_dir)?;

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    ctx.output.success("Production renderer loaded");
    ctx.output.kv("output", &report.output_dir.display().to_string());
    ctx.output.kv("client manifest", if report.client_manifest { "yes" } else { "no" });
    Ok(())
}

fn check(fs: &dyn OutputFs, output_dir: &Path) -> Result<CheckReport> {
    let factory = RendererFactory::new(Arc::new(SnapshotEngine), RenderMode::Production);
    let controller = RendererController::production(factory, fs, output_dir)
        .with_context(|| format!("Artifacts in {} are not servable", output_dir.display()))?;

    Ok(CheckReport {
        output_dir: output_dir.to_path_buf(),
        ready: controller.is_ready(),
        client_manifest: controller.artifacts().client_manifest.is_some(),
    })
}
