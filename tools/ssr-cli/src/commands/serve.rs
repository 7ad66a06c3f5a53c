//! Serve the app.

use std::future::IntoFuture;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use ssr_build::{
    enable_ssr_mode, is_ssr_mode, BuildCommand, BuildCoordinator, BuildHandle, BuildMode,
    ExternalAllowList, HostEnvironment, OutputWatcher, ParentContext, VueExtension,
};
use ssr_core::ArtifactUpdate;
use ssr_renderer::{DiskOutput, RendererController, RendererFactory, SnapshotEngine};
use ssr_server::{ssr_router_with_assets, SsrResponseHandler};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::ServeArgs;
use crate::context::Context;
use crate::logging;

/// Builds and watcher kept alive while serving in development.
struct DevSession {
    _watcher: OutputWatcher,
    builds: Vec<BuildHandle>,
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let mode = args.mode();
    logging::init(mode, ctx.output.is_verbose());

    let addr = args.addr(ctx)?;
    let output_dir = ctx.output_dir();
    let factory = RendererFactory::new(Arc::new(SnapshotEngine), mode);

    ctx.output.header(&format!("Serving in {} mode", mode));
    ctx.output.kv("output", &output_dir.display().to_string());

    let (controller, session) = if mode.is_dev() {
        let controller = Arc::new(RendererController::new(factory));
        let session = start_dev(ctx, &controller, &output_dir)?;
        (controller, Some(session))
    } else {
        let controller = RendererController::production(factory, &DiskOutput, &output_dir)
            .context("Failed to load the production renderer")?;
        (Arc::new(controller), None)
    };

    let handler = SsrResponseHandler::new(controller, &ctx.config.ssr, mode)
        .with_strategy(args.strategy(ctx));
    let router = ssr_router_with_assets(handler, &ctx.config.build.public_path, &output_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, %mode, "Listening");
    ctx.output.success(&format!("Listening on http://{}", addr));

    let builds = session.map(|s| s.builds).unwrap_or_default();
    tokio::select! {
        result = axum::serve(listener, router).into_future() => {
            result.context("Server error")?;
        }
        result = supervise(builds) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}

/// Spawn the builds and start watching the output directory.
fn start_dev(
    ctx: &Context,
    controller: &Arc<RendererController>,
    output_dir: &Path,
) -> Result<DevSession> {
    enable_ssr_mode();

    let extension = VueExtension::register("app")?;
    let parent = ParentContext {
        environment: HostEnvironment::Express,
        is_prod: false,
    };
    let allow_list = ExternalAllowList::from_options(&ctx.config.ssr)?;
    let coordinator = BuildCoordinator::new(BuildMode::for_prod(false), allow_list);
    let mut app = ctx.config.app.clone();
    let mut builds = Vec::new();

    if extension.prepare(&mut app, &parent, is_ssr_mode()) {
        let Some(command_line) = &ctx.config.build.server_command else {
            bail!("`build.server_command` is required in development mode");
        };
        let command = BuildCommand::parse(command_line)?.current_dir(&ctx.cwd);
        let target = controller.clone();
        let handle = coordinator.spawn_server_build(&command, &app, move |bundle| {
            target.update(ArtifactUpdate::Bundle(bundle));
        })?;
        builds.push(handle);
    }

    if let Some(command_line) = &ctx.config.build.client_command {
        let command = BuildCommand::parse(command_line)?.current_dir(&ctx.cwd);
        builds.push(coordinator.spawn_client_build(&command)?);
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let (watcher, mut finished) = OutputWatcher::new(output_dir)?;

    // Output left by an earlier run is picked up right away.
    controller.on_build_finished(&DiskOutput, output_dir);

    let target = controller.clone();
    let dir = output_dir.to_path_buf();
    tokio::spawn(async move {
        while let Some(event) = finished.recv().await {
            debug!(paths = ?event.paths, "Build output changed");
            target.on_build_finished(&DiskOutput, &dir);
        }
    });

    Ok(DevSession {
        _watcher: watcher,
        builds,
    })
}

/// Resolve when a build fails. Builds exiting cleanly are only logged.
async fn supervise(builds: Vec<BuildHandle>) -> Result<()> {
    if builds.is_empty() {
        return std::future::pending().await;
    }

    let mut running = JoinSet::new();
    for build in builds {
        running.spawn(build.wait());
    }

    while let Some(joined) = running.join_next().await {
        match joined {
            Ok(Ok(())) => warn!("A build exited; the renderer keeps its last artifacts"),
            Ok(Err(e)) => return Err(e).context("Build failed"),
            Err(e) => return Err(e).context("Build task panicked"),
        }
    }

    std::future::pending().await
}
