use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pagesmith::config::{AppConfig, ConfigError};
use pagesmith::element::scaffold::{self, ScaffoldError};
use pagesmith::export::{ExportError, ExportPipeline, NpmRunner};
use pagesmith::manifest::{self, Manifest, ManifestError, ManifestWatcher};
use pagesmith::routes;
use pagesmith::routes::export::{ELEMENTS_NOT_ARRAY, MISSING_ELEMENTS};
use pagesmith::state::AppState;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Manifest(#[from] ManifestError),
    #[error("{0}")]
    Scaffold(#[from] ScaffoldError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("server failed: {0}")]
    Serve(io::Error),
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON input: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(&'static str),
}

#[derive(Parser, Debug)]
#[command(name = "pagesmith", about = "Element manifest, scaffolding, and layout export for the page builder")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the export server, plus the manifest watcher unless WATCH_MANIFEST=false.
    Serve {
        #[arg(long, help = "Override PORT")]
        port: Option<u16>,
    },
    /// Regenerate the element manifest.
    Manifest {
        #[arg(long, default_value_t = false, help = "Keep regenerating on changes until Ctrl-C")]
        watch: bool,
    },
    /// Scaffold a new element directory.
    NewElement { name: String },
    /// Run the export pipeline locally.
    Export {
        #[arg(long, default_value = "-", help = "JSON file with {elements: [...]} or a bare array, or - for stdin")]
        input: String,
        #[arg(long, default_value = "downloaded-layout.zip")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "failed to load .env"),
    }

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Command::Serve { port } => run_serve(config, port).await,
        Command::Manifest { watch } => run_manifest(&config, watch).await,
        Command::NewElement { name } => run_new_element(&config, &name),
        Command::Export { input, output } => run_export(&config, &input, &output).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_serve(mut config: AppConfig, port: Option<u16>) -> Result<(), CliError> {
    if let Some(port) = port {
        config.port = port;
    }
    let layout = config.layout.clone();

    let watcher = if config.watch_manifest {
        Some(ManifestWatcher::spawn(layout.elements_dir.clone(), layout.manifest_path.clone())?)
    } else {
        None
    };
    let manifest_rx = match &watcher {
        Some(watcher) => watcher.subscribe(),
        None => {
            let current = manifest::regenerate(&layout.elements_dir, &layout.manifest_path).unwrap_or_else(|e| {
                warn!(error = %e, "initial manifest generation failed");
                Manifest::default()
            });
            watch::channel(current).1
        }
    };

    let runner = Arc::new(NpmRunner::new(config.export.npm_bin.clone(), config.export.build_timeout));
    let addr = format!("{}:{}", config.bind_addr, config.port);
    let app = routes::app(AppState::new(config, runner, manifest_rx));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| CliError::Bind { addr: addr.clone(), source })?;
    info!(%addr, "export server listening");
    info!("ready to receive layout data at http://{addr}/api/export-layout");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(CliError::Serve)?;

    if let Some(watcher) = watcher {
        watcher.shutdown().await;
    }
    Ok(())
}

async fn run_manifest(config: &AppConfig, watch: bool) -> Result<(), CliError> {
    let layout = &config.layout;
    if !watch {
        let manifest = manifest::regenerate(&layout.elements_dir, &layout.manifest_path)?;
        println!("{} elements -> {}", manifest.entries.len(), layout.manifest_path.display());
        return Ok(());
    }

    let watcher = ManifestWatcher::spawn(layout.elements_dir.clone(), layout.manifest_path.clone())?;
    info!("watching for changes; press Ctrl-C to stop");
    shutdown_signal().await;
    watcher.shutdown().await;
    Ok(())
}

fn run_new_element(config: &AppConfig, name: &str) -> Result<(), CliError> {
    let report = scaffold::create_element(&config.layout.elements_dir, name)?;
    for path in &report.created {
        println!("created {}", path.display());
    }
    for path in &report.skipped {
        println!("skipped {} (already exists)", path.display());
    }
    println!("element ready at {}", report.dir.display());
    Ok(())
}

async fn run_export(config: &AppConfig, input: &str, output: &Path) -> Result<(), CliError> {
    let elements = parse_elements(serde_json::from_str(&read_input(input)?)?)?;

    let runner = Arc::new(NpmRunner::new(config.export.npm_bin.clone(), config.export.build_timeout));
    let pipeline = ExportPipeline::new(
        config.layout.clone(),
        config.export.work_root.clone(),
        config.export.cleanup,
        runner,
    );
    let artifact = pipeline.run(&elements).await?;

    let copied = tokio::fs::copy(&artifact.zip_path, output).await;
    pipeline.release(&artifact, copied.is_ok()).await;
    copied.map_err(|source| CliError::Io { path: output.display().to_string(), source })?;

    println!("{}", serde_json::to_string_pretty(&artifact.report)?);
    println!("wrote {}", output.display());
    Ok(())
}

fn read_input(input: &str) -> Result<String, CliError> {
    let mut text = String::new();
    if input == "-" {
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| CliError::Io { path: "<stdin>".to_owned(), source })?;
    } else {
        text = std::fs::read_to_string(input).map_err(|source| CliError::Io { path: input.to_owned(), source })?;
    }
    Ok(text)
}

/// Accept `{ "elements": [...] }` or a bare array.
fn parse_elements(body: Value) -> Result<Vec<Value>, CliError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("elements") {
            Some(Value::Array(items)) => Ok(items),
            None | Some(Value::Null) => Err(CliError::InvalidInput(MISSING_ELEMENTS)),
            Some(_) => Err(CliError::InvalidInput(ELEMENTS_NOT_ARRAY)),
        },
        _ => Err(CliError::InvalidInput(ELEMENTS_NOT_ARRAY)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
