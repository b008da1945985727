//! `toon3d-worker` -- turns one photo into a 3D model.
//!
//! Optionally restyles the photo as an anime illustration, sends it to the
//! Tripo image-to-3D service, waits for the task, downloads the GLB and
//! exports an STL next to it. The final job state is printed to stdout as
//! JSON; progress is logged to stderr.
//!
//! ```text
//! toon3d-worker <image-path>
//! ```
//!
//! See [`WorkerConfig::from_env`] for the environment variables. In
//! addition, `RUST_LOG` overrides the log filter and `LOG_FORMAT=json`
//! switches to JSON log lines.

use std::path::PathBuf;
use std::process::ExitCode;

use toon3d_worker::config::WorkerConfig;
use toon3d_worker::pipeline::Pipeline;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "toon3d_worker=info,toon3d_tripo=info,toon3d_stylize=info,toon3d_mesh=info";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let Some(source) = std::env::args_os().nth(1).map(PathBuf::from) else {
        tracing::error!("Usage: toon3d-worker <image-path>");
        return ExitCode::from(2);
    };

    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?config, "Configuration loaded");

    let pipeline = match Pipeline::from_config(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize pipeline");
            return ExitCode::FAILURE;
        }
    };

    let (state, code) = match pipeline.run(source).await {
        Ok(state) => (state, ExitCode::SUCCESS),
        Err(failure) => (*failure.state, ExitCode::FAILURE),
    };

    match serde_json::to_string_pretty(&state) {
        Ok(summary) => println!("{summary}"),
        Err(e) => tracing::error!(error = %e, "Failed to serialize job state"),
    }
    code
}
