mod args;
mod metrics;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use convertbot_core::{
    ffmpeg_available, load_config, load_config_from_env, locate_ffmpeg, locate_ffprobe,
    validate_config, Config, ConversionOrchestrator, ConversionOutcome, ConversionRequest,
    FfmpegExportBackend, NativeBackend, ProcessSupervisor, TargetFormat, Transcoder,
};

use args::{Cli, Commands, ConvertArgs};

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "convertbot.toml";

/// Exit code after a cancelled conversion, as for SIGINT.
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = load(cli.config.as_deref())?;
    validate_config(&config).context("Configuration validation failed")?;

    match cli.command {
        Commands::Convert(args) => convert(config, args).await,
        Commands::Doctor => Ok(doctor(&config)),
        Commands::Formats => {
            formats();
            Ok(0)
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return load_config_from_env().context("Failed to load config from environment");
            }
            default
        }
    };
    info!("Loading configuration from {:?}", path);
    load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
}

async fn convert(config: Config, args: ConvertArgs) -> Result<i32> {
    let transcoder: Arc<dyn Transcoder> =
        Arc::new(ProcessSupervisor::from_config(&config.converter));
    let backend: Arc<dyn NativeBackend> = Arc::new(
        FfmpegExportBackend::with_transcoder(config.converter.clone(), Arc::clone(&transcoder))
            .with_estimator(config.progress.clone()),
    );
    let orchestrator = Arc::new(ConversionOrchestrator::new(&config, backend, transcoder));
    metrics::FFMPEG_AVAILABLE.set(i64::from(orchestrator.ffmpeg_available()));

    let mut request = ConversionRequest::new(&args.source, args.to).with_overwrite(args.overwrite);
    if let Some(output) = &args.output {
        request = request.with_destination(output);
    }
    if args.compress {
        request =
            request.with_compression(args.preset.unwrap_or(config.orchestrator.video_preset));
    }

    let printer = render::spawn_progress_printer(orchestrator.subscribe());
    let interrupter = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            while signal::ctrl_c().await.is_ok() {
                if !orchestrator.cancel().await {
                    render::clear_line();
                    warn!("Interrupted with no conversion running");
                    std::process::exit(EXIT_CANCELLED);
                }
            }
        })
    };

    let mut outcome = orchestrator.convert(request).await?;
    if let ConversionOutcome::NeedsDecision { existing } = &outcome {
        let decision = match args.preset_decision() {
            Some(decision) => decision,
            None => render::prompt_decision(existing).await?,
        };
        outcome = orchestrator.resolve_pending(decision).await?;
    }

    interrupter.abort();
    printer.abort();
    render::clear_line();

    let log_path = outcome.log_path().map(Path::to_path_buf);
    let code = match &outcome {
        ConversionOutcome::Succeeded(report) => {
            if let Some(destination) = &report.destination {
                eprintln!("Saved to {}", destination.display());
            }
            0
        }
        ConversionOutcome::Failed { error, .. } => {
            eprintln!("Failed: {}", error);
            if let Some(log_path) = &log_path {
                eprintln!("See log: {}", log_path.display());
            }
            1
        }
        ConversionOutcome::Cancelled(_) => {
            eprintln!("Cancelled.");
            EXIT_CANCELLED
        }
        ConversionOutcome::Abandoned => {
            eprintln!("Abandoned, nothing was written.");
            0
        }
        ConversionOutcome::NeedsDecision { existing } => {
            bail!("Destination {} still needs a decision", existing.display())
        }
    };

    if args.json {
        if let Some(report) = outcome.report() {
            println!(
                "{}",
                serde_json::to_string_pretty(report).context("Failed to encode job report")?
            );
        }
    }
    if args.metrics {
        eprint!("{}", metrics::encode_metrics());
    }

    Ok(code)
}

fn doctor(config: &Config) -> i32 {
    let available = ffmpeg_available(&config.converter);
    match locate_ffmpeg(&config.converter) {
        Some(path) if available => println!("ffmpeg:  {}", path.display()),
        Some(path) => println!("ffmpeg:  {} (not executable)", path.display()),
        None => println!("ffmpeg:  not found"),
    }
    match locate_ffprobe(&config.converter) {
        Some(path) => println!("ffprobe: {}", path.display()),
        None => println!("ffprobe: not found (durations estimated from output)"),
    }
    println!("logs:    {}", config.converter.log_dir.display());
    if available {
        0
    } else {
        1
    }
}

fn formats() {
    for format in TargetFormat::ALL {
        let kind = if format.is_audio() { "audio" } else { "video" };
        println!("{:<5} {:<6} {}", format.extension(), kind, format.strategy().as_str());
    }
}
