//! Binary entrypoint: runs one slideshow widget against an in-memory
//! presenter, driven by text commands on stdin.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use img_slides::config::SlidesConfig;
use img_slides::control::Command;
use img_slides::events::{Tick, WidgetEvent};
use img_slides::visual::MarkerBoard;
use img_slides::{Slideshow, WidgetHandle, widget};

#[derive(Debug, Parser)]
#[command(
    name = "img-slides",
    version,
    about = "Auto-advancing image slides driven from stdin"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the transition interval (seconds)
    #[arg(long, value_name = "SECONDS")]
    interval: Option<f64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(
            format!("img_slides={level}")
                .parse()
                .context("invalid log directive")?,
        );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        interval,
        verbose,
    } = Args::parse();
    init_tracing(verbose)?;

    let mut cfg = SlidesConfig::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?;
    if let Some(secs) = interval {
        cfg.transition_interval = secs;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;
    info!("Loaded configuration from {}:\n{:#?}", config.display(), cfg);

    let (events_tx, events_rx) = mpsc::channel::<WidgetEvent>(16); // Input -> Widget
    let (ticks_tx, ticks_rx) = mpsc::channel::<Tick>(4); // Timer -> Widget
    let cancel = CancellationToken::new();

    let slides = cfg.slides.clone();
    let slideshow = Slideshow::connect(cfg, slides, MarkerBoard::new(), ticks_tx)
        .context("failed to connect slideshow")?;

    let widget_task = tokio::spawn(widget::run(
        slideshow,
        events_rx,
        ticks_rx,
        cancel.clone(),
    ));

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let handle = WidgetHandle::new(events_tx);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line.context("failed to read stdin")?,
        };
        let Some(line) = line else {
            info!("stdin closed; initiating shutdown");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Event(event)) => {
                if let Err(err) = handle.send(event).await {
                    warn!("{err}");
                    break;
                }
            }
            Err(err) => warn!("{err}"),
        }
    }
    cancel.cancel();

    let slideshow = widget_task.await.context("widget task failed")?;
    info!(
        index = ?slideshow.current_index(),
        shown = ?slideshow.presenter().shown_slides(),
        "slideshow stopped"
    );
    Ok(())
}
