// src/main.rs
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::oneshot;
use tracing::{info, warn};

use gesture_control::{
    ActionQueue, GestureConfig, GesturePipeline, RecognizerStats, SessionRecorder, TickInput,
    ViewState,
};

#[derive(Parser, Debug)]
#[command(
    name = "gesture_control",
    about = "Replay a recorded hand-landmark session through the gesture pipeline"
)]
struct Cli {
    /// JSON-lines session, one tick per line
    session: PathBuf,

    /// Config file (default: the platform config dir, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a CSV and an HTML report under this directory
    #[arg(long)]
    export: Option<PathBuf>,

    /// How often the consumer polls the action queue, in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Sleep between ticks to match the recorded timestamps
    #[arg(long)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GestureConfig::load(path)
            .with_context(|| format!("invalid config {}", path.display()))?,
        None => GestureConfig::load_or_default().context("invalid default config")?,
    };

    let queue = ActionQueue::new(config.diagnostics.queue_capacity);
    let view = ViewState::new(config.view.clone());
    let (done_tx, done_rx) = oneshot::channel();

    let consumer = tokio::spawn(consume(
        queue.clone(),
        view,
        Duration::from_millis(cli.poll_ms.max(1)),
        done_rx,
    ));

    let stats = tokio::task::spawn_blocking(move || replay(&cli, &config, queue))
        .await
        .context("replay task panicked")??;

    let _ = done_tx.send(());
    let view = consumer.await.context("consumer task panicked")?;

    info!(
        "Replay finished: {} ticks processed, {} missing, {} gestures emitted",
        stats.processed, stats.missing_ticks, stats.emitted
    );
    info!(
        "Final camera: {:?} (paused: {}, selections: {})",
        view.camera, view.paused, view.selections
    );
    Ok(())
}

/// Push every recorded tick through the pipeline. Runs on a blocking thread.
fn replay(cli: &Cli, config: &GestureConfig, mut queue: ActionQueue) -> Result<RecognizerStats> {
    let file = File::open(&cli.session)
        .with_context(|| format!("failed to open {}", cli.session.display()))?;
    let mut pipeline = GesturePipeline::new(config)?;
    let mut recorder = cli
        .export
        .as_ref()
        .map(|dir| SessionRecorder::new(dir, None));

    info!("Replaying {}", cli.session.display());
    let mut previous: Option<f64> = None;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let input: TickInput = match serde_json::from_str(&line) {
            Ok(input) => input,
            Err(e) => {
                warn!("Skipping line {}: {}", index + 1, e);
                continue;
            }
        };

        if cli.realtime {
            if let Some(wait) = previous.and_then(|t| realtime_gap(t, input.timestamp)) {
                std::thread::sleep(wait);
            }
            previous = Some(input.timestamp);
        }

        let outcome = pipeline.run(&input, &mut queue);
        if let Some(recorder) = recorder.as_mut() {
            recorder.add_tick(&input, &outcome)?;
        }
    }

    let metrics = pipeline.metrics();
    info!(
        "Average processing time {:.3} ms ({:.0} ticks/s)",
        metrics.avg_processing_time * 1000.0,
        metrics.avg_fps
    );

    if let Some(recorder) = &recorder {
        let csv = recorder.export_csv()?;
        let report = recorder.generate_report()?;
        info!("Exported {} and {}", csv.display(), report.display());
    }

    Ok(pipeline.stats())
}

/// Wall-clock wait between two recorded ticks. `None` for a non-positive
/// gap or one too large for a `Duration`.
fn realtime_gap(previous: f64, next: f64) -> Option<Duration> {
    let gap = next - previous;
    if gap <= 0.0 || gap.is_nan() {
        return None;
    }
    match Duration::try_from_secs_f64(gap) {
        Ok(wait) => Some(wait),
        Err(e) => {
            warn!("Not waiting {} s between ticks: {}", gap, e);
            None
        }
    }
}

/// Poll the queue like the viewer client: print each action as a JSON line
/// and apply it to the local view.
async fn consume(
    queue: ActionQueue,
    mut view: ViewState,
    period: Duration,
    mut done: oneshot::Receiver<()>,
) -> ViewState {
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = interval.tick() => deliver(&queue, &mut view),
            _ = &mut done => {
                deliver(&queue, &mut view);
                break;
            }
        }
    }
    view
}

fn deliver(queue: &ActionQueue, view: &mut ViewState) {
    for action in queue.drain() {
        match serde_json::to_string(&action) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to encode action {}: {}", action.kind, e),
        }
        view.apply(&action);
    }
}
