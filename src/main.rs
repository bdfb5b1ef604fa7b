use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

mod classify;
mod engine;
mod error;
mod features;
mod form;
mod pose;
mod source;
mod window;

use engine::Engine;
use source::{Recording, Replay};

fn spinner(prefix: String) -> ProgressBar {
    ProgressBar::new_spinner()
        .with_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
        )
        .with_prefix(prefix)
}

fn open(path: &Path) -> Result<Recording> {
    let recording = Recording::open(path)?;
    info!(message = "opened recording", path = ?path, frames = recording.remaining());
    Ok(recording)
}

#[derive(serde::Serialize)]
struct RecordingPrediction<'a> {
    recording: &'a Path,
    #[serde(flatten)]
    prediction: classify::Prediction,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Check the form of one exercise recording.
    Analyze {
        /// Exercise performed in the recording, e.g. "squat" or "lat pulldown".
        #[structopt(short, long)]
        exercise: String,

        /// JSON landmark recording.
        #[structopt(parse(from_os_str))]
        recording: PathBuf,

        #[structopt(flatten)]
        settings: form::Settings,
    },

    /// Classify the exercise performed in each recording.
    Predict {
        /// JSON landmark recordings.
        #[structopt(required = true, parse(from_os_str))]
        recordings: Vec<PathBuf>,

        #[structopt(flatten)]
        settings: classify::Settings,
    },

    /// Describe the trained models.
    Models {
        #[structopt(flatten)]
        settings: classify::Settings,
    },
}

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long)]
    show_progress: bool,

    #[structopt(subcommand)]
    command: Command,
}

fn analyze(
    exercise: &str,
    path: &Path,
    settings: form::Settings,
    show_progress: bool,
) -> Result<()> {
    let mut recording = open(path)?;
    let progress = if show_progress {
        Some(spinner(exercise.to_owned()))
    } else {
        None
    };

    let mut engine = Engine::new(Replay);
    let report = engine
        .analyze_form(&mut recording, exercise, settings, progress.as_ref())
        .with_context(|| format!("failed analyzing form in {:?}", path))?;

    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn predict(recordings: &[PathBuf], settings: &classify::Settings, show_progress: bool) -> Result<()> {
    let ensemble = classify::Ensemble::load(settings).context("failed loading models")?;
    info!(
        message = "classifying recordings",
        recordings = recordings.len(),
        models = ensemble.len(),
        sequence_length = ensemble.sequence_length()
    );

    let multi_progress = MultiProgress::new();
    let predictions = crossbeam::thread::scope(|scope| {
        let handles = recordings
            .iter()
            .map(|path| {
                let ensemble = &ensemble;
                let progress = if show_progress {
                    Some(multi_progress.add(spinner(path.display().to_string())))
                } else {
                    None
                };
                scope.spawn(move |_| {
                    let mut recording = open(path)?;
                    let mut engine = Engine::new(Replay);
                    let prediction = engine
                        .predict_exercise(&mut recording, ensemble, progress.as_ref())
                        .with_context(|| format!("failed classifying {:?}", path))?;
                    if let Some(progress) = progress {
                        progress.finish_with_message(
                            prediction
                                .prediction
                                .clone()
                                .unwrap_or_else(|| "no prediction".to_owned()),
                        );
                    }
                    Ok::<_, anyhow::Error>(RecordingPrediction {
                        recording: path,
                        prediction,
                    })
                })
            })
            .collect::<Vec<_>>();

        if show_progress {
            multi_progress
                .join()
                .context("failed drawing progress")?;
        }

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| anyhow!("prediction thread panicked"))?
            })
            .collect::<Result<Vec<_>>>()
    })
    .map_err(|_| anyhow!("prediction thread scope panicked"))??;

    println!("{}", serde_json::to_string_pretty(&predictions)?);
    Ok(())
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(opt.log_level),
    )?;

    match opt.command {
        Command::Analyze {
            exercise,
            recording,
            settings,
        } => analyze(&exercise, &recording, settings, opt.show_progress),
        Command::Predict {
            recordings,
            settings,
        } => predict(&recordings, &settings, opt.show_progress),
        Command::Models { settings } => {
            let ensemble =
                classify::Ensemble::load(&settings).context("failed loading models")?;
            println!("{}", serde_json::to_string_pretty(&ensemble.summary())?);
            Ok(())
        }
    }
}
