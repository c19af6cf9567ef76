//! The soundgrid CLI: either runs a fully simulated tracking session end
//! to end, or re-analyzes a previously recorded session from its saved
//! WAV and track files.

use clap::Parser;
use hound::{SampleFormat, WavReader};
use log::{info, warn};
use soundgrid::{
    args::{
        AnalyzeCommand,
        CommandTask::{Analyze, Simulate},
        GridArgs, SimulateCommand,
    },
    config::TrackingConfig,
    dummy_capture::{cell_tour, DummyDetector, DummySource},
    events::TrackerEvent,
    persist,
    pipeline::{self, AnalysisInput},
    tracker::{Recording, Tracker},
    Grid, TrackError,
};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::mpsc::channel;
use std::thread;

// Example:
// cargo run --bin soundgrid --
//                           --config  session.ron
//                           --out     results
//                           simulate
//                           --fps     30
//                           --samp    48000

const SIM_WIDTH: u32 = 640;
const SIM_HEIGHT: u32 = 480;
const SIM_JITTER: f64 = 3.0;
const SIM_DROPOUT: f64 = 0.05;

fn main() {
    env_logger::init();
    let args = GridArgs::parse();

    let config = match &args.config {
        Some(path) => TrackingConfig::from_path(path),
        None => Ok(TrackingConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(error) => {
            eprintln!("could not load configuration: {}", error);
            std::process::exit(1);
        }
    };

    let result = match args.command.clone() {
        Simulate(cmd) => simulate(&cmd, &config, &args.outdir),
        Analyze(cmd) => analyze(&cmd, &config, &args.outdir),
    };

    if let Err(error) = result {
        eprintln!("session failed: {}", error);
        std::process::exit(1);
    }
}

/// Runs the real-time phase against the dummy source, synthesizes a test
/// tone for the audio channel, then analyzes and persists the session.
fn simulate(cmd: &SimulateCommand, config: &TrackingConfig, outdir: &str) -> Result<(), TrackError> {
    let grid = Grid::new(
        SIM_WIDTH as f64,
        SIM_HEIGHT as f64,
        config.rows,
        config.cols,
        config.padding,
    );

    // enough frames to dwell past the target in every cell, with slack
    // for dropouts, then the source runs dry and ends the loop anyway
    let frames_per_cell = (config.target_dwell_secs * cmd.fps).ceil() as usize + 5;
    let total_frames = 2 * frames_per_cell * config.rows * config.cols;

    let source = DummySource::new(SIM_WIDTH, SIM_HEIGHT, cmd.fps, total_frames);
    let detector = DummyDetector::new(cell_tour(&grid), frames_per_cell, SIM_JITTER, SIM_DROPOUT);

    let (tx, rx) = channel();
    let tracker = Tracker::new(source, detector, config, tx);
    let stop = tracker.stop_handle();
    let handle = thread::spawn(move || tracker.run());

    // Listen until the loop reports back; completion stops it cleanly.
    for event in &rx {
        match event {
            TrackerEvent::CameraCharacteristics { height, width, fps } => {
                info!("camera stream: {}x{} at {} fps", width, height, fps);
            }
            TrackerEvent::AllCellsComplete => {
                info!("every cell reached its dwell target, stopping");
                stop.store(true, Ordering::Relaxed);
            }
            TrackerEvent::RecordingStopped { series } => {
                info!("recorded {} frames", series.len());
                break;
            }
            TrackerEvent::AnalysisProgress { .. } => {}
        }
    }
    let recording: Recording = handle.join().expect("tracker thread panicked");

    let secs = recording.series.len() as f64 / recording.frame_rate;
    let audio = sine_tone(cmd.tone, cmd.audio_rate, secs);

    run_pipeline(recording, audio, cmd.audio_rate, config, outdir)
}

/// Loads the saved artifacts of an earlier recording and re-runs the
/// offline pipeline over them.
fn analyze(cmd: &AnalyzeCommand, config: &TrackingConfig, outdir: &str) -> Result<(), TrackError> {
    let grid = Grid::new(
        cmd.width as f64,
        cmd.height as f64,
        config.rows,
        config.cols,
        config.padding,
    );
    let series = persist::load_track(&cmd.trackdir)?;
    let (audio, audio_rate) = wav_samples(&cmd.audio)?;

    let recording = Recording {
        series,
        dwell_times: vec![vec![0.0; config.cols]; config.rows],
        grid,
        frame_rate: cmd.fps,
    };

    run_pipeline(recording, audio, audio_rate, config, outdir)
}

/// The shared offline half: analyze, then persist everything only when
/// the whole pipeline succeeded.
fn run_pipeline(
    recording: Recording,
    audio: Vec<f32>,
    audio_rate: u32,
    config: &TrackingConfig,
    outdir: &str,
) -> Result<(), TrackError> {
    let (tx, progress_rx) = channel();

    let input = AnalysisInput {
        series: recording.series.clone(),
        audio,
        audio_rate,
        frame_rate: recording.frame_rate,
    };
    let output = pipeline::analyze(input, &recording.grid, config, &tx)?;
    drop(tx);
    for event in progress_rx.try_iter() {
        if let TrackerEvent::AnalysisProgress { cell, index } = event {
            info!("analyzed cell {:?} ({})", cell, index + 1);
        }
    }

    let outdir = Path::new(outdir);
    persist::save_track(outdir, &recording.series)?;
    persist::save_spectrum(outdir, &output.spectrum)?;
    persist::export_cell_audio(outdir, &output.cell_audio, audio_rate)?;
    config.to_path(outdir.join("session.ron"))?;

    info!("artifacts written to {}", outdir.display());
    Ok(())
}

/// A mono sine tone, the simulated stand-in for the microphone channel.
fn sine_tone(freq: f32, rate: u32, secs: f64) -> Vec<f32> {
    (0..(secs * rate as f64) as usize)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin() * 0.5)
        .collect()
}

/// Reads a WAV file into mono f32 samples, averaging channels down and
/// scaling integer formats to [-1, 1].
fn wav_samples(path: &str) -> Result<(Vec<f32>, u32), TrackError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, hound::Error>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, hound::Error>>()?
        }
    };

    let channels = spec.channels as usize;
    let mono = if channels == 1 {
        interleaved
    } else {
        warn!("averaging {} channels down to mono", channels);
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok((mono, spec.sample_rate))
}
