// Commandline argument parser using clap for soundgrid

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct GridArgs {
    #[command(subcommand, long_about)]
    /// Which task to perform, a simulated session or offline analysis
    pub command: CommandTask,

    /// Path to a ron session configuration; defaults are used if omitted
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Directory the session artifacts are written to
    #[arg(short = 'o', long = "out", default_value = "results")]
    pub outdir: String,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CommandTask {
    /// Run a simulated capture session and analyze it end to end
    #[command(about)]
    Simulate(SimulateCommand),

    /// Analyze a previously recorded session from its WAV and track files
    #[command(about)]
    Analyze(AnalyzeCommand),
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct SimulateCommand {
    /// Frame rate of the simulated camera, in frames per second
    #[arg(short = 'f', long = "fps", default_value_t = 30.0)]
    pub fps: f64,

    /// Sample rate of the synthesized audio, in Hz
    #[arg(short = 's', long = "samp", default_value_t = 48000)]
    pub audio_rate: u32,

    /// Frequency of the synthesized test tone, in Hz
    #[arg(long = "tone", default_value_t = 440.0)]
    pub tone: f32,
}

#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct AnalyzeCommand {
    /// WAV file holding the session audio
    #[arg(short = 'a', long = "audio")]
    pub audio: String,

    /// Directory holding the saved track.x / track.y files
    #[arg(short = 't', long = "track")]
    pub trackdir: String,

    /// Frame rate the video was recorded at, in frames per second
    #[arg(short = 'f', long = "fps")]
    pub fps: f64,

    /// Frame width of the recorded video, in pixels
    #[arg(long = "width")]
    pub width: u32,

    /// Frame height of the recorded video, in pixels
    #[arg(long = "height")]
    pub height: u32,
}
