mod experiment;
mod generator;
mod results;
mod stats;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pinball_core::predecoder::PredecoderKind;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PredecoderArg {
    Pinball,
    Clique,
}

impl From<PredecoderArg> for PredecoderKind {
    fn from(arg: PredecoderArg) -> Self {
        match arg {
            PredecoderArg::Pinball => PredecoderKind::Pinball,
            PredecoderArg::Clique => PredecoderKind::Clique,
        }
    }
}

impl std::fmt::Display for PredecoderArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        PredecoderKind::from(*self).fmt(f)
    }
}

#[derive(Parser)]
#[command(about = "Predecoder experiment harness for the rotated surface code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate phenomenological syndrome and ground-truth shot files.
    Gen {
        #[arg(long, default_value = "shots.b8")]
        b8: String,
        #[arg(long, default_value = "shots.truth.b8")]
        truth: String,
        #[arg(long, default_value_t = 3)]
        distance: usize,
        #[arg(long, default_value_t = 100_000)]
        shots: usize,
        #[arg(long, default_value_t = 0.001)]
        p: f64,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Decode a shot file and write a JSON result summary.
    Run {
        #[arg(long)]
        b8: String,
        #[arg(long)]
        truth: Option<String>,
        #[arg(long, default_value_t = 3)]
        distance: usize,
        #[arg(long, value_enum, default_value_t = PredecoderArg::Pinball)]
        predecoder: PredecoderArg,
        #[arg(long, default_value_t = 0.001)]
        p: f64,
        #[arg(long, default_value = "results")]
        output_dir: String,
        #[arg(long)]
        sim_id: Option<u64>,
        /// Decode at most this many shots from the file.
        #[arg(long)]
        shots: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Gen {
            b8,
            truth,
            distance,
            shots,
            p,
            seed,
        } => generator::generate_shot_files(&b8, &truth, distance, shots, p, seed),
        Commands::Run {
            b8,
            truth,
            distance,
            predecoder,
            p,
            output_dir,
            sim_id,
            shots,
        } => experiment::run_experiment(&experiment::RunConfig {
            b8_path: b8,
            truth_path: truth,
            distance,
            kind: predecoder.into(),
            physical_error_rate: p,
            output_dir,
            sim_id,
            max_shots: shots,
        }),
    }
}
