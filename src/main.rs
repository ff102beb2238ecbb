use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use social_golfer::io::{read_instance, save_solution, verify_solution, write_solution};
use social_golfer::{solve_parallel, SearchParams};

#[derive(Parser)]
#[command(name = "social-golfer", about = "Schedules golfers so that few pairs meet twice")]
struct Cli {
    /// File holding `nb_groups group_size nb_weeks`
    instance_file: PathBuf,

    /// Where to write the schedule; printed to stdout when omitted
    output_file: Option<PathBuf>,

    /// Search time in seconds
    #[arg(default_value_t = 10)]
    time_limit: u64,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Restart from a random schedule after this many iterations without improvement
    #[arg(long)]
    restart_after: Option<u64>,

    #[arg(long)]
    max_iterations: Option<u64>,

    #[arg(long)]
    initial_temperature: Option<f64>,

    #[arg(long)]
    final_temperature: Option<f64>,
}

impl Cli {
    fn params(&self) -> SearchParams {
        let defaults = SearchParams::default();
        SearchParams {
            time_limit: Duration::from_secs(self.time_limit),
            max_iterations: self.max_iterations,
            initial_temperature: self.initial_temperature.unwrap_or(defaults.initial_temperature),
            final_temperature: self.final_temperature.unwrap_or(defaults.final_temperature),
            restart_after: self.restart_after,
            seed: self.seed,
            ..defaults
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    info!("Processing input file: {}", cli.instance_file.display());
    let instance = read_instance(&cli.instance_file)
        .with_context(|| format!("failed to read instance {}", cli.instance_file.display()))?;
    let outcome = solve_parallel(&instance, &cli.params(), cli.threads);

    match &cli.output_file {
        Some(path) => {
            save_solution(path, &outcome.incumbent)
                .with_context(|| format!("failed to write solution {}", path.display()))?;
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read back solution {}", path.display()))?;
            let verification = verify_solution(&text, &instance)?;
            if !verification.is_consistent() {
                warn!("written schedule does not match its objective: {:?}", verification);
            }
            let valid = verification.is_valid();
            if valid {
                info!("The solution is valid.");
            } else {
                info!("The solution is invalid: {} redundant meetings.", verification.reported);
            }
            let mut check = path.clone().into_os_string();
            check.push(".check");
            fs::write(&check, if valid { "valid\n" } else { "invalid\n" })
                .with_context(|| format!("failed to write {}", PathBuf::from(&check).display()))?;
        }
        None => write_solution(io::stdout().lock(), &outcome.incumbent)?,
    }
    Ok(())
}
