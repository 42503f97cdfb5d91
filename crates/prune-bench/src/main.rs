//! Compare a full-history manager/worker workflow against a context-pruned
//! one on a local Ollama server and print the results table.
//!
//! # Examples
//!
//! ```sh
//! # Defaults: llama3.2 manager, llama3.2:1b worker, one trial
//! prune-bench
//!
//! # Five trials against another host, with request timeouts
//! prune-bench --endpoint http://gpu-box:11434/api/chat --trials 5 --timeout-secs 300
//!
//! # Different models and task
//! prune-bench --manager-model qwen2.5:7b --worker-model qwen2.5:0.5b \
//!   --task "Write a Rust CLI that counts words in a file."
//! ```

use std::process;
use std::time::Duration;

use clap::Parser;
use prune_bench::config::BenchConfig;
use prune_bench::events::{
    BenchEvent, CompositeEventHandler, EventHandler, LoggingHandler, progress_line,
};
use prune_bench::report::{Report, start_banner};
use prune_bench::workflow::run_trials;
use prune_bench::{
    DEFAULT_MANAGER_MODEL, DEFAULT_NUM_CTX, DEFAULT_TASK, DEFAULT_TEMPERATURE,
    DEFAULT_WORKER_MODEL, OLLAMA_URL, OllamaClient,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Benchmark full-history versus context-pruned prompting on a local Ollama
/// server.
#[derive(Parser)]
#[command(name = "prune-bench")]
struct Cli {
    // ── Server ─────────────────────────────────────────────────
    /// Chat endpoint URL
    #[arg(long, env = "OLLAMA_URL", default_value = OLLAMA_URL)]
    endpoint: String,

    /// Overall per-request timeout in seconds (default: none)
    #[arg(long)]
    timeout_secs: Option<u64>,

    // ── Models ─────────────────────────────────────────────────
    /// Model that plans the task
    #[arg(long, default_value = DEFAULT_MANAGER_MODEL)]
    manager_model: String,

    /// Model that executes the instruction
    #[arg(long, default_value = DEFAULT_WORKER_MODEL)]
    worker_model: String,

    // ── Experiment ─────────────────────────────────────────────
    /// Task given to the manager in both workflows
    #[arg(long, default_value = DEFAULT_TASK)]
    task: String,

    /// Context window forced on every call
    #[arg(long, default_value_t = DEFAULT_NUM_CTX)]
    num_ctx: u32,

    /// Sampling temperature
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Number of times to run both workflows
    #[arg(long, default_value_t = 1)]
    trials: u32,

    /// Hardware label for the start banner
    #[arg(long)]
    device: Option<String>,

    // ── Output ─────────────────────────────────────────────────
    /// Log request/response details to stderr
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> BenchConfig {
        let mut config = BenchConfig::default()
            .with_endpoint(&self.endpoint)
            .with_models(&self.manager_model, &self.worker_model)
            .with_task(&self.task)
            .with_num_ctx(self.num_ctx)
            .with_temperature(self.temperature)
            .with_trials(self.trials);
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(device) = &self.device {
            config = config.with_device(device);
        }
        config
    }
}

/// Event handler that prints progress lines to stdout.
struct ProgressPrinter;

impl EventHandler for ProgressPrinter {
    fn on_event(&self, event: &BenchEvent<'_>) {
        if let Some(line) = progress_line(event) {
            println!("{line}");
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: &Cli) -> Result<String, String> {
    let config = cli.to_config();
    config
        .validate()
        .map_err(|e| format!("invalid configuration: {e}"))?;

    let client = OllamaClient::from_config(&config).map_err(|e| e.to_string())?;

    println!("{}", start_banner(config.device_label()));

    let handler = CompositeEventHandler::new()
        .with(ProgressPrinter)
        .with(LoggingHandler);
    let trials = run_trials(&client, &config, &handler).await;

    Ok(Report::from_trials(&trials).render())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(report) => println!("{report}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
