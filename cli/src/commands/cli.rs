use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "skein",
    about = "Run a command template, module chain or text functions over every input line",
    version
)]
pub struct Args {
    /// Single literal work item.
    #[arg(short = 's', long = "string", group = "source")]
    pub string: Option<String>,

    /// File of work items, one per line. Piped stdin is used when neither
    /// this nor --string is given.
    #[arg(short = 'i', long = "input", group = "source")]
    pub input: Option<PathBuf>,

    /// Command template; every placeholder occurrence is replaced with the
    /// work item and embedded function calls are evaluated.
    #[arg(short = 'c', long = "command")]
    pub command: Option<String>,

    /// Module specification: category:name[|category:name...].
    #[arg(short = 'm', long = "module")]
    pub module: Option<String>,

    /// Placeholder token substituted into the command template.
    #[arg(long, value_name = "TOKEN")]
    pub placeholder: Option<String>,

    /// Fan-out mode: every stage consumes the original input.
    #[arg(long)]
    pub fanout: bool,

    /// No-shell mode: evaluate the template without spawning a subprocess.
    #[arg(long, conflicts_with = "pipe")]
    pub direct: bool,

    /// Secondary command fed the primary command's stdout.
    #[arg(long)]
    pub pipe: Option<String>,

    /// Worker pool size.
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Per-worker delay in milliseconds between dispatches.
    #[arg(long = "delay", value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Max retries per failing item (attempts = retries + 1).
    #[arg(long)]
    pub retries: Option<u32>,

    /// Base retry delay in milliseconds.
    #[arg(long = "retry-delay", value_name = "MS")]
    pub retry_delay_ms: Option<u64>,

    /// Per-item subprocess timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Substring predicate applied to work items and partial results.
    #[arg(long)]
    pub filter: Option<String>,

    /// Write results to FILE; with no FILE, a timestamped name is derived
    /// from the output format.
    #[arg(short = 'o', long = "output", value_name = "FILE", num_args = 0..=1)]
    pub output: Option<Option<PathBuf>>,

    /// Output representation.
    #[arg(long, value_parser = ["text", "table", "json"])]
    pub format: Option<String>,

    /// Buffer out-of-order completions up to WINDOW records.
    #[arg(long, value_name = "WINDOW")]
    pub ordered: Option<usize>,

    /// Bypass dangerous-pattern signatures. Size ceilings remain active.
    #[arg(long)]
    pub allow_dangerous: bool,

    /// Bypass batch size/count ceilings. Pattern signatures remain active.
    #[arg(long)]
    pub no_limits: bool,

    /// Proxy URL handed to module options.
    #[arg(long)]
    pub proxy: Option<String>,

    /// Per-module option override (KEY=VALUE). Can be given multiple times.
    #[arg(long = "opt", value_name = "K=V", action = clap::ArgAction::Append)]
    pub opt: Vec<String>,

    /// List the registered modules and exit.
    #[arg(long)]
    pub list_modules: bool,

    /// Log errors only and suppress the progress bar.
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}
