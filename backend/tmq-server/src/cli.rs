use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tmq-server")]
#[command(about = "Credential rotation and queue supervision for a shared message broker")]
#[command(version)]
pub struct Cli {
    /// Run a single tick and exit; the exit code is non-zero if the tick failed
    #[arg(long)]
    pub once: bool,
}
