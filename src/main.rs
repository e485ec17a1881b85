use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = line_art::config::Cli::parse();
    line_art::app::run(cli)
}
