use anyhow::Result;
use clap::Parser;
use console::style;
use lecture_segmenter::cli::Cli;
use lecture_segmenter::component::{LectureBuilder, Toolchain};
use lecture_segmenter::config::{Config, LectureJob};
use lecture_segmenter::init;
use lecture_segmenter::signal::setup_shutdown_signal;
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init::init(cli.verbose);

    match run(&cli) {
        Ok(()) => {
            info!("Program exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Program error: {e:#}");
            eprintln!("{} {e:#}", style("錯誤:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let shutdown_signal = setup_shutdown_signal()?;

    let config = match &cli.config {
        Some(path) => Config::load(path, true)?,
        None => Config::new()?,
    };
    let job = LectureJob::from_cli(cli, &config.settings)?;
    let tools = Toolchain::ffmpeg(&job);

    LectureBuilder::new(job, tools, shutdown_signal).run()?;
    Ok(())
}
