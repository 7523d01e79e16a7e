use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use codeconcat::cli::{self, Cli, ColorMode};
use codeconcat::config;
use codeconcat::error::CodeConcatError;
use codeconcat::pipeline;

fn main() {
    let cli = Cli::parse();

    // Configure color output
    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    // Init tracing
    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{} {err}", "[codeconcat] error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CodeConcatError> {
    if cli.init {
        let path = config::write_default_config(&cli.target_path, cli.force)?;
        println!(
            "{} Created config at {}",
            "ok".green().bold(),
            path.display()
        );
        return Ok(());
    }

    let config = cli::build_config(&cli)?;
    let report = pipeline::run(&config)?;

    if !cli.quiet {
        eprintln!(
            "{} {} file{}, {} declaration{}, {} doc{}, {} security issue{}, ~{} tokens -> {}",
            "done:".green().bold(),
            report.files,
            plural(report.files),
            report.declarations,
            plural(report.declarations),
            report.docs,
            plural(report.docs),
            report.security_issues,
            plural(report.security_issues),
            report.token_estimate,
            report.output_path.bold(),
        );
    }

    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
