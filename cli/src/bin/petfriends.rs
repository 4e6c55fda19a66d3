#![allow(clippy::result_large_err)]

use clap::Parser;
use human_panic::{Metadata, setup_panic};
use miette::GraphicalReportHandler;
use petfriends_cli::cli::Cli;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            GraphicalReportHandler::new()
                .with_theme(miette::GraphicalTheme::unicode())
                .with_context_lines(5),
        )
    }))
    .ok(); // Ignore if already set

    setup_panic!(
        Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            .homepage(env!("CARGO_PKG_HOMEPAGE"))
            .support(
                "Please open an issue on github. Attach the outputs of the above referenced report file."
            ).authors(env!("CARGO_PKG_AUTHORS"))
    );

    // PF_* may come from a .env file, clap reads the environment while parsing
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level: tracing::Level = cli.log_level.clone().into();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(false)
                .with_line_number(false),
        )
        .with(LevelFilter::from_level(log_level))
        .try_init()
        .expect("Unable to initialize logging layer");

    match cli.run() {
        Ok(code) => code,
        Err(e) => {
            let report: miette::Report = e.into();
            eprintln!("{report:?}");
            ExitCode::FAILURE
        },
    }
}
