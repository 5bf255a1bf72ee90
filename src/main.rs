// src/main.rs
use anyhow::Context;
use anytype_loader::{AnytypeLoader, CommandLineInput, Document, LoaderConfig, LoaderError, LoaderOptions};
use clap::Parser;
use futures::StreamExt;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;
use std::io::{self, BufWriter, Write};

/// Sets up logging. Stdout carries the documents, so the console appender
/// writes to stderr.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("anytype_loader.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Writes one document as a JSON line.
fn emit(out: &mut impl Write, document: &Document) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, document)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Blocking, one object at a time.
fn run_sequential(loader: &AnytypeLoader, out: &mut impl Write) -> anyhow::Result<usize> {
    let mut count = 0;
    for document in loader.lazy_load() {
        emit(out, &document?)?;
        count += 1;
    }
    Ok(count)
}

/// Bounded concurrent fetches on a tokio runtime; stops on Ctrl-C.
fn run_concurrent(loader: &AnytypeLoader, out: &mut impl Write) -> anyhow::Result<usize> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    runtime.block_on(async {
        let interrupted = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        let mut documents = loader.alazy_load_until(interrupted);
        let mut count = 0;
        while let Some(document) = documents.next().await {
            emit(out, &document?)?;
            count += 1;
        }
        Ok(count)
    })
}

fn run(cli: CommandLineInput) -> anyhow::Result<()> {
    let config = LoaderConfig::resolve(LoaderOptions::from(&cli)).context("Invalid options")?;
    let loader = AnytypeLoader::new(config);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let result = if cli.sequential {
        run_sequential(&loader, &mut out)
    } else {
        run_concurrent(&loader, &mut out)
    };
    out.flush()?;
    loader.close();

    match result {
        Ok(count) => {
            log::info!("Loaded {} documents", count);
            Ok(())
        }
        Err(e) if matches!(e.downcast_ref::<LoaderError>(), Some(LoaderError::Cancelled)) => {
            eprintln!("Interrupted");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    run(cli)
}
