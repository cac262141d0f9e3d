use std::{
    process::exit,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, Result};

use silkmotion::{
    config::Config,
    keys::{DryRunSynth, InputSynth},
    log,
    logger::{ActionLog, FileLogger},
    net::UdpSource,
    runtime::Controller,
};

fn main() {
    let logger: Arc<dyn ActionLog> = match FileLogger::from_appdata() {
        Ok(logger) => Arc::new(logger),
        Err(e) => {
            eprintln!("Failed to create logger: {e}");
            exit(1);
        }
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log!(logger, "❌ Failed to load config: {e}");
            exit(2);
        }
    };

    match run(config, logger.clone()) {
        Ok(_) => {
            log!(logger, "Controller exited.");
        }
        Err(e) => {
            log!(logger, "❌ Controller failed: {e:#}");
            exit(3);
        }
    }
}

fn run(config: Config, logger: Arc<dyn ActionLog>) -> Result<()> {
    let mut source = UdpSource::bind(&config.network)?;
    log!(
        logger,
        "🎮 Listening for phone telemetry on {}:{}",
        config.network.listen_ip,
        config.network.listen_port
    );

    // Ctrl+C raises the stop flag; the ingestion loop observes it within one
    // socket read timeout and tears down before returning.
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_stop.store(true, Ordering::SeqCst))
        .context("Failed to install interrupt handler")?;

    let synth: Arc<dyn InputSynth> = Arc::new(DryRunSynth::new(logger.clone()));
    let mut controller = Controller::new(
        config.thresholds.clone(),
        config.keys.clone(),
        synth,
        logger.clone(),
    );
    controller.run(&mut source, &stop);

    log!(logger, "⏹ Stop requested, controller shut down.");
    Ok(())
}
