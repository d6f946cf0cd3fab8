use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use anyhow::Context;
use env_logger::Env;
use log::{error, info};

use netpanel::{
    config::Config, fonts::FontBundle, hardware, logic::Dashboard, network::SystemProbe,
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();

    info!("=== netpanel ===");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::default();

    // The flag stops a running speed test, the channel ends the wait
    let stopping = Arc::new(AtomicBool::new(false));
    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    {
        let stopping = Arc::clone(&stopping);
        ctrlc::set_handler(move || {
            stopping.store(true, Ordering::SeqCst);
            let _ = shutdown_tx.send(());
        })
        .context("installing interrupt handler")?;
    }

    let panel = hardware::open_panel(&config.panel).context("opening e-paper panel")?;

    let font_dir = config.font_dir()?;
    let fonts = FontBundle::load(&font_dir)?;

    let probe = SystemProbe::new(&config).with_shutdown(stopping);
    let mut dashboard = Dashboard::start(panel, probe, fonts, config.interface)
        .context("starting dashboard")?;

    dashboard.run(&shutdown_rx)?;
    Ok(())
}
