//! Render a sample dashboard to a PBM file, no hardware needed.
//!
//! Usage: `preview [OUTPUT.pbm] [FONT_DIR]`. Without a font directory the
//! built-in bitmap fonts are used.

use std::env;
use std::net::Ipv4Addr;
use std::path::Path;

use anyhow::Context;
use env_logger::Env;
use log::info;

use netpanel::{
    display::compose,
    fonts::FontBundle,
    model::{Snapshot, ip_string},
    sim::PbmPanel,
    traits::Panel,
};

fn sample_snapshot() -> Snapshot {
    Snapshot {
        ip_address: ip_string(Ipv4Addr::new(192, 168, 1, 20)),
        ssid: "HomeNet".into(),
        signal_dbm: -55,
        ping_ms: "12.3".into(),
        download_mbps: "95.4".into(),
        upload_mbps: "40.1".into(),
        jitter_ms: "1.2".into(),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "preview.pbm".to_string());
    let fonts = match args.next() {
        Some(dir) => FontBundle::load(Path::new(&dir)).context("loading fonts")?,
        None => FontBundle::builtin(),
    };

    let frame = compose(&sample_snapshot(), &fonts);

    let mut panel = PbmPanel::new(&output);
    panel.init()?;
    panel.display_image(frame.buffer())?;
    panel.sleep()?;

    info!("Preview written to {}", output);
    Ok(())
}
