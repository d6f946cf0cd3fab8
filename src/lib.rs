//! E-paper network status dashboard
//!
//! Every hour the dashboard samples the wireless link and a speed test, lays
//! the results out on a 1-bit canvas and pushes it to a Waveshare 2.7" panel.

pub mod config;
pub mod display;
pub mod epd;
pub mod error;
pub mod fonts;
pub mod hardware;
pub mod logic;
pub mod model;
pub mod network;
pub mod sim;
pub mod speedtest;
pub mod traits;
