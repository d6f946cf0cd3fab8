//! Error types for the providers, the panel and the refresh loop

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Infrastructure failures of the measurement providers.
///
/// "No signal" or "no result" is never an error; those surface as absent
/// fields in [`crate::model::WirelessInfo`] and
/// [`crate::model::PerformanceReport`].
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Invalid interface name '{0}'")]
    InvalidInterface(String),

    #[error("Interface '{name}' has no IPv4 address: {source}")]
    Interface {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{0}' was stopped by a shutdown request")]
    Interrupted(String),
}

/// Low-level failures talking to the display panel.
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("SPI error: {0}")]
    Spi(String),

    #[error("GPIO error: {0}")]
    Gpio(String),

    #[error("Display BUSY timeout after {0} ms")]
    BusyTimeout(u32),

    #[error("Frame is {actual} bytes, panel expects {expected}")]
    FrameSize { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum FontError {
    #[error("Failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Font {0} is not a valid TrueType/OpenType file")]
    Invalid(PathBuf),

    #[error("Cannot locate font directory: {0}")]
    Location(#[source] io::Error),
}

/// Reasons the refresh loop stops.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Panel(#[from] PanelError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
