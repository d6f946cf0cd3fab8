//! Simulated panel that writes each frame to disk as a PBM image

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::epd::{FRAME_LEN, HEIGHT, WIDTH};
use crate::error::PanelError;
use crate::traits::Panel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Off,
    Awake,
    Asleep,
}

pub struct PbmPanel {
    path: PathBuf,
    state: PowerState,
    frames: usize,
}

impl PbmPanel {
    /// Frames are written to `path`, replacing the previous one.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: PowerState::Off,
            frames: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

/// Binary PBM of a panel frame; PBM uses 1 for black, the panel 1 for white.
pub fn encode_pbm(buffer: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buffer.len() + 16);
    let _ = write!(out, "P4\n{} {}\n", WIDTH, HEIGHT);
    out.extend(buffer.iter().map(|byte| !byte));
    out
}

impl Panel for PbmPanel {
    fn init(&mut self) -> Result<(), PanelError> {
        self.state = PowerState::Awake;
        Ok(())
    }

    fn display_image(&mut self, buffer: &[u8]) -> Result<(), PanelError> {
        if buffer.len() != FRAME_LEN {
            return Err(PanelError::FrameSize {
                expected: FRAME_LEN,
                actual: buffer.len(),
            });
        }
        fs::write(&self.path, encode_pbm(buffer))?;
        self.frames += 1;
        info!("[SIM] Wrote frame {} to {}", self.frames, self.path.display());
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), PanelError> {
        self.state = PowerState::Asleep;
        Ok(())
    }

    fn module_exit(&mut self) -> Result<(), PanelError> {
        self.state = PowerState::Off;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_frame_encodes_to_zero_bits() {
        let pbm = encode_pbm(&[0xFF; FRAME_LEN]);
        let header = b"P4\n176 264\n";
        assert_eq!(&pbm[..header.len()], header);
        assert!(pbm[header.len()..].iter().all(|&b| b == 0));
        assert_eq!(pbm.len(), header.len() + FRAME_LEN);
    }

    #[test]
    fn frames_land_on_disk_and_power_state_follows() {
        let dir = tempfile::tempdir().unwrap();
        let mut panel = PbmPanel::new(dir.path().join("frame.pbm"));
        assert_eq!(panel.state(), PowerState::Off);

        panel.init().unwrap();
        panel.display_image(&[0x00; FRAME_LEN]).unwrap();
        panel.sleep().unwrap();

        assert_eq!(panel.state(), PowerState::Asleep);
        assert_eq!(panel.frames(), 1);
        let written = fs::read(panel.path()).unwrap();
        assert!(written.ends_with(&[0xFF; 16]));
    }

    #[test]
    fn each_frame_replaces_the_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut panel = PbmPanel::new(dir.path().join("frame.pbm"));

        panel.display_image(&[0x00; FRAME_LEN]).unwrap();
        panel.display_image(&[0xFF; FRAME_LEN]).unwrap();

        assert_eq!(panel.frames(), 2);
        assert_eq!(fs::read(panel.path()).unwrap(), encode_pbm(&[0xFF; FRAME_LEN]));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let mut panel = PbmPanel::new("/nonexistent-dir/frame.pbm");
        assert!(matches!(
            panel.display_image(&[0xFF; FRAME_LEN]),
            Err(PanelError::Io(_))
        ));
    }
}
