use embedded_graphics::{
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use epd_waveshare::{
    buffer_len,
    color::Color,
    graphics::{Display, DisplayRotation},
};

use crate::epd::{HEIGHT, WIDTH};
use crate::fonts::{FontBundle, FontRole};
use crate::model::Snapshot;

/// 1-bit frame for the 2.7" panel, drawn in landscape orientation.
pub type PanelBuffer =
    Display<WIDTH, HEIGHT, false, { buffer_len(WIDTH as usize, HEIGHT as usize) }, Color>;

const IP_Y: i32 = 5;
const SSID_Y: i32 = 25;

const GAUGE_WIDTH: u32 = 150;
const GAUGE_HEIGHT: u32 = 20;
const GAUGE_Y: i32 = 50;

const BAND_Y: i32 = 70;

const METRICS_X: i32 = 10;
const METRICS_Y: i32 = 100;
const METRICS_LINE_STEP: i32 = 20;

/// dBm mapped to an empty gauge
const GAUGE_FLOOR_DBM: f32 = -90.0;
/// dBm span from an empty to a full gauge
const GAUGE_SPAN_DBM: f32 = 60.0;

/// Qualitative signal classification shown under the gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignalBand {
    Poor,
    Okay,
    VeryGood,
    Amazing,
}

impl SignalBand {
    pub fn from_dbm(signal_dbm: i32) -> Self {
        match signal_dbm {
            s if s >= -30 => SignalBand::Amazing,
            s if s >= -67 => SignalBand::VeryGood,
            s if s >= -70 => SignalBand::Okay,
            _ => SignalBand::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalBand::Amazing => "Amazing",
            SignalBand::VeryGood => "Very Good",
            SignalBand::Okay => "Okay",
            SignalBand::Poor => "Poor",
        }
    }
}

/// Share of the gauge to fill, -90 dBm empty to -30 dBm full.
pub fn gauge_fill_fraction(signal_dbm: i32) -> f32 {
    ((signal_dbm as f32 - GAUGE_FLOOR_DBM) / GAUGE_SPAN_DBM).clamp(0.0, 1.0)
}

pub fn gauge_fill_width(signal_dbm: i32) -> u32 {
    (GAUGE_WIDTH as f32 * gauge_fill_fraction(signal_dbm)) as u32
}

/// The four speed test lines, top to bottom.
pub fn metric_lines(snapshot: &Snapshot) -> [String; 4] {
    [
        format!("Ping: {} ms", snapshot.ping_ms),
        format!("Download: {} Mbps", snapshot.download_mbps),
        format!("Upload: {} Mbps", snapshot.upload_mbps),
        format!("Jitter: {} ms", snapshot.jitter_ms),
    ]
}

fn centered_x(canvas_width: u32, content_width: u32) -> i32 {
    (canvas_width.saturating_sub(content_width) / 2) as i32
}

fn draw_centered<D>(fonts: &FontBundle, text: &str, y: i32, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Color>,
{
    let face = fonts.face(FontRole::Heading);
    let canvas_width = target.bounding_box().size.width;
    let x = centered_x(canvas_width, face.text_width(text));
    face.draw(text, Point::new(x, y), Color::Black, target)
}

fn draw_gauge<D>(signal_dbm: i32, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Color>,
{
    let x = centered_x(target.bounding_box().size.width, GAUGE_WIDTH);
    let top_left = Point::new(x, GAUGE_Y);
    let bottom = GAUGE_Y + GAUGE_HEIGHT as i32;

    Rectangle::with_corners(top_left, Point::new(x + GAUGE_WIDTH as i32, bottom))
        .into_styled(PrimitiveStyle::with_stroke(Color::Black, 1))
        .draw(target)?;

    let filled = gauge_fill_width(signal_dbm) as i32;
    Rectangle::with_corners(top_left, Point::new(x + filled, bottom))
        .into_styled(PrimitiveStyle::with_fill(Color::Black))
        .draw(target)
}

/// Draw the dashboard onto any target whose bounding box is the logical canvas.
pub fn compose_into<D>(snapshot: &Snapshot, fonts: &FontBundle, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Color>,
{
    target.clear(Color::White)?;

    draw_centered(fonts, snapshot.ip_address.as_str(), IP_Y, target)?;
    draw_centered(fonts, &snapshot.ssid, SSID_Y, target)?;

    draw_gauge(snapshot.signal_dbm, target)?;
    let band = SignalBand::from_dbm(snapshot.signal_dbm);
    draw_centered(fonts, band.label(), BAND_Y, target)?;

    let body = fonts.face(FontRole::Body);
    for (row, line) in metric_lines(snapshot).iter().enumerate() {
        let y = METRICS_Y + row as i32 * METRICS_LINE_STEP;
        body.draw(line, Point::new(METRICS_X, y), Color::Black, target)?;
    }

    Ok(())
}

/// Render a snapshot into a fresh frame for the panel.
///
/// The panel is mounted rotated, so the frame is drawn with the panel's long
/// axis as the logical width.
pub fn compose(snapshot: &Snapshot, fonts: &FontBundle) -> PanelBuffer {
    let mut buffer = PanelBuffer::default();
    buffer.set_rotation(DisplayRotation::Rotate270);
    compose_into(snapshot, fonts, &mut buffer).unwrap_or_else(|never| match never {});
    buffer
}
