//! Data series and their rendering

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};

use super::constants::{DEFAULT_MARKER_SIZE_PX, DEFAULT_SERIES_LINE_WIDTH_PX};
use super::viewport::Viewport;
use crate::Timestamp;
use crate::snapshot::{RawSample, SpectrumSample};

/// A single data point; `x` is seconds since the first sample of the series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub x: f32,
    pub y: f32,
}

impl DataPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Visual style of a series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub color: Rgb565,
    pub line_width: u32,
    /// Whether to draw a marker at each sample
    pub show_points: bool,
}

impl SeriesStyle {
    pub const fn new(color: Rgb565) -> Self {
        Self {
            color,
            line_width: DEFAULT_SERIES_LINE_WIDTH_PX,
            show_points: true,
        }
    }
}

/// Convert timestamped samples into chart points
///
/// `x` is measured from the first sample, so the series always starts at 0.
pub fn points_from(samples: impl IntoIterator<Item = (Timestamp, f64)>) -> Vec<DataPoint> {
    let mut origin = None;
    samples
        .into_iter()
        .map(|(at, value)| {
            let origin = *origin.get_or_insert(at);
            let x = (at - origin).num_milliseconds() as f32 / 1000.0;
            DataPoint::new(x, value as f32)
        })
        .collect()
}

pub fn raw_points(samples: &[RawSample]) -> Vec<DataPoint> {
    points_from(samples.iter().map(|s| (s.received_at, s.value)))
}

pub fn frequency_points(samples: &[SpectrumSample]) -> Vec<DataPoint> {
    points_from(samples.iter().map(|s| (s.received_at, s.record.freq)))
}

pub fn amplitude_points(samples: &[SpectrumSample]) -> Vec<DataPoint> {
    points_from(samples.iter().map(|s| (s.received_at, s.record.amplitude)))
}

/// Draw `points` as a polyline with optional markers
///
/// Points falling outside the viewport break the line.
pub(super) fn draw_series<D: DrawTarget<Color = Rgb565>>(
    points: &[DataPoint],
    viewport: &Viewport,
    style: &SeriesStyle,
    display: &mut D,
) -> Result<(), D::Error> {
    let line_style = PrimitiveStyle::with_stroke(style.color, style.line_width);
    let marker_style = PrimitiveStyle::with_fill(style.color);
    let marker_offset = (DEFAULT_MARKER_SIZE_PX / 2) as i32;

    let mut prev_screen: Option<Point> = None;

    for point in points {
        let Some(screen_point) = viewport.data_to_screen(*point) else {
            prev_screen = None;
            continue;
        };

        if let Some(prev) = prev_screen {
            Line::new(prev, screen_point)
                .into_styled(line_style)
                .draw(display)?;
        }

        if style.show_points {
            Rectangle::new(
                screen_point - Point::new(marker_offset, marker_offset),
                Size::new_equal(DEFAULT_MARKER_SIZE_PX),
            )
            .into_styled(marker_style)
            .draw(display)?;
        }

        prev_screen = Some(screen_point);
    }

    Ok(())
}
