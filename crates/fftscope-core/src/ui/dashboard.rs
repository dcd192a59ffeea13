//! Six-panel dashboard layout
//!
//! ```text
//! +----------------------------------------------+
//! | header: broker, device, counters             |
//! +----------------------+-----------------------+
//! | temperature          | humidity              |
//! | temperature FFT freq | humidity FFT freq     |
//! | temperature FFT amp  | humidity FFT amp      |
//! +----------------------+-----------------------+
//! ```

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use super::graph::Chart;
use super::graph::grid::{GridConfig, LineStyle};
use super::graph::series::{
    DataPoint, SeriesStyle, amplitude_points, frequency_points, raw_points,
};
use super::{
    AMBER, BLACK, CRIMSON, CYAN, DISPLAY_SIZE, DODGER_BLUE, GREEN, LIGHT_GRAY, MAGENTA, OK_GREEN,
    ORANGE, RED, WHITE,
};
use crate::snapshot::{SeriesStats, Snapshot, SpectrumSample};
use crate::status::StatusReport;

const HEADER_HEIGHT_PX: u32 = 32;
const PANEL_GAP_PX: u32 = 6;
const COLUMNS: u32 = 2;
const ROWS: u32 = 3;

/// One of the six dashboard panels, in layout order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Temperature,
    Humidity,
    TemperatureFrequency,
    HumidityFrequency,
    TemperatureAmplitude,
    HumidityAmplitude,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::Temperature,
        Panel::Humidity,
        Panel::TemperatureFrequency,
        Panel::HumidityFrequency,
        Panel::TemperatureAmplitude,
        Panel::HumidityAmplitude,
    ];

    pub const fn color(self) -> Rgb565 {
        match self {
            Panel::Temperature => RED,
            Panel::Humidity => DODGER_BLUE,
            Panel::TemperatureFrequency => GREEN,
            Panel::HumidityFrequency => MAGENTA,
            Panel::TemperatureAmplitude => ORANGE,
            Panel::HumidityAmplitude => CYAN,
        }
    }

    /// Build the chart for this panel from `snapshot`
    pub fn chart(self, snapshot: &Snapshot, bounds: Rectangle) -> Chart {
        let style = SeriesStyle::new(self.color());

        match self {
            Panel::Temperature => raw_chart(
                bounds,
                "Temperature [C]",
                "C",
                snapshot.temperature_raw().iter().map(|s| s.value),
                raw_points(snapshot.temperature_raw()),
                style,
            ),
            Panel::Humidity => raw_chart(
                bounds,
                "Humidity [%]",
                "%",
                snapshot.humidity_raw().iter().map(|s| s.value),
                raw_points(snapshot.humidity_raw()),
                style,
            ),
            Panel::TemperatureFrequency => frequency_chart(
                bounds,
                "Temperature FFT frequency [Hz]",
                snapshot.temperature_spectrum(),
                style,
            ),
            Panel::HumidityFrequency => frequency_chart(
                bounds,
                "Humidity FFT frequency [Hz]",
                snapshot.humidity_spectrum(),
                style,
            ),
            Panel::TemperatureAmplitude => amplitude_chart(
                bounds,
                "Temperature FFT amplitude",
                snapshot.temperature_spectrum(),
                style,
            ),
            Panel::HumidityAmplitude => amplitude_chart(
                bounds,
                "Humidity FFT amplitude",
                snapshot.humidity_spectrum(),
                style,
            ),
        }
    }
}

/// Dotted grid used behind the spectrum panels
fn spectrum_grid() -> GridConfig {
    GridConfig {
        vertical_count: 4,
        style: LineStyle::Dashed {
            dash_length: 2,
            gap_length: 3,
        },
        ..GridConfig::default()
    }
}

fn raw_chart(
    bounds: Rectangle,
    title: &str,
    unit: &str,
    values: impl Iterator<Item = f64>,
    points: Vec<DataPoint>,
    style: SeriesStyle,
) -> Chart {
    let chart = Chart::new(bounds, format!("{} - {} samples", title, points.len()), style)
        .with_points(points);

    match SeriesStats::of(values) {
        Some(stats) => chart.with_mean(stats.mean as f32).with_caption(format!(
            "mean {:.1} {unit}   min {:.1}   max {:.1}",
            stats.mean, stats.min, stats.max
        )),
        None => chart,
    }
}

fn frequency_chart(
    bounds: Rectangle,
    title: &str,
    samples: &[SpectrumSample],
    style: SeriesStyle,
) -> Chart {
    let chart = Chart::new(
        bounds,
        format!("{} - {} analyses", title, samples.len()),
        style,
    )
    .with_points(frequency_points(samples))
    .with_precision(4)
    .with_grid(spectrum_grid());

    match SeriesStats::of(samples.iter().map(|s| s.record.freq)) {
        Some(stats) => {
            let period = if stats.mean > 0.0 {
                1.0 / stats.mean / 60.0
            } else {
                0.0
            };
            chart
                .with_mean(stats.mean as f32)
                .with_caption(format!(
                    "freq {:.4} Hz\nperiod {:.1} min",
                    stats.mean, period
                ))
        }
        None => chart,
    }
}

fn amplitude_chart(
    bounds: Rectangle,
    title: &str,
    samples: &[SpectrumSample],
    style: SeriesStyle,
) -> Chart {
    let chart = Chart::new(bounds, title, style)
        .with_points(amplitude_points(samples))
        .with_precision(2)
        .with_grid(spectrum_grid());

    match SeriesStats::of(samples.iter().map(|s| s.record.amplitude)) {
        Some(stats) => chart
            .with_mean(stats.mean as f32)
            .with_caption(format!("mean {:.2}\nmax {:.2}", stats.mean, stats.max)),
        None => chart,
    }
}

/// Fixed layout of the header and the six panels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dashboard {
    size: Size,
    header: Rectangle,
    panels: [Rectangle; 6],
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DISPLAY_SIZE)
    }
}

impl Dashboard {
    pub fn new(size: Size) -> Self {
        let header = Rectangle::new(Point::zero(), Size::new(size.width, HEADER_HEIGHT_PX));

        let body_height = size.height.saturating_sub(HEADER_HEIGHT_PX);
        let panel_width = size.width.saturating_sub(PANEL_GAP_PX * (COLUMNS + 1)) / COLUMNS;
        let panel_height = body_height.saturating_sub(PANEL_GAP_PX * (ROWS + 1)) / ROWS;

        let panels = core::array::from_fn(|i| {
            let column = i as u32 % COLUMNS;
            let row = i as u32 / COLUMNS;
            let x = PANEL_GAP_PX + column * (panel_width + PANEL_GAP_PX);
            let y = HEADER_HEIGHT_PX + PANEL_GAP_PX + row * (panel_height + PANEL_GAP_PX);
            Rectangle::new(
                Point::new(x as i32, y as i32),
                Size::new(panel_width, panel_height),
            )
        });

        Self {
            size,
            header,
            panels,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Screen area of `panel`
    pub fn panel_bounds(&self, panel: Panel) -> Rectangle {
        let index = Panel::ALL.iter().position(|p| *p == panel).unwrap_or(0);
        self.panels[index]
    }

    /// Charts for every panel, in layout order
    pub fn charts(&self, snapshot: &Snapshot) -> Vec<Chart> {
        Panel::ALL
            .iter()
            .zip(self.panels)
            .map(|(panel, bounds)| panel.chart(snapshot, bounds))
            .collect()
    }

    /// Draw a complete frame
    pub fn draw<D: DrawTarget<Color = Rgb565>>(
        &self,
        snapshot: &Snapshot,
        report: &StatusReport,
        display: &mut D,
    ) -> Result<(), D::Error> {
        display.clear(BLACK)?;
        self.draw_header(report, display)?;

        for chart in self.charts(snapshot) {
            chart.draw(display)?;
        }

        Ok(())
    }

    fn draw_header<D: DrawTarget<Color = Rgb565>>(
        &self,
        report: &StatusReport,
        display: &mut D,
    ) -> Result<(), D::Error> {
        Text::with_baseline(
            "fftscope",
            self.header.top_left + Point::new(PANEL_GAP_PX as i32, 6),
            MonoTextStyle::new(&FONT_10X20, WHITE),
            Baseline::Top,
        )
        .draw(display)?;

        let (state, color) = match (report.connected, report.stale) {
            (false, _) => ("DISCONNECTED", CRIMSON),
            (true, true) => ("STALE", AMBER),
            (true, false) => ("CONNECTED", OK_GREEN),
        };

        // Status lamp
        Rectangle::new(self.header.top_left + Point::new(110, 10), Size::new(12, 12))
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(display)?;
        Text::with_baseline(
            state,
            self.header.top_left + Point::new(128, 11),
            MonoTextStyle::new(&FONT_6X10, color),
            Baseline::Top,
        )
        .draw(display)?;

        let summary = format!(
            "device {}   msgs {}   fft {}   dropped {}",
            report.device_status.as_deref().unwrap_or("unknown"),
            report.message_count,
            report.fft_message_count,
            report.dropped_count
        );
        Text::with_text_style(
            &summary,
            Point::new(
                self.header.top_left.x + self.header.size.width as i32 - PANEL_GAP_PX as i32,
                self.header.top_left.y + 11,
            ),
            MonoTextStyle::new(&FONT_6X10, LIGHT_GRAY),
            TextStyleBuilder::new()
                .alignment(Alignment::Right)
                .baseline(Baseline::Top)
                .build(),
        )
        .draw(display)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SpectrumRecord;
    use crate::session::SessionState;
    use crate::snapshot::RawSample;
    use crate::ui::graph::AWAITING_DATA;
    use crate::ui::test_display::RecordingDisplay;
    use chrono::{Local, TimeDelta, TimeZone};

    fn at(secs: i64) -> crate::Timestamp {
        Local.timestamp_opt(secs, 0).unwrap()
    }

    fn report(snapshot: &Snapshot) -> StatusReport {
        StatusReport::new(
            &SessionState::new(),
            snapshot,
            Local::now(),
            TimeDelta::seconds(30),
        )
    }

    fn small_dashboard() -> Dashboard {
        Dashboard::new(Size::new(480, 360))
    }

    #[test]
    fn test_panels_fit_inside_frame() {
        let dashboard = Dashboard::default();
        let frame = Rectangle::new(Point::zero(), dashboard.size());

        for panel in Panel::ALL {
            let bounds = dashboard.panel_bounds(panel);
            assert!(bounds.size.width > 0 && bounds.size.height > 0);
            assert!(frame.contains(bounds.top_left));
            assert!(bounds.bottom_right().is_some_and(|p| frame.contains(p)));
        }
    }

    #[test]
    fn test_panels_do_not_overlap() {
        let dashboard = Dashboard::default();
        for (i, a) in Panel::ALL.iter().enumerate() {
            for b in &Panel::ALL[i + 1..] {
                let overlap = dashboard
                    .panel_bounds(*a)
                    .intersection(&dashboard.panel_bounds(*b));
                assert_eq!(overlap.size, Size::zero(), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_empty_snapshot_charts_have_no_points() {
        let charts = small_dashboard().charts(&Snapshot::default());
        assert_eq!(charts.len(), 6);
        assert!(charts.iter().all(|c| c.points().is_empty()));
        assert!(charts.iter().all(|c| c.viewport().is_none()));
        assert!(!AWAITING_DATA.is_empty());
    }

    #[test]
    fn test_empty_dashboard_renders() {
        let dashboard = small_dashboard();
        let snapshot = Snapshot::default();
        let mut display = RecordingDisplay::new(dashboard.size());

        dashboard
            .draw(&snapshot, &report(&snapshot), &mut display)
            .unwrap();

        assert_eq!(display.count_color(RED), 0);
        assert!(display.count_color(CRIMSON) > 0);
    }

    #[test]
    fn test_data_lands_in_its_panel() {
        let dashboard = small_dashboard();
        let snapshot = Snapshot {
            temperature_raw: vec![
                RawSample::new(21.0, at(0)),
                RawSample::new(22.0, at(2)),
                RawSample::new(21.5, at(4)),
            ],
            temperature_spectrum: vec![
                SpectrumSample::new(SpectrumRecord::new(0.002, 3.1), at(1)),
                SpectrumSample::new(SpectrumRecord::new(0.003, 2.9), at(3)),
            ],
            timestamps: vec![at(1), at(3)],
            ..Snapshot::default()
        };
        let mut display = RecordingDisplay::new(dashboard.size());

        dashboard
            .draw(&snapshot, &report(&snapshot), &mut display)
            .unwrap();

        let temperature = dashboard.panel_bounds(Panel::Temperature);
        let humidity = dashboard.panel_bounds(Panel::Humidity);
        let frequency = dashboard.panel_bounds(Panel::TemperatureFrequency);

        assert!(display.count_color_in(RED, temperature.top_left, temperature.size) > 0);
        assert_eq!(
            display.count_color_in(DODGER_BLUE, humidity.top_left, humidity.size),
            0
        );
        assert!(display.count_color_in(GREEN, frequency.top_left, frequency.size) > 0);
    }

    #[test]
    fn test_frequency_caption_reports_period() {
        let snapshot = Snapshot {
            temperature_spectrum: vec![SpectrumSample::new(
                SpectrumRecord::new(0.002, 3.1),
                at(1),
            )],
            ..Snapshot::default()
        };
        let chart = Panel::TemperatureFrequency.chart(
            &snapshot,
            Rectangle::new(Point::zero(), Size::new(300, 150)),
        );

        assert!(chart.title().ends_with("1 analyses"));
        assert_eq!(chart.points().len(), 1);
        assert_eq!(
            chart.caption(),
            Some("freq 0.0020 Hz\nperiod 8.3 min")
        );
    }

    #[test]
    fn test_spectrum_panels_use_dashed_grid() {
        let bounds = Rectangle::new(Point::zero(), Size::new(300, 150));
        let snapshot = Snapshot::default();

        for panel in Panel::ALL {
            let chart = panel.chart(&snapshot, bounds);
            let dashed = matches!(chart.grid().style, LineStyle::Dashed { .. });
            let spectrum = !matches!(panel, Panel::Temperature | Panel::Humidity);
            assert_eq!(dashed, spectrum, "{:?}", panel);
        }
    }
}
