//! Single-series line chart
//!
//! A [`Chart`] owns its points and draws, in order: background and border,
//! title, grid, the series itself, a dashed mean line, y-axis extremes and a
//! caption. A chart without points draws an "awaiting data" placeholder
//! instead of the plot.

pub mod constants;
pub mod grid;
pub mod series;
pub mod viewport;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_6X13_BOLD};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, PrimitiveStyleBuilder, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use self::constants::{AUTO_SCALE_MARGIN_FACTOR, MEAN_LINE_DASH_PX, MEAN_LINE_GAP_PX};
use self::grid::{GridConfig, LineStyle, draw_grid, draw_line};
use self::series::{DataPoint, SeriesStyle, draw_series};
use self::viewport::{DataBounds, Viewport};
use super::{GRAY, LIGHT_GRAY, SURFACE_DARK, WHITE};

/// Placeholder shown by a chart with no points
pub const AWAITING_DATA: &str = "awaiting data";

/// A titled chart of one series inside a fixed rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    bounds: Rectangle,
    title: String,
    points: Vec<DataPoint>,
    style: SeriesStyle,
    mean: Option<f32>,
    caption: Option<String>,
    /// Decimal places of the y-axis labels
    precision: usize,
    grid: GridConfig,
    background: Rgb565,
}

impl Chart {
    pub fn new(bounds: Rectangle, title: impl Into<String>, style: SeriesStyle) -> Self {
        Self {
            bounds,
            title: title.into(),
            points: Vec::new(),
            style,
            mean: None,
            caption: None,
            precision: 1,
            grid: GridConfig::default(),
            background: SURFACE_DARK,
        }
    }

    pub fn with_points(mut self, points: Vec<DataPoint>) -> Self {
        self.points = points;
        self
    }

    /// Draw a dashed reference line at `mean`
    pub fn with_mean(mut self, mean: f32) -> Self {
        self.mean = Some(mean);
        self
    }

    /// Text drawn under the plot; may span several lines
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Viewport scaled to the points (and mean line), or `None` without points
    pub fn viewport(&self) -> Option<Viewport> {
        let mut data_bounds = DataBounds::from_points(&self.points, AUTO_SCALE_MARGIN_FACTOR)?;
        if let Some(mean) = self.mean {
            data_bounds.y_min = data_bounds.y_min.min(mean);
            data_bounds.y_max = data_bounds.y_max.max(mean);
        }

        Some(Viewport::new(data_bounds, self.bounds))
    }

    fn draw_frame<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        self.bounds
            .into_styled(
                PrimitiveStyleBuilder::new()
                    .fill_color(self.background)
                    .stroke_color(GRAY)
                    .stroke_width(1)
                    .build(),
            )
            .draw(display)?;

        Text::with_baseline(
            &self.title,
            self.bounds.top_left + Point::new(4, 3),
            MonoTextStyle::new(&FONT_6X13_BOLD, WHITE),
            Baseline::Top,
        )
        .draw(display)?;

        Ok(())
    }

    fn draw_placeholder<D: DrawTarget<Color = Rgb565>>(
        &self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();

        Text::with_text_style(
            AWAITING_DATA,
            self.bounds.center(),
            MonoTextStyle::new(&FONT_6X10, LIGHT_GRAY),
            text_style,
        )
        .draw(display)?;

        Ok(())
    }

    fn draw_mean<D: DrawTarget<Color = Rgb565>>(
        &self,
        viewport: &Viewport,
        display: &mut D,
    ) -> Result<(), D::Error> {
        let Some(mean) = self.mean else {
            return Ok(());
        };

        let plot_area = viewport.plot_area();
        let y = viewport.y_to_screen(mean);
        draw_line(
            Point::new(plot_area.top_left.x, y),
            Point::new(plot_area.top_left.x + plot_area.size.width as i32, y),
            self.style.color,
            1,
            LineStyle::Dashed {
                dash_length: MEAN_LINE_DASH_PX,
                gap_length: MEAN_LINE_GAP_PX,
            },
            display,
        )
    }

    fn draw_labels<D: DrawTarget<Color = Rgb565>>(
        &self,
        viewport: &Viewport,
        display: &mut D,
    ) -> Result<(), D::Error> {
        let plot_area = viewport.plot_area();
        let bounds = viewport.data_bounds();
        let label_style = MonoTextStyle::new(&FONT_6X10, LIGHT_GRAY);
        let label_x = plot_area.top_left.x - 4;

        let right_top = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(Baseline::Top)
            .build();
        let right_bottom = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(Baseline::Bottom)
            .build();

        Text::with_text_style(
            &format!("{:.*}", self.precision, bounds.y_max),
            Point::new(label_x, plot_area.top_left.y),
            label_style,
            right_top,
        )
        .draw(display)?;

        Text::with_text_style(
            &format!("{:.*}", self.precision, bounds.y_min),
            Point::new(label_x, plot_area.top_left.y + plot_area.size.height as i32),
            label_style,
            right_bottom,
        )
        .draw(display)?;

        if let Some(caption) = &self.caption {
            Text::with_baseline(
                caption,
                Point::new(
                    plot_area.top_left.x,
                    plot_area.top_left.y + plot_area.size.height as i32 + 3,
                ),
                label_style,
                Baseline::Top,
            )
            .draw(display)?;
        }

        Ok(())
    }
}

impl Drawable for Chart {
    type Color = Rgb565;
    type Output = ();

    fn draw<D>(&self, display: &mut D) -> Result<Self::Output, D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        self.draw_frame(display)?;

        let Some(viewport) = self.viewport() else {
            return self.draw_placeholder(display);
        };

        draw_grid(&self.grid, &viewport, display)?;
        viewport
            .plot_area()
            .into_styled(PrimitiveStyle::with_stroke(GRAY, 1))
            .draw(display)?;
        draw_series(&self.points, &viewport, &self.style, display)?;
        self.draw_mean(&viewport, display)?;
        self.draw_labels(&viewport, display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::RED;
    use crate::ui::test_display::RecordingDisplay;

    fn bounds() -> Rectangle {
        Rectangle::new(Point::new(0, 0), Size::new(200, 120))
    }

    #[test]
    fn test_empty_chart_draws_placeholder_only() {
        let mut display = RecordingDisplay::new(Size::new(200, 120));
        Chart::new(bounds(), "Temperature", SeriesStyle::new(RED))
            .draw(&mut display)
            .unwrap();

        assert!(display.count_color(SURFACE_DARK) > 0);
        assert_eq!(display.count_color(RED), 0);
    }

    #[test]
    fn test_chart_with_points_draws_series() {
        let mut display = RecordingDisplay::new(Size::new(200, 120));
        Chart::new(bounds(), "Temperature", SeriesStyle::new(RED))
            .with_points(vec![
                DataPoint::new(0.0, 20.0),
                DataPoint::new(1.0, 22.0),
                DataPoint::new(2.0, 21.0),
            ])
            .with_mean(21.0)
            .with_caption("mean 21.0")
            .draw(&mut display)
            .unwrap();

        assert!(display.count_color(RED) > 0);
    }

    #[test]
    fn test_viewport_includes_mean() {
        let chart = Chart::new(bounds(), "t", SeriesStyle::new(RED))
            .with_points(vec![DataPoint::new(0.0, 10.0), DataPoint::new(1.0, 11.0)])
            .with_mean(50.0);
        let viewport = chart.viewport().unwrap();
        assert!(viewport.data_bounds().y_max >= 50.0);
    }

    #[test]
    fn test_no_viewport_without_points() {
        let chart = Chart::new(bounds(), "t", SeriesStyle::new(RED));
        assert_eq!(chart.viewport(), None);
    }
}
