//! Grid and reference line rendering for chart backgrounds

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};

use super::constants::{
    DEFAULT_GRID_COLOR, DEFAULT_GRID_LINE_WIDTH_PX, DEFAULT_HORIZONTAL_GRID_COUNT,
    DEFAULT_VERTICAL_GRID_COUNT,
};
use super::viewport::Viewport;

/// Line style for grid and reference lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineStyle {
    Solid,
    Dashed {
        /// Length of each dash in pixels
        dash_length: u32,
        /// Length of gap between dashes in pixels
        gap_length: u32,
    },
}

/// Grid configuration; a count of zero disables that direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub vertical_count: usize,
    pub horizontal_count: usize,
    pub color: Rgb565,
    pub width: u32,
    pub style: LineStyle,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            vertical_count: DEFAULT_VERTICAL_GRID_COUNT,
            horizontal_count: DEFAULT_HORIZONTAL_GRID_COUNT,
            color: DEFAULT_GRID_COLOR,
            width: DEFAULT_GRID_LINE_WIDTH_PX,
            style: LineStyle::Solid,
        }
    }
}

/// Draw evenly spaced grid lines across the plot area
pub(super) fn draw_grid<D: DrawTarget<Color = Rgb565>>(
    config: &GridConfig,
    viewport: &Viewport,
    display: &mut D,
) -> Result<(), D::Error> {
    let plot_area = viewport.plot_area();
    let bottom = plot_area.top_left.y + plot_area.size.height as i32;
    let right = plot_area.top_left.x + plot_area.size.width as i32;

    if config.vertical_count > 0 {
        let spacing = plot_area.size.width / (config.vertical_count + 1) as u32;

        for i in 1..=config.vertical_count {
            let x = plot_area.top_left.x + (spacing * i as u32) as i32;
            draw_line(
                Point::new(x, plot_area.top_left.y),
                Point::new(x, bottom),
                config.color,
                config.width,
                config.style,
                display,
            )?;
        }
    }

    if config.horizontal_count > 0 {
        let spacing = plot_area.size.height / (config.horizontal_count + 1) as u32;

        for i in 1..=config.horizontal_count {
            let y = plot_area.top_left.y + (spacing * i as u32) as i32;
            draw_line(
                Point::new(plot_area.top_left.x, y),
                Point::new(right, y),
                config.color,
                config.width,
                config.style,
                display,
            )?;
        }
    }

    Ok(())
}

/// Draw a single line with the given style
pub(super) fn draw_line<D: DrawTarget<Color = Rgb565>>(
    start: Point,
    end: Point,
    color: Rgb565,
    width: u32,
    style: LineStyle,
    display: &mut D,
) -> Result<(), D::Error> {
    match style {
        LineStyle::Solid => Line::new(start, end)
            .into_styled(PrimitiveStyle::with_stroke(color, width))
            .draw(display),
        LineStyle::Dashed {
            dash_length,
            gap_length,
        } => draw_dashed_line(start, end, color, width, dash_length, gap_length, display),
    }
}

fn draw_dashed_line<D: DrawTarget<Color = Rgb565>>(
    start: Point,
    end: Point,
    color: Rgb565,
    width: u32,
    dash_length: u32,
    gap_length: u32,
    display: &mut D,
) -> Result<(), D::Error> {
    let dx = (end.x - start.x) as f32;
    let dy = (end.y - start.y) as f32;
    let total_length = dx.hypot(dy);

    let pattern_length = (dash_length + gap_length) as f32;
    if total_length < 0.1 || pattern_length <= 0.0 {
        return Ok(());
    }

    let line_style = PrimitiveStyle::with_stroke(color, width);
    let mut distance = 0.0;

    while distance < total_length {
        let t_start = distance / total_length;
        let t_end = (distance + dash_length as f32).min(total_length) / total_length;

        let dash_start = Point::new(
            start.x + (dx * t_start) as i32,
            start.y + (dy * t_start) as i32,
        );
        let dash_end = Point::new(start.x + (dx * t_end) as i32, start.y + (dy * t_end) as i32);

        Line::new(dash_start, dash_end)
            .into_styled(line_style)
            .draw(display)?;

        distance += pattern_length;
    }

    Ok(())
}
