//! Constants for chart rendering
//!
//! Sizes are in pixels unless the name says otherwise.

use embedded_graphics::pixelcolor::Rgb565;

use crate::ui::DARK_GRAY;

/// Number of vertical grid lines inside a plot area
pub const DEFAULT_VERTICAL_GRID_COUNT: usize = 5;

/// Number of horizontal grid lines inside a plot area
pub const DEFAULT_HORIZONTAL_GRID_COUNT: usize = 3;

/// Grid line color
pub const DEFAULT_GRID_COLOR: Rgb565 = DARK_GRAY;

pub const DEFAULT_GRID_LINE_WIDTH_PX: u32 = 1;

/// Viewport padding above the plot area, leaves room for the title
pub const DEFAULT_VIEWPORT_PADDING_TOP_PX: u32 = 16;

pub const DEFAULT_VIEWPORT_PADDING_RIGHT_PX: u32 = 8;

/// Viewport padding below the plot area, leaves room for the stats caption
pub const DEFAULT_VIEWPORT_PADDING_BOTTOM_PX: u32 = 26;

/// Viewport padding left of the plot area, leaves room for y-axis labels
pub const DEFAULT_VIEWPORT_PADDING_LEFT_PX: u32 = 48;

/// Minimum data range for auto-scaling (prevents division by zero)
pub const MIN_DATA_RANGE: f32 = 0.001;

/// Margin factor for auto-scaling bounds (10% padding)
pub const AUTO_SCALE_MARGIN_FACTOR: f32 = 0.1;

pub const DEFAULT_SERIES_LINE_WIDTH_PX: u32 = 2;

/// Side length of the square marker drawn at each sample
pub const DEFAULT_MARKER_SIZE_PX: u32 = 3;

/// Dash pattern of the mean line
pub const MEAN_LINE_DASH_PX: u32 = 6;
pub const MEAN_LINE_GAP_PX: u32 = 4;
