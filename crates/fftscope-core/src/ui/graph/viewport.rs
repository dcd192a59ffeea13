//! Viewport and coordinate transformation
//!
//! Maps data space (seconds since the first sample, sensor values) onto
//! screen space (pixel coordinates inside a panel).

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::constants::{
    DEFAULT_VIEWPORT_PADDING_BOTTOM_PX, DEFAULT_VIEWPORT_PADDING_LEFT_PX,
    DEFAULT_VIEWPORT_PADDING_RIGHT_PX, DEFAULT_VIEWPORT_PADDING_TOP_PX, MIN_DATA_RANGE,
};
use super::series::DataPoint;

/// Data space bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataBounds {
    /// Earliest sample, seconds after the first arrival in the window
    pub x_min: f32,
    /// Latest sample, same time base as `x_min`
    pub x_max: f32,
    /// Lowest value shown, margin included
    pub y_min: f32,
    /// Highest value shown, margin included
    pub y_max: f32,
}

impl DataBounds {
    pub const fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Bounds enclosing `points`, widened on each side by `margin_factor` of
    /// the range. A flat series still gets a range of at least
    /// [`MIN_DATA_RANGE`].
    pub fn from_points(points: &[DataPoint], margin_factor: f32) -> Option<Self> {
        let (first, rest) = points.split_first()?;

        let mut bounds = Self::new(first.x, first.x, first.y, first.y);
        for point in rest {
            bounds.x_min = bounds.x_min.min(point.x);
            bounds.x_max = bounds.x_max.max(point.x);
            bounds.y_min = bounds.y_min.min(point.y);
            bounds.y_max = bounds.y_max.max(point.y);
        }

        let x_margin = (bounds.x_max - bounds.x_min).max(MIN_DATA_RANGE) * margin_factor;
        let y_margin = (bounds.y_max - bounds.y_min).max(MIN_DATA_RANGE) * margin_factor;

        Some(Self {
            x_min: bounds.x_min - x_margin,
            x_max: bounds.x_max + x_margin,
            y_min: bounds.y_min - y_margin,
            y_max: bounds.y_max + y_margin,
        })
    }

    pub fn x_range(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn y_range(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// Padding around the plot area for labels and margins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportPadding {
    /// Room for the panel title
    pub top: u32,
    pub right: u32,
    /// Room for the stats caption
    pub bottom: u32,
    /// Room for the y-axis labels
    pub left: u32,
}

impl Default for ViewportPadding {
    fn default() -> Self {
        Self {
            top: DEFAULT_VIEWPORT_PADDING_TOP_PX,
            right: DEFAULT_VIEWPORT_PADDING_RIGHT_PX,
            bottom: DEFAULT_VIEWPORT_PADDING_BOTTOM_PX,
            left: DEFAULT_VIEWPORT_PADDING_LEFT_PX,
        }
    }
}

/// Transforms data coordinates to screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    data_bounds: DataBounds,
    /// Full area including padding
    screen_bounds: Rectangle,
    padding: ViewportPadding,
}

impl Viewport {
    pub fn new(data_bounds: DataBounds, screen_bounds: Rectangle) -> Self {
        Self {
            data_bounds,
            screen_bounds,
            padding: ViewportPadding::default(),
        }
    }

    pub fn with_padding(mut self, padding: ViewportPadding) -> Self {
        self.padding = padding;
        self
    }

    /// Screen bounds minus padding
    pub fn plot_area(&self) -> Rectangle {
        let top_left = Point::new(
            self.screen_bounds.top_left.x + self.padding.left as i32,
            self.screen_bounds.top_left.y + self.padding.top as i32,
        );

        let width = self
            .screen_bounds
            .size
            .width
            .saturating_sub(self.padding.left + self.padding.right);
        let height = self
            .screen_bounds
            .size
            .height
            .saturating_sub(self.padding.top + self.padding.bottom);

        Rectangle::new(top_left, Size::new(width, height))
    }

    /// Transform a data point to screen coordinates.
    ///
    /// Returns `None` if the point falls outside the plot area.
    pub fn data_to_screen(&self, point: DataPoint) -> Option<Point> {
        let plot_area = self.plot_area();

        let x_norm = (point.x - self.data_bounds.x_min) / self.data_bounds.x_range();
        let y_norm = (point.y - self.data_bounds.y_min) / self.data_bounds.y_range();

        if !x_norm.is_finite() || !y_norm.is_finite() {
            return None;
        }

        // Screen y grows downward
        let screen_x = plot_area.top_left.x + (x_norm * plot_area.size.width as f32) as i32;
        let screen_y =
            plot_area.top_left.y + ((1.0 - y_norm) * plot_area.size.height as f32) as i32;

        if screen_x < plot_area.top_left.x
            || screen_x > plot_area.top_left.x + plot_area.size.width as i32
            || screen_y < plot_area.top_left.y
            || screen_y > plot_area.top_left.y + plot_area.size.height as i32
        {
            return None;
        }

        Some(Point::new(screen_x, screen_y))
    }

    /// Screen row for a data-space `y`, clamped to the plot area
    pub fn y_to_screen(&self, y: f32) -> i32 {
        let plot_area = self.plot_area();
        let y_norm = ((y - self.data_bounds.y_min) / self.data_bounds.y_range()).clamp(0.0, 1.0);
        let y_norm = if y_norm.is_finite() { y_norm } else { 0.5 };

        plot_area.top_left.y + ((1.0 - y_norm) * plot_area.size.height as f32) as i32
    }

    pub fn data_bounds(&self) -> &DataBounds {
        &self.data_bounds
    }

    pub fn screen_bounds(&self) -> Rectangle {
        self.screen_bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(
            DataBounds::new(0.0, 10.0, 0.0, 100.0),
            Rectangle::new(Point::new(0, 0), Size::new(110, 120)),
        )
        .with_padding(ViewportPadding {
            top: 10,
            right: 0,
            bottom: 10,
            left: 10,
        })
    }

    #[test]
    fn test_plot_area_excludes_padding() {
        let area = viewport().plot_area();
        assert_eq!(area.top_left, Point::new(10, 10));
        assert_eq!(area.size, Size::new(100, 100));
    }

    #[test]
    fn test_data_to_screen_corners() {
        let vp = viewport();
        assert_eq!(
            vp.data_to_screen(DataPoint::new(0.0, 0.0)),
            Some(Point::new(10, 110))
        );
        assert_eq!(
            vp.data_to_screen(DataPoint::new(10.0, 100.0)),
            Some(Point::new(110, 10))
        );
        assert_eq!(
            vp.data_to_screen(DataPoint::new(5.0, 50.0)),
            Some(Point::new(60, 60))
        );
    }

    #[test]
    fn test_out_of_bounds_point() {
        assert_eq!(viewport().data_to_screen(DataPoint::new(11.0, 50.0)), None);
    }

    #[test]
    fn test_bounds_from_flat_series() {
        let points = [DataPoint::new(0.0, 21.5), DataPoint::new(1.0, 21.5)];
        let bounds = DataBounds::from_points(&points, 0.1).unwrap();
        assert!(bounds.y_range() > 0.0);
        assert!(bounds.y_min < 21.5 && bounds.y_max > 21.5);
    }

    #[test]
    fn test_bounds_from_nothing() {
        assert_eq!(DataBounds::from_points(&[], 0.1), None);
    }
}
