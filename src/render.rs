//! Frame rendering and screenshots

use std::path::{Path, PathBuf};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};
use fftscope_core::ui::Dashboard;
use fftscope_core::{SessionState, Snapshot, StatusReport, Timestamp};
use log::info;

use crate::config::DashboardConfig;
use crate::error::AppError;

/// Draw one complete dashboard frame for `snapshot`
pub fn render_frame<D: DrawTarget<Color = Rgb565>>(
    dashboard: &Dashboard,
    snapshot: &Snapshot,
    session: &SessionState,
    config: &DashboardConfig,
    now: Timestamp,
    display: &mut D,
) -> Result<(), D::Error> {
    let report = StatusReport::new(session, snapshot, now, config.stale_after());
    dashboard.draw(snapshot, &report, display)
}

pub fn screenshot_filename(now: Timestamp) -> String {
    now.format("fftscope_%Y%m%d_%H%M%S.png").to_string()
}

/// Save the current frame buffer as a PNG in `dir`
pub fn save_screenshot(
    display: &SimulatorDisplay<Rgb565>,
    dir: &Path,
    now: Timestamp,
) -> Result<PathBuf, AppError> {
    let path = dir.join(screenshot_filename(now));
    let settings = OutputSettingsBuilder::new().scale(1).build();

    display
        .to_rgb_output_image(&settings)
        .save_png(&path)
        .map_err(|e| AppError::Render(e.to_string()))?;

    info!("Saved screenshot to {}", path.display());
    Ok(path)
}
