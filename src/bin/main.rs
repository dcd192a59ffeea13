//! fftscope: live dashboard for temperature/humidity readings and their FFT
//! analyses published over MQTT.
//!
//! The MQTT event loop feeds the ingestion sink on its own thread, the console
//! reads commands from stdin, and this thread ticks the aggregator and renders
//! the dashboard. Built with the `window` feature the frame is shown in an SDL2
//! window; otherwise it only lives in memory and is written out with `p`.
//!
//! Configuration comes from `FFTSCOPE_*` environment variables or a `.env`
//! file; `RUST_LOG` controls log output (default `info`).

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics_simulator::SimulatorDisplay;
#[cfg(feature = "window")]
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorEvent, Window, sdl2::Keycode};
use log::{error, info};

use fftscope::console::{Console, ConsoleRequest};
use fftscope::render::{render_frame, save_screenshot};
use fftscope::transport::MqttTransport;
use fftscope::{AppError, BrokerConfig, DashboardConfig};
use fftscope_core::handoff;
use fftscope_core::ui::Dashboard;
use fftscope_core::{MessageHandler, SessionState, pipeline};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let broker = BrokerConfig::from_env()?;
    let config = DashboardConfig::from_env()?;
    info!("Starting fftscope");
    log::debug!(
        "Broker config: {}",
        serde_json::to_string(&broker).unwrap_or_default()
    );

    let session = Arc::new(SessionState::new());
    let (sink, aggregator) = pipeline(Arc::clone(&session));
    let aggregator = Arc::new(aggregator);

    let handler: Arc<dyn MessageHandler> = Arc::new(sink);
    let transport = MqttTransport::spawn(&broker, handler)?;

    let (requests_tx, mut requests) = handoff::channel();
    Console::new(
        Arc::clone(&session),
        Arc::clone(&aggregator),
        config.clone(),
        requests_tx,
    )
    .spawn()?;

    let dashboard = Dashboard::default();
    let mut display = SimulatorDisplay::<Rgb565>::new(dashboard.size());

    #[cfg(feature = "window")]
    let mut window = {
        let output_settings = OutputSettingsBuilder::new().scale(1).build();
        Window::new("fftscope", &output_settings)
    };

    // First frame before the first tick, so the window starts with the
    // "awaiting data" layout. The SDL window must be updated once before its
    // events are polled.
    let mut snapshot = aggregator.latest();
    if let Err(e) = render_frame(
        &dashboard,
        &snapshot,
        &session,
        &config,
        Local::now(),
        &mut display,
    ) {
        error!("Draw error: {:?}", e);
    }
    #[cfg(feature = "window")]
    window.update(&display);

    let tick_interval = config.tick_interval();
    let mut last_tick = Instant::now();

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        #[cfg(feature = "window")]
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. }
                    if keycode == Keycode::Q || keycode == Keycode::Escape =>
                {
                    break 'running;
                }
                _ => {}
            }
        }

        // --- Console requests ---------------------------------------------
        for request in requests.drain() {
            match request {
                ConsoleRequest::Quit => break 'running,
                ConsoleRequest::Screenshot => {
                    if let Err(e) = save_screenshot(&display, &config.export_dir, Local::now()) {
                        error!("Screenshot failed: {}", e);
                    }
                }
            }
        }

        // --- Tick and render ----------------------------------------------
        if last_tick.elapsed() >= tick_interval {
            snapshot = aggregator.tick();
            if let Err(e) = render_frame(
                &dashboard,
                &snapshot,
                &session,
                &config,
                Local::now(),
                &mut display,
            ) {
                error!("Draw error: {:?}", e);
            }
            last_tick = Instant::now();
        }

        #[cfg(feature = "window")]
        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    transport.shutdown();
    info!("fftscope exiting");
    Ok(())
}
