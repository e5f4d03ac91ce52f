//! Starfield - headless runner
//!
//! Loads configuration, runs the simulation against a recording surface for
//! the configured number of frames and logs what was drawn.

use starfield::config::AppConfig;
use starfield::systems::HeadlessRunner;

fn main() {
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();

    if let Some(e) = load_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting starfield");

    match HeadlessRunner::new(config).run() {
        Ok(summary) => log::info!(
            "Simulated {:.2}s over {} frames",
            summary.simulated.as_secs_f64(),
            summary.frames_drawn + summary.frames_skipped
        ),
        Err(e) => {
            log::error!("Invalid simulation settings: {}", e);
            std::process::exit(1);
        }
    }
}
