// FILE: crates/cli/src/commands.rs

use anyhow::{Context, Result};
use clap::ArgMatches;
use console::style;
use storyreel_config::{Config, ConfigManager, PlaybackConfig};
use storyreel_core::{format_hms, Seconds, SlideKind, StoryCatalog};
use storyreel_engine::{
    EngineSettings, ManualClock, PlaybackPosition, SimulatedMediaBackend, StoryEngine,
};

/// Loads the catalog named by a `FILE` argument or the `--demo` flag
pub fn load_catalog(matches: &ArgMatches) -> Result<StoryCatalog> {
    if matches.get_flag("demo") {
        return Ok(StoryCatalog::demo());
    }

    let file = matches
        .get_one::<String>("file")
        .ok_or_else(|| anyhow::anyhow!("Story file is required"))?;
    read_catalog(file)
}

/// Reads a story file, reporting failures with the catalog's user message
fn read_catalog(file: &str) -> Result<StoryCatalog> {
    StoryCatalog::from_path(file).map_err(|e| {
        if e.is_critical() {
            log::error!("{}", e);
        } else {
            log::warn!("{}", e);
        }
        let message = format!("Failed to load stories from {}: {}", file, e.user_message());
        anyhow::Error::new(e).context(message)
    })
}

pub fn engine_settings(playback: &PlaybackConfig) -> EngineSettings {
    EngineSettings {
        image_tick: playback.image_tick(),
        video_poll: playback.video_poll(),
        autoplay: playback.autoplay,
    }
}

/// Validate a story file and print a summary
pub fn validate_file(file: &str) -> Result<()> {
    let catalog = read_catalog(file)?;

    println!("{} {} is valid", style("✓").green().bold(), file);
    for line in catalog_summary(&catalog) {
        println!("{}", line);
    }
    Ok(())
}

fn catalog_summary(catalog: &StoryCatalog) -> Vec<String> {
    let mut lines = vec![format!(
        "{} stories, {} slides",
        catalog.len(),
        catalog.total_slides()
    )];

    for (index, story) in catalog.stories().iter().enumerate() {
        let title = story.title.as_deref().unwrap_or("Untitled");
        let image_time: Seconds = story.slides().iter().filter_map(|s| s.duration()).sum();
        lines.push(format!(
            "  [{}] {}: {} slides ({} video), {} of images",
            index,
            title,
            story.len(),
            story.video_count(),
            format_hms(image_time)
        ));
    }
    lines
}

/// Print the built-in demo catalog as JSON
pub fn print_demo() -> Result<()> {
    let json = StoryCatalog::demo()
        .to_json_pretty()
        .context("Failed to serialize demo stories")?;
    println!("{}", json);
    Ok(())
}

pub fn config_init(manager: &ConfigManager) -> Result<()> {
    let created = manager
        .initialize()
        .context("Failed to write config file")?;
    let path = manager.config_path();

    if created {
        println!("{} Created {}", style("✓").green().bold(), path.display());
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

pub fn config_show(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    print!("{}", rendered);
    Ok(())
}

/// One slide change observed during a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedTransition {
    pub tick: u64,
    pub at: Seconds,
    pub from: PlaybackPosition,
    pub to: PlaybackPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub ticks: u64,
    pub simulated_time: Seconds,
    pub transitions: Vec<SimulatedTransition>,
    pub final_position: PlaybackPosition,
}

/// Plays the catalog against a manual clock
///
/// Each tick advances the clock by the interval of the current slide's kind.
/// Video positions are not tracked, so videos run on clock time and end at
/// `video_secs`.
pub fn run_simulation(
    catalog: StoryCatalog,
    settings: EngineSettings,
    video_secs: Seconds,
    ticks: u64,
) -> SimulationReport {
    let clock = ManualClock::new();
    let backend = SimulatedMediaBackend::new(video_secs).with_position_tracking(false);
    let mut engine = StoryEngine::with_settings(catalog, settings, clock.clone(), backend);
    engine.process_pending();

    let mut simulated_time = 0.0;
    let mut transitions = Vec::new();

    for tick in 1..=ticks {
        let interval = match engine.current_slide().kind() {
            SlideKind::Image => settings.image_tick,
            SlideKind::Video => settings.video_poll,
        };
        if !clock.advance(interval.as_secs_f64()) {
            log::debug!("Clock idle at tick {}, stopping simulation", tick);
            break;
        }
        simulated_time += interval.as_secs_f64();

        let before = engine.state().position();
        engine.process_pending();
        let after = engine.state().position();
        if before != after {
            transitions.push(SimulatedTransition {
                tick,
                at: simulated_time,
                from: before,
                to: after,
            });
        }
    }

    let final_position = engine.state().position();
    engine.shutdown();

    SimulationReport {
        ticks,
        simulated_time,
        transitions,
        final_position,
    }
}

/// Run a deterministic playback and print every slide change
pub fn simulate(catalog: StoryCatalog, playback: &PlaybackConfig, ticks: u64) -> Result<()> {
    let settings = engine_settings(playback);
    let report = run_simulation(catalog, settings, playback.simulated_video_secs, ticks);

    if report.transitions.is_empty() && !settings.autoplay {
        println!("Autoplay is disabled; nothing advanced.");
    }

    for transition in &report.transitions {
        println!(
            "{:>6}  {}  {} -> {}",
            transition.tick,
            style(format_hms(transition.at)).dim(),
            transition.from,
            style(transition.to).cyan()
        );
    }

    println!(
        "\n{} slide changes over {} simulated, ended at {}",
        style(report.transitions.len()).bold(),
        format_hms(report.simulated_time),
        report.final_position
    );
    Ok(())
}

#[cfg(test)]
mod tests;
