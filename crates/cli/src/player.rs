// FILE: crates/cli/src/player.rs

use anyhow::{Context, Result};
use console::{style, Key, Term};
use crossbeam_channel::{select, unbounded, Receiver};
use std::thread;
use std::time::Duration;
use storyreel_config::PlaybackConfig;
use storyreel_core::{format_hms, StoryCatalog};
use storyreel_engine::{
    EngineResult, MediaBackend, PlaybackClock, PlaybackMode, PlaybackState,
    SimulatedMediaBackend, StoryEngine, ThreadClock,
};

const REDRAW_INTERVAL: Duration = Duration::from_millis(250);
const SCRUB_STEP: f64 = 0.1;
const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    TogglePlayback,
    NextStory,
    PreviousStory,
    JumpToSlide(usize),
    Scrub(f64),
    Quit,
}

pub fn command_for_key(key: &Key) -> Option<PlayerCommand> {
    match key {
        Key::Char(' ') => Some(PlayerCommand::TogglePlayback),
        Key::ArrowRight | Key::Char('n') => Some(PlayerCommand::NextStory),
        Key::ArrowLeft | Key::Char('p') => Some(PlayerCommand::PreviousStory),
        Key::Char(']') | Key::Char('.') => Some(PlayerCommand::Scrub(SCRUB_STEP)),
        Key::Char('[') | Key::Char(',') => Some(PlayerCommand::Scrub(-SCRUB_STEP)),
        Key::Char('q') | Key::Escape => Some(PlayerCommand::Quit),
        Key::Char(c) => c
            .to_digit(10)
            .filter(|d| *d > 0)
            .map(|d| PlayerCommand::JumpToSlide(d as usize - 1)),
        _ => None,
    }
}

/// Applies one command; returns false when the player should exit
pub fn apply_command<C: PlaybackClock, M: MediaBackend>(
    engine: &mut StoryEngine<C, M>,
    command: PlayerCommand,
) -> EngineResult<bool> {
    match command {
        PlayerCommand::TogglePlayback => engine.toggle_playback()?,
        PlayerCommand::NextStory => engine.next()?,
        PlayerCommand::PreviousStory => engine.previous()?,
        PlayerCommand::JumpToSlide(index) => engine.jump_to_slide(index)?,
        PlayerCommand::Scrub(delta) => {
            let target = (engine.progress() + delta).clamp(0.0, 1.0);
            engine.begin_seek()?;
            engine.update_seek(target)?;
            engine.commit_seek(target)?;
        }
        PlayerCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Renders the player screen for the given state
pub fn render_frame(state: &PlaybackState, catalog: &StoryCatalog) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(story) = catalog.story(state.story_index()) else {
        return lines;
    };

    let title = story.title.as_deref().unwrap_or("Untitled");
    lines.push(format!(
        "  {} {}",
        style(format!("Story {}/{}", state.story_index() + 1, catalog.len())).dim(),
        style(title).bold().cyan()
    ));

    let dots: Vec<String> = (0..story.len())
        .map(|index| match index.cmp(&state.slide_index()) {
            std::cmp::Ordering::Less => "■".to_string(),
            std::cmp::Ordering::Equal => style("▶").green().to_string(),
            std::cmp::Ordering::Greater => "·".to_string(),
        })
        .collect();
    let kind = story
        .slide(state.slide_index())
        .map(|slide| slide.kind().to_string())
        .unwrap_or_default();
    lines.push(format!("  {}  {}", dots.join(" "), style(kind).dim()));
    lines.push(String::new());

    let filled = ((state.progress() * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    lines.push(format!(
        "  [{}{}] {:>3}%",
        "=".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        (state.progress() * 100.0).round() as u32
    ));

    let total = state
        .duration()
        .map(format_hms)
        .unwrap_or_else(|| "-:--:--".to_string());
    lines.push(format!("  {} / {}", format_hms(state.elapsed()), total));

    let mode = match state.mode() {
        PlaybackMode::Playing => style("Playing").green(),
        PlaybackMode::Paused => style("Paused").yellow(),
        PlaybackMode::Seeking => style("Seeking").cyan(),
    };
    lines.push(format!("  Status: {}", mode));
    lines.push(String::new());
    lines.push("  Space play/pause   ←/→ story   1-9 slide   [/] scrub   Q quit".to_string());
    lines
}

fn draw<C: PlaybackClock, M: MediaBackend>(term: &Term, engine: &StoryEngine<C, M>) -> Result<()> {
    term.clear_screen().context("Failed to clear screen")?;
    for line in render_frame(engine.state(), engine.catalog()) {
        term.write_line(&line).context("Failed to draw player")?;
    }
    Ok(())
}

fn spawn_key_reader(term: Term) -> Receiver<Key> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        while let Ok(key) = term.read_key() {
            if tx.send(key).is_err() {
                break;
            }
        }
    });
    rx
}

/// Play stories interactively until the user quits
pub fn run(catalog: StoryCatalog, playback: &PlaybackConfig) -> Result<()> {
    let settings = crate::commands::engine_settings(playback);
    let backend = SimulatedMediaBackend::new(playback.simulated_video_secs);
    let mut engine = StoryEngine::with_settings(catalog, settings, ThreadClock::new(), backend);

    let term = Term::stdout();
    if term.hide_cursor().is_err() {
        log::warn!("Failed to hide cursor");
    }

    let events = engine.events();
    let keys = spawn_key_reader(term.clone());
    let result = player_loop(&term, &mut engine, &events, &keys);

    engine.shutdown();
    let _ = term.show_cursor();
    result
}

fn player_loop<C: PlaybackClock, M: MediaBackend>(
    term: &Term,
    engine: &mut StoryEngine<C, M>,
    events: &Receiver<storyreel_engine::EngineEvent>,
    keys: &Receiver<Key>,
) -> Result<()> {
    loop {
        draw(term, engine)?;

        select! {
            recv(events) -> event => {
                if let Ok(event) = event {
                    engine.handle_event(event);
                    engine.process_pending();
                }
            }
            recv(keys) -> key => {
                let Ok(key) = key else {
                    log::warn!("Keyboard input closed");
                    return Ok(());
                };
                if let Some(command) = command_for_key(&key) {
                    if !apply_command(engine, command)? {
                        return Ok(());
                    }
                }
            }
            default(REDRAW_INTERVAL) => {}
        }
    }
}
