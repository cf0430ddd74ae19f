use super::*;
use clap::{Arg, ArgAction, Command};
use std::io::Write;
use std::time::Duration;
use storyreel_core::{MediaRef, Slide, Story};
use tempfile::{NamedTempFile, TempDir};

const STORY_FILE: &str = r#"{
  "stories": [
    {
      "title": "Morning",
      "slides": [
        { "kind": "image", "media": "sunrise.jpg", "display_duration": 2.0 },
        { "kind": "video", "media": "coffee.mp4" }
      ]
    },
    {
      "slides": [
        { "kind": "image", "media": "desk.jpg", "display_duration": 4.5 }
      ]
    }
  ]
}"#;

fn source_command() -> Command {
    Command::new("test")
        .arg(Arg::new("file"))
        .arg(Arg::new("demo").long("demo").action(ArgAction::SetTrue))
}

fn write_story_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn image_catalog(durations: &[&[Seconds]]) -> StoryCatalog {
    let stories = durations
        .iter()
        .enumerate()
        .map(|(s, slides)| {
            let slides = slides
                .iter()
                .enumerate()
                .map(|(i, d)| Slide::image(MediaRef::new(format!("{}-{}.jpg", s, i)).unwrap(), *d))
                .collect();
            Story::new(slides).unwrap()
        })
        .collect();
    StoryCatalog::new(stories).unwrap()
}

#[test]
fn test_load_catalog_demo_flag() {
    let matches = source_command().get_matches_from(["test", "--demo"]);
    let catalog = load_catalog(&matches).unwrap();
    assert_eq!(catalog, StoryCatalog::demo());
}

#[test]
fn test_load_catalog_from_file() {
    let file = write_story_file(STORY_FILE);
    let path = file.path().to_str().unwrap();
    let matches = source_command().get_matches_from(["test", path]);

    let catalog = load_catalog(&matches).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.total_slides(), 3);
}

#[test]
fn test_load_catalog_rejects_empty_story() {
    let file = write_story_file(r#"{ "stories": [ { "slides": [] } ] }"#);
    let path = file.path().to_str().unwrap();
    let matches = source_command().get_matches_from(["test", path]);

    let err = load_catalog(&matches).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Failed to load stories from {}: Story 1 has nothing to show.", path)
    );
    assert!(err.downcast_ref::<storyreel_core::CatalogError>().is_some());
}

#[test]
fn test_load_catalog_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.json");
    let matches = source_command().get_matches_from(["test", path.to_str().unwrap()]);
    let err = load_catalog(&matches).unwrap_err();
    assert!(err.to_string().ends_with("The story file could not be opened."));
}

#[test]
fn test_catalog_summary() {
    let catalog = StoryCatalog::from_json_str(STORY_FILE).unwrap();
    let lines = catalog_summary(&catalog);

    assert_eq!(lines[0], "2 stories, 3 slides");
    assert_eq!(lines[1], "  [0] Morning: 2 slides (1 video), 0:00:02 of images");
    assert_eq!(lines[2], "  [1] Untitled: 1 slides (0 video), 0:00:04 of images");
}

#[test]
fn test_engine_settings_from_config() {
    let playback = PlaybackConfig {
        image_tick_ms: 250,
        video_poll_ms: 100,
        autoplay: false,
        ..Default::default()
    };
    let settings = engine_settings(&playback);

    assert_eq!(settings.image_tick, Duration::from_millis(250));
    assert_eq!(settings.video_poll, Duration::from_millis(100));
    assert!(!settings.autoplay);
}

#[test]
fn test_simulation_first_slide_change() {
    let report = run_simulation(StoryCatalog::demo(), EngineSettings::default(), 15.0, 3);

    assert_eq!(report.transitions.len(), 1);
    let first = &report.transitions[0];
    assert_eq!(first.tick, 3);
    assert_eq!(first.at, 3.0);
    assert_eq!(first.from, PlaybackPosition::new(0, 0));
    assert_eq!(first.to, PlaybackPosition::new(0, 1));
    assert_eq!(report.final_position, PlaybackPosition::new(0, 1));
}

#[test]
fn test_simulation_plays_videos_for_simulated_length() {
    // 3 image ticks, 2 videos of 30 half-second polls, 2 more images of 3 ticks
    let report = run_simulation(StoryCatalog::demo(), EngineSettings::default(), 15.0, 69);

    assert_eq!(report.transitions.len(), 5);
    let last = report.transitions.last().unwrap();
    assert_eq!(last.to, PlaybackPosition::new(1, 0));
    assert_eq!(last.at, 39.0);
    assert_eq!(report.simulated_time, 39.0);
}

#[test]
fn test_simulation_wraps_to_start() {
    let catalog = image_catalog(&[&[1.0, 1.0], &[2.0]]);
    let report = run_simulation(catalog, EngineSettings::default(), 15.0, 4);

    let positions: Vec<_> = report.transitions.iter().map(|t| t.to).collect();
    assert_eq!(
        positions,
        vec![
            PlaybackPosition::new(0, 1),
            PlaybackPosition::new(1, 0),
            PlaybackPosition::new(0, 0),
        ]
    );
    assert_eq!(report.final_position, PlaybackPosition::new(0, 0));
}

#[test]
fn test_simulation_without_autoplay_stays_put() {
    let settings = EngineSettings {
        autoplay: false,
        ..Default::default()
    };
    let report = run_simulation(StoryCatalog::demo(), settings, 15.0, 10);

    assert!(report.transitions.is_empty());
    assert_eq!(report.simulated_time, 0.0);
    assert_eq!(report.final_position, PlaybackPosition::new(0, 0));
}

#[test]
fn test_config_init_creates_file() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_directory(dir.path().to_path_buf()).unwrap();

    config_init(&manager).unwrap();
    assert!(manager.config_path().exists());
    config_init(&manager).unwrap();
}
