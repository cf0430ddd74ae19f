//! Edge case and error scenario tests

use std::fs;
use storyreel_config::{Config, ConfigError, ConfigManager};
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_corrupted_config_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "this is not valid TOML {{{")?;

    assert!(manager.load().is_err());
    assert_eq!(manager.load_or_default(), Config::default());
    Ok(())
}

#[test]
fn test_empty_config_file_is_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "\n   \n")?;

    assert!(matches!(manager.load(), Err(ConfigError::EmptyFile { .. })));
    Ok(())
}

#[test]
fn test_save_creates_parent_directories() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().join("a").join("b"))?;

    manager.save(&Config::default())?;
    assert!(manager.config_path().exists());
    Ok(())
}

#[test]
fn test_boundary_values_validation() {
    let mut config = Config::default();
    config.playback.image_tick_ms = 50;
    config.playback.video_poll_ms = 5_000;
    config.playback.simulated_video_secs = 3600.0;
    assert!(config.validate().is_ok());

    config.playback.image_tick_ms = 10_001;
    assert!(config.validate().is_err());
}

#[test]
fn test_unknown_fields_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(
        manager.config_path(),
        "[playback]\nautoplay = false\nshuffle = true\n\n[ui]\ntheme = \"dark\"\n",
    )?;

    let config = manager.load()?;
    assert!(!config.playback.autoplay);
    Ok(())
}

#[test]
fn test_wrong_value_type_is_parse_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "[playback]\nimage_tick_ms = \"fast\"\n")?;

    assert!(matches!(manager.load(), Err(ConfigError::ParseError { .. })));
    Ok(())
}

#[test]
fn test_rapid_saves() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    for ms in 0..20u64 {
        manager.update(|config| config.playback.image_tick_ms = 100 + ms)?;
    }

    assert_eq!(manager.load()?.playback.image_tick_ms, 119);
    Ok(())
}

#[test]
fn test_backup_holds_previous_contents() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.update(|config| config.playback.image_tick_ms = 300)?;
    manager.update(|config| config.playback.image_tick_ms = 400)?;

    let backup = manager.config_path().with_extension("toml.backup");
    let contents = fs::read_to_string(backup)?;
    assert!(contents.contains("image_tick_ms = 300"));
    Ok(())
}
