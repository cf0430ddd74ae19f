// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use storyreel_config::{Config, ConfigManager};

mod commands;
mod player;

fn story_source_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Story file (JSON)")
                .required_unless_present("demo"),
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .help("Use the built-in demo stories")
                .action(ArgAction::SetTrue)
                .conflicts_with("file"),
        )
}

fn build_cli() -> Command {
    Command::new("storyreel")
        .version(env!("CARGO_PKG_VERSION"))
        .author("StoryReel Contributors")
        .about("Plays stories of image and video slides")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to the config file")
                .global(true),
        )
        .subcommand(story_source_args(
            Command::new("play").about("Play stories interactively in the terminal"),
        ))
        .subcommand(
            story_source_args(
                Command::new("simulate").about("Run a deterministic playback and print transitions"),
            )
            .arg(
                Arg::new("ticks")
                    .short('t')
                    .long("ticks")
                    .value_name("N")
                    .help("Number of clock ticks to simulate")
                    .value_parser(clap::value_parser!(u64))
                    .default_value("60"),
            ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a story file and print a summary")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_name("FILE")
                        .help("Story file (JSON)"),
                ),
        )
        .subcommand(Command::new("demo").about("Print the demo stories as JSON"))
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand(Command::new("init").about("Write a default config file"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location")),
        )
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    match matches.get_one::<String>("config") {
        Some(path) => ConfigManager::with_file(path).context("Failed to open config file"),
        None => ConfigManager::new().context("Failed to locate config directory"),
    }
}

fn load_config(manager: &ConfigManager) -> Config {
    match manager.load_with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}, using default configuration", e);
            Config::default()
        }
    }
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = config_manager(&matches)?;
    let config = load_config(&manager);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.as_filter()),
    )
    .init();
    console::set_colors_enabled(config.app.color);

    match matches.subcommand() {
        Some(("play", sub_matches)) => {
            let catalog = commands::load_catalog(sub_matches)?;
            player::run(catalog, &config.playback)
        }
        Some(("simulate", sub_matches)) => {
            let catalog = commands::load_catalog(sub_matches)?;
            let ticks = sub_matches.get_one::<u64>("ticks").copied().unwrap_or(60);
            commands::simulate(catalog, &config.playback, ticks)
        }
        Some(("validate", sub_matches)) => {
            let file = sub_matches
                .get_one::<String>("file")
                .ok_or_else(|| anyhow::anyhow!("Story file is required"))?;
            commands::validate_file(file)
        }
        Some(("demo", _)) => commands::print_demo(),
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("init", _)) => commands::config_init(&manager),
            Some(("show", _)) => commands::config_show(&config),
            Some(("path", _)) => {
                println!("{}", manager.config_path().display());
                Ok(())
            }
            _ => {
                build_cli().print_help()?;
                Ok(())
            }
        },
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
