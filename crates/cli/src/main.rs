use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use tilawah_config::ConfigManager;

mod commands;
mod context;
mod player;

fn verse_arg() -> Arg {
    Arg::new("verse")
        .required(true)
        .value_name("CHAPTER:VERSE")
        .help("Verse reference, e.g. 2:255")
}

fn build_cli() -> Command {
    Command::new("tilawah")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Tilawah Contributors")
        .about("Verse-by-verse Quran recitation player")
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory for bookmarks, overrides and the reading position")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .help("Treat the document store as unreachable; changes are kept locally")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("chapters").about("List all chapters"))
        .subcommand(
            Command::new("verses")
                .about("Show the text of a chapter")
                .arg(
                    Arg::new("chapter")
                        .required(true)
                        .value_name("CHAPTER")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_name("VERSE")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .value_name("VERSE")
                        .value_parser(value_parser!(u16)),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search verse text, or jump to a CHAPTER:VERSE reference")
                .arg(Arg::new("query").required(true).value_name("QUERY"))
                .arg(
                    Arg::new("chapter")
                        .short('c')
                        .long("chapter")
                        .value_name("CHAPTER")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("limit")
                        .short('n')
                        .long("limit")
                        .value_name("N")
                        .value_parser(value_parser!(usize))
                        .default_value("20"),
                ),
        )
        .subcommand(
            Command::new("url")
                .about("Show the audio URL that would be played for a verse")
                .arg(verse_arg()),
        )
        .subcommand(
            Command::new("play")
                .about("Play a verse with the simulated media backend")
                .arg(verse_arg())
                .arg(
                    Arg::new("no-advance")
                        .long("no-advance")
                        .help("Stop after this verse")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .value_name("N")
                        .help("Stop after N verses")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("clip-ms")
                        .long("clip-ms")
                        .value_name("MS")
                        .help("Simulated length of each verse")
                        .value_parser(value_parser!(u64))
                        .default_value("1500"),
                ),
        )
        .subcommand(
            Command::new("resume")
                .about("Show the saved reading position")
                .arg(
                    Arg::new("play")
                        .long("play")
                        .help("Start playing from the saved verse")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("bookmark")
                .about("Manage bookmarks")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Bookmark a verse")
                        .arg(verse_arg())
                        .arg(Arg::new("note").short('m').long("note").value_name("TEXT")),
                )
                .subcommand(
                    Command::new("list").about("List bookmarks").arg(
                        Arg::new("chapter")
                            .short('c')
                            .long("chapter")
                            .value_name("CHAPTER")
                            .value_parser(value_parser!(u16)),
                    ),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Delete a bookmark")
                        .arg(Arg::new("id").required(true).value_name("BOOKMARK_ID")),
                ),
        )
        .subcommand(
            Command::new("custom-url")
                .about("Manage custom audio URLs")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Register an audio URL")
                        .arg(Arg::new("url").required(true).value_name("URL"))
                        .arg(Arg::new("label").short('l').long("label").value_name("TEXT")),
                )
                .subcommand(Command::new("list").about("List custom audio URLs"))
                .subcommand(
                    Command::new("delete")
                        .about("Delete a custom audio URL no verse uses")
                        .arg(Arg::new("id").required(true).value_name("URL_ID")),
                ),
        )
        .subcommand(
            Command::new("map")
                .about("Assign audio URLs to verses")
                .subcommand_required(true)
                .subcommand(
                    Command::new("set")
                        .about("Play URL for this verse instead of the default")
                        .arg(verse_arg())
                        .arg(Arg::new("url").required(true).value_name("URL"))
                        .arg(Arg::new("label").short('l').long("label").value_name("TEXT")),
                )
                .subcommand(
                    Command::new("clear")
                        .about("Return a verse to the default URL")
                        .arg(verse_arg()),
                )
                .subcommand(Command::new("list").about("List verses with an assigned URL")),
        )
        .subcommand(
            Command::new("tafseer")
                .about("Read or write commentary for a verse")
                .subcommand_required(true)
                .subcommand(Command::new("get").about("Show commentary").arg(verse_arg()))
                .subcommand(
                    Command::new("set")
                        .about("Write commentary")
                        .arg(verse_arg())
                        .arg(Arg::new("text").required(true).value_name("TEXT"))
                        .arg(Arg::new("author").short('a').long("author").value_name("NAME")),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or create the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a commented default config.toml"))
                .subcommand(Command::new("show").about("Print the effective configuration")),
        )
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = match matches.get_one::<PathBuf>("config-dir") {
        Some(dir) => ConfigManager::with_directory(dir.clone()),
        None => ConfigManager::new(),
    }
    .context("Failed to locate config directory")?;

    let mut config = manager
        .load_with_env_overrides()
        .with_context(|| format!("Failed to load {}", manager.config_path().display()))?;
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config.app.data_dir = Some(dir.clone());
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();

    let offline = matches.get_flag("offline");

    match matches.subcommand() {
        Some(("chapters", _)) => commands::list_chapters(),
        Some(("verses", sub_matches)) => commands::show_verses(&config, sub_matches),
        Some(("search", sub_matches)) => commands::search(&config, sub_matches),
        Some(("config", sub_matches)) => commands::config(&manager, &config, sub_matches),
        Some((name, sub_matches)) => {
            let ctx = context::AppContext::open(config, offline)?;
            match name {
                "url" => commands::show_url(&ctx, sub_matches),
                "play" => player::play(&ctx, sub_matches),
                "resume" => player::resume(&ctx, sub_matches),
                "bookmark" => commands::bookmark(&ctx, sub_matches),
                "custom-url" => commands::custom_url(&ctx, sub_matches),
                "map" => commands::map(&ctx, sub_matches),
                "tafseer" => commands::tafseer(&ctx, sub_matches),
                _ => {
                    build_cli().print_help()?;
                    Ok(())
                }
            }
        }
        None => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
