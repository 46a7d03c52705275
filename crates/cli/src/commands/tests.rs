use super::*;
use clap::ArgMatches;
use tempfile::TempDir;

fn context_in(dir: &TempDir) -> AppContext {
    let mut config = Config::default();
    config.app.data_dir = Some(dir.path().to_path_buf());
    AppContext::open(config, false).unwrap()
}

/// Parses `args` and returns the innermost subcommand matches
fn leaf(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["tilawah"];
    argv.extend_from_slice(args);
    let mut matches = crate::build_cli().try_get_matches_from(argv).unwrap();
    while let Some((_, sub)) = matches.subcommand() {
        matches = sub.clone();
    }
    matches
}

/// Parses `args` and returns the matches of the top-level subcommand
fn group(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["tilawah"];
    argv.extend_from_slice(args);
    let matches = crate::build_cli().try_get_matches_from(argv).unwrap();
    matches.subcommand().unwrap().1.clone()
}

#[test]
fn test_parse_verse_valid() {
    let identity = parse_verse("2:255").unwrap();
    assert_eq!(identity.chapter, 2);
    assert_eq!(identity.verse, 255);
}

#[test]
fn test_parse_verse_rejects_out_of_range() {
    assert!(parse_verse("1:8").is_err());
    assert!(parse_verse("115:1").is_err());
    assert!(parse_verse("0:1").is_err());
    assert!(parse_verse("fatiha").is_err());
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer sentence", 8), "a longer...");
    assert_eq!(truncate("بسم الله", 3), "بسم...");
}

#[test]
fn test_bookmark_add_and_remove() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context_in(&temp_dir);

    bookmark(&ctx, &group(&["bookmark", "add", "18:10", "-m", "cave"])).unwrap();
    let list = ctx.stores.bookmarks.list().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].note.as_deref(), Some("cave"));

    let id = list[0].id.to_string();
    bookmark(&ctx, &group(&["bookmark", "remove", &id])).unwrap();
    assert!(ctx.stores.bookmarks.list().unwrap().is_empty());
}

#[test]
fn test_bookmark_remove_invalid_id() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context_in(&temp_dir);

    assert!(bookmark(&ctx, &group(&["bookmark", "remove", "not-a-uuid"])).is_err());
}

#[test]
fn test_map_set_changes_resolved_url() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context_in(&temp_dir);
    let verse = parse_verse("1:1").unwrap();

    map(
        &ctx,
        &group(&["map", "set", "1:1", "https://cdn.example.com/1-1.mp3"]),
    )
    .unwrap();
    assert_eq!(ctx.resolver().resolve(verse), "https://cdn.example.com/1-1.mp3");

    map(&ctx, &group(&["map", "clear", "1:1"])).unwrap();
    assert_eq!(ctx.resolver().resolve(verse), ctx.resolver().default_url(verse));
}

#[test]
fn test_custom_url_in_use_cannot_be_deleted() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context_in(&temp_dir);

    map(
        &ctx,
        &group(&["map", "set", "2:255", "https://cdn.example.com/kursi.mp3"]),
    )
    .unwrap();
    let id = ctx.stores.audio_urls.custom_urls()[0].id.to_string();

    assert!(custom_url(&ctx, &group(&["custom-url", "delete", &id])).is_err());
    assert_eq!(ctx.stores.audio_urls.custom_urls().len(), 1);
}

#[test]
fn test_custom_url_rejects_non_http() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context_in(&temp_dir);

    assert!(custom_url(&ctx, &group(&["custom-url", "add", "ftp://example.com/a.mp3"])).is_err());
    assert!(ctx.stores.audio_urls.custom_urls().is_empty());
}

#[test]
fn test_tafseer_set_and_get() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context_in(&temp_dir);

    tafseer(
        &ctx,
        &group(&["tafseer", "set", "112:1", "Declaration of oneness", "-a", "Ibn Kathir"]),
    )
    .unwrap();
    tafseer(&ctx, &group(&["tafseer", "get", "112:1"])).unwrap();

    let stored = ctx
        .stores
        .tafseer
        .get(parse_verse("112:1").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored.author.as_deref(), Some("Ibn Kathir"));
}

#[test]
fn test_show_url_rejects_invalid_verse() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context_in(&temp_dir);

    assert!(show_url(&ctx, &leaf(&["url", "2:300"])).is_err());
    assert!(show_url(&ctx, &leaf(&["url", "2:286"])).is_ok());
}

#[test]
fn test_show_verses_without_bundle_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.app.data_dir = Some(temp_dir.path().to_path_buf());

    assert!(show_verses(&config, &leaf(&["verses", "1"])).is_err());
    assert!(show_verses(&config, &leaf(&["verses", "200"])).is_err());
}

#[test]
fn test_config_init_writes_file() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf()).unwrap();
    let config = Config::default();

    config_cmd(&manager, &config, &["config", "init"]);
    assert!(manager.config_path().exists());
    config_cmd(&manager, &config, &["config", "show"]);
}

fn config_cmd(manager: &ConfigManager, config: &Config, args: &[&str]) {
    super::config(manager, config, &group(args)).unwrap();
}
