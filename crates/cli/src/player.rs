use crate::commands::verse_arg;
use crate::context::AppContext;
use anyhow::{Context, Result};
use clap::ArgMatches;
use console::style;
use std::sync::Arc;
use std::time::Duration;
use tilawah_core::VerseIdentity;
use tilawah_playback::{
    PlaybackCoordinator, PlaybackEvent, PlaybackStatus, PositionSaver, ReaderSession,
    SimulatedMediaFactory, SystemClock, ViewportAnchor,
};
use tilawah_verse_data::{BundledVerseProvider, VerseProvider};

const TICK: Duration = Duration::from_millis(20);
const DEFAULT_CLIP_MS: u64 = 1500;

/// `play <verse>`: recite from a verse with the simulated backend
pub fn play(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let identity = verse_arg(matches)?;
    let auto_advance = !matches.get_flag("no-advance");
    let count = matches.get_one::<usize>("count").copied();
    let clip = clip_length(matches);

    let mut session = open_session(ctx, clip, auto_advance)?;
    run(ctx, &mut session, identity, count)?;
    Ok(())
}

/// `resume`: show the saved reading position, optionally playing from it
pub fn resume(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let mut session = open_session(ctx, Duration::from_millis(DEFAULT_CLIP_MS), true)?;

    let Some(position) = session.restore() else {
        println!("No saved reading position.");
        return Ok(());
    };

    let identity = position.identity();
    println!(
        "{} {} ({}, scrolled to {:.0}px)",
        style("Resume at").bold(),
        style(identity).bold().cyan(),
        if position.paused { "paused" } else { "playing" },
        position.scroll_offset
    );

    if matches.get_flag("play") {
        run(ctx, &mut session, identity, None)?;
    }

    Ok(())
}

fn clip_length(matches: &ArgMatches) -> Duration {
    let ms = matches
        .get_one::<u64>("clip-ms")
        .copied()
        .unwrap_or(DEFAULT_CLIP_MS);
    Duration::from_millis(ms)
}

fn open_session(ctx: &AppContext, clip: Duration, auto_advance: bool) -> Result<ReaderSession> {
    let mut player_config = ctx.config.player.clone();
    player_config.auto_advance = auto_advance;

    let clock = Arc::new(SystemClock::new());
    let verses: Arc<dyn VerseProvider> = Arc::new(ctx.verses()?);

    let coordinator = PlaybackCoordinator::new(
        Box::new(SimulatedMediaFactory::new(clip)),
        ctx.resolver(),
        verses,
        clock.clone(),
    )
    .with_config(&player_config);

    Ok(ReaderSession::new(
        coordinator,
        ViewportAnchor::from_config(clock.clone(), &player_config),
        PositionSaver::from_config(ctx.local.clone(), clock.clone(), &player_config),
        clock,
        &player_config,
    ))
}

/// Drives the session until playback goes idle or `limit` verses have played
///
/// Auto-advance is switched off as soon as the last allowed verse starts, so
/// that verse plays to its end and no further verse is ever created.
fn run(
    ctx: &AppContext,
    session: &mut ReaderSession,
    start: VerseIdentity,
    limit: Option<usize>,
) -> Result<usize> {
    let verses = ctx.verses()?;
    let mut started = 0;

    session
        .play(start)
        .with_context(|| format!("Cannot play {}", start))?;
    if limit == Some(1) {
        session.coordinator_mut().set_auto_advance(false);
    }

    loop {
        let tick = session.tick();

        for event in tick.events {
            match event {
                PlaybackEvent::VerseChanged(verse) => {
                    started += 1;
                    if limit.is_some_and(|limit| started >= limit) {
                        session.coordinator_mut().set_auto_advance(false);
                    }
                    print_verse(&verses, verse);
                }
                PlaybackEvent::AdvanceScheduled { next, delay } => {
                    println!(
                        "  {} {} in {}ms",
                        style("next").dim(),
                        next,
                        delay.as_millis()
                    );
                }
                PlaybackEvent::Error { verse, message } => {
                    let at = verse.map(|v| format!(" ({})", v)).unwrap_or_default();
                    eprintln!("{}{} {}", style("Playback failed").red().bold(), at, message);
                }
                PlaybackEvent::StateChanged { status, .. } => {
                    log::debug!("Playback status: {}", status);
                }
            }
        }

        if matches!(
            session.coordinator().status(),
            PlaybackStatus::Idle | PlaybackStatus::Failed
        ) {
            break;
        }

        std::thread::sleep(TICK);
    }

    session.flush_position();
    println!(
        "\n{} Played {} verse(s)",
        style("✓").green().bold(),
        started
    );
    Ok(started)
}

fn print_verse(verses: &BundledVerseProvider, identity: VerseIdentity) {
    println!("\n{} {}", style("▶").green(), style(identity).bold().cyan());
    if let Some(verse) = verses.verse(identity) {
        println!("  {}", verse.arabic);
        println!("  {}", style(&verse.translation).dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tilawah_config::Config;
    use tilawah_playback::READING_POSITION_KEY;
    use tilawah_storage::LocalStorage;

    fn context_in(dir: &TempDir) -> AppContext {
        context_with_delay(dir, 0)
    }

    fn context_with_delay(dir: &TempDir, advance_delay_ms: u64) -> AppContext {
        let mut config = Config::default();
        config.app.data_dir = Some(dir.path().to_path_buf());
        config.player.advance_delay_ms = advance_delay_ms;
        AppContext::open(config, false).unwrap()
    }

    fn verse(chapter: u16, verse: u16) -> VerseIdentity {
        VerseIdentity::new(chapter, verse).unwrap()
    }

    #[test]
    fn test_plays_to_end_of_chapter_and_saves_position() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context_in(&temp_dir);

        let mut session = open_session(&ctx, Duration::from_millis(30), true).unwrap();
        let played = run(&ctx, &mut session, verse(112, 3), None).unwrap();
        assert_eq!(played, 2);

        let saved = ctx.local.get(READING_POSITION_KEY).unwrap();
        assert!(saved.unwrap().contains("\"verse\":4"));
    }

    fn play_limited(advance_delay_ms: u64, limit: usize) -> (usize, String) {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context_with_delay(&temp_dir, advance_delay_ms);

        let mut session = open_session(&ctx, Duration::from_millis(30), true).unwrap();
        let played = run(&ctx, &mut session, verse(1, 1), Some(limit)).unwrap();
        assert_eq!(session.coordinator().status(), PlaybackStatus::Idle);

        let saved = ctx.local.get(READING_POSITION_KEY).unwrap().unwrap();
        (played, saved)
    }

    #[test]
    fn test_limit_stops_before_next_verse_without_delay() {
        let (played, saved) = play_limited(0, 2);
        assert_eq!(played, 2);
        assert!(saved.contains("\"verse\":2"));
    }

    #[test]
    fn test_limit_stops_before_next_verse_with_default_delay() {
        let (played, saved) = play_limited(300, 2);
        assert_eq!(played, 2);
        assert!(saved.contains("\"verse\":2"));
    }

    #[test]
    fn test_limit_of_one_plays_only_first_verse() {
        let (played, saved) = play_limited(0, 1);
        assert_eq!(played, 1);
        assert!(saved.contains("\"verse\":1"));
    }

    #[test]
    fn test_no_advance_plays_one_verse() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context_in(&temp_dir);

        let mut session = open_session(&ctx, Duration::from_millis(30), false).unwrap();
        assert_eq!(run(&ctx, &mut session, verse(2, 255), None).unwrap(), 1);
    }

    #[test]
    fn test_resume_reads_saved_position() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = context_in(&temp_dir);

        let mut session = open_session(&ctx, Duration::from_millis(30), false).unwrap();
        run(&ctx, &mut session, verse(36, 1), None).unwrap();

        let mut session = open_session(&ctx, Duration::from_millis(30), false).unwrap();
        let position = session.restore().unwrap();
        assert_eq!(position.identity(), verse(36, 1));
        assert!(position.paused);
    }
}
