use crate::context::{verse_provider, AppContext};
use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use console::style;
use tilawah_config::{Config, ConfigManager};
use tilawah_core::{AppError, BookmarkId, CustomUrlId, VerseIdentity};
use tilawah_storage::{StoreError, WriteOutcome};
use tilawah_verse_data::{all_chapters, MatchField, SearchQuery, VerseProvider};

/// List every chapter with its verse count
pub fn list_chapters() -> Result<()> {
    let chapters = all_chapters();

    println!("\n{} Chapters", style(chapters.len()).bold().cyan());
    println!("{}", "=".repeat(60));

    for meta in chapters {
        println!(
            "{:>3}  {:<16} {:<28} {:>3} verses  {}",
            meta.id,
            meta.name,
            style(&meta.english_name).dim(),
            meta.verse_count,
            meta.revelation
        );
    }

    Ok(())
}

/// Print the Arabic text and translation of a chapter
pub fn show_verses(config: &Config, matches: &ArgMatches) -> Result<()> {
    let chapter = *matches
        .get_one::<u16>("chapter")
        .ok_or_else(|| anyhow!("Chapter is required"))?;

    let provider = verse_provider(config)?;
    let meta = provider
        .chapter(chapter)
        .ok_or_else(|| anyhow!("There is no chapter {}", chapter))?;

    let from = matches.get_one::<u16>("from").copied().unwrap_or(1);
    let to = matches
        .get_one::<u16>("to")
        .copied()
        .unwrap_or(meta.verse_count);

    let verses = provider.chapter_verses(chapter);
    if verses.is_empty() {
        bail!(
            "No verse text for chapter {} in {}",
            chapter,
            provider.bundle_dir().display()
        );
    }

    println!(
        "\n{} {} ({})",
        style(meta.id).bold().cyan(),
        style(&meta.name).bold(),
        meta.english_name
    );
    println!("{}", "=".repeat(60));

    for verse in verses
        .iter()
        .filter(|v| (from..=to).contains(&v.identity.verse))
    {
        println!("\n{}  {}", style(verse.identity).bold(), verse.arabic);
        println!("     {}", verse.translation);
    }

    Ok(())
}

/// Search verse text
pub fn search(config: &Config, matches: &ArgMatches) -> Result<()> {
    let text = matches
        .get_one::<String>("query")
        .ok_or_else(|| anyhow!("Search query is required"))?;
    let limit = matches.get_one::<usize>("limit").copied().unwrap_or(20);

    let mut query = SearchQuery::new(text.as_str()).with_limit(limit);
    if let Some(chapter) = matches.get_one::<u16>("chapter") {
        query = query.in_chapter(*chapter);
    }

    let provider = verse_provider(config)?;
    let hits = provider.search(&query);

    if hits.is_empty() {
        println!("No verses found matching '{}'", text);
        return Ok(());
    }

    println!(
        "\n{} Results for '{}'",
        style(hits.len()).bold().cyan(),
        text
    );
    println!("{}", "=".repeat(60));

    for hit in hits {
        let marker = match hit.matched {
            MatchField::Reference => "ref",
            MatchField::Arabic => "ar",
            MatchField::Translation => "en",
        };
        println!(
            "\n{} {} [{}]",
            style(hit.verse.identity).bold(),
            style(&hit.chapter_name).dim(),
            marker
        );
        println!("  {}", truncate(&hit.verse.translation, 100));
    }

    Ok(())
}

/// Print the audio URL for a verse
pub fn show_url(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let identity = verse_arg(matches)?;
    let resolver = ctx.resolver();

    let url = resolver.resolve(identity);
    let source = if url == resolver.default_url(identity) {
        "default"
    } else {
        "custom"
    };
    println!("{} {} ({})", style(identity).bold(), url, style(source).dim());
    Ok(())
}

/// `bookmark add|list|remove`
pub fn bookmark(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let bookmarks = &ctx.stores.bookmarks;

    match matches.subcommand() {
        Some(("add", sub)) => {
            let identity = verse_arg(sub)?;
            let note = sub.get_one::<String>("note").cloned();
            let written = bookmarks.create(identity, note).map_err(user_error)?;

            println!(
                "{} Bookmarked {}",
                style("✓").green().bold(),
                written.record.identity
            );
            println!("  ID: {}", written.record.id);
            report_outcome(&written.outcome);
        }
        Some(("list", sub)) => {
            let list = match sub.get_one::<u16>("chapter") {
                Some(chapter) => bookmarks.list_for_chapter(*chapter),
                None => bookmarks.list(),
            }
            .map_err(user_error)?;

            if list.is_empty() {
                println!("No bookmarks yet. Use 'bookmark add' to create one.");
                return Ok(());
            }

            println!("\n{} Bookmarks", style(list.len()).bold().cyan());
            println!("{}", "=".repeat(60));
            for bookmark in list {
                print!(
                    "{:<8} {}",
                    style(bookmark.identity).bold(),
                    truncate(&bookmark.id.to_string(), 8)
                );
                match &bookmark.note {
                    Some(note) => println!("  {}", note),
                    None => println!(),
                }
            }
        }
        Some(("remove", sub)) => {
            let id = sub
                .get_one::<String>("id")
                .ok_or_else(|| anyhow!("Bookmark ID is required"))?;
            let id = BookmarkId::from_string(id).context("Invalid bookmark ID format")?;

            let outcome = bookmarks.delete(id).map_err(user_error)?;
            println!("{} Bookmark removed", style("✓").green().bold());
            report_outcome(&outcome);
        }
        _ => bail!("Unknown bookmark command"),
    }

    Ok(())
}

/// `custom-url add|list|delete`
pub fn custom_url(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let audio_urls = &ctx.stores.audio_urls;

    match matches.subcommand() {
        Some(("add", sub)) => {
            let url = sub
                .get_one::<String>("url")
                .ok_or_else(|| anyhow!("URL is required"))?;
            let label = sub.get_one::<String>("label").map(String::as_str);

            let written = audio_urls.create_custom_url(url, label).map_err(user_error)?;
            println!("{} Added {}", style("✓").green().bold(), written.record.url);
            println!("  ID: {}", written.record.id);
            report_outcome(&written.outcome);
        }
        Some(("list", _)) => {
            let urls = audio_urls.custom_urls();
            if urls.is_empty() {
                println!("No custom audio URLs.");
                return Ok(());
            }

            println!("\n{} Custom audio URLs", style(urls.len()).bold().cyan());
            println!("{}", "=".repeat(60));
            for url in urls {
                let uses = audio_urls.cache().references(url.id).len();
                println!("{}", style(&url.url).bold());
                println!(
                    "  ID: {} | Label: {} | Used by {} verse(s)",
                    url.id,
                    url.label.as_deref().unwrap_or("-"),
                    uses
                );
            }
        }
        Some(("delete", sub)) => {
            let id = sub
                .get_one::<String>("id")
                .ok_or_else(|| anyhow!("URL ID is required"))?;
            let id = CustomUrlId::from_string(id).context("Invalid URL ID format")?;

            let outcome = audio_urls.delete_custom_url(id).map_err(user_error)?;
            println!("{} Custom URL deleted", style("✓").green().bold());
            report_outcome(&outcome);
        }
        _ => bail!("Unknown custom-url command"),
    }

    Ok(())
}

/// `map set|clear|list`
pub fn map(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let audio_urls = &ctx.stores.audio_urls;

    match matches.subcommand() {
        Some(("set", sub)) => {
            let identity = verse_arg(sub)?;
            let url = sub
                .get_one::<String>("url")
                .ok_or_else(|| anyhow!("URL is required"))?;
            let label = sub.get_one::<String>("label").map(String::as_str);

            let custom = audio_urls.upsert_by_url(url, label).map_err(user_error)?;
            let mapping = audio_urls
                .assign(identity, custom.record.id)
                .map_err(user_error)?;

            println!(
                "{} {} now plays {}",
                style("✓").green().bold(),
                identity,
                custom.record.url
            );
            report_outcome(&custom.outcome.combine(mapping.outcome));
        }
        Some(("clear", sub)) => {
            let identity = verse_arg(sub)?;
            let written = audio_urls.clear(identity).map_err(user_error)?;
            println!(
                "{} {} uses the default recitation again",
                style("✓").green().bold(),
                identity
            );
            report_outcome(&written.outcome);
        }
        Some(("list", _)) => {
            let mut mappings = audio_urls.mappings();
            if mappings.is_empty() {
                println!("Every verse uses the default recitation.");
                return Ok(());
            }

            mappings.sort_by_key(|m| m.identity);
            println!("\n{} Assigned verses", style(mappings.len()).bold().cyan());
            println!("{}", "=".repeat(60));
            for mapping in mappings {
                println!(
                    "{:<8} {}",
                    style(mapping.identity).bold(),
                    mapping.override_url().unwrap_or("-")
                );
            }
        }
        _ => bail!("Unknown map command"),
    }

    Ok(())
}

/// `tafseer get|set`
pub fn tafseer(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let store = &ctx.stores.tafseer;

    match matches.subcommand() {
        Some(("get", sub)) => {
            let identity = verse_arg(sub)?;
            match store.get(identity).map_err(user_error)? {
                Some(tafseer) => {
                    println!("\n{}", style(identity).bold().cyan());
                    if let Some(author) = &tafseer.author {
                        println!("{}", style(author).dim());
                    }
                    println!("\n{}", tafseer.text);
                }
                None => println!("No commentary for {}", identity),
            }
        }
        Some(("set", sub)) => {
            let identity = verse_arg(sub)?;
            let text = sub
                .get_one::<String>("text")
                .ok_or_else(|| anyhow!("Commentary text is required"))?;
            let author = sub.get_one::<String>("author").cloned();

            let written = store
                .set(identity, text.as_str(), author)
                .map_err(user_error)?;
            println!(
                "{} Commentary saved for {}",
                style("✓").green().bold(),
                identity
            );
            report_outcome(&written.outcome);
        }
        _ => bail!("Unknown tafseer command"),
    }

    Ok(())
}

/// `config init|show`
pub fn config(manager: &ConfigManager, config: &Config, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("init", _)) => {
            let created = manager
                .initialize()
                .context("Failed to write default config")?;
            if created {
                println!(
                    "{} Config written to {}",
                    style("✓").green().bold(),
                    manager.config_path().display()
                );
            } else {
                println!(
                    "Config already exists at {}",
                    manager.config_path().display()
                );
            }
        }
        Some(("show", _)) => {
            println!("# {}", manager.config_path().display());
            let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
            print!("{}", text);
            if let Err(errors) = config.validate() {
                for error in errors {
                    eprintln!("{} {}", style("warning:").yellow().bold(), error);
                }
            }
        }
        _ => bail!("Unknown config command"),
    }

    Ok(())
}

/// Parses the `verse` argument of a subcommand
pub(crate) fn verse_arg(matches: &ArgMatches) -> Result<VerseIdentity> {
    let raw = matches
        .get_one::<String>("verse")
        .ok_or_else(|| anyhow!("Verse reference is required"))?;
    parse_verse(raw)
}

pub(crate) fn parse_verse(raw: &str) -> Result<VerseIdentity> {
    let identity: VerseIdentity = raw.parse().map_err(|e: String| anyhow!(e))?;
    if !tilawah_verse_data::chapters::contains(identity) {
        let err = AppError::InvalidVerse {
            chapter: identity.chapter,
            verse: identity.verse,
        };
        bail!(err.user_message());
    }
    Ok(identity)
}

/// Turns a store error into the message the user should see
fn user_error(err: StoreError) -> anyhow::Error {
    let app: AppError = err.into();
    log::debug!("Store error: {}", app);
    anyhow!(app.user_message())
}

fn report_outcome(outcome: &WriteOutcome) {
    if let Some(warning) = outcome.warning() {
        println!("{} {}", style("!").yellow().bold(), warning);
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests;
