//! ffscrape CLI - fanfiction.net story downloader.

use anyhow::{Context, Result};
use clap::Parser;
use ffscrape::config::Config;
use ffscrape::console::Console;
use ffscrape::fanfiction::{self, Story};
use ffscrape::fetch::HttpFetcher;
use futures::StreamExt;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// fanfiction.net story downloader.
#[derive(Parser, Debug)]
#[command(name = "ffscrape")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the story to download.
    story_url: String,

    /// Start downloading from chapter N (1-based).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    start: Option<u32>,

    /// Stop downloading at chapter N (1-based, inclusive).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    end: Option<u32>,

    /// Only show story metadata, do not download chapters.
    #[arg(long)]
    info: bool,

    /// Print story metadata as JSON and exit.
    #[arg(long)]
    json: bool,

    /// Directory to write chapters under (overrides the config file).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    init_logging(args.verbose || config.scraping.debug);

    if !fanfiction::can_handle(&args.story_url) {
        console.error(&format!("Not a fanfiction.net story URL: {}", args.story_url));
        anyhow::bail!("Unsupported URL: {}", args.story_url);
    }
    let story_id = fanfiction::parse_story_id(&args.story_url)?;
    let fetcher =
        HttpFetcher::new(config.scraping.clone()).context("Failed to create HTTP client")?;

    if args.json {
        let story = Story::fetch(&fetcher, &fanfiction::story_url(story_id))
            .await
            .context("Failed to fetch story")?;
        println!("{}", serde_json::to_string_pretty(&story)?);
        return Ok(());
    }

    console.section("ffscrape - fanfiction.net downloader");

    console.step("Fetching story information...");
    let story = Story::fetch(&fetcher, &fanfiction::story_url(story_id))
        .await
        .context("Failed to fetch story")?;
    console.success(&format!("Found: {} by {}", story.title, story.author));
    print_story(&console, &story);

    if args.info {
        return Ok(());
    }

    let (start, end) = validate_chapter_range(args.start, args.end, &story, &console)?;

    let output_dir = args
        .output
        .unwrap_or(config.paths.output_directory)
        .join(story.id.to_string());
    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut chapters = std::pin::pin!(story.fetch_chapter_range(&fetcher, start..=end));
    while let Some(chapter) = chapters.next().await {
        let chapter = match chapter {
            Ok(chapter) => chapter,
            Err(e) => {
                console.error(&format!("Failed to download chapter: {}", e));
                return Err(e).context("Failed to download chapter");
            }
        };
        let path = output_dir.join(format!("{:03}.html", chapter.number));

        tokio::fs::write(&path, &chapter.text)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        console.info(&format!(
            "{} {} ({} bytes)",
            console.chapter_progress(chapter.number, story.number_chapters),
            chapter.title,
            chapter.text.len()
        ));
    }

    console.success(&format!("Chapters saved to {}", output_dir.display()));
    console.section("Done!");
    Ok(())
}

/// Installs the tracing subscriber; `RUST_LOG` takes precedence.
fn init_logging(debug: bool) {
    let default_filter = if debug { "ffscrape=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_story(console: &Console, story: &Story) {
    console.field("Title", &story.title);
    console.field("Author", &format!("{} (id {})", story.author, story.author_id));
    console.field("Category", &story.category);
    console.field("Rated", &story.rated.to_string());
    console.field("Language", &story.language);
    console.field("Genre", &story.genre);
    console.field("Characters", &story.characters);
    console.field("Chapters", &story.number_chapters.to_string());
    console.field("Words", &story.number_words.to_string());
    console.field("Reviews", &story.reviews.to_string());
    console.field("Status", &story.status.to_string());
    console.field("Published", &story.date_published);
    console.field("Updated", &story.date_updated);
    console.field("Summary", &story.summary);
}

/// Validates the chapter range arguments.
///
/// An end past the last chapter is narrowed to it with a warning.
fn validate_chapter_range(
    start: Option<u32>,
    end: Option<u32>,
    story: &Story,
    console: &Console,
) -> Result<(u32, u32)> {
    let total_chapters = story.number_chapters;

    let start_chapter = start.unwrap_or(1);
    let mut end_chapter = end.unwrap_or(total_chapters);

    if end_chapter > total_chapters {
        console.warning(&format!(
            "End chapter ({}) exceeds total chapters ({}), stopping at {}",
            end_chapter, total_chapters, total_chapters
        ));
        end_chapter = total_chapters;
    }

    if start_chapter > end_chapter {
        anyhow::bail!(
            "Start chapter ({}) cannot be greater than end chapter ({})",
            start_chapter,
            end_chapter
        );
    }

    console.info(&format!(
        "Processing chapters {} to {} of {}",
        start_chapter, end_chapter, total_chapters
    ));

    Ok((start_chapter, end_chapter))
}
