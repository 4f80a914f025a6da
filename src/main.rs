use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use colored::Colorize;
use dialoguer::Confirm;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use reel_publisher::config::PublishConfig;
use reel_publisher::extractor::strategies::DEFAULT_SETTLE_SECONDS;
use reel_publisher::extractor::{MediaFetcher, MediaKind, MediaResolver};
use reel_publisher::publish::{self, naming, GithubClient, UploadRequest};

type CliError = Box<dyn std::error::Error>;

/// Publish media from a public post you own to a GitHub-hosted feed
#[derive(Parser)]
#[command(name = "reel-publisher", version, about)]
struct Cli {
    /// Public post URL to extract media from
    post_url: Option<String>,

    /// Direct media URL, bypassing extraction (https only)
    #[arg(long, conflicts_with = "post_url")]
    media_url: Option<String>,

    /// Local media file, bypassing extraction and download
    #[arg(long, conflicts_with_all = ["post_url", "media_url"])]
    file: Option<PathBuf>,

    /// Caption stored in the feed entry
    #[arg(long, default_value = "")]
    caption: String,

    /// Hashtags, comma or space separated
    #[arg(long, default_value = "")]
    hashtags: String,

    /// Entry datetime, RFC 3339 (defaults to now)
    #[arg(long)]
    datetime: Option<String>,

    /// Override for the object file name slug
    #[arg(long)]
    name_hint: Option<String>,

    /// Extra seconds the network sniffer waits for late media requests
    #[arg(long, default_value_t = DEFAULT_SETTLE_SECONDS)]
    settle_seconds: u64,

    /// Skip the interactive ownership confirmation
    #[arg(long)]
    yes: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "✗".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = PublishConfig::load()?;

    if !cli.yes && !confirm_ownership()? {
        return Err("aborted: ownership not confirmed".into());
    }

    let datetime = entry_datetime(cli.datetime.as_deref())?;
    let hashtags = split_hashtags(&cli.hashtags);

    let (bytes, ext) = if let Some(post_url) = &cli.post_url {
        resolve_and_fetch(post_url, cli.settle_seconds).await?
    } else if let Some(media_url) = &cli.media_url {
        fetch_direct(media_url).await?
    } else if let Some(path) = &cli.file {
        read_local(path).await?
    } else {
        return Err("provide a post URL, --media-url, or --file".into());
    };

    let hint = name_hint(&cli);
    let file_name = naming::object_name(&datetime, &hint, ext);

    let github = GithubClient::new(config);
    let receipt = publish::publish_media(
        &github,
        UploadRequest {
            bytes,
            file_name,
            caption: cli.caption.clone(),
            hashtags,
            datetime,
        },
    )
    .await?;

    println!("{} Published {}", "✓".green().bold(), receipt.media_path.bold());
    println!("  raw URL: {}", receipt.raw_url);
    println!("{}", serde_json::to_string_pretty(&receipt.entry)?);
    Ok(())
}

/// The feed host serves whatever lands in the repo; make the caller say out
/// loud that the content is theirs to publish.
fn confirm_ownership() -> Result<bool, CliError> {
    Confirm::new()
        .with_prompt("Do you own this content (or have explicit permission to publish it)?")
        .default(false)
        .interact()
        .map_err(Into::into)
}

fn entry_datetime(raw: Option<&str>) -> Result<String, CliError> {
    let dt = match raw {
        Some(s) => OffsetDateTime::parse(s, &Rfc3339).map_err(|_| {
            format!(
                "invalid --datetime {:?}, expected RFC 3339 like 2025-08-27T12:30:00Z",
                s
            )
        })?,
        None => OffsetDateTime::now_utc(),
    };
    // Seconds precision; sub-second noise would leak into file names.
    let dt = dt.replace_nanosecond(0)?;
    Ok(dt.format(&Rfc3339)?)
}

fn split_hashtags(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn name_hint(cli: &Cli) -> String {
    if let Some(hint) = cli.name_hint.as_ref().filter(|h| !h.is_empty()) {
        return hint.clone();
    }
    if !cli.caption.is_empty() {
        return cli.caption.clone();
    }
    cli.post_url
        .clone()
        .or_else(|| cli.media_url.clone())
        .unwrap_or_default()
}

async fn resolve_and_fetch(
    post_url: &str,
    settle_seconds: u64,
) -> Result<(Vec<u8>, &'static str), CliError> {
    let resolver = MediaResolver::with_default_strategies(settle_seconds);
    let candidate = resolver.resolve(post_url).await?;
    println!(
        "{} Found {} via {}: {}",
        "→".blue(),
        candidate.kind,
        candidate.source,
        candidate.url
    );

    let fetched = MediaFetcher::new().fetch(&candidate.url).await?;
    let kind = fetched.kind_or(candidate.kind);
    let ext = naming::extension_for(kind, &fetched.content_type, &candidate.url);
    Ok((fetched.bytes, ext))
}

async fn fetch_direct(media_url: &str) -> Result<(Vec<u8>, &'static str), CliError> {
    if !media_url.starts_with("https://") {
        return Err("--media-url must start with https://".into());
    }
    let fetched = MediaFetcher::new().fetch(media_url).await?;
    let kind = fetched.kind_or(MediaKind::Video);
    let ext = naming::extension_for(kind, &fetched.content_type, media_url);
    Ok((fetched.bytes, ext))
}

async fn read_local(path: &Path) -> Result<(Vec<u8>, &'static str), CliError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("could not read {}: {}", path.display(), e))?;
    let ext = naming::extension_from_url(&path.to_string_lossy());
    Ok((bytes, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_hashtags_accepts_commas_and_spaces() {
        assert_eq!(split_hashtags("love, vibes"), vec!["love", "vibes"]);
        assert_eq!(split_hashtags("love vibes"), vec!["love", "vibes"]);
        assert_eq!(split_hashtags(""), Vec::<String>::new());
        assert_eq!(split_hashtags(" ,, "), Vec::<String>::new());
    }

    #[test]
    fn test_entry_datetime_round_trips() {
        let formatted = entry_datetime(Some("2025-08-27T12:30:00Z")).unwrap();
        assert_eq!(formatted, "2025-08-27T12:30:00Z");
    }

    #[test]
    fn test_entry_datetime_rejects_garbage() {
        assert!(entry_datetime(Some("yesterday at noon")).is_err());
    }

    #[test]
    fn test_entry_datetime_drops_subsecond_noise() {
        let formatted = entry_datetime(Some("2025-08-27T12:30:00.123456Z")).unwrap();
        assert_eq!(formatted, "2025-08-27T12:30:00Z");
    }
}
