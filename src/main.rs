#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use clap::{Parser, Subcommand};
use config::{DEFAULT_CHANNEL, DEFAULT_TIMEOUT_SECS, ProbeConfig, Strategy};
use indoc::printdoc;
use inspector::{StreamQueryResult, best_result, inspect_all, inspect_first, lookup_video};
use invidious::{
    api::get_video,
    structs::{VideoDetails, VideoSummary},
    utils::{ChannelId, extract_video_id},
};
use report::{DEFAULT_REPORT_PATH, TestReport};
use reqwest::Client;
use tracing::{info, warn};
use util::{init_http_client, truncate_string};

pub mod channel_info;
pub mod config;
pub mod error;
pub mod fallback;
pub mod inspector;
pub mod invidious;
pub mod live_search;
pub mod report;
pub mod resolver;
pub mod util;

/// Checks YouTube channels for live streams through public Invidious instances
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Invidious instance base URL, in order of preference. Repeatable or comma-separated [default: built-in list]
    #[arg(
        short,
        long = "instance",
        env = "INVIDIOUS_INSTANCES",
        value_delimiter = ',',
        global = true
    )]
    instances: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "INVIDIOUS_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    /// How instances are tried when a single answer is enough
    #[arg(long, env = "INVIDIOUS_STRATEGY", value_enum, default_value_t = Strategy::Ordered, global = true)]
    strategy: Strategy,

    /// Channel used when a command is run without one
    #[arg(long, env = "DEFAULT_CHANNEL", default_value = DEFAULT_CHANNEL, global = true)]
    default_channel: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Finds a channel ID from a handle or channel URL
    Resolve {
        /// `@handle`, `handle`, `https://youtube.com/@handle` or a `UC...` channel ID
        input: Option<String>,
    },

    /// Lists a channel's streams on every instance and reports live broadcasts
    Streams {
        /// Channel ID, handle or URL [default: --default-channel]
        channel: Option<String>,

        /// Stop at the first instance that answers instead of querying all of them
        #[arg(long)]
        first: bool,

        /// Also fetch details of the first listed video
        #[arg(long)]
        details: bool,

        /// Save every instance's result as JSON
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_REPORT_PATH)]
        save: Option<PathBuf>,

        /// Videos published this many minutes ago or less count as recent
        #[arg(long, default_value_t = 60)]
        recent_window: u32,
    },

    /// Checks that a channel exists through the channel info endpoint
    Info {
        /// Channel ID, handle or URL [default: --default-channel]
        channel: Option<String>,
    },

    /// Shows whether a single video is live or upcoming
    Video {
        /// Video ID or watch URL
        video: String,
    },

    /// Searches videos that are live right now
    LiveSearch {
        /// Free-text search query
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    run(Args::parse()).await
}

async fn run(args: Args) -> Result<()> {
    let config = ProbeConfig::new(
        &args.instances,
        args.timeout,
        args.strategy,
        args.default_channel,
    )
    .context("Reading instance list")?;
    let client = init_http_client(config.timeout).context("Building HTTP client")?;

    info!(
        "Using {} instances ({:?}, {}s timeout)",
        config.instances.len(),
        config.strategy,
        config.timeout.as_secs()
    );

    match args.command {
        Command::Resolve { input } => {
            let Some(input) = input else {
                print_resolve_usage();
                return Ok(());
            };
            resolve(&client, &config, &input).await;
        }
        Command::Streams {
            channel,
            first,
            details,
            save,
            recent_window,
        } => {
            let input = channel.unwrap_or_else(|| config.default_channel.clone());
            let Some(channel_id) = channel_from_input(&client, &config, &input).await else {
                return Ok(());
            };
            let results = streams(
                &client,
                &config,
                &channel_id,
                first,
                TimeDelta::minutes(i64::from(recent_window)),
            )
            .await;

            if details {
                first_video_details(&client, &results).await;
            }

            if let Some(path) = save {
                TestReport::new(channel_id.as_str(), &results)
                    .save(&path)
                    .await?;
                println!("\nFull results saved to: {}", path.display());
            }
        }
        Command::Info { channel } => {
            let input = channel.unwrap_or_else(|| config.default_channel.clone());
            let Some(channel_id) = channel_from_input(&client, &config, &input).await else {
                return Ok(());
            };
            info_command(&client, &config, &channel_id).await;
        }
        Command::Video { video } => match extract_video_id(&video) {
            Ok(video_id) => match lookup_video(&client, &config, &video_id).await {
                Some((instance, video)) => {
                    println!("Via {instance}");
                    print_video_details(&video);
                }
                None => println!("Could not fetch video {video_id} from any instance"),
            },
            Err(e) => eprintln!("{e}"),
        },
        Command::LiveSearch { query } => {
            match live_search::search_live(&client, &config, &query).await {
                Some((instance, live)) => {
                    println!("{} live videos for \"{query}\" via {instance}", live.len());
                    for (i, video) in live.iter().enumerate() {
                        print_video_line(i + 1, video);
                    }
                }
                None => println!("All instances failed"),
            }
        }
    }

    Ok(())
}

fn print_resolve_usage() {
    let bin = env!("CARGO_PKG_NAME");
    printdoc! {"
        Usage: {bin} resolve <channel_handle_or_url>

        Examples:
          {bin} resolve @JingleBells_Gaming
          {bin} resolve JingleBells_Gaming
          {bin} resolve https://youtube.com/@JingleBells_Gaming
          {bin} resolve UCxxxxxxxxxxxxxxxxxxxxxx
    "};
}

async fn resolve(client: &Client, config: &ProbeConfig, input: &str) {
    match resolver::resolve_channel(client, config, input).await {
        Ok(Some(channel)) => {
            if let Some(name) = &channel.name {
                println!("Channel: {name}");
            }
            if let Some(subscribers) = channel.subscribers {
                println!("Subscribers: {subscribers}");
            }
            println!("Channel ID: {}", channel.id);
            println!("URL: {}", channel.id.channel_url());
            if let Some(instance) = &channel.instance {
                println!("Resolved via {instance}");
            }
        }
        Ok(None) => printdoc! {"
            Could not find channel ID

            Try:
              1. Check the spelling of the channel handle
              2. Provide the channel ID directly (starts with UC)
              3. Use a different Invidious instance (--instance)
        "},
        Err(e) => eprintln!("{e}"),
    }
}

/// Resolves user input into a channel ID, printing why when it cannot
async fn channel_from_input(client: &Client, config: &ProbeConfig, input: &str) -> Option<ChannelId> {
    match resolver::resolve_channel(client, config, input).await {
        Ok(Some(channel)) => Some(channel.id),
        Ok(None) => {
            println!("Could not resolve {input} to a channel ID");
            println!("Try providing the channel ID directly (starts with UC)");
            None
        }
        Err(e) => {
            eprintln!("{e}");
            None
        }
    }
}

async fn streams(
    client: &Client,
    config: &ProbeConfig,
    channel_id: &ChannelId,
    first: bool,
    recent_window: TimeDelta,
) -> Vec<StreamQueryResult> {
    info!("Checking streams of {channel_id}");

    let results = if first {
        inspect_first(client, config, channel_id)
            .await
            .into_iter()
            .collect()
    } else {
        inspect_all(client, config, channel_id).await
    };

    let now = Utc::now();
    for result in &results {
        print_stream_result(result, now, recent_window);
    }

    let successful = results.iter().filter(|r| r.success).count();
    println!("\nSummary: {successful}/{} instances worked", results.len());
    for failed in results.iter().filter(|r| !r.success) {
        println!(
            "  - {}: {}",
            failed.instance,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }

    match best_result(&results) {
        Some(best) => println!(
            "Best instance: {} ({} live streams)",
            best.instance, best.live_count
        ),
        None => println!("No live streams found on any instance"),
    }

    results
}

fn print_stream_result(
    result: &StreamQueryResult,
    now: chrono::DateTime<Utc>,
    recent_window: TimeDelta,
) {
    println!("\n{}", result.instance);
    println!("  URL: {}", result.url);

    if let Some(error) = &result.error {
        println!("  Failed: {error}");
        return;
    }

    println!("  Total videos: {}", result.total_videos);
    println!("  Live streams: {}", result.live_count);
    println!(
        "  Recent (last {} min): {}",
        recent_window.num_minutes(),
        result.recent(now, recent_window).count()
    );

    if result.live_count > 0 {
        for (i, video) in result.live().take(5).enumerate() {
            print_video_line(i + 1, video);
        }
    } else {
        for (i, video) in result.videos.iter().take(3).enumerate() {
            print_video_line(i + 1, video);
        }
    }
}

fn print_video_line(n: usize, video: &VideoSummary) {
    let title = video.title.as_deref().unwrap_or("N/A");
    println!("  {n}. {}", truncate_string(&title, 60));
    println!(
        "     {} | {} views | {}{}",
        video.author.as_deref().unwrap_or("N/A"),
        video.viewers(),
        video.published_text.as_deref().unwrap_or("N/A"),
        if video.is_live() { " | LIVE" } else { "" }
    );
    println!("     {}", video.watch_url());
}

/// Fetches details of the first video listed by the first successful instance
async fn first_video_details(client: &Client, results: &[StreamQueryResult]) {
    let Some((result, video_id)) = results.iter().find_map(|r| {
        let id = r.videos.first()?.video_id.as_deref()?;
        r.success.then_some((r, id))
    }) else {
        warn!("No video to fetch details for");
        return;
    };

    println!("\nDetails of {video_id} via {}", result.instance);
    match get_video(client, &result.instance, video_id).await {
        Ok(video) => print_video_details(&video),
        Err(e) => println!("  Failed to fetch video details: {e}"),
    }
}

fn print_video_details(video: &VideoDetails) {
    let summary = &video.summary;
    println!("  Title: {}", summary.title.as_deref().unwrap_or("N/A"));
    println!("  liveNow: {}", summary.live_now);
    println!("  isUpcoming: {}", summary.is_upcoming);
    println!(
        "  published: {}",
        summary
            .published
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map_or_else(|| "N/A".to_string(), |t| t.to_rfc3339())
    );
    println!(
        "  publishedText: {}",
        summary.published_text.as_deref().unwrap_or("N/A")
    );
    println!("  viewCount: {}", summary.view_count.unwrap_or_default());
    if let Some(genre) = &video.genre {
        println!("  Genre: {genre}");
    }
    if let Some(hls) = &video.hls_url {
        println!("  HLS: {hls}");
    }
}

async fn info_command(client: &Client, config: &ProbeConfig, channel_id: &ChannelId) {
    let Some((instance, info)) = channel_info::lookup_channel(client, config, channel_id).await
    else {
        println!("Channel {channel_id} not found on any instance");
        return;
    };

    println!("Channel found via {instance}");
    println!("  Name: {}", info.author.as_deref().unwrap_or("N/A"));
    println!(
        "  Channel ID: {}",
        info.author_id.as_deref().unwrap_or(channel_id.as_str())
    );
    println!(
        "  Subscribers: {}",
        info.sub_count
            .map_or_else(|| "N/A".to_string(), |s| s.to_string())
    );
    println!(
        "  Description: {}",
        truncate_string(&info.description.as_deref().unwrap_or("N/A"), 100)
    );
    println!("  Latest videos: {}", info.latest_videos.len());
    for (i, video) in info.latest_videos.iter().take(3).enumerate() {
        print_video_line(i + 1, video);
    }
}
