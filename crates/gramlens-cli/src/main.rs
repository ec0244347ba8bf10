use anyhow::Context;
use clap::{Parser, Subcommand};

use gramlens_graph::{build_dashboard, GraphClient};
use gramlens_metrics::{filter::sort_by_metric, MediaItem, SortKey};

#[derive(Debug, Parser)]
#[command(name = "gramlens-cli")]
#[command(about = "Instagram analytics dashboard command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the full dashboard payload and print it as JSON.
    Dashboard,
    /// Print the top media ranked by a derived metric.
    Media {
        /// Metric to rank by (likes, comments, engagement, score, er, ...).
        #[arg(long, default_value = "score")]
        sort: String,
        /// How many items to show.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Print the story rollup.
    Stories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = gramlens_core::load_app_config_from_env()
        .context("failed to load configuration from environment")?;
    let client = GraphClient::new(&config).context("failed to build Graph API client")?;

    match cli.command {
        Commands::Dashboard => {
            let payload = build_dashboard(&client, &config).await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Media { sort, top } => {
            let key: SortKey = sort
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("unrecognized --sort value")?;
            let payload = build_dashboard(&client, &config).await?;

            let mut refs: Vec<&MediaItem> = payload.media.iter().collect();
            sort_by_metric(&mut refs, key);

            println!("{:<20} {:<9} {:>7} {:>9} {:>7} {:>8}", "id", "kind", "likes", "engage", "score", "er%");
            for item in refs.iter().take(top) {
                println!("{}", media_row(item));
            }
            for message in &payload.messages {
                eprintln!("note: {message}");
            }
        }
        Commands::Stories => {
            let payload = build_dashboard(&client, &config).await?;
            let agg = &payload.stories_aggregate;
            println!("stories:         {}", agg.total_stories);
            println!("views:           {}", agg.total_views);
            println!("reach:           {}", agg.total_reach);
            println!("replies:         {}", agg.total_replies);
            println!("exits:           {}", agg.total_exits);
            println!("completion rate: {}%", agg.avg_completion_rate);
        }
    }

    Ok(())
}

fn media_row(item: &MediaItem) -> String {
    let (engagement, score, er) = item.computed.as_ref().map_or((0, 0, None), |m| {
        (m.engagement, m.score, m.er)
    });
    let er = er.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
    format!(
        "{:<20} {:<9} {:>7} {:>9} {:>7} {:>8}",
        item.id,
        item.kind(),
        item.like_count,
        engagement,
        score,
        er
    )
}
