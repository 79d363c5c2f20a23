use anyhow::Context;
use clap::Parser;
use folio_cache::{CacheConfig, CacheInvalidator};
use folio_core::{Error, Result};
use folio_hashnode::{format_date, format_read_time, HashnodeClient, HttpTransport};
use folio_web::state::{DEFAULT_SITE_URL, DEFAULT_USERNAME};
use folio_web::{AppState, WebConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use url::Url;

mod duration;
mod logging;
mod refresh;

use duration::HumanDuration;
use refresh::Refresher;

#[derive(Parser, Debug)]
#[command(author, version, about = "Serves the portfolio's Hashnode articles through a read-through cache", long_about = None)]
pub struct Cli {
    /// Hashnode GraphQL endpoint
    #[arg(long, env = "HASHNODE_API_URL", default_value = folio_hashnode::DEFAULT_API_URL)]
    hashnode_url: String,
    /// Hashnode username whose articles are mirrored by default
    #[arg(long, env = "HASHNODE_USERNAME", default_value = DEFAULT_USERNAME)]
    username: String,
    /// Redis connection URL. The in-memory cache is used when absent or unreachable.
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,
    /// Upstream request timeout (e.g. 10s)
    #[arg(long, default_value = "10s")]
    request_timeout: HumanDuration,
    /// Timeout for each Redis operation
    #[arg(long, default_value = "2s")]
    cache_timeout: HumanDuration,
    /// How long fetched articles and series stay cached
    #[arg(long, default_value = "1h")]
    cache_ttl: HumanDuration,
    #[arg(long, env = "FOLIO_LOG", default_value = "info")]
    log_level: tracing::Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        #[arg(long, env = "FOLIO_LISTEN", default_value = "127.0.0.1:3000")]
        listen: SocketAddr,
        /// Shared secret the revalidation webhook must present
        #[arg(long, env = "REVALIDATION_SECRET")]
        revalidation_secret: Option<String>,
        #[arg(long, env = "SITE_URL", default_value = DEFAULT_SITE_URL)]
        site_url: String,
        /// Periodically drop and re-warm the default user's cache (e.g. 1h, 30m, 1h15m30s)
        #[arg(long)]
        refresh_interval: Option<HumanDuration>,
    },
    /// Fetch one page of articles and print it
    Fetch {
        #[arg(long)]
        username: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 9)]
        page_size: u32,
        /// Also list the user's series
        #[arg(long)]
        series: bool,
        /// Print the raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Drop everything cached for a user
    Clear {
        username: Option<String>,
    },
    /// Print the sitemap
    Sitemap {
        #[arg(long, env = "SITE_URL", default_value = DEFAULT_SITE_URL)]
        site_url: String,
    },
}

fn validate_url(kind: &str, value: &str) -> Result<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| Error::Config(format!("Invalid {} {}: {}", kind, value, e)))
}

async fn build_client(cli: &Cli) -> Result<Arc<HashnodeClient>> {
    let cache = folio_cache::create_cache(&CacheConfig {
        redis_url: cli.redis_url.clone(),
        op_timeout: cli.cache_timeout.0,
    })
    .await;
    info!("💾 Cache ready (using {})", cache.name());

    let transport = HttpTransport::new(&cli.hashnode_url, cli.request_timeout.0)?;
    info!("🔌 Hashnode endpoint: {}", transport.endpoint());

    let client = HashnodeClient::new(Arc::new(transport), cache).with_ttl(cli.cache_ttl.0);
    Ok(Arc::new(client))
}

async fn serve(
    cli: &Cli,
    listen: SocketAddr,
    revalidation_secret: Option<String>,
    site_url: String,
    refresh_interval: Option<HumanDuration>,
) -> Result<()> {
    validate_url("site URL", &site_url)?;
    let client = build_client(cli).await?;

    if revalidation_secret.is_none() {
        info!("⚠️ No revalidation secret configured, the webhook will reject every request");
    }

    if let Some(interval) = refresh_interval {
        let refresher = Refresher::new(client.clone(), cli.username.clone());
        tokio::spawn(refresher.run(interval.0));
    }

    let config = WebConfig {
        default_username: cli.username.clone(),
        revalidation_secret,
        revalidate_interval: cli.cache_ttl.0,
        site_url,
    };
    let app = folio_web::create_app(AppState::new(client, config)).await;

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("🌐 Listening on http://{}", listen);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn fetch(cli: &Cli, username: &str, page: u32, page_size: u32, series: bool, json: bool) -> Result<()> {
    let client = build_client(cli).await?;
    let articles = client.fetch_articles(username, page, page_size).await;
    let series_list = if series {
        client.fetch_series(username).await
    } else {
        Vec::new()
    };

    if json {
        let output = serde_json::json!({ "articles": articles, "series": series_list });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Found {} articles (page {}, {} total)",
        articles.articles.len(),
        page,
        articles.total_count
    );
    for article in &articles.articles {
        let read_time = article
            .read_time_in_minutes
            .map(|m| format!(" · {}", format_read_time(m)))
            .unwrap_or_default();
        println!("📰 {} - {}{}", article.title, format_date(&article.published_at), read_time);
        println!("   {}", article.url);
    }
    for entry in &series_list {
        println!("📚 {} ({} posts)", entry.name, entry.total_posts);
    }
    if articles.has_next_page {
        println!("More articles on page {}", page + 1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level);
    validate_url("Hashnode endpoint", &cli.hashnode_url)?;

    match &cli.command {
        Commands::Serve { listen, revalidation_secret, site_url, refresh_interval } => {
            serve(&cli, *listen, revalidation_secret.clone(), site_url.clone(), *refresh_interval)
                .await
                .with_context(|| format!("server on {} stopped", listen))
        }
        Commands::Fetch { username, page, page_size, series, json } => {
            let username = username.clone().unwrap_or_else(|| cli.username.clone());
            fetch(&cli, &username, *page, *page_size, *series, *json)
                .await
                .with_context(|| format!("failed to fetch articles for {}", username))
        }
        Commands::Clear { username } => {
            let username = username.clone().unwrap_or_else(|| cli.username.clone());
            let client = build_client(&cli).await.context("failed to build the Hashnode client")?;
            CacheInvalidator::new(client.cache().clone()).clear_for(&username).await;
            println!("Cleared cached content for {}", username);
            Ok(())
        }
        Commands::Sitemap { site_url } => {
            validate_url("site URL", site_url)?;
            print!("{}", folio_web::sitemap::render(site_url, chrono::Utc::now()));
            Ok(())
        }
    }
}
