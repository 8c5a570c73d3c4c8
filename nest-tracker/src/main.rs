use anyhow::Context;
use clap::{Parser, Subcommand};
use nest_tracker::browser::{ItemDetails, LOAD_FAILED_STATUS};
use nest_tracker::replay::{parse_script, run_script, RecordingSink, SharedDialog};
use nest_tracker::{
    ApiConfig, ApiSubmitter, BrowseRequest, ItemBrowser, ItemFilter, ItemId, ItemObservation, NameTable,
    NestApiClient, NestTracker,
};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nest-tracker", about = "Browse and feed the global nest tracker")]
struct Cli {
    /// Service base URL (overrides NEST_TRACKER_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// JSON file mapping item ids to names
    #[arg(long, global = true)]
    names: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List one page of tracked items
    List {
        #[arg(long, default_value = "All")]
        filter: ItemFilter,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        /// Show details for the item at this position on the page
        #[arg(long)]
        select: Option<usize>,
    },
    /// Look up a single item id
    Lookup { item_id: String },
    /// Sample items nobody has reported on yet
    Random {
        #[arg(long)]
        count: Option<u32>,
    },
    /// Submit one observation directly
    Submit {
        item_id: ItemId,
        #[arg(long, action = clap::ArgAction::Set)]
        transformed: bool,
    },
    /// Run the outcome tracker over a recorded session script
    Replay {
        script: PathBuf,
        /// Print observations instead of submitting them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = ApiConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }

    let names = match &cli.names {
        Some(path) => NameTable::load(path).with_context(|| format!("loading names from {}", path.display()))?,
        None => NameTable::new(),
    };

    let client = Arc::new(NestApiClient::new(config.clone()).context("building HTTP client")?);
    info!("Using nest tracker service at {}", client.base_url());

    match cli.command {
        Command::List { filter, page, size, select } => {
            let mut browser = ItemBrowser::new(size.unwrap_or(config.page_size));
            browser.change_filter(filter);
            let request = browser.go_to_page(page);
            browse(&client, &mut browser, request, &names).await?;
            if select.is_some() {
                browser.select(select);
            }
            print_view(&browser);
        }
        Command::Lookup { item_id } => {
            let mut browser = ItemBrowser::new(config.page_size);
            if let Some(request) = browser.search(&item_id) {
                browse(&client, &mut browser, request, &names).await?;
                browser.select(Some(0));
            }
            print_view(&browser);
        }
        Command::Random { count } => {
            let mut browser = ItemBrowser::new(count.unwrap_or(config.page_size));
            let request = browser.random_unknown();
            browse(&client, &mut browser, request, &names).await?;
            print_view(&browser);
        }
        Command::Submit { item_id, transformed } => {
            let observation = ItemObservation::new(item_id, transformed);
            client.submit(&observation).await?;
            println!("Submitted item {} transformed={}", item_id, transformed);
        }
        Command::Replay { script, dry_run } => {
            let text = std::fs::read_to_string(&script).with_context(|| format!("reading {}", script.display()))?;
            let steps = parse_script(&text)?;

            let submitter = ApiSubmitter::current(client.clone());
            let sink = if dry_run {
                RecordingSink::new()
            } else {
                RecordingSink::forwarding_to(Rc::new(submitter.clone()))
            };

            let dialog = SharedDialog::new();
            let mut tracker = NestTracker::new(Box::new(dialog.clone()), Box::new(sink.clone()));
            let report = run_script(&steps, &dialog, &mut tracker);
            submitter.flush().await;

            info!("Replayed {} steps over {} ticks", report.steps, report.ticks);
            for observation in sink.observations() {
                println!("item {} transformed={}", observation.item_id, observation.transformed);
            }
            println!(
                "final state: awaiting_retrieval={} last_placed_item_id={:?}",
                report.final_state.awaiting_retrieval, report.final_state.last_placed_item_id
            );
        }
    }

    Ok(())
}

async fn browse(
    client: &NestApiClient,
    browser: &mut ItemBrowser,
    request: BrowseRequest,
    names: &NameTable,
) -> anyhow::Result<()> {
    match client.load(&request).await {
        Ok(page) => {
            browser.apply_page(page, names);
            Ok(())
        }
        Err(e) => {
            error!("Failed to load {:?}: {}", request, e);
            browser.set_error(LOAD_FAILED_STATUS);
            println!("{}", browser.status());
            Err(e.into())
        }
    }
}

fn print_view(browser: &ItemBrowser) {
    println!("{}", browser.status());
    for record in browser.items() {
        let details = ItemDetails::from_record(record);
        println!("  [{}] {:>6}  {}", details.badge.symbol, details.item_id, details.name);
    }
    if !browser.pagination_label().is_empty() {
        println!("{}", browser.pagination_label());
    }
    println!();
    println!("{}", browser.details_text());
}
