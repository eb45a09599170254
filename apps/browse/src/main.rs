use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    CollectionState, DetailState, HttpListingService, ItemDetailController,
    PaginatedCollectionController, RemoteListingService,
};
use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, transport_config};

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides the configured listing API base URL.
    #[arg(long)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scroll through the listing until `pages` pages are loaded.
    List {
        #[arg(long, default_value_t = 2)]
        pages: u32,
        /// How many times to refresh after a failed load.
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    Show {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(base_url) = cli.base_url {
        settings.api_base_url = base_url;
    }
    let transport = transport_config(&settings)?;
    info!(base_url = %transport.base_url, "browse: using listing service");
    let service: Arc<dyn RemoteListingService> =
        Arc::new(HttpListingService::new(transport).context("failed to build http client")?);

    match cli.command {
        Command::List { pages, retries } => run_list(service, pages, retries).await,
        Command::Add { title, description } => run_add(service, title, description).await,
        Command::Show { id } => run_show(service, &id).await,
    }
}

async fn run_list(service: Arc<dyn RemoteListingService>, pages: u32, mut retries: u32) -> Result<()> {
    let controller = PaginatedCollectionController::new(service);
    let mut updates = controller.updates();

    while let Some(state) = updates.next().await {
        println!("{}", render::status_line(&state));
        match &state {
            CollectionState::Loading => {}
            CollectionState::Error { .. } if retries > 0 => {
                retries -= 1;
                controller.refresh();
            }
            CollectionState::Error { .. } => break,
            CollectionState::Success(loaded) if loaded.is_fetching_more => {}
            CollectionState::Success(loaded) => {
                let loaded_pages = loaded.next_page_number.saturating_sub(1);
                if !loaded.has_more_pages || loaded_pages >= pages {
                    print!("{}", render::item_list(&loaded.items));
                    break;
                }
                controller.request_page_advance(loaded.items.len().saturating_sub(1));
            }
        }
    }
    Ok(())
}

async fn run_add(service: Arc<dyn RemoteListingService>, title: String, description: String) -> Result<()> {
    let controller = PaginatedCollectionController::new(service);
    let mut rx = controller.observe();
    let initial = rx
        .wait_for(|state| !matches!(state, CollectionState::Loading))
        .await
        .context("collection controller closed")?
        .clone();
    println!("{}", render::status_line(&initial));
    if !matches!(initial, CollectionState::Success(_)) {
        return Ok(());
    }

    let mut transitions = controller.subscribe_transitions();
    controller.add_item(title, description);

    let mut resyncing = false;
    loop {
        let state = match transitions.recv().await {
            Ok(state) => state,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };
        println!("{}", render::status_line(&state));
        match state {
            CollectionState::Success(loaded) if !loaded.is_fetching_more => {
                print!("{}", render::item_list(&loaded.items));
                break;
            }
            CollectionState::Success(_) => {}
            CollectionState::Loading => resyncing = true,
            CollectionState::Error { .. } if resyncing => break,
            CollectionState::Error { .. } => {}
        }
    }
    Ok(())
}

async fn run_show(service: Arc<dyn RemoteListingService>, id: &str) -> Result<()> {
    let controller = ItemDetailController::new(service);
    let mut rx = controller.observe();
    controller.load(id);
    let state = rx
        .wait_for(|state| !matches!(state, DetailState::Loading))
        .await
        .context("detail controller closed")?
        .clone();
    println!("{}", render::detail(&state));
    Ok(())
}
