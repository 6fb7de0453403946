use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use engine::{
    config_path_from_env, load_or_create_config, start_engine, EngineEvent, EngineOptions,
    ScanRequest,
};
use library::Grouping;
use metadata::FileTags;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = config_path_from_env();
    let (config, created) = load_or_create_config(&config_path)?;
    if created {
        info!("Created default config at {:?}", config_path);
    } else {
        info!("Loaded config from {:?}", config_path);
    }

    let mut args = env::args().skip(1);
    let root = args.next().map(PathBuf::from);
    let mut options = EngineOptions::from_config(&config_path, &config);
    // this tool requests its own scan below
    options.scan_on_start = false;
    if let Some(value) = args.next() {
        options.grouping = Grouping::parse(&value)
            .ok_or_else(|| format!("unknown grouping {:?} (artists, albums, all)", value))?;
    }

    let tags = Arc::new(FileTags);
    let (handle, mut events) = start_engine(options, tags.clone(), tags);
    let request = match root {
        Some(root) => handle.scan(root).await?,
        None => handle.scan_default().await?,
    };
    if request == ScanRequest::Busy {
        return Err("engine is already scanning".into());
    }

    let mut sidebar = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            EngineEvent::SidebarItemsChanged(items) => sidebar = items,
            EngineEvent::LoadingError(message) => warn!("Scan error: {}", message),
            EngineEvent::ScanStateChanged(false) => break,
            _ => {}
        }
    }

    for item in &sidebar {
        println!("{:<14} {:>6}  {}", item.kind.as_str(), item.count, item.name);
    }
    let stats = handle.stats().await?;
    println!(
        "Indexed: {} artists, {} albums, {} tracks",
        stats.artists, stats.albums, stats.tracks
    );

    handle.shutdown();
    Ok(())
}
