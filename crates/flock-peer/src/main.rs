//! Flock - peer process for direct file distribution

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use flock_core::{chunk, peer_id_from_ip};
use flock_peer::announcer;
use flock_peer::{PeerConfig, TrackerClient, TransferServer, TransferStats};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "flock")]
#[command(about = "Peer-to-peer whole-file distribution", long_about = None)]
struct Cli {
    /// Path to config file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "peer.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Tracker base URL (overrides config)
    #[arg(long)]
    tracker: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve shared files and announce to the tracker if one is configured
    Serve {
        /// Listen address (overrides config)
        #[arg(short, long)]
        listen: Option<String>,

        /// Directory of files to serve (overrides config)
        #[arg(short, long)]
        shared: Option<PathBuf>,

        /// Our IPv4 address, used as the tracker identity
        #[arg(long, default_value = "127.0.0.1")]
        ip: Ipv4Addr,
    },

    /// Fetch a file directly from a peer
    Fetch {
        /// Remote peer address, host:port
        #[arg(required = true)]
        addr: String,

        /// Name of the file to request
        #[arg(required = true)]
        file: String,

        /// Download directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask the tracker which peers hold a file
    Peers {
        /// File name to look up
        #[arg(required = true)]
        file: String,
    },

    /// Split a file into fixed-size parts
    Split {
        /// File to split
        #[arg(required = true)]
        file: PathBuf,

        /// Part size in bytes
        #[arg(short = 's', long, default_value_t = chunk::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Directory the parts are written into
        #[arg(short, long, default_value = "parts")]
        out_dir: PathBuf,
    },

    /// Merge numbered parts back into one file
    Merge {
        /// Output file
        #[arg(required = true)]
        output: PathBuf,

        /// Directory holding the parts
        #[arg(short, long, default_value = "parts")]
        parts_dir: PathBuf,

        /// Number of parts to merge, in order
        #[arg(short, long, required = true)]
        total: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut config = if cli.config.exists() {
        PeerConfig::load(&cli.config)
            .with_context(|| format!("failed to load config from {}", cli.config.display()))?
    } else {
        PeerConfig::default()
    };
    if let Some(tracker) = cli.tracker {
        config.tracker_url = Some(tracker);
    }

    match cli.command {
        Commands::Serve { listen, shared, ip } => {
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            if let Some(shared) = shared {
                config.shared_dir = shared;
            }
            serve(config, ip).await
        }

        Commands::Fetch { addr, file, output } => {
            let io_timeout = config.io_timeout();
            let download_dir = output.unwrap_or(config.download_dir);
            let stats = TransferStats::new();
            let path =
                flock_peer::client::fetch(&addr, &file, &download_dir, &stats, io_timeout).await?;
            println!("Received {} ({} bytes)", path.display(), stats.downloaded());
            Ok(())
        }

        Commands::Peers { file } => {
            let tracker_url = config
                .tracker_url
                .ok_or_else(|| anyhow!("no tracker configured; pass --tracker or set tracker_url"))?;
            let client = TrackerClient::new(tracker_url);
            let peers = client.get_peers(&file).await?;

            println!("{} peer(s) serving '{}':", peers.len(), file);
            for peer in peers {
                println!(
                    "  ip {}  up {:.1} B/s  down {:.1} B/s  uploaded {} B",
                    peer.ip, peer.uploading_rate, peer.downloading_rate, peer.uploaded_bytes
                );
            }
            Ok(())
        }

        Commands::Split {
            file,
            chunk_size,
            out_dir,
        } => {
            let parts = chunk::split_file(&file, chunk_size, &out_dir)?;
            println!("Split {} into {} part(s) under {}", file.display(), parts, out_dir.display());
            Ok(())
        }

        Commands::Merge {
            output,
            parts_dir,
            total,
        } => {
            chunk::merge_chunks(&output, &parts_dir, total)?;
            println!("Merged {} part(s) into {}", total, output.display());
            Ok(())
        }
    }
}

async fn serve(config: PeerConfig, ip: Ipv4Addr) -> Result<()> {
    std::fs::create_dir_all(&config.shared_dir)?;
    let stats = Arc::new(TransferStats::new());

    let server = TransferServer::bind(
        &config.listen_addr,
        config.shared_dir.clone(),
        stats.clone(),
        config.io_timeout(),
    )
    .await?;

    let announce_handle = config.tracker_url.as_ref().map(|url| {
        announcer::spawn(
            TrackerClient::new(url.clone()),
            peer_id_from_ip(ip),
            config.shared_dir.clone(),
            stats.clone(),
            config.announce_interval(),
        )
    });
    if announce_handle.is_none() {
        tracing::info!("No tracker configured; serving without announcing");
    }

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    if let Some(handle) = announce_handle {
        handle.abort();
    }
    Ok(())
}
