use clap::Parser;
use log::{error, info};
use server::config::ServerConfig;
use server::map::load_map;
use server::network::Server;
use server::state::StateServer;
use shared::{DEFAULT_HOST, DEFAULT_PORT};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Map file, one row of symbols per line
    #[arg(short, long, default_value = server::config::DEFAULT_MAP_PATH)]
    map: PathBuf,

    /// Remove players that send nothing for this many seconds (disabled if unset)
    #[arg(short = 't', long)]
    player_timeout: Option<u64>,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            address: format!("{}:{}", self.host, self.port),
            map_path: self.map,
            player_timeout: self.player_timeout.map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = Args::parse().into_config();

    // Without a map there is nothing to serve
    let grid = match load_map(&config.map_path) {
        Ok(grid) => grid,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let state = Arc::new(StateServer::new(grid));
    let server = Server::bind(&config, state).await?;

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
