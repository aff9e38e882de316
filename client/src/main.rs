use clap::Parser;
use client::game::ClientView;
use client::input::{InputEvent, InputManager};
use client::network::GameClient;
use client::rendering::Renderer;
use log::{error, info};
use macroquad::prelude::*;
use shared::{DEFAULT_HOST, DEFAULT_PORT};
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT))]
    server: String,

    /// Window width
    #[arg(short = 'w', long, default_value = "860")]
    width: usize,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "380")]
    height: usize,
}

fn window_conf() -> Conf {
    // Window size is only known after parsing, so parse here as well
    let args = Args::parse();
    Conf {
        window_title: "Tile Arena".to_owned(),
        window_width: args.width as i32,
        window_height: args.height as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    // macroquad owns the main thread; network work runs on a separate runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };
    let _enter = runtime.enter();

    info!("Connecting to: {}", args.server);
    let (game, initial) = match runtime.block_on(GameClient::register(&args.server)) {
        Ok(registered) => registered,
        Err(e) => {
            error!("Could not join the game at {}: {}", args.server, e);
            std::process::exit(1);
        }
    };
    info!("Controls: WASD or arrow keys to move, Q or Escape to quit");

    let view = Arc::new(Mutex::new(ClientView::new(game.player_id(), initial)));

    let poller = game.clone();
    let poller_view = Arc::clone(&view);
    runtime.spawn(async move {
        poller.run_poller(poller_view).await;
    });

    let mut input_manager = InputManager::new();
    let mut renderer = Renderer::new(args.width, args.height);

    loop {
        let snapshot = view
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        if let Some(reason) = &snapshot.connection_lost {
            error!("Exiting: {}", reason);
            renderer.render(&snapshot);
            renderer.render_notice(&format!("Connection lost: {}", reason));
            next_frame().await;
            std::process::exit(1);
        }

        let mut quit = false;
        for event in input_manager.update() {
            match event {
                InputEvent::Move(key) => game.dispatch_move(key),
                InputEvent::Quit => quit = true,
            }
        }
        if quit {
            info!("Quitting");
            break;
        }

        renderer.render(&snapshot);
        next_frame().await;
    }
}
