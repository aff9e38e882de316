//! Server network layer: TCP accept loop, per-connection request handling
//! and the idle-player checker.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::state::StateServer;
use log::{debug, error, info, warn};
use shared::{read_frame, write_frame, Request, Response};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Accepts client connections and serves requests against a shared
/// [`StateServer`]
pub struct Server {
    listener: TcpListener,
    state: Arc<StateServer>,
    player_timeout: Option<Duration>,
}

impl Server {
    pub async fn bind(config: &ServerConfig, state: Arc<StateServer>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.address).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            state,
            player_timeout: config.player_timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Spawns task that periodically evicts players who stopped talking to us
    fn spawn_timeout_checker(&self, timeout: Duration) {
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let evicted = state.evict_idle(timeout).await;
                if !evicted.is_empty() {
                    info!("Evicted idle players {:?}", evicted);
                }
            }
        });
    }

    /// Accept loop. Each connection gets its own task, so requests from
    /// different clients run in parallel and meet only at the state lock.
    pub async fn run(self) {
        if let Some(timeout) = self.player_timeout {
            info!("Evicting players idle for more than {:?}", timeout);
            self.spawn_timeout_checker(timeout);
        }

        info!("Server started successfully");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, state).await {
                            warn!("Connection from {} closed with error: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}

/// Serves one client connection until it closes. Requests on a connection are
/// answered in the order they arrive.
async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    state: Arc<StateServer>,
) -> Result<(), ServerError> {
    stream.set_nodelay(true)?;
    debug!("Client connected from {}", addr);

    while let Some(request) = read_frame::<_, Request>(&mut stream).await? {
        let response = dispatch(&state, request).await;
        write_frame(&mut stream, &response).await?;
    }

    debug!("Client at {} disconnected", addr);
    Ok(())
}

/// Runs one request against the state. Only registration can produce an
/// error response; move rejections are acknowledged like successful moves.
pub async fn dispatch(state: &StateServer, request: Request) -> Response {
    match request {
        Request::RegisterPlayer => match state.register_player().await {
            Ok(registration) => Response::Registered {
                player_id: registration.player_id,
                state: registration.state,
            },
            Err(e) => {
                warn!("Registration refused: {}", e);
                Response::Error {
                    reason: e.to_string(),
                }
            }
        },
        Request::GetGameState { player_id } => Response::GameState(state.snapshot(player_id).await),
        Request::MovePlayer(command) => {
            state.move_player(command).await;
            Response::MoveAck
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::parse_map;
    use shared::{Grid, MoveCommand, SPAWN_X, SPAWN_Y};
    use tokio::io::AsyncWriteExt;

    fn open_grid() -> Grid {
        let row = " ".repeat(16);
        parse_map(&vec![row; 16].join("\n"))
    }

    async fn start(grid: Grid) -> SocketAddr {
        let config = ServerConfig {
            address: "127.0.0.1:0".to_string(),
            ..ServerConfig::default()
        };
        let server = Server::bind(&config, Arc::new(StateServer::new(grid)))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        addr
    }

    async fn call(stream: &mut TcpStream, request: &Request) -> Response {
        write_frame(stream, request).await.unwrap();
        read_frame(stream).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_register() {
        let state = StateServer::new(open_grid());
        match dispatch(&state, Request::RegisterPlayer).await {
            Response::Registered { player_id, state } => {
                assert_eq!(player_id, 1);
                assert_eq!(state.player(1).unwrap().position(), (SPAWN_X, SPAWN_Y));
            }
            other => panic!("Unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_register_without_map() {
        let state = StateServer::new(Grid::default());
        match dispatch(&state, Request::RegisterPlayer).await {
            Response::Error { reason } => assert!(reason.contains("not initialized")),
            other => panic!("Unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_move_always_acks() {
        let state = StateServer::new(open_grid());
        let command = MoveCommand {
            player_id: 77,
            key: 'w',
            sequence: 1,
        };
        assert_eq!(dispatch(&state, Request::MovePlayer(command)).await, Response::MoveAck);
    }

    #[tokio::test]
    async fn test_request_cycle_over_tcp() {
        let addr = start(open_grid()).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let player_id = match call(&mut stream, &Request::RegisterPlayer).await {
            Response::Registered { player_id, .. } => player_id,
            other => panic!("Unexpected response: {:?}", other),
        };

        let command = MoveCommand {
            player_id,
            key: 's',
            sequence: 1,
        };
        assert_eq!(call(&mut stream, &Request::MovePlayer(command)).await, Response::MoveAck);

        match call(&mut stream, &Request::GetGameState { player_id: Some(player_id) }).await {
            Response::GameState(state) => {
                assert_eq!(
                    state.player(player_id).unwrap().position(),
                    (SPAWN_X, SPAWN_Y + 1)
                );
            }
            other => panic!("Unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_frame_closes_only_that_connection() {
        let addr = start(open_grid()).await;

        let mut bad = TcpStream::connect(addr).await.unwrap();
        bad.write_u32(3).await.unwrap();
        bad.write_all(&[0xff, 0xff, 0xff]).await.unwrap();
        let reply: std::io::Result<Option<Response>> = read_frame(&mut bad).await;
        assert!(matches!(reply, Ok(None) | Err(_)));

        let mut good = TcpStream::connect(addr).await.unwrap();
        assert!(matches!(
            call(&mut good, &Request::RegisterPlayer).await,
            Response::Registered { .. }
        ));
    }
}
