//! Performance benchmarks for the hot paths of the state server

use server::commands::apply_move;
use server::map::parse_map;
use server::session::SessionManager;
use server::state::StateServer;
use shared::{read_frame, write_frame, GameState, Grid, MoveCommand, Response};
use std::sync::Arc;
use std::time::Instant;

/// 80x25 open room with a wall border
fn large_grid() -> Grid {
    let width = 80;
    let height = 25;
    let mut rows = Vec::with_capacity(height);
    for y in 0..height {
        let row: String = (0..width)
            .map(|x| {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    '▤'
                } else {
                    ' '
                }
            })
            .collect();
        rows.push(row);
    }
    parse_map(&rows.join("\n"))
}

fn populated_state(players: usize) -> GameState {
    let mut state = GameState::new(large_grid());
    let mut sessions = SessionManager::new();
    for _ in 0..players {
        sessions.register_player(&mut state).unwrap();
    }
    state
}

/// Benchmarks move validation and application
#[test]
fn benchmark_apply_move() {
    let mut state = populated_state(50);
    let iterations = 100_000u64;
    let keys = ['d', 'd', 'a', 'a'];

    let start = Instant::now();

    for sequence in 1..=iterations {
        let command = MoveCommand {
            player_id: 1,
            key: keys[(sequence % 4) as usize],
            sequence,
        };
        let _ = apply_move(&mut state, &command);
    }

    let duration = start.elapsed();
    println!(
        "Apply move: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert_eq!(state.player(1).unwrap().last_applied_sequence, iterations);
    // Occupancy checks scan every player; 100k moves among 50 players stay well under a second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks parsing a full-size map
#[test]
fn benchmark_map_parsing() {
    let text = vec!["▤♣  ▤".repeat(16); 25].join("\n");
    let iterations = 1_000;

    let start = Instant::now();

    for _ in 0..iterations {
        let grid = parse_map(&text);
        assert_eq!(grid.height(), 25);
    }

    let duration = start.elapsed();
    println!(
        "Map parsing: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 1000);
}

/// Benchmarks snapshot copies, taken on every client poll
#[tokio::test]
async fn benchmark_snapshot() {
    let server = StateServer::new(large_grid());
    for _ in 0..50 {
        server.register_player().await.unwrap();
    }

    let iterations = 1_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let snapshot = server.snapshot(None).await;
        assert_eq!(snapshot.player_count(), 50);
    }

    let duration = start.elapsed();
    println!(
        "Snapshot: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
}

/// Benchmarks the framed encoding of a full snapshot response
#[tokio::test]
async fn benchmark_snapshot_framing() {
    let response = Response::GameState(populated_state(50));
    let iterations = 500;

    let start = Instant::now();

    for _ in 0..iterations {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, &response).await.unwrap();
        let decoded: Option<Response> = read_frame(&mut buffer.as_slice()).await.unwrap();
        assert!(decoded.is_some());
    }

    let duration = start.elapsed();
    println!(
        "Snapshot framing: {} round trips in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 3000);
}

/// Throughput of moves from many concurrent tasks through the state lock
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn benchmark_concurrent_moves() {
    let server = Arc::new(StateServer::new(large_grid()));
    let mut ids = Vec::new();
    for _ in 0..8 {
        ids.push(server.register_player().await.unwrap().player_id);
    }

    let moves_per_player = 2_000u64;
    let start = Instant::now();

    let handles: Vec<_> = ids
        .iter()
        .map(|&player_id| {
            let server = Arc::clone(&server);
            tokio::spawn(async move {
                for sequence in 1..=moves_per_player {
                    let key = if sequence % 2 == 0 { 's' } else { 'w' };
                    server
                        .move_player(MoveCommand {
                            player_id,
                            key,
                            sequence,
                        })
                        .await;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let duration = start.elapsed();
    let total = moves_per_player * ids.len() as u64;
    println!(
        "Concurrent moves: {} moves in {:?} ({:.0} moves/sec)",
        total,
        duration,
        total as f64 / duration.as_secs_f64()
    );

    let state = server.snapshot(None).await;
    for id in ids {
        assert_eq!(state.player(id).unwrap().last_applied_sequence, moves_per_player);
    }
    assert!(duration.as_millis() < 3000);
}
