//! Map file loading.
//!
//! A map is plain text with one row per line. Each character is looked up in
//! a fixed symbol table; characters the table does not know become empty
//! floor.

use crate::error::MapLoadError;
use log::info;
use shared::{Cell, Grid};
use std::path::Path;

pub const WALL_SYMBOL: char = '▤';
pub const VEGETATION_SYMBOL: char = '♣';

/// Maps a map-file character to the cell it represents.
pub fn cell_for_symbol(symbol: char) -> Cell {
    match symbol {
        WALL_SYMBOL => Cell {
            symbol,
            passable: false,
            color_fg: 8,
            color_bg: 0,
        },
        VEGETATION_SYMBOL => Cell {
            symbol,
            passable: true,
            color_fg: 2,
            color_bg: 0,
        },
        _ => Cell::empty(),
    }
}

pub fn parse_map(text: &str) -> Grid {
    let rows = text
        .lines()
        .map(|line| line.chars().map(cell_for_symbol).collect())
        .collect();
    Grid::new(rows)
}

pub fn load_map(path: impl AsRef<Path>) -> Result<Grid, MapLoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| MapLoadError {
        path: path.to_path_buf(),
        source,
    })?;

    // Invalid UTF-8 decodes to U+FFFD, which the symbol table treats as floor
    let grid = parse_map(&String::from_utf8_lossy(&bytes));
    info!(
        "Loaded map {} ({} rows)",
        path.display(),
        grid.height()
    );
    Ok(grid)
}
