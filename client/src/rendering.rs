use crate::game::{ClientView, WAITING_MESSAGE};
use macroquad::prelude::*;
use shared::{Cell, PLAYER_SYMBOL};

const TILE_SIZE: f32 = 20.0;
const MARGIN: f32 = 16.0;
const FONT_SIZE: f32 = 20.0;

/// Terminal-style palette indices used by map cells and player markers.
pub fn palette_color(code: i32) -> Color {
    match code {
        0 => Color::from_rgba(0, 0, 0, 255),
        1 => Color::from_rgba(205, 49, 49, 255),
        2 => Color::from_rgba(13, 188, 121, 255),
        3 => Color::from_rgba(229, 229, 16, 255),
        4 => Color::from_rgba(36, 114, 200, 255),
        5 => Color::from_rgba(188, 63, 188, 255),
        6 => Color::from_rgba(17, 168, 205, 255),
        7 => Color::from_rgba(229, 229, 229, 255),
        8 => Color::from_rgba(102, 102, 102, 255),
        _ => Color::from_rgba(255, 255, 255, 255),
    }
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Renderer {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn render(&mut self, view: &ClientView) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        if view.state.grid.is_empty() {
            draw_text(WAITING_MESSAGE, MARGIN, MARGIN + FONT_SIZE, FONT_SIZE, WHITE);
            return;
        }

        for (y, row) in view.compose_frame().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                self.draw_cell(x as f32, y as f32, cell);
            }
        }

        if let Some((x, y)) = view.own_position() {
            let (px, py) = Self::tile_origin(x as f32, y as f32);
            draw_rectangle_lines(px, py, TILE_SIZE, TILE_SIZE, 2.0, YELLOW);
        }

        draw_text(
            &view.status_line(),
            MARGIN,
            self.height - MARGIN,
            FONT_SIZE,
            WHITE,
        );
    }

    /// Draws a message over the last frame, used when the client is shutting down.
    pub fn render_notice(&mut self, message: &str) {
        let y = self.height / 2.0;
        draw_rectangle(0.0, y - FONT_SIZE * 1.5, self.width, FONT_SIZE * 2.5, BLACK);
        draw_text(message, MARGIN, y, FONT_SIZE, RED);
    }

    fn tile_origin(x: f32, y: f32) -> (f32, f32) {
        (MARGIN + x * TILE_SIZE, MARGIN + y * TILE_SIZE)
    }

    fn draw_cell(&mut self, x: f32, y: f32, cell: &Cell) {
        let (px, py) = Self::tile_origin(x, y);

        if cell.color_bg != 0 {
            draw_rectangle(px, py, TILE_SIZE, TILE_SIZE, palette_color(cell.color_bg));
        }

        let color = palette_color(cell.color_fg);
        match cell.symbol {
            ' ' => {}
            PLAYER_SYMBOL => {
                let half = TILE_SIZE / 2.0;
                draw_circle(px + half, py + half, half - 2.0, color);
            }
            _ if !cell.passable => {
                draw_rectangle(px + 1.0, py + 1.0, TILE_SIZE - 2.0, TILE_SIZE - 2.0, color);
            }
            _ => {
                let quarter = TILE_SIZE / 4.0;
                draw_rectangle(px + quarter, py + quarter, quarter * 2.0, quarter * 2.0, color);
            }
        }
    }
}
