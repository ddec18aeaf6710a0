//! Frame drawing: ray-cast view and overlays
//!
//! Every column of the screen casts one ray. The distance to the wall
//! decides how much of the column is sky, wall and floor:
//!
//! ```text
//! row 0            sky      (row <= ceiling)
//! ...              wall     (ceiling < row <= height - ceiling)
//! row height - 1   floor    (row > height - ceiling)
//! ```
//!
//! Overlays are written on top of the view, each in its own region, in the
//! order progress bar, mini-map, debug line, menu or won panel. A later
//! overlay wins where two regions meet.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use crate::geometry::{Vector2f, Vector2n};
use crate::raycast::RayCaster;
use crate::screen::Screen;
use crate::{Maze, Tile};

/// Wall glyphs from nearest to farthest
pub const WALL_SHADES: [char; 5] = ['\u{2588}', '\u{2593}', '\u{2592}', '\u{2591}', ' '];

/// Floor glyphs from the bottom of the screen towards the horizon
pub const FLOOR_SHADES: [char; 5] = ['#', 'x', '.', '-', ' '];

/// Progress towards the exit, from farthest to nearest
pub const PROGRESS_BARS: [&str; 10] = [
    "EXIT [#.........]",
    "EXIT [##........]",
    "EXIT [###.......]",
    "EXIT [####......]",
    "EXIT [#####.....]",
    "EXIT [######....]",
    "EXIT [#######...]",
    "EXIT [########..]",
    "EXIT [#########.]",
    "EXIT [##########]",
];

/// First screen row of the mini-map; row 0 is kept for the debug line
pub const MINIMAP_ROW: usize = 1;

/// Empty rows above the wall in a column
///
/// Nearer walls leave less sky, so they are drawn taller. The result is
/// clamped to `0..=height / 2`.
pub fn ceiling_size(distance: f32, screen_height: usize) -> usize {
    let half = screen_height as f32 / 2.0;
    let size = (half - half / distance) as i32;
    size.clamp(0, half as i32) as usize
}

/// Wall glyph for a distance
///
/// Buckets: `d <= max/4`, `d < max/3`, `d < max/2`, `d < max`, otherwise
/// blank.
pub fn wall_shade(distance: f32, max_distance: f32) -> char {
    if distance <= max_distance / 4.0 {
        WALL_SHADES[0]
    } else if distance < max_distance / 3.0 {
        WALL_SHADES[1]
    } else if distance < max_distance / 2.0 {
        WALL_SHADES[2]
    } else if distance < max_distance {
        WALL_SHADES[3]
    } else {
        WALL_SHADES[4]
    }
}

/// Floor glyph for a screen row, a gradient towards the horizon
pub fn floor_shade(row: usize, screen_height: usize) -> char {
    let half = screen_height as f32 / 2.0;
    let highness = 1.0 - (row as f32 - half) / half;
    if highness < 0.25 {
        FLOOR_SHADES[0]
    } else if highness < 0.5 {
        FLOOR_SHADES[1]
    } else if highness < 0.75 {
        FLOOR_SHADES[2]
    } else if highness < 0.9 {
        FLOOR_SHADES[3]
    } else {
        FLOOR_SHADES[4]
    }
}

/// Progress bar for a normalised exit distance in `0.0..=1.0`
pub fn progress_bar(exit_distance: f32) -> &'static str {
    let level = ((1.0 - exit_distance) * PROGRESS_BARS.len() as f32).max(0.0) as usize;
    PROGRESS_BARS[level.min(PROGRESS_BARS.len() - 1)]
}

/// Draw the first-person view, one ray per screen column
pub fn draw_view(
    screen: &mut Screen,
    maze: &Maze,
    caster: &RayCaster,
    position: Vector2f,
    angle: f32,
    fov: f32,
) {
    let (width, height) = (screen.width(), screen.height());
    for col in 0..width {
        let ray_angle = (angle - fov / 2.0) + (col as f32 / width as f32) * fov;
        let distance = caster.cast_distance(maze, position, ray_angle);

        let ceiling = ceiling_size(distance, height);
        let floor = height - ceiling;
        let shade = wall_shade(distance, caster.max_distance());

        for row in 0..height {
            let c = if row <= ceiling {
                ' '
            } else if row <= floor {
                shade
            } else {
                floor_shade(row, height)
            };
            screen.set(col, row, c);
        }
    }
}

/// Progress bar, centred on the bottom row
pub fn draw_progress(screen: &mut Screen, exit_distance: f32) {
    let row = screen.height() - 1;
    screen.write_centered(row, progress_bar(exit_distance));
}

/// Top-down map in the top-left corner, one character per map cell
pub fn draw_minimap(screen: &mut Screen, maze: &Maze, position: Vector2f, angle: f32) {
    let player = position.cell();
    for y in 0..maze.map_height() {
        for x in 0..maze.map_width() {
            let pos = Vector2n::new(x as i32, y as i32);
            let c = if pos == player {
                heading_glyph(angle)
            } else if pos == maze.exit() {
                'E'
            } else if maze.tile(pos) == Some(Tile::Wall) {
                '#'
            } else {
                '.'
            };
            screen.set(x, MINIMAP_ROW + y, c);
        }
    }
}

/// Arrow pointing the way the player faces; `y` grows downwards
fn heading_glyph(angle: f32) -> char {
    let sector = ((angle.rem_euclid(TAU) + FRAC_PI_4) / FRAC_PI_2) as usize % 4;
    ['>', 'v', '<', '^'][sector]
}

/// Position, heading and frame rate on the top row
pub fn draw_debug(screen: &mut Screen, position: Vector2f, angle: f32, elapsed: f32) {
    let fps = if elapsed > 0.0 { 1.0 / elapsed } else { 0.0 };
    let text = format!(
        "X={:.2}, Y={:.2}, A={:.2}, FPS={:6.0}",
        position.x, position.y, angle, fps
    );
    screen.write_str(0, 0, &text);
}

pub fn draw_menu(screen: &mut Screen) {
    draw_panel(
        screen,
        &[
            "M A Z E   W A L K E R",
            "",
            "Find the opening in the outer wall.",
            "",
            "W/S walk   A/D strafe   Left/Right turn",
            "M map   I debug",
            "",
            "ENTER start   ESC quit",
        ],
    );
}

pub fn draw_won(screen: &mut Screen, play_time: f32) {
    let time = format!("Escaped in {play_time:.1} s");
    draw_panel(
        screen,
        &[
            "You found the exit!",
            time.as_str(),
            "",
            "ENTER play again   ESC quit",
        ],
    );
}

/// Bordered box with centred lines in the middle of the screen
fn draw_panel(screen: &mut Screen, lines: &[&str]) {
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let (w, h) = (inner + 4, lines.len() + 2);
    let col = screen.width().saturating_sub(w) / 2;
    let row = screen.height().saturating_sub(h) / 2;

    screen.fill_rect(col, row, w, h, ' ');
    for x in col..col + w {
        screen.set(x, row, '-');
        screen.set(x, row + h - 1, '-');
    }
    for y in row..row + h {
        screen.set(col, y, '|');
        screen.set(col + w - 1, y, '|');
    }
    for (i, line) in lines.iter().enumerate() {
        let pad = (inner - line.chars().count()) / 2;
        screen.write_str(col + 2 + pad, row + 1 + i, line);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    const MAX: f32 = 16.0;

    #[test]
    fn wall_shade_thresholds() {
        assert_eq!(wall_shade(0.1, MAX), '█');
        assert_eq!(wall_shade(MAX / 4.0, MAX), '█');
        assert_eq!(wall_shade(4.5, MAX), '▓');
        assert_eq!(wall_shade(MAX / 3.0, MAX), '▒');
        assert_eq!(wall_shade(MAX / 2.0, MAX), '░');
        assert_eq!(wall_shade(15.9, MAX), '░');
        assert_eq!(wall_shade(MAX, MAX), ' ');
    }

    #[test]
    fn floor_shade_gradient() {
        // height 40: highness = 1 - (row - 20) / 20
        assert_eq!(floor_shade(39, 40), '#');
        assert_eq!(floor_shade(34, 40), 'x');
        assert_eq!(floor_shade(30, 40), '.');
        assert_eq!(floor_shade(25, 40), '-');
        assert_eq!(floor_shade(21, 40), ' ');
    }

    #[test]
    fn nearer_walls_leave_less_sky() {
        assert_eq!(ceiling_size(0.1, 40), 0);
        assert_eq!(ceiling_size(1.0, 40), 0);
        assert_eq!(ceiling_size(2.0, 40), 10);
        assert_eq!(ceiling_size(4.0, 40), 15);
        assert_eq!(ceiling_size(16.0, 40), 18);
        assert_eq!(ceiling_size(0.0, 40), 0);
        assert_eq!(ceiling_size(f32::INFINITY, 40), 20);
    }

    #[test]
    fn progress_levels() {
        assert_eq!(progress_bar(1.0), PROGRESS_BARS[0]);
        assert_eq!(progress_bar(0.55), PROGRESS_BARS[4]);
        assert_eq!(progress_bar(0.0), PROGRESS_BARS[9]);
        assert_eq!(progress_bar(1.5), PROGRESS_BARS[0]);
    }

    #[test]
    fn heading_arrows() {
        assert_eq!(heading_glyph(0.0), '>');
        assert_eq!(heading_glyph(PI / 2.0), 'v');
        assert_eq!(heading_glyph(PI), '<');
        assert_eq!(heading_glyph(-PI / 2.0), '^');
        assert_eq!(heading_glyph(2.0 * PI - 0.1), '>');
    }

    #[test]
    fn column_is_sky_wall_floor() {
        let maze = Maze::parse_layout("#####\n#S..E\n#####").unwrap();
        let mut screen = Screen::new(1, 20).unwrap();
        let caster = RayCaster::new(MAX);

        // Facing the left wall from x = 3.5: distance 2.6
        draw_view(&mut screen, &maze, &caster, Vector2f::new(3.5, 1.5), PI, 0.0);

        let column: String = screen.rows().collect();
        let ceiling = ceiling_size(2.6, 20);
        assert_eq!(ceiling, 6);
        assert!(column[..=ceiling].chars().all(|c| c == ' '), "{column:?}");
        let wall: String = column.chars().skip(ceiling + 1).take(20 - 2 * ceiling).collect();
        assert!(wall.chars().all(|c| c == '█'), "{column:?}");
        assert_eq!(column.chars().last(), Some(floor_shade(19, 20)));
    }

    #[test]
    fn later_overlays_win() {
        let maze = Maze::parse_layout("#####\n#S..E\n#####").unwrap();
        let mut screen = Screen::new(30, 4).unwrap();

        draw_progress(&mut screen, 0.5);
        assert!(screen.rows().nth(3).unwrap().contains("EXIT"));

        // Map rows 1..=3 cover the start of the progress row
        draw_minimap(&mut screen, &maze, Vector2f::new(1.5, 1.5), 0.0);
        assert!(screen.rows().nth(3).unwrap().starts_with("#####"));
        assert_eq!(screen.get(1, 2), Some('>'));
        assert_eq!(screen.get(4, 2), Some('E'));

        draw_debug(&mut screen, Vector2f::new(1.5, 1.5), 0.0, 0.5);
        assert!(screen.rows().next().unwrap().starts_with("X=1.50, Y=1.50, A=0.00"));

        draw_won(&mut screen, 12.0);
        assert!(screen.rows().any(|row| row.contains("You found the exit!")));
    }
}
