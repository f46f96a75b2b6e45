//! In-terminal view of a map using 24-bit ANSI background colours.

use std::io::Write;

use super::scale::{NO_DATA, Rgb, is_dark};
use super::tilemap::{GRID_COLUMNS, GRID_ROWS, state_at};
use super::{ChoroplethMap, MapSink, legend_value};
use crate::error::Result;

const RESET: &str = "\x1b[0m";
const LEGEND_CELLS: u32 = 20;

/// Draws maps to any writer, normally stdout.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MapSink for TerminalSink<W> {
    fn render(&mut self, map: &ChoroplethMap) -> Result<()> {
        self.out.write_all(draw(map).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

fn cell(bg: Rgb, text: &str) -> String {
    let fg = if is_dark(bg) { [255, 255, 255] } else { [0, 0, 0] };
    format!(
        "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m{text}{RESET}",
        bg[0], bg[1], bg[2], fg[0], fg[1], fg[2]
    )
}

/// Renders the title, tile grid and a legend line as ANSI text.
pub fn draw(map: &ChoroplethMap) -> String {
    let mut s = String::new();
    s.push_str(&map.title);
    s.push_str("\n\n");

    for row in 0..GRID_ROWS {
        for col in 0..GRID_COLUMNS {
            match state_at(col, row) {
                Some(code) => {
                    let bg = map.color_of(code).unwrap_or(NO_DATA);
                    s.push_str(&cell(bg, &format!(" {code} ")));
                }
                None => s.push_str("    "),
            }
        }
        s.push('\n');
    }

    s.push('\n');
    s.push_str(&format!("{} {} ", map.metric, legend_value(map.range.min)));
    for i in 0..LEGEND_CELLS {
        let t = i as f64 / (LEGEND_CELLS - 1) as f64;
        s.push_str(&cell(map.scale.sample(t), " "));
    }
    s.push_str(&format!(" {}\n\n", legend_value(map.range.max)));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ColorScale;
    use std::collections::BTreeMap;

    fn sample_map() -> ChoroplethMap {
        let mut values = BTreeMap::new();
        values.insert("AL", 39.2);
        values.insert("CO", 25.0);
        ChoroplethMap::new("Test Map", "obesity_rate", "t.png", values, ColorScale::heat())
    }

    #[test]
    fn test_draw_contains_every_state_and_legend() {
        let text = draw(&sample_map());
        assert!(text.starts_with("Test Map\n"));
        for code in ["AL", "CO", "AK", "HI", "ME", "FL"] {
            assert!(text.contains(&format!(" {code} ")), "{code} missing");
        }
        assert!(text.contains("obesity_rate 25.0 "));
        assert!(text.contains(" 39.2\n"));
    }

    #[test]
    fn test_state_colors_are_emitted() {
        let text = draw(&sample_map());
        assert!(text.contains("\x1b[48;2;255;0;0m\x1b[38;2;255;255;255m AL "));
        assert!(text.contains("\x1b[48;2;0;0;255m\x1b[38;2;255;255;255m CO "));
        assert!(text.contains("\x1b[48;2;220;220;220m\x1b[38;2;0;0;0m TX "));
    }

    #[test]
    fn test_sink_writes_to_writer() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.render(&sample_map()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, draw(&sample_map()));
    }
}
