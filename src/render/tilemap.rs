//! Tile-grid geography: every state is one cell of a 12 × 8 grid laid out
//! roughly where it sits on the map.

pub const GRID_COLUMNS: u32 = 12;
pub const GRID_ROWS: u32 = 8;

/// `(code, column, row)` for each of the 50 states.
pub static TILES: &[(&str, u32, u32)] = &[
    ("AK", 0, 0),
    ("ME", 11, 0),
    ("WI", 6, 1),
    ("VT", 10, 1),
    ("NH", 11, 1),
    ("WA", 1, 2),
    ("ID", 2, 2),
    ("MT", 3, 2),
    ("ND", 4, 2),
    ("MN", 5, 2),
    ("IL", 6, 2),
    ("MI", 7, 2),
    ("NY", 9, 2),
    ("MA", 10, 2),
    ("OR", 1, 3),
    ("NV", 2, 3),
    ("WY", 3, 3),
    ("SD", 4, 3),
    ("IA", 5, 3),
    ("IN", 6, 3),
    ("OH", 7, 3),
    ("PA", 8, 3),
    ("NJ", 9, 3),
    ("CT", 10, 3),
    ("RI", 11, 3),
    ("CA", 1, 4),
    ("UT", 2, 4),
    ("CO", 3, 4),
    ("NE", 4, 4),
    ("MO", 5, 4),
    ("KY", 6, 4),
    ("WV", 7, 4),
    ("VA", 8, 4),
    ("MD", 9, 4),
    ("DE", 10, 4),
    ("AZ", 2, 5),
    ("NM", 3, 5),
    ("KS", 4, 5),
    ("AR", 5, 5),
    ("TN", 6, 5),
    ("NC", 7, 5),
    ("SC", 8, 5),
    ("OK", 4, 6),
    ("LA", 5, 6),
    ("MS", 6, 6),
    ("AL", 7, 6),
    ("GA", 8, 6),
    ("HI", 0, 7),
    ("TX", 4, 7),
    ("FL", 9, 7),
];

/// Grid cell for a state code.
pub fn tile_of(code: &str) -> Option<(u32, u32)> {
    TILES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, col, row)| (*col, *row))
}

/// State code occupying a grid cell, if any.
pub fn state_at(col: u32, row: u32) -> Option<&'static str> {
    TILES
        .iter()
        .find(|(_, c, r)| *c == col && *r == row)
        .map(|(code, _, _)| *code)
}
