use std::fs;
use std::path::{Path, PathBuf};

use engine::Rect;
use thiserror::Error;
use tracing::warn;

use super::TILE_SIZE;
use crate::app::config::DoorMode;

const FALLBACK_ROWS: [&str; 4] = [
    "11111111111111111111",
    "100000000000000000D1",
    "10K00000000000000001",
    "11111111111111111111",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TileKind {
    Empty,
    Wall,
    Key,
    Door,
    Goal,
}

impl TileKind {
    /// Ordered by render id.
    pub(crate) const ALL: [TileKind; 5] = [
        TileKind::Empty,
        TileKind::Wall,
        TileKind::Key,
        TileKind::Door,
        TileKind::Goal,
    ];

    pub(crate) fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.symbol() == symbol)
    }

    pub(crate) fn symbol(self) -> char {
        match self {
            TileKind::Empty => '0',
            TileKind::Wall => '1',
            TileKind::Key => 'K',
            TileKind::Door => 'D',
            TileKind::Goal => 'G',
        }
    }

    pub(crate) fn render_id(self) -> u16 {
        self as u16
    }

    pub(crate) fn is_solid(self, door_mode: DoorMode) -> bool {
        match self {
            TileKind::Wall => true,
            TileKind::Door => door_mode == DoorMode::MenuKey,
            TileKind::Empty | TileKind::Key | TileKind::Goal => false,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum MapError {
    #[error("map {path} has no rows")]
    Empty { path: PathBuf },
    #[error("map {path} line {line} has {actual} tiles, expected {expected}")]
    Ragged {
        path: PathBuf,
        line: usize,
        expected: usize,
        actual: usize,
    },
    #[error("map {path} line {line} column {column} has unknown tile symbol {symbol:?}")]
    UnknownSymbol {
        path: PathBuf,
        line: usize,
        column: usize,
        symbol: char,
    },
}

/// Grid cell index containing the pixel coordinate `coord`.
pub(crate) fn cell_index(coord: f32) -> i32 {
    (coord / TILE_SIZE).floor() as i32
}

pub(crate) fn cell_rect(col: i32, row: i32) -> Rect {
    Rect::new(
        col as f32 * TILE_SIZE,
        row as f32 * TILE_SIZE,
        TILE_SIZE,
        TILE_SIZE,
    )
}

/// Rectangular tile grid. Every row has the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TileMap {
    width: usize,
    height: usize,
    cells: Vec<TileKind>,
}

impl TileMap {
    /// Reads a map file. A missing or unreadable file is replaced by the
    /// built-in fallback grid; malformed content is an error.
    pub(crate) fn load(path: &Path) -> Result<Self, MapError> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::parse(path, &raw),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "map_unreadable_using_fallback"
                );
                Ok(Self::fallback())
            }
        }
    }

    pub(crate) fn parse(path: &Path, raw: &str) -> Result<Self, MapError> {
        let mut rows = raw.lines().map(str::trim).collect::<Vec<_>>();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(MapError::Empty {
                path: path.to_path_buf(),
            });
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (index, row) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(MapError::Ragged {
                    path: path.to_path_buf(),
                    line: index + 1,
                    expected: width,
                    actual,
                });
            }
            for (column, symbol) in row.chars().enumerate() {
                let kind = TileKind::from_symbol(symbol).ok_or_else(|| MapError::UnknownSymbol {
                    path: path.to_path_buf(),
                    line: index + 1,
                    column: column + 1,
                    symbol,
                })?;
                cells.push(kind);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    pub(crate) fn fallback() -> Self {
        let cells = FALLBACK_ROWS
            .iter()
            .flat_map(|row| row.chars())
            .map(|symbol| TileKind::from_symbol(symbol).unwrap_or(TileKind::Empty))
            .collect();
        Self {
            width: FALLBACK_ROWS[0].len(),
            height: FALLBACK_ROWS.len(),
            cells,
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    fn index_of(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return None;
        }
        Some(row as usize * self.width + col as usize)
    }

    pub(crate) fn get(&self, col: i32, row: i32) -> Option<TileKind> {
        self.index_of(col, row).map(|index| self.cells[index])
    }

    pub(crate) fn set(&mut self, col: i32, row: i32, kind: TileKind) -> bool {
        match self.index_of(col, row) {
            Some(index) => {
                self.cells[index] = kind;
                true
            }
            None => false,
        }
    }

    /// Out-of-range cells are never solid.
    pub(crate) fn solid_at(&self, col: i32, row: i32, door_mode: DoorMode) -> bool {
        self.get(col, row)
            .is_some_and(|kind| kind.is_solid(door_mode))
    }

    /// Row-major `(col, row, kind)` for every cell.
    pub(crate) fn cells(&self) -> impl Iterator<Item = (i32, i32, TileKind)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, kind)| {
            ((index % width) as i32, (index / width) as i32, *kind)
        })
    }

    pub(crate) fn render_ids(&self) -> Vec<u16> {
        self.cells.iter().map(|kind| kind.render_id()).collect()
    }
}
