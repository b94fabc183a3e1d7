use rand::seq::index;
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in `Up, Down, Left, Right` order.
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right];
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction {0:?} (expected up/down/left/right or w/s/a/d)")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Classification of a grid after a committed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// Moves remain and 2048 has not been reached.
    Active,
    /// A 2048 tile is on the grid.
    Won,
    /// Grid is full and no adjacent pair can merge.
    Lost,
}

impl GameStatus {
    #[inline]
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::Active)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    #[error("cannot spawn {requested} tile(s): only {available} empty cell(s)")]
    NoEmptyCells { requested: usize, available: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid tile {value} at ({row}, {col}): expected 0 or a power of two in 2..=32768")]
    InvalidTile { row: usize, col: usize, value: u32 },
}

/// Exponent of the winning tile (2^11 = 2048).
pub const WIN_EXPONENT: u8 = 11;
/// Value of the winning tile.
pub const WIN_TILE: u32 = 1 << WIN_EXPONENT;
/// Largest exponent a 4-bit cell can hold.
const MAX_EXPONENT: u8 = 0xf;
/// Largest tile value the packed grid can hold (32768).
pub const MAX_TILE: u32 = 1 << MAX_EXPONENT;
/// Exponent of a freshly spawned tile (always a 2).
const SPAWN_EXPONENT: u64 = 1;

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

struct Stores {
    slide_left: Box<[u16]>,
    slide_right: Box<[u16]>,
}

type GridRaw = u64;
type Line = u16;
type Exponent = u8;

/// Packed 4x4 grid as 16 4-bit tile exponents in a `u64`, row-major,
/// row 0 in the most significant 16 bits. Exponent 0 is an empty cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Grid(GridRaw);

impl Grid {
    /// A constant empty grid (all zeros).
    pub const EMPTY: Grid = Grid(0);

    #[inline]
    pub fn from_raw(raw: GridRaw) -> Self { Grid(raw) }

    #[inline]
    pub fn into_raw(self) -> GridRaw { self.0 }

    #[inline]
    pub fn raw(&self) -> GridRaw { self.0 }

    /// Build a grid from tile values laid out as `rows[row][col]`.
    ///
    /// ```
    /// use twenty48_rules::engine::Grid;
    /// let g = Grid::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap();
    /// assert_eq!(g.tile(0, 0), 2);
    /// assert_eq!(g.tile(3, 3), 4);
    /// assert!(Grid::from_rows([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_rows(rows: [[u32; 4]; 4]) -> Result<Self, GridError> {
        let mut raw = 0;
        for (row, cells) in rows.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                let exp = value_to_exponent(value)
                    .ok_or(GridError::InvalidTile { row, col, value })?;
                raw |= (exp as GridRaw) << cell_shift(row * 4 + col);
            }
        }
        Ok(Grid(raw))
    }

    /// Unpack into tile values laid out as `rows[row][col]`.
    pub fn to_rows(self) -> [[u32; 4]; 4] {
        let mut rows = [[0; 4]; 4];
        for (row, cells) in rows.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = self.tile(row, col);
            }
        }
        rows
    }

    /// Tile value at (`row`, `col`); 0 if empty. `None` outside the 4x4 grid.
    #[inline]
    pub fn get(self, row: usize, col: usize) -> Option<u32> {
        (row < 4 && col < 4).then(|| exponent_to_value(extract_exponent(self.0, row * 4 + col)))
    }

    /// Tile value at (`row`, `col`); 0 if empty.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is outside `0..4`, like slice indexing.
    /// Use [`Grid::get`] for a checked lookup.
    #[inline]
    pub fn tile(self, row: usize, col: usize) -> u32 {
        match self.get(row, col) {
            Some(value) => value,
            None => panic!("cell ({row}, {col}) is outside the 4x4 grid"),
        }
    }

    /// Fresh grid with two spawned tiles, using the provided RNG.
    ///
    /// ```
    /// use twenty48_rules::engine::Grid;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let g = Grid::new_game(&mut rng);
    /// assert_eq!(g.count_empty(), 14);
    /// ```
    pub fn new_game<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Grid::EMPTY.place_twos(&empty_cells(Grid::EMPTY), 2, rng)
    }

    /// Return the grid resulting from sliding/merging tiles in `dir` (no spawn).
    ///
    /// ```
    /// use twenty48_rules::engine::{Grid, Direction};
    /// let g = Grid::from_rows([[2, 2, 2, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// assert_eq!(g.shift(Direction::Left).to_rows()[0], [4, 2, 0, 0]);
    /// ```
    #[inline]
    pub fn shift(self, dir: Direction) -> Self {
        match dir {
            Direction::Left | Direction::Right => shift_rows(self, dir),
            Direction::Up | Direction::Down => shift_cols(self, dir),
        }
    }

    /// Place `count` new 2-tiles in distinct empty cells chosen uniformly at random.
    ///
    /// Fails without touching the grid when fewer than `count` cells are empty.
    pub fn spawn<R: Rng + ?Sized>(self, count: usize, rng: &mut R) -> Result<Self, SpawnError> {
        let empty = empty_cells(self);
        if empty.len() < count {
            return Err(SpawnError::NoEmptyCells { requested: count, available: empty.len() });
        }
        Ok(self.place_twos(&empty, count, rng))
    }

    /// Classify this grid as active, won or lost.
    #[inline]
    pub fn status(self) -> GameStatus { classify_status(self) }

    #[inline]
    pub fn count_empty(self) -> usize { count_empty(self) }

    /// Highest tile value on the grid (0 for an empty grid).
    pub fn highest_tile(self) -> u32 {
        let max_exp = (0..16).map(|idx| extract_exponent(self.0, idx)).max().unwrap_or(0);
        exponent_to_value(max_exp)
    }

    /// Sum of all tile values.
    pub fn tile_sum(self) -> u64 {
        (0..16).map(|idx| exponent_to_value(extract_exponent(self.0, idx)) as u64).sum()
    }

    /// True if some right- or down-neighbouring pair of non-empty tiles is
    /// equal and can merge. A pair of `MAX_TILE` tiles cannot, so it does not count.
    pub fn has_adjacent_pair(self) -> bool {
        for row in 0..4 {
            for col in 0..4 {
                let here = extract_exponent(self.0, row * 4 + col);
                if here == 0 || here == MAX_EXPONENT {
                    continue;
                }
                if col != 3 && here == extract_exponent(self.0, row * 4 + col + 1) {
                    return true;
                }
                if row != 3 && here == extract_exponent(self.0, (row + 1) * 4 + col) {
                    return true;
                }
            }
        }
        false
    }

    /// True if no direction changes the grid.
    pub fn is_stuck(self) -> bool {
        Direction::ALL.iter().all(|&dir| self.shift(dir) == self)
    }

    fn place_twos<R: Rng + ?Sized>(self, empty: &[usize], count: usize, rng: &mut R) -> Self {
        let raw = index::sample(rng, empty.len(), count)
            .iter()
            .fold(self.0, |raw, pick| raw | (SPAWN_EXPONENT << cell_shift(empty[pick])));
        Grid(raw)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({:#018x})", self.0)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.to_rows().iter().enumerate() {
            if row > 0 {
                writeln!(f, "-------------------------------")?;
            }
            let labels: Vec<String> = cells.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", labels.join("|"))?;
        }
        Ok(())
    }
}

impl From<GridRaw> for Grid { fn from(v: GridRaw) -> Self { Grid::from_raw(v) } }
impl From<Grid> for GridRaw { fn from(g: Grid) -> Self { g.into_raw() } }

impl TryFrom<[[u32; 4]; 4]> for Grid {
    type Error = GridError;
    fn try_from(rows: [[u32; 4]; 4]) -> Result<Self, Self::Error> { Grid::from_rows(rows) }
}

/// Initialize the line tables eagerly. Safe to call multiple times;
/// otherwise they are built on first move.
pub fn new() {
    stores();
}

/// Fresh grid with two spawned tiles (uses thread RNG).
pub fn reset() -> Grid {
    Grid::new_game(&mut rand::thread_rng())
}

/// Slide/merge tiles in the given direction. No randomness.
pub fn apply_move(grid: Grid, direction: Direction) -> Grid {
    grid.shift(direction)
}

/// Place `count` 2-tiles in random empty cells (uses thread RNG).
///
/// For reproducible behavior, prefer `Grid::spawn(count, &mut impl Rng)`.
pub fn spawn(grid: Grid, count: usize) -> Result<Grid, SpawnError> {
    grid.spawn(count, &mut rand::thread_rng())
}

/// Won if a 2048 tile is present; else Active while a merge is possible or
/// a cell is empty; else Lost.
pub fn classify_status(grid: Grid) -> GameStatus {
    if (0..16).any(|idx| extract_exponent(grid.0, idx) == WIN_EXPONENT) {
        return GameStatus::Won;
    }
    if grid.has_adjacent_pair() {
        return GameStatus::Active;
    }
    if count_empty(grid) == 0 {
        return GameStatus::Lost;
    }
    GameStatus::Active
}

/// Count the number of empty cells.
pub fn count_empty(grid: Grid) -> usize {
    16 - count_non_empty(grid)
}

// Credit to Nneonneo
pub(crate) fn transpose(x: GridRaw) -> GridRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

static STORES: OnceLock<Stores> = OnceLock::new();

fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

fn create_stores() -> Stores {
    // Heap-allocated to keep the init frame small
    let mut slide_left = vec![0u16; LINE_TABLE_SIZE];
    let mut slide_right = vec![0u16; LINE_TABLE_SIZE];
    for val in 0..LINE_TABLE_SIZE {
        let tiles = line_to_tiles(val as Line);
        slide_left[val] = tiles_to_line(slide_toward_start(tiles));
        slide_right[val] = tiles_to_line(slide_toward_end(tiles));
    }
    Stores {
        slide_left: slide_left.into_boxed_slice(),
        slide_right: slide_right.into_boxed_slice(),
    }
}

fn shift_rows(grid: Grid, dir: Direction) -> Grid {
    let s = stores();
    let table: &[u16] = match dir {
        Direction::Left | Direction::Up => &s.slide_left,
        Direction::Right | Direction::Down => &s.slide_right,
    };
    let res = (0..4).fold(0, |new_grid, row_idx| {
        let row = extract_line(grid.0, row_idx);
        new_grid | ((table[row as usize] as GridRaw) << ((3 - row_idx) * 16))
    });
    Grid(res)
}

// Columns become rows under transpose; Up slides like Left, Down like Right.
fn shift_cols(grid: Grid, dir: Direction) -> Grid {
    let moved = shift_rows(Grid(transpose(grid.0)), dir);
    Grid(transpose(moved.0))
}

fn extract_line(grid: GridRaw, line_idx: usize) -> Line {
    ((grid >> ((3 - line_idx) * 16)) & 0xffff) as Line
}

fn line_to_tiles(line: Line) -> [Exponent; 4] {
    [
        ((line >> 12) & 0xf) as Exponent,
        ((line >> 8) & 0xf) as Exponent,
        ((line >> 4) & 0xf) as Exponent,
        (line & 0xf) as Exponent,
    ]
}

fn tiles_to_line(tiles: [Exponent; 4]) -> Line {
    (tiles[0] as Line) << 12 | (tiles[1] as Line) << 8 | (tiles[2] as Line) << 4 | tiles[3] as Line
}

/// Compact toward index 0, merge equal neighbours once each scanning from
/// index 0, then compact again. Done as a single pass over the compacted
/// tiles: a merged pair emits one doubled tile and skips the consumed one.
fn slide_toward_start(tiles: [Exponent; 4]) -> [Exponent; 4] {
    let compacted: Vec<Exponent> = tiles.into_iter().filter(|&t| t != 0).collect();
    let mut out = [0; 4];
    let mut slot = 0;
    let mut i = 0;
    while i < compacted.len() {
        let here = compacted[i];
        // A pair of 2^15 tiles cannot double inside a nibble, so it stays put.
        if i + 1 < compacted.len() && compacted[i + 1] == here && here < MAX_EXPONENT {
            out[slot] = here + 1;
            i += 2;
        } else {
            out[slot] = here;
            i += 1;
        }
        slot += 1;
    }
    out
}

fn slide_toward_end(mut tiles: [Exponent; 4]) -> [Exponent; 4] {
    tiles.reverse();
    let mut out = slide_toward_start(tiles);
    out.reverse();
    out
}

#[inline]
fn cell_shift(idx: usize) -> u32 {
    (60 - 4 * idx) as u32
}

#[inline]
fn extract_exponent(grid: GridRaw, idx: usize) -> Exponent {
    ((grid >> cell_shift(idx)) & 0xf) as Exponent
}

#[inline]
fn exponent_to_value(exp: Exponent) -> u32 {
    if exp == 0 { 0 } else { 1 << exp }
}

fn value_to_exponent(value: u32) -> Option<Exponent> {
    match value {
        0 => Some(0),
        v if v.is_power_of_two() && (2..=MAX_TILE).contains(&v) => {
            Some(v.trailing_zeros() as Exponent)
        }
        _ => None,
    }
}

fn empty_cells(grid: Grid) -> Vec<usize> {
    (0..16).filter(|&idx| extract_exponent(grid.0, idx) == 0).collect()
}

// Zero-nibble count, after
// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
fn count_non_empty(grid: Grid) -> usize {
    let mut raw = grid.0;
    raw |= raw >> 1;
    raw |= raw >> 2;
    raw &= 0x1111111111111111;
    raw.count_ones() as usize
}

fn format_val(val: u32) -> String {
    match val {
        0 => String::from("       "),
        v => format!("{:^7}", v),
    }
}
