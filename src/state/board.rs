//! Board and rules engine.
//!
//! Pure functions over a 6x7 grid. Row 0 is the top of the board; pieces
//! fall toward row `ROWS - 1`. Nothing here knows about rooms, connections,
//! or transport.

use std::fmt;

/// Number of rows on the board.
pub const ROWS: usize = 6;

/// Number of columns on the board.
pub const COLS: usize = 7;

/// Length of a winning run.
pub const WIN_LENGTH: usize = 4;

/// Directions checked from each origin cell: horizontal, vertical, and the
/// two diagonals. Only "forward" directions are needed since every run has
/// a first cell along one of these.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A player's piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Piece {
    #[default]
    One,
    Two,
}

impl Piece {
    /// Player number as seen by clients (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// The opposing piece.
    pub fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A single board cell.
pub type Cell = Option<Piece>;

/// 6x7 game board.
///
/// Only [`Board::drop_piece`] places pieces, so a column's occupied cells
/// are always contiguous from the bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Drop `piece` into `col`. Returns the row it landed in, or `None` if the
    /// column is full or out of range.
    pub fn drop_piece(&mut self, col: usize, piece: Piece) -> Option<usize> {
        let row = next_open_row(self, col)?;
        let cell = self.cells.get_mut(row)?.get_mut(col)?;
        *cell = Some(piece);
        Some(row)
    }

    /// Clear every cell.
    pub fn clear(&mut self) {
        self.cells = [[None; COLS]; ROWS];
    }

    /// Number of occupied cells.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Rows as client numbers (0 empty, 1 or 2 for a piece).
    pub fn to_numbers(&self) -> [[u8; COLS]; ROWS] {
        let mut out = [[0u8; COLS]; ROWS];
        for (row_out, row) in out.iter_mut().zip(self.cells.iter()) {
            for (n, cell) in row_out.iter_mut().zip(row.iter()) {
                *n = cell.map_or(0, Piece::number);
            }
        }
        out
    }

    /// Convert to a JSON grid of 0/1/2.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.to_numbers())
    }
}

/// Lowest empty row in `col` (the highest row index, since row 0 is the top),
/// or `None` if the column is full or `col` is out of range.
pub fn next_open_row(board: &Board, col: usize) -> Option<usize> {
    if col >= COLS {
        return None;
    }
    (0..ROWS).rev().find(|&row| board.cells[row][col].is_none())
}

/// Whether `piece` has four in a row anywhere on the board.
pub fn check_win(board: &Board, piece: Piece) -> bool {
    for row in 0..ROWS {
        for col in 0..COLS {
            if board.cells[row][col] != Some(piece) {
                continue;
            }
            for (dr, dc) in DIRECTIONS {
                if run_length(board, piece, row, col, dr, dc) >= WIN_LENGTH {
                    return true;
                }
            }
        }
    }
    false
}

/// Whether no empty cells remain.
pub fn is_full(board: &Board) -> bool {
    board.cells.iter().flatten().all(Option::is_some)
}

/// Length of the run of `piece` starting at `(row, col)` and extending in
/// direction `(dr, dc)`, capped at `WIN_LENGTH`.
fn run_length(board: &Board, piece: Piece, row: usize, col: usize, dr: isize, dc: isize) -> usize {
    let mut len = 1;
    while len < WIN_LENGTH {
        let step = len as isize;
        let (Some(r), Some(c)) = (
            row.checked_add_signed(dr * step),
            col.checked_add_signed(dc * step),
        ) else {
            break;
        };
        if board.get(r, c) != Some(Some(piece)) {
            break;
        }
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn board_from(rows: [&str; ROWS]) -> Board {
        let mut board = Board::new();
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                board.cells[r][c] = match ch {
                    '1' => Some(Piece::One),
                    '2' => Some(Piece::Two),
                    _ => None,
                };
            }
        }
        board
    }

    #[test]
    fn test_next_open_row_empty_column() {
        let board = Board::new();
        assert_eq!(next_open_row(&board, 0), Some(ROWS - 1));
        assert_eq!(next_open_row(&board, COLS - 1), Some(ROWS - 1));
    }

    #[test]
    fn test_next_open_row_stacks_upward() {
        let mut board = Board::new();
        for expected in (0..ROWS).rev() {
            assert_eq!(next_open_row(&board, 3), Some(expected));
            assert_eq!(board.drop_piece(3, Piece::One), Some(expected));
        }
        assert_eq!(next_open_row(&board, 3), None);
        assert_eq!(board.drop_piece(3, Piece::Two), None);
    }

    #[test]
    fn test_next_open_row_out_of_range() {
        let board = Board::new();
        assert_eq!(next_open_row(&board, COLS), None);
    }

    #[test]
    fn test_check_win_horizontal() {
        let board = board_from([
            ".......", ".......", ".......", ".......", ".......", "..1111.",
        ]);
        assert!(check_win(&board, Piece::One));
        assert!(!check_win(&board, Piece::Two));
    }

    #[test]
    fn test_check_win_vertical() {
        let board = board_from([
            ".......", ".......", "2......", "2......", "2......", "2......",
        ]);
        assert!(check_win(&board, Piece::Two));
    }

    #[test]
    fn test_check_win_diagonal_down_right() {
        let board = board_from([
            ".......", ".......", "1......", "21.....", "221....", "2221...",
        ]);
        assert!(check_win(&board, Piece::One));
    }

    #[test]
    fn test_check_win_diagonal_down_left() {
        let board = board_from([
            ".......", ".......", "......2", ".....21", "....211", "...2111",
        ]);
        assert!(check_win(&board, Piece::Two));
        assert!(!check_win(&board, Piece::One));
    }

    #[test]
    fn test_check_win_three_is_not_enough() {
        let board = board_from([
            ".......", ".......", ".......", "1......", "1......", "111.2..",
        ]);
        assert!(!check_win(&board, Piece::One));
    }

    #[test]
    fn test_check_win_run_at_board_edge() {
        let board = board_from([
            "......1", "......1", "......1", "......1", ".......", ".......",
        ]);
        assert!(check_win(&board, Piece::One));
    }

    #[test]
    fn test_is_full() {
        let mut board = Board::new();
        assert!(!is_full(&board));
        for col in 0..COLS {
            for _ in 0..ROWS {
                board.drop_piece(col, Piece::One);
            }
        }
        assert!(is_full(&board));
        assert_eq!(board.piece_count(), ROWS * COLS);
    }

    #[test]
    fn test_to_numbers() {
        let mut board = Board::new();
        board.drop_piece(0, Piece::One);
        board.drop_piece(0, Piece::Two);
        let nums = board.to_numbers();
        assert_eq!(nums[ROWS - 1][0], 1);
        assert_eq!(nums[ROWS - 2][0], 2);
        assert_eq!(nums[0][0], 0);
    }

    #[test]
    fn test_piece_other() {
        assert_eq!(Piece::One.other(), Piece::Two);
        assert_eq!(Piece::Two.other(), Piece::One);
        assert_eq!(Piece::Two.to_string(), "2");
    }

    /// Board built by gravity from a move list, plus the column heights
    /// counted independently of the board.
    fn play_out(moves: &[(usize, bool)]) -> (Board, [usize; COLS]) {
        let mut board = Board::new();
        let mut heights = [0usize; COLS];
        for &(col, first) in moves {
            let piece = if first { Piece::One } else { Piece::Two };
            if board.drop_piece(col, piece).is_some() {
                heights[col] += 1;
            }
        }
        (board, heights)
    }

    /// Every window of four cells in a row, column, or diagonal.
    fn has_four_brute_force(board: &Board, piece: Piece) -> bool {
        let mut windows: Vec<[(usize, usize); WIN_LENGTH]> = Vec::new();
        for r in 0..ROWS {
            for c in 0..COLS {
                if c + 3 < COLS {
                    windows.push([(r, c), (r, c + 1), (r, c + 2), (r, c + 3)]);
                }
                if r + 3 < ROWS {
                    windows.push([(r, c), (r + 1, c), (r + 2, c), (r + 3, c)]);
                }
                if r + 3 < ROWS && c + 3 < COLS {
                    windows.push([(r, c), (r + 1, c + 1), (r + 2, c + 2), (r + 3, c + 3)]);
                }
                if r + 3 < ROWS && c >= 3 {
                    windows.push([(r, c), (r + 1, c - 1), (r + 2, c - 2), (r + 3, c - 3)]);
                }
            }
        }
        windows
            .iter()
            .any(|w| w.iter().all(|&(r, c)| board.get(r, c) == Some(Some(piece))))
    }

    fn moves_strategy() -> impl Strategy<Value = Vec<(usize, bool)>> {
        prop::collection::vec((0..COLS, any::<bool>()), 0..=ROWS * COLS + 6)
    }

    proptest! {
        #[test]
        fn test_next_open_row_matches_column_height(moves in moves_strategy()) {
            let (board, heights) = play_out(&moves);
            for col in 0..COLS {
                let expected = if heights[col] == ROWS {
                    None
                } else {
                    Some(ROWS - 1 - heights[col])
                };
                prop_assert_eq!(next_open_row(&board, col), expected);

                // Gravity: everything below the open row is occupied
                for row in 0..ROWS {
                    let occupied = board.get(row, col) != Some(None);
                    prop_assert_eq!(occupied, row >= ROWS - heights[col]);
                }
            }
        }

        #[test]
        fn test_check_win_matches_window_scan(moves in moves_strategy()) {
            let (board, _) = play_out(&moves);
            for piece in [Piece::One, Piece::Two] {
                prop_assert_eq!(check_win(&board, piece), has_four_brute_force(&board, piece));
            }
        }

        #[test]
        fn test_is_full_iff_every_column_full(moves in moves_strategy()) {
            let (board, heights) = play_out(&moves);
            prop_assert_eq!(is_full(&board), heights.iter().all(|&h| h == ROWS));
            prop_assert_eq!(board.piece_count(), heights.iter().sum::<usize>());
        }
    }
}
