use std::fmt;
use std::str::FromStr;

use arrayvec::ArrayVec;

use crate::error::{BoardError, MoveError};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Index of the middle column.
pub const CENTER_COL: usize = COLS / 2;

/// Ascending list of open columns. Never allocates.
pub type LegalColumns = ArrayVec<usize, COLS>;

/// Row/column steps for the four line orientations: horizontal, vertical,
/// rising diagonal and falling diagonal.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Human,
    Ai,
}

impl Cell {
    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Human => 'X',
            Cell::Ai => 'O',
        }
    }

    fn from_symbol(c: char) -> Option<Cell> {
        match c {
            '.' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::Human),
            'O' | 'o' => Some(Cell::Ai),
            _ => None,
        }
    }
}

/// Whether the game on a board is finished and who won it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    HumanWin,
    AiWin,
    Draw,
    Ongoing,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::Ongoing
    }
}

/// A 6x7 Connect Four grid.
///
/// Row 0 is the bottom row. Pieces only enter through [`Board::drop`], so
/// every column is a contiguous stack starting at row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Get the cell at a specific position
    /// Row 0 is the bottom, row 5 is the top
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// True iff `col` is on the board and its top cell is empty.
    pub fn is_open(&self, col: usize) -> bool {
        col < COLS && self.cells[ROWS - 1][col] == Cell::Empty
    }

    /// Number of pieces stacked in `col`.
    pub fn height(&self, col: usize) -> usize {
        (0..ROWS)
            .take_while(|&row| self.cells[row][col] != Cell::Empty)
            .count()
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop(&mut self, col: usize, cell: Cell) -> Result<usize, MoveError> {
        if col >= COLS {
            return Err(MoveError::InvalidColumn { column: col });
        }
        if cell == Cell::Empty {
            return Err(MoveError::EmptyPiece);
        }
        if !self.is_open(col) {
            return Err(MoveError::ColumnFull { column: col });
        }

        let row = self.height(col);
        self.cells[row][col] = cell;
        Ok(row)
    }

    /// Copy of this board with `cell` dropped into `col`.
    pub fn with_drop(&self, col: usize, cell: Cell) -> Result<Board, MoveError> {
        let mut next = *self;
        next.drop(col, cell)?;
        Ok(next)
    }

    /// Open columns in ascending order; empty when the board is full.
    pub fn legal_columns(&self) -> LegalColumns {
        (0..COLS).filter(|&col| self.is_open(col)).collect()
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| !self.is_open(col))
    }

    pub fn piece_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell != Cell::Empty)
            .count()
    }

    /// Scan every horizontal, vertical and diagonal window for four `cell`s.
    pub fn has_four_in_a_row(&self, cell: Cell) -> bool {
        if cell == Cell::Empty {
            return false;
        }
        windows().any(|window| window.iter().all(|&(r, c)| self.cells[r][c] == cell))
    }

    pub fn outcome(&self) -> Outcome {
        if self.has_four_in_a_row(Cell::Ai) {
            Outcome::AiWin
        } else if self.has_four_in_a_row(Cell::Human) {
            Outcome::HumanWin
        } else if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }

    /// Check if the piece at (row, col) is part of a line of four.
    ///
    /// Only lines through that cell are examined, which makes this the cheap
    /// test to run right after a drop.
    pub fn check_win(&self, row: usize, col: usize) -> bool {
        let cell = self.get(row, col);
        if cell == Cell::Empty {
            return false;
        }

        DIRECTIONS.iter().any(|&(dr, dc)| {
            1 + self.run_length(row, col, dr, dc, cell) + self.run_length(row, col, -dr, -dc, cell)
                >= 4
        })
    }

    /// Count consecutive `cell`s starting one step away from (row, col).
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> usize {
        let mut count = 0;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        while (0..ROWS as isize).contains(&r)
            && (0..COLS as isize).contains(&c)
            && self.cells[r as usize][c as usize] == cell
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Every length-4 window on the board, as (row, col) coordinates.
///
/// Rising diagonals start at rows 0..=2 and climb to the right; falling
/// diagonals start at rows 3..=5 and descend to the right. Each window is
/// produced exactly once: 24 horizontal, 21 vertical, 12 of each diagonal.
pub fn windows() -> impl Iterator<Item = [(usize, usize); 4]> {
    DIRECTIONS.into_iter().flat_map(|(dr, dc)| {
        (0..ROWS).flat_map(move |row| {
            (0..COLS).filter_map(move |col| window_at(row, col, dr, dc))
        })
    })
}

fn window_at(row: usize, col: usize, dr: isize, dc: isize) -> Option<[(usize, usize); 4]> {
    let end_row = row as isize + 3 * dr;
    let end_col = col as isize + 3 * dc;
    if !(0..ROWS as isize).contains(&end_row) || !(0..COLS as isize).contains(&end_col) {
        return None;
    }

    let mut window = [(0, 0); 4];
    for (i, slot) in window.iter_mut().enumerate() {
        let i = i as isize;
        *slot = (
            (row as isize + i * dr) as usize,
            (col as isize + i * dc) as usize,
        );
    }
    Some(window)
}

/// Renders the top row first, one line per row: `.` empty, `X` human, `O` AI.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            let line: Vec<String> = self.cells[row]
                .iter()
                .map(|cell| cell.symbol().to_string())
                .collect();
            write!(f, "{}", line.join(" "))?;
            if row > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Parses the diagram produced by `Display`. Spaces inside a line and blank
/// lines are ignored.
impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<Vec<char>> = s
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() != ROWS {
            return Err(BoardError::malformed(format!(
                "expected {ROWS} rows, found {}",
                lines.len()
            )));
        }

        let mut board = Board::new();
        for (i, line) in lines.iter().enumerate() {
            if line.len() != COLS {
                return Err(BoardError::malformed(format!(
                    "row {i} has {} cells, expected {COLS}",
                    line.len()
                )));
            }
            let row = ROWS - 1 - i;
            for (col, &symbol) in line.iter().enumerate() {
                board.cells[row][col] = Cell::from_symbol(symbol).ok_or_else(|| {
                    BoardError::malformed(format!("unknown cell symbol '{symbol}'"))
                })?;
            }
        }

        for col in 0..COLS {
            let height = board.height(col);
            if (height..ROWS).any(|row| board.cells[row][col] != Cell::Empty) {
                return Err(BoardError::malformed(format!(
                    "column {col} has a floating piece"
                )));
            }
        }

        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(diagram: &str) -> Board {
        diagram.parse().expect("valid diagram")
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                assert_eq!(board.get(row, col), Cell::Empty);
            }
        }
        assert_eq!(board.outcome(), Outcome::Ongoing);
        assert_eq!(board.legal_columns().len(), COLS);
    }

    #[test]
    fn test_drop_piece() {
        let mut board = Board::new();

        // Drop first piece in column 3
        let row = board.drop(3, Cell::Human).unwrap();
        assert_eq!(row, 0); // Should land at bottom
        assert_eq!(board.get(0, 3), Cell::Human);

        // Drop second piece in same column
        let row = board.drop(3, Cell::Ai).unwrap();
        assert_eq!(row, 1); // Should land on top of first piece
        assert_eq!(board.get(1, 3), Cell::Ai);
    }

    #[test]
    fn test_last_drop_closes_column() {
        let mut board = Board::new();
        for _ in 0..ROWS - 1 {
            board.drop(2, Cell::Human).unwrap();
        }
        assert!(board.is_open(2));
        board.drop(2, Cell::Ai).unwrap();
        assert!(!board.is_open(2));
    }

    #[test]
    fn test_column_full_does_not_mutate() {
        let mut board = Board::new();
        for _ in 0..ROWS {
            board.drop(0, Cell::Human).unwrap();
        }
        let before = board;

        assert_eq!(
            board.drop(0, Cell::Ai),
            Err(MoveError::ColumnFull { column: 0 })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_invalid_column() {
        let mut board = Board::new();
        assert_eq!(
            board.drop(7, Cell::Human),
            Err(MoveError::InvalidColumn { column: 7 })
        );
        assert!(!board.is_open(7));
    }

    #[test]
    fn test_drop_empty_rejected() {
        let mut board = Board::new();
        assert_eq!(board.drop(1, Cell::Empty), Err(MoveError::EmptyPiece));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_legal_columns_shrink_one_column_at_a_time() {
        let mut board = Board::new();
        board.drop(6, Cell::Ai).unwrap();
        board.drop(6, Cell::Ai).unwrap();

        for filled in 0..ROWS {
            assert_eq!(board.legal_columns().len(), COLS);
            assert!(board.legal_columns().contains(&4));
            board.drop(4, if filled % 2 == 0 { Cell::Human } else { Cell::Ai }).unwrap();
        }

        let legal = board.legal_columns();
        assert_eq!(legal.as_slice(), &[0, 1, 2, 3, 5, 6]);
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new();
        for col in 0..COLS {
            for _ in 0..ROWS {
                board.drop(col, Cell::Human).unwrap();
            }
        }
        assert!(board.is_full());
        assert!(board.legal_columns().is_empty());
    }

    #[test]
    fn test_horizontal_win() {
        let mut board = Board::new();
        for col in 2..6 {
            board.drop(col, Cell::Human).unwrap();
        }
        assert!(board.has_four_in_a_row(Cell::Human));
        assert!(!board.has_four_in_a_row(Cell::Ai));
        assert!(board.check_win(0, 4));
        assert_eq!(board.outcome(), Outcome::HumanWin);
    }

    #[test]
    fn test_vertical_win() {
        let mut board = Board::new();
        for _ in 0..4 {
            board.drop(3, Cell::Ai).unwrap();
        }
        assert!(board.has_four_in_a_row(Cell::Ai));
        assert!(board.check_win(3, 3));
        assert_eq!(board.outcome(), Outcome::AiWin);
    }

    #[test]
    fn test_rising_diagonal_win() {
        let board = board(
            "
            . . . . . . .
            . . . . . . .
            . . . O . . .
            . . O X . . .
            . O X X . . .
            O X X X . . .
            ",
        );
        assert!(board.has_four_in_a_row(Cell::Ai));
        assert!(board.check_win(3, 3));
        assert!(board.check_win(0, 0));
    }

    #[test]
    fn test_falling_diagonal_win() {
        let board = board(
            "
            . . . . . . .
            . . . . . . .
            . . . X . . .
            . . . O X . .
            . . . O O X .
            . . . O O O X
            ",
        );
        assert!(board.has_four_in_a_row(Cell::Human));
        assert!(board.check_win(3, 3));
        assert!(board.check_win(0, 6));
    }

    #[test]
    fn test_falling_diagonal_touching_top_row() {
        let board = board(
            "
            X . . . . . .
            O X . . . . .
            O O X . . . .
            X O O X . . .
            O X O X . . .
            X O X X . . .
            ",
        );
        assert!(board.has_four_in_a_row(Cell::Human));
        assert!(board.check_win(5, 0));
    }

    #[test]
    fn test_no_win_with_three() {
        let mut board = Board::new();
        for col in 0..3 {
            board.drop(col, Cell::Human).unwrap();
        }
        assert!(!board.has_four_in_a_row(Cell::Human));
        assert!(!board.check_win(0, 1));
    }

    #[test]
    fn test_blocked_line_is_not_a_win() {
        let board = board(
            "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            X X O X X . .
            ",
        );
        assert!(!board.has_four_in_a_row(Cell::Human));
        assert_eq!(board.outcome(), Outcome::Ongoing);
    }

    #[test]
    fn test_window_count() {
        let all: Vec<_> = windows().collect();
        assert_eq!(all.len(), 69);

        let rising = all
            .iter()
            .filter(|w| w[1].0 == w[0].0 + 1 && w[1].1 == w[0].1 + 1)
            .count();
        let falling = all
            .iter()
            .filter(|w| w[0].0 == w[1].0 + 1 && w[1].1 == w[0].1 + 1)
            .count();
        assert_eq!(rising, 12);
        assert_eq!(falling, 12);
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let mut board = Board::new();
        board.drop(3, Cell::Human).unwrap();
        board.drop(3, Cell::Ai).unwrap();
        board.drop(0, Cell::Ai).unwrap();

        let parsed: Board = board.to_string().parse().unwrap();
        assert_eq!(parsed, board);
    }

    #[test]
    fn test_parse_rejects_floating_piece() {
        let result: Result<Board, _> = "
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . X . . .
            . . . . . . .
            "
        .parse();
        assert!(matches!(result, Err(BoardError::Malformed { .. })));
    }

    #[test]
    fn test_parse_rejects_bad_dimensions_and_symbols() {
        assert!("......".parse::<Board>().is_err());
        let bad_symbol = ".......\n.......\n.......\n.......\n.......\n...Z...";
        assert!(bad_symbol.parse::<Board>().is_err());
        let short_row = ".......\n.......\n.......\n.......\n.......\n......";
        assert!(short_row.parse::<Board>().is_err());
    }
}
