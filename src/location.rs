use crate::board::Board;
use crate::piece::Piece;
use std::fmt::Formatter;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Location {
    x: i8,
    y: i8,
}

/// A move as a value record: the piece as it stood on `from` and whatever
/// occupied `to` before the move. Enough to apply the move forward and to
/// reverse it exactly, hidden flags included.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Move {
    pub piece: Piece,
    pub from: Location,
    pub to: Location,
    pub captured: Option<Piece>,
}

impl Location {
    pub fn new() -> Self {
        Self { x: 0, y: 0 }
    }

    pub fn from_xy(x: i8, y: i8) -> Option<Self> {
        Self::new().shift_xy(x, y)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index > i8::MAX as usize {
            return None;
        }
        let x = index as i8 % Board::WIDTH;
        let y = index as i8 / Board::WIDTH;
        Self::from_xy(x, y)
    }

    pub fn shift_x(&self, delta: i8) -> Option<Self> {
        let new_x = self.x + delta;
        if 0 > new_x || new_x >= Board::WIDTH {
            return None;
        }
        Some(Self { x: new_x, y: self.y })
    }

    pub fn shift_y(&self, delta: i8) -> Option<Self> {
        let new_y = self.y + delta;
        if 0 > new_y || new_y >= Board::HEIGHT {
            return None;
        }
        Some(Self { x: self.x, y: new_y })
    }

    pub fn shift_xy(&self, x: i8, y: i8) -> Option<Self> {
        self.shift_x(x)?.shift_y(y)
    }

    pub fn index(&self) -> usize {
        (self.x + self.y * Board::WIDTH) as usize
    }

    pub fn x(&self) -> i8 {
        self.x
    }

    pub fn y(&self) -> i8 {
        self.y
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.x as u8) as char, self.y)
    }
}

impl Move {
    /// Snapshots `from` and `to` on the given board; does not mutate it.
    pub fn new(board: &Board, from: Location, to: Location) -> Self {
        Self {
            piece: board[from].unwrap(),
            from,
            to,
            captured: board[to],
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifts_stay_on_the_board() {
        let corner = Location::from_xy(0, 0).unwrap();
        assert_eq!(corner.shift_x(-1), None);
        assert_eq!(corner.shift_y(-1), None);
        assert_eq!(corner.shift_xy(8, 9), Location::from_xy(8, 9));
        assert_eq!(corner.shift_xy(9, 0), None);
        assert_eq!(corner.shift_xy(0, 10), None);
    }

    #[test]
    fn index_round_trip() {
        for index in 0..(Board::WIDTH as usize * Board::HEIGHT as usize) {
            let location = Location::from_index(index).unwrap();
            assert_eq!(location.index(), index);
        }
        assert_eq!(Location::from_index(90), None);
    }

    #[test]
    fn display_is_file_then_rank() {
        assert_eq!(Location::from_xy(4, 0).unwrap().to_string(), "e0");
        assert_eq!(Location::from_xy(8, 9).unwrap().to_string(), "i9");
    }
}
