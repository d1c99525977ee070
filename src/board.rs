use crate::display_format::DisplayFormat;
use crate::location::{Location, Move};
use crate::piece::{Color, Piece, PieceKind};
use log::trace;
use rand::Rng;
use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};
use thiserror::Error;

#[derive(Copy, Clone)]
struct Rect {
    x: i8,
    y: i8,
    width: i8,
    height: i8,
}

impl Rect {
    fn contains(&self, location: Location) -> bool {
        let (x, y) = (location.x(), location.y());
        self.x <= x && x < self.x + self.width && self.y <= y && y < self.y + self.height
    }
}

const BOARD: Rect = Rect { x: 0, y: 0, width: 9, height: 10 };

// Own-half and palace rectangles, indexed by Color::index.
const SIDES: [Rect; 2] = [
    Rect { x: 0, y: 0, width: 9, height: 5 },
    Rect { x: 0, y: 5, width: 9, height: 5 },
];
const PALACES: [Rect; 2] = [
    Rect { x: 3, y: 0, width: 3, height: 3 },
    Rect { x: 3, y: 7, width: 3, height: 3 },
];

const ORTHOGONALS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, 1), (0, -1)];
const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (1, 1), (-1, 1), (1, -1)];

// One orthogonal step paired with the two diagonal continuations away from it.
const HORSE_STEPS: [((i8, i8), [(i8, i8); 2]); 4] = [
    ((-1, 0), [(-1, 1), (-1, -1)]),
    ((1, 0), [(1, 1), (1, -1)]),
    ((0, 1), [(-1, 1), (1, 1)]),
    ((0, -1), [(-1, -1), (1, -1)]),
];

/// A starting arrangement of pieces, only ever consumed by [`Board::from_layout`].
#[derive(Clone)]
pub struct Layout {
    squares: Vec<Option<Piece>>,
}

impl Layout {
    pub fn empty() -> Self {
        Self { squares: vec![None; (Board::WIDTH * Board::HEIGHT) as usize] }
    }

    pub fn opening() -> Self {
        Self::from_fen("rheakaehr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RHEAKAEHR").unwrap()
    }

    pub fn from_fen(fen: &str) -> Option<Self> {
        let mut layout = Self::empty();
        let mut y = Board::HEIGHT - 1;
        let mut x = 0;

        for current in fen.chars() {
            match current {
                ' ' => break,
                '/' => {
                    if x != Board::WIDTH || y == 0 {
                        return None;
                    }
                    x = 0;
                    y -= 1;
                }
                '0'..='9' => x += current.to_digit(10).unwrap() as i8,
                _ => {
                    let piece = Piece::from_fen_char(current)?;
                    layout[Location::from_xy(x, y)?] = Some(piece);
                    x += 1;
                }
            }
        }

        Some(layout)
    }

    pub fn random_hidden() -> Self {
        Self::random_hidden_with(&mut rand::rng())
    }

    /// The opening arrangement with every non-general square re-dealt a random
    /// kind from the same per-color multiset, face-down. Generals stay where
    /// they are, face-up.
    pub fn random_hidden_with(random: &mut impl Rng) -> Self {
        let pool: Vec<PieceKind> = [
            (PieceKind::Pawn, 5),
            (PieceKind::Cannon, 2),
            (PieceKind::Rook, 2),
            (PieceKind::Horse, 2),
            (PieceKind::Elephant, 2),
            (PieceKind::Advisor, 2),
        ]
        .iter()
        .flat_map(|&(kind, count)| std::iter::repeat_n(kind, count))
        .collect();

        let mut pools = [pool.clone(), pool];
        let mut layout = Self::opening();

        for index in 0..layout.squares.len() {
            let location = Location::from_index(index).unwrap();
            let Some(piece) = layout[location] else { continue };
            if piece.kind == PieceKind::General {
                continue;
            }

            let pool = &mut pools[piece.color.index()];
            let kind = pool.swap_remove(random.random_range(0..pool.len()));
            layout[location] = Some(Piece::new_hidden(piece.color, kind));
        }

        layout
    }
}

impl Index<Location> for Layout {
    type Output = Option<Piece>;
    fn index(&self, index: Location) -> &Self::Output {
        &self.squares[index.index()]
    }
}

impl IndexMut<Location> for Layout {
    fn index_mut(&mut self, index: Location) -> &mut Self::Output {
        &mut self.squares[index.index()]
    }
}

#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum LayoutError {
    #[error("hidden general at {0}")]
    HiddenGeneral(Location),
    #[error("no {0:?} general")]
    MissingGeneral(Color),
}

/// Position classification for the side about to move.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameState {
    Normal,
    Checked,
    CheckedMate, // in check with no legal move
    StaleMate,   // no legal move and no check
}

#[derive(Clone)]
pub struct Board {
    pieces: Vec<Option<Piece>>,
    generals: [Location; 2],
    hidden_rule: bool,
    state: GameState,
}

impl Board {
    pub const WIDTH: i8 = 9;
    pub const HEIGHT: i8 = 10;

    pub fn opening() -> Self {
        Self::from_layout(Layout::opening()).unwrap()
    }

    pub fn from_fen(fen: &str) -> Option<Self> {
        Self::from_layout(Layout::from_fen(fen)?).ok()
    }

    /// The hidden-piece rule switches on board-wide when any starting piece is
    /// face-down; it never changes afterwards, even once everything is flipped.
    pub fn from_layout(layout: Layout) -> Result<Self, LayoutError> {
        let mut generals = [None; 2];
        let mut hidden_rule = false;

        for (index, piece) in layout.squares.iter().enumerate() {
            let Some(piece) = *piece else { continue };
            let location = Location::from_index(index).unwrap();
            hidden_rule |= piece.hidden;

            if piece.kind == PieceKind::General {
                if piece.hidden {
                    return Err(LayoutError::HiddenGeneral(location));
                }
                generals[piece.color.index()] = Some(location);
            }
        }

        let generals = [
            generals[0].ok_or(LayoutError::MissingGeneral(Color::Red))?,
            generals[1].ok_or(LayoutError::MissingGeneral(Color::Black))?,
        ];

        Ok(Self {
            pieces: layout.squares,
            generals,
            hidden_rule,
            state: GameState::Normal,
        })
    }

    pub fn general(&self, color: Color) -> Location {
        self.generals[color.index()]
    }

    pub fn hidden_rule(&self) -> bool {
        self.hidden_rule
    }

    /// State of the side to move next, as of the last committed move.
    pub fn state(&self) -> GameState {
        self.state
    }

    // Kind the opening layout places on a square. A face-down piece moves by
    // this square identity, not by its concealed true kind.
    fn opening_kind(location: Location) -> Option<PieceKind> {
        match (location.x(), location.y()) {
            (x, 0 | 9) => Some(match x {
                0 | 8 => PieceKind::Rook,
                1 | 7 => PieceKind::Horse,
                2 | 6 => PieceKind::Elephant,
                3 | 5 => PieceKind::Advisor,
                _ => PieceKind::General,
            }),
            (1 | 7, 2 | 7) => Some(PieceKind::Cannon),
            (0 | 2 | 4 | 6 | 8, 3 | 6) => Some(PieceKind::Pawn),
            _ => None,
        }
    }

    /// Destinations reachable by piece-movement rules alone, self-check
    /// ignored. A fresh list every call.
    pub fn pseudo_moves(&self, from: Location) -> Vec<Location> {
        let piece = self[from].unwrap();
        let side = SIDES[piece.color.index()];
        let palace = PALACES[piece.color.index()];
        let friendly = |to: Location| self[to].is_some_and(|other| other.color == piece.color);

        let kind = if piece.hidden {
            Self::opening_kind(from).unwrap()
        } else {
            piece.kind
        };

        let mut moves = Vec::new();

        match kind {
            PieceKind::General => {
                for step in ORTHOGONALS {
                    let Some(to) = from.shift_xy(step.0, step.1) else { continue };
                    if palace.contains(to) && !friendly(to) {
                        moves.push(to);
                    }
                }
            }
            PieceKind::Advisor => {
                // a revealed advisor escapes the palace under the hidden rule
                let anywhere = self.hidden_rule && !piece.hidden;
                for step in DIAGONALS {
                    let Some(to) = from.shift_xy(step.0, step.1) else { continue };
                    if (anywhere || palace.contains(to)) && !friendly(to) {
                        moves.push(to);
                    }
                }
            }
            PieceKind::Elephant => {
                // the river stops an elephant only in the standard game
                let range = if self.hidden_rule { BOARD } else { side };
                for step in DIAGONALS {
                    let Some(eye) = from.shift_xy(step.0, step.1) else { continue };
                    if !range.contains(eye) || self[eye].is_some() {
                        continue;
                    }
                    let Some(to) = eye.shift_xy(step.0, step.1) else { continue };
                    if range.contains(to) && !friendly(to) {
                        moves.push(to);
                    }
                }
            }
            PieceKind::Horse => {
                for (ortho, diagonals) in HORSE_STEPS {
                    let Some(leg) = from.shift_xy(ortho.0, ortho.1) else { continue };
                    if self[leg].is_some() {
                        continue;
                    }
                    for diagonal in diagonals {
                        let Some(to) = leg.shift_xy(diagonal.0, diagonal.1) else { continue };
                        if !friendly(to) {
                            moves.push(to);
                        }
                    }
                }
            }
            PieceKind::Rook => {
                for step in ORTHOGONALS {
                    let mut cursor = from;
                    while let Some(to) = cursor.shift_xy(step.0, step.1) {
                        cursor = to;
                        match self[to] {
                            None => moves.push(to),
                            Some(other) => {
                                if other.color != piece.color {
                                    moves.push(to);
                                }
                                break;
                            }
                        }
                    }
                }
            }
            PieceKind::Cannon => {
                for step in ORTHOGONALS {
                    let mut cursor = from;
                    while let Some(to) = cursor.shift_xy(step.0, step.1) {
                        cursor = to;
                        if self[to].is_none() {
                            moves.push(to);
                            continue;
                        }
                        // first piece met is the screen; capture the first one behind it
                        while let Some(target) = cursor.shift_xy(step.0, step.1) {
                            cursor = target;
                            let Some(other) = self[target] else { continue };
                            if other.color != piece.color {
                                moves.push(target);
                            }
                            break;
                        }
                        break;
                    }
                }
            }
            PieceKind::Pawn => {
                let forward = if piece.color == Color::Red { 1 } else { -1 };
                if let Some(to) = from.shift_y(forward)
                    && !friendly(to)
                {
                    moves.push(to);
                }
                // across the river a pawn also steps sideways, never backward
                if !side.contains(from) {
                    for step in [ORTHOGONALS[0], ORTHOGONALS[1]] {
                        if let Some(to) = from.shift_xy(step.0, step.1)
                            && !friendly(to)
                        {
                            moves.push(to);
                        }
                    }
                }
            }
        }

        moves
    }

    pub fn is_checked(&self, color: Color) -> bool {
        let general = self.general(color);
        let enemy = |location: Location, kind: PieceKind| {
            self[location].is_some_and(|piece| piece.color != color && piece.kind == kind)
        };

        // diagonal advisor and elephant threats exist only under the hidden rule
        if self.hidden_rule {
            for step in DIAGONALS {
                let Some(adjacent) = general.shift_xy(step.0, step.1) else { continue };
                match self[adjacent] {
                    Some(piece) => {
                        if piece.color != color && piece.kind == PieceKind::Advisor {
                            return true;
                        }
                    }
                    None => {
                        if let Some(eye) = adjacent.shift_xy(step.0, step.1)
                            && enemy(eye, PieceKind::Elephant)
                        {
                            return true;
                        }
                    }
                }
            }
        }

        // approach squares: rooks and pawns occupy them, horses strike over
        // them; a pawn directly behind the general can never check
        let behind = match color {
            Color::Red => general.shift_y(-1),
            Color::Black => general.shift_y(1),
        };
        for (ortho, diagonals) in HORSE_STEPS {
            let Some(approach) = general.shift_xy(ortho.0, ortho.1) else { continue };
            match self[approach] {
                Some(piece) => {
                    if piece.color != color
                        && (piece.kind == PieceKind::Rook
                            || (piece.kind == PieceKind::Pawn && Some(approach) != behind))
                    {
                        return true;
                    }
                }
                None => {
                    for diagonal in diagonals {
                        if let Some(hop) = approach.shift_xy(diagonal.0, diagonal.1)
                            && enemy(hop, PieceKind::Horse)
                        {
                            return true;
                        }
                    }
                }
            }
        }

        // flying general: both generals on one open file face each other
        let opponent = self.general(color.opponent());
        if general.x() == opponent.x() {
            let forward = if color == Color::Red { 1 } else { -1 };
            let mut cursor = general;
            while let Some(next) = cursor.shift_y(forward) {
                cursor = next;
                if cursor == opponent {
                    return true;
                }
                if self[cursor].is_some() {
                    break;
                }
            }
        }

        // revealed rooks and cannons anywhere on the general's rank or file
        let rank = (0..Self::WIDTH).map(|x| Location::from_xy(x, general.y()).unwrap());
        let file = (0..Self::HEIGHT).map(|y| Location::from_xy(general.x(), y).unwrap());
        for from in rank.chain(file) {
            let Some(piece) = self[from] else { continue };
            if piece.hidden
                || piece.color == color
                || !matches!(piece.kind, PieceKind::Rook | PieceKind::Cannon)
            {
                continue;
            }
            if self.pseudo_moves(from).contains(&general) {
                return true;
            }
        }

        false
    }

    // Raw forward or reverse application. Forward always flips the mover
    // face-up; reverse restores the exact prior values, hidden flags included.
    pub(crate) fn place(&mut self, mv: &Move, reverse: bool) {
        if reverse {
            self[mv.from] = Some(mv.piece);
            self[mv.to] = mv.captured;
        } else {
            self[mv.from] = None;
            self[mv.to] = Some(mv.piece.reveal());
        }
        if mv.piece.kind == PieceKind::General {
            self.generals[mv.piece.color.index()] = if reverse { mv.from } else { mv.to };
        }
    }

    /// Pseudo-moves that do not leave the mover's own general in check. Probes
    /// by applying and reversing each candidate; the board always comes back
    /// exactly as it was.
    pub fn legal_moves(&mut self, from: Location) -> Vec<Location> {
        let color = self[from].unwrap().color;
        let mut moves = Vec::new();

        for to in self.pseudo_moves(from) {
            let mv = Move::new(self, from, to);
            self.place(&mv, false);
            if !self.is_checked(color) {
                moves.push(to);
            }
            self.place(&mv, true);
        }

        moves
    }

    /// Like [`legal_moves`](Self::legal_moves) but stops at the first survivor.
    pub fn has_legal_move(&mut self, from: Location) -> bool {
        let color = self[from].unwrap().color;

        for to in self.pseudo_moves(from) {
            let mv = Move::new(self, from, to);
            self.place(&mv, false);
            let checked = self.is_checked(color);
            self.place(&mv, true);
            if !checked {
                return true;
            }
        }

        false
    }

    pub fn has_any_legal_move(&mut self, color: Color) -> bool {
        for index in 0..self.pieces.len() {
            let location = Location::from_index(index).unwrap();
            if self[location].is_some_and(|piece| piece.color == color)
                && self.has_legal_move(location)
            {
                return true;
            }
        }
        false
    }

    /// Commits a move and classifies the opponent's resulting state.
    pub fn play(&mut self, mv: Move) {
        self.place(&mv, false);
        self.state = self.classify(mv.piece.color.opponent());
        trace!("played {mv}, {:?} is {:?}", mv.piece.color.opponent(), self.state);
    }

    /// Rolls a committed move back. Only the mover's own check status is
    /// meaningful afterwards, so classification stops at Checked or Normal.
    pub fn undo(&mut self, mv: Move) {
        self.place(&mv, true);
        self.state = if self.is_checked(mv.piece.color) {
            GameState::Checked
        } else {
            GameState::Normal
        };
        trace!("undid {mv}");
    }

    fn classify(&mut self, color: Color) -> GameState {
        match (self.is_checked(color), self.has_any_legal_move(color)) {
            (false, true) => GameState::Normal,
            (true, true) => GameState::Checked,
            (true, false) => GameState::CheckedMate,
            (false, false) => GameState::StaleMate,
        }
    }

    pub fn fen(&self) -> String {
        let mut result = String::new();

        for y in (0..Self::HEIGHT).rev() {
            let mut empty = 0u32;
            for x in 0..Self::WIDTH {
                match self[Location::from_xy(x, y).unwrap()] {
                    None => empty += 1,
                    Some(piece) => {
                        if empty > 0 {
                            result.push(char::from_digit(empty, 10).unwrap());
                            empty = 0;
                        }
                        result.push(piece.fen_char());
                    }
                }
            }
            if empty > 0 {
                result.push(char::from_digit(empty, 10).unwrap());
            }
            if y > 0 {
                result.push('/');
            }
        }

        result
    }

    pub fn display(&self, format: DisplayFormat) -> impl Display {
        struct Impl<'a>(&'a Board, DisplayFormat);
        return Impl(self, format);

        impl Display for Impl<'_> {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                let &Self(board, format) = self;
                for y in (0..Board::HEIGHT).rev() {
                    write!(f, "{y} ")?;
                    for x in 0..Board::WIDTH {
                        if let Some(piece) = board[Location::from_xy(x, y).unwrap()] {
                            write!(f, "{} ", piece.display(format))?;
                        } else {
                            write!(f, "   ")?;
                        }
                    }
                    writeln!(f)?;
                }
                for char in 'A'..='I' {
                    write!(f, "  {char}")?;
                }
                writeln!(f)
            }
        }
    }
}

impl Index<Location> for Board {
    type Output = Option<Piece>;
    fn index(&self, index: Location) -> &Self::Output {
        &self.pieces[index.index()]
    }
}

impl IndexMut<Location> for Board {
    fn index_mut(&mut self, index: Location) -> &mut Self::Output {
        &mut self.pieces[index.index()]
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display(DisplayFormat::pretty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_fen_round_trip() {
        let board = Board::opening();
        assert_eq!(
            board.fen(),
            "rheakaehr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RHEAKAEHR"
        );
    }

    #[test]
    fn opening_kinds_match_opening_layout() {
        let layout = Layout::opening();
        for index in 0..(Board::WIDTH as usize * Board::HEIGHT as usize) {
            let location = Location::from_index(index).unwrap();
            assert_eq!(
                layout[location].map(|piece| piece.kind),
                Board::opening_kind(location),
                "at {location}"
            );
        }
    }

    #[test]
    fn opening_board_basics() {
        let board = Board::opening();
        assert!(!board.hidden_rule());
        assert_eq!(board.state(), GameState::Normal);
        assert_eq!(board.general(Color::Red), Location::from_xy(4, 0).unwrap());
        assert_eq!(board.general(Color::Black), Location::from_xy(4, 9).unwrap());
    }

    #[test]
    fn hidden_general_rejected() {
        let mut layout = Layout::opening();
        let location = Location::from_xy(4, 9).unwrap();
        layout[location] = Some(Piece {
            color: Color::Black,
            kind: PieceKind::General,
            hidden: true,
        });
        assert_eq!(
            Board::from_layout(layout).err(),
            Some(LayoutError::HiddenGeneral(location))
        );
    }

    #[test]
    fn missing_general_rejected() {
        let mut layout = Layout::opening();
        layout[Location::from_xy(4, 0).unwrap()] = None;
        assert_eq!(
            Board::from_layout(layout).err(),
            Some(LayoutError::MissingGeneral(Color::Red))
        );
    }

    #[test]
    fn hidden_rule_derived_from_layout() {
        let mut layout = Layout::opening();
        layout[Location::from_xy(0, 3).unwrap()] =
            Some(Piece::new_hidden(Color::Red, PieceKind::Horse));
        assert!(Board::from_layout(layout).unwrap().hidden_rule());
    }

    #[test]
    fn bad_fen_rejected() {
        assert!(Layout::from_fen("8/9").is_none());
        assert!(Layout::from_fen("rheakaehr?/9/9/9/9/9/9/9/9/9").is_none());
    }

    #[test]
    fn display_masks_hidden_pieces() {
        let board = Board::from_layout(Layout::random_hidden()).unwrap();
        let shown = board.display(DisplayFormat::pretty().with_chinese(false)).to_string();
        assert!(shown.contains("xx") || shown.contains("XX"));
        assert!(shown.contains("kk") || shown.contains("KK"));
    }
}
