use crate::display_format::DisplayFormat;
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn opponent(&self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PieceKind {
    General,
    Advisor,
    Elephant,
    Horse,
    Rook,
    Cannon,
    Pawn,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::General,
        PieceKind::Advisor,
        PieceKind::Elephant,
        PieceKind::Horse,
        PieceKind::Rook,
        PieceKind::Cannon,
        PieceKind::Pawn,
    ];
}

/// A piece on the board. A hidden piece keeps its true kind concealed until it
/// moves; generals are never hidden.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
    pub hidden: bool,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind, hidden: false }
    }

    pub fn new_hidden(color: Color, kind: PieceKind) -> Self {
        debug_assert!(kind != PieceKind::General, "a general cannot be hidden");
        Self { color, kind, hidden: true }
    }

    pub fn reveal(self) -> Self {
        Self { hidden: false, ..self }
    }

    pub fn from_fen_char(value: char) -> Option<Self> {
        let kind = match value.to_ascii_lowercase() {
            'k' => PieceKind::General,
            'a' => PieceKind::Advisor,
            'e' => PieceKind::Elephant,
            'h' => PieceKind::Horse,
            'r' => PieceKind::Rook,
            'c' => PieceKind::Cannon,
            'p' => PieceKind::Pawn,
            _ => return None,
        };

        let color = if value.is_ascii_uppercase() { Color::Red } else { Color::Black };
        Some(Self::new(color, kind))
    }

    pub fn fen_char(&self) -> char {
        let result = if self.hidden {
            'x'
        } else {
            match self.kind {
                PieceKind::General => 'k',
                PieceKind::Advisor => 'a',
                PieceKind::Elephant => 'e',
                PieceKind::Horse => 'h',
                PieceKind::Rook => 'r',
                PieceKind::Cannon => 'c',
                PieceKind::Pawn => 'p',
            }
        };
        if self.color == Color::Red {
            result.to_ascii_uppercase()
        } else {
            result
        }
    }

    pub fn chinese_char(&self) -> char {
        if self.hidden {
            return '暗';
        }
        match (self.color, self.kind) {
            (Color::Red, PieceKind::General) => '帥',
            (Color::Red, PieceKind::Advisor) => '仕',
            (Color::Red, PieceKind::Elephant) => '相',
            (Color::Red, PieceKind::Horse) => '傌',
            (Color::Red, PieceKind::Rook) => '俥',
            (Color::Red, PieceKind::Cannon) => '炮',
            (Color::Red, PieceKind::Pawn) => '兵',
            (Color::Black, PieceKind::General) => '將',
            (Color::Black, PieceKind::Advisor) => '士',
            (Color::Black, PieceKind::Elephant) => '象',
            (Color::Black, PieceKind::Horse) => '馬',
            (Color::Black, PieceKind::Rook) => '車',
            (Color::Black, PieceKind::Cannon) => '砲',
            (Color::Black, PieceKind::Pawn) => '卒',
        }
    }

    pub fn display(&self, format: DisplayFormat) -> impl Display {
        let shown = if format.reveal { self.reveal() } else { *self };
        let tile = if format.chinese {
            shown.chinese_char().to_string()
        } else {
            let c = shown.fen_char();
            format!("{c}{c}")
        };
        if self.color == Color::Red {
            format!("\x1B[31m{tile}\x1b[0m")
        } else {
            tile
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display(DisplayFormat::pretty()))
    }
}
