use crate::board::Board;
use crate::location::{Location, Move};
use crate::piece::Color;
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Picks a move for `color` with a fresh thread-local generator.
pub fn select_move(board: &mut Board, color: Color) -> Move {
    select_move_with(board, color, &mut rand::rng())
}

/// Picks a legal move for `color`: an immediate mate is taken outright the
/// moment one is found, otherwise the choice is random with moves that put the
/// opponent in check preferred over the rest. The board is mutated
/// speculatively while searching and always restored before returning.
///
/// Panics if `color` has no legal move; callers check for a terminal position
/// first.
pub fn select_move_with(board: &mut Board, color: Color, random: &mut impl Rng) -> Move {
    let mut own: Vec<Location> = (0..(Board::WIDTH as usize * Board::HEIGHT as usize))
        .filter_map(Location::from_index)
        .filter(|&location| board[location].is_some_and(|piece| piece.color == color))
        .collect();
    own.shuffle(random);

    let opponent = color.opponent();
    let mut check_moves: HashMap<Location, Vec<Location>> = HashMap::new();
    let mut normal_moves: HashMap<Location, Vec<Location>> = HashMap::new();

    for from in own {
        let mut candidates = board.pseudo_moves(from);
        candidates.shuffle(random);

        for to in candidates {
            let mv = Move::new(board, from, to);
            board.place(&mv, false);

            if board.is_checked(color) {
                board.place(&mv, true);
                continue;
            }

            if !board.has_any_legal_move(opponent) {
                // mate on the board; no point searching further
                board.place(&mv, true);
                debug!("selected mating move {mv}");
                return mv;
            }

            let checking = board.is_checked(opponent);
            board.place(&mv, true);

            let buckets = if checking { &mut check_moves } else { &mut normal_moves };
            buckets.entry(from).or_default().push(to);
        }
    }

    let buckets = if check_moves.is_empty() { &normal_moves } else { &check_moves };
    let origins: Vec<Location> = buckets.keys().copied().collect();
    let from = origins[random.random_range(0..origins.len())];
    let destinations = &buckets[&from];
    let to = destinations[random.random_range(0..destinations.len())];

    debug!(
        "selected {from}{to} out of {} origins ({} delivering check)",
        origins.len(),
        check_moves.len()
    );
    Move::new(board, from, to)
}
