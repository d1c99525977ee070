use dark_xiangqi::board::{Board, GameState, Layout};
use dark_xiangqi::location::Location;
use dark_xiangqi::piece::Color;
use dark_xiangqi::selector::{select_move, select_move_with};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn loc(x: i8, y: i8) -> Location {
    Location::from_xy(x, y).unwrap()
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn selects_a_legal_move_and_restores_the_board() {
    init_logs();
    let mut board = Board::opening();
    let before = board.fen();

    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mv = select_move_with(&mut board, Color::Red, &mut rng);
        assert_eq!(board.fen(), before, "seed {seed} left the board dirty");
        assert_eq!(mv.piece.color, Color::Red);
        assert!(
            board.legal_moves(mv.from).contains(&mv.to),
            "seed {seed} selected illegal {mv}"
        );
    }

    let mv = select_move(&mut board, Color::Black);
    assert_eq!(mv.piece.color, Color::Black);
    assert!(board.legal_moves(mv.from).contains(&mv.to));
}

#[test]
fn takes_an_immediate_mate() {
    init_logs();
    let mut board = Board::from_fen("4k4/9/9/9/9/9/9/9/2R2R3/3K5").unwrap();
    let before = board.fen();

    // the one mating move in this position: the c-file rook swings to the
    // general's file while its twin keeps the other flight square covered
    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mv = select_move_with(&mut board, Color::Red, &mut rng);
        assert_eq!((mv.from, mv.to), (loc(2, 1), loc(4, 1)), "seed {seed}");
        assert_eq!(board.fen(), before);
    }

    let mut rng = StdRng::seed_from_u64(0);
    let mv = select_move_with(&mut board, Color::Red, &mut rng);
    board.play(mv);
    assert_eq!(board.state(), GameState::CheckedMate);
}

#[test]
fn prefers_a_checking_move() {
    let mut board = Board::from_fen("4k4/9/9/9/9/8R/9/9/9/3K5").unwrap();
    let before = board.fen();

    // neither rook check is mate here, so the bucket preference decides
    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mv = select_move_with(&mut board, Color::Red, &mut rng);
        assert_eq!(board.fen(), before);
        assert_eq!(mv.from, loc(8, 4), "seed {seed} chose {mv}");
        assert!([loc(4, 4), loc(8, 9)].contains(&mv.to), "seed {seed} chose {mv}");

        board.play(mv);
        assert!(board.is_checked(Color::Black));
        board.undo(mv);
        assert_eq!(board.fen(), before);
    }
}

#[test]
#[should_panic]
fn panics_without_a_legal_move() {
    let mut board = Board::from_fen("4k4/9/9/9/9/9/9/9/3R1R3/4K4").unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let _ = select_move_with(&mut board, Color::Black, &mut rng);
}

#[test]
fn plays_a_dark_game_to_the_end() {
    init_logs();
    let mut rng = StdRng::seed_from_u64(123);
    let mut board = Board::from_layout(Layout::random_hidden_with(&mut rng)).unwrap();
    let mut color = Color::Red;

    for _ in 0..24 {
        if !board.has_any_legal_move(color) {
            break;
        }

        let mv = select_move_with(&mut board, color, &mut rng);
        assert_eq!(mv.piece.color, color);
        assert!(board.legal_moves(mv.from).contains(&mv.to), "illegal {mv}");

        board.play(mv);
        assert!(!board[mv.to].unwrap().hidden);

        match board.state() {
            GameState::CheckedMate | GameState::StaleMate => break,
            GameState::Checked => assert!(board.is_checked(color.opponent())),
            GameState::Normal => assert!(!board.is_checked(color.opponent())),
        }

        color = color.opponent();
    }
}
