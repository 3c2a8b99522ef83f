use connect4::{GameEngine, GameError, GameStatus, Player};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[test]
fn random_legal_games_keep_engine_invariants() {
    let mut rng = StdRng::seed_from_u64(0x0c4);
    for _ in 0..200 {
        let width = rng.gen_range(4..=9);
        let height = rng.gen_range(4..=8);
        let mut engine = GameEngine::create(width, height).unwrap();
        let mut previous = engine.board().clone();
        let mut last_mover: Option<Player> = None;

        while let Some(&column) = engine.legal_columns().choose(&mut rng) {
            let mover = engine.current_player();
            let result = engine.drop_piece(column).unwrap();
            let board = engine.board();

            assert_eq!(result.placed_by, mover);
            if let Some(last) = last_mover {
                assert_eq!(mover, last.opponent());
            }
            assert_eq!(board.occupied(), engine.moves_played());
            assert!(board.occupied() <= width * height);

            // Earlier pieces never move; exactly one new piece appears.
            for row in 0..height {
                for col in 0..width {
                    if previous.get(row, col).is_some() {
                        assert_eq!(previous.get(row, col), board.get(row, col));
                    }
                }
            }
            assert_eq!(board.get(result.row, result.column), Some(mover));
            assert_eq!(previous.get(result.row, result.column), None);

            // The incremental check agrees with a full scan.
            let scanned = board.contains_four(mover);
            assert_eq!(scanned, result.status == GameStatus::Won(mover));
            assert!(!board.contains_four(mover.opponent()));

            previous = board.clone();
            last_mover = Some(mover);
        }

        let status = engine.status();
        assert!(status.is_terminal());
        if status == GameStatus::Draw {
            assert!(engine.board().is_full());
        }
        if let GameStatus::Won(winner) = status {
            assert_eq!(engine.current_player(), winner);
        }
        let before = engine.clone();
        for column in 0..width {
            assert_eq!(engine.drop_piece(column), Err(GameError::GameAlreadyOver));
        }
        assert_eq!(engine, before);
    }
}

#[test]
fn full_column_never_mutates_the_board() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut engine = GameEngine::create(6, 4).unwrap();
    // Fill column 0 with alternating owners, no run of four possible.
    for _ in 0..4 {
        engine.drop_piece(0).unwrap();
    }
    for _ in 0..20 {
        if engine.status().is_terminal() {
            break;
        }
        let before = engine.clone();
        assert_eq!(engine.drop_piece(0), Err(GameError::ColumnFull { column: 0 }));
        assert_eq!(engine, before);
        let other = rng.gen_range(1..6);
        if engine.board().is_column_full(other) {
            break;
        }
        engine.drop_piece(other).unwrap();
    }
}
