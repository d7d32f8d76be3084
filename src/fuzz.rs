use rand::{Rng, rngs::SmallRng};
use rustc_hash::FxHashSet;

use crate::{game::Game, moves::Move, piece::PieceKind, square::Square};

impl From<chess::Square> for Square {
    fn from(value: chess::Square) -> Self {
        let row = u8::try_from(value.get_rank().to_index()).unwrap_or_default();
        let column = u8::try_from(value.get_file().to_index()).unwrap_or_default();
        Square::new(row, column)
    }
}
impl From<chess::Piece> for PieceKind {
    fn from(value: chess::Piece) -> Self {
        match value {
            chess::Piece::Pawn => PieceKind::Pawn,
            chess::Piece::Knight => PieceKind::Knight,
            chess::Piece::Bishop => PieceKind::Bishop,
            chess::Piece::Rook => PieceKind::Rook,
            chess::Piece::Queen => PieceKind::Queen,
            chess::Piece::King => PieceKind::King,
        }
    }
}

/// Origin and destination of a move; promotions to different pieces share
/// one entry, the way legal moves are listed.
type Route = (Square, Square);

fn reference_routes(game: &Game) -> FxHashSet<Route> {
    let fen = game.fen();
    let board: chess::Board = fen
        .parse()
        .unwrap_or_else(|err| panic!("reference rejected {fen}: {err}"));
    chess::MoveGen::new_legal(&board)
        .map(|movement| {
            let from: Square = movement.get_source().into();
            let mut to: Square = movement.get_dest().into();
            // the reference moves the king two squares when castling
            if board.piece_on(movement.get_source()).map(PieceKind::from) == Some(PieceKind::King)
                && from.column().abs_diff(to.column()) == 2
            {
                to = to.with_column(if to.column() > from.column() { 7 } else { 0 });
            }
            (from, to)
        })
        .collect()
}

fn failure(game: &Game, message: &str) -> ! {
    panic!(
        "{message}\n{}\n{}\n{}\nhistory: {}",
        game.board(),
        game.description(),
        game.fen(),
        game.history_as_move_string(None)
    );
}

/// Plays random games, checking every position's legal moves against the
/// `chess` crate and every move against an apply/undo round trip. Runs for
/// `plies` half-moves, or forever when `None`.
///
/// # Panics
///
/// Panics with the offending position on the first disagreement.
pub fn fuzz(plies: Option<u64>, rng: &mut SmallRng) {
    let mut game = Game::new();
    let mut played = 0;
    while plies.is_none_or(|plies| played < plies) {
        let moves = game.legal_moves();
        let routes: FxHashSet<Route> = moves
            .iter()
            .map(|movement| (movement.from, movement.to))
            .collect();
        let reference = reference_routes(&game);
        if let Some((from, to)) = routes.difference(&reference).next() {
            failure(&game, &format!("{} is listed but not legal", Move::new(*from, *to)));
        }
        if let Some((from, to)) = reference.difference(&routes).next() {
            failure(&game, &format!("{} is legal but not listed", Move::new(*from, *to)));
        }
        if moves.is_empty() {
            game = Game::new();
            continue;
        }
        let mut movement = moves[rng.random_range(0..moves.len())];
        if game
            .piece_at(movement.from)
            .is_some_and(|piece| piece.kind() == PieceKind::Pawn)
            && (movement.to.row() == 0 || movement.to.row() == 7)
        {
            let choices = PieceKind::PROMOTION_CHOICES;
            movement = movement.with_promotion(choices[rng.random_range(0..choices.len())]);
        }
        let before = game.description();
        if let Err(err) = game.apply(movement) {
            failure(&game, &err.to_string());
        }
        game.undo();
        if game.description() != before {
            failure(&game, &format!("undoing {movement} did not restore {before}"));
        }
        let result = game
            .apply(movement)
            .unwrap_or_else(|err| failure(&game, &err.to_string()));
        played += 1;
        if result.is_over() {
            game = Game::new();
        }
    }
}
