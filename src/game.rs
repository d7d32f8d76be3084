use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use crate::{
    board::Board,
    color::Color,
    end_state::{GameResult, is_low_material},
    error::{IllegalMove, InvalidPosition},
    memento::Memento,
    movegen,
    moves::{ExtendedMove, Move, ParseMoveError},
    piece::{Piece, PieceKind},
    square::Square,
};

/// Picks the piece a pawn promotes to on the given square.
pub type PromotionChooser = Arc<dyn Fn(Square) -> PieceKind + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    movement: ExtendedMove,
    expired_en_passant: Option<Square>,
    half_moves: u32,
}

/// A game in progress: the board plus everything needed to judge draws and
/// to take moves back.
///
/// Move generation borrows the game mutably because it simulates moves on
/// the board; the board is always restored before the call returns.
#[derive(Clone)]
pub struct Game {
    board: Board,
    current_player: Color,
    half_moves: u32,
    mementos: Vec<Memento>,
    history: Vec<Entry>,
    piece_count: usize,
    choose_promotion: PromotionChooser,
}
impl Game {
    pub fn new() -> Self {
        Game::from_board(Board::starting_position(), Color::White, 0)
            .unwrap_or_else(|err| unreachable!("{err}"))
    }
    /// Starts a game from an arbitrary position after validating it.
    pub fn from_board(
        board: Board,
        current_player: Color,
        half_moves: u32,
    ) -> Result<Self, InvalidPosition> {
        board.validate(current_player)?;
        Ok(Game {
            mementos: vec![Memento::new(&board, current_player)],
            piece_count: board.piece_count(),
            board,
            current_player,
            half_moves,
            history: Vec::new(),
            choose_promotion: Arc::new(|_| PieceKind::Queen),
        })
    }
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn current_player(&self) -> Color {
        self.current_player
    }
    /// Half-moves since the last capture or pawn move.
    pub fn half_moves(&self) -> u32 {
        self.half_moves
    }
    pub fn piece_count(&self) -> usize {
        self.piece_count
    }
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.get(square)
    }
    pub fn is_check(&self, color: Color) -> bool {
        self.board.is_check(color)
    }
    pub fn set_promotion_chooser(
        &mut self,
        choose: impl Fn(Square) -> PieceKind + Send + Sync + 'static,
    ) {
        self.choose_promotion = Arc::new(choose);
    }
    /// Legal moves of the side to move. Promotions are listed once, without
    /// a promotion kind.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        movegen::legal_moves(&mut self.board, self.current_player)
    }
    /// Legal moves of the piece on `square`, empty unless it belongs to the
    /// side to move.
    pub fn legal_moves_from(&mut self, square: Square) -> Vec<Move> {
        if self.owns(square) {
            movegen::legal_moves_from(&mut self.board, square)
        } else {
            Vec::new()
        }
    }
    /// Whether the piece on `square` belongs to the side to move and has a
    /// legal move.
    pub fn is_selectable(&mut self, square: Square) -> bool {
        self.owns(square) && movegen::is_selectable(&mut self.board, square)
    }
    fn owns(&self, square: Square) -> bool {
        self.board
            .get(square)
            .is_some_and(|piece| piece.color == self.current_player)
    }
    /// Plays `movement` and reports the state of the game afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMove`] if the move is not legal; the game is left
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if `movement` starts on an empty square or on a piece of the
    /// side not to move.
    pub fn apply(&mut self, movement: Move) -> Result<GameResult, IllegalMove> {
        let Some(piece) = self.board.get(movement.from) else {
            panic!("no piece to move on {}", movement.from);
        };
        assert_eq!(
            piece.color, self.current_player,
            "{piece} moved on {}'s turn",
            self.current_player
        );
        let promotes = piece.kind() == PieceKind::Pawn
            && movement.to.row() == piece.color.promotion_row();
        if (movement.promotion.is_some() && !promotes)
            || !movegen::legal_moves_from(&mut self.board, movement.from).contains(&movement)
        {
            return Err(IllegalMove(movement));
        }
        let choose = &self.choose_promotion;
        let extended = self.board.classify(piece, movement, |square| choose(square));
        let expired_en_passant = self.board.execute(extended);
        self.history.push(Entry {
            movement: extended,
            expired_en_passant,
            half_moves: self.half_moves,
        });
        if extended.is_irreversible() {
            self.half_moves = 0;
        } else {
            self.half_moves = self.half_moves.saturating_add(1);
        }
        if extended.captured().is_some() {
            self.piece_count -= 1;
        }
        self.current_player = !self.current_player;
        self.mementos
            .push(Memento::new(&self.board, self.current_player));
        Ok(self.result())
    }
    /// Takes back the last move and returns it.
    ///
    /// # Panics
    ///
    /// Panics if no move has been played.
    pub fn undo(&mut self) -> ExtendedMove {
        let Some(entry) = self.history.pop() else {
            panic!("no move to undo");
        };
        self.board.revert(entry.movement, entry.expired_en_passant);
        self.mementos.pop();
        self.half_moves = entry.half_moves;
        if entry.movement.captured().is_some() {
            self.piece_count += 1;
        }
        self.current_player = !self.current_player;
        entry.movement
    }
    /// Judges the current position for the side to move.
    pub fn result(&mut self) -> GameResult {
        let player = self.current_player;
        if !movegen::has_legal_move(&mut self.board, player) {
            if self.board.is_check(player) {
                GameResult::Checkmate
            } else {
                GameResult::Stalemate
            }
        } else if is_low_material(&self.board) {
            GameResult::Draw
        } else if self.repetitions() >= 3 {
            GameResult::ThreeTimesSamePosition
        } else if self.half_moves >= 100 {
            GameResult::FiftyMovesNoHit
        } else {
            GameResult::Ongoing
        }
    }
    /// How many earlier positions equal the current one. Only the run of
    /// positions with the current piece count can match.
    fn repetitions(&self) -> usize {
        let Some((current, earlier)) = self.mementos.split_last() else {
            return 0;
        };
        earlier
            .iter()
            .rev()
            .take_while(|memento| memento.piece_count() == current.piece_count())
            .filter(|memento| *memento == current)
            .count()
    }
    /// Independent copies for parallel workers.
    pub fn replicate(&self, count: usize) -> Vec<Game> {
        (0..count).map(|_| self.clone()).collect()
    }
    pub fn history(&self) -> impl DoubleEndedIterator<Item = ExtendedMove> + '_ {
        self.history.iter().map(|entry| entry.movement)
    }
    /// Played moves separated by spaces, limited to the last `last` half
    /// moves when given.
    pub fn history_as_move_string(&self, last: Option<usize>) -> String {
        let skip = last.map_or(0, |last| self.history.len().saturating_sub(last));
        self.history[skip..]
            .iter()
            .map(|entry| entry.movement.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
    /// Parses move notation for this position. A king moving two squares
    /// towards an unmoved rook is read as castling, same as the king moving
    /// onto the rook.
    ///
    /// # Errors
    ///
    /// Returns [`ParseMoveError`] for malformed notation. Legality is checked
    /// by [`Game::apply`].
    pub fn parse_move(&self, s: &str) -> Result<Move, ParseMoveError> {
        let movement: Move = s.parse()?;
        if let Some(king) = self.board.get(movement.from)
            && king.kind() == PieceKind::King
            && king.steps() == Some(0)
            && movement.to.row() == movement.from.row()
            && movement.from.column().abs_diff(movement.to.column()) == 2
        {
            let column = if movement.to.column() > movement.from.column() {
                7
            } else {
                0
            };
            let rook = movement.to.with_column(column);
            if self.board.holds(rook, king.color, &[PieceKind::Rook]) {
                return Ok(Move { to: rook, ..movement });
            }
        }
        Ok(movement)
    }
}
impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
impl Debug for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("board", &self.board)
            .field("current_player", &self.current_player)
            .field("half_moves", &self.half_moves)
            .field("history", &self.history_as_move_string(None))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    use crate::{
        color::Color,
        end_state::GameResult,
        error::IllegalMove,
        game::Game,
        moves::Move,
        piece::PieceKind,
        square,
    };

    fn play(game: &mut Game, moves: &str) -> GameResult {
        let mut result = GameResult::Ongoing;
        for movement in moves.split_whitespace() {
            let movement = game.parse_move(movement).unwrap();
            result = game.apply(movement).unwrap();
        }
        result
    }

    #[test]
    fn apply_and_undo_flip_the_side() {
        let mut game = Game::new();
        let before = game.description();
        assert_eq!(game.current_player(), Color::White);
        play(&mut game, "e2-e4");
        assert_eq!(game.current_player(), Color::Black);
        game.undo();
        assert_eq!(game.current_player(), Color::White);
        assert_eq!(game.description(), before);
    }
    #[test]
    fn undo_restores_every_ply_of_random_games() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for _ in 0..8 {
            let mut game = Game::new();
            let mut descriptions = vec![game.description()];
            for _ in 0..120 {
                let moves = game.legal_moves();
                if moves.is_empty() {
                    break;
                }
                let movement = moves[rng.random_range(0..moves.len())];
                let result = game.apply(movement).unwrap();
                descriptions.push(game.description());
                if result.is_over() {
                    break;
                }
            }
            while let Some(expected) = descriptions.pop() {
                assert_eq!(game.description(), expected);
                if !descriptions.is_empty() {
                    game.undo();
                }
            }
            assert_eq!(game.half_moves(), 0);
            assert_eq!(game.piece_count(), 32);
        }
    }
    #[test]
    fn threefold_repetition_on_the_third_return() {
        let mut game = Game::new();
        let cycle = "g1-f3 b8-c6 f3-g1 c6-b8";
        assert_eq!(play(&mut game, cycle), GameResult::Ongoing);
        assert_eq!(play(&mut game, cycle), GameResult::Ongoing);
        assert_eq!(play(&mut game, "g1-f3 b8-c6 f3-g1"), GameResult::Ongoing);
        assert_eq!(
            play(&mut game, "c6-b8"),
            GameResult::ThreeTimesSamePosition
        );
    }
    #[test]
    fn fifty_move_rule() {
        let description = "white 98 King-white-e1-0 Rook-white-a1-1 Pawn-white-h2-false \
            King-black-e8-0 Knight-black-b8";
        let mut game = Game::from_description(description).unwrap();
        assert_eq!(play(&mut game, "a1-a2"), GameResult::Ongoing);
        assert_eq!(play(&mut game, "b8-c6"), GameResult::FiftyMovesNoHit);

        let mut game = Game::from_description(description).unwrap();
        assert_eq!(play(&mut game, "h2-h3"), GameResult::Ongoing);
        assert_eq!(game.half_moves(), 0);
        assert_eq!(play(&mut game, "b8-c6"), GameResult::Ongoing);
        assert_eq!(game.half_moves(), 1);
        game.undo();
        game.undo();
        assert_eq!(game.half_moves(), 98);
    }
    #[test]
    fn checkmate() {
        let mut game = Game::from_description(
            "black 0 King-white-e1-0 Queen-black-h2 Pawn-black-f3-false King-black-e8-0",
        )
        .unwrap();
        assert_eq!(play(&mut game, "h2-e2"), GameResult::Checkmate);
        assert!(game.is_check(Color::White));
        assert!(game.legal_moves().is_empty());
        assert_eq!(
            GameResult::Checkmate.winner(game.current_player()),
            Some(Color::Black)
        );
    }
    #[test]
    fn stalemate() {
        let mut game =
            Game::from_description("white 0 King-white-f7-1 Queen-white-g5 King-black-h8-3")
                .unwrap();
        assert_eq!(play(&mut game, "g5-g6"), GameResult::Stalemate);
    }
    #[test]
    fn en_passant() {
        let mut game = Game::from_description(
            "white 0 Pawn-white-c2-false Pawn-black-b4-false King-white-e1-0 King-black-e8-0",
        )
        .unwrap();
        play(&mut game, "c2-c4");
        assert!(game.piece_at(square!("c4")).unwrap().can_be_captured_en_passant());
        assert!(
            game.legal_moves()
                .contains(&Move::new(square!("b4"), square!("c3")))
        );

        let mut other = game.clone();
        play(&mut other, "e8-d8");
        assert!(!other.piece_at(square!("c4")).unwrap().can_be_captured_en_passant());
        other.undo();
        assert!(other.piece_at(square!("c4")).unwrap().can_be_captured_en_passant());

        play(&mut game, "b4-c3");
        assert_eq!(game.piece_at(square!("c4")), None);
        assert_eq!(game.piece_count(), 3);
        game.undo();
        assert!(game.piece_at(square!("c4")).unwrap().can_be_captured_en_passant());
        assert_eq!(game.piece_count(), 4);
    }
    #[test]
    fn castling() {
        let mut game = Game::from_description(
            "white 0 King-white-e1-0 Rook-white-h1-0 King-black-e8-0",
        )
        .unwrap();
        play(&mut game, "e1-h1");
        assert_eq!(
            game.description(),
            "black 1 Rook-white-f1-1 King-white-g1-1-true King-black-e8-0"
        );
        game.undo();
        assert_eq!(
            game.description(),
            "white 0 King-white-e1-0 Rook-white-h1-0 King-black-e8-0"
        );
        play(&mut game, "e1-g1");
        assert_eq!(game.history_as_move_string(None), "e1-h1");
    }
    #[test]
    fn queenside_castling() {
        let start = "white 0 King-white-e1-0 Rook-white-a1-0 King-black-e8-0";
        let mut game = Game::from_description(start).unwrap();
        play(&mut game, "e1-a1");
        assert_eq!(
            game.description(),
            "black 1 King-white-c1-1-true Rook-white-d1-1 King-black-e8-0"
        );
        game.undo();
        assert_eq!(game.description(), start);
        play(&mut game, "e1-c1");
        assert_eq!(game.history_as_move_string(None), "e1-a1");
    }
    #[test]
    fn counters_saturate() {
        let mut game = Game::from_description(
            "white 4294967295 King-white-e1-0 King-black-e8-0 Rook-white-a1-4294967295",
        )
        .unwrap();
        assert_eq!(play(&mut game, "a1-a2"), GameResult::FiftyMovesNoHit);
        assert_eq!(game.half_moves(), u32::MAX);
        assert_eq!(game.piece_at(square!("a2")).unwrap().steps(), Some(u32::MAX));
        game.undo();
        assert_eq!(
            game.description(),
            "white 4294967295 Rook-white-a1-4294967295 King-white-e1-0 King-black-e8-0"
        );
    }
    #[test]
    fn low_material_draw() {
        let mut game = Game::from_description(
            "white 0 King-white-e1-0 Knight-white-b1 Knight-white-g1 \
             King-black-e8-0 Bishop-black-c8",
        )
        .unwrap();
        assert_eq!(play(&mut game, "b1-c3"), GameResult::Draw);
    }
    #[test]
    fn promotion() {
        let mut game = Game::from_description(
            "white 0 King-white-e1-0 Pawn-white-b7-false King-black-h8-0",
        )
        .unwrap();
        let listed = game.legal_moves_from(square!("b7"));
        assert_eq!(listed, [Move::new(square!("b7"), square!("b8"))]);
        assert_eq!(listed[0].promotion, None);

        play(&mut game, "b7Nb8");
        assert_eq!(game.piece_at(square!("b8")).unwrap().kind(), PieceKind::Knight);
        assert_eq!(game.history_as_move_string(None), "b7Nb8");
        game.undo();

        game.set_promotion_chooser(|_| PieceKind::Rook);
        play(&mut game, "b7-b8");
        assert_eq!(game.piece_at(square!("b8")).unwrap().kind(), PieceKind::Rook);
        game.undo();
        assert_eq!(game.piece_at(square!("b7")).unwrap().kind(), PieceKind::Pawn);
    }
    #[test]
    fn illegal_moves_leave_the_game_untouched() {
        let mut game = Game::new();
        let before = game.description();
        let movement = Move::new(square!("e2"), square!("e5"));
        assert_eq!(game.apply(movement), Err(IllegalMove(movement)));
        let promotion = Move::new(square!("e2"), square!("e4")).with_promotion(PieceKind::Queen);
        assert_eq!(game.apply(promotion), Err(IllegalMove(promotion)));
        assert_eq!(game.description(), before);
        assert_eq!(game.history().count(), 0);
    }
    #[test]
    #[should_panic(expected = "no piece to move")]
    fn moving_from_an_empty_square_panics() {
        let _ = Game::new().apply(Move::new(square!("e4"), square!("e5")));
    }
    #[test]
    #[should_panic(expected = "turn")]
    fn moving_the_opponents_piece_panics() {
        let _ = Game::new().apply(Move::new(square!("e7"), square!("e5")));
    }
    #[test]
    #[should_panic(expected = "no move to undo")]
    fn undo_without_history_panics() {
        Game::new().undo();
    }
    #[test]
    fn history_and_replicas() {
        let mut game = Game::new();
        play(&mut game, "e2-e4 e7-e5 g1-f3");
        assert_eq!(game.history_as_move_string(None), "e2-e4 e7-e5 g1-f3");
        assert_eq!(game.history_as_move_string(Some(2)), "e7-e5 g1-f3");
        assert_eq!(game.history_as_move_string(Some(9)), "e2-e4 e7-e5 g1-f3");

        let mut replicas = game.replicate(2);
        play(&mut replicas[0], "b8-c6");
        assert_eq!(replicas[1].description(), game.description());
        assert_ne!(replicas[0].description(), game.description());

        let mut replay = Game::new();
        play(&mut replay, &game.history_as_move_string(None));
        assert_eq!(replay.description(), game.description());
    }
    #[test]
    fn selection() {
        let mut game = Game::new();
        assert!(game.is_selectable(square!("g1")));
        assert!(!game.is_selectable(square!("a1")));
        assert!(!game.is_selectable(square!("e4")));
        assert!(!game.is_selectable(square!("g8")));
        assert_eq!(game.legal_moves_from(square!("b1")).len(), 2);
    }
    #[test]
    fn game_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Game>();
    }
}
