use crate::{board::Board, color::Color};

/// Comparison-only snapshot of a position: one 4-bit colored piece code per
/// square, 16 squares to a word, plus the side to move.
///
/// Piece state such as steps taken or en-passant flags is not recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memento {
    squares: [u64; 4],
    current_player: Color,
    piece_count: u8,
}
impl Memento {
    pub fn new(board: &Board, current_player: Color) -> Self {
        let mut squares = [0; 4];
        let mut piece_count = 0;
        for piece in board.pieces() {
            let index = piece.square.index();
            squares[index / 16] |= u64::from(piece.colored().nibble()) << (index % 16 * 4);
            piece_count += 1;
        }
        Memento {
            squares,
            current_player,
            piece_count,
        }
    }
    pub fn piece_count(self) -> u8 {
        self.piece_count
    }
}

#[cfg(test)]
mod test {
    use crate::{
        board::Board,
        color::Color,
        memento::Memento,
        piece::{Piece, PieceKind},
        square,
    };

    #[test]
    fn distinguishes_layout_and_side() {
        let board = Board::starting_position();
        let start = Memento::new(&board, Color::White);
        assert_eq!(start, Memento::new(&board.clone(), Color::White));
        assert_ne!(start, Memento::new(&board, Color::Black));
        assert_eq!(start.piece_count(), 32);

        let kings = |queen| {
            Board::from_pieces([
                Piece::new(Color::White, PieceKind::King, square!("e1")),
                Piece::new(Color::Black, PieceKind::King, square!("e8")),
                Piece::new(Color::White, PieceKind::Queen, queen),
            ])
            .unwrap()
        };
        let h8 = Memento::new(&kings(square!("h8")), Color::Black);
        let a1 = Memento::new(&kings(square!("a1")), Color::Black);
        assert_ne!(h8, a1);
        assert_eq!(h8.piece_count(), a1.piece_count());
    }
    #[test]
    fn ignores_piece_state() {
        let plain = Board::from_pieces([
            Piece::new(Color::White, PieceKind::King, square!("e1")),
            Piece::new(Color::Black, PieceKind::King, square!("e8")),
        ])
        .unwrap();
        let mut moved = plain.clone();
        let mut king = moved.take(square!("e1")).unwrap();
        king.step_to(square!("e1"));
        moved.put(king);
        assert_ne!(plain.get(square!("e1")), moved.get(square!("e1")));
        assert_eq!(
            Memento::new(&plain, Color::White),
            Memento::new(&moved, Color::White)
        );
    }
}
