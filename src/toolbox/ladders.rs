//! Snakes & Ladders
//!
//! Players start off the board at square 0 and must land exactly on the
//! last square to win; a roll that would overshoot leaves the player in
//! place. Landing on the foot of a ladder or the head of a snake moves the
//! player to its other end.

use std::collections::BTreeMap;
use rand::Rng;
use super::{Result, ToolboxError};

/// Classic 10x10 layout as (from, to)
pub const CLASSIC_JUMPS: &[(u32, u32)] = &[
    // Ladders
    (1, 38), (4, 14), (9, 31), (21, 42), (28, 84), (36, 44), (51, 67), (71, 91), (80, 100),
    // Snakes
    (16, 6), (47, 26), (49, 11), (56, 53), (62, 19), (64, 60), (87, 24), (93, 73), (95, 75), (98, 78),
];

/// Kind of jump taken after a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Ladder,
    Snake,
}

/// Board with numbered squares `1..=size`
#[derive(Debug, Clone)]
pub struct Board {
    size: u32,
    jumps: BTreeMap<u32, u32>,
}

impl Board {
    /// Build a board, rejecting jumps that leave the board, start on the
    /// last square or go nowhere
    pub fn new(size: u32, jumps: &[(u32, u32)]) -> Result<Self> {
        if size < 2 {
            return Err(ToolboxError::InvalidMove(format!("board size {} is too small", size)));
        }

        let mut map = BTreeMap::new();
        for &(from, to) in jumps {
            if from == 0 || from >= size || to == 0 || to > size || from == to {
                return Err(ToolboxError::InvalidMove(format!("invalid jump {} -> {}", from, to)));
            }
            if map.insert(from, to).is_some() {
                return Err(ToolboxError::InvalidMove(format!("two jumps start at {}", from)));
            }
        }

        Ok(Self { size, jumps: map })
    }

    /// The classic 100-square board
    pub fn classic() -> Self {
        let jumps = CLASSIC_JUMPS.iter().copied().collect();
        Self { size: 100, jumps }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Where a player standing on `square` ends up
    pub fn resolve(&self, square: u32) -> (u32, Option<Jump>) {
        match self.jumps.get(&square) {
            Some(&to) if to > square => (to, Some(Jump::Ladder)),
            Some(&to) => (to, Some(Jump::Snake)),
            None => (square, None),
        }
    }
}

/// Result of one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub player: usize,
    pub roll: u32,
    pub from: u32,
    pub to: u32,
    pub jump: Option<Jump>,
    pub won: bool,
}

/// Game state for several players taking turns
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    positions: Vec<u32>,
    turn: usize,
    winner: Option<usize>,
}

/// Roll a six-sided die
pub fn roll_die() -> u32 {
    rand::rng().random_range(1..=6)
}

impl Game {
    pub fn new(board: Board, players: usize) -> Result<Self> {
        if players == 0 {
            return Err(ToolboxError::InvalidMove("at least one player is needed".to_string()));
        }
        Ok(Self {
            board,
            positions: vec![0; players],
            turn: 0,
            winner: None,
        })
    }

    /// Player whose turn it is
    pub fn current_player(&self) -> usize {
        self.turn
    }

    pub fn position(&self, player: usize) -> Option<u32> {
        self.positions.get(player).copied()
    }

    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    /// Roll the die and play the current player's turn
    pub fn play_turn(&mut self) -> Result<MoveOutcome> {
        self.advance(self.turn, roll_die())
    }

    /// Move `player` by `roll` squares; only the current player may move
    pub fn advance(&mut self, player: usize, roll: u32) -> Result<MoveOutcome> {
        if self.winner.is_some() {
            return Err(ToolboxError::InvalidMove("the game is over".to_string()));
        }
        if player != self.turn {
            return Err(ToolboxError::InvalidMove(format!("it is not player {}'s turn", player)));
        }
        if !(1..=6).contains(&roll) {
            return Err(ToolboxError::InvalidMove(format!("roll {} is not a die value", roll)));
        }

        let from = self.positions[player];
        let target = from + roll;

        let (to, jump) = if target > self.board.size() {
            (from, None)
        } else {
            self.board.resolve(target)
        };

        self.positions[player] = to;
        let won = to == self.board.size();
        if won {
            self.winner = Some(player);
        } else {
            self.turn = (self.turn + 1) % self.positions.len();
        }

        Ok(MoveOutcome { player, roll, from, to, jump, won })
    }
}
