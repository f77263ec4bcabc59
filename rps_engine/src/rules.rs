//! The rock-paper-scissors outcome table and the house bot's reply strategy.
use rand::Rng;

use crate::db_types::{GameResult, Move};

impl Move {
    /// The move that this move defeats.
    pub fn beats(&self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Scissors => Move::Paper,
            Move::Paper => Move::Rock,
        }
    }

    /// The move that defeats this move.
    pub fn loses_to(&self) -> Move {
        match self {
            Move::Rock => Move::Paper,
            Move::Paper => Move::Scissors,
            Move::Scissors => Move::Rock,
        }
    }
}

/// Rock beats scissors, scissors beats paper, paper beats rock. Equal moves draw.
pub fn outcome(player1: Move, player2: Move) -> GameResult {
    if player1 == player2 {
        GameResult::Draw
    } else if player1.beats() == player2 {
        GameResult::Player1Win
    } else {
        GameResult::Player2Win
    }
}

/// The house bot never draws. It replies to the human's move with a losing move with probability
/// `lose_probability`, and with the winning move otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotStrategy {
    lose_probability: f64,
}

impl BotStrategy {
    pub fn new(lose_probability: f64) -> Self {
        Self { lose_probability: lose_probability.clamp(0.0, 1.0) }
    }

    pub fn lose_probability(&self) -> f64 {
        self.lose_probability
    }

    pub fn reply_to<R: Rng + ?Sized>(&self, human: Move, rng: &mut R) -> Move {
        if rng.gen::<f64>() < self.lose_probability {
            human.beats()
        } else {
            human.loses_to()
        }
    }
}
