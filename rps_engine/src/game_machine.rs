//! # Game state machine
//!
//! A game is created `Active` with both stakes already escrowed, and leaves that state exactly once, to either
//! `Finished` or `Cancelled`. The functions here are pure: they inspect (and, for moves, update) an in-memory snapshot
//! of a game and decide what should happen next. Callers are responsible for holding the game lock while they apply the
//! decision, so that the decision and the settlement form one atomic unit.
//!
//! Settlement is described by a [`SettlementPlan`], which lists every credit to a player, the bot pool release and the
//! tournament standings that a resolution produces. For every plan,
//! `sum(credits) + pool_release + house_take == bank`.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Coins, Game, GameResult, GameStatus, JournalEntryType, Move, PlayerId, Side, Standing},
    rules::outcome,
    traits::GameFlowError,
};

/// Why a game is being cancelled rather than settled with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// The game expired before a result could be determined.
    Expired,
    /// A participant abandoned the game.
    Requested(PlayerId),
    Administrative,
}

/// The way in which a game leaves the `Active` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Both moves are in.
    Outcome(GameResult),
    /// Only the given side moved before the move timer (or the game) ran out.
    Forfeit(Side),
    Cancel(CancelReason),
}

/// What happened to a game after a move was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStep {
    /// The game had already expired. The move was not recorded, and the game must be resolved as a timeout.
    Expired(Resolution),
    /// The move was recorded and the game can be settled right away.
    Settle(Resolution),
    /// The move was recorded and the opponent has yet to move.
    Waiting,
}

/// Who is sitting opposite player 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opponent {
    Human(PlayerId),
    Bot,
}

impl Opponent {
    fn of(game: &Game) -> Self {
        match game.player2_id {
            Some(player) => Opponent::Human(player),
            None => Opponent::Bot,
        }
    }
}

/// Records `mv` for `player` on the game snapshot.
///
/// `bot_reply` is used as the bot's move when this is a bot game and the bot has not moved yet. It is ignored otherwise.
///
/// Moves are idempotent: resubmitting the recorded move is accepted, but changing it is an error.
pub fn accept_move(
    game: &mut Game,
    player: PlayerId,
    mv: Move,
    bot_reply: Move,
    now: DateTime<Utc>,
    move_timeout: Duration,
) -> Result<MoveStep, GameFlowError> {
    let side = game.side_of(player).ok_or(GameFlowError::NotParticipant { game_id: game.id, player })?;
    if game.is_terminal() {
        return Err(GameFlowError::AlreadyTerminal { game_id: game.id, status: game.status });
    }
    if game.is_expired(now) {
        return Ok(MoveStep::Expired(timeout_resolution(game)));
    }
    match game.move_on(side) {
        Some(recorded) if recorded == mv => {},
        Some(recorded) => return Err(GameFlowError::MoveAlreadyRecorded { game_id: game.id, recorded }),
        None => game.set_move(side, mv),
    }
    if game.is_bot_game && game.player2_move.is_none() {
        game.player2_move = Some(bot_reply);
    }
    let step = match (game.player1_move, game.player2_move) {
        (Some(m1), Some(m2)) => MoveStep::Settle(Resolution::Outcome(outcome(m1, m2))),
        _ if game.move_timer_elapsed(now, move_timeout) => MoveStep::Settle(timeout_resolution(game)),
        _ => MoveStep::Waiting,
    };
    Ok(step)
}

/// The resolution of a game whose time has run out.
///
/// If exactly one human has moved, they win by forfeit. If nobody moved, or (abnormally) only the bot did, the game is
/// cancelled and every stake returned.
pub fn timeout_resolution(game: &Game) -> Resolution {
    match (game.player1_move, game.player2_move, Opponent::of(game)) {
        (Some(m1), Some(m2), _) => Resolution::Outcome(outcome(m1, m2)),
        (Some(_), None, _) => Resolution::Forfeit(Side::Player1),
        (None, Some(_), Opponent::Human(_)) => Resolution::Forfeit(Side::Player2),
        (None, Some(_), Opponent::Bot) | (None, None, _) => Resolution::Cancel(CancelReason::Expired),
    }
}

/// Returns the resolution for a game that is overdue, or `None` if the game is terminal or should keep waiting.
///
/// A game is overdue when it has expired, or when one side has moved and the move timer has run out. A game where
/// neither side has moved waits for expiry.
pub fn pending_resolution(game: &Game, now: DateTime<Utc>, move_timeout: Duration) -> Option<Resolution> {
    if game.is_terminal() {
        return None;
    }
    if game.is_expired(now) {
        return Some(timeout_resolution(game));
    }
    match game.move_count() {
        2 => Some(timeout_resolution(game)),
        1 if game.move_timer_elapsed(now, move_timeout) => Some(timeout_resolution(game)),
        _ => None,
    }
}

/// A single balance credit to a human player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub player: PlayerId,
    pub amount: Coins,
    pub entry_type: JournalEntryType,
}

/// Every fund movement and record update that settling a game entails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub resolution: Resolution,
    pub status: GameStatus,
    pub result: Option<GameResult>,
    pub winner: Option<PlayerId>,
    pub credits: Vec<Credit>,
    /// Bot stake that is no longer at risk and goes back to the pool.
    pub pool_release: Coins,
    /// Human stake kept by the house when the bot wins.
    pub house_take: Coins,
    /// Tournament standings for the human participants. Bots never score.
    pub standings: Vec<(PlayerId, Standing)>,
}

impl SettlementPlan {
    pub fn for_game(game: &Game, resolution: Resolution) -> Self {
        match resolution {
            Resolution::Cancel(_) => Self::refund(game, resolution, GameStatus::Cancelled, None),
            Resolution::Outcome(GameResult::Draw) => {
                Self::refund(game, resolution, GameStatus::Finished, Some(GameResult::Draw))
            },
            Resolution::Outcome(GameResult::Player1Win) => Self::win(game, resolution, Side::Player1),
            Resolution::Outcome(GameResult::Player2Win) => Self::win(game, resolution, Side::Player2),
            Resolution::Forfeit(side) => Self::win(game, resolution, side),
        }
    }

    fn refund(game: &Game, resolution: Resolution, status: GameStatus, result: Option<GameResult>) -> Self {
        let mut credits =
            vec![Credit { player: game.player1_id, amount: game.player1_stake, entry_type: JournalEntryType::Refund }];
        let pool_release = match Opponent::of(game) {
            Opponent::Human(player2) => {
                credits.push(Credit { player: player2, amount: game.player2_stake, entry_type: JournalEntryType::Refund });
                Coins::default()
            },
            Opponent::Bot => game.player2_stake,
        };
        let standings = match result {
            Some(GameResult::Draw) => game.players().into_iter().map(|p| (p, Standing::Draw)).collect(),
            _ => Vec::new(),
        };
        Self {
            resolution,
            status,
            result,
            winner: None,
            credits,
            pool_release,
            house_take: Coins::default(),
            standings,
        }
    }

    fn win(game: &Game, resolution: Resolution, side: Side) -> Self {
        let standings = game
            .players()
            .into_iter()
            .map(|p| {
                let standing = if game.side_of(p) == Some(side) { Standing::Win } else { Standing::Loss };
                (p, standing)
            })
            .collect();
        let payout = |player: PlayerId| Credit { player, amount: game.bank, entry_type: JournalEntryType::Payout };
        let (winner, credits, pool_release, house_take) = match (Opponent::of(game), side) {
            (Opponent::Human(player2), Side::Player2) => {
                (Some(player2), vec![payout(player2)], Coins::default(), Coins::default())
            },
            (Opponent::Human(_), Side::Player1) | (Opponent::Bot, Side::Player1) => {
                // Against the bot, the reserved stake is paid out and stays consumed in the pool.
                let player1 = game.player1_id;
                (Some(player1), vec![payout(player1)], Coins::default(), Coins::default())
            },
            (Opponent::Bot, Side::Player2) => (None, Vec::new(), game.player2_stake, game.player1_stake),
        };
        Self {
            resolution,
            status: GameStatus::Finished,
            result: Some(GameResult::win_for(side)),
            winner,
            credits,
            pool_release,
            house_take,
            standings,
        }
    }

    pub fn total_credited(&self) -> Coins {
        self.credits.iter().map(|c| c.amount).sum()
    }

    /// The sum of everything the plan hands back out of the bank.
    pub fn total_distributed(&self) -> Coins {
        self.total_credited() + self.pool_release + self.house_take
    }

    pub fn credit_for(&self, player: PlayerId) -> Coins {
        self.credits.iter().filter(|c| c.player == player).map(|c| c.amount).sum()
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self.status, GameStatus::Cancelled)
    }
}
