use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{
        Coins,
        Game,
        GameId,
        GameResult,
        GameStatus,
        GameType,
        Move,
        PlayerId,
        PlayerStats,
        Side,
        TournamentParticipant,
    },
    events::Notification,
    game_machine::SettlementPlan,
    helpers::mask_last,
};

/// How many trailing characters of an opponent's name are hidden in game history.
const MASKED_CHARS: usize = 3;

/// A game as seen by one of its participants.
///
/// The opponent's move is only revealed once the game is over, so a player who is still deciding cannot peek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub game_id: GameId,
    pub game_type: GameType,
    pub status: GameStatus,
    pub side: Side,
    /// The human opponent, if there is one.
    pub opponent: Option<PlayerId>,
    /// The bot's display name in bot games.
    pub bot_label: Option<String>,
    pub stake: Coins,
    pub bank: Coins,
    pub your_move: Option<Move>,
    pub opponent_move: Option<Move>,
    /// `true` once the opponent has moved, without saying what they played.
    pub opponent_has_moved: bool,
    pub result: Option<GameResult>,
    pub outcome: Option<PlayerOutcome>,
    pub move_timer_start: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl GameView {
    /// Returns `None` if `player` is not a participant.
    pub fn for_player(game: &Game, player: PlayerId) -> Option<Self> {
        let side = game.side_of(player)?;
        let other = side.other();
        let opponent_move = game.move_on(other).filter(|_| game.is_terminal());
        Some(Self {
            game_id: game.id,
            game_type: game.game_type,
            status: game.status,
            side,
            opponent: game.player_on(other),
            bot_label: game.bot_label.clone(),
            stake: game.stake_on(side),
            bank: game.bank,
            your_move: game.move_on(side),
            opponent_move,
            opponent_has_moved: game.move_on(other).is_some(),
            result: game.result,
            outcome: PlayerOutcome::for_side(game, side),
            move_timer_start: game.move_timer_start,
            expires_at: game.expires_at,
            finished_at: game.finished_at,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}

/// The result of a game from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerOutcome {
    Won,
    Lost,
    Draw,
    Cancelled,
}

impl PlayerOutcome {
    pub fn for_side(game: &Game, side: Side) -> Option<Self> {
        match (game.status, game.result) {
            (GameStatus::Active, _) => None,
            (GameStatus::Cancelled, _) => Some(PlayerOutcome::Cancelled),
            (GameStatus::Finished, Some(GameResult::Draw)) => Some(PlayerOutcome::Draw),
            (GameStatus::Finished, Some(result)) if result == GameResult::win_for(side) => Some(PlayerOutcome::Won),
            (GameStatus::Finished, Some(_)) => Some(PlayerOutcome::Lost),
            (GameStatus::Finished, None) => None,
        }
    }
}

/// The reply to a move submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReceipt {
    pub game_id: GameId,
    pub finished: bool,
    pub result: Option<GameResult>,
    pub outcome: Option<PlayerOutcome>,
    /// Only revealed once the game is finished.
    pub opponent_move: Option<Move>,
    /// What the player was credited by the settlement, if the move finished the game.
    pub credited: Coins,
}

impl MoveReceipt {
    pub fn waiting(game: &Game) -> Self {
        Self {
            game_id: game.id,
            finished: false,
            result: None,
            outcome: None,
            opponent_move: None,
            credited: Coins::default(),
        }
    }

    pub fn settled(game: &Game, plan: &SettlementPlan, player: PlayerId) -> Self {
        let side = game.side_of(player);
        Self {
            game_id: game.id,
            finished: true,
            result: game.result,
            outcome: side.and_then(|s| PlayerOutcome::for_side(game, s)),
            opponent_move: side.and_then(|s| game.move_on(s.other())),
            credited: plan.credit_for(player),
        }
    }
}

/// One line of a player's game history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentGame {
    pub game_id: GameId,
    /// The opponent's display name with the last few characters hidden.
    pub opponent: String,
    pub stake: Coins,
    pub outcome: Option<PlayerOutcome>,
    /// The bank for a win, the stake for a loss, and zero otherwise.
    pub amount: Coins,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RecentGame {
    pub fn for_player(game: &Game, player: PlayerId) -> Option<Self> {
        let side = game.side_of(player)?;
        let opponent = match (&game.bot_label, game.player_on(side.other())) {
            (Some(label), _) => mask_last(label, MASKED_CHARS),
            (None, Some(p)) => mask_last(&p.to_string(), MASKED_CHARS),
            (None, None) => "unknown".to_string(),
        };
        let outcome = PlayerOutcome::for_side(game, side);
        let amount = match outcome {
            Some(PlayerOutcome::Won) => game.bank,
            Some(PlayerOutcome::Lost) => game.stake_on(side),
            _ => Coins::default(),
        };
        Some(Self {
            game_id: game.id,
            opponent,
            stake: game.stake_on(side),
            outcome,
            amount,
            finished_at: game.finished_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub player: PlayerId,
    pub points: i64,
    pub games_played: i64,
    pub wins: i64,
    pub draws: i64,
    pub losses: i64,
}

impl LeaderboardEntry {
    pub fn new(rank: i64, p: &TournamentParticipant) -> Self {
        Self {
            rank,
            player: p.player_id,
            points: p.points,
            games_played: p.games_played,
            wins: p.wins,
            draws: p.draws,
            losses: p.losses,
        }
    }
}

/// One row of the all-time player ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPlayer {
    pub rank: i64,
    pub player: PlayerId,
    /// The player's display name with the last few characters hidden.
    pub name: String,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub total_games: i64,
    /// A percentage, to one decimal place.
    pub win_rate: f64,
}

impl TopPlayer {
    pub fn new(rank: i64, stats: &PlayerStats) -> Self {
        Self {
            rank,
            player: stats.player_id,
            name: mask_last(&stats.player_id.to_string(), MASKED_CHARS),
            wins: stats.wins,
            losses: stats.losses(),
            draws: stats.draws,
            total_games: stats.total_games,
            win_rate: stats.win_rate(),
        }
    }
}

/// What a single sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Games settled with a result, including forfeits.
    pub finished: Vec<GameId>,
    /// Games cancelled with full refunds.
    pub cancelled: Vec<GameId>,
    /// Expired queue entries removed.
    pub evicted: u64,
    /// Games that could not be resolved this time around.
    pub failed: Vec<GameId>,
}

impl SweepResult {
    pub fn resolved_count(&self) -> usize {
        self.finished.len() + self.cancelled.len()
    }
}

/// The messages sent to the human players of a game that has just been settled.
pub fn settlement_notifications(game: &Game, plan: &SettlementPlan) -> Vec<Notification> {
    game.players()
        .into_iter()
        .filter_map(|player| {
            let side = game.side_of(player)?;
            let credited = plan.credit_for(player);
            let message = match PlayerOutcome::for_side(game, side)? {
                PlayerOutcome::Won => format!("You won {credited} in {}!", game.id),
                PlayerOutcome::Lost => format!("You lost {} in {}.", game.stake_on(side), game.id),
                PlayerOutcome::Draw => format!("{} was a draw. Your stake of {credited} has been returned.", game.id),
                PlayerOutcome::Cancelled => {
                    format!("{} was cancelled. Your stake of {credited} has been returned.", game.id)
                },
            };
            Some(Notification::new(player, message))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::game_machine::Resolution;

    fn game(player2: Option<i64>) -> Game {
        let t = Utc.with_ymd_and_hms(2024, 10, 19, 12, 0, 0).unwrap();
        let stake = Coins::from_whole(100);
        Game {
            id: GameId(7),
            game_type: if player2.is_some() { GameType::Pvp } else { GameType::Pvb },
            status: GameStatus::Active,
            player1_id: PlayerId(1),
            player2_id: player2.map(PlayerId),
            is_bot_game: player2.is_none(),
            bot_label: player2.map_or(Some("Charlotte".to_string()), |_| None),
            stake,
            player1_stake: stake,
            player2_stake: stake,
            bank: stake * 2,
            player1_move: None,
            player2_move: None,
            winner_id: None,
            result: None,
            move_timer_start: t,
            created_at: t,
            updated_at: t,
            finished_at: None,
            expires_at: t + Duration::days(3),
            tournament_id: None,
        }
    }

    fn finish(mut game: Game, result: GameResult) -> Game {
        game.status = GameStatus::Finished;
        game.result = Some(result);
        game.finished_at = Some(game.created_at + Duration::seconds(5));
        game
    }

    #[test]
    fn opponent_move_is_hidden_until_the_game_ends() {
        let mut g = game(Some(2));
        g.player2_move = Some(Move::Scissors);
        let view = GameView::for_player(&g, PlayerId(1)).unwrap();
        assert_eq!(view.opponent_move, None);
        assert!(view.opponent_has_moved);
        assert_eq!(view.outcome, None);
        g.player1_move = Some(Move::Rock);
        let g = finish(g, GameResult::Player1Win);
        let view = GameView::for_player(&g, PlayerId(1)).unwrap();
        assert_eq!(view.opponent_move, Some(Move::Scissors));
        assert_eq!(view.outcome, Some(PlayerOutcome::Won));
        let view = GameView::for_player(&g, PlayerId(2)).unwrap();
        assert_eq!(view.your_move, Some(Move::Scissors));
        assert_eq!(view.outcome, Some(PlayerOutcome::Lost));
        assert!(GameView::for_player(&g, PlayerId(3)).is_none());
    }

    #[test]
    fn history_masks_opponents() {
        let g = finish(game(None), GameResult::Player2Win);
        let recent = RecentGame::for_player(&g, PlayerId(1)).unwrap();
        assert_eq!(recent.opponent, "Charlo***");
        assert_eq!(recent.outcome, Some(PlayerOutcome::Lost));
        assert_eq!(recent.amount, Coins::from_whole(100));
        let g = finish(game(Some(2)), GameResult::Player2Win);
        let recent = RecentGame::for_player(&g, PlayerId(2)).unwrap();
        assert_eq!(recent.opponent, "playe***");
        assert_eq!(recent.amount, Coins::from_whole(200));
    }

    #[test]
    fn top_player_rows() {
        let stats = PlayerStats { player_id: PlayerId(12), wins: 2, draws: 1, total_games: 6 };
        let row = TopPlayer::new(1, &stats);
        assert_eq!(row.name, "player***");
        assert_eq!(row.losses, 3);
        assert_eq!(row.win_rate, 33.3);
        let unbeaten = PlayerStats { player_id: PlayerId(3), wins: 3, draws: 0, total_games: 3 };
        assert_eq!(TopPlayer::new(2, &unbeaten).win_rate, 100.0);
        let none = PlayerStats { player_id: PlayerId(4), wins: 0, draws: 0, total_games: 0 };
        assert_eq!(none.win_rate(), 0.0);
    }

    #[test]
    fn notifications_go_to_humans_only() {
        let g = finish(game(None), GameResult::Player1Win);
        let plan = SettlementPlan::for_game(&game(None), Resolution::Outcome(GameResult::Player1Win));
        let notes = settlement_notifications(&g, &plan);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].player, PlayerId(1));
        assert_eq!(notes[0].message, "You won 200.00 CF in game#7!");
    }

    #[test]
    fn draw_notifications() {
        let g = finish(game(Some(2)), GameResult::Draw);
        let plan = SettlementPlan::for_game(&game(Some(2)), Resolution::Outcome(GameResult::Draw));
        let notes = settlement_notifications(&g, &plan);
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| n.message.contains("100.00 CF has been returned")));
    }
}
