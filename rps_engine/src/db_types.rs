use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, Utc};
pub use rps_common::Coins;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

macro_rules! id_type {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }
        }
    };
}

id_type!(PlayerId, "player");
id_type!(GameId, "game");
id_type!(TournamentId, "tournament");

//--------------------------------------         Move          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Rock => write!(f, "rock"),
            Move::Paper => write!(f, "paper"),
            Move::Scissors => write!(f, "scissors"),
        }
    }
}

impl FromStr for Move {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock" => Ok(Self::Rock),
            "paper" => Ok(Self::Paper),
            "scissors" => Ok(Self::Scissors),
            _ => Err(ConversionError(format!("'{s}' is not one of rock, paper or scissors"))),
        }
    }
}

//--------------------------------------      GameResult       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum GameResult {
    Player1Win,
    Player2Win,
    Draw,
}

impl GameResult {
    pub fn win_for(side: Side) -> Self {
        match side {
            Side::Player1 => GameResult::Player1Win,
            Side::Player2 => GameResult::Player2Win,
        }
    }
}

impl Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameResult::Player1Win => write!(f, "player1_win"),
            GameResult::Player2Win => write!(f, "player2_win"),
            GameResult::Draw => write!(f, "draw"),
        }
    }
}

impl FromStr for GameResult {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player1_win" | "Player1Win" => Ok(Self::Player1Win),
            "player2_win" | "Player2Win" => Ok(Self::Player2Win),
            "draw" | "Draw" => Ok(Self::Draw),
            s => Err(ConversionError(format!("Invalid game result: {s}"))),
        }
    }
}

//--------------------------------------      GameStatus       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum GameStatus {
    /// Stakes are escrowed and the game is accepting moves.
    Active,
    /// The game was settled with a result.
    Finished,
    /// The game was abandoned and every stake was refunded.
    Cancelled,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Active)
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::Active => write!(f, "Active"),
            GameStatus::Finished => write!(f, "Finished"),
            GameStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for GameStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "finished" => Ok(Self::Finished),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid game status: {s}"))),
        }
    }
}

//--------------------------------------       GameType        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum GameType {
    /// Two human players.
    Pvp,
    /// A human player against the house bot.
    Pvb,
}

impl Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameType::Pvp => write!(f, "pvp"),
            GameType::Pvb => write!(f, "pvb"),
        }
    }
}

/// Which slot of a game a participant occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }
}

//--------------------------------------         Game          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub game_type: GameType,
    pub status: GameStatus,
    pub player1_id: PlayerId,
    /// `None` when the opponent is the house bot.
    pub player2_id: Option<PlayerId>,
    pub is_bot_game: bool,
    pub bot_label: Option<String>,
    pub stake: Coins,
    pub player1_stake: Coins,
    pub player2_stake: Coins,
    pub bank: Coins,
    pub player1_move: Option<Move>,
    pub player2_move: Option<Move>,
    pub winner_id: Option<PlayerId>,
    pub result: Option<GameResult>,
    pub move_timer_start: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub tournament_id: Option<TournamentId>,
}

impl Game {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The slot occupied by `player`, if they take part in this game. The bot slot never matches a player.
    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        if self.player1_id == player {
            Some(Side::Player1)
        } else if self.player2_id == Some(player) {
            Some(Side::Player2)
        } else {
            None
        }
    }

    pub fn player_on(&self, side: Side) -> Option<PlayerId> {
        match side {
            Side::Player1 => Some(self.player1_id),
            Side::Player2 => self.player2_id,
        }
    }

    pub fn move_on(&self, side: Side) -> Option<Move> {
        match side {
            Side::Player1 => self.player1_move,
            Side::Player2 => self.player2_move,
        }
    }

    pub fn set_move(&mut self, side: Side, mv: Move) {
        match side {
            Side::Player1 => self.player1_move = Some(mv),
            Side::Player2 => self.player2_move = Some(mv),
        }
    }

    pub fn stake_on(&self, side: Side) -> Coins {
        match side {
            Side::Player1 => self.player1_stake,
            Side::Player2 => self.player2_stake,
        }
    }

    /// The human participants of the game.
    pub fn players(&self) -> Vec<PlayerId> {
        std::iter::once(self.player1_id).chain(self.player2_id).collect()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn move_timer_elapsed(&self, now: DateTime<Utc>, move_timeout: Duration) -> bool {
        now - self.move_timer_start >= move_timeout
    }

    pub fn move_count(&self) -> usize {
        usize::from(self.player1_move.is_some()) + usize::from(self.player2_move.is_some())
    }
}

/// A game that is about to be created. Stakes must already have been escrowed.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub game_type: GameType,
    pub player1_id: PlayerId,
    pub player2_id: Option<PlayerId>,
    pub bot_label: Option<String>,
    pub stake: Coins,
    pub tournament_id: Option<TournamentId>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewGame {
    pub fn pvp(player1: PlayerId, player2: PlayerId, stake: Coins, created_at: DateTime<Utc>) -> Self {
        Self {
            game_type: GameType::Pvp,
            player1_id: player1,
            player2_id: Some(player2),
            bot_label: None,
            stake,
            tournament_id: None,
            created_at,
            expires_at: created_at,
        }
    }

    pub fn against_bot<S: Into<String>>(player: PlayerId, bot_label: S, stake: Coins, created_at: DateTime<Utc>) -> Self {
        Self {
            game_type: GameType::Pvb,
            player1_id: player,
            player2_id: None,
            bot_label: Some(bot_label.into()),
            stake,
            tournament_id: None,
            created_at,
            expires_at: created_at,
        }
    }

    pub fn with_tournament(mut self, tournament: Option<TournamentId>) -> Self {
        self.tournament_id = tournament;
        self
    }

    pub fn expires_after(mut self, lifetime: Duration) -> Self {
        self.expires_at = self.created_at + lifetime;
        self
    }

    pub fn is_bot_game(&self) -> bool {
        matches!(self.game_type, GameType::Pvb)
    }

    /// Both sides put up the same stake, so the bank is always twice the stake.
    pub fn bank(&self) -> Coins {
        self.stake * 2
    }
}

//--------------------------------------      QueueEntry       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub player_id: PlayerId,
    pub stake: Coins,
    pub tournament_id: Option<TournamentId>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct NewQueueEntry {
    pub player_id: PlayerId,
    pub stake: Coins,
    pub tournament_id: Option<TournamentId>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewQueueEntry {
    pub fn new(player_id: PlayerId, stake: Coins, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self { player_id, stake, tournament_id: None, created_at, expires_at: created_at + ttl }
    }

    pub fn with_tournament(mut self, tournament: Option<TournamentId>) -> Self {
        self.tournament_id = tournament;
        self
    }
}

//--------------------------------------        BotPool        ---------------------------------------------------------
/// House funds that stand in for an absent human opponent.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct BotPool {
    pub total_balance: Coins,
    pub used_balance: Coins,
    pub updated_at: DateTime<Utc>,
}

impl BotPool {
    pub fn available(&self) -> Coins {
        self.total_balance - self.used_balance
    }

    /// The largest stake the bot may currently accept, given the per-game cap.
    pub fn available_for_bot(&self, bot_cap: Coins) -> Coins {
        bot_cap.min(self.available()).max(Coins::default())
    }
}

//--------------------------------------      Tournaments      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum TournamentStatus {
    Active,
    Completed,
    Rewarded,
}

impl Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentStatus::Active => write!(f, "Active"),
            TournamentStatus::Completed => write!(f, "Completed"),
            TournamentStatus::Rewarded => write!(f, "Rewarded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub status: TournamentStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub reward_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_active(&self) -> bool {
        matches!(self.status, TournamentStatus::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TournamentParticipant {
    pub id: i64,
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub points: i64,
    pub games_played: i64,
    pub wins: i64,
    pub draws: i64,
    pub losses: i64,
    pub reward_received: bool,
    pub reward_amount: Coins,
    pub created_at: DateTime<Utc>,
}

/// How a single settled game counts towards a participant's tournament record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    Win,
    Draw,
    Loss,
}

impl Standing {
    pub const WIN_POINTS: i64 = 3;
    pub const DRAW_POINTS: i64 = 1;

    pub fn points(&self) -> i64 {
        match self {
            Standing::Win => Self::WIN_POINTS,
            Standing::Draw => Self::DRAW_POINTS,
            Standing::Loss => 0,
        }
    }
}

//--------------------------------------     Player stats      ---------------------------------------------------------
/// A player's record across every finished game. Cancelled games are not counted.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub wins: i64,
    pub draws: i64,
    pub total_games: i64,
}

impl PlayerStats {
    pub fn losses(&self) -> i64 {
        self.total_games - self.wins - self.draws
    }

    /// Wins as a percentage of games played, to one decimal place.
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        (self.wins as f64 * 1000.0 / self.total_games as f64).round() / 10.0
    }
}

//--------------------------------------     Ledger journal    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum JournalEntryType {
    Deposit,
    Withdrawal,
    /// A player's stake escrowed into a game.
    Stake,
    /// The bank paid out to a winner.
    Payout,
    /// A stake returned on a draw or cancellation.
    Refund,
    BotReserve,
    BotRelease,
    /// A human stake kept by the house after a bot win.
    HouseTake,
    BotPoolFunding,
    TournamentReward,
}

impl Display for JournalEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A row of the append-only ledger audit trail. `player_id` is empty for bot pool movements.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub game_id: Option<GameId>,
    pub player_id: Option<PlayerId>,
    pub entry_type: JournalEntryType,
    pub amount: Coins,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    pub game_id: Option<GameId>,
    pub player_id: Option<PlayerId>,
    pub entry_type: JournalEntryType,
    pub amount: Coins,
}

impl NewJournalEntry {
    pub fn player(player: PlayerId, entry_type: JournalEntryType, amount: Coins) -> Self {
        Self { game_id: None, player_id: Some(player), entry_type, amount }
    }

    pub fn bot_pool(entry_type: JournalEntryType, amount: Coins) -> Self {
        Self { game_id: None, player_id: None, entry_type, amount }
    }

    pub fn for_game(mut self, game_id: GameId) -> Self {
        self.game_id = Some(game_id);
        self
    }
}
