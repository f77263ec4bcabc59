use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;
use log::*;

use crate::{db_types::Coins, rules::BotStrategy};

const DEFAULT_STAKE_TIERS: [i64; 4] = [10, 50, 100, 500];
const DEFAULT_MOVE_TIMEOUT: Duration = Duration::seconds(10);
const DEFAULT_QUEUE_TTL: Duration = Duration::seconds(5);
const DEFAULT_GAME_EXPIRY: Duration = Duration::days(3);
const DEFAULT_BOT_CAP: i64 = 1000;
const DEFAULT_BOT_LOSE_PROBABILITY: f64 = 0.6;
const DEFAULT_TOURNAMENT_REWARDS: [i64; 10] = [1000, 900, 800, 700, 600, 500, 400, 300, 200, 100];

/// Tunable constants for matchmaking, settlement and tournaments.
#[derive(Clone, Debug)]
pub struct WagerConfig {
    /// The only stakes a player may wager.
    pub stake_tiers: Vec<Coins>,
    /// How long a player has to move once a game starts before an opponent who has moved may claim a forfeit.
    pub move_timeout: Duration,
    /// How long a queue entry lives without being refreshed by the client.
    pub queue_ttl: Duration,
    /// Games that are still active this long after creation are resolved by the sweep.
    pub game_expiry: Duration,
    /// The most the bot pool will put up for a single game, regardless of how much it holds.
    pub bot_cap: Coins,
    /// The probability that the bot picks the move that loses to the human's move.
    pub bot_lose_probability: f64,
    /// Tournament payouts. Index 0 is for rank 1.
    pub tournament_rewards: Vec<Coins>,
}

impl Default for WagerConfig {
    fn default() -> Self {
        Self {
            stake_tiers: DEFAULT_STAKE_TIERS.iter().map(|&c| Coins::from_whole(c)).collect(),
            move_timeout: DEFAULT_MOVE_TIMEOUT,
            queue_ttl: DEFAULT_QUEUE_TTL,
            game_expiry: DEFAULT_GAME_EXPIRY,
            bot_cap: Coins::from_whole(DEFAULT_BOT_CAP),
            bot_lose_probability: DEFAULT_BOT_LOSE_PROBABILITY,
            tournament_rewards: DEFAULT_TOURNAMENT_REWARDS.iter().map(|&c| Coins::from_whole(c)).collect(),
        }
    }
}

impl WagerConfig {
    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let stake_tiers = read_var("RPS_STAKE_TIERS", parse_coin_list, defaults.stake_tiers);
        let move_timeout = read_var("RPS_MOVE_TIMEOUT_SECS", parse_seconds, defaults.move_timeout);
        let queue_ttl = read_var("RPS_QUEUE_TTL_SECS", parse_seconds, defaults.queue_ttl);
        let game_expiry = read_var("RPS_GAME_EXPIRY_SECS", parse_seconds, defaults.game_expiry);
        let bot_cap = read_var("RPS_BOT_CAP", |s| s.parse::<Coins>().map_err(|e| e.to_string()), defaults.bot_cap);
        let bot_lose_probability =
            read_var("RPS_BOT_LOSE_PROBABILITY", parse_probability, defaults.bot_lose_probability);
        let tournament_rewards = read_var("RPS_TOURNAMENT_REWARDS", parse_coin_list, defaults.tournament_rewards);
        Self { stake_tiers, move_timeout, queue_ttl, game_expiry, bot_cap, bot_lose_probability, tournament_rewards }
    }

    /// Returns `true` if `stake` is one of the configured tiers.
    pub fn check_stake(&self, stake: Coins) -> bool {
        self.stake_tiers.contains(&stake)
    }

    pub fn bot_strategy(&self) -> BotStrategy {
        BotStrategy::new(self.bot_lose_probability)
    }
}

fn read_var<T, F>(name: &str, parse: F, default: T) -> T
where
    T: std::fmt::Debug,
    F: Fn(&str) -> Result<T, String>,
{
    match env::var(name) {
        Ok(s) => parse(s.trim()).unwrap_or_else(|e| {
            warn!("🪛️ Invalid configuration value for {name}: {e}. Using the default value of {default:?} instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default value of {default:?}.");
            default
        },
    }
}

fn parse_coin_list(s: &str) -> Result<Vec<Coins>, String> {
    let coins = s
        .split(',')
        .map(|v| v.trim().parse::<Coins>().map_err(|e| describe(v, e)))
        .collect::<Result<Vec<Coins>, String>>()?;
    if coins.is_empty() || coins.iter().any(|c| !c.is_positive()) {
        return Err(format!("'{s}' must be a comma-separated list of positive amounts"));
    }
    Ok(coins)
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    match s.parse::<i64>() {
        Ok(secs) if secs >= 0 => Duration::try_seconds(secs).ok_or_else(|| format!("{secs} seconds is out of range")),
        Ok(secs) => Err(format!("{secs} is negative")),
        Err(e) => Err(describe(s, e)),
    }
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p = f64::from_str(s).map_err(|e| describe(s, e))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{p} does not lie between 0 and 1"))
    }
}

fn describe<E: Display>(value: &str, e: E) -> String {
    format!("'{value}' ({e})")
}
