use chrono::Duration;
use cucumber::given;
use rps_engine::{db_types::Coins, traits::MatchStatus};

use crate::cucumber::{RpsWorld, WagerSystem};

#[given("a fresh install")]
async fn fresh_database(world: &mut RpsWorld) {
    let system = WagerSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "{word} has a balance of {int} CF")]
async fn player_with_balance(world: &mut RpsWorld, name: String, amount: i64) {
    let player = world.player(&name);
    world.system().ledger().deposit(player, Coins::from_whole(amount)).await.expect("Error depositing funds");
}

#[given(expr = "the move timeout is {int} second(s)")]
async fn move_timeout(world: &mut RpsWorld, secs: i64) {
    world.system_mut().config.move_timeout = Duration::seconds(secs);
}

#[given(expr = "the game lifetime is {int} second(s)")]
async fn game_lifetime(world: &mut RpsWorld, secs: i64) {
    world.system_mut().config.game_expiry = Duration::seconds(secs);
}

#[given(expr = "the queue entry lifetime is {int} second(s)")]
async fn queue_ttl(world: &mut RpsWorld, secs: i64) {
    world.system_mut().config.queue_ttl = Duration::seconds(secs);
}

#[given(expr = "the bot cap is {int} CF")]
async fn bot_cap(world: &mut RpsWorld, amount: i64) {
    world.system_mut().config.bot_cap = Coins::from_whole(amount);
}

#[given("the bot always loses")]
async fn bot_always_loses(world: &mut RpsWorld) {
    world.system_mut().config.bot_lose_probability = 1.0;
}

#[given("the bot always wins")]
async fn bot_always_wins(world: &mut RpsWorld) {
    world.system_mut().config.bot_lose_probability = 0.0;
}

#[given("a tournament is running")]
async fn tournament_running(world: &mut RpsWorld) {
    world.system().tournaments().start_tournament(None).await.expect("Error starting tournament");
}

#[given(expr = "{word} and {word} are matched at {int} CF")]
async fn players_matched(world: &mut RpsWorld, first: String, second: String, stake: i64) {
    let (p1, p2) = (world.player(&first), world.player(&second));
    let stake = Coins::from_whole(stake);
    let api = world.system().matchmaking();
    let status = api.request_match(p1, stake).await.expect("Error requesting a match");
    assert!(status.is_searching(), "{first} should be waiting, but got {status:?}");
    let status = api.request_match(p2, stake).await.expect("Error requesting a match");
    match &status {
        MatchStatus::Matched(game) => {
            assert_eq!(game.player1_id, p1);
            assert_eq!(game.player2_id, Some(p2));
        },
        other => panic!("{first} and {second} should have been matched, but got {other:?}"),
    }
    world.track_game(status.game());
}
