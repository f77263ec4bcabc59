use std::time::Duration;

use cucumber::{then, when};
use rps_engine::{
    db_types::{Coins, GameId, GameStatus, JournalEntryType, Move, TournamentId},
    game_objects::PlayerOutcome,
    helpers::mask_last,
    traits::{BotConnection, GameFlowError, MatchStatus, MatchmakingError, TournamentError},
    BotPoolManagement,
    LedgerManagement,
    GameManagement,
    MatchmakingManagement,
    TournamentManagement,
};

use crate::cucumber::RpsWorld;

//-------------------------------------------------  Matchmaking  ------------------------------------------------------

#[when(expr = "{word} requests a match at {int} CF")]
async fn request_match(world: &mut RpsWorld, name: String, stake: i64) {
    let player = world.player(&name);
    let result = world.system().matchmaking().request_match(player, Coins::from_whole(stake)).await;
    if let Ok(status) = &result {
        world.track_game(status.game());
    }
    world.last_match = Some(result);
}

#[when(expr = "{word} cancels the search")]
async fn cancel_search(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    world.system().matchmaking().cancel_search(player).await.expect("Error cancelling search");
}

#[when(expr = "{word} connects to a bot at {int} CF")]
async fn connect_bot(world: &mut RpsWorld, name: String, stake: i64) {
    let player = world.player(&name);
    let result = world.system().matchmaking().connect_bot(player, Coins::from_whole(stake)).await;
    if let Ok(connection) = &result {
        world.track_game(connection.game());
    }
    world.last_bot = Some(result);
}

#[when(expr = "{word} withdraws {int} CF")]
async fn withdraw(world: &mut RpsWorld, name: String, amount: i64) {
    let player = world.player(&name);
    world.system().ledger().withdraw(player, Coins::from_whole(amount)).await.expect("Error withdrawing funds");
}

#[when(expr = "the bot pool is funded with {int} CF")]
async fn fund_pool(world: &mut RpsWorld, amount: i64) {
    world.system().ledger().fund_bot_pool(Coins::from_whole(amount)).await.expect("Error funding the bot pool");
}

#[then(expr = "{word} is still searching")]
async fn still_searching(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    match world.last_match.as_ref().expect("No match was requested") {
        Ok(MatchStatus::Searching(entry)) => assert_eq!(entry.player_id, player),
        other => panic!("{name} should be searching, but got {other:?}"),
    }
}

#[then(expr = "{word} is matched with {word}")]
async fn matched_with(world: &mut RpsWorld, name: String, opponent: String) {
    let (player, opponent) = (world.player(&name), world.player(&opponent));
    match world.last_match.as_ref().expect("No match was requested") {
        Ok(MatchStatus::Matched(game)) => {
            let players = game.players();
            assert!(players.contains(&player) && players.contains(&opponent), "Wrong players in {game:?}");
            assert_eq!(game.status, GameStatus::Active);
            assert!(game.move_timer_start <= chrono::Utc::now());
        },
        other => panic!("{name} should have been matched, but got {other:?}"),
    }
}

#[then(expr = "{word} is already playing")]
async fn already_playing(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let game = match (&world.last_bot, &world.last_match) {
        (Some(Ok(BotConnection::AlreadyPlaying(game))), _) => game,
        (_, Some(Ok(MatchStatus::AlreadyPlaying(game)))) => game,
        other => panic!("{name} should already be playing, but got {other:?}"),
    };
    assert!(game.players().contains(&player));
    assert_eq!(Some(game.id), world.current_game);
}

#[then(expr = "{word} is player 1 in the game")]
async fn is_player_one(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    assert_eq!(world.game().await.player1_id, player);
}

#[then(expr = "{word} is in the queue")]
async fn in_queue(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let entry = world.system().db.fetch_queue_entry(player).await.expect("Error fetching queue entry");
    assert!(entry.is_some(), "{name} is not in the queue");
}

#[then(expr = "{word} is not in the queue")]
async fn not_in_queue(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let entry = world.system().db.fetch_queue_entry(player).await.expect("Error fetching queue entry");
    assert!(entry.is_none(), "{name} should not be in the queue: {entry:?}");
}

#[then("the request is rejected as an invalid stake")]
async fn invalid_stake(world: &mut RpsWorld) {
    let result = world.last_match.as_ref().expect("No match was requested");
    assert!(matches!(result, Err(MatchmakingError::InvalidStake(_))), "Got {result:?}");
}

#[then("the request is rejected for insufficient funds")]
async fn insufficient_funds(world: &mut RpsWorld) {
    let result = world.last_match.as_ref().expect("No match was requested");
    assert!(matches!(result, Err(MatchmakingError::InsufficientFunds { .. })), "Got {result:?}");
}

//-------------------------------------------------  Bot games  --------------------------------------------------------

#[then(expr = "{word} is playing a bot")]
async fn playing_bot(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    match world.last_bot.as_ref().expect("No bot was requested") {
        Ok(BotConnection::Connected(game)) => {
            assert_eq!(game.player1_id, player);
            assert!(game.is_bot_game);
            assert!(game.player2_id.is_none());
            assert!(game.bot_label.as_deref().is_some_and(|l| !l.is_empty()));
            assert_eq!(game.bank, game.stake * 2);
        },
        other => panic!("{name} should be playing a bot, but got {other:?}"),
    }
}

#[then(expr = "{word} is matched with {word} instead of a bot")]
async fn matched_human(world: &mut RpsWorld, name: String, opponent: String) {
    let (player, opponent) = (world.player(&name), world.player(&opponent));
    match world.last_bot.as_ref().expect("No bot was requested") {
        Ok(BotConnection::MatchedHuman(game)) => {
            assert!(!game.is_bot_game);
            assert_eq!(game.player1_id, opponent);
            assert_eq!(game.player2_id, Some(player));
        },
        other => panic!("{name} should have been matched with a human, but got {other:?}"),
    }
}

#[then("no bot is available")]
async fn bot_unavailable(world: &mut RpsWorld) {
    let result = world.last_bot.as_ref().expect("No bot was requested");
    assert!(matches!(result, Ok(BotConnection::Unavailable)), "Got {result:?}");
}

#[then(expr = "the bot pool has {int} CF in use")]
async fn pool_in_use(world: &mut RpsWorld, amount: i64) {
    let pool = world.system().db.fetch_bot_pool().await.expect("Error fetching bot pool");
    assert_eq!(pool.used_balance, Coins::from_whole(amount));
}

#[then(expr = "the bot pool holds {int} CF in total")]
async fn pool_total(world: &mut RpsWorld, amount: i64) {
    let pool = world.system().db.fetch_bot_pool().await.expect("Error fetching bot pool");
    assert_eq!(pool.total_balance, Coins::from_whole(amount));
}

//-------------------------------------------------  Moves  ------------------------------------------------------------

#[when(expr = "{word} plays {word}")]
async fn play(world: &mut RpsWorld, name: String, mv: String) {
    let player = world.player(&name);
    let game_id = world.game_id();
    let result = world.system().games().submit_move(player, game_id, &mv).await;
    world.last_move = Some(result);
}

#[when(expr = "{word} plays {word} in the game of {word}")]
async fn play_in_game_of(world: &mut RpsWorld, name: String, mv: String, _owner: String) {
    play(world, name, mv).await;
}

#[when(expr = "{word} checks the game")]
async fn check_game(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let game_id = world.game_id();
    world.system().games().game_status(game_id, player).await.expect("Error fetching game status");
}

#[when(expr = "{word} cancels the game")]
async fn cancel_game(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let game_id = world.game_id();
    if let Err(e) = world.system().games().cancel_game(player, game_id).await {
        world.last_error = Some(e.to_string());
    }
}

#[when(expr = "I pause for {int}ms")]
async fn pause(_world: &mut RpsWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[when("the sweep runs")]
async fn sweep(world: &mut RpsWorld) {
    let result = world.system().games().sweep().await.expect("Error running the sweep");
    world.last_sweep = Some(result);
}

#[then(expr = "{word} is waiting for the opponent")]
async fn waiting(world: &mut RpsWorld, name: String) {
    match world.last_move.as_ref().expect("No move was made") {
        Ok(receipt) => {
            assert!(!receipt.finished, "{name} should be waiting, but the game finished");
            assert_eq!(receipt.opponent_move, None);
        },
        Err(e) => panic!("{name}'s move was rejected: {e}"),
    }
    assert_eq!(world.game().await.status, GameStatus::Active);
}

#[then(expr = "{word} does not see the move of {word}")]
async fn move_hidden(world: &mut RpsWorld, name: String, other: String) {
    let player = world.player(&name);
    world.player(&other);
    let view = world.system().games().game_status(world.game_id(), player).await.expect("Error fetching game status");
    assert!(view.opponent_has_moved, "{other} has not moved yet");
    assert_eq!(view.opponent_move, None);
    assert_eq!(view.your_move, None);
}

#[then(expr = "{word} saw the bot play {word}")]
async fn saw_bot_move(world: &mut RpsWorld, _name: String, mv: String) {
    let expected = mv.parse::<Move>().expect("Not a valid move");
    let receipt = world.last_move.as_ref().expect("No move was made").as_ref().expect("The move was rejected");
    assert!(receipt.finished);
    assert_eq!(receipt.opponent_move, Some(expected));
}

#[then(expr = "{word} has won")]
async fn has_won(world: &mut RpsWorld, name: String) {
    let receipt = world.last_move.as_ref().expect("No move was made").as_ref().expect("The move was rejected");
    assert_eq!(receipt.outcome, Some(PlayerOutcome::Won), "{name} should have won");
}

#[then(expr = "the game is finished with result {word}")]
async fn finished_with(world: &mut RpsWorld, result: String) {
    let game = world.game().await;
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(game.result.map(|r| r.to_string()), Some(result));
    assert!(game.finished_at.is_some());
}

#[then("the game is cancelled")]
async fn is_cancelled(world: &mut RpsWorld) {
    let game = world.game().await;
    assert_eq!(game.status, GameStatus::Cancelled);
    assert_eq!(game.result, None);
    assert!(game.finished_at.is_some());
}

#[then("the game is still active")]
async fn still_active(world: &mut RpsWorld) {
    assert_eq!(world.game().await.status, GameStatus::Active);
}

#[then("the move is rejected as invalid")]
async fn rejected_invalid(world: &mut RpsWorld) {
    let result = world.last_move.as_ref().expect("No move was made");
    assert!(matches!(result, Err(GameFlowError::InvalidMove(_))), "Got {result:?}");
}

#[then("the move is rejected because a different move was recorded")]
async fn rejected_changed(world: &mut RpsWorld) {
    let result = world.last_move.as_ref().expect("No move was made");
    assert!(matches!(result, Err(GameFlowError::MoveAlreadyRecorded { .. })), "Got {result:?}");
}

#[then(expr = "the move is rejected because {word} is not a participant")]
async fn rejected_outsider(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let result = world.last_move.as_ref().expect("No move was made");
    assert!(matches!(result, Err(GameFlowError::NotParticipant { player: p, .. }) if *p == player), "Got {result:?}");
}

#[then("the move is rejected because the game is over")]
async fn rejected_terminal(world: &mut RpsWorld) {
    let result = world.last_move.as_ref().expect("No move was made");
    assert!(matches!(result, Err(GameFlowError::AlreadyTerminal { .. })), "Got {result:?}");
}

#[then("the move is rejected because the game expired")]
async fn rejected_expired(world: &mut RpsWorld) {
    let result = world.last_move.as_ref().expect("No move was made");
    assert!(matches!(result, Err(GameFlowError::GameExpired(_))), "Got {result:?}");
}

#[when("an administrator cancels the game")]
async fn admin_cancel(world: &mut RpsWorld) {
    let game_id = world.game_id();
    if let Err(e) = world.system().games().admin_cancel_game(game_id).await {
        world.last_error = Some(e.to_string());
        assert!(matches!(e, GameFlowError::AlreadyTerminal { .. }), "Got {e:?}");
    }
}

#[then("the cancellation is rejected")]
async fn cancellation_rejected(world: &mut RpsWorld) {
    assert!(world.last_error.is_some(), "The cancellation should have failed");
}

#[then(expr = "the sweep finished {int} game(s)")]
async fn sweep_finished(world: &mut RpsWorld, count: usize) {
    let sweep = world.last_sweep.as_ref().expect("The sweep has not run");
    assert_eq!(sweep.finished.len(), count, "{sweep:?}");
}

#[then(expr = "the sweep cancelled {int} game(s)")]
async fn sweep_cancelled(world: &mut RpsWorld, count: usize) {
    let sweep = world.last_sweep.as_ref().expect("The sweep has not run");
    assert_eq!(sweep.cancelled.len(), count, "{sweep:?}");
}

#[then(expr = "the sweep evicted {int} queue entr(y)(ies)")]
async fn sweep_evicted(world: &mut RpsWorld, count: u64) {
    let sweep = world.last_sweep.as_ref().expect("The sweep has not run");
    assert_eq!(sweep.evicted, count, "{sweep:?}");
}

//-------------------------------------------------  Ledger  -----------------------------------------------------------

#[then(expr = "the balance of {word} is {int} CF")]
async fn balance_is(world: &mut RpsWorld, name: String, amount: i64) {
    let player = world.player(&name);
    let balance = world.system().db.balance(player).await.expect("Error fetching balance");
    assert_eq!(balance, Coins::from_whole(amount), "Balance of {name}");
}

#[then("the journal for the game balances")]
async fn journal_balances(world: &mut RpsWorld) {
    let entries = world.system().db.fetch_journal_for_game(world.game_id()).await.expect("Error fetching journal");
    let sum = |types: &[JournalEntryType]| -> Coins {
        entries.iter().filter(|e| types.contains(&e.entry_type)).map(|e| e.amount).sum()
    };
    use JournalEntryType::*;
    let escrowed = sum(&[Stake, BotReserve]);
    let distributed = sum(&[Payout, Refund, BotRelease, HouseTake]);
    assert!(escrowed.is_positive());
    assert_eq!(escrowed, distributed, "Journal: {entries:?}");
    assert_eq!(escrowed, world.game().await.bank);
}

//-------------------------------------------------  Tournaments  ------------------------------------------------------

#[when("another tournament is started")]
async fn start_another(world: &mut RpsWorld) {
    if let Err(e) = world.system().tournaments().start_tournament(None).await {
        world.last_error = Some(e.to_string());
        assert!(matches!(e, TournamentError::TournamentAlreadyActive(_)), "Got {e:?}");
    }
}

#[when("the tournament is completed")]
async fn complete(world: &mut RpsWorld) {
    let api = world.system().tournaments();
    let active = api.active_tournament().await.expect("Error fetching tournament").expect("No active tournament");
    api.complete_tournament(active.id).await.expect("Error completing tournament");
}

#[when("rewards are distributed")]
async fn distribute(world: &mut RpsWorld) {
    let api = world.system().tournaments();
    let tournament = latest_tournament(world).await;
    api.distribute_rewards(tournament).await.expect("Error distributing rewards");
}

#[then("the request is rejected because a tournament is already active")]
async fn already_active(world: &mut RpsWorld) {
    assert!(world.last_error.is_some(), "A second tournament was started");
}

#[then(expr = "{word} has {int} point(s) in the tournament")]
async fn has_points(world: &mut RpsWorld, name: String, expected: i64) {
    let player = world.player(&name);
    let tournament = latest_tournament(world).await;
    let p = world
        .system()
        .tournaments()
        .participant(tournament, player)
        .await
        .expect("Error fetching participant")
        .expect("Not a participant");
    assert_eq!(p.points, expected, "Points for {name}");
}

#[then(expr = "{word} has played {int} game(s) in the tournament")]
async fn games_played(world: &mut RpsWorld, name: String, count: i64) {
    let player = world.player(&name);
    let tournament = latest_tournament(world).await;
    let p = world
        .system()
        .tournaments()
        .participant(tournament, player)
        .await
        .expect("Error fetching participant")
        .expect("Not a participant");
    assert_eq!(p.games_played, count, "Games played by {name}");
}

#[then(expr = "{word} is not in the tournament")]
async fn not_in_tournament(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let tournament = latest_tournament(world).await;
    let p = world.system().tournaments().participant(tournament, player).await.expect("Error fetching participant");
    assert!(p.is_none(), "{name} should not have scored: {p:?}");
}

#[then(expr = "the leaderboard is {string}")]
async fn leaderboard(world: &mut RpsWorld, names: String) {
    let expected = names.split(", ").map(|n| world.player(n)).collect::<Vec<_>>();
    let tournament = latest_tournament(world).await;
    let board = world.system().tournaments().top_10(tournament).await.expect("Error fetching leaderboard");
    let actual = board.iter().map(|e| e.player).collect::<Vec<_>>();
    assert_eq!(actual, expected);
    assert!(board.iter().zip(1..).all(|(e, rank)| e.rank == rank));
}

#[then(expr = "{word} is ranked {int}")]
async fn ranked(world: &mut RpsWorld, name: String, rank: i64) {
    let player = world.player(&name);
    let tournament = latest_tournament(world).await;
    let actual = world.system().tournaments().rank(tournament, player).await.expect("Error fetching rank");
    assert_eq!(actual, Some(rank));
}

/// The most recently created tournament, whatever its status. Tournament ids are allocated sequentially.
async fn latest_tournament(world: &RpsWorld) -> TournamentId {
    let db = &world.system().db;
    let mut id = TournamentId(1);
    while db.fetch_tournament(TournamentId(id.0 + 1)).await.expect("Error fetching tournament").is_some() {
        id = TournamentId(id.0 + 1);
    }
    id
}

//-------------------------------------------------  Rematches  --------------------------------------------------------

#[when(expr = "{word} asks for a rematch")]
async fn rematch_current(world: &mut RpsWorld, name: String) {
    let game_id = world.game_id();
    rematch(world, name, game_id).await;
}

#[when(expr = "{word} asks for a rematch of their last game")]
async fn rematch_last(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let history = world.system().games().recent_games(player, 1).await.expect("Error fetching recent games");
    let last = history.first().unwrap_or_else(|| panic!("{name} has not finished any games"));
    rematch(world, name, last.game_id).await;
}

async fn rematch(world: &mut RpsWorld, name: String, game_id: GameId) {
    let player = world.player(&name);
    let result = world.system().matchmaking().rematch(player, game_id).await;
    world.previous_game = Some(game_id);
    if let Ok(game) = &result {
        world.track_game(Some(game));
    }
    world.last_rematch = Some(result);
}

fn rematch_error(world: &RpsWorld) -> &MatchmakingError {
    match world.last_rematch.as_ref().expect("No rematch was asked for") {
        Ok(game) => panic!("The rematch should have been refused, but {} was started", game.id),
        Err(e) => e,
    }
}

#[then(expr = "a rematch has started between {word} and {word}")]
async fn rematch_started(world: &mut RpsWorld, first: String, second: String) {
    let (p1, p2) = (world.player(&first), world.player(&second));
    let previous = world.previous_game.expect("No rematch was asked for");
    let previous = world.system().db.fetch_game(previous).await.expect("Error fetching game").expect("No such game");
    let game = match world.last_rematch.as_ref().expect("No rematch was asked for") {
        Ok(game) => game.clone(),
        Err(e) => panic!("The rematch was refused: {e}"),
    };
    assert_ne!(game.id, previous.id);
    assert_eq!(game.status, GameStatus::Active);
    assert_eq!(game.player1_id, p1);
    assert_eq!(game.player2_id, Some(p2));
    assert_eq!(game.stake, previous.stake);
    assert_eq!(game.bank, previous.stake * 2);
}

#[then(expr = "{word} is playing the same bot again")]
async fn same_bot(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let previous = world.previous_game.expect("No rematch was asked for");
    let previous = world.system().db.fetch_game(previous).await.expect("Error fetching game").expect("No such game");
    let game = match world.last_rematch.as_ref().expect("No rematch was asked for") {
        Ok(game) => game.clone(),
        Err(e) => panic!("The rematch was refused: {e}"),
    };
    assert!(game.is_bot_game);
    assert_eq!(game.status, GameStatus::Active);
    assert_eq!(game.player1_id, player);
    assert!(game.bot_label.is_some());
    assert_eq!(game.bot_label, previous.bot_label);
    assert_eq!(game.stake, previous.stake);
}

#[then("the rematch is rejected because the game is not over")]
async fn rematch_not_over(world: &mut RpsWorld) {
    let e = rematch_error(world);
    assert!(matches!(e, MatchmakingError::GameNotOver(_)), "Got {e:?}");
}

#[then(expr = "the rematch is rejected because {word} did not play")]
async fn rematch_outsider(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let e = rematch_error(world);
    assert!(matches!(e, MatchmakingError::NotParticipant { player: p, .. } if *p == player), "Got {e:?}");
}

#[then(expr = "the rematch is rejected because {word} is busy")]
async fn rematch_busy(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let e = rematch_error(world);
    assert!(matches!(e, MatchmakingError::OpponentBusy(p) if *p == player), "Got {e:?}");
}

#[then(expr = "the rematch is rejected because {word} cannot cover the stake")]
async fn rematch_opponent_broke(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let e = rematch_error(world);
    assert!(matches!(e, MatchmakingError::OpponentCannotCover { opponent, .. } if *opponent == player), "Got {e:?}");
}

#[then("the rematch is rejected for insufficient funds")]
async fn rematch_broke(world: &mut RpsWorld) {
    let e = rematch_error(world);
    assert!(matches!(e, MatchmakingError::InsufficientFunds { .. }), "Got {e:?}");
}

#[then("the rematch is rejected because no bot is available")]
async fn rematch_no_bot(world: &mut RpsWorld) {
    let e = rematch_error(world);
    assert!(matches!(e, MatchmakingError::BotUnavailable(_)), "Got {e:?}");
}

//-------------------------------------------------  History  ----------------------------------------------------------

#[then(expr = "{word} has {int} game(s) in their history")]
async fn history_length(world: &mut RpsWorld, name: String, count: usize) {
    let player = world.player(&name);
    let history = world.system().games().recent_games(player, 10).await.expect("Error fetching recent games");
    assert_eq!(history.len(), count, "History of {name}: {history:?}");
}

#[then(expr = "the most recent game of {word} is a {word} of {int} CF against {string}")]
async fn most_recent_game(world: &mut RpsWorld, name: String, outcome: String, amount: i64, opponent: String) {
    let player = world.player(&name);
    let history = world.system().games().recent_games(player, 1).await.expect("Error fetching recent games");
    let last = history.first().unwrap_or_else(|| panic!("{name} has no finished games"));
    let expected = match outcome.as_str() {
        "win" => PlayerOutcome::Won,
        "loss" => PlayerOutcome::Lost,
        "draw" => PlayerOutcome::Draw,
        "cancellation" => PlayerOutcome::Cancelled,
        other => panic!("Unknown outcome {other}"),
    };
    assert_eq!(last.game_id, world.game_id());
    assert_eq!(last.outcome, Some(expected));
    assert_eq!(last.amount, Coins::from_whole(amount));
    assert_eq!(last.opponent, opponent);
    assert!(last.finished_at.is_some());
}

#[then(expr = "the most recent game of {word} shows the bot with its name masked")]
async fn most_recent_bot_game(world: &mut RpsWorld, name: String) {
    let player = world.player(&name);
    let label = world.game().await.bot_label.expect("Not a bot game");
    let history = world.system().games().recent_games(player, 1).await.expect("Error fetching recent games");
    let last = history.first().unwrap_or_else(|| panic!("{name} has no finished games"));
    assert_eq!(last.opponent, mask_last(&label, 3));
    assert_ne!(last.opponent, label);
    assert!(last.opponent.ends_with("***"));
}

//-------------------------------------------------  Top players  ------------------------------------------------------

#[then(expr = "the top players are {string}")]
async fn top_players(world: &mut RpsWorld, names: String) {
    let expected = names.split(", ").map(|n| world.player(n)).collect::<Vec<_>>();
    let top = world.system().games().top_players().await.expect("Error fetching top players");
    let actual = top.iter().map(|t| t.player).collect::<Vec<_>>();
    assert_eq!(actual, expected);
    assert!(top.iter().zip(1..).all(|(t, rank)| t.rank == rank));
}

#[then(expr = "{word} has {int} win(s), {int} loss(es) and {int} draw(s) from {int} game(s)")]
async fn player_record(world: &mut RpsWorld, name: String, wins: i64, losses: i64, draws: i64, games: i64) {
    let player = world.player(&name);
    let top = world.system().games().top_players().await.expect("Error fetching top players");
    let row = top.iter().find(|t| t.player == player).unwrap_or_else(|| panic!("{name} is not a top player"));
    assert_eq!((row.wins, row.losses, row.draws, row.total_games), (wins, losses, draws, games), "Record of {name}");
}

#[then(expr = "the win rate of {word} is {float}%")]
async fn win_rate(world: &mut RpsWorld, name: String, rate: f64) {
    let player = world.player(&name);
    let top = world.system().games().top_players().await.expect("Error fetching top players");
    let row = top.iter().find(|t| t.player == player).unwrap_or_else(|| panic!("{name} is not a top player"));
    assert!((row.win_rate - rate).abs() < 1e-9, "Win rate of {name} is {}", row.win_rate);
}

#[then(expr = "{word} is listed as {string}")]
async fn listed_as(world: &mut RpsWorld, name: String, masked: String) {
    let player = world.player(&name);
    let top = world.system().games().top_players().await.expect("Error fetching top players");
    let row = top.iter().find(|t| t.player == player).unwrap_or_else(|| panic!("{name} is not a top player"));
    assert_eq!(row.name, masked);
}
