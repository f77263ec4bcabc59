use crate::traits::{
    BotPoolManagement,
    GameManagement,
    LedgerManagement,
    MatchmakingManagement,
    TournamentManagement,
};

/// The complete set of behaviour a backend needs to run the wagering engine.
pub trait WagerDatabase:
    Clone + LedgerManagement + BotPoolManagement + MatchmakingManagement + GameManagement + TournamentManagement
{
    /// The URL of the database
    fn url(&self) -> &str;
}
