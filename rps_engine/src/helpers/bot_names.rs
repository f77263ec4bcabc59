use rand::{seq::SliceRandom, Rng};

/// Display names for house bots. Bots are presented to players as ordinary opponents.
pub const BOT_LABELS: [&str; 50] = [
    "Alex", "Max", "Sam", "Jordan", "Taylor", "Casey", "Morgan", "Riley", "Avery", "Quinn", "Dakota", "Sage", "River",
    "Phoenix", "Skyler", "Cameron", "Drew", "Blake", "Hayden", "Reese", "Parker", "Finley", "Rowan", "Emery", "Kai",
    "Logan", "Jamie", "Dylan", "Aiden", "Noah", "Ethan", "Liam", "Mason", "Lucas", "Oliver", "Aria", "Emma", "Mia",
    "Sophia", "Isabella", "Olivia", "Charlotte", "Amelia", "Harper", "Evelyn", "Abigail", "Emily", "Elizabeth", "Sofia",
    "Ella",
];

/// Picks a bot label uniformly at random.
pub fn random_bot_label<R: Rng + ?Sized>(rng: &mut R) -> String {
    BOT_LABELS.choose(rng).copied().unwrap_or("Alex").to_string()
}
