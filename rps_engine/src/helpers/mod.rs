mod bot_names;
mod masking;

pub use bot_names::{random_bot_label, BOT_LABELS};
pub use masking::mask_last;
