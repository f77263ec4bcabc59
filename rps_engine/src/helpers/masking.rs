/// Hides the last `count` characters of a display name, e.g. `"Charlotte"` becomes `"Charlo***"`. Names no longer than
/// `count` are hidden entirely.
pub fn mask_last(value: &str, count: usize) -> String {
    let len = value.chars().count();
    if len <= count {
        return "*".repeat(len);
    }
    let visible = value.chars().take(len - count).collect::<String>();
    format!("{visible}{}", "*".repeat(count))
}
