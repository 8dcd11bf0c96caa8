//! Keyword scan for emergency traffic.

/// Words that flag a text message as an emergency.
pub const EMERGENCY_KEYWORDS: [&str; 5] = ["emergency", "help", "urgent", "danger", "alarm"];

/// True if any keyword occurs anywhere in `text`, ignoring ASCII case.
///
/// Plain substring search: "helper" matches "help".
pub fn is_emergency(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    EMERGENCY_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Keywords found in `text`, in [`EMERGENCY_KEYWORDS`] order.
pub fn matched_keywords(text: &str) -> Vec<&'static str> {
    let lower = text.to_ascii_lowercase();
    EMERGENCY_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(k))
        .collect()
}
