//! Coach commentary sanitation.

/// Marker the upstream commentary provider embeds when its quota is spent.
const QUOTA_MARKER: &str = "429 You exceeded your current quota";

pub const UNAVAILABLE_COMMENTARY: &str =
    "Coach commentary unavailable due to API limits. Please try again later.";
pub const NO_COMMENTARY: &str = "No coach commentary available";

/// Normalize a commentary string: quota failures become a fixed
/// unavailability message, missing text becomes a fixed placeholder, and
/// everything else passes through unchanged.
pub fn sanitize_commentary(commentary: Option<&str>) -> String {
    match commentary {
        Some(text) if text.contains(QUOTA_MARKER) => UNAVAILABLE_COMMENTARY.to_string(),
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_COMMENTARY.to_string(),
    }
}
