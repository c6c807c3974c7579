use crate::playlist::Pick;

/// Sort key for alphabetical mode.
///
/// Trimmed, lowercased, non-alphanumerics removed. A purely numeric name is
/// kept as is; otherwise a leading run of digits ("01 Intro") is dropped.
pub fn normalize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();

    if cleaned.chars().all(|c| c.is_ascii_digit()) {
        return cleaned;
    }
    cleaned
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .to_string()
}

pub(super) fn alphabetical(picks: Vec<Pick>) -> Vec<Pick> {
    let mut keyed: Vec<(String, Pick)> = picks
        .into_iter()
        .map(|p| (normalize_name(&p.track.name), p))
        .collect();
    // `sort_by` is stable: equal keys stay in tree order.
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, p)| p).collect()
}
