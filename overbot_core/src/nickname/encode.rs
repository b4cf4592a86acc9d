use itertools::Itertools;
use overbot_models::rating::Ratings;

pub const UNRANKED: &str = "[Unranked]";

/// Builds the nickname shown for `base_name` with the given ratings, e.g.
/// `Alice [🛡2450/✚2600]`. Lengths are counted in characters and the result
/// never exceeds `max_length`.
///
/// The base name gives way to the rating suffix: it is cut to whatever room is
/// left after the suffix and a separating space, possibly down to nothing.
#[must_use]
pub fn encode(base_name: &str, ratings: &Ratings, max_length: usize) -> String {
    let suffix = suffix(ratings);
    let room = max_length.saturating_sub(suffix.chars().count() + 1);

    let mut nickname = String::with_capacity(base_name.len() + suffix.len() + 1);
    nickname.push_str(truncate(base_name, room));
    nickname.push(' ');
    nickname.push_str(&suffix);

    // Only reachable when the suffix alone does not fit.
    if nickname.chars().count() > max_length {
        nickname = truncate(&nickname, max_length).to_string();
    }
    nickname
}

fn suffix(ratings: &Ratings) -> String {
    if ratings.is_unranked() {
        return UNRANKED.to_string();
    }
    let roles = ratings
        .iter()
        .map(|(role, rating)| format!("{}{rating}", role.glyph()))
        .join("/");
    format!("[{roles}]")
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
