//! `@`-mention logic behind the comment and description inputs
//!
//! Carets are byte offsets into the text and must sit on a char boundary.

use super::models::User;

/// The `@query` being typed at the caret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionQuery {
    /// Byte offset of the `@`
    pub start: usize,
    /// Text between the `@` and the caret
    pub query: String,
}

/// Find the mention being typed at `caret`, if any
///
/// The `@` must open the text or follow whitespace, so addresses such as
/// `ana@example.com` never trigger suggestions. Whitespace between the `@`
/// and the caret ends the mention.
pub fn active_mention(text: &str, caret: usize) -> Option<MentionQuery> {
    if caret > text.len() || !text.is_char_boundary(caret) {
        return None;
    }

    let before = &text[..caret];
    let start = before.rfind('@')?;
    let query = &before[start + 1..];
    if query.chars().any(char::is_whitespace) {
        return None;
    }

    let opens_word = before[..start]
        .chars()
        .next_back()
        .map(char::is_whitespace)
        .unwrap_or(true);
    if !opens_word {
        return None;
    }

    Some(MentionQuery {
        start,
        query: query.to_string(),
    })
}

/// Candidates whose name contains `query`, ignoring case
///
/// An empty query matches every candidate. Input order is preserved.
pub fn filter_candidates<'a>(candidates: &'a [User], query: &str) -> Vec<&'a User> {
    let needle = query.to_lowercase();
    candidates
        .iter()
        .filter(|user| needle.is_empty() || user.name.to_lowercase().contains(&needle))
        .collect()
}

/// Replace the active `@query` with `@Name ` and return the new text and caret
///
/// Returns `None` when `caret` or `mention.start` is out of range, off a char
/// boundary, or the caret sits before the mention.
pub fn insert_mention(
    text: &str,
    mention: &MentionQuery,
    caret: usize,
    user: &User,
) -> Option<(String, usize)> {
    if caret > text.len()
        || caret < mention.start
        || !text.is_char_boundary(caret)
        || !text.is_char_boundary(mention.start)
    {
        return None;
    }

    let mut out = String::with_capacity(text.len() + user.name.len() + 2);
    out.push_str(&text[..mention.start]);
    out.push('@');
    out.push_str(&user.name);
    out.push(' ');
    let new_caret = out.len();
    out.push_str(&text[caret..]);
    Some((out, new_caret))
}

/// Users mentioned as `@Name` in finished text, in order of first mention
///
/// Matching ignores case. A name must be followed by the end of the text or
/// a character that cannot continue a name. Where names overlap
/// (`@Ana Lopez` vs `@Ana`) the longest one wins.
pub fn extract_mentions<'a>(text: &str, users: &'a [User]) -> Vec<&'a User> {
    let haystack = text.to_lowercase();
    let mut hits: Vec<(usize, usize, &User)> = Vec::new();
    for user in users.iter().filter(|user| !user.name.is_empty()) {
        let needle = format!("@{}", user.name.to_lowercase());
        for (pos, _) in haystack.match_indices(&needle) {
            if is_whole_mention(&haystack, pos, needle.len()) {
                hits.push((pos, needle.len(), user));
            }
        }
    }
    hits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut mentioned: Vec<&User> = Vec::new();
    let mut covered_until = 0;
    for (pos, len, user) in hits {
        if pos < covered_until {
            continue;
        }
        covered_until = pos + len;
        if !mentioned.iter().any(|u| u.id == user.id) {
            mentioned.push(user);
        }
    }
    mentioned
}

fn is_whole_mention(haystack: &str, pos: usize, len: usize) -> bool {
    let opens = haystack[..pos]
        .chars()
        .next_back()
        .map(char::is_whitespace)
        .unwrap_or(true);
    let closes = haystack[pos + len..]
        .chars()
        .next()
        .map(|c| !c.is_alphanumeric() && c != '_')
        .unwrap_or(true);
    opens && closes
}
