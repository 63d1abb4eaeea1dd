//! `@Name` mentions in user messages.

use crate::participant::Participant;

/// Finds the roster member addressed by an `@` mention.
///
/// Names and ids match case-insensitively. A name ending in an ASCII letter
/// or digit must not run into another one (`@Bobcat` is not `@Bob`); other
/// scripts need no separator, so `@鲁迅你好` addresses 鲁迅. The earliest `@` with a match wins; at that position the
/// longest matching name wins.
pub fn detect_mention<'a>(text: &str, roster: &'a [Participant]) -> Option<&'a Participant> {
    for (at, _) in text.match_indices('@') {
        let rest = &text[at + 1..];
        let best = roster
            .iter()
            .filter_map(|p| {
                [p.name.as_str(), p.id.as_str()]
                    .into_iter()
                    .filter_map(|candidate| matched_len(rest, candidate))
                    .max()
                    .map(|len| (len, p))
            })
            .max_by_key(|(len, _)| *len);

        if let Some((_, participant)) = best {
            return Some(participant);
        }
    }
    None
}

/// Length in chars of `candidate` if `rest` starts with it.
fn matched_len(rest: &str, candidate: &str) -> Option<usize> {
    if candidate.is_empty() {
        return None;
    }
    let mut chars = rest.chars();
    let mut last = None;
    for expected in candidate.chars() {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        last = Some(expected);
    }
    let runs_on = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if runs_on(last) && runs_on(chars.next()) {
        return None;
    }
    Some(candidate.chars().count())
}

/// Draft text for addressing a roster member, e.g. `"@Kobe Bryant "`.
///
/// Does not force anything by itself; the mention takes effect when the
/// user sends a message containing it.
pub fn mention_prefill(name: &str, roster: &[Participant]) -> Option<String> {
    let name = name.trim().trim_start_matches('@');
    roster
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name) || p.id.eq_ignore_ascii_case(name))
        .map(|p| format!("@{} ", p.name))
}
