//! Text normalization for track titles and artist names

use std::collections::HashSet;

/// Words that mark a dash-separated suffix as a release decoration
/// (e.g. `"Yesterday - Remastered 2009"`)
const DECORATION_WORDS: [&str; 14] = [
    "remaster",
    "live",
    "version",
    "edit",
    "mono",
    "stereo",
    "single",
    "radio",
    "explicit",
    "clean",
    "deluxe",
    "bonus",
    "anniversary",
    "demo",
];

/// Inflections accepted after a decoration word ("remastered", "edits")
const DECORATION_ENDINGS: [&str; 4] = ["", "s", "d", "ed"];

const DASHES: [&str; 3] = [" - ", " – ", " — "];

const FEATURING: [&str; 5] = [" feat. ", " feat ", " ft. ", " ft ", " featuring "];

/// Remove `(...)`, `[...]` and `{...}` segments, including nested ones
///
/// An unclosed bracket keeps the text after it.
pub fn strip_bracketed(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut depth = 0usize;
    let mut pending = String::new();

    for c in input.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
            }
            ')' | ']' | '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    pending.clear();
                    out.push(' ');
                }
            }
            _ if depth > 0 => pending.push(c),
            _ => out.push(c),
        }
    }

    if depth > 0 {
        out.push(' ');
        out.push_str(&pending);
    }

    out
}

/// Normalize a track title for comparison
///
/// Lowercases, drops bracketed segments, dash-separated decoration
/// suffixes and featuring clauses, removes punctuation and collapses
/// whitespace.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = strip_bracketed(&lowered);
    let undecorated = strip_decoration_suffix(&stripped);
    let solo = strip_featuring(undecorated);
    clean_text(solo)
}

/// Normalize an artist name for comparison
pub fn normalize_name(name: &str) -> String {
    clean_text(&name.to_lowercase())
}

/// Whitespace-split token set of an already normalized string
pub fn token_set(normalized: &str) -> HashSet<&str> {
    normalized.split_whitespace().collect()
}

/// Jaccard overlap of the whitespace tokens of two normalized strings
///
/// Returns 0.0 when either side has no tokens.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let a = token_set(a);
    let b = token_set(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    intersection as f64 / union as f64
}

/// Drop trailing dash segments that are release decorations
///
/// Only the last segment is examined each round, so a decoration in the
/// middle of a title keeps everything around it.
fn strip_decoration_suffix(title: &str) -> &str {
    let mut end = title.len();

    while let Some((pos, len)) = last_dash(&title[..end]) {
        if !is_decoration(&title[pos + len..end]) {
            break;
        }
        end = pos;
    }

    &title[..end]
}

fn last_dash(title: &str) -> Option<(usize, usize)> {
    DASHES
        .iter()
        .filter_map(|dash| title.rfind(dash).map(|pos| (pos, dash.len())))
        .max_by_key(|(pos, _)| *pos)
}

fn is_decoration(segment: &str) -> bool {
    segment.split_whitespace().any(|word| {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        DECORATION_WORDS.iter().any(|stem| {
            word.strip_prefix(stem)
                .is_some_and(|rest| DECORATION_ENDINGS.contains(&rest))
        })
    })
}

fn strip_featuring(title: &str) -> &str {
    FEATURING
        .iter()
        .filter_map(|f| title.find(f))
        .min()
        .map_or(title, |end| &title[..end])
}

fn clean_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_alphanumeric() {
            out.push(c);
        } else if matches!(c, '\'' | '’' | '`') {
            // Apostrophes join words ("don't" -> "dont")
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bracketed() {
        assert_eq!(strip_bracketed("Song (Remastered)").trim(), "Song");
        assert_eq!(strip_bracketed("Song [Live] (feat. X)").trim(), "Song");
        assert_eq!(strip_bracketed("A (b (c) d) E"), "A   E");
        assert_eq!(strip_bracketed("Unclosed (part").trim(), "Unclosed  part");
    }

    #[test]
    fn test_normalize_title_basics() {
        assert_eq!(normalize_title("  Hello,   World! "), "hello world");
        assert_eq!(normalize_title("Don't Stop Me Now"), "dont stop me now");
        assert_eq!(normalize_title("Yesterday (Remastered 2009)"), "yesterday");
    }

    #[test]
    fn test_normalize_title_strips_decoration_suffix() {
        assert_eq!(normalize_title("Yesterday - Remastered 2009"), "yesterday");
        assert_eq!(normalize_title("Song - Radio Edit"), "song");
        assert_eq!(normalize_title("Song – Live at Wembley"), "song");
        // Not a decoration, keep both halves
        assert_eq!(normalize_title("Part One - Part Two"), "part one part two");
    }

    #[test]
    fn test_decoration_needs_whole_word() {
        assert_eq!(normalize_title("Song - Democracy"), "song democracy");
        assert_eq!(normalize_title("Song - Editorial"), "song editorial");
        assert_eq!(normalize_title("Song - Lively"), "song lively");
        assert_eq!(normalize_title("Song - Radio Edits"), "song");
    }

    #[test]
    fn test_only_trailing_decorations_are_stripped() {
        assert_eq!(normalize_title("Song - Part 2 - Live"), "song part 2");
        assert_eq!(
            normalize_title("Yesterday - Remastered 2009 - Mono"),
            "yesterday"
        );
        assert_eq!(normalize_title("Live - Forever Young"), "live forever young");
    }

    #[test]
    fn test_normalize_title_strips_featuring() {
        assert_eq!(normalize_title("Stay feat. Justin Bieber"), "stay");
        assert_eq!(normalize_title("Stay (feat. Justin Bieber)"), "stay");
        assert_eq!(normalize_title("Song ft. Someone"), "song");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("AC/DC"), "ac dc");
        assert_eq!(normalize_name("  The   Beatles "), "the beatles");
        assert_eq!(normalize_name("Beyoncé"), "beyoncé");
    }

    #[test]
    fn test_token_overlap() {
        assert_eq!(token_overlap("a b c", "a b c"), 1.0);
        assert_eq!(token_overlap("a b", "b c"), 1.0 / 3.0);
        assert_eq!(token_overlap("", "a"), 0.0);
        assert_eq!(token_overlap("a", "b"), 0.0);
    }
}
