use common::UNKNOWN_ARTIST;

const SEPARATORS: &[&str] = &[
    ", ",
    " & ",
    " and ",
    " ft. ",
    " feat. ",
    " feat ",
    " featuring ",
    " vs. ",
    " vs ",
    " with ",
];

// stands in for each separator, applied in list order
const MARKER: char = '\u{1f}';

/// Splits a raw artist credit ("A feat. B, C") into individual names.
///
/// Separators match case-insensitively. The result is never empty: a credit
/// with no usable piece falls back to the trimmed input, then to `Unknown Artist`.
pub fn split_artist_name(raw: &str) -> Vec<String> {
    let mut marked = raw.to_string();
    for sep in SEPARATORS {
        marked = replace_ignore_case(&marked, sep);
    }

    let mut names = Vec::new();
    for piece in marked.split(MARKER) {
        push_name(&mut names, piece);
    }

    if names.is_empty() {
        let trimmed = raw.trim();
        let name = if trimmed.is_empty() {
            UNKNOWN_ARTIST
        } else {
            trimmed
        };
        names.push(name.to_string());
    }
    names
}

fn replace_ignore_case(text: &str, sep: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        // separators are ASCII, so a byte match ends on a char boundary
        if starts_with_ignore_case(rest.as_bytes(), sep.as_bytes()) {
            out.push(MARKER);
            rest = &rest[sep.len()..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

fn starts_with_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

fn push_name(names: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if trimmed.is_empty() || names.iter().any(|name| name == trimmed) {
        return;
    }
    names.push(trimmed.to_string());
}

#[cfg(test)]
mod tests {
    use super::split_artist_name;

    fn split(raw: &str) -> Vec<String> {
        split_artist_name(raw)
    }

    #[test]
    fn empty_credit_is_unknown_artist() {
        assert_eq!(split(""), vec!["Unknown Artist"]);
        assert_eq!(split("   "), vec!["Unknown Artist"]);
    }

    #[test]
    fn single_artist_is_kept() {
        assert_eq!(split("A"), vec!["A"]);
        assert_eq!(split("  Daft Punk "), vec!["Daft Punk"]);
    }

    #[test]
    fn splits_common_separators() {
        assert_eq!(split("A & B"), vec!["A", "B"]);
        assert_eq!(split("A feat. B, C"), vec!["A", "B", "C"]);
        assert_eq!(split("A ft. B"), vec!["A", "B"]);
        assert_eq!(split("A featuring B"), vec!["A", "B"]);
        assert_eq!(split("A feat B"), vec!["A", "B"]);
        assert_eq!(split("A vs. B vs C"), vec!["A", "B", "C"]);
        assert_eq!(split("A with B and C"), vec!["A", "B", "C"]);
    }

    #[test]
    fn separators_ignore_case() {
        assert_eq!(split("A FEAT. B"), vec!["A", "B"]);
        assert_eq!(split("Simon AND Garfunkel"), vec!["Simon", "Garfunkel"]);
    }

    #[test]
    fn words_inside_names_are_not_separators() {
        assert_eq!(split("Andromeda"), vec!["Andromeda"]);
        assert_eq!(split("Withered Hand"), vec!["Withered Hand"]);
        assert_eq!(split("Feature Film"), vec!["Feature Film"]);
    }

    #[test]
    fn drops_empty_pieces_and_duplicates() {
        assert_eq!(split("A, , B"), vec!["A", "B"]);
        assert_eq!(split("A & A"), vec!["A"]);
        assert_eq!(split(" & "), vec!["&"]);
    }

    #[test]
    fn earlier_separators_win_overlaps() {
        assert_eq!(split("X with and Y"), vec!["X with", "Y"]);
        assert_eq!(split("A, B & C"), vec!["A", "B", "C"]);
    }

    #[test]
    fn keeps_non_ascii_names_intact() {
        assert_eq!(split("Sigur Rós & Björk"), vec!["Sigur Rós", "Björk"]);
    }

    #[test]
    fn is_deterministic() {
        let raw = "X feat. Y & Z";
        assert_eq!(split(raw), split(raw));
        assert!(!split(raw).is_empty());
    }
}
