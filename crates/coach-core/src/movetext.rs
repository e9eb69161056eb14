//! Movetext helpers — lightweight regex-based SAN extraction and numbered
//! movetext building.

use std::sync::LazyLock;

use regex::Regex;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]*\}").unwrap());
static VARIATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static SAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O|O-O").unwrap()
});

/// Extract SAN moves from movetext (headers, comments and variations are
/// stripped first).
pub fn extract_san_moves(movetext: &str) -> Vec<String> {
    let no_headers = HEADER_RE.replace_all(movetext, "");
    let no_comments = COMMENT_RE.replace_all(&no_headers, "");
    let no_variations = VARIATION_RE.replace_all(&no_comments, "");

    SAN_RE
        .find_iter(&no_variations)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Build a numbered movetext line from SAN moves, e.g.
/// `"1. e4 e5 2. Nf3 1-0"`. The result tag is appended when given.
pub fn build_movetext(san_moves: &[String], result: Option<&str>) -> String {
    let mut out = String::new();
    for (i, san) in san_moves.iter().enumerate() {
        if i % 2 == 0 {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&format!("{}. {}", i / 2 + 1, san));
        } else {
            out.push_str(&format!(" {san}"));
        }
    }
    if let Some(result) = result {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(result);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_san_moves() {
        let movetext = r#"[White "Player1"]
[Result "1-0"]

1. e4 e5 2. Nf3 {book} Nc6 (2... d6) 3. Bb5 1-0"#;
        let moves = extract_san_moves(movetext);
        assert_eq!(moves, vec!["e4", "e5", "Nf3", "Nc6", "Bb5"]);
    }

    #[test]
    fn test_extract_empty() {
        assert!(extract_san_moves("no moves here").is_empty());
    }

    #[test]
    fn test_build_movetext() {
        let moves: Vec<String> = ["e4", "e5", "Nf3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(build_movetext(&moves, None), "1. e4 e5 2. Nf3");
        assert_eq!(build_movetext(&moves, Some("1-0")), "1. e4 e5 2. Nf3 1-0");
        assert_eq!(build_movetext(&[], Some("1/2-1/2")), "1/2-1/2");
    }
}
