//! Coordinate move notation helpers ("e2e4", "e7e8q").

use std::sync::LazyLock;

use regex::Regex;

static COORDINATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-h][1-8][a-h][1-8][qrbnQRBN]?$").unwrap());

/// A parsed coordinate move, borrowing the origin/destination squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMove<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub promotion: Option<char>,
}

/// Parse a 4-or-5-character coordinate move. Returns `None` for anything
/// that is not well-formed.
pub fn parse_coordinate(mv: &str) -> Option<CoordinateMove<'_>> {
    if !COORDINATE_RE.is_match(mv) {
        return None;
    }
    Some(CoordinateMove {
        from: &mv[0..2],
        to: &mv[2..4],
        promotion: mv[4..].chars().next().map(|c| c.to_ascii_lowercase()),
    })
}

/// Origin/destination squares of a coordinate move, if well-formed.
pub fn split_squares(mv: &str) -> Option<(&str, &str)> {
    parse_coordinate(mv).map(|m| (m.from, m.to))
}
