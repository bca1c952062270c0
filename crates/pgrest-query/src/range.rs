//! `Content-Range` parsing.

/// Total row count from a `Content-Range` value such as `0-9/123`.
///
/// Returns `None` for `0-9/*`, for values without a `/`, and for anything
/// after the last `/` that is not purely ASCII digits.
pub fn parse_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.rsplit_once('/')?;
    if total.is_empty() || !total.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    total.parse().ok()
}
