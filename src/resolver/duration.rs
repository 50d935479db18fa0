//! Compact duration literal parsing: `5s`, `1h30m`, `250ms`, …

use std::time::Duration;

/// A single numeric-value/unit pair within a duration literal, e.g. the
/// `1h` in `1h30m`.
struct Part {
    value: f64,
    unit_nanos: f64,
}

/// Parses a compact duration literal: one or more `<number><unit>` runs
/// back to back, each unit one of `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`.
/// Negative and fractional numbers are accepted per part (`-1.5h`).
/// Returns `None` for a bare integer with no unit, an empty string, or any
/// unrecognized unit — the resolver turns that into an `invalid duration`
/// diagnostic at the call site rather than this function reporting one
/// itself, so it stays a free function with no diagnostic plumbing.
pub fn parse(src: &str) -> Option<Duration> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    let mut rest = src;
    let mut total_nanos = 0.0f64;
    let mut saw_part = false;
    while !rest.is_empty() {
        let part = parse_one_part(rest)?;
        total_nanos += part.0.value * part.0.unit_nanos;
        rest = part.1;
        saw_part = true;
    }
    if !saw_part || total_nanos < 0.0 {
        return None;
    }
    Some(Duration::from_nanos(total_nanos.round() as u64))
}

/// Parses exactly one `<number><unit>` run off the front of `s`, returning
/// the parsed part and the remaining unparsed tail.
fn parse_one_part(s: &str) -> Option<(Part, &str)> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let digits_start = i;
    while bytes.get(i).map(|b| b.is_ascii_digit()).unwrap_or(false) {
        i += 1;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while bytes.get(i).map(|b| b.is_ascii_digit()).unwrap_or(false) {
            i += 1;
        }
    }
    if i == digits_start {
        return None;
    }
    let number: f64 = s[..i].parse().ok()?;

    // Units are ASCII except `µs`, whose prefix is the two-byte UTF-8
    // encoding of U+00B5 or U+03BC (both seen in the wild for "micro").
    let unit_start = i;
    let tail = &s[unit_start..];
    let (unit_len, unit_nanos) = if let Some(stripped) = tail.strip_prefix("ns") {
        let _ = stripped;
        (2, 1.0)
    } else if let Some(stripped) = tail.strip_prefix("us") {
        let _ = stripped;
        (2, 1_000.0)
    } else if tail.starts_with('\u{00b5}') || tail.starts_with('\u{03bc}') {
        let prefix_len = tail.chars().next().map(|c| c.len_utf8()).unwrap_or(0);
        if tail[prefix_len..].starts_with('s') {
            (prefix_len + 1, 1_000.0)
        } else {
            return None;
        }
    } else if tail.strip_prefix("ms").is_some() {
        (2, 1_000_000.0)
    } else if tail.starts_with('s') {
        (1, 1_000_000_000.0)
    } else if tail.starts_with('m') {
        (1, 60.0 * 1_000_000_000.0)
    } else if tail.starts_with('h') {
        (1, 3_600.0 * 1_000_000_000.0)
    } else {
        return None;
    };

    Some((
        Part {
            value: number,
            unit_nanos,
        },
        &s[unit_start + unit_len..],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_seconds() {
        assert_eq!(parse("5s"), Some(Duration::from_secs(5)));
    }

    #[test]
    fn milliseconds() {
        assert_eq!(parse("250ms"), Some(Duration::from_millis(250)));
    }

    #[test]
    fn compound_hours_minutes() {
        assert_eq!(parse("1h30m"), Some(Duration::from_secs(90 * 60)));
    }

    #[test]
    fn ascii_microseconds_alias() {
        assert_eq!(parse("10us"), Some(Duration::from_micros(10)));
    }

    #[test]
    fn micro_sign_microseconds() {
        assert_eq!(parse("10\u{00b5}s"), Some(Duration::from_micros(10)));
    }

    #[test]
    fn bare_integer_without_unit_is_rejected() {
        assert_eq!(parse("5"), None);
    }

    #[test]
    fn empty_string_is_rejected() {
        assert_eq!(parse(""), None);
    }

    #[test]
    fn unknown_unit_is_rejected() {
        assert_eq!(parse("5d"), None);
    }

    #[test]
    fn negative_duration_is_rejected() {
        assert_eq!(parse("-5s"), None);
    }
}
