//! Numbered-list markers: parsing and sequential renumbering.
//!
//! Renumbering keeps a list's own scheme. A list opened with `a.` continues
//! `b.`, `c.`; one opened with `iv)` continues in lower-case roman with the
//! same delimiter.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\((?P<enclosed>\d+)\)|(?P<label>\d+|[ivxlcdm]+|[IVXLCDM]+|[A-Za-z])(?P<delim>[.)]))\s+").unwrap()
});

/// Counting style of a numbered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScheme {
    Arabic,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

/// How the counter is wrapped: `1.`, `1)` or `(1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Dot,
    Paren,
    Enclosed,
}

/// A leading list marker split from its item text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker<'t> {
    pub label: &'t str,
    pub delimiter: Delimiter,
    pub text: &'t str,
}

/// Split a leading list marker (`1.`, `2)`, `b.`, `iv)`, `(3)`) off `item`.
pub fn parse_marker(item: &str) -> Option<ListMarker<'_>> {
    let caps = MARKER_RE.captures(item)?;
    let text = &item[caps.get(0)?.end()..];
    if let Some(enclosed) = caps.name("enclosed") {
        return Some(ListMarker {
            label: enclosed.as_str(),
            delimiter: Delimiter::Enclosed,
            text,
        });
    }
    let delimiter = match caps.name("delim")?.as_str() {
        "." => Delimiter::Dot,
        _ => Delimiter::Paren,
    };
    Some(ListMarker {
        label: caps.name("label")?.as_str(),
        delimiter,
        text,
    })
}

fn is_roman(label: &str) -> bool {
    !label.is_empty()
        && (label.chars().all(|c| "ivxlcdm".contains(c))
            || label.chars().all(|c| "IVXLCDM".contains(c)))
}

/// The scheme a list is written in, judged from all of its labels so that
/// `c.` in `a. b. c.` reads as a letter while `i. ii. iii.` reads as roman.
pub fn detect_scheme(labels: &[&str]) -> Option<ListScheme> {
    let first = labels.first()?;
    if first.chars().all(|c| c.is_ascii_digit()) {
        return Some(ListScheme::Arabic);
    }
    let upper = first.chars().all(|c| c.is_ascii_uppercase());
    if labels.iter().all(|l| is_roman(l)) && (first.len() > 1 || "iIvVxX".contains(*first)) {
        return Some(if upper {
            ListScheme::UpperRoman
        } else {
            ListScheme::LowerRoman
        });
    }
    if first.len() == 1 {
        return Some(if upper {
            ListScheme::UpperAlpha
        } else {
            ListScheme::LowerAlpha
        });
    }
    None
}

/// Render counter `n` (1-based) in `scheme`.
pub fn format_counter(n: usize, scheme: ListScheme) -> String {
    match scheme {
        ListScheme::Arabic => n.to_string(),
        ListScheme::LowerAlpha => alpha(n),
        ListScheme::UpperAlpha => alpha(n).to_ascii_uppercase(),
        ListScheme::LowerRoman => roman(n),
        ListScheme::UpperRoman => roman(n).to_ascii_uppercase(),
    }
}

fn alpha(mut n: usize) -> String {
    // a..z, then aa, ab, ...
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn roman(mut n: usize) -> String {
    const TABLE: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, symbol) in TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

/// Renumber `items` sequentially in the list's own scheme and delimiter.
///
/// Returns `(marker, text)` per item. When the list carries no recognisable
/// markers every item comes back verbatim with an empty marker.
pub fn renumber(items: &[String]) -> Vec<(String, &str)> {
    let markers: Vec<Option<ListMarker<'_>>> = items.iter().map(|i| parse_marker(i)).collect();
    let labels: Vec<&str> = markers.iter().flatten().map(|m| m.label).collect();
    let first = markers.iter().flatten().next();

    let (scheme, delimiter) = match (detect_scheme(&labels), first) {
        (Some(scheme), Some(first)) => (scheme, first.delimiter),
        _ => return items.iter().map(|i| (String::new(), i.as_str())).collect(),
    };

    let mut counter = 0;
    items
        .iter()
        .zip(markers)
        .map(|(item, marker)| match marker {
            Some(marker) => {
                counter += 1;
                let label = format_counter(counter, scheme);
                let rendered = match delimiter {
                    Delimiter::Dot => format!("{}.", label),
                    Delimiter::Paren => format!("{})", label),
                    Delimiter::Enclosed => format!("({})", label),
                };
                (rendered, marker.text)
            }
            None => (String::new(), item.as_str()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_marker() {
        let m = parse_marker("(12) Twelfth").unwrap();
        assert_eq!((m.label, m.delimiter, m.text), ("12", Delimiter::Enclosed, "Twelfth"));
        let m = parse_marker("iv) Fourth").unwrap();
        assert_eq!((m.label, m.delimiter, m.text), ("iv", Delimiter::Paren, "Fourth"));
        assert!(parse_marker("No marker").is_none());
        assert!(parse_marker("3.5 apples").is_none());
        assert!(parse_marker("Dr. Smith").is_none());
    }

    #[test]
    fn test_detect_scheme() {
        assert_eq!(detect_scheme(&["3", "7"]), Some(ListScheme::Arabic));
        assert_eq!(detect_scheme(&["a", "b", "c"]), Some(ListScheme::LowerAlpha));
        assert_eq!(detect_scheme(&["i", "ii", "iii"]), Some(ListScheme::LowerRoman));
        assert_eq!(detect_scheme(&["IV", "V"]), Some(ListScheme::UpperRoman));
        assert_eq!(detect_scheme(&["C", "D"]), Some(ListScheme::UpperAlpha));
        assert_eq!(detect_scheme(&[]), None);
    }

    #[test]
    fn test_format_counter() {
        assert_eq!(format_counter(4, ListScheme::LowerRoman), "iv");
        assert_eq!(format_counter(14, ListScheme::UpperRoman), "XIV");
        assert_eq!(format_counter(2, ListScheme::LowerAlpha), "b");
        assert_eq!(format_counter(27, ListScheme::UpperAlpha), "AA");
    }

    #[test]
    fn test_renumber_keeps_scheme() {
        let letters = items(&["a. apples", "c. pears", "a) figs"]);
        let out = renumber(&letters);
        assert_eq!(out[0], ("a.".to_string(), "apples"));
        assert_eq!(out[1], ("b.".to_string(), "pears"));
        assert_eq!(out[2], ("c.".to_string(), "figs"));

        let roman_items = items(&["iv) fourth", "iv) again"]);
        let out = renumber(&roman_items);
        assert_eq!(out[0].0, "i)");
        assert_eq!(out[1].0, "ii)");

        let enclosed = items(&["(3) x", "(9) y"]);
        assert_eq!(renumber(&enclosed)[1].0, "(2)");
    }

    #[test]
    fn test_renumber_without_markers_is_verbatim() {
        let plain = items(&["one", "two"]);
        assert_eq!(renumber(&plain), vec![(String::new(), "one"), (String::new(), "two")]);
    }
}
