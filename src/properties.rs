//! Java `.properties` reading and writing.
//!
//! Output follows `java.util.Properties::store` for an `OutputStream`: a
//! comment header, a timestamp comment, then one escaped `key=value` line per
//! entry, with non-ASCII written as `\uXXXX`. Separator and comment
//! characters are only escaped in keys, so URLs stay readable in values.
//! The parser accepts the full line grammar (`=`, `:` or whitespace
//! separators, `#`/`!` comments, backslash continuations).

use std::io::Write;

use chrono::{DateTime, Utc};

use crate::error::{ConfigureError, Result};

/// `Date::toString` layout used for the timestamp comment.
const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

/// Insertion-ordered string map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`, keeping its original position on replace.
    /// Returns the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Write all entries with a header comment and the current time.
    pub fn store<W: Write>(&self, writer: W, comment: Option<&str>) -> std::io::Result<()> {
        self.store_at(writer, comment, Utc::now())
    }

    /// Like [`Properties::store`] with an explicit timestamp.
    pub fn store_at<W: Write>(
        &self,
        mut writer: W,
        comment: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> std::io::Result<()> {
        if let Some(comment) = comment {
            write_comment(&mut writer, comment)?;
        }
        writeln!(writer, "#{}", timestamp.format(TIMESTAMP_FORMAT))?;
        for (key, value) in &self.entries {
            writeln!(writer, "{}={}", escape(key, true), escape(value, false))?;
        }
        writer.flush()
    }

    /// Parse `.properties` text. Later duplicates of a key win.
    pub fn parse(input: &str) -> Result<Self> {
        let mut props = Self::new();
        let mut lines = input.lines().enumerate();

        while let Some((idx, raw)) = lines.next() {
            let line_no = idx + 1;
            let trimmed = raw.trim_start_matches(is_blank);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let mut logical = trimmed.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                    None => break,
                }
            }

            let (key, value) = split_key_value(&logical);
            props.set(unescape(key, line_no)?, unescape(value, line_no)?);
        }

        Ok(props)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (k, v) in iter {
            props.set(k, v);
        }
        props
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// An odd number of trailing backslashes joins the next line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line at the first unescaped `=`, `:` or whitespace.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut has_separator = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' {
            key_end = i;
            has_separator = true;
            break;
        } else if is_blank(c) {
            key_end = i;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].chars();
    // Drop the separator character itself.
    rest.next();
    let mut rest = rest.as_str().trim_start_matches(is_blank);
    if !has_separator {
        if let Some(stripped) = rest.strip_prefix(['=', ':']) {
            rest = stripped.trim_start_matches(is_blank);
        }
    }
    (key, rest)
}

fn unescape(s: &str, line: usize) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(s.len());
    let mut chars = s.chars();
    let mut buf = [0u16; 2];

    while let Some(c) = chars.next() {
        if c != '\\' {
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }
        let decoded = match chars.next() {
            Some('t') => '\t',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('f') => '\x0c',
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let unit = (hex.len() == 4)
                    .then(|| u16::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .ok_or_else(|| ConfigureError::Properties {
                        line,
                        message: format!("malformed \\uxxxx encoding: \\u{hex}"),
                    })?;
                units.push(unit);
                continue;
            }
            Some(other) => other,
            // Dangling backslash at end of input.
            None => break,
        };
        units.extend_from_slice(decoded.encode_utf16(&mut buf));
    }

    Ok(String::from_utf16_lossy(&units))
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    let mut buf = [0u16; 2];

    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' if i == 0 || is_key => out.push_str("\\ "),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => {
                for unit in c.encode_utf16(&mut buf) {
                    out.push_str(&format!("\\u{unit:04X}"));
                }
            }
        }
    }
    out
}

fn write_comment<W: Write>(writer: &mut W, comment: &str) -> std::io::Result<()> {
    for line in comment.lines() {
        let line = escape_comment(line);
        if line.starts_with('#') || line.starts_with('!') {
            writeln!(writer, "{line}")?;
        } else {
            writeln!(writer, "#{line}")?;
        }
    }
    Ok(())
}

fn escape_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut buf = [0u16; 2];
    for c in line.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{unit:04X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stored(props: &Properties, comment: Option<&str>) -> String {
        let ts = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 5).unwrap();
        let mut out = Vec::new();
        props.store_at(&mut out, comment, ts).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_store_writes_header_and_entries_in_order() {
        let props: Properties = [("User", "alice"), ("Browser", "Chrome"), ("OS", "Linux")]
            .into_iter()
            .collect();

        let text = stored(&props, Some("Properties file for Allure environment"));
        assert_eq!(
            text,
            "#Properties file for Allure environment\n\
             #Mon Oct 19 08:30:05 UTC 2026\n\
             User=alice\n\
             Browser=Chrome\n\
             OS=Linux\n"
        );
    }

    #[test]
    fn test_store_without_comment_still_writes_timestamp() {
        let props: Properties = [("a", "b")].into_iter().collect();
        let text = stored(&props, None);
        assert_eq!(text, "#Mon Oct 19 08:30:05 UTC 2026\na=b\n");
    }

    #[test]
    fn test_store_keeps_url_values_verbatim() {
        let props: Properties = [("Flights.URL", "https://flights.example.com/?a=b#top")]
            .into_iter()
            .collect();
        let text = stored(&props, None);
        assert!(text.contains("Flights.URL=https://flights.example.com/?a=b#top\n"));
    }

    #[test]
    fn test_store_escapes_keys_and_values() {
        let mut props = Properties::new();
        props.set("my key", " leading and inner space");
        props.set("tab", "a\tb");
        props.set("path", "C:\\tmp");
        props.set("a=b:c", "v");
        props.set("uml", "M\u{fc}nchen");
        let text = stored(&props, None);

        assert!(text.contains("my\\ key=\\ leading and inner space\n"));
        assert!(text.contains("tab=a\\tb\n"));
        assert!(text.contains("path=C:\\\\tmp\n"));
        assert!(text.contains("a\\=b\\:c=v\n"));
        assert!(text.contains("uml=M\\u00FCnchen\n"));
    }

    #[test]
    fn test_store_multiline_comment() {
        let props = Properties::new();
        let text = stored(&props, Some("first\n!second"));
        assert!(text.starts_with("#first\n!second\n#Mon"));
    }

    #[test]
    fn test_parse_separators_and_comments() {
        let input = "# comment\n\
                     ! also comment\n\
                     \n\
                     a=1\n\
                     b : 2\n\
                     c 3\n\
                     \t  d=  4\n\
                     empty=\n\
                     bare\n";
        let props = Properties::parse(input).unwrap();

        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some("4"));
        assert_eq!(props.get("empty"), Some(""));
        assert_eq!(props.get("bare"), Some(""));
        assert_eq!(props.len(), 6);
    }

    #[test]
    fn test_parse_continuation_lines() {
        let input = "list = one, \\\n        two, \\\n        three\nnext=x\n";
        let props = Properties::parse(input).unwrap();
        assert_eq!(props.get("list"), Some("one, two, three"));
        assert_eq!(props.get("next"), Some("x"));
    }

    #[test]
    fn test_parse_escaped_backslash_is_not_continuation() {
        let props = Properties::parse("dir=C\\:\\\\\nother=1\n").unwrap();
        assert_eq!(props.get("dir"), Some("C:\\"));
        assert_eq!(props.get("other"), Some("1"));
    }

    #[test]
    fn test_parse_escapes() {
        let props = Properties::parse("key\\ with\\=sep=M\\u00FCnchen\\t!\n").unwrap();
        assert_eq!(props.get("key with=sep"), Some("M\u{fc}nchen\t!"));
    }

    #[test]
    fn test_parse_malformed_unicode_reports_line() {
        let err = Properties::parse("ok=1\nbad=\\u00G1\n").unwrap_err();
        match err {
            ConfigureError::Properties { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_reads_back_stored_output() {
        let mut props = Properties::new();
        props.set("Hotel.URL", "https://hotels.example.com/search?q=a b");
        props.set("OS", "Windows 11");
        let text = stored(&props, Some("header"));

        let back = Properties::parse(&text).unwrap();
        assert_eq!(back, props);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut props = Properties::new();
        props.set("a", "1");
        props.set("b", "2");
        assert_eq!(props.set("a", "3"), Some("1".to_string()));
        let keys: Vec<&str> = props.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(props.get("a"), Some("3"));
    }
}
