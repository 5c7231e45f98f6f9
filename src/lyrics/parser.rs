//! LRC format parser
//!
//! Parses synchronized lyrics in LRC format:
//! [mm:ss.xx] Lyrics line here
//!
//! Example:
//! [ar:Some Artist]
//! [00:12.34] Hello world
//! [00:15.00] Another line
//!
//! Only the first time tag of a physical line is read. Anything after it,
//! including a second tag, is part of the line text.

use std::collections::BTreeMap;

/// A single line of lyrics with its start time
#[derive(Debug, Clone, PartialEq)]
pub struct TimedLine {
    /// Start time in seconds from the beginning of the track
    pub time_secs: f64,
    /// The lyrics text
    pub text: String,
    /// `text` split on whitespace, used by the typewriter reveal
    pub words: Vec<String>,
}

impl TimedLine {
    pub fn new(time_secs: f64, text: String) -> Self {
        let words = text.split_whitespace().map(str::to_string).collect();
        Self {
            time_secs,
            text,
            words,
        }
    }
}

/// Parsed lyrics with metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricsDocument {
    /// Free-form `[key:value]` tags
    pub metadata: BTreeMap<String, String>,
    /// Timed lines, ascending by `time_secs`
    pub lines: Vec<TimedLine>,
    /// Plain text rendition, shown when there are no timed lines
    pub plain_text: String,
}

impl LyricsDocument {
    /// Parse LRC formatted lyrics. Never fails; unrecognised lines are skipped.
    pub fn parse(content: &str) -> Self {
        let mut metadata = BTreeMap::new();
        let mut lines = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // A time tag wins over the metadata shape: "[00:12.34]" alone is an
            // empty timed line, not a tag named "00".
            if let Some((time_secs, text)) = Self::parse_timed_line(line) {
                if !text.is_empty() {
                    lines.push(TimedLine::new(time_secs, text.to_string()));
                }
                continue;
            }

            if let Some((key, value)) = Self::parse_metadata(line) {
                metadata.insert(key.to_string(), value.to_string());
            }
        }

        // Stable: equal timestamps keep their input order.
        lines.sort_by(|a, b| a.time_secs.total_cmp(&b.time_secs));

        Self {
            metadata,
            lines,
            plain_text: strip_time_tags(content),
        }
    }

    /// A document without timing information
    pub fn plain(text: &str) -> Self {
        Self {
            metadata: BTreeMap::new(),
            lines: Vec::new(),
            plain_text: text.trim().to_string(),
        }
    }

    /// Replace the derived plain text with one supplied by the lyrics source
    pub fn with_plain_text(mut self, plain: &str) -> Self {
        let plain = plain.trim();
        if !plain.is_empty() {
            self.plain_text = plain.to_string();
        }
        self
    }

    pub fn is_synced(&self) -> bool {
        !self.lines.is_empty()
    }

    /// True when there is nothing to show at all
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.plain_text.is_empty()
    }

    /// Serialize back to LRC. Metadata first (sorted by key), then timed lines.
    pub fn to_lrc(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.metadata {
            out.push_str(&format!("[{}:{}]\n", key, value));
        }
        for line in &self.lines {
            out.push_str(&format_timestamp(line.time_secs));
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }

    /// Parse a whole-line metadata tag like [ti:Title]
    fn parse_metadata(line: &str) -> Option<(&str, &str)> {
        let inner = line.strip_prefix('[')?.strip_suffix(']')?;
        let (key, value) = inner.split_once(':')?;
        if key.is_empty() || value.is_empty() {
            return None;
        }
        if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some((key, value))
    }

    /// Parse a timed line like [00:12.34]Lyrics into (seconds, trimmed text)
    fn parse_timed_line(line: &str) -> Option<(f64, &str)> {
        let (tag_len, time_secs) = parse_time_tag(line)?;
        Some((time_secs, line[tag_len..].trim()))
    }
}

/// Parse a `[mm:ss.ff]` tag at the start of `s`.
///
/// Returns the byte length of the tag and its time in seconds. Fraction digits
/// are a decimal fraction, so two digits are centiseconds. At most three
/// fraction digits are accepted, which is what `format_timestamp` can write.
fn parse_time_tag(s: &str) -> Option<(usize, f64)> {
    let rest = s.strip_prefix('[')?;
    let end = rest.find(']')?;
    let tag = &rest[..end];

    let (min, sec_frac) = tag.split_once(':')?;
    let (sec, frac) = sec_frac.split_once('.')?;
    if !all_digits(min) || !all_digits(sec) || !all_digits(frac) || frac.len() > 3 {
        return None;
    }

    let min: u64 = min.parse().ok()?;
    let sec: u64 = sec.parse().ok()?;
    let whole = min.checked_mul(60)?.checked_add(sec)?;
    let frac_value: f64 = frac.parse::<u64>().ok()? as f64 / 10f64.powi(frac.len() as i32);

    Some((end + 2, whole as f64 + frac_value))
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Format seconds as an LRC time tag
pub fn format_timestamp(time_secs: f64) -> String {
    let millis = (time_secs.max(0.0) * 1000.0).round() as u64;
    let min = millis / 60_000;
    let sec = (millis / 1000) % 60;
    let frac = millis % 1000;
    if frac % 10 == 0 {
        format!("[{:02}:{:02}.{:02}]", min, sec, frac / 10)
    } else {
        format!("[{:02}:{:02}.{:03}]", min, sec, frac)
    }
}

/// Remove every `[mm:ss.ff]` tag from `text` and trim the result
pub fn strip_time_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('[') {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match parse_time_tag(candidate) {
            Some((len, _)) => rest = &candidate[len..],
            None => {
                out.push('[');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}
