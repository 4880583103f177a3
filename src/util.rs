use chrono::NaiveDateTime;

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Whitespace-compacted, length-limited text of a response body.
pub fn body_preview(body: &[u8]) -> String {
  let compact = String::from_utf8_lossy(body)
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ");
  let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
  if compact.chars().count() > PREVIEW_CHAR_LIMIT {
    format!("{}...", preview)
  } else {
    preview
  }
}

/// "January 5, 2024"
pub fn format_date(ts: &NaiveDateTime) -> String {
  ts.format("%B %-d, %Y").to_string()
}

pub fn opt_str<'a>(val: &'a Option<String>, default: &'a str) -> &'a str {
  match val {
    Some(val) if !val.trim().is_empty() => val.as_str(),
    _ => default,
  }
}
