//! Display formatting for raw catalog fields.
//!
//! None of these functions fail: unparseable input degrades to a placeholder
//! (`""`, `"-"`, `"日付不明"`) at the point of formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Placeholder for an unknown publish date.
pub const UNKNOWN_DATE: &str = "日付不明";

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").expect("static duration pattern")
});

// --- Durations ---

/// Parse an ISO-8601 (`PT#H#M#S`) or colon-delimited (`H:MM:SS`, `MM:SS`) duration into seconds.
///
/// Absent, empty, `P0D`, or unparseable input yields `None`.
pub fn parse_duration(raw: &str) -> Option<u64> {
  let raw = raw.trim();
  if raw.is_empty() || raw == "P0D" {
    return None;
  }

  if let Some(caps) = ISO_DURATION.captures(raw) {
    if caps.iter().skip(1).all(|m| m.is_none()) {
      return None;
    }
    let field = |i: usize| -> Option<u64> {
      match caps.get(i) {
        Some(m) => m.as_str().parse().ok(),
        None => Some(0),
      }
    };
    let (d, h, m, s) = (field(1)?, field(2)?, field(3)?, field(4)?);
    return sexagesimal(d.checked_mul(24)?.checked_add(h)?, m, s);
  }

  let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
  let num = |s: &str| s.parse::<u64>().ok();
  match parts.as_slice() {
    [h, m, s] => sexagesimal(num(h)?, num(m)?, num(s)?),
    [m, s] => sexagesimal(0, num(m)?, num(s)?),
    _ => None,
  }
}

/// `(h * 60 + m) * 60 + s`, or `None` past `u64`.
fn sexagesimal(h: u64, m: u64, s: u64) -> Option<u64> {
  h.checked_mul(60)?.checked_add(m)?.checked_mul(60)?.checked_add(s)
}

/// Total seconds used by the duration comparators; missing or unparseable is `0`.
pub fn duration_seconds(raw: Option<&str>) -> u64 {
  raw.and_then(parse_duration).unwrap_or(0)
}

/// Format a duration as `H:MM:SS` or `M:SS`; empty when there is no usable duration.
pub fn format_duration(raw: Option<&str>) -> String {
  let Some(total) = raw.and_then(parse_duration) else {
    return String::new();
  };
  let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
  if h > 0 { format!("{}:{:02}:{:02}", h, m, s) } else { format!("{}:{:02}", m, s) }
}

// --- Counts ---

/// Group digits with commas: `1234567` -> `1,234,567`.
pub fn thousands(n: u64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}

/// `>= 10,000` renders as `X.Y万` (half-up to one decimal), smaller counts with
/// thousands separators, a missing count as `-`.
pub fn format_view_count(count: Option<u64>) -> String {
  match count {
    None => "-".to_string(),
    Some(n) if n >= 10_000 => {
      let tenths = (n + 500) / 1000;
      format!("{}.{}万", tenths / 10, tenths % 10)
    }
    Some(n) => thousands(n),
  }
}

// --- Timestamps ---

/// Parse a catalog timestamp. RFC 3339 first, then a zone-less date-time or a
/// bare date, both read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(naive.and_utc());
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc())
}

/// Elapsed time from `published` to `now`, bucketed into the largest non-zero unit.
pub fn format_relative_time(published: &str, now: DateTime<Utc>) -> String {
  let Some(ts) = parse_timestamp(published) else {
    return "-".to_string();
  };
  let seconds = (now - ts).num_milliseconds().div_euclid(1000);
  if seconds < 0 {
    return "未来".to_string();
  }
  let minutes = seconds / 60;
  let hours = minutes / 60;
  let days = hours / 24;
  let months = days / 30;
  let years = days / 365;

  if years > 0 {
    format!("{}年前", years)
  } else if months > 0 {
    format!("{}ヶ月前", months)
  } else if days > 0 {
    format!("{}日前", days)
  } else if hours > 0 {
    format!("{}時間前", hours)
  } else if minutes > 0 {
    format!("{}分前", minutes)
  } else {
    format!("{}秒前", seconds)
  }
}

/// `YYYY/MM/DD` of the timestamp's UTC calendar date.
pub fn format_utc_date(published: &str) -> Option<String> {
  parse_timestamp(published).map(|ts| ts.format("%Y/%m/%d").to_string())
}

/// Split the raw `YYYY-MM-DD` segment off a timestamp without any timezone conversion.
pub fn raw_date_parts(published: &str) -> Option<(&str, &str, &str)> {
  let date = published.trim().split('T').next()?;
  let mut parts = date.split('-');
  let (y, m, d) = (parts.next()?, parts.next()?, parts.next()?);
  let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
  if parts.next().is_some() || !numeric(y) || !numeric(m) || !numeric(d) {
    return None;
  }
  Some((y, m, d))
}

/// `YYYY年MM月DD日` built from the raw date segments, or the unknown-date placeholder.
pub fn format_jp_date(published: Option<&str>) -> String {
  match published.and_then(raw_date_parts) {
    Some((y, m, d)) => format!("{}年{}月{}日", y, m, d),
    None => UNKNOWN_DATE.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn duration_shape_ok(s: &str) -> bool {
    let re = Regex::new(r"^(\d+:)?\d{1,2}:\d{2}$").unwrap();
    s.is_empty() || re.is_match(s)
  }

  // --- format_duration ---

  #[test]
  fn duration_iso_with_hours() {
    assert_eq!(format_duration(Some("PT1H2M3S")), "1:02:03");
  }

  #[test]
  fn duration_iso_minutes_only() {
    assert_eq!(format_duration(Some("PT4M5S")), "4:05");
    assert_eq!(format_duration(Some("PT45S")), "0:45");
  }

  #[test]
  fn duration_colon_forms() {
    assert_eq!(format_duration(Some("5:09")), "5:09");
    assert_eq!(format_duration(Some("1:02:03")), "1:02:03");
    assert_eq!(format_duration(Some("0:12:30")), "12:30");
  }

  #[test]
  fn duration_zero_or_missing_is_empty() {
    assert_eq!(format_duration(Some("P0D")), "");
    assert_eq!(format_duration(Some("")), "");
    assert_eq!(format_duration(None), "");
  }

  #[test]
  fn duration_garbage_is_empty() {
    assert_eq!(format_duration(Some("abc")), "");
    assert_eq!(format_duration(Some("1:2:3:4")), "");
    assert_eq!(format_duration(Some("x:10")), "");
    assert_eq!(format_duration(Some("PT")), "");
  }

  #[test]
  fn duration_overflowing_minutes_roll_into_hours() {
    assert_eq!(format_duration(Some("PT150M")), "2:30:00");
    assert_eq!(format_duration(Some("75:30")), "1:15:30");
  }

  #[test]
  fn duration_too_large_for_u64_is_empty() {
    assert_eq!(parse_duration("P999999999999999999D"), None);
    assert_eq!(format_duration(Some("P999999999999999999D")), "");
    assert_eq!(format_duration(Some("PT99999999999999999999H")), "");
    assert_eq!(parse_duration("99999999999999999:00:00"), None);
    assert_eq!(format_duration(Some("99999999999999999:00:00")), "");
    assert_eq!(format_duration(Some("999999999999999999:00")), "");
    assert_eq!(duration_seconds(Some("P999999999999999999D")), 0);
  }

  #[test]
  fn duration_output_shape_holds() {
    for raw in ["PT1H2M3S", "5:09", "P0D", "PT59S", "P1DT1M", "99:99", "nonsense", "10:00:00", "PT3600S"] {
      let out = format_duration(Some(raw));
      assert!(duration_shape_ok(&out), "{raw} -> {out}");
    }
  }

  #[test]
  fn duration_seconds_defaults_to_zero() {
    assert_eq!(duration_seconds(Some("PT1H")), 3600);
    assert_eq!(duration_seconds(Some("2:00")), 120);
    assert_eq!(duration_seconds(Some("bad")), 0);
    assert_eq!(duration_seconds(None), 0);
  }

  // --- format_view_count ---

  #[test]
  fn view_count_below_threshold_uses_separators() {
    assert_eq!(format_view_count(Some(9999)), "9,999");
    assert_eq!(format_view_count(Some(0)), "0");
    assert_eq!(format_view_count(Some(999)), "999");
  }

  #[test]
  fn view_count_man_units() {
    assert_eq!(format_view_count(Some(15000)), "1.5万");
    assert_eq!(format_view_count(Some(10000)), "1.0万");
    assert_eq!(format_view_count(Some(12500)), "1.3万");
    assert_eq!(format_view_count(Some(1_234_567)), "123.5万");
  }

  #[test]
  fn view_count_missing() {
    assert_eq!(format_view_count(None), "-");
  }

  #[test]
  fn thousands_grouping() {
    assert_eq!(thousands(1_234_567), "1,234,567");
    assert_eq!(thousands(100), "100");
    assert_eq!(thousands(1000), "1,000");
  }

  // --- format_relative_time ---

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
  }

  #[test]
  fn relative_time_buckets() {
    assert_eq!(format_relative_time("2022-05-01T12:00:00Z", now()), "2年前");
    assert_eq!(format_relative_time("2024-03-01T12:00:00Z", now()), "3ヶ月前");
    assert_eq!(format_relative_time("2024-05-29T12:00:00Z", now()), "3日前");
    assert_eq!(format_relative_time("2024-06-01T07:00:00Z", now()), "5時間前");
    assert_eq!(format_relative_time("2024-06-01T11:45:00Z", now()), "15分前");
    assert_eq!(format_relative_time("2024-06-01T11:59:30Z", now()), "30秒前");
  }

  #[test]
  fn relative_time_future_and_invalid() {
    assert_eq!(format_relative_time("2024-06-02T00:00:00Z", now()), "未来");
    assert_eq!(format_relative_time("not a date", now()), "-");
  }

  // --- dates ---

  #[test]
  fn utc_date_ignores_offset_direction() {
    assert_eq!(format_utc_date("2024-03-15T10:00:00Z").as_deref(), Some("2024/03/15"));
    assert_eq!(format_utc_date("2024-03-15T23:30:00-05:00").as_deref(), Some("2024/03/16"));
    assert_eq!(format_utc_date("2024-03-15").as_deref(), Some("2024/03/15"));
    assert_eq!(format_utc_date("garbage"), None);
  }

  #[test]
  fn jp_date_uses_raw_segments() {
    assert_eq!(format_jp_date(Some("2024-03-15T23:30:00-05:00")), "2024年03月15日");
    assert_eq!(format_jp_date(Some("2024-3")), UNKNOWN_DATE);
    assert_eq!(format_jp_date(None), UNKNOWN_DATE);
  }
}
