//! Small utility helpers used across modules.

/// Whole-number percentage, rounded half away from zero. Zero when `total` is zero.
pub fn percent(completed: usize, total: usize) -> u8 {
  if total == 0 {
    return 0;
  }
  let pct = (100.0 * completed as f64 / total as f64).round();
  pct.clamp(0.0, 100.0) as u8
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}
