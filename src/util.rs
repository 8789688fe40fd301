//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Render an integer sequence as `[a, b, c]`.
pub fn format_input(input: &[i64]) -> String {
  let items: Vec<String> = input.iter().map(|x| x.to_string()).collect();
  format!("[{}]", items.join(", "))
}

/// Render an optional integer, `None` when absent.
pub fn format_opt(v: Option<i64>) -> String {
  v.map(|x| x.to_string()).unwrap_or_else(|| "None".into())
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(s: &str) -> String {
  s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}
