//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Decode HTML entities (named, decimal and hex) that models leak into JSON strings.
/// Single pass: `&amp;quot;` becomes `&quot;`.
pub fn decode_html_entities(s: &str) -> String {
  html_escape::decode_html_entities(s).into_owned()
}

/// Loose e-mail shape check: one `@`, something before it, a dot in the domain.
pub fn looks_like_email(s: &str) -> bool {
  let s = s.trim();
  if s.chars().any(char::is_whitespace) {
    return false;
  }
  match s.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
    }
    None => false,
  }
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
