//! Extracting the numeric answer and the one-line approach from free-form user text.

use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::ParsedAnswer;

lazy_static! {
  /// Optional minus sign followed by ASCII digits, anywhere in the line.
  static ref EMBEDDED_INT: Regex = Regex::new(r"-?[0-9]+").unwrap();
}

/// First non-blank line, trimmed.
pub fn answer_line(text: &str) -> Option<&str> {
  text.lines().map(str::trim).find(|l| !l.is_empty())
}

/// Parse the answer from raw text.
///
/// Tries the first whitespace-delimited token of the answer line as an integer,
/// then falls back to the first `-?[0-9]+` match on that line. Values that do not
/// fit in `i64` are treated as unparseable.
pub fn parse_answer(text: &str) -> ParsedAnswer {
  let line = answer_line(text)?;
  let first_token = line.split_whitespace().next()?;
  if let Ok(v) = first_token.parse::<i64>() {
    return Some(v);
  }
  EMBEDDED_INT
    .find(line)
    .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Split a submission into `(answer_line, approach)`.
///
/// The approach is every following non-blank line joined by a space; if there are
/// none, it is whatever follows the first token of the answer line.
pub fn split_submission(text: &str) -> (String, String) {
  let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
  let Some(first) = lines.next() else {
    return (String::new(), String::new());
  };

  let rest: Vec<&str> = lines.collect();
  let approach = if rest.is_empty() {
    first
      .split_once(char::is_whitespace)
      .map(|(_, tail)| tail.trim().to_string())
      .unwrap_or_default()
  } else {
    rest.join(" ")
  };
  (first.to_string(), approach)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clean_number_on_first_line() {
    let text = "11\nKadane: keep current & max sum";
    assert_eq!(parse_answer(text), Some(11));
    assert_eq!(
      split_submission(text),
      ("11".to_string(), "Kadane: keep current & max sum".to_string())
    );
  }

  #[test]
  fn signed_tokens() {
    assert_eq!(parse_answer("-4"), Some(-4));
    assert_eq!(parse_answer("+5 done"), Some(5));
  }

  #[test]
  fn embedded_in_prose_falls_back_to_pattern() {
    assert_eq!(parse_answer("the answer is -4 because..."), Some(-4));
    assert_eq!(parse_answer("ans=42, via voting"), Some(42));
  }

  #[test]
  fn non_ascii_digits_do_not_shadow_ascii_ones() {
    assert_eq!(parse_answer("answer \u{0663} or maybe 7"), Some(7));
    assert_eq!(parse_answer("\u{0663}\u{0664}"), None);
  }

  #[test]
  fn leading_blank_lines_are_skipped() {
    assert_eq!(parse_answer("\n   \n  7  \nrunning sum"), Some(7));
    assert_eq!(answer_line("\n\n  x 1 \n"), Some("x 1"));
  }

  #[test]
  fn only_the_answer_line_is_scanned() {
    assert_eq!(parse_answer("no idea\n42"), None);
  }

  #[test]
  fn unparseable_is_absent() {
    assert_eq!(parse_answer(""), None);
    assert_eq!(parse_answer("   \n\t"), None);
    assert_eq!(parse_answer("none, no majority"), None);
    assert_eq!(parse_answer("99999999999999999999999"), None);
  }

  #[test]
  fn approach_from_same_line_when_single_line() {
    assert_eq!(
      split_submission("4  hash set, walk from run starts"),
      ("4  hash set, walk from run starts".to_string(), "hash set, walk from run starts".to_string())
    );
    assert_eq!(split_submission("4"), ("4".to_string(), String::new()));
  }

  #[test]
  fn multi_line_approach_is_joined() {
    let (_, approach) = split_submission("3\nprefix xor\n\n  with a counter map ");
    assert_eq!(approach, "prefix xor with a counter map");
  }
}
