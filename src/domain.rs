//! Domain models used by the trainer: algorithm families, problems, and grading results.

use std::fmt;

use serde::{Serialize, Serializer};

/// Conversation identifier (Telegram chat id, or any caller-chosen id over HTTP).
pub type ChatId = i64;

/// Which exact algorithm computes the ground truth for a problem?
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
  /// Maximum subarray sum (Kadane).
  MaximumSubarray,
  /// Majority element, strictly more than half (Boyer–Moore voting).
  MajorityElement,
  /// Length of the longest run of consecutive integers.
  LongestConsecutiveRun,
  /// Number of subarrays whose XOR equals a target.
  SubarrayXorCount,
  /// Unrecognized tag, kept verbatim.
  Other(String),
}

impl Algorithm {
  /// Canonical wire tag.
  pub fn tag(&self) -> &str {
    match self {
      Algorithm::MaximumSubarray => "kadane",
      Algorithm::MajorityElement => "moore",
      Algorithm::LongestConsecutiveRun => "longcon",
      Algorithm::SubarrayXorCount => "prefix_xor",
      Algorithm::Other(tag) => tag,
    }
  }

  /// Does this family need a non-empty input?
  pub fn requires_input(&self) -> bool {
    matches!(
      self,
      Algorithm::MajorityElement | Algorithm::LongestConsecutiveRun | Algorithm::SubarrayXorCount
    )
  }

  pub fn requires_target(&self) -> bool {
    matches!(self, Algorithm::SubarrayXorCount)
  }
}

impl From<&str> for Algorithm {
  fn from(tag: &str) -> Self {
    match tag.trim() {
      "kadane" | "maximum_subarray" => Algorithm::MaximumSubarray,
      "moore" | "majority_element" => Algorithm::MajorityElement,
      "longcon" | "longest_consecutive" => Algorithm::LongestConsecutiveRun,
      "prefix_xor" | "subarray_xor_count" => Algorithm::SubarrayXorCount,
      other => Algorithm::Other(other.to_string()),
    }
  }
}

impl fmt::Display for Algorithm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.tag())
  }
}

impl Serialize for Algorithm {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.tag())
  }
}

/// One exercise. Immutable once loaded into the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Problem {
  pub id: String,
  pub algorithm: Algorithm,
  pub prompt: String,
  pub input: Vec<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target: Option<i64>,
}

/// Ground truth for a problem. `None` means "no result" (e.g. no majority).
pub type ExpectedResult = Option<i64>;

/// Integer extracted from user text. `None` means unparseable.
pub type ParsedAnswer = Option<i64>;

/// Outcome of the deterministic numeric check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeOutcome {
  Correct,
  Incorrect,
  /// Expected and parsed are both absent. Counted as correct.
  BothAbsent,
}

impl GradeOutcome {
  pub fn is_correct(self) -> bool {
    matches!(self, GradeOutcome::Correct | GradeOutcome::BothAbsent)
  }
}

/// Deterministic grading result for one submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
  pub numeric_correct: bool,
  pub outcome: GradeOutcome,
  pub expected: ExpectedResult,
  pub parsed: ParsedAnswer,
  /// The user's stated approach (everything after the answer).
  pub approach: String,
}

/// Qualitative judgment of the stated approach (language model or local fallback).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproachVerdict {
  pub approach_ok: bool,
  pub feedback: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detailed: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tags_and_aliases_resolve_to_the_same_family() {
    assert_eq!(Algorithm::from("kadane"), Algorithm::MaximumSubarray);
    assert_eq!(Algorithm::from("maximum_subarray"), Algorithm::MaximumSubarray);
    assert_eq!(Algorithm::from("moore"), Algorithm::MajorityElement);
    assert_eq!(Algorithm::from(" longcon "), Algorithm::LongestConsecutiveRun);
    assert_eq!(Algorithm::from("subarray_xor_count"), Algorithm::SubarrayXorCount);
    assert_eq!(Algorithm::from("dijkstra"), Algorithm::Other("dijkstra".into()));
    assert_eq!(Algorithm::from("dijkstra").tag(), "dijkstra");
  }

  #[test]
  fn both_absent_counts_as_correct() {
    assert!(GradeOutcome::Correct.is_correct());
    assert!(GradeOutcome::BothAbsent.is_correct());
    assert!(!GradeOutcome::Incorrect.is_correct());
  }

  #[test]
  fn problem_serializes_with_wire_tag_and_without_missing_target() {
    let p = Problem {
      id: "kadane_1".into(),
      algorithm: Algorithm::MaximumSubarray,
      prompt: "Find the maximum subarray sum.".into(),
      input: vec![1, -2, 3],
      target: None,
    };
    let v = serde_json::to_value(&p).unwrap();
    assert_eq!(v["algorithm"], "kadane");
    assert!(v.get("target").is_none());
  }
}
