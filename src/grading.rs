//! Problem dispatch and the deterministic grading decision.
//!
//! `compute_expected` picks the verifier for a problem's algorithm family;
//! `grade` compares a parsed answer against it.

use tracing::{debug, instrument};

use crate::answer::{parse_answer, split_submission};
use crate::domain::{Algorithm, ExpectedResult, GradeOutcome, GradeReport, ParsedAnswer, Problem};
use crate::verify::{count_subarrays_xor, longest_consecutive_run, majority_element, max_subarray_sum};

/// Ground truth for `problem`. Unknown families (and a missing XOR target) yield `None`.
pub fn compute_expected(problem: &Problem) -> ExpectedResult {
  let input = problem.input.as_slice();
  match &problem.algorithm {
    Algorithm::MaximumSubarray => Some(max_subarray_sum(input)),
    Algorithm::MajorityElement => majority_element(input),
    Algorithm::LongestConsecutiveRun => Some(longest_consecutive_run(input) as i64),
    Algorithm::SubarrayXorCount => problem
      .target
      .map(|target| count_subarrays_xor(input, target) as i64),
    Algorithm::Other(_) => None,
  }
}

/// Compare a parsed answer with the expected result.
///
/// When there is no expected value (e.g. no majority), only an absent answer
/// counts as correct.
pub fn grade(parsed: ParsedAnswer, expected: ExpectedResult) -> GradeOutcome {
  match (parsed, expected) {
    (Some(p), Some(e)) if p == e => GradeOutcome::Correct,
    (None, None) => GradeOutcome::BothAbsent,
    _ => GradeOutcome::Incorrect,
  }
}

/// Full deterministic check of raw user text against a problem.
#[instrument(level = "debug", skip(raw_text, problem), fields(problem_id = %problem.id, text_len = raw_text.len()))]
pub fn grade_submission(raw_text: &str, problem: &Problem) -> GradeReport {
  let expected = compute_expected(problem);
  let parsed = parse_answer(raw_text);
  let (_, approach) = split_submission(raw_text);
  let outcome = grade(parsed, expected);
  debug!(target: "grading", ?expected, ?parsed, ?outcome, "Numeric check");
  GradeReport {
    numeric_correct: outcome.is_correct(),
    outcome,
    expected,
    parsed,
    approach,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn problem(alg: &str, input: Vec<i64>, target: Option<i64>) -> Problem {
    Problem {
      id: format!("{alg}_t"),
      algorithm: Algorithm::from(alg),
      prompt: String::new(),
      input,
      target,
    }
  }

  #[test]
  fn dispatch_per_family() {
    assert_eq!(compute_expected(&problem("kadane", vec![2, 3, -8, 7, -1, 2, 3], None)), Some(11));
    assert_eq!(compute_expected(&problem("kadane", vec![], None)), Some(0));
    assert_eq!(compute_expected(&problem("moore", vec![2, 2, 1, 1, 1, 2, 2], None)), Some(2));
    assert_eq!(compute_expected(&problem("moore", vec![1, 2, 3], None)), None);
    assert_eq!(compute_expected(&problem("longcon", vec![100, 4, 200, 1, 3, 2], None)), Some(4));
    assert_eq!(compute_expected(&problem("prefix_xor", vec![4, 2, 2, 6, 4], Some(6))), Some(4));
  }

  #[test]
  fn unknown_family_yields_none() {
    assert_eq!(compute_expected(&problem("bellman_ford", vec![1, 2], None)), None);
  }

  #[test]
  fn xor_without_target_yields_none() {
    assert_eq!(compute_expected(&problem("prefix_xor", vec![1, 2], None)), None);
  }

  #[test]
  fn grade_equal_and_unequal() {
    assert_eq!(grade(Some(7), Some(7)), GradeOutcome::Correct);
    assert_eq!(grade(Some(11), Some(7)), GradeOutcome::Incorrect);
    assert_eq!(grade(None, Some(7)), GradeOutcome::Incorrect);
  }

  // Deliberate policy: with no expected value, only "no number" is accepted.
  #[test]
  fn no_majority_requires_no_numeric_answer() {
    assert_eq!(grade(None, None), GradeOutcome::BothAbsent);
    assert!(grade(None, None).is_correct());
    assert_eq!(grade(Some(0), None), GradeOutcome::Incorrect);

    let p = problem("moore", vec![1, 2, 3], None);
    let report = grade_submission("none\nno element passes n/2", &p);
    assert!(report.numeric_correct);
    assert_eq!(report.outcome, GradeOutcome::BothAbsent);

    let report = grade_submission("1\nvoting", &p);
    assert!(!report.numeric_correct);
  }

  #[test]
  fn submission_report_carries_parsed_and_approach() {
    let p = problem("kadane", vec![2, 3, -8, 7, -1, 2, 3], None);
    let report = grade_submission("11\nKadane: keep current & max sum", &p);
    assert_eq!(report.parsed, Some(11));
    assert_eq!(report.expected, Some(11));
    assert_eq!(report.approach, "Kadane: keep current & max sum");
    assert!(report.numeric_correct);

    let report = grade_submission("the answer is 9 i think", &p);
    assert_eq!(report.parsed, Some(9));
    assert_eq!(report.outcome, GradeOutcome::Incorrect);
  }
}
