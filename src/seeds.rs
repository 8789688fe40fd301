//! Built-in problem bank.

use crate::config::ProblemCfg;

fn entry(id: &str, alg: &str, prompt: &str, input: &[i64], target: Option<i64>) -> ProblemCfg {
  ProblemCfg {
    id: Some(id.into()),
    alg: alg.into(),
    prompt: prompt.into(),
    input: input.to_vec(),
    target,
  }
}

/// Minimal set of built-in problems that guarantee the trainer
/// is useful even without external config.
pub fn seed_problems() -> Vec<ProblemCfg> {
  vec![
    entry("kadane_1", "kadane", "Find the maximum subarray sum.", &[2, 3, -8, 7, -1, 2, 3], None),
    entry("kadane_2", "kadane", "Find the maximum subarray sum.", &[1, -2, 3, 5, -1, 2], None),
    entry("moore_1", "moore", "Find the majority element (> n/2).", &[2, 2, 1, 1, 1, 2, 2], None),
    entry("moore_2", "moore", "Find the majority element (> n/2).", &[3, 3, 4, 2, 4, 4, 2, 4, 4], None),
    entry("longcon_1", "longcon", "Find length of longest consecutive sequence.", &[100, 4, 200, 1, 3, 2], None),
    entry("xor_1", "prefix_xor", "Count subarrays with XOR == target. target=6", &[4, 2, 2, 6, 4], Some(6)),
  ]
}
