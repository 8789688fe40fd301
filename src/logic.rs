//! Core behaviors shared by the Telegram transport, the HTTP API, and the scheduler.
//!
//! This includes:
//!   - Registering / unregistering chats
//!   - Assigning the next problem to a chat
//!   - Evaluating submissions (deterministic numeric check + approach judgment)
//!   - Explaining the current problem
//!   - Rendering chat messages (Telegram HTML)

use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::domain::{Algorithm, ApproachVerdict, ChatId, ExpectedResult, GradeReport, Problem};
use crate::grading::{compute_expected, grade_submission};
use crate::state::AppState;
use crate::util::{escape_html, format_input, trunc_for_log};

pub const WELCOME_TEXT: &str = "Welcome to the algorithm trainer! You will get a small problem every day.\n\
Reply with the numeric answer on the first line and a one-line approach on the second.\n\
Commands: /next for a new problem, /explain for the solution, /stop to unsubscribe.";

pub const HELP_TEXT: &str = "/start - subscribe to daily problems\n\
/next - get a new problem\n\
/explain - show the expected answer and how to get it\n\
/stop - unsubscribe\n\n\
To answer: first line = number (leave it out if there is no answer), second line = one-line approach.";

pub const NO_OPEN_PROBLEM_TEXT: &str = "No open problem. Send /next to get one.";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
  pub problem_id: String,
  pub report: GradeReport,
  pub verdict: ApproachVerdict,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
  pub problem_id: String,
  pub expected: ExpectedResult,
  pub explanation: String,
}

/// Register `chat` and return the welcome text.
#[instrument(level = "info", skip(state))]
pub async fn welcome(state: &AppState, chat: ChatId) -> &'static str {
  let fresh = state.sessions.register(chat).await;
  info!(target: "algo_trainer", chat, fresh, "Chat registered");
  WELCOME_TEXT
}

#[instrument(level = "info", skip(state))]
pub async fn stop(state: &AppState, chat: ChatId) -> bool {
  let removed = state.sessions.unregister(chat).await;
  info!(target: "algo_trainer", chat, removed, "Chat unregistered");
  removed
}

/// Pick a problem (not the current one when possible) and open it for `chat`.
#[instrument(level = "info", skip(state))]
pub async fn next_problem(state: &AppState, chat: ChatId) -> Option<Problem> {
  let current = state.sessions.current(chat).await;
  let Some(problem) = state.catalog.pick(current.as_ref().map(|p| p.id.as_str())).cloned() else {
    error!(target: "grading", chat, "Problem catalog is empty; nothing to send");
    return None;
  };
  state.sessions.open(chat, problem.clone()).await;
  info!(target: "grading", chat, problem_id = %problem.id, alg = %problem.algorithm, "Problem opened");
  Some(problem)
}

/// Grade `text` against the chat's open problem. `None` when nothing is open.
/// The problem stays open so the user may retry.
#[instrument(level = "info", skip(state, text), fields(text_len = text.len()))]
pub async fn submit(state: &AppState, chat: ChatId, text: &str) -> Option<Evaluation> {
  let problem = state.sessions.current(chat).await?;
  Some(evaluate(state, &problem, text).await)
}

pub async fn evaluate(state: &AppState, problem: &Problem, text: &str) -> Evaluation {
  let report = grade_submission(text, problem);
  let verdict = judge_approach(state, problem, &report).await;
  info!(
    target: "grading",
    problem_id = %problem.id,
    numeric_correct = report.numeric_correct,
    outcome = ?report.outcome,
    approach_ok = verdict.approach_ok,
    "Submission evaluated"
  );
  Evaluation { problem_id: problem.id.clone(), report, verdict }
}

async fn judge_approach(state: &AppState, problem: &Problem, report: &GradeReport) -> ApproachVerdict {
  if report.approach.trim().is_empty() {
    return ApproachVerdict {
      approach_ok: false,
      feedback: "No approach given.".into(),
      detailed: None,
    };
  }
  if let Some(oa) = &state.openai {
    match oa
      .evaluate_approach(&state.prompts, problem, &report.approach, report.parsed, report.expected)
      .await
    {
      Ok(v) => return v,
      Err(e) => {
        error!(target: "grading", problem_id = %problem.id, error = %trunc_for_log(&e, 200), "OpenAI approach judgment failed; using local judge.")
      }
    }
  }
  judge_approach_local(&problem.algorithm, &report.approach)
}

fn technique_keywords(alg: &Algorithm) -> &'static [&'static str] {
  match alg {
    Algorithm::MaximumSubarray => &["kadane", "running", "max ending", "current", "dynamic", "dp"],
    Algorithm::MajorityElement => &["boyer", "moore", "vot", "candidate", "cancel", "hash", "count"],
    Algorithm::LongestConsecutiveRun => &["set", "hash", "consecutive", "start", "sort"],
    Algorithm::SubarrayXorCount => &["prefix", "xor", "map", "frequency", "hash", "dict"],
    Algorithm::Other(_) => &[],
  }
}

fn technique_hint(alg: &Algorithm) -> &'static str {
  match alg {
    Algorithm::MaximumSubarray => "Kadane's algorithm: keep the best sum ending here and the best overall.",
    Algorithm::MajorityElement => "Boyer–Moore voting, then verify the candidate's count.",
    Algorithm::LongestConsecutiveRun => "Put values in a hash set and walk forward only from run starts.",
    Algorithm::SubarrayXorCount => "Count prefix XOR values in a map; look up xr ^ target at each step.",
    Algorithm::Other(_) => "No reference technique for this problem.",
  }
}

/// Keyword-based fallback used when the language model is unavailable.
pub fn judge_approach_local(alg: &Algorithm, approach: &str) -> ApproachVerdict {
  let lower = approach.to_lowercase();
  if lower.trim().is_empty() {
    return ApproachVerdict { approach_ok: false, feedback: "No approach given.".into(), detailed: None };
  }
  let keywords = technique_keywords(alg);
  if keywords.is_empty() {
    return ApproachVerdict {
      approach_ok: true,
      feedback: "(local) Approach noted; no reference technique to compare against.".into(),
      detailed: None,
    };
  }
  match keywords.iter().find(|k| lower.contains(*k)) {
    Some(k) => ApproachVerdict {
      approach_ok: true,
      feedback: format!("(local) Approach mentions a suitable technique ('{}').", k),
      detailed: None,
    },
    None => ApproachVerdict {
      approach_ok: false,
      feedback: "(local) Approach does not mention a known technique for this problem.".into(),
      detailed: Some(technique_hint(alg).into()),
    },
  }
}

/// Expected value for the chat's open problem plus an explanation.
#[instrument(level = "info", skip(state))]
pub async fn explain(state: &AppState, chat: ChatId) -> Option<Explanation> {
  let problem = state.sessions.current(chat).await?;
  let expected = compute_expected(&problem);

  let explanation = match &state.openai {
    Some(oa) => match oa.explain(&state.prompts, &problem, expected).await {
      Ok(t) if !t.is_empty() => t,
      Ok(_) => explain_local(&problem.algorithm),
      Err(e) => {
        error!(target: "grading", problem_id = %problem.id, error = %trunc_for_log(&e, 200), "OpenAI explain failed; using local explanation.");
        explain_local(&problem.algorithm)
      }
    },
    None => {
      debug!(target: "grading", problem_id = %problem.id, "Explanation via local text.");
      explain_local(&problem.algorithm)
    }
  };

  Some(Explanation { problem_id: problem.id, expected, explanation })
}

pub fn explain_local(alg: &Algorithm) -> String {
  match alg {
    Algorithm::MaximumSubarray =>
      "Kadane: walk once, best_here = max(x, best_here + x), best = max(best, best_here). O(n) time, O(1) space.".into(),
    Algorithm::MajorityElement =>
      "Boyer–Moore: keep a candidate and a counter (adopt on 0, +1 on match, -1 otherwise), then count the candidate to confirm it appears more than n/2 times.".into(),
    Algorithm::LongestConsecutiveRun =>
      "Put all values in a set. For each value whose predecessor is missing, count upward while the next value exists. Keep the longest run. O(n).".into(),
    Algorithm::SubarrayXorCount =>
      "Keep a running XOR and a map of how often each prefix XOR was seen (start with {0: 1}). At each step add freq[xr ^ target], then record xr. O(n).".into(),
    Algorithm::Other(tag) => format!("No explanation available for '{}'.", tag),
  }
}

// -------- Chat rendering (HTML parse mode) --------

pub fn render_problem(problem: &Problem) -> String {
  let mut out = format!(
    "<b>Problem</b> <code>{}</code>\n{}\nInput: <code>{}</code>\n",
    escape_html(&problem.id),
    escape_html(&problem.prompt),
    format_input(&problem.input),
  );
  if let Some(t) = problem.target {
    out.push_str(&format!("Target: <code>{}</code>\n", t));
  }
  out.push_str("\nReply: first line = number, second line = one-line approach.");
  out
}

fn render_expected(expected: ExpectedResult) -> String {
  match expected {
    Some(v) => v.to_string(),
    None => "no number (no valid answer exists)".into(),
  }
}

pub fn render_evaluation(eval: &Evaluation) -> String {
  let r = &eval.report;
  let mut out = if r.numeric_correct {
    "<b>Answer:</b> correct ✅\n".to_string()
  } else {
    let yours = r.parsed.map(|v| v.to_string()).unwrap_or_else(|| "no number".into());
    format!(
      "<b>Answer:</b> incorrect ❌ (yours: {}, expected: {})\n",
      yours,
      render_expected(r.expected)
    )
  };

  let v = &eval.verdict;
  out.push_str(&format!(
    "<b>Approach:</b> {}\n{}",
    if v.approach_ok { "looks good 👍" } else { "needs work" },
    escape_html(&v.feedback)
  ));
  if let Some(d) = v.detailed.as_deref().filter(|d| !d.trim().is_empty()) {
    out.push('\n');
    out.push_str(&escape_html(d));
  }
  out
}

pub fn render_explanation(ex: &Explanation) -> String {
  format!(
    "<b>Expected:</b> {}\n{}",
    render_expected(ex.expected),
    escape_html(&ex.explanation)
  )
}
