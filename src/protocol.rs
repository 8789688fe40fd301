//! Public protocol structs for HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and clients independently.

use serde::{Deserialize, Serialize};

use crate::config::ProblemCfg;
use crate::domain::{ChatId, ExpectedResult, GradeReport, ParsedAnswer, Problem};
use crate::logic::{Evaluation, Explanation};

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub problems: usize,
    pub openai: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatIn {
    pub chat_id: ChatId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOut {
    pub chat_id: ChatId,
    pub registered: bool,
    pub changed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIn {
    pub chat_id: ChatId,
    pub text: String,
}

/// Flattened evaluation for API clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    pub problem_id: String,
    pub numeric_correct: bool,
    pub expected: ExpectedResult,
    pub parsed: ParsedAnswer,
    pub approach: String,
    pub approach_ok: bool,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed: Option<String>,
}

impl From<Evaluation> for AnswerOut {
    fn from(e: Evaluation) -> Self {
        Self {
            problem_id: e.problem_id,
            numeric_correct: e.report.numeric_correct,
            expected: e.report.expected,
            parsed: e.report.parsed,
            approach: e.report.approach,
            approach_ok: e.verdict.approach_ok,
            feedback: e.verdict.feedback,
            detailed: e.verdict.detailed,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainQuery {
    pub chat_id: ChatId,
}

pub type ExplainOut = Explanation;

/// Stateless grading: either a catalog id or an inline problem.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeIn {
    #[serde(default)]
    pub problem_id: Option<String>,
    #[serde(default)]
    pub problem: Option<ProblemCfg>,
    pub text: String,
}

pub type GradeOut = GradeReport;

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

/// Inline problems are not validated: unknown tags grade against "no result".
pub fn inline_problem(cfg: &ProblemCfg) -> Problem {
    Problem {
        id: cfg.id.clone().unwrap_or_else(|| "inline".into()),
        algorithm: cfg.alg.as_str().into(),
        prompt: cfg.prompt.clone(),
        input: cfg.input.clone(),
        target: cfg.target,
    }
}
