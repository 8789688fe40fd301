//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::grading::grade_submission;
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

fn not_found(msg: impl Into<String>) -> Response {
  (StatusCode::NOT_FOUND, Json(ErrorOut { error: msg.into() })).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, problems: state.catalog.all().len(), openai: state.openai.is_some() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_problems(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.catalog.all().to_vec())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_problem(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
  match state.catalog.get(&id) {
    Some(p) => Json(p.clone()).into_response(),
    None => not_found(format!("Unknown problem id: {}", id)),
  }
}

#[instrument(level = "info", skip(state, body), fields(chat = body.chat_id))]
pub async fn http_register(State(state): State<Arc<AppState>>, Json(body): Json<ChatIn>) -> impl IntoResponse {
  let changed = !state.sessions.is_registered(body.chat_id).await;
  logic::welcome(&state, body.chat_id).await;
  Json(ChatOut { chat_id: body.chat_id, registered: true, changed })
}

#[instrument(level = "info", skip(state, body), fields(chat = body.chat_id))]
pub async fn http_unregister(State(state): State<Arc<AppState>>, Json(body): Json<ChatIn>) -> impl IntoResponse {
  let changed = logic::stop(&state, body.chat_id).await;
  Json(ChatOut { chat_id: body.chat_id, registered: false, changed })
}

#[instrument(level = "info", skip(state, body), fields(chat = body.chat_id))]
pub async fn http_next(State(state): State<Arc<AppState>>, Json(body): Json<ChatIn>) -> Response {
  match logic::next_problem(&state, body.chat_id).await {
    Some(p) => {
      info!(target: "grading", chat = body.chat_id, id = %p.id, "HTTP problem served");
      Json(p).into_response()
    }
    None => not_found("No problems available"),
  }
}

#[instrument(level = "info", skip(state, body), fields(chat = body.chat_id, text_len = body.text.len()))]
pub async fn http_post_answer(State(state): State<Arc<AppState>>, Json(body): Json<AnswerIn>) -> Response {
  match logic::submit(&state, body.chat_id, &body.text).await {
    Some(eval) => {
      info!(target: "grading", chat = body.chat_id, id = %eval.problem_id, correct = eval.report.numeric_correct, "HTTP answer evaluated");
      Json(AnswerOut::from(eval)).into_response()
    }
    None => not_found(logic::NO_OPEN_PROBLEM_TEXT),
  }
}

#[instrument(level = "info", skip(state), fields(chat = q.chat_id))]
pub async fn http_get_explain(State(state): State<Arc<AppState>>, Query(q): Query<ExplainQuery>) -> Response {
  match logic::explain(&state, q.chat_id).await {
    Some(ex) => Json::<ExplainOut>(ex).into_response(),
    None => not_found(logic::NO_OPEN_PROBLEM_TEXT),
  }
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_grade(State(state): State<Arc<AppState>>, Json(body): Json<GradeIn>) -> Response {
  let problem = match (&body.problem, &body.problem_id) {
    (Some(cfg), _) => inline_problem(cfg),
    (None, Some(id)) => match state.catalog.get(id) {
      Some(p) => p.clone(),
      None => return not_found(format!("Unknown problem id: {}", id)),
    },
    (None, None) => {
      return (
        StatusCode::BAD_REQUEST,
        Json(ErrorOut { error: "Provide problemId or problem".into() }),
      )
        .into_response()
    }
  };
  let report: GradeOut = grade_submission(&body.text, &problem);
  Json(report).into_response()
}
