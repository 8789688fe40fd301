//! Telegram Bot API transport: long polling, command routing, and message delivery.
//!
//! Only `getUpdates` and `sendMessage` are used. Replies are sent with HTML parse mode.
//! NOTE: We never log the bot token (it is part of the request URL).

use std::{sync::Arc, time::Duration};

use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::ChatId;
use crate::logic;
use crate::state::AppState;

const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct Telegram {
  pub client: reqwest::Client,
  token: String,
  pub base_url: String,
}

/// A parsed inbound chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
  Start,
  Stop,
  Next,
  Explain,
  Help,
  Unknown(String),
  /// Not a command: an answer submission.
  Text(String),
}

impl Command {
  pub fn parse(text: &str) -> Self {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
      return Command::Text(text.to_string());
    };
    let word = rest.split_whitespace().next().unwrap_or("");
    // "/next@my_bot" addresses a specific bot in group chats.
    let name = word.split('@').next().unwrap_or("").to_lowercase();
    match name.as_str() {
      "start" => Command::Start,
      "stop" => Command::Stop,
      "next" | "problem" => Command::Next,
      "explain" => Command::Explain,
      "help" => Command::Help,
      _ => Command::Unknown(name),
    }
  }
}

impl Telegram {
  /// Construct the client if we find TELEGRAM_TOKEN; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let token = std::env::var("TELEGRAM_TOKEN").ok().filter(|t| !t.trim().is_empty())?;
    let base_url =
      std::env::var("TELEGRAM_BASE_URL").unwrap_or_else(|_| "https://api.telegram.org".into());
    Self::new(token, base_url)
  }

  pub fn new(token: String, base_url: String) -> Option<Self> {
    let client = reqwest::Client::builder()
      // Long polls hold the connection for POLL_TIMEOUT_SECS.
      .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
      .build()
      .ok()?;
    Some(Self { client, token, base_url })
  }

  fn method_url(&self, method: &str) -> String {
    format!("{}/bot{}/{}", self.base_url.trim_end_matches('/'), self.token, method)
  }

  async fn call<B: Serialize, T: for<'a> Deserialize<'a>>(&self, method: &str, body: &B) -> Result<T, String> {
    let res = self.client.post(self.method_url(method))
      .header(USER_AGENT, "algo-trainer/0.1")
      .json(body)
      .send().await
      // reqwest errors include the URL, which carries the token.
      .map_err(|e| e.without_url().to_string())?;

    let status = res.status();
    let body: ApiResponse<T> = res.json().await.map_err(|e| e.without_url().to_string())?;
    into_result(status.as_u16(), body)
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, String> {
    let req = GetUpdatesReq {
      offset,
      timeout: POLL_TIMEOUT_SECS,
      allowed_updates: vec!["message".into()],
    };
    self.call("getUpdates", &req).await
  }

  #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
  pub async fn send_message(&self, chat: ChatId, text: &str) -> Result<(), String> {
    let req = SendMessageReq {
      chat_id: chat,
      text: text.to_string(),
      parse_mode: "HTML".into(),
      disable_web_page_preview: true,
    };
    let _: serde_json::Value = self.call("sendMessage", &req).await?;
    Ok(())
  }

  /// Send and log failures instead of propagating them.
  pub async fn deliver(&self, chat: ChatId, text: &str) {
    if let Err(e) = self.send_message(chat, text).await {
      error!(target: "algo_trainer", chat, error = %e, "Telegram send failed");
    }
  }
}

/// Long-polling loop. Runs until the process exits.
#[instrument(level = "info", skip_all)]
pub async fn run_polling(state: Arc<AppState>, tg: Telegram) {
  info!(target: "algo_trainer", base_url = %tg.base_url, "Telegram polling started");
  let mut offset = 0i64;
  loop {
    match tg.get_updates(offset).await {
      Ok(updates) => {
        for update in updates {
          offset = offset.max(update.update_id + 1);
          let Some(msg) = update.message else { continue };
          let Some(text) = msg.text else { continue };
          handle_message(&state, &tg, msg.chat.id, &text).await;
        }
      }
      Err(e) => {
        warn!(target: "algo_trainer", error = %e, backoff = ?RETRY_BACKOFF, "Telegram getUpdates failed; retrying");
        tokio::time::sleep(RETRY_BACKOFF).await;
      }
    }
  }
}

#[instrument(level = "info", skip(state, tg, text), fields(text_len = text.len()))]
async fn handle_message(state: &AppState, tg: &Telegram, chat: ChatId, text: &str) {
  let command = Command::parse(text);
  debug!(target: "algo_trainer", chat, ?command, "Inbound message");
  for reply in replies_for(state, chat, command).await {
    tg.deliver(chat, &reply).await;
  }
}

/// Route one inbound message to trainer logic; returns the messages to send back.
pub async fn replies_for(state: &AppState, chat: ChatId, command: Command) -> Vec<String> {
  match command {
    Command::Start => {
      let mut out = vec![logic::welcome(state, chat).await.to_string()];
      if let Some(p) = logic::next_problem(state, chat).await {
        out.push(logic::render_problem(&p));
      }
      out
    }
    Command::Stop => {
      logic::stop(state, chat).await;
      vec!["Unsubscribed. Send /start to come back.".into()]
    }
    Command::Next => match logic::next_problem(state, chat).await {
      Some(p) => vec![logic::render_problem(&p)],
      None => vec!["No problems available right now.".into()],
    },
    Command::Explain => match logic::explain(state, chat).await {
      Some(ex) => vec![logic::render_explanation(&ex)],
      None => vec![logic::NO_OPEN_PROBLEM_TEXT.into()],
    },
    Command::Help => vec![logic::HELP_TEXT.into()],
    Command::Unknown(name) => vec![format!("Unknown command /{}.\n\n{}", name, logic::HELP_TEXT)],
    Command::Text(text) => match logic::submit(state, chat, &text).await {
      Some(eval) => vec![logic::render_evaluation(&eval)],
      None if state.sessions.is_registered(chat).await => vec![logic::NO_OPEN_PROBLEM_TEXT.into()],
      None => vec!["Send /start to subscribe, or /next for a problem.".into()],
    },
  }
}

fn into_result<T>(status: u16, body: ApiResponse<T>) -> Result<T, String> {
  match (body.ok, body.result) {
    (true, Some(r)) => Ok(r),
    _ => Err(format!(
      "Telegram HTTP {}: {}",
      status,
      body.description.unwrap_or_else(|| "no description".into())
    )),
  }
}

// --- Bot API DTOs ---

#[derive(Serialize)]
struct GetUpdatesReq {
  offset: i64,
  timeout: u64,
  allowed_updates: Vec<String>,
}

#[derive(Serialize)]
struct SendMessageReq {
  chat_id: ChatId,
  text: String,
  parse_mode: String,
  disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
  ok: bool,
  result: Option<T>,
  #[serde(default)]
  description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
  pub update_id: i64,
  #[serde(default)]
  pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
  pub chat: Chat,
  #[serde(default)]
  pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
  pub id: ChatId,
}
