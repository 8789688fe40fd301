//! Daily push of a fresh problem to every registered chat.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};
use tracing::{debug, info, instrument, warn};

use crate::config::Schedule;
use crate::domain::ChatId;
use crate::logic;
use crate::state::AppState;
use crate::telegram::Telegram;

/// First moment strictly after `now` whose wall-clock time is `schedule.hour:schedule.minute`.
pub fn next_fire_after(now: NaiveDateTime, schedule: Schedule) -> NaiveDateTime {
  let at = NaiveTime::from_hms_opt(schedule.hour.min(23), schedule.minute.min(59), 0).unwrap_or(NaiveTime::MIN);
  let today = now.date().and_time(at);
  if today > now {
    today
  } else {
    today + ChronoDuration::days(1)
  }
}

/// Open a new problem for every registered chat and, when Telegram is on, send it.
/// Returns how many chats received a problem.
#[instrument(level = "info", skip_all)]
pub async fn push_to_all(state: &AppState, tg: Option<&Telegram>) -> usize {
  let chats = state.sessions.registered().await;
  let mut pushed = 0;
  for chat in chats {
    if push_to_chat(state, tg, chat).await {
      pushed += 1;
    }
  }
  info!(target: "scheduler", pushed, telegram = tg.is_some(), "Daily push done");
  pushed
}

/// Push to one chat unless it unregistered since the snapshot was taken.
pub async fn push_to_chat(state: &AppState, tg: Option<&Telegram>, chat: ChatId) -> bool {
  if !state.sessions.is_registered(chat).await {
    debug!(target: "scheduler", chat, "Chat unregistered during push; skipping");
    return false;
  }
  let Some(problem) = logic::next_problem(state, chat).await else { return false };
  if let Some(tg) = tg {
    tg.deliver(chat, &logic::render_problem(&problem)).await;
  }
  true
}

/// Sleep until the next scheduled time, push, repeat.
#[instrument(level = "info", skip_all)]
pub async fn run_daily(state: Arc<AppState>, tg: Option<Telegram>) {
  let schedule = state.schedule;
  loop {
    let now = Local::now().naive_local();
    let next = next_fire_after(now, schedule);
    let wait = (next - now).to_std().unwrap_or_default();
    info!(target: "scheduler", next = %next, wait_secs = wait.as_secs(), "Next daily push scheduled");
    tokio::time::sleep(wait).await;

    if state.catalog.is_empty() {
      warn!(target: "scheduler", "Catalog empty; skipping push");
      continue;
    }
    push_to_all(&state, tg.as_ref()).await;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
  }

  #[test]
  fn fires_later_today_when_time_not_reached() {
    let s = Schedule { hour: 9, minute: 0 };
    assert_eq!(next_fire_after(at(2024, 3, 1, 8, 59, 59), s), at(2024, 3, 1, 9, 0, 0));
  }

  #[test]
  fn fires_tomorrow_when_time_reached_or_passed() {
    let s = Schedule { hour: 9, minute: 0 };
    assert_eq!(next_fire_after(at(2024, 3, 1, 9, 0, 0), s), at(2024, 3, 2, 9, 0, 0));
    assert_eq!(next_fire_after(at(2024, 12, 31, 23, 0, 0), s), at(2025, 1, 1, 9, 0, 0));
  }

  #[test]
  fn minute_is_respected() {
    let s = Schedule { hour: 21, minute: 45 };
    assert_eq!(next_fire_after(at(2024, 2, 28, 21, 44, 0), s), at(2024, 2, 28, 21, 45, 0));
    assert_eq!(next_fire_after(at(2024, 2, 28, 21, 46, 0), s), at(2024, 2, 29, 21, 45, 0));
  }

  #[tokio::test]
  async fn push_opens_a_problem_for_each_registered_chat() {
    let state = AppState::for_tests();
    state.sessions.register(1).await;
    state.sessions.register(2).await;

    assert_eq!(push_to_all(&state, None).await, 2);
    assert!(state.sessions.current(1).await.is_some());
    assert!(state.sessions.current(2).await.is_some());
    assert!(state.sessions.current(3).await.is_none());
  }

  #[tokio::test]
  async fn chat_stopped_mid_push_gets_nothing_reopened() {
    let state = AppState::for_tests();
    state.sessions.register(4).await;
    let stale_snapshot = state.sessions.registered().await;
    state.sessions.unregister(4).await;

    for chat in stale_snapshot {
      assert!(!push_to_chat(&state, None, chat).await);
    }
    assert!(state.sessions.current(4).await.is_none());
  }
}
