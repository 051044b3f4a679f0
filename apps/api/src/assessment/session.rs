//! Session-scoped assessment state.
//!
//! Answers live here while the candidate works. The scoring engine only ever
//! sees a finished answer sheet, handed over exactly once by `submit`, whether
//! the candidate pressed submit or the countdown ran out.
//!
//! Nothing is kept for long. Submitted sessions are dropped after
//! `SessionRetention::submitted`, and untimed sessions nobody touches for
//! `SessionRetention::idle` are treated as abandoned and dropped too.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assessment::catalog::Catalog;
use crate::assessment::models::{Answer, AnswerSheet, AssessmentResult};
use crate::assessment::scoring::{score_with_scheme, ScoringError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Assessment '{0}' not found")]
    AssessmentNotFound(String),

    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Session {0} has already been submitted")]
    AlreadySubmitted(Uuid),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionTrigger {
    User,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Submitted,
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub trigger: SubmissionTrigger,
    pub submitted_at: DateTime<Utc>,
    pub time_spent_secs: i64,
    pub result: AssessmentResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub assessment_id: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub remaining_secs: Option<i64>,
    pub answered: usize,
    pub submission: Option<Submission>,
}

/// How long sessions stay in memory once they stop changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRetention {
    /// Kept this long after submission so the client can fetch the result.
    pub submitted: Duration,
    /// In-progress untimed sessions untouched this long are abandoned.
    pub idle: Duration,
}

impl Default for SessionRetention {
    fn default() -> Self {
        Self {
            submitted: Duration::from_secs(60 * 60),
            idle: Duration::from_secs(2 * 60 * 60),
        }
    }
}

struct AssessmentSession {
    id: Uuid,
    assessment_id: String,
    started_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    answers: AnswerSheet,
    submission: Option<Submission>,
    /// Pending forced submission for timed assessments.
    timer: Option<JoinHandle<()>>,
    /// Start, last answer or submission, on the tokio clock.
    last_activity: Instant,
}

impl AssessmentSession {
    fn is_expired(&self, retention: &SessionRetention, now: Instant) -> bool {
        let idle_for = now.saturating_duration_since(self.last_activity);
        if self.submission.is_some() {
            return idle_for >= retention.submitted;
        }
        // A pending countdown will submit the session; let it.
        let timer_pending = self.timer.as_ref().is_some_and(|t| !t.is_finished());
        !timer_pending && idle_for >= retention.idle
    }

    fn view(&self, now: DateTime<Utc>) -> SessionView {
        let status = if self.submission.is_some() {
            SessionStatus::Submitted
        } else {
            SessionStatus::InProgress
        };
        let remaining_secs = match (&self.submission, self.expires_at) {
            (None, Some(expires_at)) => Some((expires_at - now).num_seconds().max(0)),
            _ => None,
        };
        SessionView {
            session_id: self.id,
            assessment_id: self.assessment_id.clone(),
            status,
            started_at: self.started_at,
            expires_at: self.expires_at,
            remaining_secs,
            answered: self.answers.len(),
            submission: self.submission.clone(),
        }
    }
}

/// In-memory store of assessment attempts. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionStore {
    catalog: Arc<Catalog>,
    retention: SessionRetention,
    sessions: Arc<Mutex<HashMap<Uuid, AssessmentSession>>>,
}

impl SessionStore {
    pub fn with_retention(catalog: Arc<Catalog>, retention: SessionRetention) -> Self {
        Self {
            catalog,
            retention,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts a new attempt. A retake is simply another call to `start`.
    pub async fn start(&self, assessment_id: &str) -> Result<SessionView, SessionError> {
        let definition = self
            .catalog
            .get(assessment_id)
            .ok_or_else(|| SessionError::AssessmentNotFound(assessment_id.to_string()))?;

        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let time_limit = definition.time_limit_secs;
        let expires_at =
            time_limit.map(|secs| started_at + chrono::Duration::seconds(secs as i64));

        let mut sessions = self.sessions.lock().await;
        let timer = time_limit.map(|secs| self.schedule_forced_submission(id, secs));
        let session = AssessmentSession {
            id,
            assessment_id: definition.id.clone(),
            started_at,
            expires_at,
            answers: AnswerSheet::new(),
            submission: None,
            timer,
            last_activity: Instant::now(),
        };
        let view = session.view(started_at);
        sessions.insert(id, session);

        info!("Started session {id} for assessment '{assessment_id}'");
        Ok(view)
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionView, SessionError> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&id).ok_or(SessionError::SessionNotFound(id))?;
        Ok(session.view(Utc::now()))
    }

    /// Records answers, replacing earlier answers to the same questions.
    /// Answers to unknown question ids are kept but ignored at scoring time.
    pub async fn record_answers(
        &self,
        id: Uuid,
        answers: Vec<Answer>,
    ) -> Result<SessionView, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(SessionError::SessionNotFound(id))?;
        if session.submission.is_some() {
            return Err(SessionError::AlreadySubmitted(id));
        }
        for answer in answers {
            session.answers.insert(answer.question_id, answer.value);
        }
        session.last_activity = Instant::now();
        Ok(session.view(Utc::now()))
    }

    /// The single submission path. Scores the session's answers exactly once.
    pub async fn submit(
        &self,
        id: Uuid,
        trigger: SubmissionTrigger,
    ) -> Result<AssessmentResult, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(SessionError::SessionNotFound(id))?;
        if session.submission.is_some() {
            return Err(SessionError::AlreadySubmitted(id));
        }

        let definition = self
            .catalog
            .get(&session.assessment_id)
            .ok_or_else(|| SessionError::AssessmentNotFound(session.assessment_id.clone()))?;

        let result = score_with_scheme(
            &definition.questions,
            &session.answers,
            definition.tier_scheme(),
        )?;

        if let Some(timer) = session.timer.take() {
            // The timer task is the caller on timeout; it must not abort itself.
            if trigger == SubmissionTrigger::User {
                timer.abort();
            }
        }

        let submitted_at = Utc::now();
        session.submission = Some(Submission {
            trigger,
            submitted_at,
            time_spent_secs: (submitted_at - session.started_at).num_seconds().max(0),
            result: result.clone(),
        });
        session.last_activity = Instant::now();

        info!(
            "Session {id} submitted ({trigger:?}): {}% {}",
            result.overall_score, result.tier
        );
        Ok(result)
    }

    /// Drops submitted and abandoned sessions past their retention window.
    /// Returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            if !session.is_expired(&self.retention, now) {
                return true;
            }
            if let Some(timer) = session.timer.take() {
                timer.abort();
            }
            false
        });
        before - sessions.len()
    }

    /// Runs `evict_expired` every `every` until the returned handle is aborted.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.evict_expired().await;
                if evicted > 0 {
                    debug!("Evicted {evicted} expired assessment sessions");
                }
            }
        })
    }

    fn schedule_forced_submission(&self, id: Uuid, secs: u64) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            match store.submit(id, SubmissionTrigger::Timeout).await {
                Ok(_) => info!("Session {id} auto-submitted after {secs}s time limit"),
                Err(SessionError::AlreadySubmitted(_)) => {}
                Err(e) => warn!("Forced submission for session {id} failed: {e}"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::models::AnswerValue;
    use crate::assessment::tiers::{Tier, TierScheme};

    fn store() -> SessionStore {
        SessionStore::with_retention(
            Arc::new(Catalog::builtin().unwrap()),
            SessionRetention::default(),
        )
    }

    fn short_lived_store() -> SessionStore {
        SessionStore::with_retention(
            Arc::new(Catalog::builtin().unwrap()),
            SessionRetention {
                submitted: Duration::from_secs(60),
                idle: Duration::from_secs(300),
            },
        )
    }

    fn answer(id: &str, value: AnswerValue) -> Answer {
        Answer {
            question_id: id.to_string(),
            value,
        }
    }

    #[tokio::test]
    async fn test_start_unknown_assessment() {
        let err = store().start("nope").await.unwrap_err();
        assert!(matches!(err, SessionError::AssessmentNotFound(_)));
    }

    #[tokio::test]
    async fn test_untimed_session_has_no_deadline() {
        let view = store().start("skills-assessment").await.unwrap();
        assert_eq!(view.status, SessionStatus::InProgress);
        assert!(view.expires_at.is_none());
        assert!(view.remaining_secs.is_none());
        assert_eq!(view.answered, 0);
    }

    #[tokio::test]
    async fn test_user_submission_scores_recorded_answers() {
        let store = store();
        let view = store.start("skills-assessment").await.unwrap();
        let id = view.session_id;

        store
            .record_answers(
                id,
                vec![
                    answer("sa-prog-1", AnswerValue::Choice(1)),
                    answer("sa-prog-2", AnswerValue::Choice(0)),
                    answer("unknown-question", AnswerValue::Choice(0)),
                ],
            )
            .await
            .unwrap();
        let view = store
            .record_answers(id, vec![answer("sa-prog-2", AnswerValue::Choice(2))])
            .await
            .unwrap();
        assert_eq!(view.answered, 3);

        let result = store.submit(id, SubmissionTrigger::User).await.unwrap();
        // 20 of 90 points
        assert_eq!(result.awarded_points, 20);
        assert_eq!(result.overall_score, 22);
        assert_eq!(result.tier, Tier::Novice);

        let view = store.get(id).await.unwrap();
        assert_eq!(view.status, SessionStatus::Submitted);
        let submission = view.submission.unwrap();
        assert_eq!(submission.trigger, SubmissionTrigger::User);
        assert_eq!(submission.result, result);
    }

    #[tokio::test]
    async fn test_submit_twice_is_rejected() {
        let store = store();
        let id = store.start("skills-assessment").await.unwrap().session_id;
        store.submit(id, SubmissionTrigger::User).await.unwrap();
        let err = store.submit(id, SubmissionTrigger::User).await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadySubmitted(_)));
    }

    #[tokio::test]
    async fn test_answers_rejected_after_submission() {
        let store = store();
        let id = store.start("skills-assessment").await.unwrap().session_id;
        store.submit(id, SubmissionTrigger::User).await.unwrap();
        let err = store
            .record_answers(id, vec![answer("sa-prog-1", AnswerValue::Choice(1))])
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::AlreadySubmitted(_)));
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let err = store().get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SessionError::SessionNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_forces_submission_with_current_answers() {
        let store = store();
        let view = store.start("weekly-test").await.unwrap();
        let id = view.session_id;
        assert_eq!(view.remaining_secs, Some(600));

        store
            .record_answers(
                id,
                vec![
                    answer("wt-web-1", AnswerValue::Choice(1)),
                    answer("wt-git-1", AnswerValue::Choice(1)),
                    answer("wt-soft-1", AnswerValue::Choice(1)),
                ],
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(601)).await;

        let view = store.get(id).await.unwrap();
        assert_eq!(view.status, SessionStatus::Submitted);
        let submission = view.submission.unwrap();
        assert_eq!(submission.trigger, SubmissionTrigger::Timeout);
        // 15 of 25 points, graded on the weekly-test curve
        assert_eq!(submission.result.overall_score, 60);
        assert_eq!(submission.result.tier_scheme, TierScheme::Quintile);
        assert_eq!(submission.result.tier, Tier::Advanced);
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_submission_cancels_timer() {
        let store = store();
        let id = store.start("weekly-test").await.unwrap().session_id;
        store.submit(id, SubmissionTrigger::User).await.unwrap();

        tokio::time::sleep(Duration::from_secs(700)).await;

        let submission = store.get(id).await.unwrap().submission.unwrap();
        assert_eq!(submission.trigger, SubmissionTrigger::User);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_stays_open_before_deadline() {
        let store = store();
        let id = store.start("weekly-test").await.unwrap().session_id;
        tokio::time::sleep(Duration::from_secs(300)).await;
        let view = store.get(id).await.unwrap();
        assert_eq!(view.status, SessionStatus::InProgress);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submitted_session_evicted_after_retention() {
        let store = short_lived_store();
        let sweeper = store.spawn_sweeper(Duration::from_secs(10));
        let id = store.start("skills-assessment").await.unwrap().session_id;
        store.submit(id, SubmissionTrigger::User).await.unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.get(id).await.unwrap().status, SessionStatus::Submitted);

        tokio::time::sleep(Duration::from_secs(45)).await;
        let err = store.get(id).await.unwrap_err();
        assert!(matches!(err, SessionError::SessionNotFound(_)));
        sweeper.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_submitted_sessions_do_not_accumulate() {
        let store = short_lived_store();
        for _ in 0..1000 {
            let id = store.start("skills-assessment").await.unwrap().session_id;
            store.submit(id, SubmissionTrigger::User).await.unwrap();
        }
        assert_eq!(store.sessions.lock().await.len(), 1000);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(store.evict_expired().await, 1000);
        assert!(store.sessions.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_session_evicted_after_idle_window() {
        let store = short_lived_store();
        let active = store.start("skills-assessment").await.unwrap().session_id;
        let abandoned = store.start("skills-assessment").await.unwrap().session_id;

        tokio::time::sleep(Duration::from_secs(200)).await;
        store
            .record_answers(active, vec![answer("sa-prog-1", AnswerValue::Choice(1))])
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(store.evict_expired().await, 1);
        assert!(store.get(active).await.is_ok());
        let err = store.get(abandoned).await.unwrap_err();
        assert!(matches!(err, SessionError::SessionNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_session_waits_for_its_countdown() {
        let store = short_lived_store();
        let id = store.start("weekly-test").await.unwrap().session_id;

        // Idle past the window, but the countdown is still running.
        tokio::time::sleep(Duration::from_secs(400)).await;
        assert_eq!(store.evict_expired().await, 0);
        assert_eq!(store.get(id).await.unwrap().status, SessionStatus::InProgress);

        tokio::time::sleep(Duration::from_secs(201)).await;
        assert_eq!(store.get(id).await.unwrap().status, SessionStatus::Submitted);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(store.evict_expired().await, 1);
    }
}
