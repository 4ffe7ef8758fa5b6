// Drives the practice-session protocol end to end against a scripted store,
// including the duplicate-completion race the phase guard exists for.

use async_trait::async_trait;
use echodrill::backend::{SessionStore, StoreError};
use echodrill::drill::PronunciationDrill;
use echodrill::session::{Phase, PracticeSession};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ScriptedStore {
    refuse_creates: AtomicBool,
    created: AtomicUsize,
    completed: Mutex<Vec<(String, f64)>>,
}

#[async_trait]
impl SessionStore for ScriptedStore {
    async fn create_session(&self, activity_id: &str) -> Result<String, StoreError> {
        if self.refuse_creates.load(Ordering::SeqCst) {
            return Err(StoreError::Network("backend down".into()));
        }
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{activity_id}/{n}"))
    }

    async fn complete_session(&self, session_id: &str, score: f64) -> Result<(), StoreError> {
        self.completed
            .lock()
            .unwrap()
            .push((session_id.to_string(), score));
        Ok(())
    }
}

#[tokio::test]
async fn begin_then_complete_persists_exactly_one_score() {
    let store = Arc::new(ScriptedStore::default());
    let mut session = PracticeSession::new(store.clone(), "quiz-1");

    assert_eq!(session.phase(), Phase::Unstarted);
    let id = session.begin().await.unwrap();
    assert_eq!(id, "quiz-1/0");
    assert_eq!(session.phase(), Phase::Active);

    session.complete(100.0).await;
    assert_eq!(session.phase(), Phase::Completed);

    let completed = store.completed.lock().unwrap();
    assert_eq!(*completed, vec![("quiz-1/0".to_string(), 100.0)]);
}

#[tokio::test]
async fn timer_and_manual_completion_submit_once() {
    // An exam timer firing alongside a manual submit shows up as two
    // complete calls in quick succession; only the first may persist.
    let store = Arc::new(ScriptedStore::default());
    let mut session = PracticeSession::new(store.clone(), "exam-9");
    session.begin().await;

    session.complete(85.0).await; // timer expiry
    session.complete(85.0).await; // learner clicks submit

    assert_eq!(store.completed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_begin_keeps_completion_silent() {
    let store = Arc::new(ScriptedStore::default());
    store.refuse_creates.store(true, Ordering::SeqCst);
    let mut session = PracticeSession::new(store.clone(), "quiz-1");

    assert!(session.begin().await.is_none());
    session.complete(50.0).await;

    assert_eq!(session.phase(), Phase::Unstarted);
    assert!(store.completed.lock().unwrap().is_empty());
    assert_eq!(store.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn reset_supports_replaying_the_same_activity() {
    let store = Arc::new(ScriptedStore::default());
    let mut session = PracticeSession::new(store.clone(), "drill-2");

    session.begin().await;
    session.complete(60.0).await;
    session.reset();
    session.begin().await;
    session.complete(90.0).await;

    let completed = store.completed.lock().unwrap();
    assert_eq!(
        *completed,
        vec![
            ("drill-2/0".to_string(), 60.0),
            ("drill-2/1".to_string(), 90.0),
        ]
    );
}

#[tokio::test]
async fn drill_result_flows_into_session_completion() {
    let store = Arc::new(ScriptedStore::default());
    let mut session = PracticeSession::new(store.clone(), "pron-4");
    session.begin().await;

    let mut drill = PronunciationDrill::new("good morning everyone");
    drill.observe("good morning");
    drill.observe("good morning everyone");

    session.complete(drill.final_score()).await;

    let completed = store.completed.lock().unwrap();
    assert_eq!(*completed, vec![("pron-4/0".to_string(), 100.0)]);
}
