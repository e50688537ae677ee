//! Integration tests for the upload workflow against a local backend
//!
//! These tests verify:
//! - The multipart request carries the file, its MIME type and the job description
//! - Success lands on the results view with 100% progress
//! - Server errors, malformed responses, timeouts and network failures
//!   return to the form with the right banner
//! - Cancellation and the single-upload rule

mod common;

use common::{Behavior, JOB_DESCRIPTION, session_for, session_with_config, spawn_backend};
use resume_screener::models::UploadState;
use resume_screener::services::UploadError;
use resume_screener::{StateChange, SubmitError, View};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::timeout;

async fn wait_for_view(state: &resume_screener::StateManager, view: View) {
    timeout(Duration::from_secs(5), async {
        while state.read(|s| s.view) != view {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Timed out waiting for view");
}

#[tokio::test]
async fn test_successful_upload_shows_results() {
    let backend = spawn_backend(Behavior::Success).await;
    let dir = TempDir::new().unwrap();
    let t = session_for(&backend.base_url);

    t.session.set_job_description(JOB_DESCRIPTION);
    t.session
        .select_file(common::write_resume(&dir, "resume.pdf", 51_200))
        .unwrap();

    let result = t.session.submit().await.unwrap();

    assert_eq!(result.match_score, 82.4);
    assert_eq!(result.matched_skills, vec!["Python", "ML"]);
    assert_eq!(result.bert_classification.confidence, 0.91);

    let snapshot = t.state.snapshot();
    assert_eq!(snapshot.view, View::Results);
    assert_eq!(snapshot.upload, UploadState::Success);
    assert_eq!(snapshot.upload.percent(), 100);
    assert!(snapshot.error.is_none());

    let uploads = backend.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].file_name.as_deref(), Some("resume.pdf"));
    assert_eq!(uploads[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(uploads[0].file_len, 51_200);
    assert_eq!(uploads[0].job_description.as_deref(), Some(JOB_DESCRIPTION));

    assert_eq!(t.metrics.uploads_succeeded.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_docx_upload_uses_docx_mime() {
    let backend = spawn_backend(Behavior::Success).await;
    let dir = TempDir::new().unwrap();
    let t = session_for(&backend.base_url);

    t.session.set_job_description(JOB_DESCRIPTION);
    t.session
        .select_file(common::write_resume(&dir, "cv.docx", 4096))
        .unwrap();
    t.session.submit().await.unwrap();

    let uploads = backend.uploads();
    assert_eq!(
        uploads[0].content_type.as_deref(),
        Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
    );
}

#[tokio::test]
async fn test_progress_is_monotonic_and_reaches_100_only_on_success() {
    let backend = spawn_backend(Behavior::Success).await;
    let dir = TempDir::new().unwrap();
    let mut config = common::config_for(&backend.base_url);
    // Keep the phase animation quiet so only upload events are broadcast
    config.phase_tick_ms = 60_000;
    let t = session_with_config(&config);
    let mut rx = t.state.subscribe();

    t.session.set_job_description(JOB_DESCRIPTION);
    t.session
        .select_file(common::write_resume(&dir, "resume.pdf", 512 * 1024))
        .unwrap();
    t.session.submit().await.unwrap();

    let mut in_flight = Vec::new();
    let mut finished = None;
    loop {
        match rx.try_recv() {
            Ok(StateChange::UploadProgressed { percent }) => in_flight.push(percent),
            Ok(StateChange::UploadFinished { success }) => finished = Some(success),
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(_) => break,
        }
    }

    assert_eq!(finished, Some(true));
    // The last progress event is the completion itself
    let completion = in_flight.pop();
    assert_eq!(completion, Some(100));
    assert!(in_flight.windows(2).all(|w| w[0] <= w[1]), "{:?}", in_flight);
    assert!(in_flight.iter().all(|p| *p < 100), "{:?}", in_flight);
}

#[tokio::test]
async fn test_server_error_returns_to_form() {
    let backend = spawn_backend(Behavior::Status(500)).await;
    let dir = TempDir::new().unwrap();
    let t = session_for(&backend.base_url);

    t.session.set_job_description(JOB_DESCRIPTION);
    t.session
        .select_file(common::write_resume(&dir, "resume.pdf", 1024))
        .unwrap();

    let err = t.session.submit().await.unwrap_err();
    assert_eq!(err, SubmitError::Upload(UploadError::Server { status: 500 }));

    let snapshot = t.state.snapshot();
    assert_eq!(snapshot.view, View::Collecting);
    assert_eq!(snapshot.error.as_deref(), Some("Server error: 500"));
    assert!(snapshot.can_submit());
    assert!(snapshot.has_file());
}

#[tokio::test]
async fn test_malformed_response() {
    let backend = spawn_backend(Behavior::NotJson).await;
    let dir = TempDir::new().unwrap();
    let t = session_for(&backend.base_url);

    t.session.set_job_description(JOB_DESCRIPTION);
    t.session
        .select_file(common::write_resume(&dir, "resume.pdf", 1024))
        .unwrap();

    let err = t.session.submit().await.unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Upload(UploadError::MalformedResponse { .. })
    ));
    assert_eq!(
        t.state.snapshot().error.as_deref(),
        Some("Invalid response from server")
    );
}

#[tokio::test]
async fn test_upload_timeout() {
    let backend = spawn_backend(Behavior::Slow(Duration::from_secs(5))).await;
    let dir = TempDir::new().unwrap();
    let mut config = common::config_for(&backend.base_url);
    config.upload_timeout_secs = 1;
    let t = session_with_config(&config);

    t.session.set_job_description(JOB_DESCRIPTION);
    t.session
        .select_file(common::write_resume(&dir, "resume.pdf", 1024))
        .unwrap();

    let err = t.session.submit().await.unwrap_err();
    assert_eq!(err, SubmitError::Upload(UploadError::Timeout));

    let snapshot = t.state.snapshot();
    assert_eq!(snapshot.view, View::Collecting);
    assert_eq!(
        snapshot.upload,
        UploadState::Error {
            message: "Upload timed out".to_string()
        }
    );
    assert!(snapshot.can_submit());
}

#[tokio::test]
async fn test_network_error() {
    let base_url = common::unused_base_url().await;
    let dir = TempDir::new().unwrap();
    let t = session_for(&base_url);

    t.session.set_job_description(JOB_DESCRIPTION);
    t.session
        .select_file(common::write_resume(&dir, "resume.pdf", 1024))
        .unwrap();

    let err = t.session.submit().await.unwrap_err();
    assert!(matches!(err, SubmitError::Upload(UploadError::Network { .. })));
    assert_eq!(
        t.state.snapshot().error.as_deref(),
        Some("Network error during upload")
    );
}

#[tokio::test]
async fn test_cancel_in_flight_upload() {
    let backend = spawn_backend(Behavior::Slow(Duration::from_secs(10))).await;
    let dir = TempDir::new().unwrap();
    let t = session_for(&backend.base_url);

    t.session.set_job_description(JOB_DESCRIPTION);
    t.session
        .select_file(common::write_resume(&dir, "resume.pdf", 1024))
        .unwrap();

    let session = t.session.clone();
    let upload = tokio::spawn(async move { session.submit().await });

    wait_for_view(&t.state, View::Uploading).await;
    assert!(t.session.is_uploading());

    // Only one upload at a time
    let second = t.session.submit().await;
    assert_eq!(second.unwrap_err(), SubmitError::Busy);

    t.session.cancel_upload();
    let result = timeout(Duration::from_secs(2), upload)
        .await
        .expect("cancelled upload did not finish")
        .unwrap();

    assert_eq!(result.unwrap_err(), SubmitError::Upload(UploadError::Cancelled));

    let snapshot = t.state.snapshot();
    assert_eq!(snapshot.view, View::Collecting);
    assert_eq!(snapshot.error.as_deref(), Some("Upload cancelled"));
    assert!(snapshot.can_submit());
    assert!(!t.session.is_uploading());
    assert_eq!(t.metrics.uploads_cancelled.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_validation_failure_sends_nothing() {
    let backend = spawn_backend(Behavior::Success).await;
    let dir = TempDir::new().unwrap();
    let t = session_for(&backend.base_url);

    t.session.set_job_description("too short");
    t.session
        .select_file(common::write_resume(&dir, "resume.pdf", 1024))
        .unwrap();

    assert!(t.session.submit().await.is_err());
    assert!(backend.uploads().is_empty());
    assert_eq!(t.state.snapshot().view, View::Collecting);
}

#[tokio::test]
async fn test_phases_advance_during_slow_upload() {
    let backend = spawn_backend(Behavior::Slow(Duration::from_millis(400))).await;
    let dir = TempDir::new().unwrap();
    let t = session_for(&backend.base_url);
    let mut rx = t.state.subscribe();

    t.session.set_job_description(JOB_DESCRIPTION);
    t.session
        .select_file(common::write_resume(&dir, "resume.pdf", 1024))
        .unwrap();
    t.session.submit().await.unwrap();

    let mut phases = Vec::new();
    while let Ok(change) = rx.try_recv() {
        if let StateChange::PhaseAdvanced { progress } = change {
            phases.push(progress);
        }
    }

    assert!(!phases.is_empty());
    assert!(phases.windows(2).all(|w| w[0].percent < w[1].percent));
    assert!(phases.iter().all(|p| p.step <= 4));
}

#[tokio::test]
async fn test_abandoned_submit_frees_the_session() {
    let backend = spawn_backend(Behavior::Slow(Duration::from_secs(3))).await;
    let dir = TempDir::new().unwrap();
    let t = session_for(&backend.base_url);

    t.session.set_job_description(JOB_DESCRIPTION);
    t.session
        .select_file(common::write_resume(&dir, "resume.pdf", 1024))
        .unwrap();

    // The caller gives up and drops the submit future mid-upload
    let abandoned = timeout(Duration::from_millis(300), t.session.submit()).await;
    assert!(abandoned.is_err());

    let snapshot = t.state.snapshot();
    assert_eq!(snapshot.view, View::Collecting);
    assert!(snapshot.can_submit());
    assert_eq!(snapshot.error.as_deref(), Some("Upload cancelled"));
    assert!(!t.session.is_uploading());
    assert_eq!(t.metrics.uploads_cancelled.load(Ordering::Relaxed), 1);

    // The next submit goes out instead of being refused as busy
    let next = timeout(Duration::from_millis(300), t.session.submit()).await;
    assert!(next.is_err(), "expected the second upload to be in flight");
}
