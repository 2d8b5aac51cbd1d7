//! End-to-end login scenarios against the scripted auth service and the
//! mock camera.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use face_gate::{
    attempts::{ChallengePolicy, Identity},
    auth::{LoginResponse, NetworkError, ScriptedAuthService},
    capture::{CameraError, CameraSession, CaptureConstraints, MockCamera, SessionState},
    orchestrator::{ChallengeOrchestrator, LoginForm, LoginOutcome, RecordingStatus},
    storage::{KeyValueStorage, MemoryStorage, SharedStorage},
};

type Flow = ChallengeOrchestrator<ScriptedAuthService, MockCamera, MemoryStorage>;

const EMAIL: &str = "ada@example.com";

fn constraints() -> CaptureConstraints {
    CaptureConstraints {
        focus_delay_ms: 0,
        ..CaptureConstraints::with_dimensions(64, 48)
    }
}

fn flow_over(
    auth: ScriptedAuthService,
    camera: MockCamera,
    storage: SharedStorage<MemoryStorage>,
) -> Flow {
    ChallengeOrchestrator::new(auth, camera, storage, ChallengePolicy::default())
        .with_constraints(constraints())
}

fn flow(auth: ScriptedAuthService, camera: MockCamera) -> Flow {
    flow_over(auth, camera, SharedStorage::new(MemoryStorage::new()))
}

fn storage_with_failures(count: u32) -> SharedStorage<MemoryStorage> {
    let mut storage = SharedStorage::new(MemoryStorage::new());
    storage.set(&format!("failed_attempts_{EMAIL}"), &count.to_string());
    storage
}

fn form() -> LoginForm {
    LoginForm::new("Ada", EMAIL, "hunter2")
}

fn identity() -> Identity {
    Identity::parse(EMAIL).unwrap()
}

#[tokio::test]
async fn challenge_starts_after_three_failures() {
    let auth = ScriptedAuthService::new().rejecting_then_accepting(5, "tok");
    let camera = MockCamera::new();
    let probe = camera.probe();
    let mut flow = flow(auth.clone(), camera);

    for n in 1..=3 {
        let outcome = flow.submit(&form(), &mut RecordingStatus::new()).await;
        assert!(!outcome.was_challenged(), "attempt {n} should not challenge");
    }
    assert_eq!(probe.opened_total(), 0);

    let outcome = flow.submit(&form(), &mut RecordingStatus::new()).await;
    assert!(matches!(
        outcome,
        LoginOutcome::Failed {
            failed_count: 4,
            challenged: true,
            challenge_next: true,
            ..
        }
    ));

    // Still over the threshold, so the fifth attempt challenges again.
    let outcome = flow.submit(&form(), &mut RecordingStatus::new()).await;
    assert!(outcome.was_challenged());

    let sent = auth.login_requests();
    assert_eq!(sent.len(), 5);
    assert!(sent[..3].iter().all(|r| r.face_image.is_none()));
    assert!(sent[3..].iter().all(|r| r.face_image.is_some()));

    assert_eq!(probe.opened_total(), 2);
    assert_eq!(probe.open_handles(), 0);
    assert_eq!(flow.camera().state(), SessionState::Idle);
}

#[tokio::test]
async fn success_after_challenge_resets_count() {
    let auth = ScriptedAuthService::new().rejecting_then_accepting(3, "tok");
    let mut flow = flow(auth, MockCamera::new());
    for _ in 0..3 {
        flow.submit(&form(), &mut RecordingStatus::new()).await;
    }

    let outcome = flow.submit(&form(), &mut RecordingStatus::new()).await;

    assert!(outcome.is_authenticated());
    assert!(outcome.was_challenged());
    assert_eq!(flow.tracker().current_count(&identity()), 0);
    assert_eq!(flow.account().token().as_deref(), Some("tok"));
    assert_eq!(flow.account().user_email().as_deref(), Some(EMAIL));
}

#[tokio::test]
async fn success_then_failure_counts_from_zero() {
    let auth = ScriptedAuthService::new()
        .then_login(LoginResponse::rejected("Invalid credentials"))
        .then_login(LoginResponse::rejected("Invalid credentials"))
        .then_login(LoginResponse::accepted("tok"))
        .then_login(LoginResponse::rejected("Invalid credentials"));
    let mut flow = flow(auth, MockCamera::new());

    flow.submit(&form(), &mut RecordingStatus::new()).await;
    flow.submit(&form(), &mut RecordingStatus::new()).await;
    assert_eq!(flow.tracker().current_count(&identity()), 2);

    flow.submit(&form(), &mut RecordingStatus::new()).await;
    assert_eq!(flow.tracker().current_count(&identity()), 0);

    let outcome = flow.submit(&form(), &mut RecordingStatus::new()).await;
    assert!(matches!(outcome, LoginOutcome::Failed { failed_count: 1, .. }));
}

#[tokio::test]
async fn denied_camera_blocks_submission() {
    let auth = ScriptedAuthService::new();
    let camera = MockCamera::denied();
    let probe = camera.probe();
    let mut flow = flow_over(auth.clone(), camera, storage_with_failures(3));
    let mut status = RecordingStatus::new();

    let outcome = flow.submit(&form(), &mut status).await;

    match &outcome {
        LoginOutcome::ChallengeUnavailable { challenge, .. } => {
            assert_eq!(challenge.error, Some(CameraError::AccessDenied));
            assert_eq!(challenge.attempt_number, 3);
            assert!(challenge.image.is_none());
        }
        other => panic!("expected ChallengeUnavailable, got {other:?}"),
    }
    assert_eq!(outcome.message().title, "Camera Required");
    assert!(auth.login_requests().is_empty());
    assert_eq!(flow.tracker().current_count(&identity()), 3);
    assert_eq!(probe.open_handles(), 0);
    assert_eq!(flow.camera().state(), SessionState::Idle);
    assert!(!status.loading);
}

#[tokio::test]
async fn missing_camera_blocks_submission() {
    let auth = ScriptedAuthService::new();
    let camera = MockCamera::no_device();
    let probe = camera.probe();
    let mut flow = flow_over(auth.clone(), camera, storage_with_failures(4));

    let outcome = flow.submit(&form(), &mut RecordingStatus::new()).await;

    match &outcome {
        LoginOutcome::ChallengeUnavailable { challenge, .. } => {
            assert_eq!(challenge.error, Some(CameraError::NoDevice));
            assert_eq!(challenge.attempt_number, 4);
        }
        other => panic!("expected ChallengeUnavailable, got {other:?}"),
    }
    assert!(auth.login_requests().is_empty());
    assert_eq!(flow.tracker().current_count(&identity()), 4);
    assert_eq!(probe.open_handles(), 0);
    assert_eq!(flow.camera().state(), SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn camera_that_never_starts_times_out() {
    let auth = ScriptedAuthService::new();
    let camera = MockCamera::never_ready();
    let probe = camera.probe();
    let mut flow = ChallengeOrchestrator::new(
        auth.clone(),
        camera,
        storage_with_failures(3),
        ChallengePolicy::default(),
    );

    let outcome = flow.submit(&form(), &mut RecordingStatus::new()).await;

    match outcome {
        LoginOutcome::ChallengeUnavailable { challenge, .. } => {
            assert_eq!(challenge.error, Some(CameraError::Timeout));
        }
        other => panic!("expected ChallengeUnavailable, got {other:?}"),
    }
    assert!(auth.login_requests().is_empty());
    assert_eq!(probe.opened_total(), 1);
    assert_eq!(probe.open_handles(), 0);
}

#[tokio::test]
async fn captured_image_is_mirrored_jpeg() {
    let auth = ScriptedAuthService::new();
    let mut flow = flow_over(auth.clone(), MockCamera::new(), storage_with_failures(3));

    flow.submit(&form(), &mut RecordingStatus::new()).await;

    let sent = auth.login_requests();
    let uri = sent[0].face_image.as_deref().unwrap();
    let payload = uri.strip_prefix("data:image/jpeg;base64,").unwrap();
    let bytes = STANDARD.decode(payload).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

    let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (64, 48));

    // The mock frame's red channel ramps left to right; mirrored it falls.
    let left = decoded.get_pixel(0, 24)[0];
    let right = decoded.get_pixel(63, 24)[0];
    assert!(left > 180, "left edge red = {left}");
    assert!(right < 75, "right edge red = {right}");
}

#[tokio::test]
async fn network_error_leaves_count_and_releases_camera() {
    let auth = ScriptedAuthService::new().then_fail(NetworkError::Unreachable("refused".into()));
    let camera = MockCamera::new();
    let probe = camera.probe();
    let mut flow = flow_over(auth, camera, storage_with_failures(3));
    let mut status = RecordingStatus::new();

    let outcome = flow.submit(&form(), &mut status).await;

    assert!(matches!(outcome, LoginOutcome::ConnectionError { .. }));
    assert_eq!(flow.tracker().current_count(&identity()), 3);
    assert_eq!(probe.opened_total(), 1);
    assert_eq!(probe.open_handles(), 0);
    assert!(!status.loading);
    assert_eq!(status.finished, 1);
}

#[tokio::test]
async fn counter_survives_rebuilding_the_client() {
    let storage = SharedStorage::new(MemoryStorage::new());
    let mut first = flow_over(ScriptedAuthService::new(), MockCamera::new(), storage.clone());
    for _ in 0..3 {
        first.submit(&form(), &mut RecordingStatus::new()).await;
    }
    drop(first);

    assert_eq!(
        storage.get(&format!("failed_attempts_{EMAIL}")).as_deref(),
        Some("3")
    );

    let auth = ScriptedAuthService::new();
    let mut second = flow_over(auth.clone(), MockCamera::new(), storage);
    let outcome = second.submit(&form(), &mut RecordingStatus::new()).await;

    assert!(outcome.was_challenged());
    assert!(auth.login_requests()[0].face_image.is_some());
}

#[tokio::test]
async fn logout_clears_counters_and_session() {
    let storage = storage_with_failures(2);
    let auth = ScriptedAuthService::new().then_login(LoginResponse::accepted("tok"));
    let mut flow = flow_over(auth.clone(), MockCamera::new(), storage.clone());
    let mut other = storage.clone();
    other.set("failed_attempts_bob@example.com", "5");
    other.set("theme", "dark");

    flow.submit(&form(), &mut RecordingStatus::new()).await;
    assert!(flow.validate_session().await);

    flow.logout().await;

    assert_eq!(storage.keys(), vec!["theme".to_string()]);
    assert_eq!(auth.logged_out(), vec!["tok".to_string()]);
    assert!(!flow.validate_session().await);
}

#[tokio::test]
async fn capture_outside_active_is_not_active() {
    let mut session = CameraSession::new(MockCamera::denied());
    assert_eq!(session.capture_frame().err(), Some(CameraError::NotActive));

    assert!(session.acquire(&constraints()).await.is_err());
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.capture_frame().err(), Some(CameraError::NotActive));

    session.release();
    assert_eq!(session.state(), SessionState::Idle);
}
