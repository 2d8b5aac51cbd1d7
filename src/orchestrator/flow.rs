//! Login submission flow.
//!
//! One submission runs strictly in order: client context, challenge if the
//! failure count demands it, then the credential check. The camera session
//! and the attempt counters are owned here; nothing is global.

use chrono::Utc;

use super::{
    AccountSession, ChallengeOutcome, ChallengeResult, Loading, LoginForm, LoginOutcome,
    StatusMessage, StatusSink,
};
use crate::attempts::{AttemptTracker, ChallengePolicy, Identity, StorageAttemptStore};
use crate::auth::{
    AuthService, LoginRequest, LoginResponse, NetworkError, VerifyFaceRequest, VerifyFaceResponse,
};
use crate::capture::{CameraDevice, CameraError, CameraSession, CaptureConstraints, CapturedImage};
use crate::config::FileConfig;
use crate::context::{self, ContextProvider, UnknownContext};
use crate::metrics::ChallengeMetrics;
use crate::storage::{KeyValueStorage, SharedStorage};

const LOCKED_MESSAGE: &str =
    "Too many failed attempts. Account locked for 5 hours. Admin has been notified.";
const CAMERA_REQUIRED_MESSAGE: &str =
    "Face verification required but camera unavailable. Please enable camera access.";

/// Drives login submissions, demanding a camera capture once an identity
/// has failed often enough.
pub struct ChallengeOrchestrator<A, D, S>
where
    A: AuthService,
    D: CameraDevice,
    S: KeyValueStorage,
{
    auth: A,
    camera: CameraSession<D>,
    tracker: AttemptTracker<StorageAttemptStore<SharedStorage<S>>>,
    account: AccountSession<SharedStorage<S>>,
    context: Box<dyn ContextProvider>,
    constraints: CaptureConstraints,
    verify_on_capture: bool,
    metrics: Option<ChallengeMetrics>,
}

impl<A, D, S> ChallengeOrchestrator<A, D, S>
where
    A: AuthService,
    D: CameraDevice,
    S: KeyValueStorage,
{
    /// Counters and session keys both live in `storage`.
    pub fn new(auth: A, camera: D, storage: SharedStorage<S>, policy: ChallengePolicy) -> Self {
        Self {
            auth,
            camera: CameraSession::new(camera),
            tracker: AttemptTracker::new(StorageAttemptStore::new(storage.clone()), policy),
            account: AccountSession::new(storage),
            context: Box::new(UnknownContext),
            constraints: CaptureConstraints::default(),
            verify_on_capture: false,
            metrics: None,
        }
    }

    /// Builds an orchestrator with the policy and capture settings of a
    /// configuration file.
    pub fn from_config(auth: A, camera: D, storage: SharedStorage<S>, config: &FileConfig) -> Self {
        Self::new(auth, camera, storage, config.policy.challenge_policy())
            .with_constraints(config.capture.clone())
            .verify_on_capture(config.policy.verify_on_capture)
    }

    pub fn with_constraints(mut self, constraints: CaptureConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_context(mut self, provider: impl ContextProvider + 'static) -> Self {
        self.context = Box::new(provider);
        self
    }

    /// Forward every challenge capture to `/verify-face` as well.
    pub fn verify_on_capture(mut self, enabled: bool) -> Self {
        self.verify_on_capture = enabled;
        self
    }

    pub fn with_metrics(mut self, metrics: ChallengeMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn tracker(&self) -> &AttemptTracker<StorageAttemptStore<SharedStorage<S>>> {
        &self.tracker
    }

    pub fn account(&self) -> &AccountSession<SharedStorage<S>> {
        &self.account
    }

    pub fn camera(&self) -> &CameraSession<D> {
        &self.camera
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    pub fn metrics(&self) -> Option<&ChallengeMetrics> {
        self.metrics.as_ref()
    }

    /// Runs one login submission to completion.
    ///
    /// Never fails: camera, network and validation problems come back as
    /// [`LoginOutcome`] variants with a message for the user. The loading
    /// indicator is cleared on every path.
    pub async fn submit(&mut self, form: &LoginForm, status: &mut dyn StatusSink) -> LoginOutcome {
        let credentials = match form.validate() {
            Ok(credentials) => credentials,
            Err(error) => {
                tracing::debug!(error = %error, "Login form rejected");
                return LoginOutcome::Rejected {
                    error,
                    message: StatusMessage::error("Error", "Please fill in all fields"),
                };
            }
        };
        let identity = credentials.identity.clone();
        if let Some(metrics) = &self.metrics {
            metrics.submissions.inc();
        }

        let mut loading = Loading::start(
            status,
            StatusMessage::loading("Authenticating", "Verifying your credentials..."),
        );
        loading.progress(10);

        let context = context::collect(self.context.as_ref()).await;
        loading.progress(20);

        let challenged = self.tracker.requires_challenge(&identity);
        let mut face_image = None;
        if challenged {
            let challenge = self.run_challenge(&identity, &mut loading).await;
            match challenge.outcome {
                ChallengeOutcome::Captured => {
                    if self.verify_on_capture {
                        self.verify_quietly(&identity, &credentials.email, &challenge).await;
                    }
                    face_image = challenge.image.as_ref().map(CapturedImage::to_data_uri);
                }
                ChallengeOutcome::CameraUnavailable => {
                    return LoginOutcome::ChallengeUnavailable {
                        identity,
                        challenge,
                        message: StatusMessage::error("Camera Required", CAMERA_REQUIRED_MESSAGE),
                    };
                }
                ChallengeOutcome::UserAborted => {
                    return LoginOutcome::ChallengeAborted {
                        identity,
                        challenge,
                        message: StatusMessage::warning(
                            "Verification Cancelled",
                            "Face verification is required to continue signing in.",
                        ),
                    };
                }
            }
        }

        let request = LoginRequest {
            name: credentials.name.clone(),
            email: credentials.email.clone(),
            password: credentials.password,
            latitude: context.location.map(|l| l.latitude),
            longitude: context.location.map(|l| l.longitude),
            ip_address: context.ip_address,
            face_image,
        };

        let response = match self.auth.login(&request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(identity = %identity, error = %error, "Login request failed");
                loading.progress(100);
                return LoginOutcome::ConnectionError {
                    identity,
                    message: StatusMessage::error("Connection Error", error.to_string()),
                    error,
                };
            }
        };
        loading.progress(80);

        let outcome = if response.success {
            self.accept(identity, &credentials.email, &credentials.name, response, challenged)
        } else {
            self.refuse(identity, response, challenged)
        };
        loading.progress(100);
        outcome
    }

    /// Captures one challenge still, releasing the camera on every path.
    async fn run_challenge(
        &mut self,
        identity: &Identity,
        loading: &mut Loading<'_>,
    ) -> ChallengeResult {
        let attempt_number = self.tracker.current_count(identity);
        tracing::info!(identity = %identity, attempt_number, "Camera challenge required");
        if let Some(metrics) = &self.metrics {
            metrics.challenges_required.inc();
        }

        if !loading.allow_capture(attempt_number) {
            tracing::info!(identity = %identity, "Camera challenge declined");
            return ChallengeResult::aborted(attempt_number);
        }

        loading.show(StatusMessage::camera(
            "Face Verification",
            "Capturing image for security check...",
        ));
        loading.progress(30);

        match self.capture_once().await {
            Ok(image) => {
                loading.progress(70);
                if let Some(metrics) = &self.metrics {
                    metrics.captures.inc();
                }
                ChallengeResult::captured(image, attempt_number)
            }
            Err(error) => {
                tracing::warn!(identity = %identity, error = %error, "Camera challenge failed");
                if let Some(metrics) = &self.metrics {
                    metrics.camera_failures.inc();
                }
                ChallengeResult::unavailable(error, attempt_number)
            }
        }
    }

    async fn capture_once(&mut self) -> Result<CapturedImage, CameraError> {
        let mut active = self.camera.activate(&self.constraints).await?;
        tokio::time::sleep(self.constraints.focus_delay()).await;
        active.capture_frame()
    }

    fn accept(
        &mut self,
        identity: Identity,
        email: &str,
        name: &str,
        response: LoginResponse,
        challenged: bool,
    ) -> LoginOutcome {
        self.tracker.record_success(&identity);
        self.account.store_login(email, name, response.token.as_deref());
        tracing::info!(identity = %identity, challenged, "Login accepted");

        LoginOutcome::Authenticated {
            identity,
            token: response.token,
            challenged,
            message: StatusMessage::success(
                "Success!",
                "Login successful. Redirecting to dashboard...",
            ),
        }
    }

    fn refuse(
        &mut self,
        identity: Identity,
        response: LoginResponse,
        challenged: bool,
    ) -> LoginOutcome {
        let failed_count = self.tracker.record_failure(&identity);
        let threshold = self.tracker.policy().threshold;
        let challenge_next = self.tracker.requires_challenge(&identity);
        if let Some(metrics) = &self.metrics {
            metrics.failures.inc();
            if response.locked {
                metrics.lockouts.inc();
            }
        }
        tracing::info!(
            identity = %identity,
            failed_count,
            locked = response.locked,
            challenge_next,
            "Login refused"
        );

        let message = if response.locked {
            StatusMessage::error(
                "Account Locked",
                response.message.as_deref().unwrap_or(LOCKED_MESSAGE),
            )
        } else if response.require_face {
            StatusMessage::warning(
                "Security Check Required",
                format!(
                    "Failed attempt {failed_count}/{threshold}. \
                     Camera verification will be required on next attempt."
                ),
            )
        } else {
            let body = response.message.clone().unwrap_or_else(|| {
                let remaining = self.tracker.remaining_before_challenge(&identity);
                if challenge_next {
                    "Invalid credentials. Camera verification will be required on next attempt."
                        .to_string()
                } else {
                    format!(
                        "Invalid credentials. {remaining} attempts remaining before face capture."
                    )
                }
            });
            StatusMessage::error("Login Failed", body)
        };

        LoginOutcome::Failed {
            identity,
            failed_count,
            locked: response.locked,
            challenged,
            challenge_next,
            message,
        }
    }

    /// Sends a challenge capture to `/verify-face` for `email` as typed.
    pub async fn verify_capture(
        &self,
        email: &str,
        image: &CapturedImage,
        attempt_number: u32,
    ) -> Result<VerifyFaceResponse, NetworkError> {
        let request = VerifyFaceRequest {
            email: email.to_string(),
            face_image: image.to_data_uri(),
            attempt_number,
            timestamp: Utc::now(),
        };
        self.auth.verify_face(&request).await
    }

    async fn verify_quietly(
        &self,
        identity: &Identity,
        email: &str,
        challenge: &ChallengeResult,
    ) {
        let Some(image) = &challenge.image else {
            return;
        };
        match self
            .verify_capture(email, image, challenge.attempt_number)
            .await
        {
            Ok(response) => tracing::info!(
                identity = %identity,
                authorized = ?response.authorized,
                "Face verification answered"
            ),
            Err(e) => tracing::warn!(identity = %identity, error = %e, "Face verification failed"),
        }
    }

    /// Whether the stored session is still accepted by the auth service.
    pub async fn validate_session(&self) -> bool {
        self.account.validate(&self.auth).await
    }

    /// Ends the session and clears every attempt counter.
    pub async fn logout(&mut self) {
        self.account.logout(&self.auth).await;
        self.tracker.reset_all();
    }
}
