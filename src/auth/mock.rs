//! Scripted auth service for testing and the offline demo.
//!
//! Login answers are replayed from a queue; every request is recorded so
//! callers can check what reached the "server". Clones share the script.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;

use super::{
    AuthService, LoginRequest, LoginResponse, NetworkError, SessionStatus, VerifyFaceRequest,
    VerifyFaceResponse,
};

#[derive(Debug, Default)]
struct Script {
    logins: VecDeque<Result<LoginResponse, NetworkError>>,
    login_requests: Vec<LoginRequest>,
    verify_requests: Vec<VerifyFaceRequest>,
    valid_tokens: Vec<String>,
    logged_out: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ScriptedAuthService {
    script: Rc<RefCell<Script>>,
}

impl ScriptedAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the answer to the next unanswered login.
    pub fn then_login(self, response: LoginResponse) -> Self {
        self.script.borrow_mut().logins.push_back(Ok(response));
        self
    }

    /// Queues a transport failure for the next unanswered login.
    pub fn then_fail(self, error: NetworkError) -> Self {
        self.script.borrow_mut().logins.push_back(Err(error));
        self
    }

    /// Queues `count` refusals, then one acceptance issuing `token`.
    pub fn rejecting_then_accepting(self, count: u32, token: &str) -> Self {
        let mut this = self;
        for _ in 0..count {
            this = this.then_login(LoginResponse::rejected("Invalid credentials"));
        }
        this.then_login(LoginResponse::accepted(token))
    }

    /// Every login request received so far.
    pub fn login_requests(&self) -> Vec<LoginRequest> {
        self.script.borrow().login_requests.clone()
    }

    pub fn verify_requests(&self) -> Vec<VerifyFaceRequest> {
        self.script.borrow().verify_requests.clone()
    }

    /// Tokens passed to `logout`.
    pub fn logged_out(&self) -> Vec<String> {
        self.script.borrow().logged_out.clone()
    }
}

#[async_trait(?Send)]
impl AuthService for ScriptedAuthService {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, NetworkError> {
        let mut script = self.script.borrow_mut();
        script.login_requests.push(request.clone());
        let answer = script
            .logins
            .pop_front()
            .unwrap_or_else(|| Ok(LoginResponse::rejected("Invalid credentials")));

        if let Ok(response) = &answer {
            if let Some(token) = response.token.as_ref().filter(|_| response.success) {
                script.valid_tokens.push(token.clone());
            }
        }
        answer
    }

    async fn verify_face(
        &self,
        request: &VerifyFaceRequest,
    ) -> Result<VerifyFaceResponse, NetworkError> {
        self.script.borrow_mut().verify_requests.push(request.clone());
        Ok(VerifyFaceResponse {
            success: true,
            authorized: Some(false),
            message: Some("Face verified successfully".to_string()),
            ..Default::default()
        })
    }

    async fn validate_session(&self, token: &str) -> Result<SessionStatus, NetworkError> {
        let script = self.script.borrow();
        Ok(SessionStatus {
            success: script.valid_tokens.iter().any(|t| t == token),
        })
    }

    async fn logout(&self, token: &str) -> Result<(), NetworkError> {
        let mut script = self.script.borrow_mut();
        script.valid_tokens.retain(|t| t != token);
        script.logged_out.push(token.to_string());
        Ok(())
    }
}
