//! Implements AuthPort using grammers Client.
//!
//! The login flow is a small state machine (code requested -> password requested)
//! kept behind one lock so a stale token can never be paired with a newer step.

use crate::domain::{DomainError, SignInResult};
use crate::ports::AuthPort;
use async_trait::async_trait;
use grammers_client::client::{LoginToken, PasswordToken};
use grammers_client::{Client, SignInError};
use tokio::sync::Mutex;

enum LoginState {
    Idle,
    AwaitingCode(LoginToken),
    AwaitingPassword(PasswordToken),
}

/// Auth adapter. Same session as the transport via client clone in main.
pub struct GrammersAuthAdapter {
    client: Client,
    state: Mutex<LoginState>,
}

impl GrammersAuthAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Mutex::new(LoginState::Idle),
        }
    }
}

fn sign_in_error(e: SignInError) -> DomainError {
    match e {
        SignInError::InvalidCode => {
            DomainError::Auth("Invalid login code. Restart and enter the code Telegram sent.".into())
        }
        SignInError::SignUpRequired => DomainError::Auth(
            "This phone number has no Telegram account; register it in the official app first."
                .into(),
        ),
        other => DomainError::Auth(format!("sign in: {}", other)),
    }
}

#[async_trait]
impl AuthPort for GrammersAuthAdapter {
    async fn is_authenticated(&self) -> Result<bool, DomainError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| DomainError::Auth(e.to_string()))
    }

    async fn request_login_code(&self, phone: &str, api_hash: &str) -> Result<(), DomainError> {
        let token = self
            .client
            .request_login_code(phone, api_hash)
            .await
            .map_err(|e| DomainError::Auth(format!("request login code for {}: {}", phone, e)))?;
        *self.state.lock().await = LoginState::AwaitingCode(token);
        Ok(())
    }

    async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError> {
        let mut state = self.state.lock().await;
        let LoginState::AwaitingCode(token) = std::mem::replace(&mut *state, LoginState::Idle)
        else {
            return Err(DomainError::Auth("no login code has been requested".into()));
        };
        match self.client.sign_in(&token, code).await {
            Ok(_) => Ok(SignInResult::Success),
            Err(SignInError::PasswordRequired(password_token)) => {
                let hint = password_token.hint().map(String::from);
                *state = LoginState::AwaitingPassword(password_token);
                Ok(SignInResult::PasswordRequired { hint })
            }
            Err(e) => Err(sign_in_error(e)),
        }
    }

    async fn check_password(&self, password: &[u8]) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let LoginState::AwaitingPassword(token) = std::mem::replace(&mut *state, LoginState::Idle)
        else {
            return Err(DomainError::Auth("account did not ask for a 2FA password".into()));
        };
        self.client
            .check_password(token, password)
            .await
            .map(|_| ())
            .map_err(sign_in_error)
    }

    async fn bot_sign_in(&self, token: &str, api_hash: &str) -> Result<(), DomainError> {
        self.client
            .bot_sign_in(token, api_hash)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::Auth(format!("bot sign in: {}", e)))
    }
}
