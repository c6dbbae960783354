//! Handle Login / 2FA flow. Delegates to AuthPort, asks the operator through PromptPort.
//!
//! Bot accounts skip the interactive flow and sign in with their token.

use crate::domain::{DomainError, SignInResult};
use crate::ports::{AuthPort, PromptPort};
use std::sync::Arc;
use tracing::info;

/// How the bot identifies itself to Telegram.
pub enum LoginMethod {
    /// Regular account: phone number, login code, optional 2FA password.
    User,
    /// Bot account from @BotFather.
    BotToken(String),
}

pub struct AuthService {
    auth: Arc<dyn AuthPort>,
    prompt: Arc<dyn PromptPort>,
    api_hash: String,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthPort>, prompt: Arc<dyn PromptPort>, api_hash: String) -> Self {
        Self {
            auth,
            prompt,
            api_hash,
        }
    }

    /// Sign in unless the stored session is already authorized.
    pub async fn ensure_authenticated(&self, method: &LoginMethod) -> Result<(), DomainError> {
        if self.auth.is_authenticated().await? {
            info!("session already authorized");
            return Ok(());
        }
        match method {
            LoginMethod::BotToken(token) => {
                self.auth.bot_sign_in(token, &self.api_hash).await?;
                info!("signed in as bot");
            }
            LoginMethod::User => self.user_login().await?,
        }
        Ok(())
    }

    async fn user_login(&self) -> Result<(), DomainError> {
        let phone = self.prompt.phone()?;
        self.auth
            .request_login_code(phone.trim(), &self.api_hash)
            .await?;
        let code = self.prompt.login_code()?;
        match self.auth.sign_in(code.trim()).await? {
            SignInResult::Success => {}
            SignInResult::PasswordRequired { hint } => {
                let password = self.prompt.password(hint.as_deref())?;
                self.auth.check_password(password.as_bytes()).await?;
            }
        }
        info!("signed in; session saved");
        Ok(())
    }
}
