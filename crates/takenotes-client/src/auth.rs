use tracing::info;

use takenotes_types::api::{RegisterRequest, RegisterResponse, TokenPair, TokenRequest};

use crate::TakeNotesClient;
use crate::error::ApiError;

/// The signed-in identity, reconstructed from the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
}

impl TakeNotesClient {
    /// Register a new account and store the issued tokens. The backend keys
    /// accounts by username; we pass the email address as that username.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<CurrentUser, ApiError> {
        let response: RegisterResponse = self
            .gateway()
            .post(
                "/api/auth/register/",
                &RegisterRequest {
                    username: email.to_owned(),
                    password: password.to_owned(),
                },
            )
            .await?;

        let tokens = response.into_tokens().ok_or(ApiError::MissingTokens)?;
        self.session().set(&tokens.access, &tokens.refresh, Some(email));
        info!(email, "signed up");
        Ok(CurrentUser {
            email: email.to_owned(),
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser, ApiError> {
        let tokens: TokenPair = self
            .gateway()
            .post(
                "/api/auth/token/",
                &TokenRequest {
                    username: email.to_owned(),
                    password: password.to_owned(),
                },
            )
            .await?;

        self.session().set(&tokens.access, &tokens.refresh, Some(email));
        info!(email, "signed in");
        Ok(CurrentUser {
            email: email.to_owned(),
        })
    }

    /// Forget the stored credentials. Purely local; the server keeps no
    /// session state beyond the tokens themselves.
    pub fn sign_out(&self) {
        self.session().clear();
    }

    /// `Some` only when both an access token and an email are on record.
    pub fn current_user(&self) -> Option<CurrentUser> {
        let session = self.session();
        session.access_token()?;
        Some(CurrentUser {
            email: session.email()?,
        })
    }
}
