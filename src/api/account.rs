//! Authentication, user management and profile endpoints

use serde_json::Value;

use super::types::{
    ForgotPasswordStep, LoginRequest, LoginResponse, MessageResponse, PasswordChange, Profile,
    Role, UserList,
};
use super::{BlogApi, Session};
use crate::http_client::{ApiError, ApiResult};
use crate::validation::{
    validate_identifier, validate_password, validate_password_change, validate_profile,
    validate_reset_password,
};

impl BlogApi {
    /// Log in and store the session.
    ///
    /// The login form shows its own spinner, so the request stays off the
    /// global indicator.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        validate_identifier(username)?;
        validate_password(password)?;
        let response: LoginResponse = self
            .client
            .post("auth/login")
            .skip_global_loading()
            .json(&LoginRequest {
                username: username.trim(),
                password: password.trim(),
            })
            .send_json()
            .await?;

        let Some(token) = response.token else {
            return Err(ApiError::Status {
                status: 200,
                message: response.message.unwrap_or_else(|| "Login failed".to_string()),
            });
        };
        let user_id = match response.id {
            Some(Value::String(id)) => id,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let session = Session {
            token,
            role: response.role.unwrap_or(Role::User),
            username: response.username.unwrap_or_else(|| username.trim().to_string()),
            user_id,
        };
        log::info!("logged in as {} ({:?})", session.username, session.role);
        self.set_session(session.clone());
        Ok(session)
    }

    /// Admin user search
    pub async fn manage_users(&self, search: &str) -> ApiResult<Vec<Value>> {
        let list: UserList = self
            .client
            .get("user/manage")
            .query("search", search)
            .send_json()
            .await?;
        Ok(list.users)
    }

    pub async fn user(&self, id: &str) -> ApiResult<Value> {
        self.client.get(format!("user/{id}")).send_json().await
    }

    pub async fn profile(&self) -> ApiResult<Profile> {
        let options = self.authed()?;
        self.client.get("user/profile").options(options).send_json().await
    }

    /// Save the edited profile.
    ///
    /// `profile.phone` is the national number; it is sent prefixed with
    /// `country_code`. Nothing is sent unless the form validates.
    pub async fn update_profile(&self, profile: &Profile, country_code: &str) -> ApiResult<()> {
        validate_profile(profile)?;
        let options = self.authed()?;
        let mut body = profile.clone();
        body.phone = format!("{country_code}{}", profile.phone.trim());
        self.client
            .patch("user/update/profile")
            .options(options)
            .json(&body)
            .send()
            .await?;
        Ok(())
    }

    pub async fn change_password(&self, change: &PasswordChange<'_>) -> ApiResult<()> {
        validate_password_change(change.new_password, change.confirm_password)?;
        let options = self.authed()?;
        self.client
            .patch("user/change-password")
            .options(options)
            .json(change)
            .send()
            .await?;
        Ok(())
    }

    /// Run one step of the forgot-password wizard; returns the server message
    pub async fn forgot_password(&self, step: &ForgotPasswordStep) -> ApiResult<String> {
        if let ForgotPasswordStep::Reset { new_password, .. } = step {
            validate_reset_password(new_password)?;
        }
        let response: MessageResponse = self
            .client
            .post("auth/forgot-password")
            .json(step)
            .send_json()
            .await?;
        Ok(response.message)
    }
}
