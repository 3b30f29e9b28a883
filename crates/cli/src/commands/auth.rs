//! Account commands.

use serde_json::json;

use catalog_client::{LoginForm, Session, SignupForm};

use super::{Api, CommandError, print_json};

pub async fn signup(
    api: &Api,
    email: String,
    password: String,
    name: Option<String>,
) -> Result<(), CommandError> {
    let mut form = SignupForm::new(email, password);
    if let Some(name) = name {
        form = form.with_name(name);
    }
    let session = api.anonymous()?.signup(&form).await?;
    print_session(&session)
}

pub async fn login(api: &Api, email: String, password: String) -> Result<(), CommandError> {
    let session = api
        .anonymous()?
        .login(&LoginForm::new(email, password))
        .await?;
    print_session(&session)
}

pub async fn profile(api: &Api) -> Result<(), CommandError> {
    let profile = api.signed_in().await?.profile().await?;
    print_json(&profile)
}

pub async fn health(api: &Api) -> Result<(), CommandError> {
    let health = api.anonymous()?.health().await?;
    print_json(&health)
}

fn print_session(session: &Session) -> Result<(), CommandError> {
    print_json(&json!({
        "token": session.token,
        "user": session.user,
    }))
}
