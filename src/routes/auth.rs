use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::Form;
use tower_sessions::Session;
use tracing::info;

use crate::auth;
use crate::auth::Hasher;
use crate::error::AppError;
use crate::helpers::{flash, flash_field_errors};
use crate::models::forms::{LoginForm, SignupForm};
use crate::services::posts::PostService;
use crate::services::users::UserService;

use super::{base_context, render, AppState};

pub async fn login_page<U: UserService, P: PostService>(
    State((users, _, tera, _)): State<AppState<U, P>>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let identity = auth::current_identity(&users, &session).await?;
    let ctx = base_context(&session, &identity).await?;
    render(&tera, "login.html", &ctx)
}

pub async fn login<U: UserService, P: PostService>(
    State((users, _, _, hasher)): State<AppState<U, P>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    match auth::login(&users, &hasher, &session, &form).await {
        Ok(identity) => {
            info!(user = %identity.username, "logged in");
            Ok(Redirect::to("/"))
        }
        Err(AppError::NotFound(_)) => {
            flash(&session, "User is not registered, sign up!").await?;
            Ok(Redirect::to("/signup"))
        }
        Err(AppError::Unauthorized) => {
            flash(&session, "Wrong username or password.").await?;
            Ok(Redirect::to("/login"))
        }
        Err(other) => Err(other),
    }
}

pub async fn signup_page<U: UserService, P: PostService>(
    State((users, _, tera, _)): State<AppState<U, P>>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let identity = auth::current_identity(&users, &session).await?;
    let ctx = base_context(&session, &identity).await?;
    render(&tera, "register.html", &ctx)
}

pub async fn signup<U: UserService, P: PostService>(
    State((users, _, _, hasher)): State<AppState<U, P>>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Redirect, AppError> {
    handle_signup(&users, &hasher, &session, &form, "/signup").await
}

/// The dashboard is an alternate signup form; its POST branch runs the same
/// registration path and only differs in where failures land.
pub async fn dashboard_page<U: UserService, P: PostService>(
    State((users, _, tera, _)): State<AppState<U, P>>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let identity = auth::current_identity(&users, &session).await?;
    let ctx = base_context(&session, &identity).await?;
    render(&tera, "dashboard.html", &ctx)
}

pub async fn dashboard_signup<U: UserService, P: PostService>(
    State((users, _, _, hasher)): State<AppState<U, P>>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Redirect, AppError> {
    handle_signup(&users, &hasher, &session, &form, "/dashboard").await
}

pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    auth::logout(&session).await?;
    Ok(Redirect::to("/"))
}

async fn handle_signup<U: UserService>(
    users: &U,
    hasher: &Hasher,
    session: &Session,
    form: &SignupForm,
    back_to: &'static str,
) -> Result<Redirect, AppError> {
    match auth::register(users, hasher, session, form).await {
        Ok(identity) => {
            info!(user = %identity.username, "signed up");
            Ok(Redirect::to("/"))
        }
        Err(AppError::Validation(errors)) => {
            flash_field_errors(session, &errors).await?;
            Ok(Redirect::to(back_to))
        }
        Err(AppError::Conflict(field)) => {
            let message = match field {
                "username" => "This username is not available",
                _ => "This email is already registered",
            };
            flash(session, message).await?;
            Ok(Redirect::to(back_to))
        }
        Err(other) => Err(other),
    }
}
