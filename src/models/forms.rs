//! Typed form inputs, one struct per action, with pure validators.
//!
//! Field names match the HTML form controls, so `axum::Form` can bind the
//! request body directly. Validators return every failing field at once
//! instead of bailing on the first.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub passwordconf: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub subtitle: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_signup(form: &SignupForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if blank(&form.username) {
        errors.push(FieldError::new("username", "Username is required"));
    }
    if blank(&form.email) {
        errors.push(FieldError::new("email", "Email is required"));
    }
    if blank(&form.password) {
        errors.push(FieldError::new("password", "Password is required"));
    }
    if form.password != form.passwordconf {
        errors.push(FieldError::new("passwordconf", "Passwords do not match"));
    }
    errors
}

pub fn validate_post(form: &PostForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if blank(&form.title) {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if blank(&form.subtitle) {
        errors.push(FieldError::new("subtitle", "Subtitle is required"));
    }
    if blank(&form.body) {
        errors.push(FieldError::new("body", "Body is required"));
    }
    errors
}
