//! Session-backed flash messages: queued by one request, rendered once by
//! the next, then gone.

use tower_sessions::Session;

use crate::error::AppError;
use crate::models::forms::FieldError;

const FLASH_KEY: &str = "_flashes";

pub async fn flash(session: &Session, message: impl Into<String>) -> Result<(), AppError> {
    let mut queued: Vec<String> = session.get(FLASH_KEY).await?.unwrap_or_default();
    queued.push(message.into());
    session.insert(FLASH_KEY, queued).await?;
    Ok(())
}

/// One line per failing field, in form order.
pub async fn flash_field_errors(
    session: &Session,
    errors: &[FieldError],
) -> Result<(), AppError> {
    for error in errors {
        flash(session, error.message).await?;
    }
    Ok(())
}

/// Drains the queue; a second call comes back empty.
pub async fn take_flashes(session: &Session) -> Result<Vec<String>, AppError> {
    Ok(session
        .remove::<Vec<String>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}
