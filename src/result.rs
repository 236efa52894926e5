use crate::{inventory::ChecklistError, models::ValidationError, session::NoGameSelected, store::NotFound};

use std::fmt::Display;

use anyhow;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T = (), E = AppError> = anyhow::Result<T, E>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        if self.0.is::<ValidationError>()
            || self.0.is::<ChecklistError>()
            || self.0.is::<MultipartError>()
        {
            return StatusCode::BAD_REQUEST;
        }

        if self.0.is::<NotFound>() {
            return StatusCode::NOT_FOUND;
        }

        if self.0.is::<NoGameSelected>() {
            return StatusCode::CONFLICT;
        }

        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Display + std::fmt::Debug + Send + Sync + 'static,
    {
        return self.0.downcast_ref::<E>();
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self.0, "request failed");

            return (status, format!("Something went wrong: {}", self.0)).into_response();
        }

        return (status, self.0.to_string()).into_response();
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
