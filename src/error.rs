use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failure of the data-access layer.
///
/// Every problem talking to the database collapses into [`DaoError::Storage`];
/// callers are not expected to look past it.
#[derive(Error, Debug)]
pub enum DaoError {
    #[error("{context}")]
    Storage {
        context: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl DaoError {
    pub fn storage(context: impl Into<String>) -> impl FnOnce(sqlx::Error) -> Self {
        let context = context.into();
        move |source| Self::Storage { context, source }
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Chart(String),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Spreadsheet generation failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Dao(#[from] DaoError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl AppError {
    pub fn invalid_param(name: &str) -> Self {
        Self::BadRequest(format!("Invalid {name} parameter."))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Dao(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            match std::error::Error::source(&self) {
                Some(source) => error!("{self}: {source}"),
                None => error!("{self}"),
            }
        }

        (status, self.to_string()).into_response()
    }
}
