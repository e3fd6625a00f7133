use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use validator::ValidationErrors;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Request is invalid: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error("\"{0}\" is not a valid room id")]
    InvalidRoomId(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::Invalid(_) | Self::InvalidRoomId(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.as_status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod test {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::ServerError;

    #[test]
    fn missing_fields_are_bad_requests() {
        let response = ServerError::MissingField("query").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
