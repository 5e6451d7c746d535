use log::{error, warn};
use rocket::{
    http::Status,
    response::{status::Custom, Responder},
    serde::json::Json,
    Request,
};
use serde::Serialize;

use crate::error::EmError;

/// Envelope returned by every HTTP endpoint. `is_success` lets a caller distinguish a well-formed
/// failure response (e.g. validation) from a successful payload without inspecting status codes.
#[derive(Serialize)]
pub struct Response<T> {
    pub is_success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Response<T> {
    pub fn success(data: T) -> Self {
        Self {
            is_success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn message(message: String) -> Self {
        Self {
            is_success: true,
            message: Some(message),
            data: None,
        }
    }

    pub fn failure(message: String) -> Self {
        warn!("{message}");
        Self {
            is_success: false,
            message: Some(message),
            data: None,
        }
    }

    pub fn error(error: EmError) -> Self {
        error!("{error}");
        Self {
            is_success: false,
            message: Some(error.to_string()),
            data: None,
        }
    }
}

/// Thin `Responder` wrapper pairing a [`Response`] body with the HTTP status it should be sent
/// under. Kept separate from `Response` so handlers can vary status independent of payload shape.
pub struct ApiResponse<T> {
    pub status: Status,
    pub body: Response<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: Status::Ok,
            body: Response::success(data),
        }
    }

    pub fn accepted(data: T) -> Self {
        Self {
            status: Status::Accepted,
            body: Response::success(data),
        }
    }

    pub fn bad_request(message: String) -> Self {
        Self {
            status: Status::BadRequest,
            body: Response::failure(message),
        }
    }

    pub fn not_found(message: String) -> Self {
        Self {
            status: Status::NotFound,
            body: Response::failure(message),
        }
    }

    pub fn server_error(error: EmError) -> Self {
        Self {
            status: Status::InternalServerError,
            body: Response::error(error),
        }
    }
}

impl<'r, T: Serialize> Responder<'r, 'static> for ApiResponse<T> {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        Custom(self.status, Json(self.body)).respond_to(request)
    }
}
