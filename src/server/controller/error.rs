use actix_web::{error, HttpResponse};
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use derive_more::{Display, Error};
use crate::server::model::order::OrderError;

#[derive(Debug, Display, Error)]
pub(crate) enum CustomError {
    #[display("invalid request, {reason}")]
    BadRequest { reason: String },
    #[display("resource not found")]
    ResourceNotFound,
    #[display("failed to save the order, please try again")]
    OrderNotSaved,
    #[display("timeout occurred")]
    Timeout,
}

impl From<OrderError> for CustomError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::UnknownEntry { .. } => CustomError::ResourceNotFound,
            OrderError::InvalidQuantity { .. }
            | OrderError::InvalidCustomerId
            | OrderError::EmptyOrder => CustomError::BadRequest { reason: e.to_string() },
            OrderError::OrderFileWriteFailed { .. } => CustomError::OrderNotSaved,
        }
    }
}

impl error::ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            CustomError::ResourceNotFound => StatusCode::NOT_FOUND,
            CustomError::OrderNotSaved => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }
}
