use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const MSG_SERVER_ERROR: &str = "Terjadi kesalahan pada server";
pub const MSG_UNAUTHORIZED: &str = "Gagal memuat data pengguna";
pub const MSG_FORBIDDEN: &str = "Anda tidak memiliki akses ke halaman ini";
pub const MSG_NOT_FOUND: &str = "Data tidak ditemukan";
pub const MSG_REQUIRED_FIELDS: &str = "Mohon lengkapi semua field yang wajib diisi";
pub const MSG_STUDENT_NOT_FOUND: &str = "Data siswa tidak ditemukan";
pub const MSG_NOT_IN_CLASS: &str = "Siswa bukan anggota kelas Anda";
pub const MSG_DUPLICATE_NIS: &str = "NIS sudah terdaftar";
pub const MSG_DUPLICATE_EMAIL: &str = "Email sudah terdaftar";
pub const MSG_ALREADY_REVIEWED: &str = "Izin sudah ditinjau";
pub const MSG_BOOTSTRAP_NOT_ADMIN: &str = "Akun bootstrap bukan administrator";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("No student record for this user")]
    StudentNotFound,

    #[error("Student is not in the reviewer's class")]
    NotInClass,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    pub fn required_fields() -> Self {
        AppError::BadRequest(MSG_REQUIRED_FIELDS.to_string())
    }

    /// The localized text shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound => MSG_NOT_FOUND.to_string(),
            AppError::BadRequest(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::Unauthorized => MSG_UNAUTHORIZED.to_string(),
            AppError::Forbidden => MSG_FORBIDDEN.to_string(),
            AppError::StudentNotFound => MSG_STUDENT_NOT_FOUND.to_string(),
            AppError::NotInClass => MSG_NOT_IN_CLASS.to_string(),
            AppError::Database(_) | AppError::Config(_) | AppError::InternalServerError => {
                MSG_SERVER_ERROR.to_string()
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound | AppError::StudentNotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::NotInClass => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Config(_) | AppError::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => error!("database error: {}", e),
            AppError::Config(msg) => error!("configuration error: {}", msg),
            _ => {}
        }

        let status = self.status();
        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: self.user_message(),
        });

        (status, body).into_response()
    }
}
