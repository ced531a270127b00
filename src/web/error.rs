use crate::provider::ProviderError;
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Geçersiz sembol: {0}")]
    InvalidSymbol(String),

    #[error("Piyasa verisi alınamadı: {0}")]
    Provider(#[from] ProviderError),

    #[error("Şirket verisi okunamadı: {0:#}")]
    Storage(anyhow::Error),

    #[error("Sayfa oluşturulamadı: {0}")]
    Render(#[from] tera::Error),

    #[error("Grafik oluşturulamadı: {0}")]
    Chart(#[from] serde_json::Error),

    #[error("İstek işlenemedi: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidSymbol(_) => StatusCode::NOT_FOUND,
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) | AppError::Render(_) | AppError::Chart(_) | AppError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
