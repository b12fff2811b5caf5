pub mod models;

mod store;

pub use store::{PgSessionStore, PgTranscriptStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row in {table}: {message}")]
    Corrupt { table: &'static str, message: String },
}
