//! Errors of a single interaction

use ri_data::DataError;
use ri_llm::ModelError;
use ri_views::RenderError;
use thiserror::Error;

/// Anything that can stop a question from being answered
#[derive(Error, Debug)]
pub enum InteractionError {
    #[error("No data has been uploaded yet. Upload a CSV file first.")]
    NoData,

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
