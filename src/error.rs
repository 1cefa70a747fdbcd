use thiserror::Error;

/// Everything that can go wrong while turning a sheet of dreams into a song.
#[derive(Error, Debug)]
pub enum Error {
    /// A required secret was not provided by the environment
    #[error("missing secret `{0}`")]
    MissingSecret(&'static str),

    /// A secret was present but could not be understood
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The sheet reference does not point at a spreadsheet
    #[error("not a spreadsheet URL: {0}")]
    InvalidSheetUrl(String),

    /// The spreadsheet could not be opened or read
    #[error("could not open spreadsheet: {0}")]
    Access(String),

    /// The service account assertion could not be signed
    #[error("could not sign service account assertion: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// The exported worksheet is not valid CSV
    #[error("could not read worksheet: {0}")]
    Worksheet(#[from] csv::Error),

    /// The text generation call failed
    #[error("lyrics generation failed: {0}")]
    Generation(String),

    /// The music generation call could not be completed
    #[error("song rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
