use thiserror::Error;

#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Invalid file: {0}")]
    Parse(String),

    #[error("The file was read but contains no data rows")]
    EmptyDataset,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unknown report: {0}")]
    UnknownReport(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl PivotError {
    /// True for failures caused by the input file rather than the environment.
    pub fn is_bad_input(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::EmptyDataset)
    }
}

pub type Result<T> = std::result::Result<T, PivotError>;
