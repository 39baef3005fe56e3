#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid content address: {0}")]
    InvalidAddress(String),
}
