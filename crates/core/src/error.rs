/// Result alias that carries the custom [`RiftChartError`] type.
pub type Result<T> = std::result::Result<T, RiftChartError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum RiftChartError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The buffer does not start with the capture header tag.
    #[error("unexpected header `{found}`")]
    UnexpectedHeader { found: String },
    /// A declared field runs past the end of the buffer.
    #[error("unexpected end of capture at byte {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// A length-prefixed string is negative or not valid UTF-8.
    #[error("invalid string at byte {offset}")]
    InvalidString { offset: usize },
    #[error("unknown event type {0}")]
    UnknownEventType(i32),
    #[error("unknown enemy type {0}")]
    UnknownEnemyType(i32),
    #[error("unknown difficulty {0}")]
    UnknownDifficulty(i32),
    /// A count prefix decoded to a negative number.
    #[error("negative {field} count {count}")]
    NegativeCount { field: &'static str, count: i32 },
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
}

impl RiftChartError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Whether the error only means "this is not a capture file". Batch
    /// conversion skips such inputs instead of reporting them as failures.
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::UnexpectedHeader { .. })
    }
}

impl From<&str> for RiftChartError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for RiftChartError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
