/// Broad failure classes surfaced by the loaders and transforms.
///
/// Non-numeric cells and misaligned joins are *not* errors: they become
/// missing values in the resulting tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A source CSV or snapshot does not exist.
    MissingFile,
    /// Any other read/write failure.
    Io,
    /// Expected column absent, unexpected region set, duplicate key, etc.
    Schema,
    /// A date cell that cannot be parsed.
    Parse,
    /// Missing or invalid configuration (data directory, CLI values).
    Config,
    /// The volatility filter could not be estimated.
    Model,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config | ErrorKind::MissingFile | ErrorKind::Io => 2,
            ErrorKind::Schema | ErrorKind::Parse => 3,
            ErrorKind::Model => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, message)
    }

    /// Classify a failed `File::open`/`File::create` on `path`.
    pub fn from_io(err: &std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::new(ErrorKind::MissingFile, format!("File not found: '{}'", path.display()))
        } else {
            Self::new(ErrorKind::Io, format!("Failed to access '{}': {err}", path.display()))
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
