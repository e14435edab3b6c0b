use thiserror::Error;

/// A value handed to the form does not fit the field it targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' expects a {expected} value")]
    KindMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("'{option}' is not an option of field '{field}'")]
    UnknownOption { field: &'static str, option: String },
}

/// Failures reading configuration or a values document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing configuration value '{0}'")]
    Missing(&'static str),

    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Outcome of a failed list write. Only the pipeline boundary sees these.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("could not reach list endpoint: {0}")]
    Transport(String),

    #[error("list endpoint answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),

    #[error("worker exited without a result")]
    WorkerExited,
}

impl SubmitError {
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

impl From<ureq::Error> for SubmitError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => Self::Status {
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => Self::Transport(transport.to_string()),
        }
    }
}

/// Everything that can stop the binary before or around the form itself.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}
