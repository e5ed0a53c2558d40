use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SsoError {
    #[error("no SSO cache file given (pass --sso-file or set ORG_SSO_FILE)")]
    #[diagnostic(help(
        "e.g. ORG_SSO_FILE=~/.aws/sso/cache/xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx.json"
    ))]
    MissingSsoFile,

    #[error("SSO cache file does not exist: {0}")]
    SsoFileNotFound(Utf8PathBuf),

    #[error("failed to read SSO cache file at {0}")]
    SsoFileRead(Utf8PathBuf),

    #[error("failed to parse SSO cache file: {0}")]
    SsoFileParse(String),

    #[error("SSO cache file is missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url}\nreturned {status}\n{message}")]
    Discovery {
        url: String,
        status: u16,
        message: String,
    },

    #[error("profile fetch task failed: {0}")]
    TaskFailed(String),

    #[error("failed to write output: {0}")]
    Output(String),
}
