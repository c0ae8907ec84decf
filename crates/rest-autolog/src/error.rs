use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutologError {
    /// The request URL could not be parsed, so the call cannot be classified.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Client error: {0}")]
    Client(#[from] reqwest::Error),
}
