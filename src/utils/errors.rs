#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors enumerates the error conditions raised by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("wiki_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Unable to parse templates in directory: {}", .0)]
    TemplateInitialization(String),

    #[error("Page not found: {}", .0)]
    PageNotFound(String),

    #[error("Invalid page title: {}", .0)]
    InvalidPageTitle(String),
}
