use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error(
        "The php executable could not be found, add it to your PATH environment variable and try again"
    )]
    InterpreterNotFound,

    #[error("Configured php executable is not usable: {}", path.display())]
    InterpreterNotExecutable { path: PathBuf },
}
