pub use crate::errors::{ErrorKind, GraftError, SourceContext};
pub use crate::runner::{run_transformation, ErrorPolicy, FileInfo, RunOptions, Session, Transform};

pub mod analysis;
pub mod cli;
pub mod edit;
pub mod errors;
pub mod logger;
pub mod runner;
pub mod syntax;
