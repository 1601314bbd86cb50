mod environment;
mod error;
mod extractors;

pub use environment::{Environment, LogFormat, StaticCredentials};
pub use error::{ApiErrorResponse, AppError};
pub use extractors::{JsonBody, RequestContext, RequestScope};
