pub mod cause;
pub mod expectation;
pub mod request;
pub mod response;

pub use cause::Cause;
pub use expectation::Expectation;
pub use request::RequestDefinition;
pub use response::ResponseDefinition;
