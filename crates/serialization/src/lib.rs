pub mod error;
pub mod serializer;

pub use error::SerializationError;
pub use serializer::ExpectationSerializer;
