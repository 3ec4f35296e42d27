// Hotel availability request transformer: AvailRQ XML in, priced JSON results out

pub mod config;
pub mod error;
pub mod identifier;
pub mod pricing;
pub mod request;
pub mod response;
pub mod supplier;
pub mod transformer;
pub mod validation;
pub mod xml_request;

// Re-export key types for convenience
pub use config::TransformerConfig;
pub use error::{ConfigError, TransformError};
pub use identifier::{
    Clock, FixedClock, RandomSuffix, SequentialSuffix, SuffixSource, SystemClock,
};
pub use pricing::{ExchangeRate, ExchangeRates, PriceQuote};
pub use request::{AvailRequest, Credentials, RoomRequest, SearchType};
pub use response::AvailabilityResult;
pub use supplier::{candidates_from_json, AvailabilityCandidate};
pub use transformer::{process_request, RequestTransformer};
pub use validation::ValidationRules;
