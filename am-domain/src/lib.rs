pub mod best_price;
pub mod catalog;
pub mod error;
pub mod market_model;
pub mod normalizer;
pub mod refining;
pub mod trading;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_objects;

pub use best_price::*;
pub use catalog::*;
pub use error::*;
pub use market_model::*;
pub use normalizer::*;
pub use refining::*;
pub use trading::*;
