pub mod error;
pub mod rounding;
pub mod traits;
pub mod types;

pub use error::*;
pub use rounding::round_dp;
pub use traits::*;
pub use types::*;
