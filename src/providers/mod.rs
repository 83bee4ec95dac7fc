pub mod caching;
pub mod fallback;
pub mod frankfurter;
pub mod opencost;
pub mod util;

pub use caching::CachingRatesProvider;
pub use frankfurter::FrankfurterProvider;
pub use opencost::OpenCostClient;
