pub mod client;
pub mod error;
pub mod rate_limit;
pub mod retry;
pub mod types;

mod endpoints;

pub use client::ApiClient;
pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
pub use types::{Geolocation, UserProfile, WeatherInfo};
