//! @ai:module:intent KPI collection: API client, numeric extraction, matrix filling
//! @ai:module:layer application
//! @ai:module:public_api ChatClient, MockChatClient, Collector, extract_value

pub mod client;
pub mod executor;
pub mod extract;

pub use client::{ChatClient, ChatClientTrait, MockChatClient};
pub use executor::Collector;
pub use extract::extract_value;
