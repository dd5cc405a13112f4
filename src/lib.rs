//! @ai:module:intent Car KPI comparison suite library
//! @ai:module:layer application
//! @ai:module:public_api config, catalog, values, history, collector, dashboard, report

pub mod catalog;
pub mod collector;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod report;
pub mod values;

pub use catalog::Catalog;
pub use collector::{ChatClient, ChatClientTrait, Collector, MockChatClient};
pub use config::KpiConfig;
pub use dashboard::DashboardRenderer;
pub use history::HistoricalData;
pub use report::ReportGenerator;
pub use values::{KpiValue, ValueMatrix};
