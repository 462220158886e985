//! Connection log - what the dashboard shows under "connection history".

mod logs_model;
mod logs_service;

pub use logs_model::{ConnectionLog, LogStatus};
pub use logs_service::{ConnectionLogService, ConnectionLogServiceTrait};
