/// CSV and binary export.
pub mod export;
/// Meter log record types and their fixed-width encoding.
pub mod records;
