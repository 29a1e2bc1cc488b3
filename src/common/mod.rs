// Shared constants and small utilities used across modules
pub mod constants;
pub mod http;
pub mod utils;
