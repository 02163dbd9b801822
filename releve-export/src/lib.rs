//! releve-export: renders extracted transactions as HomeBank-compatible CSV.

pub mod homebank;

pub use homebank::{OUTPUT_FILE_NAME, paymode, to_csv};
