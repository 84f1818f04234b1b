pub mod calibrate;
pub mod config;
pub mod error;
pub mod events;
pub mod kernel;
pub mod models;
pub mod oracle;
pub mod output;
pub mod process;
pub mod resource;
pub mod samples;
pub mod scenario;
pub mod stats;
