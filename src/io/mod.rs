//! I/O module for reading QuarkXPress payloads

pub mod qxp;

pub use qxp::{QxpReader, QxpReaderConfiguration};
