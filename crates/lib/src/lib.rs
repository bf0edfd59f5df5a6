//! decaf core library — webhook endpoint, platform client, OCR client,
//! and the moderation pipeline used by the CLI binary.

pub mod config;
pub mod event;
pub mod moderation;
pub mod ocr;
pub mod server;
pub mod slack;
