//! HTTP request handlers, one module per resource.

pub mod claim;
pub mod intervention;
pub mod notification;
pub mod partnership;
pub mod transfer;
