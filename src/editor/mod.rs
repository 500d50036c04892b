//! Statement editor for QBank
//!
//! This module owns the editable statement of a question: the formatting
//! commands, image uploads and the `StatementEditor` that keeps the markup
//! and its image descriptors in step.

mod formatting;
mod statement;
mod upload;

pub use statement::{ClickTarget, StatementEditor};
pub use upload::{decode_data_url, FileInfo, PendingUpload, UploadLimits};
