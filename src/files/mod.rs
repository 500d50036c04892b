//! File handling for QBank
//!
//! Native dialogs for picking local images.

pub mod dialogs;
