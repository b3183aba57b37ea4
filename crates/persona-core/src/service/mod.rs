//! Services: the bot registry, the personality editor, statistics, and
//! import/export.

pub mod editor;
pub mod registry;
pub mod stats;
pub mod transfer;
