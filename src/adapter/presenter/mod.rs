//! Console Adapters
//!
//! PresenterとProgressReporterの端末実装

pub mod console_presenter;
pub mod console_progress;
