//! Archive Adapter
//!
//! ArchiveWriterのZIP実装

pub mod zip_writer;
