//! # Archive Writer Trait

use anyhow::Result;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::aggregation::ArchiveEntry;

/// 集めたエントリから1つのアーカイブを同期的に生成する
#[cfg_attr(test, automock)]
pub trait ArchiveWriter: Send + Sync {
    /// エントリ順にアーカイブを生成し、そのバイト列を返す
    fn build(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>>;
}
