//! # PDF Page Counter
//!
//! 送信元ファイルを独立に走査してPDFのページ数を数える（計測用）

use regex::bytes::Regex;
use std::sync::LazyLock;

static PAGE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)/Type\s*/Page\b").expect("valid page regex"));

static PAGES_NODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)/Type\s*/Pages\b").expect("valid pages regex"));

static PAGE_TREE_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)/Count\s+(\d+)").expect("valid count regex"));

/// PDFのページ数を返す
///
/// PDFでない、またはページオブジェクトが見つからない場合は `None`。
/// 圧縮オブジェクトストリーム内のページは数えられないため、その場合は
/// ページツリーの `/Count` の最大値を使う。
pub fn count_pdf_pages(data: &[u8]) -> Option<u32> {
    if !data.starts_with(b"%PDF-") {
        return None;
    }

    let leaves = PAGE_OBJECT.find_iter(data).count();
    if leaves > 0 {
        return u32::try_from(leaves).ok();
    }

    if !PAGES_NODE.is_match(data) {
        return None;
    }

    PAGE_TREE_COUNT
        .captures_iter(data)
        .filter_map(|caps| {
            let digits = std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?;
            digits.parse::<u32>().ok()
        })
        .max()
        .filter(|count| *count > 0)
}
