use crate::models::{Page, RankedJob};

/// Cuts one 1-based page out of the ranked list.
///
/// Page 0, a page past the end, or a zero page size yields no items but still
/// reports the full `total`.
pub fn assemble(ranked: Vec<RankedJob>, page: u32, page_size: u32) -> Page {
    let total = ranked.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size as usize) as u32
    };

    let items = if page == 0 || page_size == 0 {
        Vec::new()
    } else {
        let start = (page as usize - 1).saturating_mul(page_size as usize);
        ranked
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect()
    };

    Page {
        items,
        total,
        page,
        page_size,
        total_pages,
    }
}
