//! Shared helpers for Diesel repository implementations.

use crate::domain::PageRequest;

/// SQL `OFFSET` for `page`.
pub(crate) fn page_offset(page: PageRequest) -> i64 {
    i64::try_from(page.offset()).unwrap_or(i64::MAX)
}

/// SQL `LIMIT` for `page`.
pub(crate) fn page_limit(page: PageRequest) -> i64 {
    i64::from(page.per_page())
}

/// Row count as the unsigned total carried by [`crate::domain::Page`].
pub(crate) fn row_total(total: i64) -> u64 {
    u64::try_from(total).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 0)]
    #[case(3, 20)]
    fn offsets_follow_the_page_number(#[case] number: u32, #[case] offset: i64) {
        let page = PageRequest::new(number).expect("valid page");
        assert_eq!(page_offset(page), offset);
        assert_eq!(page_limit(page), 10);
    }

    #[rstest]
    fn negative_totals_clamp_to_zero() {
        assert_eq!(row_total(-1), 0);
        assert_eq!(row_total(12), 12);
    }
}
