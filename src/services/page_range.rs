use std::collections::BTreeSet;

/// Resolve a human-entered page specification against a document's page
/// count into the sorted, de-duplicated set of zero-based page indices.
///
/// The input is a comma-separated list of 1-based single pages (`"8"`) and
/// inclusive ranges (`"3-5"`). An empty string or the literal `"all"`
/// (case-insensitive) selects every page. Backwards ranges are swapped,
/// out-of-bounds pages are dropped, and unparseable tokens are skipped.
/// This never fails: garbage in means an empty selection out, and the
/// caller decides what an empty selection means.
pub fn resolve(spec: &str, total_pages: u32) -> Vec<u32> {
    let trimmed = spec.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        return (0..total_pages).collect();
    }

    let mut pages: BTreeSet<u32> = BTreeSet::new();

    for token in trimmed.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some((start_str, end_str)) = token.split_once('-') {
            let (start, end) = match (start_str.trim().parse::<u32>(), end_str.trim().parse::<u32>())
            {
                (Ok(s), Ok(e)) => (s, e),
                _ => continue, // malformed range like "a-b"
            };

            // Normalize "5-1" to "1-5"
            let (start, end) = if start > end { (end, start) } else { (start, end) };

            for page in start..=end {
                if page >= 1 && page <= total_pages {
                    pages.insert(page - 1);
                }
            }
        } else {
            match token.parse::<u32>() {
                Ok(page) if page >= 1 && page <= total_pages => {
                    pages.insert(page - 1);
                }
                _ => continue,
            }
        }
    }

    pages.into_iter().collect()
}

/// True when `resolved` selects every page of an `n`-page document in
/// order, meaning a slicing pass would be a no-op rewrite.
pub fn is_full_selection(resolved: &[u32], total_pages: u32) -> bool {
    resolved.len() == total_pages as usize
        && resolved.iter().copied().eq(0..total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pages() {
        assert_eq!(resolve("1,3,5", 10), vec![0, 2, 4]);
    }

    #[test]
    fn test_basic_range() {
        assert_eq!(resolve("1-3", 10), vec![0, 1, 2]);
    }

    #[test]
    fn test_mixed_input() {
        assert_eq!(resolve("1, 3-5, 8", 10), vec![0, 2, 3, 4, 7]);
    }

    #[test]
    fn test_empty_and_all_select_everything() {
        assert_eq!(resolve("", 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(resolve("all", 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(resolve("ALL", 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(resolve("  ", 5), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_backwards_range_normalized() {
        assert_eq!(resolve("5-1", 10), resolve("1-5", 10));
    }

    #[test]
    fn test_out_of_bounds_dropped() {
        assert_eq!(resolve("1, 15", 10), vec![0]);
    }

    #[test]
    fn test_range_clipped_to_document() {
        assert_eq!(resolve("8-12", 10), vec![7, 8, 9]);
    }

    #[test]
    fn test_malformed_tokens_skipped() {
        assert_eq!(resolve("1, abc, 5", 10), vec![0, 4]);
        assert_eq!(resolve("a-b, 2", 10), vec![1]);
    }

    #[test]
    fn test_overlap_collapsed() {
        assert_eq!(resolve("3-5,4", 10), vec![2, 3, 4]);
    }

    #[test]
    fn test_fully_invalid_yields_empty() {
        assert_eq!(resolve("50-60", 3), Vec::<u32>::new());
        assert_eq!(resolve("x,y,z", 3), Vec::<u32>::new());
    }

    #[test]
    fn test_single_page_document() {
        assert_eq!(resolve("1", 1), vec![0]);
    }

    #[test]
    fn test_full_selection_detection() {
        assert!(is_full_selection(&resolve("", 4), 4));
        assert!(is_full_selection(&resolve("1-4", 4), 4));
        assert!(!is_full_selection(&resolve("1-3", 4), 4));
        assert!(!is_full_selection(&resolve("2-4", 4), 4));
    }
}
