//! Offset-windowed full-sync listing

use anyhow::Result;
use log::debug;
use serde::Serialize;

use crate::token::PageCursor;

/// One window of a full-sync walk
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Present only when more rows follow this window
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
        }
    }
}

/// List one window of a collection
///
/// `fetch(offset, limit)` must return at most `limit` rows in the
/// collection's stable order starting at `offset`. One extra row is
/// requested to detect whether another page follows, so no count query is
/// needed. A `limit` of 0 is treated as 1.
pub fn list_full<T, F>(limit: usize, page_token: Option<&str>, fetch: F) -> Result<Page<T>>
where
    F: FnOnce(u64, usize) -> Result<Vec<T>>,
{
    let limit = limit.max(1);
    let cursor = PageCursor::from_token(page_token);
    let mut items = fetch(cursor.offset(), limit.saturating_add(1))?;

    let next_page_token = if items.len() > limit {
        items.truncate(limit);
        Some(cursor.advance(limit).to_token())
    } else {
        None
    };

    debug!(
        "[SYNC] Full page at offset {}: {} items, more={}",
        cursor.offset(),
        items.len(),
        next_page_token.is_some()
    );

    Ok(Page {
        items,
        next_page_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token;

    fn fetch_from(rows: &[u32]) -> impl FnOnce(u64, usize) -> Result<Vec<u32>> + '_ {
        move |offset, limit| {
            Ok(rows
                .iter()
                .skip(offset as usize)
                .take(limit)
                .copied()
                .collect())
        }
    }

    #[test]
    fn test_first_page_has_next_token() {
        let rows: Vec<u32> = (0..5).collect();
        let page = list_full(2, None, fetch_from(&rows)).unwrap();
        assert_eq!(page.items, vec![0, 1]);
        assert_eq!(page.next_page_token, Some(token::encode(2)));
    }

    #[test]
    fn test_exact_fit_has_no_next_token() {
        let rows: Vec<u32> = (0..4).collect();
        let page = list_full(2, Some(&token::encode(2)), fetch_from(&rows)).unwrap();
        assert_eq!(page.items, vec![2, 3]);
        assert!(page.is_last());
    }

    #[test]
    fn test_walk_covers_every_row_once() {
        let rows: Vec<u32> = (0..7).collect();
        let mut seen = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0;
        loop {
            let page = list_full(3, token.as_deref(), fetch_from(&rows)).unwrap();
            pages += 1;
            seen.extend(page.items);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        assert_eq!(pages, 3);
        assert_eq!(seen, rows);
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let rows: Vec<u32> = (0..3).collect();
        let page = list_full(0, None, fetch_from(&rows)).unwrap();
        assert_eq!(page.items, vec![0]);
        assert_eq!(page.next_page_token, Some(token::encode(1)));
    }

    #[test]
    fn test_malformed_token_restarts() {
        let rows: Vec<u32> = (0..3).collect();
        let page = list_full(10, Some("%%%"), fetch_from(&rows)).unwrap();
        assert_eq!(page.items, rows);
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let rows: Vec<u32> = (0..3).collect();
        let page = list_full(10, Some(&token::encode(50)), fetch_from(&rows)).unwrap();
        assert!(page.items.is_empty());
        assert!(page.is_last());
    }

    #[test]
    fn test_fetch_error_propagates() {
        let result: Result<Page<u32>> =
            list_full(5, None, |_, _| Err(anyhow::anyhow!("store offline")));
        assert!(result.is_err());
    }
}
