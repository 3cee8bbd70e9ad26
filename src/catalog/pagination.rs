//! Offset/limit over grouped entities
//!
//! `start` and `num` count root entities, not rows. Rows of the first `start`
//! distinct roots are discarded without being aggregated; aggregation then
//! runs until `num` roots exist and stops consuming rows right there.
//!
//! Stopping at the `num`-th root means its continuation rows are dropped with
//! the rest of the stream, so the last entity of a page can come back with a
//! partial child collection.

use super::aggregate::{Aggregate, Keyed, MalformedRow, fold_row};

/// Page selection over a grouped row stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Number of roots to skip.
    pub start: usize,
    /// Maximum number of roots to return; 0 is unbounded.
    pub num: usize,
}

impl Page {
    pub fn new(start: usize, num: usize) -> Self {
        Self { start, num }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start == 0 && self.num == 0
    }

    fn is_full(&self, taken: usize) -> bool {
        self.num != 0 && taken >= self.num
    }
}

/// Aggregate the roots selected by `page` from a grouped row stream.
pub fn aggregate_page<T: Aggregate>(
    rows: &[T::Row],
    ctx: &T::Context,
    page: Page,
) -> Result<Vec<T>, MalformedRow> {
    let mut roots: Keyed<T::Key, T> = Keyed::new();
    let mut skipped = 0usize;
    let mut last_skipped: Option<T::Key> = None;

    for row in rows {
        if roots.is_empty() {
            let key = T::root_key(row)?;
            if last_skipped.as_ref() == Some(&key) {
                continue;
            }
            if skipped < page.start {
                skipped += 1;
                last_skipped = Some(key);
                continue;
            }
        }

        if page.is_full(roots.len()) {
            break;
        }
        fold_row(&mut roots, row, ctx)?;
    }

    Ok(roots.into_values())
}
