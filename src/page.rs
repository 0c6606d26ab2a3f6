use serde::{Deserialize, Serialize};

/// Logical identifier of a fixed-size disk page.
///
/// Ids are minted by the buffer pool's monotonic counter and are never
/// reused. A page that is not resident in any frame simply has no entry in
/// the pool's page table; frame metadata uses `Option<PageId>` for the
/// empty-slot case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId(pub u32);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PageId({})", self.0)
    }
}
