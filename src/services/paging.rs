pub(crate) const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

impl PageRequest {
    /// Floors `skip` at zero and clamps `limit` into `1..=MAX_LIMIT`.
    pub(crate) fn new(skip: i64, limit: i64) -> Self {
        Self { skip: skip.max(0), limit: limit.clamp(1, MAX_LIMIT) }
    }
}

#[derive(Debug)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) request: PageRequest,
}

impl<T> Page<T> {
    pub(crate) fn empty(request: PageRequest) -> Self {
        Self { items: Vec::new(), total_count: 0, request }
    }
}
