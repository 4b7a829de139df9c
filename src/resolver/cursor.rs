/// Job ids still available to one resolution pass.
///
/// Ids keep the command's order. A `field` takes the last unconsumed id,
/// a `forEach` takes whatever is left. Every id is handed out at most once.
#[derive(Debug)]
pub(crate) struct IdCursor<'a> {
    remaining: Vec<&'a str>,
}

impl<'a> IdCursor<'a> {
    pub(crate) fn new(ids: &'a [String]) -> Self {
        Self {
            remaining: ids.iter().map(String::as_str).collect(),
        }
    }

    /// Next unconsumed id from the tail, for a `field` parameter
    pub(crate) fn next(&mut self) -> Option<&'a str> {
        self.remaining.pop()
    }

    /// Every remaining id in caller order, for a `forEach` parameter
    pub(crate) fn drain(&mut self) -> Vec<&'a str> {
        std::mem::take(&mut self.remaining)
    }

    pub(crate) fn len(&self) -> usize {
        self.remaining.len()
    }
}
