/// Errors returned by [`AvlTreeMap`](crate::AvlTreeMap) operations.
///
/// A failed operation leaves the map untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum Error {
    /// The operation needs at least one element.
    #[error("the tree is empty")]
    EmptyTree,
    /// No entry with the requested key exists.
    #[error("key not found")]
    KeyNotFound,
    /// A rank outside `0..len` was requested.
    #[error("rank {rank} is out of range for a tree of {len} elements")]
    OutOfRange {
        /// The requested rank.
        rank: usize,
        /// The number of elements at the time of the request.
        len: usize,
    },
    /// The [`Config`](crate::Config) lacks something the operation needs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    /// The linked structure is corrupted. This is a bug in the crate, not in the caller.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(&'static str),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(Error::EmptyTree.to_string(), "the tree is empty");
        assert_eq!(Error::KeyNotFound.to_string(), "key not found");
        assert_eq!(
            Error::OutOfRange { rank: 4, len: 2 }.to_string(),
            "rank 4 is out of range for a tree of 2 elements"
        );
        assert_eq!(
            Error::InvalidConfiguration("no comparator").to_string(),
            "invalid configuration: no comparator"
        );
        assert_eq!(
            Error::InternalInvariantViolation("list did not close").to_string(),
            "internal invariant violated: list did not close"
        );
    }
}
