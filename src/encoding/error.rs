use thiserror::Error;

/// An enumeration of potential errors that appear during bencode encoding.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The tree is nested deeper than the encoder allows.
    #[error("maximum nesting depth of {max_depth} exceeded")]
    NestingTooDeep {
        /// The configured limit.
        max_depth: usize,
    },
}

#[test]
fn encoding_errors_are_sync_send() {
    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}
    is_send::<Error>();
    is_sync::<Error>();
}
