/// Errors from constructing or validating ShareFeed types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// A share was submitted without a URL.
    #[error("share url is required")]
    MissingUrl,

    /// A canonical record reached storage with an empty title.
    #[error("share title is required")]
    MissingTitle,

    /// A canonical record reached storage with an empty identifier.
    #[error("share id is required")]
    MissingId,

    /// An unrecognized storage mode string.
    #[error("invalid storage mode: {0} (expected local, remote, or auto)")]
    InvalidMode(String),
}
