pub mod deploy;
pub mod release;
pub mod response;

pub use deploy::DeployDetails;
pub use release::{Commit, Project, Ref, ReleaseDetails};
pub use response::ApiResponse;

/// Optional strings are left off the wire when unset or empty.
pub(crate) fn is_blank(v: &Option<String>) -> bool {
    v.as_deref().is_none_or(str::is_empty)
}

/// Drops empty entries from a user-supplied list.
pub fn strip_empty_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(Into::into)
        .filter(|s| !s.is_empty())
        .collect()
}
