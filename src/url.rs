/// Joins `base` and `segments` into an absolute URL with exactly one slash
/// between components and one trailing slash.
///
/// Segments may carry their own slashes; empty components are dropped. This is
/// purely textual: the host and scheme are not validated.
pub fn build_url<S: AsRef<str>>(base: &str, segments: &[S]) -> String {
    let base = base.trim_end_matches('/');
    let path = segments
        .iter()
        .flat_map(|s| s.as_ref().split('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if path.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{path}/")
    }
}
