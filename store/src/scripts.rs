//! Script package paths for the `script.uri` enumeration.

use std::collections::HashSet;

/// Package roots a script can live under, in lookup order.
const PACKAGE_ROOTS: &[&str] = &["/source/", "/components/"];

/// Converts a script file path into a `pkg:` URI.
///
/// The path is cut at the first `/source/` segment, or failing that the
/// first `/components/` segment. Backslashes are treated as separators and
/// relative paths as rooted. Returns `None` for paths under neither root.
///
/// # Examples
///
/// ```
/// use scenegraph_schema_store::script_package_path;
///
/// assert_eq!(
///     script_package_path("/home/dev/app/source/main.brs").as_deref(),
///     Some("pkg:/source/main.brs")
/// );
/// assert_eq!(
///     script_package_path(r"components\widgets\Label.brs").as_deref(),
///     Some("pkg:/components/widgets/Label.brs")
/// );
/// assert_eq!(script_package_path("/tmp/other.brs"), None);
/// ```
pub fn script_package_path(path: &str) -> Option<String> {
    let normalized = path.replace('\\', "/");
    let rooted = if normalized.starts_with('/') {
        normalized
    } else {
        format!("/{normalized}")
    };

    PACKAGE_ROOTS
        .iter()
        .find_map(|root| rooted.find(root))
        .map(|index| format!("pkg:{}", &rooted[index..]))
}

/// Converts script paths into unique `pkg:` URIs, keeping first-seen order
/// and dropping paths outside the package roots.
pub fn script_package_paths<I, S>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter_map(|p| script_package_path(p.as_ref()))
        .filter(|uri| seen.insert(uri.clone()))
        .collect()
}
