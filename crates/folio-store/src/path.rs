//! Mapping from document keys and collection names to filesystem paths.
//!
//! Identifiers are joined onto their parent's directory and cleaned
//! lexically. The target does not need to exist; nothing here touches the
//! filesystem.
//!
//! Rules for an identifier:
//! - Must be non-empty
//! - Must not contain NUL
//! - Must be relative (no leading `/` or drive prefix)
//! - Must not contain a `..` component
//! - Must name at least one real component (`.` or `./` alone is rejected)
//!
//! A key such as `"school/fish"` is accepted and resolves two levels down,
//! matching plain join semantics.

use std::path::{Component, Path, PathBuf};

use crate::error::{IdentifierError, NodeKind};

/// Resolve `name` beneath `base`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use folio_store::path::resolve;
/// use folio_store::NodeKind;
///
/// let p = resolve(Path::new("/data"), "fish", NodeKind::Collection).unwrap();
/// assert_eq!(p, Path::new("/data/fish"));
/// assert!(resolve(Path::new("/data"), "", NodeKind::Document).is_err());
/// assert!(resolve(Path::new("/data"), "../etc", NodeKind::Document).is_err());
/// ```
pub fn resolve(base: &Path, name: &str, kind: NodeKind) -> Result<PathBuf, IdentifierError> {
    if name.is_empty() {
        return Err(IdentifierError::MissingIdentifier { kind });
    }

    let invalid = |reason: &str| IdentifierError::InvalidIdentifier {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.contains('\0') {
        return Err(invalid("must not contain NUL"));
    }

    let mut path = base.to_path_buf();
    let mut named = false;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                named = true;
            }
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("must be a relative name"))
            }
        }
    }

    if !named {
        return Err(invalid("does not name anything"));
    }
    Ok(path)
}

/// Lexically clean a store root: drop `.` components and fold `..` into
/// the preceding component where one exists.
///
/// An empty input cleans to an empty path; callers treat that as "no path".
pub fn clean(dir: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in dir.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !matches!(
                    out.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                ) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() && !dir.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
