/// Filesystem-safe form of a participant name: alphanumerics, spaces, `_` and `-` are kept,
/// the result is trimmed and spaces become underscores.
pub fn slugify(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    kept.trim().replace(' ', "_")
}

/// Key of a signature image. Derived from the name so existing files keep resolving.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureKey(String);

impl SignatureKey {
    /// `None` when nothing of the name survives slugging.
    pub fn from_name(name: &str) -> Option<Self> {
        let slug = slugify(name);
        if slug.is_empty() {
            None
        } else {
            Some(Self(slug))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.png", self.0)
    }
}
