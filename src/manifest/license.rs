//! License and copyright records.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::manifest::author::Author;
use crate::util::Symbol;

/// A software license.
///
/// Identity is the tag; the catalog carries the well-known ones and
/// [`License::custom`] covers everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    /// Short unique handle, lowercase SPDX where one exists.
    tag: Symbol,

    /// SPDX identifier, e.g. `Apache-2.0`.
    spdx: String,

    /// Full display name.
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<Url>,
}

static CATALOG: LazyLock<Vec<License>> = LazyLock::new(|| {
    vec![
        License::custom("mit", "MIT", "MIT License").with_spdx_url(),
        License::custom("apache-2.0", "Apache-2.0", "Apache License 2.0").with_spdx_url(),
        License::custom("gpl-3.0-only", "GPL-3.0-only", "GNU General Public License v3.0 only")
            .with_spdx_url(),
        License::custom("bsd-3-clause", "BSD-3-Clause", "BSD 3-Clause License").with_spdx_url(),
        License::custom("unlicense", "Unlicense", "The Unlicense").with_spdx_url(),
        License::custom("cc0-1.0", "CC0-1.0", "CC0 1.0 Universal").with_spdx_url(),
        License::custom("proprietary", "LicenseRef-Proprietary", "Proprietary"),
        License::custom("none", "NONE", "No License"),
    ]
});

impl License {
    /// Create a license outside the built-in catalog.
    pub fn custom(
        tag: impl AsRef<str>,
        spdx: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        License {
            tag: Symbol::new(tag),
            spdx: spdx.into(),
            name: name.into(),
            url: None,
        }
    }

    /// Set the license text URL.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    fn with_spdx_url(mut self) -> Self {
        let url = format!("https://spdx.org/licenses/{}.html", self.spdx);
        self.url = Url::parse(&url).ok();
        self
    }

    /// The built-in licenses.
    pub fn catalog() -> &'static [License] {
        &CATALOG
    }

    /// Look up a built-in license by tag.
    pub fn lookup(tag: impl AsRef<str>) -> Option<&'static License> {
        let tag = Symbol::new(tag);
        CATALOG.iter().find(|license| license.tag == tag)
    }

    pub fn mit() -> License {
        Self::catalog_entry("mit")
    }

    pub fn apache_2_0() -> License {
        Self::catalog_entry("apache-2.0")
    }

    fn catalog_entry(tag: &str) -> License {
        Self::lookup(tag)
            .cloned()
            .expect("tag is in the built-in catalog")
    }

    pub fn tag(&self) -> Symbol {
        self.tag
    }

    pub fn spdx(&self) -> &str {
        &self.spdx
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}

impl PartialEq for License {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for License {}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A copyright line: who holds it and since when.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Copyright {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<Author>,
}

impl Copyright {
    pub fn new() -> Self {
        Copyright::default()
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn by(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }
}

impl fmt::Display for Copyright {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(c)")?;
        if let Some(date) = self.date {
            write!(f, " ({})", date)?;
        }
        if let Some(ref author) = self.author {
            write!(f, " {}", author.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_tags_are_unique() {
        let catalog = License::catalog();
        assert_eq!(catalog.len(), 8);

        for (i, a) in catalog.iter().enumerate() {
            for b in &catalog[i + 1..] {
                assert_ne!(a.tag(), b.tag());
            }
        }
    }

    #[test]
    fn test_lookup_by_tag() {
        let mit = License::lookup("mit").unwrap();
        assert_eq!(mit.spdx(), "MIT");
        assert!(mit.url().is_some());

        assert!(License::lookup("wtfpl").is_none());
    }

    #[test]
    fn test_identity_is_the_tag() {
        let a = License::mit();
        let b = License::custom("mit", "MIT", "Different display name");
        assert_eq!(a, b);
        assert_ne!(License::mit(), License::apache_2_0());
    }

    #[test]
    fn test_named_entries_match_their_tags() {
        // The accessors go through the tag, so a catalog reorder cannot
        // hand back the wrong license.
        assert_eq!(License::mit().spdx(), "MIT");
        assert_eq!(License::apache_2_0().spdx(), "Apache-2.0");
        assert_eq!(&License::mit(), License::lookup("mit").unwrap());
    }

    #[test]
    fn test_copyright_display() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let full = Copyright::new().on(date).by(Author::new("jnaut", "Jo Naut"));
        assert_eq!(full.to_string(), "(c) (2024-03-01) Jo Naut");

        assert_eq!(Copyright::new().to_string(), "(c)");
    }
}
