//! privilege catalog.
//!
//! privileges are opaque names. the catalog below lists the ones the
//! viewer knows about, but unknown names are accepted everywhere so that
//! policies written for newer releases keep loading.

use std::borrow::{Borrow, Cow};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// prefix for the session attribute holding cached decisions of one privilege.
pub const PERMISSION_ATTRIBUTE_PREFIX: &str = "permission_";

/// a named capability that can be granted or withheld.
///
/// # Example
/// ```
/// use shelfguard_types::Privilege;
///
/// let p: Privilege = "view-images".into();
/// assert_eq!(p, Privilege::VIEW_IMAGES);
/// assert_eq!(p.cache_attribute(), "permission_view-images");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Privilege(Cow<'static, str>);

impl Privilege {
    /// list the resource in search results.
    pub const LIST: Privilege = Privilege::from_static("list");
    /// view page images.
    pub const VIEW_IMAGES: Privilege = Privilege::from_static("view-images");
    /// view thumbnails.
    pub const VIEW_THUMBNAILS: Privilege = Privilege::from_static("view-thumbnails");
    /// view full text.
    pub const VIEW_FULLTEXT: Privilege = Privilege::from_static("view-fulltext");
    /// play video.
    pub const VIEW_VIDEO: Privilege = Privilege::from_static("view-video");
    /// play audio.
    pub const VIEW_AUDIO: Privilege = Privilege::from_static("view-audio");
    /// view user generated content.
    pub const VIEW_UGC: Privilege = Privilege::from_static("view-ugc");
    /// view metadata.
    pub const VIEW_METADATA: Privilege = Privilege::from_static("view-metadata");
    /// download the whole record as pdf.
    pub const DOWNLOAD_PDF: Privilege = Privilege::from_static("download-pdf");
    /// download a single page as pdf.
    pub const DOWNLOAD_PAGE_PDF: Privilege = Privilege::from_static("download-page-pdf");
    /// download original content files.
    pub const DOWNLOAD_ORIGINAL: Privilege = Privilege::from_static("download-original");
    /// download metadata exports.
    pub const DOWNLOAD_METADATA: Privilege = Privilege::from_static("download-metadata");
    /// choose the representative image of a record.
    pub const SET_REPRESENTATIVE_IMAGE: Privilege =
        Privilege::from_static("set-representative-image");
    /// delete ocr of a page.
    pub const DELETE_OCR_PAGE: Privilege = Privilege::from_static("delete-ocr-page");
    /// edit the overview page.
    pub const EDIT_OVERVIEW_PAGE: Privilege = Privilege::from_static("edit-overview-page");
    /// generate iiif manifests.
    pub const GENERATE_IIIF_MANIFEST: Privilege =
        Privilege::from_static("generate-iiif-manifest");
    /// manage cms pages.
    pub const CMS_PAGES: Privilege = Privilege::from_static("cms-pages");

    /// every privilege in the built-in catalog.
    pub const ALL: &'static [Privilege] = &[
        Self::LIST,
        Self::VIEW_IMAGES,
        Self::VIEW_THUMBNAILS,
        Self::VIEW_FULLTEXT,
        Self::VIEW_VIDEO,
        Self::VIEW_AUDIO,
        Self::VIEW_UGC,
        Self::VIEW_METADATA,
        Self::DOWNLOAD_PDF,
        Self::DOWNLOAD_PAGE_PDF,
        Self::DOWNLOAD_ORIGINAL,
        Self::DOWNLOAD_METADATA,
        Self::SET_REPRESENTATIVE_IMAGE,
        Self::DELETE_OCR_PAGE,
        Self::EDIT_OVERVIEW_PAGE,
        Self::GENERATE_IIIF_MANIFEST,
        Self::CMS_PAGES,
    ];

    const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// create a privilege from any name. unknown names are accepted.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// the privilege name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// true if the name is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// true if the privilege is part of the built-in catalog.
    pub fn is_known(&self) -> bool {
        Self::ALL.iter().any(|p| p == self)
    }

    /// name of the session attribute caching decisions for this privilege.
    pub fn cache_attribute(&self) -> String {
        format!("{}{}", PERMISSION_ATTRIBUTE_PREFIX, self.0)
    }
}

impl From<&str> for Privilege {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Privilege {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Privilege {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Privilege {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Privilege {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Privilege {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.trim().is_empty() {
            return Err(de::Error::custom("privilege name cannot be blank"));
        }
        Ok(Privilege::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_privileges_compare_by_name() {
        let parsed = Privilege::from("download-pdf");
        assert_eq!(parsed, Privilege::DOWNLOAD_PDF);
        assert!(parsed.is_known());

        let custom = Privilege::from("view-3d-model");
        assert!(!custom.is_known());
        assert_ne!(custom, Privilege::VIEW_IMAGES);
    }

    #[test]
    fn cache_attribute_uses_prefix() {
        assert_eq!(
            Privilege::VIEW_FULLTEXT.cache_attribute(),
            "permission_view-fulltext"
        );
    }

    #[test]
    fn blank_privilege_detected() {
        assert!(Privilege::new("  ").is_blank());
        assert!(!Privilege::LIST.is_blank());
    }

    #[test]
    fn deserialize_rejects_blank_names() {
        let ok: Privilege = serde_json::from_str(r#""view-audio""#).unwrap();
        assert_eq!(ok, Privilege::VIEW_AUDIO);
        assert!(serde_json::from_str::<Privilege>(r#""""#).is_err());
    }

    #[test]
    fn catalog_has_no_duplicates() {
        let mut names: Vec<&str> = Privilege::ALL.iter().map(|p| p.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Privilege::ALL.len());
    }
}
