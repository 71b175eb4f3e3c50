#![forbid(unsafe_code)]

//! Cell records as stored by the hosted table.

use pixgrid_core::geometry::CellCoord;
use serde::{Deserialize, Serialize};

/// One grid cell.
///
/// Field names match the hosted table's columns so rows decode directly.
/// A cell with no `owner_id` is unowned and purchasable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Row identifier in the backing store.
    #[serde(default)]
    pub id: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Owning user, if purchased.
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Image rendered over the cell's region.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Destination opened when the cell is clicked.
    #[serde(default)]
    pub link_url: Option<String>,
    /// Descriptive text for the image.
    #[serde(default)]
    pub alt_text: Option<String>,
}

impl Cell {
    /// An unowned cell at `(x, y)`.
    #[must_use]
    pub fn new(id: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            owner_id: None,
            image_url: None,
            link_url: None,
            alt_text: None,
        }
    }

    /// Set the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner_id = Some(owner.into());
        self
    }

    /// Set the image.
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Set the click-through link.
    #[must_use]
    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.link_url = Some(url.into());
        self
    }

    /// Set the alt text.
    #[must_use]
    pub fn with_alt_text(mut self, text: impl Into<String>) -> Self {
        self.alt_text = Some(text.into());
        self
    }

    /// Grid coordinate.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        CellCoord::new(self.x, self.y)
    }

    /// Whether the cell has been purchased.
    #[inline]
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.owner_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_table_row() {
        let row = r#"{
            "id": "c-1",
            "x": 12,
            "y": 7,
            "owner_id": "u1",
            "image_url": "https://cdn.example/a.png",
            "link_url": null,
            "alt_text": "logo"
        }"#;
        let cell: Cell = serde_json::from_str(row).unwrap();
        assert_eq!(cell.coord(), CellCoord::new(12, 7));
        assert!(cell.is_owned());
        assert_eq!(cell.link_url, None);
        assert_eq!(cell.alt_text.as_deref(), Some("logo"));
    }

    #[test]
    fn missing_optional_columns_default_to_none() {
        let cell: Cell = serde_json::from_str(r#"{"x": 1, "y": 2}"#).unwrap();
        assert_eq!(cell, Cell::new("", 1, 2));
        assert!(!cell.is_owned());
    }

    #[test]
    fn builder_sets_fields() {
        let cell = Cell::new("id", 3, 4)
            .with_owner("u9")
            .with_image("img")
            .with_link("https://example.org")
            .with_alt_text("alt");
        assert_eq!(cell.owner_id.as_deref(), Some("u9"));
        assert_eq!(cell.image_url.as_deref(), Some("img"));
        assert_eq!(cell.link_url.as_deref(), Some("https://example.org"));
        assert_eq!(cell.alt_text.as_deref(), Some("alt"));
    }
}
