use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of fixed placeholder images items rotate through.
pub const PLACEHOLDER_IMAGE_COUNT: i64 = 50;
const PLACEHOLDER_IMAGE_BASE: &str = "https://picsum.photos/id";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ItemId);

impl ItemId {
    /// Placeholder image for this id. Depends on nothing but the id itself.
    pub fn derived_image_url(self) -> String {
        let slot = self.0.rem_euclid(PLACEHOLDER_IMAGE_COUNT) + 1;
        format!("{PLACEHOLDER_IMAGE_BASE}/{slot}/400/300")
    }
}

/// A listing entry as confirmed by the remote service.
///
/// The image URL is not part of the wire format; it is derived from `id` on
/// every read so two items with the same id always render the same image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(rename = "body")]
    pub description: String,
}

impl Item {
    pub fn new(id: ItemId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn derived_image_url(&self) -> String {
        self.id.derived_image_url()
    }
}

/// Creation payload. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub title: String,
    #[serde(rename = "body")]
    pub description: String,
}

impl ItemDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}
