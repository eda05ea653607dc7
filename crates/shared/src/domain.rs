use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseTokenError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ProductId);

/// Catalog item type as stored on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Mug,
    Shirt,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mug => "mug",
            Self::Shirt => "shirt",
        }
    }
}

/// Item type restriction applied to a collection fetch. `All` travels as the empty token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemTypeFilter {
    #[default]
    #[serde(rename = "")]
    All,
    #[serde(rename = "mug")]
    Mug,
    #[serde(rename = "shirt")]
    Shirt,
}

impl ItemTypeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Mug => ItemType::Mug.as_str(),
            Self::Shirt => ItemType::Shirt.as_str(),
        }
    }

    pub fn item_type(self) -> Option<ItemType> {
        match self {
            Self::All => None,
            Self::Mug => Some(ItemType::Mug),
            Self::Shirt => Some(ItemType::Shirt),
        }
    }
}

impl fmt::Display for ItemTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemTypeFilter {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "mug" => Ok(Self::Mug),
            "shirt" => Ok(Self::Shirt),
            other => Err(ParseTokenError::new("item type", other)),
        }
    }
}

/// Sort-order token owned by the sort partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
    DateDesc,
    DateAsc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::PriceAsc,
        SortOrder::PriceDesc,
        SortOrder::DateDesc,
        SortOrder::DateAsc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
        }
    }

    /// Item field the catalog sorts on.
    pub fn field(self) -> &'static str {
        match self {
            Self::PriceAsc | Self::PriceDesc => "price",
            Self::DateDesc | Self::DateAsc => "added",
        }
    }

    pub fn direction(self) -> &'static str {
        match self {
            Self::PriceAsc | Self::DateAsc => "asc",
            Self::PriceDesc | Self::DateDesc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == token)
            .ok_or_else(|| ParseTokenError::new("sort order", token))
    }
}
