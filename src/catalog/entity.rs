//! Entity Records
//!
//! The slice of an upstream Pokémon record the service keeps, and the card
//! view built from it.

use serde::{Deserialize, Serialize};

// == Pokemon ==
/// A fetched Pokémon record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    /// Type names in slot order
    pub types: Vec<String>,
    /// Best available artwork URL
    pub artwork: Option<String>,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
}

// == Card ==
/// A record as presented to the user, with its favorite marking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    #[serde(flatten)]
    pub pokemon: Pokemon,
    pub favorite: bool,
}

// == Upstream Shapes ==
/// `{"results": [{"name": ...}]}` list returned by the upstream API.
#[derive(Debug, Deserialize)]
pub(crate) struct NamedResourceList {
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedResource {
    pub name: String,
}

/// Upstream Pokémon record, reduced to the fields we read.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiPokemon {
    id: u32,
    name: String,
    #[serde(default)]
    types: Vec<ApiTypeSlot>,
    #[serde(default)]
    sprites: ApiSprites,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    weight: u32,
}

#[derive(Debug, Deserialize)]
struct ApiTypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSprites {
    front_default: Option<String>,
    #[serde(default)]
    other: ApiOtherSprites,
}

#[derive(Debug, Default, Deserialize)]
struct ApiOtherSprites {
    #[serde(rename = "official-artwork")]
    official_artwork: Option<ApiSprite>,
    home: Option<ApiSprite>,
}

#[derive(Debug, Deserialize)]
struct ApiSprite {
    front_default: Option<String>,
}

impl From<ApiPokemon> for Pokemon {
    fn from(api: ApiPokemon) -> Self {
        let sprites = api.sprites;
        let artwork = sprites
            .other
            .official_artwork
            .and_then(|s| s.front_default)
            .or(sprites.front_default)
            .or_else(|| sprites.other.home.and_then(|s| s.front_default));

        Self {
            id: api.id,
            name: api.name,
            types: api.types.into_iter().map(|slot| slot.kind.name).collect(),
            artwork,
            height: api.height,
            weight: api.weight,
        }
    }
}
