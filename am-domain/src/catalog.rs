use crate::{CityId, EngineError, ResourceId, ServerId, TierId};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

lazy_static! {
    pub static ref REFERENCE_CATALOG: Catalog = Catalog::reference();
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub color: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKind {
    pub id: ResourceId,
    pub name: String,
    pub refined_id: String,
    pub refined_name: String,
    /// informational only, the recipe depends on the tier
    pub ratio: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tier {
    pub id: TierId,
    pub name: String,
    pub level: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MarketServer {
    pub id: ServerId,
    pub name: String,
    pub url: String,
}

/// Percentage of the input materials returned by the refining process.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRateTable {
    pub base: f64,
    pub city_bonus: f64,
    pub focus: f64,
    pub focus_city_bonus: f64,
}

impl Default for ReturnRateTable {
    fn default() -> Self {
        Self {
            base: 15.0,
            city_bonus: 37.0,
            focus: 44.0,
            focus_city_bonus: 53.0,
        }
    }
}

impl ReturnRateTable {
    pub fn rate(&self, use_focus: bool, has_city_bonus: bool) -> f64 {
        match (use_focus, has_city_bonus) {
            (false, false) => self.base,
            (false, true) => self.city_bonus,
            (true, false) => self.focus,
            (true, true) => self.focus_city_bonus,
        }
    }

    pub fn all_rates(&self) -> [f64; 4] {
        [self.base, self.city_bonus, self.focus, self.focus_city_bonus]
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ItemIds {
    pub raw: String,
    pub refined: String,
}

/// Static reference data the engine works on. The set of cities, resources and tiers is closed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub cities: Vec<City>,
    pub resources: Vec<ResourceKind>,
    pub tiers: Vec<Tier>,
    pub servers: Vec<MarketServer>,
    /// the resource each city has a refining bonus for
    #[serde(default)]
    pub city_bonuses: HashMap<CityId, ResourceId>,
    #[serde(default)]
    pub return_rates: ReturnRateTable,
}

impl Catalog {
    pub fn reference() -> Self {
        let cities = [
            ("Caerleon", "hsl(0, 70%, 50%)"),
            ("Bridgewatch", "hsl(35, 80%, 50%)"),
            ("Fort Sterling", "hsl(200, 70%, 50%)"),
            ("Lymhurst", "hsl(120, 50%, 40%)"),
            ("Martlock", "hsl(45, 70%, 50%)"),
            ("Thetford", "hsl(280, 50%, 50%)"),
        ]
        .into_iter()
        .map(|(name, color)| City {
            id: CityId(name.to_string()),
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect();

        let resources = [
            ("ORE", "Ore", "METALBAR", "Metal Bars"),
            ("WOOD", "Wood", "PLANKS", "Planks"),
            ("HIDE", "Hide", "LEATHER", "Leather"),
            ("FIBER", "Fiber", "CLOTH", "Cloth"),
            ("ROCK", "Stone", "STONEBLOCK", "Stone Blocks"),
        ]
        .into_iter()
        .map(|(id, name, refined_id, refined_name)| ResourceKind {
            id: ResourceId(id.to_string()),
            name: name.to_string(),
            refined_id: refined_id.to_string(),
            refined_name: refined_name.to_string(),
            ratio: 2,
        })
        .collect();

        let tiers = (4..=8)
            .map(|level| Tier {
                id: TierId(format!("T{level}")),
                name: format!("Tier {level}"),
                level,
            })
            .collect();

        let servers = [
            ("west", "Americas", "https://west.albion-online-data.com"),
            ("europe", "Europe", "https://europe.albion-online-data.com"),
            ("east", "Asia", "https://east.albion-online-data.com"),
        ]
        .into_iter()
        .map(|(id, name, url)| MarketServer {
            id: ServerId(id.to_string()),
            name: name.to_string(),
            url: url.to_string(),
        })
        .collect();

        let city_bonuses = [
            ("Martlock", "HIDE"),
            ("Bridgewatch", "ROCK"),
            ("Lymhurst", "FIBER"),
            ("Fort Sterling", "WOOD"),
            ("Thetford", "ORE"),
        ]
        .into_iter()
        .map(|(city, resource)| (CityId(city.to_string()), ResourceId(resource.to_string())))
        .collect();

        Self {
            cities,
            resources,
            tiers,
            servers,
            city_bonuses,
            return_rates: ReturnRateTable::default(),
        }
    }

    pub fn city(&self, id: &CityId) -> Option<&City> {
        self.cities.iter().find(|city| &city.id == id)
    }

    pub fn require_city(&self, id: &CityId) -> Result<&City, EngineError> {
        self.city(id).ok_or_else(|| EngineError::UnknownCity(id.clone()))
    }

    pub fn resource(&self, id: &ResourceId) -> Option<&ResourceKind> {
        self.resources.iter().find(|resource| &resource.id == id)
    }

    pub fn require_resource(&self, id: &ResourceId) -> Result<&ResourceKind, EngineError> {
        self.resource(id).ok_or_else(|| EngineError::UnknownResource(id.clone()))
    }

    pub fn tier(&self, id: &TierId) -> Option<&Tier> {
        self.tiers.iter().find(|tier| &tier.id == id)
    }

    pub fn require_tier(&self, id: &TierId) -> Result<&Tier, EngineError> {
        self.tier(id).ok_or_else(|| EngineError::UnknownTier(id.clone()))
    }

    pub fn server(&self, id: &ServerId) -> Option<&MarketServer> {
        self.servers.iter().find(|server| &server.id == id)
    }

    pub fn require_server(&self, id: &ServerId) -> Result<&MarketServer, EngineError> {
        self.server(id).ok_or_else(|| EngineError::UnknownServer(id.clone()))
    }

    pub fn city_ids(&self) -> Vec<CityId> {
        self.cities.iter().map(|city| city.id.clone()).collect()
    }

    pub fn bonus_resource(&self, city: &CityId) -> Option<&ResourceId> {
        self.city_bonuses.get(city)
    }

    /// The tier one level below. Prefers the catalog's own entry, otherwise derives `T{level-1}`,
    /// which lets callers look up prices of tiers the catalog doesn't list.
    pub fn previous_tier_id(&self, tier: &Tier) -> Option<TierId> {
        if tier.level <= 1 {
            return None;
        }
        let previous_level = tier.level - 1;

        let previous = self
            .tiers
            .iter()
            .find(|t| t.level == previous_level)
            .map(|t| t.id.clone())
            .unwrap_or_else(|| TierId(format!("T{previous_level}")));

        Some(previous)
    }

    /// Item identifiers as used by the market feed, e.g. `T4_ORE` and `T4_METALBAR`.
    pub fn item_ids(&self, resource: &ResourceId, tier: &TierId) -> Result<ItemIds, EngineError> {
        let resource = self.require_resource(resource)?;
        let tier = self.require_tier(tier)?;

        Ok(ItemIds {
            raw: format!("{}_{}", tier.id, resource.id),
            refined: format!("{}_{}", tier.id, resource.refined_id),
        })
    }
}
