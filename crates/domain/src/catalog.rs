// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Static civilization and map catalogs.
//!
//! This is read-only reference data. Draft configurations may only refer to
//! ids listed here; anything else is rejected by the config validator.

use serde::Serialize;

/// A selectable civilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Civilization {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Asset name of the civilization's flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<&'static str>,
    /// Id of the base civilization this one is a variant of.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<&'static str>,
    /// The expansion that introduced the civilization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<&'static str>,
}

/// Broad terrain classification of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    Land,
    Hybrid,
    Water,
}

/// A selectable map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Map {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub map_type: MapType,
}

const fn civ(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    variant: Option<&'static str>,
    expansion: Option<&'static str>,
) -> Civilization {
    Civilization {
        id,
        name,
        description,
        flag: Some(id),
        variant,
        expansion,
    }
}

const fn map(id: &'static str, name: &'static str, map_type: MapType) -> Map {
    Map { id, name, map_type }
}

/// Every civilization a draft may use.
pub const CIVILIZATIONS: &[Civilization] = &[
    civ("abbasid", "Abbasid Dynasty", "Technology and economy through the House of Wisdom", None, None),
    civ("chinese", "Chinese", "Dynasties, tax collection, and gunpowder", None, None),
    civ("delhi", "Delhi Sultanate", "Free research through scholars and war elephants", None, None),
    civ("english", "English", "Longbowmen, farming bonuses, and network of castles", None, None),
    civ("french", "French", "Royal knights and strong trade", None, None),
    civ("hre", "Holy Roman Empire", "Prelates and relic-based economy", None, None),
    civ("mongols", "Mongols", "Nomadic buildings and raiding cavalry", None, None),
    civ("rus", "Rus", "Hunting bounty and wooden fortifications", None, None),
    civ("malians", "Malians", "Pit mines, cattle, and javelin infantry", None, None),
    civ("ottomans", "Ottomans", "Military schools and Janissaries", None, None),
    civ("byzantines", "Byzantines", "Cisterns, olive oil, and mercenaries", None, Some("the-sultans-ascend")),
    civ("japanese", "Japanese", "Daimyo, shinto shrines, and samurai", None, Some("the-sultans-ascend")),
    civ("ayyubids", "Ayyubids", "Wing-based advancement and desert raiders", Some("abbasid"), Some("the-sultans-ascend")),
    civ("jeanne", "Jeanne d'Arc", "A hero who grows stronger through the ages", Some("french"), Some("the-sultans-ascend")),
    civ("order-of-the-dragon", "Order of the Dragon", "Gilded elite units", Some("hre"), Some("the-sultans-ascend")),
    civ("zhuxi", "Zhu Xi's Legacy", "Imperial academies and Shaolin monasteries", Some("chinese"), Some("the-sultans-ascend")),
    civ("house-of-lancaster", "House of Lancaster", "Manors, yeomen, and demilancers", Some("english"), Some("knights-of-cross-and-rose")),
    civ("knights-templar", "Knights Templar", "Commanderies and pilgrim trade", Some("french"), Some("knights-of-cross-and-rose")),
    civ("golden-horde", "Golden Horde", "Double-spawning khan armies", Some("mongols"), Some("dynasties-of-the-east")),
    civ("macedonian", "Macedonian Dynasty", "Varangian guard and silver economy", Some("byzantines"), Some("dynasties-of-the-east")),
    civ("sengoku", "Sengoku Daimyo", "Clan lords and yatai stalls", Some("japanese"), Some("dynasties-of-the-east")),
    civ("tughlaq", "Tughlaq Dynasty", "Governors and elephant workers", Some("delhi"), Some("dynasties-of-the-east")),
];

/// Every map a draft may use.
pub const MAPS: &[Map] = &[
    map("altai", "Altai", MapType::Land),
    map("ancient-spires", "Ancient Spires", MapType::Land),
    map("boulder-bay", "Boulder Bay", MapType::Hybrid),
    map("confluence", "Confluence", MapType::Land),
    map("dry-arabia", "Dry Arabia", MapType::Land),
    map("four-lakes", "Four Lakes", MapType::Hybrid),
    map("french-pass", "French Pass", MapType::Land),
    map("golden-heights", "Golden Heights", MapType::Land),
    map("gorge", "Gorge", MapType::Land),
    map("hideout", "Hideout", MapType::Land),
    map("high-view", "High View", MapType::Land),
    map("hill-and-dale", "Hill and Dale", MapType::Land),
    map("king-of-the-hill", "King of the Hill", MapType::Land),
    map("lipany", "Lipany", MapType::Land),
    map("marshland", "Marshland", MapType::Land),
    map("migration", "Migration", MapType::Water),
    map("mongolian-heights", "Mongolian Heights", MapType::Land),
    map("mountain-pass", "Mountain Pass", MapType::Land),
    map("rocky-river", "Rocky River", MapType::Hybrid),
    map("the-pit", "The Pit", MapType::Land),
    map("archipelago", "Archipelago", MapType::Water),
    map("warring-islands", "Warring Islands", MapType::Water),
];

/// Looks up a civilization by id.
#[must_use]
pub fn find_civilization(id: &str) -> Option<&'static Civilization> {
    CIVILIZATIONS.iter().find(|c| c.id == id)
}

/// Looks up a map by id.
#[must_use]
pub fn find_map(id: &str) -> Option<&'static Map> {
    MAPS.iter().find(|m| m.id == id)
}
