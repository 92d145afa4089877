// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CIVILIZATIONS, MAPS, find_civilization, find_map};
use std::collections::HashSet;

#[test]
fn test_catalog_ids_are_unique() {
    let civ_ids: HashSet<&str> = CIVILIZATIONS.iter().map(|c| c.id).collect();
    assert_eq!(civ_ids.len(), CIVILIZATIONS.len());

    let map_ids: HashSet<&str> = MAPS.iter().map(|m| m.id).collect();
    assert_eq!(map_ids.len(), MAPS.len());
}

#[test]
fn test_variants_point_at_base_civilizations() {
    for civ in CIVILIZATIONS {
        if let Some(base) = civ.variant {
            let base_civ = find_civilization(base)
                .unwrap_or_else(|| panic!("{} is a variant of unknown civ {base}", civ.id));
            assert!(base_civ.variant.is_none(), "variants must not chain");
        }
    }
}

#[test]
fn test_lookup_by_id() {
    assert_eq!(find_civilization("english").unwrap().name, "English");
    assert_eq!(find_map("dry-arabia").unwrap().name, "Dry Arabia");
    assert!(find_civilization("dry-arabia").is_none());
    assert!(find_map("english").is_none());
}

#[test]
fn test_catalog_serializes_map_type_as_type() {
    let json = serde_json::to_value(find_map("migration").unwrap()).unwrap();
    assert_eq!(json["type"], "water");
    assert!(json.get("map_type").is_none());
}
