//! District boundary data - the named polygon table.
//!
//! Districts are an *ordered* mapping from name to boundary polygon.
//! Declaration order matters: when boundaries overlap (a data bug, but a
//! survivable one), detection returns the first-declared match. So this
//! module must preserve document order through load and save, which plain
//! JSON maps don't guarantee - hence the custom serde impls below.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::geometry::{Point, Polygon};

/// Error type for district/game-state data loading.
#[derive(Debug)]
pub enum DataError {
    /// The file could not be read at all.
    Read(std::io::Error),
    /// The file was read but its contents didn't parse.
    Parse(String),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Read(e) => write!(f, "failed to read data file: {}", e),
            DataError::Parse(msg) => write!(f, "failed to parse data file: {}", msg),
        }
    }
}

impl std::error::Error for DataError {}

/// A named district with its boundary polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    pub name: String,
    pub boundary: Polygon,
}

/// Ordered name -> boundary mapping. Names are unique; iteration order is
/// declaration order, which defines the overlap tie-break.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictMap {
    districts: Vec<District>,
}

impl DistrictMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a district, replacing the boundary if the name exists
    /// (its position in the declaration order is kept).
    pub fn insert(&mut self, name: &str, boundary: Polygon) {
        match self.districts.iter_mut().find(|d| d.name == name) {
            Some(existing) => existing.boundary = boundary,
            None => self.districts.push(District {
                name: name.to_string(),
                boundary,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&District> {
        self.districts.iter().find(|d| d.name == name)
    }

    /// Append a boundary vertex to a district, creating the district at
    /// the end of the declaration order if it doesn't exist yet.
    pub fn push_point(&mut self, name: &str, point: Point) {
        match self.districts.iter_mut().find(|d| d.name == name) {
            Some(d) => d.boundary.points.push(point),
            None => self.districts.push(District {
                name: name.to_string(),
                boundary: Polygon::new(vec![point]),
            }),
        }
    }

    /// Remove and return the last boundary vertex of a district.
    pub fn remove_last_point(&mut self, name: &str) -> Option<Point> {
        self.districts
            .iter_mut()
            .find(|d| d.name == name)
            .and_then(|d| d.boundary.points.pop())
    }

    /// Drop all boundary vertices of a district (the district stays listed).
    pub fn clear_district(&mut self, name: &str) {
        if let Some(d) = self.districts.iter_mut().find(|d| d.name == name) {
            d.boundary.points.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &District> {
        self.districts.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.districts.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// Parse a district table from a JSON document:
    /// `{ "Name": [[x, y], ...], ... }` - document order is kept.
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        serde_json::from_str(json).map_err(|e| DataError::Parse(e.to_string()))
    }

    /// Load a district table from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let content = fs::read_to_string(path).map_err(DataError::Read)?;
        Self::from_json_str(&content)
    }

    /// Serialize to the on-disk JSON format (coordinates rounded to
    /// integer pairs, declaration order preserved).
    pub fn to_json_string(&self) -> String {
        // Our Serialize impl can't fail: keys are strings, values are ints.
        serde_json::to_string(self).expect("district map serialization is infallible")
    }

    /// The built-in board: the six stock districts with their collected
    /// boundary coordinates, in tie-break order.
    pub fn default_board() -> Self {
        let mut map = Self::new();
        map.insert(
            "Watson",
            Polygon::from_pairs(&[
                [116, 39], [887, 36], [893, 211], [866, 254], [721, 307], [629, 313],
                [571, 473], [516, 506], [245, 500], [98, 353], [98, 64], [119, 43],
            ]),
        );
        map.insert(
            "Westbrook",
            Polygon::from_pairs(&[
                [629, 309], [983, 312], [985, 819], [944, 816], [655, 645], [634, 573],
                [519, 501], [568, 473], [632, 309], [983, 312],
            ]),
        );
        map.insert(
            "City Center",
            Polygon::from_pairs(&[
                [58, 501], [517, 501], [629, 573], [655, 642], [517, 814], [483, 826],
                [445, 837], [412, 837], [378, 821], [350, 791], [337, 742], [69, 755],
                [25, 698], [23, 540], [56, 499],
            ]),
        );
        map.insert(
            "Heywood",
            Polygon::from_pairs(&[
                [23, 698], [66, 760], [332, 744], [358, 801], [396, 826], [442, 844],
                [486, 832], [532, 808], [657, 642], [762, 714], [460, 1088], [176, 1090],
                [56, 960], [20, 993], [20, 698],
            ]),
        );
        map.insert(
            "Pacifica",
            Polygon::from_pairs(&[
                [20, 995], [51, 962], [176, 1090], [463, 1090], [463, 1118], [691, 1331],
                [547, 1523], [20, 1520], [23, 993],
            ]),
        );
        map.insert(
            "Santo Domingo",
            Polygon::from_pairs(&[
                [765, 714], [942, 819], [988, 819], [1018, 816], [1018, 1525], [565, 1523],
                [706, 1323], [478, 1116], [478, 1090], [770, 727], [768, 711],
            ]),
        );
        map
    }
}

// ============================================================================
// SERDE (order-preserving)
// ============================================================================
//
// ## Rust Lesson #7: Custom Serde Impls
//
// `#[derive(Deserialize)]` into a HashMap would lose document order, and
// into a BTreeMap would sort by name - both wrong for our tie-break rule.
// A hand-written Visitor receives map entries in document order, so we
// push them into our Vec as they arrive. Same JSON shape, right ordering.

impl Serialize for DistrictMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.districts.len()))?;
        for district in &self.districts {
            let pairs: Vec<[i64; 2]> = district
                .boundary
                .points
                .iter()
                .map(|p| [p.x.round() as i64, p.y.round() as i64])
                .collect();
            map.serialize_entry(&district.name, &pairs)?;
        }
        map.end()
    }
}

struct DistrictMapVisitor;

impl<'de> Visitor<'de> for DistrictMapVisitor {
    type Value = DistrictMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of district name to [[x, y], ...] pairs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = DistrictMap::new();
        while let Some((name, pairs)) = access.next_entry::<String, Vec<[i64; 2]>>()? {
            if map.get(&name).is_some() {
                return Err(serde::de::Error::custom(format!(
                    "duplicate district name: {}",
                    name
                )));
            }
            map.insert(&name, Polygon::from_pairs(&pairs));
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for DistrictMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DistrictMapVisitor)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_but_keeps_position() {
        let mut map = DistrictMap::new();
        map.insert("a", Polygon::from_pairs(&[[0, 0]]));
        map.insert("b", Polygon::from_pairs(&[[1, 1]]));
        map.insert("a", Polygon::from_pairs(&[[2, 2], [3, 3]]));

        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(map.get("a").unwrap().boundary.len(), 2);
    }

    #[test]
    fn push_point_creates_district_on_demand() {
        let mut map = DistrictMap::new();
        map.push_point("new", Point::new(5.0, 6.0));
        map.push_point("new", Point::new(7.0, 8.0));
        assert_eq!(map.get("new").unwrap().boundary.len(), 2);
    }

    #[test]
    fn remove_last_point_pops_in_order() {
        let mut map = DistrictMap::new();
        map.push_point("d", Point::new(1.0, 1.0));
        map.push_point("d", Point::new(2.0, 2.0));

        assert_eq!(map.remove_last_point("d"), Some(Point::new(2.0, 2.0)));
        assert_eq!(map.remove_last_point("d"), Some(Point::new(1.0, 1.0)));
        assert_eq!(map.remove_last_point("d"), None);
        assert_eq!(map.remove_last_point("missing"), None);
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let json = r#"{"Zeta": [[1,2],[3,4],[5,6]], "Alpha": [[7,8],[9,10],[11,12]]}"#;
        let map = DistrictMap::from_json_str(json).unwrap();

        // "Zeta" declared first must stay first despite sorting after "Alpha"
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);

        let out = map.to_json_string();
        let reloaded = DistrictMap::from_json_str(&out).unwrap();
        assert_eq!(map, reloaded);
        assert!(out.find("Zeta").unwrap() < out.find("Alpha").unwrap());
    }

    #[test]
    fn duplicate_names_rejected() {
        let json = r#"{"A": [[1,2]], "A": [[3,4]]}"#;
        assert!(matches!(
            DistrictMap::from_json_str(json),
            Err(DataError::Parse(_))
        ));
    }

    #[test]
    fn garbage_json_is_a_parse_error() {
        assert!(matches!(
            DistrictMap::from_json_str("not json at all"),
            Err(DataError::Parse(_))
        ));
    }

    #[test]
    fn default_board_has_six_districts_in_order() {
        let board = DistrictMap::default_board();
        let names: Vec<&str> = board.names().collect();
        assert_eq!(
            names,
            vec!["Watson", "Westbrook", "City Center", "Heywood", "Pacifica", "Santo Domingo"]
        );
        for district in board.iter() {
            assert!(
                district.boundary.len() >= 8,
                "{} has too few vertices",
                district.name
            );
        }
    }
}
