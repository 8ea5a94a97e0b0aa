use crate::types::station::Station;
use log::warn;
use std::collections::HashMap;

/// Lookup table from a station's display string to its id.
///
/// The index is always built in one go from a complete station list and is
/// replaced as a whole on reload, never patched.
///
/// Two stations sharing city, district, province and street produce the same
/// display string. That case is not disambiguated: the later station wins and
/// the clash is logged and counted in [`NameIndex::collisions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIndex {
    ids: HashMap<String, i64>,
    names: Vec<String>,
    collisions: usize,
}

impl NameIndex {
    pub fn from_stations<'a>(stations: impl IntoIterator<Item = &'a Station>) -> Self {
        let mut index = NameIndex::default();
        for station in stations {
            let name = station.display_name();
            match index.ids.insert(name.clone(), station.id) {
                None => index.names.push(name),
                Some(previous) if previous != station.id => {
                    warn!(
                        "Display name '{}' is shared by stations {} and {}; keeping {}",
                        name, previous, station.id, station.id
                    );
                    index.collisions += 1;
                }
                Some(_) => {}
            }
        }
        index
    }

    /// Station id for an exact display string. Unknown names and names mapped
    /// to id `0` are both treated as invalid.
    pub fn lookup(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied().filter(|id| *id != 0)
    }

    /// Number of distinct display strings.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Display strings in the order they first appeared in the station list.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Case-insensitive substring match over all display strings, in index order.
    pub fn suggestions(&self, query: &str) -> Vec<&str> {
        let needle = query.to_lowercase();
        self.names
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: i64, city: &str, street: &str) -> Station {
        Station {
            id,
            city: city.into(),
            district: city.into(),
            province: "MAZOWIECKIE".into(),
            street: street.into(),
        }
    }

    #[test]
    fn test_lookup_and_invalid_ids() {
        let stations = vec![
            station(10, "Warszawa", "ul. Marszałkowska"),
            station(0, "Radom", "ul. Tochtermana"),
        ];
        let index = NameIndex::from_stations(&stations);
        assert_eq!(
            index.lookup("Warszawa, Warszawa, MAZOWIECKIE, ul. Marszałkowska"),
            Some(10)
        );
        assert_eq!(index.lookup("Radom, Radom, MAZOWIECKIE, ul. Tochtermana"), None);
        assert_eq!(index.lookup("Nowhere"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_collisions_are_counted_not_resolved_silently() {
        let stations = vec![
            station(1, "Płock", "ul. Reja"),
            station(2, "Płock", "ul. Reja"),
            station(2, "Płock", "ul. Reja"),
        ];
        let index = NameIndex::from_stations(&stations);
        assert_eq!(index.len(), 1);
        assert_eq!(index.collisions(), 1);
        assert_eq!(index.lookup("Płock, Płock, MAZOWIECKIE, ul. Reja"), Some(2));
    }

    #[test]
    fn test_suggestions_case_insensitive_contains() {
        let stations = vec![
            station(1, "Warszawa", "ul. Wokalna"),
            station(2, "Legionowo", "ul. Zegrzyńska"),
            station(3, "Warszawa", "al. Niepodległości"),
        ];
        let index = NameIndex::from_stations(&stations);
        let hits = index.suggestions("WARSZ");
        assert_eq!(hits.len(), 2);
        assert!(hits[0].ends_with("ul. Wokalna"));
        assert_eq!(index.suggestions("zegrz").len(), 1);
        assert!(index.suggestions("kraków").is_empty());
    }
}
