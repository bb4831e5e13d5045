//! Regions
//!
//! The states/provinces a delivery address may name.

use rustc_hash::FxHashSet;

const US_STATES: [&str; 50] = [
    "Alabama",
    "Alaska",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "Florida",
    "Georgia",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

/// Supplies the valid state/province values for address validation.
pub trait RegionProvider: Send + Sync {
    /// Whether `region` is an accepted value.
    fn contains(&self, region: &str) -> bool;

    /// All accepted values, in display order.
    fn regions(&self) -> Vec<String>;
}

/// A fixed list of regions.
#[derive(Debug, Clone)]
pub struct RegionList {
    ordered: Vec<String>,
    lookup: FxHashSet<String>,
}

impl RegionList {
    /// A region list from the given names. Duplicates keep their first position.
    pub fn new<S: Into<String>>(regions: impl IntoIterator<Item = S>) -> Self {
        let mut ordered = Vec::new();
        let mut lookup = FxHashSet::default();

        for region in regions {
            let region = region.into();

            if lookup.insert(region.clone()) {
                ordered.push(region);
            }
        }

        Self { ordered, lookup }
    }

    /// The fifty US states.
    pub fn us_states() -> Self {
        Self::new(US_STATES)
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns true if there are no regions.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl Default for RegionList {
    fn default() -> Self {
        Self::us_states()
    }
}

impl RegionProvider for RegionList {
    fn contains(&self, region: &str) -> bool {
        self.lookup.contains(region)
    }

    fn regions(&self) -> Vec<String> {
        self.ordered.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_states_has_fifty_entries() {
        let regions = RegionList::us_states();

        assert_eq!(regions.len(), 50);
        assert!(regions.contains("New York"));
        assert!(!regions.contains("Ontario"));
    }

    #[test]
    fn lookup_is_exact() {
        let regions = RegionList::us_states();

        assert!(!regions.contains("new york"));
        assert!(!regions.contains(""));
    }

    #[test]
    fn custom_list_replaces_default() {
        let regions = RegionList::new(["Ontario", "Quebec", "Ontario"]);

        assert_eq!(regions.regions(), vec!["Ontario", "Quebec"]);
        assert!(regions.contains("Quebec"));
        assert!(!regions.contains("Texas"));
    }
}
