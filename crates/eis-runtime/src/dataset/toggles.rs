//! Feature toggle map
//!
//! Toggles keep document order, which fixes the join order and therefore the
//! order of the output feature names. A value is either a boolean or one
//! level of named group:
//!
//! ```yaml
//! male_female: true
//! arrests:
//!   career_arrests: true
//!   recent_arrests: false
//! ```

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// Ordered feature name -> enabled map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureToggles {
    entries: Vec<(String, bool)>,
}

impl FeatureToggles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a toggle. A name set twice keeps its first position and takes the
    /// latest value.
    pub fn set(&mut self, name: impl Into<String>, enabled: bool) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = enabled,
            None => self.entries.push((name, enabled)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.set(name, enabled);
        self
    }

    /// Enabled feature names in order
    pub fn enabled(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, on)| n == name && *on)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(n, on)| (n.as_str(), *on))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for FeatureToggles {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        let mut toggles = FeatureToggles::new();
        for (name, enabled) in iter {
            toggles.set(name, enabled);
        }
        toggles
    }
}

/// A map of plain boolean toggles, in document order
struct FlagGroup(Vec<(String, bool)>);

impl<'de> Deserialize<'de> for FlagGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupVisitor;

        impl<'de> Visitor<'de> for GroupVisitor {
            type Value = FlagGroup;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of feature names to booleans")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FlagGroup, A::Error> {
                let mut flags = Vec::new();
                while let Some((name, enabled)) = map.next_entry::<String, bool>()? {
                    flags.push((name, enabled));
                }
                Ok(FlagGroup(flags))
            }
        }

        deserializer.deserialize_map(GroupVisitor)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ToggleEntry {
    Flag(bool),
    Group(FlagGroup),
}

impl<'de> Deserialize<'de> for FeatureToggles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TogglesVisitor;

        impl<'de> Visitor<'de> for TogglesVisitor {
            type Value = FeatureToggles;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of feature names to booleans or groups of booleans")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FeatureToggles, A::Error> {
                let mut toggles = FeatureToggles::new();
                while let Some(key) = map.next_key::<String>()? {
                    let entry = map.next_value::<ToggleEntry>().map_err(|_| {
                        de::Error::custom(format!(
                            "toggle '{}' must be a boolean or a map of booleans",
                            key
                        ))
                    })?;
                    match entry {
                        ToggleEntry::Flag(enabled) => toggles.set(key, enabled),
                        ToggleEntry::Group(FlagGroup(flags)) => {
                            for (name, enabled) in flags {
                                toggles.set(name, enabled);
                            }
                        }
                    }
                }
                Ok(toggles)
            }
        }

        deserializer.deserialize_map(TogglesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_order_and_groups() {
        let yaml = r#"
race: true
male_female: false
arrests:
  recent_arrests: true
  career_arrests: true
education: true
"#;
        let toggles: FeatureToggles = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            toggles.enabled(),
            vec!["race", "recent_arrests", "career_arrests", "education"]
        );
        assert!(!toggles.is_enabled("male_female"));
        assert_eq!(toggles.len(), 5);
    }

    #[test]
    fn test_rejects_non_boolean() {
        let yaml = "race: yes please\n";
        assert!(serde_yaml::from_str::<FeatureToggles>(yaml).is_err());
    }

    #[test]
    fn test_repeated_name_keeps_position() {
        let toggles: FeatureToggles =
            vec![("race", true), ("education", true), ("race", false)].into_iter().collect();
        assert_eq!(toggles.enabled(), vec!["education"]);
        assert_eq!(toggles.iter().next(), Some(("race", false)));
    }
}
