use crate::color::{Color, average_color, similar_colors};
use crate::error::{ColorError, ExtractError};
use log::{debug, warn};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A label and the reference colors that identify it
#[derive(Debug, Clone, PartialEq)]
pub struct ColorKey {
    pub label: String,
    pub colors: Vec<Color>,
}

impl ColorKey {
    /// Average of the reference colors, used to draw this label's markers
    pub fn marker_color(&self) -> Result<Color, ColorError> {
        average_color(&self.colors, false)
    }
}

/// Ordered mapping of label -> reference colors.
///
/// Every hex code is validated on insertion, so a built `ColorKeys` only
/// ever holds valid colors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorKeys {
    keys: Vec<ColorKey>,
}

impl ColorKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(label, [hex, ...])` pairs, keeping their order
    pub fn from_hex_map<I, L, C, S>(entries: I) -> Result<Self, ColorError>
    where
        I: IntoIterator<Item = (L, C)>,
        L: Into<String>,
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = Self::new();
        for (label, colors) in entries {
            keys.insert(label, colors)?;
        }
        Ok(keys)
    }

    /// Parse a JSON object of the form `{"label": ["#hex", ...], ...}`
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Add colors for a label. Colors for an existing label are appended.
    pub fn insert<L, C, S>(&mut self, label: L, colors: C) -> Result<(), ColorError>
    where
        L: Into<String>,
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let label = label.into();
        let parsed = colors
            .into_iter()
            .map(|c| Color::from_hex(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        match self.keys.iter_mut().find(|k| k.label == label) {
            Some(existing) => existing.colors.extend(parsed),
            None => self.keys.push(ColorKey {
                label,
                colors: parsed,
            }),
        }
        Ok(())
    }

    /// Append every key of `other` after this one's
    pub fn merge(&mut self, other: ColorKeys) {
        for key in other.keys {
            match self.keys.iter_mut().find(|k| k.label == key.label) {
                Some(existing) => existing.colors.extend(key.colors),
                None => self.keys.push(key),
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColorKey> {
        self.keys.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ColorKey> {
        self.keys.get(index)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check that every label has at least one color
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.keys.is_empty() {
            return Err(ExtractError::InvalidParameter(
                "at least one color key is required".to_string(),
            ));
        }
        if let Some(empty) = self.keys.iter().find(|k| k.colors.is_empty()) {
            return Err(ExtractError::InvalidParameter(format!(
                "color key '{}' has no colors",
                empty.label
            )));
        }
        if let Some(bad) = self.keys.iter().find(|k| !is_file_safe(&k.label)) {
            return Err(ExtractError::InvalidParameter(format!(
                "label '{}' cannot be used as a file name",
                bad.label
            )));
        }
        Ok(())
    }
}

fn is_file_safe(label: &str) -> bool {
    !label.is_empty()
        && label != "."
        && label != ".."
        && !label.contains(['/', '\\', '\0'])
}

impl<'a> IntoIterator for &'a ColorKeys {
    type Item = &'a ColorKey;
    type IntoIter = std::slice::Iter<'a, ColorKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

struct ColorKeysVisitor;

impl<'de> Visitor<'de> for ColorKeysVisitor {
    type Value = ColorKeys;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of label to a list of hex colors")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut keys = ColorKeys::new();
        while let Some((label, colors)) = map.next_entry::<String, Vec<String>>()? {
            keys.insert(label, colors)
                .map_err(<M::Error as de::Error>::custom)?;
        }
        Ok(keys)
    }
}

impl<'de> Deserialize<'de> for ColorKeys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ColorKeysVisitor)
    }
}

/// What to do when two labels claim the same RGB triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OverlapPolicy {
    /// The later label in key order takes the triple
    #[default]
    LastWins,
    /// The earlier label keeps the triple
    FirstWins,
    /// Refuse to build the lookup
    Error,
}

/// Exact RGB -> label lookup built from the expanded color sets of every key
#[derive(Debug, Clone)]
pub struct ColorLookup {
    table: HashMap<[u8; 3], usize>,
    labels: usize,
}

impl ColorLookup {
    pub fn build(
        keys: &ColorKeys,
        threshold: f64,
        policy: OverlapPolicy,
    ) -> Result<Self, ExtractError> {
        let mut table: HashMap<[u8; 3], usize> = HashMap::new();
        // (earlier label, later label) -> number of shared triples
        let mut overlaps: BTreeMap<(usize, usize), usize> = BTreeMap::new();

        for (idx, key) in keys.iter().enumerate() {
            for color in &key.colors {
                for rgb in similar_colors(color, threshold)? {
                    match table.entry(rgb) {
                        Entry::Vacant(slot) => {
                            slot.insert(idx);
                        }
                        Entry::Occupied(mut slot) => {
                            let prev = *slot.get();
                            if prev == idx {
                                continue;
                            }
                            match policy {
                                OverlapPolicy::LastWins => {
                                    slot.insert(idx);
                                }
                                OverlapPolicy::FirstWins => {}
                                OverlapPolicy::Error => {
                                    return Err(ExtractError::OverlappingColors {
                                        first: keys.keys[prev].label.clone(),
                                        second: key.label.clone(),
                                    });
                                }
                            }
                            *overlaps.entry((prev.min(idx), prev.max(idx))).or_default() += 1;
                        }
                    }
                }
            }
        }

        for ((a, b), count) in overlaps {
            warn!(
                "{} color(s) shared by '{}' and '{}' resolved with {:?}",
                count, keys.keys[a].label, keys.keys[b].label, policy
            );
        }

        debug!(
            "Built color lookup: {} RGB triples for {} labels",
            table.len(),
            keys.len()
        );

        Ok(Self {
            table,
            labels: keys.len(),
        })
    }

    /// Label index for an RGB triple, if any
    pub fn get(&self, rgb: [u8; 3]) -> Option<usize> {
        self.table.get(&rgb).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Number of labels in the keys this lookup was built from
    pub fn label_count(&self) -> usize {
        self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
