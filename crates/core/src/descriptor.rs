//! Descriptor identifiers and the maps that hold their latest values.
//!
//! Descriptors are addressed by enum internally. The canonical lowercase
//! names (`"centroid"`, `"zerocrossing"`, ...) are the public string contract
//! and are what gets serialised.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};

use crate::{numeric::Real, DescriptorError};

/// Common behaviour of the two descriptor catalogues.
pub trait DescriptorKey: Copy + Ord + fmt::Debug + FromStr<Err = DescriptorError> {
    /// Canonical name used in string keyed lookups and serialised output.
    fn name(self) -> &'static str;
}

macro_rules! descriptor_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every descriptor in computation order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl DescriptorKey for $name {
            fn name(self) -> &'static str {
                $name::name(self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = DescriptorError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(DescriptorError::UnknownDescriptor(other.to_string())),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = String::deserialize(deserializer)?;
                name.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

descriptor_enum! {
    /// Time domain descriptors computed over the sample buffer.
    TimeDescriptor {
        Peak => "peak",
        Rms => "rms",
        Variance => "variance",
        Kurtosis => "kurtosis",
        Skewness => "skewness",
        ZeroCrossing => "zerocrossing",
    }
}

descriptor_enum! {
    /// Frequency domain descriptors computed over the magnitude spectrum.
    ///
    /// Declared in the order the engine evaluates them: centroid and spread
    /// come first because kurtosis and skewness depend on them.
    FrequencyDescriptor {
        Centroid => "centroid",
        Spread => "spread",
        CrestFactor => "crestfactor",
        Decrease => "decrease",
        Entropy => "entropy",
        Flatness => "flatness",
        Flux => "flux",
        Irregularity => "irregularity",
        Kurtosis => "kurtosis",
        Peak => "peak",
        Rolloff => "rolloff",
        Skewness => "skewness",
        Slope => "slope",
    }
}

/// Latest value of each computed descriptor.
///
/// Lookups never fail: a descriptor that was never computed, or a name that
/// is not in the catalogue, reads as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorMap<K, F> {
    values: BTreeMap<K, F>,
}

impl<K, F> Default for DescriptorMap<K, F> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<K: DescriptorKey, F: Real> DescriptorMap<K, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: K) -> F {
        self.values.get(&key).copied().unwrap_or_else(F::zero)
    }

    /// String keyed lookup, zero for unknown names.
    pub fn get_by_name(&self, name: &str) -> F {
        name.parse::<K>()
            .map(|key| self.get(key))
            .unwrap_or_else(|_| F::zero())
    }

    pub fn contains(&self, key: K) -> bool {
        self.values.contains_key(&key)
    }

    pub fn insert(&mut self, key: K, value: F) -> F {
        self.values.insert(key, value);
        value
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, F)> + '_ {
        self.values.iter().map(|(&key, &value)| (key, value))
    }

    pub fn iter_named(&self) -> impl Iterator<Item = (&'static str, F)> + '_ {
        self.iter().map(|(key, value)| (key.name(), value))
    }
}

impl<K: DescriptorKey, F: Real + Serialize> Serialize for DescriptorMap<K, F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter_named() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Owned copy of both descriptor maps.
///
/// The engine itself is not shared between threads; a snapshot is what gets
/// handed to a UI or transport thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = "F: Real + Serialize"))]
pub struct DescriptorSnapshot<F> {
    pub time: DescriptorMap<TimeDescriptor, F>,
    pub frequency: DescriptorMap<FrequencyDescriptor, F>,
}

impl<F: Real> DescriptorSnapshot<F> {
    pub fn time_descriptor(&self, name: &str) -> F {
        self.time.get_by_name(name)
    }

    pub fn frequency_descriptor(&self, name: &str) -> F {
        self.frequency.get_by_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for descriptor in TimeDescriptor::ALL {
            assert_eq!(descriptor.name().parse::<TimeDescriptor>().unwrap(), *descriptor);
        }
        for descriptor in FrequencyDescriptor::ALL {
            assert_eq!(
                descriptor.to_string().parse::<FrequencyDescriptor>().unwrap(),
                *descriptor
            );
        }
        assert_eq!(TimeDescriptor::ALL.len(), 6);
        assert_eq!(FrequencyDescriptor::ALL.len(), 13);
    }

    #[test]
    fn unknown_names_read_as_zero() {
        let mut map = DescriptorMap::<FrequencyDescriptor, f64>::new();
        map.insert(FrequencyDescriptor::Centroid, 440.0);

        assert_eq!(map.get_by_name("centroid"), 440.0);
        assert_eq!(map.get_by_name("nonexistent"), 0.0);
        assert_eq!(map.get(FrequencyDescriptor::Spread), 0.0);
        assert!(matches!(
            "Centroid".parse::<FrequencyDescriptor>(),
            Err(DescriptorError::UnknownDescriptor(_))
        ));
    }

    #[test]
    fn serialises_with_canonical_names() {
        let mut map = DescriptorMap::<TimeDescriptor, f64>::new();
        map.insert(TimeDescriptor::ZeroCrossing, 0.5);
        map.insert(TimeDescriptor::Rms, 0.25);

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["zerocrossing"], 0.5);
        assert_eq!(json["rms"], 0.25);

        let parsed: FrequencyDescriptor = serde_json::from_str("\"crestfactor\"").unwrap();
        assert_eq!(parsed, FrequencyDescriptor::CrestFactor);
    }
}
