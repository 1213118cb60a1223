/// Taxon identity, rank, and ancestry types
use serde::{Deserialize, Serialize};
use std::fmt;

/// Taxon ID type - newtype pattern for type safety
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct TaxonId(pub u32);

impl TaxonId {
    /// Create a new TaxonId
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TaxonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaxonId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<TaxonId> for u32 {
    fn from(taxon: TaxonId) -> Self {
        taxon.0
    }
}

/// Taxonomic ranks emitted by the identification services.
///
/// `level()` gives the numeric rank level used for coarseness cutoffs:
/// lower values are more specific (species = 10, superfamily = 33).
/// Ranks this scoring core has no special handling for parse as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Kingdom,
    Phylum,
    Subphylum,
    Superclass,
    Class,
    Subclass,
    Superorder,
    Order,
    Suborder,
    Infraorder,
    Superfamily,
    Family,
    Subfamily,
    Tribe,
    Subtribe,
    Genus,
    Species,
    Hybrid,
    Subspecies,
    Variety,
    Form,
    Other,
}

impl Rank {
    /// Parse a rank from its service string form
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "kingdom" => Self::Kingdom,
            "phylum" => Self::Phylum,
            "subphylum" => Self::Subphylum,
            "superclass" => Self::Superclass,
            "class" => Self::Class,
            "subclass" => Self::Subclass,
            "superorder" => Self::Superorder,
            "order" => Self::Order,
            "suborder" => Self::Suborder,
            "infraorder" => Self::Infraorder,
            "superfamily" => Self::Superfamily,
            "family" => Self::Family,
            "subfamily" => Self::Subfamily,
            "tribe" => Self::Tribe,
            "subtribe" => Self::Subtribe,
            "genus" => Self::Genus,
            "species" => Self::Species,
            "hybrid" => Self::Hybrid,
            "subspecies" => Self::Subspecies,
            "variety" => Self::Variety,
            "form" => Self::Form,
            _ => Self::Other,
        }
    }

    /// The rank's service string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kingdom => "kingdom",
            Self::Phylum => "phylum",
            Self::Subphylum => "subphylum",
            Self::Superclass => "superclass",
            Self::Class => "class",
            Self::Subclass => "subclass",
            Self::Superorder => "superorder",
            Self::Order => "order",
            Self::Suborder => "suborder",
            Self::Infraorder => "infraorder",
            Self::Superfamily => "superfamily",
            Self::Family => "family",
            Self::Subfamily => "subfamily",
            Self::Tribe => "tribe",
            Self::Subtribe => "subtribe",
            Self::Genus => "genus",
            Self::Species => "species",
            Self::Hybrid => "hybrid",
            Self::Subspecies => "subspecies",
            Self::Variety => "variety",
            Self::Form => "form",
            Self::Other => "other",
        }
    }

    /// Numeric rank level (lower = more specific)
    pub fn level(&self) -> f64 {
        match self {
            Self::Kingdom => 70.0,
            Self::Phylum => 60.0,
            Self::Subphylum => 57.0,
            Self::Superclass => 53.0,
            Self::Class => 50.0,
            Self::Subclass => 47.0,
            Self::Superorder => 43.0,
            Self::Order => 40.0,
            Self::Suborder => 37.0,
            Self::Infraorder => 35.0,
            Self::Superfamily => 33.0,
            Self::Family => 30.0,
            Self::Subfamily => 27.0,
            Self::Tribe => 25.0,
            Self::Subtribe => 24.0,
            Self::Genus => 20.0,
            Self::Species => 10.0,
            Self::Hybrid => 10.0,
            Self::Subspecies => 5.0,
            Self::Variety => 5.0,
            Self::Form => 5.0,
            Self::Other => 100.0,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Rank {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// unknown rank strings map to Other rather than failing deserialization
impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Rank::parse(&s))
    }
}

/// A taxon with the detail needed for scoring: rank, rank level, and the
/// ancestor chain in root-to-immediate-parent order. Entries inside
/// `ancestors` carry an empty ancestor list of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonDetail {
    pub id: TaxonId,
    #[serde(default)]
    pub name: String,
    pub rank: Rank,
    pub rank_level: f64,
    #[serde(default)]
    pub ancestors: Vec<TaxonDetail>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl TaxonDetail {
    /// Ancestor ids in root-to-parent order
    pub fn ancestor_ids(&self) -> Vec<TaxonId> {
        self.ancestors.iter().map(|a| a.id).collect()
    }

    /// A copy of this taxon with the ancestor chain stripped
    pub fn without_ancestors(&self) -> TaxonDetail {
        TaxonDetail {
            id: self.id,
            name: self.name.clone(),
            rank: self.rank,
            rank_level: self.rank_level,
            ancestors: Vec::new(),
            is_active: self.is_active,
        }
    }
}

/// One taxon's ancestry as stored upstream: the ordered ancestor chain,
/// root first, never including the taxon itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestryRecord {
    pub taxon_id: TaxonId,
    pub ancestor_ids: Vec<TaxonId>,
}

impl AncestryRecord {
    pub fn new(taxon_id: TaxonId, ancestor_ids: Vec<TaxonId>) -> Self {
        Self {
            taxon_id,
            ancestor_ids,
        }
    }

    /// Parse a `/`-delimited ancestry string ("48460/1/2/355675") as stored
    /// in the upstream taxa table. Non-numeric segments are skipped, and the
    /// taxon's own id is dropped if the source included it.
    pub fn from_delimited(taxon_id: TaxonId, ancestry: &str) -> Self {
        let ancestor_ids = ancestry
            .split('/')
            .filter_map(|part| part.trim().parse::<u32>().ok())
            .map(TaxonId)
            .filter(|id| *id != taxon_id)
            .collect();
        Self {
            taxon_id,
            ancestor_ids,
        }
    }
}
