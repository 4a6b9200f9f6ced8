use serde::{Deserialize, Serialize};

/// A protein sequence pulled out of one of the supported input sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub description: Option<String>,
    pub sequence: Vec<u8>,
}

impl Sequence {
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            sequence,
        }
    }

    /// Build a sequence from free text, dropping whitespace and upper-casing residues.
    pub fn from_residues(id: impl Into<String>, residues: &str) -> Self {
        Self::new(id.into(), normalize_residues(residues.as_bytes()))
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn residues(&self) -> &[u8] {
        &self.sequence
    }

    pub fn to_string(&self) -> String {
        String::from_utf8_lossy(&self.sequence).to_string()
    }

    pub fn header(&self) -> String {
        let mut header = format!(">{}", self.id);

        if let Some(desc) = &self.description {
            header.push(' ');
            header.push_str(desc);
        }

        header
    }
}

/// Strip whitespace and upper-case every residue. Vocabulary lookups are
/// exact, so this widens what classifies: lowercase input is embedded like
/// its upper-case form instead of being dropped as out of vocabulary.
pub fn normalize_residues(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
