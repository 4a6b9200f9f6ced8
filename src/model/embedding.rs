/// Per-residue embedding vectors stored in the word2vec text format:
///
/// ```text
/// 3 4
/// A 0.12 -0.40 0.08 1.10
/// C 0.90 0.11 -0.22 0.05
/// G -0.31 0.77 0.54 -0.60
/// ```
use super::ResidueVocabulary;
use crate::{BgcError, Result};
use std::collections::HashMap;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct ResidueEmbedding {
    dimension: usize,
    vectors: HashMap<u8, Vec<f32>>,
}

impl ResidueEmbedding {
    pub fn new(dimension: usize, entries: Vec<(u8, Vec<f32>)>) -> Result<Self> {
        if dimension == 0 {
            return Err(BgcError::Model("embedding dimension must be positive".to_string()));
        }

        let mut vectors = HashMap::with_capacity(entries.len());
        for (residue, vector) in entries {
            if vector.len() != dimension {
                return Err(BgcError::Model(format!(
                    "vector for '{}' has {} values, expected {}",
                    residue as char,
                    vector.len(),
                    dimension
                )));
            }
            vectors.insert(residue, vector);
        }

        Ok(Self { dimension, vectors })
    }

    /// Parse the word2vec text format. Tokens longer than one character can
    /// never match a residue and are dropped.
    pub fn from_word2vec_text(text: &str, artifact: &str) -> Result<Self> {
        let fail = |message: String| BgcError::model_load(artifact, message);
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let header = lines.next().ok_or_else(|| fail("empty embedding file".to_string()))?;
        let mut fields = header.split_whitespace();
        let (count, dimension) = match (fields.next(), fields.next(), fields.next()) {
            (Some(count), Some(dim), None) => {
                let count: usize = count.parse().map_err(|_| fail(format!("bad vocabulary size '{}'", count)))?;
                let dim: usize = dim.parse().map_err(|_| fail(format!("bad dimension '{}'", dim)))?;
                (count, dim)
            }
            _ => return Err(fail(format!("expected '<count> <dimension>' header, found '{}'", header))),
        };

        let mut entries = Vec::with_capacity(count);
        let mut seen = 0;
        for line in lines {
            seen += 1;
            let mut fields = line.split_whitespace();
            let token = fields.next().unwrap_or_default();
            let vector = fields
                .map(|v| v.parse::<f32>())
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| fail(format!("token '{}': {}", token, e)))?;

            if vector.len() != dimension {
                return Err(fail(format!(
                    "token '{}' has {} values, expected {}",
                    token,
                    vector.len(),
                    dimension
                )));
            }

            match token.as_bytes() {
                [residue] => entries.push((*residue, vector)),
                _ => tracing::debug!("Ignoring multi-character embedding token '{}'", token),
            }
        }

        if seen != count {
            return Err(fail(format!("header announces {} tokens, file has {}", count, seen)));
        }
        if entries.is_empty() {
            return Err(fail("no single-residue tokens in vocabulary".to_string()));
        }

        Self::new(dimension, entries).map_err(|e| fail(e.to_string()))
    }

    /// Serialise back to the word2vec text format, tokens in byte order
    pub fn to_word2vec_text(&self) -> String {
        let mut residues: Vec<_> = self.vectors.keys().copied().collect();
        residues.sort_unstable();

        let mut out = String::new();
        let _ = writeln!(out, "{} {}", residues.len(), self.dimension);
        for residue in residues {
            out.push(residue as char);
            for value in &self.vectors[&residue] {
                let _ = write!(out, " {}", value);
            }
            out.push('\n');
        }
        out
    }
}

impl ResidueVocabulary for ResidueEmbedding {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector(&self, residue: u8) -> Option<&[f32]> {
        self.vectors.get(&residue).map(Vec::as_slice)
    }

    fn vocabulary_size(&self) -> usize {
        self.vectors.len()
    }
}
