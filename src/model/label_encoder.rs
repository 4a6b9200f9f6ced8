use crate::{BgcError, Result};
use serde::{Deserialize, Serialize};

/// Bidirectional mapping between class indices and BGC class labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self> {
        let encoder = Self { classes };
        encoder.validate().map_err(BgcError::Model)?;
        Ok(encoder)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.classes.is_empty() {
            return Err("label encoder has no classes".to_string());
        }
        for (i, label) in self.classes.iter().enumerate() {
            if self.classes[..i].contains(label) {
                return Err(format!("duplicate class label '{}'", label));
            }
        }
        Ok(())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn inverse_transform(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| BgcError::Model(format!("class index {} out of range (0..{})", index, self.classes.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_labels() {
        let enc = LabelEncoder::new(vec!["NRPS".into(), "PKS".into(), "Terpene".into()]).unwrap();
        assert_eq!(enc.inverse_transform(1).unwrap(), "PKS");
        assert_eq!(enc.inverse_transform(2).unwrap(), "Terpene");
        assert!(enc.inverse_transform(3).is_err());
    }

    #[test]
    fn test_duplicates_rejected() {
        assert!(LabelEncoder::new(vec!["PKS".into(), "PKS".into()]).is_err());
        assert!(LabelEncoder::new(Vec::new()).is_err());
    }
}
