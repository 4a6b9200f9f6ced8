/// GenBank flat-file parsing, limited to what protein extraction needs:
/// the LOCUS name and the FEATURES table of every record.
use crate::bio::sequence::{normalize_residues, Sequence};
use crate::BgcError;
use nom::{
    bytes::complete::{tag, take_till1},
    character::complete::{space0, space1},
    combinator::{opt, rest},
    sequence::{pair, preceded},
    IResult,
};
use std::io::Read;
use std::path::Path;

const FEATURE_INDENT: &str = "     ";

#[derive(Debug, Clone, PartialEq)]
pub struct GenBankRecord {
    pub name: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub kind: String,
    pub location: String,
    pub qualifiers: Vec<(String, Option<String>)>,
}

impl Feature {
    fn new(kind: &str, location: &str) -> Self {
        Self {
            kind: kind.to_string(),
            location: location.trim().to_string(),
            qualifiers: Vec::new(),
        }
    }

    /// First value of the named qualifier
    pub fn qualifier(&self, name: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_deref())
    }
}

fn locus_line(input: &str) -> IResult<&str, &str> {
    preceded(pair(tag("LOCUS"), space1), take_till1(|c: char| c.is_whitespace()))(input)
}

/// `     CDS             complement(12..2000)`
fn feature_line(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        tag(FEATURE_INDENT),
        pair(take_till1(|c: char| c.is_whitespace()), preceded(space1, rest)),
    )(input)
}

/// `/translation="MKV...` or `/pseudo`
fn qualifier_line(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    preceded(
        pair(space0, tag("/")),
        pair(
            take_till1(|c: char| c == '=' || c.is_whitespace()),
            opt(preceded(tag("="), rest)),
        ),
    )(input)
}

/// A qualifier whose value is still being collected across lines
struct PendingQualifier {
    name: String,
    parts: Vec<String>,
    quoted: bool,
    closed: bool,
}

impl PendingQualifier {
    fn start(name: &str, value: Option<&str>) -> Self {
        let mut pending = Self {
            name: name.to_string(),
            parts: Vec::new(),
            quoted: false,
            closed: true,
        };
        if let Some(value) = value {
            if let Some(stripped) = value.strip_prefix('"') {
                pending.quoted = true;
                pending.closed = false;
                pending.push(stripped);
            } else {
                pending.parts.push(value.trim().to_string());
            }
        }
        pending
    }

    fn push(&mut self, text: &str) {
        let text = text.trim();
        // Inside a quoted value, quotes are escaped by doubling; an odd count
        // on a line means the closing quote is present.
        if self.quoted && text.matches('"').count() % 2 == 1 {
            self.closed = true;
            self.parts.push(text.strip_suffix('"').unwrap_or(text).to_string());
        } else {
            self.parts.push(text.to_string());
        }
    }

    fn is_open(&self) -> bool {
        self.quoted && !self.closed
    }

    fn finish(self) -> (String, Option<String>) {
        if self.parts.is_empty() {
            return (self.name, None);
        }
        let joined = if self.name == "translation" {
            self.parts.concat().split_whitespace().collect::<String>()
        } else {
            self.parts.join(" ")
        };
        let value = if self.quoted { joined.replace("\"\"", "\"") } else { joined };
        (self.name, Some(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Outside,
    Header,
    Features,
    Trailer,
}

struct RecordBuilder {
    name: String,
    features: Vec<Feature>,
    current: Option<Feature>,
    pending: Option<PendingQualifier>,
}

impl RecordBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            features: Vec::new(),
            current: None,
            pending: None,
        }
    }

    fn flush_qualifier(&mut self) {
        if let (Some(pending), Some(feature)) = (self.pending.take(), self.current.as_mut()) {
            feature.qualifiers.push(pending.finish());
        }
    }

    fn flush_feature(&mut self) {
        self.flush_qualifier();
        if let Some(feature) = self.current.take() {
            self.features.push(feature);
        }
    }

    fn finish(mut self) -> GenBankRecord {
        self.flush_feature();
        GenBankRecord {
            name: self.name,
            features: self.features,
        }
    }
}

/// Parse every record of a GenBank file
pub fn parse_genbank<P: AsRef<Path>>(path: P) -> Result<Vec<GenBankRecord>, BgcError> {
    let path = path.as_ref();
    let mut file = super::open_input(path)?;
    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|e| BgcError::parse(path.display().to_string(), e.to_string()))?;
    parse_genbank_str(&text, &path.display().to_string())
}

/// Parse GenBank text. The first malformed line aborts the parse.
pub fn parse_genbank_str(text: &str, origin: &str) -> Result<Vec<GenBankRecord>, BgcError> {
    let mut records = Vec::new();
    let mut section = Section::Outside;
    let mut builder: Option<RecordBuilder> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        let line_no = index + 1;
        let fail = |message: String| BgcError::parse(origin, format!("line {}: {}", line_no, message));

        if section == Section::Outside {
            if line.trim().is_empty() {
                continue;
            }
            let (_, name) = locus_line(line).map_err(|_| fail("expected a LOCUS line".to_string()))?;
            builder = Some(RecordBuilder::new(name));
            section = Section::Header;
            continue;
        }

        let Some(record) = builder.as_mut() else {
            return Err(fail("record state lost".to_string()));
        };

        if line.trim_end() == "//" {
            if record.pending.as_ref().is_some_and(PendingQualifier::is_open) {
                return Err(fail("unterminated quoted qualifier before '//'".to_string()));
            }
            if let Some(done) = builder.take() {
                records.push(done.finish());
            }
            section = Section::Outside;
            continue;
        }

        match section {
            Section::Header => {
                if line.starts_with("FEATURES") {
                    section = Section::Features;
                }
            }
            Section::Features => {
                if let Some(pending) = record.pending.as_mut().filter(|p| p.is_open()) {
                    pending.push(line);
                    continue;
                }

                if line.trim().is_empty() {
                    continue;
                }

                if !line.starts_with(' ') {
                    record.flush_feature();
                    section = Section::Trailer;
                    continue;
                }

                let starts_feature = line.starts_with(FEATURE_INDENT)
                    && line[FEATURE_INDENT.len()..].starts_with(|c: char| !c.is_whitespace());
                if starts_feature {
                    let (_, (kind, location)) = feature_line(line)
                        .map_err(|_| fail(format!("feature without a location: '{}'", line.trim())))?;
                    record.flush_feature();
                    record.current = Some(Feature::new(kind, location));
                    continue;
                }

                if record.current.is_none() {
                    return Err(fail("qualifier outside of a feature".to_string()));
                }

                if let Ok((_, (name, value))) = qualifier_line(line) {
                    record.flush_qualifier();
                    record.pending = Some(PendingQualifier::start(name, value));
                } else if let Some(pending) = record.pending.as_mut() {
                    pending.push(line);
                } else if let Some(feature) = record.current.as_mut() {
                    // Wrapped location
                    feature.location.push_str(line.trim());
                }
            }
            Section::Trailer | Section::Outside => {}
        }
    }

    if let Some(open) = builder {
        return Err(BgcError::parse(
            origin,
            format!("record '{}' is not terminated by '//'", open.name),
        ));
    }

    tracing::debug!("Parsed {} GenBank records from {}", records.len(), origin);
    Ok(records)
}

/// Protein sequences of every CDS feature carrying a translation, in record
/// and feature order.
pub fn cds_translations(records: &[GenBankRecord]) -> Vec<Sequence> {
    let mut sequences = Vec::new();

    for record in records {
        let mut cds_index = 0;
        for feature in record.features.iter().filter(|f| f.kind == "CDS") {
            cds_index += 1;
            let Some(translation) = feature.qualifier("translation") else {
                continue;
            };

            let id = ["locus_tag", "protein_id", "gene"]
                .iter()
                .find_map(|key| feature.qualifier(key))
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}_cds{}", record.name, cds_index));

            let mut seq = Sequence::new(id, normalize_residues(translation.as_bytes()));
            if let Some(product) = feature.qualifier("product") {
                seq = seq.with_description(product.to_string());
            }
            sequences.push(seq);
        }
    }

    sequences
}
