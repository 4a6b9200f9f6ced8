use crate::bio::sequence::Sequence;
use crate::BgcError;
use flate2::read::GzDecoder;
use memmap2::Mmap;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, not_line_ending},
    combinator::{eof, map, opt},
    sequence::preceded,
    IResult,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Parse a FASTA header line
fn parse_header(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = map(
        take_till(|c: u8| c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'),
        |s| std::str::from_utf8(s).unwrap_or(""),
    )(input)?;
    let (input, description) = opt(preceded(
        alt((tag(b" "), tag(b"\t"))),
        map(not_line_ending, |s| std::str::from_utf8(s).unwrap_or("")),
    ))(input)?;
    let (input, _) = alt((line_ending, eof))(input)?;
    Ok((input, (id, description)))
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) = take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;
        // A lone '\r' is not a line ending for nom; step over it so the loop advances
        let rest = match rest.first() {
            Some(b'\r') => &rest[1..],
            _ => rest,
        };

        for &c in line {
            if !c.is_ascii_whitespace() {
                sequence.push(c.to_ascii_uppercase());
            }
        }

        remaining = rest;
    }

    Ok((remaining, sequence))
}

/// Parse a single FASTA record
fn parse_record(input: &[u8]) -> IResult<&[u8], Sequence> {
    let (input, (id, description)) = parse_header(input)?;
    let (input, sequence) = parse_sequence(input)?;

    let mut seq = Sequence::new(id.to_string(), sequence);
    if let Some(desc) = description {
        let desc = desc.trim();
        if !desc.is_empty() {
            seq = seq.with_description(desc.to_string());
        }
    }

    Ok((input, seq))
}

/// Parse FASTA from bytes
pub fn parse_fasta_from_bytes(data: &[u8]) -> Result<Vec<Sequence>, BgcError> {
    parse_fasta_buffer(data, "<memory>")
}

/// Parse a FASTA file into sequences (supports .gz compression)
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>, BgcError> {
    let path = path.as_ref();

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        parse_fasta_gzip(path)
    } else {
        parse_fasta_uncompressed(path)
    }
}

/// Parse an uncompressed FASTA file
fn parse_fasta_uncompressed(path: &Path) -> Result<Vec<Sequence>, BgcError> {
    let file = super::open_input(path)?;
    let origin = path.display().to_string();

    // Mapping an empty file fails on some platforms
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    let mmap = unsafe { Mmap::map(&file)? };

    parse_fasta_buffer(&mmap[..], &origin)
}

/// Parse a gzipped FASTA file
fn parse_fasta_gzip(path: &Path) -> Result<Vec<Sequence>, BgcError> {
    let file = super::open_input(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut buffer = Vec::new();
    decoder
        .read_to_end(&mut buffer)
        .map_err(|e| BgcError::parse(path.display().to_string(), format!("invalid gzip stream: {}", e)))?;

    parse_fasta_buffer(&buffer, &path.display().to_string())
}

/// Parse FASTA from a byte buffer. Records are returned in file order; any
/// non-blank content ahead of a header aborts the whole parse.
fn parse_fasta_buffer(buffer: &[u8], origin: &str) -> Result<Vec<Sequence>, BgcError> {
    let mut input = buffer;
    let mut sequences = Vec::new();

    loop {
        while !input.is_empty() && input[0].is_ascii_whitespace() {
            input = &input[1..];
        }

        if input.is_empty() {
            break;
        }

        if input[0] != b'>' {
            let offset = buffer.len() - input.len();
            return Err(BgcError::parse(
                origin,
                format!(
                    "expected '>' at byte {} (record {}), found {:?}",
                    offset,
                    sequences.len() + 1,
                    input[0] as char
                ),
            ));
        }

        match parse_record(input) {
            Ok((remaining, seq)) => {
                sequences.push(seq);
                input = remaining;
            }
            Err(e) => {
                return Err(BgcError::parse(
                    origin,
                    format!("failed to parse record {}: {:?}", sequences.len() + 1, e),
                ));
            }
        }
    }

    tracing::debug!("Parsed {} FASTA records from {}", sequences.len(), origin);
    Ok(sequences)
}

/// Write sequences to a FASTA file (supports .gz compression)
pub fn write_fasta<P: AsRef<Path>>(path: P, sequences: &[Sequence]) -> Result<(), BgcError> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let path = path.as_ref();
    let file = File::create(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = BufWriter::new(encoder);
        write_fasta_to_writer(&mut writer, sequences)?;
        writer.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_fasta_to_writer(&mut writer, sequences)?;
        writer.flush()?;
    }

    Ok(())
}

/// Write sequences to any writer
pub fn write_fasta_to_writer<W: Write>(writer: &mut W, sequences: &[Sequence]) -> Result<(), BgcError> {
    for seq in sequences {
        writeln!(writer, "{}", seq.header())?;

        // Write sequence in 80-character lines
        for chunk in seq.sequence.chunks(80) {
            writeln!(writer, "{}", String::from_utf8_lossy(chunk))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let input = b">BGC0000001.1_cds3 polyketide synthase\nMKV";
        let (remaining, (id, desc)) = parse_header(input).unwrap();
        assert_eq!(id, "BGC0000001.1_cds3");
        assert_eq!(desc, Some("polyketide synthase"));
        assert_eq!(remaining, b"MKV");
    }

    #[test]
    fn test_header_at_end_of_input() {
        let (remaining, (id, desc)) = parse_header(b">lonely").unwrap();
        assert_eq!(id, "lonely");
        assert_eq!(desc, None);
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_records_keep_file_order() {
        let data = b">A first\nMKV\nLAQ\n>B\nGGG\n\n>C\r\nWWW\r\n";
        let seqs = parse_fasta_from_bytes(data).unwrap();
        let ids: Vec<_> = seqs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(seqs[0].sequence, b"MKVLAQ");
        assert_eq!(seqs[2].sequence, b"WWW");
    }

    #[test]
    fn test_empty_record_is_kept() {
        let seqs = parse_fasta_from_bytes(b">empty\n>full\nMK\n").unwrap();
        assert_eq!(seqs.len(), 2);
        assert!(seqs[0].is_empty());
    }

    #[test]
    fn test_leading_garbage_is_error() {
        let err = parse_fasta_from_bytes(b"MKV\n>A\nMK\n").unwrap_err();
        assert!(matches!(err, BgcError::Parse { .. }));
    }

    #[test]
    fn test_lowercase_is_uppercased() {
        let seqs = parse_fasta_from_bytes(b">a\nmkv\n").unwrap();
        assert_eq!(seqs[0].sequence, b"MKV");
    }

    #[test]
    fn test_write_then_read_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fasta.gz");
        let seqs = vec![Sequence::new("x".to_string(), vec![b'A'; 170])];
        write_fasta(&path, &seqs).unwrap();
        let back = parse_fasta(&path).unwrap();
        assert_eq!(back, seqs);
    }
}
