//! ICS header parsing
//!
//! An ICS header is a text block. Its first two bytes name the field and
//! line separators, and the block ends with a line reading `end`. Version 2
//! files may carry the element data right after that line.

use std::io::BufRead;
use std::path::PathBuf;

use thiserror::Error;

use crate::image_pipeline::layout::DatatypeTag;

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("file is too short to hold an ICS header")]
    MissingSeparators,

    #[error("header has no 'end' line")]
    Truncated,

    #[error("header has no '{0}' entry")]
    Missing(&'static str),

    #[error("invalid '{key}' entry: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcsVersion {
    /// Header in `.ics`, data in the sibling `.ids`
    V1,
    /// Header and data in one `.ics` file, unless `source file` says otherwise
    V2,
}

/// Parsed ICS header
#[derive(Debug, Clone)]
pub struct IcsHeader {
    pub version: IcsVersion,
    /// Axis names, without the leading `bits` entry
    pub order: Vec<String>,
    /// Axis extents, `extents[0]` being the channel axis by convention
    pub extents: Vec<usize>,
    pub bits_per_sample: usize,
    pub datatype: DatatypeTag,
    pub compression: String,
    /// 1-based byte significance per stored byte; empty means little-endian
    pub byte_order: Vec<usize>,
    /// External data file and byte offset from a `source file` entry
    pub source: Option<(PathBuf, u64)>,
    /// Bytes consumed up to and including the `end` line
    pub header_len: u64,
}

#[derive(Default)]
struct RawEntries {
    version: Option<String>,
    parameters: Option<String>,
    order: Option<Vec<String>>,
    sizes: Option<Vec<String>>,
    format: Option<String>,
    sign: Option<String>,
    compression: Option<String>,
    byte_order: Option<Vec<String>>,
    source: Option<Vec<String>>,
}

impl IcsHeader {
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Self, HeaderError> {
        let mut separators = [0u8; 2];
        reader
            .read_exact(&mut separators)
            .map_err(|_| HeaderError::MissingSeparators)?;
        let [field_sep, line_sep] = separators;
        let mut header_len = separators.len() as u64;

        let mut entries = RawEntries::default();
        let mut line = Vec::new();
        let mut ended = false;

        loop {
            line.clear();
            let read = reader.read_until(line_sep, &mut line)?;
            if read == 0 {
                break;
            }
            header_len += read as u64;

            if line.last() == Some(&line_sep) {
                line.pop();
            }
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let text = String::from_utf8_lossy(&line);
            let tokens: Vec<&str> = text
                .split(field_sep as char)
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .collect();

            match tokens.as_slice() {
                [] => continue,
                [end] if end.eq_ignore_ascii_case("end") => {
                    ended = true;
                    break;
                }
                ["ics_version", version, ..] => entries.version = Some(version.to_string()),
                ["layout", "parameters", count, ..] => {
                    entries.parameters = Some(count.to_string())
                }
                ["layout", "order", rest @ ..] => entries.order = Some(owned(rest)),
                ["layout", "sizes", rest @ ..] => entries.sizes = Some(owned(rest)),
                ["representation", "format", format, ..] => {
                    entries.format = Some(format.to_ascii_lowercase())
                }
                ["representation", "sign", sign, ..] => {
                    entries.sign = Some(sign.to_ascii_lowercase())
                }
                ["representation", "compression", compression, ..] => {
                    entries.compression = Some(compression.to_ascii_lowercase())
                }
                ["representation", "byte_order", rest @ ..] => {
                    entries.byte_order = Some(owned(rest))
                }
                ["source", "file", rest @ ..] => entries.source = Some(owned(rest)),
                _ => {}
            }
        }

        if !ended {
            return Err(HeaderError::Truncated);
        }

        Self::from_entries(entries, header_len)
    }

    fn from_entries(entries: RawEntries, header_len: u64) -> Result<Self, HeaderError> {
        let version = match entries.version.as_deref() {
            Some("1.0") => IcsVersion::V1,
            Some("2.0") => IcsVersion::V2,
            Some(other) => {
                return Err(HeaderError::Invalid {
                    key: "ics_version",
                    value: other.to_string(),
                });
            }
            None => return Err(HeaderError::Missing("ics_version")),
        };

        let order = entries.order.ok_or(HeaderError::Missing("layout order"))?;
        let sizes = entries.sizes.ok_or(HeaderError::Missing("layout sizes"))?;
        let sizes = sizes
            .iter()
            .map(|size| size.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| HeaderError::Invalid {
                key: "layout sizes",
                value: sizes.join(" "),
            })?;

        if order.len() != sizes.len() {
            return Err(HeaderError::Invalid {
                key: "layout order",
                value: format!("{} axes named but {} sizes given", order.len(), sizes.len()),
            });
        }
        if let Some(parameters) = entries.parameters {
            if parameters.parse::<usize>().ok() != Some(sizes.len()) {
                return Err(HeaderError::Invalid {
                    key: "layout parameters",
                    value: parameters,
                });
            }
        }

        let Some((first, axes)) = order.split_first() else {
            return Err(HeaderError::Missing("layout order"));
        };
        if !first.eq_ignore_ascii_case("bits") {
            return Err(HeaderError::Invalid {
                key: "layout order",
                value: format!("first entry is '{}', expected 'bits'", first),
            });
        }
        let bits_per_sample = sizes[0];
        if bits_per_sample == 0 {
            return Err(HeaderError::Invalid {
                key: "layout sizes",
                value: "zero bits per sample".to_string(),
            });
        }

        let format = entries.format.unwrap_or_else(|| "integer".to_string());
        let sign = entries.sign.unwrap_or_else(|| "unsigned".to_string());
        let datatype = datatype_for(&format, &sign, bits_per_sample);

        let byte_order = match entries.byte_order {
            Some(raw) => parse_byte_order(&raw)?,
            None => Vec::new(),
        };
        let sample_width = datatype
            .storage_size()
            .unwrap_or_else(|| bits_per_sample.div_ceil(8));
        if !byte_order.is_empty() && byte_order.len() != sample_width {
            return Err(HeaderError::Invalid {
                key: "representation byte_order",
                value: format!(
                    "{} bytes listed for {}-byte samples",
                    byte_order.len(),
                    sample_width
                ),
            });
        }

        let source = match entries.source.as_deref() {
            None => None,
            Some([path]) => Some((PathBuf::from(path), 0)),
            Some([path, offset, ..]) => {
                let offset = offset.parse::<u64>().map_err(|_| HeaderError::Invalid {
                    key: "source file",
                    value: offset.clone(),
                })?;
                Some((PathBuf::from(path), offset))
            }
            Some([]) => {
                return Err(HeaderError::Invalid {
                    key: "source file",
                    value: String::new(),
                });
            }
        };

        Ok(Self {
            version,
            order: axes.to_vec(),
            extents: sizes[1..].to_vec(),
            bits_per_sample,
            datatype,
            compression: entries
                .compression
                .unwrap_or_else(|| "uncompressed".to_string()),
            byte_order,
            source,
            header_len,
        })
    }

    /// Bytes one stored element occupies.
    pub fn bytes_per_sample(&self) -> usize {
        self.datatype
            .storage_size()
            .unwrap_or_else(|| self.bits_per_sample.div_ceil(8))
    }

    /// Total byte size of the element data, `None` on overflow.
    pub fn data_size(&self) -> Option<usize> {
        self.extents
            .iter()
            .try_fold(self.bytes_per_sample(), |acc, &extent| acc.checked_mul(extent))
    }
}

fn owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|token| token.to_string()).collect()
}

fn datatype_for(format: &str, sign: &str, bits: usize) -> DatatypeTag {
    let signed = sign == "signed";
    match (format, signed, bits) {
        ("integer", false, 1..=8) => DatatypeTag::Uint8,
        ("integer", true, 1..=8) => DatatypeTag::Sint8,
        ("integer", false, 9..=16) => DatatypeTag::Uint16,
        ("integer", true, 9..=16) => DatatypeTag::Sint16,
        ("integer", false, 17..=32) => DatatypeTag::Uint32,
        ("integer", true, 17..=32) => DatatypeTag::Sint32,
        ("real", _, 32) => DatatypeTag::Real32,
        ("real", _, 64) => DatatypeTag::Real64,
        ("complex", _, 64) => DatatypeTag::Complex32,
        ("complex", _, 128) => DatatypeTag::Complex64,
        _ => DatatypeTag::Unrecognized(format!("{} {} {}-bit", sign, format, bits)),
    }
}

fn parse_byte_order(raw: &[String]) -> Result<Vec<usize>, HeaderError> {
    let invalid = || HeaderError::Invalid {
        key: "representation byte_order",
        value: raw.join(" "),
    };

    let order = raw
        .iter()
        .map(|entry| entry.parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    let mut seen = vec![false; order.len()];
    for &significance in &order {
        if significance == 0 || significance > order.len() || seen[significance - 1] {
            return Err(invalid());
        }
        seen[significance - 1] = true;
    }
    Ok(order)
}
