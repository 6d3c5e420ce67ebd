//! Element datatypes and the registry that decides which ones can be converted.

use std::collections::HashMap;
use std::fmt;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Element kind declared by a source container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DatatypeTag {
    Uint8,
    Sint8,
    Uint16,
    Sint16,
    Uint32,
    Sint32,
    Real32,
    Real64,
    Complex32,
    Complex64,
    /// Anything the source declared that maps to none of the above,
    /// kept verbatim for diagnostics.
    Unrecognized(String),
}

impl DatatypeTag {
    /// Bytes one element of this kind occupies on disk, if the kind is known.
    ///
    /// This is a property of the source representation only. Whether the
    /// pipeline can convert the kind is decided by [`DatatypeRegistry`].
    pub fn storage_size(&self) -> Option<usize> {
        match self {
            DatatypeTag::Uint8 | DatatypeTag::Sint8 => Some(1),
            DatatypeTag::Uint16 | DatatypeTag::Sint16 => Some(2),
            DatatypeTag::Uint32 | DatatypeTag::Sint32 | DatatypeTag::Real32 => Some(4),
            DatatypeTag::Real64 | DatatypeTag::Complex32 => Some(8),
            DatatypeTag::Complex64 => Some(16),
            DatatypeTag::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for DatatypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatatypeTag::Uint8 => f.write_str("uint8"),
            DatatypeTag::Sint8 => f.write_str("sint8"),
            DatatypeTag::Uint16 => f.write_str("uint16"),
            DatatypeTag::Sint16 => f.write_str("sint16"),
            DatatypeTag::Uint32 => f.write_str("uint32"),
            DatatypeTag::Sint32 => f.write_str("sint32"),
            DatatypeTag::Real32 => f.write_str("real32"),
            DatatypeTag::Real64 => f.write_str("real64"),
            DatatypeTag::Complex32 => f.write_str("complex32"),
            DatatypeTag::Complex64 => f.write_str("complex64"),
            DatatypeTag::Unrecognized(raw) => write!(f, "unrecognized ({})", raw),
        }
    }
}

/// Sample encodings the destination writers know how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Unsigned 16-bit integers, little-endian in memory.
    Unsigned16,
}

/// What the pipeline needs to know about a supported element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementKind {
    /// Size of one element in bytes
    pub size: usize,
    /// Encoding handed to the destination writer
    pub format: SampleFormat,
}

/// Table of datatypes the pipeline can convert.
///
/// The transformer only ever sees the element size, so supporting another
/// kind means registering it here and teaching the writers its
/// [`SampleFormat`].
#[derive(Debug, Clone)]
pub struct DatatypeRegistry {
    kinds: HashMap<DatatypeTag, ElementKind>,
}

impl DatatypeRegistry {
    /// An empty registry; every tag is unsupported.
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Registry with the kinds shipped by default (unsigned 16-bit only).
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(
            DatatypeTag::Uint16,
            ElementKind {
                size: 2,
                format: SampleFormat::Unsigned16,
            },
        );
        registry
    }

    /// Adds or replaces the mapping for `tag`.
    pub fn register(&mut self, tag: DatatypeTag, kind: ElementKind) {
        self.kinds.insert(tag, kind);
    }

    pub fn is_supported(&self, tag: &DatatypeTag) -> bool {
        self.kinds.contains_key(tag)
    }

    pub fn element_kind(&self, tag: &DatatypeTag) -> Result<ElementKind> {
        self.kinds
            .get(tag)
            .copied()
            .ok_or_else(|| ConversionError::UnsupportedTypeError(tag.clone()))
    }

    pub fn element_size(&self, tag: &DatatypeTag) -> Result<usize> {
        self.element_kind(tag).map(|kind| kind.size)
    }
}

impl Default for DatatypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
