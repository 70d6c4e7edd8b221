use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for the TMX map loader.
///
/// Loading is all-or-nothing: any of these aborts the load and no partial
/// map is returned. Rendering and queries never produce errors.
#[derive(Debug)]
pub enum MapError {
    /// The map document (or a referenced resource) could not be opened
    Io {
        /// Path of the file that failed to open
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The document is not well-formed XML
    Xml {
        /// Path of the offending document, if it came from a file
        path: Option<PathBuf>,
        /// Underlying XML error
        source: roxmltree::Error,
    },
    /// The root element of the document is not `<map>`
    NotATmxMap(String),
    /// A layer's tile count does not match width * height
    InvalidLayerSize {
        /// Name of the offending layer
        layer: String,
        /// width * height of the layer
        expected: usize,
        /// Number of tile tokens actually found in `<data>`
        actual: usize,
    },
}

impl From<roxmltree::Error> for MapError {
    fn from(source: roxmltree::Error) -> Self {
        MapError::Xml { path: None, source }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            MapError::Xml { path: Some(path), source } => {
                write!(f, "XML parse error in {}: {}", path.display(), source)
            }
            MapError::Xml { path: None, source } => {
                write!(f, "XML parse error: {}", source)
            }
            MapError::NotATmxMap(tag) => {
                write!(f, "Expected <map> root element, found <{}>", tag)
            }
            MapError::InvalidLayerSize { layer, expected, actual } => {
                write!(
                    f,
                    "Invalid layer size for layer '{}': expected {} tiles, found {}",
                    layer, expected, actual
                )
            }
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Io { source, .. } => Some(source),
            MapError::Xml { source, .. } => Some(source),
            _ => None,
        }
    }
}
