//! patchfit-export: Pure format serializers (sans-IO)
//!
//! Converts a patchfit scene into vector output. Currently supports SVG.

pub mod svg;

pub use svg::{SvgMetadata, to_svg};
