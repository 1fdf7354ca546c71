//! Closed vocabulary of element and attribute names.
//!
//! Element local names are interned once into [`Tag`] handles so every
//! dispatch in the tree compares enum values rather than strings.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use quick_xml::name::ResolveResult;

/// ONVIF schema namespace. Not configurable.
pub const SCHEMA_NAMESPACE: &str = "http://www.onvif.org/ver10/schema";
pub const SCHEMA_PREFIX: &str = "tt";

/// Namespace of an element as seen by the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// The ONVIF schema namespace.
    Schema,
    /// No namespace; used for vendor extension content.
    None,
    /// Anything else, including undeclared prefixes.
    Foreign,
}

impl Namespace {
    pub(crate) fn classify(resolved: &ResolveResult<'_>) -> Self {
        match resolved {
            ResolveResult::Bound(ns) if ns.as_ref() == SCHEMA_NAMESPACE.as_bytes() => {
                Namespace::Schema
            }
            ResolveResult::Bound(ns) if ns.as_ref().is_empty() => Namespace::None,
            ResolveResult::Unbound => Namespace::None,
            _ => Namespace::Foreign,
        }
    }
}

macro_rules! tags {
    (
        schema { $($schema:ident => $schema_name:literal),* $(,)? }
        extension { $($ext:ident => $ext_name:literal),* $(,)? }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Tag {
            $($schema,)*
            $($ext,)*
        }

        impl Tag {
            pub const ALL: &'static [Tag] = &[$(Tag::$schema,)* $(Tag::$ext,)*];

            pub fn local_name(self) -> &'static str {
                match self {
                    $(Tag::$schema => $schema_name,)*
                    $(Tag::$ext => $ext_name,)*
                }
            }

            /// Name as written: schema elements carry the `tt` prefix,
            /// extension content is unqualified.
            pub fn qualified_name(self) -> &'static str {
                match self {
                    $(Tag::$schema => concat!("tt:", $schema_name),)*
                    $(Tag::$ext => $ext_name,)*
                }
            }
        }
    };
}

tags! {
    schema {
        MetadataStream => "MetadataStream",
        VideoAnalytics => "VideoAnalytics",
        Frame => "Frame",
        Object => "Object",
        Appearance => "Appearance",
        Transformation => "Transformation",
        Translate => "Translate",
        Scale => "Scale",
        Shape => "Shape",
        BoundingBox => "BoundingBox",
        CenterOfGravity => "CenterOfGravity",
        Class => "Class",
        ClassCandidate => "ClassCandidate",
        Type => "Type",
        Likelihood => "Likelihood",
        Behaviour => "Behaviour",
        Removed => "Removed",
        Idle => "Idle",
        Extension => "Extension",
    }
    extension {
        Description => "Description",
        FillColor => "FillColor",
        LineColor => "LineColor",
        LineThickness => "LineThickness",
        OriginalData => "OriginalData",
        NavigationalData => "NavigationalData",
        Altitude => "Altitude",
        Azimuth => "Azimuth",
        Latitude => "Latitude",
        Longitude => "Longitude",
        HorizontalAccuracy => "HorizontalAccuracy",
        VerticalAccuracy => "VerticalAccuracy",
        Speed => "Speed",
        GeodeticSystem => "GeodeticSystem",
    }
}

static SYMBOLS: Lazy<HashMap<&'static [u8], Tag>> = Lazy::new(|| {
    Tag::ALL
        .iter()
        .map(|tag| (tag.local_name().as_bytes(), *tag))
        .collect()
});

impl Tag {
    /// Interns a local name; unknown names have no handle.
    pub fn from_local(name: &[u8]) -> Option<Tag> {
        SYMBOLS.get(name).copied()
    }
}

/// Attribute names. Attributes are always unqualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    UtcTime,
    ObjectId,
    X,
    Y,
    Left,
    Top,
    Right,
    Bottom,
    CenterX,
    CenterY,
    Bold,
    Italic,
    FontFamily,
    Size,
    Color,
    Version,
}

impl Attr {
    pub fn name(self) -> &'static str {
        match self {
            Attr::UtcTime => "UtcTime",
            Attr::ObjectId => "ObjectId",
            Attr::X => "x",
            Attr::Y => "y",
            Attr::Left => "left",
            Attr::Top => "top",
            Attr::Right => "right",
            Attr::Bottom => "bottom",
            Attr::CenterX => "CenterX",
            Attr::CenterY => "CenterY",
            Attr::Bold => "Bold",
            Attr::Italic => "Italic",
            Attr::FontFamily => "FontFamily",
            Attr::Size => "Size",
            Attr::Color => "Color",
            Attr::Version => "Version",
        }
    }
}
