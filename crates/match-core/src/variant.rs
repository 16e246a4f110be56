//! Presentation config per variant, passed through to the renderer.

use crate::oracle::VariantFlags;

/// How the renderer should draw the board squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStyle {
    Checkerboard,
    /// Two-tone board with (light, dark) RGB colours.
    Tinted([u8; 3], [u8; 3]),
    /// Variant ships its own board image.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    pub name: &'static str,
    /// Piece image set.
    pub piece_folder: &'static str,
    pub board: BoardStyle,
    /// Rotate piece sprites when the board is shown from black's side.
    pub flip_pieces: bool,
    pub flags: VariantFlags,
}

const CATALOG: &[VariantInfo] = &[
    VariantInfo {
        name: "chess",
        piece_folder: "chess",
        board: BoardStyle::Checkerboard,
        flip_pieces: false,
        flags: VariantFlags { chess960: false },
    },
    VariantInfo {
        name: "crazyhouse",
        piece_folder: "chess",
        board: BoardStyle::Checkerboard,
        flip_pieces: false,
        flags: VariantFlags { chess960: false },
    },
    VariantInfo {
        name: "extinction",
        piece_folder: "chess",
        board: BoardStyle::Checkerboard,
        flip_pieces: false,
        flags: VariantFlags { chess960: false },
    },
    VariantInfo {
        name: "twokings",
        piece_folder: "chess",
        board: BoardStyle::Checkerboard,
        flip_pieces: false,
        flags: VariantFlags { chess960: false },
    },
    VariantInfo {
        name: "racingchess",
        piece_folder: "chess",
        board: BoardStyle::Checkerboard,
        flip_pieces: false,
        flags: VariantFlags { chess960: false },
    },
    VariantInfo {
        name: "pandemonium",
        piece_folder: "pandemonium",
        board: BoardStyle::Tinted([192, 240, 255], [168, 200, 224]),
        flip_pieces: true,
        flags: VariantFlags { chess960: false },
    },
    VariantInfo {
        name: "mounted",
        piece_folder: "mounted",
        board: BoardStyle::Tinted([153, 174, 194], [97, 122, 142]),
        flip_pieces: false,
        flags: VariantFlags { chess960: false },
    },
    VariantInfo {
        name: "chennis",
        piece_folder: "chennis",
        board: BoardStyle::Custom,
        flip_pieces: false,
        flags: VariantFlags { chess960: false },
    },
    VariantInfo {
        name: "chak",
        piece_folder: "chak",
        board: BoardStyle::Custom,
        flip_pieces: false,
        flags: VariantFlags { chess960: false },
    },
];

/// Look up presentation config. Variants the catalog doesn't list render
/// with the plain chess set.
pub fn variant_info(name: &str) -> VariantInfo {
    CATALOG
        .iter()
        .find(|v| v.name == name)
        .cloned()
        .unwrap_or_else(|| CATALOG[0].clone())
}
