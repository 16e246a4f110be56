//! What the board renderer needs to draw a position.

use crate::variant::VariantInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub variant: String,
    pub position: String,
    /// Highlighted move token, if any move has been played.
    pub last_move: Option<String>,
    /// Draw the board from black's side.
    pub upside_down: bool,
    /// Rotate piece sprites as well (only for variants that ask for it).
    pub flip_pieces: bool,
    pub info: VariantInfo,
}
