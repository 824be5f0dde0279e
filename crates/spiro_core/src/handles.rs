//! Typed resource handles
//!
//! Every resource a caller creates is addressed by a generational key. A key
//! whose resource has been destroyed simply fails to resolve, which the
//! drawing layer treats as "skip this draw".

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a registered [`Pen`](crate::Pen)
    pub struct PenId;

    /// Handle to a registered [`Path`](crate::Path)
    pub struct PathId;

    /// Handle to a loaded image
    pub struct ImageId;

    /// Handle to a loaded font with its baked glyph atlas
    pub struct FontId;

    /// Handle to a backend texture
    pub struct TextureId;
}
