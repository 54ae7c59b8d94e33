//! Hitboxes: collision rectangles offset from an entity's position.

use platformer_common::{Position, Rect};
use serde::{Deserialize, Serialize};

/// Collision rectangle relative to its owner's top-left corner.
///
/// The offset and size never change after construction. The absolute
/// placement is cached and must be refreshed with [`Hitbox::update_position`]
/// whenever the owner moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hitbox {
    /// Horizontal offset from the owner's position
    offset_x: i32,
    /// Vertical offset from the owner's position
    offset_y: i32,
    /// Width
    width: i32,
    /// Height
    height: i32,
    /// Absolute left edge, as of the last refresh
    #[serde(skip)]
    x: i32,
    /// Absolute top edge, as of the last refresh
    #[serde(skip)]
    y: i32,
}

impl Hitbox {
    /// Creates a hitbox with the given offset and size.
    #[must_use]
    pub const fn new(offset_x: i32, offset_y: i32, width: i32, height: i32) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
            x: offset_x,
            y: offset_y,
        }
    }

    /// Horizontal offset.
    #[must_use]
    pub const fn offset_x(&self) -> i32 {
        self.offset_x
    }

    /// Vertical offset.
    #[must_use]
    pub const fn offset_y(&self) -> i32 {
        self.offset_y
    }

    /// Width.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Recomputes the absolute placement from the owner's position.
    pub fn update_position(&mut self, owner: Position) {
        self.x = owner.x.wrapping_add(self.offset_x);
        self.y = owner.y.wrapping_add(self.offset_y);
    }

    /// Absolute bounds as of the last refresh.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Absolute bounds for an owner standing at `owner`.
    ///
    /// Independent of the cache, so collision checks never see a stale box.
    #[must_use]
    pub const fn bounds_at(&self, owner: Position) -> Rect {
        Rect::new(
            owner.x.wrapping_add(self.offset_x),
            owner.y.wrapping_add(self.offset_y),
            self.width,
            self.height,
        )
    }

    /// Checks whether an absolute point lies inside the hitbox.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        self.bounds().contains_point(x, y)
    }

    /// Checks whether the hitbox overlaps an absolute rectangle.
    #[must_use]
    pub const fn overlaps(&self, other: &Rect) -> bool {
        self.bounds().overlaps(other)
    }
}
