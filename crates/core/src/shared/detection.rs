/// A detected face region in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Shrink the box inward by `margin` of its width/height on each side.
    ///
    /// Trimming the border keeps background context out of the embedding.
    pub fn shrink(&self, margin: f64) -> BoundingBox {
        let dx = (self.width as f64 * margin) as i32;
        let dy = (self.height as f64 * margin) as i32;
        BoundingBox {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width - 2 * dx,
            height: self.height - 2 * dy,
        }
    }

    /// Clamp the box to `[0, frame_width) x [0, frame_height)`.
    pub fn clamp(&self, frame_width: u32, frame_height: u32) -> BoundingBox {
        let x1 = self.x.clamp(0, frame_width as i32);
        let y1 = self.y.clamp(0, frame_height as i32);
        let x2 = (self.x + self.width).clamp(0, frame_width as i32);
        let y2 = (self.y + self.height).clamp(0, frame_height as i32);
        BoundingBox {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }
}

/// Identity assigned to a detection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Label {
    Known(String),
    Unknown,
}

impl Label {
    pub fn name(&self) -> Option<&str> {
        match self {
            Label::Known(name) => Some(name),
            Label::Unknown => None,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Known(name) => write!(f, "{name}"),
            Label::Unknown => write!(f, "unknown"),
        }
    }
}

/// One located face plus its assigned identity for a single frame.
///
/// The similarity score behind the labeling decision is not retained.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub label: Label,
}

impl Detection {
    pub fn is_known(&self) -> bool {
        matches!(self.label, Label::Known(_))
    }
}
