//! Running bounds of visited boxes

use crate::tree::BoundingBox;

/// Minimal rectangle enclosing every box added so far.
///
/// Starts inverted (left/top at +inf, right/bottom at -inf) and only grows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        left: f64::INFINITY,
        right: f64::NEG_INFINITY,
        top: f64::INFINITY,
        bottom: f64::NEG_INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    pub fn expand(&mut self, rect: &BoundingBox) {
        self.left = self.left.min(rect.x);
        self.right = self.right.max(rect.right());
        self.top = self.top.min(rect.y);
        self.bottom = self.bottom.max(rect.bottom());
    }

    /// A copy widened by `rect`, if any
    pub fn expanded(mut self, rect: Option<&BoundingBox>) -> Self {
        if let Some(rect) = rect {
            self.expand(rect);
        }
        self
    }

    /// Top-left corner, or the origin when nothing has been added
    pub fn origin(&self) -> (f64, f64) {
        if self.is_empty() {
            (0.0, 0.0)
        } else {
            (self.left, self.top)
        }
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.right - self.left
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.bottom - self.top
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bounds_have_no_size() {
        let bounds = Bounds::default();
        assert!(bounds.is_empty());
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.origin(), (0.0, 0.0));
    }

    #[test]
    fn test_expand_is_monotonic() {
        let mut bounds = Bounds::EMPTY;
        bounds.expand(&BoundingBox::new(10.0, 10.0, 20.0, 20.0));
        bounds.expand(&BoundingBox::new(15.0, 0.0, 5.0, 5.0));
        assert_eq!(bounds.origin(), (10.0, 0.0));
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 30.0);
    }

    #[test]
    fn test_expanded_leaves_original_untouched() {
        let parent = Bounds::EMPTY.expanded(Some(&BoundingBox::new(0.0, 0.0, 10.0, 10.0)));
        let child = parent.expanded(Some(&BoundingBox::new(5.0, 5.0, 20.0, 20.0)));
        assert_eq!(parent.width(), 10.0);
        assert_eq!(child.width(), 25.0);
        assert_eq!(parent.expanded(None), parent);
    }
}
