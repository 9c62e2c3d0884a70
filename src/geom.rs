use glam::Vec2;

/// Axis-aligned rectangle in viewport space (top-left origin, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Overlap on both axes. Shared edges count as touching, so a treat
    /// sitting exactly against the pet is still eaten.
    pub fn intersects(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x <= b_max.x
            && other.min.x <= a_max.x
            && self.min.y <= b_max.y
            && other.min.y <= a_max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn overlapping_rects_intersect() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_count_as_intersecting() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&rect(10.0, 0.0, 4.0, 4.0)));
        assert!(a.intersects(&rect(0.0, 10.0, 4.0, 4.0)));
    }

    #[test]
    fn separated_on_one_axis_is_enough_to_miss() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&rect(10.5, 0.0, 4.0, 4.0)));
        assert!(!a.intersects(&rect(0.0, -5.0, 4.0, 4.5)));
    }

    #[test]
    fn contained_rect_intersects() {
        let outer = rect(0.0, 0.0, 100.0, 40.0);
        let inner = rect(20.0, 10.0, 5.0, 5.0);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }
}
