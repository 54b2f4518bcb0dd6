//! Domain entities: parameter sets that describe a fractal tree

use glam::DVec2;

/// Complete parameter set of a root branch.
///
/// Angles are radians. `num_children` is signed so that out-of-range input from
/// sliders, config files or the command line can be represented and rejected by
/// construction instead of wrapping silently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Origin of the root branch
    pub start: DVec2,
    /// Length of the root branch
    pub length: f64,
    /// Direction of the root branch
    pub angle: f64,
    /// Branching factor at every node
    pub num_children: i32,
    /// Ratio of a child's length to its parent's length
    pub length_scale: f64,
    /// Angular distance between neighbouring siblings
    pub delta_angle: f64,
    /// Depth of the root branch (usually 0)
    pub depth: usize,
    /// Nodes at this depth are leaves
    pub max_depth: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            start: DVec2::ZERO,
            length: 150.0,
            // screen coordinates grow downwards, so -90° points up
            angle: -std::f64::consts::FRAC_PI_2,
            num_children: 3,
            length_scale: 0.7,
            delta_angle: 35f64.to_radians(),
            depth: 0,
            max_depth: 7,
        }
    }
}

impl TreeParams {
    /// Merge overrides onto self (base).
    ///
    /// Every field the overlay specifies wins, everything else is kept.
    pub fn merge(&self, overlay: &ParamOverrides) -> Self {
        Self {
            start: overlay.start.unwrap_or(self.start),
            length: overlay.length.unwrap_or(self.length),
            angle: overlay.angle.unwrap_or(self.angle),
            num_children: overlay.num_children.unwrap_or(self.num_children),
            length_scale: overlay.length_scale.unwrap_or(self.length_scale),
            delta_angle: overlay.delta_angle.unwrap_or(self.delta_angle),
            depth: overlay.depth.unwrap_or(self.depth),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
        }
    }
}

/// Partial parameter set used to derive a new tree from an existing one.
///
/// `None` means "not specified, inherit from the base".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamOverrides {
    pub start: Option<DVec2>,
    pub length: Option<f64>,
    pub angle: Option<f64>,
    pub num_children: Option<i32>,
    pub length_scale: Option<f64>,
    pub delta_angle: Option<f64>,
    pub depth: Option<usize>,
    pub max_depth: Option<usize>,
}

impl ParamOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Number of nodes in a fully branching tree: `1 + b + b² + … + bᵈ`.
///
/// Saturates at `usize::MAX` instead of overflowing.
pub fn expected_node_count(branching: usize, depth: usize) -> usize {
    let mut total: usize = 1;
    let mut level: usize = 1;
    for _ in 0..depth {
        level = level.saturating_mul(branching);
        total = total.saturating_add(level);
        if branching == 0 {
            break;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_node_count_sums_geometric_series() {
        assert_eq!(expected_node_count(2, 3), 15);
        assert_eq!(expected_node_count(3, 2), 13);
        assert_eq!(expected_node_count(1, 4), 5);
        assert_eq!(expected_node_count(0, 9), 1);
        assert_eq!(expected_node_count(5, 0), 1);
    }

    #[test]
    fn expected_node_count_saturates() {
        assert_eq!(expected_node_count(1 << 20, 8), usize::MAX);
    }

    #[test]
    fn merge_keeps_unspecified_fields() {
        let base = TreeParams::default();
        let merged = base.merge(&ParamOverrides {
            num_children: Some(5),
            ..ParamOverrides::default()
        });
        assert_eq!(merged.num_children, 5);
        assert_eq!(merged.length, base.length);
        assert_eq!(merged.max_depth, base.max_depth);
    }
}
