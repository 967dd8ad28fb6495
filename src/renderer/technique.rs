// renderer/technique.rs

/// Numeric identifier of a shader technique variant.
pub type TechniqueId = u32;

pub const SHADOWMAP_FIRST: TechniqueId = 0x0000_002B;
pub const SHADOWMAP_LAST: TechniqueId = 0x4000_002B;

pub const DISTANT_TREE_DEPTH: TechniqueId = 0x5C00_0005;

pub const SKY_BASE_PRE: TechniqueId = 0x5C00_0010;
pub const SKY_CLOUDS_FADE: TechniqueId = 0x5C00_0018;

pub const GRASS_DIRONLY_LF: TechniqueId = 0x5C00_0052;
pub const GRASS_SHADOW_L: TechniqueId = 0x5C00_0059;
pub const GRASS_SHADOW_LS: TechniqueId = 0x5C00_005A;
pub const GRASS_SHADOW_LB: TechniqueId = 0x5C00_005B;
/// Also the upper bound of the grass window.
pub const GRASS_SHADOW_LSB: TechniqueId = 0x5C00_005C;

pub const WATER_STENCIL: TechniqueId = 0x5C00_0060;
pub const WATER_DISPLACEMENT_STENCIL_VC: TechniqueId = 0x5C00_0067;

pub const WATER_SSR_BASE: TechniqueId = 0x5C00_0071;
pub const WATER_SSR: TechniqueId = 0x5C00_6071;

/// Highest technique id; `[1, BLOOD_SPLATTER]` selects everything in a group.
pub const BLOOD_SPLATTER: TechniqueId = 0x5C00_7000;

/// Returns true for the four grass shadow variants that the accumulator may
/// suppress.
pub fn is_grass_shadow(technique: TechniqueId) -> bool {
    matches!(
        technique,
        GRASS_SHADOW_L | GRASS_SHADOW_LS | GRASS_SHADOW_LB | GRASS_SHADOW_LSB
    )
}

/// Inclusive window of technique ids. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TechniqueRange {
    start: TechniqueId,
    end: TechniqueId,
}

impl TechniqueRange {
    /// Every technique a group can hold.
    pub const ALL: Self = Self {
        start: 1,
        end: BLOOD_SPLATTER,
    };

    /// Panics when `start > end`; a reversed window is a logic error.
    pub fn new(start: TechniqueId, end: TechniqueId) -> Self {
        assert!(
            start <= end,
            "technique range start {start:#x} is greater than end {end:#x}"
        );
        Self { start, end }
    }

    pub fn try_new(start: TechniqueId, end: TechniqueId) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn single(technique: TechniqueId) -> Self {
        Self {
            start: technique,
            end: technique,
        }
    }

    pub fn start(&self) -> TechniqueId {
        self.start
    }

    pub fn end(&self) -> TechniqueId {
        self.end
    }

    pub fn contains(&self, technique: TechniqueId) -> bool {
        (self.start..=self.end).contains(&technique)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let range = TechniqueRange::new(10, 20);
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.contains(21));
    }

    #[test]
    #[should_panic(expected = "greater than end")]
    fn reversed_range_is_rejected() {
        let _ = TechniqueRange::new(20, 10);
    }

    #[test]
    fn try_new_reports_reversed_range() {
        assert!(TechniqueRange::try_new(5, 4).is_none());
        assert_eq!(
            TechniqueRange::try_new(4, 4),
            Some(TechniqueRange::single(4))
        );
    }

    #[test]
    fn grass_window_covers_the_shadow_variants() {
        let grass = TechniqueRange::new(GRASS_DIRONLY_LF, GRASS_SHADOW_LSB);
        for technique in [GRASS_SHADOW_L, GRASS_SHADOW_LS, GRASS_SHADOW_LB, GRASS_SHADOW_LSB] {
            assert!(grass.contains(technique));
            assert!(is_grass_shadow(technique));
        }
        assert!(!is_grass_shadow(GRASS_DIRONLY_LF));
    }

    #[test]
    fn all_window_spans_every_reserved_id() {
        for technique in [
            SHADOWMAP_FIRST,
            SHADOWMAP_LAST,
            DISTANT_TREE_DEPTH,
            SKY_CLOUDS_FADE,
            WATER_SSR,
        ] {
            assert!(TechniqueRange::ALL.contains(technique));
        }
    }
}
