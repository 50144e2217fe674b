use flowgen_types::{Key, Rng, WidthClass};

use crate::error::FieldError;
use crate::layout::MatchType;

/// One match field. The three kinds share a `[min, max]` range view on which
/// the relation predicates operate; everything else is kind-specific.
///
/// Range-match keys are canonical on the top-32-bit view (low bits zero), so
/// comparisons reproduce 32-bit range arithmetic exactly.
#[derive(Debug, Clone)]
pub enum Field {
    Em { value: Key, wildcard: bool },
    Lpm { prefix: Key, len: u8 },
    Rm { start: Key, end: Key },
}

impl Field {
    pub fn em(value: Key) -> Self {
        Field::Em {
            value,
            wildcard: false,
        }
    }

    pub fn em_any() -> Self {
        Field::Em {
            value: Key::ZERO,
            wildcard: true,
        }
    }

    pub fn lpm(prefix: Key, len: u8) -> Self {
        Field::Lpm { prefix, len }
    }

    pub fn lpm_any() -> Self {
        Field::Lpm {
            prefix: Key::ZERO,
            len: 0,
        }
    }

    /// Range over the 32-bit view; the stored keys are canonicalized.
    pub fn rm32(start: u32, end: u32) -> Self {
        Field::Rm {
            start: Key::from_top32(start),
            end: Key::from_top32(end),
        }
    }

    pub fn rm_any() -> Self {
        Field::Rm {
            start: Key::ZERO,
            end: Key::MAX,
        }
    }

    /// The wildcard field of a kind.
    pub fn any_of(kind: MatchType) -> Self {
        match kind {
            MatchType::Em => Self::em_any(),
            MatchType::Lpm => Self::lpm_any(),
            MatchType::Rm => Self::rm_any(),
        }
    }

    pub fn kind(&self) -> MatchType {
        match self {
            Field::Em { .. } => MatchType::Em,
            Field::Lpm { .. } => MatchType::Lpm,
            Field::Rm { .. } => MatchType::Rm,
        }
    }

    pub fn min(&self) -> Key {
        match self {
            Field::Em { value, wildcard } => {
                if *wildcard {
                    Key::ZERO
                } else {
                    *value
                }
            }
            Field::Lpm { prefix, .. } => *prefix,
            Field::Rm { start, .. } => *start,
        }
    }

    pub fn max(&self) -> Key {
        match self {
            Field::Em { value, wildcard } => {
                if *wildcard {
                    Key::MAX
                } else {
                    *value
                }
            }
            Field::Lpm { prefix, len } => *prefix | Key::MAX.shr(u32::from(*len)),
            Field::Rm { end, .. } => *end,
        }
    }

    pub fn overlap(&self, other: &Field) -> bool {
        self.min() <= other.max() && self.max() >= other.min()
    }

    pub fn cover(&self, other: &Field) -> bool {
        self.min() <= other.min() && self.max() >= other.max()
    }

    pub fn is_wildcard(&self) -> bool {
        match self {
            Field::Em { wildcard, .. } => *wildcard,
            Field::Lpm { len, .. } => *len == 0,
            Field::Rm { start, end } => start.top32() == 0 && end.top32() == u32::MAX,
        }
    }

    /// Free bits left in a `width`-bit field.
    pub fn available_width(&self, width: u8) -> u8 {
        match self {
            Field::Em { .. } => 0,
            Field::Lpm { len, .. } => width.saturating_sub(*len),
            Field::Rm { start, end } => {
                let range = u64::from(end.top32()) - u64::from(start.top32()) + 1;
                let scoped = range >> (32 - u32::from(width));
                if scoped == 0 {
                    0
                } else {
                    (63 - scoped.leading_zeros()) as u8
                }
            }
        }
    }

    /// Partition `self \ other` into same-kind pieces. `None` means the
    /// remainder is not representable (`other` is no strict sub-space).
    /// EM fields are non-decomposable and yield `self` unchanged.
    pub fn difference(&self, other: &Field) -> Option<Vec<Field>> {
        match (self, other) {
            (Field::Em { .. }, _) => Some(vec![self.clone()]),
            (Field::Lpm { .. }, Field::Lpm { .. }) => {
                if !self.cover(other) {
                    return None;
                }
                let mut out = Vec::new();
                let mut current = self.clone();
                while &current != other {
                    let mut low = current.clone();
                    let mut high = current.clone();
                    low.add_suffix(0, 1).ok()?;
                    high.add_suffix(1, 1).ok()?;
                    if low.cover(other) {
                        out.push(high);
                        current = low;
                    } else {
                        out.push(low);
                        current = high;
                    }
                }
                Some(out)
            }
            (Field::Rm { start, end }, _) => {
                let (start, end) = (start.top32(), end.top32());
                let other_min = other.min().top32();
                let other_max = other.max().top32();
                let mut out = Vec::new();
                if other_min > start {
                    out.push(Field::rm32(start, other_min - 1));
                }
                if other_max < end {
                    out.push(Field::rm32(other_max + 1, end));
                }
                if out.is_empty() {
                    None
                } else {
                    Some(out)
                }
            }
            _ => None,
        }
    }

    /// Extend the field by `len` low-order bits of value `suffix`. LPM grows
    /// its prefix; RM picks the `suffix`-th of `2^len` equal sub-slots; EM has
    /// no bits to give and is left untouched.
    pub fn add_suffix(&mut self, suffix: u32, len: u8) -> Result<(), FieldError> {
        match self {
            Field::Em { .. } => Ok(()),
            Field::Lpm { prefix, len: plen } => {
                let new_len = u32::from(*plen) + u32::from(len);
                if new_len > Key::BITS {
                    return Err(FieldError::BitWidth);
                }
                *plen = new_len as u8;
                *prefix |= Key::new(u128::from(suffix)).shl(Key::BITS - new_len);
                Ok(())
            }
            Field::Rm { start, end } => {
                let s = start.top32();
                let e = end.top32();
                let step = ((s ^ e) >> len).wrapping_add(1);
                if step == 0 {
                    // full-range slot of width zero; degenerate, keep in place
                    *end = *start;
                    return Ok(());
                }
                let new_start = s.wrapping_add(suffix.wrapping_mul(step));
                *start = Key::from_top32(new_start);
                *end = Key::from_top32(new_start.wrapping_add(step - 1));
                Ok(())
            }
        }
    }

    /// Compose `self` inside the space carved out by `parent` (same kind).
    pub fn set_parent(&mut self, parent: &Field) {
        if parent.is_wildcard() {
            return;
        }
        match (self, parent) {
            (Field::Em { value, wildcard }, Field::Em { value: pv, .. }) => {
                *wildcard = false;
                *value = *pv;
            }
            (
                Field::Lpm { prefix, len },
                Field::Lpm {
                    prefix: pp,
                    len: pl,
                },
            ) => {
                *prefix = *pp | prefix.shr(u32::from(*pl));
                *len += *pl;
            }
            (Field::Rm { start, end }, parent @ Field::Rm { .. }) => {
                let pmin = u64::from(parent.min().top32());
                let pmax = u64::from(parent.max().top32());
                let range = pmax - pmin + 1;
                let min = u64::from(start.top32());
                let max = u64::from(end.top32());
                *start = Key::from_top32((pmin + (min * range >> 32)) as u32);
                *end = Key::from_top32((pmin + (max * range >> 32)) as u32);
            }
            _ => {}
        }
    }

    /// Draw one value matching the field.
    pub fn hit(&self, class: WidthClass, rng: &mut Rng) -> Key {
        match self {
            Field::Em { value, wildcard } => {
                if *wildcard {
                    class.sample(rng)
                } else {
                    *value
                }
            }
            Field::Lpm { prefix, len } => *prefix | class.sample(rng).shr(u32::from(*len)),
            Field::Rm { start, end } => {
                Key::from_top32(rng.next_range(start.top32(), end.top32()))
            }
        }
    }

    /// Give an EM field a fresh random value; other kinds are untouched.
    pub fn randomize(&mut self, class: WidthClass, rng: &mut Rng) {
        if let Field::Em { value, wildcard } = self {
            *wildcard = false;
            *value = class.sample(rng);
        }
    }

    /// Rebuild this field from a candidate LPM value (profile instantiation).
    pub fn convert_from_lpm(&mut self, source: &Field) {
        let (src_prefix, src_len) = match source {
            Field::Lpm { prefix, len } => (*prefix, *len),
            _ => return,
        };
        match self {
            // EM fields carry no prefix structure; instantiation leaves them
            // for the shared randomization pass.
            Field::Em { .. } => {}
            Field::Lpm { prefix, len } => {
                *prefix = src_prefix;
                *len = src_len;
            }
            Field::Rm { start, end } => {
                let max = src_prefix | Key::MAX.shr(u32::from(src_len));
                *start = Key::from_top32(src_prefix.top32());
                *end = Key::from_top32(max.top32());
            }
        }
    }

    /// XOR a mask into an LPM prefix, preserving the prefix length.
    pub fn xor_prefix(&mut self, mask: Key) {
        if let Field::Lpm { prefix, len } = self {
            let keep = if *len == 0 {
                Key::ZERO
            } else {
                !Key::MAX.shr(u32::from(*len))
            };
            *prefix = (*prefix ^ mask) & keep;
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.min() == other.min() && self.max() == other.max()
    }
}

impl Eq for Field {}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Rng;
    use proptest::prelude::*;
    use test_case::test_case;

    fn lpm(bits: &str) -> Field {
        Field::lpm(
            flowgen_types::parse_binary(bits).unwrap(),
            bits.len() as u8,
        )
    }

    #[test]
    fn lpm_ranges() {
        let f = lpm("10");
        assert_eq!(f.min().to_binary(4), "1000");
        assert_eq!(f.max().to_binary(4), "1011");
        assert!(Field::lpm_any().cover(&f));
        assert!(f.overlap(&lpm("101")));
        assert!(!f.overlap(&lpm("11")));
        assert!(f.cover(&lpm("101")));
        assert!(!lpm("101").cover(&f));
    }

    #[test_case("1", "10", &["11"] ; "one level")]
    #[test_case("1", "1011", &["11", "100", "1010"] ; "three levels")]
    fn lpm_difference(outer: &str, inner: &str, expected: &[&str]) {
        let pieces = lpm(outer).difference(&lpm(inner)).unwrap();
        let rendered: Vec<String> = pieces
            .iter()
            .map(|f| match f {
                Field::Lpm { prefix, len } => prefix.to_binary(*len),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(rendered, expected);
    }

    #[test]
    fn lpm_difference_requires_cover() {
        assert!(lpm("10").difference(&lpm("11")).is_none());
        assert!(lpm("10").difference(&lpm("1")).is_none());
    }

    proptest! {
        // difference(a, b) ⊎ b partitions a: piece ranges are disjoint and
        // their sizes sum to the size of a.
        #[test]
        fn lpm_difference_partitions(prefix in 0u32..16, extra in 1u8..6) {
            let outer = Field::lpm(Key::new(u128::from(prefix) << 124), 4);
            let mut inner = outer.clone();
            let mut seed = prefix;
            for _ in 0..extra {
                seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
                inner.add_suffix(seed & 1, 1).unwrap();
            }
            let pieces = outer.difference(&inner).unwrap();
            let span = |f: &Field| f.max().top(16) - f.min().top(16) + 1;
            let total: u128 = pieces.iter().map(span).sum::<u128>() + span(&inner);
            prop_assert_eq!(total, span(&outer));
            for (i, a) in pieces.iter().enumerate() {
                prop_assert!(!a.overlap(&inner));
                for b in &pieces[i + 1..] {
                    prop_assert!(!a.overlap(b));
                }
            }
        }
    }

    #[test]
    fn rm_difference_sides() {
        let outer = Field::rm32(10, 100);
        let inner = Field::rm32(30, 40);
        let pieces = outer.difference(&inner).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0], Field::rm32(10, 29));
        assert_eq!(pieces[1], Field::rm32(41, 100));
        // Covered outright: nothing left.
        assert!(Field::rm32(30, 40).difference(&Field::rm32(10, 100)).is_none());
    }

    #[test]
    fn rm_suffix_slots() {
        // [0, 2^32) in 4 slots of 2^30
        let mut f = Field::rm_any();
        f.add_suffix(2, 2).unwrap();
        assert_eq!(f.min().top32(), 2 << 30);
        assert_eq!(f.max().top32(), (3u32 << 30) - 1);
    }

    #[test]
    fn rm_parent_composition() {
        let mut child = Field::rm_any();
        child.add_suffix(1, 1).unwrap(); // upper half
        let parent = Field::rm32(0, 99);
        child.set_parent(&parent);
        assert_eq!(child.min().top32(), 50);
        assert_eq!(child.max().top32(), 99);
    }

    #[test]
    fn lpm_parent_concatenates() {
        let mut child = lpm("01");
        child.set_parent(&lpm("11"));
        match child {
            Field::Lpm { prefix, len } => {
                assert_eq!(len, 4);
                assert_eq!(prefix.to_binary(4), "1101");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn em_parent_inherits_value() {
        let mut child = Field::em_any();
        child.set_parent(&Field::em(Key::from_top32(7)));
        assert_eq!(child, Field::em(Key::from_top32(7)));
        let mut child = Field::em(Key::from_top32(9));
        child.set_parent(&Field::em_any());
        assert_eq!(child, Field::em(Key::from_top32(9)));
    }

    #[test]
    fn hit_stays_in_range(){
        let mut rng = Rng::new(11);
        let f = lpm("1011");
        for _ in 0..32 {
            let v = f.hit(WidthClass::W32, &mut rng);
            assert!(f.min() <= v && v <= f.max());
        }
        let r = Field::rm32(5, 9);
        for _ in 0..32 {
            let v = r.hit(WidthClass::W32, &mut rng);
            assert!((5..=9).contains(&v.top32()));
        }
    }

    #[test]
    fn available_widths() {
        assert_eq!(lpm("10").available_width(8), 6);
        assert_eq!(Field::em_any().available_width(32), 0);
        assert_eq!(Field::rm_any().available_width(16), 16);
        assert_eq!(Field::rm32(0, (1 << 20) - 1).available_width(16), 4);
        assert_eq!(Field::rm32(3, 3).available_width(8), 0);
    }

    #[test]
    fn xor_mask_preserves_length() {
        let mut f = lpm("1010");
        f.xor_prefix(Key::from_top32(0xffff_ffff));
        match f {
            Field::Lpm { prefix, len } => {
                assert_eq!(len, 4);
                assert_eq!(prefix.to_binary(4), "0101");
                // bits beyond the prefix stay clear
                assert_eq!(prefix & Key::MAX.shr(4), Key::ZERO);
            }
            _ => unreachable!(),
        }
    }
}
