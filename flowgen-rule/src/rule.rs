use strum::Display;

use crate::field::Field;
use crate::layout::{RuleLayout, CANDIDATE_FIELD_COUNT};

/// Relation of an earlier rule to a later one. Cover subsumes overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EdgeType {
    None,
    Overlap,
    Cover,
}

impl EdgeType {
    pub const fn code(self) -> char {
        match self {
            EdgeType::None => 'N',
            EdgeType::Overlap => 'O',
            EdgeType::Cover => 'C',
        }
    }

    pub const fn from_code(c: char) -> Option<Self> {
        match c {
            'N' => Some(EdgeType::None),
            'O' => Some(EdgeType::Overlap),
            'C' => Some(EdgeType::Cover),
            _ => None,
        }
    }
}

/// An ordered sequence of fields shaped by some [`RuleLayout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    fields: Vec<Field>,
}

impl Rule {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, index: usize) -> &Field {
        &self.fields[index]
    }

    pub fn field_mut(&mut self, index: usize) -> &mut Field {
        &mut self.fields[index]
    }

    pub fn set_field(&mut self, index: usize, field: Field) {
        self.fields[index] = field;
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn overlap(&self, other: &Rule) -> bool {
        self.fields
            .iter()
            .zip(&other.fields)
            .all(|(a, b)| a.overlap(b))
    }

    pub fn cover(&self, other: &Rule) -> bool {
        self.fields
            .iter()
            .zip(&other.fields)
            .all(|(a, b)| a.cover(b))
    }

    pub fn edge_type_to(&self, other: &Rule) -> EdgeType {
        if self.cover(other) {
            EdgeType::Cover
        } else if self.overlap(other) {
            EdgeType::Overlap
        } else {
            EdgeType::None
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.fields.iter().all(Field::is_wildcard)
    }

    pub fn available_width(&self, layout: &RuleLayout, index: usize) -> u8 {
        self.fields[index].available_width(layout.width(index))
    }

    /// Free bits summed over all fields.
    pub fn total_available_width(&self, layout: &RuleLayout) -> u32 {
        (0..self.fields.len())
            .map(|i| u32::from(self.available_width(layout, i)))
            .sum()
    }

    /// Re-shape a candidate rule into a user-defined rule. `mapping[i]` names
    /// the user field that candidate field `i` lands in; unmapped candidate
    /// slots (always wildcard by construction) are dropped.
    pub fn from_candidate(
        candidate: &Rule,
        mapping: &[Option<usize>; CANDIDATE_FIELD_COUNT],
        layout: &RuleLayout,
    ) -> Rule {
        let mut rule = layout.wildcard_rule();
        for (i, target) in mapping.iter().enumerate() {
            if let Some(target) = *target {
                rule.fields[target].convert_from_lpm(candidate.field(i));
            }
        }
        rule
    }
}
