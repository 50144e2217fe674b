use strum::{Display, EnumString};

use flowgen_types::WidthClass;

use crate::error::LayoutError;
use crate::field::Field;
use crate::rule::Rule;

/// Candidate rules carry exactly three 8-bit LPM fields.
pub const CANDIDATE_FIELD_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum MatchType {
    #[strum(serialize = "EM")]
    Em,
    #[strum(serialize = "LPM")]
    Lpm,
    #[strum(serialize = "RM")]
    Rm,
}

/// Header presets mirroring common classifier layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Protocol {
    #[strum(serialize = "ipv4")]
    Ipv4,
    #[strum(serialize = "ipv6")]
    Ipv6,
    #[strum(serialize = "openflow1.0")]
    OpenFlow10,
}

/// The shape of a rule: field count, per-index bit widths and match kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLayout {
    widths: Vec<u8>,
    kinds: Vec<MatchType>,
}

const DEFAULT_WIDTHS: [u8; 5] = [32, 32, 16, 16, 8];
const DEFAULT_KINDS: [MatchType; 5] = [
    MatchType::Lpm,
    MatchType::Lpm,
    MatchType::Rm,
    MatchType::Rm,
    MatchType::Em,
];

impl RuleLayout {
    /// The internal candidate layout used by the QuadDag machinery.
    pub fn candidate() -> Self {
        Self {
            widths: vec![8; CANDIDATE_FIELD_COUNT],
            kinds: vec![MatchType::Lpm; CANDIDATE_FIELD_COUNT],
        }
    }

    /// A user layout of `count` fields seeded with the classic five-tuple
    /// defaults; fields beyond the fifth default to 8-bit exact matches.
    pub fn with_field_count(count: usize) -> Self {
        let widths = (0..count)
            .map(|i| DEFAULT_WIDTHS.get(i).copied().unwrap_or(8))
            .collect();
        let kinds = (0..count)
            .map(|i| DEFAULT_KINDS.get(i).copied().unwrap_or(MatchType::Em))
            .collect();
        Self { widths, kinds }
    }

    pub fn preset(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Ipv4 => Self {
                widths: vec![32, 32, 16, 16, 8],
                kinds: DEFAULT_KINDS.to_vec(),
            },
            Protocol::Ipv6 => Self {
                widths: vec![128, 128, 16, 16, 8],
                kinds: DEFAULT_KINDS.to_vec(),
            },
            Protocol::OpenFlow10 => Self {
                // in_port, dl_src, dl_dst, dl_vlan, dl_vlan_pcp, dl_type,
                // nw_tos, nw_proto, nw_src, nw_dst, tp_src, tp_dst
                widths: vec![16, 48, 48, 16, 8, 16, 8, 8, 32, 32, 16, 16],
                kinds: vec![
                    MatchType::Em,
                    MatchType::Em,
                    MatchType::Em,
                    MatchType::Em,
                    MatchType::Em,
                    MatchType::Em,
                    MatchType::Em,
                    MatchType::Em,
                    MatchType::Lpm,
                    MatchType::Lpm,
                    MatchType::Rm,
                    MatchType::Rm,
                ],
            },
        }
    }

    pub fn field_count(&self) -> usize {
        self.widths.len()
    }

    pub fn width(&self, index: usize) -> u8 {
        self.widths[index]
    }

    pub fn kind(&self, index: usize) -> MatchType {
        self.kinds[index]
    }

    pub fn class(&self, index: usize) -> WidthClass {
        WidthClass::of_width(self.widths[index])
    }

    pub fn set_width(&mut self, index: usize, width: u8) {
        self.widths[index] = width;
    }

    pub fn set_kind(&mut self, index: usize, kind: MatchType) {
        self.kinds[index] = kind;
    }

    /// Total bits the generators may consume: the sum of non-EM widths.
    pub fn available_bit_count(&self) -> u32 {
        self.widths
            .iter()
            .zip(&self.kinds)
            .filter(|(_, kind)| **kind != MatchType::Em)
            .map(|(w, _)| u32::from(*w))
            .sum()
    }

    /// A rule matching everything, one wildcard field per index.
    pub fn wildcard_rule(&self) -> Rule {
        Rule::new(self.kinds.iter().map(|kind| Field::any_of(*kind)).collect())
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.widths.is_empty() {
            return Err(LayoutError::Empty);
        }
        for (index, (&width, &kind)) in self.widths.iter().zip(&self.kinds).enumerate() {
            if width == 0 || width > 128 {
                return Err(LayoutError::FieldTooWide { index, width });
            }
            if kind == MatchType::Rm && width > 32 {
                return Err(LayoutError::RangeTooWide { index, width });
            }
        }
        Ok(())
    }
}
