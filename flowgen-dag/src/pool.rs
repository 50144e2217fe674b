use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use thiserror::Error;

use flowgen_rule::{rule_to_string, Field, OutputStyle, Rule, RuleLayout, CANDIDATE_FIELD_COUNT};
use flowgen_types::parse_binary;

use crate::analyze::{dag_is_valid, enumerate_dags};
use crate::candidate_set::CandidateSet;
use crate::instantiate::InstantiateMode;
use crate::profile::QuadDagProfile;
use crate::quad_dag::QuadDag;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("unexpected end of profile stream")]
    UnexpectedEof,
    #[error("unexpected token {0:?} in profile stream")]
    UnexpectedToken(String),
    #[error("malformed number {0:?} in profile stream")]
    BadNumber(String),
    #[error("malformed rule field {0:?} in profile stream")]
    BadField(String),
    #[error("profile record has {0} solid rules, expected 4")]
    WrongSolidCount(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The read-only library of QuadDag profiles, indexed by position.
#[derive(Debug, Clone, Default)]
pub struct QuadDagPool {
    profiles: Vec<QuadDagProfile>,
}

impl QuadDagPool {
    /// Precompute the library in-memory: every valid, realizable tagging.
    pub fn generate(mode: InstantiateMode) -> Self {
        let profiles = enumerate_dags()
            .filter(dag_is_valid)
            .filter_map(|dag| QuadDagProfile::generate(&dag, mode))
            .collect();
        Self { profiles }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profile(&self, id: usize) -> &QuadDagProfile {
        &self.profiles[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuadDagProfile> {
        self.profiles.iter()
    }

    /// Load a profile stream (records `DAG … END`, stream terminator `EOF`).
    pub fn from_reader(reader: impl BufRead) -> Result<Self, PoolError> {
        let mut text = String::new();
        let mut reader = reader;
        reader.read_to_string(&mut text)?;
        let mut cursor = Cursor {
            tokens: text.split_whitespace().collect(),
            pos: 0,
        };
        let mut profiles = Vec::new();
        loop {
            match cursor.next()? {
                "DAG" => profiles.push(parse_profile(&mut cursor)?),
                "EOF" => break,
                other => return Err(PoolError::UnexpectedToken(other.to_owned())),
            }
        }
        Ok(Self { profiles })
    }

    /// Serialize the pool in the profile stream format.
    pub fn write(&self, mut out: impl Write) -> io::Result<()> {
        let layout = RuleLayout::candidate();
        let mut text = String::new();
        for profile in &self.profiles {
            let _ = writeln!(text, "DAG {}", profile.dag());
            let _ = writeln!(text, "D= {}", profile.total_dependency_length());
            let _ = writeln!(text, "E= {}", profile.total_edge_count());
            let _ = writeln!(text, "W= {}", u8::from(profile.exist_wildcard()));
            let _ = writeln!(text, "F= {}", profile.actual_field_count());
            let _ = writeln!(text, "W= {}", profile.total_bit_width());
            let _ = writeln!(
                text,
                "FW= {} {} {}",
                profile.field_bit_width(0),
                profile.field_bit_width(1),
                profile.field_bit_width(2)
            );
            write_rules(&mut text, "SR", profile.solids(), &layout);
            write_rules(&mut text, "VR", profile.virtuals(), &layout);
            let _ = writeln!(text, "END");
            let _ = writeln!(text);
        }
        let _ = writeln!(text, "EOF");
        out.write_all(text.as_bytes())
    }
}

fn write_rules(text: &mut String, tag: &str, set: &CandidateSet, layout: &RuleLayout) {
    for i in 0..set.len() {
        let _ = writeln!(
            text,
            "{tag} {}  d= {}  e= {}  s= {}",
            rule_to_string(set.rule(i), layout, OutputStyle::FlowBench),
            set.dependency_length(i),
            set.edge_count(i),
            u8::from(set.is_solid(i)),
        );
    }
}

struct Cursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Result<&'a str, PoolError> {
        let token = self.tokens.get(self.pos).ok_or(PoolError::UnexpectedEof)?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: &str) -> Result<(), PoolError> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(PoolError::UnexpectedToken(token.to_owned()))
        }
    }

    fn next_u8(&mut self) -> Result<u8, PoolError> {
        let token = self.next()?;
        token
            .parse()
            .map_err(|_| PoolError::BadNumber(token.to_owned()))
    }

    fn next_flag(&mut self) -> Result<bool, PoolError> {
        Ok(self.next_u8()? != 0)
    }
}

fn parse_profile(cursor: &mut Cursor<'_>) -> Result<QuadDagProfile, PoolError> {
    let dag: QuadDag = cursor
        .next()?
        .parse()
        .map_err(|_| PoolError::BadField("DAG edge string".to_owned()))?;
    cursor.expect("D=")?;
    let _total_dependency_length = cursor.next_u8()?;
    cursor.expect("E=")?;
    let _total_edge_count = cursor.next_u8()?;
    cursor.expect("W=")?;
    let _exist_wildcard = cursor.next_flag()?;
    cursor.expect("F=")?;
    let _actual_field_count = cursor.next_u8()?;
    cursor.expect("W=")?;
    let _total_bit_width = cursor.next_u8()?;
    cursor.expect("FW=")?;
    for _ in 0..CANDIDATE_FIELD_COUNT {
        let _ = cursor.next_u8()?;
    }
    let mut solids = CandidateSet::default();
    let mut virtuals = CandidateSet::default();
    loop {
        match cursor.next()? {
            "SR" => parse_profiled_rule(cursor, &mut solids)?,
            "VR" => parse_profiled_rule(cursor, &mut virtuals)?,
            "END" => break,
            other => return Err(PoolError::UnexpectedToken(other.to_owned())),
        }
    }
    if solids.len() != crate::quad_dag::VERTEX_COUNT {
        return Err(PoolError::WrongSolidCount(solids.len()));
    }
    // Aggregates are recomputed from the rules; the stored copies are
    // informational.
    Ok(QuadDagProfile::assemble(dag, solids, virtuals))
}

fn parse_profiled_rule(cursor: &mut Cursor<'_>, set: &mut CandidateSet) -> Result<(), PoolError> {
    cursor.expect("R")?;
    let mut fields = Vec::with_capacity(CANDIDATE_FIELD_COUNT);
    for _ in 0..CANDIDATE_FIELD_COUNT {
        let token = cursor.next()?;
        let field = if token == "*" {
            Field::lpm_any()
        } else {
            let prefix =
                parse_binary(token).map_err(|_| PoolError::BadField(token.to_owned()))?;
            Field::lpm(prefix, token.len() as u8)
        };
        fields.push(field);
    }
    cursor.expect("d=")?;
    let d = cursor.next_u8()?;
    cursor.expect("e=")?;
    let e = cursor.next_u8()?;
    cursor.expect("s=")?;
    let s = cursor.next_flag()?;
    set.push_profiled(Rule::new(fields), d, e, s);
    Ok(())
}
