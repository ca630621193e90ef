use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// Flattened column count shared by all four position schemas. The
/// preprocessing stage refuses tables of any other width.
pub const TOTAL_COLUMNS: usize = 25;

/// The four skill positions with profile pages on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
    ];

    /// URL/file slug, e.g. `running-back` in
    /// `https://www.playerprofiler.com/position/running-back`.
    pub fn slug(&self) -> &'static str {
        match self {
            Position::Quarterback => "quarterback",
            Position::RunningBack => "running-back",
            Position::WideReceiver => "wide-receiver",
            Position::TightEnd => "tight-end",
        }
    }
}

impl FromStr for Position {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quarterback" => Ok(Position::Quarterback),
            "running-back" => Ok(Position::RunningBack),
            "wide-receiver" => Ok(Position::WideReceiver),
            "tight-end" => Ok(Position::TightEnd),
            other => Err(PipelineError::InvalidPosition(other.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// How a column is filled and cast during preprocessing. Decided once here,
/// never re-inspected from cell contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text, missing → "None".
    Text,
    /// Whole number, missing → -1.
    Integer,
    /// Decimal number, missing → -1.
    Float,
    /// Categorical text, missing → "0", factorized to integer codes.
    Category,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

/// Which profile-page card a group of columns is scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Card {
    Identity,
    Biometrics,
    Combine,
    College,
    Season,
}

/// One card's worth of columns, in extraction order.
#[derive(Debug, Clone, Copy)]
pub struct AttributeGroup {
    pub card: Card,
    pub columns: &'static [Column],
}

/// Ordered card groups for one position; group order and column order define
/// the output table's column order.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSchema {
    pub position: Position,
    pub groups: &'static [AttributeGroup],
}

use ColumnKind::{Category, Float, Integer, Text};

// Identity, biometrics and combine cards are identical across positions;
// college and season stats differ per position.
const IDENTITY: &[Column] = &[
    col("name", Text),
    col("position", Integer),
    col("team", Category),
];

const BIOMETRICS: &[Column] = &[
    col("height", Float),
    col("weight", Integer),
    col("draft", Float),
    col("college", Category),
    col("age", Integer),
];

const COMBINE: &[Column] = &[
    col("40-yard", Float),
    col("speed", Float),
    col("burst", Float),
    col("agility", Float),
    col("bench", Float),
];

const COLLEGE_QB: &[Column] = &[
    col("col-qbr", Float),
    col("col-ypa", Float),
    col("col-breakout", Float),
    col("col-sparq", Float),
];

const COLLEGE_RB: &[Column] = &[
    col("col-dom", Float),
    col("col-ypc", Float),
    col("col-tar", Float),
    col("col-sparq", Float),
];

const COLLEGE_WR: &[Column] = &[
    col("col-dom", Float),
    col("col-ypr", Float),
    col("col-tar", Float),
    col("col-breakout", Float),
];

const COLLEGE_TE: &[Column] = &[
    col("col-dom", Float),
    col("col-ypr", Float),
    col("col-breakout", Float),
    col("col-sparq", Float),
];

const SEASON_QB: &[Column] = &[
    col("games-played", Float),
    col("pass-attempts", Float),
    col("pass-yards", Float),
    col("comp-percentage", Float),
    col("ypa", Float),
    col("rush-yards", Float),
    col("tds", Float),
    col("fantasy-ppg", Float),
];

const SEASON_RB: &[Column] = &[
    col("games-played", Float),
    col("rush-attempts", Float),
    col("rush-yards", Float),
    col("ypc-nfl", Float),
    col("rec", Float),
    col("rec-yards", Float),
    col("tds", Float),
    col("fantasy-ppg", Float),
];

const SEASON_WR: &[Column] = &[
    col("games-played", Float),
    col("targets", Float),
    col("rec", Float),
    col("rec-yards", Float),
    col("ypr", Float),
    col("air-yards", Float),
    col("tds", Float),
    col("fantasy-ppg", Float),
];

const SEASON_TE: &[Column] = SEASON_WR;

const fn groups(
    college: &'static [Column],
    season: &'static [Column],
) -> [AttributeGroup; 5] {
    [
        AttributeGroup { card: Card::Identity, columns: IDENTITY },
        AttributeGroup { card: Card::Biometrics, columns: BIOMETRICS },
        AttributeGroup { card: Card::Combine, columns: COMBINE },
        AttributeGroup { card: Card::College, columns: college },
        AttributeGroup { card: Card::Season, columns: season },
    ]
}

static GROUPS_QB: [AttributeGroup; 5] = groups(COLLEGE_QB, SEASON_QB);
static GROUPS_RB: [AttributeGroup; 5] = groups(COLLEGE_RB, SEASON_RB);
static GROUPS_WR: [AttributeGroup; 5] = groups(COLLEGE_WR, SEASON_WR);
static GROUPS_TE: [AttributeGroup; 5] = groups(COLLEGE_TE, SEASON_TE);

/// Static schema lookup for a position.
pub fn schema_for(position: Position) -> AttributeSchema {
    let groups: &'static [AttributeGroup] = match position {
        Position::Quarterback => &GROUPS_QB,
        Position::RunningBack => &GROUPS_RB,
        Position::WideReceiver => &GROUPS_WR,
        Position::TightEnd => &GROUPS_TE,
    };
    AttributeSchema { position, groups }
}

impl AttributeSchema {
    /// Flattened column names in table order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.groups
            .iter()
            .flat_map(|g| g.columns.iter().map(|c| c.name))
            .collect()
    }

    /// Flattened columns in table order.
    pub fn columns(&self) -> Vec<Column> {
        self.groups
            .iter()
            .flat_map(|g| g.columns.iter().copied())
            .collect()
    }

    pub fn column_count(&self) -> usize {
        self.groups.iter().map(|g| g.columns.len()).sum()
    }
}

// ── Tests ──
