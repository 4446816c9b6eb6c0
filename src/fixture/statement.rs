use std::fmt;

/// The values a fact type is identified by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    /// Inclusive integer range, `1..10`
    Range { from: u64, to: u64 },
    /// Enumerated atoms, `Alice, Bob, Chloe`
    Atoms(Vec<String>),
    /// Cartesian product of other fact types, `person1 * person2`
    Product(Vec<String>),
}

impl Domain {
    /// Number of distinct identifiers for ranges and atom lists. Products are
    /// sized by their factors and report `None`.
    pub fn cardinality(&self) -> Option<u64> {
        match self {
            Domain::Range { from, to } => Some(to.saturating_sub(*from) + 1),
            Domain::Atoms(atoms) => Some(atoms.len() as u64),
            Domain::Product(_) => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Range { from, to } => write!(f, "{from}..{to}"),
            Domain::Atoms(atoms) => f.write_str(&atoms.join(", ")),
            Domain::Product(factors) => f.write_str(&factors.join(" * ")),
        }
    }
}

/// One line of a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `Fact <name> Identified by <domain> [Holds when <condition>].`
    Fact {
        name: String,
        domain: Domain,
        holds_when: Option<String>,
    },
    /// `+<fact>(<args>).`
    Create { fact: String, args: Vec<String> },
    /// `?-<expression>.`
    Query(String),
}

impl Statement {
    pub fn fact(name: impl Into<String>, domain: Domain) -> Self {
        Statement::Fact {
            name: name.into(),
            domain,
            holds_when: None,
        }
    }

    pub fn derived_fact(
        name: impl Into<String>,
        domain: Domain,
        condition: impl Into<String>,
    ) -> Self {
        Statement::Fact {
            name: name.into(),
            domain,
            holds_when: Some(condition.into()),
        }
    }

    pub fn create<I, S>(fact: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Statement::Create {
            fact: fact.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn query(expression: impl Into<String>) -> Self {
        Statement::Query(expression.into())
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Statement::Create { .. })
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Query(_))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Fact {
                name,
                domain,
                holds_when,
            } => {
                write!(f, "Fact {name} Identified by {domain}")?;
                if let Some(condition) = holds_when {
                    write!(f, " Holds when {condition}")?;
                }
                f.write_str(".")
            }
            Statement::Create { fact, args } => write!(f, "+{fact}({}).", args.join(", ")),
            Statement::Query(expression) => write!(f, "?-{expression}."),
        }
    }
}
