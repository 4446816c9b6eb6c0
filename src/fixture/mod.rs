//! Scaling fixtures for the eFLINT interpreter benchmarks.
//!
//! Each [`Family`] stresses one cost axis. A family only decides which
//! statements a fixture contains ([`FixtureTemplate`]); naming, validation and
//! file handling are shared.

pub mod combinatorial;
pub mod derivation;
pub mod dimensionality;
pub mod statement;

pub use combinatorial::Combinatorial;
pub use derivation::Derivation;
pub use dimensionality::Dimensionality;
pub use statement::{Domain, Statement};

use crate::error::{invalid_scale, Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// File extension of generated fixtures
pub const FIXTURE_EXTENSION: &str = "eflint";

/// Fixture families
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Domain size: a chain derivation of length n
    Derivation,
    /// Relation arity: a product of i parameters over a fixed domain
    Dimensionality,
    /// Relational combinatorics over a growing set of persons
    Combinatorial,
}

impl Family {
    pub fn all() -> &'static [Family] {
        &[
            Family::Derivation,
            Family::Dimensionality,
            Family::Combinatorial,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Family::Derivation => "derivation",
            Family::Dimensionality => "dimensionality",
            Family::Combinatorial => "combinatorial",
        }
    }

    /// Scale factors used when the caller does not supply any. For derivation
    /// this is the domain size `10^i`, for the others the raw index `i`.
    pub fn default_scales(&self) -> Vec<u64> {
        match self {
            Family::Derivation => (0..5).map(|i| 10u64.pow(i)).collect(),
            Family::Dimensionality | Family::Combinatorial => (1..=5).collect(),
        }
    }

    /// Largest scale factor this family can express, if bounded.
    pub fn max_scale(&self) -> Option<u64> {
        match self {
            Family::Combinatorial => Some(combinatorial::EXTRA_PERSONS.len() as u64),
            Family::Derivation | Family::Dimensionality => None,
        }
    }

    /// Validate a raw scale factor for this family.
    pub fn scale(&self, raw: i64) -> Result<ScaleFactor> {
        if raw <= 0 {
            return Err(invalid_scale(*self, raw, "scale factors must be positive"));
        }
        let value = raw as u64;
        if let Some(max) = self.max_scale() {
            if value > max {
                return Err(invalid_scale(
                    *self,
                    raw,
                    "exceeds the number of identifiers the family can add",
                ));
            }
        }
        Ok(ScaleFactor {
            family: *self,
            value,
        })
    }

    /// Build the in-memory fixture for `scale`, which must have been validated by this family.
    pub fn fixture(&self, scale: ScaleFactor) -> Result<Fixture> {
        match self {
            Family::Derivation => Fixture::build::<Derivation>(scale),
            Family::Dimensionality => Fixture::build::<Dimensionality>(scale),
            Family::Combinatorial => Fixture::build::<Combinatorial>(scale),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Family::all()
            .iter()
            .copied()
            .find(|family| family.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown fixture family {s:?}"))
    }
}

/// A strictly positive scale factor, valid for the family that checked it.
/// Obtain one through [`Family::scale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScaleFactor {
    family: Family,
    value: u64,
}

impl ScaleFactor {
    pub fn get(self) -> u64 {
        self.value
    }

    pub fn family(self) -> Family {
        self.family
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Supplies the statements of one fixture family.
pub trait FixtureTemplate {
    const FAMILY: Family;

    /// The statements of the fixture at `scale`, in file order.
    fn statements(scale: ScaleFactor) -> Vec<Statement>;
}

/// A generated fixture, ready to be rendered or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    family: Family,
    scale: ScaleFactor,
    statements: Vec<Statement>,
}

impl Fixture {
    pub fn build<T: FixtureTemplate>(scale: ScaleFactor) -> Result<Self> {
        if scale.family() != T::FAMILY {
            return Err(invalid_scale(
                T::FAMILY,
                scale.get() as i64,
                "validated for a different family",
            ));
        }
        Ok(Self {
            family: T::FAMILY,
            scale,
            statements: T::statements(scale),
        })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn scale(&self) -> ScaleFactor {
        self.scale
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// One statement per line, each line terminated by a newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for statement in &self.statements {
            out.push_str(&statement.to_string());
            out.push('\n');
        }
        out
    }

    /// `<family>_<scale>.eflint`
    pub fn file_name(&self) -> String {
        format!("{}_{}.{}", self.family.name(), self.scale, FIXTURE_EXTENSION)
    }

    /// `<root>/<family>/<family>_<scale>.eflint`
    pub fn path_under(&self, root: &Path) -> PathBuf {
        root.join(self.family.name()).join(self.file_name())
    }

    /// Write the fixture below `root`, replacing any previous file with the same key.
    ///
    /// The content is written to a `.partial` sibling first and renamed into
    /// place, so an interrupted write never leaves a truncated fixture behind.
    pub fn write(&self, root: &Path) -> Result<PathBuf> {
        let path = self.path_under(root);
        let io_error = |source: std::io::Error| Error::FixtureIo {
            family: self.family,
            scale: self.scale.get(),
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let partial = path.with_extension(format!("{FIXTURE_EXTENSION}.partial"));
        if let Err(source) = fs::write(&partial, self.render()) {
            let _ = fs::remove_file(&partial);
            return Err(io_error(source));
        }
        if let Err(source) = fs::rename(&partial, &path) {
            let _ = fs::remove_file(&partial);
            return Err(io_error(source));
        }

        info!(
            family = %self.family,
            scale = self.scale.get(),
            statements = self.statements.len(),
            path = %path.display(),
            "wrote fixture"
        );
        Ok(path)
    }
}

/// Configuration for fixture generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory receiving one sub-directory per family
    pub output_root: PathBuf,
    /// Families to generate, in order
    pub families: Vec<Family>,
    /// Replace the default scale factors of specific families
    pub scales_override: HashMap<Family, Vec<i64>>,
}

impl GeneratorConfig {
    /// Raw scale factors for a family, before validation
    pub fn scales_for(&self, family: Family) -> Vec<i64> {
        self.scales_override
            .get(&family)
            .cloned()
            .unwrap_or_else(|| {
                family
                    .default_scales()
                    .into_iter()
                    .map(|s| s as i64)
                    .collect()
            })
    }

    /// Validate the scales of every configured family, before anything is written.
    pub fn plan(&self) -> Result<Vec<Vec<ScaleFactor>>> {
        self.families
            .iter()
            .map(|&family| validate_scales(family, &self.scales_for(family)))
            .collect()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("tests/performance"),
            families: Family::all().to_vec(),
            scales_override: HashMap::new(),
        }
    }
}

fn validate_scales(family: Family, scales: &[i64]) -> Result<Vec<ScaleFactor>> {
    scales.iter().map(|&raw| family.scale(raw)).collect()
}

fn write_fixtures(root: &Path, scales: &[ScaleFactor]) -> Result<Vec<PathBuf>> {
    scales
        .iter()
        .map(|&scale| scale.family().fixture(scale)?.write(root))
        .collect()
}

/// Generate one family at every given scale.
///
/// All scales are validated before the first file is written.
pub fn generate_family(root: &Path, family: Family, scales: &[i64]) -> Result<Vec<PathBuf>> {
    let scales = validate_scales(family, scales)?;
    debug!(%family, count = scales.len(), "generating fixture family");
    write_fixtures(root, &scales)
}

/// Generate every configured family, sequentially.
///
/// An invalid scale in any family aborts the run before the first file is written.
pub fn generate_all(config: &GeneratorConfig) -> Result<Vec<PathBuf>> {
    let plan = config.plan()?;
    let mut written = Vec::new();
    for scales in &plan {
        written.extend(write_fixtures(&config.output_root, scales)?);
    }
    Ok(written)
}

/// Generate every configured family, one family per worker.
///
/// Families never share an output path, so no coordination is needed. The
/// returned paths keep the configured family order.
pub fn generate_all_parallel(config: &GeneratorConfig) -> Result<Vec<PathBuf>> {
    let plan = config.plan()?;
    let per_family: Vec<Vec<PathBuf>> = plan
        .par_iter()
        .map(|scales| write_fixtures(&config.output_root, scales))
        .collect::<Result<_>>()?;
    Ok(per_family.into_iter().flatten().collect())
}
