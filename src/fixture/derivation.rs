use super::{Domain, Family, FixtureTemplate, ScaleFactor, Statement};

/// Chain derivation over `1..n`: `x(k)` holds when `x(k - 1)` holds, seeded with `x(1)`.
///
/// Reaching closure takes `n - 1` derivation steps, so cost grows with the
/// domain size alone.
pub struct Derivation;

impl FixtureTemplate for Derivation {
    const FAMILY: Family = Family::Derivation;

    fn statements(scale: ScaleFactor) -> Vec<Statement> {
        vec![
            Statement::derived_fact(
                "x",
                Domain::Range {
                    from: 1,
                    to: scale.get(),
                },
                "x(x - 1)",
            ),
            Statement::create("x", ["1"]),
        ]
    }
}
