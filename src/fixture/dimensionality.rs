use super::{Domain, Family, FixtureTemplate, ScaleFactor, Statement};

/// Size of the base parameter domain. Fixed so that only arity varies.
pub const PARAMETER_DOMAIN: u64 = 10;

/// A composite fact keyed by `i` copies of a ten-valued parameter, then queried.
///
/// The key space is `10^i`, isolating the cost of wide tuples from population size.
pub struct Dimensionality;

impl FixtureTemplate for Dimensionality {
    const FAMILY: Family = Family::Dimensionality;

    fn statements(scale: ScaleFactor) -> Vec<Statement> {
        let factors = (1..=scale.get()).map(|j| format!("parameter{j}")).collect();

        vec![
            Statement::fact(
                "parameter",
                Domain::Range {
                    from: 1,
                    to: PARAMETER_DOMAIN,
                },
            ),
            Statement::fact("combined", Domain::Product(factors)),
            Statement::query("combined"),
        ]
    }
}
