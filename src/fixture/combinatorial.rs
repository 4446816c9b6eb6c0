use super::{Domain, Family, FixtureTemplate, ScaleFactor, Statement};

/// Persons present at every scale
pub const BASE_PERSONS: [&str; 3] = ["Alice", "Bob", "Chloe"];

/// Persons added one per scale step
pub const EXTRA_PERSONS: [&str; 5] = ["Dave", "Eve", "Frank", "George", "Helen"];

// family-of(a, b) holds when b relates back to a and b reaches a through a third person.
const FAMILY_OF_CONDITION: &str =
    "family-of(person2, person1), family-of(person2, person3) && family-of(person3, person1)";

/// A three-hop `family-of` relation over `3 + i` persons, seeded with a two-link chain.
pub struct Combinatorial;

impl FixtureTemplate for Combinatorial {
    const FAMILY: Family = Family::Combinatorial;

    fn statements(scale: ScaleFactor) -> Vec<Statement> {
        // Family::scale caps combinatorial scales at EXTRA_PERSONS.len()
        let persons = BASE_PERSONS
            .iter()
            .chain(&EXTRA_PERSONS[..scale.get() as usize])
            .map(|p| p.to_string())
            .collect();

        vec![
            Statement::fact("person", Domain::Atoms(persons)),
            Statement::derived_fact(
                "family-of",
                Domain::Product(vec!["person1".into(), "person2".into()]),
                FAMILY_OF_CONDITION,
            ),
            Statement::create("family-of", ["Alice", "Bob"]),
            Statement::create("family-of", ["Bob", "Chloe"]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;
    use std::collections::HashSet;

    fn fixture(i: i64) -> Fixture {
        Fixture::build::<Combinatorial>(Family::Combinatorial.scale(i).unwrap()).unwrap()
    }

    fn persons(fixture: &Fixture) -> Vec<String> {
        match &fixture.statements()[0] {
            Statement::Fact {
                domain: Domain::Atoms(atoms),
                ..
            } => atoms.clone(),
            other => panic!("expected person declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_scale_four_has_seven_distinct_persons() {
        let names = persons(&fixture(4));
        assert_eq!(names.len(), 7);
        assert_eq!(names.iter().collect::<HashSet<_>>().len(), 7);
        assert_eq!(
            names,
            ["Alice", "Bob", "Chloe", "Dave", "Eve", "Frank", "George"]
        );
    }

    #[test]
    fn test_two_seeds_at_every_scale() {
        for i in 1..=5 {
            let fixture = fixture(i);
            assert_eq!(persons(&fixture).len(), 3 + i as usize);
            assert_eq!(
                fixture.statements().iter().filter(|s| s.is_create()).count(),
                2
            );
        }
    }

    #[test]
    fn test_relation_rule_structure() {
        let rendered = fixture(1).render();
        assert_eq!(
            rendered,
            "Fact person Identified by Alice, Bob, Chloe, Dave.\n\
             Fact family-of Identified by person1 * person2 Holds when \
             family-of(person2, person1), family-of(person2, person3) && family-of(person3, person1).\n\
             +family-of(Alice, Bob).\n\
             +family-of(Bob, Chloe).\n"
        );
    }
}
