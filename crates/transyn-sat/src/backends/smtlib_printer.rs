use crate::constraints::ConstraintSet;
use crate::terms::SatTerm;

/// Print a SatTerm in SMT-LIB2 format.
pub fn to_smtlib(term: &SatTerm) -> String {
    match term {
        SatTerm::Var(name) => quote_symbol(name),
        SatTerm::Lit(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        SatTerm::And(terms) => {
            if terms.is_empty() {
                "true".to_string()
            } else if terms.len() == 1 {
                to_smtlib(&terms[0])
            } else {
                let inner: Vec<String> = terms.iter().map(to_smtlib).collect();
                format!("(and {})", inner.join(" "))
            }
        }
        SatTerm::Or(terms) => {
            if terms.is_empty() {
                "false".to_string()
            } else if terms.len() == 1 {
                to_smtlib(&terms[0])
            } else {
                let inner: Vec<String> = terms.iter().map(to_smtlib).collect();
                format!("(or {})", inner.join(" "))
            }
        }
        SatTerm::Not(inner) => format!("(not {})", to_smtlib(inner)),
        SatTerm::Implies(lhs, rhs) => {
            format!("(=> {} {})", to_smtlib(lhs), to_smtlib(rhs))
        }
    }
}

/// Quote a symbol with `|...|` unless it is a plain SMT-LIB simple symbol.
pub fn quote_symbol(name: &str) -> String {
    let simple = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "~!@$%^&*_-+=<>.?/".contains(c));
    if simple {
        name.to_string()
    } else {
        format!("|{name}|")
    }
}

/// Declarations and assertions of `constraints`, one command per line,
/// without `check-sat`.
pub fn constraints_to_script(constraints: &ConstraintSet) -> String {
    let mut script = String::from("(set-logic QF_UF)\n");
    for var in &constraints.vars {
        script.push_str(&format!("(declare-const {} Bool)\n", quote_symbol(var)));
    }
    for assertion in &constraints.assertions {
        script.push_str(&format!("(assert {})\n", to_smtlib(assertion)));
    }
    script
}
