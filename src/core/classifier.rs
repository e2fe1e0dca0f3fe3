use crate::domain::model::Domain;

/// Checked top to bottom; the first domain with a matching keyword wins, so a
/// problem mentioning both "matrix" and "derivative" is calculus.
pub const DOMAIN_KEYWORDS: &[(Domain, &[&str])] = &[
    (
        Domain::Calculus,
        &["derivative", "integral", "differentiate", "integrate", "limit"],
    ),
    (
        Domain::LinearAlgebra,
        &[
            "matrix",
            "vector",
            "linear",
            "determinant",
            "eigenvalue",
            "eigenvector",
            "span",
        ],
    ),
    (
        Domain::Statistics,
        &[
            "probability",
            "distribution",
            "random",
            "variance",
            "standard deviation",
            "mean",
            "median",
            "hypothesis",
        ],
    ),
    (
        Domain::DifferentialEquations,
        &[
            "differential equation",
            "ode",
            "pde",
            "solve for y",
            "d/dx",
            "∂/∂t",
        ],
    ),
];

/// Keyword heuristic over the lower-cased text. Falls back to `General`.
pub fn classify(problem_text: &str) -> Domain {
    classify_with(DOMAIN_KEYWORDS, problem_text)
}

pub fn classify_with(table: &[(Domain, &[&str])], problem_text: &str) -> Domain {
    let lower = problem_text.to_lowercase();

    let domain = table
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(domain, _)| *domain)
        .unwrap_or_default();

    tracing::debug!("Classified problem as {}", domain);
    domain
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculus_keywords() {
        assert_eq!(classify("Find the derivative of x^2"), Domain::Calculus);
        assert_eq!(classify("Evaluate the INTEGRAL of sin x"), Domain::Calculus);
        assert_eq!(classify("Compute the limit as x -> 0"), Domain::Calculus);
    }

    #[test]
    fn test_calculus_wins_over_linear_algebra() {
        assert_eq!(
            classify("Take the derivative of each entry of the matrix A(t)"),
            Domain::Calculus
        );
    }

    #[test]
    fn test_linear_algebra() {
        assert_eq!(
            classify("Find the eigenvalues of the matrix [[1,2],[3,4]]"),
            Domain::LinearAlgebra
        );
    }

    #[test]
    fn test_statistics() {
        assert_eq!(
            classify("What is the variance of a fair die roll?"),
            Domain::Statistics
        );
        assert_eq!(
            classify("Compute the Standard Deviation of 2, 4, 4, 5"),
            Domain::Statistics
        );
    }

    #[test]
    fn test_differential_equations() {
        assert_eq!(
            classify("Solve the differential equation y' = 3y"),
            Domain::DifferentialEquations
        );
        assert_eq!(classify("Solve for y: dy = 2x"), Domain::DifferentialEquations);
    }

    #[test]
    fn test_substring_matching_is_kept() {
        // "linear" is checked before any differential-equation keyword
        assert_eq!(
            classify("Solve the linear differential equation y' + y = 0"),
            Domain::LinearAlgebra
        );
        // "mean" matches inside "meaning"
        assert_eq!(
            classify("What is the meaning of 2 + 2?"),
            Domain::Statistics
        );
    }

    #[test]
    fn test_general_fallback() {
        assert_eq!(classify("What is 17 * 23?"), Domain::General);
        assert_eq!(classify(""), Domain::General);
    }

    #[test]
    fn test_calculus_keyword_without_ode_keyword_is_always_calculus() {
        let calculus = DOMAIN_KEYWORDS[0].1;
        let fillers = ["", "matrix ", "the mean of ", "42 apples and "];
        for kw in calculus {
            for filler in fillers {
                let text = format!("{}{} of f", filler, kw.to_uppercase());
                assert_eq!(classify(&text), Domain::Calculus, "text: {}", text);
            }
        }
    }

    #[test]
    fn test_result_is_always_a_known_domain() {
        let samples = [
            "Prove there are infinitely many primes",
            "∂/∂t u = u_xx",
            "random walk on a vector space",
            "🙂",
        ];
        for sample in samples {
            assert!(Domain::ALL.contains(&classify(sample)));
        }
    }

    #[test]
    fn test_custom_table() {
        let table: &[(Domain, &[&str])] = &[(Domain::Statistics, &["dice"])];
        assert_eq!(classify_with(table, "two DICE"), Domain::Statistics);
        assert_eq!(classify_with(table, "derivative"), Domain::General);
    }
}
