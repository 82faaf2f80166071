use crate::domain::model::Release;
use crate::utils::error::{Result, ViewerError};
use std::fmt;
use std::str::FromStr;

/// Operator applied as `target <op> release_version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equality,
    Distinction,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equality => "==",
            Self::Distinction => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    pub fn evaluate(&self, left: u64, right: u64) -> bool {
        match self {
            Self::Equality => left == right,
            Self::Distinction => left != right,
            Self::Less => left < right,
            Self::LessOrEqual => left <= right,
            Self::Greater => left > right,
            Self::GreaterOrEqual => left >= right,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOperator {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "==" | "eq" | "equal" | "equality" => Ok(Self::Equality),
            "!=" | "ne" | "different" | "distinction" => Ok(Self::Distinction),
            "<" | "lt" | "less" => Ok(Self::Less),
            "<=" | "le" | "lessorequal" => Ok(Self::LessOrEqual),
            ">" | "gt" | "greater" => Ok(Self::Greater),
            ">=" | "ge" | "greaterorequal" => Ok(Self::GreaterOrEqual),
            _ => Err(ViewerError::InvalidConfigValueError {
                field: "operator".to_string(),
                value: s.to_string(),
                reason: "Expected one of ==, !=, <, <=, >, >=".to_string(),
            }),
        }
    }
}

/// Flattens a tag such as `v2.3.4` into the number `234`.
///
/// Every `.` is dropped and a single leading `v` is stripped before the rest is
/// parsed, so `1.10.0` and `11.0.0` flatten to the same value.
pub fn version_number(tag: &str) -> Result<u64> {
    let without_dots = tag.trim().replace('.', "");
    let digits = without_dots.strip_prefix('v').unwrap_or(&without_dots);
    digits
        .parse::<u64>()
        .map_err(|_| ViewerError::InvalidVersionError {
            version: tag.to_string(),
        })
}

impl Release {
    pub fn version_number(&self) -> Result<u64> {
        version_number(&self.tag)
    }

    pub fn compare_version_number(
        &self,
        operator: ComparisonOperator,
        target: u64,
    ) -> Result<bool> {
        Ok(operator.evaluate(target, self.version_number()?))
    }

    pub fn compare_version_string(
        &self,
        operator: ComparisonOperator,
        target: &str,
    ) -> Result<bool> {
        self.compare_version_number(operator, version_number(target)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str) -> Release {
        Release {
            id: "49032123".to_string(),
            author: "aivruu".to_string(),
            tag: tag.to_string(),
            name: format!("{} - Improvements and Features", tag),
            assets: vec![],
            published_at: None,
        }
    }

    #[test]
    fn test_version_number_flattens_tag() {
        assert_eq!(version_number("v2.3.4").unwrap(), 234);
        assert_eq!(version_number("1.3.4").unwrap(), 134);
        assert_eq!(version_number("10").unwrap(), 10);
    }

    #[test]
    fn test_version_number_rejects_non_numeric() {
        assert!(version_number("v1.2.3-beta").is_err());
        assert!(version_number("latest").is_err());
        assert!(version_number("").is_err());
    }

    #[test]
    fn test_older_target_is_less_than_release() {
        let latest = release("v3.3.4");
        assert!(latest
            .compare_version_string(ComparisonOperator::Less, "v2.3.4")
            .unwrap());
        assert!(!latest
            .compare_version_string(ComparisonOperator::Greater, "v2.3.4")
            .unwrap());
    }

    #[test]
    fn test_every_operator_against_equal_version() {
        let current = release("v1.0.0");
        let expectations = [
            (ComparisonOperator::Equality, true),
            (ComparisonOperator::Distinction, false),
            (ComparisonOperator::Less, false),
            (ComparisonOperator::LessOrEqual, true),
            (ComparisonOperator::Greater, false),
            (ComparisonOperator::GreaterOrEqual, true),
        ];
        for (operator, expected) in expectations {
            assert_eq!(
                current.compare_version_number(operator, 100).unwrap(),
                expected,
                "operator {}",
                operator
            );
        }
    }

    #[test]
    fn test_invalid_release_tag_is_an_error() {
        let nightly = release("nightly");
        assert!(matches!(
            nightly.compare_version_number(ComparisonOperator::Equality, 1),
            Err(ViewerError::InvalidVersionError { .. })
        ));
    }

    #[test]
    fn test_operator_from_str() {
        assert_eq!(
            ">=".parse::<ComparisonOperator>().unwrap(),
            ComparisonOperator::GreaterOrEqual
        );
        assert_eq!(
            "LESS_OR_EQUAL".parse::<ComparisonOperator>().unwrap(),
            ComparisonOperator::LessOrEqual
        );
        assert_eq!(
            "distinction".parse::<ComparisonOperator>().unwrap(),
            ComparisonOperator::Distinction
        );
        assert!("~=".parse::<ComparisonOperator>().is_err());
    }
}
