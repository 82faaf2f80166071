use std::fmt;

/// Outcome of a request to the GitHub API.
///
/// `Pending` means a 200 arrived but the body is not decoded yet. Once the body
/// decodes the status becomes `Valid` with the aggregate as payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus<A> {
    Valid(A),
    Pending,
    /// 401
    Unauthorized,
    /// 301
    MovedPermanently,
    /// 403
    Forbidden,
    /// No response, an unexpected status code, or a body that does not decode.
    Invalid,
}

impl<A> ResponseStatus<A> {
    pub fn from_status_code(code: u16) -> Self {
        match code {
            401 => Self::Unauthorized,
            301 => Self::MovedPermanently,
            403 => Self::Forbidden,
            200 => Self::Pending,
            _ => Self::Invalid,
        }
    }

    pub fn was_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn was_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn was_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn was_moved(&self) -> bool {
        matches!(self, Self::MovedPermanently)
    }

    pub fn was_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden)
    }

    pub fn was_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    pub fn result(&self) -> Option<&A> {
        match self {
            Self::Valid(result) => Some(result),
            _ => None,
        }
    }

    pub fn into_result(self) -> Option<A> {
        match self {
            Self::Valid(result) => Some(result),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Valid(_) => "valid",
            Self::Pending => "pending",
            Self::Unauthorized => "unauthorized",
            Self::MovedPermanently => "moved permanently",
            Self::Forbidden => "forbidden",
            Self::Invalid => "invalid",
        }
    }
}

impl<A> fmt::Display for ResponseStatus<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert!(ResponseStatus::<()>::from_status_code(200).was_pending());
        assert!(ResponseStatus::<()>::from_status_code(401).was_unauthorized());
        assert!(ResponseStatus::<()>::from_status_code(301).was_moved());
        assert!(ResponseStatus::<()>::from_status_code(403).was_forbidden());
        assert!(ResponseStatus::<()>::from_status_code(404).was_invalid());
        assert!(ResponseStatus::<()>::from_status_code(500).was_invalid());
        assert!(ResponseStatus::<()>::from_status_code(302).was_invalid());
    }

    #[test]
    fn test_only_valid_carries_a_result() {
        let valid = ResponseStatus::Valid("release");
        assert!(valid.was_valid());
        assert_eq!(valid.result(), Some(&"release"));
        assert_eq!(valid.into_result(), Some("release"));

        let forbidden: ResponseStatus<&str> = ResponseStatus::Forbidden;
        assert_eq!(forbidden.result(), None);
        assert_eq!(forbidden.to_string(), "forbidden");
    }
}
