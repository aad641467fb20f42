use common::ValidationError;
use regex::Regex;

/// Regions the loader can be deployed into.
pub const SUPPORTED_REGIONS: [&str; 9] = [
    "ap-northeast-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "eu-central-1",
    "eu-west-1",
    "sa-east-1",
    "us-east-1",
    "us-west-1",
    "us-west-2",
];

pub const DEFAULT_CLUSTER_PORT: i64 = 5433;

/// Returns the trimmed answer, or fails with `message` when nothing was entered.
pub fn require(answer: &str, message: &str) -> Result<String, ValidationError> {
    match blank(answer) {
        Some(value) => Ok(value),
        None => Err(ValidationError::Blank {
            message: message.to_string(),
        }),
    }
}

/// `None` for an empty or whitespace-only answer, the trimmed value otherwise.
pub fn blank(answer: &str) -> Option<String> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn integer(answer: &str) -> Result<i64, ValidationError> {
    let trimmed = answer.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| ValidationError::NotInteger {
            value: trimmed.to_string(),
        })
}

pub fn positive_integer(answer: &str) -> Result<i64, ValidationError> {
    let value = integer(answer)?;
    if value <= 0 {
        return Err(ValidationError::NotPositive {
            value: answer.trim().to_string(),
        });
    }
    Ok(value)
}

/// Lower-cases the answer and checks it against `allowed`.
pub fn one_of(allowed: &[&str], answer: &str) -> Result<String, ValidationError> {
    let candidate = answer.trim().to_lowercase();
    if allowed.contains(&candidate.as_str()) {
        Ok(candidate)
    } else {
        Err(ValidationError::NotAllowed {
            value: candidate,
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        })
    }
}

pub fn cluster_port(answer: &str) -> Result<i64, ValidationError> {
    if answer.trim().is_empty() {
        return Ok(DEFAULT_CLUSTER_PORT);
    }
    positive_integer(answer)
}

/// Checks the filename filter against Rust `regex` syntax.
///
/// Lookaround and backreferences are not supported and are rejected here,
/// so the loader never receives a filter it cannot compile.
pub fn pattern(answer: &str) -> Result<String, ValidationError> {
    Regex::new(answer)
        .map(|_| answer.to_string())
        .map_err(|e| ValidationError::InvalidPattern {
            value: answer.to_string(),
            reason: e.to_string(),
        })
}

/// Strips every `s3://` scheme and a single trailing slash.
///
/// A bare bucket name is returned unchanged.
pub fn normalize_s3_location(location: &str) -> String {
    let stripped = location.replace("s3://", "");
    if !stripped.contains('/') {
        return stripped;
    }
    match stripped.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => stripped,
    }
}

/// Bucket portion of a normalised `bucket/prefix` location.
pub fn bucket_of(location: &str) -> &str {
    location.split('/').next().unwrap_or(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_blank() {
        assert_eq!(
            require("   ", "You Must Provide a Username"),
            Err(ValidationError::Blank {
                message: "You Must Provide a Username".to_string()
            })
        );
        assert_eq!(require(" admin ", "unused").unwrap(), "admin");
    }

    #[test]
    fn test_blank() {
        assert_eq!(blank(""), None);
        assert_eq!(blank("\t "), None);
        assert_eq!(blank(" x "), Some("x".to_string()));
    }

    #[test]
    fn test_integer() {
        assert_eq!(integer("42").unwrap(), 42);
        assert_eq!(integer(" -7 ").unwrap(), -7);
        assert!(matches!(
            integer("4.2"),
            Err(ValidationError::NotInteger { .. })
        ));
        assert!(matches!(
            integer("ten"),
            Err(ValidationError::NotInteger { .. })
        ));
    }

    #[test]
    fn test_region_is_case_insensitive() {
        assert_eq!(one_of(&SUPPORTED_REGIONS, "US-East-1").unwrap(), "us-east-1");
        assert_eq!(one_of(&SUPPORTED_REGIONS, "eu-central-1").unwrap(), "eu-central-1");
        for region in SUPPORTED_REGIONS {
            assert_eq!(one_of(&SUPPORTED_REGIONS, &region.to_uppercase()).unwrap(), region);
        }
    }

    #[test]
    fn test_region_outside_set() {
        let err = one_of(&SUPPORTED_REGIONS, "us-east-2").unwrap_err();
        match err {
            ValidationError::NotAllowed { value, allowed } => {
                assert_eq!(value, "us-east-2");
                assert_eq!(allowed.len(), 9);
            }
            other => panic!("Expected NotAllowed, got {:?}", other),
        }
    }

    #[test]
    fn test_cluster_port() {
        assert_eq!(cluster_port("").unwrap(), 5433);
        assert_eq!(cluster_port("5444").unwrap(), 5444);
        assert!(matches!(
            cluster_port("http"),
            Err(ValidationError::NotInteger { .. })
        ));
        assert!(matches!(
            cluster_port("0"),
            Err(ValidationError::NotPositive { .. })
        ));
    }

    #[test]
    fn test_pattern() {
        assert_eq!(pattern(r".*\.csv$").unwrap(), r".*\.csv$");
        assert!(matches!(
            pattern("(unclosed"),
            Err(ValidationError::InvalidPattern { .. })
        ));
        assert!(matches!(
            pattern(r"^(?!tmp_).*\.csv$"),
            Err(ValidationError::InvalidPattern { .. })
        ));
        assert_eq!(pattern(r"^[^t].*\.csv$").unwrap(), r"^[^t].*\.csv$");
    }

    #[test]
    fn test_normalize_s3_location() {
        assert_eq!(normalize_s3_location("s3://bucket/prefix/"), "bucket/prefix");
        assert_eq!(normalize_s3_location("bucket"), "bucket");
        assert_eq!(normalize_s3_location("s3://bucket"), "bucket");
        assert_eq!(normalize_s3_location("bucket/"), "bucket");
        assert_eq!(normalize_s3_location("bucket/a/b"), "bucket/a/b");
    }

    #[test]
    fn test_bucket_of() {
        assert_eq!(bucket_of("mybucket/incoming"), "mybucket");
        assert_eq!(bucket_of("mybucket"), "mybucket");
    }
}
