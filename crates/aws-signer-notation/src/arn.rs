//! ARN parsing.
//!
//! Format: `arn:<partition>:<service>:<region>:<account-id>:<resource>`.
//! The resource is everything after the fifth `:` and may contain further
//! `:` characters.

use std::fmt;
use std::str::FromStr;

const ARN_PREFIX: &str = "arn:";
const ARN_SECTIONS: usize = 6;

/// Service name of AWS Signer in ARNs.
pub const SIGNER_SERVICE: &str = "signer";

/// Resource prefix shared by signing profiles and profile versions.
pub const SIGNING_PROFILES_PREFIX: &str = "/signing-profiles/";

/// A parsed Amazon Resource Name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

/// ARN parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArnError {
    #[error("arn: invalid prefix")]
    InvalidPrefix,

    #[error("arn: not enough sections")]
    NotEnoughSections,
}

impl Arn {
    pub fn parse(s: &str) -> Result<Self, ArnError> {
        if !s.starts_with(ARN_PREFIX) {
            return Err(ArnError::InvalidPrefix);
        }

        let sections: Vec<&str> = s.splitn(ARN_SECTIONS, ':').collect();
        if sections.len() != ARN_SECTIONS {
            return Err(ArnError::NotEnoughSections);
        }

        Ok(Self {
            partition: sections[1].to_string(),
            service: sections[2].to_string(),
            region: sections[3].to_string(),
            account_id: sections[4].to_string(),
            resource: sections[5].to_string(),
        })
    }

    /// Number of `/`-separated segments in the resource.
    ///
    /// `/signing-profiles/Name` has 3 segments (the leading one is empty),
    /// `/signing-profiles/Name/Version` has 4.
    pub fn resource_segment_count(&self) -> usize {
        self.resource.split('/').count()
    }

    /// Whether this ARN names an AWS Signer signing profile or profile version.
    pub fn is_signing_profile(&self) -> bool {
        self.service == SIGNER_SERVICE && self.resource.starts_with(SIGNING_PROFILES_PREFIX)
    }
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

/// Parse `s` and keep it only if it is a signing-profile ARN.
pub fn parse_signing_profile_arn(s: &str) -> Option<Arn> {
    Arn::parse(s).ok().filter(Arn::is_signing_profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_ARN: &str =
        "arn:aws:signer:us-west-2:000000000000:/signing-profiles/NotaryPluginIntegProfile";

    #[test]
    fn test_parse_profile_arn() {
        let arn = Arn::parse(PROFILE_ARN).unwrap();
        assert_eq!(arn.partition, "aws");
        assert_eq!(arn.service, "signer");
        assert_eq!(arn.region, "us-west-2");
        assert_eq!(arn.account_id, "000000000000");
        assert_eq!(arn.resource, "/signing-profiles/NotaryPluginIntegProfile");
        assert_eq!(arn.resource_segment_count(), 3);
        assert!(arn.is_signing_profile());
        assert_eq!(arn.to_string(), PROFILE_ARN);
    }

    #[test]
    fn test_parse_profile_version_arn() {
        let arn: Arn = format!("{}/OF8IVUsPJq", PROFILE_ARN).parse().unwrap();
        assert_eq!(arn.resource_segment_count(), 4);
        assert!(arn.is_signing_profile());
    }

    #[test]
    fn test_resource_may_contain_colons() {
        let arn = Arn::parse("arn:aws:s3:::bucket:key:with:colons").unwrap();
        assert_eq!(arn.region, "");
        assert_eq!(arn.account_id, "");
        assert_eq!(arn.resource, "bucket:key:with:colons");
    }

    #[test]
    fn test_parse_invalid_prefix() {
        assert_eq!(Arn::parse("NotationProfile"), Err(ArnError::InvalidPrefix));
        assert_eq!(Arn::parse(""), Err(ArnError::InvalidPrefix));
    }

    #[test]
    fn test_parse_not_enough_sections() {
        assert_eq!(
            Arn::parse("arn:us-west-2:000000000000:/signing-profile/P/1234/asda"),
            Err(ArnError::NotEnoughSections)
        );
    }

    #[test]
    fn test_signing_profile_filter() {
        assert!(parse_signing_profile_arn(PROFILE_ARN).is_some());
        assert!(parse_signing_profile_arn(
            "arn:aws:signer:us-west-2:000000000000:/signing-jobs/97af3947"
        )
        .is_none());
        assert!(parse_signing_profile_arn(
            "arn:aws:dynamodb:us-east-2:123456789012:table/myDynamoDBTable"
        )
        .is_none());
        assert!(parse_signing_profile_arn("Cheers!").is_none());
    }
}
