//! Strongly-typed configuration snapshot

use std::path::PathBuf;

use serde::{Serialize, Serializer};

use super::schema::{OptionKey, OptionKind};
use super::value::OptionValue;
use crate::discovery::{Parallelism, SubtreeFailurePolicy};
use crate::{Error, Result};

/// The effective configuration for one run.
///
/// Built once by [`super::ConfigResolver::resolve_settings`] and shared
/// read-only (`Arc<Settings>`) with every component afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Root of the generated state tree
    pub state: PathBuf,
    pub main_template: PathBuf,
    /// Offer codes whose subscriptions are not mirrored (exact match)
    pub excluded_sub_offers: Vec<String>,
    /// Subscription states that are not mirrored (case-insensitive)
    pub excluded_sub_states: Vec<String>,
    pub default_deployment_region: String,
    pub invalidate_cache: bool,
    pub generalize_templates: bool,
    pub export_raw_templates: bool,
    pub ignore_context_check: bool,
    /// Upper bound on concurrent directory requests in parallel stages
    pub throttle_limit: usize,
    /// Discovery root replacing the tenant root group when set
    pub partial_mg_discovery_root: Option<String>,
    pub strict_mode: bool,
    pub skip_resource_group: bool,
    pub skip_policy: bool,
    pub enable_timestamp: bool,
    pub parallel_discovery: bool,
    pub subtree_failure_policy: SubtreeFailurePolicy,
    pub ci: CiSettings,
}

/// Identifiers supplied by the CI system running the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CiSettings {
    pub github: GithubSettings,
    pub azure_devops: AzureDevOpsSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubSettings {
    #[serde(serialize_with = "redact")]
    pub token: Option<String>,
    pub repository: Option<String>,
    pub api_url: Option<String>,
    pub pull_request: Option<String>,
    pub head_ref: Option<String>,
    pub base_ref: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureDevOpsSettings {
    #[serde(serialize_with = "redact")]
    pub access_token: Option<String>,
    pub collection_uri: Option<String>,
    pub project_id: Option<String>,
    pub repository_id: Option<String>,
    pub pull_request_id: Option<String>,
    pub source_branch: Option<String>,
}

fn redact<S: Serializer>(value: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_str("***"),
        None => serializer.serialize_none(),
    }
}

impl Settings {
    /// Build the typed snapshot from resolved raw values.
    ///
    /// `lookup` must return the already-precedence-resolved value of each
    /// option. Values that do not fit the option's declared type are
    /// rejected with [`Error::Config`].
    pub fn from_lookup(mut lookup: impl FnMut(OptionKey) -> Result<OptionValue>) -> Result<Self> {
        let mut get = |key: OptionKey| -> Result<Typed> {
            let value = lookup(key)?;
            Typed::check(key, value)
        };

        let throttle = get(OptionKey::ThrottleLimit)?.integer()?;
        if throttle < 1 {
            return Err(Error::config(
                OptionKey::ThrottleLimit.env_key(),
                format!("must be at least 1, got {throttle}"),
            ));
        }
        let throttle_limit = usize::try_from(throttle).map_err(|_| {
            Error::config(OptionKey::ThrottleLimit.env_key(), "value is out of range")
        })?;

        let policy_text = get(OptionKey::SubtreeFailurePolicy)?.text()?;
        let subtree_failure_policy = policy_text
            .parse::<SubtreeFailurePolicy>()
            .map_err(|message| Error::config(OptionKey::SubtreeFailurePolicy.env_key(), message))?;

        Ok(Self {
            state: PathBuf::from(get(OptionKey::State)?.text()?),
            main_template: PathBuf::from(get(OptionKey::MainTemplate)?.text()?),
            excluded_sub_offers: get(OptionKey::ExcludedSubOffer)?.list()?,
            excluded_sub_states: get(OptionKey::ExcludedSubState)?.list()?,
            default_deployment_region: get(OptionKey::DefaultDeploymentRegion)?.text()?,
            invalidate_cache: get(OptionKey::InvalidateCache)?.boolean()?,
            generalize_templates: get(OptionKey::GeneralizeTemplates)?.boolean()?,
            export_raw_templates: get(OptionKey::ExportRawTemplates)?.boolean()?,
            ignore_context_check: get(OptionKey::IgnoreContextCheck)?.boolean()?,
            throttle_limit,
            partial_mg_discovery_root: get(OptionKey::PartialMgDiscoveryRoot)?.optional_text()?,
            strict_mode: get(OptionKey::StrictMode)?.boolean()?,
            skip_resource_group: get(OptionKey::SkipResourceGroup)?.boolean()?,
            skip_policy: get(OptionKey::SkipPolicy)?.boolean()?,
            enable_timestamp: get(OptionKey::EnableTimestamp)?.boolean()?,
            parallel_discovery: get(OptionKey::ParallelDiscovery)?.boolean()?,
            subtree_failure_policy,
            ci: CiSettings {
                github: GithubSettings {
                    token: get(OptionKey::GithubToken)?.optional_text()?,
                    repository: get(OptionKey::GithubRepository)?.optional_text()?,
                    api_url: get(OptionKey::GithubApiUrl)?.optional_text()?,
                    pull_request: get(OptionKey::GithubPullRequest)?.optional_text()?,
                    head_ref: get(OptionKey::GithubHeadRef)?.optional_text()?,
                    base_ref: get(OptionKey::GithubBaseRef)?.optional_text()?,
                    comments: get(OptionKey::GithubComments)?.optional_text()?,
                },
                azure_devops: AzureDevOpsSettings {
                    access_token: get(OptionKey::AzDevOpsAccessToken)?.optional_text()?,
                    collection_uri: get(OptionKey::AzDevOpsCollectionUri)?.optional_text()?,
                    project_id: get(OptionKey::AzDevOpsProjectId)?.optional_text()?,
                    repository_id: get(OptionKey::AzDevOpsRepositoryId)?.optional_text()?,
                    pull_request_id: get(OptionKey::AzDevOpsPullRequestId)?.optional_text()?,
                    source_branch: get(OptionKey::AzDevOpsSourceBranch)?.optional_text()?,
                },
            },
        })
    }

    /// Settings built from defaults alone.
    pub fn defaults() -> Result<Self> {
        Self::from_lookup(|key| Ok(key.default_value()))
    }

    /// How discovery should fan out, derived from the parallel flag and
    /// the throttle limit.
    pub fn parallelism(&self) -> Parallelism {
        if self.parallel_discovery && self.throttle_limit > 1 {
            Parallelism::Bounded(self.throttle_limit)
        } else {
            Parallelism::Sequential
        }
    }
}

/// A raw value paired with its option for typed extraction.
struct Typed {
    key: OptionKey,
    value: OptionValue,
}

impl Typed {
    fn check(key: OptionKey, value: OptionValue) -> Result<Self> {
        let fits = matches!(
            (key.kind(), &value),
            (OptionKind::Path | OptionKind::Text, OptionValue::Text(_) | OptionValue::Integer(_))
                | (
                    OptionKind::OptionalText,
                    OptionValue::Null | OptionValue::Text(_) | OptionValue::Integer(_)
                )
                | (OptionKind::List, OptionValue::List(_) | OptionValue::Text(_) | OptionValue::Null)
                | (OptionKind::Bool, OptionValue::Bool(_))
                | (OptionKind::Integer, OptionValue::Integer(_) | OptionValue::Text(_))
        );
        if fits {
            Ok(Self { key, value })
        } else {
            Err(Error::config(
                key.env_key(),
                format!("expected {:?}, got {} '{}'", key.kind(), value.type_name(), value),
            ))
        }
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        Error::config(self.key.env_key(), message)
    }

    fn text(self) -> Result<String> {
        match self.value {
            OptionValue::Text(text) if !text.trim().is_empty() => Ok(text),
            OptionValue::Integer(i) => Ok(i.to_string()),
            _ => Err(self.invalid("a value is required")),
        }
    }

    fn optional_text(self) -> Result<Option<String>> {
        match self.value {
            OptionValue::Null => Ok(None),
            OptionValue::Text(text) if text.trim().is_empty() => Ok(None),
            OptionValue::Text(text) => Ok(Some(text)),
            OptionValue::Integer(i) => Ok(Some(i.to_string())),
            _ => Err(self.invalid("expected a single value")),
        }
    }

    fn list(self) -> Result<Vec<String>> {
        match self.value {
            OptionValue::Null => Ok(Vec::new()),
            OptionValue::Text(text) if text.trim().is_empty() => Ok(Vec::new()),
            OptionValue::Text(text) => Ok(vec![text.trim().to_string()]),
            OptionValue::List(items) => Ok(items),
            _ => Err(self.invalid("expected a comma-separated list")),
        }
    }

    fn boolean(self) -> Result<bool> {
        match self.value {
            OptionValue::Bool(b) => Ok(b),
            _ => Err(self.invalid("expected true or false")),
        }
    }

    fn integer(self) -> Result<i64> {
        match &self.value {
            OptionValue::Integer(i) => Ok(*i),
            OptionValue::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| self.invalid(format!("expected an integer, got '{text}'"))),
            _ => Err(self.invalid("expected an integer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_produce_safe_settings() {
        let settings = Settings::defaults().unwrap();
        assert_eq!(settings.state, PathBuf::from("root"));
        assert_eq!(settings.throttle_limit, 10);
        assert_eq!(settings.subtree_failure_policy, SubtreeFailurePolicy::Abort);
        assert!(settings.invalidate_cache);
        assert!(!settings.parallel_discovery);
        assert_eq!(settings.parallelism(), Parallelism::Sequential);
        assert_eq!(settings.partial_mg_discovery_root, None);
        assert_eq!(settings.excluded_sub_states.len(), 5);
    }

    #[test]
    fn single_text_for_list_option_is_one_element_list() {
        let settings = Settings::from_lookup(|key| {
            Ok(match key {
                OptionKey::ExcludedSubOffer => OptionValue::Text("MS-AZR-0017P".into()),
                other => other.default_value(),
            })
        })
        .unwrap();
        assert_eq!(settings.excluded_sub_offers, vec!["MS-AZR-0017P"]);
    }

    #[test]
    fn non_bool_text_for_bool_option_is_rejected() {
        let err = Settings::from_lookup(|key| {
            Ok(match key {
                OptionKey::StrictMode => OptionValue::Text("yes".into()),
                other => other.default_value(),
            })
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config { option, .. } if option == "MIRROR_STRICT_MODE"));
    }

    #[test]
    fn malformed_throttle_limit_is_rejected() {
        for bad in ["ten", "0", "-3"] {
            let err = Settings::from_lookup(|key| {
                Ok(match key {
                    OptionKey::ThrottleLimit => OptionValue::Text(bad.into()),
                    other => other.default_value(),
                })
            })
            .unwrap_err();
            assert!(
                matches!(&err, Error::Config { option, .. } if option == "MIRROR_THROTTLE_LIMIT"),
                "{bad} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn list_for_scalar_option_is_rejected() {
        let err = Settings::from_lookup(|key| {
            Ok(match key {
                OptionKey::DefaultDeploymentRegion => {
                    OptionValue::List(vec!["westeurope".into(), "northeurope".into()])
                }
                other => other.default_value(),
            })
        })
        .unwrap_err();
        assert!(err.to_string().contains("MIRROR_DEFAULT_DEPLOYMENT_REGION"));
    }

    #[test]
    fn parallel_flag_uses_throttle_limit() {
        let settings = Settings::from_lookup(|key| {
            Ok(match key {
                OptionKey::ParallelDiscovery => OptionValue::Bool(true),
                OptionKey::ThrottleLimit => OptionValue::Integer(4),
                other => other.default_value(),
            })
        })
        .unwrap();
        assert_eq!(settings.parallelism(), Parallelism::Bounded(4));
    }

    #[test]
    fn tokens_are_redacted_when_serialized() {
        let settings = Settings::from_lookup(|key| {
            Ok(match key {
                OptionKey::GithubToken => OptionValue::Text("ghp_secret".into()),
                other => other.default_value(),
            })
        })
        .unwrap();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("ghp_secret"));
        assert!(json.contains("\"token\":\"***\""));
        assert_eq!(settings.ci.github.token.as_deref(), Some("ghp_secret"));
    }
}
