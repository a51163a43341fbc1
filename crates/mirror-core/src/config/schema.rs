//! The fixed set of options, their environment keys, types and defaults

use super::value::OptionValue;

/// Expected type of an option after coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Path,
    Text,
    /// Text that may be absent
    OptionalText,
    List,
    Bool,
    Integer,
}

macro_rules! options {
    ($($variant:ident => $env:literal, $kind:ident, $default:expr;)+) => {
        /// Every option the engine understands.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum OptionKey {
            $($variant,)+
        }

        impl OptionKey {
            pub const ALL: &'static [OptionKey] = &[$(OptionKey::$variant,)+];

            /// Environment variable (and settings file key) for this option.
            pub fn env_key(&self) -> &'static str {
                match self {
                    $(Self::$variant => $env,)+
                }
            }

            pub fn kind(&self) -> OptionKind {
                match self {
                    $(Self::$variant => OptionKind::$kind,)+
                }
            }

            /// Built-in default, the lowest-precedence source.
            pub fn default_value(&self) -> OptionValue {
                match self {
                    $(Self::$variant => $default,)+
                }
            }
        }
    };
}

fn text(value: &str) -> OptionValue {
    OptionValue::Text(value.to_string())
}

fn list(items: &[&str]) -> OptionValue {
    OptionValue::List(items.iter().map(|s| s.to_string()).collect())
}

options! {
    State => "MIRROR_STATE", Path, text("root");
    MainTemplate => "MIRROR_MAIN_TEMPLATE", Path, text("template/template.json");
    ExcludedSubOffer => "MIRROR_EXCLUDED_SUB_OFFER", List,
        list(&["AzurePass_2014-09-01", "FreeTrial_2014-09-01", "AAD_2015-09-01"]);
    ExcludedSubState => "MIRROR_EXCLUDED_SUB_STATE", List,
        list(&["Disabled", "Deleted", "Warned", "Expired", "PastDue"]);
    DefaultDeploymentRegion => "MIRROR_DEFAULT_DEPLOYMENT_REGION", Text, text("northeurope");
    InvalidateCache => "MIRROR_INVALIDATE_CACHE", Bool, OptionValue::Bool(true);
    GeneralizeTemplates => "MIRROR_GENERALIZE_TEMPLATES", Bool, OptionValue::Bool(false);
    ExportRawTemplates => "MIRROR_EXPORT_RAW_TEMPLATES", Bool, OptionValue::Bool(false);
    IgnoreContextCheck => "MIRROR_IGNORE_CONTEXT_CHECK", Bool, OptionValue::Bool(false);
    ThrottleLimit => "MIRROR_THROTTLE_LIMIT", Integer, OptionValue::Integer(10);
    PartialMgDiscoveryRoot => "MIRROR_PARTIAL_MG_DISCOVERY_ROOT", OptionalText, OptionValue::Null;
    StrictMode => "MIRROR_STRICT_MODE", Bool, OptionValue::Bool(false);
    SkipResourceGroup => "MIRROR_SKIP_RESOURCE_GROUP", Bool, OptionValue::Bool(false);
    SkipPolicy => "MIRROR_SKIP_POLICY", Bool, OptionValue::Bool(false);
    EnableTimestamp => "MIRROR_ENABLE_TIMESTAMP", Bool, OptionValue::Bool(false);
    ParallelDiscovery => "MIRROR_PARALLEL_DISCOVERY", Bool, OptionValue::Bool(false);
    SubtreeFailurePolicy => "MIRROR_SUBTREE_FAILURE_POLICY", Text, text("abort");
    GithubToken => "GITHUB_TOKEN", OptionalText, OptionValue::Null;
    GithubRepository => "GITHUB_REPOSITORY", OptionalText, OptionValue::Null;
    GithubApiUrl => "GITHUB_API_URL", OptionalText, OptionValue::Null;
    GithubPullRequest => "GITHUB_PULL_REQUEST", OptionalText, OptionValue::Null;
    GithubHeadRef => "GITHUB_HEAD_REF", OptionalText, OptionValue::Null;
    GithubBaseRef => "GITHUB_BASE_REF", OptionalText, OptionValue::Null;
    GithubComments => "GITHUB_COMMENTS", OptionalText, OptionValue::Null;
    AzDevOpsAccessToken => "SYSTEM_ACCESSTOKEN", OptionalText, OptionValue::Null;
    AzDevOpsCollectionUri => "SYSTEM_TEAMFOUNDATIONCOLLECTIONURI", OptionalText, OptionValue::Null;
    AzDevOpsProjectId => "SYSTEM_TEAMPROJECTID", OptionalText, OptionValue::Null;
    AzDevOpsRepositoryId => "BUILD_REPOSITORY_ID", OptionalText, OptionValue::Null;
    AzDevOpsPullRequestId => "SYSTEM_PULLREQUEST_PULLREQUESTID", OptionalText, OptionValue::Null;
    AzDevOpsSourceBranch => "BUILD_SOURCEBRANCHNAME", OptionalText, OptionValue::Null;
}

impl OptionKey {
    /// Look an option up by its environment key (case-insensitive).
    pub fn from_env_key(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|option| option.env_key().eq_ignore_ascii_case(key))
    }

    /// Whether the value must never be printed.
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::GithubToken | Self::AzDevOpsAccessToken)
    }
}

impl std::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.env_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn env_keys_are_unique() {
        let keys: HashSet<_> = OptionKey::ALL.iter().map(|k| k.env_key()).collect();
        assert_eq!(keys.len(), OptionKey::ALL.len());
    }

    #[test]
    fn defaults_match_declared_kinds() {
        for key in OptionKey::ALL {
            let ok = matches!(
                (key.kind(), key.default_value()),
                (OptionKind::Path | OptionKind::Text, OptionValue::Text(_))
                    | (OptionKind::OptionalText, OptionValue::Null)
                    | (OptionKind::List, OptionValue::List(_))
                    | (OptionKind::Bool, OptionValue::Bool(_))
                    | (OptionKind::Integer, OptionValue::Integer(_))
            );
            assert!(ok, "default for {key} does not match its kind");
        }
    }

    #[test]
    fn from_env_key_ignores_case() {
        assert_eq!(
            OptionKey::from_env_key("mirror_throttle_limit"),
            Some(OptionKey::ThrottleLimit)
        );
        assert_eq!(OptionKey::from_env_key("UNKNOWN"), None);
    }
}
