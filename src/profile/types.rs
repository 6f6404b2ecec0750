/*!
 * Profile Types
 * Policy profiles, capability flags and framework indirection rules
 */

use crate::core::limits::{SYSTEM_PROFILE_ID, SYSTEM_PID};
use crate::core::serde::{is_false, is_none};
use crate::core::types::ProfileId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU8;

/// Capability flag consulted by the enforcement layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFlag {
    /// Ask the user for unknown connections
    Prompt,
    /// Deny everything not explicitly permitted
    Blacklist,
    /// Permit everything not explicitly denied
    Whitelist,
    /// Connections to the internet
    Internet,
    /// Connections to the local network
    LocalNet,
    /// Connections to raw IP addresses without a prior DNS lookup
    Directconnect,
    /// Accepting incoming connections
    Service,
    PeerToPeer,
    System,
    Admin,
    User,
    /// Resolve without consulting the community layer
    Independent,
}

/// Set of capability flags
pub type ProfileFlags = BTreeSet<ProfileFlag>;

/// Rewrite a wrapper's command line into the command it wraps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "index", rename_all = "snake_case")]
pub enum RewriteRule {
    /// Resume at the first argument after the program that is not a `-flag`
    FirstNonFlagArgument,
    /// Resume at the n-th argument (0 is the program itself)
    Argument(usize),
}

/// Indirection rule attached to a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Framework {
    /// Walk up `hops` ancestors and become an alias of that ancestor
    AscendAndMerge { hops: NonZeroU8 },
    /// Walk up `hops` ancestors and re-match using the ancestor's executable
    AscendAndRematch { hops: NonZeroU8 },
    /// Rewrite the command line and re-match the resulting program
    Rewrite { rule: RewriteRule },
}

/// What the matcher must do after finding a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAction<'a> {
    /// Bind the profile and stop
    Terminal,
    AscendAndMerge { hops: u8 },
    AscendAndRematch { hops: u8 },
    Rewrite(&'a RewriteRule),
}

/// A named network policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub default: bool,
    #[serde(default)]
    pub flags: ProfileFlags,
    #[serde(default, skip_serializing_if = "is_none")]
    pub framework: Option<Framework>,
    #[serde(default, skip_serializing_if = "is_none")]
    pub icon: Option<String>,
}

impl Profile {
    pub fn new(id: impl Into<ProfileId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            default: false,
            flags: ProfileFlags::new(),
            framework: None,
            icon: None,
        }
    }

    /// Built-in profile for the kernel/idle process
    pub fn system() -> Self {
        Self::new(SYSTEM_PROFILE_ID, "OS").with_flags([
            ProfileFlag::Internet,
            ProfileFlag::LocalNet,
            ProfileFlag::Directconnect,
            ProfileFlag::Service,
        ])
    }

    pub fn with_flags(mut self, flags: impl IntoIterator<Item = ProfileFlag>) -> Self {
        self.flags = flags.into_iter().collect();
        self
    }

    pub fn with_framework(mut self, framework: Framework) -> Self {
        self.framework = Some(framework);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    /// Key stored on a process to find this profile again
    pub fn key(&self) -> String {
        format!("profiles/{}", self.id)
    }

    pub fn has_flag(&self, flag: ProfileFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn has_icon(&self) -> bool {
        self.icon.as_deref().map_or(false, |i| !i.is_empty())
    }

    /// Action the matcher takes for this profile
    pub fn match_action(&self) -> MatchAction<'_> {
        match &self.framework {
            None => MatchAction::Terminal,
            Some(Framework::AscendAndMerge { hops }) => {
                MatchAction::AscendAndMerge { hops: hops.get() }
            }
            Some(Framework::AscendAndRematch { hops }) => {
                MatchAction::AscendAndRematch { hops: hops.get() }
            }
            Some(Framework::Rewrite { rule }) => MatchAction::Rewrite(rule),
        }
    }

    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_PROFILE_ID
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Whether `pid` is the platform's kernel/idle process
#[inline]
pub fn is_system_pid(pid: crate::core::types::Pid) -> bool {
    pid == SYSTEM_PID
}
