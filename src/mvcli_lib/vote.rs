use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed vote '{token}', expected '<proposal_id>:<vote_option>'")]
    MalformedVote { token: String },
}

/// Governance vote option, serialized under the wire names the chain daemon
/// expects in a `MsgVote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOption {
    #[serde(rename = "VOTE_OPTION_YES")]
    Yes,
    #[serde(rename = "VOTE_OPTION_NO")]
    No,
    #[serde(rename = "VOTE_OPTION_ABSTAIN")]
    Abstain,
    #[serde(rename = "VOTE_OPTION_NO_WITH_VETO")]
    NoWithVeto,
    #[serde(rename = "VOTE_OPTION_UNSPECIFIED")]
    Unspecified,
}

impl VoteOption {
    /// Map free-form option text onto the vote option enumeration.
    ///
    /// The match is case-insensitive and exact: no trimming, no prefixes.
    /// Anything outside `yes`/`no`/`abstain`/`veto` comes back as
    /// `Unspecified`.
    pub fn normalize(text: &str) -> Self {
        if text.eq_ignore_ascii_case("yes") {
            VoteOption::Yes
        } else if text.eq_ignore_ascii_case("no") {
            VoteOption::No
        } else if text.eq_ignore_ascii_case("abstain") {
            VoteOption::Abstain
        } else if text.eq_ignore_ascii_case("veto") {
            VoteOption::NoWithVeto
        } else {
            VoteOption::Unspecified
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            VoteOption::Yes => "VOTE_OPTION_YES",
            VoteOption::No => "VOTE_OPTION_NO",
            VoteOption::Abstain => "VOTE_OPTION_ABSTAIN",
            VoteOption::NoWithVeto => "VOTE_OPTION_NO_WITH_VETO",
            VoteOption::Unspecified => "VOTE_OPTION_UNSPECIFIED",
        }
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.wire_name().fmt(f)
    }
}

/// One vote on one proposal, as parsed from a `proposal_id:vote_option`
/// token.
///
/// The proposal id is kept as the raw string from the command line so the
/// document carries exactly what the operator typed; the daemon owns the
/// numeric interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub proposal_id: String,
    pub option: VoteOption,
}

impl FromStr for VoteRecord {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (proposal_id, option_text) =
            token.split_once(':').ok_or_else(|| Error::MalformedVote {
                token: token.to_string(),
            })?;
        let option = VoteOption::normalize(option_text);
        if option == VoteOption::Unspecified {
            eprintln!(
                "warning: unrecognized vote option '{}' in '{}', recording it as {}",
                option_text, token, option
            );
        }
        Ok(VoteRecord {
            proposal_id: proposal_id.to_string(),
            option,
        })
    }
}

/// Parse `proposal_id:vote_option` tokens into vote records, keeping the
/// input order. The first malformed token aborts the whole list.
pub fn build_vote_list<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<VoteRecord>, Error> {
    tokens
        .iter()
        .map(|token| token.as_ref().parse())
        .collect()
}
