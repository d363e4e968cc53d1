use crate::mvcli_lib::vote::{VoteOption, VoteRecord};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Flat fee attached to every vote transaction, in the chain's native denom.
pub const FEE_AMOUNT: &str = "50000";
/// Gas ceiling for the whole transaction. A static policy, not an estimate:
/// the figure does not scale with the number of messages.
pub const GAS_LIMIT: &str = "1500000";
const TIMEOUT_HEIGHT: &str = "0";

pub const MSG_VOTE_TYPE_URL: &str = "/cosmos.gov.v1beta1.MsgVote";

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not open unsigned transaction file '{path}'")]
    UnsignedFileOpenFailed {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("could not write unsigned transaction file '{path}'")]
    UnsignedFileWriteFailed {
        source: serde_json::Error,
        path: PathBuf,
    },
}

/// A single governance vote message inside the transaction body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVote {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub proposal_id: String,
    pub voter: String,
    pub option: VoteOption,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxBody {
    pub messages: Vec<MsgVote>,
    pub memo: String,
    pub timeout_height: String,
    pub extension_options: Vec<serde_json::Value>,
    pub non_critical_extension_options: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: Vec<Coin>,
    pub gas_limit: String,
    pub payer: String,
    pub granter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub signer_infos: Vec<serde_json::Value>,
    pub fee: Fee,
}

/// The complete unsigned transaction envelope: vote messages, fixed fee
/// policy, and an empty signature list. Field order follows the document
/// layout the daemon consumes, so serialization order is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    pub signatures: Vec<serde_json::Value>,
}

impl UnsignedTx {
    /// Assemble the unsigned transaction for the given voter. Pure
    /// construction: one message per vote record, in the order given, all
    /// remaining fields fixed constants.
    pub fn new(voter: &str, denom: &str, memo: Option<&str>, votes: &[VoteRecord]) -> Self {
        let messages = votes
            .iter()
            .map(|vote| MsgVote {
                type_url: MSG_VOTE_TYPE_URL.to_string(),
                proposal_id: vote.proposal_id.clone(),
                voter: voter.to_string(),
                option: vote.option,
            })
            .collect();
        UnsignedTx {
            body: TxBody {
                messages,
                memo: memo.unwrap_or_default().to_string(),
                timeout_height: TIMEOUT_HEIGHT.to_string(),
                extension_options: Vec::new(),
                non_critical_extension_options: Vec::new(),
            },
            auth_info: AuthInfo {
                signer_infos: Vec::new(),
                fee: Fee {
                    amount: vec![Coin {
                        denom: denom.to_string(),
                        amount: FEE_AMOUNT.to_string(),
                    }],
                    gas_limit: GAS_LIMIT.to_string(),
                    payer: String::new(),
                    granter: String::new(),
                },
            },
            signatures: Vec::new(),
        }
    }

    /// Write the document as compact JSON, creating the file or truncating
    /// a leftover from an earlier run at the same timestamp.
    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file =
            File::create(path.as_ref()).map_err(|source| Error::UnsignedFileOpenFailed {
                source,
                path: path.as_ref().to_path_buf(),
            })?;
        serde_json::to_writer(file, self).map_err(|source| Error::UnsignedFileWriteFailed {
            source,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn messages(&self) -> &[MsgVote] {
        &self.body.messages
    }
}

/// Working path of the unsigned document for one run, keyed by daemon name
/// and run timestamp.
pub fn unsigned_tx_path(daemon: &str, timestamp: &str) -> PathBuf {
    PathBuf::from(format!("/tmp/{}_{}_vote.json", daemon, timestamp))
}
