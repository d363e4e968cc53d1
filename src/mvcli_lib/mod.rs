pub mod daemon;
pub mod transaction;
pub mod vote;

use crate::mvcli_lib::{
    daemon::{CommandDaemon, Passphrase, SignRequest},
    transaction::UnsignedTx,
};
use chrono::Local;
use structopt::StructOpt;
use thiserror::Error;

/// Timestamp keying both artifact paths of one run. Second resolution: two
/// runs started within the same second overwrite each other's files.
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Vote(#[from] vote::Error),
    #[error(transparent)]
    Transaction(#[from] transaction::Error),
    #[error(transparent)]
    Daemon(#[from] daemon::Error),
    #[error("could not read the keyring passphrase")]
    PassphraseReadFailed(#[source] std::io::Error),
}

/// Create a json file for multiple votes in a single transaction
#[derive(StructOpt)]
#[structopt(name = "mvcli")]
pub struct MvCli {
    /// native chain denom
    #[structopt(long = "denom", default_value = "ukuji")]
    denom: String,

    /// daemon for sending tx
    #[structopt(long = "daemon", default_value = "kujirad")]
    daemon: String,

    /// Chain ID (ex. kaiyo-1)
    #[structopt(short = "c", long = "chain_id", default_value = "cosmoshub-4")]
    chain_id: String,

    /// RPC endpoint
    #[structopt(short = "e", long = "endpoint")]
    endpoint: Option<String>,

    /// Memo to send with votes
    #[structopt(short = "m", long = "memo")]
    memo: Option<String>,

    /// Wallet to vote from
    #[structopt(short = "k", long = "keyname")]
    keyname: Option<String>,

    /// Keyring Backend type
    #[structopt(short = "b", long = "keyringbackend", default_value = "test")]
    keyringbackend: String,

    /// Address to vote from
    #[structopt(short = "s", long = "send_address")]
    send_address: String,

    /// Votes in the format of `proposal_id:vote_option` (eg: 110:no 111:yes
    /// 112:veto 113:abstain)
    #[structopt(
        short = "v",
        long = "vote",
        required = true,
        number_of_values = 1
    )]
    vote: Vec<String>,

    /// Do not sign or broadcast tx, just prepare the .json file
    #[structopt(short = "d", long = "dry-run")]
    dry_run: bool,
}

impl MvCli {
    pub fn exec(self) -> Result<(), Error> {
        let votes = vote::build_vote_list(&self.vote)?;
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let unsigned = UnsignedTx::new(
            &self.send_address,
            &self.denom,
            self.memo.as_deref(),
            &votes,
        );
        let unsigned_path = transaction::unsigned_tx_path(&self.daemon, &timestamp);
        unsigned.store(&unsigned_path)?;

        if self.dry_run {
            println!("Wrote unsigned transaction to {}", unsigned_path.display());
            return Ok(());
        }

        let signed_path = daemon::signed_tx_path(&self.daemon, &timestamp)?;
        let passphrase = Passphrase::read_from_tty().map_err(Error::PassphraseReadFailed)?;

        // endpoint and keyname are not validated here: when omitted the
        // daemon receives empty values and reports the problem itself
        let node = self.endpoint.as_deref().unwrap_or_default();
        let key_name = self.keyname.as_deref().unwrap_or_default();

        let command_daemon = CommandDaemon::new(&self.daemon, node, &self.chain_id);
        let request = SignRequest {
            unsigned_file: &unsigned_path,
            signed_file: &signed_path,
            key_name,
            keyring_backend: &self.keyringbackend,
        };
        daemon::sign_and_broadcast(&command_daemon, node, &self.chain_id, &request, &passphrase)?;
        Ok(())
    }
}
