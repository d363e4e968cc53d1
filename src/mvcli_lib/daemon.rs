use std::{
    fmt,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    thread,
    time::Duration,
};
use thiserror::Error;

/// Pause between the sign and broadcast invocations. The daemon needs a
/// moment to settle after writing the signed document; tune it here rather
/// than at the call site.
pub const BROADCAST_DELAY: Duration = Duration::from_secs(1);

const PASSPHRASE_PROMPT: &str = "Enter keyring passphrase: ";

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not launch daemon '{daemon}'")]
    DaemonSpawnFailed {
        source: std::io::Error,
        daemon: String,
    },
    #[error("could not collect output from daemon '{daemon}'")]
    DaemonWaitFailed {
        source: std::io::Error,
        daemon: String,
    },
    #[error("could not locate a home directory for the signed transaction file")]
    HomeDirNotFound,
}

/// Keyring passphrase, read once from the controlling terminal and handed
/// only to [`Daemon::sign`]. The `Debug` impl redacts the secret so it can
/// never leak through error reporting.
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(secret: String) -> Self {
        Passphrase(secret)
    }

    pub fn read_from_tty() -> std::io::Result<Self> {
        rpassword::read_password_from_tty(Some(PASSPHRASE_PROMPT)).map(Passphrase)
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

/// Everything the signing invocation needs besides the daemon's own
/// connection settings.
pub struct SignRequest<'a> {
    pub unsigned_file: &'a Path,
    pub signed_file: &'a Path,
    pub key_name: &'a str,
    pub keyring_backend: &'a str,
}

pub struct BroadcastRequest<'a> {
    pub signed_file: &'a Path,
}

/// Captured result of one daemon invocation. Exit status and output are
/// surfaced to the operator; neither aborts the run.
#[derive(Debug, Clone)]
pub struct DaemonOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl DaemonOutput {
    /// Print the daemon's output verbatim, with a warning when the step
    /// exited with an error. The run continues either way.
    pub fn report(&self, step: &str) {
        if !self.stdout.is_empty() {
            println!("{}", self.stdout);
        }
        if !self.stderr.is_empty() {
            eprintln!("{}", self.stderr);
        }
        if !self.success {
            eprintln!("warning: '{}' exited with an error, continuing", step);
        }
    }
}

impl From<Output> for DaemonOutput {
    fn from(output: Output) -> Self {
        DaemonOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// The external chain daemon as this tool sees it: a collaborator with two
/// operations. The command-line implementation lives in [`CommandDaemon`];
/// tests substitute their own.
pub trait Daemon {
    fn sign(&self, request: &SignRequest<'_>, passphrase: &Passphrase)
        -> Result<DaemonOutput, Error>;

    fn broadcast(&self, request: &BroadcastRequest<'_>) -> Result<DaemonOutput, Error>;
}

/// Invokes the daemon executable directly (no shell), captures its output,
/// and feeds the passphrase through the child's standard input.
pub struct CommandDaemon {
    daemon: String,
    node: String,
    chain_id: String,
}

impl CommandDaemon {
    pub fn new(daemon: &str, node: &str, chain_id: &str) -> Self {
        CommandDaemon {
            daemon: daemon.to_string(),
            node: node.to_string(),
            chain_id: chain_id.to_string(),
        }
    }

    fn collect(&self, mut command: Command) -> Result<DaemonOutput, Error> {
        let child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::DaemonSpawnFailed {
                source,
                daemon: self.daemon.clone(),
            })?;
        let output = child
            .wait_with_output()
            .map_err(|source| Error::DaemonWaitFailed {
                source,
                daemon: self.daemon.clone(),
            })?;
        Ok(output.into())
    }
}

impl Daemon for CommandDaemon {
    fn sign(
        &self,
        request: &SignRequest<'_>,
        passphrase: &Passphrase,
    ) -> Result<DaemonOutput, Error> {
        let mut command = Command::new(&self.daemon);
        command
            .args(&["tx", "sign"])
            .arg(request.unsigned_file)
            .args(&["--from", request.key_name])
            .arg("-ojson")
            .arg("--output-document")
            .arg(request.signed_file)
            .args(&["--node", &self.node])
            .args(&["--chain-id", &self.chain_id])
            .args(&["--keyring-backend", request.keyring_backend])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = command.spawn().map_err(|source| Error::DaemonSpawnFailed {
            source,
            daemon: self.daemon.clone(),
        })?;
        {
            let stdin = child
                .stdin
                .as_mut()
                .expect("child stdin was configured as piped");
            // the daemon may have exited before reading the passphrase
            if let Err(source) = writeln!(stdin, "{}", passphrase.expose()) {
                eprintln!(
                    "warning: could not pass the keyring passphrase to '{}': {}",
                    self.daemon, source
                );
            }
        }
        let output = child
            .wait_with_output()
            .map_err(|source| Error::DaemonWaitFailed {
                source,
                daemon: self.daemon.clone(),
            })?;
        Ok(output.into())
    }

    fn broadcast(&self, request: &BroadcastRequest<'_>) -> Result<DaemonOutput, Error> {
        let mut command = Command::new(&self.daemon);
        command
            .args(&["tx", "broadcast"])
            .arg(request.signed_file)
            .args(&["--node", &self.node])
            .args(&["--chain-id", &self.chain_id])
            .stdin(Stdio::null());
        self.collect(command)
    }
}

/// Sign the unsigned document, wait out [`BROADCAST_DELAY`], then broadcast
/// the signed one. Daemon-reported failures are printed and do not stop the
/// sequence; only a daemon that cannot be invoked at all aborts.
pub fn sign_and_broadcast<D: Daemon>(
    daemon: &D,
    node: &str,
    chain_id: &str,
    request: &SignRequest<'_>,
    passphrase: &Passphrase,
) -> Result<(), Error> {
    println!(
        "Signing {} as {}",
        request.unsigned_file.display(),
        request.signed_file.display()
    );
    daemon.sign(request, passphrase)?.report("tx sign");

    thread::sleep(BROADCAST_DELAY);

    println!(
        "Sending {} to {} for chain {}",
        request.signed_file.display(),
        node,
        chain_id
    );
    daemon
        .broadcast(&BroadcastRequest {
            signed_file: request.signed_file,
        })?
        .report("tx broadcast");
    Ok(())
}

/// Destination of the signed document produced by the daemon, under the
/// invoking user's home directory.
pub fn signed_tx_path(daemon: &str, timestamp: &str) -> Result<PathBuf, Error> {
    let home = dirs::home_dir().ok_or(Error::HomeDirNotFound)?;
    Ok(home.join(format!("{}_{}_vote_signed.json", daemon, timestamp)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingDaemon {
        calls: RefCell<Vec<String>>,
        sign_succeeds: bool,
    }

    impl RecordingDaemon {
        fn new(sign_succeeds: bool) -> Self {
            RecordingDaemon {
                calls: RefCell::new(Vec::new()),
                sign_succeeds,
            }
        }
    }

    impl Daemon for RecordingDaemon {
        fn sign(
            &self,
            request: &SignRequest<'_>,
            _passphrase: &Passphrase,
        ) -> Result<DaemonOutput, Error> {
            self.calls
                .borrow_mut()
                .push(format!("sign {}", request.unsigned_file.display()));
            Ok(DaemonOutput {
                success: self.sign_succeeds,
                stdout: String::new(),
                stderr: String::new(),
            })
        }

        fn broadcast(&self, request: &BroadcastRequest<'_>) -> Result<DaemonOutput, Error> {
            self.calls
                .borrow_mut()
                .push(format!("broadcast {}", request.signed_file.display()));
            Ok(DaemonOutput {
                success: true,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    fn request<'a>(unsigned: &'a Path, signed: &'a Path) -> SignRequest<'a> {
        SignRequest {
            unsigned_file: unsigned,
            signed_file: signed,
            key_name: "validator",
            keyring_backend: "test",
        }
    }

    #[test]
    fn sign_runs_before_broadcast() {
        let unsigned = Path::new("/tmp/kujirad_x_vote.json");
        let signed = Path::new("/tmp/kujirad_x_vote_signed.json");
        let daemon = RecordingDaemon::new(true);

        sign_and_broadcast(
            &daemon,
            "https://rpc.example:443",
            "kaiyo-1",
            &request(unsigned, signed),
            &Passphrase::new("hunter2".to_string()),
        )
        .unwrap();

        assert_eq!(
            *daemon.calls.borrow(),
            vec![
                "sign /tmp/kujirad_x_vote.json".to_string(),
                "broadcast /tmp/kujirad_x_vote_signed.json".to_string(),
            ]
        );
    }

    #[test]
    fn broadcast_still_runs_when_sign_reports_failure() {
        let unsigned = Path::new("/tmp/kujirad_x_vote.json");
        let signed = Path::new("/tmp/kujirad_x_vote_signed.json");
        let daemon = RecordingDaemon::new(false);

        sign_and_broadcast(
            &daemon,
            "https://rpc.example:443",
            "kaiyo-1",
            &request(unsigned, signed),
            &Passphrase::new("hunter2".to_string()),
        )
        .unwrap();

        assert_eq!(daemon.calls.borrow().len(), 2);
    }

    #[test]
    fn passphrase_debug_redacts_the_secret() {
        let passphrase = Passphrase::new("hunter2".to_string());
        let formatted = format!("{:?}", passphrase);
        assert!(!formatted.contains("hunter2"));
        assert_eq!(formatted, "Passphrase(<redacted>)");
    }

    #[test]
    fn signed_path_lives_in_the_home_directory() {
        let path = signed_tx_path("kujirad", "20260807-120000").unwrap();
        assert!(path.ends_with("kujirad_20260807-120000_vote_signed.json"));
        assert_eq!(path.parent(), dirs::home_dir().as_deref());
    }
}
