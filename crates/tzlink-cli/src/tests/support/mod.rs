//! Shared helpers for CLI tests.

mod fake_daemon;

use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Mutex;

use ortho_config::OrthoConfig;
use tzlink_config::{Config, SocketEndpoint};
use tzlink_protocol::SharedKey;

use crate::AppError;
use crate::config::ConfigLoader;

pub(in crate::tests) use fake_daemon::FakeDaemon;

pub(in crate::tests) const TEST_SECRET: &str = "0123456789abcdef";

pub(in crate::tests) fn test_key() -> SharedKey {
    SharedKey::from_passphrase(TEST_SECRET).expect("valid key")
}

/// Loader returning a fixed configuration and recording what it was given.
pub(in crate::tests) struct StaticLoader {
    config: Config,
    seen: Mutex<Vec<OsString>>,
}

impl StaticLoader {
    pub(in crate::tests) fn for_port(port: u16) -> Self {
        Self {
            config: Config {
                listen: SocketEndpoint::tcp("127.0.0.1", port),
                aes_key: TEST_SECRET.to_owned(),
                ..Config::default()
            },
            seen: Mutex::default(),
        }
    }

    pub(in crate::tests) fn with_key(mut self, key: &str) -> Self {
        key.clone_into(&mut self.config.aes_key);
        self
    }

    pub(in crate::tests) fn seen(&self) -> Vec<OsString> {
        self.seen.lock().expect("loader mutex").clone()
    }
}

impl ConfigLoader for StaticLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        args.clone_into(&mut self.seen.lock().expect("loader mutex"));
        Ok(self.config.clone())
    }
}

/// Loader that always fails the way a bad flag would.
pub(in crate::tests) struct BrokenLoader;

impl ConfigLoader for BrokenLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        let error = Config::load_from_iter(["tzlink", "--listen", "udp://x:1"])
            .expect_err("udp endpoints are rejected");
        Err(AppError::LoadConfiguration(error))
    }
}

/// Captured output of one CLI invocation.
pub(in crate::tests) struct Invocation {
    pub(in crate::tests) exit: ExitCode,
    pub(in crate::tests) stdout: String,
    pub(in crate::tests) stderr: String,
}

pub(in crate::tests) fn invoke<L: ConfigLoader>(args: &[&str], loader: &L) -> Invocation {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = crate::run_with_loader(
        args.iter().map(OsString::from),
        &mut stdout,
        &mut stderr,
        loader,
    );
    Invocation {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

/// Ephemeral port with nothing listening on it.
pub(in crate::tests) fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind probe");
    let port = listener.local_addr().expect("probe address").port();
    drop(listener);
    port
}
