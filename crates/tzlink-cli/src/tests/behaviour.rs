//! Behavioural tests for the CLI against a fake daemon.

use std::cell::RefCell;
use std::process::ExitCode;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tzlink_protocol::{OutcomeCode, REGISTRY_NAME, ResponseMessage};

use super::support::{FakeDaemon, Invocation, StaticLoader, invoke, test_key};

#[derive(Default)]
struct CliWorld {
    daemon: Option<FakeDaemon>,
    outcome: Option<Invocation>,
}

impl CliWorld {
    fn outcome(&self) -> &Invocation {
        self.outcome.as_ref().expect("the CLI has run")
    }
}

#[fixture]
fn world() -> RefCell<CliWorld> {
    RefCell::new(CliWorld::default())
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

#[given("a daemon answering {message}")]
fn given_answering_daemon(world: &RefCell<CliWorld>, message: String) {
    let response = ResponseMessage::ok(strip_quotes(&message));
    world.borrow_mut().daemon = Some(FakeDaemon::spawn(test_key(), response).expect("daemon"));
}

#[given("a daemon failing with code {code}")]
fn given_failing_daemon(world: &RefCell<CliWorld>, code: u16) {
    let code = OutcomeCode::try_from(code).expect("known outcome code");
    let response = ResponseMessage::failure(code);
    world.borrow_mut().daemon = Some(FakeDaemon::spawn(test_key(), response).expect("daemon"));
}

#[when("the CLI runs {command}")]
fn when_cli_runs(world: &RefCell<CliWorld>, command: String) {
    let mut world = world.borrow_mut();
    let port = world.daemon.as_ref().expect("daemon spawned").port();
    let mut args = vec!["tzlink"];
    args.extend(strip_quotes(&command).split_whitespace());
    world.outcome = Some(invoke(&args, &StaticLoader::for_port(port)));
}

#[then("the CLI succeeds")]
fn then_cli_succeeds(world: &RefCell<CliWorld>) {
    let world = world.borrow();
    assert_eq!(world.outcome().exit, ExitCode::SUCCESS, "stderr: {}", world.outcome().stderr);
}

#[then("the CLI fails")]
fn then_cli_fails(world: &RefCell<CliWorld>) {
    assert_eq!(world.borrow().outcome().exit, ExitCode::FAILURE);
}

#[then("stdout is {text}")]
fn then_stdout_is(world: &RefCell<CliWorld>, text: String) {
    assert_eq!(world.borrow().outcome().stdout.trim_end(), strip_quotes(&text));
}

#[then("stderr is {text}")]
fn then_stderr_is(world: &RefCell<CliWorld>, text: String) {
    assert_eq!(world.borrow().outcome().stderr.trim_end(), strip_quotes(&text));
}

#[then("the daemon received a {member}")]
fn then_daemon_received(world: &RefCell<CliWorld>, member: String) {
    let mut world = world.borrow_mut();
    let daemon = world.daemon.as_mut().expect("daemon spawned");
    let request = daemon.take_request().expect("request recorded");
    assert_eq!(request.request_type, format!("{REGISTRY_NAME}.{member}"));
}

#[scenario(path = "tests/features/cli_lookup.feature", name = "A timezone lookup prints the daemon answer")]
fn timezone_lookup(world: RefCell<CliWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/cli_lookup.feature", name = "An alias resolves to a user id")]
fn user_lookup(world: RefCell<CliWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/cli_lookup.feature", name = "Daemon failures are reported on stderr")]
fn failure_reporting(world: RefCell<CliWorld>) {
    let _ = world;
}
