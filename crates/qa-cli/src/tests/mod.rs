//! Unit and behavioural tests for the CLI runtime.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use once_cell::sync::Lazy;
use qa_adapters::{FetchError, Fetcher, SharedFetcher};
use qa_authority::dispatch::RetryPolicy;
use rstest::rstest;
use serde_json::Value;
use tempfile::TempDir;

use crate::cli::Command;
use crate::config::{
    Config, ConfigError, ConfigLoader, DEFAULT_LOG_FILTER, DEFAULT_TIMEOUT_SECS,
    OrthoConfigLoader, command_arguments, split_config_arguments,
};
use crate::errors::AppError;
use crate::logging::{LogFormat, ResolvedLogFormat};
use crate::run_with;
use crate::telemetry::{TelemetryError, parse_filter};


pub(crate) const MESH_TERMS: &str =
    "terms:\n  - id: D000001\n    term: Calcimycin\n  - id: D006331\n    term: Heart Diseases\n";
pub(crate) const TGNLANG_TERMS: &str =
    "terms:\n  - id: '300388694'\n    term: Tibetan\n  - id: '300389028'\n    term: Tamil\n";

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn lock_env() -> MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sets environment variables for one test and restores them on drop.
struct EnvOverride {
    previous: Vec<(&'static str, Option<OsString>)>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_vars(vars: &[(&'static str, &str)]) -> Self {
        let guard = lock_env();
        let previous = vars
            .iter()
            .map(|(key, value)| {
                let previous = std::env::var_os(key);
                // Environment mutation is unsafe in edition 2024; ENV_MUTEX
                // serialises every test that touches QA_* variables.
                unsafe { std::env::set_var(key, OsStr::new(value)) };
                (*key, previous)
            })
            .collect();
        Self {
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        for (key, previous) in self.previous.drain(..) {
            match previous {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
        drop(self.guard.take());
    }
}

/// Fetcher that refuses every connection.
pub(crate) struct OfflineFetcher;

impl OfflineFetcher {
    fn refuse<T>(url: &str) -> Result<T, FetchError> {
        Err(FetchError::Connection {
            url: url.to_owned(),
            message: String::from("offline"),
        })
    }
}

impl Fetcher for OfflineFetcher {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        Self::refuse(url)
    }

    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        Self::refuse(url)
    }
}

/// Captured result of one CLI invocation.
pub(crate) struct Invocation {
    pub(crate) code: ExitCode,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

fn argv(args: &[&str]) -> Vec<OsString> {
    std::iter::once("qa")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

pub(crate) fn invoke(args: &[&str]) -> Invocation {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = {
        let _env = lock_env();
        run_with(argv(args), &mut stdout, &mut stderr, &OrthoConfigLoader, |_| {
            let fetcher: SharedFetcher = Arc::new(OfflineFetcher);
            Ok::<_, AppError>(fetcher)
        })
    };
    Invocation {
        code,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

pub(crate) fn write_data(dir: &Path) {
    fs::write(dir.join("mesh.yml"), MESH_TERMS).expect("write mesh");
    fs::write(dir.join("tgnlang.yml"), TGNLANG_TERMS).expect("write tgnlang");
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

fn load(args: &[&str]) -> Result<Config, AppError> {
    let _env = lock_env();
    OrthoConfigLoader.load(&argv(args))
}

fn write_toml(dir: &Path, contents: &str) -> String {
    let path = dir.join("qa.toml");
    fs::write(&path, contents).expect("write config");
    path_arg(&path)
}

// ---------------------------------------------------------------------------
// Configuration layering
// ---------------------------------------------------------------------------

#[test]
fn defaults_apply_without_file_or_flags() {
    let config = load(&[]).expect("load defaults");
    assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    assert_eq!(config.log_format(), LogFormat::Auto);
    assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    assert_eq!(config.retry_policy(), RetryPolicy::none());
    assert_eq!(config.catalog().namespace, "Qa::Authorities");
    assert!(config.catalog().mesh_path.is_none());
}

#[test]
fn toml_file_values_override_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let mesh = dir.path().join("mesh.yml");
    let path = write_toml(
        dir.path(),
        &format!(
            "log_format = \"compact\"\ntimeout_secs = 5\nretry_attempts = 3\nmesh_path = {:?}\n",
            path_arg(&mesh)
        ),
    );
    let config = load(&["--config-path", &path]).expect("load file");
    assert_eq!(config.log_format(), LogFormat::Compact);
    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(config.retry_policy(), RetryPolicy::attempts(3));
    assert_eq!(config.catalog().mesh_path.as_deref(), Some(mesh.as_path()));
}

#[test]
fn environment_overrides_file_values() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_toml(dir.path(), "timeout_secs = 5\nnamespace = \"Vocab\"\n");
    let _env = EnvOverride::set_vars(&[("QA_TIMEOUT_SECS", "7")]);

    let config = OrthoConfigLoader
        .load(&argv(&["--config-path", &path]))
        .expect("load layered");
    assert_eq!(config.timeout(), Duration::from_secs(7));
    assert_eq!(config.catalog().namespace, "Vocab");
}

#[test]
fn flags_override_environment() {
    let _env = EnvOverride::set_vars(&[("QA_TIMEOUT_SECS", "7"), ("QA_NAMESPACE", "Vocab")]);

    let config = OrthoConfigLoader
        .load(&argv(&["--timeout-secs", "9"]))
        .expect("load layered");
    assert_eq!(config.timeout(), Duration::from_secs(9));
    assert_eq!(config.catalog().namespace, "Vocab");
}

#[test]
fn malformed_file_is_a_load_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_toml(dir.path(), "timeout_secs = \"soon\"\n");
    let error = load(&["--config-path", &path]).expect_err("malformed file must fail");
    assert!(matches!(error, AppError::LoadConfiguration(_)), "{error:?}");
    assert!(error.to_string().starts_with("failed to load configuration: "));
}

#[rstest]
#[case::zero_timeout(&["--timeout-secs", "0"], "timeout_secs")]
#[case::zero_retries(&["--retry-attempts", "0"], "retry_attempts")]
#[case::blank_namespace(&["--namespace", "  "], "namespace")]
fn out_of_range_values_are_rejected(#[case] args: &[&str], #[case] key: &str) {
    let error = load(args).expect_err("invalid value must fail");
    assert!(
        matches!(&error, AppError::Config(ConfigError::Invalid(message)) if message.starts_with(key)),
        "{error:?}"
    );
}

// ---------------------------------------------------------------------------
// Argument splitting
// ---------------------------------------------------------------------------

#[test]
fn leading_config_flags_are_split_from_the_command() {
    let args = argv(&["--log-filter", "off", "--mesh-path=/data/mesh.yml", "list", "mesh"]);
    let split = split_config_arguments(&args);
    assert_eq!(
        split.config_arguments,
        argv(&["--log-filter", "off", "--mesh-path=/data/mesh.yml"])
    );
    assert_eq!(split.command_start, 4);
    assert_eq!(command_arguments(&args, &split), argv(&["list", "mesh"]));
}

#[rstest]
#[case::help(&["--help"])]
#[case::command_first(&["list", "--timeout-secs", "3", "mesh"])]
#[case::unknown_flag(&["--verbose", "--timeout-secs", "3"])]
fn splitting_stops_at_the_first_non_config_token(#[case] args: &[&str]) {
    let args = argv(args);
    let split = split_config_arguments(&args);
    assert_eq!(split.config_arguments, argv(&[]));
    assert_eq!(command_arguments(&args, &split), args);
}

#[test]
fn empty_arguments_split_to_nothing() {
    let split = split_config_arguments(&[]);
    assert!(split.config_arguments.is_empty());
    assert!(command_arguments(&[], &split).is_empty());
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[rstest]
#[case("auto", LogFormat::Auto)]
#[case("json", LogFormat::Json)]
#[case("COMPACT", LogFormat::Compact)]
fn log_format_parses_case_insensitively(#[case] raw: &str, #[case] expected: LogFormat) {
    assert_eq!(LogFormat::from_str(raw).expect("parse format"), expected);
    assert_eq!(expected.to_string(), raw.to_ascii_lowercase());
}

#[rstest]
#[case::auto_terminal(LogFormat::Auto, true, ResolvedLogFormat::Compact)]
#[case::auto_redirected(LogFormat::Auto, false, ResolvedLogFormat::Json)]
#[case::json_terminal(LogFormat::Json, true, ResolvedLogFormat::Json)]
#[case::compact_redirected(LogFormat::Compact, false, ResolvedLogFormat::Compact)]
fn log_format_resolves_against_stderr(
    #[case] format: LogFormat,
    #[case] terminal: bool,
    #[case] expected: ResolvedLogFormat,
) {
    assert_eq!(format.resolve(terminal), expected);
}

#[test]
fn invalid_log_filter_names_the_expression() {
    let error = parse_filter("qa=verbose").expect_err("unknown level must fail");
    assert!(matches!(&error, TelemetryError::Filter { filter, .. } if filter == "qa=verbose"));
    assert!(error.to_string().contains("\"qa=verbose\""));
}

// ---------------------------------------------------------------------------
// Argument mapping
// ---------------------------------------------------------------------------

#[test]
fn show_command_maps_to_find_request() {
    let command = Command::Show {
        vocabulary: String::from("loc"),
        id: String::from("sh85077565"),
        subauthority: Some(String::from("subjects")),
    };
    let request = command.to_request();
    assert_eq!(request.vocabulary_id(), "loc");
    assert_eq!(request.subauthority_id(), Some("subjects"));
    assert_eq!(
        request.operation().kind(),
        qa_authority::Operation::FindById
    );
}

// ---------------------------------------------------------------------------
// End-to-end runs
// ---------------------------------------------------------------------------

#[test]
fn list_prints_terms_and_succeeds() {
    let dir = TempDir::new().expect("temp dir");
    write_data(dir.path());
    let mesh = path_arg(&dir.path().join("mesh.yml"));
    let outcome = invoke(&["--log-filter", "off", "--mesh-path", &mesh, "list", "mesh"]);
    assert_eq!(outcome.code, ExitCode::SUCCESS);
    let body: Value = serde_json::from_str(outcome.stdout.trim()).expect("json body");
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert!(outcome.stderr.is_empty());
}

#[test]
fn unknown_vocabulary_exits_with_not_found() {
    let outcome = invoke(&["--log-filter", "off", "search", "nope", "x"]);
    assert_eq!(outcome.code, ExitCode::from(1));
    assert!(outcome.stdout.is_empty());
    assert_eq!(outcome.stderr.trim(), "not found");
}

#[test]
fn backend_failure_exits_with_not_found() {
    let outcome = invoke(&["--log-filter", "off", "search", "loc", "cats", "-s", "subjects"]);
    assert_eq!(outcome.code, ExitCode::from(1));
}

#[test]
fn invalid_configuration_exits_with_failure() {
    let outcome = invoke(&["--timeout-secs", "0", "list", "mesh"]);
    assert_eq!(outcome.code, ExitCode::from(2));
    assert!(outcome.stderr.contains("timeout_secs must be at least 1"));
}

#[test]
fn malformed_configuration_file_exits_with_failure() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_toml(dir.path(), "retry_attempts = [\n");
    let outcome = invoke(&["--config-path", &path, "list", "mesh"]);
    assert_eq!(outcome.code, ExitCode::from(2));
    assert!(outcome.stderr.starts_with("failed to load configuration: "));
}

#[test]
fn config_flags_after_the_command_are_usage_errors() {
    let outcome = invoke(&["list", "mesh", "--timeout-secs", "3"]);
    assert_eq!(outcome.code, ExitCode::from(2));
    assert!(outcome.stdout.is_empty());
}

#[test]
fn usage_errors_exit_with_failure() {
    let outcome = invoke(&["list"]);
    assert_eq!(outcome.code, ExitCode::from(2));
    assert!(outcome.stdout.is_empty());
    assert!(!outcome.stderr.is_empty());
}

#[test]
fn help_goes_to_stdout() {
    let outcome = invoke(&["--help"]);
    assert_eq!(outcome.code, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("search"));
    assert!(outcome.stdout.contains("--timeout-secs"));
}

#[test]
fn http_transport_builds_with_timeout() {
    let fetcher = crate::ReqwestFetcher::new(Duration::from_secs(3));
    assert!(fetcher.is_ok());
}
