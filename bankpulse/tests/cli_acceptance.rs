use bankpulse_core::Database;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("bankpulse/data.db")
    }
}

fn run_bin(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("bankpulse"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute bankpulse: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "bankpulse {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

#[test]
fn kpis_lists_full_catalog_and_filters() {
    let env = CliTestEnv::new();

    let output = run_bin(&env, &["kpis"]);
    assert_success(&["kpis"], &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cc_aht"));
    assert!(stdout.contains("mb_active_users"));
    assert!(stdout.contains("36 KPI(s)"));

    let args = ["kpis", "--domain", "contact_center", "--priority", "critical"];
    let filtered = run_bin(&env, &args);
    assert_success(&args, &filtered);
    let stdout = String::from_utf8_lossy(&filtered.stdout);
    assert!(stdout.contains("cc_aht"));
    assert!(
        !stdout.contains("mb_active_users"),
        "mobile KPIs should be filtered out, got:\n{stdout}"
    );
}

#[test]
fn kpis_json_is_parseable() {
    let env = CliTestEnv::new();

    let args = ["kpis", "--format", "json", "--domain", "mobile_banking"];
    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("kpis json should parse");
    let defs = parsed.as_array().expect("expected a json array");
    assert_eq!(defs.len(), 18);
    assert!(defs
        .iter()
        .all(|d| d["domain"] == "mobile_banking" && d["target"].is_number()));
}

#[test]
fn compute_reports_values_and_captures_bad_ids() {
    let env = CliTestEnv::new();

    let args = ["compute", "--tenant", "1", "cc_aht", "no_such_kpi"];
    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cc_aht"));
    assert!(stdout.contains("KPI not found: no_such_kpi"));
    assert!(stdout.contains("Computed 1 KPI(s) for tenant 1, 1 failed"));

    assert!(
        env.db_path().exists(),
        "database file should exist at {}",
        env.db_path().display()
    );
}

#[test]
fn compute_rejects_non_positive_tenant() {
    let env = CliTestEnv::new();

    let args = ["compute", "--tenant", "0", "cc_aht"];
    let output = run_bin(&env, &args);
    assert!(
        !output.status.success(),
        "tenant 0 should fail the whole invocation"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid tenant id: 0"),
        "expected tenant rejection in stderr, got:\n{stderr}"
    );
}

#[test]
fn compute_json_emits_reports_with_status_fields() {
    let env = CliTestEnv::new();

    let args = ["compute", "--tenant", "2", "--format", "json", "cc_csat"];
    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("compute json should parse");
    let outcomes = parsed.as_array().expect("expected a json array");
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0]["id"], "cc_csat");
    assert_eq!(outcomes[0]["tenant_id"], 2);
    assert!(outcomes[0]["value"].as_f64().expect("numeric value") > 0.0);
}

#[test]
fn series_produces_a_year_of_points() {
    let env = CliTestEnv::new();

    let args = ["series", "--tenant", "1", "mb_active_users", "--format", "json"];
    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("series json should parse");
    assert_eq!(parsed["id"], "mb_active_users");
    let points = parsed["historical_data"]
        .as_array()
        .expect("expected historical_data array");
    assert_eq!(points.len(), 365);
    assert!(points.iter().all(|p| p["value"].as_f64().unwrap() >= 0.0));
}

#[test]
fn seed_populates_observations_used_by_compute() {
    let env = CliTestEnv::new();

    let seed_args = ["seed", "--tenant", "1", "--days", "3", "cc_aht"];
    let seed_output = run_bin(&env, &seed_args);
    assert_success(&seed_args, &seed_output);
    let stdout = String::from_utf8_lossy(&seed_output.stdout);
    assert!(stdout.contains("Seeded 3 observation(s)"));

    let db = Database::open(&env.db_path()).expect("failed to open db");
    db.migrate().expect("failed to migrate db");
    // No seeded row may sit in the future: counting up to now sees all 3
    let now = chrono::Utc::now();
    let count = db
        .observation_count(1, "cc_aht", now - chrono::Duration::days(3650), now)
        .expect("failed to count observations");
    assert_eq!(count, 3);

    // The newest row falls inside the default trailing day
    let day = db
        .observation_count(1, "cc_aht", now - chrono::Duration::hours(24), now)
        .expect("failed to count observations");
    assert_eq!(day, 1);

    // A wide window picks up the seeded rows instead of the fallback
    let args = [
        "compute",
        "--tenant",
        "1",
        "--since",
        "2020-01-01",
        "--format",
        "json",
        "cc_aht",
    ];
    let output = run_bin(&env, &args);
    assert_success(&args, &output);
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("compute json should parse");
    assert!(parsed[0]["value"].as_f64().expect("numeric value") >= 0.0);
}
