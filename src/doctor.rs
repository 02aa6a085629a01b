//! `cc-hookguard doctor`: check that the guard will load and behave.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::{Config, Options};
use crate::eval::Guard;
use crate::logging::DebugLog;

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub config_path: Option<PathBuf>,
    pub rules: usize,
    pub checks: Vec<Check>,
}

impl Report {
    pub fn healthy(&self) -> bool {
        self.checks.iter().all(|c| c.ok)
    }

    fn push(&mut self, name: &'static str, ok: bool, detail: impl Into<String>) {
        self.checks.push(Check {
            name,
            ok,
            detail: detail.into(),
        });
    }

    /// Human-readable form.
    pub fn render(&self) -> String {
        let mut out = String::from("cc-hookguard doctor\n");
        for check in &self.checks {
            let mark = if check.ok { "✅" } else { "❌" };
            let _ = writeln!(out, "  {mark} {}: {}", check.name, check.detail);
        }
        let summary = if self.healthy() {
            format!("healthy, {} rule(s) active", self.rules)
        } else {
            "problems found; the hook will fail closed with exit 1".to_string()
        };
        let _ = writeln!(out, "  {summary}");
        out
    }
}

/// Run every check in order, stopping at the first that later ones depend on.
pub fn diagnose(options: &Options) -> Report {
    let mut report = Report::default();

    let loaded = match Config::discover(options) {
        Ok(Some(loaded)) => loaded,
        Ok(None) => {
            // No config is a valid state: the hook allows everything.
            report.push(
                "config",
                true,
                "no .cc-hookguard.toml found; every tool call is allowed",
            );
            return report;
        }
        Err(e) => {
            report.push("config", false, e.to_string());
            return report;
        }
    };
    report.push("config", true, format!("loaded {}", loaded.path.display()));
    report.config_path = Some(loaded.path.clone());

    let Some(section) = &loaded.config.guard else {
        report.push("guard", true, "no [guard] table; every tool call is allowed");
        return report;
    };
    report.push("guard", true, format!("{} rule definition(s)", section.rules.len()));

    match Guard::from_defs(&section.rules) {
        Ok(guard) => {
            report.rules = guard.rules().len();
            report.push("rules", true, format!("{} compiled", report.rules));
        }
        Err(e) => {
            report.push("rules", false, e.to_string());
        }
    }

    match loaded.debug_log_path() {
        Ok(None) => {}
        Ok(Some(path)) => match DebugLog::open(&path) {
            Ok(_) => {
                report.push("debug_log", true, format!("writable: {}", path.display()));
            }
            Err(e) => {
                report.push("debug_log", false, format!("{}: {e}", path.display()));
            }
        },
        Err(e) => {
            report.push("debug_log", false, e.to_string());
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;

    fn options_for(config: &str) -> (tempfile::TempDir, Options) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, config).unwrap();
        let options = Options {
            config_path: Some(path),
            cwd: dir.path().to_path_buf(),
            ..Default::default()
        };
        (dir, options)
    }

    #[test]
    fn scaffold_is_healthy() {
        let (_dir, options) = options_for(Config::scaffold());
        let report = diagnose(&options);
        assert!(report.healthy(), "{}", report.render());
        assert!(report.rules > 0);
        assert!(report.render().contains("rule(s) active"));
    }

    #[test]
    fn bad_rule_is_unhealthy() {
        let (_dir, options) = options_for(
            "[guard]\n[[guard.rules]]\nname = \"x\"\npattern = \"(\"\nmessage = \"m\"\n",
        );
        let report = diagnose(&options);
        assert!(!report.healthy());
        assert!(report.checks.iter().any(|c| c.name == "rules" && !c.ok));
    }

    #[test]
    fn debug_log_checked() {
        let (dir, options) = options_for("[guard]\ndebug_log = \"out/log.jsonl\"\n");
        let report = diagnose(&options);
        assert!(report.healthy());
        assert!(report.checks.iter().any(|c| c.name == "debug_log"));
        assert!(dir.path().join("out/log.jsonl").exists());
    }

    #[test]
    fn json_shape() {
        let (_dir, options) = options_for("");
        let value = serde_json::to_value(diagnose(&options)).unwrap();
        assert_eq!(value["checks"][0]["name"], "config");
        assert_eq!(value["checks"][1]["name"], "guard");
        assert_eq!(value["rules"], 0);
    }
}
