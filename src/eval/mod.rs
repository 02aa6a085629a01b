pub mod decision;
pub mod input;
pub mod rule;

pub use decision::{Block, Decision};
pub use input::{HookInput, command_text, synthetic_input};
pub use rule::{Check, CompiledRule, RuleDef, ToolScope, compile};

use serde_json::json;

use crate::error::RuleError;
use crate::logging::DebugLog;
use crate::parse::split_segments;

/// A compiled, ordered rule list.
///
/// Rules are checked in declaration order and the first match wins, so
/// callers must put more specific rules first when messages differ.
#[derive(Debug)]
pub struct Guard {
    rules: Vec<CompiledRule>,
}

impl Guard {
    /// Compile rule definitions into a guard.
    pub fn from_defs(defs: &[RuleDef]) -> Result<Self, RuleError> {
        Ok(Self {
            rules: compile(defs)?,
        })
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Decide one invocation. `raw_input` is the `tool_input` JSON text.
    pub fn check(&self, tool_name: &str, raw_input: &str) -> Decision {
        check_logged(&self.rules, tool_name, raw_input, &DebugLog::disabled())
    }

    /// Like [`Guard::check`], recording each step to `log`.
    pub fn check_logged(&self, tool_name: &str, raw_input: &str, log: &DebugLog) -> Decision {
        check_logged(&self.rules, tool_name, raw_input, log)
    }
}

/// Run `rules` against one invocation; first match wins.
pub fn check(rules: &[CompiledRule], tool_name: &str, raw_input: &str) -> Decision {
    check_logged(rules, tool_name, raw_input, &DebugLog::disabled())
}

/// Run `rules` against one invocation, recording each step to `log`.
///
/// Each applicable rule is tested against the whole input first, since
/// structural checks such as `chained` need the compound command in view.
/// When that misses and the command has several segments, the rule is
/// tested against each segment on its own.
pub fn check_logged(
    rules: &[CompiledRule],
    tool_name: &str,
    raw_input: &str,
    log: &DebugLog,
) -> Decision {
    let command = command_text(raw_input);
    log.event(
        "start",
        json!({ "tool_name": tool_name, "command": command, "rules": rules.len() }),
    );

    if raw_input.is_empty() {
        return finish(Decision::Allow, log);
    }

    let segments: Vec<String> = split_segments(&command)
        .iter()
        .map(|s| synthetic_input(s))
        .collect();
    let segments: &[String] = if segments.len() > 1 { &segments } else { &[] };

    for rule in rules {
        let applies = rule.applies_to(tool_name);
        log.event("rule", json!({ "rule": rule.name, "applies": applies }));
        if !applies {
            continue;
        }
        if rule_matches(rule, raw_input, segments, log) {
            log::debug!("rule {} blocked {tool_name}", rule.name);
            return finish(
                Decision::Block(Block {
                    rule: rule.name.clone(),
                    message: rule.message.clone(),
                }),
                log,
            );
        }
    }

    finish(Decision::Allow, log)
}

fn rule_matches(rule: &CompiledRule, raw_input: &str, segments: &[String], log: &DebugLog) -> bool {
    let matched = rule.matches(raw_input);
    log.event(
        "check",
        json!({ "rule": rule.name, "target": "full", "matched": matched }),
    );
    if matched {
        return true;
    }
    segments.iter().enumerate().any(|(index, segment)| {
        let matched = rule.matches(segment);
        log.event(
            "check",
            json!({ "rule": rule.name, "target": "segment", "index": index, "matched": matched }),
        );
        matched
    })
}

fn finish(decision: Decision, log: &DebugLog) -> Decision {
    match &decision {
        Decision::Allow => log.event("result", json!({ "decision": decision.as_str() })),
        Decision::Block(block) => log.event(
            "result",
            json!({ "decision": decision.as_str(), "rule": block.rule, "message": block.message }),
        ),
    }
    decision
}
