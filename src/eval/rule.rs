//! Rule definitions and their compiled form.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::input::{DEFAULT_TOOL, command_field};
use crate::builtins::Builtin;
use crate::error::RuleError;

/// A rule as written in configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    pub name: String,
    /// Regular expression checked against the command text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Name of a builtin check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<String>,
    /// Shown to the caller when the rule blocks.
    #[serde(default)]
    pub message: String,
    /// Tools the rule applies to. Empty means `Bash` only; `"*"` means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

/// What a compiled rule tests.
#[derive(Debug)]
pub enum Check {
    Pattern(Regex),
    Builtin(Builtin),
}

impl Check {
    /// Test a `tool_input` JSON text.
    ///
    /// Patterns see the command text when the input has one, otherwise the
    /// whole JSON text, so they also work for non-shell tools.
    pub fn matches(&self, raw_input: &str) -> bool {
        match self {
            Check::Pattern(re) => match command_field(raw_input) {
                Some(command) => re.is_match(&command),
                None => re.is_match(raw_input),
            },
            Check::Builtin(builtin) => builtin.check(raw_input),
        }
    }
}

/// Which tool names a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolScope {
    /// No `tools` given.
    Default,
    /// `tools` contains `"*"`.
    Any,
    Only(HashSet<String>),
}

impl ToolScope {
    pub fn from_tools(tools: &[String]) -> Self {
        if tools.is_empty() {
            ToolScope::Default
        } else if tools.iter().any(|t| t == "*") {
            ToolScope::Any
        } else {
            ToolScope::Only(tools.iter().cloned().collect())
        }
    }

    pub fn matches(&self, tool_name: &str) -> bool {
        match self {
            ToolScope::Default => tool_name == DEFAULT_TOOL,
            ToolScope::Any => true,
            ToolScope::Only(tools) => tools.contains(tool_name),
        }
    }
}

/// A validated rule, ready to check any number of invocations.
#[derive(Debug)]
pub struct CompiledRule {
    pub name: String,
    pub check: Check,
    pub tools: ToolScope,
    pub message: String,
}

impl CompiledRule {
    pub fn applies_to(&self, tool_name: &str) -> bool {
        self.tools.matches(tool_name)
    }

    pub fn matches(&self, raw_input: &str) -> bool {
        self.check.matches(raw_input)
    }
}

/// Compile a rule list. The first invalid definition fails the whole batch.
pub fn compile(defs: &[RuleDef]) -> Result<Vec<CompiledRule>, RuleError> {
    let mut seen = HashSet::new();
    defs.iter()
        .enumerate()
        .map(|(index, def)| {
            if def.name.trim().is_empty() {
                return Err(RuleError::EmptyName { index });
            }
            if !seen.insert(def.name.as_str()) {
                return Err(RuleError::DuplicateName {
                    name: def.name.clone(),
                });
            }
            compile_rule(def)
        })
        .collect()
}

/// Validate and compile a single definition.
pub fn compile_rule(def: &RuleDef) -> Result<CompiledRule, RuleError> {
    let name = def.name.clone();

    let check = match (&def.pattern, &def.builtin) {
        (Some(_), Some(_)) => return Err(RuleError::PatternAndBuiltin { name }),
        (None, None) => return Err(RuleError::NoCheck { name }),
        _ if def.message.trim().is_empty() => return Err(RuleError::EmptyMessage { name }),
        (None, Some(builtin)) => {
            let Ok(builtin) = builtin.parse::<Builtin>() else {
                return Err(RuleError::UnknownBuiltin {
                    name,
                    builtin: builtin.clone(),
                });
            };
            if def.tools.iter().any(|t| t != DEFAULT_TOOL) {
                return Err(RuleError::BuiltinTools {
                    name,
                    tools: def.tools.clone(),
                });
            }
            Check::Builtin(builtin)
        }
        (Some(pattern), None) => {
            let re = RegexBuilder::new(pattern)
                .dot_matches_new_line(true)
                .build()
                .map_err(|source| RuleError::InvalidPattern {
                    name: name.clone(),
                    source: Box::new(source),
                })?;
            Check::Pattern(re)
        }
    };

    Ok(CompiledRule {
        name,
        check,
        tools: ToolScope::from_tools(&def.tools),
        message: def.message.clone(),
    })
}
