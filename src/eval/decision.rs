/// Outcome of checking one hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Block(Block),
}

/// The rule that blocked an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub rule: String,
    pub message: String,
}

impl Decision {
    /// Name recorded in the debug log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Block(_) => "block",
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Decision::Block(_))
    }

    /// The block message, if blocked.
    pub fn message(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Block(block) => Some(&block.message),
        }
    }
}
