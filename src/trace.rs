//! Diagnostic event log.
//!
//! Every chip is handed a [`Tracer`] when it is built: its component name
//! plus the trace filter of the board that owns it. Chips call
//! [`Tracer::emit`] at the points worth reporting and never look at the
//! filter themselves.
//!
//! Events that pass the filter are sent to `tracing` at `TRACE` level with
//! `component` and `category` fields. If the [`TraceConfig`] carries a
//! [`TraceLog`], they are also recorded there so a host can inspect them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{event, Level};

/// Event category tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Fetch,
    In,
    Load,
    Count,
    Hold,
    Latch,
    Decode,
    Bus,
    Alu,
    Reg,
    Store,
    Ext,
    Branch,
    State,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Fetch,
        Category::In,
        Category::Load,
        Category::Count,
        Category::Hold,
        Category::Latch,
        Category::Decode,
        Category::Bus,
        Category::Alu,
        Category::Reg,
        Category::Store,
        Category::Ext,
        Category::Branch,
        Category::State,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Fetch => "FETCH",
            Category::In => "IN",
            Category::Load => "LOAD",
            Category::Count => "COUNT",
            Category::Hold => "HOLD",
            Category::Latch => "LATCH",
            Category::Decode => "DECODE",
            Category::Bus => "BUS",
            Category::Alu => "ALU",
            Category::Reg => "REG",
            Category::Store => "STORE",
            Category::Ext => "EXT",
            Category::Branch => "BRANCH",
            Category::State => "STATE",
        }
    }

    /// Parse a category tag, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub component: String,
    pub category: Category,
    pub message: String,
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.component, self.category, self.message)
    }
}

/// In-memory recorder shared between the chips of one board.
#[derive(Debug, Clone, Default)]
pub struct TraceLog(Arc<Mutex<Vec<TraceEvent>>>);

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: TraceEvent) {
        if let Ok(mut events) = self.0.lock() {
            events.push(event);
        }
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.0.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.0.lock() {
            events.clear();
        }
    }
}

/// A filter rule. `None` matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraceRule {
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl TraceRule {
    fn matches(&self, component: &str, category: Category) -> bool {
        self.component.as_deref().map_or(true, |c| c == component)
            && self.category.map_or(true, |c| c == category)
    }
}

/// Trace filter for one board.
///
/// An event is reported when any rule matches it. No rules means tracing
/// is off.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default)]
    pub rules: Vec<TraceRule>,
    #[serde(skip)]
    pub log: Option<TraceLog>,
}

impl TraceConfig {
    /// Tracing disabled.
    pub fn off() -> Self {
        Self::default()
    }

    /// Every category of every component.
    pub fn all() -> Self {
        Self {
            rules: vec![TraceRule::default()],
            log: None,
        }
    }

    /// Parse a comma-separated filter.
    ///
    /// Items are `*`, `CATEGORY`, `component:CATEGORY` or `component:*`.
    pub fn parse(spec: &str) -> Result<Self, TraceConfigError> {
        let mut rules = Vec::new();
        for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (component, category) = match item.split_once(':') {
                Some((c, cat)) => (Some(c.trim().to_string()), cat.trim()),
                None => (None, item),
            };
            let category = if category == "*" {
                None
            } else {
                Some(
                    Category::parse(category)
                        .ok_or_else(|| TraceConfigError::UnknownCategory(category.to_string()))?,
                )
            };
            rules.push(TraceRule {
                component,
                category,
            });
        }
        Ok(Self { rules, log: None })
    }

    /// Attach an in-memory recorder.
    pub fn with_log(mut self, log: TraceLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn enabled(&self, component: &str, category: Category) -> bool {
        self.rules.iter().any(|r| r.matches(component, category))
    }
}

/// Errors parsing a trace filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceConfigError {
    #[error("unknown trace category: {0}")]
    UnknownCategory(String),
}

/// The "emits diagnostic events" capability handed to each chip.
#[derive(Debug, Clone)]
pub struct Tracer {
    component: Arc<str>,
    config: Arc<TraceConfig>,
}

impl Tracer {
    pub fn new(component: &str, config: &Arc<TraceConfig>) -> Self {
        Self {
            component: Arc::from(component),
            config: Arc::clone(config),
        }
    }

    /// A tracer that reports nothing, for chips used on their own.
    pub fn silent(component: &str) -> Self {
        Self::new(component, &Arc::new(TraceConfig::off()))
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    #[inline]
    pub fn enabled(&self, category: Category) -> bool {
        self.config.enabled(&self.component, category)
    }

    /// Report an event if the filter lets it through.
    pub fn emit(&self, category: Category, args: fmt::Arguments<'_>) {
        if !self.enabled(category) {
            return;
        }
        let message = args.to_string();
        event!(
            Level::TRACE,
            component = %self.component,
            category = category.as_str(),
            "{}",
            message
        );
        if let Some(log) = &self.config.log {
            log.push(TraceEvent {
                component: self.component.to_string(),
                category,
                message,
            });
        }
    }
}
