use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{OverlayError, OverlayResult};
use crate::tools::behavior::ToolBehavior;
use crate::tools::instance::ToolInstance;
use crate::tools::kinds;
use crate::tools::types::{ToolCapabilities, ToolType};

/// Factory producing a fresh behavior for each new tool of a kind.
pub type ToolConstructor = Rc<dyn Fn() -> Box<dyn ToolBehavior>>;

/// Registry entry with capabilities resolved once at registration.
#[derive(Clone)]
pub struct RegisteredTool {
    constructor: ToolConstructor,
    capabilities: ToolCapabilities,
    tool_type: ToolType,
}

impl RegisteredTool {
    #[must_use]
    pub fn capabilities(&self) -> ToolCapabilities {
        self.capabilities
    }

    #[must_use]
    pub fn tool_type(&self) -> ToolType {
        self.tool_type
    }

    pub(crate) fn instantiate(&self, id: String, kind: &str) -> ToolInstance {
        ToolInstance::new(id, kind.to_owned(), (self.constructor)(), self.capabilities)
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("tool_type", &self.tool_type)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// Name -> constructor lookup for tool kinds.
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    entries: IndexMap<String, RegisteredTool>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in kind registered under its type name.
    #[must_use]
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        for tool_type in ToolType::ALL {
            registry.register(tool_type.as_str(), move || kinds::builtin_behavior(tool_type));
        }
        registry
    }

    /// Registers `kind`, overwriting any previous constructor.
    pub fn register<F>(&mut self, kind: &str, constructor: F)
    where
        F: Fn() -> Box<dyn ToolBehavior> + 'static,
    {
        let prototype = constructor();
        let capabilities = resolve_capabilities(prototype.as_ref());
        let entry = RegisteredTool {
            constructor: Rc::new(constructor),
            capabilities,
            tool_type: prototype.tool_type(),
        };
        if self.entries.insert(kind.to_owned(), entry).is_some() {
            warn!(kind, "tool kind re-registered, previous constructor replaced");
        } else {
            debug!(kind, "tool kind registered");
        }
    }

    #[must_use]
    pub fn is_registered(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    pub fn get(&self, kind: &str) -> OverlayResult<&RegisteredTool> {
        self.entries
            .get(kind)
            .ok_or_else(|| OverlayError::UnregisteredTool {
                kind: kind.to_owned(),
            })
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Clears capability flags the behavior cannot back.
fn resolve_capabilities(behavior: &dyn ToolBehavior) -> ToolCapabilities {
    let mut capabilities = behavior.capabilities();
    if behavior.shift_constraint().is_none() {
        capabilities.shift_constraint_on_click_click = false;
        capabilities.shift_constraint_on_click_drag = false;
    }
    if !capabilities.click_click_creation && !capabilities.click_drag_creation {
        capabilities.click_click_creation = true;
    }
    capabilities
}
