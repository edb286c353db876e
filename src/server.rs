//! MCP server struct definition and initialization.

use crate::state::{AppContext, SharedContext};
use rmcp::handler::server::router::tool::ToolRouter;

/// The MSSQL query gateway server.
///
/// Cloned per request by the transport; the context is shared via `Arc`.
/// The server exposes tools only.
#[derive(Clone)]
pub struct MssqlGatewayServer {
    /// Registry, masking and connector shared by every call.
    pub(crate) context: SharedContext,

    /// Tool router for dispatching tool calls.
    pub(crate) tool_router: ToolRouter<Self>,
}

impl MssqlGatewayServer {
    /// Create a server over an already-built context.
    pub fn new(context: SharedContext) -> Self {
        Self {
            context,
            tool_router: Self::tool_router(),
        }
    }

    /// Create a server from the process environment and installed manifest.
    pub fn from_env() -> Self {
        Self::new(AppContext::from_env().into_shared())
    }

    /// Get a reference to the shared context.
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Names of the configured connections, in slot order.
    pub fn connection_names(&self) -> Vec<&str> {
        self.context.registry.names()
    }
}
