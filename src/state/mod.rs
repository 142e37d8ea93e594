// State management module
// Handles application state, the reducer contract, and client-side persistence

pub mod action;
pub mod app_state;
pub mod context;
pub mod models;
pub mod persistence;
pub mod recommendations;
pub mod reducer;

pub use action::{Action, Effect};
pub use app_state::{AppState, ChartType, Theme, UiState, UserPreferences};
pub use context::{
    AgentContext, CollaborativeWorkflow, ContextUpdate, DataType, SharedDataEntry,
    WorkflowDraft, WorkflowStatus,
};
pub use models::{
    Agent, AgentId, AgentStatus, Session, Task, TaskId, TaskMetrics, TaskRequest, TaskStatus,
    UserProfile,
};
pub use persistence::{FileStorage, MemoryStorage, PersistenceError, Storage};
pub use recommendations::{
    ChartSuggestion, CollaborationKind, CollaborationSuggestion, DataShape, Priority,
    Recommendation,
};
pub use reducer::reduce;
