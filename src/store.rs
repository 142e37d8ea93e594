//! Application state store
//!
//! The single source of truth for the dashboard. State changes go through
//! [`Store::dispatch`]: the reducer runs under the write lock, then storage
//! effects, listeners and follow-up derivations run after the lock is
//! released. The lock is never held across an `.await`, so two dispatches
//! never interleave mid-mutation; racing network calls resolve in arrival
//! order and the last one to land wins.

use crate::api::{ApiClient, AuthResponse, LoginRequest, RegisterRequest};
use crate::config::Config;
use crate::error::ClientError;
use crate::notifications::NotificationCenter;
use crate::state::persistence::{get_json, keys};
use crate::state::recommendations::{self, collaboration_for_key};
use crate::state::{
    reduce, Action, Agent, AgentContext, AgentId, AgentStatus, AppState, ChartSuggestion,
    CollaborationSuggestion, CollaborativeWorkflow, ContextUpdate, DataShape, Effect,
    Recommendation, Session, SharedDataEntry, Storage, Task, TaskMetrics, TaskRequest, Theme,
    UserPreferences, UserProfile, WorkflowDraft,
};
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Handle returned by [`Store::subscribe`]
pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&Action) + Send + Sync>;

/// Dashboard state store
///
/// Construct once and share as `Arc<Store>`.
pub struct Store {
    state: RwLock<AppState>,
    api: ApiClient,
    storage: Arc<dyn Storage>,
    notifications: Arc<NotificationCenter>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener_id: AtomicU64,
    last_workflow_id: AtomicI64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("api", &self.api)
            .field("notifications", &self.notifications)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Create a store, rehydrating session and UI state from `storage`
    ///
    /// `storage` should be the same handle the `ApiClient` was built with so
    /// the client sees the token the store persists.
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let timeout = Duration::from_millis(Config::default().timers.notification_timeout_ms);
        Self::with_notifications(api, storage, NotificationCenter::new(timeout))
    }

    /// Create a store with an explicit notification center
    ///
    /// The center is attached to `api`, so every failed request made
    /// through [`Store::api`] queues an error toast.
    pub fn with_notifications(
        api: ApiClient,
        storage: Arc<dyn Storage>,
        notifications: NotificationCenter,
    ) -> Self {
        let notifications = Arc::new(notifications);
        let api = api.with_notifications(notifications.clone());
        let state = rehydrate(storage.as_ref());
        tracing::info!(
            authenticated = state.session.is_authenticated(),
            theme = state.ui_state.theme.as_str(),
            "Store initialized"
        );
        Self {
            state: RwLock::new(state),
            api,
            storage,
            notifications,
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
            last_workflow_id: AtomicI64::new(0),
        }
    }

    /// Build the client and store from configuration
    pub fn from_config(config: &Config, storage: Arc<dyn Storage>) -> Result<Self, ClientError> {
        let api = ApiClient::from_config(config, storage.clone())?;
        let notifications = NotificationCenter::new(Duration::from_millis(
            config.timers.notification_timeout_ms,
        ));
        Ok(Self::with_notifications(api, storage, notifications))
    }

    /// HTTP client, for panels that call the backend directly
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Toast queue fed by request failures
    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Apply an action and run its effects
    pub fn dispatch(&self, action: Action) {
        let name = action.name();
        let observed = self.has_listeners().then(|| action.clone());

        let effects = {
            let mut state = self.write();
            reduce(&mut state, action)
        };
        tracing::trace!(action = name, effects = effects.len(), "Action dispatched");

        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::Persist { key, value } => {
                    if let Err(e) = self.storage.set(key, &value) {
                        tracing::warn!(key = key, error = %e, "Failed to persist value");
                    }
                }
                Effect::Forget { key } => {
                    if let Err(e) = self.storage.remove(key) {
                        tracing::warn!(key = key, error = %e, "Failed to remove persisted value");
                    }
                }
                other => follow_ups.push(other),
            }
        }

        if let Some(action) = observed {
            let listeners: Vec<Listener> = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(_, l)| l.clone())
                .collect();
            for listener in listeners {
                listener(&action);
            }
        }

        for effect in follow_ups {
            match effect {
                Effect::NotifySubscribers { context_key } => {
                    let subscribers = self.read().subscribers_of(&context_key);
                    for subscriber in subscribers {
                        tracing::debug!(
                            subscriber = %subscriber,
                            context_key = %context_key,
                            "Regenerating recommendations for subscriber"
                        );
                        self.generate_agent_recommendations(&subscriber);
                    }
                }
                Effect::SuggestCollaboration { data_key } => self.suggest_collaboration(&data_key),
                Effect::Persist { .. } | Effect::Forget { .. } => {}
            }
        }
    }

    /// Register a post-commit observer; it sees every action after the reducer ran
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Action) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Start an authenticated session and persist it
    pub fn login(&self, user: Option<UserProfile>, token: impl Into<String>) {
        let token = token.into();
        tracing::info!(
            username = user.as_ref().map(|u| u.username.as_str()).unwrap_or("-"),
            "User logged in"
        );
        self.dispatch(Action::Login { user, token });
    }

    /// End the session and forget the persisted token and user
    pub fn logout(&self) {
        tracing::info!("User logged out");
        self.dispatch(Action::Logout);
    }

    /// POST /auth/login and start the session on success
    ///
    /// Failures are returned to the form, not recorded in the store.
    pub async fn authenticate(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let response = self.api.auth().login(request).await?;
        self.adopt_session(&response);
        Ok(response)
    }

    /// POST /auth/register and start the session on success
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let response = self.api.auth().register(request).await?;
        self.adopt_session(&response);
        Ok(response)
    }

    fn adopt_session(&self, response: &AuthResponse) {
        match (&response.token, response.success) {
            (Some(token), true) => self.login(response.user.clone(), token.clone()),
            _ => tracing::warn!(
                message = response.message.as_deref().unwrap_or(""),
                "Authentication rejected"
            ),
        }
    }

    /// GET /agents and replace the agent list
    ///
    /// On failure the list is left as it was and the error is recorded.
    pub async fn fetch_agents(&self) {
        self.dispatch(Action::SetLoading(true));
        match self.api.agents().list().await {
            Ok(agents) => {
                tracing::info!(count = agents.len(), "Fetched agents");
                self.dispatch(Action::SetAgents(agents));
            }
            Err(e) => self.record_failure("fetch agents", &e),
        }
    }

    /// POST /agents/reload, then refetch the list
    pub async fn reload_agents(&self) {
        self.dispatch(Action::SetLoading(true));
        match self.api.agents().reload().await {
            Ok(message) => {
                tracing::info!(response = %message.trim(), "Backend reloaded agents");
                self.fetch_agents().await;
            }
            Err(e) => self.record_failure("reload agents", &e),
        }
    }

    /// GET /tasks/metrics; failures are logged and toasted but leave `error` alone
    pub async fn load_metrics(&self) {
        match self.api.tasks().metrics().await {
            Ok(metrics) => self.dispatch(Action::SetMetrics(metrics)),
            Err(e) => tracing::warn!(error = %e, "Failed to load task metrics"),
        }
    }

    /// POST /tasks and append the returned task
    pub async fn submit_task(&self, request: &TaskRequest) -> Result<Task, ClientError> {
        self.dispatch(Action::SetLoading(true));
        match self.api.tasks().submit(request).await {
            Ok(task) => {
                tracing::info!(
                    task_id = %task.task_id,
                    task_type = %task.task_type,
                    "Task submitted"
                );
                self.dispatch(Action::AddTask(task.clone()));
                self.dispatch(Action::SetLoading(false));
                Ok(task)
            }
            Err(e) => {
                self.record_failure("submit task", &e);
                Err(e)
            }
        }
    }

    /// Replace the task with the same id; unknown ids are ignored
    pub fn update_task(&self, task: Task) {
        self.dispatch(Action::UpdateTask(task));
    }

    /// Optimistically change an agent's status
    pub fn set_agent_status(&self, agent_id: impl Into<AgentId>, status: AgentStatus) {
        self.dispatch(Action::SetAgentStatus {
            agent_id: agent_id.into(),
            status,
        });
    }

    fn record_failure(&self, operation: &str, error: &ClientError) {
        let message = error.user_message();
        tracing::error!(
            operation = operation,
            status_code = ?error.status(),
            error = %error,
            "Request failed"
        );
        self.dispatch(Action::SetError(Some(message)));
    }

    /// Overwrite an agent's context, stamped with the current time
    pub fn set_agent_context(&self, agent_id: impl Into<AgentId>, update: ContextUpdate) {
        let context = AgentContext::from_update(update, Utc::now());
        self.dispatch(Action::SetAgentContext {
            agent_id: agent_id.into(),
            context,
        });
    }

    /// Overwrite a shared-data slot, stamped with the current time
    pub fn update_shared_data(
        &self,
        key: impl Into<String>,
        data: Value,
        source_agent: impl Into<AgentId>,
        metadata: Map<String, Value>,
    ) {
        let entry = SharedDataEntry {
            data,
            source_agent: source_agent.into(),
            timestamp: Utc::now(),
            metadata,
        };
        self.dispatch(Action::UpdateSharedData {
            key: key.into(),
            entry,
        });
    }

    /// Make `subscriber` follow an agent id or shared-data key
    pub fn subscribe_to_context(
        &self,
        subscriber: impl Into<AgentId>,
        context_key: impl Into<String>,
    ) {
        self.dispatch(Action::SubscribeToContext {
            subscriber: subscriber.into(),
            context_key: context_key.into(),
        });
    }

    /// Append a workflow built from `draft` and return it
    pub fn create_collaborative_workflow(&self, draft: WorkflowDraft) -> CollaborativeWorkflow {
        let created_at = Utc::now();
        let id = self.next_workflow_id(created_at.timestamp_millis());
        let workflow = CollaborativeWorkflow::from_draft(id.to_string(), draft, created_at);
        tracing::info!(workflow_id = %workflow.id, name = %workflow.name, "Workflow created");
        self.dispatch(Action::AddCollaborativeWorkflow(workflow.clone()));
        workflow
    }

    /// Millisecond timestamp, bumped past the previous id if the clock has not moved
    fn next_workflow_id(&self, now_ms: i64) -> i64 {
        let mut next = now_ms;
        // fetch_update only fails when the closure returns None
        let _ = self
            .last_workflow_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                next = now_ms.max(last + 1);
                Some(next)
            });
        next
    }

    /// Derive, store and return recommendations for `agent_id`
    pub fn generate_agent_recommendations(&self, agent_id: &str) -> Vec<Recommendation> {
        let recommendations = {
            let state = self.read();
            recommendations::recommend(state.context_for_agent(agent_id), &state.shared_data)
        };
        self.dispatch(Action::SetAgentRecommendations {
            agent_id: agent_id.to_string(),
            recommendations: recommendations.clone(),
        });
        recommendations
    }

    /// Chart types that fit a data shape
    pub fn suggest_chart_types(&self, shape: DataShape) -> Vec<ChartSuggestion> {
        recommendations::suggest_chart_types(shape)
    }

    fn suggest_collaboration(&self, data_key: &str) {
        let suggestions = collaboration_for_key(data_key);
        if suggestions.is_empty() {
            return;
        }

        let targets: Vec<(AgentId, Vec<CollaborationSuggestion>)> = {
            let state = self.read();
            state
                .agents
                .iter()
                .filter_map(|agent| {
                    let matching: Vec<CollaborationSuggestion> = suggestions
                        .iter()
                        .filter(|s| s.agents.iter().any(|t| *t == agent.agent_type))
                        .cloned()
                        .collect();
                    (!matching.is_empty()).then(|| (agent.key().to_string(), matching))
                })
                .collect()
        };

        for (agent_id, suggestions) in targets {
            tracing::debug!(agent_id = %agent_id, data_key = %data_key, "Collaboration suggested");
            self.dispatch(Action::SetCollaborationSuggestions {
                agent_id,
                suggestions,
            });
        }
    }

    /// Reset one agent's context to empty
    pub fn clear_agent_context(&self, agent_id: impl Into<AgentId>) {
        self.dispatch(Action::ClearAgentContext {
            agent_id: agent_id.into(),
        });
    }

    /// Remove one shared-data slot
    pub fn clear_shared_data(&self, key: impl Into<String>) {
        self.dispatch(Action::RemoveSharedData { key: key.into() });
    }

    /// Wipe every context, shared slot, workflow, subscription and derived suggestion
    pub fn clear_all_context(&self) {
        self.dispatch(Action::ClearAllContext);
    }

    /// Flip light/dark, persist it, and return the new theme
    pub fn toggle_theme(&self) -> Theme {
        self.dispatch(Action::ToggleTheme);
        self.read().ui_state.theme
    }

    /// Set the theme explicitly
    pub fn set_theme(&self, theme: Theme) {
        self.dispatch(Action::SetTheme(theme));
    }

    /// Collapse or expand the sidebar
    pub fn set_sidebar_collapsed(&self, collapsed: bool) {
        self.dispatch(Action::SetSidebarCollapsed(collapsed));
    }

    /// Replace user preferences
    pub fn update_preferences(&self, preferences: UserPreferences) {
        self.dispatch(Action::SetPreferences(preferences));
    }

    /// Dismiss the store-level error
    pub fn clear_error(&self) {
        self.dispatch(Action::SetError(None));
    }

    /// Copy of the whole state
    pub fn snapshot(&self) -> AppState {
        self.read().clone()
    }

    /// Agents in backend order
    pub fn agents(&self) -> Vec<Agent> {
        self.read().agents.clone()
    }

    /// Tasks in submission order
    pub fn tasks(&self) -> Vec<Task> {
        self.read().tasks.clone()
    }

    /// Latest metrics
    pub fn metrics(&self) -> Option<TaskMetrics> {
        self.read().metrics.clone()
    }

    /// Current session
    pub fn session(&self) -> Session {
        self.read().session.clone()
    }

    /// Current theme
    pub fn theme(&self) -> Theme {
        self.read().ui_state.theme
    }

    /// Whether a network-backed operation is in flight
    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    /// Last recorded request failure
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    /// Context for one agent
    pub fn context_for_agent(&self, agent_id: &str) -> Option<AgentContext> {
        self.read().context_for_agent(agent_id).cloned()
    }

    /// One shared-data slot
    pub fn shared_data(&self, key: &str) -> Option<SharedDataEntry> {
        self.read().shared_data.get(key).cloned()
    }

    /// Every shared-data slot
    pub fn all_shared_data(&self) -> HashMap<String, SharedDataEntry> {
        self.read().shared_data.clone()
    }

    /// Recommendations last generated for an agent
    pub fn recommendations_for(&self, agent_id: &str) -> Vec<Recommendation> {
        self.read().recommendations_for(agent_id).to_vec()
    }

    /// Collaboration suggestions attached to an agent
    pub fn collaboration_suggestions_for(&self, agent_id: &str) -> Vec<CollaborationSuggestion> {
        self.read()
            .collaboration_suggestions
            .get(agent_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Workflows in creation order
    pub fn collaborative_workflows(&self) -> Vec<CollaborativeWorkflow> {
        self.read().collaborative_workflows.clone()
    }

    fn has_listeners(&self) -> bool {
        !self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Initial state with the persisted session and UI preferences applied
fn rehydrate(storage: &dyn Storage) -> AppState {
    let mut state = AppState::new();

    if let Some(token) = storage.get(keys::TOKEN).filter(|t| !t.is_empty()) {
        let user: Option<UserProfile> = get_json(storage, keys::USER);
        state.session = Session::authenticated(user, token);
    }

    if let Some(raw) = storage.get(keys::THEME) {
        match Theme::parse(&raw) {
            Some(theme) => state.ui_state.theme = theme,
            None => tracing::warn!(value = %raw, "Ignoring unknown persisted theme"),
        }
    }

    if let Some(raw) = storage.get(keys::SIDEBAR_COLLAPSED) {
        match raw.parse::<bool>() {
            Ok(collapsed) => state.ui_state.sidebar_collapsed = collapsed,
            Err(_) => tracing::warn!(value = %raw, "Ignoring malformed sidebar flag"),
        }
    }

    if let Some(preferences) = get_json::<UserPreferences>(storage, keys::USER_PREFERENCES) {
        state.ui_state.preferences = preferences;
    }

    state
}
