//! The reducer
//!
//! `reduce` applies one action to the state and returns the effects the
//! store must run once the write lock is released. It never performs I/O
//! and never reads the clock.

use super::action::{Action, Effect};
use super::app_state::AppState;
use super::context::AgentContext;
use super::models::Session;
use super::persistence::keys;

/// Apply `action` to `state`
pub fn reduce(state: &mut AppState, action: Action) -> Vec<Effect> {
    match action {
        Action::SetLoading(loading) => {
            state.loading = loading;
            Vec::new()
        }
        Action::SetError(error) => {
            if error.is_some() {
                state.loading = false;
            }
            state.error = error;
            Vec::new()
        }
        Action::SetAgents(agents) => {
            state.agents = agents;
            state.loading = false;
            Vec::new()
        }
        Action::SetAgentStatus { agent_id, status } => {
            if let Some(agent) = state.agents.iter_mut().find(|a| a.key() == agent_id) {
                agent.status = status;
            }
            Vec::new()
        }
        Action::AddTask(task) => {
            match state.tasks.iter_mut().find(|t| t.task_id == task.task_id) {
                Some(existing) => *existing = task,
                None => state.tasks.push(task),
            }
            Vec::new()
        }
        Action::UpdateTask(task) => {
            if let Some(existing) = state.tasks.iter_mut().find(|t| t.task_id == task.task_id) {
                *existing = task;
            }
            Vec::new()
        }
        Action::SetMetrics(metrics) => {
            state.metrics = Some(metrics);
            Vec::new()
        }
        Action::Login { user, token } => {
            let mut effects = vec![Effect::Persist {
                key: keys::TOKEN,
                value: token.clone(),
            }];
            match user.as_ref().map(serde_json::to_string) {
                Some(Ok(json)) => effects.push(Effect::Persist {
                    key: keys::USER,
                    value: json,
                }),
                Some(Err(_)) | None => effects.push(Effect::Forget { key: keys::USER }),
            }
            state.session = Session::authenticated(user, token);
            effects
        }
        Action::Logout => {
            state.session = Session::anonymous();
            vec![
                Effect::Forget { key: keys::TOKEN },
                Effect::Forget { key: keys::USER },
            ]
        }
        Action::ToggleTheme => {
            state.ui_state.theme = state.ui_state.theme.toggled();
            vec![Effect::Persist {
                key: keys::THEME,
                value: state.ui_state.theme.as_str().to_string(),
            }]
        }
        Action::SetTheme(theme) => {
            state.ui_state.theme = theme;
            vec![Effect::Persist {
                key: keys::THEME,
                value: theme.as_str().to_string(),
            }]
        }
        Action::SetSidebarCollapsed(collapsed) => {
            state.ui_state.sidebar_collapsed = collapsed;
            vec![Effect::Persist {
                key: keys::SIDEBAR_COLLAPSED,
                value: collapsed.to_string(),
            }]
        }
        Action::SetPreferences(preferences) => {
            let effect = match serde_json::to_string(&preferences) {
                Ok(json) => vec![Effect::Persist {
                    key: keys::USER_PREFERENCES,
                    value: json,
                }],
                Err(_) => Vec::new(),
            };
            state.ui_state.preferences = preferences;
            effect
        }
        Action::SetAgentContext { agent_id, context } => {
            state.agent_contexts.insert(agent_id.clone(), context);
            vec![Effect::NotifySubscribers {
                context_key: agent_id,
            }]
        }
        Action::UpdateSharedData { key, entry } => {
            state.shared_data.insert(key.clone(), entry);
            vec![
                Effect::NotifySubscribers {
                    context_key: key.clone(),
                },
                Effect::SuggestCollaboration { data_key: key },
            ]
        }
        Action::RemoveSharedData { key } => {
            state.shared_data.remove(&key);
            Vec::new()
        }
        Action::AddCollaborativeWorkflow(workflow) => {
            state.collaborative_workflows.push(workflow);
            Vec::new()
        }
        Action::SubscribeToContext {
            subscriber,
            context_key,
        } => {
            let keys = state.context_subscriptions.entry(subscriber).or_default();
            if !keys.contains(&context_key) {
                keys.push(context_key);
            }
            Vec::new()
        }
        Action::SetAgentRecommendations {
            agent_id,
            recommendations,
        } => {
            state.agent_recommendations.insert(agent_id, recommendations);
            Vec::new()
        }
        Action::SetCollaborationSuggestions {
            agent_id,
            suggestions,
        } => {
            state.collaboration_suggestions.insert(agent_id, suggestions);
            Vec::new()
        }
        Action::ClearAgentContext { agent_id } => {
            state.agent_contexts.insert(agent_id, AgentContext::default());
            Vec::new()
        }
        Action::ClearAllContext => {
            state.agent_contexts.clear();
            state.shared_data.clear();
            state.collaborative_workflows.clear();
            state.context_subscriptions.clear();
            state.agent_recommendations.clear();
            state.collaboration_suggestions.clear();
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_state::Theme;
    use crate::state::context::{ContextUpdate, DataType, SharedDataEntry};
    use crate::state::models::{Agent, AgentStatus, Task, TaskStatus, UserProfile};
    use chrono::Utc;
    use serde_json::{json, Map};

    fn task(id: &str, status: TaskStatus) -> Task {
        serde_json::from_value(json!({"taskId": id, "status": status})).unwrap()
    }

    fn stamped(update: ContextUpdate) -> AgentContext {
        AgentContext::from_update(update, Utc::now())
    }

    #[test]
    fn test_set_error_ends_loading() {
        let mut state = AppState::new();
        reduce(&mut state, Action::SetLoading(true));
        assert!(state.loading);

        reduce(&mut state, Action::SetError(Some("boom".to_string())));
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("boom"));

        reduce(&mut state, Action::SetError(None));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_set_agents_replaces_wholesale() {
        let mut state = AppState::new();
        reduce(
            &mut state,
            Action::SetAgents(vec![Agent::new("a", "A", "generic")]),
        );
        reduce(
            &mut state,
            Action::SetAgents(vec![Agent::new("b", "B", "generic")]),
        );
        assert_eq!(state.agents.len(), 1);
        assert_eq!(state.agents[0].id, "b");
    }

    #[test]
    fn test_set_agent_status() {
        let mut state = AppState::new();
        reduce(
            &mut state,
            Action::SetAgents(vec![Agent::new("a", "A", "generic")]),
        );
        reduce(
            &mut state,
            Action::SetAgentStatus {
                agent_id: "a".to_string(),
                status: AgentStatus::Loading,
            },
        );
        assert_eq!(state.agents[0].status, AgentStatus::Loading);
    }

    #[test]
    fn test_add_task_keeps_ids_unique() {
        let mut state = AppState::new();
        reduce(&mut state, Action::AddTask(task("t1", TaskStatus::Pending)));
        reduce(&mut state, Action::AddTask(task("t2", TaskStatus::Pending)));
        reduce(&mut state, Action::AddTask(task("t1", TaskStatus::Running)));

        assert_eq!(state.tasks.len(), 2);
        assert_eq!(state.tasks[0].status, TaskStatus::Running);
    }

    #[test]
    fn test_update_task_in_place() {
        let mut state = AppState::new();
        reduce(&mut state, Action::AddTask(task("t1", TaskStatus::Pending)));
        reduce(&mut state, Action::UpdateTask(task("t1", TaskStatus::Completed)));
        reduce(&mut state, Action::UpdateTask(task("ghost", TaskStatus::Failed)));

        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_login_logout_pairs_token_and_flag() {
        let mut state = AppState::new();
        let effects = reduce(
            &mut state,
            Action::Login {
                user: Some(UserProfile::new("ada")),
                token: "tok".to_string(),
            },
        );
        assert!(state.session.is_authenticated());
        assert_eq!(state.session.token(), Some("tok"));
        assert!(effects.contains(&Effect::Persist {
            key: keys::TOKEN,
            value: "tok".to_string()
        }));
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::Persist { key, .. } if *key == keys::USER)));

        let effects = reduce(&mut state, Action::Logout);
        assert_eq!(state.session, Session::anonymous());
        assert_eq!(
            effects,
            vec![
                Effect::Forget { key: keys::TOKEN },
                Effect::Forget { key: keys::USER }
            ]
        );
    }

    #[test]
    fn test_toggle_theme_persists_each_value() {
        let mut state = AppState::new();
        let first = reduce(&mut state, Action::ToggleTheme);
        assert_eq!(state.ui_state.theme, Theme::Light);
        assert_eq!(
            first,
            vec![Effect::Persist {
                key: keys::THEME,
                value: "light".to_string()
            }]
        );

        reduce(&mut state, Action::ToggleTheme);
        assert_eq!(state.ui_state.theme, Theme::Dark);
    }

    #[test]
    fn test_set_agent_context_overwrites_slot() {
        let mut state = AppState::new();
        reduce(
            &mut state,
            Action::SetAgentContext {
                agent_id: "a".to_string(),
                context: stamped(
                    ContextUpdate::new(DataType::StockAnalysis).with_field("symbol", json!("AAPL")),
                ),
            },
        );
        let effects = reduce(
            &mut state,
            Action::SetAgentContext {
                agent_id: "a".to_string(),
                context: stamped(ContextUpdate::new(DataType::ChartData)),
            },
        );

        let context = state.context_for_agent("a").unwrap();
        assert_eq!(context.data_type, Some(DataType::ChartData));
        assert!(context.get("symbol").is_none());
        assert_eq!(
            effects,
            vec![Effect::NotifySubscribers {
                context_key: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_clear_agent_context_is_selective() {
        let mut state = AppState::new();
        for id in ["a", "b"] {
            reduce(
                &mut state,
                Action::SetAgentContext {
                    agent_id: id.to_string(),
                    context: stamped(ContextUpdate::new(DataType::FinancialData)),
                },
            );
        }
        reduce(
            &mut state,
            Action::ClearAgentContext {
                agent_id: "a".to_string(),
            },
        );

        assert!(state.context_for_agent("a").unwrap().is_empty());
        assert!(!state.context_for_agent("b").unwrap().is_empty());
    }

    #[test]
    fn test_clear_all_context_wipes_everything() {
        let mut state = AppState::new();
        reduce(
            &mut state,
            Action::UpdateSharedData {
                key: "stockData".to_string(),
                entry: SharedDataEntry {
                    data: json!({"price": 1}),
                    source_agent: "stock-analyzer".to_string(),
                    timestamp: Utc::now(),
                    metadata: Map::new(),
                },
            },
        );
        reduce(
            &mut state,
            Action::SubscribeToContext {
                subscriber: "chart".to_string(),
                context_key: "stockData".to_string(),
            },
        );
        reduce(&mut state, Action::ClearAllContext);

        assert!(state.shared_data.is_empty());
        assert!(state.context_subscriptions.is_empty());
        assert!(state.agent_contexts.is_empty());
        assert!(state.collaborative_workflows.is_empty());
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut state = AppState::new();
        for _ in 0..2 {
            reduce(
                &mut state,
                Action::SubscribeToContext {
                    subscriber: "chart".to_string(),
                    context_key: "stockData".to_string(),
                },
            );
        }
        assert_eq!(state.context_subscriptions["chart"], vec!["stockData"]);
    }
}
