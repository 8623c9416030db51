use serde::Serialize;
use serde_json::{Map, json};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use super::state::ViewState;
use crate::clock::Clock;
use crate::display::{format_optional_date, priority_color, status_color, status_label};
use crate::error::ActionError;
use crate::gateway::{DataGateway, Filter, Query, Resource, fetch};
use crate::model::task::{Task, TaskStatus};

#[derive(Debug, Serialize, ToSchema)]
pub struct Badge {
    pub label: String,
    pub color: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Badge,
    pub priority: Badge,
    pub deadline: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TasksPage {
    pub tasks: Vec<TaskRow>,
    pub error: Option<String>,
}

pub struct TasksController {
    gateway: Arc<dyn DataGateway>,
    clock: Arc<dyn Clock>,
    user_id: String,
    state: ViewState<Vec<Task>>,
}

impl TasksController {
    pub fn new(gateway: Arc<dyn DataGateway>, clock: Arc<dyn Clock>, user_id: String) -> Self {
        Self {
            gateway,
            clock,
            user_id,
            state: ViewState::new(Vec::new()),
        }
    }

    pub fn state(&self) -> &ViewState<Vec<Task>> {
        &self.state
    }

    #[tracing::instrument(name = "tasks", skip(self), fields(user_id = %self.user_id))]
    pub async fn activate(&mut self) {
        self.state.begin();
        let query = Query::new()
            .eq("assigned_to", self.user_id.as_str())
            .order_asc("deadline");
        let tasks = fetch(self.gateway.as_ref(), Resource::Tasks, &query).await;
        self.state.replace("tasks", tasks);
    }

    /// Moves one of the caller's own tasks to `status`.
    #[tracing::instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn set_status(&mut self, task_id: &str, status: TaskStatus) -> Result<(), ActionError> {
        if status == TaskStatus::Unknown {
            return Err(ActionError::InvalidTransition(status.to_string()));
        }

        let owned = fetch::<Task>(
            self.gateway.as_ref(),
            Resource::Tasks,
            &Query::new().eq("id", task_id),
        )
        .await?
        .into_iter()
        .any(|task| task.assigned_to == self.user_id);
        if !owned {
            return Err(ActionError::TaskNotFound);
        }

        let mut patch = Map::new();
        patch.insert("status".into(), json!(status));
        patch.insert("updated_at".into(), json!(self.clock.now()));
        let touched = self
            .gateway
            .update(Resource::Tasks, &Filter::eq("id", task_id), patch)
            .await?;
        if touched == 0 {
            return Err(ActionError::TaskNotFound);
        }
        info!(task_id, %status, "task status changed");

        self.activate().await;
        Ok(())
    }

    pub fn render(&self) -> TasksPage {
        TasksPage {
            tasks: self.state.data().iter().map(task_row).collect(),
            error: self.state.error().map(str::to_string),
        }
    }
}

fn task_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        status: Badge {
            label: status_label(task.status),
            color: status_color(task.status),
        },
        priority: Badge {
            label: task.priority.to_string(),
            color: priority_color(task.priority),
        },
        deadline: format_optional_date(task.deadline),
    }
}
