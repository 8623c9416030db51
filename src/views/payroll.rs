use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::state::ViewState;
use crate::display::{format_currency, format_month};
use crate::gateway::{DataGateway, Query, Resource, fetch};
use crate::model::payroll::PayrollRecord;

#[derive(Debug, Serialize, ToSchema)]
pub struct PayrollRow {
    pub id: String,
    #[schema(example = "February 2024")]
    pub month: String,
    pub completed_tasks: i64,
    #[schema(example = "$150.00")]
    pub bonuses: String,
    #[schema(example = "$3150.00")]
    pub total_pay: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayrollPage {
    pub records: Vec<PayrollRow>,
    pub error: Option<String>,
}

/// Read-only payroll history, newest month first.
pub struct PayrollController {
    gateway: Arc<dyn DataGateway>,
    user_id: String,
    state: ViewState<Vec<PayrollRecord>>,
}

impl PayrollController {
    pub fn new(gateway: Arc<dyn DataGateway>, user_id: String) -> Self {
        Self {
            gateway,
            user_id,
            state: ViewState::new(Vec::new()),
        }
    }

    pub fn state(&self) -> &ViewState<Vec<PayrollRecord>> {
        &self.state
    }

    #[tracing::instrument(name = "payroll", skip(self), fields(user_id = %self.user_id))]
    pub async fn activate(&mut self) {
        self.state.begin();
        let query = Query::new()
            .eq("user_id", self.user_id.as_str())
            .order_desc("month");
        let records = fetch(self.gateway.as_ref(), Resource::Payroll, &query).await;
        self.state.replace("payroll", records);
    }

    pub fn render(&self) -> PayrollPage {
        PayrollPage {
            records: self
                .state
                .data()
                .iter()
                .map(|r| PayrollRow {
                    id: r.id.clone(),
                    month: format_month(&r.month),
                    completed_tasks: r.completed_tasks,
                    bonuses: format_currency(r.bonuses),
                    total_pay: format_currency(r.total_pay),
                })
                .collect(),
            error: self.state.error().map(str::to_string),
        }
    }
}
