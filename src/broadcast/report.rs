use crate::{
    broadcast::dispatcher::DispatchRun,
    models::broadcast::{BroadcastReport, DispatchOutcome, FailedRecipient, ParseMode},
};

pub const MAX_FAILURE_SAMPLE: usize = 5;
pub const NO_RECIPIENTS_WARNING: &str = "No users found. Users must interact with bot first.";

pub fn build_report(run: &DispatchRun, parse_mode: ParseMode) -> BroadcastReport {
    let failed = run.failed();

    let failed_users = (failed > 0).then(|| {
        run.records
            .iter()
            .filter_map(|record| match &record.outcome {
                DispatchOutcome::Failed { reason } => Some(FailedRecipient {
                    user_id: record.recipient,
                    error: reason.clone(),
                }),
                DispatchOutcome::Delivered => None,
            })
            .take(MAX_FAILURE_SAMPLE)
            .collect()
    });

    BroadcastReport {
        total_users: run.records.len(),
        successful: run.delivered(),
        failed,
        parse_mode,
        duration_seconds: Some(format!("{:.2}", run.elapsed.as_secs_f64())),
        failed_users,
        warning: None,
        suggestion: None,
    }
}

/// Report for a broadcast that found nobody to send to.
pub fn empty_report(parse_mode: ParseMode) -> BroadcastReport {
    BroadcastReport {
        total_users: 0,
        successful: 0,
        failed: 0,
        parse_mode,
        duration_seconds: None,
        failed_users: None,
        warning: Some(NO_RECIPIENTS_WARNING.to_string()),
        suggestion: None,
    }
}

impl BroadcastReport {
    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }
}
