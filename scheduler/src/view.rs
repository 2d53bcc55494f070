use std::borrow::Cow;

use tabled::Tabled;

use crate::flow::CycleOutcome;

/// One line of the dry-run summary.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub pod: String,
    pub outcome: CycleOutcome,
}

impl Tabled for CycleReport {
    const LENGTH: usize = 4;

    fn fields(&self) -> Vec<Cow<'_, str>> {
        let (result, detail) = match &self.outcome {
            CycleOutcome::Pending => ("Pending", String::new()),
            CycleOutcome::Scored(scores) => (
                "Scored",
                scores
                    .iter()
                    .map(|s| format!("{}={}", s.name, s.score))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            CycleOutcome::Unschedulable(status) => ("Unschedulable", status.reason().to_string()),
            CycleOutcome::Failed(status) => ("Error", status.reason().to_string()),
        };
        let node = self
            .outcome
            .best_node()
            .map(|s| s.name.as_str())
            .unwrap_or("<none>");

        vec![
            Cow::Borrowed(self.pod.as_str()),
            Cow::Borrowed(result),
            Cow::Borrowed(node),
            Cow::Owned(detail),
        ]
    }

    fn headers() -> Vec<Cow<'static, str>> {
        vec![
            Cow::Borrowed("POD"),
            Cow::Borrowed("RESULT"),
            Cow::Borrowed("NODE"),
            Cow::Borrowed("SCORES"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{NodeScore, Status};

    #[test]
    fn test_report_fields() {
        let report = CycleReport {
            pod: "web-0".to_string(),
            outcome: CycleOutcome::Scored(vec![NodeScore::new("a", 0), NodeScore::new("b", 100)]),
        };
        assert_eq!(report.fields(), vec!["web-0", "Scored", "b", "a=0 b=100"]);

        let report = CycleReport {
            pod: "web-1".to_string(),
            outcome: CycleOutcome::Unschedulable(Status::unschedulable("waiting")),
        };
        assert_eq!(report.fields(), vec!["web-1", "Unschedulable", "<none>", "waiting"]);
    }
}
