use crate::render::{render, DisplayReport};
use crate::step::{StepStatus, PIPELINE_STEPS};
use crate::{AppState, JobId, JobPhase, Phase};

/// The four mutually exclusive screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Input,
    Progress,
    Result,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub number: u32,
    pub label: &'static str,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub section: Section,
    pub phase: Phase,
    pub topic_input: String,
    pub topic: Option<String>,
    pub job_id: Option<JobId>,
    pub progress: u32,
    pub step_index: u32,
    pub steps: Vec<StepView>,
    pub current_step: String,
    pub logs: Vec<String>,
    pub elapsed_secs: u64,
    pub elapsed_label: String,
    pub last_poll_error: Option<String>,
    pub validation_error: Option<String>,
    pub error_message: Option<String>,
    pub report: Option<DisplayReport>,
    pub active_timers: usize,
    pub dirty: bool,
}

impl AppState {
    pub fn view(&self) -> AppViewModel {
        let phase = self.phase().kind();
        let section = match phase {
            Phase::Idle => Section::Input,
            Phase::Submitting | Phase::Running => Section::Progress,
            Phase::Completed => Section::Result,
            Phase::Errored => Section::Error,
        };

        let steps = (1..=PIPELINE_STEPS.len() as u32)
            .zip(PIPELINE_STEPS)
            .map(|(number, label)| StepView {
                number,
                label,
                status: if phase == Phase::Completed {
                    StepStatus::Done
                } else {
                    StepStatus::for_step(number, self.step_index())
                },
            })
            .collect();

        let (error_message, report) = match self.phase() {
            JobPhase::Errored { message } => (Some(message.clone()), None),
            JobPhase::Completed { result, .. } => (None, Some(render(result))),
            _ => (None, None),
        };

        AppViewModel {
            section,
            phase,
            topic_input: self.topic_input().to_string(),
            topic: self.submitted_topic().map(str::to_string),
            job_id: self.phase().job_id().cloned(),
            progress: self.progress().min(100),
            step_index: self.step_index(),
            steps,
            current_step: self.current_step().to_string(),
            logs: self.logs().to_vec(),
            elapsed_secs: self.elapsed_secs(),
            elapsed_label: format_elapsed(self.elapsed_secs()),
            last_poll_error: self.last_poll_error().map(str::to_string),
            validation_error: self.validation_error().map(|e| e.to_string()),
            error_message,
            report,
            active_timers: self.active_timer_count(),
            dirty: self.is_dirty(),
        }
    }
}

/// `MM:SS`; minutes keep counting past 59.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::format_elapsed;

    #[test]
    fn elapsed_is_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3725), "62:05");
    }
}
