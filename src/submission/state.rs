#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Submitting => "Submitting…",
            Self::Succeeded => "Consent form submitted",
            Self::Failed(_) => "Submission failed",
        }
    }
}
