/// Backend pipeline stages, in order. "Step N" in a status label refers to
/// `PIPELINE_STEPS[N - 1]`.
pub const PIPELINE_STEPS: [&str; 7] = [
    "주제 구체화",
    "Q-Set 구성",
    "페르소나 생성",
    "Q-Sorting",
    "요인 분석",
    "유형 이원화",
    "리포트 생성",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Active,
    Pending,
}

impl StepStatus {
    pub fn for_step(step: u32, current: u32) -> Self {
        use std::cmp::Ordering;
        match step.cmp(&current) {
            Ordering::Less => StepStatus::Done,
            Ordering::Equal => StepStatus::Active,
            Ordering::Greater => StepStatus::Pending,
        }
    }
}

const STEP_TOKEN: &str = "Step";

/// Extract the numeral following the first `Step` token that has one.
///
/// Whitespace between the token and the digits is allowed. A label without a
/// match yields 0.
pub fn parse_step_index(label: &str) -> u32 {
    let mut rest = label;
    while let Some(pos) = rest.find(STEP_TOKEN) {
        let after = &rest[pos + STEP_TOKEN.len()..];
        let digits: String = after
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if !digits.is_empty() {
            return digits.parse().unwrap_or(0);
        }
        rest = after;
    }
    0
}
