//! Study core: pure job state machine, view-model helpers and report rendering.
mod effect;
mod msg;
mod payload;
mod render;
mod state;
mod step;
mod update;
mod validation;
mod view_model;

pub use effect::{Effect, TimerKind};
pub use msg::Msg;
pub use payload::{
    ConsensusEntry, FactorStats, ItemEntry, KeyStatement, PersonaEntry, PersonaProfile,
    ResultPayload, StructuredItem, TopicInfo, TypeEntry,
};
pub use render::{
    render, ConsensusLine, ConsensusSection, DisplayReport, FactorRow, ItemLine, PersonaCard,
    RepresentativeItems, RepresentativeLine, SummaryBlock, TypeDetail, TypeSection,
    BADGE_MIRROR, BADGE_POSITIVE, BRIEF_LIMIT, NO_CONSENSUS, NO_INFORMATION, NO_ITEMS,
    NOT_AVAILABLE,
};
pub use state::{
    AppState, ActiveTimers, JobId, JobPhase, Phase, RemoteStatus, StatusUpdate,
    FALLBACK_JOB_ERROR,
};
pub use step::{parse_step_index, StepStatus, PIPELINE_STEPS};
pub use update::update;
pub use validation::{validate_start, Credential, StartRequest, ValidationError};
pub use view_model::{format_elapsed, AppViewModel, Section, StepView};
