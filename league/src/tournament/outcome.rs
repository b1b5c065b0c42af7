//! Business outcomes of the registration workflow.
//!
//! Expected results such as a passed deadline or a full tournament are values,
//! not errors. Only infrastructure failures travel through `TournamentError`.

use serde::Serialize;

/// Which operation produced a successful outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentAction {
    Apply,
    Cancel,
    Update,
    RecordResult,
}

impl TournamentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentAction::Apply => "apply",
            TournamentAction::Cancel => "cancel",
            TournamentAction::Update => "update",
            TournamentAction::RecordResult => "record_result",
        }
    }
}

/// Tagged result of a workflow operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentOutcome {
    Success(TournamentAction),
    NotFound,
    DeadlinePassed,
    AlreadyFinished,
    DuplicateRegistration,
    NotRegistered,
    TeamNotFound,
}

impl TournamentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TournamentOutcome::Success(_))
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            TournamentOutcome::Success(_) => "success",
            TournamentOutcome::NotFound => "not_found",
            TournamentOutcome::DeadlinePassed => "deadline_passed",
            TournamentOutcome::AlreadyFinished => "already_finished",
            TournamentOutcome::DuplicateRegistration => "duplicate_registration",
            TournamentOutcome::NotRegistered => "not_registered",
            TournamentOutcome::TeamNotFound => "team_not_found",
        }
    }

    /// User-facing message
    pub fn message(&self) -> &'static str {
        match self {
            TournamentOutcome::Success(TournamentAction::Apply) => "신청이 완료되었습니다.",
            TournamentOutcome::Success(TournamentAction::Cancel) => "취소가 완료되었습니다.",
            TournamentOutcome::Success(TournamentAction::Update) => "수정이 완료되었습니다.",
            TournamentOutcome::Success(TournamentAction::RecordResult) => {
                "결과가 등록되었습니다."
            }
            TournamentOutcome::NotFound => "존재하지 않는 대회입니다.",
            TournamentOutcome::DeadlinePassed => "신청 기간이 지났습니다.",
            TournamentOutcome::AlreadyFinished => "이미 마감된 대회입니다.",
            TournamentOutcome::DuplicateRegistration => "이미 신청한 팀입니다.",
            TournamentOutcome::NotRegistered => "신청하지 않은 팀입니다.",
            TournamentOutcome::TeamNotFound => "존재하지 않는 팀입니다.",
        }
    }
}

impl Serialize for TournamentOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("TournamentOutcome", 3)?;
        state.serialize_field("success", &self.is_success())?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", self.message())?;
        state.end()
    }
}

/// Counts from one auto-close sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CloseSummary {
    /// Open tournaments inspected
    pub examined: usize,
    /// Tournaments switched to finished
    pub closed: usize,
    /// Tournaments whose save failed
    pub failed: usize,
}
