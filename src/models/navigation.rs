use rocket::serde::Serialize;
use schemars::JsonSchema;

#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    Loading,
    NoUser,
    NoProfile,
    WrongRole,
    Unapproved,
    Authorized,
}

#[derive(Serialize, Debug, Clone, Eq, PartialEq, JsonSchema)]
#[serde(tag = "type", content = "location", rename_all = "snake_case")]
pub enum GuardAction {
    Spinner,
    Redirect(String),
    Render,
}

#[derive(Serialize, Debug, Clone, Eq, PartialEq, JsonSchema)]
pub struct GuardDecision {
    pub state: GuardState,
    pub action: GuardAction,
}

impl GuardDecision {
    pub fn is_authorized(&self) -> bool {
        self.state == GuardState::Authorized
    }
}
