use crate::roster::RosterService;

#[derive(Clone)]
pub struct AppState {
    pub roster: RosterService,
}

impl AppState {
    pub fn new(roster: RosterService) -> Self {
        Self { roster }
    }
}
