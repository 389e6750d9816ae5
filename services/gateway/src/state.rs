use matchmaker::Matchmaker;

/// Shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub matchmaker: Matchmaker,
}

impl AppState {
    pub fn new(matchmaker: Matchmaker) -> Self {
        Self { matchmaker }
    }
}
