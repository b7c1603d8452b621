/// Actions dispatched into the App state by the background poller.
pub enum AppAction {
    StatusUpdated(serde_json::Value),
    BudgetUpdated(serde_json::Value),
    RouterUpdated(serde_json::Value),
    GenerationsUpdated(Vec<serde_json::Value>),
    ControlError(String),
}

/// TUI application state.
pub struct App {
    pub status: Option<serde_json::Value>,
    pub budget: Option<serde_json::Value>,
    pub router: Option<serde_json::Value>,
    pub generations: Vec<serde_json::Value>,
    pub generation_scroll: usize,
    pub show_help: bool,
    pub should_quit: bool,
    pub endpoint: String,
    pub connected: bool,
    pub last_error: Option<String>,
    pub last_refresh: std::time::Instant,
}

impl App {
    pub fn new(endpoint: String) -> Self {
        Self {
            status: None,
            budget: None,
            router: None,
            generations: Vec::new(),
            generation_scroll: 0,
            show_help: false,
            should_quit: false,
            endpoint,
            connected: false,
            last_error: None,
            last_refresh: std::time::Instant::now(),
        }
    }

    pub fn apply(&mut self, action: AppAction) {
        match action {
            AppAction::StatusUpdated(status) => {
                self.status = Some(status);
                self.connected = true;
                self.last_error = None;
                self.last_refresh = std::time::Instant::now();
            }
            AppAction::BudgetUpdated(budget) => {
                self.budget = Some(budget);
            }
            AppAction::RouterUpdated(router) => {
                self.router = Some(router);
            }
            AppAction::GenerationsUpdated(generations) => {
                self.generations = generations;
            }
            AppAction::ControlError(err) => {
                self.connected = false;
                self.last_error = Some(err);
            }
        }
    }

    pub fn scroll_up(&mut self) {
        self.generation_scroll = self.generation_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if !self.generations.is_empty() {
            self.generation_scroll = (self.generation_scroll + 1).min(self.generations.len() - 1);
        }
    }
}
