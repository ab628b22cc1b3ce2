//! Application state and main event loop.

mod constants;
pub mod input;
pub(crate) mod navigation;
mod render;
mod requests;
pub mod state;

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use simsweep_client::{Backend, ClientResult};
use simsweep_core::{DuplicateGroup, ProgressSnapshot, Screen};

use crate::TuiConfig;
use crate::event::KeyAction;
use crate::groups::{ActionResolver, DuplicateGroupView};
use crate::picker::{ExpandOutcome, ExpandTicket};
use crate::theme::Theme;

use self::constants::{BACKEND_CHANNEL_SIZE, SIMILARITY_STEP, TICK_INTERVAL_MS};
use self::input::{InputResult, InputState};
use self::navigation::ListNavigator;
use self::render::{RenderContext, render_app};
use self::requests::Requests;
use self::state::{AppMode, BackendEvent, SettingsScreen, StatusMessage, UserSettings};

/// Application result type.
pub type AppResult<T> = color_eyre::Result<T>;

/// Main application state.
pub struct App<B: Backend> {
    requests: Requests<B>,
    rx: mpsc::Receiver<BackendEvent>,
    poll_interval: Duration,
    server: String,

    mode: AppMode,
    screen: Screen,
    theme: Theme,
    user_settings: UserSettings,
    status: Option<StatusMessage>,
    needs_redraw: bool,

    // Settings screen
    settings: SettingsScreen,
    input_state: Option<InputState>,

    // Progress screen
    /// Set once the startup state check has been answered.
    state_checked: bool,
    snapshot: Option<ProgressSnapshot>,
    progress_in_flight: bool,
    last_poll: Option<Instant>,
    /// The backend has reported the current scan past its settings page.
    scan_started: bool,

    // Results screen
    groups: DuplicateGroupView,
    groups_generation: u64,
    /// Generation of the group fetch in flight, if any.
    groups_pending: Option<u64>,
    /// Generation of the fetch that follows a successful action.
    action_refetch: Option<u64>,
    resolver: ActionResolver,
}

impl<B: Backend> App<B> {
    /// Create the application. No request is issued until [`start`](Self::start).
    pub fn new(backend: B, config: TuiConfig) -> Self {
        let (tx, rx) = mpsc::channel(BACKEND_CHANNEL_SIZE);
        let user_settings = config.settings;
        let theme = Theme::from_variant(user_settings.theme_variant());
        let settings = SettingsScreen::new(user_settings.algorithm, user_settings.similarity);

        Self {
            requests: Requests::new(backend, tx),
            rx,
            poll_interval: config.poll_interval,
            server: config.server,
            mode: AppMode::default(),
            screen: Screen::default(),
            theme,
            user_settings,
            status: None,
            needs_redraw: true,
            settings,
            input_state: None,
            state_checked: false,
            snapshot: None,
            progress_in_flight: false,
            last_poll: None,
            scan_started: false,
            groups: DuplicateGroupView::new(),
            groups_generation: 0,
            groups_pending: None,
            action_refetch: None,
            resolver: ActionResolver::new(),
        }
    }

    /// Ask the backend which screen to show.
    pub fn start(&mut self) {
        info!(server = %self.server, "Checking backend state");
        self.request_progress();
    }

    /// Run the application with async event loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        self.start();

        let mut interval = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));
        let mut events = EventStream::new();

        while self.mode != AppMode::Quit {
            if self.needs_redraw {
                terminal.draw(|frame| self.render(frame))?;
                self.needs_redraw = false;
            }

            tokio::select! {
                biased;

                Some(Ok(event)) = events.next() => {
                    if let Event::Key(key) = event {
                        self.handle_key(key);
                    }
                    // Drain any additional pending events
                    while self.mode != AppMode::Quit && crossterm::event::poll(Duration::ZERO)? {
                        if let Event::Key(key) = crossterm::event::read()? {
                            self.handle_key(key);
                        }
                    }
                    self.needs_redraw = true;
                }

                Some(event) = self.rx.recv() => {
                    self.handle_backend_event(event);
                    self.needs_redraw = true;
                }

                _ = interval.tick() => {
                    self.poll_progress();
                }
            }
        }

        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn settings(&self) -> &SettingsScreen {
        &self.settings
    }

    pub fn groups(&self) -> &DuplicateGroupView {
        &self.groups
    }

    pub fn resolver(&self) -> &ActionResolver {
        &self.resolver
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Wait for the next backend result.
    pub async fn next_backend_event(&mut self) -> Option<BackendEvent> {
        self.rx.recv().await
    }

    // ------------------------------------------------------------------
    // Backend results
    // ------------------------------------------------------------------

    /// Apply one backend result to the state.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::RootListing { ticket, result } => {
                let outcome = self
                    .settings
                    .picker
                    .complete_open(&ticket, result, &self.settings.guard);
                self.report_listing(&ticket, outcome);
            }
            BackendEvent::Listing { ticket, result } => {
                let outcome = self
                    .settings
                    .picker
                    .complete_expand(&ticket, result, &self.settings.guard);
                self.report_listing(&ticket, outcome);
            }
            BackendEvent::Submitted(result) => self.handle_submitted(result),
            BackendEvent::Progress(result) => self.handle_progress(result),
            BackendEvent::ActionDone(result) => self.handle_action_done(result),
            BackendEvent::Groups { generation, result } => self.handle_groups(generation, result),
        }
    }

    fn report_listing(&mut self, ticket: &ExpandTicket, outcome: ExpandOutcome) {
        match outcome {
            ExpandOutcome::Failed(message) => {
                let target = if ticket.path.is_empty() { "roots" } else { ticket.path.as_str() };
                self.status = Some(StatusMessage::error(format!("Cannot list {target}: {message}")));
            }
            ExpandOutcome::Expanded { children: 0 } if !ticket.path.is_empty() => {
                self.status = Some(StatusMessage::info(format!("{} has no subdirectories", ticket.path)));
            }
            _ => {}
        }
    }

    fn handle_submitted(&mut self, result: ClientResult<()>) {
        self.settings.submitting = false;
        match result {
            Ok(()) => {
                info!(directories = self.settings.selection.len(), "Scan started");
                self.settings.guard.commit();
                self.settings.picker.close();
                self.remember_scan_settings();
                self.screen = Screen::Progress;
                self.snapshot = None;
                self.scan_started = false;
                self.request_progress();
            }
            Err(err) => {
                warn!(error = %err, "Settings submission failed");
                self.status = Some(StatusMessage::error(format!(
                    "Could not start scan: {}",
                    err.summary()
                )));
            }
        }
    }

    fn handle_progress(&mut self, result: ClientResult<ProgressSnapshot>) {
        self.progress_in_flight = false;
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "Progress request failed");
                self.state_checked = true;
                self.status = Some(StatusMessage::error(format!(
                    "Backend unavailable: {}",
                    err.summary()
                )));
                return;
            }
        };

        let page = snapshot.screen();
        if !self.state_checked {
            self.state_checked = true;
            debug!(?page, "Backend state check");
            self.show(page, snapshot);
            return;
        }
        if self.screen != Screen::Progress {
            return;
        }
        match page {
            Screen::Progress => {
                self.scan_started = true;
                self.snapshot = Some(snapshot);
            }
            Screen::Results => self.show(Screen::Results, snapshot),
            // Right after a submit the backend may not have left its
            // settings page yet.
            Screen::Settings if !self.scan_started => {}
            Screen::Settings => {
                let message = if snapshot.message.is_empty() {
                    "Scan stopped".to_string()
                } else {
                    snapshot.message.clone()
                };
                self.status = Some(StatusMessage::error(message));
                self.show(Screen::Settings, snapshot);
            }
        }
    }

    /// Switch to the screen the backend reports.
    fn show(&mut self, page: Screen, mut snapshot: ProgressSnapshot) {
        match page {
            Screen::Settings => {
                if self.screen != Screen::Settings {
                    self.new_settings_screen();
                }
            }
            Screen::Progress => {
                self.scan_started = true;
                self.screen = Screen::Progress;
                self.snapshot = Some(snapshot);
            }
            Screen::Results => {
                let groups = std::mem::take(&mut snapshot.group_list);
                info!(groups = groups.len(), "Showing results");
                self.groups.replace(groups);
                self.resolver.reset();
                self.action_refetch = None;
                self.screen = Screen::Results;
                self.snapshot = Some(snapshot);
            }
        }
    }

    fn handle_action_done(&mut self, result: ClientResult<()>) {
        match result {
            Ok(()) => {
                if self.resolver.action_finished(Ok(())) {
                    self.status = Some(StatusMessage::info("Action applied, refreshing groups"));
                    self.action_refetch = Some(self.fetch_groups());
                }
            }
            Err(err) => {
                let message = err.summary();
                self.resolver.action_finished(Err(message.clone()));
                let text = if err.is_rejection() {
                    format!("Backend rejected the action: {message}")
                } else {
                    format!("Action failed: {message}")
                };
                self.status = Some(StatusMessage::error(text));
            }
        }
    }

    fn handle_groups(&mut self, generation: u64, result: ClientResult<Vec<DuplicateGroup>>) {
        if self.groups_pending != Some(generation) {
            debug!(generation, "Discarding superseded group fetch");
            return;
        }
        self.groups_pending = None;
        if self.action_refetch.take() == Some(generation) {
            self.resolver.refresh_finished();
        }
        match result {
            Ok(groups) => {
                if self.screen == Screen::Results {
                    debug!(groups = groups.len(), "Groups refreshed");
                    self.groups.replace(groups);
                }
            }
            Err(err) => {
                warn!(error = %err, "Group refresh failed");
                self.status = Some(StatusMessage::error(format!(
                    "Could not load groups: {}",
                    err.summary()
                )));
            }
        }
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    fn request_progress(&mut self) {
        self.progress_in_flight = true;
        self.last_poll = Some(Instant::now());
        self.requests.progress();
    }

    /// Poll while the progress screen is showing, one request at a time.
    fn poll_progress(&mut self) {
        if self.screen != Screen::Progress || self.progress_in_flight {
            return;
        }
        let due = self
            .last_poll
            .is_none_or(|last| last.elapsed() >= self.poll_interval);
        if due {
            self.request_progress();
        }
    }

    /// Start a group fetch that supersedes any fetch still in flight.
    fn fetch_groups(&mut self) -> u64 {
        self.groups_generation += 1;
        let generation = self.groups_generation;
        self.groups_pending = Some(generation);
        self.requests.groups(generation);
        generation
    }

    fn open_picker(&mut self) {
        let ticket = self.settings.picker.open();
        self.requests.root_listing(ticket);
    }

    fn submit(&mut self) {
        if self.settings.submitting {
            return;
        }
        if !self.settings.can_submit() {
            self.status = Some(StatusMessage::error("Select at least one directory"));
            return;
        }
        let submission = self.settings.submission();
        info!(
            directories = submission.directories.len(),
            algorithm = %submission.algorithm,
            similarity = submission.similarity,
            "Submitting scan settings"
        );
        self.settings.submitting = true;
        self.requests.submit(submission);
    }

    fn new_settings_screen(&mut self) {
        self.settings = self
            .settings
            .successor(self.user_settings.algorithm, self.user_settings.similarity);
        self.input_state = None;
        if self.mode == AppMode::EnteringPath {
            self.mode = AppMode::Normal;
        }
        self.groups.replace(Vec::new());
        self.resolver.reset();
        self.action_refetch = None;
        self.snapshot = None;
        self.scan_started = false;
        self.screen = Screen::Settings;
    }

    fn remember_scan_settings(&mut self) {
        self.user_settings.algorithm = self.settings.algorithm;
        self.user_settings.similarity = self.settings.similarity;
        self.save_user_settings();
    }

    fn save_user_settings(&self) {
        if let Err(err) = self.user_settings.save() {
            warn!(error = %err, "Could not save settings");
        }
    }

    // ------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------

    /// Handle one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.mode == AppMode::EnteringPath {
            self.handle_input_event(key);
        } else {
            self.handle_action(KeyAction::from_key_event(key));
        }
    }

    fn handle_action(&mut self, action: KeyAction) {
        if action == KeyAction::ForceQuit {
            self.mode = AppMode::Quit;
            return;
        }

        if self.mode == AppMode::Help {
            if matches!(
                action,
                KeyAction::ToggleHelp | KeyAction::Quit | KeyAction::Cancel
            ) {
                self.mode = AppMode::Normal;
            }
            return;
        }

        match self.screen {
            Screen::Settings if self.settings.picker.is_visible() => self.handle_picker_action(action),
            Screen::Settings => self.handle_settings_action(action),
            Screen::Progress => self.handle_progress_action(action),
            Screen::Results => self.handle_results_action(action),
        }
    }

    /// Keys every screen understands.
    fn handle_global_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Quit => self.mode = AppMode::Quit,
            KeyAction::ToggleHelp => self.mode = AppMode::Help,
            KeyAction::ToggleTheme => {
                self.theme = self.theme.toggle();
                self.user_settings.theme = self.theme.variant.as_str().to_string();
                self.save_user_settings();
            }
            _ => {}
        }
    }

    fn handle_picker_action(&mut self, action: KeyAction) {
        let picker = &mut self.settings.picker;
        if picker.navigate(action) {
            return;
        }
        match action {
            KeyAction::MoveRight => {
                if let Some(ticket) = picker.expand_selected() {
                    self.requests.listing(ticket);
                }
            }
            KeyAction::MoveLeft => picker.collapse_selected(),
            KeyAction::Open | KeyAction::Confirm => {
                if let Some(ticket) = picker.toggle_selected() {
                    self.requests.listing(ticket);
                }
            }
            KeyAction::Select | KeyAction::Add => {
                if let Some(path) = picker.selected_path() {
                    self.add_directory(&path);
                }
            }
            KeyAction::Refresh => self.open_picker(),
            KeyAction::Cancel | KeyAction::Quit => picker.close(),
            other => self.handle_global_action(other),
        }
    }

    fn handle_settings_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Open => self.open_picker(),
            KeyAction::TypePath => {
                self.input_state = Some(InputState::new());
                self.mode = AppMode::EnteringPath;
            }
            KeyAction::MoveUp => self.settings.move_cursor(-1),
            KeyAction::MoveDown => self.settings.move_cursor(1),
            KeyAction::JumpToTop => self.settings.cursor = 0,
            KeyAction::JumpToBottom => {
                self.settings.cursor = self.settings.selection.len().saturating_sub(1);
            }
            KeyAction::Remove => {
                if let Some(path) = self.settings.remove_selected() {
                    self.status = Some(StatusMessage::info(format!("Removed {path}")));
                }
            }
            KeyAction::NextAlgorithm => self.settings.algorithm = self.settings.algorithm.next(),
            KeyAction::IncreaseSimilarity => self.settings.adjust_similarity(SIMILARITY_STEP),
            KeyAction::DecreaseSimilarity => self.settings.adjust_similarity(-SIMILARITY_STEP),
            KeyAction::Confirm => self.submit(),
            other => self.handle_global_action(other),
        }
    }

    fn handle_progress_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Refresh if !self.progress_in_flight => self.request_progress(),
            other => self.handle_global_action(other),
        }
    }

    fn handle_results_action(&mut self, action: KeyAction) {
        if self.resolver.menu().is_some() {
            match action {
                KeyAction::MoveUp => self.resolver.move_up(),
                KeyAction::MoveDown => self.resolver.move_down(),
                KeyAction::Confirm => {
                    if let Some(request) = self.resolver.confirm() {
                        self.requests.action(request);
                    }
                }
                KeyAction::Cancel => {
                    self.resolver.cancel();
                }
                KeyAction::Quit | KeyAction::ToggleHelp | KeyAction::ToggleTheme => {
                    self.handle_global_action(action)
                }
                _ => {}
            }
            return;
        }

        let action = match action {
            KeyAction::MoveLeft => KeyAction::MoveUp,
            KeyAction::MoveRight => KeyAction::MoveDown,
            other => other,
        };
        if self.groups.navigate(action) {
            return;
        }
        match action {
            KeyAction::NextGroup => self.groups.next_group(),
            KeyAction::PrevGroup => self.groups.prev_group(),
            KeyAction::Select => self.groups.toggle_grab(),
            KeyAction::Confirm if self.groups_pending.is_none() => {
                if let Some(gesture) = self.groups.drop_gesture() {
                    self.resolver.on_drop(gesture, self.groups.groups());
                }
            }
            KeyAction::Cancel => self.groups.release(),
            KeyAction::Refresh if self.groups_pending.is_none() && !self.resolver.is_busy() => {
                self.fetch_groups();
            }
            KeyAction::NewScan => self.new_settings_screen(),
            other => self.handle_global_action(other),
        }
    }

    fn handle_input_event(&mut self, key: KeyEvent) {
        let Some(input) = self.input_state.as_mut() else {
            self.mode = AppMode::Normal;
            return;
        };
        match input.handle_key(key) {
            InputResult::Continue => {}
            InputResult::Cancel => {
                self.input_state = None;
                self.mode = AppMode::Normal;
            }
            InputResult::Submit(value) => match self.settings.add(&value) {
                Ok(()) => {
                    self.status = Some(StatusMessage::info(format!("Added {value}")));
                    self.input_state = None;
                    self.mode = AppMode::Normal;
                }
                Err(err) => input.set_error(err.to_string()),
            },
        }
    }

    fn add_directory(&mut self, path: &str) {
        self.status = Some(match self.settings.add(path) {
            Ok(()) => StatusMessage::info(format!("Added {path}")),
            Err(err) => StatusMessage::error(err.to_string()),
        });
    }
}

impl<B: Backend> Widget for &App<B> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let ctx = RenderContext {
            theme: &self.theme,
            mode: self.mode,
            screen: self.screen,
            server: &self.server,
            settings: &self.settings,
            input_state: self.input_state.as_ref(),
            snapshot: self.snapshot.as_ref(),
            groups: &self.groups,
            groups_loading: self.groups_pending.is_some(),
            resolver: &self.resolver,
            status: self.status.as_ref(),
        };

        render_app(&ctx, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};
    use simsweep_client::ClientError;
    use simsweep_core::{ActionRequest, DirEntry, GroupAction, SettingsSubmission};

    use crate::groups::ResolverState;
    use crate::groups::test_support::{file, group};
    use crate::picker::NodeState;

    /// A request the mock backend received.
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List(String),
        Submit(SettingsSubmission),
        Progress,
        Groups,
        Action(ActionRequest),
    }

    #[derive(Default)]
    struct Script {
        calls: Vec<Call>,
        listing_error: Option<String>,
        action_error: Option<String>,
        /// HTTP status and reason the action endpoint answers with.
        action_rejection: Option<(u16, String)>,
        progress: Vec<ProgressSnapshot>,
        groups: Vec<DuplicateGroup>,
    }

    #[derive(Clone, Default)]
    struct MockBackend {
        script: Arc<Mutex<Script>>,
    }

    impl MockBackend {
        fn calls(&self) -> Vec<Call> {
            self.script.lock().unwrap().calls.clone()
        }

        fn count(&self, wanted: impl Fn(&Call) -> bool) -> usize {
            self.calls().iter().filter(|c| wanted(c)).count()
        }

        fn record(&self, call: Call) {
            self.script.lock().unwrap().calls.push(call);
        }
    }

    fn server_error(message: &str) -> ClientError {
        ClientError::Server {
            message: message.to_string(),
        }
    }

    impl Backend for MockBackend {
        fn list_directories(
            &self,
            path: &str,
        ) -> impl Future<Output = ClientResult<Vec<DirEntry>>> + Send {
            self.record(Call::List(path.to_string()));
            let error = self.script.lock().unwrap().listing_error.clone();
            let parent = path.to_string();
            async move {
                match error {
                    Some(message) => Err(server_error(&message)),
                    None => Ok(["x", "y"]
                        .iter()
                        .map(|name| DirEntry::new(*name, format!("{parent}/{name}")))
                        .collect()),
                }
            }
        }

        fn submit_settings(
            &self,
            submission: &SettingsSubmission,
        ) -> impl Future<Output = ClientResult<()>> + Send {
            self.record(Call::Submit(submission.clone()));
            async { Ok(()) }
        }

        fn progress(&self) -> impl Future<Output = ClientResult<ProgressSnapshot>> + Send {
            self.record(Call::Progress);
            let mut script = self.script.lock().unwrap();
            let snapshot = if script.progress.is_empty() {
                ProgressSnapshot::default()
            } else {
                script.progress.remove(0)
            };
            async move { Ok(snapshot) }
        }

        fn duplicate_groups(&self) -> impl Future<Output = ClientResult<Vec<DuplicateGroup>>> + Send {
            self.record(Call::Groups);
            let groups = self.script.lock().unwrap().groups.clone();
            async move { Ok(groups) }
        }

        fn group_action(
            &self,
            request: &ActionRequest,
        ) -> impl Future<Output = ClientResult<()>> + Send {
            self.record(Call::Action(request.clone()));
            let script = self.script.lock().unwrap();
            let error = script.action_error.clone();
            let rejection = script.action_rejection.clone();
            drop(script);
            async move {
                match (error, rejection) {
                    (Some(message), _) => Err(server_error(&message)),
                    (None, Some((status, reason))) => Err(ClientError::Rejected {
                        url: "http://backend.test/api/duplicate_group_action".to_string(),
                        status,
                        reason,
                    }),
                    (None, None) => Ok(()),
                }
            }
        }
    }

    fn config() -> TuiConfig {
        TuiConfig {
            server: "http://backend.test".to_string(),
            poll_interval: Duration::from_millis(10),
            settings: UserSettings::default(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press(app: &mut App<MockBackend>, code: KeyCode) {
        app.handle_key(key(code));
    }

    async fn pump(app: &mut App<MockBackend>) {
        let event = app.next_backend_event().await.unwrap();
        app.handle_backend_event(event);
    }

    fn snapshot(page: &str) -> ProgressSnapshot {
        ProgressSnapshot {
            page: page.to_string(),
            ..ProgressSnapshot::default()
        }
    }

    fn results_snapshot() -> ProgressSnapshot {
        let mut photo_a = file("/p/a.jpg");
        photo_a.device_id = 7;
        let mut photo_b = file("/p/b.jpg");
        photo_b.device_id = 7;
        ProgressSnapshot {
            page: "/results".to_string(),
            group_list: vec![group(&[photo_a, photo_b]), group(&[file("/q/c.jpg"), file("/q/d.jpg")])],
            ..ProgressSnapshot::default()
        }
    }

    async fn results_app(backend: &MockBackend) -> App<MockBackend> {
        backend.script.lock().unwrap().progress.push(results_snapshot());
        let mut app = App::new(backend.clone(), config());
        app.start();
        pump(&mut app).await;
        assert_eq!(app.screen(), Screen::Results);
        app
    }

    #[tokio::test]
    async fn test_state_check_redirects_to_results() {
        let backend = MockBackend::default();
        let app = results_app(&backend).await;
        assert_eq!(app.groups().groups().len(), 2);
        assert_eq!(backend.calls(), vec![Call::Progress]);
    }

    #[tokio::test]
    async fn test_hardlink_confirm_posts_once_and_refetches_once() {
        let backend = MockBackend::default();
        let mut app = results_app(&backend).await;
        backend.script.lock().unwrap().groups = vec![group(&[file("/q/c.jpg"), file("/q/d.jpg")])];

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert!(app.resolver().menu().is_some());

        // Move from copy_date to hardlink_image.
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        // Repeated confirms while pending send nothing.
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        pump(&mut app).await;
        assert_eq!(app.resolver().state(), &ResolverState::Refreshing);
        pump(&mut app).await;
        assert_eq!(app.resolver().state(), &ResolverState::Idle);

        let actions: Vec<_> = backend
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Action(request) => Some(request),
                _ => None,
            })
            .collect();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, GroupAction::HardlinkImage);
        assert_eq!(actions[0].source, "/p/a.jpg");
        assert_eq!(actions[0].target, "/p/b.jpg");
        assert_eq!(backend.count(|c| *c == Call::Groups), 1);
        assert_eq!(app.groups().groups().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_action_keeps_menu_without_refetch() {
        let backend = MockBackend::default();
        let mut app = results_app(&backend).await;
        backend.script.lock().unwrap().action_error = Some("Target is read-only".to_string());

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        pump(&mut app).await;

        let menu = app.resolver().menu().unwrap();
        assert_eq!(menu.error.as_deref(), Some("Target is read-only"));
        assert!(matches!(app.resolver().state(), ResolverState::Choosing(_)));
        assert_eq!(backend.count(|c| *c == Call::Groups), 0);
        let status = app.status().unwrap();
        assert!(!status.ok);
        assert_eq!(status.text, "Action failed: Target is read-only");
    }

    #[tokio::test]
    async fn test_rejected_action_is_reported_as_rejection() {
        let backend = MockBackend::default();
        let mut app = results_app(&backend).await;
        backend.script.lock().unwrap().action_rejection = Some((409, "Conflict".to_string()));

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        pump(&mut app).await;

        assert_eq!(app.resolver().menu().unwrap().error.as_deref(), Some("409 Conflict"));
        assert_eq!(app.status().unwrap().text, "Backend rejected the action: 409 Conflict");
        assert_eq!(backend.count(|c| *c == Call::Groups), 0);
    }

    #[tokio::test]
    async fn test_drop_ignored_while_groups_load() {
        let backend = MockBackend::default();
        let mut app = results_app(&backend).await;
        backend.script.lock().unwrap().groups = results_snapshot().group_list;

        app.handle_key(KeyEvent {
            modifiers: KeyModifiers::SHIFT,
            ..key(KeyCode::Char('R'))
        });
        assert!(app.groups_pending.is_some());
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert!(app.resolver().menu().is_none());

        pump(&mut app).await;
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert!(app.resolver().menu().is_some());
    }

    #[tokio::test]
    async fn test_superseded_group_fetch_keeps_action_refreshing() {
        let backend = MockBackend::default();
        let mut app = results_app(&backend).await;
        backend.script.lock().unwrap().groups = vec![group(&[file("/q/c.jpg"), file("/q/d.jpg")])];

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        pump(&mut app).await;
        assert_eq!(app.resolver().state(), &ResolverState::Refreshing);

        // An older fetch resolving late must not end the post-action refresh.
        let latest = app.groups_pending.unwrap();
        app.handle_backend_event(BackendEvent::Groups {
            generation: latest - 1,
            result: Ok(Vec::new()),
        });
        assert_eq!(app.resolver().state(), &ResolverState::Refreshing);
        assert_eq!(app.groups().groups().len(), 2);

        // A second drop cannot open a menu before the refetch lands.
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert!(app.resolver().menu().is_none());
        assert_eq!(backend.count(|c| matches!(c, Call::Action(_))), 1);

        pump(&mut app).await;
        assert_eq!(app.resolver().state(), &ResolverState::Idle);
        assert_eq!(app.groups().groups().len(), 1);
    }

    #[tokio::test]
    async fn test_cross_group_drop_shows_no_menu() {
        let backend = MockBackend::default();
        let mut app = results_app(&backend).await;

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char(']'));
        press(&mut app, KeyCode::Enter);

        assert!(app.resolver().menu().is_none());
        assert!(app.groups().grabbed().is_none());
        assert_eq!(backend.calls(), vec![Call::Progress]);
    }

    #[tokio::test]
    async fn test_collapse_while_pending_through_app() {
        let backend = MockBackend::default();
        let mut app = App::new(backend.clone(), config());

        press(&mut app, KeyCode::Char('o'));
        pump(&mut app).await;
        assert_eq!(app.settings().picker.roots().len(), 2);

        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('h'));
        pump(&mut app).await;

        let node = app.settings().picker.node_at(&[0]).unwrap();
        assert_eq!(node.state, NodeState::Collapsed);
        assert!(node.children.is_none());
        assert_eq!(backend.calls(), vec![Call::List(String::new()), Call::List("/x".to_string())]);
    }

    #[tokio::test]
    async fn test_listing_failure_swallowed_after_submit() {
        let backend = MockBackend::default();
        let mut app = App::new(backend.clone(), config());

        press(&mut app, KeyCode::Char('o'));
        pump(&mut app).await;
        press(&mut app, KeyCode::Char(' '));
        backend.script.lock().unwrap().listing_error = Some("Permission denied".to_string());
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Enter);

        // Submission lands before the failing listing.
        let mut events = Vec::new();
        events.push(app.next_backend_event().await.unwrap());
        events.push(app.next_backend_event().await.unwrap());
        events.sort_by_key(|e| !matches!(e, BackendEvent::Submitted(_)));
        for event in events {
            app.handle_backend_event(event);
        }

        assert_eq!(app.screen(), Screen::Progress);
        assert!(app.settings().guard.is_leaving());
        assert!(app.status().is_none_or(|s| s.ok));
        let submitted = backend.calls().into_iter().find_map(|c| match c {
            Call::Submit(s) => Some(s),
            _ => None,
        });
        assert_eq!(submitted.unwrap().directories, vec!["/x".to_string()]);
    }

    #[tokio::test]
    async fn test_listing_failure_reported_before_submit() {
        let backend = MockBackend::default();
        backend.script.lock().unwrap().listing_error = Some("Permission denied".to_string());
        let mut app = App::new(backend, config());

        press(&mut app, KeyCode::Char('o'));
        pump(&mut app).await;

        let status = app.status().unwrap();
        assert!(!status.ok);
        assert!(status.text.contains("Permission denied"));
    }

    #[tokio::test]
    async fn test_progress_ignores_settings_page_until_scan_starts() {
        let backend = MockBackend::default();
        {
            let mut script = backend.script.lock().unwrap();
            script.progress.push(snapshot("/settings"));
            script.progress.push(snapshot("/settings"));
            script.progress.push(snapshot("/progress"));
            script.progress.push(results_snapshot());
        }
        let mut app = App::new(backend.clone(), config());
        app.start();
        pump(&mut app).await;
        assert_eq!(app.screen(), Screen::Settings);

        app.add_directory("/photos");
        app.submit();
        pump(&mut app).await;
        // Poll issued by the submit itself.
        pump(&mut app).await;
        assert_eq!(app.screen(), Screen::Progress);

        app.request_progress();
        pump(&mut app).await;
        assert_eq!(app.screen(), Screen::Progress);
        app.request_progress();
        pump(&mut app).await;
        assert_eq!(app.screen(), Screen::Results);
        assert_eq!(app.groups().tile_count(), 4);
    }

    #[tokio::test]
    async fn test_submit_requires_selection() {
        let backend = MockBackend::default();
        let mut app = App::new(backend.clone(), config());
        press(&mut app, KeyCode::Enter);
        assert!(backend.calls().is_empty());
        assert!(!app.status().unwrap().ok);
    }

    #[tokio::test]
    async fn test_typed_path_validation_keeps_input_open() {
        let backend = MockBackend::default();
        let mut app = App::new(backend, config());

        press(&mut app, KeyCode::Char('i'));
        for c in "photos".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode(), AppMode::EnteringPath);
        assert!(app.settings().selection.is_empty());

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode(), AppMode::Normal);
        assert!(app.settings().selection.contains("/photos"));
    }

    #[tokio::test]
    async fn test_new_scan_resets_results() {
        let backend = MockBackend::default();
        let mut app = results_app(&backend).await;
        press(&mut app, KeyCode::Char(' '));
        app.handle_key(KeyEvent {
            code: KeyCode::Char('N'),
            modifiers: KeyModifiers::SHIFT,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        assert_eq!(app.screen(), Screen::Settings);
        assert!(app.groups().is_empty());
        assert!(app.settings().selection.is_empty());
    }
}
