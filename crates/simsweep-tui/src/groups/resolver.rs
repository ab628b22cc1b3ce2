//! Turns a drop gesture into one backend action.

use tracing::{debug, info, warn};

use simsweep_core::{ActionRequest, CandidateFile, DragGesture, DuplicateGroup, GroupAction};

/// One entry of the action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionChoice {
    pub action: GroupAction,
    pub enabled: bool,
}

/// The dropdown shown after a valid drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMenu {
    pub gesture: DragGesture,
    pub choices: Vec<ActionChoice>,
    pub selected: usize,
    /// Failure of the last confirmed action, if any.
    pub error: Option<String>,
}

impl ActionMenu {
    /// Build the menu for a gesture between two files of one group.
    pub fn new(gesture: DragGesture, source: &CandidateFile, target: &CandidateFile) -> Self {
        let choices: Vec<ActionChoice> = GroupAction::all()
            .map(|action| ActionChoice {
                action,
                enabled: action.is_enabled(source, target),
            })
            .collect();
        let selected = choices.iter().position(|c| c.enabled).unwrap_or(0);
        Self {
            gesture,
            choices,
            selected,
            error: None,
        }
    }

    pub fn choice(&self, action: GroupAction) -> Option<&ActionChoice> {
        self.choices.iter().find(|c| c.action == action)
    }

    pub fn is_enabled(&self, action: GroupAction) -> bool {
        self.choice(action).is_some_and(|c| c.enabled)
    }

    fn move_by(&mut self, delta: isize) {
        let len = self.choices.len() as isize;
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }

    fn select(&mut self, action: GroupAction) {
        if let Some(index) = self.choices.iter().position(|c| c.action == action) {
            self.selected = index;
        }
    }
}

/// Resolver lifecycle. At most one menu exists at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResolverState {
    #[default]
    Idle,
    Choosing(ActionMenu),
    /// The action request is in flight.
    Pending(ActionMenu),
    /// The action succeeded and groups are being re-fetched.
    Refreshing,
}

/// Validates gestures, offers the actions and tracks the request that
/// resolves them.
#[derive(Debug, Clone, Default)]
pub struct ActionResolver {
    state: ResolverState,
}

impl ActionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    /// The visible menu, whether choosing or waiting for the backend.
    pub fn menu(&self) -> Option<&ActionMenu> {
        match &self.state {
            ResolverState::Choosing(menu) | ResolverState::Pending(menu) => Some(menu),
            _ => None,
        }
    }

    /// Whether a request or its follow-up refresh is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            ResolverState::Pending(_) | ResolverState::Refreshing
        )
    }

    /// Handle a drop. Returns whether a menu is now shown for this gesture.
    ///
    /// Invalid gestures and drops while busy leave everything untouched. A
    /// valid drop replaces any menu already open.
    pub fn on_drop(&mut self, gesture: DragGesture, groups: &[DuplicateGroup]) -> bool {
        if self.is_busy() {
            debug!("Ignoring drop while an action is in flight");
            return false;
        }
        if !gesture.is_valid() {
            debug!(?gesture, "Ignoring invalid drop");
            return false;
        }
        let Some(group) = groups.get(gesture.source_group) else {
            return false;
        };
        let (Some(source), Some(target)) = (
            group.find(&gesture.source_path),
            group.find(&gesture.target_path),
        ) else {
            return false;
        };

        let menu = ActionMenu::new(gesture, source, target);
        self.state = ResolverState::Choosing(menu);
        true
    }

    pub fn move_up(&mut self) {
        if let ResolverState::Choosing(menu) = &mut self.state {
            menu.move_by(-1);
        }
    }

    pub fn move_down(&mut self) {
        if let ResolverState::Choosing(menu) = &mut self.state {
            menu.move_by(1);
        }
    }

    /// Highlight a specific action.
    pub fn select(&mut self, action: GroupAction) {
        if let ResolverState::Choosing(menu) = &mut self.state {
            menu.select(action);
        }
    }

    /// Confirm the highlighted action.
    ///
    /// Returns the request to issue, or `None` if nothing is to be sent
    /// (no menu, already pending, or the action is disabled).
    pub fn confirm(&mut self) -> Option<ActionRequest> {
        let ResolverState::Choosing(menu) = &self.state else {
            return None;
        };
        let choice = menu.choices.get(menu.selected)?;
        if !choice.enabled {
            return None;
        }
        let request = ActionRequest::new(choice.action, &menu.gesture);

        let mut menu = menu.clone();
        menu.error = None;
        info!(action = %request.action, source = %request.source, target = %request.target, "Confirming group action");
        self.state = ResolverState::Pending(menu);
        Some(request)
    }

    /// Dismiss the menu. Not possible while busy.
    pub fn cancel(&mut self) -> bool {
        if matches!(self.state, ResolverState::Choosing(_)) {
            self.state = ResolverState::Idle;
            true
        } else {
            false
        }
    }

    /// Apply the outcome of the action request.
    ///
    /// Returns true when the groups must be re-fetched. On failure the menu
    /// goes back to choosing with the error attached.
    pub fn action_finished(&mut self, result: Result<(), String>) -> bool {
        let ResolverState::Pending(menu) = &self.state else {
            return false;
        };
        match result {
            Ok(()) => {
                self.state = ResolverState::Refreshing;
                true
            }
            Err(message) => {
                warn!(%message, "Group action failed");
                let mut menu = menu.clone();
                menu.error = Some(message);
                self.state = ResolverState::Choosing(menu);
                false
            }
        }
    }

    /// The post-action refresh finished, successfully or not.
    pub fn refresh_finished(&mut self) {
        if self.state == ResolverState::Refreshing {
            self.state = ResolverState::Idle;
        }
    }

    /// Forget everything, e.g. when leaving the results screen.
    pub fn reset(&mut self) {
        self.state = ResolverState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::test_support::{file, group};
    use simsweep_core::DateSource;

    fn groups() -> Vec<DuplicateGroup> {
        let mut exif = file("/b.jpg");
        exif.date_source = DateSource::EmbeddedMetadata;
        let mut other_device = file("/c.jpg");
        other_device.device_id = 99;
        let mut no_links = file("/d.jpg");
        no_links.hardlink_eligible = false;
        vec![
            group(&[file("/a.jpg"), exif, other_device, no_links]),
            group(&[file("/x.jpg"), file("/y.jpg")]),
        ]
    }

    fn gesture(source: &str, target: &str) -> DragGesture {
        DragGesture::new(source, 0, target, 0)
    }

    fn enabled(resolver: &ActionResolver) -> Vec<GroupAction> {
        resolver
            .menu()
            .unwrap()
            .choices
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.action)
            .collect()
    }

    #[test]
    fn test_all_actions_enabled_for_plain_pair() {
        let mut resolver = ActionResolver::new();
        assert!(resolver.on_drop(gesture("/b.jpg", "/a.jpg"), &groups()));
        assert_eq!(resolver.menu().unwrap().choices.len(), 3);
        assert_eq!(
            enabled(&resolver),
            vec![GroupAction::CopyDate, GroupAction::HardlinkImage, GroupAction::CopyImage]
        );
    }

    #[test]
    fn test_copy_date_disabled_for_embedded_target() {
        let mut resolver = ActionResolver::new();
        resolver.on_drop(gesture("/a.jpg", "/b.jpg"), &groups());
        assert_eq!(
            enabled(&resolver),
            vec![GroupAction::HardlinkImage, GroupAction::CopyImage]
        );
    }

    #[test]
    fn test_hardlink_disabled_across_devices() {
        let mut resolver = ActionResolver::new();
        resolver.on_drop(gesture("/a.jpg", "/c.jpg"), &groups());
        assert!(!resolver.menu().unwrap().is_enabled(GroupAction::HardlinkImage));
        assert!(resolver.menu().unwrap().is_enabled(GroupAction::CopyImage));
    }

    #[test]
    fn test_hardlink_disabled_for_ineligible_target() {
        let mut resolver = ActionResolver::new();
        resolver.on_drop(gesture("/a.jpg", "/d.jpg"), &groups());
        assert!(!resolver.menu().unwrap().is_enabled(GroupAction::HardlinkImage));
    }

    #[test]
    fn test_cross_group_drop_shows_no_menu() {
        let mut resolver = ActionResolver::new();
        let gesture = DragGesture::new("/a.jpg", 0, "/x.jpg", 1);
        assert!(!resolver.on_drop(gesture, &groups()));
        assert!(resolver.menu().is_none());
    }

    #[test]
    fn test_drop_on_self_shows_no_menu() {
        let mut resolver = ActionResolver::new();
        assert!(!resolver.on_drop(gesture("/a.jpg", "/a.jpg"), &groups()));
        assert_eq!(resolver.state(), &ResolverState::Idle);
    }

    #[test]
    fn test_new_drop_replaces_menu() {
        let mut resolver = ActionResolver::new();
        resolver.on_drop(gesture("/a.jpg", "/b.jpg"), &groups());
        resolver.on_drop(gesture("/a.jpg", "/c.jpg"), &groups());
        assert_eq!(resolver.menu().unwrap().gesture.target_path, "/c.jpg");
    }

    #[test]
    fn test_cancel_removes_menu() {
        let mut resolver = ActionResolver::new();
        resolver.on_drop(gesture("/a.jpg", "/b.jpg"), &groups());
        assert!(resolver.cancel());
        assert!(resolver.menu().is_none());
        assert!(!resolver.cancel());
    }

    #[test]
    fn test_confirm_disabled_action_sends_nothing() {
        let mut resolver = ActionResolver::new();
        resolver.on_drop(gesture("/a.jpg", "/b.jpg"), &groups());
        resolver.select(GroupAction::CopyDate);
        assert!(resolver.confirm().is_none());
        assert!(matches!(resolver.state(), ResolverState::Choosing(_)));
    }

    #[test]
    fn test_confirm_success_then_refresh() {
        let mut resolver = ActionResolver::new();
        resolver.on_drop(gesture("/a.jpg", "/b.jpg"), &groups());
        resolver.select(GroupAction::HardlinkImage);

        let request = resolver.confirm().unwrap();
        assert_eq!(request.action, GroupAction::HardlinkImage);
        assert_eq!(request.source, "/a.jpg");
        assert_eq!(request.target, "/b.jpg");
        assert!(resolver.is_busy());

        // Busy: cancel and drops are ignored, no second request.
        assert!(!resolver.cancel());
        assert!(!resolver.on_drop(gesture("/a.jpg", "/c.jpg"), &groups()));
        assert!(resolver.confirm().is_none());

        assert!(resolver.action_finished(Ok(())));
        assert_eq!(resolver.state(), &ResolverState::Refreshing);
        resolver.refresh_finished();
        assert_eq!(resolver.state(), &ResolverState::Idle);
    }

    #[test]
    fn test_confirm_failure_restores_menu() {
        let mut resolver = ActionResolver::new();
        resolver.on_drop(gesture("/a.jpg", "/b.jpg"), &groups());
        resolver.select(GroupAction::CopyImage);
        resolver.confirm().unwrap();

        assert!(!resolver.action_finished(Err("500 Internal Server Error".into())));
        let menu = resolver.menu().unwrap();
        assert_eq!(menu.error.as_deref(), Some("500 Internal Server Error"));
        assert_eq!(menu.choices[menu.selected].action, GroupAction::CopyImage);
        assert!(!resolver.is_busy());
    }

    #[test]
    fn test_menu_selection_wraps() {
        let mut resolver = ActionResolver::new();
        resolver.on_drop(gesture("/b.jpg", "/a.jpg"), &groups());
        resolver.move_up();
        let menu = resolver.menu().unwrap();
        assert_eq!(menu.choices[menu.selected].action, GroupAction::CopyImage);
    }
}
