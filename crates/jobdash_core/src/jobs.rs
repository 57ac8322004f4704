//! Recommended-job list: pagination, stale-response guard and bookmarks.
use std::collections::{BTreeMap, BTreeSet};

use crate::{ActionId, ActionKind, Job, JobAction, JobFilter, JobId, JobPage, RequestId};

/// Page request the list wants issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub request_id: RequestId,
    pub page: u32,
    pub filter: JobFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    request_id: RequestId,
    page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingAction {
    job_id: JobId,
    kind: ActionKind,
    was_marked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobListState {
    filter: JobFilter,
    jobs: Vec<Job>,
    page: u32,
    has_more: bool,
    in_flight: Option<InFlight>,
    next_request_id: RequestId,
    error: Option<String>,
    saved: BTreeSet<JobId>,
    applied: BTreeSet<JobId>,
    pending_actions: BTreeMap<ActionId, PendingAction>,
    next_action_id: ActionId,
    action_error: Option<String>,
    selected: Option<JobId>,
}

impl JobListState {
    pub fn filter(&self) -> &JobFilter {
        &self.filter
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn is_marked(&self, kind: ActionKind, job_id: &JobId) -> bool {
        self.set(kind).contains(job_id)
    }

    pub fn selected_job(&self) -> Option<&Job> {
        let id = self.selected.as_ref()?;
        self.jobs.iter().find(|job| &job.id == id)
    }

    /// Forgets everything user-specific. Id counters survive so responses
    /// addressed to the previous session can never match a new request.
    pub fn clear(&mut self) {
        *self = Self {
            next_request_id: self.next_request_id,
            next_action_id: self.next_action_id,
            ..Self::default()
        };
    }

    /// Drops every loaded page and asks for page 1 with `filter`.
    ///
    /// Any in-flight request is superseded; its response will be discarded.
    pub fn reload(&mut self, filter: JobFilter) -> PageRequest {
        self.filter = filter;
        self.jobs.clear();
        self.page = 0;
        self.has_more = false;
        self.error = None;
        self.selected = None;
        self.issue(1)
    }

    /// Next page, unless a fetch is running, nothing is left, or an error
    /// is waiting for a manual retry.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_more || self.error.is_some() {
            return None;
        }
        Some(self.issue(self.page + 1))
    }

    /// Re-issues the page that failed.
    pub fn retry(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || self.error.is_none() {
            return None;
        }
        self.error = None;
        Some(self.issue(self.page + 1))
    }

    /// Applies a page response. Returns `false` when it was stale.
    pub fn page_loaded(&mut self, request_id: RequestId, result: Result<JobPage, String>) -> bool {
        let Some(in_flight) = self.in_flight.as_ref() else {
            return false;
        };
        if in_flight.request_id != request_id {
            return false;
        }
        let page = in_flight.page;
        self.in_flight = None;
        match result {
            Ok(loaded) => {
                if page <= 1 {
                    self.jobs = loaded.jobs;
                } else {
                    self.jobs.extend(loaded.jobs);
                }
                self.page = page;
                self.has_more = loaded.has_more;
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
        true
    }

    /// Replaces local bookmark sets with the server's view.
    pub fn bookmarks_loaded(&mut self, saved: Vec<JobId>, applied: Vec<JobId>) {
        self.saved = saved.into_iter().collect();
        self.applied = applied.into_iter().collect();
        // Optimistic toggles still awaiting confirmation win over the snapshot.
        for pending in self.pending_actions.values() {
            let set = match pending.kind {
                ActionKind::Saved => &mut self.saved,
                ActionKind::Applied => &mut self.applied,
            };
            if pending.was_marked {
                set.remove(&pending.job_id);
            } else {
                set.insert(pending.job_id.clone());
            }
        }
    }

    /// Flips membership locally and returns the action to send.
    pub fn toggle(&mut self, kind: ActionKind, job_id: JobId) -> (ActionId, JobAction) {
        let set = self.set_mut(kind);
        let was_marked = !set.insert(job_id.clone());
        if was_marked {
            set.remove(&job_id);
        }
        self.next_action_id += 1;
        let action_id = self.next_action_id;
        self.pending_actions.insert(
            action_id,
            PendingAction {
                job_id,
                kind,
                was_marked,
            },
        );
        self.action_error = None;
        (action_id, JobAction::toggle(kind, !was_marked))
    }

    /// Confirms or rolls back an optimistic toggle. Returns `true` on confirmation.
    ///
    /// A failed toggle that a later toggle of the same job is still waiting
    /// on leaves the display alone and hands its prior state to that later
    /// toggle, so the last failure restores what was shown before the first.
    pub fn action_finished(&mut self, action_id: ActionId, result: Result<(), String>) -> bool {
        let Some(pending) = self.pending_actions.remove(&action_id) else {
            return false;
        };
        let message = match result {
            Ok(()) => return true,
            Err(message) => message,
        };
        self.action_error = Some(message);

        let newer = self
            .pending_actions
            .range_mut(action_id..)
            .map(|(_, later)| later)
            .find(|later| later.kind == pending.kind && later.job_id == pending.job_id);
        if let Some(later) = newer {
            later.was_marked = pending.was_marked;
            return false;
        }
        let set = self.set_mut(pending.kind);
        if pending.was_marked {
            set.insert(pending.job_id);
        } else {
            set.remove(&pending.job_id);
        }
        false
    }

    pub fn select(&mut self, job_id: JobId) -> bool {
        if !self.jobs.iter().any(|job| job.id == job_id) {
            return false;
        }
        self.selected = Some(job_id);
        true
    }

    pub fn close_detail(&mut self) -> bool {
        self.selected.take().is_some()
    }

    fn issue(&mut self, page: u32) -> PageRequest {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.in_flight = Some(InFlight { request_id, page });
        PageRequest {
            request_id,
            page,
            filter: self.filter.clone(),
        }
    }

    fn set(&self, kind: ActionKind) -> &BTreeSet<JobId> {
        match kind {
            ActionKind::Saved => &self.saved,
            ActionKind::Applied => &self.applied,
        }
    }

    fn set_mut(&mut self, kind: ActionKind) -> &mut BTreeSet<JobId> {
        match kind {
            ActionKind::Saved => &mut self.saved,
            ActionKind::Applied => &mut self.applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str) -> Job {
        Job {
            id: JobId::new(id),
            title: format!("Job {id}"),
            ..Job::default()
        }
    }

    #[test]
    fn load_more_appends_and_stops_at_last_page() {
        let mut list = JobListState::default();
        let first = list.reload(JobFilter::default());
        assert_eq!(first.page, 1);
        assert!(list.load_more().is_none(), "in flight");

        list.page_loaded(
            first.request_id,
            Ok(JobPage {
                jobs: vec![job("1"), job("2")],
                has_more: true,
            }),
        );
        let second = list.load_more().unwrap();
        assert_eq!(second.page, 2);
        list.page_loaded(
            second.request_id,
            Ok(JobPage {
                jobs: vec![job("3")],
                has_more: false,
            }),
        );
        assert_eq!(list.jobs().len(), 3);
        assert_eq!(list.page(), 2);
        assert!(list.load_more().is_none());
    }

    #[test]
    fn failed_toggle_rolls_back() {
        let mut list = JobListState::default();
        let id = JobId::new("7");
        let (action_id, action) = list.toggle(ActionKind::Applied, id.clone());
        assert_eq!(action, JobAction::Apply);
        assert!(list.is_marked(ActionKind::Applied, &id));

        assert!(!list.action_finished(action_id, Err("nope".into())));
        assert!(!list.is_marked(ActionKind::Applied, &id));
        assert_eq!(list.action_error(), Some("nope"));
    }

    #[test]
    fn double_toggle_failing_twice_restores_first_state() {
        let mut list = JobListState::default();
        let id = JobId::new("42");
        let (save, action) = list.toggle(ActionKind::Saved, id.clone());
        assert_eq!(action, JobAction::Save);
        let (unsave, action) = list.toggle(ActionKind::Saved, id.clone());
        assert_eq!(action, JobAction::Unsave);
        assert!(!list.is_marked(ActionKind::Saved, &id));

        list.action_finished(save, Err("timeout".into()));
        assert!(!list.is_marked(ActionKind::Saved, &id));
        list.action_finished(unsave, Err("timeout".into()));
        assert!(!list.is_marked(ActionKind::Saved, &id));
    }

    #[test]
    fn failures_out_of_order_settle_on_server_state() {
        let mut list = JobListState::default();
        let id = JobId::new("42");
        let (save, _) = list.toggle(ActionKind::Saved, id.clone());
        let (unsave, _) = list.toggle(ActionKind::Saved, id.clone());

        // Unsave fails first: the save is still pending, so show it.
        list.action_finished(unsave, Err("500".into()));
        assert!(list.is_marked(ActionKind::Saved, &id));
        list.action_finished(save, Err("500".into()));
        assert!(!list.is_marked(ActionKind::Saved, &id));
    }

    #[test]
    fn failed_first_toggle_then_confirmed_second_keeps_second() {
        let mut list = JobListState::default();
        let id = JobId::new("42");
        let (save, _) = list.toggle(ActionKind::Saved, id.clone());
        let (unsave, _) = list.toggle(ActionKind::Saved, id.clone());
        let (resave, _) = list.toggle(ActionKind::Saved, id.clone());

        assert!(!list.action_finished(unsave, Err("500".into())));
        assert!(list.action_finished(save, Ok(())));
        assert!(list.is_marked(ActionKind::Saved, &id));
        // Server holds the first save, so undoing the third keeps it saved.
        assert!(!list.action_finished(resave, Err("500".into())));
        assert!(list.is_marked(ActionKind::Saved, &id));
    }

    #[test]
    fn snapshot_does_not_undo_pending_toggle() {
        let mut list = JobListState::default();
        let id = JobId::new("9");
        list.toggle(ActionKind::Saved, id.clone());
        list.bookmarks_loaded(Vec::new(), Vec::new());
        assert!(list.is_marked(ActionKind::Saved, &id));
    }
}
