use std::fmt::Write;

use jobdash_core::{
    AppViewModel, ChannelState, FilterView, Job, JobRowView, JobsView, Screen, StatsView,
    UploadView,
};

const RULE: &str = "----------------------------------------";

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", header(view));

    match &view.screen {
        Screen::SignedOut => {
            let _ = writeln!(out, "Signed out. Use `login <user>` to start.");
        }
        Screen::Loading => {
            let _ = writeln!(out, "Loading...");
        }
        Screen::Upload(upload) => {
            let _ = writeln!(out, "Upload your resume to see matching jobs (PDF, DOC, DOCX).");
            render_upload(&mut out, upload);
        }
        Screen::Jobs(jobs) => {
            if let Some(stats) = &view.stats {
                render_stats(&mut out, stats);
            }
            if let Some(dialog) = &view.upload_dialog {
                let _ = writeln!(out, "[Upload Resume]");
                render_upload(&mut out, dialog);
            }
            render_jobs(&mut out, jobs);
        }
    }
    out
}

fn header(view: &AppViewModel) -> String {
    let channel = match view.channel {
        ChannelState::Closed => "offline".to_string(),
        ChannelState::Connecting => "connecting".to_string(),
        ChannelState::Connected => "live".to_string(),
        ChannelState::Reconnecting { attempt } => format!("reconnecting (attempt {attempt})"),
    };
    match &view.user {
        Some(user) => format!("JobDash | {user} | status: {channel}"),
        None => "JobDash".to_string(),
    }
}

fn render_upload(out: &mut String, upload: &UploadView) {
    if let Some(name) = &upload.file_name {
        let _ = writeln!(out, "  file: {name}");
    }
    if let Some(label) = &upload.progress_label {
        let _ = writeln!(out, "  {} {}", progress_bar(upload.progress), label);
    }
    if let Some(error) = &upload.validation_error {
        let _ = writeln!(out, "  ! {error}");
    }
    if let Some(error) = &upload.error {
        let _ = writeln!(out, "  ! {error}");
    }
    if upload.can_retry {
        let _ = writeln!(out, "  `retry` to try again");
    } else {
        let _ = writeln!(out, "  [{}]", upload.button_label);
    }
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) / 5;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled))
}

fn render_stats(out: &mut String, stats: &StatsView) {
    if let Some(error) = &stats.error {
        let _ = writeln!(out, "Stats: {error} (`stats retry`)");
    } else if stats.loading {
        let _ = writeln!(out, "Stats: loading...");
    } else {
        let _ = writeln!(
            out,
            "Saved: {}  Applied: {}",
            stats.counts.saved, stats.counts.applied
        );
    }
}

fn render_filter(out: &mut String, filter: &FilterView) {
    if filter.active_count == 0 {
        let _ = writeln!(out, "Filters: none");
    } else {
        let _ = writeln!(
            out,
            "Filters ({}): {}",
            filter.active_count,
            filter.active_labels.join(", ")
        );
    }
}

fn render_jobs(out: &mut String, jobs: &JobsView) {
    render_filter(out, &jobs.filter);
    if let Some(error) = &jobs.action_error {
        let _ = writeln!(out, "! {error}");
    }
    for row in &jobs.jobs {
        render_row(out, row);
    }
    if jobs.empty_notice {
        let _ = writeln!(out, "No jobs match your filters. `filter reset` to clear them.");
    }
    if jobs.loading {
        let _ = writeln!(out, "Loading jobs...");
    }
    if let Some(error) = &jobs.error {
        let _ = writeln!(out, "! {error} (`jobs retry`)");
    }
    if jobs.show_more {
        let _ = writeln!(out, "[Show more] `more`");
    }
    if let Some(job) = &jobs.detail {
        render_detail(out, job);
    }
}

fn render_row(out: &mut String, row: &JobRowView) {
    let mut marks = String::new();
    if row.saved {
        marks.push_str(" [saved]");
    }
    if row.applied {
        marks.push_str(" [applied]");
    }
    let _ = write!(out, "#{} {} @ {}", row.id, row.title, row.company);
    if let Some(label) = &row.match_label {
        let _ = write!(out, " ({label})");
    }
    let _ = writeln!(out, "{marks}");
    let _ = writeln!(
        out,
        "    {} | {} | {} | {}",
        row.location,
        row.salary,
        row.posted,
        row.tags.join(", ")
    );
}

fn render_detail(out: &mut String, job: &Job) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{} - {}", job.title, job.company);
    if let Some(rating) = &job.rating {
        let _ = writeln!(out, "Rating: {rating}");
    }
    if let Some(experience) = &job.experience {
        let _ = writeln!(out, "Experience: {experience}");
    }
    if !job.description.is_empty() {
        let _ = writeln!(out, "{}", job.description);
    }
    for (title, items) in [
        ("Responsibilities", &job.responsibilities),
        ("Requirements", &job.requirements),
        ("Benefits", &job.benefits),
    ] {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{title}:");
        for item in items {
            let _ = writeln!(out, "  - {item}");
        }
    }
    if let Some(info) = &job.company_info {
        let _ = writeln!(out, "About: {info}");
    }
    let _ = writeln!(out, "`close` to hide");
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdash_core::{AppState, Msg, UserId};

    #[test]
    fn signed_out_prompts_for_login() {
        let text = render(&AppState::new().view());
        assert!(text.contains("login <user>"));
    }

    #[test]
    fn checking_shows_loading_with_user() {
        let (state, _) = jobdash_core::update(AppState::new(), Msg::UserSignedIn(UserId::new("ann")));
        let text = render(&state.view());
        assert!(text.contains("JobDash | ann | status: offline"));
        assert!(text.contains("Loading..."));
    }

    #[test]
    fn progress_bar_is_proportional() {
        assert_eq!(progress_bar(50), format!("[{}{}]", "#".repeat(10), ".".repeat(10)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(20)));
    }
}
