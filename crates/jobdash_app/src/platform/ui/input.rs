use std::path::PathBuf;

use jobdash_core::{ActionKind, JobId, Msg, UserId};

pub const HELP: &str = "\
commands:
  login <user>              sign in
  logout                    sign out
  upload <path>             pick a PDF/DOC/DOCX resume and submit it
  upload-dialog             open the re-upload dialog (job view)
  retry                     try again after a failed upload
  more | bottom             load the next page
  filter skill <name>       toggle a skill in the filter draft
  filter salary <lo> <hi>   salary range in thousands
  filter remote on|off
  filter apply | reset
  save <job> | apply <job>  toggle saved / applied
  open <job> | close        detail panel (close also hides the upload dialog)
  jobs retry | stats retry
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = words.split_first() else {
        return Ok(Command::Dispatch(Vec::new()));
    };
    let one = |msg: Msg| -> Result<Command, String> { Ok(Command::Dispatch(vec![msg])) };

    match (head, rest) {
        ("help", []) => Ok(Command::Help),
        ("quit" | "exit", []) => Ok(Command::Quit),
        ("login", [user]) => one(Msg::UserSignedIn(UserId::new(*user))),
        ("logout", []) => one(Msg::UserSignedOut),
        ("upload", [_, ..]) => {
            // Paths may contain spaces; keep everything after the verb.
            let path = line.trim_start()["upload".len()..].trim();
            Ok(Command::Dispatch(vec![
                Msg::ResumeFileSelected {
                    path: PathBuf::from(path),
                    mime: None,
                },
                Msg::UploadSubmitted,
            ]))
        }
        ("upload-dialog", []) => one(Msg::UploadDialogOpened),
        ("retry", []) => one(Msg::UploadRetryClicked),
        ("more", []) => one(Msg::LoadMoreClicked),
        ("bottom", []) => one(Msg::ScrolledToBottom),
        ("filter", ["skill", name @ ..]) if !name.is_empty() => {
            one(Msg::FilterSkillToggled(name.join(" ")))
        }
        ("filter", ["salary", lower, upper]) => {
            let lower = parse_salary(lower)?;
            let upper = parse_salary(upper)?;
            one(Msg::FilterSalaryChanged { lower, upper })
        }
        ("filter", ["remote", "on"]) => one(Msg::FilterRemoteChanged(true)),
        ("filter", ["remote", "off"]) => one(Msg::FilterRemoteChanged(false)),
        ("filter", ["apply"]) => one(Msg::FiltersApplied),
        ("filter", ["reset"]) => one(Msg::FiltersReset),
        ("save", [job]) => one(Msg::ToggleClicked {
            kind: ActionKind::Saved,
            job_id: JobId::new(*job),
        }),
        ("apply", [job]) => one(Msg::ToggleClicked {
            kind: ActionKind::Applied,
            job_id: JobId::new(*job),
        }),
        ("open", [job]) => one(Msg::JobSelected(JobId::new(*job))),
        ("close", []) => Ok(Command::Dispatch(vec![
            Msg::DetailClosed,
            Msg::UploadDialogClosed,
        ])),
        ("jobs", ["retry"]) => one(Msg::RetryJobsClicked),
        ("stats", ["retry"]) => one(Msg::RetryStatsClicked),
        _ => Err(format!("unknown command `{}` (try `help`)", line.trim())),
    }
}

fn parse_salary(text: &str) -> Result<u32, String> {
    text.trim_start_matches('$')
        .trim_end_matches(['k', 'K'])
        .parse()
        .map_err(|_| format!("`{text}` is not a salary in thousands"))
}
