//! Job filter: salary window, skill tags and the remote-only flag.

/// Slider bounds for the salary window, in thousands.
pub const SALARY_MIN: u32 = 30;
pub const SALARY_MAX: u32 = 250;
pub const SALARY_STEP: u32 = 5;
/// Default salary window; a filter matching it does not count as active.
pub const DEFAULT_SALARY_RANGE: (u32, u32) = (50, 150);

/// Skills offered by the filter sheet.
pub const SKILL_CATALOG: [&str; 9] = [
    "JavaScript",
    "React",
    "TypeScript",
    "Node.js",
    "Python",
    "AWS",
    "Docker",
    "UI/UX",
    "Figma",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFilter {
    salary: (u32, u32),
    skills: Vec<String>,
    remote: bool,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            salary: DEFAULT_SALARY_RANGE,
            skills: Vec::new(),
            remote: false,
        }
    }
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower and upper salary bound, in thousands.
    pub fn salary_range(&self) -> (u32, u32) {
        self.salary
    }

    /// Selected skills in selection order.
    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn remote_only(&self) -> bool {
        self.remote
    }

    /// Snaps both bounds to the slider grid and keeps `lower <= upper`.
    pub fn set_salary_range(&mut self, lower: u32, upper: u32) {
        let lower = snap_salary(lower);
        let upper = snap_salary(upper);
        self.salary = if lower <= upper {
            (lower, upper)
        } else {
            (upper, lower)
        };
    }

    pub fn set_remote_only(&mut self, remote: bool) {
        self.remote = remote;
    }

    /// Adds the skill if absent, removes it otherwise. Matching is exact.
    pub fn toggle_skill(&mut self, skill: &str) {
        let skill = skill.trim();
        if skill.is_empty() {
            return;
        }
        if let Some(pos) = self.skills.iter().position(|s| s == skill) {
            self.skills.remove(pos);
        } else {
            self.skills.push(skill.to_string());
        }
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    pub fn salary_narrowed(&self) -> bool {
        self.salary.0 > DEFAULT_SALARY_RANGE.0 || self.salary.1 < DEFAULT_SALARY_RANGE.1
    }

    /// Number of filter groups that differ from the defaults.
    pub fn active_count(&self) -> usize {
        usize::from(!self.skills.is_empty())
            + usize::from(self.remote)
            + usize::from(self.salary_narrowed())
    }

    /// Chip labels for the active-filter strip.
    pub fn active_labels(&self) -> Vec<String> {
        let mut labels = self.skills.clone();
        if self.salary_narrowed() {
            labels.push(format!("${}K - ${}K", self.salary.0, self.salary.1));
        }
        if self.remote {
            labels.push("Remote Only".to_string());
        }
        labels
    }
}

fn snap_salary(value: u32) -> u32 {
    let clamped = value.clamp(SALARY_MIN, SALARY_MAX);
    let offset = clamped - SALARY_MIN;
    let snapped = SALARY_MIN + (offset + SALARY_STEP / 2) / SALARY_STEP * SALARY_STEP;
    snapped.min(SALARY_MAX)
}
