//! Configuration bundle consumed by the recursive driver.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectDirectoryRenames {
    None,
    Conflict,
    True,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursiveVariant {
    Normal,
    Ours,
    Theirs,
}

#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub branch1: String,
    pub branch2: String,
    pub detect_directory_renames: DetectDirectoryRenames,
    pub rename_limit: i32,
    pub rename_score: u32,
    pub show_rename_progress: bool,
    pub recursive_variant: RecursiveVariant,
    pub xdl_opts: u32,
    pub verbosity: u8,
}

impl MergeConfig {
    pub fn new(branch1: String, branch2: String) -> Self {
        MergeConfig {
            branch1,
            branch2,
            ..Default::default()
        }
    }

    pub fn branch_label(&self, side: usize) -> &str {
        match side {
            1 => &self.branch1,
            2 => &self.branch2,
            _ => "base",
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            branch1: "HEAD".to_string(),
            branch2: "MERGE_HEAD".to_string(),
            detect_directory_renames: DetectDirectoryRenames::Conflict,
            rename_limit: -1,
            rename_score: 50,
            show_rename_progress: false,
            recursive_variant: RecursiveVariant::Normal,
            xdl_opts: 0, // HISTOGRAM, hard-defaulted
            verbosity: 2,
        }
    }
}
