//! Standard paths used by StudyHub tools

use std::path::PathBuf;

/// Standard StudyHub paths
pub struct Paths {
    /// Config directory (~/.config/studyhub)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("studyhub");

        Self { config }
    }

    /// Get the config file path for a tool (e.g. `focus` -> focus.json)
    pub fn config_file(&self, tool: &str) -> PathBuf {
        self.config.join(format!("{}.json", tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_paths() {
        let paths = Paths::new();
        assert!(paths.config.ends_with("studyhub"));
        assert_eq!(paths.config_file("focus"), paths.config.join("focus.json"));
    }
}
