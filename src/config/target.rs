//! Build targets and target selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two executables the project ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTarget {
    /// Windowed desktop application
    Gui,
    /// Console application
    Cli,
}

impl BuildTarget {
    /// Config table name (`[targets.<name>]`)
    pub fn name(&self) -> &'static str {
        match self {
            BuildTarget::Gui => "gui",
            BuildTarget::Cli => "cli",
        }
    }

    /// Label written as the build type in version-info files
    pub fn build_type(&self) -> &'static str {
        match self {
            BuildTarget::Gui => "GUI",
            BuildTarget::Cli => "CLI",
        }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which targets a build invocation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetSelection {
    /// GUI target only (the default)
    #[default]
    Gui,
    /// Console target only (`--cli`)
    Cli,
    /// Both targets (`--all`)
    All,
}

impl TargetSelection {
    /// Build from the `--cli` / `--all` flags.
    pub fn from_flags(cli: bool, all: bool) -> Self {
        match (cli, all) {
            (_, true) => TargetSelection::All,
            (true, false) => TargetSelection::Cli,
            (false, false) => TargetSelection::Gui,
        }
    }

    /// Targets in build order.
    pub fn targets(&self) -> Vec<BuildTarget> {
        match self {
            TargetSelection::Gui => vec![BuildTarget::Gui],
            TargetSelection::Cli => vec![BuildTarget::Cli],
            TargetSelection::All => vec![BuildTarget::Gui, BuildTarget::Cli],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_from_flags() {
        assert_eq!(TargetSelection::from_flags(false, false), TargetSelection::Gui);
        assert_eq!(TargetSelection::from_flags(true, false), TargetSelection::Cli);
        assert_eq!(TargetSelection::from_flags(false, true), TargetSelection::All);
        assert_eq!(
            TargetSelection::All.targets(),
            vec![BuildTarget::Gui, BuildTarget::Cli]
        );
    }
}
