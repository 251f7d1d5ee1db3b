//! Task description written to `task.json` before the analyzer runs.
//!
//! The initial serialization is fully typed; after analysis the file is
//! reloaded as an untyped mapping because the analyzer owns the full schema
//! (asset lists, scene statistics, camera inventory) and unknown keys must
//! survive the round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Render-software name to renderfarm engine code.
const CG_SETTING: &[(&str, &str)] = &[
    ("Maya", "2000"),
    ("3ds Max", "2001"),
    ("Lightwave", "2002"),
    ("Arnold Standalone", "2003"),
    ("Houdini", "2004"),
    ("Cinema 4D", "2005"),
    ("Blender", "2007"),
    ("KeyShot", "2009"),
    ("Clarisse", "2010"),
];

/// Looks up the engine code for a render-software name.
pub fn cg_id(render_software: &str) -> Option<&'static str> {
    CG_SETTING
        .iter()
        .find(|(name, _)| *name == render_software)
        .map(|(_, id)| *id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub input_cg_file: String,
    pub project_name: String,
    pub cg_id: Option<String>,
    pub os_name: String,
    pub platform: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftwareConfig {
    pub cg_name: String,
    pub cg_version: String,
    pub plugins: BTreeMap<String, String>,
}

/// Mapping describing one render job. Constructed fresh per run; instances
/// never share state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescription {
    pub task_info: TaskInfo,
    pub software_config: SoftwareConfig,
    pub scene_info: Map<String, Value>,
    pub scene_info_render: Map<String, Value>,
}

impl TaskDescription {
    /// Builds the pre-analysis task description: software and project
    /// metadata filled in, scene-info sections left empty for the analyzer.
    pub fn new(
        cg_file: &Path,
        project_name: &str,
        render_software: &str,
        platform: &str,
        cg_version: &str,
        plugins: BTreeMap<String, String>,
    ) -> Self {
        TaskDescription {
            task_info: TaskInfo {
                input_cg_file: forward_slashes(cg_file),
                project_name: project_name.to_owned(),
                cg_id: cg_id(render_software).map(str::to_owned),
                // Scene analysis only runs on Windows render nodes.
                os_name: "1".to_owned(),
                platform: platform.to_owned(),
            },
            software_config: SoftwareConfig {
                cg_name: render_software.to_owned(),
                cg_version: cg_version.to_owned(),
                plugins,
            },
            scene_info: Map::new(),
            scene_info_render: Map::new(),
        }
    }
}

/// The farm expects forward slashes regardless of the submitting platform.
pub(crate) fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
