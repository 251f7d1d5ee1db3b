//! Invocation request passed to the analyzer executable.
//!
//! The analyzer receives a single argument: the request serialized as
//! one-line JSON. Key names are the analyzer's wire contract and must not
//! change.

use crate::error::Result;
use crate::task::forward_slashes;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub input_cg_file: String,
    pub tmp_path: String,
    pub cg_version: String,
    pub client_project_dir: String,
    #[serde(rename = "ignoreMapFlag")]
    pub ignore_map_flag: String,
    #[serde(rename = "justUploadConfigFlag")]
    pub just_upload_config_flag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_exe_path: Option<String>,
}

impl AnalysisRequest {
    /// Request for one run: the run directory doubles as temp output path
    /// and client project directory, both control flags disabled.
    pub fn new(cg_file: &Path, run_dir: &Path, cg_version: &str) -> Self {
        AnalysisRequest {
            input_cg_file: forward_slashes(cg_file),
            tmp_path: forward_slashes(run_dir),
            cg_version: cg_version.to_owned(),
            client_project_dir: forward_slashes(run_dir),
            ignore_map_flag: "0".to_owned(),
            just_upload_config_flag: "0".to_owned(),
            max_exe_path: None,
        }
    }

    pub fn with_max_exe_path(mut self, exe: &Path) -> Self {
        self.max_exe_path = Some(forward_slashes(exe));
        self
    }

    /// Single-line JSON form handed to the analyzer as its sole argument.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|source| crate::error::MaxprepError::Json {
            path: "<analysis request>".into(),
            source,
        })
    }
}

/// Shell form of the invocation, with embedded double-quotes doubled so the
/// JSON survives as one argument: `<exe> "<json>"`. This is what the debug
/// log records.
pub fn shell_command(exe: &Path, json: &str) -> String {
    format!("\"{}\" \"{}\"", exe.display(), json.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::path::PathBuf;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new(
            &PathBuf::from("/scenes/max2018.max"),
            &PathBuf::from("/workspace/1700000000"),
            "2018",
        )
    }

    #[test]
    fn wire_keys_are_stable() {
        let value: Value = serde_json::from_str(&request().to_json().unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["input_cg_file"], "/scenes/max2018.max");
        assert_eq!(object["tmp_path"], "/workspace/1700000000");
        assert_eq!(object["client_project_dir"], "/workspace/1700000000");
        assert_eq!(object["cg_version"], "2018");
        assert_eq!(object["ignoreMapFlag"], "0");
        assert_eq!(object["justUploadConfigFlag"], "0");
    }

    #[test]
    fn exe_override_is_included_when_set() {
        // Regression: the override must actually reach the wire request.
        let value: Value = serde_json::from_str(
            &request()
                .with_max_exe_path(&PathBuf::from(r"C:\3dsmax\3dsmax.exe"))
                .to_json()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(value["max_exe_path"], "C:/3dsmax/3dsmax.exe");
    }

    #[test]
    fn exe_override_is_omitted_when_unset() {
        let json = request().to_json().unwrap();
        assert!(!json.contains("max_exe_path"));
    }

    #[test]
    fn to_json_is_single_line() {
        assert!(!request().to_json().unwrap().contains('\n'));
    }

    #[test]
    fn shell_command_doubles_quotes() {
        let json = request().to_json().unwrap();
        let cmd = shell_command(&PathBuf::from("/opt/tool/analysemax.exe"), &json);
        assert!(cmd.starts_with("\"/opt/tool/analysemax.exe\" \""));
        assert!(cmd.contains("\"\"input_cg_file\"\""));
        assert!(!cmd.contains('\n'));
    }
}
