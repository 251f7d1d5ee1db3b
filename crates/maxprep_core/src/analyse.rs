//! The analysis orchestrator: build a request, run the analyzer, load its
//! outputs, reconcile the requested cameras and persist the final task
//! description.

use crate::error::{MaxprepError, Result};
use crate::jsonio;
use crate::process;
use crate::request::AnalysisRequest;
use crate::task::TaskDescription;
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Name of the directory under the user's home that holds run directories
/// when no workspace is given.
const DEFAULT_WORKSPACE_DIR: &str = "renderfarm_sdk";

/// Analyzer tool bundled next to the installed binary.
const ANALYSER_TOOL: &str = "tool/analysemax.exe";

const TASK_JSON: &str = "task.json";
const TIPS_JSON: &str = "tips.json";
const ASSET_JSON: &str = "asset.json";
const UPLOAD_JSON: &str = "upload.json";

/// Fails with [`MaxprepError::MissingInput`] if the path does not exist.
pub fn check_path(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(MaxprepError::MissingInput(path.to_path_buf()))
    }
}

#[derive(Debug, Clone)]
pub struct AnalyseOptions {
    /// Scene file to analyse. Must exist.
    pub cg_file: PathBuf,
    pub software_version: String,
    pub project_name: String,
    /// Plugin name to version, may be empty.
    pub plugin_config: BTreeMap<String, String>,
    /// Root for run directories. Must exist when given; defaults to
    /// `<home>/renderfarm_sdk` (created if absent) otherwise.
    pub workspace: Option<PathBuf>,
    /// Analyzer executable override. Must exist when given; also forwarded
    /// inside the request so the analyzer knows which host to drive.
    pub max_exe_path: Option<PathBuf>,
    /// Cameras the caller wants rendered. Deduplicated; order is not
    /// significant.
    pub renderable_camera: Vec<String>,
    pub render_software: String,
    /// Renderfarm platform code.
    pub platform: String,
}

impl AnalyseOptions {
    pub fn new(
        cg_file: impl Into<PathBuf>,
        software_version: impl Into<String>,
        project_name: impl Into<String>,
    ) -> Self {
        AnalyseOptions {
            cg_file: cg_file.into(),
            software_version: software_version.into(),
            project_name: project_name.into(),
            plugin_config: BTreeMap::new(),
            workspace: None,
            max_exe_path: None,
            renderable_camera: Vec::new(),
            render_software: "3ds Max".to_owned(),
            platform: "2".to_owned(),
        }
    }
}

/// Prepares and launches one scene-analysis pass.
///
/// Construction validates the inputs and creates a fresh timestamp-named
/// run directory under the workspace root, so concurrent runs sharing a
/// workspace do not collide (runs started within the same second under the
/// same root are an acknowledged race).
#[derive(Debug)]
pub struct MaxAnalyser {
    options: AnalyseOptions,
    renderable_camera: Vec<String>,
    run_dir: PathBuf,
    task_json: PathBuf,
    tips_json: PathBuf,
    asset_json: PathBuf,
    upload_json: PathBuf,
    task_info: Value,
    tips_info: Value,
    asset_info: Value,
    upload_info: Value,
}

impl MaxAnalyser {
    pub fn new(options: AnalyseOptions) -> Result<Self> {
        check_path(&options.cg_file)?;
        if let Some(exe) = &options.max_exe_path {
            check_path(exe)?;
        }
        let root = resolve_workspace(options.workspace.as_deref())?;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let run_dir = root.join(stamp.to_string());
        fs::create_dir_all(&run_dir)?;

        // Duplicates dropped; iteration order is unspecified.
        let renderable_camera: Vec<String> = options
            .renderable_camera
            .iter()
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        Ok(MaxAnalyser {
            task_json: run_dir.join(TASK_JSON),
            tips_json: run_dir.join(TIPS_JSON),
            asset_json: run_dir.join(ASSET_JSON),
            upload_json: run_dir.join(UPLOAD_JSON),
            run_dir,
            renderable_camera,
            options,
            task_info: Value::Object(Map::new()),
            tips_info: Value::Object(Map::new()),
            asset_info: Value::Object(Map::new()),
            upload_info: Value::Object(Map::new()),
        })
    }

    /// Runs the analyzer and reconciles the requested cameras.
    ///
    /// Returns the analyzer's exit code. A nonzero code is not an error:
    /// the loaded result files are kept as-is, reconciliation is skipped
    /// and the caller decides whether the run failed. Missing or malformed
    /// result files are fatal regardless of the code.
    pub fn analyse(&mut self, skip_upload_manifest: bool) -> Result<i32> {
        self.write_initial_artifacts()?;

        let mut request = AnalysisRequest::new(
            &self.options.cg_file,
            &self.run_dir,
            &self.options.software_version,
        );
        if let Some(exe) = &self.options.max_exe_path {
            request = request.with_max_exe_path(exe);
        }
        let json = request.to_json()?;
        let exe = self.analyser_exe()?;
        debug!("{}", crate::request::shell_command(&exe, &json));
        let code = process::run_analyser(&exe, &json)?;

        self.tips_info = jsonio::load(&self.tips_json)?;
        self.asset_info = jsonio::load(&self.asset_json)?;
        self.task_info = jsonio::load(&self.task_json)?;
        if !skip_upload_manifest {
            self.upload_info = jsonio::load(&self.upload_json)?;
        }
        if code == 0 {
            self.determine_renderable_camera()?;
        }
        Ok(code)
    }

    /// Initial `task.json` plus empty asset/upload manifests, so the
    /// analyzer can read project context and append to known files.
    fn write_initial_artifacts(&self) -> Result<()> {
        let task = TaskDescription::new(
            &self.options.cg_file,
            &self.options.project_name,
            &self.options.render_software,
            &self.options.platform,
            &self.options.software_version,
            self.options.plugin_config.clone(),
        );
        jsonio::save(&self.task_json, &task)?;
        jsonio::save(&self.asset_json, &self.asset_info)?;
        jsonio::save(&self.upload_json, &self.upload_info)?;
        Ok(())
    }

    fn analyser_exe(&self) -> Result<PathBuf> {
        if let Some(exe) = &self.options.max_exe_path {
            return Ok(exe.clone());
        }
        let current = std::env::current_exe()?;
        let dir = current.parent().unwrap_or_else(|| Path::new("."));
        Ok(dir.join(ANALYSER_TOOL))
    }

    /// Merges the requested cameras with what the analyzer discovered:
    /// requested cameras present in `all_camera` become the new
    /// `renderable_camera`, missing ones are logged and skipped. The
    /// reconciled task description overwrites `task.json`.
    fn determine_renderable_camera(&mut self) -> Result<()> {
        if !self.renderable_camera.is_empty() {
            let common = self
                .task_info
                .pointer_mut("/scene_info_render/common")
                .and_then(Value::as_object_mut)
                .ok_or(MaxprepError::MalformedTask("scene_info_render.common"))?;
            let all_camera: Vec<String> = common
                .get("all_camera")
                .and_then(Value::as_array)
                .map(|cameras| {
                    cameras
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default();
            let mut kept = Vec::new();
            for camera in &self.renderable_camera {
                if all_camera.iter().any(|name| name == camera) {
                    kept.push(Value::String(camera.clone()));
                } else {
                    warn!("there is no camera in this max scene: {camera}");
                }
            }
            common.insert("renderable_camera".to_owned(), Value::Array(kept));
        }
        jsonio::save(&self.task_json, &self.task_info)
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn task_json(&self) -> &Path {
        &self.task_json
    }

    pub fn tips_json(&self) -> &Path {
        &self.tips_json
    }

    pub fn asset_json(&self) -> &Path {
        &self.asset_json
    }

    pub fn upload_json(&self) -> &Path {
        &self.upload_json
    }

    /// Task description as loaded (and possibly reconciled) by the last
    /// [`analyse`](Self::analyse) call.
    pub fn task_info(&self) -> &Value {
        &self.task_info
    }

    pub fn tips_info(&self) -> &Value {
        &self.tips_info
    }

    pub fn asset_info(&self) -> &Value {
        &self.asset_info
    }

    pub fn upload_info(&self) -> &Value {
        &self.upload_info
    }
}

/// Explicit workspaces must already exist; the default one is created on
/// demand. The asymmetry is deliberate: a mistyped explicit path should
/// fail loudly, not spawn a directory tree.
fn resolve_workspace(workspace: Option<&Path>) -> Result<PathBuf> {
    match workspace {
        Some(path) => {
            check_path(path)?;
            Ok(path.to_path_buf())
        }
        None => {
            let home = std::env::home_dir().ok_or_else(|| {
                MaxprepError::Io(std::io::Error::other("home directory not found"))
            })?;
            let default = home.join(DEFAULT_WORKSPACE_DIR);
            if !default.exists() {
                fs::create_dir_all(&default)?;
            }
            Ok(default)
        }
    }
}
