//! Scene-analysis preparation for 3ds Max render jobs.
//!
//! Before a scene can be submitted to a cloud-rendering farm, an external
//! analyzer executable has to extract its asset references and scene
//! properties. This crate owns the orchestration around that step: it
//! writes the initial task description, invokes the analyzer with a JSON
//! request, loads the result files it produced and reconciles the cameras
//! the caller asked for against the cameras the scene actually contains.
//!
//! ```no_run
//! use maxprep_core::{AnalyseOptions, MaxAnalyser};
//!
//! let mut options = AnalyseOptions::new("scenes/max2018.max", "2018", "Project1");
//! options.renderable_camera = vec!["PhysCamera001".to_owned()];
//! let mut analyser = MaxAnalyser::new(options)?;
//! let code = analyser.analyse(false)?;
//! println!("analyzer exited {code}, artifacts in {}", analyser.run_dir().display());
//! # Ok::<(), maxprep_core::MaxprepError>(())
//! ```

pub mod analyse;
pub mod error;
pub mod jsonio;
pub mod process;
pub mod request;
pub mod task;

pub use analyse::{check_path, AnalyseOptions, MaxAnalyser};
pub use error::{MaxprepError, Result};
pub use request::AnalysisRequest;
pub use task::{cg_id, SoftwareConfig, TaskDescription, TaskInfo};
