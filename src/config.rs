use std::path::PathBuf;

use clap::Parser;

use crate::error::ViewerError;
use crate::orbit::DEFAULT_SENSITIVITY;

/// Command line of the native viewer.
#[derive(Parser, Debug)]
#[command(name = "model_viewer", about = "Orbit and zoom a Wavefront OBJ model", version)]
pub struct Cli {
    /// OBJ file to display.
    pub model: Option<PathBuf>,

    /// WGSL file replacing the built-in shader (`vs_main` / `fs_main`).
    #[arg(long, value_name = "PATH")]
    pub shader: Option<PathBuf>,

    /// Start from the default view instead of the one saved last session.
    #[arg(long)]
    pub no_restore: bool,
}

/// Startup settings. Everything has a default; the command line only
/// overrides paths and the restore flag.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub fov_degrees: f32,
    pub camera_position: [f32; 3],
    pub orbit_sensitivity: f32,
    pub clear_color: [f64; 4],
    pub model_path: PathBuf,
    /// `None` uses the shader compiled into the binary.
    pub shader_path: Option<PathBuf>,
    pub view_state_path: PathBuf,
    pub restore_view: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Model Viewer".to_owned(),
            fov_degrees: 45.0,
            camera_position: [0.0, 0.0, 4.0],
            orbit_sensitivity: DEFAULT_SENSITIVITY,
            clear_color: [0.2, 0.2, 0.2, 1.0],
            model_path: PathBuf::from("assets/models/cube.obj"),
            shader_path: None,
            view_state_path: PathBuf::from("viewer_state/view.bin"),
            restore_view: true,
        }
    }
}

impl ViewerConfig {
    /// Parse arguments (without the program name). `--help` and
    /// `--version` come back as [`ViewerError::Usage`] too; the caller
    /// prints them via [`clap::Error::exit`].
    pub fn from_args<I>(args: I) -> Result<Self, ViewerError>
    where
        I: IntoIterator<Item = String>,
    {
        let cli = Cli::try_parse_from(std::iter::once("model_viewer".to_owned()).chain(args))?;
        Ok(Self::from(cli))
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}

impl From<Cli> for ViewerConfig {
    fn from(cli: Cli) -> Self {
        let defaults = Self::default();
        Self {
            model_path: cli.model.unwrap_or(defaults.model_path.clone()),
            shader_path: cli.shader,
            restore_view: !cli.no_restore,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<ViewerConfig, ViewerError> {
        ViewerConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_gives_defaults() {
        assert_eq!(parse(&[]).unwrap(), ViewerConfig::default());
    }

    #[test]
    fn model_and_flags_are_read() {
        let config = parse(&["models/backpack.obj", "--shader", "custom.wgsl", "--no-restore"]).unwrap();
        assert_eq!(config.model_path, PathBuf::from("models/backpack.obj"));
        assert_eq!(config.shader_path, Some(PathBuf::from("custom.wgsl")));
        assert!(!config.restore_view);
    }

    #[test]
    fn equals_form_is_accepted() {
        let config = parse(&["--shader=x.wgsl"]).unwrap();
        assert_eq!(config.shader_path, Some(PathBuf::from("x.wgsl")));
        assert_eq!(config.model_path, ViewerConfig::default().model_path);
        assert!(config.restore_view);
    }

    fn usage_kind(result: Result<ViewerConfig, ViewerError>) -> Option<ErrorKind> {
        match result {
            Err(ViewerError::Usage(e)) => Some(e.kind()),
            _ => None,
        }
    }

    #[test]
    fn help_is_reported_not_rejected() {
        assert_eq!(usage_kind(parse(&["--help"])), Some(ErrorKind::DisplayHelp));
    }

    #[test]
    fn bad_arguments_are_usage_errors() {
        let cases: [&[&str]; 3] = [&["--shader"], &["--fullscreen"], &["a.obj", "b.obj"]];
        for args in cases {
            let kind = usage_kind(parse(args));
            assert!(matches!(kind, Some(k) if k != ErrorKind::DisplayHelp), "{args:?} gave {kind:?}");
        }
    }
}
